//! REST resource models. Field names follow the wire format.

use serde::{Deserialize, Serialize};

use crate::session::UserRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub instructor: u64,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub feedback: Vec<FeedbackEntry>,
}

/// Create / update payload for a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub instructor: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: u64,
    pub student: u64,
    pub course: u64,
    #[serde(default)]
    pub student_username: Option<String>,
    #[serde(default)]
    pub enrolled_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollRequest {
    pub course: u64,
}

/// Feedback submitted by a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub course: u64,
    pub comment: String,
    pub rating: u8,
}

impl Feedback {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;
}

/// Feedback as listed on a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(default)]
    pub student: Option<u64>,
    pub comment: String,
    pub rating: u8,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackStatus {
    pub has_left_feedback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user: ProfileUser,
    #[serde(default)]
    pub organisation: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub profile_photo: Option<String>,
}

/// Multipart payload for `PUT /api/profile/`
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub organisation: String,
    /// Only sent when the user picked a new file
    pub photo: Option<UploadFile>,
}

impl ProfileUpdate {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            email: profile.user.email.clone(),
            first_name: profile.user.first_name.clone(),
            last_name: profile.user.last_name.clone(),
            organisation: profile.organisation.clone().unwrap_or_default(),
            photo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

/// Result row of `GET /api/search/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantUser {
    pub id: u64,
    pub username: String,
}

/// Row of the chat user directory (`GET /api/users/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user: ParticipantUser,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub profile_photo: Option<String>,
}

/// Paginated wrapper used by the user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}
