use serde::{Deserialize, Serialize};

use crate::chat::{ChannelState, ChatMessage, ChatTarget};
use crate::course::{Course, Enrollment, Notification, Participant, Profile, UserSummary};

/// Events emitted by the client core.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Switch to another view
    Navigate { route: Route },

    /// Transient user-facing notice (toast)
    Notice { level: NoticeLevel, text: String },

    /// Session was created, refreshed or cleared
    SessionChanged { signed_in: bool },

    CoursesLoaded { courses: Vec<Course> },

    CourseLoaded { course: Course },

    EnrollmentsLoaded { enrollments: Vec<Enrollment> },

    /// Enrollment in a course succeeded
    Enrolled { course_id: u64 },

    EnrollmentRemoved { enrollment_id: u64 },

    FeedbackStatus { course_id: u64, has_left_feedback: bool },

    ProfileLoaded { profile: Profile },

    NotificationsLoaded { notifications: Vec<Notification> },

    SearchResults { users: Vec<UserSummary> },

    ParticipantsLoaded { participants: Vec<Participant> },

    /// A chat connection changed state
    ChannelState { target: ChatTarget, state: ChannelState },

    /// A message was appended to a conversation log
    ChatMessage { target: ChatTarget, message: ChatMessage },
}

/// Client-side views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Courses,
    CourseDetail { id: u64 },
    CourseForm { id: Option<u64> },
    Profile,
    Notifications,
    Search,
    ChatRoom { room: String },
    DirectChat,
    Unauthorized,
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Route::Login | Route::Register | Route::Courses | Route::Unauthorized
        )
    }

    /// Whether moving from `self` to `next` keeps the mounted chat view.
    /// Only staying put, or hopping between rooms (the new room's selection
    /// closes the old socket), does; every other move unmounts it.
    pub fn keeps_chat_view(&self, next: &Route) -> bool {
        self == next || matches!((self, next), (Route::ChatRoom { .. }, Route::ChatRoom { .. }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl ClientEvent {
    pub fn success(text: impl Into<String>) -> Self {
        ClientEvent::Notice {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        ClientEvent::Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn navigate(route: Route) -> Self {
        ClientEvent::Navigate { route }
    }
}
