//! REST client for the e-learning backend.
//!
//! Every call goes through `AuthSession::execute`, so each one gets the
//! bearer token and the single refresh-and-retry on 401. Results are both
//! returned and published on the event bus for the UI.

use std::rc::Rc;

use serde::de::DeserializeOwned;

use elearn_types::{
    config::ClientConfig,
    course::{
        Course, CourseDraft, EnrollRequest, Enrollment, Feedback, FeedbackStatus, Notification,
        Page, Participant, Profile, ProfileUpdate, UserSummary,
    },
    event::{ClientEvent, Route},
    session::Registration,
    ClientError, Result,
};

use crate::event_bus::EventBus;
use crate::ports::{FormPart, HttpPort, HttpRequest, HttpResponse};
use crate::session::AuthSession;

pub struct ApiClient {
    config: ClientConfig,
    http: Rc<dyn HttpPort>,
    session: Rc<AuthSession>,
    bus: EventBus,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        http: Rc<dyn HttpPort>,
        session: Rc<AuthSession>,
        bus: EventBus,
    ) -> Self {
        Self {
            config,
            http,
            session,
            bus,
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        self.config.api_url(path)
    }

    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        self.session
            .execute(self.http.as_ref(), req)
            .await?
            .error_for_status()
    }

    async fn fetch<T: DeserializeOwned>(&self, req: HttpRequest) -> Result<T> {
        self.send(req).await?.json()
    }

    /// Publish `ok` on success or a toast with `failure` on error; pass the result through.
    fn report<T>(&self, result: Result<T>, ok: &str, failure: &str) -> Result<T> {
        match &result {
            Ok(_) => self.bus.emit(ClientEvent::success(ok)),
            Err(e) => {
                log::error!("{}: {}", failure, e);
                self.bus.emit(ClientEvent::error(failure));
            }
        }
        result
    }

    // ─── Auth ────────────────────────────────────────────────

    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.session
            .login(self.http.as_ref(), username, password)
            .await
            .map(|_| ())
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout(self.http.as_ref()).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<()> {
        if registration.username.trim().is_empty() || registration.password.is_empty() {
            self.bus.emit(ClientEvent::error("Username and password are required."));
            return Err(ClientError::Validation("missing credentials".to_string()));
        }
        let req = HttpRequest::post(self.url("/api/register/")).json(registration)?;
        let result = self.http.send(&req).await.and_then(|r| r.error_for_status());
        let result = self.report(
            result,
            "Registered successfully! Please log in.",
            "Registration failed. Please try again.",
        );
        if result.is_ok() {
            self.bus.emit(ClientEvent::navigate(Route::Login));
        }
        result.map(|_| ())
    }

    // ─── Courses ─────────────────────────────────────────────

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let courses: Vec<Course> = self
            .fetch(HttpRequest::get(self.url("/api/courses/")))
            .await
            .map_err(|e| {
                log::error!("Failed to fetch courses: {}", e);
                e
            })?;
        self.bus.emit(ClientEvent::CoursesLoaded {
            courses: courses.clone(),
        });
        Ok(courses)
    }

    pub async fn get_course(&self, id: u64) -> Result<Course> {
        let course: Course = self
            .fetch(HttpRequest::get(self.url(&format!("/api/courses/{}/", id))))
            .await
            .map_err(|e| {
                log::error!("Failed to fetch course details: {}", e);
                e
            })?;
        self.bus.emit(ClientEvent::CourseLoaded {
            course: course.clone(),
        });
        Ok(course)
    }

    /// Draft for a new course taught by the signed-in user.
    pub fn draft_course(
        &self,
        title: &str,
        description: &str,
        image_url: &str,
    ) -> Result<CourseDraft> {
        let instructor = self
            .session
            .user_id()
            .ok_or_else(|| ClientError::Validation("not signed in".to_string()))?;
        if title.trim().is_empty() {
            return Err(ClientError::Validation("title is required".to_string()));
        }
        Ok(CourseDraft {
            title: title.trim().to_string(),
            description: description.to_string(),
            image_url: image_url.trim().to_string(),
            instructor,
        })
    }

    /// Create (`id == None`) or update a course.
    pub async fn save_course(&self, id: Option<u64>, draft: &CourseDraft) -> Result<Course> {
        let (req, ok) = match id {
            Some(id) => (
                HttpRequest::put(self.url(&format!("/api/courses/{}/", id))),
                "Course updated successfully!",
            ),
            None => (
                HttpRequest::post(self.url("/api/courses/")),
                "Course created successfully!",
            ),
        };
        let req = req.requiring_auth().json(draft)?;
        let result = self.fetch::<Course>(req).await;
        let course = self.report(result, ok, "Failed to save course. Please try again.")?;
        self.bus.emit(ClientEvent::navigate(Route::Dashboard));
        Ok(course)
    }

    pub async fn delete_course(&self, id: u64) -> Result<()> {
        let req = HttpRequest::delete(self.url(&format!("/api/courses/{}/", id))).requiring_auth();
        let result = self.send(req).await.map(|_| ());
        self.report(
            result,
            "Course deleted successfully!",
            "Failed to delete course. Please try again.",
        )
    }

    // ─── Enrollment ──────────────────────────────────────────

    pub async fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        let req = HttpRequest::get(self.url("/api/enrollments/")).requiring_auth();
        let enrollments: Vec<Enrollment> = self.fetch(req).await.map_err(|e| {
            log::error!("Failed to fetch enrollments: {}", e);
            e
        })?;
        self.bus.emit(ClientEvent::EnrollmentsLoaded {
            enrollments: enrollments.clone(),
        });
        Ok(enrollments)
    }

    pub async fn enroll(&self, course_id: u64) -> Result<()> {
        let req = HttpRequest::post(self.url("/api/enrollments/"))
            .requiring_auth()
            .json(&EnrollRequest { course: course_id })?;
        let result = self.send(req).await.map(|_| ());
        self.report(
            result,
            "Successfully enrolled!",
            "Failed to enroll. Please try again.",
        )?;
        self.bus.emit(ClientEvent::Enrolled { course_id });
        Ok(())
    }

    /// Teacher action: drop a student from a course.
    pub async fn remove_enrollment(&self, enrollment_id: u64) -> Result<()> {
        let req = HttpRequest::post(self.url(&format!("/api/enrollments/{}/remove/", enrollment_id)))
            .requiring_auth()
            .json(&serde_json::json!({}))?;
        let result = self.send(req).await.map(|_| ());
        self.report(
            result,
            "Student removed successfully!",
            "Failed to remove student. Please try again.",
        )?;
        self.bus.emit(ClientEvent::EnrollmentRemoved { enrollment_id });
        Ok(())
    }

    // ─── Feedback ────────────────────────────────────────────

    pub async fn has_left_feedback(&self, course_id: u64) -> Result<bool> {
        let req = HttpRequest::get(self.url(&format!("/api/courses/{}/has_left_feedback/", course_id)))
            .requiring_auth();
        let status: FeedbackStatus = self.fetch(req).await.map_err(|e| {
            log::error!("Failed to check feedback status: {}", e);
            e
        })?;
        self.bus.emit(ClientEvent::FeedbackStatus {
            course_id,
            has_left_feedback: status.has_left_feedback,
        });
        Ok(status.has_left_feedback)
    }

    pub async fn submit_feedback(&self, feedback: &Feedback) -> Result<()> {
        if !(Feedback::MIN_RATING..=Feedback::MAX_RATING).contains(&feedback.rating) {
            self.bus.emit(ClientEvent::error("Rating must be between 1 and 5."));
            return Err(ClientError::Validation(format!("rating out of range: {}", feedback.rating)));
        }
        if feedback.comment.trim().is_empty() {
            self.bus.emit(ClientEvent::error("Please enter a comment."));
            return Err(ClientError::Validation("empty comment".to_string()));
        }
        let req = HttpRequest::post(self.url("/feedback/"))
            .requiring_auth()
            .json(feedback)?;
        let result = self.send(req).await.map(|_| ());
        self.report(
            result,
            "Feedback submitted successfully!",
            "Failed to submit feedback. Please try again.",
        )?;
        self.bus.emit(ClientEvent::FeedbackStatus {
            course_id: feedback.course,
            has_left_feedback: true,
        });
        Ok(())
    }

    // ─── Profile ─────────────────────────────────────────────

    pub async fn get_profile(&self) -> Result<Profile> {
        let req = HttpRequest::get(self.url("/api/profile/")).requiring_auth();
        let profile: Profile = match self.fetch(req).await {
            Ok(p) => p,
            Err(e) => {
                log::error!("Failed to fetch profile: {}", e);
                self.bus.emit(ClientEvent::error(
                    "Failed to load profile data. Please try again.",
                ));
                return Err(e);
            }
        };
        self.bus.emit(ClientEvent::ProfileLoaded {
            profile: profile.clone(),
        });
        Ok(profile)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let req = HttpRequest::put(self.url("/api/profile/"))
            .requiring_auth()
            .multipart(profile_form(update));
        let result = self.send(req).await.map(|_| ());
        self.report(
            result,
            "Profile updated successfully!",
            "Failed to update profile. Please try again.",
        )
    }

    // ─── Notifications & users ───────────────────────────────

    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        let req = HttpRequest::get(self.url("/api/notifications/")).requiring_auth();
        let notifications: Vec<Notification> = self.fetch(req).await.map_err(|e| {
            log::error!("Failed to fetch notifications: {}", e);
            e
        })?;
        self.bus.emit(ClientEvent::NotificationsLoaded {
            notifications: notifications.clone(),
        });
        Ok(notifications)
    }

    /// Search users by username or email.
    pub async fn search_users(&self, term: &str) -> Result<Vec<UserSummary>> {
        let req = HttpRequest::get(self.url("/api/search/"))
            .query("search", term)
            .requiring_auth();
        let users: Vec<UserSummary> = self.fetch(req).await.map_err(|e| {
            log::error!("Failed to search users: {}", e);
            e
        })?;
        self.bus.emit(ClientEvent::SearchResults {
            users: users.clone(),
        });
        Ok(users)
    }

    /// Chat user directory. A failed lookup publishes an empty list.
    pub async fn list_participants(&self, search: &str) -> Result<Vec<Participant>> {
        let req = HttpRequest::get(self.url("/api/users/"))
            .query("search", search)
            .requiring_auth();
        match self.fetch::<Page<Participant>>(req).await {
            Ok(page) => {
                self.bus.emit(ClientEvent::ParticipantsLoaded {
                    participants: page.results.clone(),
                });
                Ok(page.results)
            }
            Err(e) => {
                log::error!("Failed to fetch users: {}", e);
                self.bus.emit(ClientEvent::ParticipantsLoaded {
                    participants: Vec::new(),
                });
                Err(e)
            }
        }
    }
}

/// Multipart fields for a profile update; the photo is only attached when set.
pub fn profile_form(update: &ProfileUpdate) -> Vec<FormPart> {
    let text = |name: &str, value: &str| FormPart::Text {
        name: name.to_string(),
        value: value.to_string(),
    };
    let mut parts = vec![
        text("email", &update.email),
        text("first_name", &update.first_name),
        text("last_name", &update.last_name),
        text("organisation", &update.organisation),
    ];
    if let Some(photo) = &update.photo {
        parts.push(FormPart::File {
            name: "profile_photo".to_string(),
            file: photo.clone(),
        });
    }
    parts
}
