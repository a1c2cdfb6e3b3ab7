//! UI-level state that drives rendering.
//! This is a read-only projection of what the client core reports,
//! updated each frame by draining the EventBus. Panels mutate only the
//! form buffers and hand everything else back as a `UiAction`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use elearn_types::chat::{ChannelState, ChatMessage, ChatTarget};
use elearn_types::course::{
    Course, Enrollment, Feedback, Notification, Participant, Profile, ProfileUpdate, UserSummary,
};
use elearn_types::event::{ClientEvent, NoticeLevel, Route};
use elearn_types::session::{Registration, UserRole};

/// How long a toast stays on screen
pub const NOTICE_TTL_SECS: i64 = 4;

/// Something the user asked for; the app turns it into a core call.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Navigate(Route),
    Login { username: String, password: String },
    Register(Registration),
    /// Revoke the refresh token server-side
    Logout,
    /// Forget the session in this browser only
    SignOut,
    Enroll { course_id: u64 },
    RemoveEnrollment { enrollment_id: u64 },
    SaveCourse {
        id: Option<u64>,
        title: String,
        description: String,
        image_url: String,
    },
    DeleteCourse { course_id: u64 },
    SubmitFeedback(Feedback),
    SaveProfile(ProfileUpdate),
    SearchUsers { term: String },
    SearchParticipants { term: String },
    SelectChat(ChatTarget),
    SendChat { body: String },
}

/// A transient toast
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Label and enabled flag of the enroll button on a course page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollButton {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct CourseForm {
    pub id: Option<u64>,
    pub title: String,
    pub description: String,
    pub image_url: String,
}

impl CourseForm {
    pub fn from_course(course: &Course) -> Self {
        Self {
            id: Some(course.id),
            title: course.title.clone(),
            description: course.description.clone(),
            image_url: course.image_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackForm {
    pub comment: String,
    pub rating: u8,
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self {
            comment: String::new(),
            rating: Feedback::MAX_RATING,
        }
    }
}

/// The course page
#[derive(Debug, Clone, Default)]
pub struct CourseDetail {
    pub course: Option<Course>,
    pub is_enrolled: bool,
    pub enrolling: bool,
    pub has_left_feedback: bool,
    pub feedback: FeedbackForm,
}

impl CourseDetail {
    pub fn enroll_button(&self) -> EnrollButton {
        if self.is_enrolled {
            EnrollButton {
                label: "You are enrolled",
                enabled: false,
            }
        } else {
            EnrollButton {
                label: "Enroll",
                enabled: !self.enrolling,
            }
        }
    }
}

/// Chat screen: one log per target, only the active one has a socket
#[derive(Debug, Clone)]
pub struct ChatPanel {
    pub active: Option<ChatTarget>,
    pub state: ChannelState,
    pub logs: HashMap<ChatTarget, Vec<ChatMessage>>,
    pub input: String,
    pub room_input: String,
    pub participant_search: String,
    pub participants: Vec<Participant>,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self {
            active: None,
            state: ChannelState::Closed,
            logs: HashMap::new(),
            input: String::new(),
            room_input: String::new(),
            participant_search: String::new(),
            participants: Vec::new(),
        }
    }
}

impl ChatPanel {
    pub fn log(&self, target: &ChatTarget) -> &[ChatMessage] {
        self.logs.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn can_send(&self) -> bool {
        self.state == ChannelState::Open && !self.input.trim().is_empty()
    }

    /// The socket accepted `body`; clear the input unless it was edited since.
    pub fn message_sent(&mut self, body: &str) {
        if self.input == body {
            self.input.clear();
        }
    }
}

/// State visible to UI panels
pub struct UiState {
    pub route: Route,
    pub signed_in: bool,
    pub role: Option<UserRole>,
    pub user_id: Option<u64>,
    pub notices: Vec<Notice>,
    pub login: LoginForm,
    pub register: RegisterForm,
    /// `None` until the first load completes
    pub courses: Option<Vec<Course>>,
    pub enrollments: Vec<Enrollment>,
    pub detail: CourseDetail,
    pub course_form: CourseForm,
    pub profile: Option<Profile>,
    pub profile_form: ProfileUpdate,
    pub notifications: Vec<Notification>,
    pub search_term: String,
    pub search_results: Vec<UserSummary>,
    pub chat: ChatPanel,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            route: Route::Courses,
            signed_in: false,
            role: None,
            user_id: None,
            notices: Vec::new(),
            login: LoginForm::default(),
            register: RegisterForm::default(),
            courses: None,
            enrollments: Vec::new(),
            detail: CourseDetail::default(),
            course_form: CourseForm::default(),
            profile: None,
            profile_form: ProfileUpdate {
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                organisation: String::new(),
                photo: None,
            },
            notifications: Vec::new(),
            search_term: String::new(),
            search_results: Vec::new(),
            chat: ChatPanel::default(),
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<ClientEvent>) {
        self.process_events_at(events, Utc::now());
    }

    pub fn process_events_at(&mut self, events: Vec<ClientEvent>, now: DateTime<Utc>) {
        for event in events {
            match event {
                ClientEvent::Navigate { route } => self.open(route),
                ClientEvent::Notice { level, text } => {
                    // A failed request ends any enroll in flight.
                    if level == NoticeLevel::Error {
                        self.end_enroll();
                    }
                    self.notices.push(Notice {
                        level,
                        text,
                        created_at: now,
                    });
                }
                ClientEvent::SessionChanged { signed_in } => {
                    self.signed_in = signed_in;
                    if signed_in {
                        self.login = LoginForm::default();
                    } else {
                        self.enrollments.clear();
                        self.profile = None;
                        self.notifications.clear();
                    }
                }
                ClientEvent::CoursesLoaded { courses } => self.courses = Some(courses),
                ClientEvent::CourseLoaded { course } => {
                    if self.course_form.id == Some(course.id) {
                        self.course_form = CourseForm::from_course(&course);
                    }
                    let id = course.id;
                    let keep = self.detail_course_id() == Some(id) && self.detail.is_enrolled;
                    self.detail.course = Some(course);
                    self.detail.is_enrolled = keep || self.enrolled_in(id);
                }
                ClientEvent::EnrollmentsLoaded { enrollments } => {
                    self.enrollments = enrollments;
                    self.refresh_enrolled_flag();
                }
                ClientEvent::Enrolled { course_id } => {
                    if self.detail_course_id() == Some(course_id) {
                        self.detail.is_enrolled = true;
                        self.detail.enrolling = false;
                    }
                }
                ClientEvent::EnrollmentRemoved { enrollment_id } => {
                    self.enrollments.retain(|e| e.id != enrollment_id);
                    self.refresh_enrolled_flag();
                }
                ClientEvent::FeedbackStatus {
                    course_id,
                    has_left_feedback,
                } => {
                    if self.detail_course_id() == Some(course_id) {
                        self.detail.has_left_feedback = has_left_feedback;
                        if has_left_feedback {
                            self.detail.feedback = FeedbackForm::default();
                        }
                    }
                }
                ClientEvent::ProfileLoaded { profile } => {
                    self.profile_form = ProfileUpdate::from_profile(&profile);
                    self.profile = Some(profile);
                }
                ClientEvent::NotificationsLoaded { notifications } => {
                    self.notifications = notifications;
                }
                ClientEvent::SearchResults { users } => self.search_results = users,
                ClientEvent::ParticipantsLoaded { participants } => {
                    self.chat.participants = participants;
                }
                ClientEvent::ChannelState { target, state } => {
                    if self.chat.active.as_ref() == Some(&target) {
                        self.chat.state = state;
                    }
                }
                ClientEvent::ChatMessage { target, message } => {
                    self.chat.logs.entry(target).or_default().push(message);
                }
            }
        }
    }

    /// Switch view, resetting the per-view buffers that belong to it.
    pub fn open(&mut self, route: Route) {
        match &route {
            Route::CourseDetail { id } => {
                if self.detail_course_id() != Some(*id) {
                    self.detail = CourseDetail::default();
                }
            }
            Route::CourseForm { id } => {
                self.course_form = match (id, &self.detail.course) {
                    (Some(id), Some(course)) if course.id == *id => CourseForm::from_course(course),
                    (Some(id), _) => CourseForm {
                        id: Some(*id),
                        ..CourseForm::default()
                    },
                    (None, _) => CourseForm::default(),
                };
            }
            _ => {}
        }
        if !self.route.keeps_chat_view(&route) {
            self.chat.active = None;
            self.chat.state = ChannelState::Closed;
        }
        self.route = route;
    }

    pub fn set_identity(&mut self, signed_in: bool, role: Option<UserRole>, user_id: Option<u64>) {
        self.signed_in = signed_in;
        self.role = role;
        self.user_id = user_id;
    }

    fn detail_course_id(&self) -> Option<u64> {
        self.detail.course.as_ref().map(|c| c.id)
    }

    /// Whether the signed-in user holds an enrollment for `course_id`.
    pub fn enrolled_in(&self, course_id: u64) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.course == course_id && self.user_id.map_or(true, |u| u == e.student))
    }

    fn refresh_enrolled_flag(&mut self) {
        if let Some(id) = self.detail_course_id() {
            self.detail.is_enrolled = self.enrolled_in(id);
        }
    }

    /// Mark the enroll request as in flight.
    pub fn begin_enroll(&mut self) {
        self.detail.enrolling = true;
    }

    /// Enrollment failed; let the user try again.
    pub fn end_enroll(&mut self) {
        self.detail.enrolling = false;
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Some(UserRole::Teacher)
    }

    /// True once courses loaded and there are none.
    pub fn shows_no_courses(&self) -> bool {
        matches!(&self.courses, Some(c) if c.is_empty())
    }

    pub fn course_cards(&self) -> &[Course] {
        self.courses.as_deref().unwrap_or(&[])
    }

    /// Courses on the dashboard: taught ones for teachers, enrolled ones for students.
    pub fn dashboard_courses(&self) -> Vec<&Course> {
        let courses = self.course_cards();
        if self.is_teacher() {
            courses
                .iter()
                .filter(|c| Some(c.instructor) == self.user_id)
                .collect()
        } else {
            courses
                .iter()
                .filter(|c| self.enrollments.iter().any(|e| e.course == c.id))
                .collect()
        }
    }

    /// Enrollments of the course currently on screen (teacher view).
    pub fn enrolled_students(&self) -> Vec<&Enrollment> {
        match self.detail_course_id() {
            Some(id) => self.enrollments.iter().filter(|e| e.course == id).collect(),
            None => Vec::new(),
        }
    }

    pub fn can_leave_feedback(&self) -> bool {
        self.signed_in
            && !self.is_teacher()
            && self.detail.is_enrolled
            && !self.detail.has_left_feedback
    }

    /// Select a chat target; its log is kept across switches.
    pub fn select_chat(&mut self, target: ChatTarget) {
        if self.chat.active.as_ref() != Some(&target) {
            self.chat.state = ChannelState::Connecting;
        }
        self.chat.logs.entry(target.clone()).or_default();
        self.chat.active = Some(target);
    }

    /// Drop toasts older than `NOTICE_TTL_SECS`.
    pub fn expire_notices(&mut self, now: DateTime<Utc>) {
        let ttl = Duration::seconds(NOTICE_TTL_SECS);
        self.notices.retain(|n| now - n.created_at < ttl);
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
