#[cfg(test)]
mod tests {
    use crate::state::*;
    use chrono::{Duration, TimeZone, Utc};
    use elearn_types::chat::*;
    use elearn_types::course::*;
    use elearn_types::event::*;
    use elearn_types::session::{Registration, UserRole};

    fn course(id: u64, instructor: u64) -> Course {
        Course {
            id,
            title: format!("Course {}", id),
            description: "About things".to_string(),
            instructor,
            image_url: None,
            feedback: Vec::new(),
        }
    }

    fn enrollment(id: u64, student: u64, course: u64) -> Enrollment {
        Enrollment {
            id,
            student,
            course,
            student_username: None,
            enrolled_at: None,
        }
    }

    fn student_state() -> UiState {
        let mut state = UiState::new();
        state.set_identity(true, Some(UserRole::Student), Some(7));
        state
    }

    // ─── UiState Tests ───────────────────────────────────────

    #[test]
    fn test_ui_state_initial() {
        let state = UiState::new();
        assert_eq!(state.route, Route::Courses);
        assert!(!state.signed_in);
        assert!(state.courses.is_none());
        assert!(!state.shows_no_courses());
        assert!(state.notices.is_empty());
        assert_eq!(state.chat.state, ChannelState::Closed);
    }

    #[test]
    fn test_navigate_event_switches_route() {
        let mut state = UiState::new();
        state.process_events(vec![ClientEvent::navigate(Route::Dashboard)]);
        assert_eq!(state.route, Route::Dashboard);
    }

    // ─── Course list Tests ───────────────────────────────────

    #[test]
    fn test_empty_course_list_shows_no_courses() {
        let mut state = UiState::new();
        state.process_events(vec![ClientEvent::CoursesLoaded { courses: vec![] }]);
        assert!(state.shows_no_courses());
        assert_eq!(state.course_cards().len(), 0);
    }

    #[test]
    fn test_course_list_renders_one_card_per_course() {
        let mut state = UiState::new();
        state.process_events(vec![ClientEvent::CoursesLoaded {
            courses: vec![course(1, 2), course(2, 2), course(3, 5)],
        }]);
        assert!(!state.shows_no_courses());
        assert_eq!(state.course_cards().len(), 3);
    }

    #[test]
    fn test_dashboard_by_role() {
        let mut state = student_state();
        state.process_events(vec![
            ClientEvent::CoursesLoaded {
                courses: vec![course(1, 2), course(2, 2), course(3, 7)],
            },
            ClientEvent::EnrollmentsLoaded {
                enrollments: vec![enrollment(10, 7, 2)],
            },
        ]);
        let ids: Vec<u64> = state.dashboard_courses().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);

        state.set_identity(true, Some(UserRole::Teacher), Some(7));
        let ids: Vec<u64> = state.dashboard_courses().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3]);
    }

    // ─── Course detail Tests ─────────────────────────────────

    #[test]
    fn test_enroll_button_before_enrolling() {
        let mut state = student_state();
        state.open(Route::CourseDetail { id: 4 });
        state.process_events(vec![ClientEvent::CourseLoaded { course: course(4, 2) }]);

        let button = state.detail.enroll_button();
        assert_eq!(button.label, "Enroll");
        assert!(button.enabled);
        assert!(!state.detail.is_enrolled);
    }

    #[test]
    fn test_enroll_success_flips_button() {
        let mut state = student_state();
        state.open(Route::CourseDetail { id: 4 });
        state.process_events(vec![ClientEvent::CourseLoaded { course: course(4, 2) }]);

        state.begin_enroll();
        assert!(!state.detail.enroll_button().enabled);

        state.process_events(vec![
            ClientEvent::success("Successfully enrolled!"),
            ClientEvent::Enrolled { course_id: 4 },
        ]);

        assert!(state.detail.is_enrolled);
        let button = state.detail.enroll_button();
        assert_eq!(button.label, "You are enrolled");
        assert!(!button.enabled);
    }

    #[test]
    fn test_enroll_failure_reenables_button() {
        let mut state = student_state();
        state.process_events(vec![ClientEvent::CourseLoaded { course: course(4, 2) }]);
        state.begin_enroll();
        state.end_enroll();
        assert!(state.detail.enroll_button().enabled);
        assert!(!state.detail.is_enrolled);
    }

    #[test]
    fn test_error_notice_ends_pending_enroll() {
        let mut state = student_state();
        state.process_events(vec![ClientEvent::CourseLoaded { course: course(4, 2) }]);
        state.begin_enroll();
        state.process_events(vec![ClientEvent::error("Failed to enroll. Please try again.")]);
        let button = state.detail.enroll_button();
        assert_eq!(button.label, "Enroll");
        assert!(button.enabled);
    }

    #[test]
    fn test_enrolled_flag_from_enrollment_list() {
        let mut state = student_state();
        state.process_events(vec![
            ClientEvent::EnrollmentsLoaded {
                enrollments: vec![enrollment(1, 7, 4)],
            },
            ClientEvent::CourseLoaded { course: course(4, 2) },
        ]);
        assert!(state.detail.is_enrolled);
    }

    #[test]
    fn test_other_students_enrollment_does_not_count() {
        let mut state = student_state();
        state.process_events(vec![
            ClientEvent::CourseLoaded { course: course(4, 2) },
            ClientEvent::EnrollmentsLoaded {
                enrollments: vec![enrollment(1, 99, 4)],
            },
        ]);
        assert!(!state.detail.is_enrolled);
    }

    #[test]
    fn test_enrolled_event_for_other_course_ignored() {
        let mut state = student_state();
        state.process_events(vec![
            ClientEvent::CourseLoaded { course: course(4, 2) },
            ClientEvent::Enrolled { course_id: 5 },
        ]);
        assert!(!state.detail.is_enrolled);
    }

    #[test]
    fn test_opening_another_course_resets_detail() {
        let mut state = student_state();
        state.process_events(vec![
            ClientEvent::CourseLoaded { course: course(4, 2) },
            ClientEvent::Enrolled { course_id: 4 },
        ]);
        state.open(Route::CourseDetail { id: 5 });
        assert!(state.detail.course.is_none());
        assert!(!state.detail.is_enrolled);
    }

    #[test]
    fn test_feedback_only_once_and_only_when_enrolled() {
        let mut state = student_state();
        state.process_events(vec![ClientEvent::CourseLoaded { course: course(4, 2) }]);
        assert!(!state.can_leave_feedback());

        state.process_events(vec![ClientEvent::Enrolled { course_id: 4 }]);
        assert!(state.can_leave_feedback());

        state.process_events(vec![ClientEvent::FeedbackStatus {
            course_id: 4,
            has_left_feedback: true,
        }]);
        assert!(!state.can_leave_feedback());
    }

    #[test]
    fn test_teacher_sees_enrolled_students() {
        let mut state = UiState::new();
        state.set_identity(true, Some(UserRole::Teacher), Some(2));
        state.process_events(vec![
            ClientEvent::CourseLoaded { course: course(4, 2) },
            ClientEvent::EnrollmentsLoaded {
                enrollments: vec![enrollment(1, 8, 4), enrollment(2, 9, 4), enrollment(3, 9, 6)],
            },
        ]);
        assert_eq!(state.enrolled_students().len(), 2);

        state.process_events(vec![ClientEvent::EnrollmentRemoved { enrollment_id: 1 }]);
        assert_eq!(state.enrolled_students().len(), 1);
    }

    #[test]
    fn test_edit_form_prefilled_from_loaded_course() {
        let mut state = UiState::new();
        state.process_events(vec![ClientEvent::CourseLoaded { course: course(4, 2) }]);
        state.open(Route::CourseForm { id: Some(4) });
        assert_eq!(state.course_form.id, Some(4));
        assert_eq!(state.course_form.title, "Course 4");

        state.open(Route::CourseForm { id: None });
        assert!(state.course_form.title.is_empty());
    }

    // ─── Session Tests ───────────────────────────────────────

    #[test]
    fn test_sign_out_clears_private_views() {
        let mut state = student_state();
        state.process_events(vec![
            ClientEvent::EnrollmentsLoaded {
                enrollments: vec![enrollment(1, 7, 4)],
            },
            ClientEvent::NotificationsLoaded {
                notifications: vec![Notification {
                    id: 1,
                    message: "hi".to_string(),
                    created_at: None,
                    is_read: false,
                }],
            },
        ]);
        assert_eq!(state.unread_notifications(), 1);

        state.process_events(vec![
            ClientEvent::SessionChanged { signed_in: false },
            ClientEvent::navigate(Route::Login),
        ]);
        assert!(!state.signed_in);
        assert!(state.enrollments.is_empty());
        assert!(state.notifications.is_empty());
        assert_eq!(state.route, Route::Login);
    }

    #[test]
    fn test_login_success_clears_form() {
        let mut state = UiState::new();
        state.login.username = "ann".to_string();
        state.login.password = "pw".to_string();
        state.process_events(vec![ClientEvent::SessionChanged { signed_in: true }]);
        assert!(state.login.password.is_empty());
    }

    #[test]
    fn test_register_actions_compare_by_value() {
        let registration = |name: &str| Registration {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "pw".to_string(),
        };
        assert_eq!(
            UiAction::Register(registration("ann")),
            UiAction::Register(registration("ann"))
        );
        assert_ne!(
            UiAction::Register(registration("ann")),
            UiAction::Register(registration("bob"))
        );
    }

    // ─── Notice Tests ────────────────────────────────────────

    #[test]
    fn test_notices_expire() {
        let mut state = UiState::new();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        state.process_events_at(vec![ClientEvent::error("Login failed")], t0);
        state.process_events_at(
            vec![ClientEvent::success("Saved")],
            t0 + Duration::seconds(3),
        );
        assert_eq!(state.notices.len(), 2);

        state.expire_notices(t0 + Duration::seconds(NOTICE_TTL_SECS));
        assert_eq!(state.notices.len(), 1);
        assert_eq!(state.notices[0].text, "Saved");
        assert_eq!(state.notices[0].level, NoticeLevel::Success);
    }

    // ─── Chat Tests ──────────────────────────────────────────

    #[test]
    fn test_chat_messages_logged_per_target() {
        let mut state = student_state();
        let bob = ChatTarget::Peer("bob".to_string());
        let eve = ChatTarget::Peer("eve".to_string());
        let msg = |text: &str| ChatMessage {
            sender: Some("bob".to_string()),
            text: text.to_string(),
            timestamp: None,
        };

        state.select_chat(bob.clone());
        state.process_events(vec![
            ClientEvent::ChatMessage { target: bob.clone(), message: msg("one") },
            ClientEvent::ChatMessage { target: bob.clone(), message: msg("two") },
        ]);
        state.select_chat(eve.clone());

        let texts: Vec<&str> = state.chat.log(&bob).iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert!(state.chat.log(&eve).is_empty());
    }

    #[test]
    fn test_channel_state_only_tracks_active_target() {
        let mut state = student_state();
        let room = ChatTarget::Room("lobby".to_string());
        state.select_chat(room.clone());
        assert_eq!(state.chat.state, ChannelState::Connecting);

        state.process_events(vec![
            ClientEvent::ChannelState {
                target: ChatTarget::Room("old".to_string()),
                state: ChannelState::Closed,
            },
            ClientEvent::ChannelState { target: room, state: ChannelState::Open },
        ]);
        assert_eq!(state.chat.state, ChannelState::Open);
    }

    #[test]
    fn test_send_requires_open_channel_and_text() {
        let mut state = student_state();
        state.select_chat(ChatTarget::Room("lobby".to_string()));
        state.chat.input = "hello".to_string();
        assert!(!state.chat.can_send());

        state.chat.state = ChannelState::Open;
        assert!(state.chat.can_send());

        state.chat.input = "   ".to_string();
        assert!(!state.chat.can_send());
    }

    #[test]
    fn test_leaving_chat_route_resets_channel() {
        let mut state = student_state();
        state.open(Route::DirectChat);
        state.select_chat(ChatTarget::Peer("bob".to_string()));
        state.open(Route::Profile);
        assert!(state.chat.active.is_none());
        assert_eq!(state.chat.state, ChannelState::Closed);
    }

    #[test]
    fn test_room_to_direct_chat_drops_room() {
        let mut state = student_state();
        let lobby = ChatTarget::Room("lobby".to_string());
        state.open(Route::ChatRoom { room: "lobby".to_string() });
        state.select_chat(lobby.clone());
        state.chat.state = ChannelState::Open;

        state.open(Route::DirectChat);
        assert!(state.chat.active.is_none());
        assert_eq!(state.chat.state, ChannelState::Closed);
    }

    #[test]
    fn test_room_to_room_keeps_view_until_reselected() {
        let mut state = student_state();
        let lobby = ChatTarget::Room("lobby".to_string());
        state.open(Route::ChatRoom { room: "lobby".to_string() });
        state.select_chat(lobby.clone());

        state.open(Route::ChatRoom { room: "help".to_string() });
        assert_eq!(state.chat.active, Some(lobby));
    }

    #[test]
    fn test_chat_input_kept_until_message_sent() {
        let mut state = student_state();
        state.select_chat(ChatTarget::Room("lobby".to_string()));
        state.chat.input = "hello".to_string();

        state.chat.message_sent("hello");
        assert!(state.chat.input.is_empty());

        state.chat.input = "edited".to_string();
        state.chat.message_sent("hello");
        assert_eq!(state.chat.input, "edited");
    }
}
