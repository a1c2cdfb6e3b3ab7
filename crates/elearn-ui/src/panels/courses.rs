//! Course list, dashboard, course page and course editor.

use egui::{self, Align, Layout, RichText, ScrollArea, TextEdit, Vec2};

use elearn_types::course::{Course, Feedback};
use elearn_types::event::Route;

use crate::state::{UiAction, UiState};
use crate::theme::*;

/// All courses as a grid of cards.
pub fn course_list_panel(ui: &mut egui::Ui, state: &UiState) -> Option<UiAction> {
    let mut action = None;

    ui.heading(RichText::new("Courses").color(TEXT_PRIMARY).strong());
    ui.separator();

    if state.courses.is_none() {
        ui.spinner();
        return None;
    }
    if state.shows_no_courses() {
        ui.label(RichText::new("No courses available.").color(TEXT_SECONDARY));
        return None;
    }

    ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for course in state.course_cards() {
                if let Some(a) = course_card(ui, course, None) {
                    action = Some(a);
                }
            }
        });
    });

    action
}

/// The signed-in user's courses: taught (teacher) or enrolled (student).
pub fn dashboard_panel(ui: &mut egui::Ui, state: &UiState) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading(RichText::new("Dashboard").color(TEXT_PRIMARY).strong());
        if state.is_teacher() {
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Create course").clicked() {
                    action = Some(UiAction::Navigate(Route::CourseForm { id: None }));
                }
            });
        }
    });
    ui.separator();

    let courses = state.dashboard_courses();
    if courses.is_empty() {
        let text = if state.is_teacher() {
            "You are not teaching any courses yet."
        } else {
            "You are not enrolled in any courses yet."
        };
        ui.label(RichText::new(text).color(TEXT_SECONDARY));
        return action;
    }

    let teacher = state.is_teacher();
    ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for course in courses {
                let manage = if teacher { Some(course.id) } else { None };
                if let Some(a) = course_card(ui, course, manage) {
                    action = Some(a);
                }
            }
        });
    });

    action
}

/// One course card. `manage` adds edit/delete buttons for the owning teacher.
fn course_card(ui: &mut egui::Ui, course: &Course, manage: Option<u64>) -> Option<UiAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH);
            ui.label(RichText::new(&course.title).color(TEXT_PRIMARY).strong());
            ui.label(RichText::new(excerpt(&course.description, 120)).color(TEXT_SECONDARY));
            ui.horizontal(|ui| {
                if ui.button("View").clicked() {
                    action = Some(UiAction::Navigate(Route::CourseDetail { id: course.id }));
                }
                if let Some(id) = manage {
                    if ui.button("Edit").clicked() {
                        action = Some(UiAction::Navigate(Route::CourseForm { id: Some(id) }));
                    }
                    if ui
                        .button(RichText::new("Delete").color(ERROR))
                        .clicked()
                    {
                        action = Some(UiAction::DeleteCourse { course_id: id });
                    }
                }
            });
        });

    action
}

/// Course page: description, enroll button, feedback, and the teacher's
/// enrolled-student list.
pub fn course_detail_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    let Some(course) = state.detail.course.clone() else {
        ui.spinner();
        return None;
    };

    ui.heading(RichText::new(&course.title).color(TEXT_PRIMARY).strong());
    ui.separator();
    ui.label(RichText::new(&course.description).color(TEXT_PRIMARY));
    if let Some(url) = course.image_url.as_deref().filter(|u| !u.is_empty()) {
        ui.hyperlink_to("Course image", url);
    }
    ui.add_space(8.0);

    if state.signed_in && !state.is_teacher() {
        let button = state.detail.enroll_button();
        let fill = if button.enabled { ACCENT } else { BG_SURFACE };
        let clicked = ui
            .add_enabled(
                button.enabled,
                egui::Button::new(RichText::new(button.label).color(TEXT_PRIMARY)).fill(fill),
            )
            .clicked();
        if clicked {
            action = Some(UiAction::Enroll {
                course_id: course.id,
            });
        }
    }

    if state.can_leave_feedback() {
        ui.add_space(12.0);
        ui.label(RichText::new("Leave feedback").color(TEXT_PRIMARY).strong());
        let form = &mut state.detail.feedback;
        ui.add(egui::Slider::new(
            &mut form.rating,
            Feedback::MIN_RATING..=Feedback::MAX_RATING,
        ).text("Rating"));
        ui.add(
            TextEdit::multiline(&mut form.comment)
                .hint_text("Your comment")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        if ui.button("Submit feedback").clicked() {
            action = Some(UiAction::SubmitFeedback(Feedback {
                course: course.id,
                comment: form.comment.trim().to_string(),
                rating: form.rating,
            }));
        }
    } else if state.detail.has_left_feedback {
        ui.label(RichText::new("Thanks for your feedback!").color(SUCCESS));
    }

    if !course.feedback.is_empty() {
        ui.add_space(12.0);
        ui.label(RichText::new("Feedback").color(TEXT_PRIMARY).strong());
        for entry in &course.feedback {
            ui.label(format!("{} / 5  {}", entry.rating, entry.comment));
        }
    }

    if state.is_teacher() && Some(course.instructor) == state.user_id {
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Enrolled students").color(TEXT_PRIMARY).strong());
            if ui.button("Edit course").clicked() {
                action = Some(UiAction::Navigate(Route::CourseForm {
                    id: Some(course.id),
                }));
            }
        });
        let students = state.enrolled_students();
        if students.is_empty() {
            ui.label(RichText::new("No students enrolled.").color(TEXT_SECONDARY));
        }
        for enrollment in students {
            ui.horizontal(|ui| {
                let name = enrollment
                    .student_username
                    .clone()
                    .unwrap_or_else(|| format!("Student #{}", enrollment.student));
                ui.label(name);
                if ui.small_button("Remove").clicked() {
                    action = Some(UiAction::RemoveEnrollment {
                        enrollment_id: enrollment.id,
                    });
                }
            });
        }
    }

    action
}

/// Create / edit form for teachers.
pub fn course_form_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;
    let form = &mut state.course_form;

    let title = if form.id.is_some() {
        "Edit course"
    } else {
        "Create course"
    };
    ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
    ui.separator();

    ui.label("Title");
    ui.add(TextEdit::singleline(&mut form.title).desired_width(f32::INFINITY));
    ui.label("Description");
    ui.add(
        TextEdit::multiline(&mut form.description)
            .desired_rows(6)
            .desired_width(f32::INFINITY),
    );
    ui.label("Image URL");
    ui.add(TextEdit::singleline(&mut form.image_url).desired_width(f32::INFINITY));

    ui.add_space(8.0);
    let can_save = !form.title.trim().is_empty();
    if ui
        .add_enabled(
            can_save,
            egui::Button::new(RichText::new("Save").color(TEXT_PRIMARY))
                .fill(if can_save { ACCENT } else { BG_SURFACE })
                .min_size(Vec2::new(80.0, 0.0)),
        )
        .clicked()
    {
        action = Some(UiAction::SaveCourse {
            id: form.id,
            title: form.title.clone(),
            description: form.description.clone(),
            image_url: form.image_url.clone(),
        });
    }

    action
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
