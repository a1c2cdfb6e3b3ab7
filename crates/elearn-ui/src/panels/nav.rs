//! Top navigation bar and toast area.

use egui::{self, Align, Layout, RichText};

use elearn_types::event::Route;

use crate::state::{UiAction, UiState};
use crate::theme::*;

/// Room opened from the navigation bar
pub const DEFAULT_ROOM: &str = "general";

/// Render the navigation bar. Returns the action for a clicked link.
pub fn nav_bar(ui: &mut egui::Ui, state: &UiState) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(
            RichText::new("E-Learning")
                .strong()
                .color(ACCENT)
                .size(16.0),
        );
        ui.separator();

        let mut link = |ui: &mut egui::Ui, label: &str, route: Route| {
            if ui.selectable_label(state.route == route, label).clicked() {
                action = Some(UiAction::Navigate(route));
            }
        };

        link(ui, "Courses", Route::Courses);
        if state.signed_in {
            link(ui, "Dashboard", Route::Dashboard);
            if state.is_teacher() {
                link(ui, "New course", Route::CourseForm { id: None });
                link(ui, "Search", Route::Search);
            }
            link(ui, "Messages", Route::DirectChat);
            link(
                ui,
                "Chat room",
                Route::ChatRoom {
                    room: DEFAULT_ROOM.to_string(),
                },
            );
            let unread = state.unread_notifications();
            let label = if unread > 0 {
                format!("Notifications ({})", unread)
            } else {
                "Notifications".to_string()
            };
            link(ui, &label, Route::Notifications);
            link(ui, "Profile", Route::Profile);
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if state.signed_in {
                if ui.button("Sign out").clicked() {
                    action = Some(UiAction::SignOut);
                }
                if let Some(role) = state.role {
                    ui.label(RichText::new(role.as_str()).color(TEXT_SECONDARY).small());
                }
            } else {
                if ui.button("Register").clicked() {
                    action = Some(UiAction::Navigate(Route::Register));
                }
                if ui.button("Login").clicked() {
                    action = Some(UiAction::Navigate(Route::Login));
                }
            }
        });
    });

    action
}

/// Stack of transient notices, newest last.
pub fn notices(ui: &mut egui::Ui, state: &UiState) {
    for notice in &state.notices {
        egui::Frame::default()
            .fill(BG_SECONDARY)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&notice.text).color(notice_color(notice.level)));
            });
    }
}
