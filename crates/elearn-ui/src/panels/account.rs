//! Profile page, notification list and teacher user search.

use egui::{self, RichText, ScrollArea, TextEdit};

use crate::state::{UiAction, UiState};
use crate::theme::*;

pub fn profile_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    let Some(profile) = &state.profile else {
        ui.spinner();
        return None;
    };

    ui.heading(
        RichText::new(format!("Profile: {}", profile.user.username))
            .color(TEXT_PRIMARY)
            .strong(),
    );
    if let Some(role) = profile.role {
        ui.label(RichText::new(role.as_str()).color(TEXT_SECONDARY));
    }
    if let Some(photo) = profile.profile_photo.as_deref().filter(|p| !p.is_empty()) {
        ui.hyperlink_to("Profile photo", photo);
    }
    ui.separator();

    let form = &mut state.profile_form;
    egui::Grid::new("profile_form")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Email");
            ui.text_edit_singleline(&mut form.email);
            ui.end_row();
            ui.label("First name");
            ui.text_edit_singleline(&mut form.first_name);
            ui.end_row();
            ui.label("Last name");
            ui.text_edit_singleline(&mut form.last_name);
            ui.end_row();
            ui.label("Organisation");
            ui.text_edit_singleline(&mut form.organisation);
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui
            .add(egui::Button::new(RichText::new("Save").color(TEXT_PRIMARY)).fill(ACCENT))
            .clicked()
        {
            action = Some(UiAction::SaveProfile(form.clone()));
        }
        if ui.button("Log out").clicked() {
            action = Some(UiAction::Logout);
        }
    });

    action
}

pub fn notifications_panel(ui: &mut egui::Ui, state: &UiState) {
    ui.heading(RichText::new("Notifications").color(TEXT_PRIMARY).strong());
    ui.separator();

    if state.notifications.is_empty() {
        ui.label(RichText::new("No notifications.").color(TEXT_SECONDARY));
        return;
    }

    ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        for notification in &state.notifications {
            let color = if notification.is_read {
                TEXT_SECONDARY
            } else {
                TEXT_PRIMARY
            };
            egui::Frame::default()
                .fill(BG_SECONDARY)
                .corner_radius(PANEL_ROUNDING)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new(&notification.message).color(color));
                    if let Some(at) = &notification.created_at {
                        ui.label(RichText::new(at).color(TEXT_SECONDARY).small());
                    }
                });
            ui.add_space(4.0);
        }
    });
}

pub fn search_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    ui.heading(RichText::new("Search users").color(TEXT_PRIMARY).strong());
    ui.horizontal(|ui| {
        let response = ui.add(
            TextEdit::singleline(&mut state.search_term).hint_text("Username or email"),
        );
        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Search").clicked() || enter) && !state.search_term.trim().is_empty() {
            action = Some(UiAction::SearchUsers {
                term: state.search_term.trim().to_string(),
            });
        }
    });
    ui.separator();

    for user in &state.search_results {
        ui.horizontal(|ui| {
            ui.label(RichText::new(&user.username).color(TEXT_PRIMARY).strong());
            ui.label(RichText::new(&user.email).color(TEXT_SECONDARY));
        });
    }

    action
}
