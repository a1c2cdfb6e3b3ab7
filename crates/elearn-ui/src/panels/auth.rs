//! Login, registration and the "unauthorized" page.

use egui::{self, RichText, TextEdit, Vec2};

use elearn_types::event::Route;
use elearn_types::session::Registration;

use crate::state::{UiAction, UiState};
use crate::theme::*;

pub fn login_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    form_frame(ui, "Login", |ui| {
        ui.label("Username");
        ui.add(TextEdit::singleline(&mut state.login.username).desired_width(f32::INFINITY));
        ui.label("Password");
        let password = ui.add(
            TextEdit::singleline(&mut state.login.password)
                .password(true)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(8.0);
        let submit = ui
            .add(egui::Button::new(RichText::new("Login").color(TEXT_PRIMARY)).fill(ACCENT))
            .clicked()
            || (password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)));
        if submit {
            action = Some(UiAction::Login {
                username: state.login.username.clone(),
                password: state.login.password.clone(),
            });
        }

        ui.horizontal(|ui| {
            ui.label(RichText::new("No account yet?").color(TEXT_SECONDARY));
            if ui.link("Register").clicked() {
                action = Some(UiAction::Navigate(Route::Register));
            }
        });
    });

    action
}

pub fn register_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    form_frame(ui, "Register", |ui| {
        let form = &mut state.register;
        ui.label("Username");
        ui.add(TextEdit::singleline(&mut form.username).desired_width(f32::INFINITY));
        ui.label("Email");
        ui.add(TextEdit::singleline(&mut form.email).desired_width(f32::INFINITY));
        ui.label("Password");
        ui.add(
            TextEdit::singleline(&mut form.password)
                .password(true)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(8.0);
        if ui
            .add(egui::Button::new(RichText::new("Create account").color(TEXT_PRIMARY)).fill(ACCENT))
            .clicked()
        {
            action = Some(UiAction::Register(Registration {
                username: form.username.trim().to_string(),
                email: form.email.trim().to_string(),
                password: form.password.clone(),
            }));
        }
    });

    action
}

pub fn unauthorized_panel(ui: &mut egui::Ui) -> Option<UiAction> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.heading(RichText::new("Unauthorized").color(ERROR));
        ui.label("You do not have permission to view this page.");
        if ui.button("Back to dashboard").clicked() {
            action = Some(UiAction::Navigate(Route::Dashboard));
        }
    });
    action
}

fn form_frame(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        egui::Frame::default()
            .fill(BG_SECONDARY)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(PANEL_PADDING * 2.0)
            .show(ui, |ui| {
                ui.set_max_size(Vec2::new(320.0, f32::INFINITY));
                ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
                ui.separator();
                ui.vertical(add_contents);
            });
    });
}
