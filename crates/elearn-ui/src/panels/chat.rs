//! Chat views: a named room, and direct messages with a user list.

use egui::{self, Align, Color32, Layout, RichText, ScrollArea, SidePanel, Vec2};

use elearn_types::chat::{ChannelState, ChatMessage, ChatTarget};
use elearn_types::event::Route;

use crate::state::{UiAction, UiState};
use crate::theme::*;

/// Group chat for `room`.
pub fn chat_room_panel(ui: &mut egui::Ui, state: &mut UiState, room: &str) -> Option<UiAction> {
    let target = ChatTarget::Room(room.to_string());
    if state.chat.active.as_ref() != Some(&target) {
        return Some(UiAction::SelectChat(target));
    }

    let mut action = None;
    ui.horizontal(|ui| {
        ui.label("Room");
        ui.text_edit_singleline(&mut state.chat.room_input);
        if ui.button("Join").clicked() && !state.chat.room_input.trim().is_empty() {
            action = Some(UiAction::Navigate(Route::ChatRoom {
                room: state.chat.room_input.trim().to_string(),
            }));
        }
    });
    ui.separator();

    if let Some(a) = conversation(ui, state, &target) {
        action = Some(a);
    }
    action
}

/// Direct messages: user directory on the left, selected conversation on the right.
pub fn direct_chat_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    SidePanel::left("chat_users")
        .min_width(180.0)
        .max_width(240.0)
        .show_inside(ui, |ui| {
            ui.label(RichText::new("Users").color(TEXT_PRIMARY).strong());
            let search = ui.text_edit_singleline(&mut state.chat.participant_search);
            if search.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                action = Some(UiAction::SearchParticipants {
                    term: state.chat.participant_search.trim().to_string(),
                });
            }
            ui.separator();

            ScrollArea::vertical().show(ui, |ui| {
                if state.chat.participants.is_empty() {
                    ui.label(RichText::new("No users found.").color(TEXT_SECONDARY));
                }
                for participant in &state.chat.participants {
                    let name = &participant.user.username;
                    let selected =
                        state.chat.active.as_ref().map(|t| t.name()) == Some(name.as_str());
                    if ui.selectable_label(selected, name).clicked() && !selected {
                        action = Some(UiAction::SelectChat(ChatTarget::Peer(name.clone())));
                    }
                }
            });
        });

    match state.chat.active.clone() {
        Some(target) => {
            if let Some(a) = conversation(ui, state, &target) {
                action = Some(a);
            }
        }
        None => {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Select a user to start chatting.").color(TEXT_SECONDARY));
            });
        }
    }

    action
}

/// Header, message log and input for the active conversation.
fn conversation(ui: &mut egui::Ui, state: &mut UiState, target: &ChatTarget) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading(RichText::new(target.to_string()).color(TEXT_PRIMARY).strong());
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            // No automatic reconnect; the user asks for it.
            if state.chat.state == ChannelState::Closed && ui.small_button("Reconnect").clicked() {
                action = Some(UiAction::SelectChat(target.clone()));
            }
            let (text, color) = channel_badge(state.chat.state);
            ui.label(RichText::new(text).color(color).small());
        });
    });
    ui.separator();

    let own_name = state.profile.as_ref().map(|p| p.user.username.clone());
    let available_height = ui.available_height() - 48.0;
    ScrollArea::vertical()
        .max_height(available_height)
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for message in state.chat.log(target) {
                render_message(ui, message, own_name.as_deref());
                ui.add_space(4.0);
            }
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let input = egui::TextEdit::singleline(&mut state.chat.input)
            .hint_text("Type a message...")
            .desired_width(ui.available_width() - 70.0)
            .font(egui::FontId::proportional(14.0));
        let response = ui.add(input);

        let send_enabled = state.chat.can_send();
        let send_btn = ui.add_enabled(
            send_enabled,
            egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                .corner_radius(PANEL_ROUNDING)
                .min_size(Vec2::new(60.0, 0.0)),
        );

        // Submit on Enter or button click
        if (response.lost_focus()
            && ui.input(|i| i.key_pressed(egui::Key::Enter))
            && send_enabled)
            || send_btn.clicked()
        {
            // The input is cleared once the socket accepts the message.
            action = Some(UiAction::SendChat {
                body: state.chat.input.clone(),
            });
            response.request_focus();
        }
    });

    action
}

fn channel_badge(state: ChannelState) -> (&'static str, Color32) {
    match state {
        ChannelState::Connecting => ("connecting…", WARNING),
        ChannelState::Open => ("connected", SUCCESS),
        ChannelState::Closed => ("disconnected", ERROR),
    }
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage, own_name: Option<&str>) {
    let own = own_name.is_some() && message.sender.as_deref() == own_name;
    let bg = if own { OWN_MESSAGE_BG } else { BG_SECONDARY };

    egui::Frame::default()
        .fill(bg)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            if let Some(sender) = &message.sender {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(sender).color(ACCENT).strong().small());
                    if let Some(ts) = &message.timestamp {
                        ui.label(RichText::new(ts).color(TEXT_SECONDARY).small());
                    }
                });
            }
            ui.label(RichText::new(&message.text).color(TEXT_PRIMARY));
        });
}
