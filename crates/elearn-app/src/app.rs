//! Main egui application: routes views, dispatches UI actions to the
//! client core and pumps chat sockets.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use egui::{self, CentralPanel, TopBottomPanel};
use futures::StreamExt;

use elearn_core::api::ApiClient;
use elearn_core::chat::ChatView;
use elearn_core::event_bus::EventBus;
use elearn_core::ports::{HttpPort, SocketEvents, StoragePort};
use elearn_core::session::{AuthSession, TokenStore};
use elearn_platform::storage::{auto_detect_storage, MemoryStorage};
use elearn_platform::{BrowserSocketConnector, FetchHttp};
use elearn_types::chat::{ChannelState, ChatTarget, ConnectionId};
use elearn_types::config::ClientConfig;
use elearn_types::event::{ClientEvent, Route};
use elearn_types::session::UserRole;
use elearn_ui::panels::{account, auth, chat, courses, nav};
use elearn_ui::state::{UiAction, UiState};
use elearn_ui::theme;

/// Base URLs baked in at build time, falling back to `ClientConfig::default()`.
fn client_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(api_base) = option_env!("ELEARN_API_BASE") {
        config.api_base = api_base.to_string();
    }
    if let Some(ws_base) = option_env!("ELEARN_WS_BASE") {
        config = config.with_ws_base(ws_base);
    }
    config
}

/// Roles allowed on a route; `None` means any signed-in user.
fn allowed_roles(route: &Route) -> Option<&'static [UserRole]> {
    match route {
        Route::CourseForm { .. } | Route::Search => Some(&[UserRole::Teacher]),
        _ => None,
    }
}

/// The main application state
pub struct ClientApp {
    ui_state: UiState,
    event_bus: EventBus,
    session: Rc<AuthSession>,
    api: Rc<ApiClient>,
    chat: Rc<RefCell<ChatView>>,
    current_route: Option<Route>,
    first_frame: bool,
}

impl ClientApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = client_config();
        log::info!("API base: {}, WebSocket base: {}", config.api_base, config.ws_base());

        let event_bus = EventBus::new();
        let storage: Rc<dyn StoragePort> = match auto_detect_storage(&config.storage) {
            Ok(storage) => storage,
            Err(e) => {
                event_bus.emit(ClientEvent::error(format!(
                    "Session storage unavailable ({}); you will be signed out on reload.",
                    e
                )));
                Rc::new(MemoryStorage::new())
            }
        };
        let tokens = TokenStore::new(storage);
        let session = Rc::new(AuthSession::new(
            config.clone(),
            tokens.clone(),
            event_bus.clone(),
        ));

        let http: Rc<dyn HttpPort> = Rc::new(FetchHttp::new());
        let api = Rc::new(ApiClient::new(
            config.clone(),
            http,
            session.clone(),
            event_bus.clone(),
        ));
        let chat = Rc::new(RefCell::new(ChatView::new(
            &config,
            Rc::new(BrowserSocketConnector::new()),
            tokens,
            event_bus.clone(),
        )));

        let mut ui_state = UiState::new();
        ui_state.set_identity(session.is_authenticated(), session.role(), session.user_id());

        Self {
            ui_state,
            event_bus,
            session,
            api,
            chat,
            current_route: None,
            first_frame: true,
        }
    }

    fn sync_identity(&mut self) {
        self.ui_state.set_identity(
            self.session.is_authenticated(),
            self.session.role(),
            self.session.user_id(),
        );
    }

    /// Run `task` on the browser event loop and repaint when it finishes.
    /// Failures have already been reported on the event bus.
    fn spawn<F>(ctx: &egui::Context, task: F)
    where
        F: Future<Output = elearn_types::Result<()>> + 'static,
    {
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = task.await {
                log::debug!("Background task failed: {}", e);
            }
            ctx.request_repaint();
        });
    }

    /// Apply the route guard, switch view and load what the view shows.
    fn enter(&mut self, requested: Route, ctx: &egui::Context) {
        let allowed = allowed_roles(&requested);
        let route = self.session.resolve_route(requested, allowed);

        let keeps_chat = self
            .current_route
            .as_ref()
            .is_some_and(|previous| previous.keeps_chat_view(&route));
        if !keeps_chat {
            self.chat.borrow_mut().close();
        }
        self.ui_state.open(route.clone());
        self.current_route = Some(route.clone());

        let api = self.api.clone();
        let signed_in = self.session.is_authenticated();
        let student = self.session.role() == Some(UserRole::Student);
        match route {
            Route::Courses => Self::spawn(ctx, async move { api.list_courses().await.map(|_| ()) }),
            Route::Dashboard => Self::spawn(ctx, async move {
                api.list_courses().await?;
                api.list_enrollments().await.map(|_| ())
            }),
            Route::CourseDetail { id } => Self::spawn(ctx, async move {
                api.get_course(id).await?;
                if signed_in {
                    api.list_enrollments().await?;
                }
                if student {
                    api.has_left_feedback(id).await?;
                }
                Ok(())
            }),
            Route::CourseForm { id: Some(id) } => {
                Self::spawn(ctx, async move { api.get_course(id).await.map(|_| ()) })
            }
            Route::Profile => Self::spawn(ctx, async move { api.get_profile().await.map(|_| ()) }),
            Route::Notifications => Self::spawn(ctx, async move {
                api.list_notifications().await.map(|_| ())
            }),
            Route::DirectChat => Self::spawn(ctx, async move {
                api.list_participants("").await?;
                api.get_profile().await.map(|_| ())
            }),
            _ => {}
        }
    }

    fn dispatch(&mut self, action: UiAction, ctx: &egui::Context) {
        let api = self.api.clone();
        match action {
            UiAction::Navigate(route) => self.enter(route, ctx),
            UiAction::Login { username, password } => Self::spawn(ctx, async move {
                api.login(&username, &password).await
            }),
            UiAction::Register(registration) => {
                Self::spawn(ctx, async move { api.register(&registration).await })
            }
            UiAction::Logout => {
                self.chat.borrow_mut().close();
                Self::spawn(ctx, async move { api.logout().await });
            }
            UiAction::SignOut => {
                self.chat.borrow_mut().close();
                self.session.sign_out_local();
            }
            UiAction::Enroll { course_id } => {
                self.ui_state.begin_enroll();
                Self::spawn(ctx, async move {
                    api.enroll(course_id).await?;
                    api.list_enrollments().await.map(|_| ())
                });
            }
            UiAction::RemoveEnrollment { enrollment_id } => Self::spawn(ctx, async move {
                api.remove_enrollment(enrollment_id).await
            }),
            UiAction::SaveCourse {
                id,
                title,
                description,
                image_url,
            } => {
                let draft = api.draft_course(&title, &description, &image_url);
                match draft {
                    Ok(draft) => Self::spawn(ctx, async move {
                        api.save_course(id, &draft).await?;
                        api.list_courses().await.map(|_| ())
                    }),
                    Err(e) => {
                        log::warn!("Invalid course form: {}", e);
                        self.event_bus
                            .emit(ClientEvent::error("Please fill in the course title."));
                    }
                }
            }
            UiAction::DeleteCourse { course_id } => Self::spawn(ctx, async move {
                api.delete_course(course_id).await?;
                api.list_courses().await.map(|_| ())
            }),
            UiAction::SubmitFeedback(feedback) => Self::spawn(ctx, async move {
                api.submit_feedback(&feedback).await?;
                api.get_course(feedback.course).await.map(|_| ())
            }),
            UiAction::SaveProfile(update) => Self::spawn(ctx, async move {
                api.update_profile(&update).await?;
                api.get_profile().await.map(|_| ())
            }),
            UiAction::SearchUsers { term } => Self::spawn(ctx, async move {
                api.search_users(&term).await.map(|_| ())
            }),
            UiAction::SearchParticipants { term } => Self::spawn(ctx, async move {
                api.list_participants(&term).await.map(|_| ())
            }),
            UiAction::SelectChat(target) => self.select_chat(target, ctx),
            UiAction::SendChat { body } => {
                let sent = self.chat.borrow().send(&body);
                match sent {
                    Ok(()) => self.ui_state.chat.message_sent(&body),
                    Err(e) => log::warn!("Chat message not sent: {}", e),
                }
            }
        }
    }

    fn select_chat(&mut self, target: ChatTarget, ctx: &egui::Context) {
        self.ui_state.select_chat(target.clone());
        let selected = self.chat.borrow_mut().select(target);
        match selected {
            Ok(Some((id, events))) => Self::pump_socket(self.chat.clone(), id, events, ctx),
            Ok(None) => {}
            Err(e) => {
                log::error!("Chat connect failed: {}", e);
                self.ui_state.chat.state = ChannelState::Closed;
            }
        }
    }

    /// Forward one connection's transport events into the chat view, in order.
    fn pump_socket(
        chat: Rc<RefCell<ChatView>>,
        id: ConnectionId,
        mut events: SocketEvents,
        ctx: &egui::Context,
    ) {
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            while let Some(event) = events.next().await {
                chat.borrow_mut().handle_event(id, event);
                ctx.request_repaint();
            }
            log::debug!("Socket stream {:?} ended", id);
        });
    }
}

impl eframe::App for ClientApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
            let start = if self.session.is_authenticated() {
                Route::Dashboard
            } else {
                Route::Courses
            };
            self.enter(start, ctx);
        }

        // Drain events from the client core
        if self.event_bus.has_pending() {
            let events = self.event_bus.drain();
            self.ui_state.process_events(events);
            self.sync_identity();
            ctx.request_repaint();
        }

        // Navigation requested by the core goes through the guard too.
        if self.current_route.as_ref() != Some(&self.ui_state.route) {
            let route = self.ui_state.route.clone();
            self.enter(route, ctx);
        }

        self.ui_state.expire_notices(chrono::Utc::now());
        if !self.ui_state.notices.is_empty() {
            ctx.request_repaint_after(std::time::Duration::from_millis(500));
        }

        let mut action = None;

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            action = nav::nav_bar(ui, &self.ui_state);
        });

        // ── Notices ──────────────────────────────────────────
        if !self.ui_state.notices.is_empty() {
            TopBottomPanel::bottom("notices").show(ctx, |ui| {
                nav::notices(ui, &self.ui_state);
            });
        }

        // ── Main content ─────────────────────────────────────
        CentralPanel::default().show(ctx, |ui| {
            let state = &mut self.ui_state;
            let view_action = match state.route.clone() {
                Route::Login => auth::login_panel(ui, state),
                Route::Register => auth::register_panel(ui, state),
                Route::Unauthorized => auth::unauthorized_panel(ui),
                Route::Courses => courses::course_list_panel(ui, state),
                Route::Dashboard => courses::dashboard_panel(ui, state),
                Route::CourseDetail { .. } => courses::course_detail_panel(ui, state),
                Route::CourseForm { .. } => courses::course_form_panel(ui, state),
                Route::Profile => account::profile_panel(ui, state),
                Route::Notifications => {
                    account::notifications_panel(ui, state);
                    None
                }
                Route::Search => account::search_panel(ui, state),
                Route::ChatRoom { room } => chat::chat_room_panel(ui, state, &room),
                Route::DirectChat => chat::direct_chat_panel(ui, state),
            };
            if view_action.is_some() {
                action = view_action;
            }
        });

        if let Some(action) = action {
            self.dispatch(action, ctx);
        }
    }
}
