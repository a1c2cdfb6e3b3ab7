//! WASM-target tests for elearn-core.
//!
//! Runs EventBus, AuthSession, ApiClient and ChatView tests under
//! wasm32-unknown-unknown via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use elearn_core::api::ApiClient;
use elearn_core::chat::ChatView;
use elearn_core::event_bus::EventBus;
use elearn_core::ports::*;
use elearn_core::session::{AuthSession, TokenStore};
use elearn_types::chat::*;
use elearn_types::config::ClientConfig;
use elearn_types::event::{ClientEvent, Route};
use elearn_types::session::*;
use elearn_types::{AuthFailure, ClientError};

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

// ─── Mocks ───────────────────────────────────────────────

#[derive(Default)]
struct MockStore(RefCell<HashMap<String, String>>);

impl StoragePort for MockStore {
    fn get(&self, key: &str) -> elearn_types::Result<Option<String>> {
        Ok(self.0.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> elearn_types::Result<()> {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> elearn_types::Result<()> {
        self.0.borrow_mut().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

#[derive(Default)]
struct MockHttp {
    responses: RefCell<VecDeque<HttpResponse>>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl MockHttp {
    fn scripted(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            sent: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl HttpPort for MockHttp {
    async fn send(&self, req: &HttpRequest) -> elearn_types::Result<HttpResponse> {
        self.sent.borrow_mut().push(req.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ClientError::Network("no response".to_string()))
    }
}

struct MockSocket(Rc<RefCell<Vec<String>>>);

impl SocketHandle for MockSocket {
    fn send_text(&self, text: &str) -> elearn_types::Result<()> {
        self.0.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn close(&self) {}
}

#[derive(Default)]
struct MockConnector {
    frames: Rc<RefCell<Vec<String>>>,
    urls: RefCell<Vec<String>>,
}

impl SocketConnector for MockConnector {
    fn connect(&self, url: &str) -> elearn_types::Result<(Box<dyn SocketHandle>, SocketEvents)> {
        self.urls.borrow_mut().push(url.to_string());
        Ok((
            Box::new(MockSocket(self.frames.clone())),
            Box::pin(futures::stream::empty()),
        ))
    }
}

fn session_with(store: Rc<MockStore>, bus: &EventBus) -> Rc<AuthSession> {
    let config = ClientConfig::new("http://localhost:8000");
    Rc::new(AuthSession::new(config, TokenStore::new(store), bus.clone()))
}

fn store_signed_in() -> Rc<MockStore> {
    let store = Rc::new(MockStore::default());
    store.set(ACCESS_TOKEN_KEY, "a0").unwrap();
    store.set(REFRESH_TOKEN_KEY, "r0").unwrap();
    store.set(USER_ID_KEY, "3").unwrap();
    store.set(ROLE_KEY, "student").unwrap();
    store
}

// ─── EventBus Tests ──────────────────────────────────────

#[wasm_bindgen_test]
fn event_bus_new_is_empty() {
    let bus = EventBus::new();
    assert!(!bus.has_pending());
    assert!(bus.drain().is_empty());
}

#[wasm_bindgen_test]
fn event_bus_emit_and_drain() {
    let bus = EventBus::new();
    bus.emit(ClientEvent::success("saved"));
    bus.emit(ClientEvent::navigate(Route::Dashboard));
    assert_eq!(bus.drain().len(), 2);
    assert!(!bus.has_pending());
}

// ─── AuthSession Tests ───────────────────────────────────

#[wasm_bindgen_test]
fn session_reads_stored_identity() {
    let bus = EventBus::new();
    let session = session_with(store_signed_in(), &bus);
    assert!(session.is_authenticated());
    assert_eq!(session.user_id(), Some(3));
    assert_eq!(session.role(), Some(UserRole::Student));
    assert_eq!(session.authorization().as_deref(), Some("Bearer a0"));
}

#[wasm_bindgen_test]
async fn session_refreshes_once_on_401() {
    let bus = EventBus::new();
    let session = session_with(store_signed_in(), &bus);
    let http = MockHttp::scripted(vec![
        HttpResponse::new(401, ""),
        HttpResponse::new(200, r#"{"access":"a1"}"#),
        HttpResponse::new(200, "{}"),
    ]);

    let resp = session
        .execute(&http, HttpRequest::get("http://localhost:8000/api/profile/"))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);

    let sent = http.sent.borrow();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2].header(AUTHORIZATION), Some("Bearer a1"));
    assert_eq!(session.tokens().access_token().as_deref(), Some("a1"));
}

#[wasm_bindgen_test]
async fn session_without_refresh_token_signs_out() {
    let bus = EventBus::new();
    let store = Rc::new(MockStore::default());
    store.set(ACCESS_TOKEN_KEY, "a0").unwrap();
    let session = session_with(store, &bus);
    let http = MockHttp::scripted(vec![HttpResponse::new(401, "")]);

    let req = HttpRequest::get("http://localhost:8000/api/profile/").requiring_auth();
    let err = session.execute(&http, req).await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(AuthFailure::NoRefreshToken)));
    assert_eq!(http.sent.borrow().len(), 1);
    assert!(!session.is_authenticated());
    assert!(bus
        .drain()
        .iter()
        .any(|e| matches!(e, ClientEvent::Navigate { route: Route::Login })));
}

#[wasm_bindgen_test]
async fn login_persists_all_keys() {
    let bus = EventBus::new();
    let store = Rc::new(MockStore::default());
    let session = session_with(store.clone(), &bus);
    let http = MockHttp::scripted(vec![HttpResponse::new(
        200,
        r#"{"access":"a","refresh":"r","user_id":11,"role":"student"}"#,
    )]);

    session.login(&http, "sam", "secret").await.unwrap();
    assert_eq!(store.get(USER_ID_KEY).unwrap().as_deref(), Some("11"));
    assert_eq!(store.get(ROLE_KEY).unwrap().as_deref(), Some("student"));
}

// ─── ApiClient Tests ─────────────────────────────────────

#[wasm_bindgen_test]
async fn enroll_emits_enrolled() {
    let bus = EventBus::new();
    let session = session_with(store_signed_in(), &bus);
    let http = Rc::new(MockHttp::scripted(vec![HttpResponse::new(201, "{}")]));
    let client = ApiClient::new(
        ClientConfig::new("http://localhost:8000"),
        http.clone(),
        session,
        bus.clone(),
    );

    client.enroll(7).await.unwrap();
    assert_eq!(
        http.sent.borrow()[0].url,
        "http://localhost:8000/api/enrollments/"
    );
    assert!(bus
        .drain()
        .iter()
        .any(|e| matches!(e, ClientEvent::Enrolled { course_id: 7 })));
}

// ─── ChatView Tests ──────────────────────────────────────

#[wasm_bindgen_test]
fn chat_view_send_after_open() {
    let bus = EventBus::new();
    let store = store_signed_in();
    let connector = Rc::new(MockConnector::default());
    let mut view = ChatView::new(
        &ClientConfig::new("https://school.example"),
        connector.clone(),
        TokenStore::new(store),
        bus,
    );

    let (id, _events) = view
        .select(ChatTarget::Peer("lee".to_string()))
        .unwrap()
        .unwrap();
    assert_eq!(
        connector.urls.borrow()[0],
        "wss://school.example/ws/chat/lee/?token=a0"
    );

    assert!(view.send("early").is_err());
    view.handle_event(id, SocketEvent::Opened);
    view.send("hello").unwrap();
    assert_eq!(*connector.frames.borrow(), vec![r#"{"message":"hello"}"#]);
}

#[wasm_bindgen_test]
fn chat_view_appends_room_frames() {
    let connector = Rc::new(MockConnector::default());
    let mut view = ChatView::new(
        &ClientConfig::new("http://localhost:8000"),
        connector,
        TokenStore::new(Rc::new(MockStore::default())),
        EventBus::new(),
    );
    let room = ChatTarget::Room("general".to_string());
    let (id, _events) = view.select(room.clone()).unwrap().unwrap();
    view.handle_event(id, SocketEvent::Opened);
    assert!(view.handle_event(id, SocketEvent::Frame(r#"{"message":"hey"}"#.to_string())));

    let log = view.conversation(&room).unwrap();
    assert_eq!(log.messages()[0].text, "hey");
    assert_eq!(log.messages()[0].sender, None);
}
