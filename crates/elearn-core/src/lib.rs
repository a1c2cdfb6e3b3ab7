pub mod api;
pub mod chat;
pub mod event_bus;
pub mod ports;
pub mod session;
