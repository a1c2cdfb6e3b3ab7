pub mod account;
pub mod auth;
pub mod chat;
pub mod courses;
pub mod nav;
