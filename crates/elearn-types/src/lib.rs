pub mod chat;
pub mod config;
pub mod course;
pub mod error;
pub mod event;
pub mod session;


pub use error::{AuthFailure, ClientError};
pub type Result<T> = std::result::Result<T, ClientError>;
