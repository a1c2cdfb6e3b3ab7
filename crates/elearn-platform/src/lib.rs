//! Browser adapters for the elearn-core ports.
//!
//! Everything here touches `web_sys` and only builds meaningfully for
//! `wasm32-unknown-unknown`.

pub mod http;
pub mod socket;
pub mod storage;

pub use http::FetchHttp;
pub use socket::BrowserSocketConnector;
