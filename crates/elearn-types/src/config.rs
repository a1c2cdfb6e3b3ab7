use serde::{Deserialize, Serialize};

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST base URL, e.g. `http://localhost:8000`
    pub api_base: String,
    /// WebSocket base URL. Derived from `api_base` when absent.
    #[serde(default)]
    pub ws_base: Option<String>,
    pub storage: StorageConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            ws_base: None,
            storage: StorageConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Self::default()
        }
    }

    pub fn with_ws_base(mut self, ws_base: impl Into<String>) -> Self {
        self.ws_base = Some(ws_base.into());
        self
    }

    /// Full URL for an API path (path must start with `/`).
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    /// WebSocket base: explicit value, or `api_base` with its scheme swapped.
    pub fn ws_base(&self) -> String {
        if let Some(ref ws) = self.ws_base {
            return ws.trim_end_matches('/').to_string();
        }
        let base = self.api_base.trim_end_matches('/');
        if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackendType {
    /// Auto-detect best available backend
    Auto,
    Memory,
    LocalStorage,
}

const DEFAULT_API_BASE: &str = "http://localhost:8000";
