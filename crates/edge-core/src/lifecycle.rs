//! Which half of the render lifecycle the process is running.

use serde::{Deserialize, Serialize};

/// Server render pass or client runtime.
///
/// Hydration only makes sense in one direction: the server dehydrates what it
/// fetched while rendering, the client hydrates it on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeSide {
    /// Server-side rendering pass.
    Server,
    /// Client runtime (browser / WASM).
    Client,
}

impl RuntimeSide {
    /// The side this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_arch = "wasm32") {
            Self::Client
        } else {
            Self::Server
        }
    }

    /// Whether this is the server render pass.
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server)
    }

    /// Whether this is the client runtime.
    pub fn is_client(&self) -> bool {
        matches!(self, Self::Client)
    }
}

impl std::fmt::Display for RuntimeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
        }
    }
}
