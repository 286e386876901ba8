use async_trait::async_trait;

use super::style::Provider;
use crate::error::Result;

/// A filled-in prompt ready to send to a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Instruction sent in the system role, for providers that have one
    pub system: Option<String>,
    /// Content sent in the user role
    pub user: String,
}

impl Prompt {
    /// Full prompt text, system part first.
    pub fn full_text(&self) -> String {
        match &self.system {
            Some(system) => format!("{system}\n{}", self.user),
            None => self.user.clone(),
        }
    }
}

/// Information about a model backend
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Which provider this backend talks to
    pub provider: Provider,
    /// Model or endpoint the backend is configured for
    pub target: String,
}

/// Trait for remote model backends
///
/// A backend performs exactly one request per call. Errors are returned,
/// never retried.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Get information about this backend
    fn info(&self) -> BackendInfo;

    /// Send a prompt at the given sampling temperature and return the generated text
    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String>;
}
