use std::sync::Arc;

use crate::bot::Controller;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`; `None` disables the check
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(controller: Arc<Controller>, webhook_secret: Option<String>) -> Self {
        Self {
            controller,
            webhook_secret: webhook_secret.filter(|s| !s.is_empty()).map(Arc::from),
        }
    }
}
