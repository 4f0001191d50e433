use std::sync::Arc;

use super::SessionManager;
use crate::config::SessionConfig;
use crate::cookies::{CookieJar, CookieSinkHandle};
use crate::request::RequestContext;
use crate::save_handler::{InMemorySaveHandler, SaveHandlerHandle};
use crate::storage::StorageArena;
use crate::validator::{ValidatorChain, ValidatorHandle};

/// Builder for [`SessionManager`].
///
/// Anything not supplied falls back to an in-memory default: an
/// [`InMemorySaveHandler`], a fresh [`StorageArena`], a [`CookieJar`] and an
/// empty [`RequestContext`].
#[derive(Default)]
pub struct SessionManagerBuilder {
    config: Option<SessionConfig>,
    save_handler: Option<SaveHandlerHandle>,
    arena: Option<Arc<StorageArena>>,
    cookies: Option<CookieSinkHandle>,
    request: Option<RequestContext>,
    validators: Vec<ValidatorHandle>,
}

impl SessionManager {
    /// Entry point to start building a manager.
    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::default()
    }
}

impl SessionManagerBuilder {
    pub fn config(mut self, cfg: SessionConfig) -> Self {
        self.config = Some(cfg);
        self
    }

    pub fn save_handler(mut self, handler: SaveHandlerHandle) -> Self {
        self.save_handler = Some(handler);
        self
    }

    /// Shares session state with every other manager built on the same arena.
    pub fn arena(mut self, arena: Arc<StorageArena>) -> Self {
        self.arena = Some(arena);
        self
    }

    pub fn cookies(mut self, sink: CookieSinkHandle) -> Self {
        self.cookies = Some(sink);
        self
    }

    pub fn request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    /// Attaches a validator after the configured ones.
    pub fn validator(mut self, validator: ValidatorHandle) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn build(self) -> SessionManager {
        let config = self.config.unwrap_or_default();

        let mut chain = ValidatorChain::from_kinds(&config.effective_validators());
        for validator in self.validators {
            chain.attach(validator);
        }

        SessionManager::new(
            config,
            self.save_handler.unwrap_or_else(|| Arc::new(InMemorySaveHandler::new())),
            self.arena.unwrap_or_default(),
            self.cookies.unwrap_or_else(|| Arc::new(CookieJar::new())),
            self.request.unwrap_or_default(),
            chain,
        )
    }
}
