pub mod config;
pub mod cookies;
pub mod errors;
pub mod ident;
pub mod manager;
pub mod request;
pub mod save_handler;
pub mod storage;
pub mod validator;

mod lock;

pub use config::SessionConfig;
pub use errors::SessionError;
pub use manager::{DestroyOptions, SessionManager, SessionStatus};
pub use request::RequestContext;
pub use storage::Storage;
