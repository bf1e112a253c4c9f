pub mod auth;
pub mod chat;

pub use auth::AuthSessionManager;
pub use chat::{ChatSessionRegistry, ProviderFactory};
