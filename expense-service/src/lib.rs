pub mod models;
pub mod service;
pub mod session;

pub use service::{AppState, build_router, create_app};
pub use session::{SessionStore, UiSession};
