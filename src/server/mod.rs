pub mod app;
pub mod locks;
pub mod routes;

pub use app::{AppState, build_app};
