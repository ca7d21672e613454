pub mod api;
pub mod config;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;

pub use api::create_router;
pub use state::AppState;
