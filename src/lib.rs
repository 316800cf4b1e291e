// VQA Storage - object storage gateway for the VQA platform front-end

pub mod cli;
pub mod config;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use storage::FileStore;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
