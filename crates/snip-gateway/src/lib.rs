//! HTTP surface of the shortener: create under `/api/v1/urls`, resolve by
//! redirecting from `/{code}`.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
