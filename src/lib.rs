pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod records;
pub mod session;
pub mod settings;
pub mod state;
pub mod stats;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use records::RecordStore;
pub use settings::SettingsStore;
pub use state::AppState;
