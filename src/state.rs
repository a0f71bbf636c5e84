use crate::models::Settings;
use crate::records::RecordStore;
use crate::session::SessionState;
use crate::settings::SettingsStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub settings_store: Arc<SettingsStore>,
    pub settings: Arc<Mutex<Settings>>,
    pub records: Arc<RecordStore>,
    pub session: Arc<Mutex<SessionState>>,
}

impl AppState {
    pub fn new(settings_store: SettingsStore, settings: Settings, records: RecordStore) -> Self {
        Self {
            settings_store: Arc::new(settings_store),
            settings: Arc::new(Mutex::new(settings)),
            records: Arc::new(records),
            session: Arc::new(Mutex::new(SessionState::default())),
        }
    }
}
