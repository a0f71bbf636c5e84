use std::{env, net::SocketAddr, path::PathBuf};

const DEFAULT_SETTINGS_PATH: &str = "data/settings.json";
const DEFAULT_RECORDS_PATH: &str = "data/slot_records.csv";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings_path: PathBuf,
    pub records_path: PathBuf,
    pub port: u16,
}

impl AppConfig {
    /// Reads `SLOT_SETTINGS_PATH`, `SLOT_RECORDS_PATH` and `PORT`.
    pub fn from_env() -> Self {
        Self {
            settings_path: path_var("SLOT_SETTINGS_PATH", DEFAULT_SETTINGS_PATH),
            records_path: path_var("SLOT_RECORDS_PATH", DEFAULT_RECORDS_PATH),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn path_var(name: &str, default: &str) -> PathBuf {
    match env::var(name) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(default),
    }
}
