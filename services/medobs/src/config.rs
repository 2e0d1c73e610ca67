use serde::Deserialize;

use medobs_core::config::Config;

/// MedObs service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct MedobsConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `MEDOBS_PORT`.
    #[serde(default = "default_port")]
    pub medobs_port: u16,
    /// Directory uploaded files are written under. Env var: `MEDIA_ROOT`.
    #[serde(default = "default_media_root")]
    pub media_root: String,
    /// Largest accepted upload request body in bytes (default 50 MiB).
    /// Env var: `MAX_UPLOAD_BYTES`.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_port() -> u16 {
    3120
}

fn default_media_root() -> String {
    "media".to_owned()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

impl Config for MedobsConfig {}
