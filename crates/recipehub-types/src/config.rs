use clap::Parser;
use std::path::PathBuf;

/// Storage settings shared by the server and the operator CLI
#[derive(Debug, Clone, Parser)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "RECIPEHUB_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/recipehub.db?mode=rwc, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "RECIPEHUB_DATA_DIR",
        help = "Data directory (database etc.), default is system default like ~/.local/share/recipehub",
        default_value_t = default_data_dir()
    )]
    data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("recipehub"))
        .unwrap_or_else(|| PathBuf::from("recipehub"))
        .to_string_lossy()
        .to_string()
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/recipehub.db?mode=rwc", self.data_dir))
    }
}
