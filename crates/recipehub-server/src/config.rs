use std::time::Duration;

pub use clap::Parser;
use recipehub_app::state::AppConfig;
use recipehub_dal::recipe::RecipeStatus;
use recipehub_types::config::BackendConfig;
use url::Url;

use crate::Result;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "RecipeHub web server")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "RECIPEHUB_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,

    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "RECIPEHUB_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "RECIPEHUB_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the server, as visible to users"
    )]
    pub base_url: Url,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "RECIPEHUB_DEFAULT_PAGE_SIZE",
        default_value = "10",
        value_parser = clap::value_parser!(u32).range(1..=100),
        help = "Default page size of API listings"
    )]
    pub default_page_size: u32,

    #[arg(
        long,
        env = "RECIPEHUB_SECURE_COOKIES",
        help = "Send the session cookie only over HTTPS"
    )]
    pub secure_cookies: bool,

    #[arg(
        long,
        env = "RECIPEHUB_REMEMBER_ME_FOR",
        default_value = "14 days",
        help = "Session lifetime when user asks to be remembered, in human friendly format (e.g. 14d, 12h)",
        value_parser = humantime::parse_duration
    )]
    pub remember_me_for: Duration,

    #[arg(
        long,
        env = "RECIPEHUB_SUBMISSION_STATUS",
        default_value = "published",
        help = "Status of recipes submitted by regular users (published, pending or draft)"
    )]
    pub submission_status: RecipeStatus,

    #[arg(long, env = "RECIPEHUB_CORS", help = "Enable permissive CORS")]
    pub cors: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn database_url(&self) -> String {
        self.backend.database_url()
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        let remember_for = time::Duration::try_from(config.remember_me_for)
            .unwrap_or(time::Duration::days(14));
        AppConfig {
            base_url: config.base_url.clone(),
            default_page_size: config.default_page_size,
            submission_status: config.submission_status,
            remember_for,
        }
    }
}
