use std::sync::Arc;

use crate::error::Result;
use recipehub_dal::{recipe::RecipeStatus, Pool};
use url::Url;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool) -> Self {
        AppState {
            state: Arc::new(AppStateInner { app_config, pool }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn build_url(&self, relative_url: &str) -> Result<Url> {
        let base = &self.config().base_url;
        let url = base.join(relative_url)?;
        Ok(url)
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: Url,
    pub default_page_size: u32,
    /// Status given to recipes submitted by non-admin users
    pub submission_status: RecipeStatus,
    /// Session lifetime when the user ticks "remember me"
    pub remember_for: time::Duration,
}

impl AppConfig {
    pub fn new(base_url: Url) -> Self {
        AppConfig {
            base_url,
            default_page_size: 10,
            submission_status: RecipeStatus::Published,
            remember_for: time::Duration::days(14),
        }
    }
}
