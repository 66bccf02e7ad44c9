use recipehub_dal::user::UserRepository;
use recipehub_types::config::BackendConfig;
use tracing::debug;

pub mod change_password;
pub mod create_user;
pub mod set_roles;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

/// Opens (and migrates) the database the backend config points to
pub async fn create_user_repository(backend: &BackendConfig) -> anyhow::Result<UserRepository> {
    let data_dir = backend.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
    }
    let db_url = backend.database_url();
    debug!("Opening database {db_url}");
    let pool = recipehub_dal::new_pool(&db_url).await?;
    recipehub_dal::migrate(&pool).await?;
    Ok(UserRepository::new(pool))
}
