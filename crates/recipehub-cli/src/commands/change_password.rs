use clap::Args;
use recipehub_types::config::BackendConfig;

use crate::commands::{create_user_repository, Executor};

#[derive(Args, Debug)]
pub struct ChangePasswordCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name or email")]
    pub login: String,
    #[arg(short, long, help = "New user password")]
    pub password: String,
}

impl Executor for ChangePasswordCmd {
    async fn run(self) -> anyhow::Result<()> {
        let repository = create_user_repository(&self.backend).await?;
        repository
            .change_password(&self.login, &self.password)
            .await?;
        println!("Password of {} changed", self.login);
        Ok(())
    }
}
