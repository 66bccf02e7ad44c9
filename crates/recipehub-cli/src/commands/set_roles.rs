use clap::Args;
use recipehub_types::{claim::Role, config::BackendConfig};

use crate::commands::{create_user_repository, Executor};

#[derive(Args, Debug)]
pub struct SetRolesCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name or email")]
    pub login: String,
    #[arg(short, long, num_args = 0.., value_delimiter = ',',
        help = "Roles of the user, comma separated or used multiple times, no roles removes all")]
    pub roles: Vec<Role>,
}

impl Executor for SetRolesCmd {
    async fn run(self) -> anyhow::Result<()> {
        let repository = create_user_repository(&self.backend).await?;
        let user = repository.set_roles(&self.login, &self.roles).await?;
        println!(
            "Roles of {} are now: {}",
            user.username,
            user.roles.unwrap_or_default().join(", ")
        );
        Ok(())
    }
}
