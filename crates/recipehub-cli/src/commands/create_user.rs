use clap::Args;
use recipehub_dal::user::CreateUser;
use recipehub_types::{claim::Role, config::BackendConfig, general::ValidEmail};

use crate::commands::{create_user_repository, Executor};

#[derive(Args, Debug)]
pub struct CreateUserCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name, used for login")]
    pub username: String,
    #[arg(short, long, help = "User email, can be used for login too")]
    pub email: ValidEmail,
    #[arg(short, long, help = "User password")]
    pub password: String,
    #[arg(long, help = "Give the user admin role")]
    pub admin: bool,
}

impl CreateUserCmd {
    fn new_user(self) -> CreateUser {
        CreateUser {
            username: self.username,
            email: self.email,
            password: self.password,
            roles: self.admin.then(|| vec![Role::Admin.to_string()]),
        }
    }
}

impl Executor for CreateUserCmd {
    async fn run(self) -> anyhow::Result<()> {
        let repository = create_user_repository(&self.backend).await?;
        let user = repository.create(self.new_user()).await?;
        println!("Created user {} with id {}", user.username, user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliConfig, Command};
    use clap::Parser as _;

    #[tokio::test]
    async fn test_create_admin() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();
        let config = CliConfig::try_parse_from([
            "recipehub-cli",
            "create-user",
            "--data-dir",
            &data_dir,
            "--username",
            "chef",
            "--email",
            "chef@example.com",
            "--password",
            "secret123",
            "--admin",
        ])
        .unwrap();
        let Command::CreateUser(cmd) = config.command else {
            panic!("unexpected command");
        };
        let backend = cmd.backend.clone();
        cmd.run().await.unwrap();

        let repository = create_user_repository(&backend).await.unwrap();
        let user = repository.check_password("chef", "secret123").await.unwrap();
        assert_eq!(user.roles, Some(vec!["admin".to_string()]));
    }
}
