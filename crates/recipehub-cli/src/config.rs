use clap::{Parser, Subcommand};

use crate::commands::{
    change_password::ChangePasswordCmd, create_user::CreateUserCmd, set_roles::SetRolesCmd,
};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for RecipeHub - operator commands working directly against the database."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Creates a new user account
    CreateUser(CreateUserCmd),
    /// Sets a new password for the user
    ChangePassword(ChangePasswordCmd),
    /// Replaces roles of the user, e.g. promotes to admin
    SetRoles(SetRolesCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::CreateUser(cmd) => cmd.run().await,
            Command::ChangePassword(cmd) => cmd.run().await,
            Command::SetRoles(cmd) => cmd.run().await,
        }
    }
}
