pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "usergate-api")]
#[command(about = "User management API with token authentication and role-gated access")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create an ADMIN account and print its access token")]
    CreateAdmin {
        #[arg(long, help = "Email address of the new admin")]
        email: String,
        #[arg(long, help = "Password of the new admin")]
        password: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle().await,
        Commands::CreateAdmin { email, password } => commands::admin::handle(email, password).await,
    }
}
