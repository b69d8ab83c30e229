pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "umrah-portal")]
#[command(about = "Umrah Portal - landing page content API and admin dashboard backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Apply the database schema before serving")]
        apply_schema: bool,
    },

    #[command(about = "Hash a password for ADMIN_PASSWORD_HASH")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
    },

    #[command(about = "Create the database tables (idempotent)")]
    InitDb,

    #[command(about = "Issue a session token for scripted access")]
    IssueToken {
        #[arg(long, help = "Admin email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "User id (random if omitted)")]
        id: Option<uuid::Uuid>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        apply_schema: false,
    }) {
        Commands::Serve { port, apply_schema } => commands::serve::handle(port, apply_schema).await,
        Commands::HashPassword { password } => commands::auth::hash_password(&password, &output_format),
        Commands::InitDb => commands::db::init(&output_format).await,
        Commands::IssueToken { email, name, id } => commands::auth::issue_token(&email, &name, id, &output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["umrah-portal"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_issue_token() {
        let cli = Cli::try_parse_from([
            "umrah-portal",
            "--json",
            "issue-token",
            "--email",
            "admin@umrah.example.id",
            "--name",
            "Admin",
        ])
        .unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert!(matches!(cli.command, Some(Commands::IssueToken { id: None, .. })));
    }
}
