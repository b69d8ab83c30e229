use clap::Parser;
use tracing_subscriber::EnvFilter;
use umrah_portal::cli::Cli;

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL, SESSION_SECRET etc. are picked up locally
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("umrah_portal=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = umrah_portal::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
