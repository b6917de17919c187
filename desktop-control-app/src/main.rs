use anyhow::Result;

use desktop_control_app::cli::{Cli, Command, USAGE};
use desktop_control_app::commands;
use desktop_control_app::config::Config;
use desktop_control_app::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = match Cli::parse(std::env::args().skip(1)) {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            eprintln!("{}", USAGE);
            return Ok(());
        }
        Err(err) => {
            eprintln!("{}", USAGE);
            return Err(err);
        }
    };

    let config = Config::load_from(&cli.config_path)?;
    tracing::info!("Desktop control starting");

    match cli.command {
        Command::Health => commands::health::run(&config).await,
        Command::Status {
            force_refresh,
            request_name,
        } => commands::status::run(&config, force_refresh, request_name.as_deref()).await,
        Command::ServeDemo => commands::serve_demo::run(&config).await,
    }
}
