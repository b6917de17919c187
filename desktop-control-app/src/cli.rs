use anyhow::Result;
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

pub const USAGE: &str = "Usage: desktop-control [--config <path>] \
     [health|status [--force] [--request <name>]|serve-demo]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Health,
    Status {
        force_refresh: bool,
        request_name: Option<String>,
    },
    ServeDemo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub config_path: PathBuf,
    pub command: Command,
}

impl Cli {
    /// Parse arguments without the program name. `Ok(None)` means help was requested.
    pub fn parse<I>(args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        let mut command = None;
        let mut force_refresh = false;
        let mut request_name = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => match args.next() {
                    Some(path) => config_path = PathBuf::from(path),
                    None => anyhow::bail!("--config requires a path"),
                },
                "--force" => force_refresh = true,
                "--request" => match args.next() {
                    Some(name) => request_name = Some(name),
                    None => anyhow::bail!("--request requires a name"),
                },
                "-h" | "--help" => return Ok(None),
                other if command.is_none() => command = Some(other.to_string()),
                other => anyhow::bail!("Unexpected argument: {}", other),
            }
        }

        let command = match command.as_deref().unwrap_or("health") {
            "health" => Command::Health,
            "status" => Command::Status {
                force_refresh,
                request_name,
            },
            "serve-demo" => Command::ServeDemo,
            other => anyhow::bail!("Unknown command: {}", other),
        };

        Ok(Some(Self {
            config_path,
            command,
        }))
    }
}
