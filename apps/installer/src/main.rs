//! EmulatorWeb game installer.
//!
//! Copies a ROM, an optional cover and a `config.json` into the next free
//! slot of `<public>/rom/<DEVICE>/`.
//!
//! ```bash
//! emuweb-installer install --rom "Golden Sun.gba" --cover box.bmp \
//!     --name "Golden Sun" --device GBA --public /srv/emuweb/public
//! emuweb-installer list --device GBA
//! ```

mod app;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Install games into an EmulatorWeb public folder
#[derive(Parser)]
#[command(name = "emuweb-installer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a ROM into the next free slot
    Install(app::InstallArgs),

    /// List installed games of a device category
    List(app::ListArgs),

    /// Print the supported device codes
    Devices,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse(), load_config)
}

/// Dispatches a command. Only commands that touch a public folder load the
/// config file, so `devices` works without a writable home directory.
fn run(cli: Cli, load_config: impl FnOnce() -> Result<config::Config>) -> Result<()> {
    match cli.command {
        Commands::Install(args) => {
            app::install(args, &load_config()?)?;
            Ok(())
        }
        Commands::List(args) => app::list(args, &load_config()?),
        Commands::Devices => {
            app::devices();
            Ok(())
        }
    }
}

fn load_config() -> Result<config::Config> {
    let config = config::Config::load()?;
    tracing::debug!(public_folder = %config.public_folder, "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable_config() -> Result<config::Config> {
        anyhow::bail!("config directory is not writable")
    }

    #[test]
    fn devices_does_not_load_config() {
        let cli = Cli::try_parse_from(["emuweb-installer", "devices"]).unwrap();
        assert!(run(cli, unavailable_config).is_ok());
    }

    #[test]
    fn list_reports_config_failure() {
        let cli = Cli::try_parse_from(["emuweb-installer", "list", "--device", "GBA"]).unwrap();
        let err = run(cli, unavailable_config).unwrap_err();
        assert!(err.to_string().contains("not writable"));
    }

    #[test]
    fn unknown_device_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["emuweb-installer", "list", "--device", "N64"]);
        assert!(result.is_err());
    }
}
