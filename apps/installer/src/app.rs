//! Command handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use emuweb_install::{
    CoverOutcome, Device, InstallOptions, InstallOutcome, InstallRequest, Installer, RomTransfer,
    installed_games,
};

use crate::config::Config;

/// Arguments for the install command
#[derive(Args)]
pub struct InstallArgs {
    /// ROM file to install
    #[arg(long)]
    pub rom: PathBuf,

    /// Cover image (any common raster format, stored as cover.png)
    #[arg(long)]
    pub cover: Option<PathBuf>,

    /// Display name written to config.json
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Device category (DS, GBA)
    #[arg(short, long, value_parser = parse_device)]
    pub device: Device,

    /// Public folder (defaults to `public_folder` from the config file)
    #[arg(short, long)]
    pub public: Option<PathBuf>,

    /// Move the ROM instead of copying it
    #[arg(long = "move")]
    pub move_rom: bool,
}

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Device category (DS, GBA)
    #[arg(short, long, value_parser = parse_device)]
    pub device: Device,

    /// Public folder (defaults to `public_folder` from the config file)
    #[arg(short, long)]
    pub public: Option<PathBuf>,
}

fn parse_device(s: &str) -> Result<Device, String> {
    s.parse().map_err(|e: emuweb_install::InstallError| e.to_string())
}

fn resolve_public(config: &Config, cli: Option<PathBuf>) -> Result<PathBuf> {
    config
        .public_folder(cli)
        .context("no public folder given; pass --public or set public_folder in the config file")
}

/// Execute the install command
pub fn install(args: InstallArgs, config: &Config) -> Result<InstallOutcome> {
    let public = resolve_public(config, args.public)?;

    let mut request = InstallRequest::new(&args.rom, args.device, &public).with_name(&args.name);
    if let Some(cover) = args.cover {
        request = request.with_cover(cover);
    }

    let rom_transfer = if args.move_rom || config.move_rom {
        RomTransfer::Move
    } else {
        RomTransfer::Copy
    };
    let installer = Installer::with_options(InstallOptions { rom_transfer });

    let outcome = installer
        .install(&request)
        .with_context(|| format!("failed to install {}", args.rom.display()))?;

    println!(
        "installed {:?} to slot {} in {} category",
        args.name, outcome.slot_id, args.device
    );
    match &outcome.cover {
        CoverOutcome::Failed { reason } => println!("  warning: cover skipped: {reason}"),
        CoverOutcome::Transcoded { from } => println!("  cover converted from {from:?} to PNG"),
        CoverOutcome::Copied | CoverOutcome::NotProvided => {}
    }

    Ok(outcome)
}

/// Execute the list command
pub fn list(args: ListArgs, config: &Config) -> Result<()> {
    let public = resolve_public(config, args.public)?;

    let games = installed_games(&public, args.device)
        .with_context(|| format!("failed to list {} games in {}", args.device, public.display()))?;

    if games.is_empty() {
        println!("no {} games installed", args.device);
        return Ok(());
    }

    for game in games {
        let name = game.name.as_deref().unwrap_or("<no config>");
        let cover = if game.has_cover { " [cover]" } else { "" };
        println!("{:>4}  {name}{cover}", game.slot_id);
    }
    Ok(())
}

/// Execute the devices command
pub fn devices() {
    for device in Device::all() {
        println!("{device}");
    }
}
