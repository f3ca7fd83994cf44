use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use storage::dto::transfer::ImportMode;
use storage::repository::{TransferRepository, backup_file_name};

use super::Context;
use crate::error::{CliError, CliResult};

#[derive(Subcommand)]
pub enum DataCommand {
    /// Write a backup of all players and races
    Export {
        /// Target file, `-` for stdout. Defaults to a dated file in the data directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Restore a backup
    Import {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t)]
        mode: ModeArg,

        /// Confirm that replace mode erases the current data
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ModeArg {
    #[default]
    Merge,
    Replace,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Merge => Self::Merge,
            ModeArg::Replace => Self::Replace,
        }
    }
}

pub fn run(ctx: &mut Context, command: DataCommand) -> CliResult<()> {
    ctx.require_admin()?;

    match command {
        DataCommand::Export { output } => {
            let json = TransferRepository::new(&mut ctx.db).export_json()?;
            let target = output
                .unwrap_or_else(|| ctx.data_dir.join(backup_file_name(Utc::now().date_naive())));
            if target.as_os_str() == "-" {
                println!("{}", json);
                return Ok(());
            }
            fs::write(&target, json)?;
            tracing::info!(path = %target.display(), "Backup written");
            println!("Backup written to {}", target.display());
        }
        DataCommand::Import { file, mode, yes } => {
            let mode = ImportMode::from(mode);
            if mode == ImportMode::Replace && !yes {
                return Err(CliError::BadRequest(
                    "Replace erases all current players and races; pass --yes to confirm".to_string(),
                ));
            }

            let json = fs::read_to_string(&file)?;
            let summary = TransferRepository::new(&mut ctx.db).import(&json, mode)?;
            if ctx.json {
                return ctx.print_json(&summary);
            }
            println!("{}", summary);
        }
    }
    Ok(())
}
