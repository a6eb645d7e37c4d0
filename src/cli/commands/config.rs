//! Config command implementation.

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::Config;
use crate::error::SakaniError;
use crate::output::to_json;

use super::Context;

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration cannot be rendered or written.
pub fn config(ctx: &Context, cmd: ConfigCommands) -> Result<String, SakaniError> {
    match cmd {
        ConfigCommands::Show => match ctx.format {
            OutputFormat::Json => to_json(&ctx.config),
            OutputFormat::Pretty => ctx.config.to_yaml(),
        },
        ConfigCommands::Init { force } => init(ctx, force),
    }
}

fn init(ctx: &Context, force: bool) -> Result<String, SakaniError> {
    let path = &ctx.paths.config_file;
    if path.exists() && !force {
        return Err(SakaniError::Config(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        )));
    }

    ctx.paths.ensure_dirs()?;
    Config::default().save_to_path(path)?;

    match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({ "written": path })),
        OutputFormat::Pretty => Ok(format!("Wrote default config to {}", path.display())),
    }
}
