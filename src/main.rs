use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use sakani_sync::cli::args::{Cli, Commands};
use sakani_sync::cli::commands::{self, Context};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Completions need neither configuration nor a data root.
    let output = match cli.command {
        Commands::Completions { shell } => commands::completions(shell)?,
        command => {
            let ctx =
                Context::load(cli.root, cli.output).context("failed to load configuration")?;
            ctx.config.general.color.apply();
            init_logging(cli.verbose, &ctx.config.general.log_level);
            dispatch(&ctx, command).await?
        },
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

async fn dispatch(ctx: &Context, command: Commands) -> Result<String> {
    let output = match command {
        Commands::Enqueue(args) => commands::enqueue(ctx, args).await?,
        Commands::Status => commands::status(ctx).await?,
        Commands::List { limit } => commands::list(ctx, limit).await?,
        Commands::Replay => commands::replay(ctx).await?,
        Commands::Clear { force } => commands::clear(ctx, force).await?,
        Commands::Watch => commands::watch(ctx).await?,
        Commands::Config(args) => commands::config(ctx, args.command)?,
        Commands::Completions { shell } => commands::completions(shell)?,
    };
    Ok(output)
}

/// `RUST_LOG` wins, then `-v`/`-vv`, then `general.log_level`.
fn init_logging(verbose: u8, configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => configured,
            1 => "info",
            _ => "debug",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
