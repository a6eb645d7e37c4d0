use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::config::ROOT_ENV;
use crate::features::sync::ActionType;

#[derive(Parser)]
#[command(name = "sakani")]
#[command(about = "Offline action queue for the Sakani real-estate backend")]
#[command(long_about = "sakani - offline action queue

Records create/update/delete requests while the backend is unreachable,
stores them locally, and replays them in order once it is back.

QUICK START:
  sakani enqueue create /api/properties --data '{\"title\":\"Villa\"}'
  sakani status             Show pending actions
  sakani replay             Replay now if the backend is reachable
  sakani watch              Replay automatically until Ctrl-C

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  sakani <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to `general.default_output` from the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Data directory holding config.yaml and sakani.db
    #[arg(long, global = true, env = ROOT_ENV)]
    pub root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue an action for delivery
    ///
    /// The action is stored locally and sent on the next replay.
    /// CREATE and UPDATE require a JSON object payload.
    ///
    /// # Examples
    ///
    ///   sakani enqueue create /api/properties --data '{"title":"Villa"}'
    ///   sakani enqueue update /api/properties/7 --data '{"price":950000}'
    ///   sakani enqueue delete /api/favorites/3
    #[command(alias = "add")]
    Enqueue(EnqueueArgs),

    /// Show queue status
    ///
    /// Displays the pending count, how many actions are awaiting a
    /// retry, and the age of the oldest action.
    Status,

    /// List queued actions in replay order
    #[command(alias = "ls")]
    List {
        /// Maximum actions to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Replay queued actions now
    ///
    /// Probes the backend once; if it is reachable every queued action
    /// is sent in order. Failures are kept for a later replay until
    /// their retries run out.
    Replay,

    /// Remove every queued action
    Clear {
        /// Confirm removal
        #[arg(long)]
        force: bool,
    },

    /// Watch connectivity and replay automatically
    ///
    /// Probes the backend periodically, replays when it comes back and
    /// on a fixed interval while it stays reachable. Runs until Ctrl-C.
    Watch,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// Example: sakani completions bash > ~/.bash_completion.d/sakani
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `enqueue`.
#[derive(Args)]
pub struct EnqueueArgs {
    /// Kind of mutation
    #[arg(value_enum)]
    pub kind: ActionKindArg,

    /// Target endpoint, relative to the backend base URL or absolute
    pub endpoint: String,

    /// JSON object payload (required for create and update)
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

/// Mutation kinds accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKindArg {
    Create,
    Update,
    Delete,
}

impl From<ActionKindArg> for ActionType {
    fn from(kind: ActionKindArg) -> Self {
        match kind {
            ActionKindArg::Create => Self::Create,
            ActionKindArg::Update => Self::Update,
            ActionKindArg::Delete => Self::Delete,
        }
    }
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_enqueue() {
        let cli = Cli::try_parse_from([
            "sakani",
            "enqueue",
            "create",
            "/api/properties",
            "--data",
            r#"{"title":"X"}"#,
        ])
        .unwrap();

        match cli.command {
            Commands::Enqueue(args) => {
                assert_eq!(args.kind, ActionKindArg::Create);
                assert_eq!(args.endpoint, "/api/properties");
                assert_eq!(args.data.as_deref(), Some(r#"{"title":"X"}"#));
            },
            _ => panic!("expected enqueue"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sakani", "status", "-o", "json", "-vv"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_kind_maps_to_action_type() {
        assert_eq!(ActionType::from(ActionKindArg::Update), ActionType::Update);
        assert_eq!(ActionType::from(ActionKindArg::Delete), ActionType::Delete);
    }
}
