//! Offline queue command implementations.

use std::time::Duration;

use colored::Colorize;
use tracing::info;

use crate::cli::args::{EnqueueArgs, OutputFormat};
use crate::error::SakaniError;
use crate::features::sync::{
    format_replay_outcome, ActionIntent, ActionKind, Connectivity, ConnectivityProbe, Endpoint,
    Payload, SyncService,
};
use crate::output::{format_actions, format_stats, to_json};

use super::Context;

/// Queue one action.
///
/// # Errors
///
/// Returns an error if the intent is invalid or the queue cannot be opened.
pub async fn enqueue(ctx: &Context, args: EnqueueArgs) -> Result<String, SakaniError> {
    let payload = args.data.as_deref().map(Payload::parse).transpose()?;
    let intent = ActionIntent {
        kind: ActionKind::from_parts(args.kind.into(), payload)?,
        endpoint: Endpoint::parse(args.endpoint)?,
    };
    let action_type = intent.kind.action_type();
    let endpoint = intent.endpoint.clone();

    let (sync, _signal) = ctx.open_sync(Connectivity::Offline)?;
    let id = sync.enqueue(intent).await;
    let pending = sync.len().await;

    match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "id": id,
            "type": action_type,
            "endpoint": endpoint.as_str(),
            "pending": pending,
        })),
        OutputFormat::Pretty => Ok(format!(
            "Queued {} {} {}",
            action_type.to_string().bold(),
            endpoint,
            format!("({id}, {pending} pending)").dimmed()
        )),
    }
}

/// Show queue statistics.
///
/// # Errors
///
/// Returns an error if the queue cannot be opened.
pub async fn status(ctx: &Context) -> Result<String, SakaniError> {
    let (sync, _signal) = ctx.open_sync(Connectivity::Offline)?;
    format_stats(&sync.stats().await, ctx.format)
}

/// List queued actions in replay order.
///
/// # Errors
///
/// Returns an error if the queue cannot be opened.
pub async fn list(ctx: &Context, limit: Option<usize>) -> Result<String, SakaniError> {
    let (sync, _signal) = ctx.open_sync(Connectivity::Offline)?;
    let actions = sync.actions().await;
    let total = actions.len();
    let shown = &actions[..limit.map_or(total, |n| n.min(total))];
    format_actions(shown, total, ctx.format)
}

/// Probe the backend once and replay if it is reachable.
///
/// # Errors
///
/// Returns an error if the backend configuration is invalid or the queue
/// cannot be opened.
pub async fn replay(ctx: &Context) -> Result<String, SakaniError> {
    let probe = ConnectivityProbe::new(&ctx.config.backend)?;
    let state = probe.check().await;
    info!(%state, "connectivity probed");

    let (sync, _signal) = ctx.open_sync(state)?;
    let outcome = sync.replay_all().await;

    match ctx.format {
        OutputFormat::Json => to_json(&outcome),
        OutputFormat::Pretty => Ok(format_replay_outcome(&outcome)),
    }
}

/// Remove every queued action.
///
/// # Errors
///
/// Returns an error without `--force`, or if the queue cannot be opened.
pub async fn clear(ctx: &Context, force: bool) -> Result<String, SakaniError> {
    if !force {
        return Err(SakaniError::Config(
            "Use --force to clear all queued actions".to_string(),
        ));
    }

    let (sync, _signal) = ctx.open_sync(Connectivity::Offline)?;
    let count = sync.len().await;
    sync.clear_all().await;

    match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({ "cleared": count })),
        OutputFormat::Pretty => Ok(format!("Cleared {count} queued actions")),
    }
}

/// Probe periodically and replay automatically until Ctrl-C.
///
/// # Errors
///
/// Returns an error if setup fails or the Ctrl-C handler cannot be installed.
pub async fn watch(ctx: &Context) -> Result<String, SakaniError> {
    let sync_config = &ctx.config.sync;
    let probe = ConnectivityProbe::new(&ctx.config.backend)?;
    let initial = probe.check().await;

    let (sync, signal) = ctx.open_sync(initial)?;
    eprintln!(
        "{} {} ({} pending, Ctrl-C to stop)",
        "Watching".bold(),
        ctx.config.backend.base_url,
        sync.len().await
    );

    if initial.is_online() {
        sync.replay_all().await;
    }

    let service = SyncService::spawn(
        sync.clone(),
        Duration::from_secs(sync_config.replay_interval_secs),
    );
    let prober = probe.spawn(signal, Duration::from_secs(sync_config.probe_interval_secs));

    let interrupted = tokio::signal::ctrl_c().await;

    prober.abort();
    service.shutdown().await;
    interrupted?;

    let pending = sync.len().await;
    match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({ "pending": pending })),
        OutputFormat::Pretty => Ok(format!("Stopped watching; {pending} actions pending")),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::cli::args::ActionKindArg;
    use crate::config::{Config, Paths};

    fn context(temp_dir: &TempDir, format: OutputFormat) -> Context {
        let mut config = Config::default();
        config.backend.base_url = "http://127.0.0.1:9".to_string();
        Context {
            paths: Paths::with_root(temp_dir.path().to_path_buf()),
            config,
            format,
        }
    }

    fn create_args(endpoint: &str, data: Option<&str>) -> EnqueueArgs {
        EnqueueArgs {
            kind: ActionKindArg::Create,
            endpoint: endpoint.to_string(),
            data: data.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_enqueue_then_list() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir, OutputFormat::Json);

        enqueue(&ctx, create_args("/api/properties", Some(r#"{"title":"A"}"#)))
            .await
            .unwrap();
        enqueue(&ctx, create_args("/api/properties", Some(r#"{"title":"B"}"#)))
            .await
            .unwrap();

        let output = list(&ctx, Some(1)).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["count"], 2);
        assert_eq!(parsed["items"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["items"][0]["data"]["title"], "A");
    }

    #[tokio::test]
    async fn test_enqueue_rejects_invalid_input() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir, OutputFormat::Pretty);

        let err = enqueue(&ctx, create_args("/api/properties", None))
            .await
            .unwrap_err();
        assert!(matches!(err, SakaniError::InvalidAction(_)));

        let err = enqueue(&ctx, create_args("  ", Some("{}")))
            .await
            .unwrap_err();
        assert!(matches!(err, SakaniError::InvalidAction(_)));

        let err = enqueue(&ctx, create_args("/api/properties", Some("[1, 2]")))
            .await
            .unwrap_err();
        assert!(matches!(err, SakaniError::InvalidAction(_)));

        assert!(!ctx.paths.database.exists());
    }

    #[tokio::test]
    async fn test_clear_requires_force() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir, OutputFormat::Json);
        enqueue(&ctx, create_args("/api/properties", Some("{}")))
            .await
            .unwrap();

        assert!(clear(&ctx, false).await.is_err());

        let output = clear(&ctx, true).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["cleared"], 1);

        let output = status(&ctx).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["pending"], 0);
    }

    #[tokio::test]
    async fn test_replay_unreachable_backend_keeps_queue() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir, OutputFormat::Json);
        enqueue(&ctx, create_args("/api/properties", Some("{}")))
            .await
            .unwrap();

        let output = replay(&ctx).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["outcome"], "offline");

        let output = status(&ctx).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["pending"], 1);
        assert_eq!(parsed["awaiting_retry"], 0);
    }
}
