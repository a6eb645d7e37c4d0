//! JSON output formatting for sakani.

use serde::Serialize;
use serde_json::json;

use crate::error::SakaniError;
use crate::features::sync::{OfflineAction, QueueStats};

/// Format queued actions as JSON
///
/// Each item uses the same field names as the stored snapshot.
///
/// # Errors
///
/// Returns `SakaniError::Json` if JSON serialization fails.
pub fn format_actions_json(actions: &[OfflineAction], total: usize) -> Result<String, SakaniError> {
    let output = json!({
        "count": total,
        "items": actions
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format queue statistics as JSON
///
/// # Errors
///
/// Returns `SakaniError::Json` if JSON serialization fails.
pub fn format_stats_json(stats: &QueueStats) -> Result<String, SakaniError> {
    to_json(stats)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `SakaniError::Json` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, SakaniError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sync::{ActionIntent, Payload};

    fn make_action(endpoint: &str) -> OfflineAction {
        let payload = Payload::parse(r#"{"title":"Villa"}"#).unwrap();
        OfflineAction::from_intent(ActionIntent::create(endpoint, payload).unwrap())
    }

    #[test]
    fn test_format_actions_json() {
        let actions = vec![make_action("/api/properties")];
        let json = format_actions_json(&actions, 3).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["count"], 3);
        assert_eq!(parsed["items"][0]["type"], "CREATE");
        assert_eq!(parsed["items"][0]["endpoint"], "/api/properties");
        assert_eq!(parsed["items"][0]["data"]["title"], "Villa");
        assert_eq!(parsed["items"][0]["retryCount"], 0);
    }

    #[test]
    fn test_format_empty_actions_json() {
        let json = format_actions_json(&[], 0).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["count"], 0);
        assert!(parsed["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_format_stats_json() {
        let json = format_stats_json(&QueueStats {
            pending: 2,
            awaiting_retry: 1,
            oldest: None,
        })
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["pending"], 2);
        assert_eq!(parsed["awaiting_retry"], 1);
        assert!(parsed["oldest"].is_null());
    }
}
