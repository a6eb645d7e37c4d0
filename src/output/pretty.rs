use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::features::sync::{ActionType, OfflineAction, QueueStats};

/// Format queued actions as a pretty table
pub fn format_actions_pretty(actions: &[OfflineAction], total: usize) -> String {
    if actions.is_empty() {
        return "Offline queue (0 items)\n  No pending actions".to_string();
    }

    let mut output = if actions.len() < total {
        format!("Offline queue ({} of {} items)\n", actions.len(), total)
    } else {
        format!("Offline queue ({total} items)\n")
    };
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for action in actions {
        let kind = match action.action_type() {
            ActionType::Create => "CREATE".green(),
            ActionType::Update => "UPDATE".yellow(),
            ActionType::Delete => "DELETE".red(),
        };

        let mut line = format!("{kind:<6} {}", action.endpoint.as_str().bold());

        if action.retry_count > 0 {
            line.push_str(&format!(
                "  {}",
                format!("retry {}", action.retry_count).yellow()
            ));
        }

        line.push_str(&format!(
            "  {}",
            relative_age(action.timestamp, Utc::now()).dimmed()
        ));
        line.push_str(&format!("  {}", action.id.as_str().dimmed()));

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format queue statistics
pub fn format_stats_pretty(stats: &QueueStats) -> String {
    let mut lines = Vec::new();

    lines.push("Offline Queue Status".bold().to_string());
    lines.push("─".repeat(40));

    lines.push(format!(
        "  Pending:         {} {}",
        stats.pending,
        if stats.pending > 0 {
            "actions waiting".dimmed()
        } else {
            "".dimmed()
        }
    ));

    lines.push(format!(
        "  Awaiting retry:  {} {}",
        stats.awaiting_retry,
        if stats.awaiting_retry > 0 {
            "failed at least once".yellow()
        } else {
            "".normal()
        }
    ));

    if let Some(oldest) = stats.oldest {
        lines.push(format!(
            "  Oldest:          {}",
            relative_age(oldest, Utc::now()).dimmed()
        ));
    }

    if stats.pending > 0 {
        lines.push(String::new());
        lines.push(
            "Run 'sakani replay' to send pending actions"
                .dimmed()
                .to_string(),
        );
    }

    lines.join("\n")
}

fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(then);
    if age.num_days() > 0 {
        format!("{} days ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{} hours ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{} minutes ago", age.num_minutes())
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::features::sync::{ActionIntent, Payload};

    fn make_action(endpoint: &str) -> OfflineAction {
        let payload = Payload::parse(r#"{"title":"Villa"}"#).unwrap();
        OfflineAction::from_intent(ActionIntent::create(endpoint, payload).unwrap())
    }

    #[test]
    fn test_format_empty_actions() {
        let output = format_actions_pretty(&[], 0);
        assert!(output.contains("0 items"));
        assert!(output.contains("No pending actions"));
    }

    #[test]
    fn test_format_actions_shows_retries() {
        let mut retried = make_action("/api/properties/7");
        retried.retry_count = 2;
        let actions = vec![make_action("/api/properties"), retried];

        let output = format_actions_pretty(&actions, 2);
        assert!(output.contains("Offline queue (2 items)"));
        assert!(output.contains("CREATE"));
        assert!(output.contains("/api/properties/7"));
        assert!(output.contains("retry 2"));
        assert!(output.contains("just now"));
    }

    #[test]
    fn test_format_actions_truncated() {
        let actions = vec![make_action("/api/properties")];
        let output = format_actions_pretty(&actions, 4);
        assert!(output.contains("1 of 4 items"));
    }

    #[test]
    fn test_format_stats() {
        let output = format_stats_pretty(&QueueStats::default());
        assert!(output.contains("Pending:         0"));
        assert!(!output.contains("sakani replay"));

        let output = format_stats_pretty(&QueueStats {
            pending: 3,
            awaiting_retry: 1,
            oldest: Some(Utc::now()),
        });
        assert!(output.contains("Pending:         3"));
        assert!(output.contains("Awaiting retry:  1"));
        assert!(output.contains("sakani replay"));
    }

    #[test]
    fn test_relative_age() {
        let now = Utc::now();
        assert_eq!(relative_age(now, now), "just now");
        assert_eq!(relative_age(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_age(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_age(now - Duration::days(2), now), "2 days ago");
    }
}
