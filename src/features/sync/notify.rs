//! User-facing notifications raised by the offline queue.

use colored::Colorize;

/// Something the user should be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// An action was stored locally.
    Saved,
    /// Connectivity came back.
    Online,
    /// Connectivity was lost.
    Offline,
    /// A replay pass delivered this many actions.
    Synced(usize),
    /// A replay pass left this many actions waiting for another attempt.
    Pending(usize),
}

impl Notification {
    /// Whether this reports a problem rather than progress.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::Offline | Self::Pending(_))
    }
}

fn items(count: usize) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Saved => f.write_str("Saved locally; will sync when back online"),
            Self::Online => f.write_str("Back online; syncing pending changes"),
            Self::Offline => f.write_str("You are offline; changes will be saved locally"),
            Self::Synced(count) => write!(f, "{} synced", items(*count)),
            Self::Pending(count) => write!(f, "{} pending", items(*count)),
        }
    }
}

/// Receives notifications. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to stderr and the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(%notification, "notification");
        if notification.is_warning() {
            eprintln!("{} {}", "!".yellow().bold(), notification.to_string().yellow());
        } else {
            eprintln!("{} {}", "✓".green().bold(), notification);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_messages() {
        assert_eq!(Notification::Synced(1).to_string(), "1 item synced");
        assert_eq!(Notification::Synced(4).to_string(), "4 items synced");
        assert_eq!(Notification::Pending(1).to_string(), "1 item pending");
        assert_eq!(Notification::Pending(0).to_string(), "0 items pending");
    }

    #[test]
    fn test_warning_classification() {
        assert!(Notification::Offline.is_warning());
        assert!(Notification::Pending(2).is_warning());
        assert!(!Notification::Online.is_warning());
        assert!(!Notification::Synced(2).is_warning());
        assert!(!Notification::Saved.is_warning());
    }
}
