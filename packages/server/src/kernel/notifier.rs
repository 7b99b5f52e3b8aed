use tracing::{info, warn};

use super::{BaseNotifier, NoticeLevel};

/// Notifier for the server process: user-facing messages go to the log.
///
/// GraphQL responses carry the same message back to the client, so nothing
/// is pushed anywhere else.
pub struct TracingNotifier;

impl BaseNotifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => info!(notice = message, "User notice"),
            NoticeLevel::Error => warn!(notice = message, "User notice"),
        }
    }
}
