use async_trait::async_trait;

use crate::application::ports::notifier::Notifier;

/// Writes user notifications to the log; there is no delivery channel yet.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: &str, message: &str) -> anyhow::Result<()> {
        tracing::info!(user_id, message, "user_notification");
        Ok(())
    }
}
