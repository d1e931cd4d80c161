use axum::async_trait;

/// Outbound SMS dispatch. Notifications go through this for users with a
/// phone number on file.
#[async_trait]
pub trait SmsClient: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> anyhow::Result<()>;
}

/// Stand-in dispatcher until a real provider is wired up; logs instead of
/// sending.
pub struct LogSms;

#[async_trait]
impl SmsClient for LogSms {
    async fn send(&self, phone: &str, message: &str) -> anyhow::Result<()> {
        tracing::info!(%phone, %message, "sms dispatch (stub)");
        Ok(())
    }
}
