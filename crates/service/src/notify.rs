//! Outbound SMS/email. No delivery provider is wired in; the default senders log the message.
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

pub fn otp_sms(otp: &str) -> String {
    format!("Your verification code is {otp}. It is valid for 10 minutes. Do not share it with anyone.")
}

#[derive(Debug, Default, Clone)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
        info!(event = "sms_logged", %phone, len = message.len(), "sms queue not configured; message logged only");
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        info!(event = "email_logged", %to, %subject, "email queue not configured; message logged only");
        Ok(())
    }
}

/// Recording senders for tests and local tooling
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingSmsSender {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSmsSender {
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl SmsSender for RecordingSmsSender {
        async fn send_sms(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
            let mut sent = self.sent.lock().map_err(|e| NotifyError::Delivery(e.to_string()))?;
            sent.push((phone.to_string(), message.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_sender_keeps_messages() {
        let s = mock::RecordingSmsSender::default();
        s.send_sms("+911234567", &otp_sms("123456")).await.unwrap();
        let sent = s.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("123456"));
    }

    #[tokio::test]
    async fn log_senders_never_fail() {
        assert!(LogSmsSender.send_sms("+911234567", "hi").await.is_ok());
        assert!(LogEmailSender.send_email("a@b.co", "subject", "body").await.is_ok());
    }
}
