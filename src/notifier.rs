use crate::error::NotificationError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};

const TWILIO_API_URL: &str = "https://api.twilio.com/2010-04-01";

/// One-way text message to the salon owner.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, message: &str) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub sender: String,
    pub recipient: String,
}

pub struct TwilioNotifier {
    client: reqwest::Client,
    settings: TwilioSettings,
    api_url: String,
}

impl TwilioNotifier {
    pub fn new(settings: TwilioSettings) -> Self {
        Self::with_api_url(settings, TWILIO_API_URL)
    }

    pub fn with_api_url(settings: TwilioSettings, api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
            api_url: api_url.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_url.trim_end_matches('/'),
            self.settings.account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.settings.account_sid, Some(&self.settings.auth_token))
            .form(&[
                ("Body", message),
                ("From", self.settings.sender.as_str()),
                ("To", self.settings.recipient.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected(format!(
                "SMS provider answered {status}: {body}"
            )));
        }
        debug!(recipient = %self.settings.recipient, "SMS sent");
        Ok(())
    }
}

/// Stand-in used when no SMS provider is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        info!(text = message, "SMS provider not configured, notification only logged");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::post, Form, Router};
    use std::collections::HashMap;
    use tokio::sync::mpsc;

    fn settings() -> TwilioSettings {
        TwilioSettings {
            account_sid: "AC123".into(),
            auth_token: "secret".into(),
            sender: "+33100000000".into(),
            recipient: "+33600000000".into(),
        }
    }

    type ReceivedForm = (String, HashMap<String, String>);

    async fn fake_provider(status: StatusCode) -> (String, mpsc::UnboundedReceiver<ReceivedForm>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/Accounts/:sid/Messages.json",
            post(move |Path(sid): Path<String>, Form(form): Form<HashMap<String, String>>| {
                let sender = sender.clone();
                async move {
                    sender.send((sid, form)).ok();
                    status
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{address}"), receiver)
    }

    #[tokio::test]
    async fn test_twilio_notifier_posts_message() {
        let (api_url, mut requests) = fake_provider(StatusCode::CREATED).await;
        let notifier = TwilioNotifier::with_api_url(settings(), api_url);

        notifier.notify("Hello").await.unwrap();

        let (sid, form) = requests.recv().await.unwrap();
        assert_eq!(sid, "AC123");
        assert_eq!(form["Body"], "Hello");
        assert_eq!(form["From"], "+33100000000");
        assert_eq!(form["To"], "+33600000000");
    }

    #[tokio::test]
    async fn test_twilio_notifier_reports_rejection() {
        let (api_url, _requests) = fake_provider(StatusCode::BAD_REQUEST).await;
        let notifier = TwilioNotifier::with_api_url(settings(), api_url);

        let err = notifier.notify("Hello").await.unwrap_err();
        assert!(matches!(err, NotificationError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        LogNotifier.notify("Hello").await.unwrap();
    }
}
