use crate::{configuration::Configuration, notifier::TwilioSettings};
use clap::Parser;
use std::path::PathBuf;

/// Booking backend for the salon
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct ConfigurationHandler {
    /// Shared secret for the admin routes
    #[arg(long, env = "ADMIN_PASSWORD")]
    password: String,

    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: String,

    /// Without a database url, reservations are kept in memory only
    #[arg(short, long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Directory containing admin.html and other static files
    #[arg(long, env = "PUBLIC_PATH", default_value = "public")]
    public_path: PathBuf,

    #[arg(long, env = "TWILIO_SID")]
    twilio_sid: Option<String>,

    #[arg(long, env = "TWILIO_TOKEN", hide_env_values = true)]
    twilio_token: Option<String>,

    /// Sender number of the SMS notifications
    #[arg(long, env = "TWILIO_PHONE")]
    twilio_phone: Option<String>,

    /// Number receiving a SMS for every new reservation
    #[arg(long, env = "MIREILLE_PHONE")]
    notification_phone: Option<String>,
}

impl ConfigurationHandler {
    /// Reads `.env` (if any), then the command line and environment.
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn password(&self) -> String {
        self.password.clone()
    }

    fn public_path(&self) -> PathBuf {
        self.public_path.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn twilio_settings(&self) -> Option<TwilioSettings> {
        Some(TwilioSettings {
            account_sid: self.twilio_sid.clone()?,
            auth_token: self.twilio_token.clone()?,
            sender: self.twilio_phone.clone()?,
            recipient: self.notification_phone.clone()?,
        })
    }
}
