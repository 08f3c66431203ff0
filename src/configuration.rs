use crate::notifier::TwilioSettings;
use std::path::PathBuf;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn password(&self) -> String;
    fn public_path(&self) -> PathBuf;
    fn admin_page_path(&self) -> PathBuf {
        self.public_path().join("admin.html")
    }
    fn database_url(&self) -> Option<String>;
    fn port(&self) -> String;
    /// `None` unless every SMS setting is present.
    fn twilio_settings(&self) -> Option<TwilioSettings>;
}
