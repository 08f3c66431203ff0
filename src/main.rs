use std::{sync::Arc, time::Duration};

use crate::{
    configuration::Configuration,
    configuration_handler::ConfigurationHandler,
    database_interface::DatabaseInterface,
    http::create_app,
    local_backend::LocalBackend,
    notifier::{LogNotifier, Notifier, TwilioNotifier},
};
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod auth;
mod backend;
mod booking_manager;
mod configuration;
mod configuration_handler;
mod database_interface;
mod error;
mod http;
mod local_backend;
mod notifier;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Salon booking backend starting");

    let configuration = ConfigurationHandler::parse_arguments();

    let notifier: Arc<dyn Notifier> = match configuration.twilio_settings() {
        Some(settings) => {
            info!(recipient = %settings.recipient, "SMS notifications enabled");
            Arc::new(TwilioNotifier::new(settings))
        }
        None => {
            warn!("SMS settings incomplete, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Accessible at http://{address}");

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseInterface::new(&database_url) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection. Retry in 1 sec. You may want to restart without a database url (reservations kept in memory only).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        create_app(backend, notifier, configuration)
    } else {
        warn!("No database configured, reservations are kept in memory only");
        create_app(LocalBackend::default(), notifier, configuration)
    };

    axum::serve(listener, app).await
}
