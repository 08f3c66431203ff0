use crate::{
    backend::BookingBackend,
    configuration::Configuration,
    error::StoreError,
    http::create_app,
    local_backend::LocalBackend,
    notifier::{MockNotifier, Notifier, TwilioSettings},
    types::{NewReservation, Reservation, ReservationChanges, ReservationFilter},
};
use async_trait::async_trait;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "123";

#[derive(Clone)]
pub struct TestConfiguration {
    pub public_path: PathBuf,
}

impl Configuration for TestConfiguration {
    fn password(&self) -> String {
        TEST_PASSWORD.into()
    }

    fn public_path(&self) -> PathBuf {
        self.public_path.clone()
    }

    fn database_url(&self) -> Option<String> {
        None
    }

    fn port(&self) -> String {
        "0".into()
    }

    fn twilio_settings(&self) -> Option<TwilioSettings> {
        None
    }
}

/// In-memory backend that counts calls and can be switched to failing.
pub struct MockBookingBackendInner {
    pub success: AtomicBool,
    pub calls_to_create_reservation: AtomicU64,
    pub calls_to_reservations: AtomicU64,
    pub calls_to_reservation: AtomicU64,
    pub calls_to_update_reservation: AtomicU64,
    pub calls_to_remove_reservation: AtomicU64,
    pub calls_to_timeslots: AtomicU64,
    pub calls_to_add_timeslot: AtomicU64,
    pub calls_to_remove_timeslot: AtomicU64,
    pub storage: LocalBackend,
}

#[derive(Clone)]
pub struct MockBookingBackend(pub Arc<MockBookingBackendInner>);

impl MockBookingBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockBookingBackendInner {
            success: AtomicBool::new(true),
            calls_to_create_reservation: AtomicU64::default(),
            calls_to_reservations: AtomicU64::default(),
            calls_to_reservation: AtomicU64::default(),
            calls_to_update_reservation: AtomicU64::default(),
            calls_to_remove_reservation: AtomicU64::default(),
            calls_to_timeslots: AtomicU64::default(),
            calls_to_add_timeslot: AtomicU64::default(),
            calls_to_remove_timeslot: AtomicU64::default(),
            storage: LocalBackend::default(),
        }))
    }

    pub fn fail(&self) {
        self.0.success.store(false, Ordering::SeqCst);
    }

    /// Sum of all backend calls, used to check that rejected requests never reach storage.
    pub fn total_calls(&self) -> u64 {
        [
            &self.0.calls_to_create_reservation,
            &self.0.calls_to_reservations,
            &self.0.calls_to_reservation,
            &self.0.calls_to_update_reservation,
            &self.0.calls_to_remove_reservation,
            &self.0.calls_to_timeslots,
            &self.0.calls_to_add_timeslot,
            &self.0.calls_to_remove_timeslot,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }

    fn record(&self, counter: &AtomicU64) -> Result<(), StoreError> {
        counter.fetch_add(1, Ordering::SeqCst);
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(StoreError::Poisoned),
        }
    }
}

#[async_trait]
impl BookingBackend for MockBookingBackend {
    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, StoreError> {
        self.record(&self.0.calls_to_create_reservation)?;
        self.0.storage.create_reservation(reservation).await
    }

    async fn reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.record(&self.0.calls_to_reservations)?;
        self.0.storage.reservations(filter).await
    }

    async fn reservation(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        self.record(&self.0.calls_to_reservation)?;
        self.0.storage.reservation(id).await
    }

    async fn update_reservation(
        &self,
        id: Uuid,
        changes: ReservationChanges,
    ) -> Result<Option<Reservation>, StoreError> {
        self.record(&self.0.calls_to_update_reservation)?;
        self.0.storage.update_reservation(id, changes).await
    }

    async fn remove_reservation(&self, id: Uuid) -> Result<(), StoreError> {
        self.record(&self.0.calls_to_remove_reservation)?;
        self.0.storage.remove_reservation(id).await
    }

    async fn timeslots(&self) -> Result<Vec<String>, StoreError> {
        self.record(&self.0.calls_to_timeslots)?;
        self.0.storage.timeslots().await
    }

    async fn add_timeslot(&self, time: String) -> Result<(), StoreError> {
        self.record(&self.0.calls_to_add_timeslot)?;
        self.0.storage.add_timeslot(time).await
    }

    async fn remove_timeslot(&self, time: String) -> Result<(), StoreError> {
        self.record(&self.0.calls_to_remove_timeslot)?;
        self.0.storage.remove_timeslot(time).await
    }
}

pub fn notifier_succeeding() -> MockNotifier {
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().returning(|_| Ok(()));
    notifier
}

/// Serves the app on an ephemeral port and returns its base url.
pub async fn spawn_app<N: Notifier>(
    backend: MockBookingBackend,
    notifier: N,
    configuration: TestConfiguration,
) -> (JoinHandle<()>, String) {
    let app = create_app(backend, Arc::new(notifier), configuration);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (server, format!("http://{address}"))
}
