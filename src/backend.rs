use crate::error::StoreError;
use crate::types::{NewReservation, Reservation, ReservationChanges, ReservationFilter};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait BookingBackend: Clone + Send + Sync + 'static {
    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, StoreError>;
    async fn reservations(&self, filter: ReservationFilter)
        -> Result<Vec<Reservation>, StoreError>;
    async fn reservation(&self, id: Uuid) -> Result<Option<Reservation>, StoreError>;
    /// Returns the updated record, `None` if `id` is unknown.
    async fn update_reservation(
        &self,
        id: Uuid,
        changes: ReservationChanges,
    ) -> Result<Option<Reservation>, StoreError>;
    /// Removing an unknown id is not an error.
    async fn remove_reservation(&self, id: Uuid) -> Result<(), StoreError>;

    async fn timeslots(&self) -> Result<Vec<String>, StoreError>;
    async fn add_timeslot(&self, time: String) -> Result<(), StoreError>;
    /// Removes every timeslot labelled `time`.
    async fn remove_timeslot(&self, time: String) -> Result<(), StoreError>;
}
