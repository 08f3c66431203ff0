use crate::{
    backend::BookingBackend,
    error::StoreError,
    types::{NewReservation, Reservation, ReservationChanges, ReservationFilter},
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};
use uuid::Uuid;

/// Non-persistent backend, used when no database is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    reservations: Arc<Mutex<Vec<Reservation>>>,
    timeslots: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| {
        error!("Local storage lock poisoned");
        StoreError::Poisoned
    })
}

#[async_trait]
impl BookingBackend for LocalBackend {
    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, StoreError> {
        let reservation = reservation.into_reservation(Uuid::new_v4());
        lock(&self.reservations)?.push(reservation.clone());
        debug!(id = %reservation.id, "Reservation stored");
        Ok(reservation)
    }

    async fn reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(lock(&self.reservations)?
            .iter()
            .filter(|reservation| filter.matches(reservation))
            .cloned()
            .collect())
    }

    async fn reservation(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        Ok(lock(&self.reservations)?
            .iter()
            .find(|reservation| reservation.id == id)
            .cloned())
    }

    async fn update_reservation(
        &self,
        id: Uuid,
        changes: ReservationChanges,
    ) -> Result<Option<Reservation>, StoreError> {
        let mut reservations = lock(&self.reservations)?;
        match reservations.iter_mut().find(|reservation| reservation.id == id) {
            Some(reservation) => {
                changes.apply_to(reservation);
                Ok(Some(reservation.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove_reservation(&self, id: Uuid) -> Result<(), StoreError> {
        lock(&self.reservations)?.retain(|reservation| reservation.id != id);
        Ok(())
    }

    async fn timeslots(&self) -> Result<Vec<String>, StoreError> {
        Ok(lock(&self.timeslots)?.clone())
    }

    async fn add_timeslot(&self, time: String) -> Result<(), StoreError> {
        lock(&self.timeslots)?.push(time);
        Ok(())
    }

    async fn remove_timeslot(&self, time: String) -> Result<(), StoreError> {
        lock(&self.timeslots)?.retain(|existing| *existing != time);
        Ok(())
    }
}
