use crate::{
    backend::BookingBackend,
    error::BookingError,
    notifier::Notifier,
    types::{
        NewReservation, Reservation, ReservationChanges, ReservationFilter, DEFAULT_TIMESLOTS,
    },
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Reservation and timeslot operations on top of a backend and a notifier.
pub struct BookingManager<B, N: ?Sized> {
    backend: B,
    notifier: Arc<N>,
}

impl<B: Clone, N: ?Sized> Clone for BookingManager<B, N> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

// Ids are opaque to callers; anything that is not a UUID cannot name a stored record.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

impl<B: BookingBackend, N: Notifier + ?Sized> BookingManager<B, N> {
    pub fn new(backend: B, notifier: Arc<N>) -> Self {
        Self { backend, notifier }
    }

    /// Stores the reservation, then notifies the owner.
    ///
    /// A failed notification does not undo the stored reservation; the caller
    /// still receives the notification error.
    pub async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, BookingError> {
        let summary = reservation.summary();
        let created = self.backend.create_reservation(reservation).await?;
        info!(
            id = %created.id,
            date = %created.date,
            time = %created.time,
            "Reservation created"
        );

        if let Err(err) = self.notifier.notify(&summary).await {
            error!(?err, id = %created.id, "Reservation stored but notification failed");
            return Err(err.into());
        }
        Ok(created)
    }

    pub async fn reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, BookingError> {
        Ok(self
            .backend
            .reservations(filter.without_empty_values())
            .await?)
    }

    pub async fn reservation(&self, id: &str) -> Result<Reservation, BookingError> {
        let Some(uuid) = parse_id(id) else {
            return Err(BookingError::NotFound(id.into()));
        };
        self.backend
            .reservation(uuid)
            .await?
            .ok_or_else(|| BookingError::NotFound(id.into()))
    }

    pub async fn update_reservation(
        &self,
        id: &str,
        changes: ReservationChanges,
    ) -> Result<Reservation, BookingError> {
        let Some(uuid) = parse_id(id) else {
            return Err(BookingError::NotFound(id.into()));
        };
        self.backend
            .update_reservation(uuid, changes)
            .await?
            .ok_or_else(|| BookingError::NotFound(id.into()))
    }

    pub async fn remove_reservation(&self, id: &str) -> Result<(), BookingError> {
        if let Some(uuid) = parse_id(id) {
            self.backend.remove_reservation(uuid).await?;
        }
        Ok(())
    }

    /// Reminders are simulated: the message is only written to the log.
    pub async fn send_reminder(&self, id: &str) -> Result<Reservation, BookingError> {
        let reservation = self.reservation(id).await?;
        info!(
            "📲 Rappel envoyé à {} pour {} à {}",
            reservation.phone, reservation.date, reservation.time
        );
        Ok(reservation)
    }

    /// Configured timeslots, or the default set while none are configured.
    pub async fn timeslots(&self) -> Result<Vec<String>, BookingError> {
        let timeslots = self.backend.timeslots().await?;
        if timeslots.is_empty() {
            return Ok(DEFAULT_TIMESLOTS.iter().map(|time| time.to_string()).collect());
        }
        Ok(timeslots)
    }

    pub async fn add_timeslot(&self, time: Option<String>) -> Result<(), BookingError> {
        let time = time
            .filter(|time| !time.is_empty())
            .ok_or_else(|| BookingError::Validation("heure".into()))?;
        info!(%time, "Adding timeslot");
        self.backend.add_timeslot(time).await?;
        Ok(())
    }

    pub async fn remove_timeslot(&self, time: String) -> Result<(), BookingError> {
        info!(%time, "Removing timeslot");
        self.backend.remove_timeslot(time).await?;
        Ok(())
    }

    /// Times already booked on `date`, whether or not they are configured timeslots.
    pub async fn taken_times(&self, date: Option<String>) -> Result<Vec<String>, BookingError> {
        let date = date
            .filter(|date| !date.is_empty())
            .ok_or_else(|| BookingError::Validation("date".into()))?;
        let reservations = self
            .backend
            .reservations(ReservationFilter::for_date(date))
            .await?;
        Ok(reservations
            .into_iter()
            .map(|reservation| reservation.time)
            .collect())
    }
}
