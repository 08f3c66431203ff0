use crate::{
    backend::BookingBackend,
    error::StoreError,
    schema::{reservations, timeslots},
    types::{NewReservation, Reservation, ReservationChanges, ReservationFilter},
};
use async_trait::async_trait;
use diesel::{
    r2d2::{ConnectionManager, Pool, PoolError},
    ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, QueryResult, RunQueryDsl,
    SelectableHelper,
};
use std::time::Duration;
use tracing::error;
use uuid::Uuid;

type ConnectionPool = Pool<ConnectionManager<PgConnection>>;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL backend. Run the migrations in `migrations/` before first use.
///
/// Every query checks out its own pooled connection, so concurrent requests
/// don't wait on each other and broken connections are replaced.
#[derive(Clone)]
pub struct DatabaseInterface {
    pool: ConnectionPool,
}

impl DatabaseInterface {
    /// Fails if no connection can be established within the timeout.
    pub fn new(database_url: &str) -> Result<Self, PoolError> {
        let pool = Pool::builder()
            .connection_timeout(CONNECTION_TIMEOUT)
            .test_on_check_out(true)
            .build(ConnectionManager::new(database_url))?;
        Ok(Self { pool })
    }

    /// Runs a blocking diesel call off the async runtime.
    async fn run<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get()?;
            query(&mut connection).map_err(StoreError::from)
        })
        .await?
        .inspect_err(|err| error!(%err, "Database operation failed"))
    }
}

#[async_trait]
impl BookingBackend for DatabaseInterface {
    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, StoreError> {
        let reservation = reservation.into_reservation(Uuid::new_v4());
        self.run(move |connection| {
            diesel::insert_into(reservations::table)
                .values(&reservation)
                .returning(Reservation::as_returning())
                .get_result(connection)
        })
        .await
    }

    async fn reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.run(move |connection| {
            let mut query = reservations::table
                .select(Reservation::as_select())
                .order(reservations::created_at.asc())
                .into_boxed();
            if let Some(date) = filter.date {
                query = query.filter(reservations::date.eq(date));
            }
            if let Some(service) = filter.service {
                query = query.filter(reservations::service.eq(service));
            }
            if let Some(phone) = filter.phone {
                query = query.filter(reservations::phone.eq(phone));
            }
            query.load(connection)
        })
        .await
    }

    async fn reservation(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        self.run(move |connection| {
            reservations::table
                .find(id)
                .select(Reservation::as_select())
                .first(connection)
                .optional()
        })
        .await
    }

    async fn update_reservation(
        &self,
        id: Uuid,
        changes: ReservationChanges,
    ) -> Result<Option<Reservation>, StoreError> {
        if changes.is_empty() {
            // diesel refuses an empty changeset
            return self.reservation(id).await;
        }
        self.run(move |connection| {
            diesel::update(reservations::table.find(id))
                .set(&changes)
                .returning(Reservation::as_returning())
                .get_result(connection)
                .optional()
        })
        .await
    }

    async fn remove_reservation(&self, id: Uuid) -> Result<(), StoreError> {
        self.run(move |connection| {
            diesel::delete(reservations::table.find(id))
                .execute(connection)
                .map(|_| ())
        })
        .await
    }

    async fn timeslots(&self) -> Result<Vec<String>, StoreError> {
        self.run(|connection| {
            timeslots::table
                .select(timeslots::time)
                .order(timeslots::created_at.asc())
                .load(connection)
        })
        .await
    }

    async fn add_timeslot(&self, time: String) -> Result<(), StoreError> {
        self.run(move |connection| {
            diesel::insert_into(timeslots::table)
                .values((timeslots::id.eq(Uuid::new_v4()), timeslots::time.eq(time)))
                .execute(connection)
                .map(|_| ())
        })
        .await
    }

    async fn remove_timeslot(&self, time: String) -> Result<(), StoreError> {
        self.run(move |connection| {
            diesel::delete(timeslots::table.filter(timeslots::time.eq(time)))
                .execute(connection)
                .map(|_| ())
        })
        .await
    }
}
