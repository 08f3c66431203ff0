use crate::error::BookingError;
use crate::schema::reservations;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Time labels offered when no timeslot has been configured yet.
pub const DEFAULT_TIMESLOTS: [&str; 7] = [
    "06:30", "09:00", "10:30", "12:00", "13:30", "15:00", "16:30",
];

/// Accepts any JSON scalar as text; numbers such as `612345678` become `"612345678"`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable, Insertable,
)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reservation {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "telephone")]
    pub phone: String,
    pub date: String,
    #[serde(rename = "heure")]
    pub time: String,
    #[serde(rename = "coiffure")]
    pub service: String,
}

/// Fields of a reservation that passed the presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub service: String,
}

impl NewReservation {
    pub fn into_reservation(self, id: Uuid) -> Reservation {
        Reservation {
            id,
            name: self.name,
            phone: self.phone,
            date: self.date,
            time: self.time,
            service: self.service,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "📋 Nouvelle réservation : {}, {} à {} pour {}",
            self.name, self.date, self.time, self.service
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReservationRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(required, length(min = 1))]
    pub nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(required, length(min = 1))]
    pub telephone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(required, length(min = 1))]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(required, length(min = 1))]
    pub heure: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(required, length(min = 1))]
    pub coiffure: Option<String>,
}

impl TryFrom<ReservationRequest> for NewReservation {
    type Error = BookingError;

    fn try_from(request: ReservationRequest) -> Result<Self, Self::Error> {
        request
            .validate()
            .map_err(|err| BookingError::Validation(err.to_string()))?;

        Ok(Self {
            name: request.nom.unwrap_or_default(),
            phone: request.telephone.unwrap_or_default(),
            date: request.date.unwrap_or_default(),
            time: request.heure.unwrap_or_default(),
            service: request.coiffure.unwrap_or_default(),
        })
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, AsChangeset)]
#[diesel(table_name = reservations)]
pub struct ReservationChanges {
    #[serde(rename = "nom", default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(rename = "telephone", default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(rename = "heure", default, deserialize_with = "lenient_text")]
    pub time: Option<String>,
    #[serde(rename = "coiffure", default, deserialize_with = "lenient_text")]
    pub service: Option<String>,
}

impl ReservationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.service.is_none()
    }

    pub fn apply_to(self, reservation: &mut Reservation) {
        if let Some(name) = self.name {
            reservation.name = name;
        }
        if let Some(phone) = self.phone {
            reservation.phone = phone;
        }
        if let Some(date) = self.date {
            reservation.date = date;
        }
        if let Some(time) = self.time {
            reservation.time = time;
        }
        if let Some(service) = self.service {
            reservation.service = service;
        }
    }
}

/// Exact-match filter; `None` leaves a field unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReservationFilter {
    pub date: Option<String>,
    #[serde(rename = "coiffure")]
    pub service: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
}

impl ReservationFilter {
    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    /// Empty query values count as "not given".
    pub fn without_empty_values(self) -> Self {
        let keep = |value: Option<String>| value.filter(|value| !value.is_empty());
        Self {
            date: keep(self.date),
            service: keep(self.service),
            phone: keep(self.phone),
        }
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        let field_matches =
            |wanted: &Option<String>, actual: &str| wanted.as_deref().map_or(true, |w| w == actual);

        field_matches(&self.date, &reservation.date)
            && field_matches(&self.service, &reservation.service)
            && field_matches(&self.phone, &reservation.phone)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeslotRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub heure: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
