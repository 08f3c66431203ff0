use crate::{
    auth::{admin_auth, is_admitted},
    backend::BookingBackend,
    booking_manager::BookingManager,
    configuration::Configuration,
    error::BookingError,
    notifier::Notifier,
    types::{
        AvailabilityQuery, LoginRequest, LoginResponse, NewReservation, ReservationChanges,
        ReservationFilter, ReservationRequest, TimeslotRequest,
    },
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::fs;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{debug, error};

pub struct AppState<B, N: ?Sized, C> {
    booking_manager: BookingManager<B, N>,
    configuration: C,
}

impl<B: Clone, N: ?Sized, C: Clone> Clone for AppState<B, N, C> {
    fn clone(&self) -> Self {
        Self {
            booking_manager: self.booking_manager.clone(),
            configuration: self.configuration.clone(),
        }
    }
}

/// Response texts for the error classes of one route.
#[derive(Debug, Clone, Copy)]
struct ErrorTexts {
    missing_input: &'static str,
    not_found: &'static str,
    failure: &'static str,
}

impl ErrorTexts {
    const DEFAULT: Self = Self {
        missing_input: "⛔ Données manquantes",
        not_found: "⛔ Réservation introuvable",
        failure: "⛔ Erreur serveur",
    };
}

const ACCESS_DENIED: &str = "⛔ Accès refusé";

impl BookingError {
    fn into_response_with(self, texts: ErrorTexts) -> Response {
        if self.is_dependency_failure() {
            error!(err = %self, "Request failed");
        }
        let (status, text) = match self {
            BookingError::Validation(_) => (StatusCode::BAD_REQUEST, texts.missing_input),
            BookingError::Auth => (StatusCode::FORBIDDEN, ACCESS_DENIED),
            BookingError::NotFound(_) => (StatusCode::NOT_FOUND, texts.not_found),
            BookingError::Store(_) | BookingError::Notification(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, texts.failure)
            }
        };
        (status, text).into_response()
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        self.into_response_with(ErrorTexts::DEFAULT)
    }
}

/// A missing or unreadable JSON body counts as an empty one, so the
/// presence checks decide the response.
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            debug!(%rejection, "Request body treated as empty");
            T::default()
        }
    }
}

pub fn create_app<B, N, C>(backend: B, notifier: Arc<N>, configuration: C) -> Router
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/", get(get_welcome))
        .route("/admin", get(get_admin_page::<B, N, C>))
        .route("/login", post(login::<B, N, C>))
        .route("/notifier-mireille", post(create_reservation::<B, N, C>))
        .route("/creneaux", get(get_timeslots::<B, N, C>))
        .route("/disponibilites", get(get_taken_times::<B, N, C>));

    let admin = Router::new()
        .route("/admin/reservations", get(get_reservations::<B, N, C>))
        .route(
            "/admin/reservations/:id",
            get(get_reservation::<B, N, C>)
                .put(update_reservation::<B, N, C>)
                .delete(remove_reservation::<B, N, C>),
        )
        .route("/admin/rappel/:id", post(send_reminder::<B, N, C>))
        .route("/admin/creneaux", post(add_timeslot::<B, N, C>))
        .route("/admin/creneaux/:heure", delete(remove_timeslot::<B, N, C>))
        .route_layer(middleware::from_fn_with_state(
            configuration.clone(),
            admin_auth::<C>,
        ));

    let static_files = ServeDir::new(configuration.public_path());
    let state = AppState {
        booking_manager: BookingManager::new(backend, notifier),
        configuration,
    };

    Router::new()
        .merge(public)
        .merge(admin)
        .fallback_service(static_files)
        .with_state(state)
        .layer(cors)
}

async fn get_welcome() -> &'static str {
    "Bienvenue sur le backend de Mireille 💅"
}

async fn get_admin_page<B, N, C>(State(state): State<AppState<B, N, C>>) -> Response
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    let path = state.configuration.admin_page_path();
    match fs::read_to_string(&path).await {
        Ok(contents) => Html(contents).into_response(),
        Err(err) => {
            error!(?err, path = %path.display(), "Failed to read admin page");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorTexts::DEFAULT.failure).into_response()
        }
    }
}

async fn login<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> (StatusCode, Json<LoginResponse>)
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    let request = body_or_default(body);
    if is_admitted(request.password.as_deref(), &state.configuration.password()) {
        let response = LoginResponse {
            success: true,
            message: None,
        };
        return (StatusCode::OK, Json(response));
    }
    let response = LoginResponse {
        success: false,
        message: Some("Mot de passe incorrect".into()),
    };
    (StatusCode::UNAUTHORIZED, Json(response))
}

async fn create_reservation<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    body: Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<&'static str, Response>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    let texts = ErrorTexts {
        failure: "⛔ Échec de l'envoi du SMS",
        ..ErrorTexts::DEFAULT
    };
    let reservation = NewReservation::try_from(body_or_default(body))
        .map_err(|err| err.into_response_with(texts))?;
    state
        .booking_manager
        .create_reservation(reservation)
        .await
        .map_err(|err| err.into_response_with(texts))?;

    Ok("✅ Réservation enregistrée et notification envoyée")
}

async fn get_timeslots<B, N, C>(
    State(state): State<AppState<B, N, C>>,
) -> Result<Json<Vec<String>>, BookingError>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    Ok(Json(state.booking_manager.timeslots().await?))
}

async fn get_taken_times<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<String>>, Response>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    let texts = ErrorTexts {
        missing_input: "⛔ Date requise",
        ..ErrorTexts::DEFAULT
    };
    let taken = state
        .booking_manager
        .taken_times(query.date)
        .await
        .map_err(|err| err.into_response_with(texts))?;
    Ok(Json(taken))
}

async fn get_reservations<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    Query(filter): Query<ReservationFilter>,
) -> Result<impl IntoResponse, BookingError>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    Ok(Json(state.booking_manager.reservations(filter).await?))
}

async fn get_reservation<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Response>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    let texts = ErrorTexts {
        not_found: "⛔ Cliente introuvable",
        ..ErrorTexts::DEFAULT
    };
    let reservation = state
        .booking_manager
        .reservation(&id)
        .await
        .map_err(|err| err.into_response_with(texts))?;
    Ok(Json(reservation))
}

async fn update_reservation<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    Path(id): Path<String>,
    body: Result<Json<ReservationChanges>, JsonRejection>,
) -> Result<&'static str, BookingError>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    state
        .booking_manager
        .update_reservation(&id, body_or_default(body))
        .await?;
    Ok("✅ Réservation mise à jour")
}

async fn remove_reservation<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    Path(id): Path<String>,
) -> Result<&'static str, BookingError>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    state.booking_manager.remove_reservation(&id).await?;
    Ok("✅ Réservation supprimée")
}

async fn send_reminder<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    Path(id): Path<String>,
) -> Result<&'static str, BookingError>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    state.booking_manager.send_reminder(&id).await?;
    Ok("✅ Rappel simulé")
}

async fn add_timeslot<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    body: Result<Json<TimeslotRequest>, JsonRejection>,
) -> Result<&'static str, Response>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    let texts = ErrorTexts {
        missing_input: "⛔ Heure requise",
        ..ErrorTexts::DEFAULT
    };
    state
        .booking_manager
        .add_timeslot(body_or_default(body).heure)
        .await
        .map_err(|err| err.into_response_with(texts))?;
    Ok("✅ Créneau ajouté")
}

async fn remove_timeslot<B, N, C>(
    State(state): State<AppState<B, N, C>>,
    Path(heure): Path<String>,
) -> Result<&'static str, BookingError>
where
    B: BookingBackend,
    N: Notifier + ?Sized,
    C: Configuration,
{
    state.booking_manager.remove_timeslot(heure).await?;
    Ok("✅ Créneau retiré")
}
