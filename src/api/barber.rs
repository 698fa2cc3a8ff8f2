//! # API de Barberos
//!
//! Operaciones del lado del barbero:
//! - Registro y login (devuelven el token de acceso)
//! - Abrir/cerrar ("clock in/out") con la posición actual
//! - Panel con la lista de espera propia
//! - Marcar clientes como atendidos o cancelados
//!
//! Todo lo que cuelga de `/barber` requiere token Bearer.

use actix_web::{get, post, web, Either, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AppError, AppResult};
use crate::db::{Barber, WaitListEntry};
use crate::domain::accounts::{self, AuthenticatedBarber, RegisterBarber};
use crate::domain::waitlist;
use crate::geo::Coordinates;
use crate::state::AppState;

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Posición enviada al abrir/cerrar
#[derive(Deserialize)]
struct StatusUpdate {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize)]
struct BarberProfile {
    id: i64,
    name: String,
    email: String,
    work_address: String,
    latitude: f64,
    longitude: f64,
    is_active: bool,
}

impl From<Barber> for BarberProfile {
    fn from(barber: Barber) -> Self {
        BarberProfile {
            id: barber.id,
            name: barber.name,
            email: barber.email,
            work_address: barber.work_address,
            latitude: barber.latitude,
            longitude: barber.longitude,
            is_active: barber.is_active,
        }
    }
}

/// Entrada de la lista de espera tal como la ve el barbero
#[derive(Serialize)]
struct EntryResponse {
    id: i64,
    customer_name: String,
    phone_number: String,
    /// Hora de llegada en RFC 3339 (UTC)
    joined_at: String,
    status: String,
}

impl From<WaitListEntry> for EntryResponse {
    fn from(entry: WaitListEntry) -> Self {
        EntryResponse {
            id: entry.id,
            joined_at: entry.joined_at().to_rfc3339(),
            status: entry.status.as_str().to_string(),
            customer_name: entry.customer_name,
            phone_number: entry.phone_number,
        }
    }
}

/// Registra un nuevo barbero
///
/// # Respuesta
///
/// ```json
/// {
///   "id": 1,
///   "access_token": "uuid-token",
///   "message": "Barbero registrado correctamente"
/// }
/// ```
///
/// # Errores
///
/// - `400 Bad Request`: campos vacíos, contraseña corta o que no coincide,
///   coordenadas fuera de rango
/// - `409 Conflict`: el email ya está registrado
#[post("/barbers/register")]
async fn register_barber(
    state: web::Data<AppState>,
    data: web::Json<RegisterBarber>,
) -> AppResult<impl Responder> {
    let barber = accounts::register(state.store.as_ref(), data.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "id": barber.id,
        "access_token": barber.access_token,
        "message": "Barbero registrado correctamente"
    })))
}

#[post("/barbers/login")]
async fn login_barber(
    state: web::Data<AppState>,
    data: web::Json<LoginRequest>,
) -> AppResult<impl Responder> {
    let barber = accounts::login(state.store.as_ref(), &data.email, &data.password).await?;

    Ok(HttpResponse::Ok().json(json!({
        "id": barber.id,
        "access_token": barber.access_token,
        "message": "Login exitoso"
    })))
}

/// Abre o cierra al barbero y actualiza su posición
///
/// Acepta JSON o formulario (`latitude=..&longitude=..`).
///
/// # Respuesta
/// ```json
/// { "status": "success", "is_active": true }
/// ```
#[post("/barber/toggle-status")]
async fn toggle_status(
    state: web::Data<AppState>,
    barber: AuthenticatedBarber,
    data: Either<web::Json<StatusUpdate>, web::Form<StatusUpdate>>,
) -> AppResult<impl Responder> {
    let data = match data {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let coordinates = Coordinates::new(data.latitude, data.longitude)?;

    let updated = accounts::toggle_status(state.store.as_ref(), &barber, coordinates).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "is_active": updated.is_active
    })))
}

/// Panel del barbero: perfil y clientes en espera en orden de llegada
#[get("/barber/dashboard")]
async fn dashboard(
    state: web::Data<AppState>,
    barber: AuthenticatedBarber,
) -> AppResult<impl Responder> {
    let store = state.store.as_ref();

    let profile = store
        .find_barber(barber.id)
        .await?
        .ok_or_else(|| AppError::not_found_id("Barbero", barber.id))?;
    let waiting = waitlist::list_waiting(store, barber.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "barber": BarberProfile::from(profile),
        "wait_time": waiting.len(),
        "waitlist": waiting.into_iter().map(EntryResponse::from).collect::<Vec<_>>()
    })))
}

/// Marca un cliente como atendido
///
/// # Errores
/// - `401 Unauthorized`: sin token válido
/// - `404 Not Found`: la entrada no existe, es de otro barbero o ya se cerró
#[post("/barber/waitlist/{id}/complete")]
async fn complete_entry(
    state: web::Data<AppState>,
    barber: AuthenticatedBarber,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let entry_id = path.into_inner();
    waitlist::complete(state.store.as_ref(), &barber, entry_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "id": entry_id,
        "entry_status": "completed"
    })))
}

#[post("/barber/waitlist/{id}/cancel")]
async fn cancel_entry(
    state: web::Data<AppState>,
    barber: AuthenticatedBarber,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let entry_id = path.into_inner();
    waitlist::cancel(state.store.as_ref(), &barber, entry_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "id": entry_id,
        "entry_status": "cancelled"
    })))
}

/// Configura las rutas de barberos
///
/// # Rutas disponibles
/// - `POST /barbers/register` - Registro
/// - `POST /barbers/login` - Login
/// - `POST /barber/toggle-status` - Abrir/cerrar
/// - `GET /barber/dashboard` - Panel con lista de espera
/// - `POST /barber/waitlist/{id}/complete` - Cliente atendido
/// - `POST /barber/waitlist/{id}/cancel` - Cliente retirado
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register_barber);
    cfg.service(login_barber);
    cfg.service(toggle_status);
    cfg.service(dashboard);
    cfg.service(complete_entry);
    cfg.service(cancel_entry);
}
