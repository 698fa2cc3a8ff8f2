//! # API de Clientes
//!
//! Rutas públicas (sin token):
//! - Buscar barberos activos cercanos
//! - Apuntarse a la lista de espera de un barbero
//! - Consultar cuánta gente espera

use actix_web::{get, post, web, Either, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use super::{AppError, AppResult};
use crate::domain::{proximity, waitlist};
use crate::geo::Coordinates;
use crate::state::AppState;

/// Parámetros de búsqueda de barberos cercanos
#[derive(Deserialize)]
struct NearbyQuery {
    /// Latitud del cliente (grados)
    lat: f64,
    /// Longitud del cliente (grados)
    lng: f64,
    /// Radio en millas; si falta se usa el configurado
    radius: Option<f64>,
}

#[derive(Deserialize)]
struct JoinWaitlist {
    customer_name: String,
    phone_number: String,
}

/// Lista los barberos activos dentro del radio, del más cercano al más lejano
///
/// # Respuesta
/// ```json
/// [
///   {
///     "id": 1,
///     "name": "Ana",
///     "latitude": 40.0,
///     "longitude": -75.0,
///     "address": "Main St 1",
///     "wait_time": 2,
///     "distance": 0.0
///   }
/// ]
/// ```
///
/// # Errores
/// - `400 Bad Request`: coordenadas fuera de rango o radio negativo
#[get("/get-nearby-barbers")]
async fn nearby_barbers(
    state: web::Data<AppState>,
    query: web::Query<NearbyQuery>,
) -> AppResult<impl Responder> {
    let origin = Coordinates::new(query.lat, query.lng)?;
    let radius = query.radius.unwrap_or(state.default_radius_miles);

    let barbers = proximity::nearby_barbers(state.store.as_ref(), origin, radius).await?;

    Ok(HttpResponse::Ok().json(barbers))
}

/// Apunta a un cliente en la lista de espera
///
/// Acepta JSON o formulario.
///
/// # Respuesta
/// ```json
/// { "status": "success", "id": 7, "position": 3, "wait_time": 3 }
/// ```
///
/// # Errores
/// - `400 Bad Request`: nombre o teléfono vacíos
/// - `404 Not Found`: el barbero no existe
#[post("/join-waitlist/{barber_id}")]
async fn join_waitlist(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    data: Either<web::Json<JoinWaitlist>, web::Form<JoinWaitlist>>,
) -> AppResult<impl Responder> {
    let barber_id = path.into_inner();
    let data = match data {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let store = state.store.as_ref();

    let entry = waitlist::join(store, barber_id, &data.customer_name, &data.phone_number).await?;

    let waiting = waitlist::list_waiting(store, barber_id).await?;
    let position = waiting
        .iter()
        .position(|e| e.id == entry.id)
        .map(|index| index + 1);

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "id": entry.id,
        "position": position,
        "wait_time": waiting.len()
    })))
}

/// Profundidad actual de la cola de un barbero
#[get("/barbers/{barber_id}/waitlist")]
async fn queue_depth(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let barber_id = path.into_inner();
    let store = state.store.as_ref();

    if store.find_barber(barber_id).await?.is_none() {
        return Err(AppError::not_found_id("Barbero", barber_id));
    }

    let wait_time = waitlist::queue_depth(store, barber_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "barber_id": barber_id,
        "wait_time": wait_time
    })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(nearby_barbers);
    cfg.service(join_waitlist);
    cfg.service(queue_depth);
}
