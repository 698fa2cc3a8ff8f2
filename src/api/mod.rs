//! # Módulo API
//!
//! Rutas y controladores de la API REST.
//!
//! ## Módulos principales
//!
//! - [`barber`] - Registro, login, estado y panel del barbero
//! - [`customer`] - Búsqueda de barberos cercanos y lista de espera
//! - [`services`] - Catálogo de servicios
//! - [`auth`] - Extracción del token Bearer
//! - [`errors`] - Manejo de errores de la aplicación

pub mod auth;
pub mod barber;
pub mod customer;
pub mod errors;
pub mod middleware;
pub mod services;

pub use errors::{AppError, AppResult, ErrorResponse, ResultExt};

use actix_web::{get, web, HttpResponse, Responder};

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Convierte errores de extracción (JSON, formulario, query) en `AppError`
fn extraction_error(err: impl std::fmt::Display) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

/// Configura todas las rutas de la API
///
/// ## Rutas configuradas
///
/// - `/barbers/*`, `/barber/*` - Ver [`barber::routes`]
/// - `/get-nearby-barbers`, `/join-waitlist/*` - Ver [`customer::routes`]
/// - `/services` - Ver [`services::routes`]
/// - `/health`
///
/// # Ejemplo
///
/// ```no_run
/// use actix_web::{web, App};
/// use barber_waitlist::api;
///
/// let app = App::new()
///     .configure(api::init_routes);
/// ```
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| extraction_error(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| extraction_error(err)))
        .app_data(web::FormConfig::default().error_handler(|err, _| extraction_error(err)));

    barber::routes(cfg);
    customer::routes(cfg);
    services::routes(cfg);
    cfg.service(health);
}
