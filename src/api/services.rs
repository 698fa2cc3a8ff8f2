use actix_web::{get, web, HttpResponse, Responder};

use super::AppResult;
use crate::state::AppState;

/// Catálogo de servicios (sólo lectura)
#[get("/services")]
async fn list_services(state: web::Data<AppState>) -> AppResult<impl Responder> {
    let services = state.store.list_services().await?;
    Ok(HttpResponse::Ok().json(services))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_services);
}
