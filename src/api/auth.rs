//! # Autenticación por token Bearer
//!
//! El token que devuelven registro y login se envía en cada petición de
//! barbero como `Authorization: Bearer <token>`. El extractor
//! [`AuthenticatedBarber`] lo resuelve una sola vez por petición.

use std::future::Future;
use std::pin::Pin;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use super::{AppError, AppResult};
use crate::domain::accounts::{self, AuthenticatedBarber};
use crate::state::AppState;

/// Extrae el token Bearer del header Authorization
///
/// # Errores
/// - `Unauthorized`: falta el header, no es texto válido o no empieza por "Bearer "
pub fn extract_token(req: &HttpRequest) -> AppResult<String> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Falta header Authorization".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Header Authorization inválido".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Formato de token inválido".to_string()))?;

    Ok(token.to_string())
}

impl FromRequest for AuthenticatedBarber {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = extract_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| {
                AppError::internal_trace("Estado de aplicación no configurado", None)
            })?;
            accounts::authenticate(state.store.as_ref(), &token).await
        })
    }
}
