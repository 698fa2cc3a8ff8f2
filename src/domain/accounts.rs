//! Registro, login y estado de los barberos.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{AppError, AppResult, ResultExt};
use crate::db::{Barber, NewBarber, Store};
use crate::geo::Coordinates;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Identidad del barbero resuelta en el borde de la petición
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedBarber {
    pub id: i64,
    pub name: String,
}

impl From<&Barber> for AuthenticatedBarber {
    fn from(barber: &Barber) -> Self {
        Self {
            id: barber.id,
            name: barber.name.clone(),
        }
    }
}

/// Datos del formulario de registro
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterBarber {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub work_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err_internal("Error generando hash de contraseña")?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation_field(field, "es requerido"));
    }
    Ok(value.to_string())
}

/// Registra un barbero nuevo (inactivo hasta que haga toggle)
///
/// # Errores
/// - `ValidationWithField`: campo vacío, email sin '@', contraseña corta,
///   confirmación distinta o coordenadas fuera de rango
/// - `Conflict`: el email ya está registrado
pub async fn register(store: &dyn Store, data: RegisterBarber) -> AppResult<Barber> {
    let name = required("name", &data.name)?;
    let email = required("email", &data.email)?.to_lowercase();
    let work_address = required("work_address", &data.work_address)?;

    if !email.contains('@') {
        return Err(AppError::validation_field("email", "formato de email inválido"));
    }

    if data.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation_field(
            "password",
            &format!("debe tener al menos {} caracteres", MIN_PASSWORD_LEN),
        ));
    }

    if data.password != data.confirm_password {
        return Err(AppError::validation_field("confirm_password", "las contraseñas no coinciden"));
    }

    let coordinates = Coordinates::new(data.latitude, data.longitude)?;

    let barber = store
        .insert_barber(NewBarber {
            email,
            password_hash: hash_password(&data.password)?,
            name,
            work_address,
            coordinates,
            access_token: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        })
        .await?;

    tracing::info!(barber_id = barber.id, "Barbero registrado");
    Ok(barber)
}

/// Comprueba credenciales; el error no distingue email de contraseña
pub async fn login(store: &dyn Store, email: &str, password: &str) -> AppResult<Barber> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation("Email y contraseña son requeridos".to_string()));
    }

    let barber = store
        .find_barber_by_email(&email.trim().to_lowercase())
        .await?
        .filter(|barber| verify_password(password, &barber.password_hash));

    barber.ok_or_else(|| AppError::Unauthorized("Credenciales incorrectas".to_string()))
}

/// Resuelve un token Bearer a la identidad del barbero
pub async fn authenticate(store: &dyn Store, token: &str) -> AppResult<AuthenticatedBarber> {
    match store.find_barber_by_token(token).await? {
        Some(barber) => Ok(AuthenticatedBarber::from(&barber)),
        None => Err(AppError::Unauthorized("Token inválido".to_string())),
    }
}

/// Abre o cierra el barbero y guarda su posición actual
///
/// La inversión la hace el almacenamiento en una sola operación, así que dos
/// toggles simultáneos se anulan. Devuelve el barbero con el nuevo estado.
pub async fn toggle_status(
    store: &dyn Store,
    barber: &AuthenticatedBarber,
    coordinates: Coordinates,
) -> AppResult<Barber> {
    let updated = store
        .toggle_barber_status(barber.id, coordinates)
        .await?
        .ok_or_else(|| AppError::not_found_id("Barbero", barber.id))?;

    tracing::info!(
        barber_id = updated.id,
        is_active = updated.is_active,
        latitude = updated.latitude,
        longitude = updated.longitude,
        "Estado de barbero actualizado"
    );
    Ok(updated)
}
