use async_trait::async_trait;

use super::models::{Barber, NewBarber, NewWaitListEntry, Service, WaitListEntry, WaitStatus};
use crate::api::AppResult;
use crate::geo::Coordinates;

/// Acceso a almacenamiento de barberos, lista de espera y catálogo
///
/// Cada operación es atómica sobre un único documento; no hay garantías
/// entre varios barberos ni entre varias llamadas.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserta un barbero nuevo. `Conflict` si el email ya existe.
    async fn insert_barber(&self, barber: NewBarber) -> AppResult<Barber>;

    async fn find_barber(&self, id: i64) -> AppResult<Option<Barber>>;

    async fn find_barber_by_email(&self, email: &str) -> AppResult<Option<Barber>>;

    async fn find_barber_by_token(&self, token: &str) -> AppResult<Option<Barber>>;

    /// Invierte `is_active` y guarda las coordenadas en una sola operación
    /// atómica; devuelve el barbero actualizado o `None` si no existe
    async fn toggle_barber_status(
        &self,
        id: i64,
        coordinates: Coordinates,
    ) -> AppResult<Option<Barber>>;

    /// Barberos activos en orden de almacenamiento (ID ascendente)
    async fn active_barbers(&self) -> AppResult<Vec<Barber>>;

    /// Inserta una entrada en espera. `NotFoundWithId` si el barbero no existe.
    async fn insert_entry(&self, entry: NewWaitListEntry) -> AppResult<WaitListEntry>;

    /// Entradas en espera de un barbero, las más antiguas primero
    async fn waiting_entries(&self, barber_id: i64) -> AppResult<Vec<WaitListEntry>>;

    async fn count_waiting(&self, barber_id: i64) -> AppResult<u64>;

    /// Pasa una entrada en espera del barbero a `status`.
    /// Devuelve `false` si no existe, es de otro barbero o ya no está en espera.
    async fn finish_entry(&self, barber_id: i64, entry_id: i64, status: WaitStatus)
        -> AppResult<bool>;

    /// Cancela las entradas en espera creadas antes de `cutoff` (ms unix)
    async fn cancel_waiting_before(&self, cutoff: i64) -> AppResult<u64>;

    async fn list_services(&self) -> AppResult<Vec<Service>>;

    /// Inserta el catálogo si está vacío; devuelve cuántos servicios se insertaron
    async fn seed_services(&self, services: Vec<(&'static str, f64, &'static str)>)
        -> AppResult<usize>;
}
