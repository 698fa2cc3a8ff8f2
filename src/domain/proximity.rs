//! Búsqueda de barberos activos cercanos a un punto.

use serde::Serialize;

use crate::api::{AppError, AppResult};
use crate::db::Store;
use crate::geo::{round_to_tenth, Coordinates};

/// Barbero cercano tal como se devuelve al cliente
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NearbyBarber {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    /// Entradas en espera en este momento (no es un tiempo)
    pub wait_time: u64,
    /// Millas, redondeadas a un decimal
    pub distance: f64,
}

/// Devuelve los barberos activos a `radius_miles` o menos de `origin`
///
/// El filtro usa la distancia sin redondear; el resultado va ordenado por
/// distancia ascendente (y por ID en caso de empate).
///
/// # Errores
/// - `ValidationWithField`: radio negativo o no finito
pub async fn nearby_barbers(
    store: &dyn Store,
    origin: Coordinates,
    radius_miles: f64,
) -> AppResult<Vec<NearbyBarber>> {
    if !radius_miles.is_finite() || radius_miles < 0.0 {
        return Err(AppError::validation_field("radius", "debe ser un número mayor o igual a 0"));
    }

    let mut within: Vec<(f64, _)> = store
        .active_barbers()
        .await?
        .into_iter()
        .map(|barber| (origin.distance_to(&barber.coordinates()), barber))
        .filter(|(distance, _)| *distance <= radius_miles)
        .collect();

    within.sort_by(|(dist_a, a), (dist_b, b)| dist_a.total_cmp(dist_b).then(a.id.cmp(&b.id)));

    let mut results = Vec::with_capacity(within.len());
    for (distance, barber) in within {
        let wait_time = store.count_waiting(barber.id).await?;
        results.push(NearbyBarber {
            id: barber.id,
            name: barber.name,
            latitude: barber.latitude,
            longitude: barber.longitude,
            address: barber.work_address,
            wait_time,
            distance: round_to_tenth(distance),
        });
    }

    tracing::debug!(
        latitude = origin.latitude,
        longitude = origin.longitude,
        radius_miles,
        found = results.len(),
        "Búsqueda de barberos cercanos"
    );

    Ok(results)
}
