//! # Geolocalización
//!
//! Cálculo de distancias sobre la superficie terrestre y validación de
//! coordenadas recibidas desde el exterior.

use serde::{Deserialize, Serialize};
use crate::api::{AppError, AppResult};

/// Radio medio de la Tierra en millas
pub const EARTH_RADIUS_MILES: f64 = 3959.87433;

/// Distancia de gran círculo entre dos puntos, en millas (fórmula de Haversine)
///
/// Las cuatro entradas están en grados decimales. No valida rangos: un
/// valor fuera de rango produce un resultado finito pero sin sentido, por eso
/// las coordenadas externas pasan antes por [`Coordinates::new`].
///
/// # Ejemplo
///
/// ```
/// use barber_waitlist::geo::haversine_miles;
///
/// let d = haversine_miles(40.0, -75.0, 40.0, -75.0);
/// assert_eq!(d, 0.0);
/// ```
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // sqrt(a) puede superar 1.0 por redondeo en puntos antipodales
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_MILES * c
}

/// Redondea una distancia a un decimal
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Par latitud/longitud validado (WGS84, grados decimales)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Construye coordenadas comprobando latitud ∈ [-90, 90] y longitud ∈ [-180, 180]
    ///
    /// # Errores
    /// - `ValidationWithField`: valor no finito o fuera de rango
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::validation_field(
                "latitude",
                "debe ser un número entre -90 y 90",
            ));
        }

        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::validation_field(
                "longitude",
                "debe ser un número entre -180 y 180",
            ));
        }

        Ok(Self { latitude, longitude })
    }

    /// Distancia en millas hasta otro punto
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_miles(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}
