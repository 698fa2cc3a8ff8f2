use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Barbero registrado
///
/// `is_active` y las coordenadas sólo cambian con el toggle de estado del
/// propio barbero.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Barber {
    #[serde(rename = "_id")]
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub work_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
    pub access_token: String,
    pub created_at: i64, // timestamp unix en milisegundos
}

impl Barber {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Datos de un barbero antes de tener ID asignado
#[derive(Debug, Clone)]
pub struct NewBarber {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub work_address: String,
    pub coordinates: Coordinates,
    pub access_token: String,
    pub created_at: i64,
}

impl NewBarber {
    pub fn with_id(self, id: i64) -> Barber {
        Barber {
            id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            work_address: self.work_address,
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
            is_active: false,
            access_token: self.access_token,
            created_at: self.created_at,
        }
    }
}

/// Estado de una entrada de la lista de espera
///
/// `Waiting` es el único estado no terminal.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaitStatus {
    Waiting,
    Completed,
    Cancelled,
}

impl WaitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitStatus::Waiting => "waiting",
            WaitStatus::Completed => "completed",
            WaitStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WaitListEntry {
    #[serde(rename = "_id")]
    pub id: i64,
    pub barber_id: i64,
    pub customer_name: String,
    pub phone_number: String,
    pub created_at: i64, // timestamp unix en milisegundos
    pub status: WaitStatus,
}

impl WaitListEntry {
    pub fn joined_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.created_at)
            .single()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct NewWaitListEntry {
    pub barber_id: i64,
    pub customer_name: String,
    pub phone_number: String,
    pub created_at: i64,
}

impl NewWaitListEntry {
    pub fn with_id(self, id: i64) -> WaitListEntry {
        WaitListEntry {
            id,
            barber_id: self.barber_id,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            created_at: self.created_at,
            status: WaitStatus::Waiting,
        }
    }
}

/// Servicio del catálogo (datos de referencia de sólo lectura)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
}

/// Catálogo por defecto que se inserta al arrancar si no hay servicios
pub fn default_services() -> Vec<(&'static str, f64, &'static str)> {
    vec![
        ("Haircut", 30.00, "Classic haircut with styling"),
        ("Beard Trim", 15.00, "Professional beard grooming"),
        ("Hair & Beard", 40.00, "Complete grooming package"),
        ("Kids Haircut", 20.00, "Haircut for children under 12"),
        ("Hot Towel Shave", 25.00, "Traditional straight razor shave with hot towel"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&WaitStatus::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(
            serde_json::from_str::<WaitStatus>("\"cancelled\"").unwrap(),
            WaitStatus::Cancelled
        );
        assert_eq!(WaitStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn new_barber_starts_inactive() {
        let barber = NewBarber {
            email: "a@b.com".into(),
            password_hash: "hash".into(),
            name: "Ana".into(),
            work_address: "Main St 1".into(),
            coordinates: Coordinates { latitude: 40.0, longitude: -75.0 },
            access_token: "tok".into(),
            created_at: 0,
        }
        .with_id(5);

        assert_eq!(barber.id, 5);
        assert!(!barber.is_active);
        assert_eq!(barber.coordinates(), Coordinates { latitude: 40.0, longitude: -75.0 });
    }

    #[test]
    fn joined_at_converts_millis() {
        let entry = NewWaitListEntry {
            barber_id: 1,
            customer_name: "Alice".into(),
            phone_number: "555".into(),
            created_at: 1_700_000_000_123,
        }
        .with_id(1);

        assert_eq!(entry.status, WaitStatus::Waiting);
        assert_eq!(entry.joined_at().timestamp_millis(), 1_700_000_000_123);
    }
}
