//! # Configuración
//!
//! Toda la configuración llega por variables de entorno (se carga `.env` con
//! dotenvy antes de leerlas):
//!
//! ```env
//! MONGODB_URI=mongodb://localhost:27017
//! MONGODB_DATABASE=barber_waitlist
//! BIND_ADDRESS=0.0.0.0:8080
//! STORAGE_BACKEND=mongodb            # o "memory"
//! DEFAULT_RADIUS_MILES=10.0
//! WAITLIST_STALE_AFTER_MINUTES=0     # 0 o sin definir: nunca caducan
//! WAITLIST_EXPIRY_INTERVAL_SECS=60
//! RUST_LOG=barber_waitlist=debug,mongodb=info
//! ```

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Radio de búsqueda por defecto, en millas
pub const DEFAULT_RADIUS_MILES: f64 = 10.0;

/// Caducidad máxima admitida para la lista de espera (un año, en minutos)
pub const MAX_STALE_AFTER_MINUTES: u64 = 365 * 24 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Valor inválido para {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MongoDb,
    Memory,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Política de caducidad de la lista de espera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpiryPolicy {
    pub max_age: Duration,
    pub interval: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub storage: StorageBackend,
    pub mongo: MongoConfig,
    pub default_radius_miles: f64,
    pub expiry: Option<ExpiryPolicy>,
}

impl AppConfig {
    /// Lee la configuración del entorno del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de claves
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let storage = match get("STORAGE_BACKEND", "mongodb").to_lowercase().as_str() {
            "mongodb" | "mongo" => StorageBackend::MongoDb,
            "memory" => StorageBackend::Memory,
            other => return Err(invalid("STORAGE_BACKEND", other)),
        };

        let default_radius_miles: f64 = parse_or(&lookup, "DEFAULT_RADIUS_MILES", DEFAULT_RADIUS_MILES)?;
        if !default_radius_miles.is_finite() || default_radius_miles < 0.0 {
            return Err(invalid("DEFAULT_RADIUS_MILES", &default_radius_miles.to_string()));
        }

        let stale_after_minutes: u64 = parse_or(&lookup, "WAITLIST_STALE_AFTER_MINUTES", 0)?;
        let interval_secs: u64 = parse_or(&lookup, "WAITLIST_EXPIRY_INTERVAL_SECS", 60)?;
        if interval_secs == 0 {
            return Err(invalid("WAITLIST_EXPIRY_INTERVAL_SECS", "0"));
        }

        let expiry = match stale_after_minutes {
            0 => None,
            minutes => {
                let max_age_secs = minutes
                    .checked_mul(60)
                    .filter(|_| minutes <= MAX_STALE_AFTER_MINUTES)
                    .ok_or_else(|| invalid("WAITLIST_STALE_AFTER_MINUTES", &minutes.to_string()))?;

                Some(ExpiryPolicy {
                    max_age: Duration::from_secs(max_age_secs),
                    interval: Duration::from_secs(interval_secs),
                })
            }
        };

        Ok(Self {
            bind_address: get("BIND_ADDRESS", "0.0.0.0:8080"),
            storage,
            mongo: MongoConfig {
                uri: get("MONGODB_URI", "mongodb://localhost:27017"),
                database: get("MONGODB_DATABASE", "barber_waitlist"),
            },
            default_radius_miles,
            expiry,
        })
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| invalid(key, &raw))
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.storage, StorageBackend::MongoDb);
        assert_eq!(config.mongo.uri, "mongodb://localhost:27017");
        assert_eq!(config.mongo.database, "barber_waitlist");
        assert_eq!(config.default_radius_miles, 10.0);
        assert!(config.expiry.is_none());
    }

    #[test]
    fn expiry_policy_from_minutes() {
        let config = config_from(&[
            ("WAITLIST_STALE_AFTER_MINUTES", "90"),
            ("WAITLIST_EXPIRY_INTERVAL_SECS", "30"),
        ])
        .unwrap();

        let expiry = config.expiry.unwrap();
        assert_eq!(expiry.max_age, Duration::from_secs(90 * 60));
        assert_eq!(expiry.interval, Duration::from_secs(30));
    }

    #[test]
    fn memory_backend() {
        let config = config_from(&[("STORAGE_BACKEND", "Memory")]).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(config_from(&[("DEFAULT_RADIUS_MILES", "lejos")]).is_err());
        assert!(config_from(&[("DEFAULT_RADIUS_MILES", "-1")]).is_err());
        assert!(config_from(&[("STORAGE_BACKEND", "sqlite")]).is_err());
        assert!(config_from(&[("WAITLIST_EXPIRY_INTERVAL_SECS", "0")]).is_err());
    }

    #[test]
    fn oversized_staleness_is_rejected() {
        let max = MAX_STALE_AFTER_MINUTES.to_string();
        let config = config_from(&[("WAITLIST_STALE_AFTER_MINUTES", max.as_str())]).unwrap();
        assert_eq!(
            config.expiry.unwrap().max_age,
            Duration::from_secs(MAX_STALE_AFTER_MINUTES * 60)
        );

        let over = (MAX_STALE_AFTER_MINUTES + 1).to_string();
        assert!(matches!(
            config_from(&[("WAITLIST_STALE_AFTER_MINUTES", over.as_str())]),
            Err(ConfigError::InvalidValue { key, .. }) if key == "WAITLIST_STALE_AFTER_MINUTES"
        ));

        // u64::MAX * 60 se desbordaría
        let huge = u64::MAX.to_string();
        assert!(config_from(&[("WAITLIST_STALE_AFTER_MINUTES", huge.as_str())]).is_err());
    }
}
