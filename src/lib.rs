//! # Barber Waitlist
//!
//! Servicio web que conecta barberos con clientes cercanos, construido con
//! Rust, Actix Web y MongoDB.
//!
//! ## Características principales
//!
//! - **Barberos**: registro, login con token y apertura/cierre con geolocalización
//! - **Búsqueda por proximidad**: distancia de Haversine en millas
//! - **Lista de espera**: cola FIFO por barbero con estados waiting/completed/cancelled
//! - **Catálogo de servicios**: datos de referencia sembrados al arrancar
//!
//! ## Arquitectura
//!
//! ```text
//! Frontend (HTML/CSS/JS)
//!     ↓ HTTP/JSON
//! API REST (Actix Web)            api::*
//!     ↓
//! Lógica de dominio               domain::*, geo
//!     ↓ trait Store
//! MongoDB | memoria               db::*
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod geo;
pub mod state;

pub use state::AppState;
