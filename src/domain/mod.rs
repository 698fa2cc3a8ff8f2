//! # Lógica de dominio
//!
//! - [`accounts`] - Registro, login y estado de los barberos
//! - [`proximity`] - Búsqueda de barberos activos cercanos
//! - [`waitlist`] - Lista de espera FIFO por barbero
//!
//! Todas las operaciones reciben el almacenamiento como `&dyn Store`.

pub mod accounts;
pub mod proximity;
pub mod waitlist;

pub use accounts::AuthenticatedBarber;
