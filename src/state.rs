use std::sync::Arc;

use crate::config::DEFAULT_RADIUS_MILES;
use crate::db::Store;

/// Estado compartido por todos los workers de actix
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Radio que se usa cuando la búsqueda no trae `radius`
    pub default_radius_miles: f64,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            default_radius_miles: DEFAULT_RADIUS_MILES,
        }
    }

    pub fn with_default_radius(mut self, miles: f64) -> Self {
        self.default_radius_miles = miles;
        self
    }
}
