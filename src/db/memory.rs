use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Barber, NewBarber, NewWaitListEntry, Service, WaitListEntry, WaitStatus};
use super::store::Store;
use crate::api::{AppError, AppResult};
use crate::geo::Coordinates;

#[derive(Default)]
struct Tables {
    barbers: Vec<Barber>,
    entries: Vec<WaitListEntry>,
    services: Vec<Service>,
    next_barber_id: i64,
    next_entry_id: i64,
}

/// Almacenamiento en memoria del proceso
///
/// Se usa en tests y con `STORAGE_BACKEND=memory`. Los datos se pierden al
/// reiniciar.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_barber(&self, barber: NewBarber) -> AppResult<Barber> {
        let mut tables = self.tables.write().await;

        if tables.barbers.iter().any(|b| b.email == barber.email) {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        tables.next_barber_id += 1;
        let barber = barber.with_id(tables.next_barber_id);
        tables.barbers.push(barber.clone());
        Ok(barber)
    }

    async fn find_barber(&self, id: i64) -> AppResult<Option<Barber>> {
        let tables = self.tables.read().await;
        Ok(tables.barbers.iter().find(|b| b.id == id).cloned())
    }

    async fn find_barber_by_email(&self, email: &str) -> AppResult<Option<Barber>> {
        let tables = self.tables.read().await;
        Ok(tables.barbers.iter().find(|b| b.email == email).cloned())
    }

    async fn find_barber_by_token(&self, token: &str) -> AppResult<Option<Barber>> {
        let tables = self.tables.read().await;
        Ok(tables.barbers.iter().find(|b| b.access_token == token).cloned())
    }

    async fn toggle_barber_status(
        &self,
        id: i64,
        coordinates: Coordinates,
    ) -> AppResult<Option<Barber>> {
        let mut tables = self.tables.write().await;

        Ok(tables.barbers.iter_mut().find(|b| b.id == id).map(|barber| {
            barber.is_active = !barber.is_active;
            barber.latitude = coordinates.latitude;
            barber.longitude = coordinates.longitude;
            barber.clone()
        }))
    }

    async fn active_barbers(&self) -> AppResult<Vec<Barber>> {
        let tables = self.tables.read().await;
        Ok(tables.barbers.iter().filter(|b| b.is_active).cloned().collect())
    }

    async fn insert_entry(&self, entry: NewWaitListEntry) -> AppResult<WaitListEntry> {
        let mut tables = self.tables.write().await;

        if !tables.barbers.iter().any(|b| b.id == entry.barber_id) {
            return Err(AppError::not_found_id("Barbero", entry.barber_id));
        }

        tables.next_entry_id += 1;
        let entry = entry.with_id(tables.next_entry_id);
        tables.entries.push(entry.clone());
        Ok(entry)
    }

    async fn waiting_entries(&self, barber_id: i64) -> AppResult<Vec<WaitListEntry>> {
        let tables = self.tables.read().await;

        let mut waiting: Vec<WaitListEntry> = tables
            .entries
            .iter()
            .filter(|e| e.barber_id == barber_id && e.status == WaitStatus::Waiting)
            .cloned()
            .collect();
        waiting.sort_by_key(|e| (e.created_at, e.id));

        Ok(waiting)
    }

    async fn count_waiting(&self, barber_id: i64) -> AppResult<u64> {
        let tables = self.tables.read().await;

        Ok(tables
            .entries
            .iter()
            .filter(|e| e.barber_id == barber_id && e.status == WaitStatus::Waiting)
            .count() as u64)
    }

    async fn finish_entry(
        &self,
        barber_id: i64,
        entry_id: i64,
        status: WaitStatus,
    ) -> AppResult<bool> {
        let mut tables = self.tables.write().await;

        let entry = tables.entries.iter_mut().find(|e| {
            e.id == entry_id && e.barber_id == barber_id && e.status == WaitStatus::Waiting
        });

        Ok(match entry {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        })
    }

    async fn cancel_waiting_before(&self, cutoff: i64) -> AppResult<u64> {
        let mut tables = self.tables.write().await;

        let mut cancelled = 0;
        for entry in tables
            .entries
            .iter_mut()
            .filter(|e| e.status == WaitStatus::Waiting && e.created_at < cutoff)
        {
            entry.status = WaitStatus::Cancelled;
            cancelled += 1;
        }

        Ok(cancelled)
    }

    async fn list_services(&self) -> AppResult<Vec<Service>> {
        let tables = self.tables.read().await;
        Ok(tables.services.clone())
    }

    async fn seed_services(
        &self,
        services: Vec<(&'static str, f64, &'static str)>,
    ) -> AppResult<usize> {
        let mut tables = self.tables.write().await;

        if !tables.services.is_empty() {
            return Ok(0);
        }

        tables.services = services
            .into_iter()
            .zip(1..)
            .map(|((name, price, description), id)| Service {
                id,
                name: name.to_string(),
                price,
                description: Some(description.to_string()),
            })
            .collect();

        Ok(tables.services.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::default_services;
    use tokio_test::block_on;

    fn new_barber(email: &str) -> NewBarber {
        NewBarber {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Ana".to_string(),
            work_address: "Main St 1".to_string(),
            coordinates: Coordinates { latitude: 40.0, longitude: -75.0 },
            access_token: format!("token-{email}"),
            created_at: 0,
        }
    }

    fn new_entry(barber_id: i64, name: &str, created_at: i64) -> NewWaitListEntry {
        NewWaitListEntry {
            barber_id,
            customer_name: name.to_string(),
            phone_number: "555-0100".to_string(),
            created_at,
        }
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        block_on(store.insert_barber(new_barber("a@b.com"))).unwrap();

        let err = block_on(store.insert_barber(new_barber("a@b.com"))).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn toggle_flips_and_moves() {
        let store = MemoryStore::new();
        let barber = block_on(store.insert_barber(new_barber("a@b.com"))).unwrap();
        let there = Coordinates { latitude: 41.0, longitude: -74.0 };

        let opened = block_on(store.toggle_barber_status(barber.id, there)).unwrap().unwrap();
        assert!(opened.is_active);
        assert_eq!(opened.coordinates(), there);

        let closed = block_on(store.toggle_barber_status(barber.id, there)).unwrap().unwrap();
        assert!(!closed.is_active);

        assert!(block_on(store.toggle_barber_status(99, there)).unwrap().is_none());
    }

    #[test]
    fn ids_increase() {
        let store = MemoryStore::new();
        let first = block_on(store.insert_barber(new_barber("a@b.com"))).unwrap();
        let second = block_on(store.insert_barber(new_barber("c@d.com"))).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn entry_for_unknown_barber_is_rejected() {
        let store = MemoryStore::new();
        let err = block_on(store.insert_entry(new_entry(99, "Alice", 1))).unwrap_err();
        assert!(matches!(err, AppError::NotFoundWithId { .. }));
    }

    #[test]
    fn same_timestamp_keeps_insertion_order() {
        let store = MemoryStore::new();
        let barber = block_on(store.insert_barber(new_barber("a@b.com"))).unwrap();

        for name in ["Alice", "Bob", "Carol"] {
            block_on(store.insert_entry(new_entry(barber.id, name, 1000))).unwrap();
        }

        let names: Vec<String> = block_on(store.waiting_entries(barber.id))
            .unwrap()
            .into_iter()
            .map(|e| e.customer_name)
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn finish_entry_only_once() {
        let store = MemoryStore::new();
        let barber = block_on(store.insert_barber(new_barber("a@b.com"))).unwrap();
        let entry = block_on(store.insert_entry(new_entry(barber.id, "Alice", 1))).unwrap();

        assert!(block_on(store.finish_entry(barber.id, entry.id, WaitStatus::Completed)).unwrap());
        assert!(!block_on(store.finish_entry(barber.id, entry.id, WaitStatus::Cancelled)).unwrap());
        assert_eq!(block_on(store.count_waiting(barber.id)).unwrap(), 0);
    }

    #[test]
    fn finish_entry_of_other_barber_is_ignored() {
        let store = MemoryStore::new();
        let owner = block_on(store.insert_barber(new_barber("a@b.com"))).unwrap();
        let other = block_on(store.insert_barber(new_barber("c@d.com"))).unwrap();
        let entry = block_on(store.insert_entry(new_entry(owner.id, "Alice", 1))).unwrap();

        assert!(!block_on(store.finish_entry(other.id, entry.id, WaitStatus::Completed)).unwrap());
        assert_eq!(block_on(store.count_waiting(owner.id)).unwrap(), 1);
    }

    #[test]
    fn cancel_waiting_before_cutoff() {
        let store = MemoryStore::new();
        let barber = block_on(store.insert_barber(new_barber("a@b.com"))).unwrap();
        block_on(store.insert_entry(new_entry(barber.id, "Old", 100))).unwrap();
        block_on(store.insert_entry(new_entry(barber.id, "New", 500))).unwrap();

        assert_eq!(block_on(store.cancel_waiting_before(200)).unwrap(), 1);

        let waiting = block_on(store.waiting_entries(barber.id)).unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].customer_name, "New");
    }

    #[test]
    fn seed_services_is_idempotent() {
        let store = MemoryStore::new();
        assert_eq!(block_on(store.seed_services(default_services())).unwrap(), 5);
        assert_eq!(block_on(store.seed_services(default_services())).unwrap(), 0);

        let services = block_on(store.list_services()).unwrap();
        assert_eq!(services.len(), 5);
        assert_eq!(services[0].name, "Haircut");
    }
}
