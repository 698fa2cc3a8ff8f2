//! Cola FIFO de clientes por barbero.
//!
//! El orden de servicio es el de llegada: entradas en espera ordenadas por
//! `created_at` y, a igualdad, por ID. La profundidad de la cola se recalcula
//! en cada lectura.

use std::time::Duration;

use chrono::Utc;

use crate::api::{AppError, AppResult};
use crate::db::{NewWaitListEntry, Store, WaitListEntry, WaitStatus};
use super::accounts::AuthenticatedBarber;

/// Apunta a un cliente en la lista de espera de un barbero
///
/// # Errores
/// - `ValidationWithField`: nombre o teléfono vacíos
/// - `NotFoundWithId`: el barbero no existe
pub async fn join(
    store: &dyn Store,
    barber_id: i64,
    customer_name: &str,
    phone_number: &str,
) -> AppResult<WaitListEntry> {
    let customer_name = customer_name.trim();
    if customer_name.is_empty() {
        return Err(AppError::validation_field("customer_name", "es requerido"));
    }

    let phone_number = phone_number.trim();
    if phone_number.is_empty() {
        return Err(AppError::validation_field("phone_number", "es requerido"));
    }

    if store.find_barber(barber_id).await?.is_none() {
        return Err(AppError::not_found_id("Barbero", barber_id));
    }

    let entry = store
        .insert_entry(NewWaitListEntry {
            barber_id,
            customer_name: customer_name.to_string(),
            phone_number: phone_number.to_string(),
            created_at: Utc::now().timestamp_millis(),
        })
        .await?;

    tracing::info!(barber_id, entry_id = entry.id, "Cliente añadido a la lista de espera");
    Ok(entry)
}

/// Entradas en espera, la más antigua primero
pub async fn list_waiting(store: &dyn Store, barber_id: i64) -> AppResult<Vec<WaitListEntry>> {
    store.waiting_entries(barber_id).await
}

/// Número de clientes en espera (el `wait_time` expuesto a los clientes)
pub async fn queue_depth(store: &dyn Store, barber_id: i64) -> AppResult<u64> {
    store.count_waiting(barber_id).await
}

async fn finish(
    store: &dyn Store,
    barber: &AuthenticatedBarber,
    entry_id: i64,
    status: WaitStatus,
) -> AppResult<()> {
    if !store.finish_entry(barber.id, entry_id, status).await? {
        return Err(AppError::NotFound(
            "Entrada no encontrada o ya atendida".to_string(),
        ));
    }

    tracing::info!(
        barber_id = barber.id,
        entry_id,
        status = status.as_str(),
        "Entrada de lista de espera cerrada"
    );
    Ok(())
}

/// Marca como atendido a un cliente en espera del barbero autenticado
pub async fn complete(
    store: &dyn Store,
    barber: &AuthenticatedBarber,
    entry_id: i64,
) -> AppResult<()> {
    finish(store, barber, entry_id, WaitStatus::Completed).await
}

/// Retira a un cliente en espera del barbero autenticado
pub async fn cancel(
    store: &dyn Store,
    barber: &AuthenticatedBarber,
    entry_id: i64,
) -> AppResult<()> {
    finish(store, barber, entry_id, WaitStatus::Cancelled).await
}

/// Cancela las entradas que llevan esperando más de `max_age`
///
/// # Errores
/// - `Validation`: `max_age` lleva el corte fuera del rango de fechas
pub async fn expire_stale(store: &dyn Store, max_age: Duration) -> AppResult<u64> {
    let out_of_range =
        || AppError::Validation(format!("Antigüedad máxima fuera de rango: {:?}", max_age));

    let cutoff = chrono::Duration::from_std(max_age)
        .ok()
        .and_then(|max_age| Utc::now().checked_sub_signed(max_age))
        .ok_or_else(out_of_range)?
        .timestamp_millis();

    let expired = store.cancel_waiting_before(cutoff).await?;
    if expired > 0 {
        tracing::info!(expired, "Entradas caducadas en lista de espera");
    }
    Ok(expired)
}

/// Lanza la tarea periódica de caducidad
pub fn spawn_expiry_task(
    store: std::sync::Arc<dyn Store>,
    max_age: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        tracing::info!(
            max_age_secs = max_age.as_secs(),
            interval_secs = interval.as_secs(),
            "Tarea de caducidad de lista de espera iniciada"
        );

        loop {
            ticker.tick().await;
            if let Err(e) = expire_stale(store.as_ref(), max_age).await {
                tracing::error!(error = %e, "Error caducando entradas de lista de espera");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, NewBarber};
    use crate::geo::Coordinates;

    async fn barber(store: &MemoryStore, email: &str) -> AuthenticatedBarber {
        let barber = store
            .insert_barber(NewBarber {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                name: "Ana".to_string(),
                work_address: "Main St 1".to_string(),
                coordinates: Coordinates::new(40.0, -75.0).unwrap(),
                access_token: format!("token-{email}"),
                created_at: 0,
            })
            .await
            .unwrap();
        AuthenticatedBarber::from(&barber)
    }

    fn names(entries: &[WaitListEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.customer_name.as_str()).collect()
    }

    #[tokio::test]
    async fn alice_then_bob() {
        let store = MemoryStore::new();
        let owner = barber(&store, "a@b.com").await;

        join(&store, owner.id, "Alice", "555-0001").await.unwrap();
        join(&store, owner.id, "Bob", "555-0002").await.unwrap();

        let waiting = list_waiting(&store, owner.id).await.unwrap();
        assert_eq!(names(&waiting), vec!["Alice", "Bob"]);
        assert_eq!(queue_depth(&store, owner.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn n_joins_keep_order_and_completing_one_shrinks_queue() {
        let store = MemoryStore::new();
        let owner = barber(&store, "a@b.com").await;

        let customers: Vec<String> = (0..6).map(|i| format!("cliente-{i}")).collect();
        for name in &customers {
            join(&store, owner.id, name, "555").await.unwrap();
        }

        let waiting = list_waiting(&store, owner.id).await.unwrap();
        assert_eq!(names(&waiting), customers.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(queue_depth(&store, owner.id).await.unwrap(), 6);

        let served = waiting[2].id;
        complete(&store, &owner, served).await.unwrap();

        let waiting = list_waiting(&store, owner.id).await.unwrap();
        assert_eq!(queue_depth(&store, owner.id).await.unwrap(), 5);
        assert!(waiting.iter().all(|e| e.id != served));
    }

    #[tokio::test]
    async fn queues_are_per_barber() {
        let store = MemoryStore::new();
        let first = barber(&store, "a@b.com").await;
        let second = barber(&store, "c@d.com").await;

        join(&store, first.id, "Alice", "555").await.unwrap();
        join(&store, second.id, "Bob", "555").await.unwrap();
        join(&store, first.id, "Carol", "555").await.unwrap();

        assert_eq!(names(&list_waiting(&store, first.id).await.unwrap()), vec!["Alice", "Carol"]);
        assert_eq!(queue_depth(&store, second.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn join_unknown_barber_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            join(&store, 404, "Alice", "555").await,
            Err(AppError::NotFoundWithId { .. })
        ));
    }

    #[tokio::test]
    async fn join_requires_name_and_phone() {
        let store = MemoryStore::new();
        let owner = barber(&store, "a@b.com").await;

        assert!(matches!(
            join(&store, owner.id, "  ", "555").await,
            Err(AppError::ValidationWithField { ref field, .. }) if field == "customer_name"
        ));
        assert!(matches!(
            join(&store, owner.id, "Alice", "").await,
            Err(AppError::ValidationWithField { ref field, .. }) if field == "phone_number"
        ));
        assert_eq!(queue_depth(&store, owner.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cannot_finish_twice_or_someone_elses_entry() {
        let store = MemoryStore::new();
        let owner = barber(&store, "a@b.com").await;
        let intruder = barber(&store, "c@d.com").await;
        let entry = join(&store, owner.id, "Alice", "555").await.unwrap();

        assert!(matches!(
            cancel(&store, &intruder, entry.id).await,
            Err(AppError::NotFound(_))
        ));

        cancel(&store, &owner, entry.id).await.unwrap();
        assert!(matches!(
            complete(&store, &owner, entry.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn expire_stale_cancels_only_old_entries() {
        let store = MemoryStore::new();
        let owner = barber(&store, "a@b.com").await;

        let two_hours_ago = Utc::now().timestamp_millis() - 2 * 60 * 60 * 1000;
        store
            .insert_entry(NewWaitListEntry {
                barber_id: owner.id,
                customer_name: "Antiguo".to_string(),
                phone_number: "555".to_string(),
                created_at: two_hours_ago,
            })
            .await
            .unwrap();
        join(&store, owner.id, "Reciente", "555").await.unwrap();

        let expired = expire_stale(&store, Duration::from_secs(60 * 60)).await.unwrap();
        assert_eq!(expired, 1);
        assert_eq!(names(&list_waiting(&store, owner.id).await.unwrap()), vec!["Reciente"]);
    }

    #[tokio::test]
    async fn expire_stale_rejects_age_beyond_calendar() {
        let store = MemoryStore::new();
        let owner = barber(&store, "a@b.com").await;
        join(&store, owner.id, "Alice", "555").await.unwrap();

        // Casi dos millones de años: el corte no cabe en chrono
        let result = expire_stale(&store, Duration::from_secs(60_000_000_000_000)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = expire_stale(&store, Duration::MAX).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        assert_eq!(queue_depth(&store, owner.id).await.unwrap(), 1);
    }
}
