use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Cursor, Database};
use serde::de::DeserializeOwned;

use super::models::{Barber, NewBarber, NewWaitListEntry, Service, WaitListEntry, WaitStatus};
use super::store::Store;
use crate::api::middleware::ErrorLogExt;
use crate::api::{AppError, AppResult};
use crate::config::MongoConfig;
use crate::geo::Coordinates;

pub type Result<T> = std::result::Result<T, AppError>;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone)]
pub struct MongoRepo {
    pub database: Database,
}

impl MongoRepo {
    pub async fn init(config: &MongoConfig) -> Result<MongoRepo> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| AppError::Internal(format!("Error conectando a MongoDB: {}", e)))?;

        let database = client.database(&config.database);

        // Test connection
        database
            .run_command(doc! {"ping": 1})
            .await
            .map_err(|e| AppError::Internal(format!("Error validando conexión MongoDB: {}", e)))?;

        tracing::info!(database = %config.database, "Conexión a MongoDB establecida exitosamente");

        Ok(MongoRepo { database })
    }

    pub fn barbers(&self) -> Collection<Barber> {
        self.database.collection("barbers")
    }

    pub fn waitlist(&self) -> Collection<WaitListEntry> {
        self.database.collection("waitlist")
    }

    pub fn services(&self) -> Collection<Service> {
        self.database.collection("services")
    }

    fn counters(&self) -> Collection<Document> {
        self.database.collection("counters")
    }

    pub async fn create_indexes(&self) -> Result<()> {
        use mongodb::{options::IndexOptions, IndexModel};

        let barber_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "access_token": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "is_active": 1 })
                .build(),
        ];

        self.barbers()
            .create_indexes(barber_indexes)
            .await
            .map_err(|e| AppError::Internal(format!("Error creando índices barbers: {}", e)))?;

        let waitlist_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "barber_id": 1, "status": 1, "created_at": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, "created_at": 1 })
                .build(),
        ];

        self.waitlist()
            .create_indexes(waitlist_indexes)
            .await
            .map_err(|e| AppError::Internal(format!("Error creando índices waitlist: {}", e)))?;

        tracing::info!("Índices MongoDB creados exitosamente");
        Ok(())
    }

    /// Siguiente valor de la secuencia `name` (IDs enteros crecientes)
    async fn next_id(&self, name: &str) -> Result<i64> {
        let counter = self
            .counters()
            .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .log_error_context("incrementing id counter")
            .map_err(|e| AppError::database("next_id", e))?
            .ok_or_else(|| AppError::internal_trace("Contador de IDs no disponible", None))?;

        counter
            .get_i64("seq")
            .map_err(|e| AppError::internal_trace(&format!("Contador '{}' corrupto: {}", name, e), None))
    }

    async fn collect<T>(mut cursor: Cursor<T>, what: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let mut results = Vec::new();

        while cursor
            .advance()
            .await
            .map_err(|e| AppError::Internal(format!("Error iterando cursor: {}", e)))?
        {
            let item = cursor
                .deserialize_current()
                .map_err(|e| AppError::Internal(format!("Error deserializando {}: {}", what, e)))?;
            results.push(item);
        }

        Ok(results)
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl Store for MongoRepo {
    async fn insert_barber(&self, barber: NewBarber) -> AppResult<Barber> {
        let barbers = self.barbers();

        let existing = barbers
            .find_one(doc! { "email": &barber.email })
            .await
            .log_error_context("checking if barber exists")
            .map_err(|e| AppError::database("check_barber_exists", e))?;

        if existing.is_some() {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        let barber = barber.with_id(self.next_id("barbers").await?);

        match barbers.insert_one(&barber).await {
            Ok(_) => Ok(barber),
            // Dos registros simultáneos con el mismo email
            Err(e) if is_duplicate_key(&e) => {
                Err(AppError::Conflict("El email ya está registrado".to_string()))
            }
            Err(e) => Err(AppError::database("insert_barber", e)),
        }
    }

    async fn find_barber(&self, id: i64) -> AppResult<Option<Barber>> {
        self.barbers()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("find_barber", e))
    }

    async fn find_barber_by_email(&self, email: &str) -> AppResult<Option<Barber>> {
        self.barbers()
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::database("find_barber_by_email", e))
    }

    async fn find_barber_by_token(&self, token: &str) -> AppResult<Option<Barber>> {
        self.barbers()
            .find_one(doc! { "access_token": token })
            .await
            .log_error_context("validating access token")
            .map_err(|e| AppError::database("validate_token", e))
    }

    async fn toggle_barber_status(
        &self,
        id: i64,
        coordinates: Coordinates,
    ) -> AppResult<Option<Barber>> {
        // Pipeline de actualización: el servidor lee y niega el valor actual
        let pipeline = vec![doc! {
            "$set": {
                "is_active": { "$not": ["$is_active"] },
                "latitude": coordinates.latitude,
                "longitude": coordinates.longitude,
            }
        }];

        self.barbers()
            .find_one_and_update(doc! { "_id": id }, pipeline)
            .return_document(ReturnDocument::After)
            .await
            .log_error_context("toggling barber status")
            .map_err(|e| AppError::database("toggle_barber_status", e))
    }

    async fn active_barbers(&self) -> AppResult<Vec<Barber>> {
        let cursor = self
            .barbers()
            .find(doc! { "is_active": true })
            .sort(doc! { "_id": 1 })
            .await
            .log_error_context("listing active barbers")
            .map_err(|e| AppError::database("active_barbers", e))?;

        Self::collect(cursor, "barbero").await
    }

    async fn insert_entry(&self, entry: NewWaitListEntry) -> AppResult<WaitListEntry> {
        if self.find_barber(entry.barber_id).await?.is_none() {
            return Err(AppError::not_found_id("Barbero", entry.barber_id));
        }

        let entry = entry.with_id(self.next_id("waitlist").await?);

        self.waitlist()
            .insert_one(&entry)
            .await
            .log_error_context("inserting waitlist entry")
            .map_err(|e| AppError::database("insert_entry", e))?;

        Ok(entry)
    }

    async fn waiting_entries(&self, barber_id: i64) -> AppResult<Vec<WaitListEntry>> {
        let cursor = self
            .waitlist()
            .find(doc! { "barber_id": barber_id, "status": WaitStatus::Waiting.as_str() })
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await
            .map_err(|e| AppError::database("waiting_entries", e))?;

        Self::collect(cursor, "entrada de lista de espera").await
    }

    async fn count_waiting(&self, barber_id: i64) -> AppResult<u64> {
        self.waitlist()
            .count_documents(doc! { "barber_id": barber_id, "status": WaitStatus::Waiting.as_str() })
            .await
            .map_err(|e| AppError::database("count_waiting", e))
    }

    async fn finish_entry(
        &self,
        barber_id: i64,
        entry_id: i64,
        status: WaitStatus,
    ) -> AppResult<bool> {
        // Sólo se actualiza si sigue en espera y pertenece al barbero
        let result = self
            .waitlist()
            .update_one(
                doc! {
                    "_id": entry_id,
                    "barber_id": barber_id,
                    "status": WaitStatus::Waiting.as_str(),
                },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await
            .log_error_context("finishing waitlist entry")
            .map_err(|e| AppError::database("finish_entry", e))?;

        Ok(result.modified_count > 0)
    }

    async fn cancel_waiting_before(&self, cutoff: i64) -> AppResult<u64> {
        let result = self
            .waitlist()
            .update_many(
                doc! {
                    "status": WaitStatus::Waiting.as_str(),
                    "created_at": { "$lt": cutoff },
                },
                doc! { "$set": { "status": WaitStatus::Cancelled.as_str() } },
            )
            .await
            .log_error_context("expiring stale waitlist entries")
            .map_err(|e| AppError::database("cancel_waiting_before", e))?;

        Ok(result.modified_count)
    }

    async fn list_services(&self) -> AppResult<Vec<Service>> {
        let cursor = self
            .services()
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|e| AppError::database("list_services", e))?;

        Self::collect(cursor, "servicio").await
    }

    async fn seed_services(
        &self,
        services: Vec<(&'static str, f64, &'static str)>,
    ) -> AppResult<usize> {
        let collection = self.services();

        let existing = collection
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::database("count_services", e))?;

        if existing > 0 {
            return Ok(0);
        }

        let mut catalog = Vec::with_capacity(services.len());
        for (name, price, description) in services {
            catalog.push(Service {
                id: self.next_id("services").await?,
                name: name.to_string(),
                price,
                description: Some(description.to_string()),
            });
        }

        let inserted = collection
            .insert_many(&catalog)
            .await
            .log_error_context("seeding services")
            .map_err(|e| AppError::database("seed_services", e))?;

        Ok(inserted.inserted_ids.len())
    }
}
