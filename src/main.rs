//! # Barber Waitlist Server
//!
//! ## Ejecución
//!
//! ```bash
//! # 1. Ejecutar MongoDB (o usar STORAGE_BACKEND=memory)
//! # Docker: docker run -d --name mongo -p 27017:27017 mongo:latest
//!
//! # 2. Configurar variables de entorno (ver `config`)
//! cp .env.example .env
//!
//! # 3. Compilar y ejecutar
//! cargo run
//! ```

use std::sync::Arc;

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};

use barber_waitlist::config::{AppConfig, StorageBackend};
use barber_waitlist::db::{models::default_services, MemoryStore, MongoRepo, Store};
use barber_waitlist::domain::waitlist;
use barber_waitlist::{api, AppState};

/// Arranca el servidor
///
/// 1. Carga `.env` y configura tracing
/// 2. Construye el almacenamiento (MongoDB con índices, o memoria)
/// 3. Siembra el catálogo de servicios
/// 4. Lanza la tarea de caducidad si está configurada
/// 5. Sirve la API y `./static`
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("barber_waitlist=debug,mongodb=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuración inválida: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    tracing::info!(storage = ?config.storage, "Iniciando Barber Waitlist Server...");

    let store: Arc<dyn Store> = match config.storage {
        StorageBackend::MongoDb => {
            let repo = match MongoRepo::init(&config.mongo).await {
                Ok(repo) => repo,
                Err(e) => {
                    tracing::error!("Error conectando a MongoDB: {}", e);
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("Error de MongoDB: {}", e),
                    ));
                }
            };

            // Sin índices el servicio funciona, sólo más lento
            if let Err(e) = repo.create_indexes().await {
                tracing::warn!("Advertencia creando índices: {}", e);
            }

            Arc::new(repo)
        }
        StorageBackend::Memory => {
            tracing::warn!("Usando almacenamiento en memoria: los datos se pierden al reiniciar");
            Arc::new(MemoryStore::new())
        }
    };

    match store.seed_services(default_services()).await {
        Ok(0) => tracing::debug!("Catálogo de servicios ya existente"),
        Ok(count) => tracing::info!(count, "Catálogo de servicios inicializado"),
        Err(e) => tracing::warn!("No se pudo sembrar el catálogo de servicios: {}", e),
    }

    if let Some(policy) = config.expiry {
        waitlist::spawn_expiry_task(store.clone(), policy.max_age, policy.interval);
    }

    let state = AppState::new(store).with_default_radius(config.default_radius_miles);
    let bind_address = config.bind_address.clone();

    tracing::info!("Servidor iniciando en {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(api::init_routes)
            .service(Files::new("/static", "./static"))
            .route("/", web::get().to(|| async {
                actix_web::HttpResponse::PermanentRedirect()
                    .append_header(("Location", "/static/index.html"))
                    .finish()
            }))
    })
        .bind(&bind_address)?
        .run()
        .await
}
