// src/db/mod.rs
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod store;

pub use self::memory::MemoryStore;
pub use self::models::{Barber, NewBarber, NewWaitListEntry, Service, WaitListEntry, WaitStatus};
pub use self::mongodb::MongoRepo;
pub use self::store::Store;
