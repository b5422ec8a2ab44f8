pub mod facade;
pub mod memory;
pub mod models;
pub mod object_store;
pub mod s3;

pub use facade::{StorageFacade, MAX_LISTING_KEYS};
pub use memory::InMemoryObjectStore;
pub use models::FileRecord;
pub use object_store::{ObjectMeta, ObjectStore, StoredObject};
pub use s3::S3ObjectStore;
