//! Dataset module - CSV persistence for inputs and derived outputs

pub mod error;
pub mod lock;
pub mod read;
pub mod store;
pub mod write;

pub use error::StoreError;
pub use lock::RunLock;
pub use store::{DataDir, IngestReport};
pub use write::Manifest;
