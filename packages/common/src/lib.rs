pub mod storage;

pub use storage::{BlobKey, BlobStore, BoxReader, StorageError};
