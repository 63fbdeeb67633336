pub mod repository;
pub mod snapshot;

pub use repository::{FlushError, LoadError, Repository, config_path};
pub use snapshot::SnapshotError;
