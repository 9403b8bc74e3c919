pub mod coordinator;
pub mod partition;

pub use coordinator::{BatchSink, Coordinator, CoordinatorConfig, ingest_logs};
pub use partition::{DEFAULT_BATCH_SIZE, partition};
