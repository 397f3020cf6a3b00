mod connection_lifecycle;
mod directory_snapshot;

pub use connection_lifecycle::{ConnectionLifecycle, StateTransition};
pub use directory_snapshot::DirectorySnapshot;
