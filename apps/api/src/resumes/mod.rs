// Resume store: CV records in PostgreSQL, rendered markdown snapshots in S3.

pub mod handlers;
pub mod snapshot;
pub mod store;
