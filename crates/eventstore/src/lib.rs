//! Persistence for the billing engine's two append-only inputs: raw
//! telemetry events (C3, §4.3) and the versioned pricing configuration
//! tables the slicer (C5) reads as a coherent snapshot (§3 "Lifecycle").

pub mod config;
pub mod raw;

pub use config::{load_snapshot, ConfigSnapshot};
pub use raw::{RawEventStore, ScanCursor};

/// Embedded `sqlx` migrations creating the seven tables of §6 plus the
/// indices backing ordered scans and windowed lookups.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
