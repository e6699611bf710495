//! Wire models for report endpoint data.

pub mod record;

pub use record::{AttendanceRecord, RecordKind};
