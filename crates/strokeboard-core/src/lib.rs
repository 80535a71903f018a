//! Strokeboard Core Library
//!
//! Stroke ledger for a shared, paged drawing surface: strokes from any number of
//! contributors in one creation order, per-contributor undo/redo, a page table,
//! and the operation log every replica consumes in the same order.

pub mod config;
pub mod history;
pub mod input;
pub mod ledger;
pub mod operation;
pub mod oplog;
pub mod pages;
pub mod segment;
pub mod session;
pub mod snapshot;
pub mod stroke;

pub use config::{ConfigError, DrawingConfig};
pub use input::{Brush, GestureRecorder, PointerEvent};
pub use ledger::Ledger;
pub use operation::Operation;
pub use oplog::{LogError, LogReader, OperationLog, SequencedOperation};
pub use pages::PageTable;
pub use segment::{CompositingMode, ContributorId, PageKey, Segment, SerializableColor};
pub use session::{DrawEvent, DrawingSession};
pub use snapshot::{PageRecord, SnapshotCache, SnapshotError};
pub use stroke::{Stroke, StrokeId};
