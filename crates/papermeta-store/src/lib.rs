//! papermeta-store — In-memory metadata store and the read-side views:
//! export rendering, verification and statistics.

pub mod export;
pub mod statistics;
pub mod store;
pub mod verification;

pub use export::{render_export, ExportFormat, RenderedExport};
pub use statistics::StatisticsView;
pub use store::MetadataStore;
pub use verification::VerificationView;
