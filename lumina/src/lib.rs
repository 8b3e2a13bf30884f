//! Lumina data grid core
//!
//! Keeps an interactive view over an in-memory table: search, column filters,
//! multi-key sort, pagination or virtualized scrolling, selection and row
//! hiding, heatmaps and conditional formatting. Rendering is left to the host;
//! the grid hands out [`Patch`]es describing what to rebuild.

pub mod config;
pub mod error;
pub mod export;
pub mod focus;
pub mod format;
pub mod host;
pub mod model;
pub mod overlay;
pub mod query;
pub mod render;
pub mod schedule;
pub mod selection;
pub mod sync;
pub mod view;

pub use config::GridConfig;
pub use config::GridOptions;
pub use config::WidgetPayload;
pub use error::ConfigError;
pub use error::ExportError;
pub use export::ExportFile;
pub use export::ExportFormat;
pub use export::ExportScope;
pub use export::ExportTable;
pub use export::Exporter;
pub use host::HostBridge;
pub use host::RecordingBridge;
pub use model::CellValue;
pub use model::Dataset;
pub use model::RowId;
pub use render::Patch;
pub use selection::Modifiers;
pub use selection::SelectionMode;
pub use sync::*;
