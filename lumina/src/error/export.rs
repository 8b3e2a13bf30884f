//! Export error types

/// Errors that can occur while planning or running an export.
///
/// An export that fails never produces partial output: the exporter is only
/// invoked once the request has been fully planned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The requested format is unknown or the exporter cannot produce it.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// The request would export no columns.
    #[error("nothing to export: no columns selected")]
    NoColumns,

    /// The exporter reported a failure.
    #[error("exporter failed: {0}")]
    Exporter(String),
}

impl ExportError {
    /// Creates an unsupported format error.
    pub fn unsupported(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Creates an exporter failure.
    pub fn exporter(message: impl Into<String>) -> Self {
        Self::Exporter(message.into())
    }

    /// Returns `true` if the request was rejected before reaching the exporter.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_) | Self::NoColumns)
    }
}
