//! File exporters.

use lumina::ExportError;
use lumina::ExportFormat;
use lumina::ExportTable;
use lumina::Exporter;

/// Writes CSV with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn supports(&self, format: ExportFormat) -> bool {
        format == ExportFormat::Csv
    }

    fn export(&self, _format: ExportFormat, table: &ExportTable) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&table.columns)
            .map_err(|e| ExportError::exporter(e.to_string()))?;
        for row in &table.rows {
            writer
                .write_record(row.iter().map(|v| v.display()))
                .map_err(|e| ExportError::exporter(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| ExportError::exporter(e.to_string()))
    }
}

/// Writes a JSON array of `column -> value` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn supports(&self, format: ExportFormat) -> bool {
        format == ExportFormat::Json
    }

    fn export(&self, _format: ExportFormat, table: &ExportTable) -> Result<Vec<u8>, ExportError> {
        serde_json::to_vec_pretty(&table.records()).map_err(|e| ExportError::exporter(e.to_string()))
    }
}

/// Every exporter this binary ships.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExporter;

impl Exporter for FileExporter {
    fn supports(&self, format: ExportFormat) -> bool {
        CsvExporter.supports(format) || JsonExporter.supports(format)
    }

    fn export(&self, format: ExportFormat, table: &ExportTable) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Csv => CsvExporter.export(format, table),
            ExportFormat::Json => JsonExporter.export(format, table),
            other => Err(ExportError::unsupported(other.extension())),
        }
    }
}
