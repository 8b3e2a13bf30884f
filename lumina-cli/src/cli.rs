//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use simplelog::LevelFilter;

#[derive(Parser)]
#[command(
    name = "lumina",
    version,
    about = "Replay grid actions against a widget payload",
    long_about = "Load a widget payload ({data, columns, config}), apply a list of grid\n\
                  actions in order and print the resulting view.\n\n\
                  Actions: search:TEXT, filter:COLUMN=TEXT, clear-filters, sort:COLUMN,\n\
                  page:N, next, prev, rows:N, select:ID, shift-select:ID,\n\
                  clear-selection, hide, unhide, toggle-column:COLUMN, reset-columns,\n\
                  reset-rules, theme:NAME, fullscreen, minimize, scroll:PX,\n\
                  menu:columns|downloads|format=COLUMN, escape, message:TEXT"
)]
pub struct Cli {
    /// Widget payload JSON file.
    #[arg(value_name = "PAYLOAD")]
    pub payload: PathBuf,

    /// Action to apply; repeat for several, applied in order.
    #[arg(short = 'a', long = "action", value_name = "ACTION")]
    pub actions: Vec<String>,

    /// Viewport height in pixels used for virtualized scrolling.
    #[arg(long, default_value_t = 0.0)]
    pub viewport: f64,

    /// Export the resulting view in this format (csv, json).
    #[arg(long, value_name = "FORMAT")]
    pub export: Option<String>,

    /// Export every row and column instead of the current view.
    #[arg(long, requires = "export")]
    pub export_all: bool,

    /// Directory exported files are written to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Print the rendered frame as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Log level.
    #[arg(long = "log-level", value_enum, default_value = "info")]
    pub log_level: LogLevelArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Off => LevelFilter::Off,
            LogLevelArg::Error => LevelFilter::Error,
            LogLevelArg::Warn => LevelFilter::Warn,
            LogLevelArg::Info => LevelFilter::Info,
            LogLevelArg::Debug => LevelFilter::Debug,
            LogLevelArg::Trace => LevelFilter::Trace,
        }
    }
}
