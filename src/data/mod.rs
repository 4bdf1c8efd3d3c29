//! Data module - sample generation and table helpers

mod generator;
mod table;

pub use generator::{DatasetKey, GeneratorError, SampleData, SampleDataGenerator, HIST_SAMPLES, START_DAY};
pub use table::{export_csv, ExportError, TableView};
