//! CSV output: row formatting and the serialized sink

mod format;
mod sink;

pub use format::{format_mmr, format_plate, OutputRow, CSV_HEADER, VALUE_SEPARATOR};
pub use sink::{spawn_outcome_writer, CsvSink, WrittenOutput};
