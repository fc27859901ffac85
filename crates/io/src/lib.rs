// CSV import/export for fare tables, taps and trips

pub mod error;
pub mod fares;
pub mod format;
pub mod taps;
pub mod trips;

pub use error::IoError;
pub use fares::{load_fare_graph, load_fare_graph_file};
pub use format::OutputFormat;
pub use taps::{parse_taps, read_taps_file};
pub use trips::{write_trips, write_trips_file};

/// Header-first reader with every field (and header) trimmed.
pub(crate) fn csv_reader(csv_data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes())
}

/// Case-insensitive header lookup.
pub(crate) fn column_index(
    headers: &csv::StringRecord,
    name: &'static str,
    file: &'static str,
) -> Result<usize, IoError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or(IoError::MissingColumn { file, column: name })
}
