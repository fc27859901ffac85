// Trip CSV output

use std::io::Write;
use std::path::Path;

use tapfare_recon::TripRecord;

use crate::error::IoError;
use crate::format::{format_cents, OutputFormat};

pub const HEADERS: [&str; 10] = [
    "Started",
    "Finished",
    "DurationSecs",
    "FromStopId",
    "ToStopId",
    "ChargeAmount",
    "CompanyId",
    "BusID",
    "PAN",
    "Status",
];

/// Write a header row and one row per trip. Absent values are left blank.
pub fn write_trips<W: Write>(
    writer: W,
    trips: &[TripRecord],
    format: &OutputFormat,
) -> Result<(), IoError> {
    format.validate()?;

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(HEADERS)?;
    for trip in trips {
        wtr.write_record(trip_row(trip, format))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_trips_file(path: &Path, trips: &[TripRecord], format: &OutputFormat) -> Result<(), IoError> {
    let file = std::fs::File::create(path)
        .map_err(|e| IoError::Io(format!("cannot write {}: {e}", path.display())))?;
    write_trips(std::io::BufWriter::new(file), trips, format)?;
    log::info!("wrote {} trips to {}", trips.len(), path.display());
    Ok(())
}

fn trip_row(trip: &TripRecord, format: &OutputFormat) -> [String; 10] {
    let date = |d: &chrono::DateTime<chrono::Utc>| d.format(&format.date_format).to_string();
    [
        date(&trip.started),
        trip.finished.as_ref().map(date).unwrap_or_default(),
        trip.duration_secs.map(|s| s.to_string()).unwrap_or_default(),
        trip.from_stop_id.clone(),
        trip.to_stop_id.clone().unwrap_or_default(),
        format_cents(trip.charge_cents, &format.currency_symbol),
        trip.company_id.clone(),
        trip.bus_id.clone(),
        trip.pan.clone(),
        trip.status.to_string(),
    ]
}
