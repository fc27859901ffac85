// Tap event CSV: ID,DateTimeUTC,TapType,StopId,CompanyId,BusID,PAN

use std::path::Path;

use chrono::NaiveDateTime;
use tapfare_recon::{TapEvent, TapType};

use crate::error::IoError;
use crate::format::{read_file_as_utf8, DATE_FORMAT};
use crate::{column_index, csv_reader};

pub const COL_ID: &str = "ID";
pub const COL_DATE_TIME: &str = "DateTimeUTC";
pub const COL_TAP_TYPE: &str = "TapType";
pub const COL_STOP_ID: &str = "StopId";
pub const COL_COMPANY_ID: &str = "CompanyId";
pub const COL_BUS_ID: &str = "BusID";
pub const COL_PAN: &str = "PAN";

const FILE: &str = "taps";

/// Parse and validate every tap row, in file order.
///
/// The first invalid row fails the whole read; the reconciler only ever sees
/// well-formed events.
pub fn parse_taps(csv_data: &str) -> Result<Vec<TapEvent>, IoError> {
    let mut reader = csv_reader(csv_data);
    let headers = reader.headers()?.clone();

    let id_idx = column_index(&headers, COL_ID, FILE)?;
    let date_idx = column_index(&headers, COL_DATE_TIME, FILE)?;
    let tap_type_idx = column_index(&headers, COL_TAP_TYPE, FILE)?;
    let stop_idx = column_index(&headers, COL_STOP_ID, FILE)?;
    let company_idx = column_index(&headers, COL_COMPANY_ID, FILE)?;
    let bus_idx = column_index(&headers, COL_BUS_ID, FILE)?;
    let pan_idx = column_index(&headers, COL_PAN, FILE)?;

    let mut taps = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let raw_id = field(id_idx);
        let invalid = |name: &'static str, value: &str| IoError::InvalidTap {
            record: raw_id.to_string(),
            field: name,
            value: value.to_string(),
        };

        let id: i64 = raw_id.parse().map_err(|_| invalid(COL_ID, raw_id))?;

        let date_str = field(date_idx);
        let tapped_at = NaiveDateTime::parse_from_str(date_str, DATE_FORMAT)
            .map_err(|_| invalid(COL_DATE_TIME, date_str))?
            .and_utc();

        let tap_type_str = field(tap_type_idx);
        let tap_type =
            TapType::parse(tap_type_str).ok_or_else(|| invalid(COL_TAP_TYPE, tap_type_str))?;

        let required = |idx: usize, name: &'static str| -> Result<String, IoError> {
            let value = field(idx);
            if value.is_empty() {
                return Err(invalid(name, value));
            }
            Ok(value.to_string())
        };

        taps.push(TapEvent {
            id,
            tapped_at,
            tap_type,
            stop_id: required(stop_idx, COL_STOP_ID)?,
            company_id: required(company_idx, COL_COMPANY_ID)?,
            bus_id: required(bus_idx, COL_BUS_ID)?,
            pan: required(pan_idx, COL_PAN)?,
        });
    }

    log::info!("read {} taps", taps.len());
    Ok(taps)
}

pub fn read_taps_file(path: &Path) -> Result<Vec<TapEvent>, IoError> {
    let csv_data = read_file_as_utf8(path)?;
    parse_taps(&csv_data)
}
