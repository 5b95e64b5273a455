//! CSV export of a composed selection

use serde::Serialize;
use shared::SelectionRow;

use crate::error::{ClientError, ClientResult};

/// One printed line of a receipt
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    item: &'a str,
    location: &'a str,
    id_number: &'a str,
    quantity: usize,
}

const HEADER: [&str; 4] = ["item", "location", "id_number", "quantity"];

/// Render grouped selection rows as CSV with a header row
///
/// The header is written even when there are no rows.
pub fn selection_csv(rows: &[SelectionRow]) -> ClientResult<String> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(vec![]);
    wtr.write_record(HEADER)
        .map_err(|e| ClientError::Export(format!("CSV header error: {}", e)))?;
    for row in rows {
        wtr.serialize(ExportRow {
            item: &row.name,
            location: row.location_label.as_deref().unwrap_or(""),
            id_number: row.id_number.as_deref().unwrap_or(""),
            quantity: row.quantity,
        })
        .map_err(|e| ClientError::Export(format!("CSV serialization error: {}", e)))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ClientError::Export(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ClientError::Export(format!("UTF-8 conversion error: {}", e)))
}
