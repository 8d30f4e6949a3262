// src/services/csv_service.rs

use crate::{
    common::error::AppError,
    models::report::{DetailRow, SupplierSummary},
};

pub const SUMMARY_HEADERS: [&str; 4] =
    ["Supplier Name", "Total Goats", "Total Sheep", "Total Animals"];

pub const DETAIL_HEADERS: [&str; 7] =
    ["Date", "Region", "Truck No", "Form No", "Goats", "Sheep", "Total Animals"];

/// Cross-supplier summary as delimited text: one header line, one line per
/// supplier group. Standard CSV quoting (fields containing commas or quotes
/// are quoted, internal quotes doubled).
pub fn summary_csv(summary: &[SupplierSummary]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(SUMMARY_HEADERS)
        .map_err(|e| AppError::DocumentError(e.to_string()))?;
    for entry in summary {
        writer
            .write_record([
                entry.supplier_name.clone(),
                entry.total_goats.to_string(),
                entry.total_sheep.to_string(),
                entry.total_animals.to_string(),
            ])
            .map_err(|e| AppError::DocumentError(e.to_string()))?;
    }
    finish(writer)
}

/// Single-supplier detail rows as delimited text. Dates are ISO
/// (YYYY-MM-DD) so spreadsheets sort them correctly.
pub fn detail_csv(rows: &[DetailRow]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(DETAIL_HEADERS)
        .map_err(|e| AppError::DocumentError(e.to_string()))?;
    for row in rows {
        writer
            .write_record([
                row.date.to_string(),
                row.region.clone(),
                row.truck_no.clone(),
                row.form_no.clone(),
                row.goats_count.to_string(),
                row.sheep_count.to_string(),
                row.total_animals.to_string(),
            ])
            .map_err(|e| AppError::DocumentError(e.to_string()))?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, AppError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::DocumentError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::DocumentError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn summary(name: &str, goats: i64, sheep: i64) -> SupplierSummary {
        SupplierSummary {
            supplier_id: Uuid::new_v4(),
            supplier_name: name.to_string(),
            total_goats: goats,
            total_sheep: sheep,
            total_animals: goats + sheep,
        }
    }

    #[test]
    fn header_line_then_one_line_per_group() {
        let csv = summary_csv(&[summary("Mwanga", 3, 2), summary("Kilimanjaro", 1, 0)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Supplier Name,Total Goats,Total Sheep,Total Animals");
        assert_eq!(lines[1], "Mwanga,3,2,5");
        assert_eq!(lines[2], "Kilimanjaro,1,0,1");
    }

    #[test]
    fn values_containing_commas_are_quoted_and_round_trip() {
        let csv = summary_csv(&[summary("Arusha, Region", 1, 1)]).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(line, "\"Arusha, Region\",1,1,2");

        // Reading it back yields the original value.
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "Arusha, Region");
    }

    #[test]
    fn internal_quotes_are_doubled() {
        let csv = summary_csv(&[summary("The \"Best\" Goats", 2, 0)]).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(line, "\"The \"\"Best\"\" Goats\",2,0,2");
    }

    #[test]
    fn detail_rows_use_iso_dates() {
        let rows = [DetailRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            region: "Manyara".to_string(),
            truck_no: "T 456 DEF".to_string(),
            form_no: "F-002".to_string(),
            goats_count: 3,
            sheep_count: 2,
            total_animals: 5,
        }];
        let csv = detail_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Region,Truck No,Form No,Goats,Sheep,Total Animals");
        assert_eq!(lines[1], "2024-03-05,Manyara,T 456 DEF,F-002,3,2,5");
    }
}
