// src/services/document_service.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use genpdf::{Alignment, Element, elements, style};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        report::{DetailRow, ReportRow, SupplierSummary, UNKNOWN_SUPPLIER},
        trip::TripWithAnimals,
    },
};

const LETTERHEAD: &str = "TANCHOICE LIMITED – Simply Organic Meat";

/// Renders the three printable documents: the single-trip manifest, the
/// single-supplier detail report and the cross-supplier summary report.
#[derive(Clone)]
pub struct DocumentService {
    font_dir: String,
    font_family: String,
}

impl DocumentService {
    pub fn new(font_dir: String, font_family: String) -> Self {
        Self {
            font_dir,
            font_family,
        }
    }

    /// Loads the font and sets up a page with the company letterhead.
    fn base_document(
        &self,
        title: &str,
        subtitle: Option<&str>,
    ) -> Result<genpdf::Document, AppError> {
        let font_family =
            genpdf::fonts::from_files(&self.font_dir, &self.font_family, None).map_err(|_| {
                AppError::FontNotFound(format!(
                    "Font family '{}' not found in {}",
                    self.font_family, self.font_dir
                ))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(title);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new(LETTERHEAD)
                .aligned(Alignment::Center)
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        if let Some(subtitle) = subtitle {
            doc.push(
                elements::Paragraph::new(subtitle)
                    .aligned(Alignment::Center)
                    .styled(style::Style::new().bold().with_font_size(14)),
            );
        }
        doc.push(elements::Break::new(1.5));

        Ok(doc)
    }

    /// Manifest for one trip: metadata block, one line per supplier row, a
    /// TOTAL row and the signature footer.
    pub fn trip_manifest(&self, trip: &TripWithAnimals) -> Result<Vec<u8>, AppError> {
        let mut doc = self.base_document(&format!("Trip {}", trip.trip.form_no), None)?;

        doc.push(elements::Paragraph::new(format!("Region: {}", trip.trip.region)));
        doc.push(elements::Paragraph::new(format!("Truck No: {}", trip.trip.truck_no)));
        doc.push(elements::Paragraph::new(format!(
            "Date: {}",
            trip.trip.date.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!("Form No: {}", trip.trip.form_no)));
        doc.push(elements::Break::new(2));

        // Column weights: S/N (1), Supplier (4), Mark (2), Goats (1), Sheep (1), Total (2)
        let mut table = elements::TableLayout::new(vec![1, 4, 2, 1, 1, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("S/N").styled(bold))
            .element(elements::Paragraph::new("Supplier's Name").styled(bold))
            .element(elements::Paragraph::new("Mark / Symbol").styled(bold))
            .element(elements::Paragraph::new("Goats").styled(bold))
            .element(elements::Paragraph::new("Sheep").styled(bold))
            .element(elements::Paragraph::new("Total Summary").styled(bold))
            .push()
            .expect("Table error");

        let (mut goats, mut sheep, mut total) = (0i64, 0i64, 0i64);
        for (serial, item) in trip.animals.iter().enumerate() {
            let supplier_name = item
                .supplier
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| UNKNOWN_SUPPLIER.to_string());
            goats += i64::from(item.animal.goats_count);
            sheep += i64::from(item.animal.sheep_count);
            total += i64::from(item.animal.total_animals);

            table
                .row()
                .element(elements::Paragraph::new(format!("{}", serial + 1)))
                .element(elements::Paragraph::new(supplier_name))
                .element(elements::Paragraph::new(item.animal.mark.clone()))
                .element(elements::Paragraph::new(item.animal.goats_count.to_string()))
                .element(elements::Paragraph::new(item.animal.sheep_count.to_string()))
                .element(elements::Paragraph::new(item.animal.total_animals.to_string()))
                .push()
                .expect("Table row error");
        }

        table
            .row()
            .element(elements::Paragraph::new("TOTAL").styled(bold))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(goats.to_string()).styled(bold))
            .element(elements::Paragraph::new(sheep.to_string()).styled(bold))
            .element(elements::Paragraph::new(total.to_string()).styled(bold))
            .push()
            .expect("Table row error");

        doc.push(table);
        doc.push(elements::Break::new(2));

        // Signature footer
        let prepared_by = format!(
            "Prepared by: {} {}",
            trip.trip.prepared_by_position.as_deref().unwrap_or(""),
            trip.trip.prepared_by_name.as_deref().unwrap_or("")
        );
        doc.push(elements::Paragraph::new(prepared_by.trim_end().to_string()));
        doc.push(elements::Paragraph::new("Signature: ______________________"));
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(format!("Driver: {}", trip.trip.driver_name)));
        doc.push(elements::Paragraph::new("Signature: ______________________"));
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(format!("Escort: {}", trip.trip.escort_name)));
        doc.push(elements::Paragraph::new("Signature: ______________________"));

        render(doc)
    }

    /// Detail report for one supplier over a period.
    pub fn supplier_detail(
        &self,
        supplier_name: &str,
        rows: &[DetailRow],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<u8>, AppError> {
        let mut doc = self.base_document(
            &format!("Supplier report {supplier_name}"),
            Some("Supplier Report"),
        )?;

        doc.push(elements::Paragraph::new(format!("Supplier: {supplier_name}")));
        doc.push(elements::Paragraph::new(format!(
            "Period: {} - {}",
            from.format("%d/%m/%Y"),
            to.format("%d/%m/%Y")
        )));
        doc.push(elements::Break::new(2));

        let mut table = elements::TableLayout::new(vec![1, 2, 2, 2, 1, 1, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("S/N").styled(bold))
            .element(elements::Paragraph::new("Date").styled(bold))
            .element(elements::Paragraph::new("Region").styled(bold))
            .element(elements::Paragraph::new("Truck No").styled(bold))
            .element(elements::Paragraph::new("Goats").styled(bold))
            .element(elements::Paragraph::new("Sheep").styled(bold))
            .element(elements::Paragraph::new("Total Animals").styled(bold))
            .push()
            .expect("Table error");

        let (mut goats, mut sheep, mut total) = (0i64, 0i64, 0i64);
        for (serial, row) in rows.iter().enumerate() {
            goats += i64::from(row.goats_count);
            sheep += i64::from(row.sheep_count);
            total += i64::from(row.total_animals);
            table
                .row()
                .element(elements::Paragraph::new(format!("{}", serial + 1)))
                .element(elements::Paragraph::new(row.date.format("%d/%m/%Y").to_string()))
                .element(elements::Paragraph::new(row.region.clone()))
                .element(elements::Paragraph::new(row.truck_no.clone()))
                .element(elements::Paragraph::new(row.goats_count.to_string()))
                .element(elements::Paragraph::new(row.sheep_count.to_string()))
                .element(elements::Paragraph::new(row.total_animals.to_string()))
                .push()
                .expect("Table row error");
        }

        table
            .row()
            .element(elements::Paragraph::new("TOTAL").styled(bold))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(goats.to_string()).styled(bold))
            .element(elements::Paragraph::new(sheep.to_string()).styled(bold))
            .element(elements::Paragraph::new(total.to_string()).styled(bold))
            .push()
            .expect("Table row error");

        doc.push(table);
        render(doc)
    }

    /// Cross-supplier summary over a period. Groups the raw report rows
    /// itself before rendering.
    pub fn supplier_summary(
        &self,
        rows: &[ReportRow],
        from: NaiveDate,
        to: NaiveDate,
        region: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        let mut doc =
            self.base_document("Supplier summary report", Some("Supplier Summary Report"))?;

        doc.push(elements::Paragraph::new(format!(
            "Period: {} - {}",
            from.format("%d/%m/%Y"),
            to.format("%d/%m/%Y")
        )));
        if let Some(region) = region {
            doc.push(elements::Paragraph::new(format!("Region: {region}")));
        }
        doc.push(elements::Break::new(2));

        let summary = summarize(rows);

        let mut table = elements::TableLayout::new(vec![1, 4, 2, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("S/N").styled(bold))
            .element(elements::Paragraph::new("Supplier Name").styled(bold))
            .element(elements::Paragraph::new("Total Goats").styled(bold))
            .element(elements::Paragraph::new("Total Sheep").styled(bold))
            .element(elements::Paragraph::new("Total Animals").styled(bold))
            .push()
            .expect("Table error");

        let (mut goats, mut sheep, mut total) = (0i64, 0i64, 0i64);
        for (serial, entry) in summary.iter().enumerate() {
            goats += entry.total_goats;
            sheep += entry.total_sheep;
            total += entry.total_animals;
            table
                .row()
                .element(elements::Paragraph::new(format!("{}", serial + 1)))
                .element(elements::Paragraph::new(entry.supplier_name.clone()))
                .element(elements::Paragraph::new(entry.total_goats.to_string()))
                .element(elements::Paragraph::new(entry.total_sheep.to_string()))
                .element(elements::Paragraph::new(entry.total_animals.to_string()))
                .push()
                .expect("Table row error");
        }

        table
            .row()
            .element(elements::Paragraph::new("TOTAL").styled(bold))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(goats.to_string()).styled(bold))
            .element(elements::Paragraph::new(sheep.to_string()).styled(bold))
            .element(elements::Paragraph::new(total.to_string()).styled(bold))
            .push()
            .expect("Table row error");

        doc.push(table);
        render(doc)
    }
}

/// Per-supplier grouping for the summary document, first-seen order.
pub(crate) fn summarize(rows: &[ReportRow]) -> Vec<SupplierSummary> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut groups: HashMap<Uuid, SupplierSummary> = HashMap::new();

    for row in rows {
        let entry = groups.entry(row.supplier_id).or_insert_with(|| {
            order.push(row.supplier_id);
            SupplierSummary {
                supplier_id: row.supplier_id,
                supplier_name: row.supplier_name.clone(),
                total_goats: 0,
                total_sheep: 0,
                total_animals: 0,
            }
        });
        entry.total_goats += i64::from(row.goats_count);
        entry.total_sheep += i64::from(row.sheep_count);
        entry.total_animals += i64::from(row.total_animals);
    }

    order.into_iter().filter_map(|id| groups.remove(&id)).collect()
}

fn render(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::DocumentError(e.to_string()))?;
    Ok(buffer)
}
