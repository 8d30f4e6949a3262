// src/services/report_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Store,
    models::report::{
        DetailRow, ReportRow, ReportTotals, SupplierDetailReport, SupplierReport, SupplierSummary,
    },
};

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
}

impl ReportService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Cross-supplier report: flat rows plus the per-supplier roll-up and
    /// the grand totals across all groups.
    pub async fn cross_supplier(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        region: Option<&str>,
    ) -> Result<SupplierReport, AppError> {
        let rows = self.store.report_rows(from, to, region).await?;
        let summary = roll_up(&rows);
        let totals = grand_totals(&summary);
        Ok(SupplierReport {
            rows,
            summary,
            totals,
        })
    }

    /// Detail report for one supplier, rows sorted by trip date descending.
    pub async fn supplier_detail(
        &self,
        supplier_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<SupplierDetailReport, AppError> {
        let supplier = self.store.get_supplier(supplier_id).await?;
        let rows = self.store.supplier_report_rows(supplier_id, from, to).await?;
        let totals = detail_totals(&rows);
        Ok(SupplierDetailReport {
            supplier_id,
            supplier_name: supplier.name,
            rows,
            totals,
        })
    }
}

/// Groups report rows by supplier in first-seen order, summing the counts
/// per group.
pub fn roll_up(rows: &[ReportRow]) -> Vec<SupplierSummary> {
    let mut summaries: Vec<SupplierSummary> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let position = *index.entry(row.supplier_id).or_insert_with(|| {
            summaries.push(SupplierSummary {
                supplier_id: row.supplier_id,
                supplier_name: row.supplier_name.clone(),
                total_goats: 0,
                total_sheep: 0,
                total_animals: 0,
            });
            summaries.len() - 1
        });
        let summary = &mut summaries[position];
        summary.total_goats += i64::from(row.goats_count);
        summary.total_sheep += i64::from(row.sheep_count);
        summary.total_animals += i64::from(row.total_animals);
    }

    summaries
}

pub fn grand_totals(summary: &[SupplierSummary]) -> ReportTotals {
    summary.iter().fold(ReportTotals::default(), |mut acc, s| {
        acc.goats += s.total_goats;
        acc.sheep += s.total_sheep;
        acc.total += s.total_animals;
        acc
    })
}

pub fn detail_totals(rows: &[DetailRow]) -> ReportTotals {
    rows.iter().fold(ReportTotals::default(), |mut acc, row| {
        acc.goats += i64::from(row.goats_count);
        acc.sheep += i64::from(row.sheep_count);
        acc.total += i64::from(row.total_animals);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalStore;
    use crate::models::supplier::SupplierFields;
    use crate::models::trip::{NewTripAnimal, TripFields, TripPatch};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn supplier(name: &str, region: &str) -> SupplierFields {
        SupplierFields {
            name: name.to_string(),
            phone: None,
            region: Some(region.to_string()),
            default_mark: None,
        }
    }

    fn trip(d: NaiveDate, region: &str) -> TripFields {
        TripFields {
            date: d,
            region: region.to_string(),
            truck_no: "T 456 DEF".to_string(),
            form_no: "F-002".to_string(),
            driver_name: "Juma".to_string(),
            escort_name: "Asha".to_string(),
            prepared_by_name: Some("Neema".to_string()),
            prepared_by_position: Some("Clerk".to_string()),
        }
    }

    fn row(supplier_id: Uuid, goats: i32, sheep: i32) -> NewTripAnimal {
        NewTripAnimal {
            supplier_id,
            mark: "M".to_string(),
            goats_count: goats,
            sheep_count: sheep,
        }
    }

    /// Two suppliers, one Manyara trip with a row for each.
    async fn seed_scenario(store: &Arc<LocalStore>) -> (Uuid, Uuid, Uuid) {
        let s1 = store
            .create_supplier(supplier("S1", "Manyara"), None)
            .await
            .unwrap();
        let s2 = store
            .create_supplier(supplier("S2", "Arusha"), None)
            .await
            .unwrap();
        let t1 = store
            .create_trip(
                trip(date(2024, 3, 5), "Manyara"),
                vec![row(s1.id, 3, 2), row(s2.id, 1, 0)],
                None,
            )
            .await
            .unwrap();
        (s1.id, s2.id, t1.trip.id)
    }

    #[tokio::test]
    async fn roll_up_sums_per_supplier_and_grand_totals() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        let (s1, s2, _) = seed_scenario(&store).await;
        let service = ReportService::new(store);

        let report = service
            .cross_supplier(date(2024, 3, 1), date(2024, 3, 31), None)
            .await
            .unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.summary.len(), 2);

        let sum1 = report.summary.iter().find(|s| s.supplier_id == s1).unwrap();
        assert_eq!((sum1.total_goats, sum1.total_sheep, sum1.total_animals), (3, 2, 5));
        let sum2 = report.summary.iter().find(|s| s.supplier_id == s2).unwrap();
        assert_eq!((sum2.total_goats, sum2.total_sheep, sum2.total_animals), (1, 0, 1));

        assert_eq!(report.totals, ReportTotals { goats: 4, sheep: 2, total: 6 });
    }

    #[tokio::test]
    async fn grand_totals_equal_the_sum_of_groups() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        seed_scenario(&store).await;
        let service = ReportService::new(store);

        for region in [None, Some("Manyara"), Some("Arusha")] {
            let report = service
                .cross_supplier(date(2024, 3, 1), date(2024, 3, 31), region)
                .await
                .unwrap();
            let summed = grand_totals(&report.summary);
            assert_eq!(report.totals, summed);
        }
    }

    #[tokio::test]
    async fn region_filter_is_an_exact_match_on_the_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        seed_scenario(&store).await;
        let service = ReportService::new(store);

        // The trip is in Manyara; an Arusha filter matches nothing, even
        // though one of the suppliers is from Arusha.
        let report = service
            .cross_supplier(date(2024, 3, 1), date(2024, 3, 31), Some("Arusha"))
            .await
            .unwrap();
        assert!(report.rows.is_empty());
        assert!(report.summary.is_empty());
        assert_eq!(report.totals, ReportTotals::default());
    }

    #[tokio::test]
    async fn date_bounds_are_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        seed_scenario(&store).await;
        let service = ReportService::new(store);

        let on_the_day = service
            .cross_supplier(date(2024, 3, 5), date(2024, 3, 5), None)
            .await
            .unwrap();
        assert_eq!(on_the_day.rows.len(), 2);

        let before = service
            .cross_supplier(date(2024, 2, 1), date(2024, 3, 4), None)
            .await
            .unwrap();
        assert!(before.rows.is_empty());
    }

    #[tokio::test]
    async fn deleted_supplier_disappears_from_the_roll_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        let (s1, s2, _) = seed_scenario(&store).await;
        let service = ReportService::new(store.clone());

        store.delete_supplier(s2, None).await.unwrap();

        let report = service
            .cross_supplier(date(2024, 3, 1), date(2024, 3, 31), None)
            .await
            .unwrap();
        assert!(report.summary.iter().all(|s| s.supplier_id != s2));
        let sum1 = report.summary.iter().find(|s| s.supplier_id == s1).unwrap();
        assert_eq!(sum1.total_animals, 5);
    }

    #[tokio::test]
    async fn detail_report_is_restricted_to_one_supplier_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        let (s1, _, _) = seed_scenario(&store).await;
        // A later trip for the same supplier, to exercise the ordering.
        store
            .create_trip(trip(date(2024, 3, 20), "Manyara"), vec![row(s1, 4, 4)], None)
            .await
            .unwrap();
        let service = ReportService::new(store);

        let report = service
            .supplier_detail(s1, date(2024, 3, 1), date(2024, 3, 31))
            .await
            .unwrap();
        assert_eq!(report.supplier_name, "S1");
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].date, date(2024, 3, 20));
        assert_eq!(report.rows[1].date, date(2024, 3, 5));
        assert_eq!(report.totals, ReportTotals { goats: 7, sheep: 6, total: 13 });
    }

    #[tokio::test]
    async fn trip_edit_replaces_rows_in_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        let (s1, _, t1) = seed_scenario(&store).await;
        let service = ReportService::new(store.clone());

        store
            .update_trip(t1, TripPatch::default(), vec![row(s1, 0, 1)], None)
            .await
            .unwrap();

        let report = service
            .cross_supplier(date(2024, 3, 1), date(2024, 3, 31), None)
            .await
            .unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.totals, ReportTotals { goats: 0, sheep: 1, total: 1 });
    }
}
