use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{CatalogDb, CatalogError, NewCategory, NewRecord, Result, UpsertOutcome};

pub(crate) struct SeedCategory {
    pub(crate) id: i64,
    pub(crate) name: &'static str,
}

pub(crate) struct SeedRecord {
    pub(crate) id: i64,
    pub(crate) title: &'static str,
    /// Calendar day, stored as midnight UTC.
    pub(crate) date: &'static str,
    pub(crate) organization: &'static str,
    pub(crate) link: &'static str,
    pub(crate) summary: &'static str,
    pub(crate) category_id: i64,
}

pub(crate) const SEED_CATEGORIES: &[SeedCategory] = &[SeedCategory {
    id: 1,
    name: "Organizational",
}];

pub(crate) const SEED_RECORDS: &[SeedRecord] = &[
    SeedRecord {
        id: 1,
        title: "Guiding Principles",
        date: "2023-06-09",
        organization: "index",
        link: "https://docs.indexcoop.com/index-coop-community-handbook/our-guiding-principles",
        summary: "This is the summary text for the Index Coop Guiding Principles.",
        category_id: 1,
    },
    SeedRecord {
        id: 2,
        title: "Principles for Operational Excellence",
        date: "2023-06-10",
        organization: "index",
        link: "https://gov.indexcoop.com/t/10-principles-for-operational-excellence-at-the-index-coop/4369",
        summary: "10 Principles for Operational Excellence at the Index Coop\ncategory: Organizational",
        category_id: 1,
    },
    SeedRecord {
        id: 3,
        title: "Conflict Resolution Process",
        date: "2023-06-11",
        organization: "index",
        link: "https://gov.indexcoop.com/t/conflict-management-framework-and-tools/3751",
        summary: "Conflict Management - Framework and Tools",
        category_id: 1,
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct SeedReport {
    pub(crate) created: usize,
    pub(crate) unchanged: usize,
}

impl SeedReport {
    fn count(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

fn seed_date(day: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
        CatalogError::InvalidDate {
            value: day.to_string(),
            reason: e.to_string(),
        }
    })?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| CatalogError::InvalidDate {
        value: day.to_string(),
        reason: "no midnight".to_string(),
    })?;
    Ok(midnight.and_utc())
}

/// Upsert the static categories, then the static records, in one transaction.
pub(crate) fn run_seed(db: &mut CatalogDb) -> Result<SeedReport> {
    let report = db.transaction(|db| {
        let mut report = SeedReport::default();
        for category in SEED_CATEGORIES {
            let outcome = db.upsert_category(&NewCategory {
                id: category.id,
                name: category.name,
            })?;
            debug!(id = category.id, ?outcome, "category");
            report.count(outcome);
        }
        for record in SEED_RECORDS {
            let outcome = db.upsert_record(&NewRecord {
                id: record.id,
                title: record.title,
                date: seed_date(record.date)?,
                organization: record.organization,
                link: record.link,
                summary: record.summary,
                category_id: record.category_id,
            })?;
            debug!(id = record.id, ?outcome, "record");
            report.count(outcome);
        }
        Ok(report)
    })?;
    info!(
        created = report.created,
        unchanged = report.unchanged,
        "seed complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn seed_populates_empty_database() {
        let mut db = CatalogDb::open_in_memory().unwrap();
        let report = run_seed(&mut db).unwrap();
        assert_eq!(
            report,
            SeedReport {
                created: 4,
                unchanged: 0
            }
        );
        assert_eq!(db.category_count().unwrap(), 1);
        assert_eq!(db.record_count().unwrap(), 3);

        let record = db.record_by_id(2).unwrap().unwrap();
        assert_eq!(record.title, "Principles for Operational Excellence");
        assert_eq!(record.date, Utc.with_ymd_and_hms(2023, 6, 10, 0, 0, 0).unwrap());
        assert!(record.summary.ends_with("\ncategory: Organizational"));
    }

    #[test]
    fn reseeding_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.sqlite");
        {
            let mut db = CatalogDb::open_or_create(&path).unwrap();
            run_seed(&mut db).unwrap();
        }
        let mut db = CatalogDb::open(&path).unwrap();
        let report = run_seed(&mut db).unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.unchanged, 4);
        assert_eq!(db.record_count().unwrap(), 3);
    }

    #[test]
    fn reseeding_keeps_local_edits() {
        let mut db = CatalogDb::open_in_memory().unwrap();
        db.upsert_category(&NewCategory {
            id: 1,
            name: "Governance",
        })
        .unwrap();
        let report = run_seed(&mut db).unwrap();
        assert_eq!(report.unchanged, 1);
        assert_eq!(db.category_by_id(1).unwrap().unwrap().name, "Governance");
    }

    #[test]
    fn seed_dates_are_midnight_utc() {
        assert_eq!(
            seed_date("2023-06-11").unwrap(),
            Utc.with_ymd_and_hms(2023, 6, 11, 0, 0, 0).unwrap()
        );
        assert!(seed_date("11/06/2023").is_err());
    }

    #[test]
    fn every_record_references_a_seed_category() {
        for record in SEED_RECORDS {
            assert!(SEED_CATEGORIES.iter().any(|c| c.id == record.category_id));
        }
    }
}
