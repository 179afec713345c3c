//! Output for the `records` subcommand.

use std::io::Write;

use crate::{CatalogDb, CatalogError, Record, Result};

/// What the `records` subcommand was asked to show.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RecordsQuery {
    pub(crate) category: Option<i64>,
    pub(crate) id: Option<i64>,
    pub(crate) json: bool,
}

/// Print one record (with `id`) or the newest-first listing, optionally
/// narrowed to a category. Unknown ids are errors.
pub(crate) fn write_records(
    catalog: &CatalogDb,
    query: RecordsQuery,
    out: &mut dyn Write,
) -> Result<()> {
    if let Some(id) = query.id {
        let record = catalog
            .record_by_id(id)?
            .ok_or(CatalogError::RecordNotFound(id))?;
        return write_record(catalog, &record, query.json, out);
    }

    if let Some(category_id) = query.category {
        if catalog.category_by_id(category_id)?.is_none() {
            return Err(CatalogError::CategoryNotFound(category_id));
        }
    }
    let records = catalog.list_records(query.category)?;
    if query.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
        return Ok(());
    }
    if records.is_empty() {
        writeln!(out, "No records found.")?;
        return Ok(());
    }
    for record in &records {
        writeln!(
            out,
            "{:>3}. {}  [{}]  {}",
            record.id,
            record.date.format("%Y-%m-%d"),
            record.organization,
            record.title
        )?;
        writeln!(out, "     {}", record.link)?;
    }
    Ok(())
}

fn write_record(catalog: &CatalogDb, record: &Record, json: bool, out: &mut dyn Write) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
        return Ok(());
    }
    let category = catalog
        .category_by_id(record.category_id)?
        .map(|c| c.name)
        .unwrap_or_else(|| format!("#{}", record.category_id));
    writeln!(out, "{}", record.title)?;
    writeln!(out, "  date:         {}", record.date.format("%Y-%m-%d"))?;
    writeln!(out, "  organization: {}", record.organization)?;
    writeln!(out, "  category:     {category}")?;
    writeln!(out, "  link:         {}", record.link)?;
    writeln!(out)?;
    writeln!(out, "{}", record.summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_seed;

    fn seeded() -> CatalogDb {
        let mut catalog = CatalogDb::open_in_memory().unwrap();
        run_seed(&mut catalog).unwrap();
        catalog
    }

    fn render(catalog: &CatalogDb, query: RecordsQuery) -> Result<String> {
        let mut out = Vec::new();
        write_records(catalog, query, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn unknown_record_id_is_an_error() {
        let catalog = seeded();
        let query = RecordsQuery {
            id: Some(42),
            ..Default::default()
        };
        let err = render(&catalog, query).unwrap_err();
        assert!(matches!(err, CatalogError::RecordNotFound(42)));
        assert_eq!(err.to_string(), "No record with id 42");
    }

    #[test]
    fn unknown_category_is_an_error() {
        let catalog = seeded();
        let query = RecordsQuery {
            category: Some(7),
            ..Default::default()
        };
        let err = render(&catalog, query).unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(7)));
    }

    #[test]
    fn listing_is_newest_first() {
        let catalog = seeded();
        let text = render(&catalog, RecordsQuery::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("  3. 2023-06-11  [index]  Conflict Resolution Process"));
        assert!(lines[1].starts_with("     https://"));
        assert!(lines[2].starts_with("  2. 2023-06-10"));
        assert!(lines[4].starts_with("  1. 2023-06-09  [index]  Guiding Principles"));
    }

    #[test]
    fn json_listing_filters_by_category() {
        let catalog = seeded();
        let query = RecordsQuery {
            category: Some(1),
            json: true,
            ..Default::default()
        };
        let text = render(&catalog, query).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let ids: Vec<i64> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(value[0]["categoryId"], 1);
    }

    #[test]
    fn single_record_shows_category_name() {
        let catalog = seeded();
        let query = RecordsQuery {
            id: Some(1),
            ..Default::default()
        };
        let text = render(&catalog, query).unwrap();
        assert!(text.starts_with("Guiding Principles\n"));
        assert!(text.contains("  date:         2023-06-09\n"));
        assert!(text.contains("  category:     Organizational\n"));

        let json = render(
            &catalog,
            RecordsQuery {
                id: Some(1),
                json: true,
                ..Default::default()
            },
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Guiding Principles");
        assert_eq!(value["organization"], "index");
    }

    #[test]
    fn empty_database_says_so() {
        let catalog = CatalogDb::open_in_memory().unwrap();
        let text = render(&catalog, RecordsQuery::default()).unwrap();
        assert_eq!(text, "No records found.\n");
    }
}
