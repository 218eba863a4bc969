//! Derived filter/sort view over roster records.
//!
//! The roster itself only guarantees insertion order; every admin screen
//! layers a case-insensitive substring filter and an explicit sort on top
//! before rendering. Sorting uses `sort_by`, which is stable, so records
//! with equal keys keep their roster order.

use chrono::{DateTime, Utc};

use bazaar_core::Searchable;

/// Sort direction for a [`SortKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A typed sort key over a record type.
///
/// Plain function pointers keep keys nameable in match arms and trivially
/// testable; each admin screen maps its column names onto these.
pub enum SortKey<E> {
    Numeric(fn(&E) -> i64),
    Float(fn(&E) -> f64),
    Text(fn(&E) -> String),
    Timestamp(fn(&E) -> DateTime<Utc>),
}

/// Case-insensitive substring filter over each record's display fields.
///
/// An empty or whitespace-only query matches everything.
pub fn filter_records<'a, E: Searchable>(records: &'a [E], query: &str) -> Vec<&'a E> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| {
            record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Sort records in place by `key`, stably.
pub fn sort_records<E>(records: &mut [E], key: &SortKey<E>, direction: SortDirection) {
    match key {
        SortKey::Numeric(field) => records.sort_by(|a, b| ordered(field(a).cmp(&field(b)), direction)),
        SortKey::Float(field) => {
            records.sort_by(|a, b| ordered(field(a).total_cmp(&field(b)), direction))
        }
        SortKey::Text(field) => records.sort_by(|a, b| ordered(field(a).cmp(&field(b)), direction)),
        SortKey::Timestamp(field) => {
            records.sort_by(|a, b| ordered(field(a).cmp(&field(b)), direction))
        }
    }
}

fn ordered(ordering: std::cmp::Ordering, direction: SortDirection) -> std::cmp::Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use bazaar_core::{AppRecord, AppStatus, EntityId};

    use super::*;

    fn app(id: &str, name: &str, category: &str, downloads: u64, day: u32) -> AppRecord {
        AppRecord {
            id: EntityId::from(id),
            name: name.to_string(),
            developer: EntityId::from("dev-1"),
            category: category.to_string(),
            status: AppStatus::Published,
            downloads,
            rating_sum: 0,
            rating_count: 0,
            updated_at: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
        }
    }

    fn fixture() -> Vec<AppRecord> {
        vec![
            app("app-1", "Ledgerly", "finance", 900, 3),
            app("app-2", "Sky Atlas", "navigation", 4_000, 1),
            app("app-3", "Waypoint", "navigation", 900, 2),
        ]
    }

    #[rstest]
    #[case("NAVIG", vec!["app-2", "app-3"])]
    #[case("ledger", vec!["app-1"])]
    #[case("app-3", vec!["app-3"])]
    #[case("  ", vec!["app-1", "app-2", "app-3"])]
    #[case("zeppelin", vec![])]
    fn filter_is_case_insensitive_over_display_fields(
        #[case] query: &str,
        #[case] expected: Vec<&str>,
    ) {
        let records = fixture();
        let hits: Vec<&str> = filter_records(&records, query)
            .iter()
            .map(|a| a.id.0.as_str())
            .collect();
        assert_eq!(hits, expected);
    }

    #[test]
    fn numeric_sort_descending() {
        let mut records = fixture();
        sort_records(
            &mut records,
            &SortKey::Numeric(|a: &AppRecord| a.downloads as i64),
            SortDirection::Descending,
        );
        let ids: Vec<&str> = records.iter().map(|a| a.id.0.as_str()).collect();
        // app-1 and app-3 tie on downloads; stable sort keeps roster order.
        assert_eq!(ids, ["app-2", "app-1", "app-3"]);
    }

    #[test]
    fn text_sort_ascending() {
        let mut records = fixture();
        sort_records(
            &mut records,
            &SortKey::Text(|a: &AppRecord| a.name.clone()),
            SortDirection::Ascending,
        );
        let names: Vec<&str> = records.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Ledgerly", "Sky Atlas", "Waypoint"]);
    }

    #[test]
    fn timestamp_sort_descending() {
        let mut records = fixture();
        sort_records(
            &mut records,
            &SortKey::Timestamp(|a: &AppRecord| a.updated_at),
            SortDirection::Descending,
        );
        let ids: Vec<&str> = records.iter().map(|a| a.id.0.as_str()).collect();
        assert_eq!(ids, ["app-1", "app-3", "app-2"]);
    }

    #[test]
    fn float_sort_orders_by_average_rating() {
        let mut records = fixture();
        records[0].rating_sum = 9;
        records[0].rating_count = 2; // 4.5
        records[1].rating_sum = 8;
        records[1].rating_count = 4; // 2.0
        sort_records(
            &mut records,
            &SortKey::Float(AppRecord::average_rating),
            SortDirection::Descending,
        );
        let ids: Vec<&str> = records.iter().map(|a| a.id.0.as_str()).collect();
        assert_eq!(ids, ["app-1", "app-2", "app-3"]);
    }
}
