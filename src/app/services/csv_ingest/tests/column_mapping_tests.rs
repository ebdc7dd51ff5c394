//! Tests for header resolution in both dialects

use super::*;
use crate::ErrorKind;
use crate::app::services::csv_ingest::column_mapping::{
    ColumnResolver, FlexibleResolver, LegacyResolver, resolver_for,
};
use crate::constants::{FLEXIBLE_COLUMNS, columns};

fn resolve(header: &str) -> crate::Result<crate::app::services::csv_ingest::ColumnMap> {
    FlexibleResolver::new().resolve_header(&row(header))
}

#[test]
fn test_flexible_maps_recognized_columns_by_position() {
    let map = resolve("time;leaf_wetness;date;atmospheric_temperature").unwrap();

    assert_eq!(map.get_index(columns::TIME), Some(0));
    assert_eq!(map.get_index(columns::LEAF_WETNESS), Some(1));
    assert_eq!(map.get_index(columns::DATE), Some(2));
    assert_eq!(map.get_index(columns::ATMOSPHERIC_TEMPERATURE), Some(3));
    assert_eq!(map.len(), 4);
    assert_eq!(map.width(), 4);
}

#[test]
fn test_flexible_ignores_unknown_columns() {
    let map = resolve("date;station_serial;time;precipitation").unwrap();

    assert_eq!(map.stats(), (3, 1));
    assert_eq!(map.ignored_columns, vec!["station_serial".to_string()]);
    assert!(!map.has_column("station_serial"));
    assert_eq!(map.get_index(columns::PRECIPITATION), Some(3));
}

#[test]
fn test_flexible_trims_header_names() {
    let map = resolve(" date ; time ;wind_gust ").unwrap();
    assert_eq!(map.get_index(columns::WIND_GUST), Some(2));
}

#[test]
fn test_flexible_rejects_date_time_only() {
    let error = resolve("date;time").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SchemaViolation);
    assert!(error.to_string().contains("insufficient information"));
}

#[test]
fn test_flexible_rejects_missing_mandatory_columns() {
    let error = resolve("date;precipitation;wind_gust").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SchemaViolation);
    assert!(error.to_string().contains("mandatory columns missing: time"));

    let error = resolve("precipitation;wind_gust;leaf_wetness").unwrap_err();
    assert!(error.to_string().contains("date, time"));
}

#[test]
fn test_flexible_rejects_too_few_recognized_columns() {
    // Three header columns, but only date and time are recognized
    let error = resolve("date;time;comment").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SchemaViolation);
    assert!(error.to_string().contains("insufficient information"));
}

#[test]
fn test_flexible_rejects_too_many_columns() {
    let mut names: Vec<String> = FLEXIBLE_COLUMNS.iter().map(|s| s.to_string()).collect();
    names.push("extra".to_string());
    let error = resolve(&names.join(";")).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::SchemaViolation);
    assert!(
        error
            .to_string()
            .contains("dataset has more columns than supported")
    );
}

#[test]
fn test_flexible_accepts_full_catalog() {
    let map = resolve(&FLEXIBLE_COLUMNS.join(";")).unwrap();
    assert_eq!(map.len(), FLEXIBLE_COLUMNS.len());
    assert!(map.ignored_columns.is_empty());
}

#[test]
fn test_flexible_repeated_column_keeps_first() {
    let map = resolve("date;time;wind_gust;wind_gust").unwrap();
    assert_eq!(map.get_index(columns::WIND_GUST), Some(2));
    assert_eq!(map.width(), 3);
}

#[test]
fn test_flexible_check_row_rejects_short_rows() {
    let resolver = FlexibleResolver::new();
    let map = resolver
        .resolve_header(&row("date;time;precipitation;wind_gust"))
        .unwrap();

    assert!(resolver.check_row(&row("2023-05-01;12:00:00;1;2"), &map).is_ok());
    let error = resolver
        .check_row(&row("2023-05-01;12:00:00;1"), &map)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ParseFailure);
}

#[test]
fn test_legacy_ignores_header_contents() {
    let resolver = LegacyResolver::new();
    let map = resolver.resolve_header(&row("whatever;goes;here")).unwrap();

    assert_eq!(map.len(), 14);
    assert_eq!(map.get_index(columns::DATE), Some(0));
    assert_eq!(map.get_index(columns::NUTS2), Some(3));
    assert_eq!(map.get_index(columns::SOLAR_IRRADIANCE_COPERNICUS), Some(13));
}

#[test]
fn test_legacy_check_row_requires_fourteen_fields() {
    let resolver = LegacyResolver::new();
    let map = resolver.resolve_header(&row("h")).unwrap();

    assert!(resolver.check_row(&row(LEGACY_ROW), &map).is_ok());

    let short = "2023-05-01;12:00:00;PT184;PT18;21,5;65;0;3,2;270;7,5";
    let error = resolver.check_row(&row(short), &map).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ParseFailure);
    assert!(error.to_string().contains("missing columns"));
}

#[test]
fn test_resolver_for_dialect() {
    assert_eq!(resolver_for(Dialect::Flexible).dialect(), Dialect::Flexible);
    assert_eq!(resolver_for(Dialect::Legacy).dialect(), Dialect::Legacy);
}
