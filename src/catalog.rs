use std::{
    collections::{BTreeSet, HashSet},
    fs,
    io,
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schedule_item::ScheduleItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Keep only broadcasts of products in `items`, and record every crawled
    /// date in `dates`.
    #[default]
    Filtered,
    /// Write the whole crawl to `schedule`, leave `dates` alone.
    ReplaceAll,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file {0:?} does not exist")]
    Missing(PathBuf),
    #[error("failed to access catalog file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("catalog file {path:?} is not valid JSON")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog document must be a JSON object")]
    NotAnObject,
    #[error("failed to serialize schedule")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub mode: ReconcileMode,
    pub collected: usize,
    /// What was written to `schedule`.
    pub written: Vec<ScheduleItem>,
    /// What was written to `dates`; empty in replace-all mode.
    pub dates: Vec<String>,
}

/// Codes of every inventory item, stringified and trimmed.
fn inventory_codes(document: &Map<String, Value>) -> HashSet<String> {
    let Some(Value::Array(items)) = document.get("items") else {
        return HashSet::new();
    };
    items
        .iter()
        .filter_map(|item| match item.get("code")? {
            Value::String(code) => Some(code.trim().to_string()),
            Value::Number(code) => Some(code.to_string()),
            _ => None,
        })
        .collect()
}

/// Rewrites the `schedule` (and in filtered mode `dates`) fields of an
/// already loaded catalog document. Every other field is left untouched.
pub fn reconcile(
    document: &mut Map<String, Value>,
    schedule: &[ScheduleItem],
    mode: ReconcileMode,
) -> Result<ReconcileReport, CatalogError> {
    let (written, dates) = match mode {
        ReconcileMode::Filtered => {
            let codes = inventory_codes(document);
            let matched: Vec<ScheduleItem> = schedule
                .iter()
                .filter(|item| codes.contains(item.code.trim()))
                .cloned()
                .collect();
            let dates: Vec<String> = schedule
                .iter()
                .map(|item| item.date.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let dates_value = serde_json::to_value(&dates).map_err(CatalogError::Serialize)?;
            document.insert("dates".to_string(), dates_value);
            (matched, dates)
        }
        ReconcileMode::ReplaceAll => (schedule.to_vec(), vec![]),
    };
    let schedule_value = serde_json::to_value(&written).map_err(CatalogError::Serialize)?;
    document.insert("schedule".to_string(), schedule_value);
    Ok(ReconcileReport {
        mode,
        collected: schedule.len(),
        written,
        dates,
    })
}

pub fn read_catalog(path: &Path) -> Result<Map<String, Value>, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::Missing(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value = serde_json::from_str(&contents).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match document {
        Value::Object(document) => Ok(document),
        _ => Err(CatalogError::NotAnObject),
    }
}

/// Writes next to the catalog first and renames over it, so readers never see
/// a half written file.
pub fn write_catalog(path: &Path, document: &Map<String, Value>) -> Result<(), CatalogError> {
    let io_error = |source: io::Error| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut contents = serde_json::to_string_pretty(document).map_err(CatalogError::Serialize)?;
    contents.push('\n');
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents).map_err(io_error)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            warn!("Could not remove {:?}: {cleanup}", tmp_path);
        }
        return Err(io_error(e));
    }
    Ok(())
}

/// Loads the catalog at `path`, reconciles the crawl into it and writes it
/// back. A missing file is reported as [`CatalogError::Missing`] and nothing
/// is written.
pub fn update_catalog(
    path: &Path,
    schedule: &[ScheduleItem],
    mode: ReconcileMode,
) -> Result<ReconcileReport, CatalogError> {
    let mut document = read_catalog(path)?;
    let report = reconcile(&mut document, schedule, mode)?;
    write_catalog(path, &document)?;
    info!(
        "Updated {:?}: {} of {} broadcasts written",
        path,
        report.written.len(),
        report.collected
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(date: &str, code: &str) -> ScheduleItem {
        ScheduleItem {
            date: date.to_string(),
            time: "10:00".to_string(),
            code: code.to_string(),
            name: format!("상품 {code}"),
        }
    }

    fn document(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn filtered_keeps_inventory_matches_and_all_dates() {
        let mut doc = document(json!({
            "items": [{ "code": "100" }, { "code": 200 }],
            "schedule": [{ "stale": true }],
            "rentals": [{ "code": "100" }],
        }));
        let schedule = vec![
            item("2024-03-06", "100"),
            item("2024-03-05", "300"),
            item("2024-03-07", "200"),
        ];
        let report = reconcile(&mut doc, &schedule, ReconcileMode::Filtered).unwrap();

        let codes: Vec<_> = report.written.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["100", "200"]);
        assert_eq!(report.collected, 3);
        assert_eq!(report.dates, vec!["2024-03-05", "2024-03-06", "2024-03-07"]);
        assert_eq!(doc["dates"], json!(["2024-03-05", "2024-03-06", "2024-03-07"]));
        assert_eq!(doc["schedule"].as_array().unwrap().len(), 2);
        assert_eq!(doc["rentals"], json!([{ "code": "100" }]));
    }

    #[test]
    fn filtered_trims_codes_on_both_sides() {
        let mut doc = document(json!({ "items": [{ "code": " 100 " }] }));
        let schedule = vec![item("2024-03-05", "100 ")];
        let report = reconcile(&mut doc, &schedule, ReconcileMode::Filtered).unwrap();
        assert_eq!(report.written.len(), 1);
    }

    #[test]
    fn filtered_without_matches_still_records_dates() {
        let mut doc = document(json!({ "items": [] }));
        let schedule = vec![item("2024-03-05", "1"), item("2024-03-05", "2")];
        let report = reconcile(&mut doc, &schedule, ReconcileMode::Filtered).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(doc["schedule"], json!([]));
        assert_eq!(doc["dates"], json!(["2024-03-05"]));
    }

    #[test]
    fn replace_all_writes_everything_and_leaves_dates() {
        let mut doc = document(json!({ "items": [], "dates": ["2000-01-01"] }));
        let schedule = vec![item("2024-03-05", "1"), item("2024-03-06", "2")];
        let report = reconcile(&mut doc, &schedule, ReconcileMode::ReplaceAll).unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(doc["schedule"].as_array().unwrap().len(), 2);
        assert_eq!(doc["dates"], json!(["2000-01-01"]));
    }

    #[test]
    fn missing_catalog_is_reported() {
        let path = std::env::temp_dir().join("hmall_schedule_missing_catalog.json");
        let _ = fs::remove_file(&path);
        let err = update_catalog(&path, &[item("2024-03-05", "1")], ReconcileMode::Filtered)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Missing(_)));
        assert!(!path.exists());
    }

    #[test]
    fn non_object_catalog_is_rejected() {
        let path = std::env::temp_dir().join("hmall_schedule_array_catalog.json");
        fs::write(&path, "[]").unwrap();
        let err = read_catalog(&path).unwrap_err();
        assert!(matches!(err, CatalogError::NotAnObject));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rewrite_keeps_key_order() {
        let path = std::env::temp_dir().join("hmall_schedule_key_order.json");
        fs::write(
            &path,
            r#"{"items":[{"name":"코트","code":"100"}],"schedule":[],"brands":["A"],"rentals":[]}"#,
        )
        .unwrap();
        update_catalog(&path, &[item("2024-03-05", "100")], ReconcileMode::Filtered).unwrap();

        let written = read_catalog(&path).unwrap();
        let keys: Vec<_> = written.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["items", "schedule", "brands", "rentals", "dates"]);
        let item_keys: Vec<_> = written["items"][0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(item_keys, vec!["name", "code"]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = std::env::temp_dir().join("hmall_schedule_catalog_dir");
        fs::create_dir_all(dir.join("occupied")).unwrap();
        let tmp_path = std::env::temp_dir().join("hmall_schedule_catalog_dir.tmp");

        let err = write_catalog(&dir, &document(json!({ "items": [] }))).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(!tmp_path.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
