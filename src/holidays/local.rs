use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info};

use super::HolidaySource;
use crate::error::SourceError;

/// Month-day key used by the holiday table, e.g. "01-01"
pub fn date_key(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

/// Holidays grouped by "MM-DD", loaded once and never mutated
#[derive(Debug, Clone, Default)]
pub struct HolidayTable {
    by_date: HashMap<String, Vec<String>>,
}

impl HolidayTable {
    /// Load the table from a JSON array of `{date, holidays}` records.
    ///
    /// Never fails: a missing or malformed file gives an empty table.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read holiday table");
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(records) => {
                let table = Self::from_records(records);
                info!(path = %path.display(), dates = table.len(), "Loaded holiday table");
                table
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to parse holiday table");
                Self::default()
            }
        }
    }

    /// Build a table from raw JSON records, dropping unusable entries
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut by_date = HashMap::new();

        for record in records {
            let Some(key) = record.get("date").and_then(Value::as_str) else {
                debug!(?record, "Skipping holiday record without date");
                continue;
            };
            let Some(values) = record.get("holidays").and_then(Value::as_array) else {
                debug!(date = key, "Skipping holiday record without holidays list");
                continue;
            };

            let holidays: Vec<String> = values
                .iter()
                .filter_map(Value::as_str)
                .filter(|h| !h.trim().is_empty())
                .map(str::to_string)
                .collect();

            if !holidays.is_empty() {
                by_date.insert(key.to_string(), holidays);
            }
        }

        Self { by_date }
    }

    /// Holidays for a "MM-DD" key, empty when the date is absent
    pub fn holidays_for(&self, key: &str) -> &[String] {
        self.by_date.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

/// Holiday source backed by the static table
pub struct LocalHolidaySource {
    table: HolidayTable,
}

impl LocalHolidaySource {
    pub fn new(table: HolidayTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl HolidaySource for LocalHolidaySource {
    fn name(&self) -> &str {
        "LocalHolidaySource"
    }

    async fn holidays_for(&self, date: NaiveDate) -> Result<Vec<String>, SourceError> {
        if self.table.is_empty() {
            return Err(SourceError::Unavailable(
                "holiday table is empty or failed to load".to_string(),
            ));
        }
        Ok(self.table.holidays_for(&date_key(date)).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn date_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(date_key(date), "03-08");
    }

    #[test]
    fn from_records_drops_unusable_entries() {
        let table = HolidayTable::from_records(vec![
            json!({"date": "01-01", "holidays": ["New Year", "", 5, "New Year"]}),
            json!({"date": "01-02"}),
            json!({"holidays": ["Orphan"]}),
            json!({"date": "01-03", "holidays": "not a list"}),
            json!({"date": "01-04", "holidays": ["  ", null]}),
            json!("not an object"),
            json!({"date": 105, "holidays": ["Numeric date"]}),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.holidays_for("01-01"), ["New Year", "New Year"]);
        assert!(table.holidays_for("01-04").is_empty());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"date": "05-09", "holidays": ["День Победы"]}}]"#
        )
        .unwrap();

        let table = HolidayTable::load(file.path());
        assert_eq!(table.holidays_for("05-09"), ["День Победы"]);
    }

    #[test]
    fn load_missing_or_malformed_gives_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HolidayTable::load(&dir.path().join("holidays.json")).is_empty());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"date\": ").unwrap();
        assert!(HolidayTable::load(file.path()).is_empty());
    }

    #[tokio::test]
    async fn empty_table_is_unavailable() {
        let source = LocalHolidaySource::new(HolidayTable::default());
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            source.holidays_for(date).await,
            Err(SourceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn absent_date_is_an_empty_list() {
        let table = HolidayTable::from_records(vec![json!({"date": "01-01", "holidays": ["New Year"]})]);
        let source = LocalHolidaySource::new(table);
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(source.holidays_for(date).await.unwrap().is_empty());
    }
}
