//! Export to the JSON file format that `import` reads back.

use chrono::NaiveDate;

use toby_domain::Collection;

use crate::error::Result;

const FILENAME_PREFIX: &str = "toby-collections";

/// Pretty-printed UTF-8 JSON array of collection records
pub fn export_json(collections: &[Collection]) -> Result<String> {
    Ok(serde_json::to_string_pretty(collections)?)
}

/// Suggested download name, e.g. `toby-collections-2024-05-01.json`
pub fn export_filename(date: NaiveDate) -> String {
    format!("{}-{}.json", FILENAME_PREFIX, date.format("%Y-%m-%d"))
}

/// Suggested download name for today's date (UTC)
pub fn export_filename_today() -> String {
    export_filename(chrono::Utc::now().date_naive())
}
