//! Legacy record normalization and the record loading boundary.
//!
//! Early records stored the package version under `package` and the sprint
//! number in `package_version`. [`migrate`] rewrites them into the current
//! shape; it is a no-op on current records and on its own output.

use tracing::{debug, warn};

use crate::defaults::default_record;
use crate::error::Result;
use crate::record::Record;

/// Legacy field holding the package version.
pub const LEGACY_PACKAGE_FIELD: &str = "package";
/// Current field holding the package version.
pub const VERSION_FIELD: &str = "package_version";
/// Current field holding the sprint number.
pub const SPRINT_FIELD: &str = "sprint";

/// Whether a record still has the legacy shape.
pub fn needs_migration(record: &Record) -> bool {
    record.contains(LEGACY_PACKAGE_FIELD)
}

/// Rewrites a legacy record into the current shape.
///
/// A sprint-like value (non-empty, no `.`) found in `package_version` moves to
/// `sprint`, then `package` moves to `package_version`. Other fields are
/// untouched.
pub fn migrate(mut record: Record) -> Record {
    if !needs_migration(&record) {
        return record;
    }

    let previous = record.text(VERSION_FIELD);
    let previous = previous.trim();
    if !previous.is_empty() && !previous.contains('.') {
        debug!(sprint = previous, "moving sprint number out of version field");
        record.set(SPRINT_FIELD, previous);
    }

    if let Some(package) = record.remove(LEGACY_PACKAGE_FIELD) {
        record.set(VERSION_FIELD, package);
    }
    record
}

/// Parses, migrates and completes a persisted record.
///
/// # Errors
///
/// Fails if the text is not a JSON object.
pub fn try_load_record(raw: &str) -> Result<Record> {
    let record = Record::from_json_str(raw)?;
    Ok(migrate(record).merged_onto_defaults())
}

/// Like [`try_load_record`], but a malformed record yields the default record.
pub fn load_record(raw: &str) -> Record {
    match try_load_record(raw) {
        Ok(record) => record,
        Err(err) => {
            warn!(error = %err, "unreadable record, starting from defaults");
            default_record()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy(version: &str) -> Record {
        let mut record = Record::new();
        record.set("project_name", "Atlas");
        record.set("package", "3.2.1");
        record.set("package_version", version);
        record
    }

    #[test]
    fn sprint_number_moves() {
        let migrated = migrate(legacy("14"));
        assert_eq!(migrated.get("sprint"), Some(&json!("14")));
        assert_eq!(migrated.get("package_version"), Some(&json!("3.2.1")));
        assert!(!migrated.contains("package"));
        assert_eq!(migrated.get("project_name"), Some(&json!("Atlas")));
    }

    #[test]
    fn dotted_version_is_not_a_sprint() {
        let migrated = migrate(legacy("3.2.0"));
        assert!(!migrated.contains("sprint"));
        assert_eq!(migrated.get("package_version"), Some(&json!("3.2.1")));
    }

    #[test]
    fn empty_version_does_not_clear_sprint() {
        let mut record = legacy("");
        record.set("sprint", "9");
        let migrated = migrate(record);
        assert_eq!(migrated.get("sprint"), Some(&json!("9")));
    }

    #[test]
    fn idempotent() {
        let once = migrate(legacy("14"));
        assert_eq!(migrate(once.clone()), once);
    }

    #[test]
    fn current_record_untouched() {
        let mut record = Record::new();
        record.set("package_version", "14");
        assert_eq!(migrate(record.clone()), record);
    }

    #[test]
    fn load_record_falls_back_to_defaults() {
        assert_eq!(load_record("{not json"), default_record());
        assert_eq!(load_record("[1, 2]"), default_record());
    }

    #[test]
    fn load_record_migrates_and_merges() {
        let record = load_record(r#"{"package": "2.0.0", "package_version": "5", "extra": 1}"#);
        assert_eq!(record.get("package_version"), Some(&json!("2.0.0")));
        assert_eq!(record.get("sprint"), Some(&json!("5")));
        assert_eq!(record.get("extra"), Some(&json!(1)));
        assert!(record.contains("defauts_identified"));
        assert!(try_load_record("42").is_err());
    }
}
