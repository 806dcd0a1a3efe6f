//! Derived numeric fields.
//!
//! These values are owned by the engine: whatever the caller stored is
//! overwritten by [`recompute`] before every population.

use crate::record::Record;

/// `round(100 * numerator / denominator)`, rounding halves up.
///
/// A zero denominator yields 0 and a numerator above the denominator clamps
/// to 100, so the result is always in `[0, 100]`.
pub fn percent(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let n = numerator.min(denominator) as u128;
    let d = denominator as u128;
    ((200 * n + d) / (2 * d)) as u64
}

/// Defect counters derived from the per-severity counts.
///
/// `active` is signed: closing more defects than were identified in the
/// sprint leaves a negative backlog rather than hiding the mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefectSummary {
    pub identified: u64,
    pub resolved: u64,
    pub active: i64,
    pub resolution_rate: u64,
}

impl DefectSummary {
    pub fn compute(critical: u64, high: u64, medium: u64, low: u64, closed: u64) -> Self {
        let identified = critical
            .saturating_add(high)
            .saturating_add(medium)
            .saturating_add(low);
        let resolved = closed;
        Self {
            identified,
            resolved,
            active: signed(identified).saturating_sub(signed(resolved)),
            resolution_rate: percent(resolved, identified),
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self::compute(
            record.count("defauts_critical"),
            record.count("defauts_high"),
            record.count("defauts_medium"),
            record.count("defauts_low"),
            record.count("defauts_closed"),
        )
    }
}

fn signed(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Test campaign counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CampaignSummary {
    pub total: u64,
    pub executed: u64,
    pub execution_rate: u64,
    pub pass_rate: u64,
    pub automation_rate: u64,
}

impl CampaignSummary {
    pub fn from_record(record: &Record) -> Self {
        let passed = record.count("nb_tests_passed");
        let not_run = record.count("nb_tests_not_run");
        let total = passed
            .saturating_add(record.count("nb_tests_failed"))
            .saturating_add(record.count("nb_tests_blocked"))
            .saturating_add(not_run);
        let executed = total - not_run;
        Self {
            total,
            executed,
            execution_rate: percent(executed, total),
            pass_rate: percent(passed, executed),
            automation_rate: percent(record.count("nb_automated_tests"), total),
        }
    }
}

/// User-story status fields, in chart order.
pub const USER_STORY_STATUSES: &[&str] = &[
    "us_todo",
    "us_in_progress",
    "us_in_review",
    "us_validated",
    "us_rejected",
    "us_blocked",
];

/// Recomputes every derived numeric field in place.
pub fn recompute(record: &mut Record) {
    let us_total = USER_STORY_STATUSES
        .iter()
        .fold(0u64, |acc, name| acc.saturating_add(record.count(name)));
    let us_validated = percent(record.count("us_validated"), us_total);
    record.set("nb_us_total", us_total);
    record.set("taux_us_validated", us_validated);

    let campaign = CampaignSummary::from_record(record);
    record.set("nb_tests_total", campaign.total);
    record.set("nb_tests_executed", campaign.executed);
    record.set("taux_execution", campaign.execution_rate);
    record.set("taux_reussite", campaign.pass_rate);
    record.set("pct_automation", campaign.automation_rate);

    let defects = DefectSummary::from_record(record);
    record.set("defauts_identified", defects.identified);
    record.set("defauts_resolved", defects.resolved);
    record.set("defauts_active", defects.active);
    record.set("taux_resolution", defects.resolution_rate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn percent_zero_denominator() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(7, 0), 0);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13); // 12.5
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn percent_clamps() {
        assert_eq!(percent(5, 3), 100);
    }

    #[test]
    fn defect_summary_example() {
        let summary = DefectSummary::compute(1, 2, 0, 0, 3);
        assert_eq!(
            summary,
            DefectSummary {
                identified: 3,
                resolved: 3,
                active: 0,
                resolution_rate: 100
            }
        );
    }

    #[test]
    fn defect_summary_more_closed_than_identified() {
        let summary = DefectSummary::compute(1, 0, 0, 0, 3);
        assert_eq!(summary.identified, 1);
        assert_eq!(summary.resolved, 3);
        assert_eq!(summary.active, -2);
        assert_eq!(summary.resolution_rate, 100);
    }

    #[test]
    fn recompute_writes_negative_backlog() {
        let mut record = Record::new();
        record.set("defauts_low", 1);
        record.set("defauts_closed", 4);
        recompute(&mut record);
        assert_eq!(record.get("defauts_active"), Some(&json!(-3)));
    }

    #[test]
    fn defect_summary_all_zero() {
        assert_eq!(DefectSummary::compute(0, 0, 0, 0, 0), DefectSummary::default());
    }

    #[test]
    fn recompute_overwrites_stored_values() {
        let mut record = Record::new();
        record.set("defauts_high", 4);
        record.set("defauts_closed", 1);
        record.set("defauts_identified", 999);
        record.set("nb_tests_passed", 6);
        record.set("nb_tests_failed", 2);
        record.set("nb_tests_not_run", 2);
        record.set("nb_automated_tests", 5);
        record.set("us_validated", "3");
        record.set("us_todo", 1);
        recompute(&mut record);

        assert_eq!(record.get("defauts_identified"), Some(&json!(4)));
        assert_eq!(record.get("defauts_active"), Some(&json!(3)));
        assert_eq!(record.get("taux_resolution"), Some(&json!(25)));
        assert_eq!(record.get("nb_tests_total"), Some(&json!(10)));
        assert_eq!(record.get("nb_tests_executed"), Some(&json!(8)));
        assert_eq!(record.get("taux_execution"), Some(&json!(80)));
        assert_eq!(record.get("taux_reussite"), Some(&json!(75)));
        assert_eq!(record.get("pct_automation"), Some(&json!(50)));
        assert_eq!(record.get("nb_us_total"), Some(&json!(4)));
        assert_eq!(record.get("taux_us_validated"), Some(&json!(75)));
    }
}
