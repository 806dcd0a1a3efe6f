//! Chart configurations generated from the distribution counts.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// One chart: the field it stands for, the template block it fills and its
/// `(label, source field)` series in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub field: &'static str,
    pub block_id: &'static str,
    pub series: &'static [(&'static str, &'static str)],
}

/// The three charts of a report.
pub static CHARTS: &[ChartSpec] = &[
    ChartSpec {
        field: "chart_us_status",
        block_id: "chart-us-status",
        series: &[
            ("To do", "us_todo"),
            ("In progress", "us_in_progress"),
            ("In review", "us_in_review"),
            ("Validated", "us_validated"),
            ("Rejected", "us_rejected"),
            ("Blocked", "us_blocked"),
        ],
    },
    ChartSpec {
        field: "chart_defects_severity",
        block_id: "chart-defects-severity",
        series: &[
            ("Critical", "defauts_critical"),
            ("High", "defauts_high"),
            ("Medium", "defauts_medium"),
            ("Low", "defauts_low"),
        ],
    },
    ChartSpec {
        field: "chart_test_results",
        block_id: "chart-test-results",
        series: &[
            ("Passed", "nb_tests_passed"),
            ("Failed", "nb_tests_failed"),
            ("Blocked", "nb_tests_blocked"),
            ("Not run", "nb_tests_not_run"),
        ],
    },
];

/// Configuration consumed by the charting script embedded in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl ChartConfig {
    /// Serializes to JSON, safe to embed inside a `<script>` element.
    pub fn to_json(&self) -> String {
        serde_json::json!({ "labels": self.labels, "values": self.values })
            .to_string()
            .replace("</", "<\\/")
    }
}

impl ChartSpec {
    /// Looks up the chart stored under a field name.
    pub fn for_field(name: &str) -> Option<&'static ChartSpec> {
        CHARTS.iter().find(|chart| chart.field == name)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.series.iter().map(|(label, _)| *label).collect()
    }

    /// Builds the configuration from the record's counts. Labels do not depend
    /// on the data; missing counts are zero.
    pub fn config(&self, record: &Record) -> ChartConfig {
        ChartConfig {
            labels: self.series.iter().map(|(l, _)| l.to_string()).collect(),
            values: self.series.iter().map(|(_, f)| record.count(f)).collect(),
        }
    }
}
