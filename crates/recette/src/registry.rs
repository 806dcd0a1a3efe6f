//! Static registry of every field a report record knows about.
//!
//! Field behavior is a table lookup rather than a guess from the name: the
//! registry says whether a field is plain text, a count, a percentage, trusted
//! HTML, a list, a multi-select set, a chart or a link, and whether the engine
//! recomputes it. Names the registry does not know fall back to the historical
//! prefix convention ([`FieldKind::infer`]).
//!
//! The table order is also the field order of the default record.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// How a field is stored, rendered and extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free text, rendered escaped.
    Text,
    /// Non-negative integer count.
    Number,
    /// Integer percentage, rendered with a `%` suffix.
    Percent,
    /// Trusted HTML that replaces its wrapping paragraph.
    RichText,
    /// HTML list markup or newline-separated text rendered as `<li>` items.
    List,
    /// Array of values from a fixed domain, rendered as badges.
    MultiSelect,
    /// Chart configuration, always regenerated from counts.
    Chart,
    /// URL attached to one or more rendered fields.
    Link,
}

/// Long-form narrative fields whose values are HTML.
pub const NARRATIVE_FIELDS: &[&str] = &[
    "executive_summary",
    "scope_notes",
    "conclusion",
    "recommendations",
    "risks",
    "next_steps",
];

impl FieldKind {
    /// Infers a kind from the naming convention alone.
    ///
    /// Precedence: `chart_` prefix, then `taux_` anywhere or `pct_` prefix,
    /// then `nb_`/`bs_` prefix, then `link_` prefix, then the narrative set,
    /// then text.
    pub fn infer(name: &str) -> FieldKind {
        if name.starts_with("chart_") {
            FieldKind::Chart
        } else if name.contains("taux_") || name.starts_with("pct_") {
            FieldKind::Percent
        } else if name.starts_with("nb_") || name.starts_with("bs_") {
            FieldKind::Number
        } else if name.starts_with("link_") {
            FieldKind::Link
        } else if NARRATIVE_FIELDS.contains(&name) {
            FieldKind::RichText
        } else {
            FieldKind::Text
        }
    }

    /// Whether values of this kind are numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Percent)
    }

    /// Whether the extractor can recover this kind from rendered markup.
    pub fn is_extractable(self) -> bool {
        !matches!(
            self,
            FieldKind::RichText | FieldKind::List | FieldKind::MultiSelect | FieldKind::Chart
        )
    }
}

/// One registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Recomputed from other fields before every population.
    pub derived: bool,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        derived: false,
    }
}

const fn derived(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        derived: true,
    }
}

use FieldKind::*;

/// Every known field, in default-record order.
pub static FIELDS: &[FieldSpec] = &[
    // Identification
    field("project_name", Text),
    field("application", Text),
    field("package_version", Text),
    field("sprint", Text),
    field("report_date", Text),
    field("test_period", Text),
    field("author", Text),
    field("release_manager", Text),
    field("team", Text),
    field("environments", MultiSelect),
    field("countries", MultiSelect),
    // Narrative
    field("executive_summary", RichText),
    field("scope_notes", RichText),
    field("conclusion", RichText),
    field("recommendations", List),
    field("risks", List),
    field("next_steps", List),
    // User stories
    field("us_todo", Number),
    field("us_in_progress", Number),
    field("us_in_review", Number),
    field("us_validated", Number),
    field("us_rejected", Number),
    field("us_blocked", Number),
    derived("nb_us_total", Number),
    derived("taux_us_validated", Percent),
    // Test campaign
    field("nb_tests_passed", Number),
    field("nb_tests_failed", Number),
    field("nb_tests_blocked", Number),
    field("nb_tests_not_run", Number),
    derived("nb_tests_total", Number),
    derived("nb_tests_executed", Number),
    derived("taux_execution", Percent),
    derived("taux_reussite", Percent),
    field("nb_automated_tests", Number),
    derived("pct_automation", Percent),
    // Defects
    field("defauts_critical", Number),
    field("defauts_high", Number),
    field("defauts_medium", Number),
    field("defauts_low", Number),
    field("defauts_closed", Number),
    derived("defauts_identified", Number),
    derived("defauts_resolved", Number),
    derived("defauts_active", Number),
    derived("taux_resolution", Percent),
    // Charts
    derived("chart_us_status", Chart),
    derived("chart_defects_severity", Chart),
    derived("chart_test_results", Chart),
    // Links
    field("link_project_name", Link),
    field("link_application", Link),
    field("link_package_version", Link),
    field("link_release_notes", Link),
    field("link_sprint", Link),
    field("link_us_todo", Link),
    field("link_us_in_progress", Link),
    field("link_us_in_review", Link),
    field("link_us_validated", Link),
    field("link_us_rejected", Link),
    field("link_us_blocked", Link),
    field("link_us_board", Link),
    field("link_nb_tests_passed", Link),
    field("link_nb_tests_failed", Link),
    field("link_nb_tests_blocked", Link),
    field("link_nb_tests_not_run", Link),
    field("link_nb_tests_total", Link),
    field("link_nb_tests_executed", Link),
    field("link_test_campaign", Link),
    field("link_automation", Link),
    field("link_defauts_critical", Link),
    field("link_defauts_high", Link),
    field("link_defauts_medium", Link),
    field("link_defauts_low", Link),
    field("link_defauts_closed", Link),
    field("link_defauts_identified", Link),
    field("link_defauts_resolved", Link),
    field("link_defauts_active", Link),
    field("link_taux_resolution", Link),
    field("link_defects_board", Link),
];

static INDEX: Lazy<HashMap<&'static str, &'static FieldSpec>> =
    Lazy::new(|| FIELDS.iter().map(|spec| (spec.name, spec)).collect());

/// Looks up a registered field.
pub fn lookup(name: &str) -> Option<&'static FieldSpec> {
    INDEX.get(name).copied()
}

/// The kind of a field: registered kind first, naming convention otherwise.
pub fn kind_of(name: &str) -> FieldKind {
    lookup(name)
        .map(|spec| spec.kind)
        .unwrap_or_else(|| FieldKind::infer(name))
}

/// Whether the engine owns the value of this field.
pub fn is_derived(name: &str) -> bool {
    lookup(name).is_some_and(|spec| spec.derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), FIELDS.len());
    }

    #[test]
    fn infer_precedence() {
        assert_eq!(FieldKind::infer("chart_taux_x"), FieldKind::Chart);
        assert_eq!(FieldKind::infer("nb_taux_x"), FieldKind::Percent);
        assert_eq!(FieldKind::infer("pct_done"), FieldKind::Percent);
        assert_eq!(FieldKind::infer("nb_items"), FieldKind::Number);
        assert_eq!(FieldKind::infer("bs_open"), FieldKind::Number);
        assert_eq!(FieldKind::infer("conclusion"), FieldKind::RichText);
        assert_eq!(FieldKind::infer("whatever"), FieldKind::Text);
    }

    #[test]
    fn registry_overrides_convention() {
        // No prefix, but registered as a count
        assert_eq!(FieldKind::infer("defauts_critical"), FieldKind::Text);
        assert_eq!(kind_of("defauts_critical"), FieldKind::Number);
        assert_eq!(kind_of("recommendations"), FieldKind::List);
    }

    #[test]
    fn unknown_names_use_convention() {
        assert!(lookup("nb_widgets").is_none());
        assert_eq!(kind_of("nb_widgets"), FieldKind::Number);
        assert_eq!(kind_of("taux_widgets"), FieldKind::Percent);
    }

    #[test]
    fn registered_prefixed_names_agree_with_convention() {
        for spec in FIELDS {
            let inferred = FieldKind::infer(spec.name);
            if spec.name.starts_with("nb_") || spec.name.starts_with("taux_") {
                assert_eq!(spec.kind, inferred, "{}", spec.name);
            }
        }
    }

    #[test]
    fn derived_flags() {
        assert!(is_derived("taux_resolution"));
        assert!(is_derived("chart_us_status"));
        assert!(!is_derived("defauts_closed"));
        assert!(!is_derived("unknown"));
    }
}
