//! Badge markup for multi-select fields.

use serde_json::Value;

use crate::format::{escape_html, value_to_text};

/// Colors of one badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStyle {
    pub background: &'static str,
    pub foreground: &'static str,
}

/// Style for values outside the known domain.
pub const DEFAULT_BADGE_STYLE: BadgeStyle = BadgeStyle {
    background: "#6c757d",
    foreground: "#ffffff",
};

const fn style(background: &'static str, foreground: &'static str) -> BadgeStyle {
    BadgeStyle {
        background,
        foreground,
    }
}

const ENVIRONMENTS: &[(&str, BadgeStyle)] = &[
    ("DEV", style("#0d6efd", "#ffffff")),
    ("INT", style("#6610f2", "#ffffff")),
    ("QA", style("#6f42c1", "#ffffff")),
    ("UAT", style("#fd7e14", "#ffffff")),
    ("PREPROD", style("#ffc107", "#212529")),
    ("PROD", style("#dc3545", "#ffffff")),
];

const COUNTRIES: &[(&str, BadgeStyle)] = &[
    ("FR", style("#0055a4", "#ffffff")),
    ("BE", style("#fdda24", "#000000")),
    ("LU", style("#00a1de", "#ffffff")),
    ("CH", style("#d52b1e", "#ffffff")),
    ("DE", style("#000000", "#ffce00")),
    ("ES", style("#aa151b", "#f1bf00")),
    ("IT", style("#009246", "#ffffff")),
    ("NL", style("#ae1c28", "#ffffff")),
    ("UK", style("#012169", "#ffffff")),
];

/// A fixed value domain with its display order and palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeDomain {
    Environment,
    Country,
}

impl BadgeDomain {
    /// The domain rendered for a multi-select field, if any.
    pub fn for_field(name: &str) -> Option<BadgeDomain> {
        match name {
            "environments" => Some(BadgeDomain::Environment),
            "countries" => Some(BadgeDomain::Country),
            _ => None,
        }
    }

    fn entries(self) -> &'static [(&'static str, BadgeStyle)] {
        match self {
            BadgeDomain::Environment => ENVIRONMENTS,
            BadgeDomain::Country => COUNTRIES,
        }
    }

    /// Known values in display order.
    pub fn order(self) -> Vec<&'static str> {
        self.entries().iter().map(|(value, _)| *value).collect()
    }

    /// CSS modifier class for this domain's badges.
    pub fn css_class(self) -> &'static str {
        match self {
            BadgeDomain::Environment => "badge-env",
            BadgeDomain::Country => "badge-country",
        }
    }

    fn rank(self, value: &str) -> Option<usize> {
        self.entries()
            .iter()
            .position(|(known, _)| known.eq_ignore_ascii_case(value))
    }

    /// Style for a value; unknown values get [`DEFAULT_BADGE_STYLE`].
    pub fn style_of(self, value: &str) -> BadgeStyle {
        self.rank(value)
            .map(|i| self.entries()[i].1)
            .unwrap_or(DEFAULT_BADGE_STYLE)
    }

    /// Sorts values by domain order. Unknown values follow the known ones in
    /// their input order; duplicates (case-insensitive) are dropped.
    pub fn sort(self, values: &[String]) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        let mut unique: Vec<&String> = Vec::new();
        for value in values {
            let key = value.trim().to_ascii_uppercase();
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            unique.push(value);
        }
        let mut ranked: Vec<(usize, usize, String)> = unique
            .into_iter()
            .enumerate()
            .map(|(pos, v)| {
                let v = v.trim().to_string();
                (self.rank(&v).unwrap_or(usize::MAX), pos, v)
            })
            .collect();
        ranked.sort_by_key(|(rank, pos, _)| (*rank, *pos));
        ranked.into_iter().map(|(_, _, v)| v).collect()
    }
}

/// Reads a multi-select value: an array of strings, or a comma-separated string.
pub fn selected_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Renders the badge group that stands in for a multi-select marker.
///
/// The wrapper carries the field marker, so the group can be located and
/// regenerated again on already-rendered output.
pub fn render_badges(field: &str, domain: BadgeDomain, values: &[String]) -> String {
    let mut out = format!(
        "<div class=\"badge-group\" data-field=\"{}\">",
        escape_html(field)
    );
    let sorted = domain.sort(values);
    if sorted.is_empty() {
        out.push_str("<span class=\"badge-empty\">—</span>");
    }
    for value in sorted {
        let style = domain.style_of(&value);
        out.push_str(&format!(
            "<span class=\"badge {}\" style=\"background-color:{};color:{}\">{}</span>",
            domain.css_class(),
            style.background,
            style.foreground,
            escape_html(&value)
        ));
    }
    out.push_str("</div>");
    out
}
