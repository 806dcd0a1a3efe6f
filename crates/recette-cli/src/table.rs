//! Aligned terminal table for the field catalog.

use console::Style;
use recette::{Catalog, FieldType};
use unicode_width::UnicodeWidthStr;

const HEADERS: [&str; 3] = ["FIELD", "TYPE", "DEFAULT"];
const MAX_DEFAULT_WIDTH: usize = 40;

fn type_style(field_type: FieldType) -> Style {
    match field_type {
        FieldType::Text => Style::new(),
        FieldType::Number => Style::new().cyan(),
        FieldType::Percent => Style::new().green(),
        FieldType::Html => Style::new().magenta(),
        FieldType::Chart => Style::new().yellow(),
    }
}

/// Cuts `text` to at most `width` display columns, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Renders the catalog. Padding is computed on the plain text, before styling.
pub fn render_catalog(catalog: &Catalog) -> String {
    let rows: Vec<(String, FieldType, String)> = catalog
        .iter()
        .map(|entry| {
            let default = entry.default_value.split_whitespace().collect::<Vec<_>>().join(" ");
            (
                entry.name.clone(),
                entry.field_type,
                truncate(&default, MAX_DEFAULT_WIDTH),
            )
        })
        .collect();

    let name_width = rows
        .iter()
        .map(|(name, _, _)| name.width())
        .chain([HEADERS[0].width()])
        .max()
        .unwrap_or(0);
    let type_width = rows
        .iter()
        .map(|(_, t, _)| t.as_str().width())
        .chain([HEADERS[1].width()])
        .max()
        .unwrap_or(0);

    let header = Style::new().bold();
    let dim = Style::new().dim();
    let mut out = format!(
        "{}  {}  {}\n",
        header.apply_to(pad(HEADERS[0], name_width)),
        header.apply_to(pad(HEADERS[1], type_width)),
        header.apply_to(HEADERS[2]),
    );
    for (name, field_type, default) in rows {
        out.push_str(&format!(
            "{}  {}  {}\n",
            pad(&name, name_width),
            type_style(field_type).apply_to(pad(field_type.as_str(), type_width)),
            dim.apply_to(default),
        ));
    }
    out.push_str(&format!("\n{} fields\n", catalog.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn columns_are_aligned() {
        console::set_colors_enabled(false);
        let catalog = Catalog::scan(concat!(
            r#"<b data-field="sprint">12</b>"#,
            r#"<b data-field="taux_resolution">0%</b>"#,
        ));
        let table = render_catalog(&catalog);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0].trim_end(), "FIELD            TYPE     DEFAULT");
        assert_eq!(lines[1].trim_end(), "sprint           text     12");
        assert_eq!(lines[2].trim_end(), "taux_resolution  percent  0%");
        assert!(table.ends_with("2 fields\n"));
    }
}
