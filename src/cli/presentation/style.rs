//! Style command presentation.

use crate::types::MangaStyle;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

pub fn format_styles_text() -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Tag", "Description"]);
    for style in MangaStyle::ALL {
        table.add_row(vec![style.tag(), style.label()]);
    }
    table.to_string()
}

pub fn format_styles_json() -> String {
    let styles: Vec<_> = MangaStyle::ALL
        .iter()
        .map(|style| json!({ "tag": style.tag(), "label": style.label() }))
        .collect();
    serde_json::to_string_pretty(&json!({ "styles": styles })).unwrap_or_else(|_| "{}".to_string())
}
