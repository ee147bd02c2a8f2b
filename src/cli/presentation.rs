//! CLI presentation: text and json formatters per command family.

mod project;
mod style;

pub use project::{
    format_create_result_json, format_create_result_text, format_project_list_json,
    format_project_list_text, format_project_show_json, format_project_show_text,
};
pub use style::{format_styles_json, format_styles_text};
