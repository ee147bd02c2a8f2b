//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; the route table dispatches to the studio.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::{map_error, EXIT_FAILURE};
pub use parse::{Cli, Commands};
pub use presentation::{
    format_create_result_json, format_create_result_text, format_project_list_json,
    format_project_list_text, format_project_show_json, format_project_show_text,
    format_styles_json, format_styles_text,
};
pub use route::{resolve_panel, resolve_project, RunContext};
