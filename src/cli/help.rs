//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Stable command name used in log fields (e.g. "create", "regenerate").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Create { .. } => "create",
        Commands::List { .. } => "list",
        Commands::Show { .. } => "show",
        Commands::Regenerate { .. } => "regenerate",
        Commands::Edit { .. } => "edit",
        Commands::Delete { .. } => "delete",
        Commands::Styles { .. } => "styles",
    }
}
