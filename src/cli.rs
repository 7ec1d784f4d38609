//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; the route table dispatches to map and reconcile services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_reconciliation_json, format_reconciliation_text, format_scan_summary};
pub use route::RunContext;
