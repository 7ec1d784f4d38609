//! Presentation: reconciliation reports and scan summaries for stdout.

use crate::error::ApiError;
use crate::map::ScanOutcome;
use crate::reconcile::ReconciliationResult;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use std::path::Path;

/// Human-readable report. Dry-run and execute reports list the same items in
/// the same order; only the mode banner and verbs differ.
pub fn format_reconciliation_text(result: &ReconciliationResult) -> String {
    let dry_run = result.mode.is_dry_run();
    let prefix = if dry_run { "[DRY RUN] " } else { "" };
    let (move_verb, dir_verb) = if dry_run {
        ("Would move", "Would create directory")
    } else {
        ("Moved", "Created directory")
    };

    let mut out = String::new();
    if dry_run {
        out.push_str("=== DRY RUN MODE (use --execute to actually move files) ===\n");
    } else {
        out.push_str("=== EXECUTE MODE (files were moved) ===\n");
    }
    out.push_str(&format!(
        "{}{} {} files\n",
        prefix,
        move_verb,
        result.successful_moves()
    ));

    for dir in &result.created_dirs {
        out.push_str(&format!("{}{}: {}\n", prefix, dir_verb, dir));
    }
    for mv in &result.moved {
        out.push_str(&format!(
            "{}{}: {} -> {}\n",
            prefix, move_verb, mv.source, mv.destination
        ));
    }

    if !result.failed.is_empty() {
        out.push_str(&format!("\n=== FAILED MOVES ({}) ===\n", result.failed_moves()));
        for failed in &result.failed {
            out.push_str(&format!(
                "Failed: {} -> {} ({})\n",
                failed.planned.source, failed.planned.destination, failed.failure
            ));
        }
    }
    if !result.missing.is_empty() {
        out.push_str(&format!("\n=== MISSING FILES ({}) ===\n", result.missing_count()));
        for missing in &result.missing {
            out.push_str(&format!("Missing: {}\n", missing.path));
        }
    }
    if !result.extra.is_empty() {
        out.push_str(&format!("\n=== EXTRA FILES ({}) ===\n", result.extra_count()));
        for extra in &result.extra {
            out.push_str(&format!("Extra: {}\n", extra.path));
        }
    }

    out.push_str("\n=== SUMMARY ===\n");
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Mode", "Moved", "Failed", "Missing", "Extra", "In place"]);
    table.add_row(vec![
        result.mode.label().to_string(),
        result.successful_moves().to_string(),
        result.failed_moves().to_string(),
        result.missing_count().to_string(),
        result.extra_count().to_string(),
        result.in_place.to_string(),
    ]);
    out.push_str(&table.to_string());
    out
}

pub fn format_reconciliation_json(result: &ReconciliationResult) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn format_scan_summary(outcome: &ScanOutcome, output: &Path) -> String {
    let mut out = format!(
        "Hash map saved to {} ({} entries)\n",
        output.display(),
        outcome.map.len()
    );

    let stats = &outcome.stats;
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Files", "Hashed", "Reused", "Duplicates", "Pruned", "Errors"]);
    table.add_row(vec![
        stats.files_seen.to_string(),
        stats.hashed.to_string(),
        stats.reused.to_string(),
        stats.duplicates.to_string(),
        stats.pruned.to_string(),
        stats.errors.to_string(),
    ]);
    out.push_str(&table.to_string());

    if !outcome.errors.is_empty() {
        out.push_str(&format!("\n\n=== UNREADABLE FILES ({}) ===", outcome.errors.len()));
        for error in &outcome.errors {
            out.push_str(&format!("\nSkipped: {}", error));
        }
    }
    out
}
