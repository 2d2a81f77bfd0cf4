use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use homes_engine::{EventOutcome, MarkerRecord, SessionSnapshot};

use crate::replay::{ReplayReport, ReplayStep};

fn describe_outcome(outcome: &EventOutcome) -> String {
    let mut parts = Vec::new();
    if let Some(estimate) = outcome.estimate {
        parts.push(format!("estimate -> {estimate}"));
    }
    if let Some(contract) = &outcome.contract {
        parts.push(format!("contract -> {} in {:?}", contract.npc, contract.city));
    }
    if let Some(supplies) = outcome.supplies {
        parts.push(format!(
            "low planks: {}, low steel: {}",
            supplies.low_planks, supplies.low_steel
        ));
    }
    if parts.is_empty() {
        "no change".to_string()
    } else {
        parts.join("; ")
    }
}

fn describe_contract(state: &SessionSnapshot) -> String {
    state.contract.as_ref().map_or_else(
        || "none".to_string(),
        |contract| format!("{} in {:?}", contract.npc, contract.city),
    )
}

fn marker_label(record: &MarkerRecord) -> String {
    match &record.group {
        Some(group) => format!("{} ({group})", record.name),
        None => record.name.clone(),
    }
}

fn selected_steps(report: &ReplayReport, verbose: bool) -> Vec<&ReplayStep> {
    if verbose {
        report.steps.iter().collect()
    } else {
        report.changed_steps().collect()
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &ReplayReport,
    verbose: bool,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Replay Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=================".cyan())?;
    let changed = report.changed_steps().count();
    writeln!(out, "Events replayed: {}", report.steps.len())?;
    writeln!(out, "Events with changes: {}", changed.to_string().green())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for step in selected_steps(report, verbose) {
        let summary = describe_outcome(&step.outcome);
        let summary = if step.changed() {
            summary.normal()
        } else {
            summary.dimmed()
        };
        writeln!(out, "  #{:<4} {:<24} {summary}", step.index, step.kind.bold())?;
    }
    writeln!(out)?;

    let state = &report.final_state;
    writeln!(out, "{}", "🪵 Final State".bright_yellow().bold())?;
    writeln!(out, "{}", "==============".yellow())?;
    writeln!(out, "Sack estimate: {}", state.estimate.to_string().bold())?;
    match report.stored_estimate {
        Some(stored) => writeln!(out, "Stored estimate: {stored}")?,
        None => writeln!(out, "Stored estimate: {}", "never written".dimmed())?,
    }
    writeln!(out, "Contract: {}", describe_contract(state))?;
    writeln!(
        out,
        "Thresholds: {} planks, {} steel bars",
        state.thresholds.min_planks, state.thresholds.min_steel_bars
    )?;
    let flag = |low: bool| if low { "LOW".red() } else { "ok".green() };
    writeln!(out, "Planks: {}", flag(state.supplies.low_planks))?;
    writeln!(out, "Steel bars: {}", flag(state.supplies.low_steel))?;
    if let Some(marker) = &state.current_city_marker {
        writeln!(out, "City marker: {marker}")?;
    }

    if !report.markers.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "📍 Markers".bright_cyan().bold())?;
        writeln!(out, "{}", "==========".cyan())?;
        for record in &report.markers {
            let status = if record.visible {
                "👁 shown ".green()
            } else {
                "   hidden".dimmed()
            };
            writeln!(out, "{status} {} [{}]", marker_label(record), record.id)?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &ReplayReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    report: &ReplayReport,
    verbose: bool,
) -> Result<()> {
    writeln!(out, "# Mahogany Homes Replay\n")?;

    let state = &report.final_state;
    writeln!(out, "## Final State\n")?;
    writeln!(out, "- **Events replayed**: {}", report.steps.len())?;
    writeln!(out, "- **Sack estimate**: {}", state.estimate)?;
    writeln!(out, "- **Contract**: {}", describe_contract(state))?;
    writeln!(
        out,
        "- **Thresholds**: {} planks, {} steel bars",
        state.thresholds.min_planks, state.thresholds.min_steel_bars
    )?;
    writeln!(out, "- **Low planks**: {}", state.supplies.low_planks)?;
    writeln!(out, "- **Low steel**: {}\n", state.supplies.low_steel)?;

    writeln!(out, "## Events\n")?;
    let steps = selected_steps(report, verbose);
    if steps.is_empty() {
        writeln!(out, "_No event changed the helper state._\n")?;
    } else {
        writeln!(out, "| # | Event | Result |")?;
        writeln!(out, "|---|-------|--------|")?;
        for step in steps {
            writeln!(
                out,
                "| {} | `{}` | {} |",
                step.index,
                step.kind,
                describe_outcome(&step.outcome)
            )?;
        }
        writeln!(out)?;
    }

    if !report.markers.is_empty() {
        writeln!(out, "## Markers\n")?;
        for record in &report.markers {
            let check = if record.visible { "x" } else { " " };
            writeln!(out, "- [{check}] {} (id {})", marker_label(record), record.id)?;
        }
    }
    Ok(())
}
