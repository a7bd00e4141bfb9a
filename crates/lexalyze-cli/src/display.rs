//! Terminal rendering of analysis reports.
//!
//! Everything renders to a `String` so the layout can be tested; `color`
//! switches ANSI escapes on or off.

use std::fmt::Write;

use lexalyze_core::{AnalysisReport, Entity, RiskLevel, SkippedChunk, Stage};

const MAX_ENTITY_ROWS: usize = 50;
const PREVIEW_CHARS: usize = 600;
const NO_SUMMARY: &str = "Summary could not be generated.";

const RESET: &str = "\x1b[0m";
const BOLD_RED: &str = "\x1b[1;31m";
const BOLD_YELLOW: &str = "\x1b[1;33m";
const BOLD_GREEN: &str = "\x1b[1;32m";
const BOLD: &str = "\x1b[1m";

// ── Public API ──

/// Risk level, coloured by severity.
pub fn risk_badge(level: RiskLevel, color: bool) -> String {
    if !color {
        return level.to_string();
    }
    let code = match level {
        RiskLevel::High => BOLD_RED,
        RiskLevel::Medium => BOLD_YELLOW,
        RiskLevel::Low => BOLD_GREEN,
    };
    format!("{code}{level}{RESET}")
}

/// Leading part of a document, cut on a character boundary.
pub fn preview(text: &str) -> String {
    let total = text.chars().count();
    if total <= PREVIEW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}\n... ({} more characters)", total - PREVIEW_CHARS)
}

/// Full report: risk, summary, entity table, and any skipped chunks.
pub fn render_report(report: &AnalysisReport, color: bool) -> String {
    let mut out = String::new();

    section(&mut out, "Risk Assessment", color);
    let _ = writeln!(out, "  {}", risk_badge(report.risk_assessment, color));
    out.push('\n');

    section(&mut out, "Executive Summary", color);
    let summary = if report.summary.is_empty() {
        NO_SUMMARY
    } else {
        &report.summary
    };
    let _ = writeln!(out, "  {summary}");
    out.push('\n');

    section(&mut out, "Extracted Clauses & Entities", color);
    if report.extracted_clauses.is_empty() {
        out.push_str("  No specific entities were extracted.\n");
    } else {
        entity_table(&mut out, report.extracted_clauses.as_slice());
    }

    if !report.skipped_chunks.is_empty() {
        out.push('\n');
        section(&mut out, "Incomplete Analysis", color);
        for skipped in &report.skipped_chunks {
            let _ = writeln!(out, "  {}", describe_skipped(skipped));
        }
    }
    out
}

// ── Helpers ──

fn section(out: &mut String, header: &str, color: bool) {
    if color {
        let _ = writeln!(out, "{BOLD}{header}{RESET}");
    } else {
        let _ = writeln!(out, "{header}");
    }
}

fn entity_table(out: &mut String, entities: &[Entity]) {
    let _ = writeln!(
        out,
        "  {:<10} {:<24} {:>6} {:>8} {:>8}",
        "entity", "word", "score", "start", "end"
    );
    for e in entities.iter().take(MAX_ENTITY_ROWS) {
        let _ = writeln!(
            out,
            "  {:<10} {:<24} {:>6.3} {:>8} {:>8}",
            e.label, e.text, e.score, e.start, e.end
        );
    }
    if entities.len() > MAX_ENTITY_ROWS {
        let _ = writeln!(out, "  ... and {} more", entities.len() - MAX_ENTITY_ROWS);
    }
}

fn describe_skipped(s: &SkippedChunk) -> String {
    let stage = match s.stage {
        Stage::Extraction => "extraction",
        Stage::Summarization => "summarization",
    };
    format!(
        "{stage} chunk {} (chars {}..{}) skipped: {}",
        s.index, s.start, s.end, s.reason
    )
}
