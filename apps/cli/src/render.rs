//! Terminal rendering of the final lifecycle state.

use std::{io::Write, process::ExitCode};

use anyhow::Result;
use client_core::RequestLifecycleState;
use shared::protocol::{ValidationError, ValidationOutcome};

pub const SUCCESS_MESSAGE: &str = "Validation Successful: Data is clean.";
const HEADERS: [&str; 4] = ["ID", "Row Number", "Column", "Error Description"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    RequestFailed,
}

impl Verdict {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Passed => ExitCode::SUCCESS,
            Self::Failed => ExitCode::from(1),
            Self::RequestFailed => ExitCode::from(2),
        }
    }
}

pub fn render(
    state: &RequestLifecycleState,
    json: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Verdict> {
    match state {
        RequestLifecycleState::Succeeded(outcome) => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(outcome)?)?;
            } else {
                write_outcome(outcome, out)?;
            }
            Ok(if outcome.is_pass() {
                Verdict::Passed
            } else {
                Verdict::Failed
            })
        }
        RequestLifecycleState::Failed(message) => {
            writeln!(err, "{message}")?;
            Ok(Verdict::RequestFailed)
        }
        RequestLifecycleState::Idle | RequestLifecycleState::InFlight => {
            writeln!(err, "No validation result was produced")?;
            Ok(Verdict::RequestFailed)
        }
    }
}

fn write_outcome(outcome: &ValidationOutcome, out: &mut impl Write) -> Result<()> {
    match outcome {
        ValidationOutcome::Pass => writeln!(out, "{SUCCESS_MESSAGE}")?,
        ValidationOutcome::Fail { errors } => out.write_all(error_table(errors).as_bytes())?,
    }
    Ok(())
}

/// Missing optional fields render as empty cells.
fn cells(error: &ValidationError) -> [String; 4] {
    [
        error.id.as_ref().map(ToString::to_string).unwrap_or_default(),
        error.row_index.map(|row| row.to_string()).unwrap_or_default(),
        error.column.clone().unwrap_or_default(),
        error.error_message.clone(),
    ]
}

pub fn error_table(errors: &[ValidationError]) -> String {
    let rows: Vec<[String; 4]> = errors.iter().map(cells).collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    push_row(&mut table, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    table.push_str(&rule.join("-+-"));
    table.push('\n');
    for row in &rows {
        push_row(&mut table, row, &widths);
    }
    table
}

fn push_row(table: &mut String, row: &[String; 4], widths: &[usize; 4]) {
    let line = row
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    table.push_str(line.trim_end());
    table.push('\n');
}
