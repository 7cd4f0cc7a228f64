//! Pure formatting functions for UI output.
//!
//! Everything the operator reads goes through here. Errors and warnings go to
//! stderr, progress to stdout. In machine output mode progress moves to
//! stderr as well, leaving stdout to the JSON document.

use crate::warning::FlowWarning;
use console::style;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static MACHINE_OUTPUT: AtomicBool = AtomicBool::new(false);

/// Reserve stdout for machine-readable output.
pub fn set_machine_output(enabled: bool) {
    MACHINE_OUTPUT.store(enabled, Ordering::Relaxed);
}

pub fn machine_output() -> bool {
    MACHINE_OUTPUT.load(Ordering::Relaxed)
}

/// Print one line of progress output.
fn emit(line: fmt::Arguments<'_>) {
    if machine_output() {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    emit(format_args!("{} {}", style("✓").green(), message));
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    emit(format_args!("{} {}", style("→").yellow(), message));
}

/// Print a command that would have run.
pub fn display_dry_run(command_line: &str) {
    emit(format_args!("{} {}", style("[dry-run]").cyan(), command_line));
}

/// Echo captured stderr of a failed command, indented.
pub fn display_command_stderr(stderr: &str) {
    for line in stderr.lines() {
        eprintln!("  {}", style(line).dim());
    }
}

/// Display a workflow warning to the user.
pub fn display_warning(warning: &FlowWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display a titled list of branches, or a note when there are none.
pub fn display_branches(title: &str, branches: &[String]) {
    emit(format_args!("{}", style(title).bold()));
    if branches.is_empty() {
        emit(format_args!("  (none)"));
    }
    for branch in branches {
        emit(format_args!("  - {}", branch));
    }
}

/// Display a key/value line of the status report.
pub fn display_field(label: &str, value: &str) {
    emit(format_args!("{:<16}{}", style(format!("{}:", label)).bold(), value));
}

/// Numbered menu text used by selection prompts.
pub fn numbered_menu(title: &str, options: &[String]) -> String {
    let mut out = format!("{}\n", title);
    for (i, option) in options.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, option));
    }
    out
}
