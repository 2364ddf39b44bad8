//! Output formatting helpers.
//!
//! Status lines go to stderr so stdout stays clean for exported data.

use colored::Colorize;

/// Print a success message.
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print a warning.
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a follow-up suggestion for the previous error.
pub fn hint(msg: &str) {
    eprintln!("  {} {}", "hint:".dimmed(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}
