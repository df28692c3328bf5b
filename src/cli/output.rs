//! Colored terminal output. Honors NO_COLOR and CLICOLOR through `colored`.

use std::fmt::Display;

use colored::Colorize;

/// Error line on stderr.
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

/// Confirmation of a saved change.
pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

pub fn detail(msg: &(impl Display + ?Sized)) {
    println!("  {}", msg);
}

/// Plain stdout, used for data meant to be piped.
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}
