//! Console prompts.

use std::io;

use console::Term;

/// Prints `label` and reads one trimmed line.
pub fn line(term: &Term, label: &str) -> io::Result<String> {
    term.write_line(label)?;
    Ok(term.read_line()?.trim().to_string())
}

/// Prints `label` and reads a line without echoing it.
pub fn secret(term: &Term, label: &str) -> io::Result<String> {
    term.write_line(label)?;
    term.read_secure_line()
}
