//! Status lines on stderr.

use console::{Style, Term};

/// Styled status output for the render command.
pub(crate) struct Output {
    term: Term,
    success: Style,
    warning: Style,
    error: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// Plain status line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Green status line.
    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.success, msg);
    }

    /// Yellow status line.
    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.warning, msg);
    }

    /// Red status line.
    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.error, msg);
    }

    /// Indented, dimmed list entry (file paths, references).
    pub(crate) fn item(&self, msg: &str) {
        self.styled(&self.dim, &format!("  {msg}"));
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}
