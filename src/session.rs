//! Per-document editing context threaded through export and import.

use crate::config::CodeGenSettings;
use crate::vars::VarTable;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Invalid widget setup found during export
    Configuration,
    /// Unexpected value inside a recognized statement during import
    Recognition,
    /// Broken tag nesting or widget arity
    Structure,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Type name of the widget that reported it
    pub widget: &'static str,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::Configuration => "configuration",
            DiagnosticKind::Recognition => "recognition",
            DiagnosticKind::Structure => "structure",
        };
        write!(f, "{} error in {}: {}", kind, self.widget, self.message)
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub settings: CodeGenSettings,
    pub vars: VarTable,
    /// New and cloned widgets request fresh backing variables
    pub create_vars: bool,
    diagnostics: Vec<Diagnostic>,
    var_counter: usize,
}

impl Session {
    pub fn new(settings: CodeGenSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Export-time configuration error.
    pub fn push_error(&mut self, widget: &'static str, message: impl Into<String>) {
        self.push_diagnostic(DiagnosticKind::Configuration, widget, message);
    }

    pub fn push_diagnostic(
        &mut self,
        kind: DiagnosticKind,
        widget: &'static str,
        message: impl Into<String>,
    ) {
        let d = Diagnostic {
            kind,
            widget,
            message: message.into(),
        };
        log::warn!("{}", d);
        self.diagnostics.push(d);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    /// Unique suffix for generated identifiers; never repeats within a session.
    pub fn next_var_id(&mut self) -> usize {
        let id = self.var_counter;
        self.var_counter += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_accumulate_until_cleared() {
        let mut s = Session::default();
        s.push_error("Table", "first");
        s.push_diagnostic(DiagnosticKind::Structure, "Splitter", "second");
        assert_eq!(s.diagnostics().len(), 2);
        assert_eq!(s.diagnostics()[0].to_string(), "configuration error in Table: first");
        s.clear_diagnostics();
        assert!(s.diagnostics().is_empty());
    }

    #[test]
    fn test_var_ids_increase() {
        let mut s = Session::default();
        assert_eq!(s.next_var_id(), 0);
        assert_eq!(s.next_var_id(), 1);
    }
}
