use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// A diagnostic raised while expanding the blocks of one page.
///
/// Errors mark a block that was rejected and dropped from the output.
/// Warnings mark a page that still rendered but not as written, such as a
/// block whose closing fence is missing.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    /// Byte range in the page source, usually the block header line.
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl ParseError {
    fn new(severity: Severity, message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            message: message.into(),
            span,
            file_id,
            severity,
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Self::new(Severity::Error, message, span, file_id)
    }

    pub fn warning(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Self::new(Severity::Warning, message, span, file_id)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// True when the page lost content: a block was rejected.
    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_and_notes_reach_the_diagnostic() {
        let warning = ParseError::warning("block 'aside' is never closed", 0..13, 2)
            .with_note("close it with a line of 3 slashes");
        assert!(!warning.is_error());

        let diagnostic = warning.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.notes, ["close it with a line of 3 slashes"]);
        assert_eq!(diagnostic.labels[0].file_id, 2);
        assert_eq!(diagnostic.labels[0].range, 0..13);

        assert!(ParseError::error("bad", 0..1, 0).is_error());
    }
}
