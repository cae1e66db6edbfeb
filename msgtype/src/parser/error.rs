use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// The single fatal parse error: a non-blank line that is neither a type
/// header nor, inside a type body, a field entry. Parsing aborts entirely;
/// there is no recovery.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    /// 1-based source line number of the offending line.
    pub line: usize,
    /// The offending tokens, in line order.
    pub tokens: Vec<String>,
    /// Byte span of the offending line.
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn unrecognized_line(
        line: usize,
        tokens: Vec<String>,
        span: Range<usize>,
        file_id: usize,
    ) -> Self {
        ParseError {
            message: format!("line {}: unrecognized expression {:?}", line, tokens),
            line,
            tokens,
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Error)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}
