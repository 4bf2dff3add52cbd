//! FILENAME: core/output/src/message.rs
//! PURPOSE: Diagnostics (errors, warnings and notes) as submitted to the
//! output engine.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    pub fn name(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

/// What a diagnostic is about. Only syntax and data diagnostics carry a
/// location; only syntax diagnostics name their command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    General,
    Syntax,
    Data,
}

/// A position in a syntax or data file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub file_name: Option<String>,
    /// 1-based; 0 if unknown.
    pub line: usize,
    /// 1-based; 0 if unknown.
    pub column: usize,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none() && self.line == 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(file_name) = &self.file_name {
            write!(f, "{}", file_name)?;
            sep = ":";
        }
        if self.line > 0 {
            write!(f, "{}{}", sep, self.line)?;
            if self.column > 0 {
                write!(f, ".{}", self.column)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub location: Location,
    pub command_name: Option<String>,
    pub text: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            category: Category::General,
            location: Location::default(),
            command_name: None,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, text)
    }

    pub fn note(text: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Note, text)
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_command_name(mut self, command_name: impl Into<String>) -> Self {
        self.command_name = Some(command_name.into());
        self
    }
}

/// Renders as `location: severity: COMMAND: text`, omitting the location for
/// general diagnostics and the command for all but syntax diagnostics.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category != Category::General && !self.location.is_empty() {
            write!(f, "{}: ", self.location)?;
        }
        write!(f, "{}: ", self.severity.name())?;
        if self.category == Category::Syntax {
            if let Some(command_name) = &self.command_name {
                write!(f, "{}: ", command_name)?;
            }
        }
        f.write_str(&self.text)
    }
}
