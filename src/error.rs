use crate::parser::Span;
use std::fmt;

/// Kind of compile error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Text matches no token pattern, or a quoted literal does not decode
    Lex,
    /// A token arrived where the grammar has no transition for it
    Parse,
    /// Input ended inside a `css` block or with statements still open
    UnbalancedInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lex => "Lex error",
            ErrorKind::Parse => "Parse error",
            ErrorKind::UnbalancedInput => "Unbalanced input",
        }
    }
}

/// Error raised while compiling a template
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub related_span: Option<Span>,
    pub related_label: Option<String>,
    pub help: Option<String>,
}

impl CompileError {
    /// Create a new compile error
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            related_span: None,
            related_label: None,
            help: None,
        }
    }

    /// Add a related span with a label (e.g., "opened here")
    pub fn with_related(mut self, span: Span, label: impl Into<String>) -> Self {
        self.related_span = Some(span);
        self.related_label = Some(label.into());
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();

        let line = self.span.start.line + 1;
        let col = self.span.start.col + 1;
        output.push_str(&format!(" {}file:{} {}:{}:{}\n", dim, reset, filename, line, col));

        let message = if color { highlight_code(&self.message) } else { self.message.clone() };
        output.push_str(&format!(
            "{}error:{} {}: {}\n",
            red,
            reset,
            self.kind.as_str(),
            message
        ));

        let width = format!("{}", line).len().max(2);
        if let Some(source_line) = source.lines().nth(self.span.start.line) {
            output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = width));
            output.push_str(&format!("{}{:>width$} |{} {}\n", dim, line, reset, source_line, width = width));
            output.push_str(&format!(
                "{}{:>width$} |{} {}{}{}{}\n",
                dim,
                "",
                reset,
                " ".repeat(self.span.start.col),
                red,
                carets(&self.span, source_line),
                reset,
                width = width
            ));
        }

        if let Some(related) = self.related_span {
            if let Some(related_line) = source.lines().nth(related.start.line) {
                let label = self.related_label.as_deref().unwrap_or("opened here");
                output.push_str(&format!(
                    "{}{:>width$} |{} {}\n",
                    dim,
                    related.start.line + 1,
                    reset,
                    related_line,
                    width = width
                ));
                output.push_str(&format!(
                    "{}{:>width$} |{} {}{}{} {}{}\n",
                    dim,
                    "",
                    reset,
                    " ".repeat(related.start.col),
                    dim,
                    carets(&related, related_line),
                    label,
                    reset,
                    width = width
                ));
            }
        }

        if let Some(ref help) = self.help {
            let content = if color { highlight_code(help) } else { help.clone() };
            output.push_str(&format!(" {}help:{} {}\n", cyan, reset, content));
        }

        output
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.kind.as_str(),
            self.span.start.line + 1,
            self.span.start.col + 1,
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

/// Underline for `span` on its first line
fn carets(span: &Span, source_line: &str) -> String {
    let len = if span.end.line == span.start.line {
        span.end.col.saturating_sub(span.start.col)
    } else {
        source_line.chars().count().saturating_sub(span.start.col)
    };
    "^".repeat(len.max(1))
}

/// Color `backtick` quoted code in prose (error messages, help text)
fn highlight_code(text: &str) -> String {
    const CODE: &str = "\x1b[38;5;180m";
    const RESET: &str = "\x1b[0m";

    let mut result = String::with_capacity(text.len() * 2);
    let mut in_code = false;
    for ch in text.chars() {
        if ch == '`' {
            if in_code {
                result.push(ch);
                result.push_str(RESET);
            } else {
                result.push_str(CODE);
                result.push(ch);
            }
            in_code = !in_code;
        } else {
            result.push(ch);
        }
    }
    if in_code {
        result.push_str(RESET);
    }
    result
}
