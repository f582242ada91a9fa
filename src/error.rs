use crate::parser::TokenKind;
use std::fmt;

/// Kind of parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    DuplicateAttribute,
    ElseWithoutIf,
    AnonymousBlockOutsideMixin,
    UnexpectedCaseToken,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedToken => "Unexpected token",
            ErrorKind::DuplicateAttribute => "Duplicate attribute",
            ErrorKind::ElseWithoutIf => "Else without if",
            ErrorKind::AnonymousBlockOutsideMixin => "Anonymous block outside mixin",
            ErrorKind::UnexpectedCaseToken => "Unexpected case token",
        }
    }
}

/// Error during parsing. The first one aborts the whole parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub filename: Option<String>,
    /// Token type the grammar wanted at this position, when there was exactly one
    pub expected: Option<TokenKind>,
    /// Token type actually found
    pub found: Option<TokenKind>,
    pub help: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            filename: None,
            expected: None,
            found: None,
            help: None,
        }
    }

    pub fn with_filename(mut self, filename: Option<&str>) -> Self {
        self.filename = filename.map(str::to_string);
        self
    }

    pub fn with_expected(mut self, expected: TokenKind) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_found(mut self, found: TokenKind) -> Self {
        self.found = Some(found);
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error as an operator-facing report
    pub fn render(&self) -> String {
        self.render_inner(false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self) -> String {
        self.render_inner(true)
    }

    fn render_inner(&self, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');

        let filename = self.filename.as_deref().unwrap_or("<anonymous>");
        output.push_str(&format!(" {}file:{} {}:{}\n", dim, reset, filename, self.line));
        output.push_str(&format!("{}error:{} {}\n", red, reset, self.message));

        if let (Some(expected), Some(found)) = (self.expected, self.found) {
            output.push_str(&format!(
                "{}   |{} expected `{}`, found `{}`\n",
                dim, reset, expected, found
            ));
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help_line));
                } else {
                    output.push_str(&format!("       {}\n", help_line));
                }
            }
        }

        output.push('\n');
        output
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Error from the public entry points (decoding tokens or parsing them)
#[derive(Debug)]
pub enum CompileError {
    Parse(ParseError),
    Decode(serde_json::Error),
}

impl CompileError {
    /// Render the error (no color)
    pub fn render(&self) -> String {
        match self {
            CompileError::Parse(err) => err.render(),
            CompileError::Decode(err) => format!("error: Invalid token stream: {}\n", err),
        }
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self) -> String {
        match self {
            CompileError::Parse(err) => err.render_color(),
            CompileError::Decode(err) => {
                format!("\x1b[1;31merror\x1b[0m: \x1b[1mInvalid token stream: {}\x1b[0m\n", err)
            }
        }
    }

    /// The parse error, if parsing (rather than decoding) failed
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            CompileError::Parse(err) => Some(err),
            CompileError::Decode(_) => None,
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        CompileError::Decode(err)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(err) => write!(f, "{}", err),
            CompileError::Decode(err) => write!(f, "Invalid token stream: {}", err),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(err) => Some(err),
            CompileError::Decode(err) => Some(err),
        }
    }
}

/// Kind of non-fatal diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// `+name` should be used to call a mixin
    DeprecatedMixinCall,
    /// More than one `(...)` attribute group on one tag
    MultipleAttributeGroups,
}

/// Non-fatal diagnostic; reported but never changes the resulting tree
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub line: usize,
    pub filename: Option<String>,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filename = self.filename.as_deref().unwrap_or("<anonymous>");
        write!(f, "{}, line {}: {}", filename, self.line, self.message)
    }
}
