use crate::ast::{AttrValue, Attribute, BlockMode};
use serde::{Deserialize, Serialize};

/// Tokens produced by the upstream lexer.
///
/// Every variant carries the source line it was lexed from. The wire form is a
/// JSON object with a `type` discriminant and camelCase field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Token {
    // === Elements ===
    /// Tag name: `div`, `a`, `my-element`
    #[serde(rename = "tag")]
    Tag {
        line: usize,
        val: String,
        #[serde(default)]
        self_closing: bool,
    },
    /// Interpolated tag name: `#{expr}`
    #[serde(rename = "interpolation")]
    Interpolation { line: usize, val: String },
    /// Id shorthand: `#main`
    #[serde(rename = "id")]
    Id { line: usize, val: String },
    /// Class shorthand: `.item`
    #[serde(rename = "class")]
    Class { line: usize, val: String },
    /// Parenthesized attribute group: `(href=url, checked)`
    #[serde(rename = "attrs")]
    Attrs {
        line: usize,
        #[serde(default)]
        attrs: Vec<Attribute>,
        #[serde(default)]
        self_closing: bool,
    },
    /// Attribute bag expression: `&attributes(obj)`
    #[serde(rename = "&attributes")]
    AndAttributes { line: usize, val: String },

    // === Code & control flow ===
    /// Code line: `- var x`, `= expr`, `!= expr`, `if`, `else if`, `else`, `unless`
    #[serde(rename = "code")]
    Code {
        line: usize,
        val: String,
        #[serde(default)]
        buffer: bool,
        #[serde(default)]
        escape: bool,
        #[serde(default)]
        is_else: bool,
        #[serde(default)]
        is_if: bool,
        #[serde(default)]
        has_if: bool,
        #[serde(default)]
        requires_block: bool,
    },
    #[serde(rename = "case")]
    Case { line: usize, val: String },
    #[serde(rename = "when")]
    When { line: usize, val: String },
    #[serde(rename = "default")]
    Default { line: usize },
    /// Iteration: `each val, key in code`
    #[serde(rename = "each")]
    Each {
        line: usize,
        val: String,
        #[serde(default)]
        key: Option<String>,
        code: String,
    },

    // === Mixins ===
    #[serde(rename = "mixin")]
    Mixin {
        line: usize,
        val: String,
        #[serde(default)]
        args: Option<String>,
    },
    #[serde(rename = "mixin-block")]
    MixinBlock { line: usize },
    #[serde(rename = "call")]
    Call {
        line: usize,
        val: String,
        #[serde(default)]
        args: Option<String>,
    },

    // === Inheritance ===
    #[serde(rename = "extends")]
    Extends { line: usize, val: String },
    #[serde(rename = "include")]
    Include {
        line: usize,
        val: String,
        #[serde(default)]
        filter: Option<String>,
        #[serde(default)]
        attrs: Vec<Attribute>,
    },
    #[serde(rename = "block")]
    Block {
        line: usize,
        val: String,
        #[serde(default)]
        mode: BlockMode,
    },
    #[serde(rename = "yield")]
    Yield { line: usize },

    // === Content ===
    #[serde(rename = "doctype")]
    Doctype {
        line: usize,
        #[serde(default)]
        val: String,
    },
    #[serde(rename = "filter")]
    Filter { line: usize, val: String },
    #[serde(rename = "comment")]
    Comment {
        line: usize,
        val: String,
        #[serde(default)]
        buffer: bool,
    },
    #[serde(rename = "text")]
    Text { line: usize, val: String },
    /// Raw HTML line passed through untouched: `<p>hi</p>`
    #[serde(rename = "text-html")]
    TextHtml { line: usize, val: String },
    /// `#[` opening an inline tag inside text
    #[serde(rename = "start-jade-interpolation")]
    StartJadeInterpolation { line: usize },
    #[serde(rename = "end-jade-interpolation")]
    EndJadeInterpolation { line: usize },
    #[serde(rename = "start-pipeless-text")]
    StartPipelessText { line: usize },
    #[serde(rename = "end-pipeless-text")]
    EndPipelessText { line: usize },

    // === Structural ===
    #[serde(rename = "indent")]
    Indent {
        line: usize,
        #[serde(default)]
        val: usize,
    },
    #[serde(rename = "outdent")]
    Outdent { line: usize },
    #[serde(rename = "newline")]
    Newline { line: usize },
    /// Block expansion: `li: a(href=url) Home`
    #[serde(rename = ":")]
    Colon { line: usize },
    /// Trailing `.` switching a tag into text-only mode
    #[serde(rename = "dot")]
    Dot { line: usize },
    /// End of stream
    #[serde(rename = "eos")]
    Eos { line: usize },
}

/// Token type discriminant, used for lookahead checks and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Tag,
    Interpolation,
    Id,
    Class,
    Attrs,
    AndAttributes,
    Code,
    Case,
    When,
    Default,
    Each,
    Mixin,
    MixinBlock,
    Call,
    Extends,
    Include,
    Block,
    Yield,
    Doctype,
    Filter,
    Comment,
    Text,
    TextHtml,
    StartJadeInterpolation,
    EndJadeInterpolation,
    StartPipelessText,
    EndPipelessText,
    Indent,
    Outdent,
    Newline,
    Colon,
    Dot,
    Eos,
}

impl TokenKind {
    /// Wire name of the token type, as the lexer spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Tag => "tag",
            TokenKind::Interpolation => "interpolation",
            TokenKind::Id => "id",
            TokenKind::Class => "class",
            TokenKind::Attrs => "attrs",
            TokenKind::AndAttributes => "&attributes",
            TokenKind::Code => "code",
            TokenKind::Case => "case",
            TokenKind::When => "when",
            TokenKind::Default => "default",
            TokenKind::Each => "each",
            TokenKind::Mixin => "mixin",
            TokenKind::MixinBlock => "mixin-block",
            TokenKind::Call => "call",
            TokenKind::Extends => "extends",
            TokenKind::Include => "include",
            TokenKind::Block => "block",
            TokenKind::Yield => "yield",
            TokenKind::Doctype => "doctype",
            TokenKind::Filter => "filter",
            TokenKind::Comment => "comment",
            TokenKind::Text => "text",
            TokenKind::TextHtml => "text-html",
            TokenKind::StartJadeInterpolation => "start-jade-interpolation",
            TokenKind::EndJadeInterpolation => "end-jade-interpolation",
            TokenKind::StartPipelessText => "start-pipeless-text",
            TokenKind::EndPipelessText => "end-pipeless-text",
            TokenKind::Indent => "indent",
            TokenKind::Outdent => "outdent",
            TokenKind::Newline => "newline",
            TokenKind::Colon => ":",
            TokenKind::Dot => "dot",
            TokenKind::Eos => "eos",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Tag { .. } => TokenKind::Tag,
            Token::Interpolation { .. } => TokenKind::Interpolation,
            Token::Id { .. } => TokenKind::Id,
            Token::Class { .. } => TokenKind::Class,
            Token::Attrs { .. } => TokenKind::Attrs,
            Token::AndAttributes { .. } => TokenKind::AndAttributes,
            Token::Code { .. } => TokenKind::Code,
            Token::Case { .. } => TokenKind::Case,
            Token::When { .. } => TokenKind::When,
            Token::Default { .. } => TokenKind::Default,
            Token::Each { .. } => TokenKind::Each,
            Token::Mixin { .. } => TokenKind::Mixin,
            Token::MixinBlock { .. } => TokenKind::MixinBlock,
            Token::Call { .. } => TokenKind::Call,
            Token::Extends { .. } => TokenKind::Extends,
            Token::Include { .. } => TokenKind::Include,
            Token::Block { .. } => TokenKind::Block,
            Token::Yield { .. } => TokenKind::Yield,
            Token::Doctype { .. } => TokenKind::Doctype,
            Token::Filter { .. } => TokenKind::Filter,
            Token::Comment { .. } => TokenKind::Comment,
            Token::Text { .. } => TokenKind::Text,
            Token::TextHtml { .. } => TokenKind::TextHtml,
            Token::StartJadeInterpolation { .. } => TokenKind::StartJadeInterpolation,
            Token::EndJadeInterpolation { .. } => TokenKind::EndJadeInterpolation,
            Token::StartPipelessText { .. } => TokenKind::StartPipelessText,
            Token::EndPipelessText { .. } => TokenKind::EndPipelessText,
            Token::Indent { .. } => TokenKind::Indent,
            Token::Outdent { .. } => TokenKind::Outdent,
            Token::Newline { .. } => TokenKind::Newline,
            Token::Colon { .. } => TokenKind::Colon,
            Token::Dot { .. } => TokenKind::Dot,
            Token::Eos { .. } => TokenKind::Eos,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Token::Tag { line, .. }
            | Token::Interpolation { line, .. }
            | Token::Id { line, .. }
            | Token::Class { line, .. }
            | Token::Attrs { line, .. }
            | Token::AndAttributes { line, .. }
            | Token::Code { line, .. }
            | Token::Case { line, .. }
            | Token::When { line, .. }
            | Token::Default { line }
            | Token::Each { line, .. }
            | Token::Mixin { line, .. }
            | Token::MixinBlock { line }
            | Token::Call { line, .. }
            | Token::Extends { line, .. }
            | Token::Include { line, .. }
            | Token::Block { line, .. }
            | Token::Yield { line }
            | Token::Doctype { line, .. }
            | Token::Filter { line, .. }
            | Token::Comment { line, .. }
            | Token::Text { line, .. }
            | Token::TextHtml { line, .. }
            | Token::StartJadeInterpolation { line }
            | Token::EndJadeInterpolation { line }
            | Token::StartPipelessText { line }
            | Token::EndPipelessText { line }
            | Token::Indent { line, .. }
            | Token::Outdent { line }
            | Token::Newline { line }
            | Token::Colon { line }
            | Token::Dot { line }
            | Token::Eos { line } => *line,
        }
    }

    /// Consume the token, keeping its `val` (empty for tokens without one)
    pub fn into_val(self) -> String {
        match self {
            Token::Tag { val, .. }
            | Token::Interpolation { val, .. }
            | Token::Id { val, .. }
            | Token::Class { val, .. }
            | Token::AndAttributes { val, .. }
            | Token::Code { val, .. }
            | Token::Case { val, .. }
            | Token::When { val, .. }
            | Token::Each { val, .. }
            | Token::Mixin { val, .. }
            | Token::Call { val, .. }
            | Token::Extends { val, .. }
            | Token::Include { val, .. }
            | Token::Block { val, .. }
            | Token::Doctype { val, .. }
            | Token::Filter { val, .. }
            | Token::Comment { val, .. }
            | Token::Text { val, .. }
            | Token::TextHtml { val, .. } => val,
            _ => String::new(),
        }
    }

    /// Whether this is a `code` token opening an `else` / `else if` branch
    pub fn is_else(&self) -> bool {
        matches!(self, Token::Code { is_else: true, .. })
    }

    /// Shorthand constructors, mostly for building streams in tests
    pub fn tag(name: &str, line: usize) -> Self {
        Token::Tag { line, val: name.to_string(), self_closing: false }
    }

    pub fn text(val: &str, line: usize) -> Self {
        Token::Text { line, val: val.to_string() }
    }

    pub fn code(val: &str, line: usize) -> Self {
        Token::Code {
            line,
            val: val.to_string(),
            buffer: false,
            escape: false,
            is_else: false,
            is_if: false,
            has_if: false,
            requires_block: false,
        }
    }

    pub fn attrs(pairs: &[(&str, &str)], line: usize) -> Self {
        Token::Attrs {
            line,
            attrs: pairs
                .iter()
                .map(|(name, val)| Attribute {
                    name: name.to_string(),
                    val: AttrValue::Expr(val.to_string()),
                    escaped: true,
                })
                .collect(),
            self_closing: false,
        }
    }
}

/// Decode a token stream from its JSON array form
pub fn tokens_from_json(json: &str) -> Result<Vec<Token>, serde_json::Error> {
    serde_json::from_str(json)
}
