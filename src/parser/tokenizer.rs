use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub use super::positions::{Position, Span};
use crate::error::{CompileError, ErrorKind};

/// Kinds of tokens produced by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// `// ...` up to the end of the line
    Comment,
    Lparen,
    Rparen,
    Lbracket,
    Rbracket,
    Lcurly,
    Rcurly,
    Equal,
    Semicolon,
    Colon,
    /// Triple-quoted literal: `"""..."""`
    MultilineString,
    /// Quoted literal: `"..."` or `'...'`
    String,
    /// `#name`
    IdName,
    /// `.name`
    ClassName,
    /// Bare word, also used for unquoted attribute values
    TagName,
    Whitespace,
    /// Body of a `css { ... }` block, outer braces stripped
    Raw,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Comment => "comment",
            TokenKind::Lparen => "`(`",
            TokenKind::Rparen => "`)`",
            TokenKind::Lbracket => "`[`",
            TokenKind::Rbracket => "`]`",
            TokenKind::Lcurly => "`{`",
            TokenKind::Rcurly => "`}`",
            TokenKind::Equal => "`=`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::MultilineString => "multiline string",
            TokenKind::String => "string",
            TokenKind::IdName => "id",
            TokenKind::ClassName => "class name",
            TokenKind::TagName => "name",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Raw => "css block",
        }
    }
}

/// A token: its kind, the text it was read from, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    #[serde(skip)]
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self { kind, lexeme: lexeme.into(), span }
    }
}

/// What a matching pattern produces
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// `css {`: hand over to the verbatim sub-scanner
    BeginRaw,
    Emit(TokenKind),
}

enum Pattern {
    Literal(&'static str),
    Regex(Regex),
}

impl Pattern {
    fn regex(pattern: &str) -> Self {
        Pattern::Regex(Regex::new(pattern).expect("token pattern must compile"))
    }

    /// Length of the match anchored at the start of `text`, if any
    fn match_len(&self, text: &str) -> Option<usize> {
        match self {
            Pattern::Literal(literal) => text.starts_with(literal).then(|| literal.len()),
            Pattern::Regex(regex) => regex.find(text).map(|m| m.end()),
        }
    }
}

lazy_static! {
    // Ordered choice: the first pattern that matches wins, so the order of
    // this table is part of the grammar.
    static ref RULES: Vec<(Rule, Pattern)> = vec![
        (Rule::BeginRaw, Pattern::regex(r"^css\s*\{")),
        (Rule::Emit(TokenKind::Comment), Pattern::regex(r"^//.*")),
        (Rule::Emit(TokenKind::Lparen), Pattern::Literal("(")),
        (Rule::Emit(TokenKind::Rparen), Pattern::Literal(")")),
        (Rule::Emit(TokenKind::Lbracket), Pattern::Literal("[")),
        (Rule::Emit(TokenKind::Rbracket), Pattern::Literal("]")),
        (Rule::Emit(TokenKind::Lcurly), Pattern::Literal("{")),
        (Rule::Emit(TokenKind::Rcurly), Pattern::Literal("}")),
        (Rule::Emit(TokenKind::Equal), Pattern::Literal("=")),
        (Rule::Emit(TokenKind::Semicolon), Pattern::Literal(";")),
        (Rule::Emit(TokenKind::Colon), Pattern::Literal(":")),
        (
            Rule::Emit(TokenKind::MultilineString),
            Pattern::regex(r#"^"""(?:[^"\\]|\\.)*(?:"{1,2}(?:[^"\\]|\\.)+)*""""#),
        ),
        (
            Rule::Emit(TokenKind::String),
            Pattern::regex(r#"^(?:"(?:[^"\r\n\\]|\\.)*"|'(?:[^'\r\n\\]|\\.)*')"#),
        ),
        (Rule::Emit(TokenKind::IdName), Pattern::regex(r"^#[A-Za-z0-9_-]+")),
        (Rule::Emit(TokenKind::ClassName), Pattern::regex(r"^\.[A-Za-z0-9_-]+")),
        (Rule::Emit(TokenKind::TagName), Pattern::regex(r"^[A-Za-z0-9_-]+")),
        (Rule::Emit(TokenKind::Whitespace), Pattern::regex(r"^\s+")),
    ];
}

fn is_bracket(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '{' | '}')
}

/// First line of `text`, shortened for error messages
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > 24 {
        let head: String = line.chars().take(24).collect();
        format!("{head}…")
    } else {
        line.to_string()
    }
}

/// Pull-based tokenizer over a source string.
///
/// Yields one token per call to `next` and stops for good after the end of
/// input or the first error.
pub struct Tokenizer<'a> {
    source: &'a str,
    position: Position,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: Position::new(),
            finished: false,
        }
    }

    /// Current cursor position
    pub fn position(&self) -> Position {
        self.position
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position.byte..]
    }

    fn next_token(&mut self) -> Result<Option<Token>, CompileError> {
        let rest = self.rest();
        if rest.is_empty() {
            return Ok(None);
        }

        for (rule, pattern) in RULES.iter() {
            let Some(len) = pattern.match_len(rest) else {
                continue;
            };
            let start = self.position;
            let lexeme = &rest[..len];
            self.position.advance_over(lexeme);

            return match rule {
                Rule::BeginRaw => self.scan_raw(start).map(Some),
                Rule::Emit(kind) => Ok(Some(Token::new(
                    *kind,
                    lexeme,
                    Span::new(start, self.position),
                ))),
            };
        }

        let mut end = self.position;
        end.advance_over(rest.chars().next().map_or("", |c| &rest[..c.len_utf8()]));
        Err(CompileError::new(
            ErrorKind::Lex,
            format!("Cannot tokenize from here: `{}`", preview(rest)),
            Span::new(self.position, end),
        )
        .with_help("Expected a tag name, `.class`, `#id`, `[attribute]`, a string, `{`, `}` or `;`"))
    }

    /// Scan the body of a `css { ... }` block. The opening brace has already
    /// been consumed; the first unbalanced closing bracket ends the block.
    fn scan_raw(&mut self, start: Position) -> Result<Token, CompileError> {
        let mut raw = String::new();
        let mut depth: isize = 0;

        loop {
            let rest = self.rest();
            let run = rest.find(is_bracket).unwrap_or(rest.len());
            if run > 0 {
                raw.push_str(&rest[..run]);
                self.position.advance_over(&rest[..run]);
                continue;
            }

            let Some(bracket) = rest.chars().next() else {
                return Err(CompileError::new(
                    ErrorKind::UnbalancedInput,
                    "This `css` block is never closed.",
                    Span::new(start, self.position),
                )
                .with_help("Close the block with a matching `}`"));
            };
            self.position.advance_over(&rest[..1]);

            if matches!(bracket, '(' | '[' | '{') {
                depth += 1;
            } else {
                depth -= 1;
            }
            if depth < 0 {
                return Ok(Token::new(TokenKind::Raw, raw, Span::new(start, self.position)));
            }
            raw.push(bracket);
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Tokenize a source string lazily
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer::new(source)
}
