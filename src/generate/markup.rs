use super::frame::{AttributeStep, ContentStep, Frame, Selector};
use super::TraceStep;
use crate::error::{CompileError, ErrorKind};
use crate::html;
use crate::literal;
use crate::parser::{Span, Token, TokenKind};
use crate::Output;

/// Keyword that starts a text statement when it opens a fresh scope
const CONTENT_KEYWORD: &str = "content";

fn unexpected(token: &Token, message: impl Into<String>) -> CompileError {
    CompileError::new(ErrorKind::Parse, message, token.span)
}

/// Frame the next token applies to.
///
/// The bottom frame is never popped (`end_block` refuses a `}` without a
/// frame below), so the push only restores that invariant.
fn top_mut(stack: &mut Vec<Frame>) -> &mut Frame {
    if stack.is_empty() {
        stack.push(Frame::Empty);
    }
    let last = stack.len() - 1;
    &mut stack[last]
}

/// Stack machine turning tokens into HTML.
///
/// Every token is applied to the frame on top of the stack. Markup is
/// appended as soon as it is known: text at its string token, opening tags
/// at `{` or `;`, closing tags at `}`.
pub struct Generator {
    stack: Vec<Frame>,
    html: String,
    /// Spans of the `{` tokens still waiting for their `}`, one per frame
    /// above the bottom one that is not an attribute
    open_blocks: Vec<Span>,
    last_span: Span,
    trace: Option<Vec<TraceStep>>,
}

impl Generator {
    pub fn new(prefix: &str, trace: bool) -> Self {
        Self {
            stack: vec![Frame::Empty],
            html: prefix.to_string(),
            open_blocks: Vec::new(),
            last_span: Span::default(),
            trace: trace.then(Vec::new),
        }
    }

    /// Apply one token
    pub fn feed(&mut self, token: Token) -> Result<(), CompileError> {
        if let Some(trace) = &mut self.trace {
            trace.push(TraceStep {
                token: token.clone(),
                frame: top_mut(&mut self.stack).clone(),
            });
        }
        self.last_span = token.span;

        match token.kind {
            TokenKind::Comment | TokenKind::Whitespace => Ok(()),
            TokenKind::TagName => self.tag_name(&token),
            TokenKind::ClassName => {
                let selector = self.selector(&token)?;
                selector.classes.push(token.lexeme[1..].to_string());
                Ok(())
            }
            TokenKind::IdName => {
                let selector = self.selector(&token)?;
                if let Some(id) = &selector.id {
                    return Err(unexpected(&token, format!("ID already set to `#{}`", id))
                        .with_help("A selector takes at most one `#id`"));
                }
                selector.id = Some(token.lexeme[1..].to_string());
                Ok(())
            }
            TokenKind::Lbracket => {
                self.selector(&token)?;
                self.stack.push(Frame::attribute());
                Ok(())
            }
            TokenKind::Equal => match top_mut(&mut self.stack) {
                Frame::Attribute { step, .. } if *step == AttributeStep::PostName => {
                    *step = AttributeStep::Value;
                    Ok(())
                }
                Frame::Attribute { .. } => Err(unexpected(&token, "`=` must follow an attribute name")),
                _ => Err(unexpected(&token, "`=` is only allowed inside `[...]`")),
            },
            TokenKind::Rbracket => self.end_attribute(&token),
            TokenKind::String | TokenKind::MultilineString => self.literal(&token),
            TokenKind::Lcurly => {
                let open = self.selector(&token)?.open_tag();
                self.html.push_str(&open);
                self.stack.push(Frame::Empty);
                self.open_blocks.push(token.span);
                Ok(())
            }
            TokenKind::Rcurly => self.end_block(&token),
            TokenKind::Semicolon => self.end_statement(&token),
            TokenKind::Colon => match top_mut(&mut self.stack) {
                Frame::Content { step } if *step == ContentStep::AfterContent => {
                    *step = ContentStep::Value;
                    Ok(())
                }
                Frame::Content { .. } => Err(unexpected(&token, "`:` must follow `content`")),
                _ => Err(unexpected(&token, "`:` is only allowed after `content`")),
            },
            TokenKind::Raw => match top_mut(&mut self.stack) {
                Frame::Empty => {
                    self.html.push_str(&html::style_block(&token.lexeme));
                    Ok(())
                }
                _ => Err(unexpected(&token, "A `css` block must be a statement of its own")),
            },
            TokenKind::Lparen | TokenKind::Rparen => Err(unexpected(
                &token,
                format!("Unexpected {}", token.kind.as_str()),
            )
            .with_help("Parentheses are only allowed inside `css { ... }` blocks")),
        }
    }

    /// Check that the input left no statement open and return the output
    pub fn finish(mut self) -> Result<Output, CompileError> {
        let end = Span::at(self.last_span.end);

        match top_mut(&mut self.stack) {
            Frame::Empty => {}
            frame @ (Frame::Selector(_) | Frame::Content { .. }) => {
                return Err(CompileError::new(
                    ErrorKind::UnbalancedInput,
                    format!("Input ends inside {}.", frame.describe()),
                    end,
                )
                .with_help("Finish the statement with `;` or a `{ ... }` block"));
            }
            Frame::Attribute { .. } => {
                return Err(CompileError::new(
                    ErrorKind::UnbalancedInput,
                    "Input ends inside an attribute.",
                    end,
                )
                .with_help("Close the attribute with `]`"));
            }
        }

        if self.stack.len() > 1 {
            let mut err = CompileError::new(
                ErrorKind::UnbalancedInput,
                "This block is never closed.",
                end,
            )
            .with_help("Close with `}`");
            if let Some(open) = self.open_blocks.last() {
                err = err.with_related(*open, "opened here");
            }
            return Err(err);
        }

        Ok(Output {
            html: self.html,
            trace: self.trace.unwrap_or_default(),
        })
    }

    /// Top frame as a selector, promoting an empty frame
    fn selector(&mut self, token: &Token) -> Result<&mut Selector, CompileError> {
        let top = top_mut(&mut self.stack);
        if *top == Frame::Empty {
            *top = Frame::Selector(Selector::default());
        }
        match top {
            Frame::Selector(selector) => Ok(selector),
            other => Err(unexpected(
                token,
                format!("Unexpected {} inside {}", token.kind.as_str(), other.describe()),
            )),
        }
    }

    fn tag_name(&mut self, token: &Token) -> Result<(), CompileError> {
        let name = token.lexeme.clone();
        match top_mut(&mut self.stack) {
            top @ Frame::Empty => {
                *top = if name == CONTENT_KEYWORD {
                    Frame::Content { step: ContentStep::AfterContent }
                } else {
                    Frame::Selector(Selector::with_tag(name))
                };
                Ok(())
            }
            Frame::Selector(selector) => {
                if let Some(existing) = &selector.tag {
                    return Err(unexpected(
                        token,
                        format!("Tag name already set to `{}`", existing),
                    )
                    .with_help("Write nested elements inside `{ ... }`"));
                }
                selector.tag = Some(name);
                Ok(())
            }
            Frame::Attribute { step, name: slot, .. } if *step == AttributeStep::Name => {
                *slot = Some(name);
                *step = AttributeStep::PostName;
                Ok(())
            }
            Frame::Attribute { step, value, .. } if *step == AttributeStep::Value => {
                *value = Some(name);
                *step = AttributeStep::End;
                Ok(())
            }
            Frame::Attribute { .. } => Err(unexpected(
                token,
                format!("Unexpected `{}` inside an attribute", name),
            )
            .with_help("Attributes look like `[name]` or `[name=value]`")),
            Frame::Content { .. } => Err(unexpected(
                token,
                format!("Unexpected `{}` in a content statement", name),
            )
            .with_help("Text must be quoted: `content: \"...\";`")),
        }
    }

    fn literal(&mut self, token: &Token) -> Result<(), CompileError> {
        let decoded = match token.kind {
            TokenKind::MultilineString => literal::dedent_multiline(&token.lexeme),
            _ => literal::decode_string(&token.lexeme)
                .map_err(|e| CompileError::new(ErrorKind::Lex, format!("Invalid string literal: {}", e), token.span))?,
        };
        let escaped = html::escape(&decoded);

        match top_mut(&mut self.stack) {
            Frame::Attribute { step, value, .. } if *step == AttributeStep::Value => {
                *value = Some(escaped);
                *step = AttributeStep::End;
                Ok(())
            }
            Frame::Content { step } if *step == ContentStep::Value => {
                self.html.push_str(&escaped);
                *step = ContentStep::End;
                Ok(())
            }
            Frame::Attribute { .. } => Err(unexpected(token, "String must be after equal sign")),
            Frame::Content { .. } => Err(unexpected(token, "String must be after colon")),
            _ => Err(unexpected(token, "Unexpected string")
                .with_help("Text goes in a content statement: `content: \"...\";`")),
        }
    }

    fn end_attribute(&mut self, token: &Token) -> Result<(), CompileError> {
        let attribute = match top_mut(&mut self.stack) {
            Frame::Attribute {
                step: AttributeStep::PostName | AttributeStep::End,
                name: Some(name),
                value,
            } => (name.clone(), value.clone()),
            Frame::Attribute { .. } => {
                return Err(unexpected(token, "`]` must come after a name or a value"));
            }
            _ => return Err(unexpected(token, "`]` without a matching `[`")),
        };
        self.stack.pop();

        match top_mut(&mut self.stack) {
            Frame::Selector(selector) => {
                selector.attributes.push(attribute);
                Ok(())
            }
            _ => Err(unexpected(token, "Attribute outside of a selector")),
        }
    }

    fn end_block(&mut self, token: &Token) -> Result<(), CompileError> {
        if self.stack.len() < 2 {
            return Err(unexpected(token, "Unmatched `}`")
                .with_help("There is no open `{` to close here"));
        }
        self.stack.pop();

        match top_mut(&mut self.stack) {
            Frame::Selector(selector) => {
                let close = selector.close_tag();
                self.html.push_str(&close);
                self.stack.pop();
                self.stack.push(Frame::Empty);
                // A `}` over an attribute closes the selector holding it,
                // not the enclosing block
                self.open_blocks.truncate(self.stack.len() - 1);
                Ok(())
            }
            other => Err(unexpected(
                token,
                format!("`}}` closes {} instead of a block", other.describe()),
            )),
        }
    }

    fn end_statement(&mut self, token: &Token) -> Result<(), CompileError> {
        match top_mut(&mut self.stack) {
            Frame::Selector(selector) => {
                let open = selector.open_tag();
                self.html.push_str(&open);
            }
            Frame::Content { step: ContentStep::End } => {}
            Frame::Content { .. } => {
                return Err(unexpected(token, "`;` must come after the content string"));
            }
            other => {
                return Err(unexpected(
                    token,
                    format!("Unexpected `;` in {}", other.describe()),
                ));
            }
        }
        self.stack.pop();
        self.stack.push(Frame::Empty);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;

    fn run(source: &str) -> Result<String, CompileError> {
        let mut generator = Generator::new("", false);
        for token in tokenize(source) {
            generator.feed(token?)?;
        }
        generator.finish().map(|output| output.html)
    }

    fn error_kind(source: &str) -> ErrorKind {
        run(source).unwrap_err().kind
    }

    #[test]
    fn test_content() {
        assert_eq!(run(r#"p { content: "hi"; }"#).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_prefix() {
        let mut generator = Generator::new("<!DOCTYPE html>", false);
        for token in tokenize("br;") {
            generator.feed(token.unwrap()).unwrap();
        }
        assert_eq!(generator.finish().unwrap().html, "<!DOCTYPE html><br>");
    }

    #[test]
    fn test_class_on_default_tag() {
        assert_eq!(run(".klass {}").unwrap(), r#"<div class="klass"></div>"#);
    }

    #[test]
    fn test_attributes() {
        assert_eq!(
            run("div[id=foo][checked] {}").unwrap(),
            r#"<div id="foo" checked></div>"#
        );
    }

    #[test]
    fn test_attribute_with_spaces() {
        assert_eq!(
            run(r#"input[ type = "text" ];"#).unwrap(),
            r#"<input type="text">"#
        );
    }

    #[test]
    fn test_attribute_value_is_escaped() {
        assert_eq!(
            run(r#"a[title="a < b"];"#).unwrap(),
            r#"<a title="a &lt; b">"#
        );
    }

    #[test]
    fn test_self_closing_statement() {
        assert_eq!(run("hr; br;").unwrap(), "<hr><br>");
    }

    #[test]
    fn test_bare_block_promotes_to_div() {
        assert_eq!(run("{ }").unwrap(), "<div></div>");
    }

    #[test]
    fn test_nesting_and_siblings() {
        let source = r#"
            ul.list {
                li { content: "one"; }
                li { content: "two"; }
            }
            footer;
        "#;
        assert_eq!(
            run(source).unwrap(),
            r#"<ul class="list"><li>one</li><li>two</li></ul><footer>"#
        );
    }

    #[test]
    fn test_content_keyword_only_in_fresh_frame() {
        assert_eq!(run(".x content;").unwrap(), r#"<content class="x">"#);
        assert_eq!(run("[content=content];").unwrap(), r#"<div content="content">"#);
        assert_eq!(error_kind("p content;"), ErrorKind::Parse);
    }

    #[test]
    fn test_raw_block() {
        assert_eq!(
            run("css{ a{b:1;} } p;").unwrap(),
            "<style> a{b:1;} </style><p>"
        );
    }

    #[test]
    fn test_raw_block_inside_selector_is_rejected() {
        assert_eq!(error_kind("p css{ a }"), ErrorKind::Parse);
    }

    #[test]
    fn test_comments_are_dropped() {
        assert_eq!(run("// heading\nh1; // trailing").unwrap(), "<h1>");
    }

    #[test]
    fn test_duplicate_tag() {
        let err = run("p span {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.message.contains("`p`"));
    }

    #[test]
    fn test_duplicate_id() {
        assert_eq!(error_kind("#a#b {}"), ErrorKind::Parse);
        assert_eq!(error_kind("p#a.c#b;"), ErrorKind::Parse);
    }

    #[test]
    fn test_misplaced_tokens() {
        assert_eq!(error_kind("= p;"), ErrorKind::Parse);
        assert_eq!(error_kind("p: x;"), ErrorKind::Parse);
        assert_eq!(error_kind(";"), ErrorKind::Parse);
        assert_eq!(error_kind("p[a b];"), ErrorKind::Parse);
        assert_eq!(error_kind("p[=a];"), ErrorKind::Parse);
        assert_eq!(error_kind("p[a=];"), ErrorKind::Parse);
        assert_eq!(error_kind("content \"x\";"), ErrorKind::Parse);
        assert_eq!(error_kind("content: x;"), ErrorKind::Parse);
        assert_eq!(error_kind("content: \"x\" \"y\";"), ErrorKind::Parse);
        assert_eq!(error_kind("\"loose\";"), ErrorKind::Parse);
        assert_eq!(error_kind("p(x);"), ErrorKind::Parse);
    }

    #[test]
    fn test_unmatched_close() {
        assert_eq!(error_kind("}"), ErrorKind::Parse);
        assert_eq!(error_kind("p {} }"), ErrorKind::Parse);
    }

    #[test]
    fn test_invalid_escape_is_lex_error() {
        assert_eq!(error_kind(r#"content: "\q";"#), ErrorKind::Lex);
    }

    #[test]
    fn test_unclosed_block() {
        let err = run("main {\n  p;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnbalancedInput);
        assert_eq!(err.related_span.unwrap().start.col, 5);
    }

    #[test]
    fn test_unfinished_statements() {
        assert_eq!(error_kind("p"), ErrorKind::UnbalancedInput);
        assert_eq!(error_kind("p[x"), ErrorKind::UnbalancedInput);
        assert_eq!(error_kind(r#"content: "x""#), ErrorKind::UnbalancedInput);
        assert_eq!(error_kind("div { p[ }"), ErrorKind::UnbalancedInput);
    }

    #[test]
    fn test_close_over_attribute_keeps_outer_block_open() {
        let err = run("div {\n  p[ }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnbalancedInput);
        assert_eq!(err.related_span.unwrap().start.col, 4);

        // The stray `}` closed `p`; the real one closes `div`
        assert_eq!(run("div { p[ } }").unwrap(), "<div></p></div>");
        assert_eq!(run("div { p[x=1 } }").unwrap(), "<div></p></div>");
    }

    #[test]
    fn test_close_over_unfinished_selector() {
        // `p` never reached `{` or `;`, so only `div` renders
        assert_eq!(run("div { p }").unwrap(), "<div></div>");
        assert_eq!(run("div { .a#b } span;").unwrap(), "<div></div><span>");
        assert_eq!(error_kind("main { div { p } "), ErrorKind::UnbalancedInput);
    }

    #[test]
    fn test_trace_records_frames() {
        let mut generator = Generator::new("", true);
        for token in tokenize("p;") {
            generator.feed(token.unwrap()).unwrap();
        }
        let output = generator.finish().unwrap();
        assert_eq!(output.trace.len(), 2);
        assert_eq!(output.trace[0].frame, Frame::Empty);
        assert_eq!(output.trace[1].frame, Frame::Selector(Selector::with_tag("p")));
    }
}
