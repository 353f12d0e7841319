//! Compiler for imitation SCSS: nested selectors, attributes, text content
//! and verbatim `css { ... }` blocks, turned into an HTML string.
//!
//! ```text
//! main.page {
//!     h1 { content: "Hello"; }
//!     a[href="/about"] { content: "About"; }
//! }
//! ```
//!
//! compiles to `<main class="page"><h1>Hello</h1><a href="/about">About</a></main>`.

pub mod error;
pub mod generate;
pub mod html;
pub mod literal;
pub mod parser;

pub use error::{CompileError, ErrorKind};
pub use generate::{Frame, Generator, Selector, TraceStep};
pub use parser::{Position, Span, Token, TokenKind, Tokenizer, tokenize};

use serde::Serialize;

/// Prefix the command line tool seeds the output with.
pub const DOCTYPE: &str = "<!DOCTYPE html>";

/// Configuration for compilation.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Text the output starts with
    pub prefix: String,
    /// Record every (token, frame) pair in `Output::trace`
    pub trace: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Output {
    pub html: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
}

/// Compile with default options
pub fn compile(source: &str) -> Result<String, CompileError> {
    compile_with(source, &Options::default()).map(|output| output.html)
}

pub fn compile_with(source: &str, options: &Options) -> Result<Output, CompileError> {
    let mut generator = Generator::new(&options.prefix, options.trace);
    for token in tokenize(source) {
        generator.feed(token?)?;
    }
    generator.finish()
}

/// Trailing comment recording which file a page was generated from.
pub fn provenance_comment(input: &str) -> String {
    format!("\n<!-- Generated from {} -->\n", input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple() {
        assert_eq!(compile(r#"p { content: "hi"; }"#).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_prefix() {
        let options = Options {
            prefix: DOCTYPE.to_string(),
            ..Options::default()
        };
        let output = compile_with("html { body; }", &options).unwrap();
        assert_eq!(output.html, "<!DOCTYPE html><html><body></html>");
        assert!(output.trace.is_empty());
    }

    #[test]
    fn test_trace_does_not_change_output() {
        let source = "div.a[x=1] { content: \"&\"; }";
        let plain = compile(source).unwrap();
        let traced = compile_with(source, &Options { trace: true, ..Options::default() }).unwrap();
        assert_eq!(traced.html, plain);
        assert!(!traced.trace.is_empty());
    }

    #[test]
    fn test_output_json() {
        let output = compile_with("br;", &Options { trace: true, ..Options::default() }).unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["html"], "<br>");
        assert_eq!(json["trace"][0]["token"], serde_json::json!({ "kind": "tagName", "lexeme": "br" }));
        assert_eq!(json["trace"][1]["frame"]["type"], "selector");
        assert_eq!(json["trace"][1]["frame"]["tag"], "br");
    }

    #[test]
    fn test_provenance_comment() {
        assert_eq!(
            provenance_comment("home-page/index.html.scss"),
            "\n<!-- Generated from home-page/index.html.scss -->\n"
        );
    }
}
