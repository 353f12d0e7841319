mod positions;
pub mod tokenizer;

pub use positions::{Position, Span};
pub use tokenizer::{Token, TokenKind, Tokenizer, tokenize};
