mod frame;
mod markup;

pub use frame::{AttributeStep, ContentStep, Frame, Selector};
pub use markup::Generator;

use crate::parser::Token;
use serde::Serialize;

/// A token together with the frame it was applied to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub token: Token,
    pub frame: Frame,
}
