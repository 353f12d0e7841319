use crate::html;
use serde::Serialize;

/// Progress through `[name=value]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeStep {
    Name,
    PostName,
    Value,
    End,
}

/// Progress through `content: "text";`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentStep {
    AfterContent,
    Value,
    End,
}

/// Element description collected from a selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selector {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub id: Option<String>,
    /// Declared attributes in order; `None` marks a boolean attribute
    pub attributes: Vec<(String, Option<String>)>,
}

impl Selector {
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn tag_name(&self) -> &str {
        self.tag.as_deref().unwrap_or(html::DEFAULT_TAG)
    }

    /// Opening tag: declared attributes first, then `class`, then `id`.
    pub fn open_tag(&self) -> String {
        let classes = self.classes.join(" ");
        let declared = self
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()));
        let class = (!self.classes.is_empty()).then(|| ("class", Some(classes.as_str())));
        let id = self.id.as_deref().map(|id| ("id", Some(id)));

        html::start_tag(self.tag_name(), declared.chain(class).chain(id))
    }

    pub fn close_tag(&self) -> String {
        html::end_tag(self.tag_name())
    }
}

/// One entry of the generator's context stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Frame {
    /// Freshly opened scope; its statement kind is not known yet
    Empty,
    Selector(Selector),
    Attribute {
        step: AttributeStep,
        name: Option<String>,
        value: Option<String>,
    },
    /// Text node; the text goes straight to the output
    Content { step: ContentStep },
}

impl Frame {
    pub fn attribute() -> Self {
        Frame::Attribute {
            step: AttributeStep::Name,
            name: None,
            value: None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Frame::Empty => "an empty statement",
            Frame::Selector(_) => "a selector",
            Frame::Attribute { .. } => "an attribute",
            Frame::Content { .. } => "a content statement",
        }
    }
}
