use crate::config::{FAILURE_MESSAGE, LOADING_MESSAGE};
use crate::dom::Fragment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a tooltip surface is asked to display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TooltipContent {
    /// Plain text, e.g. the loading or failure message
    Placeholder(String),
    /// A description fragment
    Fragment(Fragment),
}

impl TooltipContent {
    pub fn loading() -> Self {
        TooltipContent::Placeholder(LOADING_MESSAGE.to_string())
    }

    pub fn failed() -> Self {
        TooltipContent::Placeholder(FAILURE_MESSAGE.to_string())
    }

    /// The fragment, if this content is one
    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            TooltipContent::Fragment(fragment) => Some(fragment),
            TooltipContent::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, TooltipContent::Placeholder(_))
    }
}

impl fmt::Display for TooltipContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TooltipContent::Placeholder(text) => f.write_str(text),
            TooltipContent::Fragment(fragment) => f.write_str(fragment.as_html()),
        }
    }
}
