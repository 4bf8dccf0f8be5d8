//! `IOput` — one message input or output of a transition function.

use crate::condition::{Condition, ConditionDef};

/// Input ordering request: sort the message iterator by a payload variable.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sort {
    /// Message payload variable to sort by.
    pub key: String,
    /// `"ascend"` or `"descend"` — checked by the validator.
    pub order: String,
}

/// A message input or output declared on a transition function.
///
/// `sort` and `random` are mutually exclusive; `filter` only makes sense on
/// inputs.  Both rules are enforced by the validator, not the type.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IOput {
    pub message_name: String,

    /// Raw filter predicate over `m.` payload and `a.` memory variables.
    pub filter_def: Option<ConditionDef>,
    /// Resolved filter, set by the validator.
    pub filter: Option<Condition>,

    pub sort: Option<Sort>,

    /// Raw `random` attribute (`"true"`/`"false"`).
    pub random_str: Option<String>,
    /// Resolved `random` attribute.
    pub random: Option<bool>,
}

impl IOput {
    pub fn new(message_name: impl Into<String>) -> Self {
        Self {
            message_name: message_name.into(),
            filter_def: None,
            filter: None,
            sort: None,
            random_str: None,
            random: None,
        }
    }

    pub fn with_filter(mut self, filter: ConditionDef) -> Self {
        self.filter_def = Some(filter);
        self
    }

    pub fn with_sort(mut self, key: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort = Some(Sort { key: key.into(), order: order.into() });
        self
    }

    pub fn with_random(mut self, random: &str) -> Self {
        self.random_str = Some(random.to_owned());
        self
    }
}
