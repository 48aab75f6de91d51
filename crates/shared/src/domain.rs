use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

macro_rules! value_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

value_newtype!(MessageIndex, usize);
value_newtype!(CounterValue, i64);

impl MessageIndex {
    pub const DEFAULT: MessageIndex = MessageIndex(0);
}

impl CounterValue {
    pub const BASELINE: CounterValue = CounterValue(0);
}

/// Fixed, non-empty, ordered list of display strings.
///
/// Cloning is cheap; the strings are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    messages: Arc<[String]>,
}

impl MessageCatalog {
    pub fn new<I, S>(messages: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
        if messages.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self {
            messages: messages.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, index: MessageIndex) -> bool {
        index.0 < self.messages.len()
    }

    pub fn get(&self, index: MessageIndex) -> Option<&str> {
        self.messages.get(index.0).map(String::as_str)
    }

    /// Text for `index`, or the default entry when the index is out of range.
    pub fn text(&self, index: MessageIndex) -> &str {
        self.get(index)
            .unwrap_or_else(|| self.messages[MessageIndex::DEFAULT.0].as_str())
    }

    /// Validates a raw persisted value. Negative, oversized, or non-integer
    /// values yield `None` so the caller can fall back to the default.
    pub fn index_from_json(&self, raw: &serde_json::Value) -> Option<MessageIndex> {
        let index = usize::try_from(raw.as_u64()?).ok().map(MessageIndex)?;
        self.contains(index).then_some(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn abc() -> MessageCatalog {
        MessageCatalog::new(["A", "B", "C"]).expect("catalog")
    }

    #[test]
    fn rejects_empty_catalog() {
        let err = MessageCatalog::new(Vec::<String>::new()).expect_err("empty catalog");
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn text_falls_back_to_first_entry_when_out_of_range() {
        let catalog = abc();
        assert_eq!(catalog.text(MessageIndex(2)), "C");
        assert_eq!(catalog.text(MessageIndex(7)), "A");
    }

    #[test]
    fn persisted_index_must_be_in_range_integer() {
        let catalog = abc();
        assert_eq!(catalog.index_from_json(&json!(1)), Some(MessageIndex(1)));
        assert_eq!(catalog.index_from_json(&json!(3)), None);
        assert_eq!(catalog.index_from_json(&json!(-1)), None);
        assert_eq!(catalog.index_from_json(&json!(1.5)), None);
        assert_eq!(catalog.index_from_json(&json!("2")), None);
        assert_eq!(catalog.index_from_json(&serde_json::Value::Null), None);
    }

    #[test]
    fn newtypes_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_value(MessageIndex(2)).expect("json"), json!(2));
        assert_eq!(serde_json::to_value(CounterValue(-4)).expect("json"), json!(-4));
    }
}
