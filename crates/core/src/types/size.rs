//! Size selection for cart lines.
//!
//! Clients send the selected size in several shapes: a bare id, a display
//! name, or an object carrying either. All of them collapse into
//! [`SizeSelector`] during deserialization so the cart logic only ever sees
//! one of two cases.

use serde::{Deserialize, Serialize};

use super::id::SizeId;

/// A requested size variant, by id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSizeSelector")]
pub enum SizeSelector {
    /// Display name or value, e.g. `"12 x 8 inch"` or `"12x8"`.
    Name(String),
    /// Size variant id.
    Id(SizeId),
}

impl SizeSelector {
    /// Whether this selector names a given variant.
    ///
    /// Names compare case-insensitively against both the display name and
    /// the short value of the variant.
    #[must_use]
    pub fn matches(&self, id: SizeId, name: &str, value: &str) -> bool {
        match self {
            Self::Id(wanted) => *wanted == id,
            Self::Name(wanted) => {
                let wanted = wanted.trim();
                wanted.eq_ignore_ascii_case(name.trim())
                    || (!value.trim().is_empty() && wanted.eq_ignore_ascii_case(value.trim()))
            }
        }
    }

    /// An empty name means "no size selected".
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Name(name) if name.trim().is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSizeSelector {
    Id(i32),
    Text(String),
    Object {
        #[serde(default, alias = "_id")]
        id: Option<IdOrText>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        value: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrText {
    Id(i32),
    Text(String),
}

impl TryFrom<RawSizeSelector> for SizeSelector {
    type Error = String;

    fn try_from(raw: RawSizeSelector) -> Result<Self, Self::Error> {
        match raw {
            RawSizeSelector::Id(id) => Ok(Self::Id(SizeId::new(id))),
            RawSizeSelector::Text(name) => Ok(Self::Name(name)),
            RawSizeSelector::Object { id, name, value } => match (id, name, value) {
                (Some(IdOrText::Id(id)), _, _) => Ok(Self::Id(SizeId::new(id))),
                (Some(IdOrText::Text(text)), _, _) => text
                    .parse::<SizeId>()
                    .map(Self::Id)
                    .map_err(|_| format!("invalid size id: {text}")),
                (None, Some(name), _) => Ok(Self::Name(name)),
                (None, None, Some(value)) => Ok(Self::Name(value)),
                (None, None, None) => Err("size object needs an id, name or value".to_owned()),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<SizeSelector, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_shapes() {
        assert_eq!(parse("4").unwrap(), SizeSelector::Id(SizeId::new(4)));
        assert_eq!(parse("\"XL\"").unwrap(), SizeSelector::Name("XL".into()));
        assert_eq!(parse(r#"{"id": 9}"#).unwrap(), SizeSelector::Id(SizeId::new(9)));
        assert_eq!(parse(r#"{"_id": "9"}"#).unwrap(), SizeSelector::Id(SizeId::new(9)));
        assert_eq!(
            parse(r#"{"name": "12 x 8 inch"}"#).unwrap(),
            SizeSelector::Name("12 x 8 inch".into())
        );
        assert_eq!(parse(r#"{"value": "12x8"}"#).unwrap(), SizeSelector::Name("12x8".into()));
    }

    #[test]
    fn test_bad_shapes() {
        assert!(parse("{}").is_err());
        assert!(parse(r#"{"id": "abc"}"#).is_err());
        assert!(parse("true").is_err());
    }

    #[test]
    fn test_matches() {
        let id = SizeId::new(3);
        assert!(SizeSelector::Id(id).matches(id, "Large", "L"));
        assert!(!SizeSelector::Id(SizeId::new(4)).matches(id, "Large", "L"));
        assert!(SizeSelector::Name("large".into()).matches(id, "Large", "L"));
        assert!(SizeSelector::Name("l".into()).matches(id, "Large", "L"));
        assert!(!SizeSelector::Name("M".into()).matches(id, "Large", "L"));
        assert!(!SizeSelector::Name(String::new()).matches(id, "Large", ""));
    }

    #[test]
    fn test_blank() {
        assert!(SizeSelector::Name("  ".into()).is_blank());
        assert!(!SizeSelector::Id(SizeId::new(1)).is_blank());
    }
}
