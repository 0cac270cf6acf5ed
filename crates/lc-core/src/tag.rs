use std::fmt;

use serde::{Deserialize, Serialize};

/// Smart weapons are resolved against E-Defense instead of Evasion.
pub const SMART: &str = "tg_smart";
/// Overkill: damage dice explode, and each explosion costs one heat.
pub const OVERKILL: &str = "tg_overkill";
/// Heat (Self): the attacker takes the tag's value in heat.
pub const HEAT_SELF: &str = "tg_heat_self";
/// Loading: the weapon must be reloaded after attacking.
pub const LOADING: &str = "tg_loading";
/// Accurate: +1 accuracy on attacks.
pub const ACCURATE: &str = "tg_accurate";
/// Inaccurate: +1 difficulty on attacks.
pub const INACCURATE: &str = "tg_inaccurate";
/// Seeking: ignores cover.
pub const SEEKING: &str = "tg_seeking";
/// Recharge N+: an NPC feature is recharged on a 1d6 roll of N or more.
pub const RECHARGE: &str = "tg_recharge";

/// The value carried by a tag, either a number or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    /// A numeric value.
    Integer(i64),
    /// A text value (may itself start with a number, e.g. `"2"` or `"1d3"`).
    Text(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A tag attached to a weapon, system, or feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInstance {
    /// The tag's library id, e.g. `tg_smart`.
    pub lid: String,
    /// Optional value, e.g. 2 for Heat 2 (Self).
    #[serde(default)]
    pub value: Option<TagValue>,
}

impl TagInstance {
    /// A tag with no value.
    pub fn new(lid: impl Into<String>) -> Self {
        Self {
            lid: lid.into(),
            value: None,
        }
    }

    /// A tag with a numeric value.
    pub fn with_value(lid: impl Into<String>, value: i64) -> Self {
        Self {
            lid: lid.into(),
            value: Some(TagValue::Integer(value)),
        }
    }

    /// The leading integer of the value, or 0 if there is none.
    ///
    /// Text values are read up to the first non-digit, so `"3+"` reads as 3.
    pub fn int_value(&self) -> i64 {
        match &self.value {
            Some(TagValue::Integer(n)) => *n,
            Some(TagValue::Text(s)) => leading_int(s).unwrap_or(0),
            None => 0,
        }
    }
}

/// Parse the integer at the start of `s`, like JavaScript's `parseInt`.
///
/// `"3+"` reads as 3 and `"1d6"` as 1; text without a leading number is `None`.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// The first tag with the given id.
pub fn find<'a>(tags: &'a [TagInstance], lid: &str) -> Option<&'a TagInstance> {
    tags.iter().find(|t| t.lid == lid)
}

/// Returns true if any tag has the given id.
pub fn has(tags: &[TagInstance], lid: &str) -> bool {
    find(tags, lid).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_value_from_integer_and_text() {
        assert_eq!(TagInstance::with_value(HEAT_SELF, 2).int_value(), 2);
        let text = TagInstance {
            lid: RECHARGE.to_string(),
            value: Some(TagValue::Text("5+".to_string())),
        };
        assert_eq!(text.int_value(), 5);
        assert_eq!(TagInstance::new(SMART).int_value(), 0);
    }

    #[test]
    fn int_value_of_non_numeric_text_is_zero() {
        let text = TagInstance {
            lid: HEAT_SELF.to_string(),
            value: Some(TagValue::Text("X".to_string())),
        };
        assert_eq!(text.int_value(), 0);
    }

    #[test]
    fn find_returns_first_match() {
        let tags = vec![
            TagInstance::with_value(HEAT_SELF, 2),
            TagInstance::with_value(HEAT_SELF, 4),
        ];
        assert_eq!(find(&tags, HEAT_SELF).map(TagInstance::int_value), Some(2));
        assert!(has(&tags, HEAT_SELF));
        assert!(!has(&tags, SMART));
    }

    #[test]
    fn deserialize_untagged_values() {
        let tags: Vec<TagInstance> = serde_json::from_str(
            r#"[{"lid":"tg_heat_self","value":3},{"lid":"tg_recharge","value":"4+"},{"lid":"tg_smart"}]"#,
        )
        .unwrap();
        assert_eq!(tags[0].value, Some(TagValue::Integer(3)));
        assert_eq!(tags[1].int_value(), 4);
        assert!(tags[2].value.is_none());
    }
}
