use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// The type of a damage instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Kinetic damage.
    Kinetic,
    /// Energy damage.
    Energy,
    /// Explosive damage.
    Explosive,
    /// Heat dealt to the target.
    Heat,
    /// Burn, applied at end of turn.
    Burn,
    /// Variable: chosen when the weapon is fired.
    Variable,
    /// Untyped bonus damage.
    Bonus,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kinetic => write!(f, "Kinetic"),
            Self::Energy => write!(f, "Energy"),
            Self::Explosive => write!(f, "Explosive"),
            Self::Heat => write!(f, "Heat"),
            Self::Burn => write!(f, "Burn"),
            Self::Variable => write!(f, "Variable"),
            Self::Bonus => write!(f, "Bonus"),
        }
    }
}

/// One declared damage instance of a weapon, e.g. `1d6+2` Kinetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Damage {
    /// Dice formula or flat number. Empty or `0` means no damage.
    #[serde(rename = "val", deserialize_with = "string_or_number")]
    pub value: String,
    /// Damage type. `None` for a malformed declaration.
    #[serde(rename = "type", default)]
    pub damage_type: Option<DamageType>,
}

impl Damage {
    /// A typed damage instance.
    pub fn new(value: impl Into<String>, damage_type: DamageType) -> Self {
        Self {
            value: value.into(),
            damage_type: Some(damage_type),
        }
    }

    /// Returns true if this instance deals no damage at all.
    pub fn is_empty(&self) -> bool {
        let v = self.value.trim();
        v.is_empty() || v == "0"
    }

    /// Returns true if the instance has a value but no type.
    pub fn is_untyped(&self) -> bool {
        self.damage_type.is_none() && !self.is_empty()
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Integer(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_zero_values() {
        assert!(Damage::new("", DamageType::Kinetic).is_empty());
        assert!(Damage::new("0", DamageType::Kinetic).is_empty());
        assert!(!Damage::new("1d6", DamageType::Kinetic).is_empty());
    }

    #[test]
    fn untyped_requires_a_value() {
        let untyped = Damage {
            value: "2".to_string(),
            damage_type: None,
        };
        assert!(untyped.is_untyped());
        let empty = Damage {
            value: "0".to_string(),
            damage_type: None,
        };
        assert!(!empty.is_untyped());
    }

    #[test]
    fn deserialize_number_value() {
        let d: Damage = serde_json::from_str(r#"{"val":3,"type":"energy"}"#).unwrap();
        assert_eq!(d.value, "3");
        assert_eq!(d.damage_type, Some(DamageType::Energy));
        let d: Damage = serde_json::from_str(r#"{"val":"1d6+1"}"#).unwrap();
        assert!(d.is_untyped());
    }
}
