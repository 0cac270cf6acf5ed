//! Replayable macro descriptors.
//!
//! A [`MacroDescriptor`] names an engine entry point and its arguments. It is
//! stored on cards as an opaque token (base64 of the percent-encoded JSON)
//! and on hotbar slots as a [`StoredMacro`]. Only the functions listed in
//! [`MacroFn`] can ever be invoked from a descriptor.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MechError, MechResult};

/// Characters escaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The entry points a descriptor may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroFn {
    /// Use an item action by index.
    Activation,
    /// Reroll a weapon or basic attack.
    EncodedAttack,
    /// Roll a tech attack.
    Tech,
    /// Roll a stat check.
    Stat,
    /// Use an item.
    Item,
    /// Activate a mech's core power.
    CoreActive,
    /// Roll a structure secondary check.
    StructureSecondaryRoll,
}

impl MacroFn {
    /// Every allow-listed entry point.
    pub const ALL: [Self; 7] = [
        Self::Activation,
        Self::EncodedAttack,
        Self::Tech,
        Self::Stat,
        Self::Item,
        Self::CoreActive,
        Self::StructureSecondaryRoll,
    ];

    /// The wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "prepareActivationMacro",
            Self::EncodedAttack => "prepareEncodedAttackMacro",
            Self::Tech => "prepareTechMacro",
            Self::Stat => "prepareStatMacro",
            Self::Item => "prepareItemMacro",
            Self::CoreActive => "prepareCoreActiveMacro",
            Self::StructureSecondaryRoll => "prepareStructureSecondaryRollMacro",
        }
    }

    /// Look up an allow-listed entry point by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for MacroFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A call to an engine entry point, serializable as a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDescriptor {
    /// Display title.
    pub title: String,
    /// Entry point name. Checked against [`MacroFn`] before any call.
    #[serde(rename = "fn")]
    pub function: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Hotbar icon.
    #[serde(rename = "iconPath", default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
}

impl MacroDescriptor {
    /// A descriptor for an allow-listed entry point.
    pub fn new(title: impl Into<String>, function: MacroFn, args: Vec<Value>) -> Self {
        Self {
            title: title.into(),
            function: function.as_str().to_string(),
            args,
            icon_path: None,
        }
    }

    /// Set the hotbar icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon_path = Some(icon.into());
        self
    }

    /// The allow-listed entry point, or [`MechError::Rejected`].
    pub fn entry_point(&self) -> MechResult<MacroFn> {
        MacroFn::from_name(&self.function).ok_or_else(|| MechError::Rejected(self.function.clone()))
    }

    /// Decode argument `index`. Missing trailing arguments read as `null`.
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> MechResult<T> {
        let value = self.args.get(index).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| MechError::Arguments {
            function: self.function.clone(),
            message: format!("argument {index}: {e}"),
        })
    }

    /// Encode as a token.
    pub fn encode(&self) -> MechResult<String> {
        let json = serde_json::to_string(self).map_err(|e| MechError::Codec(e.to_string()))?;
        let escaped = utf8_percent_encode(&json, URI_COMPONENT).to_string();
        Ok(STANDARD.encode(escaped))
    }

    /// Decode a token produced by [`MacroDescriptor::encode`].
    ///
    /// Decoding does not check the allow-list.
    pub fn decode(token: &str) -> MechResult<Self> {
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|e| MechError::Codec(format!("bad base64: {e}")))?;
        let escaped =
            String::from_utf8(bytes).map_err(|e| MechError::Codec(format!("bad utf-8: {e}")))?;
        let json = percent_decode_str(&escaped)
            .decode_utf8()
            .map_err(|e| MechError::Codec(format!("bad escape: {e}")))?;
        serde_json::from_str(&json).map_err(|e| MechError::Codec(format!("bad json: {e}")))
    }
}

/// A macro saved to a hotbar slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMacro {
    /// Slot label.
    pub name: String,
    /// Encoded descriptor token.
    pub command: String,
    /// Icon.
    pub img: Option<String>,
}

impl StoredMacro {
    /// Check `descriptor` against the allow-list and store it.
    pub fn from_descriptor(descriptor: &MacroDescriptor) -> MechResult<Self> {
        descriptor.entry_point()?;
        Ok(Self {
            name: descriptor.title.clone(),
            command: descriptor.encode()?,
            img: descriptor.icon_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allow_list_names() {
        for f in MacroFn::ALL {
            assert_eq!(MacroFn::from_name(f.as_str()), Some(f));
        }
        assert_eq!(MacroFn::from_name("prepareOverchargeMacro"), None);
        assert_eq!(MacroFn::from_name("eval"), None);
    }

    #[test]
    fn token_matches_uri_component_encoding() {
        let d = MacroDescriptor::new("A b", MacroFn::Stat, vec![json!("x")]);
        let token = d.encode().unwrap();
        let escaped = String::from_utf8(STANDARD.decode(&token).unwrap()).unwrap();
        assert_eq!(
            escaped,
            "%7B%22title%22%3A%22A%20b%22%2C%22fn%22%3A%22prepareStatMacro%22%2C%22args%22%3A%5B%22x%22%5D%7D"
        );
        assert_eq!(MacroDescriptor::decode(&token).unwrap(), d);
    }

    #[test]
    fn decode_errors() {
        assert!(matches!(MacroDescriptor::decode("@@@"), Err(MechError::Codec(_))));
        let not_json = STANDARD.encode("hello");
        assert!(matches!(MacroDescriptor::decode(&not_json), Err(MechError::Codec(_))));
    }

    #[test]
    fn unknown_function_is_rejected() {
        let d = MacroDescriptor {
            title: "x".into(),
            function: "deleteEverything".into(),
            args: vec![],
            icon_path: None,
        };
        let token = d.encode().unwrap();
        let back = MacroDescriptor::decode(&token).unwrap();
        assert!(matches!(back.entry_point(), Err(MechError::Rejected(name)) if name == "deleteEverything"));
        assert!(StoredMacro::from_descriptor(&back).is_err());
    }

    #[test]
    fn args_decode_with_missing_as_null() {
        let d = MacroDescriptor::new("t", MacroFn::Activation, vec![json!("a"), json!(2)]);
        assert_eq!(d.arg::<String>(0).unwrap(), "a");
        assert_eq!(d.arg::<usize>(1).unwrap(), 2);
        assert_eq!(d.arg::<Option<bool>>(3).unwrap(), None);
        assert!(matches!(d.arg::<usize>(0), Err(MechError::Arguments { .. })));
    }

    #[test]
    fn stored_macro_carries_token_and_icon() {
        let d = MacroDescriptor::new("Skirmish", MacroFn::Item, vec![json!("a"), json!("i")])
            .with_icon("icons/item.svg");
        let stored = StoredMacro::from_descriptor(&d).unwrap();
        assert_eq!(stored.name, "Skirmish");
        assert_eq!(stored.img.as_deref(), Some("icons/item.svg"));
        assert_eq!(MacroDescriptor::decode(&stored.command).unwrap(), d);
    }

    proptest::proptest! {
        #[test]
        fn encode_decode_round_trip(
            title in ".*",
            text in proptest::collection::vec(".*", 0..4),
            numbers in proptest::collection::vec(-1000i64..1000, 0..4),
            flag in proptest::bool::ANY,
        ) {
            let mut args: Vec<Value> = text.into_iter().map(Value::from).collect();
            args.extend(numbers.into_iter().map(Value::from));
            args.push(Value::from(flag));
            args.push(Value::Null);
            let d = MacroDescriptor::new(title, MacroFn::EncodedAttack, args);
            let token = d.encode().unwrap();
            proptest::prop_assert_eq!(MacroDescriptor::decode(&token).unwrap(), d);
        }
    }
}
