//! Roll modifier plugins and the modifier chain.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

/// Rewrites an attack formula before it is rolled.
pub trait RollModifier {
    /// Stable identifier, unique within one collection.
    fn id(&self) -> &str;
    /// Higher precedence runs first.
    fn roll_precedence(&self) -> i32;
    /// Return the rewritten formula.
    fn modify_roll(&self, formula: &str) -> String;
}

/// How a [`Plugin`] rewrites a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Append a flat bonus (`+ n`) or penalty (`- n`).
    AddFlat {
        /// Signed amount.
        amount: i64,
    },
    /// Append a raw term, e.g. `+ 1d6`.
    Append {
        /// Text appended after a single space.
        term: String,
    },
    /// Replace the first occurrence of `from` with `to`.
    Replace {
        /// Text to look for.
        from: String,
        /// Replacement text.
        to: String,
    },
}

/// A serializable roll modifier, carried inside AccDiff payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    /// Identifier.
    pub id: String,
    /// Application order; higher runs first.
    pub roll_precedence: i32,
    /// The rewrite.
    pub transform: Transform,
}

impl Plugin {
    /// A plugin with the given id, precedence, and transform.
    pub fn new(id: impl Into<String>, roll_precedence: i32, transform: Transform) -> Self {
        Self {
            id: id.into(),
            roll_precedence,
            transform,
        }
    }
}

impl RollModifier for Plugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn roll_precedence(&self) -> i32 {
        self.roll_precedence
    }

    fn modify_roll(&self, formula: &str) -> String {
        match &self.transform {
            Transform::AddFlat { amount } if *amount < 0 => {
                format!("{formula} - {}", amount.unsigned_abs())
            }
            Transform::AddFlat { amount } => format!("{formula} + {amount}"),
            Transform::Append { term } => format!("{formula} {term}"),
            Transform::Replace { from, to } => formula.replacen(from.as_str(), to, 1),
        }
    }
}

/// Apply `plugins` to `base`, highest precedence first.
///
/// Plugins with equal precedence keep their input order.
pub fn compose<'a, I>(base: &str, plugins: I) -> String
where
    I: IntoIterator<Item = &'a dyn RollModifier>,
{
    let mut sorted: Vec<&dyn RollModifier> = plugins.into_iter().collect();
    sorted.sort_by_key(|p| Reverse(p.roll_precedence()));
    sorted
        .into_iter()
        .fold(base.to_string(), |acc, p| p.modify_roll(&acc))
}
