//! Attack roll formulas.
//!
//! Building never rolls anything. It turns a base bonus and the confirmed
//! [`AccDiffData`] into one untargeted formula and one formula per target.

use lc_core::ActorId;
use serde::{Deserialize, Serialize};

use crate::accdiff::{AccDiffData, Plugin, RollModifier, TargetRef, compose};

/// `1d20 + bonus`, followed by the accuracy (`+`) or difficulty (`-`) die.
///
/// A net of one uses a single `1d6`; larger nets roll `Nd6kh1`.
pub fn roll_str(bonus: i32, total: i32) -> String {
    let modifier = match total.unsigned_abs() {
        0 => String::new(),
        1 => format!(" {} 1d6", sign(total)),
        n => format!(" {} {n}d6kh1", sign(total)),
    };
    format!("1d20 + {bonus}{modifier}")
}

fn sign(total: i32) -> char {
    if total > 0 { '+' } else { '-' }
}

/// The formula for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetedRoll {
    /// The target.
    pub target: TargetRef,
    /// Formula text.
    pub roll: String,
    /// The actor whose Lock On is spent by this roll.
    pub used_lock_on: Option<ActorId>,
}

/// Formulas for one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRolls {
    /// The untargeted formula.
    pub roll: String,
    /// One formula per target, in targeting order.
    pub targeted: Vec<TargetedRoll>,
}

/// Build the attack formulas.
///
/// The untargeted roll uses weapon and base plugins. Each targeted roll uses
/// weapon plugins and that target's own plugins only.
pub fn build(bonus: i32, accdiff: &AccDiffData) -> AttackRolls {
    let weapon = || accdiff.weapon.plugins.values().map(as_modifier);

    let roll = compose(
        &roll_str(bonus, accdiff.base_total()),
        weapon().chain(accdiff.base.plugins.values().map(as_modifier)),
    );
    tracing::debug!(%roll, "built untargeted attack roll");

    let targeted = accdiff
        .targets
        .iter()
        .map(|t| {
            let roll = compose(
                &roll_str(bonus, accdiff.target_total(t)),
                weapon().chain(t.plugins.values().map(as_modifier)),
            );
            tracing::debug!(target = %t.target.name, %roll, "built targeted attack roll");
            TargetedRoll {
                target: t.target.clone(),
                roll,
                used_lock_on: t.using_lock_on(),
            }
        })
        .collect();

    AttackRolls { roll, targeted }
}

fn as_modifier(plugin: &Plugin) -> &dyn RollModifier {
    plugin
}
