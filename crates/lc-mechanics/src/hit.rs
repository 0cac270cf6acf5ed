//! Hit and crit classification.

use futures_util::future::try_join_all;
use lc_core::ActorId;
use serde::{Deserialize, Serialize};

use crate::accdiff::TargetRef;
use crate::attack::AttackRolls;
use crate::dice::{DiceRoller, EvaluatedRoll};
use crate::error::MechResult;

/// Attack totals at or above this are critical hits.
pub const CRIT_THRESHOLD: i64 = 20;

/// Compares an attack total against a target's defense.
pub trait DefenseCheck: Send + Sync {
    /// Returns true if `total` hits `target`.
    fn is_hit(&self, smart: bool, total: i64, target: &TargetRef) -> bool;
}

/// Hit iff the total meets Evasion, or E-Defense for smart attacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDefense;

impl DefenseCheck for StandardDefense {
    fn is_hit(&self, smart: bool, total: i64, target: &TargetRef) -> bool {
        let defense = if smart { target.e_defense } else { target.evasion };
        total >= i64::from(defense)
    }
}

/// The defense an attack is compared against, for display.
pub fn defense_label(smart: bool) -> &'static str {
    if smart { "E-DEF" } else { "EVASION" }
}

/// An evaluated attack roll with its tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackResult {
    /// The roll.
    pub roll: EvaluatedRoll,
    /// Per-die breakdown.
    pub tooltip: String,
}

impl AttackResult {
    fn new(roll: EvaluatedRoll) -> Self {
        Self {
            tooltip: roll.tooltip(),
            roll,
        }
    }
}

/// The outcome against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResult {
    /// Target display name.
    pub target_name: String,
    /// Target image.
    pub target_img: Option<String>,
    /// Attack total, zero-padded to two digits.
    pub total: String,
    /// Whether the attack hit.
    pub hit: bool,
    /// Whether the attack total was a critical.
    pub crit: bool,
}

/// Evaluated attacks and, when automated, per-target hits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Evaluated attack rolls, one per target or a single untargeted roll.
    pub attacks: Vec<AttackResult>,
    /// Hit results in target order. Empty when resolved manually.
    pub hits: Vec<HitResult>,
    /// Targets whose Lock On was spent.
    pub spent_lock_ons: Vec<ActorId>,
}

impl Classification {
    /// At least one attack landed without being a crit.
    ///
    /// Without hit results, any attack below the crit threshold counts.
    pub fn has_normal_hit(&self) -> bool {
        if self.hits.is_empty() {
            self.attacks.iter().any(|a| a.roll.total < CRIT_THRESHOLD)
        } else {
            self.hits.iter().any(|h| h.hit && !h.crit)
        }
    }

    /// At least one attack was a crit.
    pub fn has_crit_hit(&self) -> bool {
        if self.hits.is_empty() {
            self.attacks.iter().any(|a| a.roll.total >= CRIT_THRESHOLD)
        } else {
            self.hits.iter().any(|h| h.crit)
        }
    }
}

/// Evaluate attack rolls and classify them.
///
/// When `automate` is off or there are no targets, only the untargeted roll
/// is evaluated and the hit list is empty. Otherwise every targeted roll is
/// evaluated concurrently; output order matches target order.
pub async fn classify(
    rolls: &AttackRolls,
    smart: bool,
    automate: bool,
    dice: &dyn DiceRoller,
    defense: &dyn DefenseCheck,
) -> MechResult<Classification> {
    if !automate || rolls.targeted.is_empty() {
        let roll = dice.roll(&rolls.roll).await?;
        return Ok(Classification {
            attacks: vec![AttackResult::new(roll)],
            ..Classification::default()
        });
    }

    let evaluated = try_join_all(rolls.targeted.iter().map(|t| async move {
        let roll = dice.roll(&t.roll).await?;
        MechResult::Ok((t, roll))
    }))
    .await?;

    let mut out = Classification::default();
    for (t, roll) in evaluated {
        let total = roll.total;
        out.hits.push(HitResult {
            target_name: t.target.name.clone(),
            target_img: t.target.img.clone(),
            total: format!("{total:02}"),
            hit: defense.is_hit(smart, total, &t.target),
            crit: total >= CRIT_THRESHOLD,
        });
        out.spent_lock_ons.extend(t.used_lock_on);
        out.attacks.push(AttackResult::new(roll));
    }
    tracing::debug!(
        hits = out.hits.iter().filter(|h| h.hit).count(),
        crits = out.hits.iter().filter(|h| h.crit).count(),
        "classified attack"
    );
    Ok(out)
}
