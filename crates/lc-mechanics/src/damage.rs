//! Damage rolls, crit damage, and overkill heat.

use futures_util::future::try_join_all;
use lc_core::{Damage, DamageType};
use serde::{Deserialize, Serialize};

use crate::crit;
use crate::dice::{DiceRoller, EvaluatedRoll, Formula};
use crate::error::MechResult;
use crate::hit::Classification;

/// One evaluated damage roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    /// The roll.
    pub roll: EvaluatedRoll,
    /// Per-die breakdown.
    pub tooltip: String,
    /// Declared damage type; `None` for untyped declarations.
    pub damage_type: Option<DamageType>,
    /// Whether this is the crit version of the roll.
    pub is_crit: bool,
}

impl DamageResult {
    fn new(roll: EvaluatedRoll, damage_type: Option<DamageType>, is_crit: bool) -> Self {
        Self {
            tooltip: roll.tooltip(),
            roll,
            damage_type,
            is_crit,
        }
    }
}

/// Which damage sets an attack earned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitFlags {
    /// At least one non-crit hit.
    pub has_normal_hit: bool,
    /// At least one crit.
    pub has_crit_hit: bool,
}

impl From<&Classification> for HitFlags {
    fn from(c: &Classification) -> Self {
        Self {
            has_normal_hit: c.has_normal_hit(),
            has_crit_hit: c.has_crit_hit(),
        }
    }
}

/// Normal and crit damage plus overkill heat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// One result per non-empty declaration. Also rolled when only crits
    /// landed, since crit rolls are built from these.
    pub normal: Vec<DamageResult>,
    /// Crit versions of `normal`, in the same order.
    pub crit: Vec<DamageResult>,
    /// Exploded dice in the crit set if any crit landed, else in the normal
    /// set. Zero without overkill.
    pub overkill_heat: u32,
}

/// Roll damage for every non-empty declaration.
///
/// Nothing is rolled unless `flags` records at least one hit. With
/// `overkill`, every dice term explodes and keeps its original count.
pub async fn aggregate(
    damages: &[Damage],
    overkill: bool,
    flags: HitFlags,
    dice: &dyn DiceRoller,
) -> MechResult<DamageOutcome> {
    let mut out = DamageOutcome::default();
    if !flags.has_normal_hit && !flags.has_crit_hit {
        return Ok(out);
    }

    for damage in damages.iter().filter(|d| !d.is_empty()) {
        let mut formula = Formula::parse(&damage.value)?;
        if overkill {
            formula = formula.with_overkill();
        }
        let roll = dice.evaluate(&formula).await?;
        out.normal.push(DamageResult::new(roll, damage.damage_type, false));
    }

    if flags.has_crit_hit {
        out.crit = try_join_all(out.normal.iter().map(|normal| async move {
            let roll = crit::double(&normal.roll, dice).await?;
            MechResult::Ok(DamageResult::new(roll, normal.damage_type, true))
        }))
        .await?;
    }

    if overkill {
        let counted = if flags.has_crit_hit { &out.crit } else { &out.normal };
        let exploded: usize = counted.iter().map(|r| r.roll.exploded_count()).sum();
        out.overkill_heat = u32::try_from(exploded).unwrap_or(u32::MAX);
    }

    tracing::debug!(
        normal = out.normal.len(),
        crit = out.crit.len(),
        overkill_heat = out.overkill_heat,
        "aggregated damage"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{FixedDice, LocalRoller};

    const BOTH: HitFlags = HitFlags {
        has_normal_hit: true,
        has_crit_hit: true,
    };
    const NORMAL: HitFlags = HitFlags {
        has_normal_hit: true,
        has_crit_hit: false,
    };
    const CRIT: HitFlags = HitFlags {
        has_normal_hit: false,
        has_crit_hit: true,
    };

    fn roller(faces: &[u32]) -> LocalRoller<FixedDice> {
        LocalRoller::new(FixedDice::new(faces.to_vec()))
    }

    #[tokio::test]
    async fn no_hit_means_no_damage() {
        let damages = vec![Damage::new("2d6", DamageType::Kinetic)];
        let out = aggregate(&damages, true, HitFlags::default(), &roller(&[6]))
            .await
            .unwrap();
        assert!(out.normal.is_empty());
        assert!(out.crit.is_empty());
        assert_eq!(out.overkill_heat, 0);
    }

    #[tokio::test]
    async fn skips_empty_declarations() {
        let damages = vec![
            Damage::new("", DamageType::Kinetic),
            Damage::new("0", DamageType::Energy),
            Damage::new("1d6 + 2", DamageType::Explosive),
        ];
        let out = aggregate(&damages, false, NORMAL, &roller(&[4])).await.unwrap();
        assert_eq!(out.normal.len(), 1);
        assert_eq!(out.normal[0].roll.total, 6);
        assert_eq!(out.normal[0].damage_type, Some(DamageType::Explosive));
        assert!(out.crit.is_empty());
    }

    #[tokio::test]
    async fn crits_follow_declaration_order() {
        let damages = vec![
            Damage::new("1d6", DamageType::Kinetic),
            Damage::new("1d3", DamageType::Heat),
        ];
        let out = aggregate(&damages, false, BOTH, &roller(&[2, 1, 5, 3]))
            .await
            .unwrap();
        assert_eq!(out.crit.len(), 2);
        assert_eq!(out.crit[0].damage_type, Some(DamageType::Kinetic));
        assert_eq!(out.crit[1].damage_type, Some(DamageType::Heat));
        assert!(out.crit.iter().all(|r| r.is_crit));
        assert_eq!(out.crit[0].roll.formula, "2d6kh1");
    }

    #[tokio::test]
    async fn overkill_heat_counts_crit_set_only() {
        let damages = vec![Damage::new("2d6", DamageType::Kinetic)];
        // normal: 6!, 1 -> 2 ; crit fresh: 3, 4
        let out = aggregate(&damages, true, CRIT, &roller(&[6, 1, 2, 3, 4]))
            .await
            .unwrap();
        assert_eq!(out.normal[0].roll.exploded_count(), 1);
        let crit = &out.crit[0];
        assert_eq!(crit.roll.formula, "4d6xkh2");
        assert_eq!(crit.roll.dice().next().unwrap().spec.number, 4);
        assert_eq!(out.overkill_heat, crit.roll.exploded_count() as u32);
        assert_eq!(out.overkill_heat, 1);
    }

    #[tokio::test]
    async fn overkill_heat_from_normal_set_without_crit() {
        let damages = vec![Damage::new("1d6", DamageType::Kinetic)];
        let out = aggregate(&damages, true, NORMAL, &roller(&[6, 6, 2]))
            .await
            .unwrap();
        assert_eq!(out.overkill_heat, 2);
    }

    #[tokio::test]
    async fn bad_damage_formula_is_an_error() {
        let damages = vec![Damage::new("2d", DamageType::Kinetic)];
        assert!(aggregate(&damages, false, NORMAL, &roller(&[1])).await.is_err());
    }
}
