//! Critical hit damage.
//!
//! A crit rolls the damage formula a second time and keeps the best dice
//! from both rolls. The original dice are kept in the result so the tooltip
//! shows every die that was rolled.

use crate::dice::roll::keep_highest;
use crate::dice::{DiceRoller, DieResult, EvaluatedRoll, Modifier, RolledDice, RolledTerm};
use crate::error::MechResult;

/// Roll `normal` again and combine both rolls into the crit roll.
pub async fn double(normal: &EvaluatedRoll, dice: &dyn DiceRoller) -> MechResult<EvaluatedRoll> {
    let fresh = dice.evaluate(&normal.to_formula()).await?;
    Ok(merge_crit(normal, &fresh))
}

/// Combine a normal roll with a fresh roll of the same formula.
///
/// For each dice term the two result sets are pooled and only the highest
/// `K` active dice stay active, where `K` is the term's keep-highest count
/// or, without one (or with `kh0`), its die count. The term is rewritten as twice the dice
/// keeping `K`. Flat numbers and operators pass through.
pub fn merge_crit(normal: &EvaluatedRoll, fresh: &EvaluatedRoll) -> EvaluatedRoll {
    let terms = normal
        .terms
        .iter()
        .enumerate()
        .map(|(i, term)| match term {
            RolledTerm::Dice(d) => {
                let extra: &[DieResult] = match fresh.terms.get(i) {
                    Some(RolledTerm::Dice(f)) => f.results.as_slice(),
                    _ => &[],
                };
                RolledTerm::Dice(double_term(d, extra))
            }
            other => other.clone(),
        })
        .collect();
    EvaluatedRoll::from_terms(terms)
}

fn double_term(normal: &RolledDice, extra: &[DieResult]) -> RolledDice {
    let keep = match normal.spec.keep_highest() {
        Some(k) if k > 0 => k,
        _ => normal.spec.number,
    };

    let mut results = normal.results.clone();
    results.extend_from_slice(extra);
    keep_highest(&mut results, keep as usize);

    let mut spec = normal.spec.clone();
    spec.number = spec.number.saturating_mul(2);
    spec.modifiers.retain(|m| !matches!(m, Modifier::KeepHighest(0)));
    if spec.keep_highest().is_none() {
        spec.modifiers.push(Modifier::KeepHighest(keep));
    }
    RolledDice { spec, results }
}
