//! Evaluated rolls and per-die results.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::roller::DieSource;
use super::{DiceSpec, Formula, Modifier, Op, Term};

/// The result of rolling a single die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieResult {
    /// Face rolled (1 to faces).
    pub value: u32,
    /// Counts toward the total.
    pub active: bool,
    /// Dropped by a keep modifier.
    pub discarded: bool,
    /// Triggered an explosion.
    pub exploded: bool,
}

impl DieResult {
    /// A fresh, active die.
    pub fn new(value: u32) -> Self {
        Self {
            value,
            active: true,
            discarded: false,
            exploded: false,
        }
    }
}

/// A dice term together with its rolled results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledDice {
    /// The term as written.
    pub spec: DiceSpec,
    /// Every die rolled for this term, including exploded and discarded dice.
    pub results: Vec<DieResult>,
}

impl RolledDice {
    /// Sum of active dice.
    pub fn total(&self) -> i64 {
        self.results
            .iter()
            .filter(|r| r.active)
            .map(|r| i64::from(r.value))
            .sum()
    }

    /// Number of dice that exploded.
    pub fn exploded_count(&self) -> usize {
        self.results.iter().filter(|r| r.exploded).count()
    }

    /// Roll `spec` and apply its modifiers in order.
    pub fn roll(spec: &DiceSpec, source: &mut dyn DieSource, explode_cap: u32) -> Self {
        let mut results: Vec<DieResult> = (0..spec.number)
            .map(|_| DieResult::new(source.roll(spec.faces)))
            .collect();
        for modifier in &spec.modifiers {
            match *modifier {
                Modifier::Explode(face) => {
                    explode(&mut results, spec.faces, face.unwrap_or(spec.faces), source, explode_cap)
                }
                // kh0 keeps every die
                Modifier::KeepHighest(0) => {}
                Modifier::KeepHighest(k) => keep_highest(&mut results, k as usize),
            }
        }
        Self {
            spec: spec.clone(),
            results,
        }
    }
}

fn explode(
    results: &mut Vec<DieResult>,
    faces: u32,
    on: u32,
    source: &mut dyn DieSource,
    cap: u32,
) {
    let mut added = 0;
    let mut i = 0;
    while i < results.len() {
        let r = results[i];
        if r.active && !r.exploded && r.value == on {
            if added >= cap {
                break;
            }
            results[i].exploded = true;
            results.push(DieResult::new(source.roll(faces)));
            added += 1;
        }
        i += 1;
    }
}

/// Discard the lowest active dice so at most `keep` remain active.
pub(crate) fn keep_highest(results: &mut [DieResult], keep: usize) {
    let mut active: Vec<usize> = (0..results.len()).filter(|&i| results[i].active).collect();
    active.sort_by_key(|&i| results[i].value);
    let drop = active.len().saturating_sub(keep);
    for &i in &active[..drop] {
        results[i].active = false;
        results[i].discarded = true;
    }
}

/// One term of an evaluated roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolledTerm {
    /// A rolled dice term.
    Dice(RolledDice),
    /// A flat number.
    Number(i64),
    /// An operator applying to the following term.
    Operator(Op),
}

impl fmt::Display for RolledTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dice(d) => write!(f, "{}", d.spec),
            Self::Number(n) => write!(f, "{n}"),
            Self::Operator(op) => write!(f, "{op}"),
        }
    }
}

/// The immutable result of evaluating a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedRoll {
    /// Canonical formula text.
    pub formula: String,
    /// Terms with their results.
    pub terms: Vec<RolledTerm>,
    /// Signed sum of active dice and flat numbers.
    pub total: i64,
}

impl EvaluatedRoll {
    /// Roll every dice term of `formula`.
    pub fn evaluate(formula: &Formula, source: &mut dyn DieSource, explode_cap: u32) -> Self {
        let terms = formula
            .terms
            .iter()
            .map(|t| match t {
                Term::Dice(spec) => RolledTerm::Dice(RolledDice::roll(spec, source, explode_cap)),
                Term::Number(n) => RolledTerm::Number(*n),
                Term::Operator(op) => RolledTerm::Operator(*op),
            })
            .collect();
        Self::from_terms(terms)
    }

    /// Build a roll from already-rolled terms, recomputing formula and total.
    pub fn from_terms(terms: Vec<RolledTerm>) -> Self {
        let formula = terms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let mut total: i64 = 0;
        let mut sign = 1;
        for term in &terms {
            match term {
                RolledTerm::Operator(op) => sign = op.sign(),
                RolledTerm::Number(n) => total = total.saturating_add(n.saturating_mul(sign)),
                RolledTerm::Dice(d) => total = total.saturating_add(d.total().saturating_mul(sign)),
            }
        }
        Self {
            formula,
            terms,
            total,
        }
    }

    /// The unrolled formula this roll was made from.
    pub fn to_formula(&self) -> Formula {
        let terms = self
            .terms
            .iter()
            .map(|t| match t {
                RolledTerm::Dice(d) => Term::Dice(d.spec.clone()),
                RolledTerm::Number(n) => Term::Number(*n),
                RolledTerm::Operator(op) => Term::Operator(*op),
            })
            .collect();
        Formula { terms }
    }

    /// Iterate over the rolled dice terms.
    pub fn dice(&self) -> impl Iterator<Item = &RolledDice> {
        self.terms.iter().filter_map(|t| match t {
            RolledTerm::Dice(d) => Some(d),
            _ => None,
        })
    }

    /// Number of dice that exploded across all terms.
    pub fn exploded_count(&self) -> usize {
        self.dice().map(RolledDice::exploded_count).sum()
    }

    /// Per-term breakdown, one line per dice term.
    ///
    /// Discarded dice are parenthesised and exploded dice carry a `!`:
    /// `3d6kh1: (2), 5!, 4 = 4`.
    pub fn tooltip(&self) -> String {
        self.dice()
            .map(|d| {
                let faces = d
                    .results
                    .iter()
                    .map(|r| {
                        let mark = if r.exploded { "!" } else { "" };
                        if r.active {
                            format!("{}{mark}", r.value)
                        } else {
                            format!("({}){mark}", r.value)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {faces} = {}", d.spec, d.total())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for EvaluatedRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.formula, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FixedDice;

    fn eval(text: &str, faces: &[u32]) -> EvaluatedRoll {
        let formula = Formula::parse(text).unwrap();
        let mut dice = FixedDice::new(faces.to_vec());
        EvaluatedRoll::evaluate(&formula, &mut dice, 100)
    }

    #[test]
    fn total_sums_dice_and_numbers() {
        let roll = eval("1d20 + 2 - 1d6", &[15, 4]);
        assert_eq!(roll.total, 13);
        assert_eq!(roll.formula, "1d20 + 2 - 1d6");
    }

    #[test]
    fn keep_highest_discards_lowest() {
        let roll = eval("3d6kh1", &[2, 5, 4]);
        assert_eq!(roll.total, 5);
        let d = roll.dice().next().unwrap();
        let active: Vec<_> = d.results.iter().map(|r| r.active).collect();
        assert_eq!(active, vec![false, true, false]);
        assert!(d.results[0].discarded);
    }

    #[test]
    fn keep_zero_keeps_everything() {
        let roll = eval("2d6kh0", &[2, 5]);
        assert_eq!(roll.total, 7);
        assert!(roll.dice().next().unwrap().results.iter().all(|r| r.active));
    }

    #[test]
    fn explode_appends_dice() {
        let roll = eval("2d6x", &[6, 3, 6, 2]);
        let d = roll.dice().next().unwrap();
        assert_eq!(d.results.len(), 4);
        assert_eq!(roll.exploded_count(), 2);
        assert_eq!(roll.total, 17);
    }

    #[test]
    fn explode_respects_cap() {
        let formula = Formula::parse("1d6x").unwrap();
        let mut dice = FixedDice::new(vec![6]);
        let roll = EvaluatedRoll::evaluate(&formula, &mut dice, 3);
        let d = roll.dice().next().unwrap();
        assert_eq!(d.results.len(), 4);
        assert_eq!(roll.exploded_count(), 3);
    }

    #[test]
    fn overkill_keeps_original_count() {
        let formula = Formula::parse("2d6").unwrap().with_overkill();
        let mut dice = FixedDice::new(vec![6, 2, 1]);
        let roll = EvaluatedRoll::evaluate(&formula, &mut dice, 100);
        let d = roll.dice().next().unwrap();
        assert_eq!(d.results.len(), 3);
        assert_eq!(roll.exploded_count(), 1);
        assert_eq!(roll.total, 8);
    }

    #[test]
    fn from_terms_recomputes_total() {
        let roll = eval("1d6 + 3", &[4]);
        let again = EvaluatedRoll::from_terms(roll.terms.clone());
        assert_eq!(again, roll);
        assert_eq!(roll.to_formula().to_string(), "1d6 + 3");
    }

    #[test]
    fn tooltip_marks_discarded_and_exploded() {
        let roll = eval("1d20 + 3d6xkh1", &[12, 2, 6, 4, 1]);
        insta::assert_snapshot!(roll.tooltip(), @r"
        1d20: 12 = 12
        3d6xkh1: (2), 6!, (4), (1) = 6
        ");
    }
}
