//! Dice formulas, evaluation, and rollers.
//!
//! The supported notation is the small subset attack and damage rolls
//! need: `NdF` dice terms with `kh[K]` (keep highest) and `x[N]` (explode)
//! modifiers, integer literals, and `+`/`-` between terms. Formulas render
//! back in a canonical spaced form, so `1d20+2` displays as `1d20 + 2`.

/// Tokenizer for dice formulas.
pub mod lexer;
pub mod roll;
pub mod roller;

pub use roll::{DieResult, EvaluatedRoll, RolledDice, RolledTerm};
pub use roller::{DiceRoller, DieSource, FixedDice, LocalRoller, SeededDice};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};
use lexer::Token;

/// Most dice a single term may roll before modifiers.
pub const MAX_DICE: u32 = 1000;

/// Arithmetic operator between terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Addition.
    Plus,
    /// Subtraction.
    Minus,
}

impl Op {
    /// `1` or `-1`.
    pub fn sign(self) -> i64 {
        match self {
            Self::Plus => 1,
            Self::Minus => -1,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
        }
    }
}

/// A dice modifier, applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    /// Keep only the highest K active dice. `kh0` keeps every die.
    KeepHighest(u32),
    /// Roll an extra die for every die showing the given face (`None` = the
    /// maximum face). Extra dice may explode again.
    Explode(Option<u32>),
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepHighest(k) => write!(f, "kh{k}"),
            Self::Explode(None) => write!(f, "x"),
            Self::Explode(Some(n)) => write!(f, "x{n}"),
        }
    }
}

/// An unrolled dice term such as `3d6kh1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSpec {
    /// How many dice to roll.
    pub number: u32,
    /// Faces per die.
    pub faces: u32,
    /// Modifiers in declaration order.
    pub modifiers: Vec<Modifier>,
}

impl DiceSpec {
    /// Plain `NdF` with no modifiers.
    pub fn new(number: u32, faces: u32) -> Self {
        Self {
            number,
            faces,
            modifiers: Vec::new(),
        }
    }

    /// The first keep-highest count, if any.
    pub fn keep_highest(&self) -> Option<u32> {
        self.modifiers.iter().find_map(|m| match m {
            Modifier::KeepHighest(k) => Some(*k),
            Modifier::Explode(_) => None,
        })
    }

    fn parse(text: &str) -> Result<Self, String> {
        let (number, rest) = text
            .split_once('d')
            .ok_or_else(|| format!("not a dice term: {text}"))?;
        let number = if number.is_empty() {
            1
        } else {
            number
                .parse::<u32>()
                .map_err(|_| format!("bad die count in {text}"))?
        };
        if number > MAX_DICE {
            return Err(format!("too many dice in {text} (at most {MAX_DICE})"));
        }

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let faces = rest[..digits_end]
            .parse::<u32>()
            .map_err(|_| format!("bad face count in {text}"))?;
        if faces == 0 {
            return Err(format!("dice need at least one face: {text}"));
        }

        let mut modifiers = Vec::new();
        let mut mods = &rest[digits_end..];
        while !mods.is_empty() {
            let (kind, tail) = if let Some(tail) = mods.strip_prefix("kh") {
                ("kh", tail)
            } else if let Some(tail) = mods.strip_prefix('x') {
                ("x", tail)
            } else {
                return Err(format!("unknown modifier in {text}"));
            };
            let n_end = tail
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(tail.len());
            let arg = if n_end == 0 {
                None
            } else {
                Some(
                    tail[..n_end]
                        .parse::<u32>()
                        .map_err(|_| format!("bad modifier value in {text}"))?,
                )
            };
            modifiers.push(match kind {
                "kh" => Modifier::KeepHighest(arg.unwrap_or(1)),
                _ => Modifier::Explode(arg),
            });
            mods = &tail[n_end..];
        }

        Ok(Self {
            number,
            faces,
            modifiers,
        })
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.number, self.faces)?;
        for m in &self.modifiers {
            write!(f, "{m}")?;
        }
        Ok(())
    }
}

/// One term of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// A dice term.
    Dice(DiceSpec),
    /// A flat number (may be negative, e.g. `1d20 + -1`).
    Number(i64),
    /// An operator applying to the following term.
    Operator(Op),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dice(d) => write!(f, "{d}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Operator(op) => write!(f, "{op}"),
        }
    }
}

/// A parsed dice formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    /// Terms in order, alternating operand and operator.
    pub terms: Vec<Term>,
}

impl Formula {
    /// Parse a formula such as `1d20 + 2 - 2d6kh1`.
    pub fn parse(source: &str) -> MechResult<Self> {
        let (tokens, errors) = lexer::lex(source);
        if let Some(err) = errors.first() {
            return Err(MechError::formula(source, err.message.clone()));
        }
        if tokens.is_empty() {
            return Err(MechError::formula(source, "empty formula"));
        }

        let mut terms = Vec::new();
        let mut expect_operand = true;
        let mut negate = false;
        for (token, _) in tokens {
            match (expect_operand, token) {
                (true, Token::Integer(n)) => {
                    terms.push(Term::Number(if negate { -n } else { n }));
                    negate = false;
                    expect_operand = false;
                }
                (true, Token::Dice(text)) => {
                    if negate {
                        return Err(MechError::formula(source, "cannot negate a dice term"));
                    }
                    let spec = DiceSpec::parse(&text).map_err(|m| MechError::formula(source, m))?;
                    terms.push(Term::Dice(spec));
                    expect_operand = false;
                }
                (true, Token::Minus) if !negate => negate = true,
                (true, Token::Plus) if terms.is_empty() && !negate => {}
                (false, Token::Plus) => {
                    terms.push(Term::Operator(Op::Plus));
                    expect_operand = true;
                }
                (false, Token::Minus) => {
                    terms.push(Term::Operator(Op::Minus));
                    expect_operand = true;
                }
                (_, token) => {
                    return Err(MechError::formula(source, format!("unexpected `{token}`")));
                }
            }
        }
        if expect_operand {
            return Err(MechError::formula(source, "formula ends with an operator"));
        }
        Ok(Self { terms })
    }

    /// Iterate over the dice terms.
    pub fn dice(&self) -> impl Iterator<Item = &DiceSpec> {
        self.terms.iter().filter_map(|t| match t {
            Term::Dice(d) => Some(d),
            _ => None,
        })
    }

    /// A copy in which every dice term explodes and keeps its original count:
    /// `2d6` becomes `2d6xkh2`.
    pub fn with_overkill(&self) -> Self {
        let terms = self
            .terms
            .iter()
            .map(|t| match t {
                Term::Dice(d) => {
                    let mut modifiers = vec![Modifier::Explode(None), Modifier::KeepHighest(d.number)];
                    modifiers.extend(d.modifiers.iter().copied());
                    Term::Dice(DiceSpec {
                        number: d.number,
                        faces: d.faces,
                        modifiers,
                    })
                }
                other => other.clone(),
            })
            .collect();
        Self { terms }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Formula {
    type Err = MechError;

    fn from_str(s: &str) -> MechResult<Self> {
        Self::parse(s)
    }
}
