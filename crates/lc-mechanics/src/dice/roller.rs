//! Randomness sources and the async dice-roller port.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{EvaluatedRoll, Formula};
use crate::config::DEFAULT_EXPLODE_CAP;
use crate::error::MechResult;

/// Produces raw die faces.
pub trait DieSource: Send {
    /// Roll one die with the given number of faces (result in 1..=faces).
    fn roll(&mut self, faces: u32) -> u32;
}

/// Seedable random faces.
#[derive(Debug, Clone)]
pub struct SeededDice(StdRng);

impl SeededDice {
    /// Deterministic faces from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Faces seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl DieSource for SeededDice {
    fn roll(&mut self, faces: u32) -> u32 {
        self.0.random_range(1..=faces.max(1))
    }
}

/// Predetermined faces for tests and replays.
///
/// Faces are handed out in order and the sequence repeats once exhausted.
/// Each face is clamped into the die's range.
#[derive(Debug, Clone, Default)]
pub struct FixedDice {
    faces: VecDeque<u32>,
}

impl FixedDice {
    /// A source that yields `faces` in order, cycling.
    pub fn new(faces: impl Into<VecDeque<u32>>) -> Self {
        Self {
            faces: faces.into(),
        }
    }
}

impl DieSource for FixedDice {
    fn roll(&mut self, faces: u32) -> u32 {
        match self.faces.pop_front() {
            Some(face) => {
                self.faces.push_back(face);
                face.clamp(1, faces.max(1))
            }
            None => 1,
        }
    }
}

/// Evaluates dice formulas.
///
/// Modeled as async because a host roller may animate dice or roll over
/// the network.
#[async_trait]
pub trait DiceRoller: Send + Sync {
    /// Evaluate a parsed formula.
    async fn evaluate(&self, formula: &Formula) -> MechResult<EvaluatedRoll>;

    /// Parse and evaluate formula text.
    async fn roll(&self, text: &str) -> MechResult<EvaluatedRoll> {
        let formula = Formula::parse(text)?;
        self.evaluate(&formula).await
    }
}

/// In-process roller over any [`DieSource`].
#[derive(Debug)]
pub struct LocalRoller<S: DieSource> {
    source: Mutex<S>,
    explode_cap: u32,
}

impl<S: DieSource> LocalRoller<S> {
    /// Wrap a source with the default explosion cap.
    pub fn new(source: S) -> Self {
        Self {
            source: Mutex::new(source),
            explode_cap: DEFAULT_EXPLODE_CAP,
        }
    }

    /// Set the explosion cap.
    pub fn with_explode_cap(mut self, cap: u32) -> Self {
        self.explode_cap = cap;
        self
    }
}

impl LocalRoller<SeededDice> {
    /// A roller seeded from `seed`, or from the OS when `None`.
    pub fn seeded(seed: Option<u64>) -> Self {
        Self::new(seed.map_or_else(SeededDice::from_entropy, SeededDice::from_seed))
    }
}

#[async_trait]
impl<S: DieSource> DiceRoller for LocalRoller<S> {
    async fn evaluate(&self, formula: &Formula) -> MechResult<EvaluatedRoll> {
        let mut source = self.source.lock().unwrap_or_else(|e| e.into_inner());
        Ok(EvaluatedRoll::evaluate(formula, &mut *source, self.explode_cap))
    }
}
