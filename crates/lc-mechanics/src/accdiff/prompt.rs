//! The accuracy/difficulty prompt port and its in-process implementations.

use async_trait::async_trait;

use super::{AccDiffData, Cover};
use crate::error::{MechError, MechResult};

/// Which dialog is being opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A weapon, basic, or tech attack against targets.
    Attack,
    /// A stat check (hull, agility, systems, engineering).
    Hase,
}

/// The user-facing accuracy/difficulty dialog.
///
/// Implementations return [`MechError::Cancelled`] when the user dismisses
/// the dialog. Nothing has been rolled or written when that happens.
#[async_trait]
pub trait AccDiffPrompt: Send + Sync {
    /// Show the dialog pre-filled with `initial` and return the confirmed data.
    async fn open(&self, kind: PromptKind, initial: AccDiffData) -> MechResult<AccDiffData>;

    /// Ask a yes/no question.
    async fn confirm(&self, title: &str, question: &str) -> MechResult<bool>;
}

/// Confirms every dialog unchanged and answers yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptPrompt;

#[async_trait]
impl AccDiffPrompt for AcceptPrompt {
    async fn open(&self, _kind: PromptKind, initial: AccDiffData) -> MechResult<AccDiffData> {
        Ok(initial)
    }

    async fn confirm(&self, _title: &str, _question: &str) -> MechResult<bool> {
        Ok(true)
    }
}

/// Dismisses every dialog and answers no.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelPrompt;

#[async_trait]
impl AccDiffPrompt for CancelPrompt {
    async fn open(&self, _kind: PromptKind, _initial: AccDiffData) -> MechResult<AccDiffData> {
        Err(MechError::Cancelled)
    }

    async fn confirm(&self, _title: &str, _question: &str) -> MechResult<bool> {
        Ok(false)
    }
}

/// Applies fixed adjustments, as if the user had typed them in.
#[derive(Debug, Clone, Default)]
pub struct PresetPrompt {
    /// Added to base accuracy.
    pub accuracy: i32,
    /// Added to base difficulty.
    pub difficulty: i32,
    /// Cover applied to the base roll and every target, if set.
    pub cover: Option<Cover>,
    /// Overrides whether Lock On is spent, if set.
    pub consume_lock_on: Option<bool>,
    /// Answer to yes/no questions.
    pub confirm: bool,
}

impl PresetPrompt {
    /// A prompt adding the given accuracy and difficulty.
    pub fn new(accuracy: i32, difficulty: i32) -> Self {
        Self {
            accuracy,
            difficulty,
            confirm: true,
            ..Self::default()
        }
    }

    /// Apply cover everywhere.
    pub fn with_cover(mut self, cover: Cover) -> Self {
        self.cover = Some(cover);
        self
    }

    /// Force Lock On consumption on or off.
    pub fn with_consume_lock_on(mut self, consume: bool) -> Self {
        self.consume_lock_on = Some(consume);
        self
    }

    /// Set the answer to yes/no questions.
    pub fn with_confirm(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }
}

#[async_trait]
impl AccDiffPrompt for PresetPrompt {
    async fn open(&self, _kind: PromptKind, mut data: AccDiffData) -> MechResult<AccDiffData> {
        data.base.accuracy = data.base.accuracy.saturating_add(self.accuracy);
        data.base.difficulty = data.base.difficulty.saturating_add(self.difficulty);
        if let Some(cover) = self.cover {
            data.base.cover = cover;
        }
        for target in &mut data.targets {
            if let Some(cover) = self.cover {
                target.cover = cover;
            }
            if let Some(consume) = self.consume_lock_on {
                target.consume_lock_on = consume;
            }
        }
        Ok(data)
    }

    async fn confirm(&self, _title: &str, _question: &str) -> MechResult<bool> {
        Ok(self.confirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accdiff::TargetRef;
    use lc_core::Actor;

    fn data() -> AccDiffData {
        let mut target = Actor::mech("Target");
        target.statuses.lock_on = true;
        AccDiffData::from_params("Test", &[], vec![TargetRef::from_actor(&target)], None)
    }

    #[tokio::test]
    async fn accept_returns_initial() {
        let initial = data();
        let out = AcceptPrompt.open(PromptKind::Attack, initial.clone()).await.unwrap();
        assert_eq!(out, initial);
        assert!(AcceptPrompt.confirm("Core", "Use it?").await.unwrap());
    }

    #[tokio::test]
    async fn cancel_dismisses() {
        let err = CancelPrompt.open(PromptKind::Hase, data()).await.unwrap_err();
        assert!(matches!(err, MechError::Cancelled));
        assert!(!CancelPrompt.confirm("Core", "Use it?").await.unwrap());
    }

    #[tokio::test]
    async fn preset_applies_adjustments() {
        let prompt = PresetPrompt::new(2, 1)
            .with_cover(Cover::Soft)
            .with_consume_lock_on(false);
        let out = prompt.open(PromptKind::Attack, data()).await.unwrap();
        assert_eq!(out.base.accuracy, 2);
        assert_eq!(out.base.difficulty, 1);
        assert_eq!(out.base.cover, Cover::Soft);
        assert_eq!(out.targets[0].cover, Cover::Soft);
        assert_eq!(out.targets[0].using_lock_on(), None);
        assert!(prompt.confirm("Core", "Use it?").await.unwrap());
    }
}
