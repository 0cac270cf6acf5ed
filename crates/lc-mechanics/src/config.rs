//! Engine configuration: automation toggles and dice settings.
//!
//! A snapshot of these settings is handed to the resolver when it is built.
//! Nothing reads global state.

use serde::{Deserialize, Serialize};

/// Default recursion cap for exploding dice.
pub const DEFAULT_EXPLODE_CAP: u32 = 100;

/// Which parts of a resolution are automated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Check loading, compare attacks against defenses, and unload
    /// `Loading` weapons.
    pub attacks: bool,
    /// Apply overkill and self heat to the attacker.
    pub attack_self_heat: bool,
    /// Apply the overcharge roll to the mech's heat.
    pub overcharge_heat: bool,
    /// Warn when a writeback pushes heat past capacity. Off leaves the
    /// overheat check to the table.
    pub structure: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            attacks: true,
            attack_self_heat: true,
            overcharge_heat: true,
            structure: true,
        }
    }
}

impl AutomationSettings {
    /// Everything off: every attack is resolved manually.
    pub fn manual() -> Self {
        Self {
            attacks: false,
            attack_self_heat: false,
            overcharge_heat: false,
            structure: false,
        }
    }
}

/// Configuration for a [`crate::Resolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Automation toggles.
    pub automation: AutomationSettings,
    /// Seed for the local dice roller. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Maximum number of extra dice one exploding term may add.
    pub explode_cap: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            automation: AutomationSettings::default(),
            seed: None,
            explode_cap: DEFAULT_EXPLODE_CAP,
        }
    }
}

impl EngineConfig {
    /// Replace the automation settings.
    pub fn with_automation(mut self, automation: AutomationSettings) -> Self {
        self.automation = automation;
        self
    }

    /// Set the roller seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the exploding-dice recursion cap.
    pub fn with_explode_cap(mut self, cap: u32) -> Self {
        self.explode_cap = cap;
        self
    }
}
