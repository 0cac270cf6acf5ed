//! Heat from overkill and `Heat (Self)`.

use lc_core::{Actor, TagInstance, Writeback, tag};

/// The `Heat (Self)` value of the first matching tag, or 0.
///
/// Only the first tag is read, even if a weapon lists the tag twice.
pub fn self_heat(tags: &[TagInstance]) -> i32 {
    tag::find(tags, tag::HEAT_SELF)
        .map(|t| i32::try_from(t.int_value()).unwrap_or(0))
        .unwrap_or(0)
}

/// Record overkill and self heat on the attacker's writeback.
///
/// Returns the heat recorded. Nothing is recorded when `automate` is off or
/// the actor does not track heat.
pub fn apply(
    actor: &Actor,
    overkill_heat: u32,
    self_heat: i32,
    automate: bool,
    writeback: &mut Writeback,
) -> i32 {
    if !automate || !actor.tracks_heat() {
        return 0;
    }
    let heat = i32::try_from(overkill_heat)
        .unwrap_or(i32::MAX)
        .saturating_add(self_heat);
    if heat != 0 {
        tracing::debug!(actor = %actor.name, heat, "recording attack heat");
        writeback.add_heat(heat);
    }
    heat
}
