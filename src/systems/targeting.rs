//! Target allocation - decides which enemy each unit may engage.
//!
//! Two modes per unit:
//!
//! - **Simple**: nearest live enemy, full stop.
//! - **Spread**: nearest enemy that fewer than `ally_cap` non-ranged allies
//!   are already targeting. Allies are never asked directly; the count is
//!   read from the roster's committed targets, so many units converge on a
//!   fair attacker distribution without any central coordination.
//!
//! The spread search is a bounded relax-and-retry loop: when every enemy is
//! saturated at the current cap, the unit raises its own cap by one and
//! rescans, up to `allocation_round_cap` rounds. The cap persists across the
//! unit's lifetime under the default policy, so fairness only ever loosens.

use crate::components::*;
use crate::spatial::{RosterEntry, UnitRoster};
use crate::systems::{CapPolicy, SimConfig};
use bevy_ecs::prelude::*;
use tracing::warn;

/// Nearest entry by strictly-less distance comparison; the first-enumerated
/// entry wins ties.
fn nearest_entry<'a>(pos: &Position, candidates: &[&'a RosterEntry]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, c) in candidates.iter().enumerate() {
        let dist = pos.distance_to(&c.pos);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Legality test: may one more unit attack `candidate`?
///
/// Counts live, non-ranged allies whose committed target is the candidate;
/// legal while that count is strictly below the querying unit's cap.
pub fn can_attack(candidate: UnitId, cap: u32, allies: &[RosterEntry]) -> bool {
    let attackers = allies
        .iter()
        .filter(|ally| !ally.is_ranged && ally.target == Some(candidate))
        .count() as u32;
    attackers < cap
}

/// Pick a target for one unit, or `None` if no legal enemy exists.
///
/// `enemies` and `allies` are the live rosters of the hunted and own
/// factions. In spread mode the unit's `ally_cap` may be raised as a side
/// effect; exhausting `round_cap` rounds is reported and yields `None`, and
/// the unit simply retries next tick with its already-raised cap.
pub fn select_target(
    unit: UnitId,
    pos: &Position,
    alloc: &mut Allocation,
    enemies: &[RosterEntry],
    allies: &[RosterEntry],
    round_cap: u32,
) -> Option<UnitId> {
    if enemies.is_empty() {
        return None;
    }

    if !alloc.spread {
        let candidates: Vec<&RosterEntry> = enemies.iter().collect();
        return nearest_entry(pos, &candidates).map(|i| candidates[i].id);
    }

    let mut rounds = 0;
    while rounds < round_cap {
        let mut candidates: Vec<&RosterEntry> = enemies.iter().collect();

        while let Some(index) = nearest_entry(pos, &candidates) {
            let candidate = candidates[index];
            if can_attack(candidate.id, alloc.ally_cap, allies) {
                return Some(candidate.id);
            }
            // Too many allies on it already; drop it and rescan the rest.
            candidates.remove(index);
        }

        // Every enemy is saturated at the current cap: allow one more ally
        // per enemy and start over with the full candidate set.
        alloc.raise_cap();
        rounds += 1;
    }

    warn!(
        unit = unit.0,
        rounds = round_cap,
        "target allocation search exhausted"
    );
    None
}

/// System that clears stale targets and acquires new ones.
///
/// A target missing from the roster (died or removed) is cleared; the unit
/// re-enters acquisition on the following tick rather than faulting on the
/// stale handle. Untargeted units run the allocation search when at least
/// one live enemy exists.
pub fn target_acquisition_system(
    config: Res<SimConfig>,
    roster: Res<UnitRoster>,
    mut query: Query<(
        &UnitId,
        &Faction,
        &AttackFaction,
        &Position,
        &UnitState,
        &mut Allocation,
        &mut CurrentTarget,
    )>,
) {
    for (id, faction, attack_faction, pos, state, mut alloc, mut target) in query.iter_mut() {
        if *state == UnitState::Dead {
            continue;
        }

        if let Some(target_id) = target.0 {
            if roster.find(target_id).is_none() {
                target.0 = None;
            }
            continue;
        }

        let enemies = roster.units_with_faction(attack_faction.0);
        if enemies.is_empty() {
            continue;
        }

        if config.cap_policy == CapPolicy::ResetPerTick {
            alloc.reset_cap();
        }

        let allies = roster.units_with_faction(*faction);
        target.0 = select_target(
            *id,
            pos,
            &mut alloc,
            enemies,
            allies,
            config.allocation_round_cap,
        );
    }
}
