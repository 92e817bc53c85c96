//! Unit roster for faction-wide queries.
//!
//! The roster is the simulation's spatial-query collaborator: it answers
//! "which live units belong to faction F right now" with an ordered list
//! that stays stable for the duration of a tick. It is rebuilt at the start
//! of every tick, so everything read from it later in the tick (positions,
//! committed targets) reflects the state the tick began with. The target
//! legality count in the allocation algorithm depends on that read model.

use crate::components::*;
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Snapshot of one live unit, taken at tick start.
#[derive(Debug, Clone, Copy)]
pub struct RosterEntry {
    pub entity: Entity,
    pub id: UnitId,
    pub faction: Faction,
    pub pos: Position,
    /// Ranged units are excluded from ally-attacker counts.
    pub is_ranged: bool,
    /// The unit's target as committed at tick start.
    pub target: Option<UnitId>,
}

/// Per-faction registry of live units, rebuilt each tick.
///
/// Enumeration order is spawn order and is stable within a tick; the
/// nearest-scan tie-break ("first enumerated wins") leans on that.
#[derive(Resource, Debug, Default)]
pub struct UnitRoster {
    factions: HashMap<Faction, Vec<RosterEntry>>,
    by_id: HashMap<UnitId, (Faction, usize)>,
}

impl UnitRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all entries (call before rebuilding each tick).
    pub fn clear(&mut self) {
        self.factions.clear();
        self.by_id.clear();
    }

    /// Register a live unit.
    pub fn insert(&mut self, entry: RosterEntry) {
        let list = self.factions.entry(entry.faction).or_default();
        self.by_id.insert(entry.id, (entry.faction, list.len()));
        list.push(entry);
    }

    /// All live units of a faction, in enumeration order.
    pub fn units_with_faction(&self, faction: Faction) -> &[RosterEntry] {
        self.factions.get(&faction).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a live unit by id. `None` means the unit died or was removed,
    /// which is how stale target handles are detected.
    pub fn find(&self, id: UnitId) -> Option<&RosterEntry> {
        let (faction, index) = self.by_id.get(&id)?;
        self.factions.get(faction)?.get(*index)
    }

    /// Total live unit count.
    pub fn live_count(&self) -> usize {
        self.by_id.len()
    }
}

/// System that rebuilds the roster at the start of each tick.
///
/// Dead and dying units (life below one point) are left out, so nothing
/// later in the tick can acquire or keep them as targets.
pub fn roster_update_system(
    mut roster: ResMut<UnitRoster>,
    query: Query<(
        Entity,
        &UnitId,
        &Faction,
        &Position,
        &CombatStats,
        &CurrentTarget,
        &Life,
        &UnitState,
    )>,
) {
    roster.clear();

    for (entity, id, faction, pos, stats, target, life, state) in query.iter() {
        if *state == UnitState::Dead || !life.is_alive() {
            continue;
        }

        roster.insert(RosterEntry {
            entity,
            id: *id,
            faction: *faction,
            pos: *pos,
            is_ranged: stats.is_ranged,
            target: target.0,
        });
    }
}
