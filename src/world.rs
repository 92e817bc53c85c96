//! Snapshot types for the presentation boundary.
//!
//! The `Snapshot` struct provides a serializable view of the simulation
//! state plus the presentation events accumulated since the last snapshot.
//! Hosts poll it after each batch of fixed updates and render from it.

use crate::components::*;
use crate::presentation::{PresentationEvent, PresentationQueue};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single unit's state for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: u32,
    pub faction: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub life: f32,
    pub life_max: f32,
    pub state: String,
    pub target: Option<u32>,
    pub ally_cap: u32,
    pub health_bar: bool,
}

/// Complete simulation state snapshot for the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// All unit states, dying units included until their removal tick.
    pub units: Vec<UnitSnapshot>,
    /// Presentation events accumulated since the previous snapshot.
    pub events: Vec<PresentationEvent>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world, draining the presentation
    /// queue in the process.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let mut units = Vec::new();

        let mut query = world.query::<(
            &UnitId,
            &Faction,
            &Position,
            &Facing,
            &Life,
            &UnitState,
            &CurrentTarget,
            &Allocation,
            &HealthBar,
        )>();

        for (id, faction, pos, facing, life, state, target, alloc, bar) in query.iter(world) {
            let faction_str = match faction {
                Faction::Blue => "Blue",
                Faction::Red => "Red",
            };
            let state_str = match state {
                UnitState::Wandering => "Wandering",
                UnitState::Pursuing => "Pursuing",
                UnitState::Attacking => "Attacking",
                UnitState::Dead => "Dead",
            };

            units.push(UnitSnapshot {
                id: id.0,
                faction: faction_str.to_string(),
                x: pos.x,
                y: pos.y,
                z: pos.z,
                yaw: facing.yaw,
                life: life.current,
                life_max: life.max,
                state: state_str.to_string(),
                target: target.0.map(|t| t.0),
                ally_cap: alloc.ally_cap,
                health_bar: bar.visible,
            });
        }

        let events = match world.get_resource_mut::<PresentationQueue>() {
            Some(mut queue) => queue.drain(),
            None => Vec::new(),
        };

        Self {
            tick,
            time,
            units,
            events,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
