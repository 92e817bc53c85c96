//! ECS Systems for the Skirmish Sim battle simulation.
//!
//! Systems contain the game logic that operates on components. One tick runs
//! them in a fixed chain; the order carries the state-machine semantics:
//!
//! 1. `roster_update_system` - rebuilds the live-unit roster (committed state)
//! 2. `health_bar_system` - reveals health bars on first damage
//! 3. `death_system` - health check, corpse event, deferred removal mark
//! 4. `target_acquisition_system` - stale-target clearing + target allocation
//! 5. `behavior_system` - wander / pursue / attack state machine
//! 6. `movement_system` - executes pending movement requests
//! 7. `combat_system` - applies continuous chip damage in range
//! 8. `removal_system` - despawns units one tick after death

pub mod behavior;
pub mod combat;
pub mod lifecycle;
pub mod movement;
pub mod targeting;

pub use behavior::*;
pub use combat::*;
pub use lifecycle::*;
pub use movement::*;
pub use targeting::*;

use bevy_ecs::prelude::*;

/// Policy for the per-unit ally-attacker cap between acquisition attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapPolicy {
    /// The cap persists for the unit's lifetime and only ever increases:
    /// fairness loosens as combat drags on and is never restored once
    /// congestion clears.
    Persistent,
    /// The cap is re-tightened to 1 before every acquisition attempt, so
    /// load-balancing pressure resets once congestion clears.
    ResetPerTick,
}

/// Configuration for simulation behavior tuning.
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    /// Fixed timestep in seconds (e.g., 1/30 = 0.0333 for 30 Hz).
    pub fixed_timestep: f32,
    /// Upper bound on relax-and-retry rounds in the allocation search.
    pub allocation_round_cap: u32,
    /// Stopping distance clamp applied while a unit wanders untargeted.
    pub wander_stop_distance: f32,
    /// Radius around a wander destination that counts as "arrived".
    pub wander_arrive_radius: f32,
    /// Ally-attacker cap policy.
    pub cap_policy: CapPolicy,
    /// Seed for the wander-destination RNG.
    pub rng_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 30.0, // 30 Hz
            allocation_round_cap: 300,
            wander_stop_distance: 2.0,
            wander_arrive_radius: 3.0,
            cap_policy: CapPolicy::Persistent,
            rng_seed: 0,
        }
    }
}

/// Global simulation tick counter. Increments each fixed update; the
/// removal system compares against it for deferred destruction.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}
