//! Public API for the simulation.
//!
//! This module provides the main interface for a host engine (or any other
//! client) to drive the battle simulation.
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 30 Hz). When
//! `step(dt)` is called, the simulation accumulates time and runs fixed
//! updates as needed. This ensures deterministic behavior regardless of
//! frame rate.

use crate::components::*;
use crate::ground::{Extents, GroundHandle, GroundProbe, WanderArea};
use crate::presentation::PresentationQueue;
use crate::spatial::{roster_update_system, UnitRoster};
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;

/// Flat description of a unit to spawn.
#[derive(Debug, Clone, Copy)]
pub struct UnitSpec {
    pub id: u32,
    pub faction: Faction,
    /// Faction this unit hunts. Usually the opposing one.
    pub attack_faction: Faction,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub life: f32,
    pub damage_per_second: f32,
    pub speed: f32,
    /// Engagement range; the unit attacks from this distance.
    pub stopping_distance: f32,
    pub is_ranged: bool,
    /// Request spread target allocation. Ranged units and the Red horde
    /// always use the simple nearest-enemy picker regardless.
    pub spread: bool,
}

impl UnitSpec {
    /// A standard melee fighter.
    pub fn melee(id: u32, faction: Faction, x: f32, y: f32, z: f32) -> Self {
        Self {
            id,
            faction,
            attack_faction: faction.opposing(),
            x,
            y,
            z,
            life: 100.0,
            damage_per_second: 10.0,
            speed: 3.5,
            stopping_distance: 1.5,
            is_ranged: false,
            spread: true,
        }
    }

    /// A ranged fighter attacking from a distance.
    pub fn ranged(id: u32, faction: Faction, x: f32, y: f32, z: f32) -> Self {
        Self {
            id,
            faction,
            attack_faction: faction.opposing(),
            x,
            y,
            z,
            life: 70.0,
            damage_per_second: 8.0,
            speed: 3.0,
            stopping_distance: 12.0,
            is_ranged: true,
            spread: true,
        }
    }
}

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Initializing the simulation and spawning units
/// - Stepping the simulation forward
/// - Extracting state snapshots
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
}

impl SimWorld {
    /// Create a new empty simulation world.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a new simulation world with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(SimTick(0));
        world.insert_resource(UnitRoster::new());
        world.insert_resource(PresentationQueue::default());
        world.insert_resource(WanderRng::seeded(config.rng_seed));
        world.insert_resource(config);

        // One tick runs the full chain in order; targeting and combat read
        // the roster committed at the top of the tick.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                roster_update_system,
                health_bar_system,
                death_system,
                target_acquisition_system,
                behavior_system,
                movement_system,
                combat_system,
                removal_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
        }
    }

    /// Create a test world with two opposing melee lines and flat ground.
    pub fn new_default_test_world() -> Self {
        use crate::ground::FlatGround;

        let mut sim = Self::new();
        sim.set_wander_area(Position::new(0.0, 5.0, 0.0), Extents::new(120.0, 10.0, 120.0));
        sim.set_ground(FlatGround::new(0.0));

        for i in 0..6 {
            let z = -12.5 + (i as f32) * 5.0;
            sim.spawn_unit(UnitSpec::melee(i, Faction::Blue, -25.0, 0.0, z));
        }
        for i in 0..6 {
            let z = -12.5 + (i as f32) * 5.0;
            sim.spawn_unit(UnitSpec::melee(100 + i, Faction::Red, 25.0, 0.0, z));
        }

        sim
    }

    /// Spawn a unit from a spec. Returns its entity handle.
    pub fn spawn_unit(&mut self, spec: UnitSpec) -> Entity {
        let spread = spec.spread && !spec.is_ranged && spec.faction != Faction::Red;

        self.world
            .spawn(UnitBundle {
                id: UnitId(spec.id),
                faction: spec.faction,
                attack_faction: AttackFaction(spec.attack_faction),
                position: Position::new(spec.x, spec.y, spec.z),
                life: Life::new(spec.life),
                stats: CombatStats {
                    damage_per_second: spec.damage_per_second,
                    is_ranged: spec.is_ranged,
                },
                allocation: Allocation::new(spread),
                nav: NavAgent::new(spec.speed, spec.stopping_distance),
                ..Default::default()
            })
            .id()
    }

    /// Spawn a line of melee units along the z axis.
    /// Returns the number of units spawned.
    pub fn spawn_battle_line(
        &mut self,
        faction: Faction,
        x: f32,
        center_z: f32,
        count: usize,
        spacing: f32,
        start_id: u32,
    ) -> usize {
        for i in 0..count {
            let z = center_z + (i as f32 - count as f32 / 2.0) * spacing;
            self.spawn_unit(UnitSpec::melee(start_id + i as u32, faction, x, 0.0, z));
        }
        count
    }

    /// Install the wander area for idle units.
    pub fn set_wander_area(&mut self, center: Position, extents: Extents) {
        self.world.insert_resource(WanderArea::new(center, extents));
    }

    /// Install the ground probe used to validate wander destinations.
    pub fn set_ground(&mut self, probe: impl GroundProbe + 'static) {
        self.world.insert_resource(GroundHandle::new(probe));
    }

    /// Step the simulation forward by `dt` seconds.
    ///
    /// Uses fixed timestep internally - accumulates time and runs fixed
    /// updates as needed. This ensures deterministic behavior regardless of
    /// frame rate.
    pub fn step(&mut self, dt: f32) {
        let fixed_dt = self
            .world
            .get_resource::<SimConfig>()
            .map(|c| c.fixed_timestep)
            .unwrap_or(1.0 / 30.0);

        self.time_accumulator += dt;
        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
        }
    }

    /// Run a single fixed timestep update.
    fn fixed_update(&mut self, dt: f32) {
        if let Some(mut dt_res) = self.world.get_resource_mut::<DeltaTime>() {
            dt_res.0 = dt;
        }
        if let Some(mut tick_res) = self.world.get_resource_mut::<SimTick>() {
            tick_res.increment();
        }

        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += dt;
    }

    /// Get a snapshot of the current simulation state, draining pending
    /// presentation events into it.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Total units still spawned, dying ones included.
    pub fn unit_count(&mut self) -> usize {
        let mut query = self.world.query::<&UnitId>();
        query.iter(&self.world).count()
    }

    /// Units with at least one full life point.
    pub fn live_count(&mut self) -> usize {
        let mut query = self.world.query::<&Life>();
        query.iter(&self.world).filter(|l| l.is_alive()).count()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
