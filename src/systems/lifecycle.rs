//! Unit lifecycle: health-bar reveal, death, deferred removal.
//!
//! Death is split across two ticks. The tick a unit's life falls below one
//! point it enters the terminal `Dead` state, stops, and a corpse event is
//! emitted; the entity itself survives until the following tick so every
//! other system observes the terminal state once before the despawn.

use crate::components::*;
use crate::presentation::{PresentationEvent, PresentationQueue};
use crate::systems::SimTick;
use bevy_ecs::prelude::*;
use tracing::debug;

/// System revealing a unit's health bar the first time it takes damage.
/// Bars are never hidden again; a scarred unit stays scarred.
pub fn health_bar_system(
    mut queue: ResMut<PresentationQueue>,
    mut query: Query<(&UnitId, &Life, &mut HealthBar)>,
) {
    for (id, life, mut bar) in query.iter_mut() {
        if life.current < life.max && !bar.visible {
            bar.visible = true;
            queue.push(PresentationEvent::HealthBar {
                unit: *id,
                visible: true,
            });
        }
    }
}

/// System moving dying units into the terminal state.
///
/// Emits the corpse event at the unit's final pose and schedules the entity
/// for removal on the next tick.
pub fn death_system(
    mut commands: Commands,
    tick: Res<SimTick>,
    mut queue: ResMut<PresentationQueue>,
    mut query: Query<
        (
            Entity,
            &UnitId,
            &Position,
            &Facing,
            &Life,
            &mut UnitState,
            &mut CurrentTarget,
            &mut NavAgent,
        ),
        Without<PendingRemoval>,
    >,
) {
    for (entity, id, pos, facing, life, mut state, mut target, mut nav) in query.iter_mut() {
        if *state == UnitState::Dead || life.is_alive() {
            continue;
        }

        *state = UnitState::Dead;
        target.0 = None;
        nav.destination = None;
        nav.stopped = true;

        queue.push(PresentationEvent::SpawnCorpse {
            unit: *id,
            x: pos.x,
            y: pos.y,
            z: pos.z,
            yaw: facing.yaw,
        });
        commands.entity(entity).insert(PendingRemoval {
            at_tick: tick.0 + 1,
        });

        debug!(unit = id.0, tick = tick.0, "unit died");
    }
}

/// System despawning units whose removal tick has arrived.
pub fn removal_system(
    mut commands: Commands,
    tick: Res<SimTick>,
    mut queue: ResMut<PresentationQueue>,
    query: Query<(Entity, &UnitId, &PendingRemoval)>,
) {
    for (entity, id, pending) in query.iter() {
        if tick.0 >= pending.at_tick {
            queue.push(PresentationEvent::RemoveUnit { unit: *id });
            commands.entity(entity).despawn();
        }
    }
}
