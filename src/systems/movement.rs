//! Movement driver - executes pending destination requests.
//!
//! The core treats movement as fire-and-forget: behavior writes a
//! destination and stopping distance into [`NavAgent`] and this driver walks
//! the unit toward it. A host engine with real navigation can replace this
//! system wholesale; everything upstream only touches the request fields.

use crate::components::*;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// System that advances units toward their requested destinations.
///
/// Units stop once inside their stopping distance and never overshoot it.
/// Dead and halted units do not move.
pub fn movement_system(
    dt: Res<DeltaTime>,
    mut query: Query<(&mut Position, &NavAgent, &UnitState)>,
) {
    let delta = dt.0;
    for (mut pos, nav, state) in query.iter_mut() {
        if *state == UnitState::Dead || nav.stopped {
            continue;
        }
        let Some(dest) = nav.destination else {
            continue;
        };

        let dist = pos.distance_to(&dest);
        if dist <= nav.stopping_distance {
            continue;
        }

        // Walk up to the stopping boundary, no further.
        let travel = (nav.speed * delta).min(dist - nav.stopping_distance);
        let t = travel / dist;
        pos.x += (dest.x - pos.x) * t;
        pos.y += (dest.y - pos.y) * t;
        pos.z += (dest.z - pos.z) * t;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_advances_toward_destination() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0));

        let mut nav = NavAgent::new(5.0, 1.0);
        nav.destination = Some(Position::new(10.0, 0.0, 0.0));
        nav.stopped = false;

        let entity = world
            .spawn((Position::new(0.0, 0.0, 0.0), nav, UnitState::Pursuing))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        schedule.run(&mut world);

        let pos = world.get::<Position>(entity).unwrap();
        assert!((pos.x - 5.0).abs() < 0.001);
        assert_eq!(pos.z, 0.0);
    }

    #[test]
    fn test_movement_stops_at_stopping_distance() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(10.0));

        let mut nav = NavAgent::new(5.0, 2.0);
        nav.destination = Some(Position::new(10.0, 0.0, 0.0));
        nav.stopped = false;

        let entity = world
            .spawn((Position::new(0.0, 0.0, 0.0), nav, UnitState::Pursuing))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        schedule.run(&mut world);

        let pos = world.get::<Position>(entity).unwrap();
        assert!((pos.x - 8.0).abs() < 0.001); // halted at the 2.0 boundary
    }

    #[test]
    fn test_dead_units_do_not_move() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0));

        let mut nav = NavAgent::new(5.0, 1.0);
        nav.destination = Some(Position::new(10.0, 0.0, 0.0));
        nav.stopped = false;

        let entity = world
            .spawn((Position::new(0.0, 0.0, 0.0), nav, UnitState::Dead))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        schedule.run(&mut world);

        let pos = world.get::<Position>(entity).unwrap();
        assert_eq!(pos.x, 0.0);
    }
}
