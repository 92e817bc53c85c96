//! Unit behavior state machine.
//!
//! Runs after target acquisition each tick. Units with a live target pursue
//! it and attack once inside stopping distance; untargeted units fall back
//! to wandering inside the [`WanderArea`]. Animation and audio transitions
//! are pushed to the presentation queue only on state changes, so the host
//! can restart clips on receipt.

use crate::components::*;
use crate::ground::{GroundHandle, WanderArea};
use crate::presentation::{ClipKind, PresentationEvent, PresentationQueue};
use crate::spatial::UnitRoster;
use crate::systems::SimConfig;
use bevy_ecs::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Deterministic RNG for wander destination sampling.
#[derive(Resource)]
pub struct WanderRng(pub StdRng);

impl WanderRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

fn sample_axis(rng: &mut StdRng, center: f32, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(center - half..center + half)
    } else {
        center
    }
}

/// Sample a horizontal point inside the area, then probe straight down from
/// the area's top plane for walkable ground. A probe miss yields `None`;
/// the caller holds position and retries next tick.
fn sample_destination(
    area: &WanderArea,
    ground: &GroundHandle,
    rng: &mut StdRng,
) -> Option<Position> {
    let x = sample_axis(rng, area.center.x, area.extents.x / 2.0);
    let z = sample_axis(rng, area.center.z, area.extents.z / 2.0);
    ground.probe_down(x, z, area.top(), area.extents.y)
}

/// System driving the wander / pursue / attack state machine.
pub fn behavior_system(
    config: Res<SimConfig>,
    roster: Res<UnitRoster>,
    area: Option<Res<WanderArea>>,
    ground: Option<Res<GroundHandle>>,
    mut rng: ResMut<WanderRng>,
    mut queue: ResMut<PresentationQueue>,
    mut query: Query<(
        &UnitId,
        &Position,
        &mut Facing,
        &mut UnitState,
        &mut CurrentTarget,
        &mut NavAgent,
        &mut Wander,
    )>,
) {
    // Wandering requires both an area and a ground source; without them
    // idle units simply hold position.
    let wander_env = match (&area, &ground) {
        (Some(a), Some(g)) => Some((**a, &**g)),
        _ => None,
    };

    for (id, pos, mut facing, mut state, mut target, mut nav, mut wander) in query.iter_mut() {
        if *state == UnitState::Dead {
            continue;
        }

        if let Some(target_id) = target.0 {
            let Some(entry) = roster.find(target_id) else {
                // Target died after acquisition ran; re-acquire next tick.
                target.0 = None;
                continue;
            };

            nav.stopping_distance = nav.default_stopping_distance;
            nav.destination = Some(entry.pos);
            nav.stopped = false;

            if pos.distance_to(&entry.pos) <= nav.stopping_distance {
                facing.face_toward(pos, &entry.pos);
                if *state != UnitState::Attacking {
                    *state = UnitState::Attacking;
                    queue.push(PresentationEvent::Attacking {
                        unit: *id,
                        active: true,
                    });
                    queue.push(PresentationEvent::PlayClip {
                        unit: *id,
                        clip: ClipKind::Attack,
                    });
                }
            } else if *state == UnitState::Attacking {
                // Target slipped out of reach mid-swing.
                *state = UnitState::Pursuing;
                queue.push(PresentationEvent::Attacking {
                    unit: *id,
                    active: false,
                });
                queue.push(PresentationEvent::PlayClip {
                    unit: *id,
                    clip: ClipKind::Run,
                });
            } else if *state != UnitState::Pursuing {
                *state = UnitState::Pursuing;
            }
            continue;
        }

        // No target: fall back to wandering.
        if *state == UnitState::Attacking {
            queue.push(PresentationEvent::Attacking {
                unit: *id,
                active: false,
            });
            queue.push(PresentationEvent::PlayClip {
                unit: *id,
                clip: ClipKind::Run,
            });
        }
        if *state != UnitState::Wandering {
            *state = UnitState::Wandering;
        }

        // Wandering units stop closer to their destination than fighters do.
        if nav.stopping_distance > config.wander_stop_distance {
            nav.stopping_distance = config.wander_stop_distance;
        }

        let Some((area, ground)) = wander_env else {
            wander.target = None;
            nav.destination = None;
            nav.stopped = true;
            continue;
        };

        let need_new = match wander.target {
            None => true,
            Some(dest) => pos.distance_to(&dest) < config.wander_arrive_radius,
        };
        if need_new {
            wander.target = sample_destination(&area, ground, &mut rng.0);
        }

        match wander.target {
            Some(dest) => {
                nav.destination = Some(dest);
                nav.stopped = false;
            }
            None => {
                // Probe missed: hold position, resample next tick.
                nav.destination = None;
                nav.stopped = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::{Extents, FlatGround};
    use crate::spatial::roster_update_system;

    fn test_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems((roster_update_system, behavior_system).chain());
        schedule
    }

    fn base_world() -> World {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(UnitRoster::new());
        world.insert_resource(PresentationQueue::default());
        world.insert_resource(WanderRng::seeded(7));
        world
    }

    fn spawn_unit(world: &mut World, id: u32, faction: Faction, x: f32) -> Entity {
        world
            .spawn(UnitBundle {
                id: UnitId(id),
                faction,
                attack_faction: AttackFaction(faction.opposing()),
                position: Position::new(x, 0.0, 0.0),
                nav: NavAgent::new(3.0, 1.5),
                ..Default::default()
            })
            .id()
    }

    #[test]
    fn test_untargeted_unit_wanders_inside_area() {
        let mut world = base_world();
        world.insert_resource(WanderArea::new(
            Position::new(0.0, 5.0, 0.0),
            Extents::new(40.0, 10.0, 40.0),
        ));
        world.insert_resource(GroundHandle::new(FlatGround::new(0.0)));

        let unit = spawn_unit(&mut world, 1, Faction::Blue, 0.0);
        test_schedule().run(&mut world);

        let wander = world.get::<Wander>(unit).unwrap();
        let dest = wander.target.expect("destination sampled");
        assert!(dest.x.abs() <= 20.0 && dest.z.abs() <= 20.0);
        assert_eq!(dest.y, 0.0); // snapped to the probed ground

        let nav = world.get::<NavAgent>(unit).unwrap();
        assert_eq!(nav.destination, Some(dest));
        assert!(!nav.stopped);
        assert_eq!(world.get::<UnitState>(unit), Some(&UnitState::Wandering));
    }

    #[test]
    fn test_wander_clamps_stopping_distance() {
        let mut world = base_world();
        world.insert_resource(WanderArea::new(
            Position::new(0.0, 5.0, 0.0),
            Extents::new(40.0, 10.0, 40.0),
        ));
        world.insert_resource(GroundHandle::new(FlatGround::new(0.0)));

        let unit = world
            .spawn(UnitBundle {
                id: UnitId(1),
                nav: NavAgent::new(3.0, 6.0), // wider than the wander clamp
                ..Default::default()
            })
            .id();
        test_schedule().run(&mut world);

        let nav = world.get::<NavAgent>(unit).unwrap();
        assert_eq!(nav.stopping_distance, 2.0);
        assert_eq!(nav.default_stopping_distance, 6.0);
    }

    #[test]
    fn test_probe_miss_holds_position() {
        let mut world = base_world();
        world.insert_resource(WanderArea::new(
            Position::new(0.0, 5.0, 0.0),
            Extents::new(40.0, 10.0, 40.0),
        ));
        // Ground far below the probe reach: every sample misses.
        world.insert_resource(GroundHandle::new(FlatGround::new(-100.0)));

        let unit = spawn_unit(&mut world, 1, Faction::Blue, 0.0);
        test_schedule().run(&mut world);

        let wander = world.get::<Wander>(unit).unwrap();
        assert_eq!(wander.target, None);
        let nav = world.get::<NavAgent>(unit).unwrap();
        assert_eq!(nav.destination, None);
        assert!(nav.stopped);
    }

    #[test]
    fn test_no_wander_area_means_holding_still() {
        let mut world = base_world();
        let unit = spawn_unit(&mut world, 1, Faction::Blue, 0.0);
        test_schedule().run(&mut world);

        let nav = world.get::<NavAgent>(unit).unwrap();
        assert!(nav.stopped);
        assert_eq!(nav.destination, None);
    }

    #[test]
    fn test_targeted_unit_pursues_out_of_range_enemy() {
        let mut world = base_world();
        let hunter = spawn_unit(&mut world, 1, Faction::Blue, 0.0);
        spawn_unit(&mut world, 2, Faction::Red, 10.0);
        world
            .entity_mut(hunter)
            .insert(CurrentTarget(Some(UnitId(2))));

        test_schedule().run(&mut world);

        assert_eq!(world.get::<UnitState>(hunter), Some(&UnitState::Pursuing));
        let nav = world.get::<NavAgent>(hunter).unwrap();
        assert_eq!(nav.destination, Some(Position::new(10.0, 0.0, 0.0)));
        assert_eq!(nav.stopping_distance, 1.5); // combat reach restored
        assert!(!nav.stopped);
        // No animation events while moving between non-attacking states.
        assert!(world.resource::<PresentationQueue>().is_empty());
    }

    #[test]
    fn test_attack_begins_in_range_with_events() {
        let mut world = base_world();
        let hunter = spawn_unit(&mut world, 1, Faction::Blue, 0.0);
        spawn_unit(&mut world, 2, Faction::Red, 1.0);
        world
            .entity_mut(hunter)
            .insert(CurrentTarget(Some(UnitId(2))));

        test_schedule().run(&mut world);

        assert_eq!(world.get::<UnitState>(hunter), Some(&UnitState::Attacking));
        let events = world.resource_mut::<PresentationQueue>().drain();
        assert!(events.contains(&PresentationEvent::Attacking {
            unit: UnitId(1),
            active: true,
        }));
        assert!(events.contains(&PresentationEvent::PlayClip {
            unit: UnitId(1),
            clip: ClipKind::Attack,
        }));

        // The attacker squares up to face its target.
        let facing = world.get::<Facing>(hunter).unwrap();
        assert!((facing.yaw - std::f32::consts::FRAC_PI_2).abs() < 0.001);
    }

    #[test]
    fn test_attack_events_not_repeated_while_attacking() {
        let mut world = base_world();
        let hunter = spawn_unit(&mut world, 1, Faction::Blue, 0.0);
        spawn_unit(&mut world, 2, Faction::Red, 1.0);
        world
            .entity_mut(hunter)
            .insert(CurrentTarget(Some(UnitId(2))));

        let mut schedule = test_schedule();
        schedule.run(&mut world);
        world.resource_mut::<PresentationQueue>().drain();
        schedule.run(&mut world);

        assert!(world.resource::<PresentationQueue>().is_empty());
    }

    #[test]
    fn test_target_escaping_range_reverts_to_pursuit() {
        let mut world = base_world();
        let hunter = spawn_unit(&mut world, 1, Faction::Blue, 0.0);
        let prey = spawn_unit(&mut world, 2, Faction::Red, 1.0);
        world
            .entity_mut(hunter)
            .insert(CurrentTarget(Some(UnitId(2))));

        let mut schedule = test_schedule();
        schedule.run(&mut world);
        assert_eq!(world.get::<UnitState>(hunter), Some(&UnitState::Attacking));
        world.resource_mut::<PresentationQueue>().drain();

        world.entity_mut(prey).insert(Position::new(20.0, 0.0, 0.0));
        schedule.run(&mut world);

        assert_eq!(world.get::<UnitState>(hunter), Some(&UnitState::Pursuing));
        let events = world.resource_mut::<PresentationQueue>().drain();
        assert!(events.contains(&PresentationEvent::Attacking {
            unit: UnitId(1),
            active: false,
        }));
    }

    #[test]
    fn test_dead_target_clears_and_unit_resumes_wandering() {
        let mut world = base_world();
        world.insert_resource(WanderArea::new(
            Position::new(0.0, 5.0, 0.0),
            Extents::new(40.0, 10.0, 40.0),
        ));
        world.insert_resource(GroundHandle::new(FlatGround::new(0.0)));

        let hunter = spawn_unit(&mut world, 1, Faction::Blue, 0.0);
        let prey = spawn_unit(&mut world, 2, Faction::Red, 1.0);
        world
            .entity_mut(hunter)
            .insert(CurrentTarget(Some(UnitId(2))));

        let mut schedule = test_schedule();
        schedule.run(&mut world);
        assert_eq!(world.get::<UnitState>(hunter), Some(&UnitState::Attacking));

        world.entity_mut(prey).insert(UnitState::Dead);
        schedule.run(&mut world); // target vanishes from the roster; cleared
        assert_eq!(world.get::<CurrentTarget>(hunter).unwrap().0, None);

        schedule.run(&mut world); // next tick: back to wandering
        assert_eq!(world.get::<UnitState>(hunter), Some(&UnitState::Wandering));
    }
}
