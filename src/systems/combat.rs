//! Continuous chip-damage combat.
//!
//! Split into a gather phase and an apply phase. Gather collects every
//! attacking unit's strike against the roster's committed positions and
//! computes per-victim damage without touching the world; apply then folds
//! the results into the victims' life totals. The gather phase is pure, so
//! it can fan out across a thread pool when the `parallel` feature is on.

use crate::components::*;
use crate::spatial::UnitRoster;
use crate::systems::DeltaTime;
use bevy_ecs::prelude::*;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::HashMap;

/// One attacking unit's pending strike for this tick.
#[derive(Debug, Clone, Copy)]
struct Strike {
    target: UnitId,
    pos: Position,
    reach: f32,
    dps: f32,
}

/// Resolve a strike against the roster: damage lands only while the victim
/// is live and inside the attacker's reach.
fn resolve_strike(strike: &Strike, roster: &UnitRoster, delta: f32) -> Option<(Entity, f32)> {
    let entry = roster.find(strike.target)?;
    if strike.pos.distance_to(&entry.pos) <= strike.reach {
        Some((entry.entity, strike.dps * delta))
    } else {
        None
    }
}

/// System applying damage-per-second from every attacking unit to its
/// in-range target.
pub fn combat_system(
    dt: Res<DeltaTime>,
    roster: Res<UnitRoster>,
    attackers: Query<(&Position, &NavAgent, &CombatStats, &UnitState, &CurrentTarget)>,
    mut victims: Query<&mut Life>,
) {
    let delta = dt.0;

    let strikes: Vec<Strike> = attackers
        .iter()
        .filter(|(_, _, _, state, target)| **state == UnitState::Attacking && target.0.is_some())
        .filter_map(|(pos, nav, stats, _, target)| {
            Some(Strike {
                target: target.0?,
                pos: *pos,
                reach: nav.stopping_distance,
                dps: stats.damage_per_second,
            })
        })
        .collect();

    #[cfg(feature = "parallel")]
    let hits: Vec<(Entity, f32)> = strikes
        .par_iter()
        .filter_map(|s| resolve_strike(s, &roster, delta))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let hits: Vec<(Entity, f32)> = strikes
        .iter()
        .filter_map(|s| resolve_strike(s, &roster, delta))
        .collect();

    // Several attackers may share one victim; merge before applying.
    let mut damage: HashMap<Entity, f32> = HashMap::new();
    for (entity, amount) in hits {
        *damage.entry(entity).or_insert(0.0) += amount;
    }

    for (entity, amount) in damage {
        if let Ok(mut life) = victims.get_mut(entity) {
            life.damage(amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::roster_update_system;

    fn test_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems((roster_update_system, combat_system).chain());
        schedule
    }

    fn spawn_attacker(world: &mut World, id: u32, x: f32, dps: f32, target: u32) -> Entity {
        world
            .spawn(UnitBundle {
                id: UnitId(id),
                faction: Faction::Blue,
                attack_faction: AttackFaction(Faction::Red),
                position: Position::new(x, 0.0, 0.0),
                stats: CombatStats {
                    damage_per_second: dps,
                    is_ranged: false,
                },
                state: UnitState::Attacking,
                target: CurrentTarget(Some(UnitId(target))),
                nav: NavAgent::new(3.0, 2.0),
                ..Default::default()
            })
            .id()
    }

    fn spawn_victim(world: &mut World, id: u32, x: f32) -> Entity {
        world
            .spawn(UnitBundle {
                id: UnitId(id),
                faction: Faction::Red,
                attack_faction: AttackFaction(Faction::Blue),
                position: Position::new(x, 0.0, 0.0),
                ..Default::default()
            })
            .id()
    }

    #[test]
    fn test_damage_scales_with_delta() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.5));
        world.insert_resource(UnitRoster::new());

        spawn_attacker(&mut world, 1, 0.0, 10.0, 2);
        let victim = spawn_victim(&mut world, 2, 1.0);

        test_schedule().run(&mut world);

        let life = world.get::<Life>(victim).unwrap();
        assert!((life.current - 95.0).abs() < 0.001);
    }

    #[test]
    fn test_no_damage_out_of_reach() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.5));
        world.insert_resource(UnitRoster::new());

        spawn_attacker(&mut world, 1, 0.0, 10.0, 2);
        let victim = spawn_victim(&mut world, 2, 5.0); // beyond reach of 2.0

        test_schedule().run(&mut world);

        let life = world.get::<Life>(victim).unwrap();
        assert_eq!(life.current, 100.0);
    }

    #[test]
    fn test_attackers_on_same_victim_stack() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0));
        world.insert_resource(UnitRoster::new());

        spawn_attacker(&mut world, 1, 0.0, 10.0, 3);
        spawn_attacker(&mut world, 2, 2.0, 15.0, 3);
        let victim = spawn_victim(&mut world, 3, 1.0);

        test_schedule().run(&mut world);

        let life = world.get::<Life>(victim).unwrap();
        assert!((life.current - 75.0).abs() < 0.001);
    }

    #[test]
    fn test_non_attacking_units_deal_nothing() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0));
        world.insert_resource(UnitRoster::new());

        let attacker = spawn_attacker(&mut world, 1, 0.0, 10.0, 2);
        world.entity_mut(attacker).insert(UnitState::Pursuing);
        let victim = spawn_victim(&mut world, 2, 1.0);

        test_schedule().run(&mut world);

        assert_eq!(world.get::<Life>(victim).unwrap().current, 100.0);
    }

    #[test]
    fn test_dying_victims_take_no_further_damage() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0));
        world.insert_resource(UnitRoster::new());

        spawn_attacker(&mut world, 1, 0.0, 10.0, 2);
        let victim = spawn_victim(&mut world, 2, 1.0);
        world.entity_mut(victim).insert(Life {
            current: 0.5,
            max: 100.0,
        });

        test_schedule().run(&mut world);

        // Below one life point the victim leaves the roster, so strikes
        // stop resolving against it.
        assert_eq!(world.get::<Life>(victim).unwrap().current, 0.5);
    }
}
