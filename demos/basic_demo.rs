//! Headless demo: two melee lines fight until one side is wiped out.
//!
//! Run with `cargo run --example basic_demo`.

use skirmish_sim::{Faction, PresentationEvent, SimWorld};

fn main() {
    tracing_subscriber::fmt::init();

    let mut sim = SimWorld::new_default_test_world();
    let frame_dt = 1.0 / 30.0;

    for frame in 0..18_000 {
        sim.step(frame_dt);

        let snapshot = sim.snapshot();
        for event in &snapshot.events {
            if let PresentationEvent::RemoveUnit { unit } = event {
                println!("[t={:7.2}] unit {} removed", snapshot.time, unit.0);
            }
        }

        if frame % 300 == 0 {
            let blue = snapshot.units.iter().filter(|u| u.faction == "Blue").count();
            let red = snapshot.units.iter().filter(|u| u.faction == "Red").count();
            println!(
                "[t={:7.2}] tick {:6}  blue {:2}  red {:2}",
                snapshot.time, snapshot.tick, blue, red
            );
        }

        let factions_left = [Faction::Blue, Faction::Red]
            .iter()
            .filter(|f| {
                snapshot
                    .units
                    .iter()
                    .any(|u| u.faction == format!("{f:?}") && u.state != "Dead")
            })
            .count();
        if factions_left < 2 {
            println!("battle over at t={:.2}", snapshot.time);
            println!("{}", snapshot.to_json_pretty().unwrap_or_default());
            return;
        }
    }

    println!("stalemate after the frame budget");
}
