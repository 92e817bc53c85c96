//! Skirmish Sim - Battle Simulation Core
//!
//! A deterministic, fixed-timestep ECS simulation of autonomous combat
//! units. Uses `bevy_ecs` for the entity-component-system architecture;
//! rendering, animation and audio stay on the host's side of the
//! presentation-event boundary.

pub mod api;
pub mod components;
pub mod ground;
pub mod presentation;
pub mod spatial;
pub mod systems;
pub mod world;

pub use api::{SimWorld, UnitSpec};
pub use components::*;
pub use ground::{Extents, FlatGround, GroundHandle, GroundProbe, HeightField, WanderArea};
pub use presentation::{ClipKind, PresentationEvent, PresentationQueue};
pub use spatial::{RosterEntry, UnitRoster};
pub use systems::*;
pub use world::{Snapshot, UnitSnapshot};
