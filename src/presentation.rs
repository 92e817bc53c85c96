//! Presentation-layer notification boundary.
//!
//! The core never renders, animates or plays audio. Instead it pushes
//! one-way [`PresentationEvent`] notifications into a queue that the host
//! drains with each snapshot. No return value is ever consumed: a missing
//! or indifferent presentation layer changes nothing in the simulation.

use crate::components::UnitId;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Audio/animation clip selector for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipKind {
    /// Melee/attack loop.
    Attack,
    /// Running/footsteps loop.
    Run,
}

/// One-way notification to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PresentationEvent {
    /// Toggle the attacking animation state of a unit.
    Attacking { unit: UnitId, active: bool },
    /// Switch the unit's audio clip. Only emitted when the clip changes,
    /// so the host can restart playback on receipt.
    PlayClip { unit: UnitId, clip: ClipKind },
    /// Reveal or hide the unit's health bar.
    HealthBar { unit: UnitId, visible: bool },
    /// Spawn a corpse/ragdoll representation at the unit's final pose.
    SpawnCorpse {
        unit: UnitId,
        x: f32,
        y: f32,
        z: f32,
        yaw: f32,
    },
    /// The unit entity has been removed from the simulation.
    RemoveUnit { unit: UnitId },
}

/// Buffer of pending presentation events, drained on snapshot.
#[derive(Resource, Debug, Default)]
pub struct PresentationQueue {
    events: Vec<PresentationEvent>,
}

impl PresentationQueue {
    pub fn push(&mut self, event: PresentationEvent) {
        self.events.push(event);
    }

    /// Take all pending events, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PresentationEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drain_empties() {
        let mut queue = PresentationQueue::default();
        queue.push(PresentationEvent::Attacking {
            unit: UnitId(1),
            active: true,
        });
        queue.push(PresentationEvent::PlayClip {
            unit: UnitId(1),
            clip: ClipKind::Attack,
        });

        assert_eq!(queue.len(), 2);
        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert!(queue.is_empty());
    }
}
