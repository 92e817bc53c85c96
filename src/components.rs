//! ECS Components for the Skirmish Sim battle simulation.
//!
//! Components are pure data containers attached to unit entities.
//! All game logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 3D world position (x = east/west, y = up, z = north/south).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Facing direction as a yaw angle (radians around the up axis).
///
/// Only written by the core when a unit turns to attack; the movement
/// driver owns rotation during travel.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Facing {
    pub yaw: f32,
}

impl Facing {
    /// Turn toward a target position, ignoring the vertical offset.
    pub fn face_toward(&mut self, from: &Position, to: &Position) {
        let dx = to.x - from.x;
        let dz = to.z - from.z;
        if dx * dx + dz * dz > 1e-8 {
            self.yaw = dx.atan2(dz);
        }
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Unique identifier for a combat unit. Stable for the unit's lifetime.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl Default for UnitId {
    fn default() -> Self {
        Self(0)
    }
}

/// Faction/side identifier.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Blue,
    Red,
}

impl Faction {
    /// The opposing faction in a two-sided battle.
    pub fn opposing(self) -> Self {
        match self {
            Faction::Blue => Faction::Red,
            Faction::Red => Faction::Blue,
        }
    }
}

impl Default for Faction {
    fn default() -> Self {
        Self::Blue
    }
}

/// The faction this unit hunts. Usually `faction.opposing()`, but carried
/// separately so targeting is configured per unit rather than assumed.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackFaction(pub Faction);

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Remaining life of a unit. Strictly decreasing in this core: combat chips
/// it down and nothing restores it, so there is no heal path.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Life {
    pub current: f32,
    pub max: f32,
}

impl Life {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    /// A unit with less than one life point is dying.
    pub fn is_alive(&self) -> bool {
        self.current >= 1.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

impl Default for Life {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Static combat capabilities of a unit.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CombatStats {
    /// Continuous damage applied per second while in attack range.
    pub damage_per_second: f32,
    /// Ranged units do not count toward the ally-attacker cap and never
    /// use spread allocation themselves.
    pub is_ranged: bool,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            damage_per_second: 10.0,
            is_ranged: false,
        }
    }
}

/// Target-allocation state for the spread targeting scheme.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Allocation {
    /// Whether this unit coordinates with allies via the attacker cap.
    pub spread: bool,
    /// How many non-ranged allies may already be attacking an enemy before
    /// this unit considers it illegal. Starts at 1 and is raised whenever a
    /// full allocation round finds no legal target.
    pub ally_cap: u32,
}

impl Allocation {
    pub fn new(spread: bool) -> Self {
        Self { spread, ally_cap: 1 }
    }

    pub fn raise_cap(&mut self) {
        self.ally_cap += 1;
    }

    pub fn reset_cap(&mut self) {
        self.ally_cap = 1;
    }
}

impl Default for Allocation {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Weak handle to the unit currently being engaged. Liveness is re-checked
/// against the roster every tick; the handle never owns the target.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentTarget(pub Option<UnitId>);

// ============================================================================
// STATE MACHINE COMPONENTS
// ============================================================================

/// Per-unit behavior state. `Dead` is terminal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    /// No enemies known; picking random destinations inside the wander area.
    Wandering,
    /// Moving toward the current target.
    Pursuing,
    /// In range of the current target and applying damage.
    Attacking,
    /// Out of life. No further mutation; removed one tick after entering.
    Dead,
}

impl Default for UnitState {
    fn default() -> Self {
        Self::Wandering
    }
}

/// Movement request surface consumed by the movement driver.
///
/// The core only writes destination, stopping distance and the stopped flag;
/// path execution belongs to the driver.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NavAgent {
    /// Requested destination, if any.
    pub destination: Option<Position>,
    /// Range at which the unit counts as arrived (and attacks from).
    pub stopping_distance: f32,
    /// Engagement range restored whenever a target is held. The wander
    /// policy temporarily narrows `stopping_distance` below this.
    pub default_stopping_distance: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Driver halt flag.
    pub stopped: bool,
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            destination: None,
            stopping_distance,
            default_stopping_distance: stopping_distance,
            speed,
            stopped: true,
        }
    }
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::new(5.0, 1.5)
    }
}

/// Last chosen random destination while wandering. `None` means no
/// destination has been picked yet (or the last ground probe missed).
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Wander {
    pub target: Option<Position>,
}

/// Health-bar visibility tracking. The bar is revealed the first time a
/// unit drops below full life; whether a bar widget actually exists is the
/// presentation layer's concern.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HealthBar {
    pub visible: bool,
}

/// Deferred-destruction marker. Inserted when a unit dies; the removal
/// system despawns the entity once this tick has been reached, leaving the
/// terminal state observable for one full tick.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PendingRemoval {
    pub at_tick: u64,
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete combat unit.
#[derive(Bundle, Default)]
pub struct UnitBundle {
    pub id: UnitId,
    pub faction: Faction,
    pub attack_faction: AttackFaction,
    pub position: Position,
    pub facing: Facing,
    pub life: Life,
    pub stats: CombatStats,
    pub allocation: Allocation,
    pub target: CurrentTarget,
    pub state: UnitState,
    pub nav: NavAgent,
    pub wander: Wander,
    pub health_bar: HealthBar,
}
