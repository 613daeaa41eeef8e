//! Common component and event types used across benchmarks.
//!
//! These are designed to be representative of real game data in terms of size and access
//! patterns.

use tiny_ecs::{Component, Event};

// =============================================================================
// Transform Components
// =============================================================================

/// 3D position component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 3D velocity component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 4x4 transformation matrix (64 bytes).
#[derive(Component, Clone, Copy, Debug)]
pub struct Transform {
    pub matrix: [[f32; 4]; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

// =============================================================================
// Gameplay Components
// =============================================================================

/// Hit points (4 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Health(pub u32);

/// Zero-sized tag.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Player;

// =============================================================================
// Events
// =============================================================================

/// Damage dealt to an entity.
#[derive(Event, Clone, Copy, Debug)]
pub struct Hit {
    pub damage: u32,
}
