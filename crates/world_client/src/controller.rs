//! Keyboard-driven steering of the local player.
//!
//! Steering is recomputed from scratch every tick. Only the sprite mirroring
//! carries over: vertical movement keeps whichever way the sprite last faced.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use shared::PlayerId;
use tracing::{info, warn};

use app::LOG_CLIENT;

use crate::bounds::WorldBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn clip_key(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Walk cycle selected for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Animation {
    Walk(Direction),
    #[default]
    Stopped,
}

impl Animation {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Animation::Walk(direction) => Some(direction),
            Animation::Stopped => None,
        }
    }

    /// Clip to play, `None` while stopped.
    pub fn clip_key(self) -> Option<&'static str> {
        self.direction().map(Direction::clip_key)
    }
}

/// Held state of the four directional keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl InputState {
    /// Samples the arrow keys.
    pub fn from_keyboard(keyboard: &ButtonInput<KeyCode>) -> Self {
        Self {
            left: keyboard.pressed(KeyCode::ArrowLeft),
            right: keyboard.pressed(KeyCode::ArrowRight),
            up: keyboard.pressed(KeyCode::ArrowUp),
            down: keyboard.pressed(KeyCode::ArrowDown),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOutput {
    pub velocity: Vec2,
    pub animation: Animation,
    pub flipped: bool,
}

/// Maps one tick of input to velocity, animation and mirroring.
///
/// Left wins over right and up wins over down on their axes. The animation
/// follows `Left > Right > Up > Down`, so diagonal movement shows the
/// horizontal clip. `was_flipped` is kept when no horizontal key is held.
pub fn steer(input: InputState, speed: f32, was_flipped: bool) -> ControllerOutput {
    let mut velocity = Vec2::ZERO;

    if input.left {
        velocity.x = -speed;
    } else if input.right {
        velocity.x = speed;
    }

    if input.up {
        velocity.y = -speed;
    } else if input.down {
        velocity.y = speed;
    }

    let (animation, flipped) = if input.left {
        (Animation::Walk(Direction::Left), true)
    } else if input.right {
        (Animation::Walk(Direction::Right), false)
    } else if input.up {
        (Animation::Walk(Direction::Up), was_flipped)
    } else if input.down {
        (Animation::Walk(Direction::Down), was_flipped)
    } else {
        (Animation::Stopped, was_flipped)
    };

    ControllerOutput {
        velocity,
        animation,
        flipped,
    }
}

/// The avatar controlled by this client.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlayer {
    pub identity: PlayerId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub animation: Animation,
    pub flipped: bool,
}

impl LocalPlayer {
    fn new(identity: PlayerId, position: Vec2) -> Self {
        Self {
            identity,
            position,
            velocity: Vec2::ZERO,
            animation: Animation::Stopped,
            flipped: false,
        }
    }

    pub fn facing(&self) -> Option<Direction> {
        self.animation.direction()
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    /// Integrates the current velocity over `dt` seconds, keeping the square
    /// body of edge `body_size` inside `bounds`.
    pub fn advance(&mut self, dt: f32, bounds: &WorldBounds, body_size: f32) {
        let next = self.position + self.velocity * dt;
        self.position = bounds.clamp(next, Vec2::splat(body_size));
    }
}

/// Owns the local player once the snapshot has revealed it.
#[derive(Debug, Clone)]
pub struct LocalPlayerController {
    speed: f32,
    player: Option<LocalPlayer>,
}

impl LocalPlayerController {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            player: None,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn player(&self) -> Option<&LocalPlayer> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut LocalPlayer> {
        self.player.as_mut()
    }

    pub fn is_spawned(&self) -> bool {
        self.player.is_some()
    }

    /// Creates the local player. Returns `false` and leaves the existing
    /// player untouched if one was already created.
    pub fn spawn(&mut self, identity: PlayerId, position: Vec2) -> bool {
        if let Some(existing) = &self.player {
            warn!(
                target: LOG_CLIENT,
                "Local player {} already exists, ignoring spawn of {}", existing.identity, identity
            );
            return false;
        }

        info!(
            target: LOG_CLIENT,
            "Local player {} created at ({}, {})", identity, position.x, position.y
        );
        self.player = Some(LocalPlayer::new(identity, position));
        true
    }

    pub fn despawn(&mut self) -> Option<LocalPlayer> {
        self.player.take()
    }

    /// Runs one tick of steering and stores the result on the local player.
    pub fn update(&mut self, input: InputState) -> ControllerOutput {
        let was_flipped = self.player.as_ref().is_some_and(|player| player.flipped);
        let output = steer(input, self.speed, was_flipped);

        if let Some(player) = &mut self.player {
            player.velocity = output.velocity;
            player.animation = output.animation;
            player.flipped = output.flipped;
        }
        output
    }
}
