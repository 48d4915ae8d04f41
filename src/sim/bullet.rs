//! Projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::geometry::{Rect, world_rect};
use super::tank::{Side, TankId};
use crate::consts::{BULLET_HEIGHT, BULLET_WIDTH, SCALE, TANK_SIZE};

/// A bullet in flight. Its direction is fixed for its whole life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    /// Firing tank; may no longer exist
    pub owner: TankId,
    pub side: Side,
    pub pos: Vec2,
    direction: Direction,
    pub speed: f32,
    /// Fired by a fully upgraded player: cuts through steel and razes bricks
    pub upgraded: bool,
    pub destroyed: bool,
}

impl Bullet {
    /// Fire from the muzzle of a tank centred at `tank_pos` facing `direction`
    pub fn fire(
        id: u32,
        owner: TankId,
        side: Side,
        tank_pos: Vec2,
        direction: Direction,
        speed: f32,
        upgraded: bool,
    ) -> Self {
        Self {
            id,
            owner,
            side,
            pos: tank_pos + direction.velocity(TANK_SIZE / 2.0 * SCALE),
            direction,
            speed,
            upgraded,
            destroyed: false,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Fly straight ahead for `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.direction.velocity(self.speed * dt);
    }

    /// Hitbox; the sprite is authored vertically so it turns sideways for east/west
    pub fn rect(&self) -> Rect {
        if self.direction.is_horizontal() {
            world_rect(self.pos, BULLET_HEIGHT, BULLET_WIDTH)
        } else {
            world_rect(self.pos, BULLET_WIDTH, BULLET_HEIGHT)
        }
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fired_from_muzzle() {
        let b = Bullet::fire(
            1,
            TankId::Player,
            Side::Human,
            Vec2::new(100.0, 100.0),
            Direction::East,
            400.0,
            false,
        );
        assert_eq!(b.pos, Vec2::new(132.0, 100.0));
        assert_eq!(b.direction(), Direction::East);
    }

    #[test]
    fn test_rect_swaps_when_horizontal() {
        let mut b = Bullet::fire(1, TankId::Bot(3), Side::Opponent, Vec2::ZERO, Direction::North, 1.0, false);
        assert_eq!(b.rect().size(), Vec2::new(12.0, 16.0));
        b = Bullet::fire(1, TankId::Bot(3), Side::Opponent, Vec2::ZERO, Direction::West, 1.0, false);
        assert_eq!(b.rect().size(), Vec2::new(16.0, 12.0));
    }

    #[test]
    fn test_advance() {
        let mut b = Bullet::fire(1, TankId::Player, Side::Human, Vec2::ZERO, Direction::South, 400.0, false);
        let start = b.pos;
        b.advance(0.5);
        assert_eq!(b.pos, start + Vec2::new(0.0, -200.0));
    }
}
