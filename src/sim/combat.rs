//! Bullet flight and impacts
//!
//! Each live bullet, in firing order, advances and then checks terrain,
//! opposing tanks and opposing bullets, stopping at the first thing it hits.
//! Spent bullets are purged once every bullet has been processed.

use rand::RngCore;

use super::bullet::Bullet;
use super::geometry::Rect;
use super::grid::Cell;
use super::stage::Stage;
use super::state::GameEvent;
use super::tank::{Side, Tank};
use super::tile::TileKind;
use crate::tuning::Tuning;

impl Stage {
    pub(super) fn resolve_bullets(&mut self, rng: &mut dyn RngCore, tuning: &Tuning, dt: f32) {
        for i in 0..self.bullets.len() {
            if self.bullets[i].destroyed {
                continue;
            }
            self.bullets[i].advance(dt);
            let bullet = self.bullets[i].clone();
            let rect = bullet.rect();

            if self.strike_terrain(&bullet, rect) || self.strike_tank(&bullet, rect, rng, tuning) {
                self.bullets[i].destroy();
                self.events.push(GameEvent::BulletExploded { pos: bullet.pos });
                if self.outcome().is_some() {
                    break;
                }
                continue;
            }

            let hit = self.bullets.iter().position(|other| {
                other.id != bullet.id
                    && !other.destroyed
                    && other.side != bullet.side
                    && other.rect().intersects(&rect)
            });
            if let Some(j) = hit {
                self.bullets[i].destroy();
                self.bullets[j].destroy();
                self.events.push(GameEvent::BulletsCollided { pos: bullet.pos });
            }
        }
        self.purge_bullets();
    }

    /// Terrain impact; true if the bullet is spent
    fn strike_terrain(&mut self, bullet: &Bullet, rect: Rect) -> bool {
        let mut hit = false;
        let mut headquarters = false;
        let mut targets: Vec<Cell> = Vec::new();
        for tile in self.grid.tiles_overlapping(rect).filter(|t| !t.shootable()) {
            hit = true;
            match tile.kind {
                TileKind::Headquarters => headquarters = true,
                TileKind::Steel if bullet.upgraded => targets.push(Cell::new(tile.row, tile.column)),
                _ if tile.destroyable() => targets.push(Cell::new(tile.row, tile.column)),
                _ => {}
            }
        }

        if headquarters {
            log::info!("Headquarters destroyed by bullet {}", bullet.id);
            self.lose_headquarters();
            return true;
        }

        match targets[..] {
            [] => {}
            [first] => self.damage_tiles(bullet, first, None),
            [first, second] => self.damage_tiles(bullet, first, Some(second)),
            _ => {
                debug_assert!(false, "bullet {} struck {} destroyable tiles", bullet.id, targets.len());
                log::warn!(
                    "Bullet {} struck {} destroyable tiles at once; leaving them intact",
                    bullet.id,
                    targets.len()
                );
            }
        }
        hit
    }

    fn damage_tiles(&mut self, bullet: &Bullet, first: Cell, second: Option<Cell>) {
        self.grid.apply_quadrant_damage(first, second, bullet.direction());
        for cell in std::iter::once(first).chain(second) {
            if bullet.upgraded || self.grid.tile(cell).quadrants.is_empty() {
                self.grid.destroy_tile(cell);
                self.events.push(GameEvent::TileDestroyed { cell });
            }
        }
    }

    /// Opposing tank impact; true if the bullet is spent
    fn strike_tank(&mut self, bullet: &Bullet, rect: Rect, rng: &mut dyn RngCore, tuning: &Tuning) -> bool {
        match bullet.side {
            Side::Human => {
                // A shot along the seam between two bots damages both
                let struck: Vec<usize> = (0..self.bots.len())
                    .filter(|&i| self.bots[i].rect().intersects(&rect))
                    .collect();
                if struck.is_empty() {
                    return false;
                }
                let mut dead = Vec::new();
                for &index in &struck {
                    let bot = &mut self.bots[index];
                    if bot.take_hit() {
                        dead.push(index);
                    } else {
                        let event = GameEvent::BotHit {
                            id: bot.id,
                            hp_left: bot.hp,
                        };
                        self.events.push(event);
                    }
                }
                // Highest index first keeps the remaining indices valid
                for &index in dead.iter().rev() {
                    let bot = self.bots.remove(index);
                    log::debug!("Bot {} ({:?}) destroyed", bot.id, bot.kind);
                    self.record_bot_destroyed(&bot);
                    if bot.carries_bonus {
                        self.release_bonus(bot.pos, rng);
                    }
                }
                true
            }
            Side::Opponent => {
                if !self.player.rect().intersects(&rect) {
                    return false;
                }
                if !self.player.is_immune() {
                    self.kill_player(tuning);
                }
                true
            }
        }
    }
}
