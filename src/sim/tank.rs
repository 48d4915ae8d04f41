//! Tanks: the human-controlled player and autonomous bots
//!
//! Both sides share the [`Tank`] interface used by the movement resolver and
//! the shooting pass; side-specific state (upgrade level and lives vs.
//! archetype, hit points and bonus flag) lives in the concrete types.

use glam::Vec2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::direction::Direction;
use super::geometry::{Rect, snap_to_grid, world_rect};
use super::pool::{BotKind, SpawnTicket};
use super::tick::TickInput;
use crate::consts::{CELL_SIZE, MAX_LEVEL, SCALE, TANK_SIZE};
use crate::tuning::Tuning;

/// Which team a tank or bullet belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Human,
    Opponent,
}

/// Stable handle for a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TankId {
    Player,
    Bot(u32),
}

/// Where the player (re)appears
pub const PLAYER_SPAWN: Vec2 = Vec2::new(11.0 * CELL_SIZE, 3.0 * CELL_SIZE);
/// Height of the bot spawn row
pub const BOT_SPAWN_Y: f32 = 27.0 * CELL_SIZE;

/// Hitbox of a tank centred at `pos`
pub fn tank_rect(pos: Vec2) -> Rect {
    world_rect(pos, TANK_SIZE, TANK_SIZE)
}

/// A proposed move for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub new_pos: Vec2,
    pub direction: Direction,
    pub can_move: bool,
}

impl MoveResult {
    /// Stay put, keep facing `direction`
    pub fn stay(pos: Vec2, direction: Direction) -> Self {
        Self {
            new_pos: pos,
            direction,
            can_move: true,
        }
    }

    /// Position the tank ends up at when starting from `from`.
    ///
    /// A blocked move rounds the old coordinate along the axis of travel to
    /// the grid, so the tank comes to rest flush against whatever stopped it,
    /// and takes the candidate's cross-axis coordinate.
    pub fn settled(&self, from: Vec2) -> Vec2 {
        if self.can_move {
            self.new_pos
        } else if self.direction.is_horizontal() {
            Vec2::new(snap_to_grid(from.x), self.new_pos.y)
        } else {
            Vec2::new(self.new_pos.x, snap_to_grid(from.y))
        }
    }
}

/// Candidate step from `pos` facing `current` toward `heading`.
///
/// Turning 90 degrees snaps the new cross-axis coordinate to the grid so a
/// tank never drives down a corridor half a cell off.
pub fn plan_step(pos: Vec2, current: Direction, heading: Direction, speed: f32, dt: f32) -> MoveResult {
    let mut new_pos = pos + heading.velocity(speed * dt);
    if current.is_perpendicular(heading) {
        if current.is_vertical() {
            new_pos.y = snap_to_grid(new_pos.y);
        } else {
            new_pos.x = snap_to_grid(new_pos.x);
        }
    }
    MoveResult {
        new_pos,
        direction: heading,
        can_move: true,
    }
}

/// Everything a tank may consult when deciding what to do this tick
pub struct Orders<'a> {
    pub input: &'a TickInput,
    pub rng: &'a mut dyn RngCore,
    pub tuning: &'a Tuning,
}

/// Behaviour shared by the player and bots
pub trait Tank {
    fn id(&self) -> TankId;
    fn side(&self) -> Side;
    fn pos(&self) -> Vec2;
    fn direction(&self) -> Direction;

    fn rect(&self) -> Rect {
        tank_rect(self.pos())
    }

    /// Advance cooldowns and status timers
    fn advance_timers(&mut self, dt: f32);

    /// Where the tank would like to be after this tick
    fn compute_candidate_move(&mut self, orders: &mut Orders<'_>, dt: f32) -> MoveResult;

    /// Apply the resolver's verdict
    fn commit_move(&mut self, result: &MoveResult, dt: f32);

    /// Fire a bullet with id `bullet_id` if a slot and the cooldown allow it
    fn attempt_shoot(&mut self, orders: &mut Orders<'_>, bullet_id: u32, dt: f32) -> Option<Bullet>;

    /// Free the slot holding `bullet_id`
    fn release_bullet(&mut self, bullet_id: u32);
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub direction: Direction,
    /// Upgrade level 0..=3
    pub level: u8,
    pub lives: u8,
    speed: f32,
    bullet_speed: f32,
    immunity_left: f32,
    spawn_lock_left: f32,
    since_last_shot: f32,
    slots: [Option<u32>; 2],
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self::with_progress(tuning.player_lives, 0, tuning)
    }

    /// Player carrying `lives` and `level` over from a previous stage
    pub fn with_progress(lives: u8, level: u8, tuning: &Tuning) -> Self {
        let mut player = Self {
            pos: PLAYER_SPAWN,
            direction: Direction::North,
            level: 0,
            lives,
            speed: 0.0,
            bullet_speed: 0.0,
            immunity_left: 0.0,
            spawn_lock_left: 0.0,
            since_last_shot: f32::INFINITY,
            slots: [None, None],
        };
        player.set_level(level.min(MAX_LEVEL));
        player.respawn(tuning);
        player
    }

    /// Back to the spawn point with fresh immunity and empty slots
    pub fn respawn(&mut self, tuning: &Tuning) {
        self.make_immune(tuning.respawn_immunity);
        self.spawn_lock_left = tuning.spawn_lock;
        self.pos = PLAYER_SPAWN;
        self.direction = Direction::North;
        self.slots = [None, None];
    }

    pub fn make_immune(&mut self, duration: f32) {
        self.immunity_left = self.immunity_left.max(duration);
    }

    pub fn is_immune(&self) -> bool {
        self.immunity_left > 0.0
    }

    /// Still materialising after a (re)spawn
    pub fn is_spawning(&self) -> bool {
        self.spawn_lock_left > 0.0
    }

    pub fn upgrade(&mut self) {
        if self.level < MAX_LEVEL {
            self.set_level(self.level + 1);
        }
    }

    pub fn reset_level(&mut self) {
        self.set_level(0);
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn slots(&self) -> &[Option<u32>; 2] {
        &self.slots
    }

    fn set_level(&mut self, level: u8) {
        self.level = level;
        (self.speed, self.bullet_speed) = match level {
            0 => (44.0 * SCALE, 100.0 * SCALE),
            _ => (50.0 * SCALE, 200.0 * SCALE),
        };
    }

    fn slot_count(&self) -> usize {
        if self.level < 2 { 1 } else { 2 }
    }
}

impl Tank for Player {
    fn id(&self) -> TankId {
        TankId::Player
    }

    fn side(&self) -> Side {
        Side::Human
    }

    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn advance_timers(&mut self, dt: f32) {
        self.since_last_shot += dt;
        // Immunity only starts counting down once the tank has materialised
        if self.spawn_lock_left > 0.0 {
            self.spawn_lock_left = (self.spawn_lock_left - dt).max(0.0);
            return;
        }
        self.immunity_left = (self.immunity_left - dt).max(0.0);
    }

    fn compute_candidate_move(&mut self, orders: &mut Orders<'_>, dt: f32) -> MoveResult {
        if self.is_spawning() {
            return MoveResult::stay(self.pos, self.direction);
        }
        match orders.input.held_direction() {
            Some(heading) => plan_step(self.pos, self.direction, heading, self.speed, dt),
            None => MoveResult::stay(self.pos, self.direction),
        }
    }

    fn commit_move(&mut self, result: &MoveResult, _dt: f32) {
        if self.is_spawning() {
            return;
        }
        self.pos = result.settled(self.pos);
        self.direction = result.direction;
    }

    fn attempt_shoot(&mut self, orders: &mut Orders<'_>, bullet_id: u32, _dt: f32) -> Option<Bullet> {
        if self.is_spawning() || !orders.input.fire {
            return None;
        }
        let slot_count = self.slot_count();
        let free = self.slots[..slot_count].iter().position(Option::is_none)?;
        let base = orders.tuning.shooting_interval;
        let interval = match slot_count {
            1 => base,
            // Second shot of a double volley follows almost immediately
            _ if self.slots.iter().any(Option::is_some) => base / 8.0,
            _ => base / 2.0,
        };
        if self.since_last_shot < interval {
            return None;
        }
        let bullet = Bullet::fire(
            bullet_id,
            TankId::Player,
            Side::Human,
            self.pos,
            self.direction,
            self.bullet_speed,
            self.level == MAX_LEVEL,
        );
        self.slots[free] = Some(bullet_id);
        self.since_last_shot = 0.0;
        Some(bullet)
    }

    fn release_bullet(&mut self, bullet_id: u32) {
        for slot in &mut self.slots {
            if *slot == Some(bullet_id) {
                *slot = None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

/// Per-archetype movement speed, bullet speed and hit points
pub fn bot_stats(kind: BotKind) -> (f32, f32, u8) {
    match kind {
        BotKind::Basic => (30.0 * SCALE, 100.0 * SCALE, 1),
        BotKind::Fast => (60.0 * SCALE, 100.0 * SCALE, 1),
        BotKind::RapidFire => (30.0 * SCALE, 175.0 * SCALE, 1),
        BotKind::Armored => (30.0 * SCALE, 100.0 * SCALE, 4),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: u32,
    pub kind: BotKind,
    pub pos: Vec2,
    pub direction: Direction,
    pub hp: u8,
    pub carries_bonus: bool,
    speed: f32,
    bullet_speed: f32,
    stuck_for: f32,
    since_last_shot: f32,
    slot: Option<u32>,
}

impl Bot {
    pub fn new(id: u32, ticket: SpawnTicket, pos: Vec2) -> Self {
        let (speed, bullet_speed, hp) = bot_stats(ticket.kind);
        Self {
            id,
            kind: ticket.kind,
            pos,
            direction: Direction::South,
            hp,
            carries_bonus: ticket.carries_bonus,
            speed,
            bullet_speed,
            stuck_for: 0.0,
            since_last_shot: f32::INFINITY,
            slot: None,
        }
    }

    pub fn stuck_for(&self) -> f32 {
        self.stuck_for
    }

    /// Take one hit; true if the bot is now destroyed
    pub fn take_hit(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        self.hp == 0
    }

    /// Random heading change, forced once the bot has been stuck too long
    fn choose_heading<R: Rng + ?Sized>(&mut self, rng: &mut R, tuning: &Tuning, dt: f32) -> Direction {
        let stuck = self.stuck_for > tuning.bot_stuck_threshold;
        if !stuck && tuning.bot_turn_rate * dt <= rng.random::<f32>() {
            return self.direction;
        }
        self.stuck_for = 0.0;
        if tuning.bot_perpendicular_turn > rng.random::<f32>() {
            let options = self.direction.perpendiculars();
            options[rng.random_range(0..options.len())]
        } else {
            self.direction.random_other(rng)
        }
    }
}

impl Tank for Bot {
    fn id(&self) -> TankId {
        TankId::Bot(self.id)
    }

    fn side(&self) -> Side {
        Side::Opponent
    }

    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn advance_timers(&mut self, dt: f32) {
        self.since_last_shot += dt;
    }

    fn compute_candidate_move(&mut self, orders: &mut Orders<'_>, dt: f32) -> MoveResult {
        let heading = self.choose_heading(&mut *orders.rng, orders.tuning, dt);
        plan_step(self.pos, self.direction, heading, self.speed, dt)
    }

    fn commit_move(&mut self, result: &MoveResult, dt: f32) {
        if !result.can_move || result.new_pos == self.pos {
            self.stuck_for += dt;
        }
        self.pos = result.settled(self.pos);
        self.direction = result.direction;
    }

    fn attempt_shoot(&mut self, orders: &mut Orders<'_>, bullet_id: u32, dt: f32) -> Option<Bullet> {
        if self.slot.is_some() || self.since_last_shot <= orders.tuning.bot_shooting_interval {
            return None;
        }
        if orders.tuning.bot_shoot_rate * dt <= orders.rng.random::<f32>() {
            return None;
        }
        let bullet = Bullet::fire(
            bullet_id,
            TankId::Bot(self.id),
            Side::Opponent,
            self.pos,
            self.direction,
            self.bullet_speed,
            false,
        );
        self.slot = Some(bullet_id);
        self.since_last_shot = 0.0;
        Some(bullet)
    }

    fn release_bullet(&mut self, bullet_id: u32) {
        if self.slot == Some(bullet_id) {
            self.slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn orders<'a>(input: &'a TickInput, rng: &'a mut Pcg32, tuning: &'a Tuning) -> Orders<'a> {
        Orders { input, rng, tuning }
    }

    fn ready_player(tuning: &Tuning) -> Player {
        let mut player = Player::new(tuning);
        player.advance_timers(tuning.spawn_lock + 0.01);
        player
    }

    #[test]
    fn test_spawn_lock_blocks_actions() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        let mut rng = Pcg32::seed_from_u64(1);
        let input = TickInput {
            up: true,
            fire: true,
            ..Default::default()
        };
        let mut o = orders(&input, &mut rng, &tuning);
        assert!(player.is_spawning());
        assert_eq!(player.compute_candidate_move(&mut o, 0.1).new_pos, PLAYER_SPAWN);
        assert!(player.attempt_shoot(&mut o, 1, 0.016).is_none());
    }

    #[test]
    fn test_immunity_waits_for_spawn_lock() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        player.advance_timers(tuning.spawn_lock);
        assert!(player.is_immune());
        player.advance_timers(tuning.respawn_immunity - 0.1);
        assert!(player.is_immune());
        player.advance_timers(0.2);
        assert!(!player.is_immune());
    }

    #[test]
    fn test_turn_snaps_cross_axis() {
        // Heading north at an off-grid height, then turning east
        let pos = Vec2::new(352.0, 110.0);
        let result = plan_step(pos, Direction::North, Direction::East, 200.0, 0.1);
        assert_eq!(result.new_pos, Vec2::new(372.0, 96.0));

        // Reversing keeps the coordinate untouched
        let result = plan_step(pos, Direction::North, Direction::South, 200.0, 0.1);
        assert_eq!(result.new_pos, Vec2::new(352.0, 90.0));
    }

    #[test]
    fn test_blocked_move_settles_on_cross_axis() {
        let result = MoveResult {
            new_pos: Vec2::new(372.0, 96.0),
            direction: Direction::East,
            can_move: false,
        };
        assert_eq!(result.settled(Vec2::new(352.0, 110.0)), Vec2::new(352.0, 96.0));
        // Stopped a few units short of the grid line, it comes to rest flush
        assert_eq!(result.settled(Vec2::new(345.0, 110.0)), Vec2::new(352.0, 96.0));

        let north = MoveResult {
            new_pos: Vec2::new(224.0, 500.0),
            direction: Direction::North,
            can_move: false,
        };
        assert_eq!(north.settled(Vec2::new(224.0, 509.5)), Vec2::new(224.0, 512.0));
    }

    #[test]
    fn test_single_slot_until_level_two() {
        let tuning = Tuning::default();
        let mut player = ready_player(&tuning);
        let mut rng = Pcg32::seed_from_u64(1);
        let input = TickInput {
            fire: true,
            ..Default::default()
        };
        let mut o = orders(&input, &mut rng, &tuning);
        assert!(player.attempt_shoot(&mut o, 1, 0.016).is_some());
        player.advance_timers(1.0);
        assert!(player.attempt_shoot(&mut o, 2, 0.016).is_none());
        player.release_bullet(1);
        assert!(player.attempt_shoot(&mut o, 3, 0.016).is_some());
    }

    #[test]
    fn test_double_slot_at_level_two() {
        let tuning = Tuning::default();
        let mut player = ready_player(&tuning);
        player.upgrade();
        player.upgrade();
        let mut rng = Pcg32::seed_from_u64(1);
        let input = TickInput {
            fire: true,
            ..Default::default()
        };
        let mut o = orders(&input, &mut rng, &tuning);
        assert!(player.attempt_shoot(&mut o, 1, 0.016).is_some());
        // Second volley shot needs only an eighth of the interval
        player.advance_timers(tuning.shooting_interval / 8.0 + 0.001);
        assert!(player.attempt_shoot(&mut o, 2, 0.016).is_some());
        player.advance_timers(1.0);
        assert!(player.attempt_shoot(&mut o, 3, 0.016).is_none());
        assert_eq!(player.slots(), &[Some(1), Some(2)]);
    }

    #[test]
    fn test_upgraded_bullet_only_at_max_level() {
        let tuning = Tuning::default();
        let mut player = ready_player(&tuning);
        let mut rng = Pcg32::seed_from_u64(1);
        let input = TickInput {
            fire: true,
            ..Default::default()
        };
        for _ in 0..5 {
            player.upgrade();
        }
        assert_eq!(player.level, MAX_LEVEL);
        let mut o = orders(&input, &mut rng, &tuning);
        let bullet = player.attempt_shoot(&mut o, 1, 0.016).unwrap();
        assert!(bullet.upgraded);
        assert_eq!(bullet.speed, 800.0);
    }

    #[test]
    fn test_bot_stats() {
        let ticket = SpawnTicket {
            kind: BotKind::Armored,
            carries_bonus: true,
        };
        let mut bot = Bot::new(1, ticket, Vec2::ZERO);
        assert_eq!(bot.hp, 4);
        assert_eq!(bot.direction, Direction::South);
        assert!(!bot.take_hit());
        assert!(!bot.take_hit());
        assert!(!bot.take_hit());
        assert!(bot.take_hit());
    }

    #[test]
    fn test_stuck_bot_always_turns() {
        let tuning = Tuning::default();
        let ticket = SpawnTicket {
            kind: BotKind::Basic,
            carries_bonus: false,
        };
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let mut bot = Bot::new(1, ticket, Vec2::new(480.0, 480.0));
            let blocked = MoveResult {
                new_pos: bot.pos,
                direction: Direction::South,
                can_move: false,
            };
            bot.commit_move(&blocked, tuning.bot_stuck_threshold + 0.05);
            let heading = bot.choose_heading(&mut rng, &tuning, 0.0);
            assert_ne!(heading, Direction::South);
            assert_eq!(bot.stuck_for(), 0.0);
        }
    }

    #[test]
    fn test_bot_keeps_heading_without_time() {
        let tuning = Tuning::default();
        let ticket = SpawnTicket {
            kind: BotKind::Fast,
            carries_bonus: false,
        };
        let mut rng = Pcg32::seed_from_u64(9);
        let mut bot = Bot::new(1, ticket, Vec2::new(480.0, 480.0));
        for _ in 0..100 {
            assert_eq!(bot.choose_heading(&mut rng, &tuning, 0.0), Direction::South);
        }
    }
}
