//! Per-stage spawn pool of bot archetypes
//!
//! The pool is drawn once when a stage loads and consumed front to back.
//! Running out is the normal way a stage ends, not an error.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bot archetypes, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotKind {
    Basic,
    Fast,
    RapidFire,
    Armored,
}

impl BotKind {
    pub const ALL: [BotKind; 4] = [
        BotKind::Basic,
        BotKind::Fast,
        BotKind::RapidFire,
        BotKind::Armored,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Fixed pool positions that carry a bonus; the last is counted from the end
const BONUS_SLOTS: [usize; 2] = [3, 10];
const BONUS_SLOT_FROM_END: usize = 3;

/// Archetype probabilities and the average pool size for a stage
pub fn stage_distribution(stage: u32) -> ([f64; 4], usize) {
    match stage {
        1 => ([0.88, 0.12, 0.0, 0.0], 18),
        2 | 3 => ([0.7, 0.2, 0.0, 0.1], 20),
        4 => ([0.1, 0.25, 0.5, 0.15], 20),
        _ => ([0.4, 0.25, 0.25, 0.1], 20),
    }
}

/// Running sums of `pdf`
pub fn cumulative(pdf: &[f64; 4]) -> [f64; 4] {
    let mut cdf = *pdf;
    for i in 1..cdf.len() {
        cdf[i] += cdf[i - 1];
    }
    cdf
}

/// Inverse-CDF lookup for a uniform sample in [0, 1)
pub fn sample_kind(cdf: &[f64; 4], r: f64) -> BotKind {
    let index = cdf.iter().position(|&edge| r <= edge).unwrap_or(cdf.len() - 1);
    BotKind::ALL[index]
}

/// What the pool hands out for one spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTicket {
    pub kind: BotKind,
    pub carries_bonus: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPool {
    kinds: Vec<BotKind>,
    bonus_slots: Vec<usize>,
    cursor: usize,
}

impl SpawnPool {
    /// Draw the pool for `stage`
    pub fn build<R: Rng + ?Sized>(stage: u32, rng: &mut R) -> Self {
        let (pdf, average) = stage_distribution(stage);
        let offset: i32 = rng.random_range(-2..=2);
        let count = average.saturating_add_signed(offset as isize);
        let pool = Self::draw(&pdf, count, rng);
        log::debug!("Stage {stage} spawn pool: {} bots", pool.len());
        pool
    }

    /// Draw `count` archetypes independently from `pdf`
    pub fn draw<R: Rng + ?Sized>(pdf: &[f64; 4], count: usize, rng: &mut R) -> Self {
        let cdf = cumulative(pdf);
        let kinds = (0..count)
            .map(|_| sample_kind(&cdf, rng.random::<f64>()))
            .collect();
        Self::from_kinds(kinds)
    }

    /// Pool with a fixed order; bonus slots are assigned as usual
    pub fn from_kinds(kinds: Vec<BotKind>) -> Self {
        let len = kinds.len();
        let mut bonus_slots: Vec<usize> = BONUS_SLOTS.iter().copied().filter(|&i| i < len).collect();
        if let Some(tail) = len.checked_sub(BONUS_SLOT_FROM_END) {
            if !bonus_slots.contains(&tail) {
                bonus_slots.push(tail);
            }
        }
        Self {
            kinds,
            bonus_slots,
            cursor: 0,
        }
    }

    /// Hand out the next bot, or `None` once the pool is used up
    pub fn next(&mut self) -> Option<SpawnTicket> {
        let kind = *self.kinds.get(self.cursor)?;
        let ticket = SpawnTicket {
            kind,
            carries_bonus: self.bonus_slots.contains(&self.cursor),
        };
        self.cursor += 1;
        Some(ticket)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.kinds.len()
    }

    pub fn remaining(&self) -> usize {
        self.kinds.len().saturating_sub(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> &[BotKind] {
        &self.kinds
    }

    pub fn bonus_slots(&self) -> &[usize] {
        &self.bonus_slots
    }
}
