//! Simultaneous movement resolution
//!
//! Every tank proposes a move against the positions all tanks held at the
//! start of the tick. The resolver then settles the proposals so that no two
//! tanks overlap and none ends up inside impassable terrain, independent of
//! the order the proposals are listed in.

use glam::Vec2;

use super::grid::Grid;
use super::tank::{MoveResult, TankId, tank_rect};

/// One tank's proposal for this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePlan {
    pub tank: TankId,
    /// Position at the start of the tick
    pub from: Vec2,
    pub result: MoveResult,
}

impl MovePlan {
    pub fn new(tank: TankId, from: Vec2, result: MoveResult) -> Self {
        Self { tank, from, result }
    }

    /// Where the tank ends up if the verdict stands
    pub fn settled(&self) -> Vec2 {
        self.result.settled(self.from)
    }

    fn moves(&self) -> bool {
        self.settled() != self.from
    }

    /// Stay exactly where the tick started, skipping the grid rounding of a blocked move
    fn pin(&mut self) {
        self.result = MoveResult::stay(self.from, self.result.direction);
    }
}

/// Settle every plan in place
pub fn resolve_movement(grid: &Grid, plans: &mut [MovePlan]) {
    // Terrain
    for plan in plans.iter_mut() {
        if plan.result.new_pos != plan.from && grid.blocks_tank(tank_rect(plan.result.new_pos)) {
            plan.result.can_move = false;
        }
    }

    // Tanks as they stood when the tick began
    let current: Vec<_> = plans.iter().map(|p| tank_rect(p.from)).collect();
    for (i, plan) in plans.iter_mut().enumerate() {
        if !plan.result.can_move || plan.result.new_pos == plan.from {
            continue;
        }
        let candidate = tank_rect(plan.result.new_pos);
        if current
            .iter()
            .enumerate()
            .any(|(j, rect)| j != i && candidate.intersects(rect))
        {
            plan.result.can_move = false;
        }
    }

    // A blocked tank still slides along its cross axis; that slide must be legal too
    for plan in plans.iter_mut() {
        if !plan.result.can_move && plan.moves() && grid.blocks_tank(tank_rect(plan.settled())) {
            plan.pin();
        }
    }

    // Two tanks may still claim the same gap. Pin every claimant and repeat
    // until the settled positions are pairwise clear.
    loop {
        let settled: Vec<_> = plans.iter().map(|p| tank_rect(p.settled())).collect();
        let clashing: Vec<usize> = (0..plans.len())
            .filter(|&i| {
                plans[i].moves()
                    && settled
                        .iter()
                        .enumerate()
                        .any(|(j, rect)| j != i && settled[i].intersects(rect))
            })
            .collect();
        if clashing.is_empty() {
            break;
        }
        for i in clashing {
            plans[i].pin();
        }
    }
}
