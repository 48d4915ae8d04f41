//! Data-driven game balance
//!
//! Every duration is in seconds and every rate is per second. Defaults match
//! the arcade feel; a JSON file may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Lives at the start of a run
    pub player_lives: u8,
    /// Extra-life bonus cap
    pub max_lives: u8,
    /// Base delay between player shots
    pub shooting_interval: f32,
    /// Immunity granted on (re)spawn
    pub respawn_immunity: f32,
    /// Time after (re)spawn during which the player can't act
    pub spawn_lock: f32,

    // === Bots ===
    pub max_bots: usize,
    /// Delay between bot spawns
    pub bot_spawn_interval: f32,
    /// Random columns tried per spawn attempt before waiting for the next tick
    pub spawn_attempts: u32,
    pub bot_shooting_interval: f32,
    /// Chance per second that an idle bot fires
    pub bot_shoot_rate: f32,
    /// Chance per second that a bot picks a new heading
    pub bot_turn_rate: f32,
    /// Chance that a new heading is a 90 degree turn
    pub bot_perpendicular_turn: f32,
    /// A bot blocked this long always picks a new heading
    pub bot_stuck_threshold: f32,

    // === Bonuses ===
    pub immunity_duration: f32,
    pub time_stop_duration: f32,
    pub hq_armor_duration: f32,
    /// Armor starts blinking this long after pickup
    pub hq_armor_blink_start: f32,
    pub hq_armor_blink_period: f32,

    // === Phases ===
    pub stage_title_duration: f32,
    pub stage_clear_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_lives: 2,
            max_lives: 9,
            shooting_interval: 0.2,
            respawn_immunity: 3.0,
            spawn_lock: 0.52,

            max_bots: 4,
            bot_spawn_interval: 3.0,
            spawn_attempts: 8,
            bot_shooting_interval: 0.2,
            bot_shoot_rate: 1.0,
            bot_turn_rate: 0.5,
            bot_perpendicular_turn: 0.7,
            bot_stuck_threshold: 0.3,

            immunity_duration: 10.0,
            time_stop_duration: 10.0,
            hq_armor_duration: 20.0,
            hq_armor_blink_start: 17.0,
            hq_armor_blink_period: 0.25,

            stage_title_duration: 3.0,
            stage_clear_delay: 3.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(0.0..=1.0).contains(&self.bot_perpendicular_turn) {
            return Err(TuningError::OutOfRange {
                field: "bot_perpendicular_turn",
                value: self.bot_perpendicular_turn,
            });
        }

        let non_negative = [
            ("shooting_interval", self.shooting_interval),
            ("respawn_immunity", self.respawn_immunity),
            ("spawn_lock", self.spawn_lock),
            ("bot_spawn_interval", self.bot_spawn_interval),
            ("bot_shooting_interval", self.bot_shooting_interval),
            ("bot_shoot_rate", self.bot_shoot_rate),
            ("bot_turn_rate", self.bot_turn_rate),
            ("bot_stuck_threshold", self.bot_stuck_threshold),
            ("stage_title_duration", self.stage_title_duration),
            ("stage_clear_delay", self.stage_clear_delay),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        let positive = [
            ("immunity_duration", self.immunity_duration),
            ("time_stop_duration", self.time_stop_duration),
            ("hq_armor_duration", self.hq_armor_duration),
            ("hq_armor_blink_period", self.hq_armor_blink_period),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        if self.hq_armor_blink_start > self.hq_armor_duration {
            return Err(TuningError::OutOfRange {
                field: "hq_armor_blink_start",
                value: self.hq_armor_blink_start,
            });
        }
        if self.max_bots == 0 {
            return Err(TuningError::OutOfRange {
                field: "max_bots",
                value: 0.0,
            });
        }
        if self.spawn_attempts == 0 {
            return Err(TuningError::OutOfRange {
                field: "spawn_attempts",
                value: 0.0,
            });
        }
        if self.max_lives < self.player_lives {
            return Err(TuningError::OutOfRange {
                field: "max_lives",
                value: f32::from(self.max_lives),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_bots": 6, "time_stop_duration": 4.5 }"#).unwrap();
        assert_eq!(tuning.max_bots, 6);
        assert_eq!(tuning.time_stop_duration, 4.5);
        assert_eq!(tuning.player_lives, 2);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = Tuning::from_json(r#"{ "bot_perpendicular_turn": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange { field: "bot_perpendicular_turn", .. }
        ));
        assert!(Tuning::from_json(r#"{ "max_bots": 0 }"#).is_err());
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let tuning = Tuning::default();
        let back = Tuning::from_json(&tuning.to_json().unwrap()).unwrap();
        assert_eq!(tuning, back);
    }
}
