//! Game rule configuration: room capacity, starting rolls and combat numbers.

use super::defaults::{
    default_attack_ammo_cost, default_attack_requires_same_room, default_initial_ammo_max,
    default_initial_ammo_min, default_initial_guns_max, default_initial_guns_min,
    default_max_players_per_room, default_spawn_height, default_spawn_width,
    default_steal_ammo_cap, default_steal_gun_cap,
};
use serde::{Deserialize, Serialize};

/// Game configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GameConfig {
    /// Maximum members per room
    #[serde(default = "default_max_players_per_room")]
    pub max_players_per_room: usize,
    /// Inclusive range for the starting gun roll
    #[serde(default = "default_initial_guns_min")]
    pub initial_guns_min: u32,
    #[serde(default = "default_initial_guns_max")]
    pub initial_guns_max: u32,
    /// Inclusive range for the starting ammo roll
    #[serde(default = "default_initial_ammo_min")]
    pub initial_ammo_min: u32,
    #[serde(default = "default_initial_ammo_max")]
    pub initial_ammo_max: u32,
    /// Spawn box; positions are drawn from `[0, width) x [0, height)`
    #[serde(default = "default_spawn_width")]
    pub spawn_width: f64,
    #[serde(default = "default_spawn_height")]
    pub spawn_height: f64,
    /// Most guns a single steal can take
    #[serde(default = "default_steal_gun_cap")]
    pub steal_gun_cap: u32,
    /// Most ammo a single steal can take
    #[serde(default = "default_steal_ammo_cap")]
    pub steal_ammo_cap: u32,
    /// Ammo spent per attack
    #[serde(default = "default_attack_ammo_cost")]
    pub attack_ammo_cost: u32,
    /// Reject attacks across rooms. Off by default to match existing clients.
    #[serde(default = "default_attack_requires_same_room")]
    pub attack_requires_same_room: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players_per_room: default_max_players_per_room(),
            initial_guns_min: default_initial_guns_min(),
            initial_guns_max: default_initial_guns_max(),
            initial_ammo_min: default_initial_ammo_min(),
            initial_ammo_max: default_initial_ammo_max(),
            spawn_width: default_spawn_width(),
            spawn_height: default_spawn_height(),
            steal_gun_cap: default_steal_gun_cap(),
            steal_ammo_cap: default_steal_ammo_cap(),
            attack_ammo_cost: default_attack_ammo_cost(),
            attack_requires_same_room: default_attack_requires_same_room(),
        }
    }
}

impl GameConfig {
    /// Validate value ranges that serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_players_per_room == 0 {
            anyhow::bail!("game.max_players_per_room must be at least 1");
        }
        if self.initial_guns_min > self.initial_guns_max {
            anyhow::bail!(
                "game.initial_guns_min ({}) must not exceed game.initial_guns_max ({})",
                self.initial_guns_min,
                self.initial_guns_max
            );
        }
        if self.initial_ammo_min > self.initial_ammo_max {
            anyhow::bail!(
                "game.initial_ammo_min ({}) must not exceed game.initial_ammo_max ({})",
                self.initial_ammo_min,
                self.initial_ammo_max
            );
        }
        if !(self.spawn_width.is_finite() && self.spawn_width > 0.0)
            || !(self.spawn_height.is_finite() && self.spawn_height > 0.0)
        {
            anyhow::bail!(
                "game.spawn_width and game.spawn_height must be positive (configured: {}x{})",
                self.spawn_width,
                self.spawn_height
            );
        }
        Ok(())
    }
}
