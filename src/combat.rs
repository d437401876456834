//! Steal, attack and move resolution.
//!
//! These functions validate against the current records and then apply the
//! change through [`PlayerRegistry::mutate`]. They do not lock anything
//! themselves: the caller holds the actor's room lock so that the two-record
//! updates of a steal are not interleaved with another action in that room.

use crate::config::GameConfig;
use crate::error::GameError;
use crate::protocol::{Inventory, Player, PlayerId, Position, Stolen};
use crate::registry::PlayerRegistry;

/// Records after a steal, plus what changed hands.
#[derive(Debug, Clone, PartialEq)]
pub struct StealOutcome {
    pub thief: Player,
    pub target: Player,
    pub stolen: Stolen,
}

/// Records after an attack.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub attacker: Player,
    pub target: Player,
}

/// How much a steal takes from `target`: each resource capped independently.
pub fn steal_amounts(target: Inventory, rules: &GameConfig) -> Stolen {
    Stolen {
        guns: target.guns.min(rules.steal_gun_cap),
        ammo: target.ammo.min(rules.steal_ammo_cap),
    }
}

/// Move capped guns and ammo from `target_id` to `thief_id`.
///
/// A target with nothing to take still succeeds, with zero stolen.
pub fn resolve_steal(
    players: &PlayerRegistry,
    rules: &GameConfig,
    thief_id: &PlayerId,
    target_id: &PlayerId,
) -> Result<StealOutcome, GameError> {
    let thief = players.get(thief_id)?;
    let target = players.get(target_id)?;
    if thief.room != target.room {
        return Err(GameError::SameRoomViolation);
    }

    let stolen = steal_amounts(target.inventory, rules);

    // Applied as deltas so a self-steal nets to zero
    players.mutate(target_id, |p| {
        p.inventory.guns = p.inventory.guns.saturating_sub(stolen.guns);
        p.inventory.ammo = p.inventory.ammo.saturating_sub(stolen.ammo);
    })?;
    players.mutate(thief_id, |p| {
        p.inventory.guns = p.inventory.guns.saturating_add(stolen.guns);
        p.inventory.ammo = p.inventory.ammo.saturating_add(stolen.ammo);
    })?;

    Ok(StealOutcome {
        thief: players.get(thief_id)?,
        target: players.get(target_id)?,
        stolen,
    })
}

/// Spend ammo on `target_id`. The target's record is not changed.
pub fn resolve_attack(
    players: &PlayerRegistry,
    rules: &GameConfig,
    attacker_id: &PlayerId,
    target_id: &PlayerId,
) -> Result<AttackOutcome, GameError> {
    let attacker = players.get(attacker_id)?;
    let target = players.get(target_id)?;
    if rules.attack_requires_same_room && attacker.room != target.room {
        return Err(GameError::SameRoomViolation);
    }
    if !attacker.inventory.can_attack() {
        return Err(GameError::InsufficientResources);
    }

    players.mutate(attacker_id, |p| {
        p.inventory.ammo = p.inventory.ammo.saturating_sub(rules.attack_ammo_cost);
    })?;

    Ok(AttackOutcome {
        attacker: players.get(attacker_id)?,
        target: players.get(target_id)?,
    })
}

/// Overwrite the player's position. No bounds are applied.
pub fn resolve_move(
    players: &PlayerRegistry,
    player_id: &PlayerId,
    x: f64,
    y: f64,
) -> Result<Player, GameError> {
    players.mutate(player_id, |p| {
        p.position = Position::new(x, y);
        p.clone()
    })
}
