// The current-value half of the resource. Every mutation re-reads the
// persisted value before clamping and writing; capacity is recomputed from
// scratch each time and never cached across operations.
use serde_json::json;

use crate::capacity;
use crate::category::{CategoryGroup, PowerCategory};
use crate::error::{EngineError, Result};
use crate::host::{ActorHost, int_flag, string_flag};
use crate::settings::WorldSettings;

/// Snapshot of one pool's derived state at the start of an operation.
#[derive(Debug, Clone, Copy)]
pub struct Pool {
    pub group: CategoryGroup,
    pub category: PowerCategory,
    pub capacity: u32,
    pub bonus: i64,
}

impl Pool {
    pub fn chargeless(&self) -> bool {
        self.capacity == 0
    }
}

/// Build the pool snapshot: read category and bonus flags, recompute capacity
/// from the actor facts and world settings.
pub async fn load_pool(
    actor: &dyn ActorHost,
    group: CategoryGroup,
    settings: WorldSettings,
) -> Pool {
    let keys = group.keys();
    let raw_type = string_flag(actor.get_flag(keys.power_type).await.as_ref());
    let category = PowerCategory::from_flag(raw_type.as_deref(), group);
    let bonus = int_flag(actor.get_flag(keys.bonus).await.as_ref()).unwrap_or(0);

    let facts = actor.facts();
    let capacity = capacity::max_charges(
        facts.kind,
        category,
        facts.level,
        facts.challenge_rating,
        bonus,
        settings.alternative_charges,
    );

    Pool {
        group,
        category,
        capacity,
        bonus,
    }
}

/// Current charges: persisted value clamped into [0, capacity], defaulting to
/// capacity when absent or unparseable.
pub async fn current_charges(actor: &dyn ActorHost, pool: &Pool) -> u32 {
    let stored = int_flag(actor.get_flag(pool.group.keys().current).await.as_ref());
    let raw = stored.unwrap_or(pool.capacity as i64);
    raw.clamp(0, pool.capacity as i64) as u32
}

/// Clamp and persist a new current value.
pub async fn write_current(actor: &dyn ActorHost, pool: &Pool, value: i64) -> Result<u32> {
    let clamped = value.clamp(0, pool.capacity as i64) as u32;
    actor
        .set_flag(pool.group.keys().current, json!(clamped))
        .await?;
    Ok(clamped)
}

/// Add `delta` to the current value. Pools at capacity 0 are untouched;
/// returns the new value otherwise.
pub async fn adjust(actor: &dyn ActorHost, pool: &Pool, delta: i64) -> Result<Option<u32>> {
    if pool.chargeless() {
        return Ok(None);
    }
    let current = current_charges(actor, pool).await as i64;
    let next = write_current(actor, pool, current + delta).await?;
    Ok(Some(next))
}

/// Debit `cost` charges, or fail without mutating when the pool is short.
pub async fn try_spend(actor: &dyn ActorHost, pool: &Pool, cost: u32) -> Result<u32> {
    let current = current_charges(actor, pool).await;
    if cost > current {
        return Err(EngineError::InsufficientCharges {
            required: cost,
            available: current,
        });
    }
    write_current(actor, pool, current as i64 - cost as i64).await
}

/// Long-rest regeneration amount in alternative mode.
pub fn regen_amount(category: PowerCategory, level: u32) -> u32 {
    let lvl = capacity::clamp_level(level);
    match category {
        PowerCategory::Logia | PowerCategory::HakiPurist => lvl,
        PowerCategory::Paramecia => lvl.div_ceil(2),
        PowerCategory::Zoan | PowerCategory::Haki => lvl.div_ceil(3),
    }
}

/// Long-rest refill. Standard mode resets to capacity; alternative mode adds
/// the category's regeneration amount, clamped. Capacity-0 pools are a no-op.
pub async fn refill(
    actor: &dyn ActorHost,
    pool: &Pool,
    settings: WorldSettings,
) -> Result<Option<u32>> {
    if pool.chargeless() {
        return Ok(None);
    }

    if !settings.alternative_charges {
        let next = write_current(actor, pool, pool.capacity as i64).await?;
        return Ok(Some(next));
    }

    let regain = regen_amount(pool.category, actor.facts().level) as i64;
    adjust(actor, pool, regain).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regen_amounts_by_category() {
        assert_eq!(regen_amount(PowerCategory::Logia, 10), 10);
        assert_eq!(regen_amount(PowerCategory::HakiPurist, 7), 7);
        assert_eq!(regen_amount(PowerCategory::Paramecia, 7), 4);
        assert_eq!(regen_amount(PowerCategory::Zoan, 7), 3);
        assert_eq!(regen_amount(PowerCategory::Haki, 10), 4);
    }
}
