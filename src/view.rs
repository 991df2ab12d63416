// The render contract: everything the host template needs to draw one pool
// tab, derived fresh from persisted state on every render.
use crate::casting::{self, CastingFormulas};
use crate::catalog;
use crate::capacity;
use crate::category::{CastingStat, CategoryGroup, ItemKind, PowerCategory};
use crate::host::{ActorHost, DocumentRef, string_flag};
use crate::ledger;
use crate::settings::WorldSettings;

/// One managed item as the template sees it.
#[derive(Debug, Clone)]
pub struct PowerView {
    pub id: DocumentRef,
    pub name: String,
    pub image: String,
    pub kind: ItemKind,
    pub charge_cost: u32,
    pub allow_upcast: bool,
    pub upcast_cost: u32,
    pub base_tier: u8,
}

#[derive(Debug, Clone)]
pub struct PoolView {
    pub group: CategoryGroup,
    pub category: PowerCategory,
    pub name: String,
    pub image: Option<String>,

    pub casting_stat: CastingStat,
    pub save_dc: i32,
    pub attack_bonus: i32,
    pub attack_signed: String,
    pub highest_tier: u8,

    pub show_charges: bool,
    pub current: u32,
    pub capacity: u32,
    /// Rounded fill percentage, 0 when the pool has no charge economy.
    pub charge_pct: u8,
    pub bonus: i64,

    pub spells: Vec<PowerView>,
    pub attacks: Vec<PowerView>,
    pub features: Vec<PowerView>,
    pub other: Vec<PowerView>,
    pub has_any: bool,
}

pub async fn pool_view(
    actor: &dyn ActorHost,
    group: CategoryGroup,
    settings: WorldSettings,
) -> PoolView {
    let keys = group.keys();
    let pool = ledger::load_pool(actor, group, settings).await;
    let facts = actor.facts();

    let name = string_flag(actor.get_flag(keys.name).await.as_ref())
        .unwrap_or_else(|| group.default_name().to_string());
    let image = string_flag(actor.get_flag(keys.image).await.as_ref());

    let stat = casting::casting_stat(actor, group).await;
    let CastingFormulas {
        save_dc,
        attack_bonus,
        ..
    } = casting::formulas_for(facts, stat, settings.attack_bonus_offset);

    let current = ledger::current_charges(actor, &pool).await;
    let show_charges = pool.capacity > 0;
    let charge_pct = if show_charges {
        ((current as f64 / pool.capacity as f64) * 100.0).round() as u8
    } else {
        0
    };

    let mut spells = Vec::new();
    let mut attacks = Vec::new();
    let mut features = Vec::new();
    let mut other = Vec::new();
    let mut has_any = false;
    for item in catalog::managed_items(actor, group).await {
        has_any = true;
        let cost = catalog::read_cost(item.as_ref()).await;
        let entry = PowerView {
            id: item.id().clone(),
            name: item.name(),
            image: item.image(),
            kind: item.kind(),
            charge_cost: cost.charge_cost,
            allow_upcast: cost.allow_upcast,
            upcast_cost: cost.upcast_cost,
            base_tier: item.base_tier(),
        };
        match entry.kind {
            ItemKind::Spell => spells.push(entry),
            ItemKind::Weapon => attacks.push(entry),
            ItemKind::Feature => features.push(entry),
            ItemKind::Other => other.push(entry),
        }
    }

    PoolView {
        group,
        category: pool.category,
        name,
        image,
        casting_stat: stat,
        save_dc,
        attack_bonus,
        attack_signed: casting::signed(attack_bonus),
        highest_tier: capacity::highest_tier(pool.category, facts.level),
        show_charges,
        current,
        capacity: pool.capacity,
        charge_pct,
        bonus: pool.bonus,
        spells,
        attacks,
        features,
        other,
        has_any,
    }
}
