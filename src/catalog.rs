// Managed power items: tagging, inventory filtering, and cost metadata.
// Items reference their pool by the category tag stored on the item; the host
// platform has no native index to lean on.
use serde_json::json;
use std::sync::Arc;

use crate::category::{CategoryGroup, PowerCategory};
use crate::error::Result;
use crate::host::{ActorHost, DocumentRef, ItemHost, bool_flag, int_flag, string_flag};

// Item flag keys.
pub const FLAG_MANAGED: &str = "managed";
pub const FLAG_CATEGORY: &str = "category";
pub const FLAG_CHARGE_COST: &str = "chargeCost";
pub const FLAG_ALLOW_UPCAST: &str = "allowUpcast";
pub const FLAG_UPCAST_COST: &str = "upcastCost";
pub const FLAG_SOURCE_UUID: &str = "sourceUuid";

// Legacy keys from earlier deployments, honored on read only.
const LEGACY_MANAGED: &str = "dfManaged";
const LEGACY_FRUIT: &str = "devilFruit";
const LEGACY_HAKI: &str = "haki";

/// Per-item cost metadata, persisted as three flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostConfig {
    pub charge_cost: u32,
    pub allow_upcast: bool,
    pub upcast_cost: u32,
}

impl CostConfig {
    pub const FREE: CostConfig = CostConfig {
        charge_cost: 0,
        allow_upcast: false,
        upcast_cost: 0,
    };

    /// Prompt defaults for a freshly adopted item.
    pub fn new_item_defaults() -> Self {
        CostConfig {
            charge_cost: 1,
            allow_upcast: false,
            upcast_cost: 1,
        }
    }

    /// Force the invariants the prompt cannot express: non-spell items never
    /// upcast, chargeless categories carry no cost at all.
    pub fn sanitized(self, is_spell: bool, chargeless: bool) -> Self {
        if chargeless {
            return CostConfig::FREE;
        }
        if is_spell {
            self
        } else {
            CostConfig {
                charge_cost: self.charge_cost,
                allow_upcast: false,
                upcast_cost: 0,
            }
        }
    }
}

/// Everything the host dialog needs to show the cost form.
#[derive(Debug, Clone)]
pub struct CostPrompt {
    pub item_name: String,
    pub defaults: CostConfig,
    /// Upcast fields only make sense for spells.
    pub is_spell: bool,
    /// Set when the owning pool's category ignores charges, so the dialog can
    /// note that the cost will not be charged.
    pub chargeless_category: Option<PowerCategory>,
}

/// Which pool group a managed item draws from, or None for unmanaged items.
/// The explicit `category` tag wins; legacy boolean tags default to fruit.
pub async fn managed_group(item: &dyn ItemHost) -> Option<CategoryGroup> {
    let category = string_flag(item.get_flag(FLAG_CATEGORY).await.as_ref());
    let legacy_haki = bool_flag(item.get_flag(LEGACY_HAKI).await.as_ref());
    let managed = bool_flag(item.get_flag(FLAG_MANAGED).await.as_ref())
        || bool_flag(item.get_flag(LEGACY_MANAGED).await.as_ref())
        || bool_flag(item.get_flag(LEGACY_FRUIT).await.as_ref())
        || legacy_haki;
    if !managed {
        return None;
    }
    match category.as_deref() {
        Some("haki") => Some(CategoryGroup::Haki),
        Some("fruit") => Some(CategoryGroup::Fruit),
        _ if legacy_haki => Some(CategoryGroup::Haki),
        _ => Some(CategoryGroup::Fruit),
    }
}

pub async fn is_managed(item: &dyn ItemHost) -> bool {
    managed_group(item).await.is_some()
}

/// The actor's inventory filtered down to one pool's managed entries.
pub async fn managed_items(
    actor: &dyn ActorHost,
    group: CategoryGroup,
) -> Vec<Arc<dyn ItemHost>> {
    let mut out = Vec::new();
    for item in actor.items().await {
        if managed_group(item.as_ref()).await == Some(group) {
            out.push(item);
        }
    }
    out
}

/// Read cost metadata, defaulting absent or malformed flags to zero.
pub async fn read_cost(item: &dyn ItemHost) -> CostConfig {
    CostConfig {
        charge_cost: int_flag(item.get_flag(FLAG_CHARGE_COST).await.as_ref()).unwrap_or(0).max(0)
            as u32,
        allow_upcast: bool_flag(item.get_flag(FLAG_ALLOW_UPCAST).await.as_ref()),
        upcast_cost: int_flag(item.get_flag(FLAG_UPCAST_COST).await.as_ref()).unwrap_or(0).max(0)
            as u32,
    }
}

pub async fn write_cost(item: &dyn ItemHost, cost: CostConfig) -> Result<()> {
    item.set_flag(FLAG_CHARGE_COST, json!(cost.charge_cost)).await?;
    item.set_flag(FLAG_ALLOW_UPCAST, json!(cost.allow_upcast)).await?;
    item.set_flag(FLAG_UPCAST_COST, json!(cost.upcast_cost)).await?;
    Ok(())
}

/// Mark an adopted item as belonging to a pool group and record where it was
/// copied from. Idempotent.
pub async fn tag_as_managed(
    item: &dyn ItemHost,
    group: CategoryGroup,
    source: &DocumentRef,
) -> Result<()> {
    item.set_flag(FLAG_MANAGED, json!(true)).await?;
    item.set_flag(FLAG_CATEGORY, json!(group.to_string())).await?;
    item.set_flag(FLAG_SOURCE_UUID, json!(source.0)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_forces_non_spell_invariants() {
        let cfg = CostConfig {
            charge_cost: 3,
            allow_upcast: true,
            upcast_cost: 2,
        };
        let sanitized = cfg.sanitized(false, false);
        assert_eq!(sanitized.charge_cost, 3);
        assert!(!sanitized.allow_upcast);
        assert_eq!(sanitized.upcast_cost, 0);
    }

    #[test]
    fn sanitize_zeroes_chargeless_categories() {
        let cfg = CostConfig {
            charge_cost: 3,
            allow_upcast: true,
            upcast_cost: 2,
        };
        assert_eq!(cfg.sanitized(true, true), CostConfig::FREE);
    }

    #[test]
    fn spells_keep_their_upcast_settings() {
        let cfg = CostConfig {
            charge_cost: 2,
            allow_upcast: true,
            upcast_cost: 1,
        };
        assert_eq!(cfg.sanitized(true, false), cfg);
    }
}
