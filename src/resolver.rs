// Cast/use resolution: effective cost (upcast included), the charge gate,
// the debit, and the hand-off to the item's own activation behavior.
use tracing::warn;

use crate::capacity;
use crate::catalog;
use crate::category::{CategoryGroup, ItemKind};
use crate::error::{EngineError, Result};
use crate::host::{ActivationOptions, ActorHost, ItemHost, Notifier, Prompter};
use crate::ledger;
use crate::settings::WorldSettings;

/// What happened when a power was used. Host failures are the only `Err`
/// path; rule-level outcomes are data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseOutcome {
    Activated { tier: Option<u8>, spent: u32 },
    /// Activation threw after a successful debit. The charge stays spent:
    /// at-least-once-charged semantics, surfaced to the user with the item
    /// sheet as a fallback path.
    ActivationFailed { tier: Option<u8>, spent: u32 },
    InsufficientCharges { required: u32, available: u32 },
    Cancelled,
}

pub async fn use_power(
    actor: &dyn ActorHost,
    item: &dyn ItemHost,
    group: CategoryGroup,
    settings: WorldSettings,
    prompter: &dyn Prompter,
    notifier: &dyn Notifier,
) -> Result<UseOutcome> {
    let pool = ledger::load_pool(actor, group, settings).await;
    let cost = catalog::read_cost(item).await;

    let mut chosen_tier = None;
    let mut total_cost = cost.charge_cost;

    // Capacity 0 means the category has no charge economy; skip all
    // accounting and go straight to activation.
    if !pool.chargeless() {
        if item.kind() == ItemKind::Spell {
            let base_tier = item.base_tier();
            if cost.allow_upcast {
                let highest = capacity::highest_tier(pool.category, actor.facts().level);
                let tier = match choose_tier(prompter, item, base_tier, highest).await {
                    Some(tier) => tier,
                    None => return Ok(UseOutcome::Cancelled),
                };
                chosen_tier = Some(tier);
                total_cost += u32::from(tier.saturating_sub(base_tier)) * cost.upcast_cost;
            } else {
                chosen_tier = Some(base_tier);
            }
        }

        match ledger::try_spend(actor, &pool, total_cost).await {
            Ok(_) => actor.rerender(),
            Err(EngineError::InsufficientCharges {
                required,
                available,
            }) => {
                notifier.warn(&format!(
                    "Not enough charges. Need {required}, have {available}."
                ));
                return Ok(UseOutcome::InsufficientCharges {
                    required,
                    available,
                });
            }
            Err(e) => return Err(e),
        }
    } else {
        total_cost = 0;
    }

    let options = ActivationOptions { chosen_tier };
    if let Err(e) = item.activate(options).await {
        warn!(item = %item.name(), error = %e, "activation failed, opening sheet instead");
        notifier.warn(&format!(
            "{} could not be activated; opening its sheet instead.",
            item.name()
        ));
        item.open_sheet();
        return Ok(UseOutcome::ActivationFailed {
            tier: chosen_tier,
            spent: total_cost,
        });
    }

    Ok(UseOutcome::Activated {
        tier: chosen_tier,
        spent: total_cost,
    })
}

/// Pick the effective tier for an upcastable spell. Cantrips (base tier 0)
/// are cast as-is without a prompt; otherwise the choice runs from the base
/// tier up to the pool's highest usable tier.
async fn choose_tier(
    prompter: &dyn Prompter,
    item: &dyn ItemHost,
    base_tier: u8,
    highest_tier: u8,
) -> Option<u8> {
    if base_tier == 0 {
        return Some(0);
    }
    let top = highest_tier.max(base_tier);
    prompter
        .upcast_tier(&item.name(), base_tier, top)
        .await
        .map(|tier| tier.clamp(base_tier, top))
}
