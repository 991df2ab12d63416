// Orchestration: wires settings, prompts and notifications into the
// operation set and keeps every open presentation consistent by re-rendering
// after each mutation.
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::casting;
use crate::catalog::{self, CostConfig, CostPrompt};
use crate::category::{CastingStat, CategoryGroup, ItemKind, PowerCategory};
use crate::error::{EngineError, Result};
use crate::host::{
    ActorHost, DropDocument, ItemHost, Notifier, Prompter, SettingsSource, UserContext,
};
use crate::ledger;
use crate::resolver::{self, UseOutcome};
use crate::rest::{Clock, DEFAULT_DEBOUNCE, RefillGuard, RestEvent, SystemClock};
use crate::view::{self, PoolView};

pub struct ChargeEngine {
    settings: Arc<dyn SettingsSource>,
    prompter: Arc<dyn Prompter>,
    notifier: Arc<dyn Notifier>,
    refill_guard: RefillGuard,
}

impl ChargeEngine {
    pub fn new(
        settings: Arc<dyn SettingsSource>,
        prompter: Arc<dyn Prompter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_clock(settings, prompter, notifier, SystemClock)
    }

    /// Injectable clock for the rest debounce window.
    pub fn with_clock(
        settings: Arc<dyn SettingsSource>,
        prompter: Arc<dyn Prompter>,
        notifier: Arc<dyn Notifier>,
        clock: impl Clock + 'static,
    ) -> Self {
        ChargeEngine {
            settings,
            prompter,
            notifier,
            refill_guard: RefillGuard::new(clock, DEFAULT_DEBOUNCE),
        }
    }

    /// Build the view model for one pool tab. Before rendering, casting
    /// formulas are lazily re-synced if the pool's attribute changed out of
    /// band since the last push. A failed sync must not break the render
    /// path: it is logged and the tab still draws from persisted state.
    pub async fn render(&self, actor: &dyn ActorHost, group: CategoryGroup) -> Result<PoolView> {
        let settings = self.settings.world();
        match casting::sync_if_stale(actor, group, settings.attack_bonus_offset).await {
            Ok(true) => actor.rerender(),
            Ok(false) => {}
            Err(e) => {
                warn!(actor = %actor.facts().id, error = %e, "casting sync failed, rendering anyway");
            }
        }
        Ok(view::pool_view(actor, group, settings).await)
    }

    /// Manual +/- adjustment from the tab. No-op on capacity-0 pools.
    pub async fn adjust_charges(
        &self,
        actor: &dyn ActorHost,
        group: CategoryGroup,
        delta: i64,
    ) -> Result<Option<u32>> {
        let pool = ledger::load_pool(actor, group, self.settings.world()).await;
        let next = ledger::adjust(actor, &pool, delta).await?;
        if next.is_some() {
            actor.rerender();
        }
        Ok(next)
    }

    /// Refill one pool as if a long rest completed now (bypasses the
    /// debounce; used by GM tooling).
    pub async fn refill(&self, actor: &dyn ActorHost, group: CategoryGroup) -> Result<Option<u32>> {
        let settings = self.settings.world();
        let pool = ledger::load_pool(actor, group, settings).await;
        let next = ledger::refill(actor, &pool, settings).await?;
        if next.is_some() {
            actor.rerender();
        }
        Ok(next)
    }

    /// Entry point for both rest-completion hook names the host emits.
    /// Short rests never refill; duplicate long-rest deliveries inside the
    /// debounce window are suppressed. Returns whether a refill ran.
    pub async fn on_rest_completed(
        &self,
        actor: &dyn ActorHost,
        event: RestEvent,
    ) -> Result<bool> {
        if !event.is_long() {
            return Ok(false);
        }
        if self.refill_guard.should_suppress(&actor.facts().id).await {
            debug!(actor = %actor.facts().id, "duplicate long-rest signal suppressed");
            return Ok(false);
        }
        self.refill(actor, CategoryGroup::Fruit).await?;
        self.refill(actor, CategoryGroup::Haki).await?;
        Ok(true)
    }

    /// Use a managed power: effective cost, charge gate, debit, activation.
    pub async fn use_power(
        &self,
        actor: &dyn ActorHost,
        item: &dyn ItemHost,
        group: CategoryGroup,
    ) -> Result<UseOutcome> {
        resolver::use_power(
            actor,
            item,
            group,
            self.settings.world(),
            self.prompter.as_ref(),
            self.notifier.as_ref(),
        )
        .await
    }

    /// Change the pool's power category and re-clamp the current charges
    /// against the new capacity.
    pub async fn set_category(
        &self,
        actor: &dyn ActorHost,
        group: CategoryGroup,
        next: PowerCategory,
    ) -> Result<()> {
        let keys = group.keys();
        actor
            .set_flag(keys.power_type, json!(next.to_string()))
            .await?;

        let pool = ledger::load_pool(actor, group, self.settings.world()).await;
        let current = ledger::current_charges(actor, &pool).await;
        ledger::write_current(actor, &pool, current as i64).await?;
        actor.rerender();
        Ok(())
    }

    /// Change the pool's casting attribute and push the new formulas into
    /// every managed item immediately.
    pub async fn set_casting_stat(
        &self,
        actor: &dyn ActorHost,
        group: CategoryGroup,
        next: CastingStat,
    ) -> Result<()> {
        let keys = group.keys();
        let offset = self.settings.world().attack_bonus_offset;
        actor
            .set_flag(keys.casting_stat, json!(next.to_string()))
            .await?;
        casting::apply_stat_to_managed(actor, group, next, offset).await?;
        actor
            .set_flag(keys.last_synced, json!(next.to_string()))
            .await?;
        actor.rerender();
        Ok(())
    }

    /// Interactive bonus-charge entry. Returns false when cancelled.
    pub async fn edit_bonus_charges(
        &self,
        actor: &dyn ActorHost,
        group: CategoryGroup,
    ) -> Result<bool> {
        let pool = ledger::load_pool(actor, group, self.settings.world()).await;
        let Some(next) = self.prompter.bonus_charges(pool.bonus).await else {
            return Ok(false);
        };
        self.set_bonus_charges(actor, group, next).await?;
        Ok(true)
    }

    /// Apply a new bonus-charge adjustment. When a chargeless category's
    /// capacity crosses from 0 to positive, the pool fills rather than
    /// clamping a stale 0.
    pub async fn set_bonus_charges(
        &self,
        actor: &dyn ActorHost,
        group: CategoryGroup,
        next: i64,
    ) -> Result<()> {
        let settings = self.settings.world();
        let before = ledger::load_pool(actor, group, settings).await;

        actor.set_flag(group.keys().bonus, json!(next)).await?;

        let after = ledger::load_pool(actor, group, settings).await;
        let mut current = ledger::current_charges(actor, &after).await;
        if after.category.chargeless() && before.capacity == 0 && after.capacity > 0 {
            current = after.capacity;
        }
        ledger::write_current(actor, &after, current as i64).await?;
        actor.rerender();
        Ok(())
    }

    /// Re-run the cost configuration dialog for a managed item. Returns
    /// false when the item is unmanaged or the dialog was cancelled.
    pub async fn configure_item_cost(
        &self,
        actor: &dyn ActorHost,
        item: &dyn ItemHost,
    ) -> Result<bool> {
        let Some(group) = catalog::managed_group(item).await else {
            return Ok(false);
        };
        let pool = ledger::load_pool(actor, group, self.settings.world()).await;
        let is_spell = item.kind() == ItemKind::Spell;

        let prompt = CostPrompt {
            item_name: item.name(),
            defaults: catalog::read_cost(item).await,
            is_spell,
            chargeless_category: pool.category.chargeless().then_some(pool.category),
        };
        let Some(cost) = self.prompter.cost_config(prompt).await else {
            return Ok(false);
        };

        let cost = cost.sanitized(is_spell, pool.category.chargeless());
        catalog::write_cost(item, cost).await?;
        actor.rerender();
        Ok(true)
    }

    /// Remove a managed item. Only the owning actor's items can be removed;
    /// anything else is a no-op.
    pub async fn remove_item(&self, actor: &dyn ActorHost, item: &dyn ItemHost) -> Result<bool> {
        if item.owner() != Some(&actor.facts().id) {
            return Ok(false);
        }
        item.delete().await?;
        actor.rerender();
        Ok(true)
    }

    /// GM-only: set the pool's display name and image from a dropped
    /// reference image page.
    pub async fn handle_power_drop(
        &self,
        actor: &dyn ActorHost,
        group: CategoryGroup,
        drop: Option<DropDocument>,
        user: &UserContext,
    ) -> Result<()> {
        if !user.is_gm {
            self.notifier.warn("Only the GM can set the image/name.");
            return Err(EngineError::PermissionDenied(
                "setting the pool display requires GM rights".into(),
            ));
        }

        // Unresolvable payloads are a no-op, not an error.
        let Some(drop) = drop else { return Ok(()) };

        let (name, src) = match drop {
            DropDocument::ImagePage { name, src } => (name, src),
            DropDocument::Item(_) | DropDocument::Other { .. } => {
                self.notifier
                    .warn("Drop an Image Journal Page (not a text page).");
                return Err(EngineError::InvalidDropSource(
                    "expected an image journal page".into(),
                ));
            }
        };
        let Some(src) = src else {
            self.notifier.warn("That image page has no src.");
            return Err(EngineError::InvalidDropSource(
                "image page has no source".into(),
            ));
        };

        let keys = group.keys();
        actor.set_flag(keys.image, json!(src)).await?;
        let display = if name.is_empty() {
            group.default_name().to_string()
        } else {
            name
        };
        actor.set_flag(keys.name, json!(display)).await?;
        actor.rerender();
        Ok(())
    }

    /// Adopt a dropped reference item into the pool: duplicate it, tag it,
    /// configure its cost, and push the pool's casting formulas into it.
    /// Returns the created item, or None when the drop was a no-op.
    pub async fn handle_item_drop(
        &self,
        actor: &dyn ActorHost,
        group: CategoryGroup,
        drop: Option<DropDocument>,
        user: &UserContext,
    ) -> Result<Option<Arc<dyn ItemHost>>> {
        let Some(DropDocument::Item(source)) = drop else {
            return Ok(None);
        };

        // Re-dropping one of this actor's own managed items is a no-op.
        if source.owner() == Some(&actor.facts().id) && catalog::is_managed(source.as_ref()).await
        {
            return Ok(None);
        }

        let created = actor.adopt_item(source.as_ref()).await?;
        catalog::tag_as_managed(created.as_ref(), group, source.id()).await?;

        let settings = self.settings.world();
        let pool = ledger::load_pool(actor, group, settings).await;
        if pool.category.chargeless() {
            catalog::write_cost(created.as_ref(), CostConfig::FREE).await?;
        } else {
            let is_spell = created.kind() == ItemKind::Spell;
            let prompt = CostPrompt {
                item_name: created.name(),
                defaults: CostConfig::new_item_defaults(),
                is_spell,
                chargeless_category: None,
            };
            if let Some(cost) = self.prompter.cost_config(prompt).await {
                catalog::write_cost(created.as_ref(), cost.sanitized(is_spell, false)).await?;
            }
        }

        let stat = casting::casting_stat(actor, group).await;
        casting::apply_stat_to_managed(actor, group, stat, settings.attack_bonus_offset).await?;
        actor
            .set_flag(group.keys().last_synced, json!(stat.to_string()))
            .await?;

        actor.rerender();
        if user.is_gm {
            created.open_sheet();
        }
        Ok(Some(created))
    }
}
