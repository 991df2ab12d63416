// Casting-attribute math: numeric save DC / attack bonus for the rendered
// tab, plus the roll-data formula strings pushed into managed items.
use serde_json::json;
use tracing::warn;

use crate::catalog;
use crate::category::{CastingStat, CategoryGroup};
use crate::error::Result;
use crate::host::{ActorFacts, ActorHost, string_flag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastingFormulas {
    pub save_dc: i32,
    pub attack_bonus: i32,
    pub dc_formula: String,
    pub attack_formula: String,
}

impl CastingFormulas {
    pub fn attack_signed(&self) -> String {
        signed(self.attack_bonus)
    }
}

pub fn signed(n: i32) -> String {
    if n >= 0 { format!("+{n}") } else { format!("{n}") }
}

/// Half the challenge rating, rounded up, floored at 1. Stands in for
/// proficiency + modifier when an NPC casts off willpower.
pub fn npc_cr_half_up_min1(cr: f64) -> i32 {
    ((cr / 2.0).ceil() as i32).max(1)
}

fn half_up_formula(var_path: &str) -> String {
    format!("floor(({var_path} + 1) / 2)")
}

/// Compute DC and attack for one casting attribute. The attack offset is a
/// per-deployment constant from world settings.
pub fn formulas_for(facts: &ActorFacts, stat: CastingStat, attack_offset: i32) -> CastingFormulas {
    if stat == CastingStat::Willpower {
        if facts.kind.is_npc() {
            let half = npc_cr_half_up_min1(facts.challenge_rating);
            return CastingFormulas {
                save_dc: 10 + half,
                attack_bonus: attack_offset + half,
                dc_formula: format!("10 + {half}"),
                attack_formula: format!("{attack_offset} + {half}"),
            };
        }

        let half_up = (facts.willpower_total + 1).div_euclid(2);
        let formula = half_up_formula("@willpower.total");
        return CastingFormulas {
            save_dc: 10 + half_up,
            attack_bonus: attack_offset + half_up,
            dc_formula: format!("10 + {formula}"),
            attack_formula: format!("{attack_offset} + {formula}"),
        };
    }

    let modifier = facts.abilities.modifier(stat).unwrap_or(0);
    CastingFormulas {
        save_dc: 10 + facts.proficiency + modifier,
        attack_bonus: attack_offset + facts.proficiency + modifier,
        dc_formula: format!("10 + @prof + @abilities.{stat}.mod"),
        attack_formula: format!("{attack_offset} + @prof + @abilities.{stat}.mod"),
    }
}

/// Read the pool's configured casting attribute.
pub async fn casting_stat(actor: &dyn ActorHost, group: CategoryGroup) -> CastingStat {
    let raw = string_flag(actor.get_flag(group.keys().casting_stat).await.as_ref());
    CastingStat::from_flag(raw.as_deref())
}

/// Push the given attribute's formulas into every managed item of the pool.
/// Per-item failures are logged and skipped; one broken item must not stall
/// the rest.
pub async fn apply_stat_to_managed(
    actor: &dyn ActorHost,
    group: CategoryGroup,
    stat: CastingStat,
    attack_offset: i32,
) -> Result<()> {
    let formulas = formulas_for(actor.facts(), stat, attack_offset);
    for item in catalog::managed_items(actor, group).await {
        if let Err(e) = item.apply_casting_formulas(&formulas).await {
            warn!(item = %item.name(), error = %e, "failed to apply casting formulas");
        }
    }
    Ok(())
}

/// Lazy propagation: if the last-synced marker differs from the configured
/// attribute, re-apply formulas once and update the marker. Returns whether
/// anything was pushed. Idempotent; the second call in a row is a no-op.
pub async fn sync_if_stale(
    actor: &dyn ActorHost,
    group: CategoryGroup,
    attack_offset: i32,
) -> Result<bool> {
    let keys = group.keys();
    let desired = casting_stat(actor, group).await;
    let last = string_flag(actor.get_flag(keys.last_synced).await.as_ref());

    if last.as_deref() == Some(desired.to_string().as_str()) {
        return Ok(false);
    }

    apply_stat_to_managed(actor, group, desired, attack_offset).await?;
    actor
        .set_flag(keys.last_synced, json!(desired.to_string()))
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ActorKind;
    use crate::host::{AbilityMods, DocumentRef};

    fn facts(kind: ActorKind, cr: f64) -> ActorFacts {
        ActorFacts {
            id: DocumentRef::new("Actor.test"),
            kind,
            level: 5,
            challenge_rating: cr,
            proficiency: 3,
            abilities: AbilityMods {
                cha: 4,
                wis: 1,
                ..Default::default()
            },
            willpower_total: 7,
        }
    }

    #[test]
    fn standard_attribute_formulas() {
        let f = formulas_for(&facts(ActorKind::Character, 0.0), CastingStat::Cha, 2);
        assert_eq!(f.save_dc, 17);
        assert_eq!(f.attack_bonus, 9);
        assert_eq!(f.dc_formula, "10 + @prof + @abilities.cha.mod");
        assert_eq!(f.attack_formula, "2 + @prof + @abilities.cha.mod");
        assert_eq!(f.attack_signed(), "+9");
    }

    #[test]
    fn willpower_substitutes_half_score() {
        let f = formulas_for(&facts(ActorKind::Character, 0.0), CastingStat::Willpower, 2);
        // willpower 7 -> floor((7 + 1) / 2) = 4
        assert_eq!(f.save_dc, 14);
        assert_eq!(f.attack_bonus, 6);
        assert_eq!(f.dc_formula, "10 + floor((@willpower.total + 1) / 2)");
    }

    #[test]
    fn npc_willpower_uses_challenge_rating() {
        let f = formulas_for(&facts(ActorKind::Npc, 9.0), CastingStat::Willpower, 8);
        // ceil(9 / 2) = 5, offset 8
        assert_eq!(f.save_dc, 15);
        assert_eq!(f.attack_bonus, 13);
        assert_eq!(f.attack_formula, "8 + 5");
    }

    #[test]
    fn npc_cr_half_floors_at_one() {
        assert_eq!(npc_cr_half_up_min1(0.0), 1);
        assert_eq!(npc_cr_half_up_min1(0.5), 1);
        assert_eq!(npc_cr_half_up_min1(3.0), 2);
    }

    #[test]
    fn attack_offset_is_configurable() {
        let low = formulas_for(&facts(ActorKind::Character, 0.0), CastingStat::Cha, 2);
        let high = formulas_for(&facts(ActorKind::Character, 0.0), CastingStat::Cha, 8);
        assert_eq!(high.attack_bonus - low.attack_bonus, 6);
        assert_eq!(high.save_dc, low.save_dc);
    }
}
