// Collaborator interfaces to the host virtual tabletop. The platform owns the
// document graph, the flag store, dialogs and rendering; the engine only ever
// sees these traits plus the validated facts below.
use async_trait::async_trait;
use derive_more::Display;
use serde_json::Value;
use std::sync::Arc;

use crate::casting::CastingFormulas;
use crate::catalog::{CostConfig, CostPrompt};
use crate::category::{ActorKind, CastingStat, ItemKind};
use crate::error::HostError;
use crate::settings::WorldSettings;

/// Opaque host document identity (the platform's uuid string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct DocumentRef(pub String);

impl DocumentRef {
    pub fn new(raw: impl Into<String>) -> Self {
        DocumentRef(raw.into())
    }
}

/// Ability modifiers for the six standard casting attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbilityMods {
    pub str_: i32,
    pub dex: i32,
    pub con: i32,
    pub int_: i32,
    pub wis: i32,
    pub cha: i32,
}

impl AbilityMods {
    /// None for the synthetic willpower attribute, which does not map onto a
    /// plain ability modifier.
    pub fn modifier(&self, stat: CastingStat) -> Option<i32> {
        match stat {
            CastingStat::Str => Some(self.str_),
            CastingStat::Dex => Some(self.dex),
            CastingStat::Con => Some(self.con),
            CastingStat::Int => Some(self.int_),
            CastingStat::Wis => Some(self.wis),
            CastingStat::Cha => Some(self.cha),
            CastingStat::Willpower => None,
        }
    }
}

/// Actor data validated once at the adapter edge. `level` is already derived
/// (explicit override or summed class levels, minimum 1) and
/// `challenge_rating` already parsed, defaulting to 0.
#[derive(Debug, Clone)]
pub struct ActorFacts {
    pub id: DocumentRef,
    pub kind: ActorKind,
    pub level: u32,
    pub challenge_rating: f64,
    pub proficiency: i32,
    pub abilities: AbilityMods,
    pub willpower_total: i32,
}

/// Options forwarded to the item's own activation behavior. The host is
/// expected to suppress its native slot consumption; charges already paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationOptions {
    pub chosen_tier: Option<u8>,
}

#[async_trait]
pub trait ActorHost: Send + Sync {
    fn facts(&self) -> &ActorFacts;

    async fn get_flag(&self, key: &str) -> Option<Value>;
    async fn set_flag(&self, key: &str, value: Value) -> Result<(), HostError>;

    /// Full inventory; the catalog filters it down to managed entries.
    async fn items(&self) -> Vec<Arc<dyn ItemHost>>;

    /// Duplicate a reference item into this actor's inventory, stripping its
    /// identity. The source is never mutated.
    async fn adopt_item(&self, source: &dyn ItemHost) -> Result<Arc<dyn ItemHost>, HostError>;

    /// Ask every open presentation of this actor to refresh. Idempotent and
    /// cheap; called after every mutation.
    fn rerender(&self);
}

#[async_trait]
pub trait ItemHost: Send + Sync {
    fn id(&self) -> &DocumentRef;
    /// The owning actor, if this item is embedded in one.
    fn owner(&self) -> Option<&DocumentRef>;
    fn name(&self) -> String;
    fn image(&self) -> String;
    fn kind(&self) -> ItemKind;
    /// Intrinsic tier (spell level), 0 when not applicable.
    fn base_tier(&self) -> u8;

    async fn get_flag(&self, key: &str) -> Option<Value>;
    async fn set_flag(&self, key: &str, value: Value) -> Result<(), HostError>;

    /// Push recomputed save-DC / attack formulas into the item's activities.
    async fn apply_casting_formulas(&self, formulas: &CastingFormulas) -> Result<(), HostError>;

    async fn activate(&self, options: ActivationOptions) -> Result<(), HostError>;
    async fn delete(&self) -> Result<(), HostError>;

    /// Fallback path offered when activation fails.
    fn open_sheet(&self);
}

/// Modal prompt surface. Every method returns None on cancel, which aborts
/// the enclosing operation before any mutation.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn cost_config(&self, prompt: CostPrompt) -> Option<CostConfig>;
    async fn upcast_tier(&self, item_name: &str, base_tier: u8, highest_tier: u8) -> Option<u8>;
    async fn bonus_charges(&self, current: i64) -> Option<i64>;
}

/// Non-blocking user notifications; a failed mutation must never break the
/// render path.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
}

/// Live view of world configuration, consulted on every capacity computation.
pub trait SettingsSource: Send + Sync {
    fn world(&self) -> WorldSettings;
}

/// Who is driving the interaction. Some mutations are GM-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserContext {
    pub is_gm: bool,
}

/// A drag payload already decoded and resolved by the host. Unresolvable or
/// malformed transfers never reach the engine (they are a no-op upstream).
pub enum DropDocument {
    /// A reference image page: cosmetic source for the pool's display.
    ImagePage { name: String, src: Option<String> },
    /// A resolvable item document, possibly from a compendium.
    Item(Arc<dyn ItemHost>),
    /// Anything else, carrying its document type for diagnostics.
    Other { doc_type: String },
}

// Flag values cross the boundary as loose JSON; these readers recover from
// absent or malformed entries by returning None so callers can default.

pub fn number_flag(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn int_flag(value: Option<&Value>) -> Option<i64> {
    number_flag(value).map(|n| n as i64)
}

pub fn bool_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        _ => false,
    }
}

pub fn string_flag(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_numbers_read_as_none() {
        assert_eq!(number_flag(Some(&json!("7"))), Some(7.0));
        assert_eq!(number_flag(Some(&json!(3.5))), Some(3.5));
        assert_eq!(number_flag(Some(&json!("seven"))), None);
        assert_eq!(number_flag(Some(&json!({}))), None);
        assert_eq!(number_flag(None), None);
    }

    #[test]
    fn bool_flags_accept_truthy_numbers() {
        assert!(bool_flag(Some(&json!(true))));
        assert!(bool_flag(Some(&json!(1))));
        assert!(!bool_flag(Some(&json!(0))));
        assert!(!bool_flag(Some(&json!("yes"))));
        assert!(!bool_flag(None));
    }
}
