pub mod capacity;
pub mod casting;
pub mod catalog;
pub mod category;
pub mod engine;
pub mod error;
pub mod host;
pub mod ledger;
pub mod resolver;
pub mod rest;
pub mod settings;
pub mod view;

// Re-export commonly used items for easier access
pub use casting::CastingFormulas;
pub use catalog::{CostConfig, CostPrompt};
pub use category::{ActorKind, CastingStat, CategoryGroup, ItemKind, PowerCategory};
pub use engine::ChargeEngine;
pub use error::{EngineError, HostError};
pub use host::{
    ActivationOptions, ActorFacts, ActorHost, DocumentRef, DropDocument, ItemHost, Notifier,
    Prompter, SettingsSource, UserContext,
};
pub use resolver::UseOutcome;
pub use rest::{Clock, RestEvent, RestKind, SystemClock};
pub use settings::{StaticSettings, WorldSettings};
pub use view::{PoolView, PowerView};
