// Tagged variants for the power system: categories, category groups, casting
// attributes, actor and item kinds, plus the per-group flag-key tables used to
// namespace persisted pool state.
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// One pool per (actor, group). The fruit and haki groups are independent
/// namespaces on the same actor and never interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryGroup {
    Fruit,
    Haki,
}

impl CategoryGroup {
    pub fn keys(self) -> &'static PoolKeys {
        match self {
            CategoryGroup::Fruit => &FRUIT_KEYS,
            CategoryGroup::Haki => &HAKI_KEYS,
        }
    }

    /// Category assumed when an actor has never configured this pool.
    pub fn default_category(self) -> PowerCategory {
        match self {
            CategoryGroup::Fruit => PowerCategory::Paramecia,
            CategoryGroup::Haki => PowerCategory::Haki,
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            CategoryGroup::Fruit => "Devil Fruit",
            CategoryGroup::Haki => "Haki",
        }
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryGroup::Fruit => write!(f, "fruit"),
            CategoryGroup::Haki => write!(f, "haki"),
        }
    }
}

/// Flag keys for one pool. Key names match the original deployment so
/// existing worlds keep their data.
pub struct PoolKeys {
    pub power_type: &'static str,
    pub name: &'static str,
    pub image: &'static str,
    pub bonus: &'static str,
    pub current: &'static str,
    pub casting_stat: &'static str,
    pub last_synced: &'static str,
}

pub static FRUIT_KEYS: PoolKeys = PoolKeys {
    power_type: "fruitType",
    name: "fruitName",
    image: "fruitImg",
    bonus: "bonusCharges",
    current: "chargesCurrent",
    casting_stat: "castingStat",
    last_synced: "lastAppliedCastingStat",
};

pub static HAKI_KEYS: PoolKeys = PoolKeys {
    power_type: "hakiType",
    name: "hakiName",
    image: "hakiImg",
    bonus: "hakiBonusCharges",
    current: "hakiChargesCurrent",
    casting_stat: "hakiCastingStat",
    last_synced: "hakiLastAppliedCastingStat",
};

/// The five power categories. Each group admits its own subset: the fruit
/// group uses paramecia/logia/zoan, the haki group uses haki/hakiPurist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PowerCategory {
    Paramecia,
    Logia,
    Zoan,
    Haki,
    HakiPurist,
}

impl PowerCategory {
    pub fn group(self) -> CategoryGroup {
        match self {
            PowerCategory::Paramecia | PowerCategory::Logia | PowerCategory::Zoan => {
                CategoryGroup::Fruit
            }
            PowerCategory::Haki | PowerCategory::HakiPurist => CategoryGroup::Haki,
        }
    }

    /// Zoan and base Haki have no numeric charge economy of their own; their
    /// pools stay at capacity 0 unless bonus charges raise it.
    pub fn chargeless(self) -> bool {
        matches!(self, PowerCategory::Zoan | PowerCategory::Haki)
    }

    /// Parse a persisted category flag, falling back to the group default on
    /// absent or unrecognized values.
    pub fn from_flag(raw: Option<&str>, group: CategoryGroup) -> Self {
        raw.and_then(|s| s.parse().ok())
            .unwrap_or_else(|| group.default_category())
    }
}

/// The six ability modifiers plus the synthetic willpower attribute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CastingStat {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
    Willpower,
}

impl CastingStat {
    pub fn from_flag(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or(CastingStat::Cha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Character,
    Npc,
    Vehicle,
}

impl ActorKind {
    /// NPCs derive capacity from challenge rating instead of level.
    pub fn is_npc(self) -> bool {
        matches!(self, ActorKind::Npc)
    }
}

/// Item kinds the catalog partitions on. Anything else lands in Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Spell,
    Weapon,
    Feature,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_flag_round_trip() {
        for raw in ["paramecia", "logia", "zoan", "haki", "hakiPurist"] {
            let cat = PowerCategory::from_flag(Some(raw), CategoryGroup::Fruit);
            assert_eq!(cat.to_string(), raw);
        }
    }

    #[test]
    fn unknown_category_falls_back_to_group_default() {
        assert_eq!(
            PowerCategory::from_flag(Some("mythic"), CategoryGroup::Fruit),
            PowerCategory::Paramecia
        );
        assert_eq!(
            PowerCategory::from_flag(None, CategoryGroup::Haki),
            PowerCategory::Haki
        );
    }

    #[test]
    fn chargeless_categories() {
        assert!(PowerCategory::Zoan.chargeless());
        assert!(PowerCategory::Haki.chargeless());
        assert!(!PowerCategory::Logia.chargeless());
        assert!(!PowerCategory::HakiPurist.chargeless());
    }

    #[test]
    fn groups_are_disjoint() {
        assert_eq!(PowerCategory::Zoan.group(), CategoryGroup::Fruit);
        assert_eq!(PowerCategory::HakiPurist.group(), CategoryGroup::Haki);
    }
}
