// Pure capacity model. Everything in here is a function of its arguments so
// it can be recomputed on every render and every mutation instead of cached.
use crate::category::{ActorKind, PowerCategory};

// Max charges by character level (index 1..=20, leading sentinel for
// clamped-below-1 input).
const PARAMECIA_MAX: [u32; 21] = [
    0, 2, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20,
];
const LOGIA_MAX: [u32; 21] = [
    0, 2, 2, 3, 3, 4, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18,
];

// Alternative-mode resource budget, shared across categories and indexed at
// a category-dependent effective level. Index 0 holds level 1.
const SPELL_POINTS_BY_LEVEL: [u32; 20] = [
    4, 6, 14, 17, 27, 32, 38, 44, 57, 64, 73, 73, 83, 83, 94, 94, 107, 114, 123, 133,
];

/// Clamp a raw level into the valid 1..=20 lookup range.
pub fn clamp_level(level: u32) -> u32 {
    level.clamp(1, 20)
}

/// Parse a challenge rating that may be fractional ("1/2") or decimal.
/// Anything unparseable is treated as 0.
pub fn parse_cr(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    if let Some((a, b)) = s.split_once('/') {
        if let (Ok(num), Ok(den)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
            if den != 0.0 {
                return num / den;
            }
        }
        return 0.0;
    }
    s.parse().unwrap_or(0.0)
}

/// NPC capacity step function over challenge rating.
pub fn npc_charges_by_cr(cr: f64) -> u32 {
    let cr = cr.max(0.0);
    if cr <= 2.0 {
        2
    } else if cr <= 5.0 {
        5
    } else if cr <= 10.0 {
        10
    } else if cr <= 15.0 {
        15
    } else if cr <= 20.0 {
        20
    } else if cr <= 25.0 {
        22
    } else {
        24
    }
}

pub fn spell_points_for_level(level: u32) -> u32 {
    SPELL_POINTS_BY_LEVEL[(clamp_level(level) - 1) as usize]
}

/// Effective level used by the alternative-mode budget lookup.
pub fn alt_effective_level(category: PowerCategory, level: u32) -> u32 {
    let lvl = clamp_level(level);
    match category {
        PowerCategory::Logia | PowerCategory::HakiPurist => lvl,
        PowerCategory::Paramecia => lvl.div_ceil(2),
        PowerCategory::Zoan | PowerCategory::Haki => lvl.div_ceil(3),
    }
}

fn alt_max_charges(category: PowerCategory, level: u32) -> u32 {
    spell_points_for_level(alt_effective_level(category, level))
}

fn standard_max_charges(category: PowerCategory, level: u32) -> u32 {
    let lvl = clamp_level(level) as usize;
    match category {
        PowerCategory::Logia | PowerCategory::HakiPurist => LOGIA_MAX[lvl],
        PowerCategory::Zoan | PowerCategory::Haki => 0,
        PowerCategory::Paramecia => PARAMECIA_MAX[lvl],
    }
}

/// Base capacity before bonus charges. NPCs always use the CR step table
/// (the alternative mode does not apply to them); zoan and base haki stay at
/// 0 regardless of rating.
pub fn base_capacity(
    kind: ActorKind,
    category: PowerCategory,
    level: u32,
    cr: f64,
    alternative: bool,
) -> u32 {
    if kind.is_npc() {
        if category.chargeless() {
            return 0;
        }
        return npc_charges_by_cr(cr);
    }
    if alternative {
        alt_max_charges(category, level)
    } else {
        standard_max_charges(category, level)
    }
}

/// Final capacity: `max(0, base + bonus)`.
pub fn max_charges(
    kind: ActorKind,
    category: PowerCategory,
    level: u32,
    cr: f64,
    bonus: i64,
    alternative: bool,
) -> u32 {
    let base = base_capacity(kind, category, level, cr, alternative) as i64;
    (base + bonus).max(0) as u32
}

/// Highest usable tier for upcast choices, bounded per category.
pub fn highest_tier(category: PowerCategory, level: u32) -> u8 {
    let lvl = clamp_level(level);
    let tier = match category {
        PowerCategory::Logia | PowerCategory::HakiPurist => 9.min((lvl + 1) / 2),
        PowerCategory::Zoan | PowerCategory::Haki => 4.min((lvl - 1) / 6 + 1),
        PowerCategory::Paramecia => 5.min((lvl - 1) / 4 + 1),
    };
    tier as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn standard_tables_are_monotonic_in_level() {
        for category in [PowerCategory::Paramecia, PowerCategory::Logia] {
            let mut prev = 0;
            for level in 1..=20 {
                let max = standard_max_charges(category, level);
                assert!(max >= prev, "{category} regressed at level {level}");
                prev = max;
            }
        }
    }

    #[test]
    fn level_is_clamped_before_lookup() {
        assert_eq!(standard_max_charges(PowerCategory::Paramecia, 0), 2);
        assert_eq!(standard_max_charges(PowerCategory::Paramecia, 99), 20);
        assert_eq!(highest_tier(PowerCategory::Logia, 99), 9);
    }

    #[test]
    fn zoan_and_haki_have_no_base_pool() {
        for level in 1..=20 {
            assert_eq!(standard_max_charges(PowerCategory::Zoan, level), 0);
            assert_eq!(standard_max_charges(PowerCategory::Haki, level), 0);
        }
    }

    #[test]
    fn cr_parsing() {
        assert_eq!(parse_cr("1/2"), 0.5);
        assert_eq!(parse_cr("1/4"), 0.25);
        assert_eq!(parse_cr("3"), 3.0);
        assert_eq!(parse_cr("2.5"), 2.5);
        assert_eq!(parse_cr(""), 0.0);
        assert_eq!(parse_cr("boss"), 0.0);
        assert_eq!(parse_cr("1/0"), 0.0);
    }

    #[test]
    fn npc_cr_buckets() {
        assert_eq!(npc_charges_by_cr(0.5), 2);
        assert_eq!(npc_charges_by_cr(2.0), 2);
        assert_eq!(npc_charges_by_cr(3.0), 5);
        assert_eq!(npc_charges_by_cr(10.0), 10);
        assert_eq!(npc_charges_by_cr(14.0), 15);
        assert_eq!(npc_charges_by_cr(20.0), 20);
        assert_eq!(npc_charges_by_cr(25.0), 22);
        assert_eq!(npc_charges_by_cr(30.0), 24);
    }

    #[test]
    fn npc_zoan_stays_empty_regardless_of_rating() {
        for category in PowerCategory::iter().filter(|c| c.chargeless()) {
            assert_eq!(base_capacity(ActorKind::Npc, category, 1, 30.0, false), 0);
            assert_eq!(base_capacity(ActorKind::Npc, category, 1, 30.0, true), 0);
        }
    }

    #[test]
    fn alternative_mode_effective_levels() {
        // Level 10 paramecia reads the budget at level 5.
        assert_eq!(alt_effective_level(PowerCategory::Paramecia, 10), 5);
        assert_eq!(alt_max_charges(PowerCategory::Paramecia, 10), 27);
        assert_eq!(alt_effective_level(PowerCategory::Logia, 10), 10);
        assert_eq!(alt_max_charges(PowerCategory::Logia, 10), 64);
        assert_eq!(alt_effective_level(PowerCategory::Zoan, 10), 4);
        assert_eq!(alt_max_charges(PowerCategory::Zoan, 10), 17);
    }

    #[test]
    fn alternative_mode_does_not_apply_to_npcs() {
        assert_eq!(
            base_capacity(ActorKind::Npc, PowerCategory::Logia, 10, 8.0, true),
            10
        );
    }

    #[test]
    fn bonus_charges_never_drive_capacity_negative() {
        assert_eq!(
            max_charges(ActorKind::Character, PowerCategory::Paramecia, 5, 0.0, -99, false),
            0
        );
        assert_eq!(
            max_charges(ActorKind::Character, PowerCategory::Zoan, 5, 0.0, 3, false),
            3
        );
    }

    #[test]
    fn highest_tier_per_category() {
        assert_eq!(highest_tier(PowerCategory::Logia, 5), 3);
        assert_eq!(highest_tier(PowerCategory::Paramecia, 5), 2);
        assert_eq!(highest_tier(PowerCategory::Zoan, 5), 1);
        assert_eq!(highest_tier(PowerCategory::HakiPurist, 17), 9);
        assert_eq!(highest_tier(PowerCategory::Haki, 20), 4);
    }
}
