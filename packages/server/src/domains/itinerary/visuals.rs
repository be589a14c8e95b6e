//! Deterministic placeholder visuals for items without a cover image.
//!
//! The same record id always maps to the same gradient and emoji, so list
//! renders are stable across refreshes without storing anything.

use serde::Serialize;

use super::models::ItemType;

/// CSS gradient pool, indexed by record id hash.
const GRADIENTS: [&str; 10] = [
    "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
    "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
    "linear-gradient(135deg, #30cfd0 0%, #330867 100%)",
    "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
    "linear-gradient(135deg, #ff9a9e 0%, #fecfef 100%)",
    "linear-gradient(135deg, #ffecd2 0%, #fcb69f 100%)",
    "linear-gradient(135deg, #84fab0 0%, #8fd0e4 100%)",
];

/// Emoji pools per item kind, indexed by record id hash.
const FOOD_EMOJIS: [&str; 6] = ["🍜", "🍣", "🍰", "☕", "🍱", "🍢"];
const TRANSPORT_EMOJIS: [&str; 4] = ["🚆", "🚌", "✈️", "🚇"];
const ACTIVITY_EMOJIS: [&str; 6] = ["⛩️", "🏯", "🗼", "🎡", "🌸", "🏞️"];
const SHOP_EMOJIS: [&str; 4] = ["🛍️", "🏬", "🎁", "👘"];
const STAY_EMOJIS: [&str; 3] = ["🏨", "🏩", "🛏️"];

/// Title substrings that pin a specific emoji, checked before the type pool.
const KEYWORD_EMOJIS: [(&str, &str); 12] = [
    ("咖啡", "☕"),
    ("coffee", "☕"),
    ("cafe", "☕"),
    ("拉麵", "🍜"),
    ("ramen", "🍜"),
    ("壽司", "🍣"),
    ("sushi", "🍣"),
    ("神社", "⛩️"),
    ("寺", "🏯"),
    ("溫泉", "♨️"),
    ("onsen", "♨️"),
    ("市場", "🧺"),
];

/// Transit mode names mapped to their vehicle emoji.
const TRANSPORT_MODE_EMOJIS: [(&str, &str); 6] = [
    ("新幹線", "🚄"),
    ("電車", "🚆"),
    ("巴士", "🚌"),
    ("飛機", "✈️"),
    ("地鐵", "🚇"),
    ("步行", "🚶"),
];

/// Placeholder rendering for an item without a cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visual {
    pub gradient: &'static str,
    pub emoji: &'static str,
}

/// DJB2 string hash, reduced modulo pool sizes for stable picks.
fn hash_id(id: &str) -> u32 {
    let mut hash: u32 = 5381;
    for byte in id.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u32::from(byte));
    }
    hash
}

fn pick<'a>(pool: &'a [&'static str], hash: u32) -> &'static str {
    pool[(hash as usize) % pool.len()]
}

/// Choose the placeholder for an item. Emoji precedence: explicit transit
/// mode, then title keyword, then the kind's pool.
pub fn visual_for_item(
    id: &str,
    item_type: ItemType,
    title: &str,
    transport_mode: Option<&str>,
) -> Visual {
    let hash = hash_id(id);
    let gradient = pick(&GRADIENTS, hash);

    if let Some(mode) = transport_mode {
        for (name, emoji) in TRANSPORT_MODE_EMOJIS {
            if mode.contains(name) {
                return Visual { gradient, emoji };
            }
        }
    }

    let title_lower = title.to_lowercase();
    for (keyword, emoji) in KEYWORD_EMOJIS {
        if title_lower.contains(keyword) {
            return Visual { gradient, emoji };
        }
    }

    let pool: &[&'static str] = match item_type {
        ItemType::Food => &FOOD_EMOJIS,
        ItemType::Transport => &TRANSPORT_EMOJIS,
        ItemType::Activity => &ACTIVITY_EMOJIS,
        ItemType::Shop => &SHOP_EMOJIS,
        ItemType::Stay => &STAY_EMOJIS,
    };
    let emoji = if pool.is_empty() { "📍" } else { pick(pool, hash) };

    Visual { gradient, emoji }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_for_same_id() {
        let a = visual_for_item("page-123", ItemType::Food, "Ichiran", None);
        let b = visual_for_item("page-123", ItemType::Food, "Ichiran", None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_ids_spread_gradients() {
        let visuals: Vec<_> = (0..20)
            .map(|i| visual_for_item(&format!("page-{i}"), ItemType::Activity, "x", None).gradient)
            .collect();
        let distinct: std::collections::HashSet<_> = visuals.iter().collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_transport_mode_wins() {
        let v = visual_for_item("p1", ItemType::Transport, "前往新宿", Some("新幹線"));
        assert_eq!(v.emoji, "🚄");
    }

    #[test]
    fn test_title_keyword_beats_type_pool() {
        let v = visual_for_item("p1", ItemType::Activity, "Blue Bottle Coffee", None);
        assert_eq!(v.emoji, "☕");
    }

    #[test]
    fn test_type_pool_fallback() {
        let v = visual_for_item("p1", ItemType::Stay, "Mustard Hotel", None);
        assert!(STAY_EMOJIS.contains(&v.emoji));
    }
}
