//! Carbon footprint enrichment
//!
//! Static emissions table with fuzzy name lookup and derived comparison
//! strings. Pure computation; recomputed per request, never cached.

use crate::models::CarbonFootprint;

/// Kilometers driven per kg CO2e for an average car
const DRIVING_KM_PER_KG: f64 = 6.2;

/// Phone charges per kg CO2e, used for low-impact comparisons
const PHONE_CHARGES_PER_KG: f64 = 130.0;

/// One emissions table entry; `item` keys are lowercase
struct CarbonEntry {
    item: &'static str,
    co2e_per_kg: f64,
    category: &'static str,
}

/// Static per-kg CO2e table, loaded once and never mutated
static CARBON_TABLE: &[CarbonEntry] = &[
    // Fruits
    CarbonEntry { item: "apple", co2e_per_kg: 0.4, category: "fruit" },
    CarbonEntry { item: "banana", co2e_per_kg: 0.7, category: "fruit" },
    CarbonEntry { item: "orange", co2e_per_kg: 0.4, category: "fruit" },
    CarbonEntry { item: "lemon", co2e_per_kg: 0.5, category: "fruit" },
    CarbonEntry { item: "pear", co2e_per_kg: 0.4, category: "fruit" },
    CarbonEntry { item: "peach", co2e_per_kg: 0.6, category: "fruit" },
    CarbonEntry { item: "grape", co2e_per_kg: 1.1, category: "fruit" },
    CarbonEntry { item: "strawberry", co2e_per_kg: 1.1, category: "fruit" },
    CarbonEntry { item: "blueberry", co2e_per_kg: 1.0, category: "fruit" },
    CarbonEntry { item: "watermelon", co2e_per_kg: 0.3, category: "fruit" },
    CarbonEntry { item: "pineapple", co2e_per_kg: 1.2, category: "fruit" },
    CarbonEntry { item: "mango", co2e_per_kg: 1.2, category: "fruit" },
    CarbonEntry { item: "kiwi", co2e_per_kg: 1.0, category: "fruit" },
    CarbonEntry { item: "avocado", co2e_per_kg: 2.5, category: "fruit" },
    CarbonEntry { item: "cherry", co2e_per_kg: 1.3, category: "fruit" },
    // Vegetables
    CarbonEntry { item: "tomato", co2e_per_kg: 2.0, category: "vegetable" },
    CarbonEntry { item: "lettuce", co2e_per_kg: 0.3, category: "vegetable" },
    CarbonEntry { item: "carrot", co2e_per_kg: 0.2, category: "vegetable" },
    CarbonEntry { item: "broccoli", co2e_per_kg: 0.4, category: "vegetable" },
    CarbonEntry { item: "potato", co2e_per_kg: 0.3, category: "vegetable" },
    CarbonEntry { item: "onion", co2e_per_kg: 0.3, category: "vegetable" },
    CarbonEntry { item: "garlic", co2e_per_kg: 0.4, category: "vegetable" },
    CarbonEntry { item: "cucumber", co2e_per_kg: 0.7, category: "vegetable" },
    CarbonEntry { item: "spinach", co2e_per_kg: 0.4, category: "vegetable" },
    CarbonEntry { item: "cabbage", co2e_per_kg: 0.3, category: "vegetable" },
    CarbonEntry { item: "cauliflower", co2e_per_kg: 0.4, category: "vegetable" },
    CarbonEntry { item: "pepper", co2e_per_kg: 2.2, category: "vegetable" },
    CarbonEntry { item: "mushroom", co2e_per_kg: 1.3, category: "vegetable" },
    CarbonEntry { item: "corn", co2e_per_kg: 0.7, category: "vegetable" },
    CarbonEntry { item: "zucchini", co2e_per_kg: 0.4, category: "vegetable" },
    // Meat
    CarbonEntry { item: "beef", co2e_per_kg: 27.0, category: "meat" },
    CarbonEntry { item: "lamb", co2e_per_kg: 24.5, category: "meat" },
    CarbonEntry { item: "pork", co2e_per_kg: 7.2, category: "meat" },
    CarbonEntry { item: "chicken", co2e_per_kg: 6.9, category: "meat" },
    CarbonEntry { item: "turkey", co2e_per_kg: 10.9, category: "meat" },
    // Seafood
    CarbonEntry { item: "salmon", co2e_per_kg: 5.1, category: "seafood" },
    CarbonEntry { item: "tuna", co2e_per_kg: 6.1, category: "seafood" },
    CarbonEntry { item: "shrimp", co2e_per_kg: 11.8, category: "seafood" },
    CarbonEntry { item: "cod", co2e_per_kg: 3.5, category: "seafood" },
    // Dairy
    CarbonEntry { item: "milk", co2e_per_kg: 1.9, category: "dairy" },
    CarbonEntry { item: "cheese", co2e_per_kg: 13.5, category: "dairy" },
    CarbonEntry { item: "butter", co2e_per_kg: 9.0, category: "dairy" },
    CarbonEntry { item: "yogurt", co2e_per_kg: 2.2, category: "dairy" },
    CarbonEntry { item: "egg", co2e_per_kg: 4.5, category: "dairy" },
    // Grains and pantry
    CarbonEntry { item: "rice", co2e_per_kg: 4.0, category: "grain" },
    CarbonEntry { item: "bread", co2e_per_kg: 1.3, category: "grain" },
    CarbonEntry { item: "oats", co2e_per_kg: 1.7, category: "grain" },
    CarbonEntry { item: "pasta", co2e_per_kg: 1.2, category: "grain" },
    CarbonEntry { item: "tofu", co2e_per_kg: 2.0, category: "pantry" },
    CarbonEntry { item: "beans", co2e_per_kg: 0.8, category: "pantry" },
    CarbonEntry { item: "lentils", co2e_per_kg: 0.9, category: "pantry" },
    CarbonEntry { item: "chocolate", co2e_per_kg: 19.0, category: "pantry" },
    CarbonEntry { item: "coffee", co2e_per_kg: 16.5, category: "beverage" },
];

/// Look up the carbon footprint for an item name.
///
/// Bidirectional substring match against the table, first match wins; the
/// heuristic intentionally catches compound names ("red apple", "cherry
/// tomatoes") without any lemmatization. `None` means unknown, never zero.
pub fn lookup(item_name: &str) -> Option<CarbonFootprint> {
    let normalized = item_name.to_lowercase();
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return None;
    }

    CARBON_TABLE
        .iter()
        .find(|entry| normalized.contains(entry.item) || entry.item.contains(normalized))
        .map(footprint)
}

/// Full table as footprint records, for the listing endpoint
pub fn all() -> Vec<CarbonFootprint> {
    CARBON_TABLE.iter().map(footprint).collect()
}

fn footprint(entry: &CarbonEntry) -> CarbonFootprint {
    let co2e = entry.co2e_per_kg;
    let driving_km = (co2e * DRIVING_KM_PER_KG * 10.0).round() / 10.0;

    let comparison = if co2e < 1.0 {
        format!(
            "Low impact — equivalent to charging your phone {} times",
            (co2e * PHONE_CHARGES_PER_KG).round() as i64
        )
    } else if co2e < 5.0 {
        format!("Medium impact — equivalent to driving {} km", driving_km)
    } else {
        format!("High impact — equivalent to driving {} km", driving_km)
    };

    CarbonFootprint {
        item: entry.item.to_string(),
        co2e_per_kg: co2e,
        category: entry.category.to_string(),
        comparison,
        driving_equivalent_km: driving_km,
    }
}
