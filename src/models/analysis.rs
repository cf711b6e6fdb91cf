//! Analysis contract types
//!
//! The normalized shapes returned by the gateway, independent of which
//! provider produced the underlying model output

use serde::{Deserialize, Serialize};

/// Grocery item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fruit,
    Vegetable,
    Meat,
    Seafood,
    Dairy,
    Grain,
    Pantry,
    Beverage,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

/// Freshness analysis of a single perishable item.
///
/// `freshness_score` uses the canonical 0-100 scale; every instruction
/// template sent to a provider states the same scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAnalysis {
    /// Item name as identified by the model
    pub item_name: String,
    /// Item category
    #[serde(default)]
    pub category: Category,
    /// Freshness score on the 0-100 scale
    pub freshness_score: u8,
    /// Freshness descriptor text
    pub freshness_description: String,
    /// Estimated remaining shelf life in days
    pub estimated_days_remaining: u32,
    /// Ordered storage tips
    pub storage_tips: Vec<String>,
    /// Ordered visual freshness indicators
    pub visual_indicators: Vec<String>,
    /// Lower-carbon alternative, when the model suggests one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sustainable_alternative: Option<SustainableAlternative>,
    /// Carbon footprint joined from the static emissions table
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub carbon_footprint: Option<CarbonFootprint>,
}

/// Sustainable alternative recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SustainableAlternative {
    pub name: String,
    pub reason: String,
    pub carbon_savings_percent: f64,
}

/// Carbon footprint record derived from the static emissions table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonFootprint {
    /// Table key the item matched
    pub item: String,
    /// Kilograms of CO2-equivalent per kilogram of item
    pub co2e_per_kg: f64,
    /// Table category
    pub category: String,
    /// Human-readable impact comparison
    pub comparison: String,
    /// Driving distance with equivalent emissions, in km
    pub driving_equivalent_km: f64,
}

/// Analysis of a packaged/processed item; carries no freshness fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagedItem {
    /// Product name read from the packaging
    pub name: String,
    /// Packaging kind (can, bottle, box, bag, ...)
    pub package_type: String,
    /// Storage advice for this packaging
    pub storage_tip: String,
    /// Nutrition summary when visible on the label
    pub nutrition_info: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sustainable_alternative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub carbon_footprint: Option<CarbonFootprint>,
}

/// A single item found by live multi-item detection.
///
/// `box_2d` holds (y_min, x_min, y_max, x_max) normalized to 0-1000.
/// Degenerate boxes are passed through unchanged; consumers clamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedItem {
    pub item_name: String,
    #[serde(default)]
    pub category: Category,
    /// Freshness score on the 0-100 scale
    pub freshness_score: u8,
    pub freshness_description: String,
    pub estimated_days_remaining: u32,
    pub box_2d: [u32; 4],
}

/// Result envelope of the live detection task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveScanResult {
    pub detections: Vec<DetectedItem>,
}

/// Recipe built from expiring ingredients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSuggestion {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub carbon_savings: String,
    #[serde(default)]
    pub prep_time: String,
}

/// One conversational turn of the voice/text assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub transcript: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wake_word_detected: Option<bool>,
}

/// Chat message exchanged with the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

/// Picking tips for one shopping-list item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingTip {
    pub name: String,
    pub tips: Vec<String>,
    pub avoid: String,
    pub shelf_life: String,
}

/// Shopping guidance for a list of items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingGuidance {
    pub items: Vec<ShoppingTip>,
}

/// Freshness task outcome: analysis, or a valid "wrong category" verdict
#[derive(Debug, Clone)]
pub enum FreshnessOutcome {
    Analysis(Box<ItemAnalysis>),
    NotProduce { message: String },
}

/// Packaged-item task outcome
#[derive(Debug, Clone)]
pub enum PackagedOutcome {
    Packaged(Box<PackagedItem>),
    NotPackaged { message: String },
}
