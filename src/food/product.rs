use crate::data::additives::{normalize_e, AdditiveTable};
use crate::food::nutrients::{parse_nutrients, Nutrient};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub product: Option<Product>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Product {
    pub product_name_fi: Option<String>,
    pub product_name: Option<String>,
    pub brands: Option<String>,
    /// Free-form `key -> number` map; validated by `parse_nutrients`.
    pub nutriments: Option<Map<String, Value>>,
    pub serving_size: Option<String>,
    pub origin_of_ingredients: Option<String>,

    pub additives_tags: Option<Vec<String>>,
    pub additives_n: Option<u32>,
    pub allergens: Option<String>,
    pub allergens_tags: Option<Vec<String>>,

    pub ingredients_text: Option<String>,
    pub ingredients_text_fi: Option<String>,
    pub ingredients_text_en: Option<String>,
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Product {
    pub fn localized_name(&self) -> &str {
        non_blank(&self.product_name_fi)
            .or_else(|| non_blank(&self.product_name))
            .unwrap_or("Unknown")
    }

    pub fn ingredients(&self) -> &str {
        non_blank(&self.ingredients_text)
            .or_else(|| non_blank(&self.ingredients_text_fi))
            .or_else(|| non_blank(&self.ingredients_text_en))
            .unwrap_or("")
    }

    /// Nothing worth showing: no nutrient table and no ingredient text.
    pub fn is_sparse(&self) -> bool {
        let no_nutriments = self.nutriments.as_ref().map_or(true, Map::is_empty);
        no_nutriments && self.ingredients().is_empty()
    }
}

/// `en:e330` -> `E330`, `211` -> `E211`, `en:e160a` -> `E160`, matching the
/// codes `AdditiveTable::detect_ecodes` reports.
pub fn normalize_additive_tag(tag: &str) -> String {
    let raw = tag.split_once(':').map_or(tag, |(_, rest)| rest).trim().to_uppercase();
    if raw.starts_with('E') {
        normalize_e(&raw)
    } else {
        normalize_e(&format!("E{raw}"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodReport {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: Option<String>,
    pub origin: Option<String>,
    pub nutrients: Vec<Nutrient>,
    pub additives: Vec<String>,
    pub allergens_text: String,
    pub allergens_tags: Vec<String>,
    pub ingredients_text: String,
}

impl FoodReport {
    /// Additives are the API's own tags first, followed by any further codes
    /// the local table spots in the ingredient text.
    pub fn from_product(product: Product, table: &AdditiveTable) -> Self {
        let mut additives: Vec<String> = Vec::new();
        for tag in product.additives_tags.iter().flatten() {
            let code = normalize_additive_tag(tag);
            if !additives.contains(&code) {
                additives.push(code);
            }
        }
        for code in table.detect_ecodes(product.ingredients()) {
            if !additives.contains(&code) {
                additives.push(code);
            }
        }

        Self {
            name: product.localized_name().to_string(),
            nutrients: parse_nutrients(product.nutriments.as_ref()),
            ingredients_text: product.ingredients().to_string(),
            additives,
            brand: product.brands,
            serving_size: product.serving_size,
            origin: product.origin_of_ingredients,
            allergens_text: product.allergens.unwrap_or_default(),
            allergens_tags: product.allergens_tags.unwrap_or_default(),
        }
    }
}
