use crate::data::additives::AdditiveTable;
use crate::data::config::FoodConfig;
use crate::food::product::{FoodReport, ProductResponse};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "swatchlab/0.1.0 (https://world.openfoodfacts.org)";

/// Field subset requested on the first call.
const LEAN_FIELDS: &str = "product_name_fi,product_name,brands,\
nutriments,serving_size,origin_of_ingredients,\
additives_tags,additives_n,allergens,allergens_tags,\
ingredients_text,ingredients_text_fi,ingredients_text_en";

#[derive(Debug, Error)]
pub enum FoodError {
    #[error("barcode must be digits only, got {0:?}")]
    InvalidBarcode(String),

    #[error("product not found")]
    NotFound,

    #[error("food API returned HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    Decode(#[from] std::io::Error),
}

pub fn validate_barcode(barcode: &str) -> Result<&str, FoodError> {
    let b = barcode.trim();
    if b.is_empty() || !b.bytes().all(|c| c.is_ascii_digit()) {
        return Err(FoodError::InvalidBarcode(barcode.to_string()));
    }
    Ok(b)
}

pub struct FoodClient {
    agent: ureq::Agent,
    base_url: String,
    language: String,
}

impl FoodClient {
    pub fn new(cfg: &FoodConfig) -> Self {
        let mut base_url = cfg.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
                .build(),
            base_url,
            language: cfg.language.clone(),
        }
    }

    pub fn product_url(&self, barcode: &str) -> String {
        format!("{}api/v2/product/{}.json", self.base_url, barcode)
    }

    /// Lean lookup first; one unfiltered retry only when the lean product
    /// carries neither nutrients nor ingredients.
    pub fn fetch_product(&self, barcode: &str, additives: &AdditiveTable) -> Result<FoodReport, FoodError> {
        let barcode = validate_barcode(barcode)?;

        let mut product = self.get(barcode, true)?.product.ok_or(FoodError::NotFound)?;
        if product.is_sparse() {
            log::debug!("lean product {barcode} is sparse; requesting all fields");
            if let Some(full) = self.get(barcode, false)?.product {
                product = full;
            }
        }

        Ok(FoodReport::from_product(product, additives))
    }

    fn get(&self, barcode: &str, lean: bool) -> Result<ProductResponse, FoodError> {
        let mut req = self
            .agent
            .get(&self.product_url(barcode))
            .set("User-Agent", USER_AGENT)
            .query("lc", &self.language);
        if lean {
            req = req.query("fields", LEAN_FIELDS);
        }

        let resp = match req.call() {
            Ok(r) => r,
            Err(ureq::Error::Status(404, _)) => return Err(FoodError::NotFound),
            Err(ureq::Error::Status(code, _)) => return Err(FoodError::Status(code)),
            Err(e) => {
                log::warn!("food API request for {barcode} failed: {e}");
                return Err(FoodError::Network(e.to_string()));
            }
        };

        let body: ProductResponse = resp.into_json()?;
        if body.status == 0 {
            return Err(FoodError::NotFound);
        }
        Ok(body)
    }
}
