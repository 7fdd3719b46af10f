//! The fixed-schema product record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema keys in output order. `features` is optional and comes last.
pub const RECORD_KEYS: [&str; 12] = [
    "product_name",
    "brand",
    "category",
    "model",
    "color",
    "material",
    "storage",
    "size",
    "dimensions",
    "weight",
    "price",
    "description",
];

/// One extracted product.
///
/// Missing keys default to `""`; unknown keys are rejected. Field order is
/// serialisation order, so the download keeps the schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductRecord {
    pub product_name: String,
    pub brand: String,
    pub category: String,
    pub model: String,
    pub color: String,
    pub material: String,
    pub storage: String,
    pub size: String,
    pub dimensions: String,
    pub weight: String,
    pub price: String,
    pub description: String,
    /// Present only when the description lists explicit features.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl ProductRecord {
    /// Validate a recovered object against the schema.
    ///
    /// An empty `features` list is normalised away.
    pub fn from_object(object: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut record: ProductRecord = serde_json::from_value(Value::Object(object))?;
        if record.features.as_ref().is_some_and(|f| f.is_empty()) {
            record.features = None;
        }
        Ok(record)
    }
}
