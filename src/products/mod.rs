//! Fulfilment product catalogue.
//!
//! The catalogue ships with the crate (`data/products.yaml`) and can be
//! replaced at startup by pointing `products.path` at another YAML file of
//! the same shape.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::model::{Product, ProductCriteria};

const BUILTIN_PRODUCTS: &str = include_str!("../../data/products.yaml");

/// Errors loading the catalogue.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Failed to read product catalogue '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid product catalogue: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Duplicate fulfilment code: {0}")]
    DuplicateCode(String),
}

/// Product catalogue configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductsConfig {
    /// YAML catalogue replacing the built-in one.
    pub path: Option<String>,
}

/// Search over the fulfilment products.
pub trait ProductMatcher: Send + Sync {
    /// Products matching every criterion that is set, in catalogue order.
    fn search(&self, criteria: &ProductCriteria) -> Vec<Product>;
}

/// Fixed product reference data.
#[derive(Debug, Clone)]
pub struct ProductReference {
    products: Vec<Product>,
}

impl ProductReference {
    /// The catalogue compiled into the crate.
    pub fn builtin() -> Result<Self, ProductError> {
        Self::from_yaml(BUILTIN_PRODUCTS)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ProductError> {
        let products: Vec<Product> = serde_yaml::from_str(yaml)?;
        Self::new(products)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProductError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ProductError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn from_config(config: &ProductsConfig) -> Result<Self, ProductError> {
        let reference = match &config.path {
            Some(path) => Self::from_path(path)?,
            None => Self::builtin()?,
        };
        info!(
            products = reference.products.len(),
            source = config.path.as_deref().unwrap_or("builtin"),
            "Product catalogue loaded"
        );
        Ok(reference)
    }

    /// Fulfilment codes must be unique within a catalogue.
    pub fn new(products: Vec<Product>) -> Result<Self, ProductError> {
        let mut seen = std::collections::HashSet::new();
        for product in &products {
            if !seen.insert(product.fulfilment_code.as_str()) {
                return Err(ProductError::DuplicateCode(product.fulfilment_code.clone()));
            }
        }
        Ok(Self { products })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

impl ProductMatcher for ProductReference {
    fn search(&self, criteria: &ProductCriteria) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| criteria.matches(p))
            .cloned()
            .collect()
    }
}
