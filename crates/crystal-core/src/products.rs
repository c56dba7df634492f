use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a product's size table, e.g. `"Large"` packed `"100/ctn"`
/// with gauge dots `1` and `2` lit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeEntry {
    pub size: String,
    pub packing: String,
    /// Active gauge dot tokens, de-duplicated, first occurrence first.
    ///
    /// Tokens are `"1"`..`"6"` for most brands and `"r1"`..`"r4"` for Royal.
    /// The vocabulary is a storefront concern and is not enforced here.
    #[serde(default)]
    pub gauge: Vec<String>,
}

impl SizeEntry {
    #[must_use]
    pub fn new(size: impl Into<String>, packing: impl Into<String>, gauge: &[&str]) -> Self {
        let mut entry = Self {
            size: size.into(),
            packing: packing.into(),
            gauge: Vec::with_capacity(gauge.len()),
        };
        for token in gauge {
            entry.add_gauge(*token);
        }
        entry
    }

    /// Adds a gauge token unless it is blank or already present.
    pub fn add_gauge(&mut self, token: &str) {
        let token = token.trim();
        if !token.is_empty() && !self.gauge.iter().any(|g| g == token) {
            self.gauge.push(token.to_owned());
        }
    }

    #[must_use]
    pub fn has_gauge(&self, token: &str) -> bool {
        self.gauge.iter().any(|g| g == token)
    }
}

/// The editable portion of a product: everything a submission can set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub brand: String,
    pub finish: String,
    pub description: String,
    pub featured: bool,
    /// Absolute http(s) image URLs in display order.
    pub images: Vec<String>,
    pub sizes: Vec<SizeEntry>,
    pub key_features: Vec<String>,
}

impl ProductFields {
    /// First image in display order, used as the listing thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A stored product as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ProductFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub featured: bool,
    pub brand: String,
    pub finish: String,
    pub thumbnail: Option<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.fields.name.clone(),
            featured: product.fields.featured,
            brand: product.fields.brand.clone(),
            finish: product.fields.finish.clone(),
            thumbnail: product.fields.thumbnail().map(ToOwned::to_owned),
        }
    }
}

/// Home-page carousel entry: a featured product and its lead image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedProduct {
    pub id: i64,
    pub image_url: String,
}

impl FeaturedProduct {
    /// Returns `None` when the product has no image to show.
    #[must_use]
    pub fn from_product(product: &Product) -> Option<Self> {
        product.fields.thumbnail().map(|url| Self {
            id: product.id,
            image_url: url.to_owned(),
        })
    }
}
