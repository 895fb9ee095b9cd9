//! Offering entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sc_core::constants::FALLBACK_PRICE_LABEL;
use sc_core::error::ScResult;

use super::{opaque_id, optional_text, text, timestamp};

/// A service or product shown on the public site.
///
/// `price` is display text ("$50", "from $120/hr"), never a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    /// Public URL of the offering's image, stored as `image_url`.
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Writable fields of an offering, used for both create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferingFields {
    pub title: String,
    pub description: String,
    pub price: String,
    #[serde(rename = "image_url")]
    pub image_ref: Option<String>,
}

impl Offering {
    /// Create an Offering from a REST row.
    pub fn from_server_map(map: &serde_json::Value) -> ScResult<Self> {
        Ok(Self {
            id: opaque_id(map)?,
            title: text(map, "title"),
            description: text(map, "description"),
            price: text(map, "price"),
            image_ref: optional_text(map, "image_url"),
            created_at: timestamp(map, "created_at")?,
        })
    }

    /// Price text for display, falling back to a generic label when blank.
    pub fn price_label(&self) -> &str {
        if self.price.trim().is_empty() {
            FALLBACK_PRICE_LABEL
        } else {
            &self.price
        }
    }

    /// Whether this record carries exactly the given field values.
    pub fn matches_fields(&self, fields: &OfferingFields) -> bool {
        self.title == fields.title
            && self.description == fields.description
            && self.price == fields.price
            && self.image_ref == fields.image_ref
    }
}

impl OfferingFields {
    /// Build a field set; surrounding whitespace is trimmed by [`normalized`](Self::normalized).
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: impl Into<String>,
        image_ref: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            price: price.into(),
            image_ref,
        }
    }

    /// Trim every field; a blank image reference becomes `None`.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price.trim().to_string(),
            image_ref: self
                .image_ref
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        }
    }

    /// JSON row body for insert/update requests.
    pub fn to_row(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "description": self.description,
            "price": self.price,
            "image_url": self.image_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_server_map() {
        let row = json!({
            "id": 3,
            "title": "Consultation",
            "description": "30-minute session",
            "price": "$50",
            "image_url": null,
            "created_at": "2024-05-01T10:15:30+00:00",
        });
        let offering = Offering::from_server_map(&row).unwrap();
        assert_eq!(offering.id, "3");
        assert_eq!(offering.title, "Consultation");
        assert!(offering.image_ref.is_none());
        assert_eq!(offering.price_label(), "$50");
    }

    #[test]
    fn test_price_label_fallback() {
        let row = json!({
            "id": "a",
            "title": "Custom work",
            "description": null,
            "price": "  ",
            "created_at": "2024-05-01T10:15:30Z",
        });
        let offering = Offering::from_server_map(&row).unwrap();
        assert_eq!(offering.description, "");
        assert_eq!(offering.price_label(), "Contact for pricing");
    }

    #[test]
    fn test_fields_to_row_uses_column_names() {
        let fields = OfferingFields::new("Consultation", "30-minute session", "$50", None);
        let row = fields.to_row();
        assert_eq!(row["title"], "Consultation");
        assert!(row["image_url"].is_null());
        assert!(row.get("image_ref").is_none());
    }

    #[test]
    fn test_normalized_trims_and_drops_blank_image() {
        let fields = OfferingFields::new(" Yoga ", " Morning class ", " $20 ", Some("  ".into()));
        let normalized = fields.normalized();
        assert_eq!(normalized.title, "Yoga");
        assert_eq!(normalized.price, "$20");
        assert!(normalized.image_ref.is_none());
    }
}
