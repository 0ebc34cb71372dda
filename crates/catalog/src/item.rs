use serde::{Deserialize, Serialize};

use movequote_core::{DomainError, ItemId, round3};

/// Physical dimensions of an item, all in the same unit.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub height: f64,
    pub width: f64,
}

impl Dimensions {
    /// Validate that every dimension is a positive, finite number.
    pub fn new(length: f64, height: f64, width: f64) -> Result<Self, DomainError> {
        for (label, value) in [("length", length), ("height", height), ("width", width)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DomainError::validation(format!(
                    "{label} must be a positive number"
                )));
            }
        }
        Ok(Self {
            length,
            height,
            width,
        })
    }

    /// Volume rounded half-up to 3 decimal places.
    pub fn volume(&self) -> f64 {
        round3(self.length * self.height * self.width)
    }
}

/// Validated item-creation input, not yet tied to an id or an image.
///
/// The image reference only exists after ingestion succeeds, so construction
/// happens in two steps: validate the raw fields up front (before any side
/// effect), then [`NewCatalogItem::build`] once the image URL is known.
#[derive(Debug, Clone)]
pub struct NewCatalogItem {
    name: String,
    item_type: String,
    dimensions: Dimensions,
}

impl NewCatalogItem {
    pub fn new(
        name: impl Into<String>,
        item_type: impl Into<String>,
        dimensions: Dimensions,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let item_type = item_type.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if item_type.trim().is_empty() {
            return Err(DomainError::validation("type cannot be empty"));
        }

        Ok(Self {
            name,
            item_type,
            dimensions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Finalize the catalog record. The volume is computed here, exactly once.
    pub fn build(self, id: ItemId, image_url: impl Into<String>) -> Result<CatalogItem, DomainError> {
        let image_url = image_url.into();
        if image_url.trim().is_empty() {
            return Err(DomainError::validation("image reference cannot be empty"));
        }

        Ok(CatalogItem {
            id,
            name: self.name,
            item_type: self.item_type,
            image_url,
            length: self.dimensions.length,
            height: self.dimensions.height,
            width: self.dimensions.width,
            volume: self.dimensions.volume(),
        })
    }
}

/// A shippable item in the catalog.
///
/// Immutable once created; orders reference it by id and snapshot its name.
/// Wire names (`type`, `img`) match the public API surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(rename = "img")]
    pub image_url: String,
    pub length: f64,
    pub height: f64,
    pub width: f64,
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(l: f64, h: f64, w: f64) -> Dimensions {
        Dimensions::new(l, h, w).unwrap()
    }

    fn build_item(name: &str, d: Dimensions) -> CatalogItem {
        NewCatalogItem::new(name, "box", d)
            .unwrap()
            .build(ItemId::new(), "https://cdn.example/img.png")
            .unwrap()
    }

    #[test]
    fn volume_is_rounded_product_of_dimensions() {
        let item = build_item("Box-S", dims(2.0, 1.0, 0.5));
        assert_eq!(item.volume, 1.0);

        let item = build_item("Wardrobe", dims(1.1, 2.0, 0.6));
        assert_eq!(item.volume, 1.32);
    }

    #[test]
    fn irrational_products_round_to_three_places() {
        let item = build_item("Tube", dims(1.0 / 3.0, 1.0, 1.0));
        assert_eq!(item.volume, 0.333);
    }

    #[test]
    fn rejects_empty_name() {
        let err = NewCatalogItem::new("   ", "box", dims(1.0, 1.0, 1.0)).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("name")),
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn rejects_empty_type() {
        let err = NewCatalogItem::new("Box-S", "", dims(1.0, 1.0, 1.0)).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("type")),
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(Dimensions::new(bad, 1.0, 1.0).is_err());
            assert!(Dimensions::new(1.0, bad, 1.0).is_err());
            assert!(Dimensions::new(1.0, 1.0, bad).is_err());
        }
    }

    #[test]
    fn rejects_empty_image_reference() {
        let err = NewCatalogItem::new("Box-S", "box", dims(1.0, 1.0, 1.0))
            .unwrap()
            .build(ItemId::new(), "  ")
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("image")),
            _ => panic!("expected Validation error"),
        }
    }

    mod proptest_tests {
        use super::*;
        use movequote_core::round3;
        use proptest::prelude::*;

        proptest! {
            /// Property: the stored volume always equals round3(l*h*w).
            #[test]
            fn volume_invariant_holds(
                l in 0.01f64..100.0,
                h in 0.01f64..100.0,
                w in 0.01f64..100.0,
            ) {
                let item = NewCatalogItem::new("Item", "box", Dimensions::new(l, h, w).unwrap())
                    .unwrap()
                    .build(ItemId::new(), "https://cdn.example/i.png")
                    .unwrap();
                prop_assert_eq!(item.volume, round3(l * h * w));
                prop_assert!(item.volume > 0.0);
            }
        }
    }
}
