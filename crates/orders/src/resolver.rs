use serde::{Deserialize, Serialize};
use thiserror::Error;

use movequote_catalog::ItemLookup;
use movequote_core::{ItemId, round3};

use crate::order::OrderLineItem;

/// A client-supplied (item id, quantity) pair, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub item_id: ItemId,
    pub quantity: i64,
}

/// Resolver behavior switches.
#[derive(Debug, Copy, Clone, Default)]
pub struct ResolverOptions {
    /// When false (default), duplicate item ids stay separate line items in
    /// input order, matching the system's documented behavior. When true,
    /// duplicates are summed into the first occurrence's position.
    pub merge_duplicates: bool,
}

/// Failure of a whole resolution. No partial line-item list ever escapes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("selection list is empty")]
    EmptySelection,

    #[error("quantity for item {0} must be a positive integer")]
    InvalidQuantity(ItemId),

    #[error("catalog item {0} not found")]
    ItemNotFound(ItemId),

    #[error("catalog lookup failed: {0}")]
    Lookup(String),
}

/// Resolve selections into normalized line items.
///
/// Selections are processed in input order, and the output preserves that
/// order (it determines the row order of the notification table). The first
/// invalid quantity or unresolvable id fails the entire resolution; an empty
/// selection list is rejected before any lookup is issued.
pub async fn resolve<L>(
    lookup: &L,
    selections: &[Selection],
    options: ResolverOptions,
) -> Result<Vec<OrderLineItem>, ResolveError>
where
    L: ItemLookup + ?Sized,
{
    if selections.is_empty() {
        return Err(ResolveError::EmptySelection);
    }

    let merged;
    let effective: &[Selection] = if options.merge_duplicates {
        // Validate the raw occurrences first so an invalid quantity is
        // reported even when summing would mask it.
        for selection in selections {
            validated_quantity(selection)?;
        }
        merged = merge_selections(selections);
        &merged
    } else {
        selections
    };

    let mut lines = Vec::with_capacity(effective.len());
    for selection in effective {
        let quantity = validated_quantity(selection)?;

        let item = lookup
            .find(selection.item_id)
            .await
            .map_err(|e| ResolveError::Lookup(e.to_string()))?
            .ok_or(ResolveError::ItemNotFound(selection.item_id))?;

        lines.push(OrderLineItem {
            item_id: item.id,
            name: item.name,
            quantity,
            volume: round3(item.volume * f64::from(quantity)),
        });
    }

    Ok(lines)
}

fn validated_quantity(selection: &Selection) -> Result<u32, ResolveError> {
    if selection.quantity <= 0 {
        return Err(ResolveError::InvalidQuantity(selection.item_id));
    }
    u32::try_from(selection.quantity).map_err(|_| ResolveError::InvalidQuantity(selection.item_id))
}

/// Sum duplicate ids into the first occurrence, preserving first-occurrence
/// order. Quantities saturate rather than overflow; the per-line bound is
/// re-checked after merging.
fn merge_selections(selections: &[Selection]) -> Vec<Selection> {
    let mut merged: Vec<Selection> = Vec::new();
    for selection in selections {
        match merged.iter_mut().find(|m| m.item_id == selection.item_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(selection.quantity);
            }
            None => merged.push(selection.clone()),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use movequote_catalog::{CatalogItem, Dimensions, LookupFailure, NewCatalogItem};

    /// Test catalog that counts how many lookups were issued.
    struct FakeCatalog {
        items: HashMap<ItemId, CatalogItem>,
        calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn new(items: Vec<CatalogItem>) -> Self {
            Self {
                items: items.into_iter().map(|i| (i.id, i)).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItemLookup for FakeCatalog {
        async fn find(&self, id: ItemId) -> Result<Option<CatalogItem>, LookupFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.get(&id).cloned())
        }
    }

    fn item(name: &str, l: f64, h: f64, w: f64) -> CatalogItem {
        NewCatalogItem::new(name, "box", Dimensions::new(l, h, w).unwrap())
            .unwrap()
            .build(ItemId::new(), "https://cdn.example/img.png")
            .unwrap()
    }

    fn select(id: ItemId, quantity: i64) -> Selection {
        Selection {
            item_id: id,
            quantity,
        }
    }

    #[tokio::test]
    async fn empty_selection_fails_before_any_lookup() {
        let catalog = FakeCatalog::new(vec![]);
        let err = resolve(&catalog, &[], ResolverOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::EmptySelection);
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn resolves_lines_in_input_order() {
        let box_s = item("Box-S", 2.0, 1.0, 0.5);
        let sofa = item("Sofa", 2.0, 1.0, 1.2);
        let catalog = FakeCatalog::new(vec![box_s.clone(), sofa.clone()]);

        let selections = [select(sofa.id, 1), select(box_s.id, 3)];
        let lines = resolve(&catalog, &selections, ResolverOptions::default())
            .await
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Sofa");
        assert_eq!(lines[1].name, "Box-S");
        assert_eq!(lines[1].quantity, 3);
        assert_eq!(lines[1].volume, 3.0);
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test]
    async fn line_volume_is_rounded_item_volume_times_quantity() {
        // 1/3 m^3 item volume rounds to 0.333; times 3 is 0.999, not 1.0.
        let tube = item("Tube", 1.0 / 3.0, 1.0, 1.0);
        let catalog = FakeCatalog::new(vec![tube.clone()]);

        let lines = resolve(&catalog, &[select(tube.id, 3)], ResolverOptions::default())
            .await
            .unwrap();
        assert_eq!(lines[0].volume, 0.999);
    }

    #[tokio::test]
    async fn unknown_id_fails_whole_resolution_and_short_circuits() {
        let box_s = item("Box-S", 2.0, 1.0, 0.5);
        let catalog = FakeCatalog::new(vec![box_s.clone()]);
        let missing = ItemId::new();

        let selections = [select(box_s.id, 1), select(missing, 2), select(box_s.id, 1)];
        let err = resolve(&catalog, &selections, ResolverOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err, ResolveError::ItemNotFound(missing));
        // The third selection is never looked up.
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected_without_a_lookup() {
        let box_s = item("Box-S", 2.0, 1.0, 0.5);
        let catalog = FakeCatalog::new(vec![box_s.clone()]);

        for bad in [0, -1] {
            let err = resolve(
                &catalog,
                &[select(box_s.id, bad)],
                ResolverOptions::default(),
            )
            .await
            .unwrap_err();
            assert_eq!(err, ResolveError::InvalidQuantity(box_s.id));
        }
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn duplicates_stay_separate_lines_by_default() {
        let box_s = item("Box-S", 2.0, 1.0, 0.5);
        let catalog = FakeCatalog::new(vec![box_s.clone()]);

        let selections = [select(box_s.id, 1), select(box_s.id, 2)];
        let lines = resolve(&catalog, &selections, ResolverOptions::default())
            .await
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 1);
        assert_eq!(lines[1].quantity, 2);
    }

    #[tokio::test]
    async fn duplicates_merge_when_enabled() {
        let box_s = item("Box-S", 2.0, 1.0, 0.5);
        let sofa = item("Sofa", 2.0, 1.0, 1.2);
        let catalog = FakeCatalog::new(vec![box_s.clone(), sofa.clone()]);

        let selections = [select(box_s.id, 1), select(sofa.id, 1), select(box_s.id, 2)];
        let options = ResolverOptions {
            merge_duplicates: true,
        };
        let lines = resolve(&catalog, &selections, options).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Box-S");
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].volume, 3.0);
        assert_eq!(lines[1].name, "Sofa");
        // One lookup per merged line, not per raw occurrence.
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test]
    async fn merge_still_rejects_an_invalid_occurrence() {
        let box_s = item("Box-S", 2.0, 1.0, 0.5);
        let catalog = FakeCatalog::new(vec![box_s.clone()]);

        // 3 and -1 would sum to a valid 2; the invalid occurrence must still fail.
        let selections = [select(box_s.id, 3), select(box_s.id, -1)];
        let options = ResolverOptions {
            merge_duplicates: true,
        };
        let err = resolve(&catalog, &selections, options).await.unwrap_err();
        assert_eq!(err, ResolveError::InvalidQuantity(box_s.id));
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn name_is_snapshotted_from_the_catalog_record() {
        let wardrobe = item("Wardrobe", 1.0, 2.0, 0.6);
        let catalog = FakeCatalog::new(vec![wardrobe.clone()]);

        let lines = resolve(&catalog, &[select(wardrobe.id, 1)], ResolverOptions::default())
            .await
            .unwrap();
        assert_eq!(lines[0].item_id, wardrobe.id);
        assert_eq!(lines[0].name, "Wardrobe");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arbitrary_selections() -> impl Strategy<Value = Vec<Selection>> {
            // A small id pool so duplicates actually occur.
            let ids: Vec<ItemId> = (0..4).map(|_| ItemId::new()).collect();
            prop::collection::vec(
                (0usize..4, 1i64..1000).prop_map(move |(idx, quantity)| Selection {
                    item_id: ids[idx],
                    quantity,
                }),
                1..20,
            )
        }

        proptest! {
            /// Property: merging preserves the total quantity per id and
            /// first-occurrence ordering.
            #[test]
            fn merge_preserves_totals_and_order(selections in arbitrary_selections()) {
                let merged = merge_selections(&selections);

                // One line per distinct id.
                let mut seen = Vec::new();
                for s in &selections {
                    if !seen.contains(&s.item_id) {
                        seen.push(s.item_id);
                    }
                }
                prop_assert_eq!(merged.len(), seen.len());

                // Order of first occurrence is preserved.
                let merged_ids: Vec<_> = merged.iter().map(|m| m.item_id).collect();
                prop_assert_eq!(&merged_ids, &seen);

                // Quantities sum per id.
                for m in &merged {
                    let expected: i64 = selections
                        .iter()
                        .filter(|s| s.item_id == m.item_id)
                        .map(|s| s.quantity)
                        .sum();
                    prop_assert_eq!(m.quantity, expected);
                }
            }
        }
    }
}
