use serde::Deserialize;

use movequote_infra::OrderListing;

// -------------------------
// Request DTOs
// -------------------------

/// One client selection. Fields are optional so the boundary can report a
/// precise 400 instead of a generic body rejection.
#[derive(Debug, Deserialize)]
pub struct SelectedProductRequest {
    pub product: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOrderRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub message: Option<String>,
    pub selected_products: Option<Vec<SelectedProductRequest>>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn order_listing_to_json(listing: OrderListing) -> serde_json::Value {
    let customer = &listing.order.customer;
    let lines = listing
        .order
        .lines
        .iter()
        .zip(listing.catalog.iter())
        .map(|(line, joined)| {
            serde_json::json!({
                // Current catalog record, null when the item no longer exists.
                "product": joined,
                "productId": line.item_id.to_string(),
                "name": line.name,
                "quantity": line.quantity,
                "volume": line.volume,
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({
        "id": listing.order.id.to_string(),
        "name": customer.name,
        "email": customer.email,
        "phone": customer.phone,
        "address": customer.address,
        "message": customer.message,
        "submittedAt": listing.order.submitted_at.to_rfc3339(),
        "totalVolume": listing.order.total_volume(),
        "selectedProducts": lines,
    })
}
