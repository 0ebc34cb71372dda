use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use movequote_core::{ItemId, OrderId};
use movequote_orders::{CustomerDetails, Order, Selection, resolve};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/adduserdetail", post(add_user_detail))
        .route("/getalluserdetails", get(get_all_user_details))
}

pub async fn add_user_detail(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::AddOrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                rejection.body_text(),
            );
        }
    };

    let customer = match CustomerDetails::new(
        body.name.unwrap_or_default(),
        body.email.unwrap_or_default(),
        body.phone.unwrap_or_default(),
        body.address.unwrap_or_default(),
        body.message.unwrap_or_default(),
    ) {
        Ok(customer) => customer,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // A missing selection list behaves like an empty one: rejected before
    // any lookup.
    let raw_selections = body.selected_products.unwrap_or_default();
    let mut selections = Vec::with_capacity(raw_selections.len());
    for raw in &raw_selections {
        let Some(product) = raw.product.as_deref() else {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "selection is missing a product id",
            );
        };
        let item_id: ItemId = match product.parse() {
            Ok(id) => id,
            Err(e) => return errors::domain_error_to_response(e),
        };
        let Some(quantity) = raw.quantity else {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("selection for item {item_id} is missing a quantity"),
            );
        };
        selections.push(Selection { item_id, quantity });
    }

    let lines = match resolve(&services.lookup, &selections, services.resolver_options).await {
        Ok(lines) => lines,
        Err(e) => return errors::resolve_error_to_response(e),
    };

    let order = match Order::new(OrderId::new(), Utc::now(), customer, lines) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.orders.insert(&order).await {
        return errors::store_error_to_response(e);
    }

    // The order is committed at this point. Notification is best-effort: a
    // failed send is flagged in the response, never rolled back or masked
    // as a request failure.
    let notification = match services.notifier.notify(&order).await {
        Ok(()) => "sent",
        Err(e) => {
            tracing::warn!(order_id = %order.id, "order notification failed: {e}");
            "pending"
        }
    };

    tracing::info!(order_id = %order.id, lines = order.lines.len(), "order received");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "order received",
            "orderId": order.id.to_string(),
            "notification": notification,
        })),
    )
        .into_response()
}

pub async fn get_all_user_details(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.orders.list_all().await {
        Ok(listings) => {
            let body = listings
                .into_iter()
                .map(dto::order_listing_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
