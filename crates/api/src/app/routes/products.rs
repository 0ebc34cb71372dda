use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Multipart},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use movequote_catalog::{Dimensions, NewCatalogItem};
use movequote_core::ItemId;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/addproduct", post(add_product))
        .route("/getallproducts", get(get_all_products))
}

/// Raw multipart fields, collected before any validation or side effect.
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    item_type: Option<String>,
    length: Option<String>,
    height: Option<String>,
    width: Option<String>,
    image: Option<(Vec<u8>, String, String)>,
}

pub async fn add_product(
    Extension(services): Extension<Arc<AppServices>>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let mut form = ProductForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "malformed_multipart",
                    e.to_string(),
                );
            }
        };

        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "img" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(e) => {
                        return errors::json_error(
                            StatusCode::BAD_REQUEST,
                            "malformed_multipart",
                            format!("reading image part: {e}"),
                        );
                    }
                };
                form.image = Some((bytes, filename, content_type));
            }
            other => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) => {
                        return errors::json_error(
                            StatusCode::BAD_REQUEST,
                            "malformed_multipart",
                            format!("reading field {other}: {e}"),
                        );
                    }
                };
                match other {
                    "name" => form.name = Some(value),
                    "type" => form.item_type = Some(value),
                    "length" => form.length = Some(value),
                    "height" => form.height = Some(value),
                    "width" => form.width = Some(value),
                    _ => {}
                }
            }
        }
    }

    // Validate everything before the upload side effect.
    let length = match parse_dimension("length", form.length) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let height = match parse_dimension("height", form.height) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let width = match parse_dimension("width", form.width) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let dimensions = match Dimensions::new(length, height, width) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let draft = match NewCatalogItem::new(
        form.name.unwrap_or_default(),
        form.item_type.unwrap_or_default(),
        dimensions,
    ) {
        Ok(draft) => draft,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let Some((bytes, filename, content_type)) = form.image else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Image file is required.",
        );
    };

    // Ingest first; an upload failure must not leave a dangling catalog entry.
    let image_ref = match services.images.upload(bytes, &filename, &content_type).await {
        Ok(image_ref) => image_ref,
        Err(e) => return errors::ingest_error_to_response(e),
    };

    let item = match draft.build(ItemId::new(), image_ref.secure_url) {
        Ok(item) => item,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.catalog.insert(&item).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(item_id = %item.id, "catalog item created");
    (StatusCode::OK, Json(item)).into_response()
}

fn parse_dimension(
    label: &'static str,
    value: Option<String>,
) -> Result<f64, axum::response::Response> {
    let raw = value.ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("{label} is required"),
        )
    })?;

    raw.trim().parse::<f64>().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("{label} must be a number"),
        )
    })
}

pub async fn get_all_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.list_all().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
