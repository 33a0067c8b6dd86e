//! Public listing and storefront details.

use std::sync::Arc;

use axum::{Json, extract::State};
use giftshop_catalog::Product;
use serde::Serialize;

use crate::contact::{product_contact_url, storefront_contact_url};
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Listing entry: the product plus its contact link.
#[derive(Debug, Serialize)]
pub(crate) struct ProductView {
    #[serde(flatten)]
    product: Product,
    contact_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StorefrontResponse {
    shop_name: String,
    whatsapp_number: Option<String>,
    contact_url: Option<String>,
}

pub(crate) async fn list_products(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let products = state.catalog.list_products().await?;
    state.telemetry.set_catalog_products(products.len());

    let number = state.contact.whatsapp_number.as_deref();
    let views = products
        .into_iter()
        .map(|product| {
            let contact_url = product_contact_url(number, &product.item.title);
            ProductView {
                product,
                contact_url,
            }
        })
        .collect();
    Ok(Json(views))
}

pub(crate) async fn storefront(State(state): State<Arc<ApiState>>) -> Json<StorefrontResponse> {
    let contact = &state.contact;
    Json(StorefrontResponse {
        shop_name: contact.shop_name.clone(),
        whatsapp_number: contact.whatsapp_number.clone(),
        contact_url: storefront_contact_url(contact.whatsapp_number.as_deref()),
    })
}
