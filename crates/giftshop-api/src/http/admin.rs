//! Admin mutations: upload, edit, delete.
//!
//! # Design
//! - A password sent in the admin header is checked before the body is read.
//!   Otherwise the body is read completely into memory and its password is
//!   checked before anything reaches the disk.
//! - File size and count limits are enforced while the body streams in.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{
        FromRequest, Multipart, Request, State,
        multipart::{Field, MultipartRejection},
    },
    http::{HeaderMap, header::CONTENT_TYPE},
};
use giftshop_catalog::{IncomingImage, Item, ItemEdit, UploadBatch};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::auth::{authorize, header_password};
use crate::http::constants::{
    FIELD_DESC, FIELD_ID, FIELD_IMAGE, FIELD_IMAGES, FIELD_PASSWORD, FIELD_PRICE, FIELD_TITLE,
    MSG_MALFORMED_BODY, MSG_MISSING_ID,
};
use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    success: bool,
    uploaded: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditResponse {
    success: bool,
    item: Item,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteResponse {
    success: bool,
}

/// Body of `POST /admin/delete`, as JSON or url-encoded form.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeleteRequest {
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Text fields and files of an admin multipart form.
#[derive(Debug, Default)]
struct AdminForm {
    password: Option<String>,
    id: Option<String>,
    title: Option<String>,
    price: Option<String>,
    desc: Option<String>,
    files: Vec<IncomingImage>,
}

/// Which file field to accept and how many files it may carry.
#[derive(Debug, Clone, Copy)]
struct FileRule {
    field: &'static str,
    max_files: usize,
    max_file_bytes: usize,
}

pub(crate) async fn upload(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let result = upload_items(&state, &headers, multipart).await;
    state.record_mutation("upload", &result);

    Ok(Json(UploadResponse {
        success: true,
        uploaded: result?,
    }))
}

pub(crate) async fn edit(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EditResponse>, ApiError> {
    let result = edit_item(&state, &headers, multipart).await;
    state.record_mutation("edit", &result);

    Ok(Json(EditResponse {
        success: true,
        item: result?,
    }))
}

pub(crate) async fn delete(
    State(state): State<Arc<ApiState>>,
    request: Request,
) -> Result<Json<DeleteResponse>, ApiError> {
    let result = delete_item(&state, request).await;
    state.record_mutation("delete", &result);

    result.map(|()| Json(DeleteResponse { success: true }))
}

async fn upload_items(
    state: &ApiState,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<Item>, ApiError> {
    let multipart =
        multipart.map_err(|rejection| ApiError::from_multipart_rejection(&rejection))?;
    let rule = FileRule {
        field: FIELD_IMAGES,
        max_files: state.limits.max_files,
        max_file_bytes: state.limits.max_file_bytes,
    };
    let form = read_authorized_form(state, headers, multipart, rule).await?;
    debug!(files = form.files.len(), "admin upload accepted");

    let batch = UploadBatch {
        files: form.files,
        title: form.title,
        price: form.price,
        desc: form.desc,
    };
    Ok(state.catalog.upload(batch).await?)
}

async fn edit_item(
    state: &ApiState,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Item, ApiError> {
    let multipart =
        multipart.map_err(|rejection| ApiError::from_multipart_rejection(&rejection))?;
    let rule = FileRule {
        field: FIELD_IMAGE,
        max_files: 1,
        max_file_bytes: state.limits.max_file_bytes,
    };
    let form = read_authorized_form(state, headers, multipart, rule).await?;
    let id = required_id(form.id)?;

    let edit = ItemEdit {
        id,
        title: form.title,
        price: form.price,
        desc: form.desc,
        image: form.files.into_iter().next(),
    };
    Ok(state.catalog.edit(edit).await?)
}

async fn delete_item(state: &ApiState, request: Request) -> Result<(), ApiError> {
    let header = header_password(request.headers()).map(str::to_owned);
    if let Some(password) = header.as_deref() {
        authorize(state, Some(password)).await?;
    }
    let body = read_delete_body(request).await?;
    if header.is_none() {
        authorize(state, body.password.as_deref()).await?;
    }
    let id = required_id(body.id)?;
    state.catalog.delete(&id).await?;
    Ok(())
}

async fn read_authorized_form(
    state: &ApiState,
    headers: &HeaderMap,
    multipart: Multipart,
    rule: FileRule,
) -> Result<AdminForm, ApiError> {
    if let Some(password) = header_password(headers) {
        authorize(state, Some(password)).await?;
        return read_form(multipart, rule).await;
    }
    let form = read_form(multipart, rule).await?;
    authorize(state, form.password.as_deref()).await?;
    Ok(form)
}

async fn read_form(mut multipart: Multipart, rule: FileRule) -> Result<AdminForm, ApiError> {
    let mut form = AdminForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::from_multipart(&err))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            // Browsers send an empty part for a file input left blank.
            if name != rule.field || file_name.is_empty() {
                continue;
            }
            if form.files.len() >= rule.max_files {
                return Err(ApiError::too_many_files(rule.max_files));
            }
            let bytes = read_file(&mut field, rule.max_file_bytes).await?;
            form.files.push(IncomingImage {
                original_name: file_name,
                bytes,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|err| ApiError::from_multipart(&err))?;
        let slot = match name.as_str() {
            FIELD_PASSWORD => &mut form.password,
            FIELD_ID => &mut form.id,
            FIELD_TITLE => &mut form.title,
            FIELD_PRICE => &mut form.price,
            FIELD_DESC => &mut form.desc,
            _ => continue,
        };
        *slot = Some(value);
    }

    Ok(form)
}

async fn read_file(field: &mut Field<'_>, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|err| ApiError::from_multipart(&err))?
    {
        if bytes.len().saturating_add(chunk.len()) > max_bytes {
            return Err(ApiError::payload_too_large(format!(
                "File too large. Limit is {max_bytes} bytes."
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_delete_body(request: Request) -> Result<DeleteRequest, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let Json(body) = Json::<DeleteRequest>::from_request(request, &())
            .await
            .map_err(|_| ApiError::bad_request(MSG_MALFORMED_BODY))?;
        Ok(body)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(body) = Form::<DeleteRequest>::from_request(request, &())
            .await
            .map_err(|_| ApiError::bad_request(MSG_MALFORMED_BODY))?;
        Ok(body)
    } else if content_type.is_empty() {
        Ok(DeleteRequest::default())
    } else {
        Err(ApiError::bad_request(MSG_MALFORMED_BODY))
    }
}

fn required_id(id: Option<String>) -> Result<String, ApiError> {
    id.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request(MSG_MISSING_ID))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_id_trims_and_rejects_blank() {
        assert_eq!(required_id(Some(" item-1 ".into())).ok(), Some("item-1".into()));
        assert!(required_id(Some("  ".into())).is_err());
        assert!(required_id(None).is_err());
    }
}
