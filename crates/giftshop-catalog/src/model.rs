//! Catalog records and request payloads.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Metadata record persisted in `items.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier (`item-<millis>-<n>` for uploads, `img-<file>` for adopted images).
    #[serde(deserialize_with = "key_string")]
    pub id: String,
    /// Image file name inside the products directory.
    #[serde(deserialize_with = "key_string")]
    pub filename: String,
    /// Display title.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// Free-form price text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    /// Free-form description.
    #[serde(default, deserialize_with = "lenient_string")]
    pub desc: String,
    /// Keys written by hand or older versions, kept so rewrites do not drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Record with empty price/description and no extra keys.
    #[must_use]
    pub fn new(id: impl Into<String>, filename: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            title: title.into(),
            price: String::new(),
            desc: String::new(),
            extra: Map::new(),
        }
    }
}

/// Entry of the public listing: an item plus its image modification time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// Persisted or synthesised metadata.
    #[serde(flatten)]
    pub item: Item,
    /// Image modification time in milliseconds since the Unix epoch; `0` when unknown.
    pub mtime: i64,
}

/// Image found in the products directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name.
    pub name: String,
    /// Modification time in milliseconds since the Unix epoch; `0` when unknown.
    pub modified_ms: i64,
}

/// Uploaded file held in memory until it is written to the products directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingImage {
    /// File name as sent by the client.
    pub original_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// One admin upload: files plus metadata shared by every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    /// Images to store.
    pub files: Vec<IncomingImage>,
    /// Title for every created item; the original file name is used when empty.
    pub title: Option<String>,
    /// Price for every created item.
    pub price: Option<String>,
    /// Description for every created item.
    pub desc: Option<String>,
}

/// Changes to one item. Empty or absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemEdit {
    /// Identifier of the item to edit.
    pub id: String,
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement price.
    pub price: Option<String>,
    /// Replacement description.
    pub desc: Option<String>,
    /// Replacement image.
    pub image: Option<IncomingImage>,
}

/// Accept strings, numbers, booleans and `null` for free-text fields so a
/// hand-edited store still loads.
/// Numbers are accepted as keys; `null`, empty strings and other values are not.
fn key_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) if !text.is_empty() => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a non-empty string or number, found {other}"
        ))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_serialises_with_store_keys() -> serde_json::Result<()> {
        let mut item = Item::new("item-1", "mug.png", "Mug");
        item.price = "N5,000".to_string();
        let value = serde_json::to_value(&item)?;
        assert_eq!(
            value,
            json!({
                "id": "item-1",
                "filename": "mug.png",
                "title": "Mug",
                "price": "N5,000",
                "desc": ""
            })
        );
        Ok(())
    }

    #[test]
    fn item_tolerates_numbers_nulls_and_extra_keys() -> serde_json::Result<()> {
        let item: Item = serde_json::from_value(json!({
            "id": "item-2",
            "filename": "card.jpg",
            "title": null,
            "price": 2500,
            "featured": true
        }))?;
        assert_eq!(item.title, "");
        assert_eq!(item.price, "2500");
        assert_eq!(item.desc, "");
        assert_eq!(item.extra.get("featured"), Some(&json!(true)));

        let round = serde_json::to_value(&item)?;
        assert_eq!(round["featured"], json!(true));
        Ok(())
    }

    #[test]
    fn item_keys_accept_numbers_but_not_null() {
        let numeric: Result<Item, _> =
            serde_json::from_value(json!({ "id": 7, "filename": "legacy.png" }));
        assert_eq!(numeric.ok().map(|item| item.id), Some("7".to_string()));

        let null_id: Result<Item, _> =
            serde_json::from_value(json!({ "id": null, "filename": "legacy.png" }));
        assert!(null_id.is_err());

        let missing_filename: Result<Item, _> = serde_json::from_value(json!({ "id": "a" }));
        assert!(missing_filename.is_err());
    }

    #[test]
    fn product_flattens_item_fields() -> serde_json::Result<()> {
        let product = Product {
            item: Item::new("img-a.png", "a.png", "a"),
            mtime: 42,
        };
        let value = serde_json::to_value(&product)?;
        assert_eq!(value["id"], json!("img-a.png"));
        assert_eq!(value["mtime"], json!(42));
        Ok(())
    }
}
