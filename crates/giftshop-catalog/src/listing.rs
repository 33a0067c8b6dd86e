//! Merge images on disk with metadata records.

use crate::model::{ImageFile, Item, Product};
use crate::naming::{default_title, orphan_id};

/// Build the public listing: one product per image, newest first.
///
/// Each image uses the first record naming it, or a synthesised record when
/// none does. Records whose image is gone are left out.
#[must_use]
pub fn merge_listing(images: &[ImageFile], items: &[Item]) -> Vec<Product> {
    let mut products: Vec<Product> = images
        .iter()
        .map(|image| {
            let item = items
                .iter()
                .find(|item| item.filename == image.name)
                .cloned()
                .unwrap_or_else(|| synthesize_item(&image.name));
            Product {
                item,
                mtime: image.modified_ms,
            }
        })
        .collect();
    products.sort_by(|left, right| right.mtime.cmp(&left.mtime));
    products
}

/// Record shown for an image nobody has described yet.
#[must_use]
pub fn synthesize_item(filename: &str) -> Item {
    Item::new(orphan_id(filename), filename, default_title(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, modified_ms: i64) -> ImageFile {
        ImageFile {
            name: name.to_string(),
            modified_ms,
        }
    }

    #[test]
    fn images_without_records_get_synthesised_items() {
        let products = merge_listing(&[image("blue_gift-box.png", 5)], &[]);
        assert_eq!(products.len(), 1);
        let item = &products[0].item;
        assert_eq!(item.id, "img-blue_gift-box.png");
        assert_eq!(item.title, "blue gift box");
        assert_eq!(item.price, "");
        assert_eq!(products[0].mtime, 5);
    }

    #[test]
    fn first_matching_record_wins_and_dangling_records_are_hidden() {
        let items = vec![
            Item::new("item-1", "mug.png", "First"),
            Item::new("item-2", "mug.png", "Second"),
            Item::new("item-3", "gone.png", "Gone"),
        ];
        let products = merge_listing(&[image("mug.png", 1)], &items);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].item.id, "item-1");
    }

    #[test]
    fn newest_first_and_stable_for_ties() {
        let images = [
            image("a.png", 10),
            image("b.png", 30),
            image("c.png", 10),
            image("d.png", 20),
        ];
        let names: Vec<String> = merge_listing(&images, &[])
            .into_iter()
            .map(|product| product.item.filename)
            .collect();
        assert_eq!(names, ["b.png", "d.png", "a.png", "c.png"]);
    }
}
