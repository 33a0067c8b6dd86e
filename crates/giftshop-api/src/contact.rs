//! `WhatsApp` click-to-chat links.

/// Prefix of the message sent when asking about one product.
pub const PRODUCT_GREETING: &str = "Hello, I want to buy this item: ";

/// Message sent from the storefront-wide contact link.
pub const STOREFRONT_GREETING: &str = "Hello, I would like to know more about your items.";

const WHATSAPP_BASE: &str = "https://wa.me/";

/// `https://wa.me/<number>?text=<message>` with the message percent-encoded.
#[must_use]
pub fn whatsapp_link(number: &str, message: &str) -> String {
    format!(
        "{WHATSAPP_BASE}{number}?text={}",
        urlencoding::encode(message)
    )
}

/// Link asking about one product, when a number is configured.
#[must_use]
pub fn product_contact_url(number: Option<&str>, title: &str) -> Option<String> {
    number.map(|number| whatsapp_link(number, &format!("{PRODUCT_GREETING}{title}")))
}

/// General enquiry link, when a number is configured.
#[must_use]
pub fn storefront_contact_url(number: Option<&str>) -> Option<String> {
    number.map(|number| whatsapp_link(number, STOREFRONT_GREETING))
}
