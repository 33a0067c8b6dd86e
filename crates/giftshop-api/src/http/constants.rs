//! Shared HTTP constants (headers, form fields, problem URIs, messages).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const HEADER_ADMIN_PASSWORD: &str = "x-giftshop-admin-password";

pub(crate) const FIELD_PASSWORD: &str = "password";
pub(crate) const FIELD_ID: &str = "id";
pub(crate) const FIELD_TITLE: &str = "title";
pub(crate) const FIELD_PRICE: &str = "price";
pub(crate) const FIELD_DESC: &str = "desc";
pub(crate) const FIELD_IMAGES: &str = "images";
pub(crate) const FIELD_IMAGE: &str = "image";

pub(crate) const PROBLEM_INTERNAL: &str = "https://giftshop.dev/problems/internal";
pub(crate) const PROBLEM_UNAUTHORIZED: &str = "https://giftshop.dev/problems/unauthorized";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://giftshop.dev/problems/bad-request";
pub(crate) const PROBLEM_NOT_FOUND: &str = "https://giftshop.dev/problems/not-found";
pub(crate) const PROBLEM_PAYLOAD_TOO_LARGE: &str =
    "https://giftshop.dev/problems/payload-too-large";
pub(crate) const PROBLEM_TOO_MANY_FILES: &str = "https://giftshop.dev/problems/too-many-files";
pub(crate) const PROBLEM_UNSUPPORTED_IMAGE: &str =
    "https://giftshop.dev/problems/unsupported-image";

pub(crate) const MSG_UNAUTHORIZED: &str = "Unauthorized. Invalid admin password.";
pub(crate) const MSG_NOT_FOUND: &str = "Item not found";
pub(crate) const MSG_UNSUPPORTED_IMAGE: &str = "Only image files are allowed.";
pub(crate) const MSG_INTERNAL: &str = "Internal server error.";
pub(crate) const MSG_MISSING_ID: &str = "Missing item id.";
pub(crate) const MSG_MALFORMED_BODY: &str = "Malformed request body.";
