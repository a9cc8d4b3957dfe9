//! Order identifier extraction from free-form input.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Grouped 8-4-4-4-12 hex token, not embedded in a longer word.
const ORDER_ID_PATTERN: &str =
    r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b";

fn order_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ORDER_ID_PATTERN).expect("order id pattern is valid"))
}

/// An order identifier as it appeared in the user's input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Find the first well-formed order identifier in `input`.
///
/// Accepts a bare identifier or any text containing one (typically a
/// tracking URL). Ungrouped or malformed hex runs are not matched.
pub fn extract_order_id(input: &str) -> Option<OrderId> {
    order_id_regex()
        .find(input)
        .map(|m| OrderId(m.as_str().to_string()))
}
