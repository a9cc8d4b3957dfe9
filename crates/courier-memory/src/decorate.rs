//! Send-time formatting for payment text.
//!
//! Lines mentioning a known payment method get that method's marker in front.
//! Stored text is never modified.

/// Keyword (lowercase) to marker. The first matching keyword wins.
const MARKERS: &[(&str, &str)] = &[
    ("cashapp", "💵"),
    ("cash app", "💵"),
    ("venmo", "💙"),
    ("zelle", "💜"),
    ("paypal", "🅿️"),
    ("apple pay", "🍎"),
    ("chime", "💚"),
    ("bitcoin", "🪙"),
    ("usdt", "🪙"),
    ("crypto", "🪙"),
];

/// Short tickers that only count as whole words ("eth" is not "method").
const WORD_MARKERS: &[(&str, &str)] = &[("btc", "🪙"), ("eth", "🪙")];

/// Marker for a single line, if it mentions a known payment method.
fn marker_for(line: &str) -> Option<&'static str> {
    let lower = line.to_lowercase();
    MARKERS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .or_else(|| {
            WORD_MARKERS
                .iter()
                .find(|(word, _)| contains_word(&lower, word))
        })
        .map(|(_, marker)| *marker)
}

/// Whether `word` occurs in `line` with no letter or digit on either side.
fn contains_word(line: &str, word: &str) -> bool {
    line.match_indices(word).any(|(start, _)| {
        let before = line[..start].chars().next_back();
        let after = line[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Prefix every line that mentions a payment method with its marker.
///
/// Lines that already start with the marker are left alone.
pub fn decorate(text: &str) -> String {
    text.lines()
        .map(|line| match marker_for(line) {
            Some(marker) if !line.trim_start().starts_with(marker) => format!("{marker} {line}"),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
