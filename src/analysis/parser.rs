//! Item and quantity text parsing.
//!
//! Order exports carry the ordered SKUs as free text such as
//! `"SKU: A1, B2 / Blue, Large"` and the quantities as a parallel
//! comma-separated list such as `"3,5"`. The functions here turn those
//! two cells into [`LineItem`]s.

use crate::models::LineItem;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// A `SKU:` marker repeated one or more times, e.g. `SKU: SKU:`.
static DUPLICATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SKU:(?:\s*SKU:)+").expect("valid duplicate prefix pattern"));

/// Text after the first `SKU:` up to `" /"` or the end of the cell.
///
/// Whitespace after the marker stays in the capture so a terminator right
/// after `SKU: ` still ends the segment; pieces are trimmed afterwards.
static SKU_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)SKU:(.*?)(?: /|$)").expect("valid SKU pattern"));

/// Collapse duplicated `SKU:` prefixes into a single marker.
pub fn normalize_items(text: &str) -> Cow<'_, str> {
    DUPLICATE_PREFIX.replace_all(text, "SKU:")
}

/// Extract the ordered SKU list from an item cell.
///
/// Returns `None` when the text has no `SKU:` marker or the marker is
/// followed by nothing but separators.
pub fn parse_skus(text: &str) -> Option<Vec<String>> {
    let normalized = normalize_items(text);
    let segment = SKU_SEGMENT.captures(&normalized)?.get(1)?.as_str();

    let skus: Vec<String> = segment
        .split(',')
        .map(str::trim)
        .filter(|sku| !sku.is_empty())
        .map(String::from)
        .collect();

    if skus.is_empty() {
        None
    } else {
        Some(skus)
    }
}

/// Parse a comma-separated quantity cell.
///
/// Every position yields a value: blank, non-numeric or non-positive
/// pieces become 1, so an empty cell parses as `[1]`. Parsing is strict:
/// a piece must be a whole integer, so `"3 pcs"` or `"2.0"` also become 1
/// rather than reading a leading number.
pub fn parse_quantities(text: &str) -> Vec<u32> {
    text.split(',').map(parse_quantity).collect()
}

fn parse_quantity(piece: &str) -> u32 {
    match piece.trim().parse::<u32>() {
        Ok(qty) if qty > 0 => qty,
        _ => 1,
    }
}

/// Pair SKUs with quantities by position.
///
/// Quantities past the end of the SKU list are ignored; SKUs without a
/// quantity default to 1.
pub fn pair_line_items(skus: &[String], quantities: &[u32]) -> Vec<LineItem> {
    skus.iter()
        .enumerate()
        .map(|(i, sku)| LineItem::new(sku.clone(), quantities.get(i).copied().unwrap_or(1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_duplicate_prefix() {
        assert_eq!(normalize_items("SKU: SKU: ABC123"), "SKU: ABC123");
        assert_eq!(normalize_items("SKU:SKU: SKU: X"), "SKU: X");
        assert_eq!(normalize_items("SKU: ABC123"), "SKU: ABC123");
    }

    #[test]
    fn test_parse_single_sku_with_suffix() {
        assert_eq!(
            parse_skus("SKU: SKU: ABC123 / extra"),
            Some(vec!["ABC123".to_string()])
        );
    }

    #[test]
    fn test_parse_multiple_skus() {
        assert_eq!(
            parse_skus("SKU: A1, B2 /misc"),
            Some(vec!["A1".to_string(), "B2".to_string()])
        );
    }

    #[test]
    fn test_parse_sku_to_end_of_text() {
        assert_eq!(parse_skus("SKU: A1"), Some(vec!["A1".to_string()]));
        assert_eq!(
            parse_skus("Blue mug SKU:MUG-01,MUG-02"),
            Some(vec!["MUG-01".to_string(), "MUG-02".to_string()])
        );
    }

    #[test]
    fn test_slash_without_space_is_part_of_sku() {
        assert_eq!(parse_skus("SKU: A/1 / x"), Some(vec!["A/1".to_string()]));
    }

    #[test]
    fn test_parse_without_marker() {
        assert_eq!(parse_skus("Gift card"), None);
        assert_eq!(parse_skus(""), None);
        assert_eq!(parse_skus("sku: lowercase"), None);
    }

    #[test]
    fn test_parse_empty_segment() {
        assert_eq!(parse_skus("SKU: / nothing"), None);
        assert_eq!(parse_skus("SKU: SKU: / gift"), None);
        assert_eq!(parse_skus("SKU:  / spaced"), None);
        assert_eq!(parse_skus("SKU: , ,"), None);
    }

    #[test]
    fn test_parse_drops_blank_pieces() {
        assert_eq!(
            parse_skus("SKU: A1,, B2,"),
            Some(vec!["A1".to_string(), "B2".to_string()])
        );
    }

    #[test]
    fn test_parse_quantities() {
        assert_eq!(parse_quantities("3,5"), vec![3, 5]);
        assert_eq!(parse_quantities(" 2 , 4 "), vec![2, 4]);
        assert_eq!(parse_quantities(""), vec![1]);
        assert_eq!(parse_quantities("3 pcs,2.0"), vec![1, 1]);
        assert_eq!(parse_quantities("abc,0,-2,6"), vec![1, 1, 1, 6]);
    }

    #[test]
    fn test_pair_with_missing_quantities() {
        let skus = vec!["A1".to_string(), "B2".to_string(), "C3".to_string()];
        let items = pair_line_items(&skus, &[4]);
        assert_eq!(
            items,
            vec![
                LineItem::new("A1", 4),
                LineItem::new("B2", 1),
                LineItem::new("C3", 1),
            ]
        );
    }

    #[test]
    fn test_pair_ignores_extra_quantities() {
        let skus = vec!["A1".to_string()];
        let items = pair_line_items(&skus, &[2, 9]);
        assert_eq!(items, vec![LineItem::new("A1", 2)]);
    }
}
