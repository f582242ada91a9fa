//! HTML element classification used while building tags.

/// Inline elements: rendered without forcing surrounding line breaks.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "br", "code", "em", "font", "i", "img",
    "ins", "kbd", "map", "samp", "small", "span", "strong", "sub", "sup",
];

pub fn is_inline_element(tag: &str) -> bool {
    INLINE_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_elements() {
        assert!(is_inline_element("span"));
        assert!(is_inline_element("A"));
        assert!(!is_inline_element("div"));
        assert!(!is_inline_element("section"));
    }
}
