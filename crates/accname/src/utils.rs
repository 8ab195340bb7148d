//! Whitespace helpers shared by the walker and the orchestrator

/// Replace every run of whitespace with a single space, keeping one space
/// at either end when the input had whitespace there
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Surround non-blank text with single spaces so neighbours never fuse
pub fn add_spacing(text: &str) -> String {
    let text = collapse_whitespace(text.trim());
    if text.is_empty() {
        text
    } else {
        format!(" {} ", text)
    }
}

/// Final form of a name or description: collapsed and trimmed
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert_eq!(collapse_whitespace("\n a  "), " a ");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_add_spacing() {
        assert_eq!(add_spacing("  Close  "), " Close ");
        assert_eq!(add_spacing(" \n "), "");
        assert_eq!(add_spacing("two\nlines"), " two lines ");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hello \u{a0}  world \n"), "Hello world");
        assert_eq!(normalize("\t"), "");
    }
}
