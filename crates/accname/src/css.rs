//! Text and spacing derived from computed style
//!
//! - block-level detection (drives word separation)
//! - `::before` / `::after` generated content, `attr()` substituted

use crate::config::AccNameConfig;
use crate::error::Result;
use crate::oracle::{NodeKind, Oracles};
use dom::{NodeId, PseudoElement};

/// Property values that establish a block formatting context.
/// A leading `!` means "any value except this one (or a CSS-wide keyword)".
pub const BLOCK_STYLES: &[(&str, &[&str])] = &[
    ("display", &["block", "grid", "table", "flow-root", "flex"]),
    ("position", &["absolute", "fixed"]),
    ("float", &["left", "right", "inline"]),
    ("clear", &["left", "right", "both", "inline"]),
    ("overflow", &["hidden", "scroll", "auto"]),
    ("column-count", &["!auto"]),
    ("column-width", &["!auto"]),
    ("column-span", &["all"]),
    ("contain", &["layout", "content", "strict"]),
];

/// Block-level elements (`br` included: it separates words visually)
pub const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "br",
    "canvas",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "noscript",
    "ol",
    "output",
    "p",
    "pre",
    "section",
    "table",
    "tfoot",
    "tr",
    "td",
    "th",
    "ul",
    "video",
];

/// Elements whose generated content is never read
pub const NO_GENERATED_TEXT: &[&str] = &[
    "input", "select", "textarea", "img", "iframe", "video", "audio", "embed", "object",
];

const CSS_WIDE_KEYWORDS: &[&str] = &["inherit", "initial", "unset"];

/// `::before` and `::after` text of one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedText {
    pub before: String,
    pub after: String,
}

fn styles_indicate_block<'s>(
    mut lookup: impl FnMut(&str) -> Result<Option<&'s str>>,
) -> Result<bool> {
    for (property, values) in BLOCK_STYLES {
        let Some(value) = lookup(property)? else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        for wanted in values.iter() {
            let matched = match wanted.strip_prefix('!') {
                Some(excluded) => value != excluded && !CSS_WIDE_KEYWORDS.contains(&value),
                None => value.contains(wanted),
            };
            if matched {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// True when the element starts a new block of text
pub fn is_block_level(oracles: Oracles<'_>, node: NodeId) -> Result<bool> {
    if oracles.tree.kind(node)? != NodeKind::Element {
        return Ok(false);
    }
    let style = oracles.style;
    if styles_indicate_block(|property| style.computed(node, None, property))? {
        return Ok(true);
    }
    let tag = oracles.tree.tag_name(node)?;
    if !BLOCK_TAGS.contains(&tag) {
        return Ok(false);
    }
    let display = style.computed(node, None, "display")?.map(str::trim);
    Ok(display != Some("inline"))
}

/// Generated text of one pseudo box, spaced when the box is block-level
pub fn generated_text(oracles: Oracles<'_>, node: NodeId, pseudo: PseudoElement) -> Result<String> {
    let style = oracles.style;
    let Some(content) = style.computed(node, Some(pseudo), "content")? else {
        return Ok(String::new());
    };

    let tree = oracles.tree;
    let text = resolve_content(content, |name| Ok(tree.attr(node, name)?.unwrap_or("").to_string()))?;
    if text.is_empty() {
        return Ok(text);
    }

    if styles_indicate_block(|property| style.computed(node, Some(pseudo), property))? {
        return Ok(match pseudo {
            PseudoElement::Before => format!("{} ", text),
            PseudoElement::After => format!(" {}", text),
        });
    }
    Ok(text)
}

/// `::before` and `::after` text of an element
///
/// Empty for elements that cannot hold generated text and for `scope_root`.
pub fn pseudo_pair(
    oracles: Oracles<'_>,
    config: &AccNameConfig,
    node: NodeId,
    scope_root: Option<NodeId>,
) -> Result<GeneratedText> {
    if Some(node) == scope_root || oracles.tree.kind(node)? != NodeKind::Element {
        return Ok(GeneratedText::default());
    }
    if NO_GENERATED_TEXT.contains(&oracles.tree.tag_name(node)?) {
        return Ok(GeneratedText::default());
    }

    let mut pair = GeneratedText {
        before: generated_text(oracles, node, PseudoElement::Before)?,
        after: generated_text(oracles, node, PseudoElement::After)?,
    };

    if config.prevent_self_referential_generated_text {
        if looks_self_referential(&pair.before, " accName: ") {
            tracing::trace!(node, "dropping self-referential ::before text");
            pair.before.clear();
        }
        if looks_self_referential(&pair.after, " accDescription: ") {
            tracing::trace!(node, "dropping self-referential ::after text");
            pair.after.clear();
        }
    }

    Ok(pair)
}

fn looks_self_referential(text: &str, marker: &str) -> bool {
    text.contains(" [ARIA] ") || text.contains(" aria-") || text.contains(marker)
}

/// Resolve a computed `content` value to text
///
/// Quoted strings are concatenated, `attr(name)` is replaced through
/// `attr`, other tokens (counters, quote keywords) produce nothing. A value
/// without quotes or functions is taken as already-resolved text.
pub fn resolve_content(
    raw: &str,
    mut attr: impl FnMut(&str) -> Result<String>,
) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "none" || raw == "normal" {
        return Ok(String::new());
    }
    if !raw.contains(['"', '\'', '(']) {
        return Ok(raw.replace('\\', ""));
    }

    let mut out = String::new();
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => {
                            if let Some(escaped) = read_escape(&mut chars) {
                                out.push(escaped);
                            }
                        }
                        q if q == c => break,
                        other => out.push(other),
                    }
                }
            }
            c if c.is_ascii_alphabetic() || c == '-' || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '-' || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if chars.peek() == Some(&'(') {
                    chars.next();
                    let mut argument = String::new();
                    for inner in chars.by_ref() {
                        if inner == ')' {
                            break;
                        }
                        argument.push(inner);
                    }
                    if ident.eq_ignore_ascii_case("attr") {
                        let name = argument
                            .split_whitespace()
                            .next()
                            .unwrap_or("")
                            .trim_matches(['"', '\'']);
                        if !name.is_empty() {
                            out.push_str(&attr(&name.to_ascii_lowercase())?);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

/// CSS escape after a backslash: up to six hex digits, or a literal char
fn read_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    let mut hex = String::new();
    while hex.len() < 6 {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(*c);
                chars.next();
            }
            _ => break,
        }
    }
    if hex.is_empty() {
        return chars.next();
    }
    // A single whitespace terminates a hex escape
    if chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}
