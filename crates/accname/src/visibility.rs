//! Hidden and labelled-ancestor checks

use crate::error::Result;
use crate::oracle::{NodeKind, Oracles};
use crate::refs::OwnershipContext;
use crate::roles;
use ahash::AHashSet;
use dom::NodeId;

/// True when `node` is hidden from assistive technology
///
/// The scope root itself is never hidden: a node being named, or one that is
/// referenced explicitly, is processed even when it carries hidden markers.
pub fn is_hidden(oracles: Oracles<'_>, node: NodeId, scope_root: Option<NodeId>) -> Result<bool> {
    if Some(node) == scope_root {
        return Ok(false);
    }
    let tree = oracles.tree;
    if tree.kind(node)? != NodeKind::Element {
        return Ok(false);
    }

    if tree
        .attr(node, "aria-hidden")?
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return Ok(true);
    }
    if tree.attr(node, "hidden")?.is_some() {
        return Ok(true);
    }

    let display = oracles.style.computed(node, None, "display")?;
    let visibility = oracles.style.computed(node, None, "visibility")?;
    Ok(display.is_some_and(|v| v.trim() == "none")
        || visibility.is_some_and(|v| v.trim() == "hidden"))
}

/// True when some ancestor of `node` below `scope_root` is hidden
///
/// With an ownership context and `skip_ownership_links == false`, a node
/// that was granted through `aria-owns` continues at its owner instead of its
/// DOM parent. `skip_self == false` also tests `node` itself.
pub fn is_ancestor_hidden(
    oracles: Oracles<'_>,
    ctx: Option<&OwnershipContext>,
    node: NodeId,
    scope_root: Option<NodeId>,
    skip_ownership_links: bool,
    skip_self: bool,
) -> Result<bool> {
    if !skip_self && is_hidden(oracles, node, scope_root)? {
        return Ok(true);
    }

    let mut seen = AHashSet::new();
    let mut current = node;
    loop {
        let owner = match ctx {
            Some(ctx) if !skip_ownership_links => ctx.owner_of(current),
            _ => None,
        };
        let next = match owner {
            Some(owner) => Some(owner),
            None => oracles.tree.parent(current)?,
        };
        let Some(next) = next else {
            return Ok(false);
        };
        if Some(next) == scope_root || !seen.insert(next) {
            return Ok(false);
        }
        if is_hidden(oracles, next, scope_root)? {
            return Ok(true);
        }
        current = next;
    }
}

/// True when an ancestor of `node` below `scope_root` carries a non-empty
/// `aria-label` and its presentational role, if any, does not take effect
///
/// Such a node's text is already represented by the ancestor's label.
pub fn has_labelled_ancestor(
    oracles: Oracles<'_>,
    node: NodeId,
    scope_root: Option<NodeId>,
) -> Result<bool> {
    let tree = oracles.tree;
    let mut current = tree.parent(node)?;
    while let Some(ancestor) = current {
        if Some(ancestor) == scope_root {
            break;
        }
        if tree.kind(ancestor)? == NodeKind::Element {
            let role = roles::classify(tree, ancestor)?;
            let labelled = tree
                .attr(ancestor, "aria-label")?
                .is_some_and(|label| !label.trim().is_empty());
            if labelled && !roles::is_presentational(oracles, ancestor, &role)? {
                return Ok(true);
            }
        }
        current = tree.parent(ancestor)?;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::DomArena;

    #[test]
    fn test_hidden_markers() {
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let aria = arena
            .append_element(Some(body), "div", &[("aria-hidden", "TRUE")])
            .unwrap();
        let flag = arena
            .append_element(Some(body), "div", &[("hidden", "")])
            .unwrap();
        let display = arena.append_element(Some(body), "div", &[]).unwrap();
        arena.set_style(display, "display", "none").unwrap();
        let invisible = arena.append_element(Some(body), "div", &[]).unwrap();
        arena.set_style(invisible, "visibility", "hidden").unwrap();
        let shown = arena
            .append_element(Some(body), "div", &[("aria-hidden", "false")])
            .unwrap();
        let text = arena.append_text(aria, "t").unwrap();
        let oracles = Oracles::from_arena(&arena);

        for node in [aria, flag, display, invisible] {
            assert!(is_hidden(oracles, node, Some(body)).unwrap());
            // The scope root itself is exempt
            assert!(!is_hidden(oracles, node, Some(node)).unwrap());
        }
        assert!(!is_hidden(oracles, shown, Some(body)).unwrap());
        assert!(!is_hidden(oracles, text, Some(body)).unwrap());
    }

    #[test]
    fn test_ancestor_hidden_stops_at_scope() {
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let hidden = arena
            .append_element(Some(body), "div", &[("hidden", "")])
            .unwrap();
        let inner = arena.append_element(Some(hidden), "span", &[]).unwrap();
        let leaf = arena.append_element(Some(inner), "b", &[]).unwrap();
        let oracles = Oracles::from_arena(&arena);

        assert!(is_ancestor_hidden(oracles, None, leaf, None, true, true).unwrap());
        assert!(!is_ancestor_hidden(oracles, None, leaf, Some(hidden), true, true).unwrap());
        assert!(!is_ancestor_hidden(oracles, None, hidden, None, true, true).unwrap());
        assert!(is_ancestor_hidden(oracles, None, hidden, None, true, false).unwrap());
    }

    #[test]
    fn test_ancestor_hidden_follows_owner() {
        // <body><div hidden><b id=owner/></div><i id=owned/></body>
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let hidden = arena
            .append_element(Some(body), "div", &[("hidden", "")])
            .unwrap();
        let owner = arena.append_element(Some(hidden), "b", &[]).unwrap();
        let owned = arena.append_element(Some(body), "i", &[]).unwrap();
        let oracles = Oracles::from_arena(&arena);

        let mut ctx = OwnershipContext::new(owner);
        ctx.enter_ownership("owned", owner, owner, owned);

        assert!(!is_ancestor_hidden(oracles, Some(&ctx), owned, None, true, true).unwrap());
        assert!(is_ancestor_hidden(oracles, Some(&ctx), owned, None, false, true).unwrap());
    }

    #[test]
    fn test_ownership_cycles_terminate() {
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let a = arena.append_element(Some(body), "div", &[]).unwrap();
        let b = arena.append_element(Some(body), "div", &[]).unwrap();
        let oracles = Oracles::from_arena(&arena);

        let mut ctx = OwnershipContext::new(a);
        ctx.enter_ownership("b", a, a, b);
        ctx.enter_ownership("a", b, b, a);

        assert!(!is_ancestor_hidden(oracles, Some(&ctx), a, None, false, true).unwrap());
    }

    #[test]
    fn test_labelled_ancestor() {
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let labelled = arena
            .append_element(Some(body), "div", &[("aria-label", "Outer")])
            .unwrap();
        let inner = arena.append_element(Some(labelled), "span", &[]).unwrap();
        let presentational = arena
            .append_element(
                Some(body),
                "div",
                &[("role", "none"), ("aria-label", "Ignored")],
            )
            .unwrap();
        let inner2 = arena.append_element(Some(presentational), "span", &[]).unwrap();
        // Focusable, so the presentational role does not take effect
        let focusable = arena
            .append_element(
                Some(body),
                "div",
                &[("role", "none"), ("aria-label", "Kept"), ("tabindex", "0")],
            )
            .unwrap();
        let inner3 = arena.append_element(Some(focusable), "span", &[]).unwrap();
        let oracles = Oracles::from_arena(&arena);

        assert!(has_labelled_ancestor(oracles, inner, None).unwrap());
        assert!(!has_labelled_ancestor(oracles, inner, Some(labelled)).unwrap());
        assert!(!has_labelled_ancestor(oracles, inner2, None).unwrap());
        assert!(has_labelled_ancestor(oracles, inner3, None).unwrap());
    }
}
