//! Top-level computation: eligibility, name pass, description pass

use crate::config::AccNameConfig;
use crate::error::{AccNameError, Result};
use crate::oracle::{NodeKind, Oracles};
use crate::roles;
use crate::types::{AccessibleName, NamingResult};
use crate::utils::normalize;
use crate::visibility;
use crate::walker::NameComputer;
use dom::NodeId;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

/// Accessible name service bound to one set of oracles
pub struct AccNameService<'a> {
    oracles: Oracles<'a>,
    config: AccNameConfig,
}

impl<'a> AccNameService<'a> {
    pub fn new(oracles: Oracles<'a>) -> Self {
        Self::with_config(oracles, AccNameConfig::default())
    }

    pub fn with_config(oracles: Oracles<'a>, config: AccNameConfig) -> Self {
        Self { oracles, config }
    }

    pub fn config(&self) -> &AccNameConfig {
        &self.config
    }

    /// Name and description of `node`
    pub fn compute(&self, node: Option<NodeId>) -> AccessibleName {
        compute_accessible_name_and_description(node, &self.oracles, &self.config)
    }
}

/// Compute the accessible name and description of `node`
///
/// Never fails outward: an absent or ineligible node gives empty strings, and
/// any fault (oracle error or panic) is reported through
/// `AccessibleName::error` with both strings empty.
pub fn compute_accessible_name_and_description(
    node: Option<NodeId>,
    oracles: &Oracles<'_>,
    config: &AccNameConfig,
) -> AccessibleName {
    let Some(node) = node else {
        return AccessibleName::empty();
    };

    let oracles = *oracles;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| try_compute(node, oracles, config)));
    match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            warn!(node, error = %err, "accessible name computation failed");
            AccessibleName::failed(err)
        }
        Err(payload) => {
            let err = AccNameError::Panicked(panic_message(payload.as_ref()));
            warn!(node, error = %err, "accessible name computation panicked");
            AccessibleName::failed(err)
        }
    }
}

fn try_compute(node: NodeId, oracles: Oracles<'_>, config: &AccNameConfig) -> Result<AccessibleName> {
    if oracles.tree.kind(node)? != NodeKind::Element {
        trace!(node, "not an element");
        return Ok(AccessibleName::empty());
    }
    if !is_eligible(oracles, node)? {
        trace!(node, "not eligible for a name");
        return Ok(AccessibleName::empty());
    }

    let role = roles::classify(oracles.tree, node)?;
    let presentational = roles::is_presentational(oracles, node, &role)?;

    let NamingResult { name, title } = NameComputer::new(oracles, config, node).compute()?;
    // The tooltip names the node only when nothing else does
    let (name, mut description) = if name.trim().is_empty() {
        (title, String::new())
    } else {
        (name, title)
    };

    if !presentational {
        let described = compute_description(oracles, config, node)?;
        if !described.is_empty() {
            description = described;
        }
    }

    let name = normalize(&name);
    let mut description = normalize(&description);
    if name == description {
        description.clear();
    }

    debug!(
        node,
        name = name.as_str(),
        description = description.as_str(),
        "computed accessible name"
    );
    Ok(AccessibleName {
        name,
        description,
        error: None,
    })
}

/// Names of the `aria-describedby` targets, in a pass of its own
fn compute_description(
    oracles: Oracles<'_>,
    config: &AccNameConfig,
    node: NodeId,
) -> Result<String> {
    let Some(ids) = oracles
        .tree
        .attr(node, "aria-describedby")?
        .map(str::trim)
        .filter(|ids| !ids.is_empty())
    else {
        return Ok(String::new());
    };

    let mut computer = NameComputer::new(oracles, config, node);
    Ok(normalize(&computer.compute_references(node, ids)?))
}

/// Hidden nodes, nodes under a hidden ancestor and nodes under an
/// `aria-label`led ancestor get no name
fn is_eligible(oracles: Oracles<'_>, node: NodeId) -> Result<bool> {
    if visibility::is_hidden(oracles, node, None)? {
        return Ok(false);
    }
    if visibility::is_ancestor_hidden(oracles, None, node, None, true, true)? {
        return Ok(false);
    }
    Ok(!visibility::has_labelled_ancestor(oracles, node, None)?)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::DomArena;

    #[test]
    fn test_absent_node_is_empty() {
        let arena = DomArena::new();
        let result = compute_accessible_name_and_description(
            None,
            &Oracles::from_arena(&arena),
            &AccNameConfig::default(),
        );
        assert_eq!(result.name, "");
        assert_eq!(result.description, "");
        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_node_is_a_fault() {
        let arena = DomArena::new();
        let service = AccNameService::new(Oracles::from_arena(&arena));
        let result = service.compute(Some(42));
        assert!(!result.is_ok());
        assert!(matches!(result.error, Some(AccNameError::Tree(_))));
        assert_eq!(result.name, "");
    }

    #[test]
    fn test_title_becomes_name_or_description() {
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let tip_only = arena
            .append_element(Some(body), "button", &[("title", "Tip")])
            .unwrap();
        let labelled = arena
            .append_element(
                Some(body),
                "button",
                &[("title", "More"), ("aria-label", "Close")],
            )
            .unwrap();
        let same = arena
            .append_element(
                Some(body),
                "button",
                &[("title", "Close"), ("aria-label", "Close")],
            )
            .unwrap();
        let service = AccNameService::new(Oracles::from_arena(&arena));

        let result = service.compute(Some(tip_only));
        assert_eq!((result.name.as_str(), result.description.as_str()), ("Tip", ""));

        let result = service.compute(Some(labelled));
        assert_eq!(
            (result.name.as_str(), result.description.as_str()),
            ("Close", "More")
        );

        // Identical description is dropped
        let result = service.compute(Some(same));
        assert_eq!(result.description, "");
    }

    #[test]
    fn test_describedby_overrides_title() {
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let button = arena
            .append_element(
                Some(body),
                "button",
                &[("title", "Tooltip"), ("aria-describedby", "d1 d2")],
            )
            .unwrap();
        arena.append_text(button, "Send").unwrap();
        let d1 = arena
            .append_element(Some(body), "span", &[("id", "d1")])
            .unwrap();
        arena.append_text(d1, "Sends the\n form").unwrap();
        let d2 = arena
            .append_element(Some(body), "span", &[("id", "d2")])
            .unwrap();
        arena.append_text(d2, "now").unwrap();

        let result = AccNameService::new(Oracles::from_arena(&arena)).compute(Some(button));
        assert_eq!(result.name, "Send");
        assert_eq!(result.description, "Sends the form now");
    }

    #[test]
    fn test_ineligible_nodes() {
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let hidden = arena
            .append_element(Some(body), "button", &[("aria-hidden", "true")])
            .unwrap();
        arena.append_text(hidden, "A").unwrap();
        let hidden_parent = arena.append_element(Some(body), "div", &[]).unwrap();
        arena.set_style(hidden_parent, "display", "none").unwrap();
        let nested = arena
            .append_element(Some(hidden_parent), "button", &[])
            .unwrap();
        arena.append_text(nested, "B").unwrap();
        let labelled = arena
            .append_element(Some(body), "div", &[("aria-label", "Group")])
            .unwrap();
        let inner = arena.append_element(Some(labelled), "button", &[]).unwrap();
        arena.append_text(inner, "C").unwrap();
        let text = arena.append_text(body, "loose").unwrap();
        let service = AccNameService::new(Oracles::from_arena(&arena));

        for node in [hidden, nested, inner, text] {
            let result = service.compute(Some(node));
            assert_eq!(result.name, "", "node {node}");
            assert!(result.is_ok());
        }
        assert_eq!(service.compute(Some(labelled)).name, "Group");
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&7_u8), "unknown panic payload");
    }
}
