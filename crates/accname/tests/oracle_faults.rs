use accname::{
    oracle_fault, AccNameError, AccNameService, FocusOracle, Oracles, StyleOracle,
};
use dom::{DomArena, NodeId, PseudoElement};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Style source that refuses to answer for one node
struct BrokenStyle<'a> {
    arena: &'a DomArena,
    broken: NodeId,
}

impl StyleOracle for BrokenStyle<'_> {
    fn computed(
        &self,
        node: NodeId,
        pseudo: Option<PseudoElement>,
        property: &str,
    ) -> accname::Result<Option<&str>> {
        if node == self.broken {
            return Err(oracle_fault(format!("no layout for node {node}")));
        }
        self.arena.computed(node, pseudo, property)
    }
}

/// Focus source that crashes
struct PanickingFocus;

impl FocusOracle for PanickingFocus {
    fn is_focusable(&self, _node: NodeId) -> accname::Result<bool> {
        panic!("focus oracle crashed");
    }
}

fn fixture() -> (DomArena, NodeId, NodeId) {
    let mut arena = DomArena::new();
    let body = arena.append_element(None, "body", &[]).unwrap();
    let button = arena.append_element(Some(body), "button", &[]).unwrap();
    arena.append_text(button, "Save").unwrap();
    let icon = arena.append_element(Some(button), "span", &[]).unwrap();
    arena.append_text(icon, "!").unwrap();
    (arena, button, icon)
}

#[test]
fn test_oracle_error_is_reported() {
    init_tracing();
    let (arena, button, icon) = fixture();
    let style = BrokenStyle {
        arena: &arena,
        broken: icon,
    };
    let service = AccNameService::new(Oracles::new(&arena, &style, &arena));

    let result = service.compute(Some(button));
    assert_eq!(result.name, "");
    assert_eq!(result.description, "");
    match result.error {
        Some(AccNameError::Oracle(message)) => assert!(message.contains("no layout")),
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Other nodes are unaffected
    let style = BrokenStyle {
        arena: &arena,
        broken: NodeId::MAX,
    };
    let service = AccNameService::new(Oracles::new(&arena, &style, &arena));
    let result = service.compute(Some(button));
    assert!(result.is_ok());
    assert_eq!(result.name, "Save!");
}

#[test]
fn test_panicking_oracle_is_contained() {
    init_tracing();
    // A list only reads its content when focusable, which asks the oracle
    let mut arena = DomArena::new();
    let body = arena.append_element(None, "body", &[]).unwrap();
    let list = arena.append_element(Some(body), "ul", &[]).unwrap();
    let item = arena.append_element(Some(list), "li", &[]).unwrap();
    arena.append_text(item, "Item").unwrap();
    let service = AccNameService::new(Oracles::new(&arena, &arena, &PanickingFocus));

    let result = service.compute(Some(list));
    assert_eq!(result.name, "");
    match &result.error {
        Some(AccNameError::Panicked(message)) => assert_eq!(message, "focus oracle crashed"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(result.to_string().starts_with("accName: \"\""));
}
