use accname::{compute_accessible_name_and_description, AccNameConfig, Oracles};
use dom::{DomArena, DomService};
use serde_json::json;

fn load(document: serde_json::Value) -> DomArena {
    let mut service = DomService::new();
    service.parse_dom_tree(&document).unwrap();
    service.into_arena()
}

fn text(value: &str) -> serde_json::Value {
    json!({ "nodeType": 3, "nodeValue": value })
}

#[test]
fn test_form_document() {
    let arena = load(json!({
        "root": {
            "nodeType": 9,
            "nodeName": "#document",
            "children": [{
                "nodeType": 1,
                "nodeName": "BODY",
                "children": [
                    {
                        "nodeType": 1,
                        "nodeName": "LABEL",
                        "attributes": ["for", "email"],
                        "children": [text("E-mail")]
                    },
                    {
                        "nodeType": 1,
                        "nodeName": "INPUT",
                        "attributes": ["id", "email", "type", "email", "aria-describedby", "hint"]
                    },
                    {
                        "nodeType": 1,
                        "nodeName": "SPAN",
                        "attributes": ["id", "hint"],
                        "computedStyles": { "display": "none" },
                        "children": [text("We never share it")]
                    },
                    { "nodeType": 8, "nodeName": "#comment", "nodeValue": "skipped" }
                ]
            }]
        }
    }));
    let input = arena.find_by_id("email").unwrap();

    let result = compute_accessible_name_and_description(
        Some(input),
        &Oracles::from_arena(&arena),
        &AccNameConfig::default(),
    );
    assert_eq!(result.name, "E-mail");
    // Hidden description targets are still read when referenced directly
    assert_eq!(result.description, "We never share it");
}

#[test]
fn test_generated_content_and_block_styles() {
    let arena = load(json!({
        "root": {
            "nodeType": 1,
            "nodeName": "A",
            "attributes": ["id", "link", "href", "/cart"],
            "children": [
                {
                    "nodeType": 1,
                    "nodeName": "SPAN",
                    "attributes": ["data-count", "3"],
                    "computedStyles": { "display": "block" },
                    "pseudoElements": {
                        "after": { "content": "\" (\" attr(data-count) \")\"" }
                    },
                    "children": [text("Cart")]
                },
                text("items")
            ]
        }
    }));
    let link = arena.find_by_id("link").unwrap();

    let result = compute_accessible_name_and_description(
        Some(link),
        &Oracles::from_arena(&arena),
        &AccNameConfig::default(),
    );
    assert_eq!(result.name, "Cart (3) items");
}

#[test]
fn test_self_referential_generated_text_is_configurable() {
    let document = json!({
        "root": {
            "nodeType": 1,
            "nodeName": "BUTTON",
            "attributes": ["id", "b"],
            "pseudoElements": {
                "before": { "content": "\"see aria-label \"" }
            },
            "children": [text("Go")]
        }
    });
    let arena = load(document);
    let button = arena.find_by_id("b").unwrap();
    let oracles = Oracles::from_arena(&arena);

    let plain = compute_accessible_name_and_description(
        Some(button),
        &oracles,
        &AccNameConfig::default(),
    );
    assert_eq!(plain.name, "see aria-label Go");

    let config = AccNameConfig::from_json(r#"{"preventSelfReferentialGeneratedText": true}"#)
        .unwrap();
    let filtered = compute_accessible_name_and_description(Some(button), &oracles, &config);
    assert_eq!(filtered.name, "Go");
}

#[test]
fn test_result_serialization() {
    let arena = load(json!({
        "root": {
            "nodeType": 1,
            "nodeName": "IMG",
            "attributes": ["id", "logo", "alt", "Company", "title", "Home page"]
        }
    }));
    let img = arena.find_by_id("logo").unwrap();

    let result = compute_accessible_name_and_description(
        Some(img),
        &Oracles::from_arena(&arena),
        &AccNameConfig::default(),
    );
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        value,
        json!({ "name": "Company", "description": "Home page", "error": null })
    );
    assert_eq!(
        result.to_string(),
        "accName: \"Company\"\n\naccDesc: \"Home page\""
    );
}
