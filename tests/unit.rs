//! Unit tests for core Chatflow functionality.
mod common;
use chatflow::graph::{BlockType, Choice};
use chatflow::interpreter::{Operator, evaluate, interpolate};
use chatflow::prelude::*;
use common::*;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(2.5)), "2.5");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::from("hi")), "hi");
}

#[test]
fn test_value_numeric_reading() {
    assert_eq!(Value::from(" 20 ").as_number(), Some(20.0));
    assert_eq!(Value::Number(1.5).as_number(), Some(1.5));
    assert_eq!(Value::from("twenty").as_number(), None);
    assert_eq!(Value::from("NaN").as_number(), None);
    assert_eq!(Value::Bool(true).as_number(), None);
}

#[test]
fn test_value_kind() {
    assert_eq!(Value::from("18").kind(), "text");
    assert_eq!(Value::Number(18.0).kind(), "number");
    assert_eq!(Value::Bool(false).kind(), "bool");
}

#[test]
fn test_error_display() {
    let err = RunError::BlockNotFound(NodeId::from("node_B"));
    assert_eq!(err.to_string(), "Block not found: node_B");

    let err = RunError::StartBlock { count: 3 };
    assert!(err.to_string().contains("3 found"));

    let err = RunError::ExternalCall {
        url: "https://example.test".to_string(),
        message: "timeout".to_string(),
    };
    assert!(err.to_string().contains("https://example.test"));
    assert!(err.to_string().contains("timeout"));
    assert!(err.is_external());

    assert!(!RunError::NoDefaultLink { block: NodeId::from("c") }.is_external());
    assert!(RunError::from(TransportError::Closed).is_external());
}

#[test]
fn test_variables_overwrite() {
    let mut variables = Variables::new();
    assert!(variables.is_empty());
    variables.set("age", "17");
    variables.set("age", 18.0);
    assert_eq!(variables.len(), 1);
    assert_eq!(variables.get("age"), Some(&Value::Number(18.0)));
    assert_eq!(variables.get("name"), None);

    variables.set("name", "Ada");
    let mut entries: Vec<(&str, &Value)> = variables.iter().collect();
    entries.sort_by_key(|(name, _)| *name);
    assert_eq!(
        entries,
        vec![("age", &Value::Number(18.0)), ("name", &Value::from("Ada"))]
    );
}

#[test]
fn test_interpolation_uses_variables() {
    let mut variables = Variables::new();
    variables.set("name", "Alice");
    variables.set("age", 30.0);

    assert_eq!(
        interpolate("{name} is {age}, {unknown} stays", &variables),
        "Alice is 30, {unknown} stays"
    );
}

#[test]
fn test_condition_evaluation() {
    let ge = Operator::parse(">=");
    assert!(evaluate(Some(&Value::from("20")), &ge, &Value::Number(18.0)));
    assert!(!evaluate(None, &ge, &Value::Number(18.0)));
    assert!(!evaluate(
        Some(&Value::from("1")),
        &Operator::parse("~"),
        &Value::from("1")
    ));
    assert!(evaluate(
        Some(&Value::from("apple")),
        &Operator::parse("<"),
        &Value::from("banana")
    ));
}

#[test]
fn test_flow_links_keep_definition_order() {
    let definition = FlowDefinition {
        nodes: vec![
            node("start", "startBlock"),
            message("a", "A"),
            message("b", "B"),
            message("c", "C"),
        ],
        links: vec![link("start", "c"), link("start", "a"), link("start", "b")],
    };
    let flow = Flow::new(definition);

    let targets: Vec<&str> = flow
        .links_from(&NodeId::from("start"))
        .map(|link| link.to.as_str())
        .collect();
    assert_eq!(targets, vec!["c", "a", "b"]);
    assert_eq!(flow.links_from(&NodeId::from("a")).count(), 0);
    assert_eq!(flow.links().len(), 3);
}

#[test]
fn test_duplicate_ids_keep_later_definition() {
    let definition = FlowDefinition {
        nodes: vec![
            node("start", "startBlock"),
            message("dup", "first"),
            message("dup", "second"),
        ],
        links: vec![],
    };
    let flow = Flow::new(definition);

    assert_eq!(flow.blocks().len(), 2);
    let block = flow.block(&NodeId::from("dup")).expect("block should exist");
    assert_eq!(block.text.as_deref(), Some("second"));
}

#[test]
fn test_block_kinds_resolved_at_build() {
    let flow = Flow::new(choice_definition());

    let start: Vec<_> = flow.start_blocks().map(|block| block.id.as_str()).collect();
    assert_eq!(start, vec!["start"]);

    let pick = flow.block(&NodeId::from("pick")).expect("pick block");
    assert_eq!(
        pick.kind,
        BlockKind::Choice {
            choices: vec![
                Choice {
                    label: "Apples".to_string(),
                    port: "P1".to_string()
                },
                Choice {
                    label: "Pears".to_string(),
                    port: "P2".to_string()
                },
            ]
        }
    );
}

#[test]
fn test_type_mapping() {
    let definition = FlowDefinition {
        nodes: vec![node("s", "begin"), node("x", "mystery")],
        links: vec![],
    };
    let flow = Flow::builder(definition)
        .with_type_mapping("begin", "startBlock")
        .with_type_mapping("mystery", "notABlock")
        .build();

    assert_eq!(flow.start_blocks().count(), 1);
    assert_eq!(
        flow.block(&NodeId::from("x")).map(|block| &block.kind),
        Some(&BlockKind::Unknown {
            type_name: "mystery".to_string()
        })
    );
    assert_eq!(BlockType::from_tag("apiBlock").map(|t| t.tag()), Some("apiBlock"));
}

#[test]
fn test_editor_graph_conversion() {
    let definition = EditorGraph::from_json(GREETING_JSON)
        .expect("Failed to parse demo graph")
        .into_flow()
        .expect("Failed to convert demo graph");

    assert_eq!(definition.nodes.len(), 10);
    assert_eq!(definition.links.len(), 10);

    let check = &definition.nodes[4];
    assert_eq!(check.id, NodeId::from("5"));
    let conditions = check.conditions.as_ref().expect("conditions");
    assert_eq!(conditions[0].operator, ">=");
    assert_eq!(conditions[0].comparand, Value::Number(18.0));
    assert_eq!(conditions[0].output_port, "OUT1");

    let options = definition.nodes[7].choices.as_ref().expect("choices");
    assert_eq!(options[1].label, "Goodbye");
    assert_eq!(definition.links[4].from_port.as_deref(), Some("OUT1"));
}

#[test]
fn test_editor_graph_aliases() {
    let json = r#"{
        "nodes": [
            { "key": "s", "category": "startBlock" },
            { "key": 2, "category": "optionsBlock", "choices": [{ "text": "Go", "portId": "P1" }] }
        ],
        "links": [{ "from": "s", "to": 2 }]
    }"#;

    let definition = EditorGraph::from_json(json)
        .and_then(IntoFlow::into_flow)
        .expect("Failed to convert aliased graph");
    assert_eq!(definition.nodes[1].id, NodeId::from("2"));
    assert_eq!(definition.links[0].to, NodeId::from("2"));
    assert_eq!(
        definition.nodes[1].choices.as_ref().map(Vec::len),
        Some(1)
    );
}

#[test]
fn test_editor_graph_errors() {
    assert!(matches!(
        EditorGraph::from_json("{ invalid json }"),
        Err(ConversionError::JsonParseError(_))
    ));

    let json = r#"{
        "nodeDataArray": [{
            "id": 1, "type": "conditionalBlock",
            "conditions": [{ "variableName": "x", "condition": "==", "conditionValue": [1], "portId": "OUT1" }]
        }]
    }"#;
    let result = EditorGraph::from_json(json).and_then(IntoFlow::into_flow);
    assert!(matches!(result, Err(ConversionError::ValidationError(_))));
}

#[test]
fn test_prompt_overrides() {
    let prompts: Prompts =
        serde_json::from_str(r#"{ "chatFinished": "Bye!" }"#).expect("Failed to parse prompts");
    assert_eq!(prompts.chat_finished, "Bye!");
    assert_eq!(prompts.choose_option, Prompts::default().choose_option);
    assert_eq!(prompts.capture_prompt("age"), "Enter a value for \"age\": ");
}
