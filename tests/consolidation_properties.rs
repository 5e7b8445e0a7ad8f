mod common;

use common::{all_markers, SchemaFixture};
use schema_consolidator::schema::reference::external_markers;
use schema_consolidator::{
    consolidate_directory, ConsolidatorConfig, RewriteMode, SchemaConsolidator,
};
use serde_json::{json, Value};

fn definitions(schema: &Value) -> &serde_json::Map<String, Value> {
    schema["definitions"]
        .as_object()
        .expect("consolidated schema carries a definitions object")
}

/// Internal markers that do not name an entry of the merged definitions
fn dangling_definition_refs(schema: &Value) -> Vec<String> {
    let defs = definitions(schema);
    all_markers(schema)
        .into_iter()
        .filter(|marker| {
            marker
                .strip_prefix("#/definitions/")
                .map(|key| !defs.contains_key(&key.replace("~1", "/").replace("~0", "~")))
                .unwrap_or(false)
        })
        .collect()
}

fn serverless_fixture() -> SchemaFixture {
    SchemaFixture::with_documents(&[
        (
            "workflow.json",
            json!({
                "$id": "https://serverlessworkflow.io/schemas/0.8/workflow.json",
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "metadata": { "$ref": "common.json#/definitions/metadata" },
                    "events": { "$ref": "events.json#/events" },
                    "functions": { "$ref": "functions.json#/functions" },
                    "start": { "$ref": "#/definitions/startdef" },
                    "states": {
                        "type": "array",
                        "items": { "anyOf": [ { "$ref": "#/definitions/sleepstate" } ] }
                    }
                },
                "definitions": {
                    "startdef": { "type": "string" },
                    "sleepstate": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "metadata": { "$ref": "common.json#/definitions/metadata" }
                        }
                    }
                }
            }),
        ),
        (
            "common.json",
            json!({
                "definitions": {
                    "metadata": {
                        "type": "object",
                        "additionalProperties": { "type": "string" }
                    }
                }
            }),
        ),
        (
            "events.json",
            json!({
                "events": {
                    "oneOf": [
                        { "type": "string", "format": "uri" },
                        { "type": "array", "items": { "$ref": "#/definitions/eventdef" } }
                    ]
                },
                "definitions": {
                    "eventdef": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "correlation": { "type": "array", "items": { "$ref": "#/definitions/correlationDef" } },
                            "metadata": { "$ref": "common.json#/definitions/metadata" }
                        }
                    },
                    "correlationDef": {
                        "type": "object",
                        "properties": { "contextAttributeName": { "type": "string" } }
                    }
                }
            }),
        ),
        (
            "functions.json",
            json!({
                "functions": {
                    "type": "array",
                    "items": { "$ref": "#/definitions/function" }
                },
                "definitions": {
                    "function": {
                        "type": "object",
                        "properties": {
                            "operation": { "type": "string" },
                            "metadata": { "$ref": "common.json#/definitions/metadata" }
                        }
                    }
                }
            }),
        ),
    ])
}

#[test]
fn serverless_workflow_schemas_consolidate_cleanly() {
    let fixture = serverless_fixture();
    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();
    let schema = &result.schema;

    assert!(external_markers(schema).is_empty());
    assert!(dangling_definition_refs(schema).is_empty(), "{:?}", dangling_definition_refs(schema));

    assert_eq!(
        schema["properties"]["metadata"],
        json!({ "type": "object", "additionalProperties": { "type": "string" } })
    );
    assert_eq!(
        schema["properties"]["events"]["oneOf"][1]["items"],
        json!({ "$ref": "#/definitions/events_eventdef" })
    );
    assert_eq!(
        schema["properties"]["start"],
        json!({ "$ref": "#/definitions/workflow_startdef" })
    );
    assert_eq!(
        definitions(schema)["events_eventdef"]["properties"]["correlation"]["items"],
        json!({ "$ref": "#/definitions/events_correlationDef" })
    );
    assert_eq!(
        definitions(schema)["functions_function"]["properties"]["metadata"],
        json!({ "type": "object", "additionalProperties": { "type": "string" } })
    );
}

#[test]
fn output_starts_with_root_keys_in_source_order() {
    let fixture = serverless_fixture();
    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();
    let keys: Vec<&str> = result
        .schema
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["$id", "type", "properties", "definitions"]);
}

#[test]
fn reference_chain_of_any_depth_is_fully_inlined() {
    let depth = 6;
    let mut documents = Vec::new();
    for level in 0..depth {
        let next = if level + 1 < depth {
            json!({ "$ref": format!("level{}.json#/definitions/node", level + 1) })
        } else {
            json!({ "type": "integer" })
        };
        documents.push((
            format!("level{}.json", level),
            json!({ "definitions": { "node": { "properties": { "child": next } } } }),
        ));
    }
    documents.push((
        "workflow.json".to_string(),
        json!({ "$ref": "level0.json#/definitions/node" }),
    ));
    let borrowed: Vec<(&str, Value)> = documents
        .iter()
        .map(|(name, doc)| (name.as_str(), doc.clone()))
        .collect();
    let fixture = SchemaFixture::with_documents(&borrowed);

    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();

    assert!(external_markers(&result.schema).is_empty());
    let mut node = &result.schema;
    for _ in 0..depth {
        node = &node["properties"]["child"];
    }
    assert_eq!(node, &json!({ "type": "integer" }));
    assert!(result.report.references_inlined >= depth);
}

#[test]
fn definition_keys_are_stem_prefixed_and_unique() {
    let fixture = serverless_fixture();
    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();
    let stems = ["workflow_", "common_", "events_", "functions_"];

    let harvested: Vec<&String> = definitions(&result.schema)
        .keys()
        .filter(|key| !["startdef", "sleepstate"].contains(&key.as_str()))
        .collect();
    assert_eq!(harvested.len(), 6);
    for key in &harvested {
        assert!(stems.iter().any(|stem| key.starts_with(stem)), "{}", key);
    }
    assert_eq!(result.report.definitions, 6);
}

#[test]
fn single_hop_reference_from_root() {
    let x = json!({ "type": "object", "required": ["id"], "properties": { "id": { "type": "string" } } });
    let fixture = SchemaFixture::with_documents(&[
        ("a.json", json!({ "definitions": { "X": x.clone() } })),
        ("b.json", json!({ "$ref": "a.json#/definitions/X" })),
    ]);

    let result = consolidate_directory(fixture.path(), "b.json").unwrap();

    let mut expected = x.clone();
    expected["definitions"] = json!({ "a_X": x });
    assert_eq!(result.schema, expected);
}

#[test]
fn reference_to_missing_file_is_preserved() {
    let fixture = SchemaFixture::with_documents(&[(
        "workflow.json",
        json!({ "properties": { "auth": { "$ref": "auth.json#/auth" } } }),
    )]);

    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();

    assert_eq!(
        result.schema["properties"]["auth"],
        json!({ "$ref": "auth.json#/auth" })
    );
    assert_eq!(result.report.unresolved_references, 1);
    assert_eq!(result.report.residual_external_refs, vec!["auth.json#/auth".to_string()]);
}

#[test]
fn reference_to_missing_path_is_preserved() {
    let fixture = SchemaFixture::with_documents(&[
        ("a.json", json!({ "definitions": { "present": {} } })),
        (
            "workflow.json",
            json!({ "properties": { "x": { "$ref": "a.json#/missing" } } }),
        ),
    ]);

    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();

    assert_eq!(result.schema["properties"]["x"], json!({ "$ref": "a.json#/missing" }));
    assert_eq!(result.report.unresolved_references, 1);
    assert!(definitions(&result.schema).contains_key("a_present"));
}

#[test]
fn reference_to_empty_document_is_preserved() {
    let fixture = SchemaFixture::with_documents(&[
        ("empty.json", json!({})),
        ("workflow.json", json!({ "properties": { "x": { "$ref": "empty.json" } } })),
    ]);

    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();

    assert_eq!(result.schema["properties"]["x"], json!({ "$ref": "empty.json" }));
    assert_eq!(result.report.unresolved_references, 1);
    assert_eq!(result.report.residual_external_refs, vec!["empty.json".to_string()]);
}

#[test]
fn same_named_documents_in_different_directories_keep_separate_keys() {
    let fixture = SchemaFixture::with_documents(&[
        (
            "a.json",
            json!({ "definitions": { "X": { "type": "string" }, "Y": { "$ref": "#/definitions/X" } } }),
        ),
        (
            "sub/a.json",
            json!({ "definitions": { "X": { "type": "integer" }, "Y": { "$ref": "#/definitions/X" } } }),
        ),
        (
            "workflow.json",
            json!({
                "properties": {
                    "top": { "$ref": "a.json#/definitions/Y" },
                    "nested": { "$ref": "sub/a.json#/definitions/Y" }
                }
            }),
        ),
    ]);

    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();
    let schema = &result.schema;

    assert_eq!(definitions(schema)["a_X"], json!({ "type": "string" }));
    assert_eq!(definitions(schema)["sub/a_X"], json!({ "type": "integer" }));
    assert_eq!(schema["properties"]["top"], json!({ "$ref": "#/definitions/a_X" }));
    assert_eq!(schema["properties"]["nested"], json!({ "$ref": "#/definitions/sub~1a_X" }));
    assert!(dangling_definition_refs(schema).is_empty(), "{:?}", dangling_definition_refs(schema));
}

#[test]
fn missing_root_fails_without_output() {
    let fixture = SchemaFixture::with_documents(&[("a.json", json!({}))]);
    let err = consolidate_directory(fixture.path(), "workflow.json").unwrap_err();

    assert!(err.is_root_failure());
    assert!(!fixture.output_path().exists());
}

#[test]
fn shared_third_document_is_namespaced_consistently() {
    let fixture = SchemaFixture::with_documents(&[
        (
            "workflow.json",
            json!({
                "properties": {
                    "a": { "$ref": "a.json#/definitions/A" },
                    "b": { "$ref": "b.json#/definitions/B" }
                }
            }),
        ),
        (
            "a.json",
            json!({ "definitions": { "A": { "properties": { "m": { "$ref": "c.json#/definitions/M" } } } } }),
        ),
        (
            "b.json",
            json!({ "definitions": { "B": { "items": { "$ref": "c.json#/definitions/M" } } } }),
        ),
        (
            "c.json",
            json!({
                "definitions": {
                    "M": { "properties": { "n": { "$ref": "#/definitions/N" } } },
                    "N": { "type": "string" }
                }
            }),
        ),
    ]);

    let result = consolidate_directory(fixture.path(), "workflow.json").unwrap();
    let schema = &result.schema;
    let expected_m = json!({ "properties": { "n": { "$ref": "#/definitions/c_N" } } });

    assert_eq!(schema["properties"]["a"]["properties"]["m"], expected_m);
    assert_eq!(schema["properties"]["b"]["items"], expected_m);
    assert_eq!(definitions(schema)["a_A"]["properties"]["m"], expected_m);
    assert_eq!(definitions(schema)["b_B"]["items"], expected_m);
    assert_eq!(definitions(schema)["c_M"], expected_m);
    assert!(external_markers(schema).is_empty());
    assert!(dangling_definition_refs(schema).is_empty());
}

#[test]
fn call_site_mode_misattributes_multi_hop_refs() {
    let fixture = SchemaFixture::with_documents(&[
        ("workflow.json", json!({ "properties": { "a": { "$ref": "a.json#/definitions/A" } } })),
        (
            "a.json",
            json!({ "definitions": { "A": { "properties": { "c": { "$ref": "c.json#/definitions/C" } } } } }),
        ),
        (
            "c.json",
            json!({ "definitions": { "C": { "items": { "$ref": "#/definitions/D" } }, "D": {} } }),
        ),
    ]);
    let mut config = ConsolidatorConfig::for_directory(fixture.path(), "workflow.json");
    config.rewrite_mode = RewriteMode::CallSite;

    let result = SchemaConsolidator::new(config).consolidate().unwrap();

    assert_eq!(
        result.schema["properties"]["a"]["properties"]["c"]["items"],
        json!({ "$ref": "#/definitions/workflow_D" })
    );
    // The harvested copy of A is attributed to a.json instead of c.json
    assert_eq!(
        dangling_definition_refs(&result.schema),
        vec![
            "#/definitions/workflow_D".to_string(),
            "#/definitions/a_D".to_string()
        ]
    );
    assert_eq!(
        result.schema["definitions"]["c_C"],
        json!({ "items": { "$ref": "#/definitions/c_D" } })
    );
}
