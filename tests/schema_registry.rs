//! Schema Registry Tests
//!
//! Schemas written as JSON files drive the same validation as built ones:
//! - JSON encoding of types and constraints
//! - Registry load, resolve and immutability
//! - CLI responses for valid and invalid batches

use std::fs;

use batchval::cli::{self, Outcome};
use batchval::schema::{SchemaLoader, ValueConstraint};
use batchval::{validate, AggregateConstraint, Batch, FieldType, ValidatorConfig, Violation};
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

const SHOP_SCHEMA: &str = r#"{
    "schema_id": "shop",
    "schema_version": "2",
    "description": "Shops and where they are",
    "fields": [
        { "name": "shop_id", "type": "int", "unique": true },
        { "name": "zone", "type": "literal", "values": ["dry", "cold", "frozen"] },
        {
            "name": "share",
            "type": "float",
            "constraints": [
                { "kind": "sum_between", "min": 99.0, "max": 101.0 },
                { "kind": "min_at_least", "min": 0.0 }
            ]
        },
        {
            "name": "code",
            "type": "string",
            "required": false,
            "checks": [{ "kind": "pattern", "regex": "^[A-Z]{3}$" }]
        },
        {
            "name": "place",
            "type": "object",
            "schema": {
                "schema_id": "place",
                "fields": [
                    { "name": "town", "type": "string" },
                    { "name": "country", "type": "string" }
                ]
            }
        }
    ]
}"#;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_schema_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("schema_shop_2.json"), SHOP_SCHEMA).unwrap();
    tmp
}

fn shop(id: i64, share: f64, town: &str) -> serde_json::Value {
    json!({
        "shop_id": id,
        "zone": "dry",
        "share": share,
        "place": { "town": town, "country": "NL" }
    })
}

// =============================================================================
// JSON Encoding Tests
// =============================================================================

/// The JSON file decodes into typed fields and constraints.
#[test]
fn test_schema_json_decodes() {
    let tmp = setup_schema_dir();
    let schema = SchemaLoader::read_file(&tmp.path().join("schema_shop_2.json")).unwrap();

    assert_eq!(schema.key(), ("shop", "2"));
    assert_eq!(schema.description(), Some("Shops and where they are"));
    assert!(schema.field("shop_id").unwrap().requires_unique());
    assert_eq!(
        schema.field("share").unwrap().constraints[0],
        AggregateConstraint::SumBetween {
            min: 99.0,
            max: 101.0
        }
    );
    assert_eq!(
        schema.field("code").unwrap().checks,
        vec![ValueConstraint::Pattern {
            regex: "^[A-Z]{3}$".into()
        }]
    );

    let place = schema.field("place").unwrap().nested_schema().unwrap();
    assert_eq!(place.schema_version(), "1");
    assert!(matches!(place.fields()[0].field_type, FieldType::String));
}

/// A loaded schema validates batches like a built one.
#[test]
fn test_loaded_schema_validates() {
    let tmp = setup_schema_dir();
    let mut loader = SchemaLoader::new(tmp.path());
    loader.load_all().unwrap();
    let schema = loader.resolve("shop", "2").unwrap();

    let good = Batch::new(vec![shop(1, 40.0, "Delft"), shop(2, 60.0, "Gouda")]);
    assert!(validate(schema, &good).is_valid());

    let mut bad_code = shop(3, 0.0, "Ede");
    bad_code["code"] = json!("ede");
    let bad = Batch::new(vec![shop(1, 40.0, "Delft"), shop(2, 70.0, "Gouda"), bad_code]);

    let codes: Vec<&str> = validate(schema, &bad)
        .violations()
        .iter()
        .map(Violation::code)
        .collect();
    assert_eq!(codes, vec!["VALUE_CONSTRAINT", "AGGREGATE_CONSTRAINT"]);
}

// =============================================================================
// Registry Tests
// =============================================================================

/// Unknown ids and versions are distinguished.
#[test]
fn test_resolve_unknown() {
    let tmp = setup_schema_dir();
    let mut loader = SchemaLoader::new(tmp.path());
    loader.load_all().unwrap();

    assert_eq!(loader.schema_count(), 1);
    assert_eq!(
        loader.resolve("product", "1").unwrap_err().code().code(),
        "BATCH_UNKNOWN_SCHEMA"
    );
    assert_eq!(
        loader.resolve("shop", "1").unwrap_err().code().code(),
        "BATCH_UNKNOWN_SCHEMA_VERSION"
    );
}

/// A saved schema cannot be overwritten.
#[test]
fn test_saved_schema_is_immutable() {
    let tmp = setup_schema_dir();
    let schema = SchemaLoader::read_file(&tmp.path().join("schema_shop_2.json")).unwrap();

    let err = SchemaLoader::new(tmp.path()).save_schema(&schema).unwrap_err();
    assert_eq!(err.code().code(), "BATCH_SCHEMA_IMMUTABLE");
}

/// An aggregate on a string field is rejected at load time.
#[test]
fn test_inapplicable_constraint_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("schema_bad_1.json");
    fs::write(
        &path,
        r#"{"schema_id":"bad","fields":[{"name":"name","type":"string",
            "constraints":[{"kind":"sum_equals","target":1.0}]}]}"#,
    )
    .unwrap();

    let err = SchemaLoader::read_file(&path).unwrap_err();
    assert_eq!(err.code().code(), "BATCH_SCHEMA_INVALID");
    assert!(err.message().contains("requires a numeric field"));
}

// =============================================================================
// CLI Tests
// =============================================================================

/// Valid batch text yields an ok response with the typed data.
#[test]
fn test_cli_valid_response() {
    let tmp = setup_schema_dir();
    let schema = SchemaLoader::read_file(&tmp.path().join("schema_shop_2.json")).unwrap();
    let text = serde_json::to_string(&vec![shop(1, 100.0, "Delft")]).unwrap();

    let (outcome, response) =
        cli::validate_text(&schema, &text, &ValidatorConfig::default(), Uuid::new_v4()).unwrap();

    assert_eq!(outcome, Outcome::Ok);
    assert_eq!(response["data"]["records"][0]["place"]["town"], "Delft");
    assert_eq!(response["data"]["records"][0]["code"], serde_json::Value::Null);
}

/// Nested failures appear in the response with their full path.
#[test]
fn test_cli_invalid_response() {
    let tmp = setup_schema_dir();
    let schema = SchemaLoader::read_file(&tmp.path().join("schema_shop_2.json")).unwrap();
    let text = r#"[{"shop_id": 1, "zone": "dry", "share": 100.0, "place": {"town": "Delft"}}]"#;

    let (outcome, response) =
        cli::validate_text(&schema, text, &ValidatorConfig::default(), Uuid::new_v4()).unwrap();

    assert_eq!(outcome.exit_code(), 2);
    let nested = &response["violations"][0];
    assert_eq!(nested["kind"], "nested_validation_failure");
    assert_eq!(nested["field"], "place");
    assert_eq!(nested["violations"][0]["kind"], "missing_field");
    assert_eq!(nested["violations"][0]["field"], "place.country");
}

/// check-schema accepts a well-formed file.
#[test]
fn test_cli_check_schema() {
    let tmp = setup_schema_dir();
    let outcome = cli::check_schema(&tmp.path().join("schema_shop_2.json")).unwrap();
    assert_eq!(outcome, Outcome::Ok);
}
