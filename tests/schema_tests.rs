use intakeflow::{validate_value, Schema, SchemaKind, SchemaRegistry, SchemaViolation};
use serde_json::json;

fn prescriptions_schema() -> Schema {
    Schema::object()
        .property(
            "prescriptions",
            Schema::array(
                Schema::object()
                    .property("medication", Schema::string())
                    .property("dosage", Schema::string())
                    .required("medication")
                    .required("dosage"),
            ),
        )
        .required("prescriptions")
}

#[test]
fn schema_registry_registers_and_validates() {
    let mut registry = SchemaRegistry::new();
    registry.register(
        "user",
        Schema::object()
            .property("name", Schema::string())
            .property("age", Schema::new(SchemaKind::Integer))
            .required("name")
            .deny_additional(),
    );

    assert!(registry.validate("user", &json!({ "name": "Alice", "age": 30 })).is_ok());
    assert!(registry.validate("user", &json!({ "age": 30 })).is_err());
    assert!(registry
        .validate("user", &json!({ "name": "Bob", "city": "Paris" }))
        .is_err());
    assert!(registry.validate("missing", &json!({})).is_err());
}

#[test]
fn missing_required_field_is_named() {
    let err = validate_value(&prescriptions_schema(), &json!({})).unwrap_err();
    assert_eq!(err.field().as_deref(), Some("prescriptions"));
    assert_eq!(err.violation(), Some(&SchemaViolation::MissingRequired));
}

#[test]
fn nested_array_items_are_validated() {
    let value = json!({
        "prescriptions": [
            { "medication": "Doliprane", "dosage": "500mg" },
            { "medication": "Ventoline" }
        ]
    });
    let err = validate_value(&prescriptions_schema(), &value).unwrap_err();
    assert_eq!(err.field().as_deref(), Some("prescriptions.1.dosage"));
    assert_eq!(err.violation(), Some(&SchemaViolation::MissingRequired));
}

#[test]
fn wrong_primitive_type_is_reported() {
    let value = json!({
        "prescriptions": [{ "medication": "Doliprane", "dosage": 500 }]
    });
    let err = validate_value(&prescriptions_schema(), &value).unwrap_err();
    assert_eq!(err.field().as_deref(), Some("prescriptions.0.dosage"));
    assert_eq!(
        err.violation(),
        Some(&SchemaViolation::WrongType {
            expected: "string",
            found: "integer"
        })
    );
    assert_eq!(
        err.details(),
        json!({
            "field": "prescriptions.0.dosage",
            "violation": { "constraint": "wrong_type", "expected": "string", "found": "integer" }
        })
    );
}

#[test]
fn array_element_must_be_object() {
    let value = json!({ "prescriptions": ["Doliprane"] });
    let err = validate_value(&prescriptions_schema(), &value).unwrap_err();
    assert_eq!(err.field().as_deref(), Some("prescriptions.0"));
}

#[test]
fn function_parameter_json_deserializes() -> anyhow::Result<()> {
    let schema: Schema = serde_json::from_value(json!({
        "type": "object",
        "properties": {
            "allergies": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "allergie" }
                    },
                    "required": ["name"]
                }
            }
        },
        "required": ["allergies"]
    }))?;

    assert!(validate_value(&schema, &json!({ "allergies": [] })).is_ok());
    assert!(validate_value(&schema, &json!({ "allergies": [{ "name": "pollen" }] })).is_ok());
    assert!(validate_value(&schema, &json!({ "allergies": [{}] })).is_err());

    let empty: Schema = serde_json::from_value(json!({ "type": "object" }))?;
    assert!(validate_value(&empty, &json!({ "anything": 1 })).is_ok());
    Ok(())
}

#[test]
fn validation_is_deterministic() {
    let schema = Schema::object()
        .property("a", Schema::string())
        .property("b", Schema::string());
    let value = json!({ "b": 1, "a": 2 });
    let first = validate_value(&schema, &value).unwrap_err();
    let second = validate_value(&schema, &value).unwrap_err();
    assert_eq!(first, second);
    assert_eq!(first.field().as_deref(), Some("a"));
}
