use metabox_core::metabox::{DefinitionError, MetaBox, DEFAULT_CAPABILITY};
use metabox_core::{Field, FieldKind};
use serde_json::json;

#[test]
/// REQ-BOX-001
fn test_metabox_req_box_001_derived_keys_follow_the_id() {
    let metabox = MetaBox::new("Event details", "event").unwrap();
    assert_eq!(metabox.nonce_key(), "event_nonce");
    assert_eq!(metabox.action_key(), "save-event");
    assert_eq!(metabox.capability(), DEFAULT_CAPABILITY);
}

#[test]
/// REQ-BOX-002
fn test_metabox_req_box_002_ids_and_names_are_validated() {
    assert_eq!(MetaBox::new("t", "").unwrap_err(), DefinitionError::EmptyId);
    assert!(matches!(
        MetaBox::new("t", "bad[id]").unwrap_err(),
        DefinitionError::InvalidId(_)
    ));

    let mut metabox = MetaBox::new("t", "box").unwrap();
    assert_eq!(
        metabox.add_field(Field::text("")).unwrap_err(),
        DefinitionError::EmptyFieldName
    );
    assert!(matches!(
        metabox.add_field(Field::text("na me")).unwrap_err(),
        DefinitionError::InvalidName(_)
    ));

    metabox.add_field(Field::text("subtitle")).unwrap();
    assert_eq!(
        metabox.add_field(Field::date("subtitle")).unwrap_err(),
        DefinitionError::DuplicateField("subtitle".to_string())
    );
}

#[test]
/// REQ-BOX-003
fn test_metabox_req_box_003_groups_keep_declaration_order_and_extend() {
    let mut metabox = MetaBox::new("t", "box").unwrap();
    metabox
        .group_fields("address_", [Field::text("street")])
        .unwrap();
    metabox
        .group_fields("address_", [Field::text("city")])
        .unwrap();
    metabox.group_fields("phone_", [Field::text("number")]).unwrap();

    assert_eq!(metabox.groups().len(), 2);
    let address = &metabox.groups()[0];
    assert_eq!(address.prefix, "address_");
    let names: Vec<_> = address.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["street", "city"]);
    assert_eq!(address.storage_key(&address.fields[1]), "address_city");

    assert_eq!(
        metabox
            .group_fields("address_", [Field::text("street")])
            .unwrap_err(),
        DefinitionError::DuplicateField("street".to_string())
    );
}

#[test]
/// REQ-BOX-004
fn test_metabox_req_box_004_enable_gating() {
    let mut metabox = MetaBox::new("t", "box").unwrap();
    // No enables configured: enabled everywhere.
    assert!(metabox.is_enabled_for("post", "17", "welcome"));

    metabox.set_enables(["page", "42"]);
    assert!(metabox.is_enabled_for("page", "17", "welcome"));
    assert!(metabox.is_enabled_for("post", "42", "welcome"));
    assert!(!metabox.is_enabled_for("post", "17", "welcome"));
}

#[test]
/// REQ-BOX-005
fn test_metabox_req_box_005_from_definition_builds_fields_and_groups() {
    let definition = json!({
        "id": "event",
        "title": "Event details",
        "capability": "manage_events",
        "enables": ["post"],
        "fields": [
            {"type": "text", "name": "subtitle", "placeholder": "Subtitle"},
            {"type": "textarea", "name": "notes", "rows": 6},
            {"type": "editor", "name": "body"},
        ],
        "groups": [
            {"prefix": "address_", "fields": [
                {"type": "text", "name": "street"},
                {"type": "text", "name": "city"},
            ]},
        ],
    });

    let metabox = MetaBox::from_definition(&definition).unwrap();
    assert_eq!(metabox.id, "event");
    assert_eq!(metabox.capability(), "manage_events");
    assert_eq!(metabox.fields().len(), 3);
    assert_eq!(
        metabox.fields()[0].placeholder.as_deref(),
        Some("Subtitle")
    );
    assert_eq!(metabox.fields()[1].kind, FieldKind::Textarea { rows: 6 });
    assert_eq!(metabox.fields()[2].kind, FieldKind::Editor { rows: 10 });
    assert_eq!(metabox.groups().len(), 1);
    assert_eq!(metabox.groups()[0].fields.len(), 2);
}

#[test]
/// REQ-BOX-006
fn test_metabox_req_box_006_definitions_are_checked_up_front() {
    let unknown_kind = json!({
        "id": "box", "title": "t",
        "fields": [{"type": "color", "name": "tint"}],
    });
    assert_eq!(
        MetaBox::from_definition(&unknown_kind).unwrap_err(),
        DefinitionError::UnknownKind("color".to_string())
    );

    // Options are validated against the field kind instead of being read
    // with fallbacks at render time.
    let rows_on_text = json!({
        "id": "box", "title": "t",
        "fields": [{"type": "text", "name": "subtitle", "rows": 4}],
    });
    assert_eq!(
        MetaBox::from_definition(&rows_on_text).unwrap_err(),
        DefinitionError::InvalidOption {
            field: "subtitle".to_string(),
            option: "rows".to_string(),
        }
    );

    let missing_title = json!({"id": "box"});
    assert_eq!(
        MetaBox::from_definition(&missing_title).unwrap_err(),
        DefinitionError::MissingKey("title")
    );

    assert_eq!(
        MetaBox::from_definition(&json!([])).unwrap_err(),
        DefinitionError::NotAnObject("definition")
    );
}

#[test]
/// REQ-BOX-007
fn test_metabox_req_box_007_field_display_values() {
    let date = Field::date("when");
    assert_eq!(date.display_value("2024-03-09"), "09-03-2024");
    // Unparseable dates pass through untouched.
    assert_eq!(date.display_value("soon"), "soon");
    assert_eq!(date.display_value(""), "");

    let text = Field::text("subtitle");
    assert_eq!(text.display_value("2024-03-09"), "2024-03-09");
    assert_eq!(text.kind.input_type(), Some("text"));
    assert_eq!(Field::textarea("notes", 3).kind.input_type(), None);
}
