//! Model documents read from and written to disk.

use std::path::Path;

use crate::helpers::model_assertions::*;
use crate::helpers::model_fixtures::*;
use mana::hir::{Outcome, ResolvedModel, ResolvedType};
use mana::interchange::{DocumentFormat, Json, Yaml, detect_format};
use mana::syntax::ModelInput;
use mana::{IdGroup, Side};

const SALES: &str = r#"
name: Sales
alias: SLS
classes:
  - name: Order
    attributes:
      - name: Number
        type: Order Number
        identifier_group_memberships: [I]
      - name: Customer_ID
        relationship_numbers: [R1]
  - name: Customer
    attributes:
      - name: ID
        type: Customer ID
        identifier_group_memberships: [I]
relationships:
  - id: R1
    p_side: { class: Order, phrase: is placed by, multiplicity: M }
    t_side: { class: Customer, phrase: places, multiplicity: "1", conditional: true }
"#;

const MACHINE: &str = r#"{
  "domain": "Plant",
  "lifecycle_class": "Machine",
  "events": [{ "name": "Start" }, { "name": "Stop" }],
  "states": [
    { "name": "Idle", "type": "normal",
      "transitions": [{ "event": "Start", "target": "Running" }] },
    { "name": "Running", "type": "normal",
      "transitions": [{ "event": "Stop", "target": "Idle" }, { "event": "Start" }] }
  ]
}"#;

fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap()
}

#[test]
fn test_yaml_subsystem_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.yaml");
    std::fs::write(&path, SALES).unwrap();

    let format = detect_format(&path).unwrap();
    let subsystem = format.read_subsystem(&read(&path)).unwrap();
    let model = resolve(&single(subsystem));

    assert_eq!(model.subsystems["Sales"].alias, "SLS");
    let data = plain(&model, "Customer", "R1");
    assert_eq!(data.side, Side::T);
    assert_eq!(data.id_group, IdGroup::I);
    assert_eq!(pairs(data), vec![("Customer_ID", "ID")]);
    assert_eq!(type_of(&model, "Order", "Customer_ID"), &scalar("Customer ID"));
}

#[test]
fn test_json_state_model_document() {
    let subsystem = machines().subsystems.remove(0);
    let lifecycle = Json.read_state_model(MACHINE.as_bytes()).unwrap();
    let model = resolve(&single(subsystem).with_state_model(lifecycle));

    let running = state(&model, "Machine", "Running");
    assert_eq!(running.transitions["Start"], Outcome::Ignore);
    assert_eq!(
        running.transitions["Stop"],
        Outcome::Transition {
            target: "Idle".into()
        }
    );
}

/// Declarations written by either format read back into the same analysis.
#[test]
fn test_declarations_survive_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let subsystem_path = dir.path().join("atc.yaml");
    let lifecycle_path = dir.path().join("controller.json");
    std::fs::write(&subsystem_path, Yaml.encode(&air_traffic_control_subsystem()).unwrap())
        .unwrap();
    std::fs::write(&lifecycle_path, Json.encode(&controller_lifecycle()).unwrap()).unwrap();

    let subsystem = detect_format(&subsystem_path)
        .unwrap()
        .read_subsystem(&read(&subsystem_path))
        .unwrap();
    let lifecycle = detect_format(&lifecycle_path)
        .unwrap()
        .read_state_model(&read(&lifecycle_path))
        .unwrap();
    assert_eq!(subsystem, air_traffic_control_subsystem());
    assert_eq!(lifecycle, controller_lifecycle());

    let from_disk = resolve(&single(subsystem).with_state_model(lifecycle));
    assert_eq!(from_disk, resolve(&air_traffic_control()));
}

#[test]
fn test_whole_input_document() {
    let input = air_traffic_control();
    let bytes = Json.encode(&input).unwrap();
    let read_back: ModelInput = Json.read_input(&bytes).unwrap();
    assert_eq!(read_back, input);
}

// =============================================================================
// RESOLVED MODEL OUTPUT
// =============================================================================

#[test]
fn test_resolved_model_json() {
    let model = resolve(&shipping());
    let bytes = Json.write_model(&model).unwrap();
    let read_back: ResolvedModel = Json.decode(&bytes).unwrap();
    assert_eq!(read_back, model);

    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let status = &value["classes"]["Shipment"]["attributes"][1];
    assert_eq!(status["name"], "Status");
    assert_eq!(status["resolved_type"], serde_json::json!(["Delivered", "Pending"]));
}

#[test]
fn test_resolved_model_yaml() {
    let model = resolve(&air_traffic_control());
    let bytes = Yaml.write_model(&model).unwrap();
    let read_back: ResolvedModel = Yaml.decode(&bytes).unwrap();
    assert_eq!(read_back.classes.len(), 4);
    assert_eq!(
        read_back.attribute_type("On Duty Controller", "Station"),
        Some(&ResolvedType::Scalar("Station Number".into()))
    );
    assert_eq!(read_back.state_models, model.state_models);
}
