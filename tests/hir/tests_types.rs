//! Type resolution: equivalence classes, unions and their aliases.

use crate::helpers::model_assertions::*;
use crate::helpers::model_fixtures::*;
use mana::hir::{AnalysisError, ResolvedType};
use mana::IdGroup;
use mana::syntax::{AttributeDecl, ClassDecl, ModelInput, RelationshipDecl, SubsystemDecl};

fn union(members: &[&str]) -> ResolvedType {
    ResolvedType::Union(members.iter().map(|m| (*m).into()).collect())
}

/// Replace the declaration of `Shipment.Status`.
fn shipping_with_status(status: AttributeDecl) -> ModelInput {
    let mut input = shipping();
    let shipment = &mut input.subsystems[0].classes[0];
    shipment.attributes[1] = status;
    input
}

fn status() -> AttributeDecl {
    AttributeDecl::new("Status")
        .union_referential("R5")
        .union_referential("R6")
}

// =============================================================================
// SCALARS
// =============================================================================

#[test]
fn test_referential_attribute_takes_identifier_type() {
    let model = resolve(&orders());
    assert_eq!(type_of(&model, "Order", "Customer_ID"), &scalar("Customer ID"));
    assert_eq!(type_of(&model, "Order", "Number"), &scalar("Order Number"));
    assert!(model.types.contains_scalar("Customer ID"));
    assert!(model.types.contains_scalar("Order Number"));
    assert!(model.types.unions.is_empty());
}

#[test]
fn test_equivalence_class_spans_relationships() {
    let model = resolve(&air_traffic_control());
    for class in ["Air Traffic Controller", "On Duty Controller", "Off Duty Controller"] {
        assert_eq!(type_of(&model, class, "ID"), &scalar("Employee ID"));
    }
    assert_eq!(
        type_of(&model, "On Duty Controller", "Station"),
        &scalar("Station Number")
    );
}

#[test]
fn test_matching_redundant_declaration() {
    let mut input = orders();
    input.subsystems[0].classes[0].attributes[1] =
        AttributeDecl::new("Customer_ID").typed("Customer ID").referential("R1");
    let model = resolve(&input);
    assert_eq!(type_of(&model, "Order", "Customer_ID"), &scalar("Customer ID"));
}

#[test]
fn test_conflicting_scalars_across_reference() {
    let mut input = orders();
    input.subsystems[0].classes[0].attributes[1] =
        AttributeDecl::new("Customer_ID").typed("Text").referential("R1");
    match resolve_err(&input) {
        AnalysisError::MultipleTypeDefinitions { declarations } => {
            let found: Vec<(&str, &str, &str)> = declarations
                .iter()
                .map(|d| {
                    (
                        d.location.class.as_str(),
                        d.location.attribute.as_str(),
                        d.declared.as_str(),
                    )
                })
                .collect();
            assert_eq!(
                found,
                vec![
                    ("Order", "Customer_ID", "Text"),
                    ("Customer", "ID", "Customer ID"),
                ]
            );
        }
        other => panic!("expected MultipleTypeDefinitions, got {other:?}"),
    }
}

#[test]
fn test_untyped_attribute() {
    let mut input = orders();
    input.subsystems[0].classes[0]
        .attributes
        .push(AttributeDecl::new("Notes"));
    match resolve_err(&input) {
        AnalysisError::TypeNotDefined { attributes } => {
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes[0].class, "Order");
            assert_eq!(attributes[0].attribute, "Notes");
            assert_eq!(attributes[0].subsystem, "Sales");
        }
        other => panic!("expected TypeNotDefined, got {other:?}"),
    }
}

#[test]
fn test_every_untyped_attribute_is_listed() {
    let mut input = orders();
    let classes = &mut input.subsystems[0].classes;
    classes[0].attributes.push(AttributeDecl::new("Notes"));
    classes[1].attributes.push(AttributeDecl::new("Address"));
    let err = resolve_err(&input);
    assert!(matches!(
        &err,
        AnalysisError::TypeNotDefined { attributes } if attributes.len() == 2
    ));
    let message = err.to_string();
    assert!(message.contains("Notes") && message.contains("Address"));
}

// =============================================================================
// UNIONS
// =============================================================================

/// `Shipment.Status` is either a `Pending` or a `Delivered` state.
#[test]
fn test_union_type() {
    let model = resolve(&shipping());
    let status = type_of(&model, "Shipment", "Status");
    assert_eq!(status, &union(&["Delivered", "Pending"]));
    assert_eq!(status.to_string(), "Union(Delivered, Pending)");

    let entry = model.types.union(&["Delivered".into(), "Pending".into()]).unwrap();
    assert_eq!(entry.alias, None);
    assert!(model.types.contains_scalar("Delivered"));
    assert!(model.types.contains_scalar("Pending"));
}

#[test]
fn test_declared_scalar_names_the_union() {
    let model = resolve(&shipping_with_status(
        status()
            .typed("Shipment State")
            .union_of(["Pending", "Delivered"]),
    ));
    assert_eq!(
        type_of(&model, "Shipment", "Status"),
        &union(&["Delivered", "Pending"])
    );
    let entry = model.types.union(&["Delivered".into(), "Pending".into()]).unwrap();
    assert_eq!(entry.alias.as_deref(), Some("Shipment State"));
}

/// A scalar on a union-typed attribute needs the member list it stands for.
#[test]
fn test_scalar_without_member_list_is_not_an_alias() {
    match resolve_err(&shipping_with_status(status().typed("Shipment State"))) {
        AnalysisError::MultipleTypeDefinitions { declarations } => {
            assert_eq!(declarations.len(), 1);
            assert_eq!(declarations[0].location.class, "Shipment");
            assert_eq!(declarations[0].location.attribute, "Status");
            assert_eq!(declarations[0].declared, "Shipment State");
        }
        other => panic!("expected MultipleTypeDefinitions, got {other:?}"),
    }
}

#[test]
fn test_declared_union_must_match() {
    let model = resolve(&shipping_with_status(status().union_of(["Pending", "Delivered"])));
    assert_eq!(
        type_of(&model, "Shipment", "Status"),
        &union(&["Delivered", "Pending"])
    );

    assert!(matches!(
        resolve_err(&shipping_with_status(status().union_of(["Pending", "Lost"]))),
        AnalysisError::MultipleTypeDefinitions { .. }
    ));
}

#[test]
fn test_conflicting_union_alias() {
    let mut input = shipping_with_status(
        status()
            .typed("Shipment State")
            .union_of(["Pending", "Delivered"]),
    );
    let subsystem = &mut input.subsystems[0];
    subsystem.classes.push(
        ClassDecl::new("Return")
            .with_attribute(id("Number", "Return Number"))
            .with_attribute(
                AttributeDecl::new("Status")
                    .typed("Return State")
                    .union_of(["Pending", "Delivered"])
                    .union_referential("R7")
                    .union_referential("R8"),
            ),
    );
    subsystem.relationships.push(RelationshipDecl::association(
        "R7",
        many("Return", "waits in").conditional(),
        one("Backlog", "holds returns"),
    ));
    subsystem.relationships.push(RelationshipDecl::association(
        "R8",
        many("Return", "is filed in").conditional(),
        one("Archive", "files returns"),
    ));
    match resolve_err(&input) {
        AnalysisError::ConflictingUnionAlias { members, aliases } => {
            assert_eq!(members, vec!["Delivered", "Pending"]);
            assert_eq!(aliases, vec!["Shipment State", "Return State"]);
        }
        other => panic!("expected ConflictingUnionAlias, got {other:?}"),
    }
}

/// `A.X` and `B.Y` choose between each other; only `C.Z` contributes a type.
#[test]
fn test_union_cycle_settles_on_reachable_scalar() {
    let input = single(
        SubsystemDecl::new("Loop")
            .with_class(
                ClassDecl::new("A").with_attribute(
                    AttributeDecl::new("X")
                        .identifier(IdGroup::I)
                        .union_referential("R1")
                        .union_referential("R2"),
                ),
            )
            .with_class(
                ClassDecl::new("B").with_attribute(
                    AttributeDecl::new("Y")
                        .identifier(IdGroup::I)
                        .union_referential("R3"),
                ),
            )
            .with_class(ClassDecl::new("C").with_attribute(id("Z", "T")))
            .with_relationship(RelationshipDecl::association(
                "R1",
                many("A", "follows"),
                one("B", "leads"),
            ))
            .with_relationship(RelationshipDecl::association(
                "R2",
                many("A", "ends at"),
                one("C", "ends"),
            ))
            .with_relationship(RelationshipDecl::association(
                "R3",
                many("B", "follows"),
                one("A", "leads"),
            )),
    );
    let model = resolve(&input);
    assert_eq!(type_of(&model, "A", "X"), &scalar("T"));
    assert_eq!(type_of(&model, "B", "Y"), &scalar("T"));
    assert_eq!(type_of(&model, "C", "Z"), &scalar("T"));
    assert!(model.types.unions.is_empty());
}

#[test]
fn test_union_referential_attribute_makes_no_reference() {
    let model = resolve(&shipping());
    assert!(model.referential.reference("Backlog", &"R5".into()).is_none());
    assert!(model.referential.reference("Archive", &"R6".into()).is_none());
}
