//! Whole-model properties that hold for every successful analysis.

use crate::helpers::model_assertions::*;
use crate::helpers::model_fixtures::*;
use mana::hir::analyze;
use mana::syntax::{AttributeDecl, ClassDecl, ModelInput, RelationshipDecl, SubsystemDecl};
use mana::{IdGroup, Side};
use rstest::rstest;

#[rstest]
#[case::orders(orders())]
#[case::reporting(reporting())]
#[case::shipping(shipping())]
#[case::air_traffic_control(air_traffic_control())]
#[case::machines(machines())]
#[case::race(race(ranked_runner()))]
fn test_every_attribute_has_a_type(#[case] input: ModelInput) {
    let model = resolve(&input);
    for class in model.classes.values() {
        for attribute in class.all_attributes() {
            assert!(
                attribute.resolved_type.is_some(),
                "'{}.{}' has no type",
                class.name,
                attribute.name
            );
        }
    }
}

#[rstest]
#[case::orders(orders())]
#[case::reporting(reporting())]
#[case::air_traffic_control(air_traffic_control())]
fn test_analysis_is_repeatable(#[case] input: ModelInput) {
    let first = analyze(&input);
    let second = analyze(&input);
    assert!(first.is_ok());
    assert_eq!(first, second);
}

#[test]
fn test_relationship_order_does_not_matter() {
    let forward = air_traffic_control();
    let mut backward = forward.clone();
    backward.subsystems[0].relationships.reverse();

    let forward = resolve(&forward);
    let backward = resolve(&backward);
    assert_eq!(forward.referential, backward.referential);
    for class in forward.classes.values() {
        for attribute in class.all_attributes() {
            assert_eq!(
                attribute.resolved_type.as_ref(),
                backward.attribute_type(&class.name, &attribute.name)
            );
        }
    }
}

#[test]
fn test_class_without_identifier_is_a_singleton() {
    let mut input = orders();
    input.subsystems[0]
        .classes
        .push(ClassDecl::new("Catalog").with_attribute(attr("Title", "Text")));
    let model = resolve(&input);

    let catalog = &model.class("Catalog").unwrap().identifiers;
    assert!(catalog.is_singleton());
    assert!(catalog.members(IdGroup::I).is_empty());
    assert!(!model.class("Order").unwrap().identifiers.is_singleton());
}

/// The formalizing class sits on T, so the referred class is on P.
#[test]
fn test_formalizer_on_t_side() {
    let input = single(
        SubsystemDecl::new("Parking")
            .with_class(ClassDecl::new("Garage").with_attribute(id("Code", "Garage Code")))
            .with_class(
                ClassDecl::new("Car")
                    .with_attribute(id("Plate", "Plate"))
                    .with_attribute(AttributeDecl::new("Garage_Code").referential("R4")),
            )
            .with_relationship(RelationshipDecl::association(
                "R4",
                one("Garage", "houses").conditional(),
                many("Car", "is parked in"),
            )),
    );
    let model = resolve(&input);
    let data = plain(&model, "Garage", "R4");
    assert_eq!(data.formalizing_class, "Car");
    assert_eq!(data.side, Side::P);
    assert_eq!(pairs(data), vec![("Garage_Code", "Code")]);
}

#[test]
fn test_warnings_do_not_stop_analysis() {
    let input = single(
        SubsystemDecl::new("Stock")
            .with_class(ClassDecl::new("Bin").with_attribute(id("ID", "Bin ID")))
            .with_class(
                ClassDecl::new("Item")
                    .with_attribute(id("ID", "Item ID"))
                    .imported_from("Catalog"),
            ),
    );
    let model = resolve(&input);
    assert_eq!(model.warnings.len(), 1);
    assert_eq!(model.classes.len(), 2);
    assert_eq!(type_of(&model, "Item", "ID"), &scalar("Item ID"));
}
