//! Referential resolution: which referring attribute formalizes which identifier.

use crate::helpers::model_assertions::*;
use crate::helpers::model_fixtures::*;
use mana::hir::{AnalysisError, RefAttrFailure, ReferenceKind, RelationshipKind, VariantKey};
use mana::syntax::{AttributeDecl, ClassDecl, ModelInput, RelationshipDecl, SubsystemDecl};
use mana::{IdGroup, Rnum, Side};
use rstest::rstest;

/// `Order` refers to `customer` over `R1` with the given referring attributes.
fn orders_with(customer: ClassDecl, referring: Vec<AttributeDecl>) -> ModelInput {
    let mut order = ClassDecl::new("Order").with_attribute(id("Number", "Order Number"));
    for attribute in referring {
        order = order.with_attribute(attribute);
    }
    single(
        SubsystemDecl::new("Sales")
            .with_class(order)
            .with_class(customer)
            .with_relationship(RelationshipDecl::association(
                "R1",
                many("Order", "is placed by"),
                one("Customer", "places"),
            )),
    )
}

fn r1(name: &str) -> AttributeDecl {
    AttributeDecl::new(name).referential("R1")
}

fn r2(name: &str) -> AttributeDecl {
    AttributeDecl::new(name).referential("R2")
}

// =============================================================================
// TO-ONE
// =============================================================================

/// `Order.Customer_ID` over `R1` to `Customer.ID`.
#[test]
fn test_to_one_reference() {
    let model = resolve(&orders());
    let reference = reference(&model, "Customer", "R1");
    assert_eq!(reference.reference_kind, ReferenceKind::ToOne);
    assert_eq!(reference.relationship_kind, RelationshipKind::Binary);

    let data = plain(&model, "Customer", "R1");
    assert_eq!(data.formalizing_class, "Order");
    assert_eq!(data.side, Side::T);
    assert_eq!(data.id_group, IdGroup::I);
    assert_eq!(pairs(data), vec![("Customer_ID", "ID")]);
}

#[test]
fn test_id_stands_for_class_name() {
    let input = orders_with(
        ClassDecl::new("Customer").with_attribute(id("ID", "Customer ID")),
        vec![r1("Customer")],
    );
    let model = resolve(&input);
    assert_eq!(pairs(plain(&model, "Customer", "R1")), vec![("Customer", "ID")]);
}

#[test]
fn test_general_rename() {
    let input = orders_with(
        ClassDecl::new("Customer").with_attribute(id("ID", "Customer ID")),
        vec![r1("Buyer").rename("R1", "ID")],
    );
    let model = resolve(&input);
    assert_eq!(pairs(plain(&model, "Customer", "R1")), vec![("Buyer", "ID")]);
}

#[test]
fn test_composite_identifier_with_ignored_attribute() {
    let customer = ClassDecl::new("Customer")
        .with_attribute(id("Region", "Region Code"))
        .with_attribute(id("Number", "Customer Number"));
    let input = {
        let mut input = orders_with(customer, vec![r1("Customer_Number")]);
        let order = &mut input.subsystems[0].classes[0];
        order
            .ignored_attributes
            .push(AttributeDecl::new("Region").typed("Region Code").referential("R1"));
        input
    };
    let model = resolve(&input);
    let data = plain(&model, "Customer", "R1");
    assert_eq!(pairs(data), vec![("Customer_Number", "Number")]);
    assert!(model.class("Order").unwrap().is_ignored("Region"));
}

/// An ignored referring attribute still takes the type of the identifier it matched.
#[test]
fn test_untyped_ignored_attribute_takes_identifier_type() {
    let customer = ClassDecl::new("Customer")
        .with_attribute(id("Region", "Region Code"))
        .with_attribute(id("Number", "Customer Number"));
    let input = {
        let mut input = orders_with(customer, vec![r1("Customer_Number")]);
        let order = &mut input.subsystems[0].classes[0];
        order
            .ignored_attributes
            .push(AttributeDecl::new("Region").referential("R1"));
        input
    };
    let model = resolve(&input);
    assert_eq!(
        pairs(plain(&model, "Customer", "R1")),
        vec![("Customer_Number", "Number")]
    );
    assert_eq!(type_of(&model, "Order", "Region"), &scalar("Region Code"));
    assert_eq!(
        type_of(&model, "Order", "Customer_Number"),
        &scalar("Customer Number")
    );
}

#[test]
fn test_formalized_by() {
    let model = resolve(&orders());
    let formalized = model.referential.formalized_by("Order");
    assert_eq!(formalized.len(), 1);
    let (referred, rnum, _) = formalized[0];
    assert_eq!(referred, "Customer");
    assert_eq!(rnum, &Rnum::new("R1"));
    assert!(model.referential.formalized_by("Customer").is_empty());
}

// =============================================================================
// ASSOCIATIVE
// =============================================================================

#[test]
fn test_association_class_refers_to_both_sides() {
    let input = single(
        SubsystemDecl::new("Flights")
            .with_class(ClassDecl::new("Pilot").with_attribute(id("ID", "Pilot ID")))
            .with_class(
                ClassDecl::new("Aircraft").with_attribute(id("Tail Number", "Tail Number")),
            )
            .with_class(
                ClassDecl::new("Assignment")
                    .with_attribute(r2("Pilot").identifier(IdGroup::I))
                    .with_attribute(r2("Aircraft").identifier(IdGroup::I)),
            )
            .with_relationship(
                RelationshipDecl::association(
                    "R2",
                    many("Pilot", "flies"),
                    many("Aircraft", "is flown by"),
                )
                .with_association_class("Assignment"),
            ),
    );
    let model = resolve(&input);

    let pilot = reference(&model, "Pilot", "R2");
    assert_eq!(pilot.reference_kind, ReferenceKind::Associative);
    assert_eq!(pilot.relationship_kind, RelationshipKind::Binary);
    assert_eq!(pairs(plain(&model, "Pilot", "R2")), vec![("Pilot", "ID")]);
    assert_eq!(plain(&model, "Pilot", "R2").side, Side::P);

    assert_eq!(pairs(plain(&model, "Aircraft", "R2")), vec![("Aircraft", "Tail Number")]);
    assert_eq!(plain(&model, "Aircraft", "R2").side, Side::T);
}

/// Reflexive `R9` on `Person`: one variant per traversal phrase.
#[test]
fn test_reflexive_association_variants() {
    let model = resolve(&reporting());
    let reference = reference(&model, "Person", "R9");
    assert_eq!(reference.reference_kind, ReferenceKind::Associative);
    assert_eq!(reference.relationship_kind, RelationshipKind::BinaryReflexive);
    assert!(reference.plain().is_none());
    assert_eq!(
        reference.variant_keys(),
        vec![
            &VariantKey::Phrase("manager".into()),
            &VariantKey::Phrase("report".into())
        ]
    );

    let manager = reference.variant(&VariantKey::Phrase("manager".into())).unwrap();
    assert_eq!(pairs(manager), vec![("Manager", "ID")]);
    let report = reference.variant(&VariantKey::Phrase("report".into())).unwrap();
    assert_eq!(pairs(report), vec![("Report", "ID")]);
}

// =============================================================================
// GENERALIZATION
// =============================================================================

#[test]
fn test_generalization_variants_per_subclass() {
    let model = resolve(&air_traffic_control());
    let reference = reference(&model, "Air Traffic Controller", "R1");
    assert_eq!(reference.reference_kind, ReferenceKind::Superclass);
    assert_eq!(reference.relationship_kind, RelationshipKind::Generalization);

    assert_eq!(
        reference.variant_keys(),
        vec![
            &VariantKey::Subclass("Off Duty Controller".into()),
            &VariantKey::Subclass("On Duty Controller".into())
        ]
    );
    for data in reference.all_data() {
        assert_eq!(data.side, Side::Superclass);
        assert_eq!(pairs(data), vec![("ID", "ID")]);
    }

    assert_eq!(pairs(plain(&model, "Duty Station", "R3")), vec![("Station", "Number")]);
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_tie_is_fatal() {
    let part = ClassDecl::new("Part")
        .with_attribute(id("Serial", "Serial"))
        .with_attribute(AttributeDecl::new("Code").typed("Code").identifier(IdGroup::I2));
    let input = single(
        SubsystemDecl::new("Shop")
            .with_class(part)
            .with_class(
                ClassDecl::new("Slot")
                    .with_attribute(id("Number", "Slot Number"))
                    .with_attribute(AttributeDecl::new("Part_Ref").referential("R4")),
            )
            .with_relationship(RelationshipDecl::association(
                "R4",
                one("Slot", "holds"),
                one("Part", "sits in"),
            )),
    );
    assert!(matches!(
        resolve_err(&input),
        AnalysisError::RefAttrNotFound {
            reason: RefAttrFailure::MultipleSources,
            ..
        }
    ));
}

#[rstest]
#[case::too_many_attributes(
    vec![r1("First"), r1("Second")],
    RefAttrFailure::NoSolution
)]
#[case::forced_rename(
    vec![r1("Buyer").rename("R1", "Code")],
    RefAttrFailure::AmbiguousRename
)]
fn test_no_assignment(#[case] referring: Vec<AttributeDecl>, #[case] expected: RefAttrFailure) {
    let input = orders_with(
        ClassDecl::new("Customer").with_attribute(id("Number", "Customer Number")),
        referring,
    );
    match resolve_err(&input) {
        AnalysisError::RefAttrNotFound {
            rnum, class, reason, ..
        } => {
            assert_eq!(rnum.as_str(), "R1");
            assert_eq!(class, "Order");
            assert_eq!(reason, expected);
        }
        other => panic!("expected RefAttrNotFound, got {other:?}"),
    }
}

#[test]
fn test_unknown_relationship() {
    let input = orders_with(
        ClassDecl::new("Customer").with_attribute(id("ID", "Customer ID")),
        vec![AttributeDecl::new("Customer_ID").referential("R77")],
    );
    assert!(matches!(
        resolve_err(&input),
        AnalysisError::UnknownReferentialAttribute { rnum, .. } if rnum.as_str() == "R77"
    ));
}

#[test]
fn test_class_not_on_relationship() {
    let mut input = orders();
    input.subsystems[0].classes.push(
        ClassDecl::new("Invoice")
            .with_attribute(id("Number", "Invoice Number"))
            .with_attribute(r1("Customer_ID")),
    );
    assert!(matches!(
        resolve_err(&input),
        AnalysisError::InvalidReferentialAttribute { class, .. } if class == "Invoice"
    ));
}

#[test]
fn test_redundant_rename() {
    let input = orders_with(
        ClassDecl::new("Customer").with_attribute(id("ID", "Customer ID")),
        vec![r1("Buyer").rename("R1", "ID").rename("R1", "Key")],
    );
    assert!(matches!(
        resolve_err(&input),
        AnalysisError::RedundantRename { attribute, .. } if attribute == "Buyer"
    ));
}

#[test]
fn test_rename_collision() {
    let input = orders_with(
        ClassDecl::new("Customer").with_attribute(id("ID", "Customer ID")),
        vec![r1("Buyer").rename("R1", "Ref"), r1("REF")],
    );
    assert!(matches!(
        resolve_err(&input),
        AnalysisError::BadNaming { name, .. } if name == "ref"
    ));
}
