//! Navigation hints: pinning referential attributes to one relationship end.

use crate::helpers::model_assertions::*;
use crate::helpers::model_fixtures::*;
use mana::{IdGroup, Side};
use mana::hir::{AnalysisError, NavigationFailure};
use mana::syntax::{
    AttributeDecl, ClassDecl, ModelInput, NavigationHint, RelationshipDecl, SubsystemDecl,
};
use rstest::rstest;

fn staff(reporting: ClassDecl, r9: RelationshipDecl) -> ModelInput {
    single(
        SubsystemDecl::new("Staff")
            .with_class(ClassDecl::new("Person").with_attribute(id("ID", "Person ID")))
            .with_class(reporting)
            .with_relationship(r9),
    )
}

fn r9() -> RelationshipDecl {
    RelationshipDecl::association("R9", many("Person", "manager"), many("Person", "report"))
        .with_association_class("Reporting")
}

#[test]
fn test_phrase_hints_pick_sides() {
    let model = resolve(&reporting());
    let reporting = model.class("Reporting").unwrap();

    let manager = &reporting.attribute("Manager").unwrap().navigations;
    assert_eq!(manager.len(), 1);
    assert_eq!(manager[0].side, Side::P);
    assert_eq!(manager[0].class, "Person");
    assert_eq!(manager[0].phrase.as_deref(), Some("manager"));

    let report = &reporting.attribute("Report").unwrap().navigations;
    assert_eq!(report[0].side, Side::T);
}

#[test]
fn test_class_hint_on_binary_association() {
    let input = single(
        SubsystemDecl::new("Sales")
            .with_class(
                ClassDecl::new("Order")
                    .with_attribute(id("Number", "Order Number"))
                    .with_attribute(
                        AttributeDecl::new("Customer_ID")
                            .navigation(NavigationHint::new().class("Customer").rename("ID")),
                    ),
            )
            .with_class(ClassDecl::new("Customer").with_attribute(id("ID", "Customer ID")))
            .with_relationship(RelationshipDecl::association(
                "R1",
                many("Order", "is placed by"),
                one("Customer", "places"),
            )),
    );
    let model = resolve(&input);
    let nav = &model.class("Order").unwrap().attribute("Customer_ID").unwrap().navigations[0];
    assert_eq!(nav.rnum.as_str(), "R1");
    assert_eq!(nav.side, Side::T);
    assert_eq!(nav.rename.as_deref(), Some("ID"));
    assert_eq!(pairs(plain(&model, "Customer", "R1")), vec![("Customer_ID", "ID")]);
}

#[rstest]
#[case::both_ends(NavigationHint::new().rnum("R9"), NavigationFailure::MultipleSolutions(2))]
#[case::unknown_phrase(NavigationHint::new().rnum("R9").phrase("mentor"), NavigationFailure::NoSolution)]
#[case::unknown_rnum(NavigationHint::new().rnum("R42"), NavigationFailure::NoSolution)]
#[case::wrong_class(NavigationHint::new().class("Reporting"), NavigationFailure::NoSolution)]
fn test_unresolvable_hint(#[case] hint: NavigationHint, #[case] expected: NavigationFailure) {
    let reporting = ClassDecl::new("Reporting").with_attribute(
        AttributeDecl::new("Manager")
            .identifier(IdGroup::I)
            .navigation(hint),
    );
    match resolve_err(&staff(reporting, r9())) {
        AnalysisError::BadNavigation {
            class,
            attribute,
            failure,
            ..
        } => {
            assert_eq!(class, "Reporting");
            assert_eq!(attribute, "Manager");
            assert_eq!(failure, expected);
        }
        other => panic!("expected BadNavigation, got {other:?}"),
    }
}

#[test]
fn test_same_side_navigated_twice() {
    let hint = || NavigationHint::new().rnum("R9").phrase("manager");
    let reporting = ClassDecl::new("Reporting").with_attribute(
        AttributeDecl::new("Manager")
            .identifier(IdGroup::I)
            .navigation(hint())
            .navigation(hint()),
    );
    assert!(matches!(
        resolve_err(&staff(reporting, r9())),
        AnalysisError::DuplicateNavigation { attribute, .. } if attribute == "Manager"
    ));
}

/// Without an association class a reflexive association only refers to its T side.
#[test]
fn test_navigation_to_passive_side_of_reflexive() {
    let input = single(
        SubsystemDecl::new("Staff")
            .with_class(
                ClassDecl::new("Person")
                    .with_attribute(id("ID", "Person ID"))
                    .with_attribute(
                        AttributeDecl::new("Boss")
                            .referential("R8")
                            .navigation(NavigationHint::new().rnum("R8").phrase("manages")),
                    ),
            )
            .with_relationship(RelationshipDecl::association(
                "R8",
                many("Person", "manages").conditional(),
                one("Person", "reports to").conditional(),
            )),
    );
    assert!(matches!(
        resolve_err(&input),
        AnalysisError::InvalidNavigation { attribute, .. } if attribute == "Boss"
    ));
}
