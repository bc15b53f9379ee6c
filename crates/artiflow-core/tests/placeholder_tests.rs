use artiflow_core::model::ArtifactType;
use artiflow_core::{Artifact, ArtifactPool, Channel, InputResolver, LineageError, PlaceholderValue, PropertyType,
                    PropertyValue};
use std::sync::Arc;

fn value_type() -> Arc<ArtifactType> {
    ArtifactType::new("String").with_property("value", PropertyType::String)
                               .into_shared()
}

fn value_artifact(v: &str) -> Artifact {
    Artifact::new(value_type()).with_property("value", v).unwrap()
}

#[test]
fn futures_of_different_outputs_are_not_equal() {
    let out1 = Channel::output(value_type(), "x1", "output1");
    let out2 = Channel::output(value_type(), "x1", "output2");

    assert!(out1.future().internal_equals(&out1.future()));
    assert!(!out1.future().internal_equals(&out2.future()));
    assert!(out1.future().index(0).value().internal_equals(&out1.future().index(0).value()));
    assert!(!out1.future().index(0).value().internal_equals(&out2.future().index(0).value()));
}

#[test]
fn identical_predicates_compare_equal() {
    let out1 = Channel::output(value_type(), "x1", "output1");
    let future1 = out1.future().index(0);
    let pred = future1.value().ne_to("0");
    let same = out1.future().index(0).value().ne_to("0");
    assert!(pred.internal_equals(&same));
    assert_eq!(pred.to_string(), r#"(future(x1.output1)[0].value != "0")"#);
}

#[test]
fn futures_keep_the_channel_identity_at_creation() {
    let out = Channel::output(value_type(), "x1", "output1");
    let future = out.future();
    let mut optional = out.as_optional();
    optional.set_as_async_channel().unwrap();
    assert!(!future.internal_equals(&optional.future()));
    assert_eq!(future.get_data_dependent_node_ids().unwrap().len(), 1);
}

#[test]
fn predicates_evaluate_against_resolved_inputs() {
    let mut pool = ArtifactPool::new();
    pool.publish("x1", "output1", value_artifact("1"));
    pool.publish("x1", "output1", value_artifact("0"));
    let resolver = InputResolver::new(&pool);

    let out = Channel::output(value_type(), "x1", "output1");
    let first = out.future().index(0).value();
    assert_eq!(first.evaluate(&resolver).unwrap(), PlaceholderValue::Value(PropertyValue::from("1")));

    assert!(first.ne_to("0").evaluate_predicate(&resolver).unwrap());
    let second_is_zero = out.future().index(1).value().eq_to("0");
    assert!((first.ne_to("0") & second_is_zero.clone()).evaluate_predicate(&resolver).unwrap());
    assert!(!(!second_is_zero).evaluate_predicate(&resolver).unwrap());

    let out_of_range = out.future().index(5).value();
    assert!(matches!(out_of_range.evaluate(&resolver), Err(LineageError::Usage(_))));
}

#[test]
fn missing_fields_are_only_unequal() {
    let mut pool = ArtifactPool::new();
    pool.publish("x1", "output1", Artifact::new(value_type()));
    let resolver = InputResolver::new(&pool);

    let value = Channel::output(value_type(), "x1", "output1").future().index(0).value();
    assert_eq!(value.evaluate(&resolver).unwrap(), PlaceholderValue::Null);
    assert!(value.ne_to("0").evaluate_predicate(&resolver).unwrap());
    assert!(!value.eq_to("0").evaluate_predicate(&resolver).unwrap());
    assert!(!value.lt("0").evaluate_predicate(&resolver).unwrap());
}

#[test]
fn non_boolean_expressions_are_not_predicates() {
    let ch = Channel::with_artifacts(value_type(), vec![value_artifact("a")]).unwrap();
    let pool = ArtifactPool::new();
    let resolver = InputResolver::new(&pool);
    let err = ch.future().value().evaluate_predicate(&resolver).unwrap_err();
    assert!(matches!(err, LineageError::Usage(_)));
    assert!(ch.future().uri().eq_to("").evaluate_predicate(&resolver).unwrap());
}
