use common::vars;
use resquery::prelude::*;
use std::collections::BTreeSet;

mod common;

fn set(values: &[&str]) -> BTreeSet<compact_str::CompactString> {
    values.iter().map(|v| (*v).into()).collect()
}

fn skill_axis(query: &[(&str, &str)]) -> AxisValues {
    let schema = common::schema();
    let resource = Resource::new(&schema, "req_req_skill")
        .unwrap()
        .with_url_vars(&vars(query));
    let rfield = resource.resolve("skill_id").unwrap();
    AxisFilter::for_resource(&resource).unwrap().values(&rfield)
}

#[test]
fn contains_and_exclusion() {
    assert_eq!(
        skill_axis(&[("~.skill_id__contains", "1,2,3"), ("~.skill_id__ne", "2")]),
        AxisValues::Only(set(&["1", "3"]))
    );
    assert_eq!(
        skill_axis(&[("~.skill_id__contains", "1,2,3"), ("~.skill_id!", "2")]),
        AxisValues::Only(set(&["1", "3"]))
    );
}

#[test]
fn conjoined_memberships_accumulate() {
    assert_eq!(
        skill_axis(&[("~.skill_id__contains", "1,2"), ("~.skill_id__contains", "3")]),
        AxisValues::Only(set(&["1", "2", "3"]))
    );
    assert_eq!(
        skill_axis(&[("~.skill_id__anyof", "1,2")]),
        AxisValues::Only(set(&["1", "2"]))
    );
}

#[test]
fn terms_on_other_fields() {
    assert!(skill_axis(&[("~.req_id", "4")]).is_unconstrained());
    assert!(skill_axis(&[]).is_unconstrained());

    // An alternative on another field leaves the axis open
    let values = skill_axis(&[("~.skill_id|~.req_id", "4")]);
    assert_eq!(values, AxisValues::Unconstrained);
}

#[test]
fn exclusions_only() {
    let values = skill_axis(&[("~.skill_id__ne", "2"), ("~.skill_id!", "5")]);
    assert_eq!(values, AxisValues::Except(set(&["2", "5"])));
    assert!(values.admits(&Value::Int(1)));
    assert!(!values.admits(&Value::Int(5)));
    assert_eq!(values.permitted(), None);
}

#[test]
fn component_axis() {
    let schema = common::schema();
    let requests = Resource::new(&schema, "req_req")
        .unwrap()
        .with_url_vars(&vars(&[("req_skill.skill_id__contains", "7,8")]));
    let rfield = requests.resolve("req_skill.skill_id").unwrap();

    let values = AxisFilter::for_resource(&requests).unwrap().values(&rfield);
    assert_eq!(values.permitted(), Some(&set(&["7", "8"])));
    assert!(values.admits(&Value::from("7")));
}
