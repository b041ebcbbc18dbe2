use resquery::prelude::*;
use resquery::url::parse_value;

mod common;

#[test]
fn parse_encoded_request_url() {
    let url = "/project/project?project.organisation_id%24name__like=Red+Cross*\
               &task.status=1,2&format=json&~.code=%22P,1%22";
    let vars = parse_url(url);
    assert_eq!(
        vars.keys().collect::<Vec<_>>(),
        vec!["project.organisation_id$name__like", "task.status", "format", "~.code"]
    );
    assert_eq!(vars.get("~.code"), Some(&["\"P,1\"".to_owned()][..]));

    let filter = parse_url_query(&vars).unwrap();
    let expected = (field("project.organisation_id$name").lower().like("Red Cross%")
        & (field("task.status").eq("1") | field("task.status").eq("2")))
        & field("~.code").eq("P,1");
    assert_eq!(filter, expected);
}

#[test]
fn query_vars_render_back() {
    let query = "~.name__like=Red%20Cross*&task.status__belongs=1,2";
    let vars = parse_url(query);
    assert_eq!(vars.get("~.name__like"), Some(&["Red Cross*".to_owned()][..]));
    assert_eq!(to_query_string(&vars), query);

    let filter = parse_url_query(&vars).unwrap();
    assert_eq!(serialize_url_query(&filter), vars);
}

#[test]
fn serialize_quotes_special_values() {
    let filter =
        field("~.name").eq("a,b") | field("~.name").eq(Value::Null) | field("~.name").eq("NONE");
    let vars = serialize_url_query(&filter);
    assert_eq!(
        vars.get("~.name"),
        Some(&["\"a,b\",NONE,\"NONE\"".to_owned()][..])
    );
    assert_eq!(
        parse_value(&vars.get("~.name").unwrap()[0]).unwrap(),
        vec![Value::from("a,b"), Value::Null, Value::from("NONE")]
    );
}

#[test]
fn resource_round_trip() {
    let schema = common::schema();
    let query = parse_url(
        "?~.name__like=Alpha*\
         &project.organisation_id$name|task.name=Red%20Cross\
         &activity.name__ne!=x\
         &task.status__ge=3",
    );
    let projects = Resource::new(&schema, "project_project")
        .unwrap()
        .with_url_vars(&query);
    assert_eq!(projects.rfilter().filters().count(), 4);
    assert_eq!(projects.serialize_url(), query);

    let rebuilt = Resource::new(&schema, "project_project")
        .unwrap()
        .with_url_vars(&projects.serialize_url());
    assert_eq!(rebuilt.get_query().unwrap(), projects.get_query().unwrap());
}

#[test]
fn malformed_values_are_skipped() {
    let schema = common::schema();
    let query = parse_url("?~.name=\"open&~.code=P-1&~.name__near=3");
    let projects = Resource::new(&schema, "project_project")
        .unwrap()
        .with_url_vars(&query);
    assert_eq!(
        projects.get_query().unwrap(),
        common::active("project_project") & Predicate::eq(col("project_project", "code"), "P-1")
    );
}

#[test]
fn selector_ending_in_bang_keeps_its_separator() {
    let vars = common::vars(&[("project.code!__eq", "1")]);
    let filter = parse_url_query(&vars).unwrap();
    assert_eq!(filter, field("project.code!").eq("1"));

    let serialized = serialize_url_query(&filter);
    assert_eq!(serialized, vars);
    assert_eq!(parse_url_query(&serialized).unwrap(), filter);

    let negated = !field("project.code!").eq("1");
    assert_eq!(
        serialize_url_query(&negated).keys().collect::<Vec<_>>(),
        vec!["project.code!__eq!"]
    );
}

#[test]
fn repeated_selectors_share_one_value_list() {
    let vars = common::vars(&[("project.code|project.code__belongs", "1,2")]);
    let filter = parse_url_query(&vars).unwrap();
    let list = || Value::List(vec!["1".into(), "2".into()]);
    assert_eq!(
        filter,
        field("project.code").belongs(list()) | field("project.code").belongs(list())
    );

    let serialized = serialize_url_query(&filter);
    assert_eq!(serialized, vars);
    assert_eq!(parse_url_query(&serialized).unwrap(), filter);
}
