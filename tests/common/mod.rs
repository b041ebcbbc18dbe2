#![allow(dead_code)]

use resquery::prelude::*;
use resquery::url::UrlVars;

fn reference(table: &str) -> FieldType {
    FieldType::Reference(table.into())
}

/// Organisations with offices, projects with tasks, persons with contacts
/// and staff records, and requests with skill lists.
pub fn schema() -> Schema {
    Schema::builder()
        .table(
            TableDef::new("org_organisation")
                .field("name", FieldType::String)
                .field("acronym", FieldType::String)
                .super_link("pe_id", "pr_pentity"),
        )
        .table(TableDef::new("org_office_type").field("name", FieldType::String))
        .table(
            TableDef::new("org_office")
                .field("name", FieldType::String)
                .field("organisation_id", reference("org_organisation"))
                .field("office_type_id", reference("org_office_type"))
                .field("location_id", reference("gis_location"))
                .context("organisation", "organisation_id"),
        )
        .table(
            TableDef::new("gis_location")
                .field("name", FieldType::String)
                .field("lat", FieldType::Double)
                .field("lon", FieldType::Double),
        )
        .table(
            TableDef::new("project_project")
                .field("name", FieldType::String)
                .field("code", FieldType::String)
                .field("organisation_id", reference("org_organisation"))
                .context("organisation", "organisation_id"),
        )
        .table(
            TableDef::new("project_task")
                .field("name", FieldType::String)
                .field("description", FieldType::Text)
                .field("status", FieldType::Integer),
        )
        .table(
            TableDef::new("project_task_project")
                .field("task_id", reference("project_task"))
                .field("project_id", reference("project_project")),
        )
        .table(
            TableDef::new("project_activity")
                .field("name", FieldType::String)
                .field("project_id", reference("project_project")),
        )
        .table(TableDef::new("pr_pentity").field("instance_type", FieldType::String))
        .table(
            TableDef::new("pr_person")
                .field("first_name", FieldType::String)
                .field("middle_name", FieldType::String)
                .field("last_name", FieldType::String)
                .field("age", FieldType::Virtual)
                .super_link("pe_id", "pr_pentity")
                .context("organisation", "human_resource.organisation_id"),
        )
        .table(
            TableDef::new("pr_contact")
                .field("pe_id", FieldType::Integer)
                .field("contact_method", FieldType::String)
                .field("value", FieldType::String),
        )
        .table(
            TableDef::new("pr_identity")
                .field("person_id", reference("pr_person"))
                .field("value", FieldType::String),
        )
        .table(
            TableDef::new("hrm_human_resource")
                .field("person_id", reference("pr_person"))
                .field("organisation_id", reference("org_organisation"))
                .field("type", FieldType::Integer)
                .context("organisation", "organisation_id"),
        )
        .table(TableDef::new("hrm_skill").field("name", FieldType::String))
        .table(
            TableDef::new("req_req")
                .field("name", FieldType::String)
                .field("priority", FieldType::Integer),
        )
        .table(
            TableDef::new("req_req_skill")
                .field("req_id", reference("req_req"))
                .field("skill_id", FieldType::ListReference("hrm_skill".into())),
        )
        .component(ComponentDef::plain("org_organisation", "org_office", "organisation_id"))
        .component(
            ComponentDef::plain("org_organisation", "org_office", "organisation_id")
                .with_alias("test")
                .filter_by("office_type_id", [5]),
        )
        .component(ComponentDef::link(
            "project_project",
            "project_task",
            "project_task_project",
            "project_id",
            "task_id",
        ))
        .component(ComponentDef::plain("project_project", "project_activity", "project_id"))
        .component(ComponentDef::super_entity("pr_person", "pr_contact", "pe_id"))
        .component(
            ComponentDef::super_entity("pr_person", "pr_contact", "pe_id")
                .with_alias("email")
                .filter_by("contact_method", ["EMAIL"]),
        )
        .component(ComponentDef::plain("pr_person", "hrm_human_resource", "person_id"))
        .component(ComponentDef::plain("pr_person", "pr_identity", "person_id"))
        .component(ComponentDef::plain("req_req", "req_req_skill", "req_id"))
        .build()
        .expect("fixture schema is valid")
}

/// Query vars from `(key, value)` pairs, repeated keys kept.
pub fn vars(pairs: &[(&str, &str)]) -> UrlVars {
    pairs
        .iter()
        .map(|(k, v)| (*k, (*v).to_owned()))
        .collect()
}

/// `table.deleted <> 'T' AND table.id > 0`
pub fn active(table: &str) -> Predicate {
    Predicate::not_deleted(&TableRef::new(table)) & Predicate::gt(col(table, "id"), 0)
}
