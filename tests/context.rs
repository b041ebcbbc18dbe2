//! The global context slot is process-wide, so everything touching it lives
//! in this one test binary and runs as a single test.

use common::active;
use resquery::prelude::*;
use resquery::{clear_global_context, global_context, set_global_context};

mod common;

#[test]
fn global_context_is_snapshotted() {
    let schema = common::schema();
    let red_cross = Predicate::eq(col("org_organisation", "name"), "Red Cross");

    let before = Resource::new(&schema, "project_project").unwrap().with_context();
    assert_eq!(before.get_query().unwrap(), active("project_project"));

    {
        let _guard = ContextGuard::set(field("(organisation)$name").eq("Red Cross"));

        let projects = Resource::new(&schema, "project_project").unwrap().with_context();
        assert_eq!(
            projects.get_query().unwrap(),
            active("project_project") & red_cross.clone()
        );

        // Persons reach their organisation through staff records
        let persons = Resource::new(&schema, "pr_person").unwrap().with_context();
        let (_, left) = persons.rfilter().effective_joins().unwrap();
        let tables: Vec<&str> = left.iter().map(|j| j.table.name()).collect();
        assert_eq!(tables, vec!["hrm_human_resource", "org_organisation"]);
        assert!(persons.rfilter().distinct().unwrap());

        let tasks = Resource::new(&schema, "project_task").unwrap().with_context();
        assert_eq!(tasks.get_query().unwrap(), active("project_task"));

        // Resources opt in explicitly
        let plain = Resource::new(&schema, "project_project").unwrap();
        assert_eq!(plain.get_query().unwrap(), active("project_project"));

        // Replacing the context leaves existing resources alone
        set_global_context(Some(field("(organisation)$name").eq("Other")));
        assert_eq!(
            projects.get_query().unwrap(),
            active("project_project") & red_cross
        );
    }

    assert!(global_context().is_none());
    assert_eq!(before.get_query().unwrap(), active("project_project"));
    assert!(clear_global_context().is_none());
}
