mod cascade;

use anyhow::{bail, Result};

use crate::server::scope::Scope;
use crate::types::org::{Department, Organization, Role, Team};
use crate::types::user::GlobalRank;

use super::{Database, UserRecord};

/// Runs every database test against `db`, which must be empty.
pub fn run_all_tests(db: &Database) {
    user::run_user_tests(db);
    apikey::run_api_key_tests(db);
    organization::run_organization_tests(db);
    scope::run_scope_tests(db);
    cascade::run_cascade_tests(db);

    test_rollback(db);
}

#[test]
fn test_memory() {
    let db = Database::new_test();
    run_all_tests(&db);
}

fn test_rollback(db: &Database) {
    let result: Result<()> = db.with_transaction(|tx| {
        tx.create_organization(&mock_organization("rollback-org"))?;
        tx.add_member(
            &Scope::Organization(String::from("rollback-org")),
            "alice",
            Role::Admin,
        )?;

        bail!("rollback");
    });
    assert!(result.is_err());

    db.with_transaction(|tx| {
        assert!(tx.get_organization("rollback-org")?.is_none());
        let role =
            tx.get_member_role(&Scope::Organization(String::from("rollback-org")), "alice")?;
        assert!(role.is_none());
        Ok(())
    })
    .unwrap();
}

pub fn mock_user(id: &str, rank: GlobalRank) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: id.to_string(),
        rank,
        hash: String::from("hash"),
        salt: String::from("salt"),
        create_time: 10,
        update_time: 10,
        last_active: 10,
    }
}

pub fn mock_organization(id: &str) -> Organization {
    Organization {
        id: id.to_string(),
        name: format!("org {id}"),
        create_time: 20,
        update_time: 20,
    }
}

pub fn mock_department(id: &str, org_id: &str) -> Department {
    Department {
        id: id.to_string(),
        organization_id: org_id.to_string(),
        name: format!("dept {id}"),
        create_time: 30,
        update_time: 30,
    }
}

pub fn mock_team(id: &str, org_id: Option<&str>, dept_id: Option<&str>) -> Team {
    Team {
        id: id.to_string(),
        name: format!("team {id}"),
        organization_id: org_id.map(String::from),
        department_id: dept_id.map(String::from),
        create_time: 40,
        update_time: 40,
    }
}
