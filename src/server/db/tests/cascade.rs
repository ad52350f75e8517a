use crate::server::db::Database;
use crate::server::scope::Scope;
use crate::types::org::Role;
use crate::types::resource::{Owner, ResourceKind, ScopedResource};

use super::{mock_department, mock_team};

/// Runs last, it tears down the hierarchy built by the previous tests.
pub fn run_cascade_tests(db: &Database) {
    test_descendant_members(db);
    test_delete_team(db);
    test_delete_department(db);
    test_delete_organization(db);
}

fn scope_team(id: &str) -> Scope {
    Scope::Team(id.to_string())
}

fn test_descendant_members(db: &Database) {
    db.with_transaction(|tx| {
        tx.add_member(&scope_team("t-d1"), "bob", Role::Member)?;
        tx.add_member(&scope_team("t-org"), "bob", Role::Member)?;

        tx.delete_department_descendant_members("d1", "bob")?;
        assert_eq!(tx.get_member_role(&scope_team("t-d1"), "bob")?, None);
        assert_eq!(
            tx.get_member_role(&scope_team("t-org"), "bob")?,
            Some(Role::Member)
        );
        let d1 = Scope::Department(String::from("d1"));
        assert_eq!(tx.get_member_role(&d1, "bob")?, Some(Role::Admin));
        // Other users in the department's teams are untouched
        assert_eq!(
            tx.get_member_role(&scope_team("t-d1"), "carol")?,
            Some(Role::Member)
        );

        tx.delete_organization_descendant_members("o1", "bob")?;
        assert_eq!(tx.get_member_role(&d1, "bob")?, None);
        assert_eq!(tx.get_member_role(&scope_team("t-org"), "bob")?, None);
        let o1 = Scope::Organization(String::from("o1"));
        assert_eq!(tx.get_member_role(&o1, "bob")?, Some(Role::Member));
        // Personal teams are outside every organization
        assert_eq!(
            tx.get_member_role(&scope_team("t-personal"), "bob")?,
            Some(Role::Admin)
        );
        Ok(())
    })
    .unwrap();
}

fn test_delete_team(db: &Database) {
    db.with_transaction(|tx| {
        tx.delete_team("t-d2")?;
        assert!(tx.get_team("t-d2")?.is_none());
        assert!(tx.get_resource(ResourceKind::Project, "p-team")?.is_none());
        assert!(tx.get_department("d2")?.is_some());
        Ok(())
    })
    .unwrap();
}

fn test_delete_department(db: &Database) {
    db.with_transaction(|tx| {
        tx.delete_department("d1")?;
        assert!(tx.get_department("d1")?.is_none());
        assert!(tx.get_team("t-d1")?.is_none());
        assert_eq!(tx.get_member_role(&scope_team("t-d1"), "carol")?, None);
        assert!(tx.get_resource(ResourceKind::Battle, "b-dept")?.is_none());

        assert!(tx.get_department("d2")?.is_some());
        assert!(tx.get_team("t-org")?.is_some());
        assert!(tx.get_resource(ResourceKind::Retro, "r-org")?.is_some());
        Ok(())
    })
    .unwrap();
}

fn test_delete_organization(db: &Database) {
    db.with_transaction(|tx| {
        tx.create_department(&mock_department("d3", "o2"))?;
        tx.create_team(&mock_team("t-d3", Some("o2"), Some("d3")))?;
        tx.add_member(&Scope::Organization(String::from("o2")), "carol", Role::Admin)?;

        tx.create_team(&mock_team("t-d2b", Some("o1"), Some("d2")))?;
        tx.add_member(&scope_team("t-d2b"), "carol", Role::Admin)?;
        tx.add_member(&Scope::Department(String::from("d2")), "carol", Role::Member)?;
        tx.create_resource(&ScopedResource {
            id: String::from("s-d2b"),
            kind: ResourceKind::Storyboard,
            name: String::from("Board"),
            owner: Owner::Team(String::from("t-d2b")),
            create_time: 80,
            update_time: 80,
        })?;
        Ok(())
    })
    .unwrap();

    db.with_transaction(|tx| {
        tx.delete_organization("o1")?;

        assert!(tx.get_organization("o1")?.is_none());
        assert!(tx.get_department("d2")?.is_none());
        assert!(tx.get_team("t-org")?.is_none());
        assert!(tx.get_team("t-d2b")?.is_none());
        assert!(tx.get_resource(ResourceKind::Retro, "r-org")?.is_none());
        assert!(tx.get_resource(ResourceKind::Storyboard, "s-d2b")?.is_none());
        let o1 = Scope::Organization(String::from("o1"));
        assert!(tx.list_members(&o1)?.is_empty());
        assert!(tx
            .list_members(&Scope::Department(String::from("d2")))?
            .is_empty());
        assert!(tx.list_members(&scope_team("t-d2b"))?.is_empty());

        // Other organizations and personal resources are untouched
        assert!(tx.get_organization("o2")?.is_some());
        assert!(tx.get_department("d3")?.is_some());
        assert!(tx.get_team("t-d3")?.is_some());
        assert_eq!(
            tx.get_member_role(&Scope::Organization(String::from("o2")), "carol")?,
            Some(Role::Admin)
        );
        assert!(tx.get_team("t-personal")?.is_some());
        assert!(tx
            .get_resource(ResourceKind::Storyboard, "s-user")?
            .is_some());
        Ok(())
    })
    .unwrap();
}
