use quickshop_core::db::open_db_in_memory;
use quickshop_core::{
    Editor, JoinOutcome, LeaveOutcome, ListAdminService, ListDoc, MembershipError,
    MembershipService, MembershipStore, SqliteMembershipStore,
};
use rusqlite::Connection;

fn seed_list(conn: &mut Connection) -> ListDoc {
    let store = SqliteMembershipStore::try_new(conn).unwrap();
    let mut admin = ListAdminService::new(store);
    admin
        .create_list("L1", "Groceries", Editor::new("u1", "a@x.com", "Ana"))
        .unwrap()
}

fn load_list(conn: &mut Connection, list_id: &str) -> ListDoc {
    let store = SqliteMembershipStore::try_new(conn).unwrap();
    store.get_list(list_id).unwrap().expect("list should exist")
}

#[test]
fn joining_then_rejoining_yields_joined_then_already_member() {
    let mut conn = open_db_in_memory().unwrap();
    seed_list(&mut conn);
    let bea = Editor::new("u2", "b@x.com", "Bea");

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut service = MembershipService::new(store);

        assert_eq!(service.join_list("L1", &bea).unwrap(), JoinOutcome::Joined);
        assert_eq!(
            service.join_list("L1", &bea).unwrap(),
            JoinOutcome::AlreadyMember
        );
    }

    let list = load_list(&mut conn, "L1");
    assert_eq!(list.editor_ids, vec!["u1", "u2"]);
    assert_eq!(list.editors.len(), 2);
    assert_eq!(list.editors[1].email, "b@x.com");
    assert_eq!(list.editors[1].name, "Bea");
    assert!(list.validate().is_ok());
}

#[test]
fn joining_missing_list_fails_without_writing() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut service = MembershipService::new(store);

        let err = service
            .join_list("ghost", &Editor::new("u2", "b@x.com", "Bea"))
            .unwrap_err();
        assert!(matches!(err, MembershipError::ListNotFound(id) if id == "ghost"));
    }

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM lists;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn editors_stay_aligned_over_join_and_leave_sequences() {
    let mut conn = open_db_in_memory().unwrap();
    seed_list(&mut conn);

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut service = MembershipService::new(store);
        for (id, email, name) in [
            ("u2", "b@x.com", "Bea"),
            ("u3", "c@x.com", "Cas"),
            ("u4", "d@x.com", "Dee"),
        ] {
            assert_eq!(
                service
                    .join_list("L1", &Editor::new(id, email, name))
                    .unwrap(),
                JoinOutcome::Joined
            );
        }
        assert_eq!(
            service.leave_list("L1", "u3").unwrap(),
            LeaveOutcome::Left
        );
    }

    let list = load_list(&mut conn, "L1");
    assert_eq!(list.editor_ids, vec!["u1", "u2", "u4"]);
    assert_eq!(list.editor_ids.len(), list.editors.len());
    for (index, id) in list.editor_ids.iter().enumerate() {
        assert_eq!(&list.editors[index].id, id);
    }
}

#[test]
fn join_bumps_document_version_and_already_member_does_not() {
    let mut conn = open_db_in_memory().unwrap();
    seed_list(&mut conn);
    let bea = Editor::new("u2", "b@x.com", "Bea");

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut service = MembershipService::new(store);
        service.join_list("L1", &bea).unwrap();
    }
    let after_join = load_list(&mut conn, "L1").version;

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut service = MembershipService::new(store);
        service.join_list("L1", &bea).unwrap();
    }
    let after_noop = load_list(&mut conn, "L1").version;

    assert_eq!(after_join, 1);
    assert_eq!(after_noop, after_join);
}
