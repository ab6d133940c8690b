use quickshop_core::db::open_db_in_memory;
use quickshop_core::{
    Editor, JoinOutcome, LeaveOutcome, ListAdminService, MembershipError, MembershipService,
    MembershipStore, SqliteMembershipStore,
};
use rusqlite::Connection;

fn seed_two_editor_list(conn: &mut Connection) {
    {
        let store = SqliteMembershipStore::try_new(conn).unwrap();
        let mut admin = ListAdminService::new(store);
        admin
            .create_list("L1", "Groceries", Editor::new("u1", "a@x.com", "Ana"))
            .unwrap();
    }
    let store = SqliteMembershipStore::try_new(conn).unwrap();
    let mut service = MembershipService::new(store);
    assert_eq!(
        service
            .join_list("L1", &Editor::new("u2", "b@x.com", "Bea"))
            .unwrap(),
        JoinOutcome::Joined
    );
}

#[test]
fn leaving_removes_editor_and_their_invites_atomically() {
    let mut conn = open_db_in_memory().unwrap();
    seed_two_editor_list(&mut conn);

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut service = MembershipService::new(store);
        service.create_invite("L1", "u1").unwrap();
        service.create_invite("L1", "u2").unwrap();

        assert_eq!(service.leave_list("L1", "u2").unwrap(), LeaveOutcome::Left);
    }

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    let list = store.get_list("L1").unwrap().unwrap();
    assert_eq!(list.editor_ids, vec!["u1"]);
    assert_eq!(list.editors.len(), 1);

    // Only the leaver's invites are deleted.
    let invites = store.invites_for_list("L1").unwrap();
    assert_eq!(invites.len(), 1);
    assert_eq!(invites[0].inviter_id, "u1");
}

#[test]
fn leaving_when_not_a_member_is_a_defined_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    seed_two_editor_list(&mut conn);

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut service = MembershipService::new(store);
        assert_eq!(
            service.leave_list("L1", "outsider").unwrap(),
            LeaveOutcome::NotMember
        );
    }

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    let list = store.get_list("L1").unwrap().unwrap();
    assert_eq!(list.editor_ids, vec!["u1", "u2"]);
    // No-op leaves the version untouched.
    assert_eq!(list.version, 1);
}

#[test]
fn leaving_missing_list_reports_list_not_found() {
    let mut conn = open_db_in_memory().unwrap();

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    let mut service = MembershipService::new(store);
    let err = service.leave_list("ghost", "u1").unwrap_err();
    assert!(matches!(err, MembershipError::ListNotFound(id) if id == "ghost"));
}

#[test]
fn rejoining_after_leaving_is_a_fresh_join() {
    let mut conn = open_db_in_memory().unwrap();
    seed_two_editor_list(&mut conn);

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    let mut service = MembershipService::new(store);
    assert_eq!(service.leave_list("L1", "u2").unwrap(), LeaveOutcome::Left);
    assert_eq!(
        service
            .join_list("L1", &Editor::new("u2", "b@x.com", "Bea"))
            .unwrap(),
        JoinOutcome::Joined
    );
}
