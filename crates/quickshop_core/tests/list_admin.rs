use quickshop_core::db::open_db_in_memory;
use quickshop_core::{
    Editor, ListAdminError, ListAdminService, MembershipService, MembershipStore,
    SqliteMembershipStore,
};
use rusqlite::Connection;

fn seed_list_with_invite(conn: &mut Connection) -> String {
    {
        let store = SqliteMembershipStore::try_new(conn).unwrap();
        let mut admin = ListAdminService::new(store);
        admin
            .create_list("L1", "Groceries", Editor::new("u1", "a@x.com", "Ana"))
            .unwrap();
    }
    let store = SqliteMembershipStore::try_new(conn).unwrap();
    let mut service = MembershipService::new(store);
    service.create_invite("L1", "u1").unwrap().invite_id
}

#[test]
fn renaming_refreshes_invite_name_snapshots() {
    let mut conn = open_db_in_memory().unwrap();
    let invite_id = seed_list_with_invite(&mut conn);

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut admin = ListAdminService::new(store);
        admin.rename_list("L1", "Weekly shop").unwrap();
    }

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    let list = store.get_list("L1").unwrap().unwrap();
    assert_eq!(list.name, "Weekly shop");

    let invite = store.get_invite(&invite_id).unwrap().unwrap();
    assert_eq!(invite.list_name, "Weekly shop");
}

#[test]
fn renaming_to_current_name_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    seed_list_with_invite(&mut conn);

    let before = {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        store.get_list("L1").unwrap().unwrap().version
    };

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut admin = ListAdminService::new(store);
        admin.rename_list("L1", "Groceries").unwrap();
    }

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    assert_eq!(store.get_list("L1").unwrap().unwrap().version, before);
}

#[test]
fn renaming_rejects_blank_names_and_missing_lists() {
    let mut conn = open_db_in_memory().unwrap();
    seed_list_with_invite(&mut conn);

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    let mut admin = ListAdminService::new(store);

    let err = admin.rename_list("L1", "   ").unwrap_err();
    assert!(matches!(err, ListAdminError::BlankName));

    let err = admin.rename_list("ghost", "New name").unwrap_err();
    assert!(matches!(err, ListAdminError::ListNotFound(id) if id == "ghost"));
}

#[test]
fn deleting_a_list_removes_its_invites() {
    let mut conn = open_db_in_memory().unwrap();
    seed_list_with_invite(&mut conn);

    {
        let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
        let mut admin = ListAdminService::new(store);
        admin.delete_list("L1").unwrap();
    }

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    assert!(store.get_list("L1").unwrap().is_none());
    assert!(store.invites_for_list("L1").unwrap().is_empty());
}

#[test]
fn deleting_missing_list_reports_list_not_found() {
    let mut conn = open_db_in_memory().unwrap();

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    let mut admin = ListAdminService::new(store);
    let err = admin.delete_list("ghost").unwrap_err();
    assert!(matches!(err, ListAdminError::ListNotFound(id) if id == "ghost"));
}

#[test]
fn create_list_validates_name_and_owner_profile() {
    let mut conn = open_db_in_memory().unwrap();

    let store = SqliteMembershipStore::try_new(&mut conn).unwrap();
    let mut admin = ListAdminService::new(store);

    let err = admin
        .create_list("L1", "  ", Editor::new("u1", "a@x.com", "Ana"))
        .unwrap_err();
    assert!(matches!(err, ListAdminError::BlankName));

    let err = admin
        .create_list("L1", "Groceries", Editor::new("u1", "", "Ana"))
        .unwrap_err();
    assert!(matches!(err, ListAdminError::InvalidProfile(_)));
}
