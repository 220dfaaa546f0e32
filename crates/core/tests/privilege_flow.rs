//! Registering catalogs, assigning privileges and checking access

use clansphere_core::builtin;
use clansphere_core::{
    bind_privileges, Error, Group, InMemorySubscriptionStore, Principal, PrivilegeExpr,
    PrivilegeRegistry, SubscriptionPruner, SubscriptionStore, User,
};

fn registry() -> PrivilegeRegistry {
    let mut registry = PrivilegeRegistry::with_builtins();
    registry.register_all(builtin::news_privileges()).unwrap();
    registry.register_all(builtin::board_privileges()).unwrap();
    registry.register_all(builtin::gamesquad_privileges()).unwrap();
    registry.register_all(builtin::war_privileges()).unwrap();
    registry.register_all(builtin::shoutbox_privileges()).unwrap();
    registry
}

#[test]
fn test_group_assignment_flow() {
    let registry = registry();
    let mut editors = Group::new("editors");

    let outcome = bind_privileges(
        &mut editors.privileges,
        ["NEWS_PUBLIC", "SHOUTBOX_MANAGE"],
        &registry,
        &mut (),
    )
    .unwrap();
    let granted: Vec<&str> = outcome.granted.iter().map(|p| p.name()).collect();
    assert_eq!(
        granted,
        vec!["ENTER_ADMIN_PANEL", "NEWS_EDIT", "NEWS_PUBLIC", "SHOUTBOX_MANAGE"]
    );

    let mut user = User::new("editor");
    user.groups.push(editors);

    let edit = PrivilegeExpr::from(registry.lookup("NEWS_EDIT").unwrap());
    let delete = PrivilegeExpr::from(registry.lookup("NEWS_DELETE").unwrap());
    assert!(user.has_privilege(&registry, Some(&edit)));
    assert!(!user.has_privilege(&registry, Some(&delete)));
    assert!(user.has_privilege(&registry, Some(&(edit | delete))));
    assert!(user.is_manager(&registry));
    assert!(!user.is_admin(&registry));
}

#[test]
fn test_revoking_squad_rights_prunes_subscriptions() {
    let registry = registry();
    let squad = registry.lookup("SQUAD_MANAGE").unwrap().clone();
    let members = registry.lookup("SQUAD_MANAGE_MEMBERS").unwrap().clone();

    let mut user = User::new("leader");
    bind_privileges(&mut user.own_privileges, ["SQUAD_MANAGE"], &registry, &mut ()).unwrap();
    assert_eq!(user.held_privileges().len(), 3);

    let mut subscriptions = InMemorySubscriptionStore::new();
    subscriptions.subscribe("squad_joined", Some(PrivilegeExpr::from(&members)));
    subscriptions.subscribe("squad_created", Some(PrivilegeExpr::from(&squad)));
    let open = subscriptions.subscribe("news_created", None);

    let mut pruner = SubscriptionPruner::new(&mut subscriptions);
    let outcome =
        bind_privileges(&mut user.own_privileges, Vec::<&str>::new(), &registry, &mut pruner)
            .unwrap();
    let report = pruner.finish();

    assert_eq!(outcome.revoked.len(), 3);
    assert!(user.held_privileges().is_empty());
    assert_eq!(report.deleted.len(), 2);
    let remaining: Vec<u64> = subscriptions.subscriptions().iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![open]);
}

#[test]
fn test_unknown_names_abort_before_mutation() {
    let registry = registry();
    let mut group = Group::new("staff");
    bind_privileges(&mut group.privileges, ["WAR_MANAGE"], &registry, &mut ()).unwrap();
    let before = group.privileges.clone();

    let err = bind_privileges(&mut group.privileges, ["GAME_MANAGE", "MISSING"], &registry, &mut ())
        .unwrap_err();

    assert_eq!(err, Error::UnknownPrivilege("MISSING".to_string()));
    assert_eq!(group.privileges, before);
}
