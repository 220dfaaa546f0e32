//! Built-in privilege catalog
//!
//! Core privileges are process-wide constants; plugin catalogs are built on
//! demand and registered into an instance's [`PrivilegeRegistry`].
//!
//! [`PrivilegeRegistry`]: crate::PrivilegeRegistry

use once_cell::sync::Lazy;

use crate::privilege::Privilege;

pub static ENTER_ACCOUNT_PANEL: Lazy<Privilege> =
    Lazy::new(|| Privilege::new("ENTER_ACCOUNT_PANEL", "can enter user account panel"));

pub static ENTER_ADMIN_PANEL: Lazy<Privilege> =
    Lazy::new(|| Privilege::new("ENTER_ADMIN_PANEL", "can enter admin panel"));

/// Super-privilege
pub static CLAN_ADMIN: Lazy<Privilege> =
    Lazy::new(|| Privilege::new("CLAN_ADMIN", "can administer everything"));

pub fn core_privileges() -> Vec<Privilege> {
    vec![
        ENTER_ACCOUNT_PANEL.clone(),
        ENTER_ADMIN_PANEL.clone(),
        CLAN_ADMIN.clone(),
    ]
}

fn admin_panel(name: &str, explanation: &str) -> Privilege {
    Privilege::with_dependencies(name, explanation, &*ENTER_ADMIN_PANEL)
}

pub fn news_privileges() -> Vec<Privilege> {
    let edit = admin_panel("NEWS_EDIT", "can edit non-selfwritten news");
    let public = Privilege::with_dependencies(
        "NEWS_PUBLIC",
        "can work on published items or publish new ones",
        &edit,
    );
    vec![
        admin_panel("NEWS_CREATE", "can create news"),
        edit,
        public,
        admin_panel("NEWS_DELETE", "can delete news"),
    ]
}

pub fn board_privileges() -> Vec<Privilege> {
    vec![
        Privilege::new("BOARD_MODERATE", "can moderate posts"),
        admin_panel("BOARD_MANAGE", "can manage forums"),
    ]
}

pub fn gamesquad_privileges() -> Vec<Privilege> {
    let members = admin_panel("SQUAD_MANAGE_MEMBERS", "can manage squad memberships");
    let squads = Privilege::with_dependencies("SQUAD_MANAGE", "can manage squads", &members);
    vec![admin_panel("GAME_MANAGE", "can manage games"), members, squads]
}

pub fn war_privileges() -> Vec<Privilege> {
    vec![admin_panel("WAR_MANAGE", "can manage war-related stuff")]
}

pub fn shoutbox_privileges() -> Vec<Privilege> {
    vec![Privilege::new("SHOUTBOX_MANAGE", "can manage shoutbox entries")]
}
