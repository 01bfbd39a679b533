//! Permission catalog
//!
//! Permission names are `Module.Action`. The catalog is seeded into the
//! `permission` table; role grants reference rows there.

pub const USERS_LIST: &str = "Users.List";
pub const USERS_ADD: &str = "Users.Add";
pub const USERS_EDIT: &str = "Users.Edit";
pub const USERS_DELETE: &str = "Users.Delete";

pub const ROLES_LIST: &str = "Roles.List";
pub const ROLES_ADD: &str = "Roles.Add";
pub const ROLES_EDIT: &str = "Roles.Edit";
pub const ROLES_DELETE: &str = "Roles.Delete";

pub const EMAIL_TEMPLATES_LIST: &str = "EmailTemplates.List";
pub const EMAIL_TEMPLATES_ADD: &str = "EmailTemplates.Add";
pub const EMAIL_TEMPLATES_EDIT: &str = "EmailTemplates.Edit";
pub const EMAIL_TEMPLATES_DELETE: &str = "EmailTemplates.Delete";

pub const CMS_LIST: &str = "CMS.List";
pub const CMS_ADD: &str = "CMS.Add";
pub const CMS_EDIT: &str = "CMS.Edit";
pub const CMS_DELETE: &str = "CMS.Delete";

pub const FAQ_LIST: &str = "FAQ.List";
pub const APP_CONFIG_LIST: &str = "AppConfig.List";

pub const AUDIT_LOGS_LIST: &str = "AuditLogs.List";

/// Modules with the four CRUD actions
pub const CRUD_MODULES: &[&str] = &["Users", "Roles", "EmailTemplates", "CMS", "FAQ", "AppConfig"];

/// CRUD actions, in display order
pub const ACTIONS: &[&str] = &["List", "Add", "Edit", "Delete"];

/// Permissions outside the CRUD grid
pub const EXTRA_PERMISSIONS: &[&str] = &[AUDIT_LOGS_LIST];

/// Role names created by the seed
pub const SUPER_ADMIN: &str = "SuperAdmin";
pub const ADMIN: &str = "Admin";
pub const MANAGER: &str = "Manager";
pub const USER: &str = "User";
pub const GUEST: &str = "Guest";

/// One seeded permission row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
}

/// Full permission catalog: CRUD grid first, then the extras
pub fn catalog() -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> = CRUD_MODULES
        .iter()
        .flat_map(|module| {
            ACTIONS.iter().map(move |action| CatalogEntry {
                name: format!("{module}.{action}"),
                description: format!("{action} {}", module_label(module)),
            })
        })
        .collect();

    entries.push(CatalogEntry {
        name: AUDIT_LOGS_LIST.to_string(),
        description: "List audit logs".to_string(),
    });
    entries
}

fn module_label(module: &str) -> &str {
    match module {
        "EmailTemplates" => "email templates",
        "CMS" => "CMS pages",
        "FAQ" => "FAQs",
        "AppConfig" => "app configuration",
        "Users" => "users",
        "Roles" => "roles",
        other => other,
    }
}

/// A system role created by the seed
#[derive(Debug, Clone, Copy)]
pub struct SystemRole {
    pub name: &'static str,
    pub description: &'static str,
    pub is_protected: bool,
}

pub const SYSTEM_ROLES: &[SystemRole] = &[
    SystemRole {
        name: SUPER_ADMIN,
        description: "Full access",
        is_protected: true,
    },
    SystemRole {
        name: ADMIN,
        description: "Administration without audit",
        is_protected: true,
    },
    SystemRole {
        name: MANAGER,
        description: "Content and user management",
        is_protected: false,
    },
    SystemRole {
        name: USER,
        description: "Application user",
        is_protected: false,
    },
    SystemRole {
        name: GUEST,
        description: "Read only visitor",
        is_protected: false,
    },
];

/// Default grants of a system role
pub fn default_grants(role_name: &str) -> Vec<String> {
    let all = catalog().into_iter().map(|e| e.name);
    match role_name {
        SUPER_ADMIN => all.collect(),
        ADMIN => all.filter(|p| !p.starts_with("AuditLogs.")).collect(),
        MANAGER => all.filter(|p| !p.ends_with(".Delete")).collect(),
        USER => vec![FAQ_LIST.to_string(), APP_CONFIG_LIST.to_string()],
        GUEST => vec![FAQ_LIST.to_string()],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_crud_grid_and_extras() {
        let names: Vec<String> = catalog().into_iter().map(|e| e.name).collect();
        assert_eq!(names.len(), CRUD_MODULES.len() * ACTIONS.len() + EXTRA_PERMISSIONS.len());
        assert!(names.contains(&"CMS.Delete".to_string()));
        assert!(names.contains(&"AuditLogs.List".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("Cms.")));
    }

    #[test]
    fn default_grants_per_role() {
        let super_admin = default_grants(SUPER_ADMIN);
        assert_eq!(super_admin.len(), catalog().len());

        let admin = default_grants(ADMIN);
        assert!(admin.contains(&USERS_DELETE.to_string()));
        assert!(!admin.contains(&AUDIT_LOGS_LIST.to_string()));

        let manager = default_grants(MANAGER);
        assert!(manager.contains(&AUDIT_LOGS_LIST.to_string()));
        assert!(manager.contains(&USERS_EDIT.to_string()));
        assert!(!manager.iter().any(|p| p.ends_with(".Delete")));

        assert_eq!(default_grants(GUEST), vec![FAQ_LIST.to_string()]);
        assert!(default_grants("Nobody").is_empty());
    }

    #[test]
    fn grants_are_within_catalog() {
        let names: Vec<String> = catalog().into_iter().map(|e| e.name).collect();
        for role in SYSTEM_ROLES {
            for grant in default_grants(role.name) {
                assert!(names.contains(&grant), "{grant} not in catalog");
            }
        }
    }
}
