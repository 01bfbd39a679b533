//! Permission Model

use serde::{Deserialize, Serialize};

/// Catalog entry, named `Module.Action` (e.g. `Users.List`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Permission {
    /// Module part of the name (`Users` for `Users.List`)
    pub fn module(&self) -> &str {
        self.name
            .split_once('.')
            .map(|(module, _)| module)
            .unwrap_or(&self.name)
    }
}

/// Permissions of one module, for the role editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGroup {
    pub module: String,
    pub permissions: Vec<Permission>,
}

/// Group permissions by module, keeping the input order of first appearance
pub fn group_by_module(permissions: Vec<Permission>) -> Vec<PermissionGroup> {
    let mut groups: Vec<PermissionGroup> = Vec::new();
    for permission in permissions {
        let module = permission.module().to_string();
        match groups.iter_mut().find(|g| g.module == module) {
            Some(group) => group.permissions.push(permission),
            None => groups.push(PermissionGroup {
                module,
                permissions: vec![permission],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(id: i64, name: &str) -> Permission {
        Permission {
            id,
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn module_of_name() {
        assert_eq!(perm(1, "Users.List").module(), "Users");
        assert_eq!(perm(2, "Standalone").module(), "Standalone");
    }

    #[test]
    fn groups_keep_order() {
        let groups = group_by_module(vec![
            perm(1, "Users.List"),
            perm(2, "Roles.List"),
            perm(3, "Users.Add"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].module, "Users");
        assert_eq!(groups[0].permissions.len(), 2);
        assert_eq!(groups[1].module, "Roles");
    }
}
