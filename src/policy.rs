use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Forum roles. The set is closed: anything else fails request
/// deserialization before it can reach an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Mod,
    Dm,
    Player,
}

/// Topic partitions for posts and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "post_category", rename_all = "lowercase")]
pub enum Category {
    General,
    Dm,
    Player,
    Mod,
}

impl Role {
    /// Categories this role may read and write. Anonymous access to
    /// `general` is a boundary rule handled by the extractors, not part
    /// of this map.
    pub fn allowed_categories(self) -> &'static [Category] {
        use Category::*;
        match self {
            Role::Admin => &[General, Dm, Player, Mod],
            Role::Mod => &[General, Dm, Player],
            Role::Dm => &[General, Dm],
            Role::Player => &[General, Player],
        }
    }
}

pub fn can_access(role: Role, category: Category) -> bool {
    role.allowed_categories().contains(&category)
}

/// Author-or-elevated deletion rule, orthogonal to the category map.
pub fn can_delete(author_id: Uuid, requester_id: Uuid, requester_role: Role) -> bool {
    author_id == requester_id || matches!(requester_role, Role::Admin | Role::Mod)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_sees_general_and_player_only() {
        assert!(can_access(Role::Player, Category::General));
        assert!(can_access(Role::Player, Category::Player));
        assert!(!can_access(Role::Player, Category::Dm));
        assert!(!can_access(Role::Player, Category::Mod));
    }

    #[test]
    fn dm_sees_general_and_dm_only() {
        assert!(can_access(Role::Dm, Category::General));
        assert!(can_access(Role::Dm, Category::Dm));
        assert!(!can_access(Role::Dm, Category::Player));
        assert!(!can_access(Role::Dm, Category::Mod));
    }

    #[test]
    fn mod_sees_everything_but_mod() {
        assert!(can_access(Role::Mod, Category::General));
        assert!(can_access(Role::Mod, Category::Dm));
        assert!(can_access(Role::Mod, Category::Player));
        assert!(!can_access(Role::Mod, Category::Mod));
    }

    #[test]
    fn admin_sees_all_categories() {
        for category in [Category::General, Category::Dm, Category::Player, Category::Mod] {
            assert!(can_access(Role::Admin, category));
        }
    }

    #[test]
    fn authors_delete_their_own_resources() {
        let author = Uuid::new_v4();
        assert!(can_delete(author, author, Role::Player));
    }

    #[test]
    fn non_author_players_cannot_delete() {
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(!can_delete(author, other, Role::Player));
        assert!(!can_delete(author, other, Role::Dm));
    }

    #[test]
    fn mods_and_admins_delete_anything() {
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(can_delete(author, other, Role::Mod));
        assert!(can_delete(author, other, Role::Admin));
    }

    #[test]
    fn roles_and_categories_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Dm).unwrap(), "\"dm\"");
        assert_eq!(serde_json::to_string(&Category::General).unwrap(), "\"general\"");
        let role: Role = serde_json::from_str("\"player\"").unwrap();
        assert_eq!(role, Role::Player);
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }
}
