use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "project_manager")]
    ProjectManager,
    #[sea_orm(string_value = "team_member")]
    TeamMember,
}

/// Actions gated on the principal's role rather than on visibility.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    ManageAnyProject,
    ManageMembers,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "project_manager" => Some(Self::ProjectManager),
            "team_member" => Some(Self::TeamMember),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::ProjectManager => "project_manager",
            Self::TeamMember => "team_member",
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageAnyProject => matches!(self, Self::Admin),
            Capability::ManageMembers => {
                matches!(self, Self::Admin | Self::ProjectManager)
            }
        }
    }
}

#[derive(Debug, Clone, DeriveEntityModel, PartialEq, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_member::Entity")]
    ProjectMember,
}

impl Related<super::project_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_role_names() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("project_manager"), Some(Role::ProjectManager));
        assert_eq!(Role::parse("team_member"), Some(Role::TeamMember));
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn capability_checks_follow_role() {
        assert!(Role::Admin.can(Capability::ManageAnyProject));
        assert!(Role::Admin.can(Capability::ManageMembers));
        assert!(!Role::ProjectManager.can(Capability::ManageAnyProject));
        assert!(Role::ProjectManager.can(Capability::ManageMembers));
        assert!(!Role::TeamMember.can(Capability::ManageMembers));
    }
}
