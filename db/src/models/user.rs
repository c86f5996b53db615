use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::models::user_module_role::{Column as RoleColumn, Entity as RoleEntity, Role};

/// Represents a user in the `users` table.
///
/// Identities are issued elsewhere; this table only anchors foreign keys and
/// the module-level `admin` capability.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique student or staff number.
    pub username: String,
    pub email: String,
    /// Whether the user has admin privileges across every module.
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_module_role::Entity")]
    ModuleRoles,
}

impl Related<super::user_module_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModuleRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        username: &str,
        email: &str,
        admin: bool,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            admin: Set(admin),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Whether `user_id` holds any of `roles` in `module_id`.
    pub async fn has_any_role(
        db: &DatabaseConnection,
        user_id: i64,
        module_id: i64,
        roles: &[Role],
    ) -> Result<bool, DbErr> {
        if roles.is_empty() {
            return Ok(false);
        }

        let found = RoleEntity::find()
            .filter(RoleColumn::UserId.eq(user_id))
            .filter(RoleColumn::ModuleId.eq(module_id))
            .filter(RoleColumn::Role.is_in(roles.iter().cloned()))
            .one(db)
            .await?;
        Ok(found.is_some())
    }
}
