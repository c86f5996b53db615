use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{QuerySelect, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};

/// Membership of a user in a module, with the role they hold there.
///
/// A `Student` row is the enrollment the attendance engine checks against;
/// `Lecturer` and `AssistantLecturer` rows grant the instructor capability.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_module_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub module_id: i64,

    pub role: Role,

    pub created_at: DateTime<Utc>,
}

/// Backed by a `user_module_role_type` enum in the database.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_module_role_type")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "lecturer")]
    Lecturer,

    #[sea_orm(string_value = "assistant_lecturer")]
    AssistantLecturer,

    #[sea_orm(string_value = "tutor")]
    Tutor,

    #[sea_orm(string_value = "student")]
    Student,
}

impl Role {
    /// Roles allowed to open sessions and mark attendance manually.
    pub const INSTRUCTORS: [Role; 2] = [Role::Lecturer, Role::AssistantLecturer];
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id"
    )]
    Module,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assigns (or reassigns) `user_id` to `module_id` with `role`.
    pub async fn assign_user_to_module(
        db: &DatabaseConnection,
        user_id: i64,
        module_id: i64,
        role: Role,
    ) -> Result<(), DbErr> {
        let am = ActiveModel {
            user_id: Set(user_id),
            module_id: Set(module_id),
            role: Set(role),
            created_at: Set(Utc::now()),
        };

        Entity::insert(am)
            .on_conflict(
                OnConflict::columns([Column::UserId, Column::ModuleId])
                    .update_column(Column::Role)
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    pub async fn is_student(
        db: &DatabaseConnection,
        user_id: i64,
        module_id: i64,
    ) -> Result<bool, DbErr> {
        let row = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Role.eq(Role::Student))
            .one(db)
            .await?;
        Ok(row.is_some())
    }

    /// The subset of `user_ids` enrolled as students in `module_id`.
    pub async fn student_ids_among(
        db: &DatabaseConnection,
        module_id: i64,
        user_ids: &[i64],
    ) -> Result<HashSet<i64>, DbErr> {
        if user_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> = Entity::find()
            .select_only()
            .column(Column::UserId)
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Role.eq(Role::Student))
            .filter(Column::UserId.is_in(user_ids.iter().copied()))
            .into_tuple()
            .all(db)
            .await?;

        Ok(ids.into_iter().collect())
    }
}
