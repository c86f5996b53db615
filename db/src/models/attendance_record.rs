use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{FromQueryResult, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

/// One attendance mark for an enrollment `(user_id, module_id)` on a given date.
///
/// Two storage-level invariants hold:
/// - at most one row per `(user_id, module_id, date)`; writes are upserts;
/// - at most one row per `(session_id, origin)`; a network origin can
///   self-check-in once per session.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub module_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: i64,
    /// Session that produced the record; `None` for manual marks.
    pub session_id: Option<i64>,
    /// Network origin observed at self-check-in.
    #[serde(skip_serializing)]
    pub origin: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "late")]
    Late,
    #[sea_orm(string_value = "excused")]
    Excused,
}

impl AttendanceStatus {
    /// Statuses that warrant telling the student.
    pub fn is_noteworthy(self) -> bool {
        matches!(self, AttendanceStatus::Absent | AttendanceStatus::Late)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id"
    )]
    Session,
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

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A self-check-in write.
#[derive(Debug, Clone)]
pub struct CheckInMark {
    pub user_id: i64,
    pub module_id: i64,
    pub date: NaiveDate,
    pub session_id: i64,
    pub origin: String,
}

/// An instructor/admin write with no session involved.
#[derive(Debug, Clone)]
pub struct ManualMark {
    pub user_id: i64,
    pub module_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: i64,
    pub remarks: Option<String>,
}

fn enrollment_day_conflict() -> OnConflict {
    OnConflict::columns([Column::UserId, Column::ModuleId, Column::Date])
}

impl Model {
    /// Records a self-check-in as `present`, in one atomic statement.
    ///
    /// An existing row for the same enrollment and day is overwritten, session
    /// and origin included. If another row already holds `(session_id, origin)`
    /// the statement fails with a unique-constraint violation, which is the
    /// authoritative "device already used" outcome.
    pub async fn upsert_check_in<C>(
        db: &C,
        mark: CheckInMark,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let am = ActiveModel {
            user_id: Set(mark.user_id),
            module_id: Set(mark.module_id),
            date: Set(mark.date),
            status: Set(AttendanceStatus::Present),
            marked_by: Set(mark.user_id),
            session_id: Set(Some(mark.session_id)),
            origin: Set(Some(mark.origin)),
            remarks: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Entity::insert(am)
            .on_conflict(
                enrollment_day_conflict()
                    .update_columns([
                        Column::Status,
                        Column::MarkedBy,
                        Column::SessionId,
                        Column::Origin,
                        Column::Remarks,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::require_for_day(db, mark.user_id, mark.module_id, mark.date).await
    }

    /// Records a manual mark, in one atomic statement.
    ///
    /// On overwrite only status, marker, remarks and `updated_at` change; a
    /// prior self-check-in keeps its session and origin so the device slot
    /// stays consumed.
    pub async fn upsert_manual<C>(
        db: &C,
        mark: ManualMark,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let am = ActiveModel {
            user_id: Set(mark.user_id),
            module_id: Set(mark.module_id),
            date: Set(mark.date),
            status: Set(mark.status),
            marked_by: Set(mark.marked_by),
            session_id: Set(None),
            origin: Set(None),
            remarks: Set(mark.remarks),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Entity::insert(am)
            .on_conflict(
                enrollment_day_conflict()
                    .update_columns([
                        Column::Status,
                        Column::MarkedBy,
                        Column::Remarks,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::require_for_day(db, mark.user_id, mark.module_id, mark.date).await
    }

    pub async fn find_for_day<C>(
        db: &C,
        user_id: i64,
        module_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Date.eq(date))
            .one(db)
            .await
    }

    async fn require_for_day<C>(
        db: &C,
        user_id: i64,
        module_id: i64,
        date: NaiveDate,
    ) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_for_day(db, user_id, module_id, date)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "Attendance record for user {user_id} in module {module_id} on {date} vanished after upsert"
                ))
            })
    }

    /// Whether `origin` has already produced a record under `session_id`.
    pub async fn origin_used_in_session<C>(
        db: &C,
        session_id: i64,
        origin: &str,
    ) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let found = Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::Origin.eq(origin))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Day roster of a module, ordered by user.
    pub async fn list_for_module_day<C>(
        db: &C,
        module_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Date.eq(date))
            .order_by_asc(Column::UserId)
            .all(db)
            .await
    }

    /// Number of records produced by each of `session_ids`.
    pub async fn counts_for_sessions<C>(
        db: &C,
        session_ids: &[i64],
    ) -> Result<HashMap<i64, i64>, DbErr>
    where
        C: ConnectionTrait,
    {
        if session_ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(FromQueryResult)]
        struct Row {
            session_id: i64,
            cnt: i64,
        }

        let rows: Vec<Row> = Entity::find()
            .select_only()
            .column(Column::SessionId)
            .column_as(Expr::expr(Func::count(Expr::col(Column::Id))), "cnt")
            .filter(Column::SessionId.is_in(session_ids.iter().copied()))
            .group_by(Column::SessionId)
            .into_model::<Row>()
            .all(db)
            .await?;

        Ok(rows.into_iter().map(|r| (r.session_id, r.cnt)).collect())
    }
}
