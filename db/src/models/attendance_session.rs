use chrono::{DateTime, Utc};
use ipnet::IpNet;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use strum::{Display, EnumString};

/// A short-lived attendance window opened by an instructor.
///
/// A session is usable for check-in only while `active` and before
/// `expires_at`; both are evaluated at every attempt, never cached.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub module_id: i64,
    pub created_by: i64,
    pub title: String,
    /// Short code students type in. Unique among active sessions.
    pub code: String,
    pub origin_policy: OriginPolicy,
    /// Opener's network origin at creation time.
    #[serde(skip_serializing)]
    pub authorized_origin: Option<String>,
    /// Opener's network in CIDR form, only for `OriginPolicy::Subnet`.
    #[serde(skip_serializing)]
    pub authorized_network: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a check-in's network origin is bound to the opener's origin.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_origin_policy")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OriginPolicy {
    /// Any origin is accepted (QR-style sessions).
    #[sea_orm(string_value = "none")]
    None,
    /// Origin must equal the opener's origin string.
    #[sea_orm(string_value = "exact")]
    Exact,
    /// Origin must be an address inside the opener's network.
    #[sea_orm(string_value = "subnet")]
    Subnet,
}

/// Externally visible lifecycle state of a session at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    Open,
    Closed,
    Expired,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id"
    )]
    Module,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new session row.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub module_id: i64,
    pub created_by: i64,
    pub title: String,
    pub code: String,
    pub origin_policy: OriginPolicy,
    pub authorized_origin: Option<String>,
    pub authorized_network: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Network containing `origin` for the given prefix lengths.
///
/// Returns `None` when `origin` is not an IP address or a prefix is out of range.
pub fn network_for(origin: &str, prefix_v4: u8, prefix_v6: u8) -> Option<IpNet> {
    let ip: IpAddr = origin.parse().ok()?;
    let prefix = match ip {
        IpAddr::V4(_) => prefix_v4,
        IpAddr::V6(_) => prefix_v6,
    };
    IpNet::new(ip, prefix).ok().map(|net| net.trunc())
}

impl Model {
    /// Inserts a new active session.
    ///
    /// Fails with a unique-constraint violation if another active session
    /// already holds `code`; callers retry with a fresh code.
    pub async fn create<C>(db: &C, new: NewSession) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        ActiveModel {
            module_id: Set(new.module_id),
            created_by: Set(new.created_by),
            title: Set(new.title),
            code: Set(new.code),
            origin_policy: Set(new.origin_policy),
            authorized_origin: Set(new.authorized_origin),
            authorized_network: Set(new.authorized_network),
            active: Set(true),
            created_at: Set(new.created_at),
            expires_at: Set(new.expires_at),
            updated_at: Set(new.created_at),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Finds the session holding `code`, preferring an active one.
    ///
    /// `code` must already be normalised. Validity is not judged here.
    pub async fn find_by_code<C>(db: &C, code: &str) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::Code.eq(code))
            .order_by_desc(Column::Active)
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }

    pub async fn find_in_module<C>(
        db: &C,
        module_id: i64,
        session_id: i64,
    ) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::Id.eq(session_id))
            .filter(Column::ModuleId.eq(module_id))
            .one(db)
            .await
    }

    /// All sessions of a module, newest first.
    pub async fn list_for_module<C>(db: &C, module_id: i64) -> Result<Vec<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::ModuleId.eq(module_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    /// Sets `active = false`. Closing a closed session is a no-op.
    pub async fn close<C>(self, db: &C, now: DateTime<Utc>) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !self.active {
            return Ok(self);
        }

        let mut am: ActiveModel = self.into();
        am.active = Set(false);
        am.updated_at = Set(now);
        am.update(db).await
    }

    #[inline]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }

    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        if !self.active {
            SessionState::Closed
        } else if now >= self.expires_at {
            SessionState::Expired
        } else {
            SessionState::Open
        }
    }

    /// Whether a check-in from `origin` satisfies this session's origin policy.
    pub fn origin_permitted(&self, origin: &str) -> bool {
        match self.origin_policy {
            OriginPolicy::None => true,
            OriginPolicy::Exact => self.authorized_origin.as_deref() == Some(origin),
            OriginPolicy::Subnet => {
                let Some(net) = self
                    .authorized_network
                    .as_deref()
                    .and_then(|n| n.parse::<IpNet>().ok())
                else {
                    return false;
                };
                origin
                    .parse::<IpAddr>()
                    .map(|ip| net.contains(&ip))
                    .unwrap_or(false)
            }
        }
    }
}
