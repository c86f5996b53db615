use async_trait::async_trait;
use db::models::user_module_role::Model as UserModuleRole;
use sea_orm::{DatabaseConnection, DbErr};
use std::collections::HashSet;

/// Answers "may this user take part in this module".
#[async_trait]
pub trait EnrollmentDirectory: Send + Sync {
    async fn is_actively_enrolled(&self, user_id: i64, module_id: i64) -> Result<bool, DbErr>;

    /// Batch form used by bulk marking.
    async fn enrolled_among(
        &self,
        module_id: i64,
        user_ids: &[i64],
    ) -> Result<HashSet<i64>, DbErr>;
}

/// Enrollment backed by `student` rows in `user_module_roles`.
#[derive(Clone)]
pub struct ModuleRoleDirectory {
    db: DatabaseConnection,
}

impl ModuleRoleDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentDirectory for ModuleRoleDirectory {
    async fn is_actively_enrolled(&self, user_id: i64, module_id: i64) -> Result<bool, DbErr> {
        UserModuleRole::is_student(&self.db, user_id, module_id).await
    }

    async fn enrolled_among(
        &self,
        module_id: i64,
        user_ids: &[i64],
    ) -> Result<HashSet<i64>, DbErr> {
        UserModuleRole::student_ids_among(&self.db, module_id, user_ids).await
    }
}
