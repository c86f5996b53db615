use chrono::{DateTime, TimeZone, Utc};
use db::models::{
    module::Model as ModuleModel,
    user::Model as UserModel,
    user_module_role::{Model as UserModuleRole, Role},
};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;

use crate::settings::AttendanceSettings;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 8, 10, 0, 0).unwrap()
}

pub fn exact_settings() -> AttendanceSettings {
    AttendanceSettings::default()
}

/// One module with a lecturer, three enrolled students and an outsider,
/// plus an admin and a second module.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub module_id: i64,
    pub other_module_id: i64,
    pub lecturer: i64,
    pub admin: i64,
    pub alice: i64,
    pub bob: i64,
    pub carol: i64,
    pub outsider: i64,
}

async fn user(db: &DatabaseConnection, name: &str, admin: bool) -> i64 {
    UserModel::create(db, name, &format!("{name}@test.com"), admin)
        .await
        .unwrap()
        .id
}

impl Fixture {
    pub async fn new() -> Self {
        let db = setup_test_db().await;

        let module = ModuleModel::create(&db, "COS7", 2025, Some("Attendance"))
            .await
            .unwrap();
        let other = ModuleModel::create(&db, "COS8", 2025, None).await.unwrap();

        let lecturer = user(&db, "lecturer", false).await;
        let admin = user(&db, "admin", true).await;
        let alice = user(&db, "alice", false).await;
        let bob = user(&db, "bob", false).await;
        let carol = user(&db, "carol", false).await;
        let outsider = user(&db, "outsider", false).await;

        UserModuleRole::assign_user_to_module(&db, lecturer, module.id, Role::Lecturer)
            .await
            .unwrap();
        for student in [alice, bob, carol] {
            UserModuleRole::assign_user_to_module(&db, student, module.id, Role::Student)
                .await
                .unwrap();
        }
        UserModuleRole::assign_user_to_module(&db, outsider, other.id, Role::Student)
            .await
            .unwrap();

        Self {
            db,
            module_id: module.id,
            other_module_id: other.id,
            lecturer,
            admin,
            alice,
            bob,
            carol,
            outsider,
        }
    }
}
