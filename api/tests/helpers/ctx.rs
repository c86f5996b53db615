use api::auth::generate_jwt;
use chrono::{Datelike, Utc};
use db::models::{
    module::Model as ModuleModel,
    user::Model as UserModel,
    user_module_role::{Model as UserModuleRoleModel, Role},
};
use sea_orm::DatabaseConnection;

pub struct TestCtx {
    pub module: ModuleModel,
    pub lecturer: UserModel,
    pub assistant: UserModel,
    pub tutor: UserModel,
    pub student: UserModel,
    pub student2: UserModel,
    pub outsider: UserModel,
    pub admin: UserModel,
}

impl TestCtx {
    pub fn token(&self, user: &UserModel) -> String {
        generate_jwt(user.id, user.admin).unwrap().0
    }
}

pub async fn setup(db: &DatabaseConnection) -> TestCtx {
    let module = ModuleModel::create(db, "ATT201", Utc::now().year(), Some("Attendance tests"))
        .await
        .expect("create module");

    let mut users = Vec::new();
    for (name, admin) in [
        ("att_lect", false),
        ("att_al", false),
        ("att_tutor", false),
        ("att_s1", false),
        ("att_s2", false),
        ("att_out", false),
        ("att_admin", true),
    ] {
        users.push(
            UserModel::create(db, name, &format!("{name}@test.com"), admin)
                .await
                .unwrap(),
        );
    }
    let [lecturer, assistant, tutor, student, student2, outsider, admin]: [UserModel; 7] =
        users.try_into().unwrap();

    for (user, role) in [
        (&lecturer, Role::Lecturer),
        (&assistant, Role::AssistantLecturer),
        (&tutor, Role::Tutor),
        (&student, Role::Student),
        (&student2, Role::Student),
    ] {
        UserModuleRoleModel::assign_user_to_module(db, user.id, module.id, role)
            .await
            .unwrap();
    }

    TestCtx {
        module,
        lecturer,
        assistant,
        tutor,
        student,
        student2,
        outsider,
        admin,
    }
}
