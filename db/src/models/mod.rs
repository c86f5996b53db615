pub mod attendance_record;
pub mod attendance_session;
pub mod module;
pub mod user;
pub mod user_module_role;

pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_session::Entity as AttendanceSession;
pub use module::Entity as Module;
pub use user::Entity as User;
pub use user_module_role::Entity as UserModuleRole;
