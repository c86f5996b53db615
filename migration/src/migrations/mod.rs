pub mod m202509010001_create_directory;
pub mod m202509080001_create_attendance;
