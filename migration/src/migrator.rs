use sea_orm_migration::prelude::*;

use crate::migrations::{m202509010001_create_directory, m202509080001_create_attendance};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m202509010001_create_directory::Migration),
            Box::new(m202509080001_create_attendance::Migration),
        ]
    }
}
