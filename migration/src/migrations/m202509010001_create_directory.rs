use sea_orm_migration::prelude::*;

/// Users, modules and module membership: the directory attendance reads from.
pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202509010001_create_directory"
    }
}

fn timestamp_now(name: &str) -> ColumnDef {
    ColumnDef::new(Alias::new(name))
        .timestamp()
        .not_null()
        .default(Expr::cust("CURRENT_TIMESTAMP"))
        .to_owned()
}

fn id_column() -> ColumnDef {
    ColumnDef::new(Alias::new("id"))
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("users"))
                    .if_not_exists()
                    .col(id_column())
                    .col(
                        ColumnDef::new(Alias::new("username"))
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("email"))
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("admin"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_now("created_at"))
                    .col(timestamp_now("updated_at"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("modules"))
                    .if_not_exists()
                    .col(id_column())
                    .col(ColumnDef::new(Alias::new("code")).string().not_null())
                    .col(ColumnDef::new(Alias::new("year")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("description")).string().null())
                    .col(timestamp_now("created_at"))
                    .col(timestamp_now("updated_at"))
                    .index(
                        Index::create()
                            .name("uq_modules_code_year")
                            .col(Alias::new("code"))
                            .col(Alias::new("year"))
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (user, module); a `student` row is an active enrollment.
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("user_module_roles"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("user_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("module_id")).big_integer().not_null())
                    .col(
                        ColumnDef::new(Alias::new("role"))
                            .enumeration(
                                Alias::new("user_module_role_type"),
                                ["lecturer", "assistant_lecturer", "tutor", "student"]
                                    .into_iter()
                                    .map(Alias::new),
                            )
                            .not_null(),
                    )
                    .col(timestamp_now("created_at"))
                    .primary_key(
                        Index::create()
                            .col(Alias::new("user_id"))
                            .col(Alias::new("module_id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_umr_user")
                            .from(Alias::new("user_module_roles"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_umr_module")
                            .from(Alias::new("user_module_roles"), Alias::new("module_id"))
                            .to(Alias::new("modules"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_umr_module_role")
                    .table(Alias::new("user_module_roles"))
                    .col(Alias::new("module_id"))
                    .col(Alias::new("role"))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["user_module_roles", "modules", "users"] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
