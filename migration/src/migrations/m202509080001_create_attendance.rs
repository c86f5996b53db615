use sea_orm_migration::prelude::*;

/// Attendance sessions and the per-day attendance ledger.
pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202509080001_create_attendance"
    }
}

#[derive(DeriveIden)]
enum AttendanceSessions {
    Table,
    Id,
    ModuleId,
    CreatedBy,
    Title,
    Code,
    OriginPolicy,
    AuthorizedOrigin,
    AuthorizedNetwork,
    Active,
    CreatedAt,
    ExpiresAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    Table,
    Id,
    UserId,
    ModuleId,
    Date,
    Status,
    MarkedBy,
    SessionId,
    Origin,
    Remarks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Modules {
    Table,
    Id,
}

fn key<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name).big_integer().not_null().to_owned()
}

fn stamp<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp()
        .not_null()
        .default(Expr::cust("CURRENT_TIMESTAMP"))
        .to_owned()
}

fn cascade<F: IntoIden + 'static, R: IntoIden + 'static>(
    name: &str,
    from: (F, F),
    to: (R, R),
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to.0, to.1)
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        use AttendanceRecords as R;
        use AttendanceSessions as S;

        let policies = ["none", "exact", "subnet"].map(Alias::new);
        manager
            .create_table(
                Table::create()
                    .table(S::Table)
                    .if_not_exists()
                    .col(key(S::Id).auto_increment().primary_key())
                    .col(key(S::ModuleId))
                    .col(key(S::CreatedBy))
                    .col(ColumnDef::new(S::Title).string().not_null())
                    .col(ColumnDef::new(S::Code).string_len(8).not_null())
                    .col(
                        ColumnDef::new(S::OriginPolicy)
                            .enumeration(Alias::new("attendance_origin_policy"), policies)
                            .not_null()
                            .default("exact"),
                    )
                    .col(ColumnDef::new(S::AuthorizedOrigin).string().null())
                    .col(ColumnDef::new(S::AuthorizedNetwork).string().null())
                    .col(ColumnDef::new(S::Active).boolean().not_null().default(true))
                    .col(stamp(S::CreatedAt))
                    .col(ColumnDef::new(S::ExpiresAt).timestamp().not_null())
                    .col(stamp(S::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_att_sess_module",
                        (S::Table, S::ModuleId),
                        (Modules::Table, Modules::Id),
                    ))
                    .foreign_key(&mut cascade(
                        "fk_att_sess_user",
                        (S::Table, S::CreatedBy),
                        (Users::Table, Users::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        // Closed sessions keep their code, so uniqueness only binds active rows.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_att_sess_active_code \
                 ON attendance_sessions (code) WHERE active = 1",
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_att_sess_module")
                    .table(S::Table)
                    .col(S::ModuleId)
                    .to_owned(),
            )
            .await?;

        let statuses = ["present", "absent", "late", "excused"].map(Alias::new);
        manager
            .create_table(
                Table::create()
                    .table(R::Table)
                    .if_not_exists()
                    .col(key(R::Id).auto_increment().primary_key())
                    .col(key(R::UserId))
                    .col(key(R::ModuleId))
                    .col(ColumnDef::new(R::Date).date().not_null())
                    .col(
                        ColumnDef::new(R::Status)
                            .enumeration(Alias::new("attendance_status"), statuses)
                            .not_null(),
                    )
                    .col(key(R::MarkedBy))
                    .col(ColumnDef::new(R::SessionId).big_integer().null())
                    .col(ColumnDef::new(R::Origin).string().null())
                    .col(ColumnDef::new(R::Remarks).text().null())
                    .col(stamp(R::CreatedAt))
                    .col(stamp(R::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_att_rec_session")
                            .from(R::Table, R::SessionId)
                            .to(S::Table, S::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut cascade(
                        "fk_att_rec_user",
                        (R::Table, R::UserId),
                        (Users::Table, Users::Id),
                    ))
                    .foreign_key(&mut cascade(
                        "fk_att_rec_module",
                        (R::Table, R::ModuleId),
                        (Modules::Table, Modules::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        // Upsert target: one row per enrollment per day.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_att_rec_enrollment_day")
                    .table(R::Table)
                    .col(R::UserId)
                    .col(R::ModuleId)
                    .col(R::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One self check-in per origin per session. Manual rows have NULL origin and never collide.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_att_rec_session_origin")
                    .table(R::Table)
                    .col(R::SessionId)
                    .col(R::Origin)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceSessions::Table).if_exists().to_owned())
            .await
    }
}
