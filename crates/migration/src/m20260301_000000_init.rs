//! Initial schema.
//!
//! - `users`: credentials, profile and role
//! - `movements`: dated incomes and expenses, each owned by one user

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
    Phone,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum Movements {
    Table,
    Id,
    Concept,
    AmountMinor,
    Kind,
    Date,
    UserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Role).string().default("USER"))
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movements::Concept).string_len(500).not_null())
                    .col(
                        ColumnDef::new(Movements::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Movements::AmountMinor).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Movements::Kind)
                            .string()
                            .not_null()
                            .check(Expr::col(Movements::Kind).is_in(["INCOME", "EXPENSE"])),
                    )
                    .col(ColumnDef::new(Movements::Date).timestamp().not_null())
                    .col(ColumnDef::new(Movements::UserId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-user_id")
                            .from(Movements::Table, Movements::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-movements-date")
                    .table(Movements::Table)
                    .col(Movements::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-movements-user_id")
                    .table(Movements::Table)
                    .col(Movements::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
