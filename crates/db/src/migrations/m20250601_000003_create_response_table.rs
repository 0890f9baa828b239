//! Create response table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Response::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Response::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Response::QuestionId).string_len(32).not_null())
                    .col(ColumnDef::new(Response::Text).text().not_null())
                    .col(ColumnDef::new(Response::Order).small_integer().not_null())
                    .col(
                        ColumnDef::new(Response::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_response_question")
                            .from(Response::Table, Response::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (question_id, order) - order values 0/1 are unique per question
        manager
            .create_index(
                Index::create()
                    .name("idx_response_question_order")
                    .table(Response::Table)
                    .col(Response::QuestionId)
                    .col(Response::Order)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Response::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Response {
    Table,
    Id,
    QuestionId,
    Text,
    Order,
    CreatedAt,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}
