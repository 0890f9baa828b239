//! Create question table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Question::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Question::Prompt).text().not_null())
                    .col(
                        ColumnDef::new(Question::Category)
                            .string_len(32)
                            .not_null()
                            .default("GENERAL"),
                    )
                    .col(
                        ColumnDef::new(Question::SensitiveContent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Question::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Question::AuthorId).string_len(32).null())
                    .col(
                        ColumnDef::new(Question::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_author")
                            .from(Question::Table, Question::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (category, sensitive_content) for filtered category listings
        manager
            .create_index(
                Index::create()
                    .name("idx_question_category_sensitive")
                    .table(Question::Table)
                    .col(Question::Category)
                    .col(Question::SensitiveContent)
                    .to_owned(),
            )
            .await?;

        // Index: author_id (for profile stats)
        manager
            .create_index(
                Index::create()
                    .name("idx_question_author_id")
                    .table(Question::Table)
                    .col(Question::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for newest-unseen selection)
        manager
            .create_index(
                Index::create()
                    .name("idx_question_created_at")
                    .table(Question::Table)
                    .col(Question::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
    Prompt,
    Category,
    SensitiveContent,
    Score,
    AuthorId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
