//! Create vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::QuestionId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::ResponseId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::UserId).string_len(32).null())
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_question")
                            .from(Vote::Table, Vote::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_response")
                            .from(Vote::Table, Vote::ResponseId)
                            .to(Response::Table, Response::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_user")
                            .from(Vote::Table, Vote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (question_id, user_id) - one vote per user per question.
        // NULL user_ids (anonymous votes) are distinct under Postgres semantics,
        // so anonymous votes are unconstrained. This index is the authority on
        // duplicate votes; concurrent duplicate submissions lose here.
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_question_user")
                    .table(Vote::Table)
                    .col(Vote::QuestionId)
                    .col(Vote::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: response_id (for tallying)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_response_id")
                    .table(Vote::Table)
                    .col(Vote::ResponseId)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for votes-cast stats and unseen selection)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_user_id")
                    .table(Vote::Table)
                    .col(Vote::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    QuestionId,
    ResponseId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}

#[derive(Iden)]
enum Response {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
