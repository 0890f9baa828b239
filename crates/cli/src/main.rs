//! Maintenance tooling: bulk question import and order repair.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wyr_common::{Config, IdGenerator};
use wyr_db::{
    entities::{question, response},
    repositories::{QuestionRepository, ResponseRepository},
};
use wyr_core::category_from_external_name;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import questions from a JSONL file
    Import { path: PathBuf },
    /// Rewrite response order values to 0/1 in id order
    FixOrders,
}

/// One line of the import file. Responses must hold exactly two options.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    question: String,
    responses: Vec<String>,
    category: Option<String>,
    contains_sensitive_content: Option<bool>,
    score: Option<i32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wyr=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load().context("failed to load configuration")?;
    let db = Arc::new(
        wyr_db::init(&config)
            .await
            .context("failed to connect to database")?,
    );
    wyr_db::migrate(&db)
        .await
        .context("failed to run migrations")?;

    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let response_repo = ResponseRepository::new(db);

    match cli.command {
        Commands::Import { path } => import(&question_repo, &path).await,
        Commands::FixOrders => fix_orders(&question_repo, &response_repo).await,
    }
}

/// Import questions line by line. Malformed lines are skipped and
/// counted, never fatal.
async fn import(question_repo: &QuestionRepository, path: &PathBuf) -> anyhow::Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let id_gen = IdGenerator::new();

    let mut imported: u64 = 0;
    let mut skipped: u64 = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("cannot read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: ImportRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "skipping malformed line");
                skipped += 1;
                continue;
            }
        };

        if record.responses.len() != 2 {
            warn!(
                line = line_no + 1,
                count = record.responses.len(),
                "skipping record without exactly two responses"
            );
            skipped += 1;
            continue;
        }

        let category = record
            .category
            .as_deref()
            .map(category_from_external_name)
            .unwrap_or(question::Category::General);

        let question_id = id_gen.generate();
        let now = chrono::Utc::now();

        let question_model = question::ActiveModel {
            id: Set(question_id.clone()),
            prompt: Set(record.question),
            category: Set(category),
            sensitive_content: Set(record.contains_sensitive_content.unwrap_or(false)),
            score: Set(record.score.unwrap_or(0)),
            author_id: Set(None),
            created_at: Set(now.into()),
        };

        let response_models = record
            .responses
            .into_iter()
            .enumerate()
            .map(|(order, text)| response::ActiveModel {
                id: Set(id_gen.generate()),
                question_id: Set(question_id.clone()),
                text: Set(text),
                order: Set(order as i16),
                created_at: Set(now.into()),
            })
            .collect();

        question_repo
            .create_with_responses(question_model, response_models)
            .await
            .with_context(|| format!("failed to import line {}", line_no + 1))?;
        imported += 1;
    }

    info!(imported, skipped, "import finished");
    println!("Imported {imported} questions ({skipped} skipped)");
    Ok(())
}

const FIX_ORDERS_PAGE_SIZE: u64 = 200;

/// Rewrite each two-response question's order values to 0/1 in id
/// order, repairing rows imported with stale order values.
async fn fix_orders(
    question_repo: &QuestionRepository,
    response_repo: &ResponseRepository,
) -> anyhow::Result<()> {
    let mut offset: u64 = 0;
    let mut fixed: u64 = 0;

    loop {
        let page = question_repo.find_page(FIX_ORDERS_PAGE_SIZE, offset).await?;
        if page.is_empty() {
            break;
        }

        for q in &page {
            let responses = response_repo.find_by_question_in_id_order(&q.id).await?;
            if responses.len() != 2 {
                warn!(question = %q.id, count = responses.len(), "unexpected response count");
                continue;
            }

            for (order, r) in responses.into_iter().enumerate() {
                let order = order as i16;
                if r.order == order {
                    continue;
                }

                let mut active: response::ActiveModel = r.into();
                active.order = Set(order);
                response_repo.update(active).await?;
                fixed += 1;
            }
        }

        offset += FIX_ORDERS_PAGE_SIZE;
    }

    info!(fixed, "order repair finished");
    println!("Rewrote {fixed} response order values");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn import_record_parses_full_line() {
        let line = r#"{"question":"Fly or invisibility?","responses":["Fly","Invisibility"],"category":"Sci-Fi","contains_sensitive_content":false,"score":12}"#;
        let record: ImportRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.question, "Fly or invisibility?");
        assert_eq!(record.responses.len(), 2);
        assert_eq!(record.category.as_deref(), Some("Sci-Fi"));
        assert_eq!(record.contains_sensitive_content, Some(false));
        assert_eq!(record.score, Some(12));
    }

    #[test]
    fn import_record_defaults_optional_fields() {
        let line = r#"{"question":"Tea or coffee?","responses":["Tea","Coffee"]}"#;
        let record: ImportRecord = serde_json::from_str(line).unwrap();

        assert!(record.category.is_none());
        assert!(record.contains_sensitive_content.is_none());
        assert!(record.score.is_none());
    }

    #[test]
    fn import_record_rejects_missing_responses() {
        let line = r#"{"question":"Tea or coffee?"}"#;
        assert!(serde_json::from_str::<ImportRecord>(line).is_err());
    }
}
