// tests/postgres_gateway.rs
// Round trip against a real PostgreSQL server.
//
// Run with: TEST_DATABASE_URL=postgresql://... cargo test -- --ignored


use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};

use checklist_analyzer::db::{ConnectionSettings, Database, Identifier, SchemaSql};
use checklist_analyzer::llm::{PromptTemplate, TextGenerator};
use checklist_analyzer::services::AnalysisService;
use checklist_analyzer::tasks::CycleRunner;

use test_helpers::ScriptedGenerator;

const SCHEMA: &str = "analyzer_it";

async fn seed(url: &str) -> PgPool {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(url)
        .await
        .expect("connect to TEST_DATABASE_URL");

    for statement in [
        "DROP SCHEMA IF EXISTS analyzer_it CASCADE",
        "CREATE SCHEMA analyzer_it",
        "CREATE TABLE analyzer_it.mc_checkakt (
            code int8 PRIMARY KEY,
            aito int4 NOT NULL DEFAULT 0,
            aire int4 NOT NULL DEFAULT 0,
            aichecksum text,
            airesponse text,
            airedate timestamp
        )",
        "CREATE TABLE analyzer_it.m_checklist_avsec (code int8 PRIMARY KEY, aktcode int8 NOT NULL)",
        "CREATE TABLE analyzer_it.mc_checkpart_avsec (checkcode int8, charcode int8, grade int4)",
        "CREATE TABLE analyzer_it.rep_char (code int8 PRIMARY KEY, namecode int8)",
        "CREATE TABLE analyzer_it.rep_names (code int8, langid int4, name varchar(200))",
        "INSERT INTO analyzer_it.mc_checkakt (code, aito) VALUES (500, 1), (501, 0)",
        "INSERT INTO analyzer_it.m_checklist_avsec VALUES (10, 500), (11, 501), (12, 0)",
        "INSERT INTO analyzer_it.mc_checkpart_avsec VALUES (10, 102, 1), (10, 101, 2), (11, 101, 0)",
        "INSERT INTO analyzer_it.rep_char VALUES (101, 1), (102, 2)",
        "INSERT INTO analyzer_it.rep_names VALUES
            (1, 1049, 'Досмотр пассажиров'), (2, 1049, 'Охрана ВС'), (1, 1033, 'Screening')",
    ] {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("seed statement");
    }

    pool
}

fn runner(url: &str, tables: &[&str], generator: &std::sync::Arc<ScriptedGenerator>) -> CycleRunner<Database> {
    let settings = ConnectionSettings::parse(url).expect("valid TEST_DATABASE_URL");
    let sql = SchemaSql::new(Identifier::parse(SCHEMA).unwrap(), 1049);
    let generator: std::sync::Arc<dyn TextGenerator> = generator.clone();

    CycleRunner::new(
        Database::connect_lazy(&settings, sql),
        test_helpers::tables(tables),
        AnalysisService::new(generator, PromptTemplate::default()),
        std::time::Duration::from_secs(1),
    )
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn cycle_writes_analysis_and_fingerprint() {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        return;
    };
    let pool = seed(&url).await;
    let generator = ScriptedGenerator::new();

    // The missing table fails inside its savepoint; the rest of the cycle
    // still commits.
    let mut runner = runner(&url, &["missing", "avsec"], &generator);
    let report = runner.run_cycle().await.unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(report.processed, 1);

    let row = sqlx::query(
        "SELECT aire, aichecksum, airesponse, airedate IS NOT NULL AS dated
         FROM analyzer_it.mc_checkakt WHERE code = 500",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(row.get::<i32, _>("aire"), 1);
    assert_eq!(row.get::<String, _>("aichecksum"), "101:2|102:1");
    assert_eq!(row.get::<String, _>("airesponse"), "Анализ №1");
    assert!(row.get::<bool, _>("dated"));

    let prompt = &generator.prompts()[0];
    assert!(prompt.contains("- Категория: Досмотр пассажиров (код 101), Оценка: 2"));
    assert!(!prompt.contains("Screening"));

    // Second pass sees the stored fingerprint and skips
    let again = runner.run_cycle().await.unwrap();
    assert_eq!(again.unchanged, 1);
    assert_eq!(generator.calls(), 1);

    runner.close().await;
    pool.close().await;
}
