//! Executor and schema provider against a throwaway SQLite file.

use chatdb::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::path::PathBuf;

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new(name: &str) -> Self {
        let file = format!("chatdb-{}-{}.sqlite", name, std::process::id());
        let path = std::env::temp_dir().join(file);
        let _ = std::fs::remove_file(&path);
        Self { path }
    }

    fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn seeded(tmp: &TempDb) -> ChatDb {
    let db = ChatDb::connect(&tmp.url()).await.expect("connect");
    sqlx::query(
        "CREATE TABLE sales (
            product_id INTEGER,
            purchase_date DATETIME,
            country_code VARCHAR(8),
            price_per_unit REAL,
            units_sold INTEGER
        )",
    )
    .execute(db.pool())
    .await
    .expect("create table");

    for (id, country, price, units) in [(1, "us", 2.5, 10), (2, "ca", 4.0, 3), (3, "us", 9.0, 7)] {
        sqlx::query("INSERT INTO sales VALUES (?, '2022-01-01', ?, ?, ?)")
            .bind(id as i64)
            .bind(country)
            .bind(price)
            .bind(units as i64)
            .execute(db.pool())
            .await
            .expect("insert row");
    }
    db
}

#[tokio::test]
async fn test_table_schema_reads_columns_in_order() {
    let tmp = TempDb::new("schema");
    let db = seeded(&tmp).await;
    assert_eq!(db.dialect(), Dialect::Sqlite);

    let schema = db.table_schema("sales").await.unwrap();
    let columns: Vec<(&str, ColumnType)> = schema
        .columns()
        .iter()
        .map(|c| (c.name.as_str(), c.typ))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("product_id", ColumnType::Integer),
            ("purchase_date", ColumnType::DateTime),
            ("country_code", ColumnType::Text),
            ("price_per_unit", ColumnType::Float),
            ("units_sold", ColumnType::Integer),
        ]
    );
}

#[tokio::test]
async fn test_missing_table_is_empty_schema() {
    let tmp = TempDb::new("missing");
    let db = seeded(&tmp).await;
    let err = db.table_schema("nope").await.unwrap_err();
    assert!(matches!(err, ChatDbError::EmptySchema { table } if table == "nope"));
}

#[tokio::test]
async fn test_ask_binds_values() {
    let tmp = TempDb::new("ask");
    let db = seeded(&tmp).await;

    let (query, rows) = db
        .ask(&Translator::default(), "sales", "country is us")
        .await
        .unwrap();
    assert_eq!(
        query.sql,
        "SELECT country_code FROM sales WHERE country_code = %s;"
    );
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["country_code"] == "us"));

    let (_, rows) = db
        .ask(&Translator::default(), "sales", "units sold more than 5")
        .await
        .unwrap();
    let units: Vec<i64> = rows
        .iter()
        .filter_map(|row| row["units_sold"].as_i64())
        .collect();
    assert_eq!(units, vec![10, 7]);
}

#[tokio::test]
async fn test_numeric_looking_text_is_bound_as_text() {
    let tmp = TempDb::new("zip");
    let db = ChatDb::connect(&tmp.url()).await.expect("connect");
    sqlx::query("CREATE TABLE shops (zip_code VARCHAR(5))")
        .execute(db.pool())
        .await
        .expect("create table");
    for zip in ["02134", "10001"] {
        sqlx::query("INSERT INTO shops VALUES (?)")
            .bind(zip)
            .execute(db.pool())
            .await
            .expect("insert row");
    }

    let (query, rows) = db
        .ask(&Translator::default(), "shops", "zip code is 02134")
        .await
        .unwrap();
    assert_eq!(query.params, vec!["02134"]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["zip_code"], "02134");
}

#[tokio::test]
async fn test_aggregates_decode_per_group() {
    let tmp = TempDb::new("aggregate");
    let db = seeded(&tmp).await;

    let (_, rows) = db
        .ask(&Translator::default(), "sales", "total units sold by country")
        .await
        .unwrap();
    let totals: BTreeMap<String, i64> = rows
        .iter()
        .filter_map(|row| {
            let country = row["country_code"].as_str()?.to_string();
            Some((country, row["total_units_sold"].as_i64()?))
        })
        .collect();
    assert_eq!(
        totals,
        BTreeMap::from([("ca".to_string(), 3), ("us".to_string(), 17)])
    );
}

#[tokio::test]
async fn test_driver_failure_is_execution_error() {
    let tmp = TempDb::new("failure");
    let db = seeded(&tmp).await;

    // The table exists but has no such column.
    let schema = Schema::new("sales", [("refund_amount", ColumnType::Float)]).unwrap();
    let translation = Translator::default().explain("refund amount", &schema).unwrap();
    assert_eq!(translation.query.to_sql(), "SELECT refund_amount FROM sales;");

    let err = db.execute(&translation.query, &schema).await.unwrap_err();
    assert!(matches!(err, ChatDbError::Execution(ref msg) if msg.contains("refund_amount")));

    let missing = Schema::new("returns", [("order_id", ColumnType::Integer)]).unwrap();
    let everything = Translator::default().explain("", &missing).unwrap();
    let err = db.execute(&everything.query, &missing).await.unwrap_err();
    assert!(matches!(err, ChatDbError::Execution(_)));
}
