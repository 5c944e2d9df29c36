#![cfg(feature = "sqlite")]

use anyhow::Result;
use odata_adapt::{Error, ParseError, QueryLimits, QueryStringParser, ValidationError};
use odata_adapt_db::{ODataAdaptExt, ODataAdaptable, SeaQuery};
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde_json::{Value, json};

mod book {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "book")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub title: String,
        pub description: String,
        #[sea_orm(column_name = "authorId")]
        pub author_id: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl ODataAdaptable for book::Entity {
    const HIDDEN_FIELDS: &'static [&'static str] = &["authorId"];
}

const FIRST_TITLE: &str = "Build a website using Vue.js and Laravel";
const SECOND_TITLE: &str = "The ultimate web bundler using Browserify and Gulp";

async fn setup() -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts).await?;

    conn.execute_unprepared(
        r#"CREATE TABLE book (
id INTEGER PRIMARY KEY NOT NULL,
title TEXT NOT NULL,
description TEXT NOT NULL,
"authorId" INTEGER NOT NULL
)"#,
    )
    .await?;

    conn.execute_unprepared(&format!(
        r#"INSERT INTO book (id, title, description, "authorId") VALUES
(1, '{FIRST_TITLE}', 'All you need to know to build scalable web apps.', 10),
(2, '{SECOND_TITLE}', 'Learn how to bundle a modern Javascript web app.', 20)"#
    ))
    .await?;

    Ok(conn)
}

fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn adapt_without_query_returns_every_row_without_hidden_columns() -> Result<()> {
    let conn = setup().await?;

    let rows = book::Entity::adapt("https://example.com/")?
        .all_json(&conn)
        .await?;

    assert_eq!(ids(&rows), [1, 2]);
    assert_eq!(rows[0]["title"], FIRST_TITLE);
    for row in &rows {
        let row = row.as_object().unwrap();
        assert_eq!(row.len(), 3);
        assert!(!row.contains_key("authorId"));
    }
    Ok(())
}

#[tokio::test]
async fn ordered_rows_omit_hidden_columns() -> Result<()> {
    let conn = setup().await?;

    let rows = book::Entity::adapt("https://example.com/?$orderby=title")?
        .all_json(&conn)
        .await?;

    assert_eq!(ids(&rows), [1, 2]);
    assert!(rows.iter().all(|r| r.get("authorId").is_none()));
    Ok(())
}

#[tokio::test]
async fn plain_sea_query_keeps_every_column() -> Result<()> {
    let conn = setup().await?;

    let rows = SeaQuery::<book::Entity>::find().all_json(&conn).await?;

    assert_eq!(rows[0]["authorId"], 10);
    assert!(SeaQuery::<book::Entity>::find().hidden_fields().is_empty());
    Ok(())
}

#[tokio::test]
async fn adapt_continues_a_filtered_select() -> Result<()> {
    let conn = setup().await?;

    let rows = book::Entity::find()
        .filter(book::Column::Id.gte(1))
        .adapt("https://example.com/?$select=title")?
        .all_json(&conn)
        .await?;

    assert_eq!(
        rows,
        vec![json!({"title": FIRST_TITLE}), json!({"title": SECOND_TITLE})]
    );
    Ok(())
}

#[tokio::test]
async fn top_limits_rows() -> Result<()> {
    let conn = setup().await?;

    let rows = book::Entity::find()
        .order_by_asc(book::Column::Id)
        .adapt("https://example.com/?$top=1")?
        .all_json(&conn)
        .await?;

    assert_eq!(ids(&rows), [1]);
    Ok(())
}

#[tokio::test]
async fn top_and_skip_return_second_row() -> Result<()> {
    let conn = setup().await?;

    let rows = book::Entity::find()
        .order_by_asc(book::Column::Id)
        .adapt("https://example.com/?$top=1&$skip=1")?
        .all_json(&conn)
        .await?;

    assert_eq!(ids(&rows), [2]);
    assert_eq!(rows[0]["title"], SECOND_TITLE);
    Ok(())
}

#[tokio::test]
async fn orderby_desc_reverses_titles() -> Result<()> {
    let conn = setup().await?;

    let rows = book::Entity::adapt("https://example.com/?$orderby=title%20desc")?
        .all_json(&conn)
        .await?;

    assert_eq!(ids(&rows), [2, 1]);
    Ok(())
}

#[tokio::test]
async fn statement_reflects_every_modification() -> Result<()> {
    let conn = setup().await?;

    let query = book::Entity::adapt(
        "https://example.com/?$select=id,title&$top=1&$skip=1&$orderby=title%20desc,id",
    )?;
    let sql = query.build(&conn).to_string();

    assert!(sql.starts_with(r#"SELECT "book"."id", "book"."title" FROM "book""#), "{sql}");
    assert!(
        sql.contains(r#"ORDER BY "book"."title" DESC, "book"."id" ASC"#),
        "{sql}"
    );
    assert!(sql.contains("LIMIT 1"), "{sql}");
    assert!(sql.contains("OFFSET 1"), "{sql}");
    Ok(())
}

#[test]
fn hidden_field_in_select_is_rejected() {
    let Err(err) = book::Entity::adapt("https://example.com/?$select=name,authorId") else {
        panic!("expected a validation error");
    };

    assert_eq!(
        err,
        Error::Validation(ValidationError::HiddenFieldSelected {
            record_type: "book".to_owned(),
            fields: vec!["authorId".to_owned()],
        })
    );
}

#[test]
fn unknown_fields_are_rejected() {
    let Err(err) = book::Entity::adapt("https://example.com/?$orderby=isbn") else {
        panic!("expected a validation error");
    };
    assert_eq!(
        err,
        Error::Validation(ValidationError::UnknownField {
            context: "$orderby",
            field: "isbn".to_owned(),
        })
    );
}

#[test]
fn malformed_values_fail_to_parse() {
    let Err(err) = book::Entity::adapt("https://example.com/?$top=abc") else {
        panic!("expected a parse error");
    };
    assert!(matches!(
        err,
        Error::Parse(ParseError::InvalidInteger { key: "$top", .. })
    ));
}

#[test]
fn configured_parser_limits_apply() {
    let parser = QueryStringParser::new(QueryLimits::new().with_max_top(10));
    let res = book::Entity::find().adapt_with(&parser, "/books?$top=11");
    assert!(matches!(
        res,
        Err(Error::Parse(ParseError::LimitExceeded { max: 10, .. }))
    ));
}

#[test]
fn columns_resolve_by_exact_name() {
    assert!(matches!(
        SeaQuery::<book::Entity>::column("authorId"),
        Some(book::Column::AuthorId)
    ));
    assert!(matches!(
        SeaQuery::<book::Entity>::column("title"),
        Some(book::Column::Title)
    ));
    assert!(SeaQuery::<book::Entity>::column("Title").is_none());
    assert!(SeaQuery::<book::Entity>::column("author_id").is_none());
}
