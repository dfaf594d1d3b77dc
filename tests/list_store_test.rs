//! Integration tests for the table store
//!
//! Runs list, load and write operations against a recording executor, so the
//! compiled SQL and bind parameters can be checked without a live database.

use queryhaus::prelude::*;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays scripted results and records every statement it receives
struct RecordingExecutor {
    dialect: Dialect,
    fetch_results: Mutex<VecDeque<Vec<Row>>>,
    exec_outcome: ExecOutcome,
    statements: Mutex<Vec<Statement>>,
}

impl RecordingExecutor {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            fetch_results: Mutex::new(VecDeque::new()),
            exec_outcome: ExecOutcome {
                rows_affected: 1,
                last_insert_id: None,
            },
            statements: Mutex::new(Vec::new()),
        }
    }

    fn with_rows(self, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| row.as_object().cloned())
            .collect();
        self.fetch_results.lock().unwrap().push_back(rows);
        self
    }

    fn with_outcome(mut self, outcome: ExecOutcome) -> Self {
        self.exec_outcome = outcome;
        self
    }

    fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        self.statements.lock().unwrap().push(statement.clone());
        Ok(self
            .fetch_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn execute(&self, statement: &Statement) -> Result<ExecOutcome, StoreError> {
        self.statements.lock().unwrap().push(statement.clone());
        Ok(self.exec_outcome.clone())
    }
}

fn users() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::builder("users")
            .field(FieldDescriptor::int("id").unsigned().auto_increment())
            .field(FieldDescriptor::string("name").max_length(10, true))
            .field(FieldDescriptor::int("age").optional(None))
            .field(
                FieldDescriptor::string("status")
                    .options(["A", "B", "C"])
                    .optional(Some(json!("A"))),
            )
            .field(FieldDescriptor::bool("active").optional(Some(json!(true))))
            .field(FieldDescriptor::datetime("created_at").read_only().optional(None))
            .build()
            .unwrap(),
    )
}

fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

// ========================================
// Reads
// ========================================

#[tokio::test]
async fn test_list_keys_rows_by_primary_key() {
    let executor = RecordingExecutor::new(Dialect::Postgresql).with_rows(vec![
        json!({"id": 7, "name": "Ann", "active": true}),
        json!({"id": 9, "name": "Bob", "active": false}),
    ]);
    let store = TableStore::new(users(), &executor);

    let options: ListOptions = serde_json::from_value(json!({
        "query": {"and": [{"field": "name", "operator": "cv", "value": "o"}]},
        "pageSize": 2,
        "page": 2,
        "sortFields": {"name": "asc"}
    }))
    .unwrap();

    let page = store.list(&options).await.unwrap();
    let keys: Vec<&str> = page.keys().map(String::as_str).collect();
    assert_eq!(keys, ["7", "9"]);
    assert_eq!(page["9"]["name"], json!("Bob"));

    let statements = executor.statements();
    assert_eq!(
        statements[0].sql,
        "SELECT * FROM \"users\" WHERE ((\"name\" LIKE $1)) ORDER BY \"name\" ASC LIMIT 2 OFFSET 2"
    );
    assert_eq!(statements[0].params, vec![SqlValue::Text("%o%".to_string())]);
}

#[tokio::test]
async fn test_list_rejects_invalid_query_without_touching_the_database() {
    let executor = RecordingExecutor::new(Dialect::Postgresql);
    let store = TableStore::new(users(), &executor);

    let options = ListOptions {
        query: Some(json!({"and": [{"field": "age", "operator": "gt", "value": "abc"}]})),
        ..ListOptions::default()
    };

    let err = store.list(&options).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Query(QueryError::InvalidValue { ref field, .. }) if field == "age"
    ));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_count() {
    let executor = RecordingExecutor::new(Dialect::Postgresql).with_rows(vec![json!({"total": 3})]);
    let store = TableStore::new(users(), &executor);

    let options = ListOptions {
        query: Some(json!({"or": [{"field": "status", "operator": "in", "value": ["A", "B"]}]})),
        ..ListOptions::default()
    };
    assert_eq!(store.count(&options).await.unwrap(), 3);
    assert_eq!(
        executor.statements()[0].sql,
        "SELECT COUNT(*) AS total FROM \"users\" WHERE ((\"status\" IN ($1, $2)))"
    );
}

#[tokio::test]
async fn test_load_by_primary_key_and_by_field() {
    let executor = RecordingExecutor::new(Dialect::Postgresql)
        .with_rows(vec![json!({"id": "5", "name": "Eve", "active": 1})])
        .with_rows(vec![]);
    let store = TableStore::new(users(), &executor);

    let loaded = store.load(json!(5), None).await.unwrap().unwrap();
    assert_eq!(loaded["id"], json!(5));
    assert_eq!(loaded["active"], json!(true));

    assert!(store.load(json!("Zed"), Some("name")).await.unwrap().is_none());

    let statements = executor.statements();
    assert_eq!(
        statements[0].sql,
        "SELECT * FROM \"users\" WHERE ((\"id\" = $1)) ORDER BY \"id\" ASC LIMIT 1"
    );
    assert_eq!(statements[0].params, vec![SqlValue::BigInt(5)]);
    assert_eq!(statements[1].params, vec![SqlValue::Text("Zed".to_string())]);

    assert!(matches!(
        store.load(json!(1), Some("ghost")).await,
        Err(StoreError::Query(QueryError::UnknownField(_)))
    ));
}

#[tokio::test]
async fn test_describe() {
    let executor = RecordingExecutor::new(Dialect::Postgresql);
    let store = TableStore::new(users(), &executor);

    let description = serde_json::to_value(store.describe()).unwrap();
    assert_eq!(
        description["status"],
        json!({
            "primary": false,
            "readonly": false,
            "type": "String",
            "options": ["A", "B", "C"],
            "required": false,
            "default": "A"
        })
    );
    assert_eq!(description["created_at"]["readonly"], json!(true));
}

// ========================================
// Writes
// ========================================

#[tokio::test]
async fn test_create_returns_generated_key_on_postgres() {
    let executor = RecordingExecutor::new(Dialect::Postgresql).with_rows(vec![json!({"id": 41})]);
    let store = TableStore::new(users(), &executor);

    let created = store
        .create(row(json!({
            "name": "Alexander the Great",
            "age": "33",
            "created_at": "2020-01-01"
        })))
        .await
        .unwrap();

    assert_eq!(created["id"], json!(41));
    assert_eq!(created["name"], json!("Alexander "));
    assert_eq!(created["age"], json!(33));
    assert_eq!(created["status"], json!("A"));
    assert_eq!(created["active"], json!(1));

    let statements = executor.statements();
    assert_eq!(
        statements[0].sql,
        "INSERT INTO \"users\" (\"name\", \"age\", \"status\", \"active\") \
         VALUES ($1, $2, $3, $4) RETURNING \"id\""
    );
    assert_eq!(
        statements[0].params,
        vec![
            SqlValue::Text("Alexander ".to_string()),
            SqlValue::BigInt(33),
            SqlValue::Text("A".to_string()),
            SqlValue::Boolean(true),
        ]
    );
}

#[tokio::test]
async fn test_create_uses_last_insert_id_on_mysql() {
    let executor = RecordingExecutor::new(Dialect::Mysql).with_outcome(ExecOutcome {
        rows_affected: 1,
        last_insert_id: Some(12),
    });
    let store = TableStore::new(users(), &executor);

    let created = store.create(row(json!({"name": "Kim"}))).await.unwrap();
    assert_eq!(created["id"], json!(12));
    assert_eq!(
        executor.statements()[0].sql,
        "INSERT INTO `users` (`name`, `status`, `active`) VALUES (?, ?, ?)"
    );
}

#[tokio::test]
async fn test_create_validates_values() {
    let executor = RecordingExecutor::new(Dialect::Postgresql);
    let store = TableStore::new(users(), &executor);

    assert!(matches!(
        store.create(row(json!({"age": 30}))).await,
        Err(StoreError::MissingValue(field)) if field == "name"
    ));
    assert!(matches!(
        store.create(row(json!({"name": "Kim", "status": "Z"}))).await,
        Err(StoreError::InvalidValue { field, .. }) if field == "status"
    ));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_update_writes_present_fields_by_primary_key() {
    let executor = RecordingExecutor::new(Dialect::Postgresql);
    let store = TableStore::new(users(), &executor);

    let updated = store
        .update(row(json!({
            "id": "3",
            "age": 40,
            "active": false,
            "created_at": "2021-05-05"
        })))
        .await
        .unwrap();

    assert_eq!(updated["id"], json!(3));
    assert_eq!(updated["active"], json!(0));

    let statements = executor.statements();
    assert_eq!(
        statements[0].sql,
        "UPDATE \"users\" SET \"age\" = $1, \"active\" = $2 WHERE \"id\" = $3"
    );
    assert_eq!(
        statements[0].params,
        vec![SqlValue::BigInt(40), SqlValue::Boolean(false), SqlValue::BigInt(3)]
    );
}

#[tokio::test]
async fn test_update_requires_key_value() {
    let executor = RecordingExecutor::new(Dialect::Postgresql);
    let store = TableStore::new(users(), &executor);

    assert!(matches!(
        store.update(row(json!({"age": 40}))).await,
        Err(StoreError::MissingValue(field)) if field == "id"
    ));
}

#[tokio::test]
async fn test_delete() {
    let executor = RecordingExecutor::new(Dialect::Postgresql);
    let store = TableStore::new(users(), &executor);

    assert!(!store.delete(&row(json!({"name": "nobody"}))).await.unwrap());
    assert!(executor.statements().is_empty());

    assert!(store.delete(&row(json!({"id": 8}))).await.unwrap());
    let statements = executor.statements();
    assert_eq!(statements[0].sql, "DELETE FROM \"users\" WHERE \"id\" = $1");
    assert_eq!(statements[0].params, vec![SqlValue::BigInt(8)]);
}

#[tokio::test]
async fn test_delete_requires_primary_key() {
    let schema = Arc::new(
        TableSchema::builder("audit_log")
            .field(FieldDescriptor::string("line"))
            .build()
            .unwrap(),
    );
    let executor = RecordingExecutor::new(Dialect::Postgresql);
    let store = TableStore::new(schema, &executor);

    assert!(matches!(
        store.delete(&row(json!({"line": "x"}))).await,
        Err(StoreError::MissingPrimaryKey(table)) if table == "audit_log"
    ));
}

#[tokio::test]
async fn test_save_dispatches_on_key() {
    let executor = RecordingExecutor::new(Dialect::Postgresql).with_rows(vec![json!({"id": 1})]);
    let store = TableStore::new(users(), &executor);

    store.save(row(json!({"id": 0, "name": "New"}))).await.unwrap();
    store.save(row(json!({"id": 4, "name": "Old"}))).await.unwrap();

    let statements = executor.statements();
    assert_eq!(
        statements[0].sql,
        "INSERT INTO \"users\" (\"name\", \"status\", \"active\") VALUES ($1, $2, $3) RETURNING \"id\""
    );
    assert!(statements[1].sql.starts_with("UPDATE"));
}
