//! Grouped count queries.
//!
//! One `SELECT key, COUNT(key) ... WHERE key IN (..) GROUP BY key` per aggregate,
//! covering a whole batch of parent ids. Keys with no rows are absent from the
//! result; callers read through [`CountMap`] helpers that default them to zero.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QuerySelect, Select,
};
use vidtube_common::{AppError, AppResult};

/// Per-key row counts from a grouped query.
pub type CountMap = HashMap<String, u64>;

#[derive(Debug, FromQueryResult)]
struct GroupCount {
    group_key: String,
    total: i64,
}

/// Count the rows of `select` grouped by `key`, restricted to `ids`.
///
/// An empty `ids` slice returns an empty map without touching the database.
pub async fn count_grouped<E, C, Db>(
    db: &Db,
    select: Select<E>,
    key: C,
    ids: &[String],
) -> AppResult<CountMap>
where
    E: EntityTrait,
    C: ColumnTrait,
    Db: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(CountMap::new());
    }

    let rows = select
        .filter(key.is_in(ids.iter().cloned()))
        .select_only()
        .column_as(key, "group_key")
        .column_as(key.count(), "total")
        .group_by(key)
        .into_model::<GroupCount>()
        .all(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|row| (row.group_key, u64::try_from(row.total).unwrap_or(0)))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{View, view};
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn group_row(key: &str, total: i64) -> BTreeMap<&'static str, Value> {
        btreemap! {
            "group_key" => Value::from(key.to_string()),
            "total" => Value::BigInt(Some(total)),
        }
    }

    #[tokio::test]
    async fn test_count_grouped_builds_map() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![group_row("v1", 3), group_row("v2", 1)]])
            .into_connection();

        let ids = vec!["v1".to_string(), "v2".to_string(), "v3".to_string()];
        let counts = count_grouped(&db, View::find(), view::Column::VideoId, &ids)
            .await
            .unwrap();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("v1"), Some(&3));
        assert_eq!(counts.get("v2"), Some(&1));
        assert_eq!(counts.get("v3"), None);
    }

    #[tokio::test]
    async fn test_count_grouped_issues_single_grouped_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![group_row("v1", 2)]])
            .into_connection();

        let ids = vec!["v1".to_string(), "v2".to_string()];
        count_grouped(&db, View::find(), view::Column::VideoId, &ids)
            .await
            .unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("GROUP BY"));
        assert!(sql.contains("COUNT"));
    }

    #[tokio::test]
    async fn test_count_grouped_empty_ids_skips_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let counts = count_grouped(&db, View::find(), view::Column::VideoId, &[])
            .await
            .unwrap();

        assert!(counts.is_empty());
        assert!(db.into_transaction_log().is_empty());
    }
}
