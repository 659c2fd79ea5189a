//! Builds parameterized SELECT, INSERT and UPDATE statements from a
//! resource descriptor. Placeholders carry SQL casts (e.g. `$1::uuid`)
//! because bound values travel as text.

use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::model::{ResourceSpec, STATUS_INACTIVE};

/// Quote identifier for PostgreSQL (safe: only from the builtin model).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: `id` plus every descriptor column.
fn select_column_list(spec: &ResourceSpec) -> String {
    let mut cols = vec![quoted("id")];
    cols.extend(spec.columns.iter().map(|c| quoted(c.name)));
    cols.join(", ")
}

/// Windowed list query: optional status predicate, stable order by id.
pub fn select_window(spec: &ResourceSpec, status_id: Option<i64>, size: u32, offset: u32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols = select_column_list(spec);
    let table = quoted(spec.table);
    let where_clause = match status_id {
        Some(id) => {
            let n = q.push_param(Value::Number(id.into()));
            format!(" WHERE {} = ${}::int", quoted("estado_id"), n)
        }
        None => String::new(),
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        cols,
        table,
        where_clause,
        quoted("id"),
        size,
        offset
    );
    q
}

/// COUNT under the same predicate as the window.
pub fn count(spec: &ResourceSpec, status_id: Option<i64>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(spec.table);
    let where_clause = match status_id {
        Some(id) => {
            let n = q.push_param(Value::Number(id.into()));
            format!(" WHERE {} = ${}::int", quoted("estado_id"), n)
        }
        None => String::new(),
    };
    q.sql = format!("SELECT COUNT(*) FROM {}{}", table, where_clause);
    q
}

/// SELECT one row by primary key.
pub fn select_by_id(spec: &ResourceSpec, id: Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols = select_column_list(spec);
    q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1::uuid",
        cols,
        quoted(spec.table),
        quoted("id")
    );
    q
}

/// Existence probe for the natural key, across all statuses.
pub fn natural_key_exists(spec: &ResourceSpec, value: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(value.clone());
    q.sql = format!(
        "SELECT 1 FROM {} WHERE {} = $1 LIMIT 1",
        quoted(spec.table),
        quoted(spec.natural_key)
    );
    q
}

/// Existence probe against the resource's status lookup table.
pub fn status_exists(spec: &ResourceSpec, estado_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(Value::Number(estado_id.into()));
    q.sql = format!(
        "SELECT 1 FROM {} WHERE {} = $1::int LIMIT 1",
        quoted(spec.status_table),
        quoted("id")
    );
    q
}

/// INSERT with explicit id; values taken from body in descriptor order.
pub fn insert(spec: &ResourceSpec, id: Uuid, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = vec![quoted("id")];
    let n = q.push_param(Value::String(id.to_string()));
    let mut placeholders = vec![format!("${}::uuid", n)];
    for c in &spec.columns {
        let val = body.get(c.name).cloned().unwrap_or(Value::Null);
        let n = q.push_param(val);
        cols.push(quoted(c.name));
        placeholders.push(format!("${}::{}", n, c.pg_type));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(spec.table),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(spec)
    );
    q
}

/// Full-replacement UPDATE: every non-secret column is overwritten from the
/// body (missing values become NULL). Secret columns are never updated.
pub fn update_full(spec: &ResourceSpec, id: Uuid, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in spec.columns.iter().filter(|c| !c.secret) {
        let val = body.get(c.name).cloned().unwrap_or(Value::Null);
        let n = q.push_param(val);
        sets.push(format!("{} = ${}::{}", quoted(c.name), n, c.pg_type));
    }
    let id_param = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::uuid RETURNING {}",
        quoted(spec.table),
        sets.join(", "),
        quoted("id"),
        id_param,
        select_column_list(spec)
    );
    q
}

/// Guarded status transition: updates only when the row exists and is not
/// already in the target status, so concurrent transitions cannot both
/// succeed. Zero rows means "gone or already there"; the caller re-reads to
/// tell the two apart.
pub fn transition(spec: &ResourceSpec, id: Uuid, target: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let target_param = q.push_param(Value::Number(target.into()));
    let id_param = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {estado} = ${}::int WHERE {} = ${}::uuid AND {estado} <> ${}::int RETURNING {}",
        quoted(spec.table),
        target_param,
        quoted("id"),
        id_param,
        target_param,
        select_column_list(spec),
        estado = quoted("estado_id"),
    );
    q
}

/// Soft delete is a transition to the inactive status.
pub fn soft_delete(spec: &ResourceSpec, id: Uuid) -> QueryBuf {
    transition(spec, id, STATUS_INACTIVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceModel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn clientes() -> ResourceSpec {
        ResourceModel::builtin().by_path("clientes").unwrap().clone()
    }

    fn usuarios() -> ResourceSpec {
        ResourceModel::builtin().by_path("usuarios").unwrap().clone()
    }

    #[test]
    fn window_without_filter_has_no_predicate() {
        let q = select_window(&clientes(), None, 10, 0);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"nombre\", \"direccion\", \"contacto\", \"telefono\", \"email\", \
             \"estado_id\" FROM \"clientes\" ORDER BY \"id\" LIMIT 10 OFFSET 0"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn window_with_filter_binds_status_id() {
        let q = select_window(&clientes(), Some(1), 10, 20);
        assert!(q.sql.contains("WHERE \"estado_id\" = $1::int"));
        assert!(q.sql.ends_with("LIMIT 10 OFFSET 20"));
        assert_eq!(q.params, vec![json!(1)]);
    }

    #[test]
    fn count_shares_the_window_predicate() {
        let filtered = count(&clientes(), Some(2));
        assert_eq!(
            filtered.sql,
            "SELECT COUNT(*) FROM \"clientes\" WHERE \"estado_id\" = $1::int"
        );
        assert_eq!(filtered.params, vec![json!(2)]);
        let all = count(&clientes(), None);
        assert_eq!(all.sql, "SELECT COUNT(*) FROM \"clientes\"");
    }

    #[test]
    fn status_probe_targets_the_lookup_table() {
        let q = status_exists(&clientes(), 7);
        assert_eq!(
            q.sql,
            "SELECT 1 FROM \"estado_cliente\" WHERE \"id\" = $1::int LIMIT 1"
        );
        assert_eq!(q.params, vec![json!(7)]);
    }

    #[test]
    fn natural_key_probe_uses_the_descriptor_key() {
        let q = natural_key_exists(&clientes(), &json!("a@b.com"));
        assert_eq!(
            q.sql,
            "SELECT 1 FROM \"clientes\" WHERE \"email\" = $1 LIMIT 1"
        );
    }

    #[test]
    fn insert_binds_id_then_columns_in_order() {
        let id = Uuid::new_v4();
        let body: HashMap<String, serde_json::Value> = [
            ("nombre".to_string(), json!("Acme")),
            ("email".to_string(), json!("a@b.com")),
            ("estado_id".to_string(), json!(1)),
        ]
        .into();
        let q = insert(&clientes(), id, &body);
        assert!(q.sql.starts_with(
            "INSERT INTO \"clientes\" (\"id\", \"nombre\", \"direccion\", \"contacto\", \
             \"telefono\", \"email\", \"estado_id\") VALUES ($1::uuid"
        ));
        assert!(q.sql.contains("RETURNING \"id\""));
        assert_eq!(q.params.len(), 7);
        assert_eq!(q.params[0], json!(id.to_string()));
        assert_eq!(q.params[1], json!("Acme"));
        // Missing columns insert as NULL.
        assert_eq!(q.params[2], serde_json::Value::Null);
        assert_eq!(q.params[6], json!(1));
    }

    #[test]
    fn update_overwrites_every_mutable_column() {
        let id = Uuid::new_v4();
        let q = update_full(&clientes(), id, &HashMap::new());
        assert!(q.sql.contains("\"nombre\" = $1::varchar(50)"));
        assert!(q.sql.contains("\"estado_id\" = $6::int"));
        assert!(q.sql.contains("WHERE \"id\" = $7::uuid RETURNING"));
        assert_eq!(q.params.len(), 7);
    }

    #[test]
    fn update_never_touches_secret_columns() {
        let id = Uuid::new_v4();
        let body: HashMap<String, serde_json::Value> =
            [("password".to_string(), json!("sneaky"))].into();
        let q = update_full(&usuarios(), id, &body);
        assert!(!q.sql.contains("\"password\""));
    }

    #[test]
    fn transition_is_guarded_against_no_op() {
        let id = Uuid::new_v4();
        let q = transition(&clientes(), id, 2);
        assert!(q.sql.contains("SET \"estado_id\" = $1::int"));
        assert!(q.sql.contains("WHERE \"id\" = $2::uuid AND \"estado_id\" <> $1::int"));
        assert_eq!(q.params[0], json!(2));
    }

    #[test]
    fn soft_delete_targets_the_inactive_status() {
        let q = soft_delete(&clientes(), Uuid::new_v4());
        assert_eq!(q.params[0], json!(STATUS_INACTIVE));
    }
}
