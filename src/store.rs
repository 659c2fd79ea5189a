//! Database bootstrap: create the database if missing, then the status
//! lookup tables (with their seed rows) and the entity tables, all derived
//! from the resource model. DDL is idempotent.

use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

use crate::error::{AppError, ConfigError};
use crate::model::{ResourceModel, ResourceSpec};

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Ensure the database in `database_url` exists; create it if not. Connects
/// to the default `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|_| {
        ConfigError::Invalid {
            name: "DATABASE_URL",
            value: admin_url.clone(),
        }
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| ConfigError::Invalid {
            name: "DATABASE_URL",
            value: url.to_string(),
        })?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

/// CREATE TABLE for one resource's status lookup, plus its conventional
/// seed rows (1 activo, 2 inactivo). Other ids may be added out of band.
fn status_table_ddl(spec: &ResourceSpec) -> (String, String) {
    let table = quote_ident(spec.status_table);
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {} (id INT PRIMARY KEY, nombre TEXT NOT NULL)",
        table
    );
    let seed = format!(
        "INSERT INTO {} (id, nombre) VALUES (1, 'activo'), (2, 'inactivo') ON CONFLICT (id) DO NOTHING",
        table
    );
    (ddl, seed)
}

/// CREATE TABLE for one resource: uuid PK, NOT NULL columns, UNIQUE natural
/// key, FK from estado_id to the status lookup.
fn entity_table_ddl(spec: &ResourceSpec) -> String {
    let mut col_defs = vec![format!("{} UUID PRIMARY KEY", quote_ident("id"))];
    for c in &spec.columns {
        let mut def = format!("{} {} NOT NULL", quote_ident(c.name), c.pg_type);
        if c.name == spec.natural_key {
            def.push_str(" UNIQUE");
        }
        if c.name == "estado_id" {
            def.push_str(&format!(
                " REFERENCES {}(id)",
                quote_ident(spec.status_table)
            ));
        }
        col_defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(spec.table),
        col_defs.join(", ")
    )
}

/// Create all lookup and entity tables for the model.
pub async fn ensure_schema(pool: &PgPool, model: &ResourceModel) -> Result<(), AppError> {
    for spec in &model.resources {
        let (lookup_ddl, seed) = status_table_ddl(spec);
        sqlx::query(&lookup_ddl).execute(pool).await?;
        sqlx::query(&seed).execute(pool).await?;
        sqlx::query(&entity_table_ddl(spec)).execute(pool).await?;
        tracing::info!(resource = spec.path_segment, "schema ensured");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn db_name_is_parsed_from_url() {
        let (admin, name) =
            parse_db_name_from_url("postgres://user:pw@localhost:5432/backoffice").unwrap();
        assert_eq!(admin, "postgres://user:pw@localhost:5432/postgres");
        assert_eq!(name, "backoffice");
    }

    #[test]
    fn query_suffix_is_stripped_from_db_name() {
        let (_, name) =
            parse_db_name_from_url("postgres://localhost/backoffice?sslmode=disable").unwrap();
        assert_eq!(name, "backoffice");
    }

    #[test]
    fn entity_ddl_has_unique_natural_key_and_status_fk() {
        let model = ResourceModel::builtin();
        let ddl = entity_table_ddl(model.by_path("clientes").unwrap());
        assert!(ddl.contains("\"id\" UUID PRIMARY KEY"));
        assert!(ddl.contains("\"email\" text NOT NULL UNIQUE"));
        assert!(ddl.contains("\"estado_id\" int NOT NULL REFERENCES \"estado_cliente\"(id)"));

        let ddl = entity_table_ddl(model.by_path("maquiladores").unwrap());
        assert!(ddl.contains("\"nombre\" varchar(50) NOT NULL UNIQUE"));
    }

    #[test]
    fn status_tables_seed_the_two_conventional_rows() {
        let model = ResourceModel::builtin();
        let (ddl, seed) = status_table_ddl(model.by_path("usuarios").unwrap());
        assert!(ddl.contains("\"estado_usuario\""));
        assert!(seed.contains("(1, 'activo'), (2, 'inactivo')"));
        assert!(seed.contains("ON CONFLICT (id) DO NOTHING"));
    }
}
