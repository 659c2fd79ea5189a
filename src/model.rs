//! Resource model: one descriptor per managed resource, flattened for
//! runtime use by the SQL builder, validator and lifecycle service.
//!
//! The three back-office resources share one lifecycle shape (status lookup
//! table, natural-key uniqueness, soft delete to the inactive status), so a
//! single descriptor parameterizes all of them instead of three hand-copied
//! implementations.

use std::collections::HashMap;

use crate::error::AppError;

/// Conventional status id for active records.
pub const STATUS_ACTIVE: i64 = 1;
/// Conventional status id for inactive records; soft delete targets this.
pub const STATUS_INACTIVE: i64 = 2;

/// `estado` query parameter on list endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    Activo,
    Inactivo,
    Todos,
}

impl StatusFilter {
    /// Parse the `estado` query value; absent means `todos`.
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value {
            None | Some("todos") => Ok(StatusFilter::Todos),
            Some("activo") => Ok(StatusFilter::Activo),
            Some("inactivo") => Ok(StatusFilter::Inactivo),
            Some(_) => Err(AppError::Validation(
                "Estado must be one of activo, inactivo, todos".into(),
            )),
        }
    }

    /// Concrete status id to filter on, or None for no predicate.
    pub fn status_id(self) -> Option<i64> {
        match self {
            StatusFilter::Activo => Some(STATUS_ACTIVE),
            StatusFilter::Inactivo => Some(STATUS_INACTIVE),
            StatusFilter::Todos => None,
        }
    }
}

/// Per-column request-shape rules, checked before any core logic runs.
#[derive(Clone, Debug, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    /// Anchored regex the string value must match.
    pub pattern: Option<&'static str>,
    /// "email" or "integer".
    pub format: Option<&'static str>,
    /// Lower bound for integer values.
    pub minimum: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// PostgreSQL type, used for DDL and SQL casts on bound parameters.
    pub pg_type: &'static str,
    /// One-way hashed before persisting; accepted on create, ignored on update.
    pub secret: bool,
    pub rule: ValidationRule,
}

impl ColumnSpec {
    fn new(name: &'static str, pg_type: &'static str, rule: ValidationRule) -> Self {
        ColumnSpec {
            name,
            pg_type,
            secret: false,
            rule,
        }
    }

    fn secret(name: &'static str, pg_type: &'static str, rule: ValidationRule) -> Self {
        ColumnSpec {
            name,
            pg_type,
            secret: true,
            rule,
        }
    }
}

/// Descriptor for one managed resource: table, status lookup, natural key,
/// mutable columns and the response messages built from its nouns.
#[derive(Clone, Debug)]
pub struct ResourceSpec {
    /// URL segment and table name (e.g. "clientes").
    pub path_segment: &'static str,
    /// Singular noun for messages (e.g. "cliente").
    pub singular: &'static str,
    /// Plural noun for messages (e.g. "clientes").
    pub plural: &'static str,
    pub table: &'static str,
    /// Lookup table of valid status ids for this resource.
    pub status_table: &'static str,
    /// Column whose value must be unique across all records at creation.
    pub natural_key: &'static str,
    /// Mutable columns, excluding the immutable `id`.
    pub columns: Vec<ColumnSpec>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl ResourceSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn label(&self) -> String {
        capitalize(self.singular)
    }

    pub fn msg_list_ok(&self) -> String {
        format!("{} obtenidos con éxito", capitalize(self.plural))
    }

    pub fn msg_list_empty(&self) -> String {
        format!("No se encontraron {}", self.plural)
    }

    pub fn msg_get_ok(&self) -> String {
        format!("{} obtenido con éxito", self.label())
    }

    pub fn msg_created(&self) -> String {
        format!("{} creado con éxito", self.label())
    }

    pub fn msg_updated(&self) -> String {
        format!("{} actualizado con éxito", self.label())
    }

    pub fn msg_deleted(&self) -> String {
        format!("{} eliminado lógicamente con éxito", self.label())
    }

    pub fn msg_status_updated(&self) -> String {
        format!("Estado del {} actualizado con éxito", self.singular)
    }

    pub fn msg_not_found(&self) -> String {
        format!("{} no encontrado", self.label())
    }

    pub fn msg_already_inactive(&self) -> String {
        format!("El {} ya está inactivo", self.singular)
    }

    pub fn msg_same_status(&self) -> String {
        format!("El {} ya se encuentra en ese estado", self.singular)
    }

    pub fn msg_duplicate(&self) -> String {
        format!("{} con este {} ya existe", self.label(), self.natural_key)
    }

    pub fn err_list(&self) -> String {
        format!("Error obteniendo {}", self.plural)
    }

    pub fn err_get(&self) -> String {
        format!("Error obteniendo {}", self.singular)
    }

    pub fn err_create(&self) -> String {
        format!("Error creando {}", self.singular)
    }

    pub fn err_update(&self) -> String {
        format!("Error actualizando {}", self.singular)
    }

    pub fn err_delete(&self) -> String {
        format!("Error eliminando {}", self.singular)
    }

    pub fn err_status(&self) -> String {
        format!("Error actualizando estado del {}", self.singular)
    }
}

#[derive(Clone, Debug)]
pub struct ResourceModel {
    pub resources: Vec<ResourceSpec>,
    by_path: HashMap<&'static str, usize>,
}

impl ResourceModel {
    pub fn new(resources: Vec<ResourceSpec>) -> Self {
        let by_path = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.path_segment, i))
            .collect();
        ResourceModel { resources, by_path }
    }

    pub fn by_path(&self, path: &str) -> Option<&ResourceSpec> {
        self.by_path.get(path).map(|&i| &self.resources[i])
    }

    /// The back-office model: clientes, maquiladores, usuarios.
    pub fn builtin() -> Self {
        let estado_rule = ValidationRule {
            required: true,
            format: Some("integer"),
            ..Default::default()
        };
        let nombre_rule = ValidationRule {
            required: true,
            max_length: Some(50),
            pattern: Some(r"^[a-zA-Z\s]+$"),
            ..Default::default()
        };

        let clientes = ResourceSpec {
            path_segment: "clientes",
            singular: "cliente",
            plural: "clientes",
            table: "clientes",
            status_table: "estado_cliente",
            natural_key: "email",
            columns: vec![
                ColumnSpec::new("nombre", "varchar(50)", nombre_rule.clone()),
                ColumnSpec::new(
                    "direccion",
                    "varchar(100)",
                    ValidationRule {
                        required: true,
                        max_length: Some(100),
                        ..Default::default()
                    },
                ),
                ColumnSpec::new(
                    "contacto",
                    "varchar(50)",
                    ValidationRule {
                        required: true,
                        max_length: Some(50),
                        ..Default::default()
                    },
                ),
                ColumnSpec::new(
                    "telefono",
                    "varchar(10)",
                    ValidationRule {
                        required: true,
                        min_length: Some(10),
                        max_length: Some(10),
                        pattern: Some(r"^[0-9]+$"),
                        ..Default::default()
                    },
                ),
                ColumnSpec::new(
                    "email",
                    "text",
                    ValidationRule {
                        required: true,
                        format: Some("email"),
                        ..Default::default()
                    },
                ),
                ColumnSpec::new("estado_id", "int", estado_rule.clone()),
            ],
        };

        let maquiladores = ResourceSpec {
            path_segment: "maquiladores",
            singular: "maquilador",
            plural: "maquiladores",
            table: "maquiladores",
            status_table: "estado_maquilador",
            natural_key: "nombre",
            columns: vec![
                ColumnSpec::new("nombre", "varchar(50)", nombre_rule.clone()),
                ColumnSpec::new(
                    "direccion",
                    "varchar(100)",
                    ValidationRule {
                        required: true,
                        max_length: Some(100),
                        pattern: Some(r"^[a-zA-Z0-9\s]+$"),
                        ..Default::default()
                    },
                ),
                ColumnSpec::new(
                    "capacidad",
                    "int",
                    ValidationRule {
                        required: true,
                        format: Some("integer"),
                        minimum: Some(1),
                        ..Default::default()
                    },
                ),
                ColumnSpec::new("estado_id", "int", estado_rule.clone()),
            ],
        };

        let usuarios = ResourceSpec {
            path_segment: "usuarios",
            singular: "usuario",
            plural: "usuarios",
            table: "usuarios",
            status_table: "estado_usuario",
            natural_key: "email",
            columns: vec![
                ColumnSpec::new("nombre", "varchar(50)", nombre_rule),
                ColumnSpec::new(
                    "email",
                    "text",
                    ValidationRule {
                        required: true,
                        format: Some("email"),
                        ..Default::default()
                    },
                ),
                ColumnSpec::secret(
                    "password",
                    "text",
                    ValidationRule {
                        required: true,
                        min_length: Some(6),
                        ..Default::default()
                    },
                ),
                ColumnSpec::new(
                    "role",
                    "varchar(50)",
                    ValidationRule {
                        required: true,
                        max_length: Some(50),
                        ..Default::default()
                    },
                ),
                ColumnSpec::new("estado_id", "int", estado_rule),
            ],
        };

        ResourceModel::new(vec![clientes, maquiladores, usuarios])
    }
}
