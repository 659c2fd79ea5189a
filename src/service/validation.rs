//! Request-shape validation from descriptor rules. Runs before any core
//! logic so 400-class failures never reach the store.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::AppError;
use crate::model::{ColumnSpec, ResourceSpec, ValidationRule};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body: every column rule applies, secrets included.
    pub fn validate_create(
        body: &HashMap<String, Value>,
        spec: &ResourceSpec,
    ) -> Result<(), AppError> {
        Self::validate_columns(body, &spec.columns, true)
    }

    /// Validate an update body: secret columns are not part of the update
    /// surface and are skipped entirely.
    pub fn validate_update(
        body: &HashMap<String, Value>,
        spec: &ResourceSpec,
    ) -> Result<(), AppError> {
        Self::validate_columns(body, &spec.columns, false)
    }

    fn validate_columns(
        body: &HashMap<String, Value>,
        columns: &[ColumnSpec],
        include_secret: bool,
    ) -> Result<(), AppError> {
        for col in columns {
            if col.secret && !include_secret {
                continue;
            }
            let val = body.get(col.name);
            if col.rule.required && (val.is_none() || val == Some(&Value::Null)) {
                return Err(AppError::Validation(format!("{} es requerido", col.name)));
            }
            if let Some(v) = val {
                validate_field(col.name, v, &col.rule)?;
            }
        }
        Ok(())
    }
}

fn validate_field(name: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(format) = rule.format {
        validate_format(name, v, format)?;
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} debe tener como máximo {} caracteres",
                    name, max
                )));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} debe tener al menos {} caracteres",
                    name, min
                )));
            }
        }
    }
    if let Some(pattern) = rule.pattern {
        let re = Regex::new(pattern)
            .map_err(|_| AppError::Validation(format!("patrón inválido para {}", name)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!(
                    "{} tiene un formato inválido",
                    name
                )));
            }
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_i64() {
            if n < min {
                return Err(AppError::Validation(format!(
                    "{} debe ser al menos {}",
                    name, min
                )));
            }
        }
    }
    Ok(())
}

fn validate_format(name: &str, v: &Value, format: &str) -> Result<(), AppError> {
    match format {
        "email" => {
            if let Some(s) = v.as_str() {
                if !s.contains('@') || s.len() < 3 {
                    return Err(AppError::Validation(format!(
                        "{} debe ser un correo válido",
                        name
                    )));
                }
            } else {
                return Err(AppError::Validation(format!(
                    "{} debe ser un correo válido",
                    name
                )));
            }
        }
        "integer" => {
            if v.as_i64().is_none() {
                return Err(AppError::Validation(format!(
                    "{} debe ser un entero",
                    name
                )));
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceModel;
    use serde_json::json;

    fn body(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn cliente_body() -> HashMap<String, Value> {
        body(&[
            ("nombre", json!("Industrias del Norte")),
            ("direccion", json!("Av. Siempre Viva 123")),
            ("contacto", json!("Juan Perez")),
            ("telefono", json!("5512345678")),
            ("email", json!("ventas@norte.mx")),
            ("estado_id", json!(1)),
        ])
    }

    #[test]
    fn valid_cliente_body_passes() {
        let model = ResourceModel::builtin();
        let spec = model.by_path("clientes").unwrap();
        assert!(RequestValidator::validate_create(&cliente_body(), spec).is_ok());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let model = ResourceModel::builtin();
        let spec = model.by_path("clientes").unwrap();
        let mut b = cliente_body();
        b.remove("email");
        let err = RequestValidator::validate_create(&b, spec).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "email es requerido"));
    }

    #[test]
    fn telefono_must_be_ten_digits() {
        let model = ResourceModel::builtin();
        let spec = model.by_path("clientes").unwrap();
        let mut b = cliente_body();
        b.insert("telefono".into(), json!("12345"));
        assert!(RequestValidator::validate_create(&b, spec).is_err());
        b.insert("telefono".into(), json!("12345abcde"));
        assert!(RequestValidator::validate_create(&b, spec).is_err());
    }

    #[test]
    fn nombre_rejects_digits() {
        let model = ResourceModel::builtin();
        let spec = model.by_path("clientes").unwrap();
        let mut b = cliente_body();
        b.insert("nombre".into(), json!("Cliente 99"));
        assert!(RequestValidator::validate_create(&b, spec).is_err());
    }

    #[test]
    fn estado_id_must_be_an_integer() {
        let model = ResourceModel::builtin();
        let spec = model.by_path("clientes").unwrap();
        let mut b = cliente_body();
        b.insert("estado_id".into(), json!("uno"));
        let err = RequestValidator::validate_create(&b, spec).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "estado_id debe ser un entero"));
    }

    #[test]
    fn capacidad_must_be_positive() {
        let model = ResourceModel::builtin();
        let spec = model.by_path("maquiladores").unwrap();
        let b = body(&[
            ("nombre", json!("Planta Sur")),
            ("direccion", json!("Parque Industrial 4")),
            ("capacidad", json!(0)),
            ("estado_id", json!(1)),
        ]);
        let err = RequestValidator::validate_create(&b, spec).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "capacidad debe ser al menos 1"));
    }

    #[test]
    fn password_required_on_create_but_not_on_update() {
        let model = ResourceModel::builtin();
        let spec = model.by_path("usuarios").unwrap();
        let b = body(&[
            ("nombre", json!("Ana Gomez")),
            ("email", json!("ana@empresa.mx")),
            ("role", json!("admin")),
            ("estado_id", json!(1)),
        ]);
        assert!(RequestValidator::validate_create(&b, spec).is_err());
        assert!(RequestValidator::validate_update(&b, spec).is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let model = ResourceModel::builtin();
        let spec = model.by_path("usuarios").unwrap();
        let b = body(&[
            ("nombre", json!("Ana Gomez")),
            ("email", json!("ana@empresa.mx")),
            ("password", json!("abc")),
            ("role", json!("admin")),
            ("estado_id", json!(1)),
        ]);
        let err = RequestValidator::validate_create(&b, spec).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.starts_with("password")));
    }
}
