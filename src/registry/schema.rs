/*!
schema.rs - typed input declarations for registered commands.

An `InputSchema` is an ordered list of `FieldSpec`s. It serves two purposes:
  - validation of the raw argument object of a request (`validate`)
  - advertisement to the caller as a JSON Schema object (`to_json_schema`)

Absent optional fields are represented explicitly: every declared field is
present in `Arguments`, either as `Some(value)` or as `None`. JSON `null`
for an optional field counts as absent. Fields not declared by the schema
are rejected.
*/

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::DispatchError;

/* ---- Field Types ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::String, Value::String(_))
                | (FieldType::Number, Value::Number(_))
                | (FieldType::Boolean, Value::Bool(_))
                | (FieldType::Object, Value::Object(_))
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON type name of a value, for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/* ---- Field Declarations ---- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub description: Option<&'static str>,
    /// Field holds an address that may be given as a robot-address sentinel.
    pub address_alias: bool,
}

impl FieldSpec {
    pub fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            description: None,
            address_alias: false,
        }
    }

    pub fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn address(mut self) -> Self {
        self.address_alias = true;
        self
    }
}

/* ---- Schema ---- */

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of fields flagged as robot-address aliases.
    pub fn alias_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.address_alias)
            .map(|f| f.name)
    }

    /// Render as a JSON Schema object (`type: object`, properties, required).
    pub fn to_json_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".into(), Value::String(field.ty.as_str().into()));
            if let Some(desc) = field.description {
                prop.insert("description".into(), Value::String(desc.into()));
            }
            properties.insert(field.name.to_string(), Value::Object(prop));
            if field.required {
                required.push(Value::String(field.name.into()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".into(), Value::String("object".into()));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        schema.insert("additionalProperties".into(), Value::Bool(false));
        schema
    }

    /// Check a raw argument object against the declared fields.
    ///
    /// Declared fields are checked in declaration order, then undeclared keys
    /// in sorted order; the first violation is reported.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<Arguments, DispatchError> {
        let mut values = BTreeMap::new();

        for field in &self.fields {
            let value = match raw.get(field.name) {
                None | Some(Value::Null) if !field.required => None,
                None => return Err(DispatchError::invalid(field.name, field.ty.as_str(), "missing")),
                Some(v) if field.ty.accepts(v) => Some(v.clone()),
                Some(v) => {
                    return Err(DispatchError::invalid(
                        field.name,
                        field.ty.as_str(),
                        json_type_name(v),
                    ));
                }
            };
            values.insert(field.name.to_string(), value);
        }

        let mut undeclared: Vec<(&String, &Value)> = raw
            .iter()
            .filter(|(k, _)| self.field(k).is_none())
            .collect();
        undeclared.sort_by(|a, b| a.0.cmp(b.0));
        if let Some((key, value)) = undeclared.first() {
            return Err(DispatchError::invalid(
                key.as_str(),
                "no such field",
                json_type_name(value),
            ));
        }

        Ok(Arguments { values })
    }
}

/* ---- Validated Arguments ---- */

/// Validated arguments: every declared field, provided or explicitly absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: BTreeMap<String, Option<Value>>,
}

impl Arguments {
    /// Value of a provided field; `None` when absent or not declared.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(|v| v.as_ref())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[cfg(test)]
    pub fn is_provided(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declared field names, provided or not.
    #[cfg(test)]
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Replace the value of a provided field. Absent fields stay absent.
    pub fn replace(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.values.get_mut(name)
            && slot.is_some()
        {
            *slot = Some(value);
        }
    }

    /// Provided fields as a JSON object; absent fields are omitted.
    pub fn to_object(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Selected fields in order; absent fields become JSON `null`.
    pub fn positional(&self, names: &[&str]) -> Vec<Value> {
        names
            .iter()
            .map(|n| self.get(n).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_schema() -> InputSchema {
        InputSchema::new(vec![
            FieldSpec::required("tokenName", FieldType::String),
            FieldSpec::required("amount", FieldType::Number),
            FieldSpec::optional("to", FieldType::String).describe("User address"),
        ])
    }

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn json_schema_lists_required_fields() {
        let schema = order_schema().to_json_schema();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["required"], json!(["tokenName", "amount"]));
        assert_eq!(schema["properties"]["amount"]["type"], json!("number"));
        assert_eq!(
            schema["properties"]["to"]["description"],
            json!("User address")
        );
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn empty_schema_has_no_required_key() {
        let schema = InputSchema::empty().to_json_schema();
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = order_schema()
            .validate(&obj(json!({"tokenName": "SATS"})))
            .unwrap_err();
        assert_eq!(err, DispatchError::invalid("amount", "number", "missing"));
    }

    #[test]
    fn wrong_type_reports_expected_and_actual() {
        let err = order_schema()
            .validate(&obj(json!({"tokenName": "SATS", "amount": "10"})))
            .unwrap_err();
        assert_eq!(err, DispatchError::invalid("amount", "number", "string"));
    }

    #[test]
    fn null_required_field_is_rejected() {
        let err = order_schema()
            .validate(&obj(json!({"tokenName": null, "amount": 1})))
            .unwrap_err();
        assert_eq!(err, DispatchError::invalid("tokenName", "string", "null"));
    }

    #[test]
    fn undeclared_field_is_rejected() {
        let err = order_schema()
            .validate(&obj(json!({"tokenName": "SATS", "amount": 1, "memo": "x"})))
            .unwrap_err();
        assert_eq!(err, DispatchError::invalid("memo", "no such field", "string"));
    }

    #[test]
    fn absent_optional_is_explicit() {
        let args = order_schema()
            .validate(&obj(json!({"tokenName": "SATS", "amount": 5, "to": null})))
            .unwrap();
        assert!(!args.is_provided("to"));
        assert_eq!(args.declared().count(), 3);
        assert_eq!(args.to_object(), obj(json!({"tokenName": "SATS", "amount": 5})));
        assert_eq!(
            args.positional(&["tokenName", "to"]),
            vec![json!("SATS"), Value::Null]
        );
    }

    #[test]
    fn replace_only_touches_provided_fields() {
        let mut args = order_schema()
            .validate(&obj(json!({"tokenName": "SATS", "amount": 5})))
            .unwrap();
        args.replace("to", json!("npub1x"));
        args.replace("tokenName", json!("USDT"));
        assert!(!args.is_provided("to"));
        assert_eq!(args.get_str("tokenName"), Some("USDT"));
    }
}
