//! Soft schema validation.
//!
//! The backend is not consistent about types: ids come back as numbers or
//! strings, amounts as numbers or numeric strings, optional fields as null.
//! Rules list every acceptable type per field and one recursive walker
//! checks them, collecting every violation instead of stopping at the first.

use std::fmt::{self, Display};

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// JSON integer, or a string that parses as one.
    Integer,
    /// Any JSON number, or a string that parses as one.
    Number,
    Text,
    Boolean,
    /// Three upper-case ASCII letters.
    CurrencyCode,
    Object(Schema),
    List(Box<FieldType>),
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::Number => write!(f, "number"),
            FieldType::Text => write!(f, "string"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::CurrencyCode => write!(f, "currency code"),
            FieldType::Object(_) => write!(f, "object"),
            FieldType::List(item) => write!(f, "list of {item}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    name: String,
    accepts: Vec<FieldType>,
    required: bool,
    nullable: bool,
}

impl FieldRule {
    /// May be absent or null.
    pub fn optional(name: &str, accepts: impl Into<Vec<FieldType>>) -> Self {
        Self {
            name: name.to_string(),
            accepts: accepts.into(),
            required: false,
            nullable: true,
        }
    }

    /// Must be present and non-null.
    pub fn required(name: &str, accepts: impl Into<Vec<FieldType>>) -> Self {
        Self {
            name: name.to_string(),
            accepts: accepts.into(),
            required: true,
            nullable: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    fn expected(&self) -> String {
        let mut names: Vec<String> = self.accepts.iter().map(ToString::to_string).collect();
        if self.nullable {
            names.push("null".into());
        }
        names.join("/")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: impl Into<Vec<FieldRule>>) -> Self {
        Self { rules: rules.into() }
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Violations for one object; empty means accepted.
    pub fn validate(&self, value: &Value) -> Vec<String> {
        let mut violations = Vec::new();
        self.walk(value, "", &mut violations);
        violations
    }

    fn walk(&self, value: &Value, path: &str, violations: &mut Vec<String>) {
        let Some(object) = value.as_object() else {
            violations.push(format!("{}expected object, got {}", prefix(path), kind(value)));
            return;
        };

        for rule in &self.rules {
            let field_path = join(path, &rule.name);
            match object.get(&rule.name) {
                None => {
                    if rule.required {
                        violations.push(format!("`{field_path}` is required but missing"));
                    }
                }
                Some(Value::Null) => {
                    if !rule.nullable {
                        violations.push(format!("`{field_path}` must be {}, got null", rule.expected()));
                    }
                }
                Some(field) => {
                    if let Some(nested) = matching_type(&rule.accepts, field) {
                        descend(nested, field, &field_path, violations);
                    } else {
                        violations.push(format!(
                            "`{field_path}` must be {}, got {}",
                            rule.expected(),
                            kind(field)
                        ));
                    }
                }
            }
        }
    }
}

/// Whole-response shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Object(Schema),
    /// A JSON array whose items each follow the schema.
    List(Schema),
}

impl Shape {
    pub fn validate(&self, value: &Value) -> Vec<String> {
        match self {
            Shape::Object(schema) => schema.validate(value),
            Shape::List(schema) => {
                let Some(items) = value.as_array() else {
                    return vec![format!("expected array, got {}", kind(value))];
                };
                let mut violations = Vec::new();
                for (idx, item) in items.iter().enumerate() {
                    schema.walk(item, &format!("[{idx}]"), &mut violations);
                }
                violations
            }
        }
    }
}

fn matching_type<'a>(accepts: &'a [FieldType], value: &Value) -> Option<&'a FieldType> {
    accepts.iter().find(|accepted| accepts_value(accepted, value))
}

fn accepts_value(accepted: &FieldType, value: &Value) -> bool {
    match accepted {
        FieldType::Integer => match value {
            Value::Number(number) => number.is_i64() || number.is_u64(),
            Value::String(text) => text.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        FieldType::Number => match value {
            Value::Number(_) => true,
            Value::String(text) => text.trim().parse::<f64>().is_ok_and(f64::is_finite),
            _ => false,
        },
        FieldType::Text => value.is_string(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::CurrencyCode => value
            .as_str()
            .is_some_and(|code| code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())),
        FieldType::Object(_) => value.is_object(),
        FieldType::List(_) => value.is_array(),
    }
}

fn descend(accepted: &FieldType, value: &Value, path: &str, violations: &mut Vec<String>) {
    match accepted {
        FieldType::Object(schema) => schema.walk(value, path, violations),
        FieldType::List(item_type) => {
            let Some(items) = value.as_array() else {
                return;
            };
            for (idx, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{idx}]");
                if item.is_null() {
                    continue;
                }
                if accepts_value(item_type, item) {
                    descend(item_type, item, &item_path, violations);
                } else {
                    violations.push(format!("`{item_path}` must be {item_type}, got {}", kind(item)));
                }
            }
        }
        _ => {}
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("`{path}`: ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_types() -> Vec<FieldType> {
        vec![FieldType::Integer, FieldType::Text]
    }

    fn balance_schema() -> Schema {
        Schema::new([
            FieldRule::required("balance", [FieldType::Number]),
            FieldRule::optional("currencyCode", [FieldType::CurrencyCode]),
        ])
    }

    #[test]
    fn absent_optional_fields_are_fine() {
        assert!(balance_schema().validate(&json!({"balance": 10})).is_empty());
    }

    #[test]
    fn missing_required_field_is_reported() {
        assert_eq!(balance_schema().validate(&json!({})), vec!["`balance` is required but missing"]);
    }

    #[test]
    fn numeric_strings_count_as_numbers() {
        assert!(balance_schema().validate(&json!({"balance": "12.50"})).is_empty());
        assert_eq!(
            balance_schema().validate(&json!({"balance": "twelve"})),
            vec!["`balance` must be number, got string"]
        );
    }

    #[test]
    fn required_fields_reject_null() {
        assert_eq!(
            balance_schema().validate(&json!({"balance": null})),
            vec!["`balance` must be number, got null"]
        );
    }

    #[test]
    fn optional_fields_accept_null() {
        assert!(balance_schema().validate(&json!({"balance": 1, "currencyCode": null})).is_empty());
    }

    #[test]
    fn currency_code_must_be_three_upper_letters() {
        assert_eq!(
            balance_schema().validate(&json!({"balance": 1, "currencyCode": "usd"})),
            vec!["`currencyCode` must be currency code/null, got string"]
        );
    }

    #[test]
    fn identifiers_may_be_integers_or_strings() {
        let schema = Schema::new([FieldRule::optional("id", id_types())]);
        assert!(schema.validate(&json!({"id": 5})).is_empty());
        assert!(schema.validate(&json!({"id": "a-5"})).is_empty());
        assert_eq!(schema.validate(&json!({"id": 1.5})), vec!["`id` must be integer/string/null, got number"]);
    }

    #[test]
    fn top_level_mismatch_is_a_single_violation() {
        assert_eq!(balance_schema().validate(&json!([1, 2])), vec!["expected object, got array"]);
        assert_eq!(Shape::List(balance_schema()).validate(&json!({})), vec!["expected array, got object"]);
    }

    #[test]
    fn nested_objects_use_dotted_paths() {
        let schema = Schema::new([FieldRule::optional(
            "teacher",
            [FieldType::Object(Schema::new([
                FieldRule::optional("id", id_types()),
                FieldRule::optional(
                    "language",
                    [FieldType::Object(Schema::new([FieldRule::optional("languageName", [FieldType::Text])]))],
                ),
            ]))],
        )]);

        let violations = schema.validate(&json!({
            "teacher": {"id": true, "language": {"languageName": 7}}
        }));
        assert_eq!(
            violations,
            vec![
                "`teacher.id` must be integer/string/null, got boolean",
                "`teacher.language.languageName` must be string/null, got number",
            ]
        );
    }

    #[test]
    fn list_items_are_indexed_and_all_reported() {
        let item = Schema::new([
            FieldRule::optional("transactionId", id_types()),
            FieldRule::optional("debit", [FieldType::Number]),
        ]);
        let violations = Shape::List(item).validate(&json!([
            {"transactionId": 1, "debit": "3.5"},
            {"transactionId": [], "debit": {}},
            "oops"
        ]));
        assert_eq!(
            violations,
            vec![
                "`[1].transactionId` must be integer/string/null, got array",
                "`[1].debit` must be number/null, got object",
                "`[2]`: expected object, got string",
            ]
        );
    }

    #[test]
    fn list_fields_check_each_item() {
        let schema = Schema::new([FieldRule::optional("tags", [FieldType::List(Box::new(FieldType::Text))])]);
        assert_eq!(
            schema.validate(&json!({"tags": ["a", 3, null]})),
            vec!["`tags[1]` must be string, got number"]
        );
    }
}
