//! Query validation
//!
//! The validator is the only way to obtain a [`ValidatedQuery`], so nothing
//! downstream ever renders SQL from an unchecked tree. Checks run depth-first
//! and stop at the first problem.

use crate::errors::QueryError;
use crate::query_builder::filter::{LogicalOperator, Operand, QueryCondition, QueryFilter, QueryOperator};
use serde_json::{Map, Value};
use type_mapping::{FieldDescriptor, TableSchema};

const ELEMENT_KEYS: [&str; 4] = ["field", "operator", "value", "reference"];

/// A query tree that passed validation against one schema
///
/// Literal values inside it are already normalized by their field kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery(QueryFilter);

impl ValidatedQuery {
    pub fn root(&self) -> &QueryFilter {
        &self.0
    }

    pub fn into_inner(self) -> QueryFilter {
        self.0
    }
}

pub struct QueryValidator<'a> {
    schema: &'a TableSchema,
}

impl<'a> QueryValidator<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self { schema }
    }

    /// Validate a query in its JSON wire form
    pub fn validate_json(&self, query: &Value) -> Result<ValidatedQuery, QueryError> {
        let result = match query {
            Value::Object(node) if is_list(node) => self.parse_list(node),
            _ => Err(QueryError::Malformed(
                "the root node must be an \"and\" or \"or\" list".to_string(),
            )),
        };

        result.map(ValidatedQuery).inspect_err(|err| {
            debug_log!("Rejected query on '{}': {}", self.schema.table_name(), err);
        })
    }

    /// Validate a tree assembled in code
    pub fn validate(&self, mut filter: QueryFilter) -> Result<ValidatedQuery, QueryError> {
        if !matches!(filter, QueryFilter::Group { .. }) {
            return Err(QueryError::Malformed(
                "the root node must be an \"and\" or \"or\" list".to_string(),
            ));
        }

        self.check_filter(&mut filter)
            .inspect_err(|err| {
                debug_log!("Rejected query on '{}': {}", self.schema.table_name(), err);
            })?;
        Ok(ValidatedQuery(filter))
    }

    fn parse_list(&self, node: &Map<String, Value>) -> Result<QueryFilter, QueryError> {
        let combinator = |key: &str| node.get(key).filter(|value| !value.is_null());
        let (operator, children) = match (combinator("and"), combinator("or")) {
            (Some(_), Some(_)) => {
                return Err(QueryError::Malformed(
                    "a list node cannot carry both \"and\" and \"or\"".to_string(),
                ));
            }
            (Some(children), None) => (LogicalOperator::And, children),
            (None, Some(children)) => (LogicalOperator::Or, children),
            (None, None) => {
                return Err(QueryError::Malformed(
                    "a list node needs an \"and\" or \"or\" key".to_string(),
                ));
            }
        };

        if let Some(key) = ELEMENT_KEYS.iter().find(|key| node.contains_key(**key)) {
            return Err(QueryError::Malformed(format!(
                "a list node cannot carry the element key \"{}\"",
                key
            )));
        }

        let Value::Array(children) = children else {
            return Err(QueryError::Malformed(format!(
                "\"{}\" must hold a list of nodes",
                operator.key()
            )));
        };

        let filters = children
            .iter()
            .map(|child| self.parse_node(child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryFilter::Group { operator, filters })
    }

    fn parse_node(&self, node: &Value) -> Result<QueryFilter, QueryError> {
        let Value::Object(node) = node else {
            return Err(QueryError::Malformed(format!(
                "list items must be objects, got {}",
                node
            )));
        };

        if is_list(node) {
            self.parse_list(node)
        } else {
            self.parse_element(node)
        }
    }

    fn parse_element(&self, node: &Map<String, Value>) -> Result<QueryFilter, QueryError> {
        let Some(Value::String(field)) = node.get("field") else {
            return Err(QueryError::Malformed(
                "an element needs a \"field\" name".to_string(),
            ));
        };
        let Some(Value::String(code)) = node.get("operator") else {
            return Err(QueryError::Malformed(format!(
                "the element on \"{}\" needs an \"operator\"",
                field
            )));
        };

        let descriptor = self
            .schema
            .field(field)
            .ok_or_else(|| QueryError::UnknownField(field.clone()))?;
        let operator = QueryOperator::from_code(code)
            .ok_or_else(|| QueryError::UnknownOperator(code.clone()))?;

        let value = node.get("value").filter(|value| !value.is_null());
        let reference = node.get("reference").filter(|value| !value.is_null());

        let operand = match (value, reference) {
            _ if operator.is_unary() => Operand::None,
            (Some(_), Some(_)) => {
                return Err(QueryError::Malformed(format!(
                    "the element on \"{}\" carries both a value and a reference",
                    field
                )));
            }
            (Some(value), None) => Operand::Value(value.clone()),
            (None, Some(Value::String(reference))) => Operand::Reference(reference.clone()),
            (None, Some(other)) => {
                return Err(QueryError::Malformed(format!(
                    "the reference on \"{}\" must be a field name, got {}",
                    field, other
                )));
            }
            (None, None) => Operand::None,
        };

        let mut condition = QueryCondition {
            field: field.clone(),
            operator,
            operand,
        };
        self.check_operand(descriptor, &mut condition)?;

        Ok(QueryFilter::Condition(condition))
    }

    fn check_filter(&self, filter: &mut QueryFilter) -> Result<(), QueryError> {
        match filter {
            QueryFilter::Group { filters, .. } => filters
                .iter_mut()
                .try_for_each(|child| self.check_filter(child)),
            QueryFilter::Condition(condition) => {
                let descriptor = self
                    .schema
                    .field(&condition.field)
                    .ok_or_else(|| QueryError::UnknownField(condition.field.clone()))?;
                self.check_operand(descriptor, condition)
            }
        }
    }

    /// Operand rules shared by the JSON and the typed entry points.
    /// Literal values are replaced by their normalized form.
    fn check_operand(
        &self,
        descriptor: &FieldDescriptor,
        condition: &mut QueryCondition,
    ) -> Result<(), QueryError> {
        if condition.operator.is_unary() {
            condition.operand = Operand::None;
            return Ok(());
        }

        match &mut condition.operand {
            Operand::None | Operand::Value(Value::Null) => Err(QueryError::MissingOperand {
                field: condition.field.clone(),
                operator: condition.operator.code().to_string(),
            }),
            Operand::Reference(reference) => {
                if self.schema.has_field(reference) {
                    Ok(())
                } else {
                    Err(QueryError::UnknownReference {
                        field: condition.field.clone(),
                        reference: reference.clone(),
                    })
                }
            }
            Operand::Value(Value::Array(items)) if condition.operator.accepts_list() => {
                for item in items.iter_mut() {
                    let original = item.clone();
                    if !descriptor.validate_value(item) {
                        return Err(QueryError::InvalidListElement {
                            field: condition.field.clone(),
                            value: original,
                        });
                    }
                }
                Ok(())
            }
            Operand::Value(value) => {
                let original = value.clone();
                if descriptor.validate_value(value) {
                    Ok(())
                } else {
                    Err(QueryError::InvalidValue {
                        field: condition.field.clone(),
                        value: original,
                    })
                }
            }
        }
    }
}

/// A node is a list when it carries a non-null `and` or `or` key
fn is_list(node: &Map<String, Value>) -> bool {
    ["and", "or"]
        .iter()
        .any(|key| node.get(*key).is_some_and(|value| !value.is_null()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> TableSchema {
        TableSchema::builder("users")
            .field(FieldDescriptor::int("id").unsigned().auto_increment())
            .field(FieldDescriptor::string("name").max_length(20, false))
            .field(FieldDescriptor::int("age").optional(None))
            .field(FieldDescriptor::string("status").options(["A", "B", "C"]))
            .field(FieldDescriptor::bool("active"))
            .build()
            .unwrap()
    }

    fn validate(query: Value) -> Result<ValidatedQuery, QueryError> {
        let schema = schema();
        QueryValidator::new(&schema).validate_json(&query)
    }

    #[test]
    fn test_valid_nested_query() {
        let validated = validate(json!({
            "and": [
                {"field": "age", "operator": "gte", "value": "18"},
                {"or": [
                    {"field": "status", "operator": "in", "value": ["A", "B"]},
                    {"field": "name", "operator": "ey"}
                ]}
            ]
        }))
        .unwrap();

        let expected = QueryFilter::and(vec![
            QueryFilter::gte("age", json!(18)),
            QueryFilter::or(vec![
                QueryFilter::in_values("status", vec![json!("A"), json!("B")]),
                QueryFilter::empty("name"),
            ]),
        ]);
        assert_eq!(validated.root(), &expected);
    }

    #[test]
    fn test_values_are_normalized() {
        let validated = validate(json!({
            "and": [{"field": "active", "operator": "eq", "value": true}]
        }))
        .unwrap();

        assert_eq!(
            validated.into_inner(),
            QueryFilter::and(vec![QueryFilter::eq("active", json!(1))])
        );
    }

    #[test]
    fn test_root_must_be_a_list() {
        let err = validate(json!({"field": "age", "operator": "eq", "value": 1})).unwrap_err();
        assert!(matches!(err, QueryError::Malformed(_)));

        assert!(matches!(validate(json!([])).unwrap_err(), QueryError::Malformed(_)));
        assert!(matches!(validate(json!("and")).unwrap_err(), QueryError::Malformed(_)));
    }

    #[test]
    fn test_list_shape_rules() {
        let mixed = validate(json!({"and": [], "or": []})).unwrap_err();
        assert!(matches!(mixed, QueryError::Malformed(_)));

        let with_field = validate(json!({"and": [], "field": "age"})).unwrap_err();
        assert!(matches!(with_field, QueryError::Malformed(_)));

        let not_array = validate(json!({"and": {"field": "age"}})).unwrap_err();
        assert!(matches!(not_array, QueryError::Malformed(_)));

        let scalar_child = validate(json!({"and": [42]})).unwrap_err();
        assert!(matches!(scalar_child, QueryError::Malformed(_)));

        let no_operator = validate(json!({"and": [{"field": "age"}]})).unwrap_err();
        assert!(matches!(no_operator, QueryError::Malformed(_)));
    }

    #[test]
    fn test_null_combinator_counts_as_absent() {
        let validated = validate(json!({
            "and": [{"field": "age", "operator": "gt", "value": 3}],
            "or": null
        }))
        .unwrap();
        assert!(matches!(
            validated.root(),
            QueryFilter::Group { operator: LogicalOperator::And, filters } if filters.len() == 1
        ));

        let nested = validate(json!({"or": [{"and": null, "or": []}]})).unwrap();
        assert_eq!(nested.root().condition_count(), 0);
    }

    #[test]
    fn test_empty_lists_are_valid() {
        assert!(validate(json!({"and": []})).is_ok());
        assert!(validate(json!({"or": [{"and": []}]})).is_ok());
    }

    #[test]
    fn test_unknown_field_and_operator() {
        assert_eq!(
            validate(json!({"and": [{"or": [{"field": "nope", "operator": "eq", "value": 1}]}]}))
                .unwrap_err(),
            QueryError::UnknownField("nope".to_string())
        );
        assert_eq!(
            validate(json!({"and": [{"field": "age", "operator": "like", "value": 1}]}))
                .unwrap_err(),
            QueryError::UnknownOperator("like".to_string())
        );
    }

    #[test]
    fn test_missing_operand() {
        let err = validate(json!({"and": [{"field": "age", "operator": "gt"}]})).unwrap_err();
        assert_eq!(
            err,
            QueryError::MissingOperand {
                field: "age".to_string(),
                operator: "gt".to_string()
            }
        );

        let null_value = validate(json!({"and": [{"field": "age", "operator": "gt", "value": null}]}));
        assert!(matches!(null_value, Err(QueryError::MissingOperand { .. })));
    }

    #[test]
    fn test_value_and_reference_together_is_malformed() {
        let err = validate(json!({
            "and": [{"field": "age", "operator": "eq", "value": 1, "reference": "id"}]
        }))
        .unwrap_err();
        assert!(matches!(err, QueryError::Malformed(_)));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            validate(json!({"and": [{"field": "age", "operator": "gt", "value": "abc"}]}))
                .unwrap_err(),
            QueryError::InvalidValue {
                field: "age".to_string(),
                value: json!("abc")
            }
        );

        assert!(matches!(
            validate(json!({"and": [{"field": "name", "operator": "eq", "value": "x".repeat(21)}]})),
            Err(QueryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_list_elements_validated_individually() {
        assert!(validate(json!({
            "or": [{"field": "status", "operator": "in", "value": ["A", "B", "C"]}]
        }))
        .is_ok());

        assert_eq!(
            validate(json!({
                "or": [{"field": "status", "operator": "nin", "value": ["A", "D"]}]
            }))
            .unwrap_err(),
            QueryError::InvalidListElement {
                field: "status".to_string(),
                value: json!("D")
            }
        );
    }

    #[test]
    fn test_array_value_for_scalar_operator_is_invalid() {
        let err = validate(json!({"and": [{"field": "age", "operator": "eq", "value": [1, 2]}]}))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }

    #[test]
    fn test_references() {
        assert!(validate(json!({
            "and": [{"field": "age", "operator": "lt", "reference": "id"}]
        }))
        .is_ok());

        // No kind cross-check between the field and its reference
        assert!(validate(json!({
            "and": [{"field": "name", "operator": "cv", "reference": "age"}]
        }))
        .is_ok());

        assert_eq!(
            validate(json!({"and": [{"field": "age", "operator": "lt", "reference": "missing"}]}))
                .unwrap_err(),
            QueryError::UnknownReference {
                field: "age".to_string(),
                reference: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_unary_operators_ignore_operands() {
        let validated = validate(json!({
            "and": [{"field": "age", "operator": "ney", "value": "not a number"}]
        }))
        .unwrap();
        assert_eq!(
            validated.into_inner(),
            QueryFilter::and(vec![QueryFilter::not_empty("age")])
        );
    }

    #[test]
    fn test_typed_entry_point() {
        let schema = schema();
        let validator = QueryValidator::new(&schema);

        assert!(validator
            .validate(QueryFilter::and(vec![QueryFilter::eq("age", json!(30))]))
            .is_ok());
        assert!(matches!(
            validator.validate(QueryFilter::eq("age", json!(30))),
            Err(QueryError::Malformed(_))
        ));
        assert_eq!(
            validator
                .validate(QueryFilter::or(vec![QueryFilter::eq("ghost", json!(1))]))
                .unwrap_err(),
            QueryError::UnknownField("ghost".to_string())
        );
        assert!(matches!(
            validator.validate(QueryFilter::and(vec![QueryFilter::eq("age", Value::Null)])),
            Err(QueryError::MissingOperand { .. })
        ));
    }
}
