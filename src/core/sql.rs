//! Parameterized SQL fragment builders
//!
//! Pure helpers that turn sparse inputs into a clause body plus the ordered
//! values to bind against its `$n` placeholders. Callers splice the clause
//! into their own statement and decide whether to prepend `WHERE`.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::ModelError;
use crate::services::SqlValue;

/// Raw filter criteria as received from a caller
pub type Criteria = BTreeMap<String, Value>;

/// A clause body and the values bound to its placeholders, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub clause: String,
    pub values: Vec<SqlValue>,
}

impl Fragment {
    /// Placeholder for the first parameter after this fragment's values
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }

    /// `WHERE <clause>`, or nothing when the clause is empty
    pub fn where_clause(&self) -> String {
        if self.clause.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clause)
        }
    }
}

/// Build a `SET` body for a partial update.
///
/// `data` holds only the fields being changed, in the order they should be
/// assigned. `columns` maps logical field names to column names; fields not
/// listed keep their own name.
///
/// ```text
/// [("firstName", "Aliya"), ("age", 32)] => "\"first_name\"=$1, \"age\"=$2"
/// ```
pub fn partial_update<K: AsRef<str>>(
    data: Vec<(K, SqlValue)>,
    columns: &[(&str, &str)],
) -> Result<Fragment, ModelError> {
    if data.is_empty() {
        return Err(ModelError::InvalidArgument("No data".to_string()));
    }

    let mut assignments = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());

    for (idx, (field, value)) in data.into_iter().enumerate() {
        let field = field.as_ref();
        let column = columns
            .iter()
            .find(|(logical, _)| *logical == field)
            .map_or(field, |(_, column)| *column);
        assignments.push(format!("\"{}\"={}", column, placeholder(idx)));
        values.push(value);
    }

    Ok(Fragment {
        clause: assignments.join(", "),
        values,
    })
}

/// Build a company search predicate.
///
/// Recognized keys, in clause order: `minEmployees`, `maxEmployees`, `name`.
/// A minimum above the maximum is not rejected; it simply matches nothing.
pub fn company_filter(criteria: &Criteria) -> Result<Fragment, ModelError> {
    ensure_known(criteria, &["minEmployees", "maxEmployees", "name"])?;

    let mut builder = PredicateBuilder::default();
    if let Some(min) = criteria.get("minEmployees") {
        builder.push("num_employees>=", integer("minEmployees", min)?);
    }
    if let Some(max) = criteria.get("maxEmployees") {
        builder.push("num_employees<=", integer("maxEmployees", max)?);
    }
    if let Some(name) = criteria.get("name") {
        builder.push("name ILIKE ", contains(&text("name", name)?));
    }
    Ok(builder.finish())
}

/// Build a job search predicate.
///
/// Recognized keys, in clause order: `title`, `minSalary`, `hasEquity`.
/// `hasEquity` only ever narrows: a false value adds no predicate at all
/// rather than selecting jobs without equity.
pub fn job_filter(criteria: &Criteria) -> Result<Fragment, ModelError> {
    ensure_known(criteria, &["title", "minSalary", "hasEquity"])?;

    let mut builder = PredicateBuilder::default();
    if let Some(title) = criteria.get("title") {
        builder.push("title ILIKE ", contains(&text("title", title)?));
    }
    if let Some(min) = criteria.get("minSalary") {
        builder.push("salary>=", integer("minSalary", min)?);
    }
    if let Some(flag) = criteria.get("hasEquity") {
        if truthy("hasEquity", flag)? {
            builder.push_literal("equity > 0");
        }
    }
    Ok(builder.finish())
}

#[derive(Default)]
struct PredicateBuilder {
    predicates: Vec<String>,
    values: Vec<SqlValue>,
}

impl PredicateBuilder {
    fn push(&mut self, lhs: &str, value: SqlValue) {
        self.predicates
            .push(format!("{}{}", lhs, placeholder(self.values.len())));
        self.values.push(value);
    }

    fn push_literal(&mut self, predicate: &str) {
        self.predicates.push(predicate.to_string());
    }

    fn finish(self) -> Fragment {
        Fragment {
            clause: self.predicates.join(" AND "),
            values: self.values,
        }
    }
}

fn placeholder(idx: usize) -> String {
    format!("${}", idx + 1)
}

fn ensure_known(criteria: &Criteria, allowed: &[&str]) -> Result<(), ModelError> {
    if criteria.is_empty() {
        return Err(ModelError::InvalidArgument(
            "No filtering criteria".to_string(),
        ));
    }
    match criteria.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(ModelError::InvalidArgument(format!(
            "Unknown filter: {}",
            key
        ))),
        None => Ok(()),
    }
}

fn integer(key: &str, value: &Value) -> Result<SqlValue, ModelError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .map(SqlValue::Int)
        .ok_or_else(|| ModelError::InvalidArgument(format!("{} must be an integer", key)))
}

fn text(key: &str, value: &Value) -> Result<String, ModelError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ModelError::InvalidArgument(format!(
            "{} must be a string",
            key
        ))),
    }
}

fn contains(needle: &str) -> SqlValue {
    SqlValue::Text(format!("%{}%", needle))
}

fn truthy(key: &str, value: &Value) -> Result<bool, ModelError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(ModelError::InvalidArgument(format!(
                "{} must be a boolean",
                key
            ))),
        },
        _ => Err(ModelError::InvalidArgument(format!(
            "{} must be a boolean",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn criteria(value: Value) -> Criteria {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_partial_update_maps_columns_in_order() {
        let fragment = partial_update(
            vec![
                ("firstName", SqlValue::from("Aliya")),
                ("age", SqlValue::from(32)),
            ],
            &[("firstName", "first_name")],
        )
        .unwrap();

        assert_eq!(fragment.clause, "\"first_name\"=$1, \"age\"=$2");
        assert_eq!(fragment.values, vec![SqlValue::from("Aliya"), SqlValue::Int(32)]);
        assert_eq!(fragment.next_placeholder(), "$3");
    }

    #[test]
    fn test_partial_update_rejects_empty_data() {
        let result = partial_update(Vec::<(&str, SqlValue)>::new(), &[]);
        assert!(matches!(result, Err(ModelError::InvalidArgument(_))));
    }

    #[test]
    fn test_company_filter_min_only() {
        let fragment = company_filter(&criteria(json!({"minEmployees": 10}))).unwrap();
        assert_eq!(fragment.clause, "num_employees>=$1");
        assert_eq!(fragment.values, vec![SqlValue::Int(10)]);
    }

    #[test]
    fn test_company_filter_min_and_max() {
        let fragment =
            company_filter(&criteria(json!({"maxEmployees": "100", "minEmployees": "10"})))
                .unwrap();
        assert_eq!(fragment.clause, "num_employees>=$1 AND num_employees<=$2");
        assert_eq!(fragment.values, vec![SqlValue::Int(10), SqlValue::Int(100)]);
    }

    #[test]
    fn test_company_filter_name() {
        let fragment = company_filter(&criteria(json!({"name": "ok"}))).unwrap();
        assert_eq!(fragment.clause, "name ILIKE $1");
        assert_eq!(fragment.values, vec![SqlValue::from("%ok%")]);
        assert_eq!(fragment.where_clause(), "WHERE name ILIKE $1");
    }

    #[test]
    fn test_company_filter_min_above_max_is_permissive() {
        let fragment =
            company_filter(&criteria(json!({"minEmployees": 500, "maxEmployees": 5}))).unwrap();
        assert_eq!(fragment.values, vec![SqlValue::Int(500), SqlValue::Int(5)]);
    }

    #[test]
    fn test_company_filter_rejects_empty_and_malformed() {
        assert!(matches!(
            company_filter(&Criteria::new()),
            Err(ModelError::InvalidArgument(_))
        ));
        assert!(matches!(
            company_filter(&criteria(json!({"minEmployees": "lots"}))),
            Err(ModelError::InvalidArgument(_))
        ));
        assert!(matches!(
            company_filter(&criteria(json!({"title": "dev"}))),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_job_filter_all_keys() {
        let fragment = job_filter(&criteria(
            json!({"hasEquity": "true", "minSalary": 100, "title": "dev"}),
        ))
        .unwrap();
        assert_eq!(fragment.clause, "title ILIKE $1 AND salary>=$2 AND equity > 0");
        assert_eq!(fragment.values, vec![SqlValue::from("%dev%"), SqlValue::Int(100)]);
    }

    #[test]
    fn test_job_filter_false_equity_is_no_filter() {
        let fragment = job_filter(&criteria(json!({"hasEquity": false}))).unwrap();
        assert!(fragment.clause.is_empty());
        assert!(fragment.values.is_empty());
        assert_eq!(fragment.where_clause(), "");
    }

    #[test]
    fn test_job_filter_numbering_skips_absent_keys() {
        let fragment =
            job_filter(&criteria(json!({"minSalary": "2000", "hasEquity": "false"}))).unwrap();
        assert_eq!(fragment.clause, "salary>=$1");
        assert_eq!(fragment.values, vec![SqlValue::Int(2000)]);
    }

    #[test]
    fn test_job_filter_rejects_company_keys() {
        assert!(matches!(
            job_filter(&criteria(json!({"minEmployees": 3}))),
            Err(ModelError::InvalidArgument(_))
        ));
    }
}
