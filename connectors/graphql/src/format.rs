//! Tabular normalization of query responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A query response shaped for the result grid.
///
/// Built from the first top-level field of `data` in server key order. When
/// that field is `null`, or `data` has no fields, only `query` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Rows, each in `columns` order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Vec<Value>>>,
    /// The raw field value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
    /// The query text as sent.
    pub query: String,
}

impl QueryResult {
    /// A result carrying only the query text.
    #[must_use]
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            columns: None,
            values: None,
            object: None,
            query: query.into(),
        }
    }

    /// Normalize response `data` for `query`.
    #[must_use]
    pub fn from_data(query: impl Into<String>, data: &Value) -> Self {
        let mut result = Self::empty(query);
        let Some((field, value)) = data.as_object().and_then(|map| map.iter().next()) else {
            return result;
        };

        let (columns, values) = match value {
            Value::Null => return result,
            Value::Array(items) => tabulate_list(field, items),
            Value::Object(map) => (
                map.keys().cloned().collect(),
                vec![map.values().cloned().collect()],
            ),
            scalar => (vec![field.clone()], vec![vec![scalar.clone()]]),
        };

        result.columns = Some(columns);
        result.values = Some(values);
        result.object = Some(value.clone());
        result
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.values.as_ref().map_or(0, Vec::len)
    }
}

/// Columns come from the first element. Later elements missing a column
/// get `null` in that cell; keys the first element lacks are dropped.
fn tabulate_list(field: &str, items: &[Value]) -> (Vec<String>, Vec<Vec<Value>>) {
    let Some(first) = items.first() else {
        return (Vec::new(), Vec::new());
    };

    match first {
        Value::Object(head) => {
            let columns: Vec<String> = head.keys().cloned().collect();
            let rows = items
                .iter()
                .map(|item| row(&columns, item.as_object()))
                .collect();
            (columns, rows)
        }
        _ => (
            vec![field.to_string()],
            items.iter().map(|item| vec![item.clone()]).collect(),
        ),
    }
}

fn row(columns: &[String], item: Option<&Map<String, Value>>) -> Vec<Value> {
    columns
        .iter()
        .map(|column| {
            item.and_then(|map| map.get(column))
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_of_objects_becomes_rows() {
        let data = json!({"foo": [{"a": 1, "b": 2}, {"a": 3, "b": 4}]});
        let result = QueryResult::from_data("{ foo { a b } }", &data);

        assert_eq!(result.columns, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(result.values, Some(vec![vec![json!(1), json!(2)], vec![json!(3), json!(4)]]));
        assert_eq!(result.object, Some(data["foo"].clone()));
        assert_eq!(result.query, "{ foo { a b } }");
    }

    #[test]
    fn object_becomes_single_row() {
        let data = json!({"foo": {"a": 1, "b": 2}});
        let result = QueryResult::from_data("q", &data);

        assert_eq!(result.columns, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(result.values, Some(vec![vec![json!(1), json!(2)]]));
        assert_eq!(result.row_count(), 1);
    }

    #[test]
    fn null_field_keeps_only_query() {
        let result = QueryResult::from_data("q", &json!({"foo": null}));
        assert_eq!(result, QueryResult::empty("q"));
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"query": "q"}));
    }

    #[test]
    fn empty_data_keeps_only_query() {
        assert_eq!(QueryResult::from_data("q", &json!({})), QueryResult::empty("q"));
        assert_eq!(QueryResult::from_data("q", &Value::Null), QueryResult::empty("q"));
    }

    #[test]
    fn only_first_field_is_used() {
        let data = json!({"second": {"x": 1}, "first": {"y": 2}});
        let result = QueryResult::from_data("q", &data);
        assert_eq!(result.columns, Some(vec!["x".to_string()]));
    }

    #[test]
    fn ragged_rows_follow_first_element_columns() {
        let data = json!({"foo": [{"a": 1, "b": 2}, {"b": 4, "c": 5}, 7]});
        let result = QueryResult::from_data("q", &data);

        assert_eq!(result.columns, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(
            result.values,
            Some(vec![
                vec![json!(1), json!(2)],
                vec![Value::Null, json!(4)],
                vec![Value::Null, Value::Null],
            ])
        );
    }

    #[test]
    fn empty_list_has_no_columns() {
        let result = QueryResult::from_data("q", &json!({"foo": []}));
        assert_eq!(result.columns, Some(Vec::new()));
        assert_eq!(result.values, Some(Vec::new()));
        assert_eq!(result.object, Some(json!([])));
    }

    #[test]
    fn scalars_use_the_field_name_as_column() {
        let result = QueryResult::from_data("q", &json!({"count": 3}));
        assert_eq!(result.columns, Some(vec!["count".to_string()]));
        assert_eq!(result.values, Some(vec![vec![json!(3)]]));

        let result = QueryResult::from_data("q", &json!({"names": ["a", "b"]}));
        assert_eq!(result.columns, Some(vec!["names".to_string()]));
        assert_eq!(result.values, Some(vec![vec![json!("a")], vec![json!("b")]]));
    }
}
