// Attribute filter of a batch. All predicates have to hold, there is no OR.
// The result lists indices into the batch in ingestion order,
// or in the sort order when one is given.
// No predicates means no match at all: an empty query clears the highlighting
// instead of selecting everything.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

use crate::kernel_out::Solid;
use crate::tags::{Attribute, TagValue, Tags};

/// The value side of a predicate, a text or a number.
pub type FilterValue = TagValue;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    /// `=` and `==`
    Equal,
    Contains,
    /// Never matches.
    Unknown(String),
}

impl FilterOperator {
    pub fn parse(text: &str) -> Self {
        match text {
            ">" => FilterOperator::Greater,
            "<" => FilterOperator::Less,
            ">=" => FilterOperator::GreaterOrEqual,
            "<=" => FilterOperator::LessOrEqual,
            "=" | "==" => FilterOperator::Equal,
            "contains" => FilterOperator::Contains,
            _ => FilterOperator::Unknown(text.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Greater => ">",
            FilterOperator::Less => "<",
            FilterOperator::GreaterOrEqual => ">=",
            FilterOperator::LessOrEqual => "<=",
            FilterOperator::Equal => "=",
            FilterOperator::Contains => "contains",
            FilterOperator::Unknown(text) => text,
        }
    }
}

impl From<String> for FilterOperator {
    fn from(text: String) -> Self {
        FilterOperator::parse(&text)
    }
}

impl From<FilterOperator> for String {
    fn from(operator: FilterOperator) -> Self {
        operator.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub attribute: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterPredicate {
    pub fn new(attribute: &str, operator: &str, value: impl Into<FilterValue>) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator: FilterOperator::parse(operator),
            value: value.into(),
        }
    }

    /// A missing attribute or an unreadable number fails the predicate.
    pub fn matches(&self, tags: &Tags) -> bool {
        let Some(value) = tags.attribute(Attribute::parse(&self.attribute)) else {
            return false;
        };

        let numbers = || Some((value.leading_number()?, self.value.leading_number()?));
        match self.operator {
            FilterOperator::Greater => numbers().is_some_and(|(tag, filter)| tag > filter),
            FilterOperator::Less => numbers().is_some_and(|(tag, filter)| tag < filter),
            FilterOperator::GreaterOrEqual => numbers().is_some_and(|(tag, filter)| tag >= filter),
            FilterOperator::LessOrEqual => numbers().is_some_and(|(tag, filter)| tag <= filter),
            FilterOperator::Equal => {
                value.loose_eq(&self.value) || value.to_lowercase() == self.value.to_lowercase()
            }
            FilterOperator::Contains => value
                .to_lowercase()
                .contains(self.value.to_lowercase().as_str()),
            FilterOperator::Unknown(_) => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

// Anything but "asc" sorts descending. A null or empty order is the default.
impl From<Option<String>> for SortOrder {
    fn from(text: Option<String>) -> Self {
        match text.as_deref() {
            None | Some("") | Some("asc") => SortOrder::Asc,
            Some(_) => SortOrder::Desc,
        }
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => "asc".to_string(),
            SortOrder::Desc => "desc".to_string(),
        }
    }
}

/// What the translation of a free text question delivers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    #[serde(rename = "filters", default)]
    pub predicates: Vec<FilterPredicate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl FilterQuery {
    pub fn new(predicates: Vec<FilterPredicate>) -> Self {
        Self {
            predicates,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, attribute: &str, order: SortOrder) -> Self {
        self.sort_by = Some(attribute.to_string());
        self.sort_order = order;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilterResult {
    pub indices: Vec<usize>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Anything the filter can read tags from.
pub trait Tagged {
    fn tags(&self) -> &Tags;
}

impl Tagged for Solid {
    fn tags(&self) -> &Tags {
        Solid::tags(self)
    }
}

impl Tagged for Tags {
    fn tags(&self) -> &Tags {
        self
    }
}

// Numbers before texts, so any mix of keys still sorts in a total order
#[derive(Clone, Debug, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of(value: Option<&TagValue>) -> Self {
        match value.and_then(TagValue::whole_number) {
            Some(number) => SortKey::Number(number),
            None => SortKey::Text(value.map(TagValue::to_lowercase).unwrap_or_default()),
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

pub fn evaluate<T: Tagged>(items: &[T], query: &FilterQuery) -> FilterResult {
    if query.predicates.is_empty() {
        return FilterResult {
            explanation: query.explanation.clone(),
            ..FilterResult::default()
        };
    }

    let mut indices: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            query
                .predicates
                .iter()
                .all(|predicate| predicate.matches(item.tags()))
        })
        .map(|(index, _)| index)
        .collect();

    if let Some(sort_by) = &query.sort_by {
        // the sort key is read as it is, without the alias keys
        let mut keyed: Vec<(usize, SortKey)> = indices
            .iter()
            .map(|index| (*index, SortKey::of(items[*index].tags().get(sort_by))))
            .collect();
        // stable: equal keys keep the ingestion order in both directions
        keyed.sort_by(|(_, a), (_, b)| match query.sort_order {
            SortOrder::Asc => a.compare(b),
            SortOrder::Desc => b.compare(a),
        });
        indices = keyed.into_iter().map(|(index, _)| index).collect();
    }

    debug!(
        "Filter with {} predicates matched {} of {}",
        query.predicates.len(),
        indices.len(),
        items.len()
    );

    FilterResult {
        count: indices.len(),
        indices,
        explanation: query.explanation.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs.iter().map(|(key, value)| (*key, *value)).collect()
    }

    fn heights(values: &[&str]) -> Vec<Tags> {
        values
            .iter()
            .map(|height| tags(&[("building", "yes"), ("height", height)]))
            .collect()
    }

    #[test]
    fn no_predicates_no_matches() {
        let items = heights(&["10", "35", "50"]);
        let result = evaluate(&items, &FilterQuery::default());
        assert!(result.indices.is_empty());
        assert_eq!(result.count, 0);

        let query = FilterQuery::default().sorted_by("height", SortOrder::Desc);
        assert_eq!(evaluate(&items, &query).count, 0);
    }

    #[test]
    fn greater_than_keeps_ingestion_order() {
        let items = heights(&["10", "35", "50"]);
        let query = FilterQuery::new(vec![FilterPredicate::new("height", ">", 30.0)]);
        let result = evaluate(&items, &query);
        assert_eq!(result.indices, vec![1, 2]);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn equality_ignores_case() {
        let items = vec![tags(&[("building", "commercial")]), tags(&[("building", "house")])];
        let query = FilterQuery::new(vec![FilterPredicate::new("building", "=", "Commercial")]);
        assert_eq!(evaluate(&items, &query).indices, vec![0]);

        let query = FilterQuery::new(vec![FilterPredicate::new("building", "==", "HOUSE")]);
        assert_eq!(evaluate(&items, &query).indices, vec![1]);
    }

    #[test]
    fn equality_across_numbers_and_texts() {
        let items = vec![tags(&[("building:levels", "3")]), tags(&[("building:levels", "3.0")])];
        let query = FilterQuery::new(vec![FilterPredicate::new("building:levels", "=", 3.0)]);
        assert_eq!(evaluate(&items, &query).indices, vec![0, 1]);
    }

    #[test]
    fn sorted_descending() {
        let items = heights(&["10", "50", "30"]);
        let query = FilterQuery::new(vec![FilterPredicate::new("height", ">", 0.0)])
            .sorted_by("height", SortOrder::Desc);
        assert_eq!(evaluate(&items, &query).indices, vec![1, 2, 0]);
    }

    #[test]
    fn sorted_ascending_is_stable() {
        let items = heights(&["20", "10", "20", "5"]);
        let query = FilterQuery::new(vec![FilterPredicate::new("height", ">=", 0.0)])
            .sorted_by("height", SortOrder::Asc);
        assert_eq!(evaluate(&items, &query).indices, vec![3, 1, 0, 2]);

        let query = query.sorted_by("height", SortOrder::Desc);
        assert_eq!(evaluate(&items, &query).indices, vec![0, 2, 1, 3]);
    }

    #[test]
    fn sorted_by_text_without_case() {
        let items = vec![
            tags(&[("building", "yes"), ("name", "bravo")]),
            tags(&[("building", "yes"), ("name", "Alpha")]),
            tags(&[("building", "yes")]),
        ];
        let query = FilterQuery::new(vec![FilterPredicate::new("building", "=", "yes")])
            .sorted_by("name", SortOrder::Asc);
        // a missing name sorts as an empty text
        assert_eq!(evaluate(&items, &query).indices, vec![2, 1, 0]);
    }

    #[test]
    fn all_predicates_must_hold() {
        let items = vec![
            tags(&[("building", "office"), ("height", "40")]),
            tags(&[("building", "office"), ("height", "10")]),
            tags(&[("building", "house"), ("height", "40")]),
        ];
        let query = FilterQuery::new(vec![
            FilterPredicate::new("building", "=", "office"),
            FilterPredicate::new("height", ">=", "40"),
        ]);
        assert_eq!(evaluate(&items, &query).indices, vec![0]);
    }

    #[test]
    fn missing_attribute_or_number_excludes() {
        let items = vec![
            tags(&[("building", "yes")]),
            tags(&[("building", "yes"), ("height", "tall")]),
            tags(&[("building", "yes"), ("height", "12 m")]),
        ];
        let query = FilterQuery::new(vec![FilterPredicate::new("height", "<", 20.0)]);
        assert_eq!(evaluate(&items, &query).indices, vec![2]);

        let query = FilterQuery::new(vec![FilterPredicate::new("height", "<", "low")]);
        assert!(evaluate(&items, &query).indices.is_empty());
    }

    #[test]
    fn unknown_operator_excludes() {
        let items = heights(&["10"]);
        let query = FilterQuery::new(vec![FilterPredicate::new("height", "!=", 5.0)]);
        assert!(evaluate(&items, &query).indices.is_empty());
    }

    #[test]
    fn contains_ignores_case() {
        let items = vec![
            tags(&[("name", "Calgary Tower")]),
            tags(&[("name", "Bow Building")]),
        ];
        let query = FilterQuery::new(vec![FilterPredicate::new("name", "contains", "TOWER")]);
        assert_eq!(evaluate(&items, &query).indices, vec![0]);
    }

    #[test]
    fn alias_attributes() {
        let items = vec![
            tags(&[("levels", "12")]),
            tags(&[("type", "commercial")]),
        ];
        let query = FilterQuery::new(vec![FilterPredicate::new("building:levels", ">", 10.0)]);
        assert_eq!(evaluate(&items, &query).indices, vec![0]);

        let query = FilterQuery::new(vec![FilterPredicate::new("building", "=", "commercial")]);
        assert_eq!(evaluate(&items, &query).indices, vec![1]);
    }

    #[test]
    fn query_from_translation_json() {
        let query: FilterQuery = serde_json::from_str(
            r#"{
                "filters": [
                    {"attribute": "height", "operator": ">", "value": 100},
                    {"attribute": "building", "operator": "contains", "value": "office"}
                ],
                "explanation": "Tall office buildings",
                "sortBy": "height",
                "sortOrder": "desc"
            }"#,
        )
        .unwrap();

        assert_eq!(query.predicates.len(), 2);
        assert_eq!(query.predicates[0].operator, FilterOperator::Greater);
        assert_eq!(query.predicates[0].value, FilterValue::Number(100.0));
        assert_eq!(query.predicates[1].value, FilterValue::Text("office".into()));
        assert_eq!(query.sort_by.as_deref(), Some("height"));
        assert_eq!(query.sort_order, SortOrder::Desc);

        let items = vec![tags(&[("building", "office"), ("height", "120")])];
        let result = evaluate(&items, &query);
        assert_eq!(result.indices, vec![0]);
        assert_eq!(result.explanation.as_deref(), Some("Tall office buildings"));
    }

    #[test]
    fn sort_order_defaults() {
        let query: FilterQuery = serde_json::from_str(r#"{"filters": []}"#).unwrap();
        assert_eq!(query.sort_order, SortOrder::Asc);
        assert_eq!(SortOrder::from(Some("descending".to_string())), SortOrder::Desc);
        assert_eq!(SortOrder::from(Some(String::new())), SortOrder::Asc);
    }

    #[test]
    fn null_sort_fields_keep_the_defaults() {
        let query: FilterQuery = serde_json::from_str(
            r#"{"filters": [{"attribute": "height", "operator": ">", "value": 0}],
                "sortBy": null, "sortOrder": null}"#,
        )
        .unwrap();
        assert_eq!(query.sort_by, None);
        assert_eq!(query.sort_order, SortOrder::Asc);

        let items = heights(&["10", "35"]);
        assert_eq!(evaluate(&items, &query).indices, vec![0, 1]);
    }

    #[test]
    fn sort_order_is_case_sensitive() {
        assert_eq!(SortOrder::from(Some("asc".to_string())), SortOrder::Asc);
        assert_eq!(SortOrder::from(Some("ASC".to_string())), SortOrder::Desc);
        assert_eq!(SortOrder::from(None), SortOrder::Asc);
    }
}
