//! Generic sortable, filterable, searchable and paginated table.
//!
//! A [`Table`] is configured once per request with its columns, filters,
//! default order and base collection, then queried exactly once through
//! [`Table::respond`]. The engine never writes to the record store, it only
//! reorders and narrows its own copy of the base collection.

mod column;
mod filter;
mod params;

pub use column::{Column, Value};
pub use filter::{FilterAction, TableFilter};
pub use params::TableParams;

use serde_json::json;
use thiserror::Error;

/// Everything the table contract reports inside the JSON body. These never
/// become HTTP error statuses; the handler serializes them as
/// `{"error": "<message>", "rows": []}` under a 200.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("no such order field: {0}")]
    UnknownOrderField(String),

    #[error("field is not orderable: {0}")]
    NotOrderable(String),

    #[error("malformed filter parameter: {0}")]
    MalformedFilter(String),

    #[error("no such filter: {0}")]
    UnknownFilter(String),

    #[error("no such filter action: {filter}:{action}")]
    UnknownFilterAction { filter: String, action: String },

    #[error("invalid {field} value: {value}")]
    InvalidPagination {
        field: &'static str,
        value: String,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("filterinfo requires a name parameter")]
    MissingFilterName,

    #[error("no such table: {0}")]
    UnknownTable(String),

    #[error("table requires a project context")]
    MissingProject,

    #[error("no such project: {0}")]
    UnknownProject(u32),
}

pub struct Table<R> {
    name: &'static str,
    columns: Vec<Column<R>>,
    filters: Vec<TableFilter<R>>,
    default_orderby: Option<&'static str>,
    search_fields: Vec<&'static str>,
    rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            columns: Vec::new(),
            filters: Vec::new(),
            default_orderby: None,
            search_fields: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column<R>) -> Self {
        self.columns.push(column);
        self
    }

    pub fn filter(mut self, filter: TableFilter<R>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order applied when the request carries no `orderby`. A minus prefix
    /// means descending, same as the request parameter.
    pub fn default_orderby(mut self, field: &'static str) -> Self {
        self.default_orderby = Some(field);
        self
    }

    /// Fields matched by the `search` parameter.
    pub fn search_fields(mut self, fields: &[&'static str]) -> Self {
        self.search_fields = fields.to_vec();
        self
    }

    /// Hands the table its base collection for this request.
    pub fn rows(mut self, rows: Vec<R>) -> Self {
        self.rows = rows;
        self
    }

    /// Runs the one query of this table's lifetime and produces the JSON
    /// payload.
    pub fn respond(
        mut self,
        params: &TableParams,
        default_limit: usize,
    ) -> Result<serde_json::Value, TableError> {
        if let Some(cmd) = params.cmd.as_deref() {
            return match cmd {
                "filterinfo" => {
                    let name = params.name.as_deref().ok_or(TableError::MissingFilterName)?;
                    self.filter_info(name)
                }
                other => Err(TableError::UnknownCommand(other.to_string())),
            };
        }

        let (limit, page) = params.pagination(default_limit)?;

        if let Some(spec) = params.filter.as_deref() {
            self.apply_filter(spec)?;
        }
        if let Some(token) = params.search.as_deref() {
            self.apply_search(token);
        }
        self.apply_order(params.orderby.as_deref())?;

        Ok(self.page_payload(limit, page))
    }

    /// `cmd=filterinfo`: describes the named filter's actions and, where the
    /// result size is not data-dependent, the exact row count each action
    /// would yield on the current base collection.
    fn filter_info(&self, name: &str) -> Result<serde_json::Value, TableError> {
        let filter = self
            .filters
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| TableError::UnknownFilter(name.to_string()))?;

        let actions: Vec<serde_json::Value> = filter
            .actions
            .iter()
            .map(|action| {
                let count = action
                    .counted
                    .then(|| self.rows.iter().filter(|r| (action.predicate)(r)).count());
                json!({ "action_name": action.action_name, "count": count })
            })
            .collect();

        Ok(json!({
            "error": "ok",
            "name": filter.name,
            "filter_actions": actions,
        }))
    }

    fn apply_filter(&mut self, spec: &str) -> Result<(), TableError> {
        let Some((name, action_name)) = spec.split_once(':') else {
            return Err(TableError::MalformedFilter(spec.to_string()));
        };

        let filter = self
            .filters
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| TableError::UnknownFilter(name.to_string()))?;

        let action = filter
            .actions
            .iter()
            .find(|a| a.action_name == action_name)
            .ok_or_else(|| TableError::UnknownFilterAction {
                filter: name.to_string(),
                action: action_name.to_string(),
            })?;

        let predicate = action.predicate;
        self.rows.retain(|r| predicate(r));
        Ok(())
    }

    fn apply_search(&mut self, token: &str) {
        let token = token.to_lowercase();
        let accessors: Vec<fn(&R) -> Value> = self
            .columns
            .iter()
            .filter(|c| self.search_fields.contains(&c.field_name))
            .map(|c| c.accessor)
            .collect();

        self.rows.retain(|r| {
            accessors
                .iter()
                .any(|get| get(r).search_text().contains(&token))
        });
    }

    /// Stable sort by the requested field, or by the table's default order
    /// when the request has none. Insertion order is kept when neither is
    /// present.
    fn apply_order(&mut self, requested: Option<&str>) -> Result<(), TableError> {
        let Some(spec) = requested.or(self.default_orderby) else {
            return Ok(());
        };

        let (field, descending) = match spec.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (spec, false),
        };

        let column = self
            .columns
            .iter()
            .find(|c| c.field_name == field)
            .ok_or_else(|| TableError::UnknownOrderField(field.to_string()))?;

        // A table may declare its default order on a non-orderable column;
        // only client-requested ordering is restricted.
        if requested.is_some() && !column.orderable {
            return Err(TableError::NotOrderable(field.to_string()));
        }

        let accessor = column.accessor;
        if descending {
            self.rows.sort_by(|a, b| accessor(b).cmp(&accessor(a)));
        } else {
            self.rows.sort_by(|a, b| accessor(a).cmp(&accessor(b)));
        }

        Ok(())
    }

    fn page_payload(&self, limit: usize, page: usize) -> serde_json::Value {
        let total = self.rows.len();
        // An offset too large for usize is necessarily past the end of the
        // collection, which is an empty page, not an error.
        let offset = (page - 1).saturating_mul(limit);

        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .map(|r| self.row_object(r))
            .collect();

        let columns: Vec<serde_json::Value> = self
            .columns
            .iter()
            .map(|c| {
                json!({
                    "field_name": c.field_name,
                    "orderable": c.orderable,
                    "filter_name": c.filter_name,
                })
            })
            .collect();

        json!({
            "error": "ok",
            "name": self.name,
            "rows": rows,
            "total": total,
            "columns": columns,
            "default_orderby": self.default_orderby,
        })
    }

    /// One JSON object per record, one entry per declared field, read
    /// through the column's accessor.
    fn row_object(&self, record: &R) -> serde_json::Value {
        let mut object = serde_json::Map::with_capacity(self.columns.len());
        for column in &self.columns {
            object.insert(column.field_name.to_string(), (column.accessor)(record).to_json());
        }
        serde_json::Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Item {
        name: &'static str,
        version: &'static str,
        size: i64,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { name: "busybox", version: "2.0", size: 512 },
            Item { name: "avahi", version: "1.0", size: 176 },
            Item { name: "curl", version: "1.5", size: 176 },
        ]
    }

    fn table() -> Table<Item> {
        Table::new("items")
            .column(Column {
                field_name: "name",
                orderable: true,
                filter_name: None,
                accessor: |i: &Item| Value::Text(i.name.to_string()),
            })
            .column(Column {
                field_name: "version",
                orderable: true,
                filter_name: None,
                accessor: |i: &Item| Value::Text(i.version.to_string()),
            })
            .column(Column {
                field_name: "size",
                orderable: true,
                filter_name: Some("size_filter"),
                accessor: |i: &Item| Value::Int(i.size),
            })
            .column(Column {
                field_name: "notes",
                orderable: false,
                filter_name: None,
                accessor: |_: &Item| Value::Text(String::new()),
            })
            .filter(TableFilter {
                name: "size_filter",
                actions: vec![
                    FilterAction {
                        action_name: "small",
                        predicate: |i| i.size < 200,
                        counted: true,
                    },
                    FilterAction {
                        action_name: "large",
                        predicate: |i| i.size >= 200,
                        counted: true,
                    },
                    FilterAction {
                        action_name: "recent",
                        predicate: |_| true,
                        counted: false,
                    },
                ],
            })
            .default_orderby("name")
            .search_fields(&["name"])
            .rows(items())
    }

    fn names(payload: &serde_json::Value) -> Vec<String> {
        payload["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn default_order_applies_when_no_orderby() {
        let payload = table().respond(&TableParams::default(), 10).unwrap();

        assert_eq!(payload["error"], "ok");
        assert_eq!(names(&payload), ["avahi", "busybox", "curl"]);
        assert_eq!(payload["total"], 3);
        assert_eq!(payload["default_orderby"], "name");
    }

    #[test]
    fn payload_carries_column_metadata() {
        let payload = table().respond(&TableParams::default(), 10).unwrap();

        let columns = payload["columns"].as_array().unwrap();
        assert_eq!(columns.len(), 4);

        let size = columns.iter().find(|c| c["field_name"] == "size").unwrap();
        assert_eq!(size["orderable"], true);
        assert_eq!(size["filter_name"], "size_filter");

        let notes = columns.iter().find(|c| c["field_name"] == "notes").unwrap();
        assert_eq!(notes["orderable"], false);
        assert!(notes["filter_name"].is_null());
    }

    #[test]
    fn ascending_and_descending_are_reverses() {
        let asc = TableParams {
            orderby: Some("version".into()),
            ..Default::default()
        };
        let desc = TableParams {
            orderby: Some("-version".into()),
            ..Default::default()
        };

        let up = table().respond(&asc, 10).unwrap();
        let down = table().respond(&desc, 10).unwrap();

        assert_eq!(names(&up), ["avahi", "curl", "busybox"]);
        let mut reversed = names(&up);
        reversed.reverse();
        assert_eq!(names(&down), reversed);
        assert_ne!(names(&up)[0], names(&down)[0]);
    }

    #[test]
    fn two_versions_order_both_ways() {
        fn minimal() -> Table<Item> {
            Table::new("versions")
                .column(Column {
                    field_name: "version",
                    orderable: true,
                    filter_name: None,
                    accessor: |i: &Item| Value::Text(i.version.to_string()),
                })
                .rows(vec![
                    Item { name: "b", version: "2.0", size: 0 },
                    Item { name: "a", version: "1.0", size: 0 },
                ])
        }

        fn versions(payload: &serde_json::Value) -> Vec<String> {
            payload["rows"]
                .as_array()
                .unwrap()
                .iter()
                .map(|row| row["version"].as_str().unwrap().to_string())
                .collect()
        }

        let asc = TableParams {
            orderby: Some("version".into()),
            ..Default::default()
        };
        let desc = TableParams {
            orderby: Some("-version".into()),
            ..Default::default()
        };

        assert_eq!(versions(&minimal().respond(&asc, 10).unwrap()), ["1.0", "2.0"]);
        assert_eq!(versions(&minimal().respond(&desc, 10).unwrap()), ["2.0", "1.0"]);
    }

    #[test]
    fn numeric_order_is_numeric_not_lexicographic() {
        let params = TableParams {
            orderby: Some("size".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        let sizes: Vec<i64> = payload["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["size"].as_i64().unwrap())
            .collect();
        assert_eq!(sizes, [176, 176, 512]);
    }

    #[test]
    fn order_is_stable_for_ties() {
        // avahi and curl tie on size; insertion order must hold between them.
        let params = TableParams {
            orderby: Some("size".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        assert_eq!(names(&payload), ["avahi", "curl", "busybox"]);
    }

    #[test]
    fn unknown_order_field_is_rejected() {
        let params = TableParams {
            orderby: Some("bogus".into()),
            ..Default::default()
        };

        assert_eq!(
            table().respond(&params, 10),
            Err(TableError::UnknownOrderField("bogus".into()))
        );
    }

    #[test]
    fn non_orderable_field_is_rejected() {
        let params = TableParams {
            orderby: Some("notes".into()),
            ..Default::default()
        };

        assert_eq!(
            table().respond(&params, 10),
            Err(TableError::NotOrderable("notes".into()))
        );
    }

    #[test]
    fn filter_counts_match_filterinfo() {
        let info_params = TableParams {
            cmd: Some("filterinfo".into()),
            name: Some("size_filter".into()),
            ..Default::default()
        };
        let info = table().respond(&info_params, 10).unwrap();
        let actions = info["filter_actions"].as_array().unwrap();
        assert!(!actions.is_empty());

        for action in actions {
            let action_name = action["action_name"].as_str().unwrap();
            let filtered_params = TableParams {
                filter: Some(format!("size_filter:{action_name}")),
                ..Default::default()
            };
            let filtered = table().respond(&filtered_params, 10).unwrap();

            match action["count"].as_u64() {
                Some(count) => {
                    assert_eq!(filtered["rows"].as_array().unwrap().len() as u64, count)
                }
                // Data-dependent actions promise nothing.
                None => assert!(action["count"].is_null()),
            }
        }
    }

    #[test]
    fn uncounted_action_reports_null() {
        let params = TableParams {
            cmd: Some("filterinfo".into()),
            name: Some("size_filter".into()),
            ..Default::default()
        };
        let info = table().respond(&params, 10).unwrap();

        let recent = info["filter_actions"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["action_name"] == "recent")
            .unwrap();
        assert!(recent["count"].is_null());
    }

    #[test]
    fn filter_narrows_rows() {
        let params = TableParams {
            filter: Some("size_filter:small".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        assert_eq!(names(&payload), ["avahi", "curl"]);
        assert_eq!(payload["total"], 2);
    }

    #[test]
    fn filter_errors() {
        let malformed = TableParams {
            filter: Some("size_filter".into()),
            ..Default::default()
        };
        assert_eq!(
            table().respond(&malformed, 10),
            Err(TableError::MalformedFilter("size_filter".into()))
        );

        let unknown = TableParams {
            filter: Some("bogus:small".into()),
            ..Default::default()
        };
        assert_eq!(
            table().respond(&unknown, 10),
            Err(TableError::UnknownFilter("bogus".into()))
        );

        let bad_action = TableParams {
            filter: Some("size_filter:bogus".into()),
            ..Default::default()
        };
        assert_eq!(
            table().respond(&bad_action, 10),
            Err(TableError::UnknownFilterAction {
                filter: "size_filter".into(),
                action: "bogus".into(),
            })
        );
    }

    #[test]
    fn search_is_case_insensitive_contains() {
        let params = TableParams {
            search: Some("URL".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        assert_eq!(names(&payload), ["curl"]);
    }

    #[test]
    fn search_miss_is_empty_not_error() {
        let params = TableParams {
            search: Some("zzzz".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        assert_eq!(payload["error"], "ok");
        assert!(payload["rows"].as_array().unwrap().is_empty());
        assert_eq!(payload["total"], 0);
    }

    #[test]
    fn alphabet_search_finds_something() {
        let mut found = false;
        for letter in 'a'..='z' {
            let params = TableParams {
                search: Some(letter.to_string()),
                ..Default::default()
            };
            let payload = table().respond(&params, 10).unwrap();
            if !payload["rows"].as_array().unwrap().is_empty() {
                found = true;
                break;
            }
        }
        assert!(found);
    }

    #[test]
    fn pagination_pages_differ() {
        let page = |n: &str| TableParams {
            limit: Some("1".into()),
            page: Some(n.into()),
            ..Default::default()
        };

        let first = table().respond(&page("1"), 10).unwrap();
        let second = table().respond(&page("2"), 10).unwrap();

        assert_eq!(first["rows"].as_array().unwrap().len(), 1);
        assert_eq!(second["rows"].as_array().unwrap().len(), 1);
        assert_ne!(first["rows"][0], second["rows"][0]);
        // Total reflects the whole filtered collection, not the page.
        assert_eq!(first["total"], 3);
    }

    #[test]
    fn page_past_the_end_is_empty_not_error() {
        let params = TableParams {
            limit: Some("2".into()),
            page: Some("5".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        assert_eq!(payload["error"], "ok");
        assert!(payload["rows"].as_array().unwrap().is_empty());
    }

    #[test]
    fn huge_pagination_values_are_past_the_end_not_a_panic() {
        // Offsets beyond usize range still mean "past the end".
        let params = TableParams {
            limit: Some("4294967296".into()),
            page: Some("4294967297".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        assert_eq!(payload["error"], "ok");
        assert!(payload["rows"].as_array().unwrap().is_empty());
        assert_eq!(payload["total"], 3);
    }

    #[test]
    fn limit_caps_the_page() {
        let params = TableParams {
            limit: Some("2".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        assert_eq!(payload["rows"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn default_limit_applies_without_limit_param() {
        let payload = table().respond(&TableParams::default(), 2).unwrap();

        assert_eq!(payload["rows"].as_array().unwrap().len(), 2);
        assert_eq!(payload["total"], 3);
    }

    #[test]
    fn bad_pagination_values_are_rejected() {
        for (limit, page) in [
            (Some("0"), None),
            (Some("-1"), None),
            (Some("many"), None),
            (None, Some("0")),
            (None, Some("-2")),
            (None, Some("first")),
        ] {
            let params = TableParams {
                limit: limit.map(String::from),
                page: page.map(String::from),
                ..Default::default()
            };
            let err = table().respond(&params, 10).unwrap_err();
            assert!(matches!(err, TableError::InvalidPagination { .. }));
        }
    }

    #[test]
    fn filterinfo_errors() {
        let missing_name = TableParams {
            cmd: Some("filterinfo".into()),
            ..Default::default()
        };
        assert_eq!(
            table().respond(&missing_name, 10),
            Err(TableError::MissingFilterName)
        );

        let unknown = TableParams {
            cmd: Some("filterinfo".into()),
            name: Some("bogus".into()),
            ..Default::default()
        };
        assert_eq!(
            table().respond(&unknown, 10),
            Err(TableError::UnknownFilter("bogus".into()))
        );

        let bad_cmd = TableParams {
            cmd: Some("explode".into()),
            ..Default::default()
        };
        assert_eq!(
            table().respond(&bad_cmd, 10),
            Err(TableError::UnknownCommand("explode".into()))
        );
    }

    #[test]
    fn filter_applies_before_pagination() {
        let params = TableParams {
            filter: Some("size_filter:small".into()),
            limit: Some("1".into()),
            page: Some("2".into()),
            ..Default::default()
        };
        let payload = table().respond(&params, 10).unwrap();

        assert_eq!(names(&payload), ["curl"]);
        assert_eq!(payload["total"], 2);
    }
}
