//! Static registry of the tables the GUI can request.
//!
//! Each entry maps a table name to a runner that builds the table from the
//! record store for one request and immediately answers it. Columns, filters
//! and default order are declared here, explicitly per table, so nothing is
//! discovered at runtime.

use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::store::{DataStore, Package, Project, Recipe};
use crate::table::{Column, FilterAction, Table, TableError, TableFilter, TableParams, Value};

/// Context parameters handed down by the routing layer, scoping which base
/// collection a table queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableContext {
    pub project: Option<u32>,
}

type Runner =
    fn(&DataStore, TableContext, &TableParams, usize) -> Result<serde_json::Value, TableError>;

pub struct TableRegistry {
    tables: HashMap<&'static str, Runner>,
}

impl TableRegistry {
    pub fn new() -> Self {
        let mut tables: HashMap<&'static str, Runner> = HashMap::new();
        tables.insert("projects", run_projects);
        tables.insert("recipes", run_recipes);
        tables.insert("packages", run_packages);

        Self { tables }
    }

    pub fn run(
        &self,
        table: &str,
        store: &DataStore,
        ctx: TableContext,
        params: &TableParams,
        default_limit: usize,
    ) -> Result<serde_json::Value, TableError> {
        let runner = self
            .tables
            .get(table)
            .ok_or_else(|| TableError::UnknownTable(table.to_string()))?;

        runner(store, ctx, params, default_limit)
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the project scope or reports the not-found-equivalent error in
/// the body.
fn scoped_project(store: &DataStore, ctx: TableContext) -> Result<u32, TableError> {
    let pid = ctx.project.ok_or(TableError::MissingProject)?;
    store
        .project(pid)
        .map(|p| p.id)
        .ok_or(TableError::UnknownProject(pid))
}

fn run_projects(
    store: &DataStore,
    _ctx: TableContext,
    params: &TableParams,
    default_limit: usize,
) -> Result<serde_json::Value, TableError> {
    Table::new("projects")
        .column(Column {
            field_name: "name",
            orderable: true,
            filter_name: None,
            accessor: |p: &Project| Value::Text(p.name.clone()),
        })
        .column(Column {
            field_name: "created",
            orderable: true,
            filter_name: None,
            accessor: |p: &Project| Value::Date(p.created),
        })
        .column(Column {
            field_name: "updated",
            orderable: true,
            filter_name: None,
            accessor: |p: &Project| Value::Date(p.updated),
        })
        .default_orderby("-updated")
        .search_fields(&["name"])
        .rows(store.projects.clone())
        .respond(params, default_limit)
}

fn run_recipes(
    store: &DataStore,
    ctx: TableContext,
    params: &TableParams,
    default_limit: usize,
) -> Result<serde_json::Value, TableError> {
    let pid = scoped_project(store, ctx)?;

    Table::new("recipes")
        .column(Column {
            field_name: "name",
            orderable: true,
            filter_name: None,
            accessor: |r: &Recipe| Value::Text(r.name.clone()),
        })
        .column(Column {
            field_name: "version",
            orderable: true,
            filter_name: None,
            accessor: |r: &Recipe| Value::Text(r.version.clone()),
        })
        .column(Column {
            field_name: "description",
            orderable: false,
            filter_name: None,
            accessor: |r: &Recipe| Value::Text(r.description.clone()),
        })
        .column(Column {
            field_name: "section",
            orderable: true,
            filter_name: None,
            accessor: |r: &Recipe| Value::Text(r.section.clone()),
        })
        .column(Column {
            field_name: "license",
            orderable: true,
            filter_name: Some("license_filter"),
            accessor: |r: &Recipe| Value::Text(r.license.clone()),
        })
        .column(Column {
            field_name: "layer",
            orderable: true,
            filter_name: None,
            accessor: |r: &Recipe| Value::Text(r.layer.clone()),
        })
        .column(Column {
            field_name: "added",
            orderable: true,
            filter_name: Some("added_filter"),
            accessor: |r: &Recipe| Value::Date(r.added),
        })
        .filter(TableFilter {
            name: "license_filter",
            actions: vec![
                FilterAction {
                    action_name: "gpl",
                    predicate: |r: &Recipe| r.license.starts_with("GPL"),
                    counted: true,
                },
                FilterAction {
                    action_name: "mit",
                    predicate: |r: &Recipe| r.license == "MIT",
                    counted: true,
                },
                FilterAction {
                    action_name: "other",
                    predicate: |r: &Recipe| !r.license.starts_with("GPL") && r.license != "MIT",
                    counted: true,
                },
            ],
        })
        .filter(TableFilter {
            name: "added_filter",
            actions: vec![
                FilterAction {
                    action_name: "within_one_week",
                    predicate: |r: &Recipe| {
                        Utc::now().naive_utc() - r.added <= Duration::days(7)
                    },
                    counted: false,
                },
                FilterAction {
                    action_name: "within_one_month",
                    predicate: |r: &Recipe| {
                        Utc::now().naive_utc() - r.added <= Duration::days(30)
                    },
                    counted: false,
                },
            ],
        })
        .default_orderby("name")
        .search_fields(&["name", "description"])
        .rows(store.project_recipes(pid))
        .respond(params, default_limit)
}

fn run_packages(
    store: &DataStore,
    ctx: TableContext,
    params: &TableParams,
    default_limit: usize,
) -> Result<serde_json::Value, TableError> {
    let pid = scoped_project(store, ctx)?;

    Table::new("packages")
        .column(Column {
            field_name: "name",
            orderable: true,
            filter_name: None,
            accessor: |p: &Package| Value::Text(p.name.clone()),
        })
        .column(Column {
            field_name: "version",
            orderable: true,
            filter_name: None,
            accessor: |p: &Package| Value::Text(p.version.clone()),
        })
        .column(Column {
            field_name: "license",
            orderable: true,
            filter_name: Some("license_filter"),
            accessor: |p: &Package| Value::Text(p.license.clone()),
        })
        .column(Column {
            field_name: "size",
            orderable: true,
            filter_name: None,
            accessor: |p: &Package| Value::Int(p.size),
        })
        .filter(TableFilter {
            name: "license_filter",
            actions: vec![
                FilterAction {
                    action_name: "gpl",
                    predicate: |p: &Package| p.license.starts_with("GPL"),
                    counted: true,
                },
                FilterAction {
                    action_name: "not_gpl",
                    predicate: |p: &Package| !p.license.starts_with("GPL"),
                    counted: true,
                },
            ],
        })
        .default_orderby("name")
        .search_fields(&["name", "license"])
        .rows(store.project_packages(pid))
        .respond(params, default_limit)
}
