use serde::Deserialize;

use super::TableError;

/// Raw query parameters of a table request.
///
/// Everything is kept as an optional string and validated inside the table
/// engine, so that a bad value (say `limit=-1`) lands in the JSON body as an
/// `error` field instead of bouncing at the extractor with a 400.
#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    pub format: Option<String>,
    /// Accepted for interface compatibility. Tables are rebuilt per request,
    /// nothing is cached, so there is nothing for it to bypass.
    pub nocache: Option<String>,
    pub orderby: Option<String>,
    pub search: Option<String>,
    pub filter: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub cmd: Option<String>,
    pub name: Option<String>,
}

impl TableParams {
    pub fn wants_json(&self) -> bool {
        matches!(self.format.as_deref(), Some("json"))
    }

    /// Resolves `limit` and `page` to concrete values, 1-based page.
    pub(crate) fn pagination(&self, default_limit: usize) -> Result<(usize, usize), TableError> {
        let limit = match &self.limit {
            None => default_limit,
            Some(raw) => parse_positive(raw, "limit")?,
        };
        let page = match &self.page {
            None => 1,
            Some(raw) => parse_positive(raw, "page")?,
        };

        Ok((limit, page))
    }
}

fn parse_positive(raw: &str, field: &'static str) -> Result<usize, TableError> {
    match raw.parse::<i64>() {
        Ok(v) if v > 0 => Ok(v as usize),
        _ => Err(TableError::InvalidPagination {
            field,
            value: raw.to_string(),
        }),
    }
}
