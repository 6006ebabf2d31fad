//! BTQL query construction for log retrieval

use std::fmt;

use serde_json::{Map, Value};

use super::predicate::{quote_literal, render_conjunction, Field, FilterOperator, Literal, Operand, Predicate};
use super::QueryError;

/// Fields selected by `fetch_logs`
pub const LOG_FIELDS: &[&str] = &[
    "input",
    "output",
    "metadata.model",
    "metadata.userID",
    "created",
    "id",
    "span_attributes.name",
];

/// How results are restricted by model name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelFilter {
    /// No model restriction
    #[default]
    None,
    /// Model name contains the substring
    Contains(String),
    /// Model name is present and does not contain the substring
    Excludes(String),
}

impl ModelFilter {
    /// Interpret the tool-level filter string.
    ///
    /// `"NOT <s>"` excludes `<s>`; any other non-empty string is a substring match.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return ModelFilter::None;
        };

        match raw.strip_prefix("NOT ") {
            Some(rest) if !rest.trim().is_empty() => ModelFilter::Excludes(rest.trim().to_string()),
            _ => ModelFilter::Contains(raw.to_string()),
        }
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let field = Field::known("metadata.model");
        match self {
            ModelFilter::None => vec![],
            ModelFilter::Contains(needle) => vec![Predicate::contains(field, needle)],
            ModelFilter::Excludes(needle) => vec![
                Predicate::not_contains(field.clone(), needle),
                Predicate::IsNotNull(field),
            ],
        }
    }
}

/// A complete BTQL query: source, projection, filter and limit
#[derive(Debug, Clone, PartialEq)]
pub struct BtqlQuery {
    pub project_id: String,
    pub select: Vec<String>,
    pub filter: Vec<Predicate>,
    pub limit: usize,
}

impl BtqlQuery {
    pub fn new(project_id: impl Into<String>, limit: usize) -> Self {
        Self {
            project_id: project_id.into(),
            select: vec![],
            filter: vec![],
            limit,
        }
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter.push(predicate);
        self
    }

    pub fn filters(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.filter.extend(predicates);
        self
    }
}

/// `from: project_logs('<id>')`
pub fn source_clause(project_id: &str) -> String {
    format!("from: project_logs({})", quote_literal(project_id))
}

impl fmt::Display for BtqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", source_clause(&self.project_id))?;
        if self.select.is_empty() {
            writeln!(f, "select: *")?;
        } else {
            writeln!(f, "select: {}", self.select.join(", "))?;
        }
        if !self.filter.is_empty() {
            writeln!(f, "filter: {}", render_conjunction(&self.filter))?;
        }
        write!(f, "limit: {}", self.limit)
    }
}

/// Resolved parameters of a `fetch_logs` request
#[derive(Debug, Clone, PartialEq)]
pub struct FetchLogsQuery {
    pub model_filter: ModelFilter,
    pub hours_back: u32,
    pub exclude_first_hours: u32,
    pub span_name_filter: String,
    pub additional_filters: Map<String, Value>,
    pub limit: usize,
}

impl Default for FetchLogsQuery {
    fn default() -> Self {
        Self {
            model_filter: ModelFilter::None,
            hours_back: 48,
            exclude_first_hours: 1,
            span_name_filter: "chat".to_string(),
            additional_filters: Map::new(),
            limit: 150,
        }
    }
}

impl FetchLogsQuery {
    /// Base predicates, then model predicates, then additional equality filters
    pub fn predicates(&self) -> Result<Vec<Predicate>, QueryError> {
        let mut predicates = vec![
            Predicate::contains(Field::known("span_attributes.name"), &self.span_name_filter),
            Predicate::compare(
                Field::known("created"),
                FilterOperator::Lt,
                Operand::HoursAgo(self.exclude_first_hours),
            ),
            Predicate::compare(
                Field::known("created"),
                FilterOperator::Gt,
                Operand::HoursAgo(self.hours_back),
            ),
            Predicate::IsNotNull(Field::known("output")),
            Predicate::not_eq(Field::known("output"), Literal::String(String::new())),
            Predicate::IsNotNull(Field::known("metadata.userID")),
        ];

        predicates.extend(self.model_filter.predicates());

        for (field, value) in &self.additional_filters {
            predicates.push(Predicate::eq_json(field, value)?);
        }

        Ok(predicates)
    }

    pub fn to_btql(&self, project_id: &str) -> Result<BtqlQuery, QueryError> {
        Ok(BtqlQuery::new(project_id, self.limit)
            .select(LOG_FIELDS.iter().copied())
            .filters(self.predicates()?))
    }
}

/// Render the BTQL text for a log fetch
pub fn build_fetch_logs_query(project_id: &str, spec: &FetchLogsQuery) -> Result<String, QueryError> {
    Ok(spec.to_btql(project_id)?.to_string())
}
