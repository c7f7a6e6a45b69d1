use serde::{Deserialize, Serialize};

use crate::filter::{rewrite_operators, Filter};
use crate::order::SortSpec;
use crate::page::PageWindow;
use crate::params::ParamMap;
use crate::projection::Projection;

/// Relation expansion directive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationSpec {
    /// Expand the relation with every field of the related documents.
    Path(String),
    /// Expand the relation keeping only `select` (plus the identity field).
    Select { path: String, select: Projection },
}

impl RelationSpec {
    pub fn path(path: impl Into<String>) -> Self {
        RelationSpec::Path(path.into())
    }

    /// `RelationSpec::select("bootcamp", "name description")`
    pub fn select(path: impl Into<String>, fields: &str) -> Self {
        RelationSpec::Select {
            path: path.into(),
            select: Projection::parse(fields),
        }
    }

    pub fn relation(&self) -> &str {
        match self {
            RelationSpec::Path(p) => p,
            RelationSpec::Select { path, .. } => path,
        }
    }

    pub fn projection(&self) -> Option<&Projection> {
        match self {
            RelationSpec::Path(_) => None,
            RelationSpec::Select { select, .. } => Some(select),
        }
    }
}

/// Immutable description of one fetch. Every step returns a new value;
/// nothing touches a store until the query is handed to a collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FindQuery {
    pub filter: Filter,
    pub projection: Projection,
    pub sort: SortSpec,
    pub skip: u64,
    pub limit: Option<u64>,
    pub populate: Option<RelationSpec>,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn select(self, projection: Projection) -> Self {
        Self { projection, ..self }
    }

    pub fn sort(self, sort: SortSpec) -> Self {
        Self { sort, ..self }
    }

    pub fn skip(self, skip: u64) -> Self {
        Self { skip, ..self }
    }

    pub fn limit(self, limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    pub fn populate(self, spec: Option<RelationSpec>) -> Self {
        Self {
            populate: spec,
            ..self
        }
    }
}

/// Names of the parameters that steer the translator instead of filtering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamNames {
    pub select: String,
    pub sort: String,
    pub page: String,
    pub limit: String,
}

impl Default for ParamNames {
    fn default() -> Self {
        Self {
            select: "select".into(),
            sort: "sort".into(),
            page: "page".into(),
            limit: "limit".into(),
        }
    }
}

impl ParamNames {
    pub fn reserved(&self) -> [&str; 4] {
        [
            self.select.as_str(),
            self.sort.as_str(),
            self.page.as_str(),
            self.limit.as_str(),
        ]
    }
}

fn default_limit() -> u64 {
    25
}

fn default_max_limit() -> u64 {
    1000
}

fn default_sort() -> String {
    "-createdAt,-name".to_string()
}

/// Per-resource translator settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub params: ParamNames,
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
    /// Applied when the request has no `sort`.
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            params: ParamNames::default(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_sort: default_sort(),
        }
    }
}

impl TranslatorConfig {
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn with_default_sort(mut self, sort: impl Into<String>) -> Self {
        self.default_sort = sort.into();
        self
    }
}

/// A request's parameters split into the parts of a list query.
#[derive(Clone, Debug, PartialEq)]
pub struct AdvancedQuery {
    pub filter: Filter,
    pub projection: Projection,
    pub sort: SortSpec,
    pub window: PageWindow,
}

impl AdvancedQuery {
    /// Plan a list query from raw parameters. Never fails: bad paging input
    /// falls back to defaults and filter problems surface when executed.
    pub fn from_params(params: &ParamMap, cfg: &TranslatorConfig) -> Self {
        let mut draft = params.clone();
        let select = draft.remove(&cfg.params.select);
        let sort = draft.remove(&cfg.params.sort);
        let page = draft.remove(&cfg.params.page);
        let limit = draft.remove(&cfg.params.limit);

        let projection = select
            .and_then(|v| v.joined(","))
            .map(|s| Projection::parse(&s))
            .unwrap_or_default();

        let sort = sort
            .and_then(|v| v.joined(","))
            .map(|raw| SortSpec::parse(&raw))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| SortSpec::parse(&cfg.default_sort));

        let window = PageWindow::from_params(
            page.as_ref().and_then(|v| v.first()),
            limit.as_ref().and_then(|v| v.first()),
            cfg,
        );

        Self {
            filter: rewrite_operators(draft),
            projection,
            sort,
            window,
        }
    }

    /// The windowed fetch for this plan.
    pub fn find_query(&self, populate: Option<RelationSpec>) -> FindQuery {
        FindQuery::new(self.filter.clone())
            .select(self.projection.clone())
            .sort(self.sort.clone())
            .skip(self.window.start_index())
            .limit(self.window.limit)
            .populate(populate)
    }
}
