//! Explicit filter configuration for the read operations.
//!
//! Every option a listing understands is a typed field here; the `Default`
//! impls carry the defaults (incomplete, not trashed, manual index order).

use std::str::FromStr;

use crate::error::Error;
use crate::model::{Index, Start, Status, TaskType};

/// Tri-state membership filter plus an exact-value case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter<T> {
    /// No constraint.
    #[default]
    Unset,
    /// The column must hold a value.
    RequirePresent,
    /// The column must be empty.
    RequireAbsent,
    EqualsValue(T),
}

impl<T> Filter<T> {
    /// `Some(true)` requires a value, `Some(false)` requires none.
    pub fn presence(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Unset,
            Some(true) => Self::RequirePresent,
            Some(false) => Self::RequireAbsent,
        }
    }

    pub fn equals(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::EqualsValue)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::EqualsValue(v) => Some(v),
            _ => None,
        }
    }
}

/// Command-line form: `any` requires a value, `none` requires its absence,
/// anything else must match exactly.
impl FromStr for Filter<String> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "any" => Self::RequirePresent,
            "none" => Self::RequireAbsent,
            other => Self::EqualsValue(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Fetch exactly this task; every other filter except `include_items` is ignored.
    pub uuid: Option<String>,
    pub kind: Option<TaskType>,
    /// `None` matches any status.
    pub status: Option<Status>,
    pub start: Option<Start>,
    pub area: Filter<String>,
    pub project: Filter<String>,
    pub heading: Filter<String>,
    /// Tag title, validated against the tags currently in the store.
    pub tag: Filter<String>,
    pub start_date: Option<bool>,
    pub deadline: Option<bool>,
    /// `None` includes trashed and untrashed rows alike.
    pub trashed: Option<bool>,
    /// Relative creation-date window such as `3d`, `2w` or `1y`.
    pub last: Option<String>,
    pub search_query: Option<String>,
    pub index: Index,
    pub include_items: bool,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            uuid: None,
            kind: None,
            status: Some(Status::Incomplete),
            start: None,
            area: Filter::Unset,
            project: Filter::Unset,
            heading: Filter::Unset,
            tag: Filter::Unset,
            start_date: None,
            deadline: None,
            trashed: Some(false),
            last: None,
            search_query: None,
            index: Index::Index,
            include_items: false,
        }
    }
}

impl TaskQuery {
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            ..Self::default()
        }
    }

    pub fn items(self) -> Self {
        Self {
            include_items: true,
            ..self
        }
    }

    pub fn todos(self) -> Self {
        Self {
            kind: Some(TaskType::ToDo),
            ..self
        }
    }

    pub fn projects(self) -> Self {
        Self {
            kind: Some(TaskType::Project),
            ..self
        }
    }

    pub fn inbox(self) -> Self {
        Self {
            start: Some(Start::Inbox),
            ..self
        }
    }

    /// Reflects the state the app was in when it was last opened.
    pub fn today(self) -> Self {
        Self {
            start_date: Some(true),
            start: Some(Start::Anytime),
            index: Index::TodayIndex,
            ..self
        }
    }

    /// Scheduled items only; unscheduled items with a deadline belong to `due`.
    pub fn upcoming(self) -> Self {
        Self {
            start_date: Some(true),
            start: Some(Start::Someday),
            ..self
        }
    }

    pub fn anytime(self) -> Self {
        Self {
            start: Some(Start::Anytime),
            ..self
        }
    }

    pub fn someday(self) -> Self {
        Self {
            start_date: Some(false),
            start: Some(Start::Someday),
            ..self
        }
    }

    pub fn canceled(self) -> Self {
        Self {
            status: Some(Status::Canceled),
            ..self
        }
    }

    pub fn completed(self) -> Self {
        Self {
            status: Some(Status::Completed),
            ..self
        }
    }

    pub fn due_only(self) -> Self {
        Self {
            deadline: Some(true),
            ..self
        }
    }

    pub fn search(self, query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaQuery {
    pub uuid: Option<String>,
    pub tag: Filter<String>,
    pub include_items: bool,
}

impl AreaQuery {
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    /// Exact tag title; must name an existing tag.
    pub title: Option<String>,
    pub include_items: bool,
}
