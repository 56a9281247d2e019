use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::validate::unrecognized;

/// Discriminates the three kinds of rows in the task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "to-do")]
    ToDo,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "heading")]
    Heading,
}

impl TaskType {
    pub const NAMES: [&'static str; 3] = ["to-do", "project", "heading"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to-do",
            Self::Project => "project",
            Self::Heading => "heading",
        }
    }

    /// Stored value of `TMTask.type`.
    pub fn code(self) -> i64 {
        match self {
            Self::ToDo => 0,
            Self::Project => 1,
            Self::Heading => 2,
        }
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "to-do" => Ok(Self::ToDo),
            "project" => Ok(Self::Project),
            "heading" => Ok(Self::Heading),
            _ => Err(unrecognized("type", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Incomplete,
    Canceled,
    Completed,
}

impl Status {
    pub const NAMES: [&'static str; 3] = ["incomplete", "canceled", "completed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Canceled => "canceled",
            Self::Completed => "completed",
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Incomplete => 0,
            Self::Canceled => 2,
            Self::Completed => 3,
        }
    }

    /// Returns display icon: x=completed, -=canceled, .=incomplete
    pub fn icon(self) -> &'static str {
        match self {
            Self::Incomplete => ".",
            Self::Canceled => "-",
            Self::Completed => "x",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "incomplete" => Ok(Self::Incomplete),
            "canceled" => Ok(Self::Canceled),
            "completed" => Ok(Self::Completed),
            _ => Err(unrecognized("status", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Start {
    Inbox,
    Anytime,
    Someday,
}

impl Start {
    pub const NAMES: [&'static str; 3] = ["Inbox", "Anytime", "Someday"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Anytime => "Anytime",
            Self::Someday => "Someday",
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Inbox => 0,
            Self::Anytime => 1,
            Self::Someday => 2,
        }
    }
}

impl FromStr for Start {
    type Err = Error;

    /// Accepts any casing of the bucket name (`inbox`, `ANYTIME`).
    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let titled: String = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        };
        match titled.as_str() {
            "Inbox" => Ok(Self::Inbox),
            "Anytime" => Ok(Self::Anytime),
            "Someday" => Ok(Self::Someday),
            _ => Err(unrecognized("start", &titled, &Self::NAMES)),
        }
    }
}

impl fmt::Display for Start {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manual ordering column used to sort task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Index {
    #[default]
    Index,
    TodayIndex,
}

impl Index {
    pub const NAMES: [&'static str; 2] = ["index", "todayIndex"];

    pub fn column(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::TodayIndex => "todayIndex",
        }
    }
}

impl FromStr for Index {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "index" => Ok(Self::Index),
            "todayIndex" => Ok(Self::TodayIndex),
            _ => Err(unrecognized("index", s, &Self::NAMES)),
        }
    }
}

/// Null columns decode as the type's empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A column that holds a presence flag until its items are fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attached<T> {
    Flag(bool),
    Items(Vec<T>),
}

impl<T> Attached<T> {
    pub fn is_flagged(&self) -> bool {
        matches!(self, Self::Flag(true))
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Flag(_) => &[],
            Self::Items(items) => items,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub status: Status,
    pub stop_date: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub uuid: String,
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// A to-do, project or heading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trashed: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_title: Option<String>,
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Attached<String>>,
    pub start: Option<Start>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Attached<ChecklistItem>>,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
    pub stop_date: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub index: i64,
    pub today_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Task>>,
}

impl Task {
    pub fn has_tags(&self) -> bool {
        self.tags.as_ref().is_some_and(Attached::is_flagged)
    }

    pub fn has_checklist(&self) -> bool {
        self.checklist.as_ref().is_some_and(Attached::is_flagged)
    }

    pub fn tag_titles(&self) -> &[String] {
        self.tags.as_ref().map(Attached::items).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Attached<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Task>>,
}

impl Area {
    pub fn has_tags(&self) -> bool {
        self.tags.as_ref().is_some_and(Attached::is_flagged)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub shortcut: Option<String>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TagItem>>,
}

/// Something a tag is attached to.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TagItem {
    Area(Area),
    Task(Task),
}

impl TagItem {
    pub fn uuid(&self) -> &str {
        match self {
            Self::Area(a) => &a.uuid,
            Self::Task(t) => &t.uuid,
        }
    }
}

/// Result of a lookup across every entity kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Task(Task),
    Area(Area),
    Tag(Tag),
}

impl Entity {
    pub fn uuid(&self) -> &str {
        match self {
            Self::Task(t) => &t.uuid,
            Self::Area(a) => &a.uuid,
            Self::Tag(t) => &t.uuid,
        }
    }
}
