//! SQL rendering for the Things store.
//!
//! Everything here is pure: filters go in, SQL text plus bound parameters
//! come out. Values are always bound as `?` parameters, never spliced into
//! the statement text.

use rusqlite::types::Value;

use crate::error::Result;
use crate::filter::{AreaQuery, Filter, TaskQuery};
use crate::model::{Status, TaskType};
use crate::validate::{parse_offset, validate_offset};

pub const TABLE_AREA: &str = "TMArea";
pub const TABLE_AREATAG: &str = "TMAreaTag";
pub const TABLE_CHECKLIST_ITEM: &str = "TMChecklistItem";
pub const TABLE_SETTINGS: &str = "TMSettings";
pub const TABLE_TAG: &str = "TMTag";
pub const TABLE_TASK: &str = "TMTask";
pub const TABLE_TASKTAG: &str = "TMTaskTag";
pub const TABLE_META: &str = "Meta";

pub const DATE_CREATED: &str = "creationDate";
pub const DATE_DEADLINE: &str = "dueDate";
pub const DATE_MODIFIED: &str = "userModificationDate";
pub const DATE_START: &str = "startDate";
pub const DATE_STOP: &str = "stopDate";

const IS_NOT_RECURRING: &str = "recurrenceRule IS NULL";
const IS_NOT_TRASHED: &str = "trashed = 0";

/// Row id of the settings record holding the URL scheme token.
const SETTINGS_UUID: &str = "RhAzEf6qDxCD5PmnZVtBZR";

/// A WHERE fragment and the values for its placeholders.
/// An empty fragment constrains nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Predicate {
    pub fn none() -> Self {
        Self::default()
    }

    fn sql(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    fn bound(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// A complete statement ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Wrap this query so it yields the number of distinct uuids it selects.
    pub fn count(&self) -> Query {
        Query {
            sql: format!("SELECT COUNT(DISTINCT uuid) FROM (\n{}\n)", self.sql),
            params: self.params.clone(),
        }
    }
}

/// Predicates joined with AND.
#[derive(Debug, Default)]
struct Conjunction {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl Conjunction {
    fn push(&mut self, predicate: Predicate) {
        if predicate.is_empty() {
            return;
        }
        self.clauses.push(predicate.sql);
        self.params.extend(predicate.params);
    }

    fn render(self) -> (String, Vec<Value>) {
        if self.clauses.is_empty() {
            return ("TRUE".to_string(), self.params);
        }
        (self.clauses.join("\n                AND "), self.params)
    }
}

/// Render one filter against `column`.
pub fn render_filter<T>(column: &str, filter: &Filter<T>) -> Predicate
where
    T: Clone + Into<Value>,
{
    match filter {
        Filter::Unset => Predicate::none(),
        Filter::RequirePresent => Predicate::sql(format!("{column} IS NOT NULL")),
        Filter::RequireAbsent => Predicate::sql(format!("{column} IS NULL")),
        Filter::EqualsValue(v) => Predicate::bound(format!("{column} = ?"), vec![v.clone().into()]),
    }
}

/// Restrict `column` (a unix timestamp) to the window ending now.
pub fn render_date_filter(column: &str, offset: Option<&str>) -> Result<Predicate> {
    let Some(offset) = offset else {
        return Ok(Predicate::none());
    };
    let modifier = parse_offset("offset", offset)?.modifier();
    Ok(Predicate::bound(
        format!("datetime({column}, 'unixepoch', 'localtime') > datetime('now', 'localtime', ?)"),
        vec![Value::Text(modifier)],
    ))
}

/// Case-insensitive containment over title, notes and area title.
pub fn render_search_filter(query: Option<&str>) -> Predicate {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Predicate::none();
    };
    let pattern = format!("%{}%", escape_like(query));
    let columns = ["TASK.title", "TASK.notes", "AREA.title"];
    let sql = columns
        .iter()
        .map(|c| format!("{c} LIKE ? ESCAPE '\\'"))
        .collect::<Vec<_>>()
        .join(" OR ");
    Predicate::bound(
        format!("({sql})"),
        columns.iter().map(|_| Value::Text(pattern.clone())).collect(),
    )
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn code_filter(code: Option<i64>) -> Filter<i64> {
    Filter::equals(code)
}

/// Full task listing for `q`. The tag filter is not checked against the
/// store here; callers do that before executing.
pub fn tasks_query(q: &TaskQuery) -> Result<Query> {
    validate_offset("last", q.last.as_deref())?;
    let mut conjunction = Conjunction::default();

    let order = if let Some(uuid) = &q.uuid {
        conjunction.push(render_filter("TASK.uuid", &Filter::EqualsValue(uuid.clone())));
        None
    } else {
        conjunction.push(Predicate::sql(format!("TASK.{IS_NOT_RECURRING}")));
        conjunction.push(Predicate::sql(format!(
            "(PROJECT.title IS NULL OR PROJECT.{IS_NOT_TRASHED})"
        )));
        conjunction.push(Predicate::sql(format!(
            "(HEADPROJ.title IS NULL OR HEADPROJ.{IS_NOT_TRASHED})"
        )));
        conjunction.push(render_filter(
            "TASK.trashed",
            &code_filter(q.trashed.map(i64::from)),
        ));
        conjunction.push(render_filter(
            "TASK.type",
            &code_filter(q.kind.map(TaskType::code)),
        ));
        conjunction.push(render_filter(
            "TASK.start",
            &code_filter(q.start.map(|s| s.code())),
        ));
        conjunction.push(render_filter(
            "TASK.status",
            &code_filter(q.status.map(Status::code)),
        ));
        conjunction.push(render_filter("TASK.area", &q.area));
        conjunction.push(render_filter("TASK.project", &q.project));
        conjunction.push(render_filter("TASK.actionGroup", &q.heading));
        conjunction.push(render_filter(
            &format!("TASK.{DATE_START}"),
            &Filter::<String>::presence(q.start_date),
        ));
        conjunction.push(render_filter(
            &format!("TASK.{DATE_DEADLINE}"),
            &Filter::<String>::presence(q.deadline),
        ));
        conjunction.push(render_filter("TAG.title", &q.tag));
        conjunction.push(render_date_filter(
            &format!("TASK.{DATE_CREATED}"),
            q.last.as_deref(),
        )?);
        conjunction.push(render_search_filter(q.search_query.as_deref()));
        Some(format!("TASK.\"{}\"", q.index.column()))
    };

    let (where_sql, params) = conjunction.render();
    Ok(Query::with_params(tasks_sql(&where_sql, order.as_deref()), params))
}

fn tasks_sql(where_sql: &str, order: Option<&str>) -> String {
    let order_by = order
        .map(|o| format!("\n            ORDER BY\n                {o}"))
        .unwrap_or_default();
    format!(
        r#"
            SELECT DISTINCT
                TASK.uuid,
                CASE
                    WHEN TASK.type = 0 THEN 'to-do'
                    WHEN TASK.type = 1 THEN 'project'
                    WHEN TASK.type = 2 THEN 'heading'
                END AS type,
                CASE
                    WHEN TASK.trashed = 1 THEN 1
                END AS trashed,
                TASK.title,
                CASE
                    WHEN TASK.status = 0 THEN 'incomplete'
                    WHEN TASK.status = 2 THEN 'canceled'
                    WHEN TASK.status = 3 THEN 'completed'
                END AS status,
                CASE
                    WHEN AREA.uuid IS NOT NULL THEN AREA.uuid
                END AS area,
                CASE
                    WHEN AREA.uuid IS NOT NULL THEN AREA.title
                END AS area_title,
                CASE
                    WHEN PROJECT.uuid IS NOT NULL THEN PROJECT.uuid
                END AS project,
                CASE
                    WHEN PROJECT.uuid IS NOT NULL THEN PROJECT.title
                END AS project_title,
                CASE
                    WHEN HEADING.uuid IS NOT NULL THEN HEADING.uuid
                END AS heading,
                CASE
                    WHEN HEADING.uuid IS NOT NULL THEN HEADING.title
                END AS heading_title,
                TASK.notes,
                CASE
                    WHEN TAG.uuid IS NOT NULL THEN 1
                END AS tags,
                CASE
                    WHEN TASK.start = 0 THEN 'Inbox'
                    WHEN TASK.start = 1 THEN 'Anytime'
                    WHEN TASK.start = 2 THEN 'Someday'
                END AS start,
                CASE
                    WHEN CHECKLIST_ITEM.uuid IS NOT NULL THEN 1
                END AS checklist,
                date(TASK.{DATE_START}, 'unixepoch') AS start_date,
                date(TASK.{DATE_DEADLINE}, 'unixepoch') AS deadline,
                date(TASK.{DATE_STOP}, 'unixepoch') AS stop_date,
                datetime(TASK.{DATE_CREATED}, 'unixepoch', 'localtime') AS created,
                datetime(TASK.{DATE_MODIFIED}, 'unixepoch', 'localtime') AS modified,
                TASK."index" AS "index",
                TASK.todayIndex AS today_index
            FROM
                {TABLE_TASK} AS TASK
            LEFT OUTER JOIN
                {TABLE_TASK} PROJECT ON TASK.project = PROJECT.uuid
            LEFT OUTER JOIN
                {TABLE_AREA} AREA ON TASK.area = AREA.uuid
            LEFT OUTER JOIN
                {TABLE_TASK} HEADING ON TASK.actionGroup = HEADING.uuid
            LEFT OUTER JOIN
                {TABLE_TASK} HEADPROJ ON HEADING.project = HEADPROJ.uuid
            LEFT OUTER JOIN
                {TABLE_TASKTAG} TAGS ON TASK.uuid = TAGS.tasks
            LEFT OUTER JOIN
                {TABLE_TAG} TAG ON TAGS.tags = TAG.uuid
            LEFT OUTER JOIN
                {TABLE_CHECKLIST_ITEM} CHECKLIST_ITEM
                ON CHECKLIST_ITEM.task = TASK.uuid
            WHERE
                {where_sql}{order_by}
            "#
    )
}

pub fn areas_query(q: &AreaQuery) -> Query {
    let mut conjunction = Conjunction::default();
    conjunction.push(render_filter("TAG.title", &q.tag));
    conjunction.push(render_filter("AREA.uuid", &Filter::equals(q.uuid.clone())));
    let (where_sql, params) = conjunction.render();
    Query::with_params(
        format!(
            r#"
            SELECT DISTINCT
                AREA.uuid,
                'area' AS type,
                AREA.title,
                CASE
                    WHEN AREA_TAG.areas IS NOT NULL THEN 1
                END AS tags
            FROM
                {TABLE_AREA} AS AREA
            LEFT OUTER JOIN
                {TABLE_AREATAG} AREA_TAG ON AREA_TAG.areas = AREA.uuid
            LEFT OUTER JOIN
                {TABLE_TAG} TAG ON TAG.uuid = AREA_TAG.tags
            WHERE
                {where_sql}
            ORDER BY AREA."index"
            "#
        ),
        params,
    )
}

pub fn tags_query(title: Option<&str>) -> Query {
    let mut conjunction = Conjunction::default();
    conjunction.push(render_filter("title", &Filter::equals(title.map(str::to_string))));
    let (where_sql, params) = conjunction.render();
    Query::with_params(
        format!(
            r#"
            SELECT
                uuid, 'tag' AS type, title, shortcut
            FROM
                {TABLE_TAG}
            WHERE
                {where_sql}
            ORDER BY "index"
            "#
        ),
        params,
    )
}

pub fn tag_titles_query() -> Query {
    Query::new(format!(r#"SELECT title FROM {TABLE_TAG} ORDER BY "index""#))
}

pub fn tags_of_task_query(task_uuid: &str) -> Query {
    Query::with_params(
        format!(
            r#"
            SELECT
                TAG.title
            FROM
                {TABLE_TASKTAG} AS TASK_TAG
            LEFT OUTER JOIN
                {TABLE_TAG} TAG ON TAG.uuid = TASK_TAG.tags
            WHERE
                TASK_TAG.tasks = ?
            ORDER BY TAG."index"
            "#
        ),
        vec![Value::Text(task_uuid.to_string())],
    )
}

pub fn tags_of_area_query(area_uuid: &str) -> Query {
    Query::with_params(
        format!(
            r#"
            SELECT
                TAG.title
            FROM
                {TABLE_AREATAG} AS AREA_TAG
            LEFT OUTER JOIN
                {TABLE_TAG} TAG ON TAG.uuid = AREA_TAG.tags
            WHERE
                AREA_TAG.areas = ?
            ORDER BY TAG."index"
            "#
        ),
        vec![Value::Text(area_uuid.to_string())],
    )
}

pub fn checklist_items_query(todo_uuid: &str) -> Query {
    Query::with_params(
        format!(
            r#"
            SELECT
                CHECKLIST_ITEM.title,
                CASE
                    WHEN CHECKLIST_ITEM.status = 0 THEN 'incomplete'
                    WHEN CHECKLIST_ITEM.status = 2 THEN 'canceled'
                    WHEN CHECKLIST_ITEM.status = 3 THEN 'completed'
                END AS status,
                date(CHECKLIST_ITEM.{DATE_STOP}, 'unixepoch') AS stop_date,
                'checklist-item' AS type,
                CHECKLIST_ITEM.uuid,
                datetime(
                    CHECKLIST_ITEM.{DATE_CREATED}, 'unixepoch', 'localtime'
                ) AS created,
                datetime(
                    CHECKLIST_ITEM.{DATE_MODIFIED}, 'unixepoch', 'localtime'
                ) AS modified
            FROM
                {TABLE_CHECKLIST_ITEM} AS CHECKLIST_ITEM
            WHERE
                CHECKLIST_ITEM.task = ?
            ORDER BY CHECKLIST_ITEM."index"
            "#
        ),
        vec![Value::Text(todo_uuid.to_string())],
    )
}

pub fn auth_token_query() -> Query {
    Query::with_params(
        format!("SELECT uriSchemeAuthenticationToken FROM {TABLE_SETTINGS} WHERE uuid = ?"),
        vec![Value::Text(SETTINGS_UUID.to_string())],
    )
}

/// Plist-encoded schema version of the store.
pub fn version_query() -> Query {
    Query::with_params(
        format!("SELECT value FROM {TABLE_META} WHERE key = ?"),
        vec![Value::Text("databaseVersion".to_string())],
    )
}
