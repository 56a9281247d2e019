//! Domain reads on top of the query builder.
//!
//! Rows come back as records, are decoded into entities, and then get their
//! tag titles resolved and (on request) their child items attached.

use std::io::Cursor;
use std::path::Path;
use std::process::Command;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::db::{Database, Record};
use crate::error::{Error, Result};
use crate::filter::{AreaQuery, Filter, TagQuery, TaskQuery};
use crate::model::{Area, Attached, ChecklistItem, Entity, Tag, TagItem, Task, TaskType};
use crate::query;
use crate::validate::validate;

/// Nesting levels expanded below a listed task: project, heading, to-do.
pub const MAX_EXPANSION_DEPTH: usize = 3;

const URL_SCHEME: &str = "things";

/// Show-in-app link for any uuid.
pub fn link(uuid: &str) -> String {
    format!("{URL_SCHEME}:///show?id={uuid}")
}

/// Open `uuid` in the app through the system URL handler.
pub fn show(uuid: &str) -> Result<()> {
    let status = Command::new("open").arg(link(uuid)).status()?;
    if !status.success() {
        return Err(Error::Io(std::io::Error::other(format!(
            "open exited with {status}"
        ))));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|r| serde_json::from_value(serde_json::Value::Object(r)).map_err(Error::from))
        .collect()
}

pub struct Things {
    db: Database,
}

impl Things {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Resolve the database path and wrap it. Nothing is opened yet.
    pub fn open(path: Option<&Path>) -> Self {
        Self::new(Database::open(path))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // Tasks

    /// Tasks matching `query`. With `query.uuid` set the result holds exactly
    /// that task, and to-dos and headings come back with their items.
    pub fn get_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        self.collect_tasks(query, 0)
    }

    pub fn task(&self, uuid: &str) -> Result<Task> {
        let mut tasks = self.get_tasks(&TaskQuery::by_uuid(uuid))?;
        tasks.pop().ok_or_else(|| Error::not_found("task", uuid))
    }

    pub fn count_tasks(&self, query: &TaskQuery) -> Result<usize> {
        let sql = query::tasks_query(query)?;
        self.validate_tag(&query.tag)?;
        self.db.count(&sql)
    }

    fn collect_tasks(&self, query: &TaskQuery, depth: usize) -> Result<Vec<Task>> {
        let sql = query::tasks_query(query)?;
        self.validate_tag(&query.tag)?;

        if let Some(uuid) = &query.uuid {
            if self.db.count(&sql)? == 0 {
                return Err(Error::not_found("task", uuid));
            }
        }

        let mut tasks: Vec<Task> = decode(self.db.records(&sql)?)?;

        let include_items = query.include_items
            || (query.uuid.is_some()
                && tasks
                    .first()
                    .is_some_and(|t| matches!(t.kind, TaskType::ToDo | TaskType::Heading)));

        for task in &mut tasks {
            self.shape_task(task, include_items, depth)?;
        }
        Ok(tasks)
    }

    fn shape_task(&self, task: &mut Task, include_items: bool, depth: usize) -> Result<()> {
        if task.has_tags() {
            task.tags = Some(Attached::Items(self.tags_of_task(&task.uuid)?));
        }
        if !include_items {
            return Ok(());
        }
        if depth >= MAX_EXPANSION_DEPTH {
            warn!("not expanding {} '{}': nested too deep", task.kind, task.uuid);
            return Ok(());
        }

        match task.kind {
            TaskType::ToDo => {
                if task.has_checklist() {
                    task.checklist = Some(Attached::Items(self.checklist_items(&task.uuid)?));
                }
            }
            TaskType::Project => {
                debug!("expanding project {}", task.uuid);
                let mut items = self.collect_tasks(
                    &TaskQuery {
                        project: Filter::EqualsValue(task.uuid.clone()),
                        include_items: true,
                        ..TaskQuery::default()
                    },
                    depth + 1,
                )?;
                // To-dos without a heading come before the headings.
                items.sort_by_key(|item| item.kind == TaskType::Heading);
                task.items = Some(items);
            }
            TaskType::Heading => {
                debug!("expanding heading {}", task.uuid);
                task.items = Some(self.collect_tasks(
                    &TaskQuery {
                        kind: Some(TaskType::ToDo),
                        heading: Filter::EqualsValue(task.uuid.clone()),
                        include_items: true,
                        ..TaskQuery::default()
                    },
                    depth + 1,
                )?);
            }
        }
        Ok(())
    }

    pub fn checklist_items(&self, todo_uuid: &str) -> Result<Vec<ChecklistItem>> {
        decode(self.db.records(&query::checklist_items_query(todo_uuid))?)
    }

    // Areas

    pub fn get_areas(&self, query: &AreaQuery) -> Result<Vec<Area>> {
        self.validate_tag(&query.tag)?;
        let sql = query::areas_query(query);

        if let Some(uuid) = &query.uuid {
            if self.db.count(&sql)? == 0 {
                return Err(Error::not_found("area", uuid));
            }
        }

        let mut areas: Vec<Area> = decode(self.db.records(&sql)?)?;
        for area in &mut areas {
            if area.has_tags() {
                area.tags = Some(Attached::Items(self.tags_of_area(&area.uuid)?));
            }
            if query.include_items {
                area.items = Some(self.collect_tasks(
                    &TaskQuery {
                        area: Filter::EqualsValue(area.uuid.clone()),
                        include_items: true,
                        ..TaskQuery::default()
                    },
                    0,
                )?);
            }
        }
        Ok(areas)
    }

    pub fn area(&self, uuid: &str) -> Result<Area> {
        let mut areas = self.get_areas(&AreaQuery::by_uuid(uuid))?;
        areas.pop().ok_or_else(|| Error::not_found("area", uuid))
    }

    pub fn count_areas(&self, query: &AreaQuery) -> Result<usize> {
        self.validate_tag(&query.tag)?;
        self.db.count(&query::areas_query(query))
    }

    // Tags

    /// Tags ordered by their manual index. With `include_items` each tag
    /// lists its areas first, then its tasks.
    pub fn get_tags(&self, query: &TagQuery) -> Result<Vec<Tag>> {
        if let Some(title) = &query.title {
            validate("title", title, &self.tag_titles()?)?;
        }
        let mut tags: Vec<Tag> =
            decode(self.db.records(&query::tags_query(query.title.as_deref()))?)?;

        if query.include_items {
            for tag in &mut tags {
                let by_tag = Filter::EqualsValue(tag.title.clone());
                let areas = self.get_areas(&AreaQuery {
                    tag: by_tag.clone(),
                    ..AreaQuery::default()
                })?;
                let tasks = self.get_tasks(&TaskQuery {
                    tag: by_tag,
                    ..TaskQuery::default()
                })?;
                tag.items = Some(
                    areas
                        .into_iter()
                        .map(TagItem::Area)
                        .chain(tasks.into_iter().map(TagItem::Task))
                        .collect(),
                );
            }
        }
        Ok(tags)
    }

    pub fn count_tags(&self, query: &TagQuery) -> Result<usize> {
        if let Some(title) = &query.title {
            validate("title", title, &self.tag_titles()?)?;
        }
        self.db.count(&query::tags_query(query.title.as_deref()))
    }

    pub fn tag(&self, title: &str, include_items: bool) -> Result<Tag> {
        let mut tags = self.get_tags(&TagQuery {
            title: Some(title.to_string()),
            include_items,
        })?;
        if tags.is_empty() {
            return Err(Error::not_found("tag", title));
        }
        Ok(tags.swap_remove(0))
    }

    pub fn tag_titles(&self) -> Result<Vec<String>> {
        self.db.strings(&query::tag_titles_query())
    }

    pub fn tags_of_task(&self, task_uuid: &str) -> Result<Vec<String>> {
        self.db.strings(&query::tags_of_task_query(task_uuid))
    }

    pub fn tags_of_area(&self, area_uuid: &str) -> Result<Vec<String>> {
        self.db.strings(&query::tags_of_area_query(area_uuid))
    }

    /// A concrete tag title must name a tag that exists right now.
    fn validate_tag(&self, tag: &Filter<String>) -> Result<()> {
        if let Some(title) = tag.value() {
            validate("tag", title, &self.tag_titles()?)?;
        }
        Ok(())
    }

    // Lookup

    /// Find any entity by uuid: tasks first, then areas, then tags.
    pub fn get(&self, uuid: &str) -> Result<Option<Entity>> {
        match self.task(uuid) {
            Ok(task) => return Ok(Some(Entity::Task(task))),
            Err(Error::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        match self.area(uuid) {
            Ok(area) => return Ok(Some(Entity::Area(area))),
            Err(Error::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        let tags = self.get_tags(&TagQuery::default())?;
        Ok(tags.into_iter().find(|t| t.uuid == uuid).map(Entity::Tag))
    }

    // Views

    pub fn todos(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.todos())
    }

    pub fn projects(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.projects())
    }

    pub fn inbox(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.inbox())
    }

    pub fn today(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.today())
    }

    pub fn upcoming(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.upcoming())
    }

    pub fn anytime(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.anytime())
    }

    pub fn someday(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.someday())
    }

    pub fn canceled(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.canceled())
    }

    pub fn completed(&self, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.completed())
    }

    /// Canceled and completed tasks, most recently stopped first.
    pub fn logbook(&self, base: TaskQuery) -> Result<Vec<Task>> {
        let mut tasks = self.canceled(base.clone())?;
        tasks.extend(self.completed(base)?);
        tasks.sort_by(|a, b| b.stop_date.cmp(&a.stop_date));
        Ok(tasks)
    }

    pub fn count_logbook(&self, base: TaskQuery) -> Result<usize> {
        Ok(self.count_tasks(&base.clone().canceled())? + self.count_tasks(&base.completed())?)
    }

    /// Tasks with a deadline, soonest first.
    pub fn due(&self, base: TaskQuery) -> Result<Vec<Task>> {
        let mut tasks = self.get_tasks(&base.due_only())?;
        tasks.sort_by_key(|t| (t.deadline.is_none(), t.deadline.clone()));
        Ok(tasks)
    }

    pub fn search(&self, text: &str, base: TaskQuery) -> Result<Vec<Task>> {
        self.get_tasks(&base.search(text))
    }

    /// Token the app expects on URL scheme commands that modify data.
    pub fn auth_token(&self) -> Result<Option<String>> {
        Ok(self.db.strings(&query::auth_token_query())?.into_iter().next())
    }

    /// Schema version the app recorded in the store, if any.
    pub fn version(&self) -> Result<Option<i64>> {
        let Some(encoded) = self.db.strings(&query::version_query())?.into_iter().next() else {
            return Ok(None);
        };
        let value = plist::Value::from_reader(Cursor::new(encoded.into_bytes()))?;
        Ok(value.as_signed_integer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use crate::model::{Index, Start, Status};

    fn uuids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.uuid.as_str()).collect()
    }

    #[test]
    fn default_listing_skips_templates_trash_and_closed() {
        let fx = Fixture::new();
        let tasks = fx.things().get_tasks(&TaskQuery::default()).unwrap();
        assert_eq!(
            uuids(&tasks),
            vec!["P1", "H1", "T1", "H2", "T2", "T3", "T4", "T5", "T6"]
        );
    }

    #[test]
    fn trashed_ancestor_hides_untrashed_child() {
        let fx = Fixture::new();
        let things = fx.things();
        let orphans = things
            .get_tasks(&TaskQuery {
                project: Filter::EqualsValue("P2".into()),
                ..TaskQuery::default()
            })
            .unwrap();
        assert!(orphans.is_empty());

        let trashed = things
            .get_tasks(&TaskQuery {
                trashed: Some(true),
                ..TaskQuery::default()
            })
            .unwrap();
        assert_eq!(uuids(&trashed), vec!["T9", "P2"]);
        assert_eq!(trashed[0].trashed, Some(true));
    }

    #[test]
    fn relational_fields_and_flags() {
        let fx = Fixture::new();
        let tasks = fx.things().get_tasks(&TaskQuery::default()).unwrap();
        let t1 = tasks.iter().find(|t| t.uuid == "T1").unwrap();
        assert_eq!(t1.heading.as_deref(), Some("H1"));
        assert_eq!(t1.heading_title.as_deref(), Some("Kitchen"));
        assert!(t1.project.is_none());
        assert!(t1.area.is_none());
        assert!(t1.trashed.is_none());
        assert_eq!(t1.tag_titles(), ["Errand", "Important"]);
        // Not expanded: checklist stays a flag.
        assert!(t1.has_checklist());

        let p1 = tasks.iter().find(|t| t.uuid == "P1").unwrap();
        assert_eq!(p1.area_title.as_deref(), Some("Home"));
        assert!(p1.tags.is_none());
        assert!(p1.checklist.is_none());
        assert!(p1.items.is_none());
    }

    #[test]
    fn missing_task_uuid_is_not_found() {
        let fx = Fixture::new();
        let err = fx.things().task("nope").unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "task", .. }));
    }

    #[test]
    fn single_todo_includes_checklist() {
        let fx = Fixture::new();
        let t1 = fx.things().task("T1").unwrap();
        let titles: Vec<&str> = match t1.checklist.as_ref().unwrap() {
            Attached::Items(items) => items.iter().map(|i| i.title.as_str()).collect(),
            Attached::Flag(_) => panic!("checklist not expanded"),
        };
        assert_eq!(titles, vec!["Primer", "Brushes"]);
        let items = t1.checklist.unwrap();
        assert_eq!(items.items()[1].status, Status::Completed);
        assert_eq!(items.items()[1].stop_date.as_deref(), Some("2023-07-22"));
        assert_eq!(items.items()[0].kind, "checklist-item");
    }

    #[test]
    fn single_heading_includes_todos() {
        let fx = Fixture::new();
        let h1 = fx.things().task("H1").unwrap();
        let items = h1.items.unwrap();
        assert_eq!(uuids(&items), vec!["T1"]);
        assert!(matches!(items[0].checklist, Some(Attached::Items(_))));
    }

    #[test]
    fn single_project_is_not_expanded_unless_asked() {
        let fx = Fixture::new();
        let p1 = fx.things().task("P1").unwrap();
        assert!(p1.items.is_none());
    }

    #[test]
    fn project_items_put_loose_todos_before_headings() {
        let fx = Fixture::new();
        let projects = fx
            .things()
            .projects(TaskQuery::default().items())
            .unwrap();
        assert_eq!(uuids(&projects), vec!["P1"]);
        let items = projects[0].items.as_ref().unwrap();
        assert_eq!(uuids(items), vec!["T2", "H1", "H2"]);
        let kitchen = items[1].items.as_ref().unwrap();
        assert_eq!(uuids(kitchen), vec!["T1"]);
        assert!(items[2].items.as_ref().unwrap().is_empty());
    }

    #[test]
    fn filters() {
        let fx = Fixture::new();
        let things = fx.things();
        let q = |q: TaskQuery| uuids(&things.get_tasks(&q).unwrap()).join(",");

        assert_eq!(
            q(TaskQuery { kind: Some(TaskType::Heading), ..TaskQuery::default() }),
            "H1,H2"
        );
        assert_eq!(
            q(TaskQuery { area: Filter::RequirePresent, ..TaskQuery::default() }),
            "P1,T4"
        );
        assert_eq!(
            q(TaskQuery { area: Filter::RequireAbsent, ..TaskQuery::default() }),
            "H1,T1,H2,T2,T3,T5,T6"
        );
        assert_eq!(
            q(TaskQuery { area: Filter::EqualsValue("A2".into()), ..TaskQuery::default() }),
            "T4"
        );
        assert_eq!(
            q(TaskQuery { tag: Filter::RequirePresent, ..TaskQuery::default() }),
            "T1,T4"
        );
        assert_eq!(
            q(TaskQuery { tag: Filter::EqualsValue("Important".into()), ..TaskQuery::default() }),
            "T1"
        );
        assert_eq!(
            q(TaskQuery { deadline: Some(true), ..TaskQuery::default() }),
            "T4,T6"
        );
        assert_eq!(
            q(TaskQuery { last: Some("3d".into()), ..TaskQuery::default() }),
            "T3"
        );
        assert_eq!(
            q(TaskQuery { status: None, kind: Some(TaskType::ToDo), start: Some(Start::Anytime),
                          area: Filter::RequireAbsent, project: Filter::RequireAbsent,
                          heading: Filter::RequireAbsent, ..TaskQuery::default() }),
            "T7,T8"
        );
    }

    #[test]
    fn unknown_tag_is_invalid_argument() {
        let fx = Fixture::new();
        let err = fx
            .things()
            .get_tasks(&TaskQuery {
                tag: Filter::EqualsValue("Nope".into()),
                ..TaskQuery::default()
            })
            .unwrap_err();
        match err {
            Error::InvalidArgument { parameter, value, expected } => {
                assert_eq!(parameter, "tag");
                assert_eq!(value, "Nope");
                assert!(expected.contains("'Errand'"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn bad_offset_fails_before_any_query() {
        let fx = Fixture::new();
        let things = fx.things();
        let err = things
            .get_tasks(&TaskQuery { last: Some("3x".into()), ..TaskQuery::default() })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert_eq!(things.database().executed(), 0);
    }

    #[test]
    fn search_is_case_insensitive_containment() {
        let fx = Fixture::new();
        let things = fx.things();
        assert_eq!(uuids(&things.search("DINNER", TaskQuery::default()).unwrap()), vec!["T3"]);
        assert_eq!(uuids(&things.search("home", TaskQuery::default()).unwrap()), vec!["P1"]);
        assert_eq!(uuids(&things.search("paint", TaskQuery::default()).unwrap()), vec!["T1"]);
        assert!(things.search("zzz", TaskQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn views() {
        let fx = Fixture::new();
        let things = fx.things();
        let base = TaskQuery::default;
        assert_eq!(uuids(&things.inbox(base()).unwrap()), vec!["T3"]);
        assert_eq!(uuids(&things.today(base()).unwrap()), vec!["T4"]);
        assert_eq!(uuids(&things.upcoming(base()).unwrap()), vec!["T6"]);
        assert_eq!(uuids(&things.someday(base()).unwrap()), vec!["T5"]);
        assert_eq!(
            uuids(&things.anytime(base()).unwrap()),
            vec!["P1", "H1", "T1", "H2", "T2", "T4"]
        );
        assert_eq!(uuids(&things.completed(base()).unwrap()), vec!["T7"]);
        assert_eq!(uuids(&things.canceled(base()).unwrap()), vec!["T8"]);
        assert_eq!(
            uuids(&things.todos(base()).unwrap()),
            vec!["T1", "T2", "T3", "T4", "T5", "T6"]
        );
    }

    #[test]
    fn today_orders_by_today_index() {
        let q = TaskQuery::default().today();
        assert_eq!(q.index, Index::TodayIndex);
        let fx = Fixture::new();
        assert_eq!(fx.things().count_tasks(&q).unwrap(), 1);
    }

    #[test]
    fn logbook_is_newest_stop_first() {
        let fx = Fixture::new();
        let things = fx.things();
        let logbook = things.logbook(TaskQuery::default()).unwrap();
        // Canceled rows are fetched first, so the later completion must be moved ahead.
        assert_eq!(uuids(&logbook), vec!["T7", "T8"]);
        assert_eq!(logbook[0].stop_date.as_deref(), Some("2023-11-03"));
        assert_eq!(logbook[1].stop_date.as_deref(), Some("2023-09-18"));
        assert_eq!(things.count_logbook(TaskQuery::default()).unwrap(), 2);
    }

    #[test]
    fn due_is_soonest_deadline_first() {
        let fx = Fixture::new();
        let due = fx.things().due(TaskQuery::default()).unwrap();
        assert_eq!(uuids(&due), vec!["T6", "T4"]);
        assert_eq!(due[0].deadline.as_deref(), Some("2023-11-14"));
        assert_eq!(due[1].deadline.as_deref(), Some("2023-11-20"));
    }

    #[test]
    fn count_matches_listing_length() {
        let fx = Fixture::new();
        let things = fx.things();
        let queries = [
            TaskQuery::default(),
            TaskQuery::default().inbox(),
            TaskQuery::default().anytime(),
            TaskQuery::default().completed(),
            TaskQuery { status: None, trashed: None, ..TaskQuery::default() },
            TaskQuery { tag: Filter::RequirePresent, ..TaskQuery::default() },
            TaskQuery { tag: Filter::EqualsValue("Errand".into()), ..TaskQuery::default() },
            TaskQuery::default().search("e"),
        ];
        for q in &queries {
            assert_eq!(
                things.count_tasks(q).unwrap(),
                things.get_tasks(q).unwrap().len(),
                "{q:?}"
            );
        }
        let areas = AreaQuery::default();
        assert_eq!(things.count_areas(&areas).unwrap(), things.get_areas(&areas).unwrap().len());

        for tags in [
            TagQuery::default(),
            TagQuery { title: Some("Important".into()), include_items: false },
        ] {
            assert_eq!(things.count_tags(&tags).unwrap(), things.get_tags(&tags).unwrap().len());
        }
        assert_eq!(things.count_tags(&TagQuery::default()).unwrap(), 3);
        assert!(matches!(
            things.count_tags(&TagQuery { title: Some("Nope".into()), include_items: false }),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn null_columns_do_not_break_listings() {
        let fx = Fixture::new();
        fx.execute(
            "UPDATE TMTask SET title = NULL WHERE uuid = 'T5';
             UPDATE TMTask SET \"index\" = NULL WHERE uuid = 'T6';
             UPDATE TMArea SET title = NULL WHERE uuid = 'A2';
             UPDATE TMChecklistItem SET title = NULL WHERE uuid = 'C1';",
        );
        let things = fx.things();

        let tasks = things.get_tasks(&TaskQuery::default()).unwrap();
        assert_eq!(tasks.len(), 9);
        let piano = tasks.iter().find(|t| t.uuid == "T5").unwrap();
        assert_eq!(piano.title, "");
        let passport = tasks.iter().find(|t| t.uuid == "T6").unwrap();
        assert_eq!(passport.index, 0);

        let rent = things.task("T4").unwrap();
        assert_eq!(rent.area_title, None);
        assert_eq!(things.area("A2").unwrap().title, "");

        let checklist = things.checklist_items("T1").unwrap();
        assert_eq!(checklist[0].title, "");
        assert_eq!(checklist[1].title, "Brushes");
    }

    #[test]
    fn database_version_is_decoded_from_plist() {
        let fx = Fixture::new();
        assert_eq!(fx.things().version().unwrap(), Some(26));

        fx.execute("DELETE FROM Meta");
        assert_eq!(fx.things().version().unwrap(), None);
    }

    #[test]
    fn garbled_version_is_fatal() {
        let fx = Fixture::new();
        fx.execute(
            "UPDATE Meta SET value = '<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <plist version=\"1.0\"><integer>twenty</integer></plist>' \
             WHERE key = 'databaseVersion'",
        );
        let err = fx.things().version().unwrap_err();
        assert!(matches!(err, Error::Version(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn areas_resolve_tags_and_items() {
        let fx = Fixture::new();
        let things = fx.things();
        let areas = things.get_areas(&AreaQuery::default()).unwrap();
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].title, "Home");
        assert_eq!(areas[0].tags, Some(Attached::Items(vec!["Errand".to_string()])));
        assert!(areas[1].tags.is_none());
        assert!(areas[0].items.is_none());

        let home = things
            .get_areas(&AreaQuery {
                uuid: Some("A1".into()),
                include_items: true,
                ..AreaQuery::default()
            })
            .unwrap();
        let items = home[0].items.as_ref().unwrap();
        assert_eq!(uuids(items), vec!["P1"]);
        assert_eq!(uuids(items[0].items.as_ref().unwrap()), vec!["T2", "H1", "H2"]);
    }

    #[test]
    fn area_filters_and_lookup() {
        let fx = Fixture::new();
        let things = fx.things();
        let tagged = things
            .get_areas(&AreaQuery { tag: Filter::EqualsValue("Errand".into()), ..AreaQuery::default() })
            .unwrap();
        assert_eq!(tagged.len(), 1);
        let untagged = things
            .get_areas(&AreaQuery { tag: Filter::RequireAbsent, ..AreaQuery::default() })
            .unwrap();
        assert_eq!(untagged[0].uuid, "A2");

        assert_eq!(things.area("A2").unwrap().title, "Work");
        assert!(matches!(things.area("nope"), Err(Error::NotFound { kind: "area", .. })));
    }

    #[test]
    fn tags_listing() {
        let fx = Fixture::new();
        let things = fx.things();
        let tags = things.get_tags(&TagQuery::default()).unwrap();
        let titles: Vec<&str> = tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Errand", "Important", "Waiting"]);
        assert_eq!(tags[0].shortcut.as_deref(), Some("e"));
        assert_eq!(tags[0].kind, "tag");

        assert_eq!(things.tag_titles().unwrap(), vec!["Errand", "Important", "Waiting"]);
        assert_eq!(things.tags_of_task("T1").unwrap(), vec!["Errand", "Important"]);
        assert_eq!(things.tags_of_area("A1").unwrap(), vec!["Errand"]);
        assert!(things.tags_of_area("A2").unwrap().is_empty());
    }

    #[test]
    fn tag_items_are_areas_then_tasks() {
        let fx = Fixture::new();
        let errand = fx.things().tag("Errand", true).unwrap();
        let items: Vec<&str> = errand.items.as_ref().unwrap().iter().map(TagItem::uuid).collect();
        assert_eq!(items, vec!["A1", "T1", "T4"]);

        let waiting = fx.things().tag("Waiting", true).unwrap();
        assert!(waiting.items.unwrap().is_empty());
    }

    #[test]
    fn unknown_tag_title_is_rejected() {
        let fx = Fixture::new();
        let err = fx.things().tag("Nope", false).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn generic_lookup() {
        let fx = Fixture::new();
        let things = fx.things();
        assert!(matches!(things.get("T2").unwrap(), Some(Entity::Task(_))));
        assert!(matches!(things.get("A1").unwrap(), Some(Entity::Area(_))));
        match things.get("TG2").unwrap() {
            Some(Entity::Tag(tag)) => assert_eq!(tag.title, "Important"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(things.get("missing").unwrap().is_none());
    }

    #[test]
    fn auth_token_and_link() {
        let fx = Fixture::new();
        assert_eq!(fx.things().auth_token().unwrap().as_deref(), Some("secret-token"));
        assert_eq!(link("abc"), "things:///show?id=abc");
    }

    #[test]
    fn json_shape_matches_store_columns() {
        let fx = Fixture::new();
        let t1 = fx.things().task("T1").unwrap();
        let json = serde_json::to_value(&t1).unwrap();
        assert_eq!(json["type"], "to-do");
        assert_eq!(json["tags"], serde_json::json!(["Errand", "Important"]));
        assert_eq!(json["checklist"][0]["title"], "Primer");
        assert_eq!(json["heading_title"], "Kitchen");
        assert!(json.get("area").is_none());
        assert!(json.get("trashed").is_none());
        assert_eq!(json["start"], "Anytime");
    }
}
