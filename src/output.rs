use crate::model::{Area, Attached, ChecklistItem, Entity, Tag, TagItem, Task, TaskType};

/// Status icon, or `#` for headings.
fn task_icon(task: &Task) -> &'static str {
    match task.kind {
        TaskType::Heading => "#",
        _ => task.status.icon(),
    }
}

/// Where a task lives: heading, else project, else area.
fn context(task: &Task) -> String {
    if let Some(h) = &task.heading_title {
        format!(" (heading: {h})")
    } else if let Some(p) = &task.project_title {
        format!(" (project: {p})")
    } else if let Some(a) = &task.area_title {
        format!(" (area: {a})")
    } else {
        String::new()
    }
}

fn suffix(task: &Task) -> String {
    let mut out = String::new();
    let tags = task.tag_titles();
    if !tags.is_empty() {
        out.push_str(&format!("  #{}", tags.join(" #")));
    }
    if let Some(d) = &task.deadline {
        out.push_str(&format!("  due {d}"));
    }
    out
}

fn task_line(task: &Task) -> String {
    format!(
        "{} {}  [{}]{}",
        task_icon(task),
        task.title,
        task.uuid,
        suffix(task)
    )
}

pub fn format_task_list(tasks: &[Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        out.push_str(&format!("{}{}\n", task_line(task), context(task)));
    }
    out
}

/// Something that can hang below a task in the tree.
enum Node<'a> {
    Task(&'a Task),
    Check(&'a ChecklistItem),
}

impl Node<'_> {
    fn line(&self) -> String {
        match self {
            Self::Task(t) => task_line(t),
            Self::Check(c) => format!("{} {}", c.status.icon(), c.title),
        }
    }

    fn children(&self) -> Vec<Node<'_>> {
        let Self::Task(task) = self else {
            return Vec::new();
        };
        let checklist = match &task.checklist {
            Some(Attached::Items(items)) => items.iter().map(Node::Check).collect(),
            _ => Vec::new(),
        };
        let items = task.items.iter().flatten().map(Node::Task);
        checklist.into_iter().chain(items).collect()
    }
}

/// Render tasks with their expanded items and checklists nested below.
pub fn format_task_tree(tasks: &[Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        write_tree(&mut out, &Node::Task(task), "", "");
    }
    out
}

/// `line_prefix` goes before this node's icon, `child_prefix` is the base
/// for its children's connectors.
fn write_tree(out: &mut String, node: &Node<'_>, line_prefix: &str, child_prefix: &str) {
    out.push_str(&format!("{line_prefix}{}\n", node.line()));

    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let (connector, extension) = if i == children.len() - 1 {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        write_tree(
            out,
            child,
            &format!("{child_prefix}{connector}"),
            &format!("{child_prefix}{extension}"),
        );
    }
}

pub fn format_task_detail(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("Title:       {}\n", task.title));
    out.push_str(&format!("UUID:        {}\n", task.uuid));
    out.push_str(&format!("Type:        {}\n", task.kind));
    out.push_str(&format!("Status:      {}\n", task.status));
    if task.trashed == Some(true) {
        out.push_str("Trashed:     yes\n");
    }
    if let Some(start) = task.start {
        out.push_str(&format!("Start:       {start}\n"));
    }
    if let (Some(uuid), Some(title)) = (&task.area, &task.area_title) {
        out.push_str(&format!("Area:        {title} [{uuid}]\n"));
    }
    if let (Some(uuid), Some(title)) = (&task.project, &task.project_title) {
        out.push_str(&format!("Project:     {title} [{uuid}]\n"));
    }
    if let (Some(uuid), Some(title)) = (&task.heading, &task.heading_title) {
        out.push_str(&format!("Heading:     {title} [{uuid}]\n"));
    }
    let tags = task.tag_titles();
    if !tags.is_empty() {
        out.push_str(&format!("Tags:        {}\n", tags.join(", ")));
    }
    if let Some(d) = &task.start_date {
        out.push_str(&format!("Start date:  {d}\n"));
    }
    if let Some(d) = &task.deadline {
        out.push_str(&format!("Deadline:    {d}\n"));
    }
    if let Some(d) = &task.stop_date {
        out.push_str(&format!("Stopped:     {d}\n"));
    }
    if let Some(d) = &task.created {
        out.push_str(&format!("Created:     {d}\n"));
    }
    if let Some(d) = &task.modified {
        out.push_str(&format!("Modified:    {d}\n"));
    }

    if let Some(notes) = task.notes.as_deref().filter(|n| !n.is_empty()) {
        out.push_str("\nNotes:\n");
        for line in notes.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }

    if let Some(Attached::Items(items)) = &task.checklist {
        out.push_str("\nChecklist:\n");
        for item in items {
            out.push_str(&format!("  {} {}\n", item.status.icon(), item.title));
        }
    }

    if let Some(items) = task.items.as_ref().filter(|i| !i.is_empty()) {
        out.push_str("\nItems:\n");
        for line in format_task_tree(items).lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }

    out
}

pub fn format_areas(areas: &[Area]) -> String {
    let mut out = String::new();
    for area in areas {
        let tags = match &area.tags {
            Some(Attached::Items(tags)) if !tags.is_empty() => format!("  #{}", tags.join(" #")),
            _ => String::new(),
        };
        out.push_str(&format!("{}  [{}]{}\n", area.title, area.uuid, tags));
        if let Some(items) = &area.items {
            for line in format_task_tree(items).lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
    }
    out
}

pub fn format_tags(tags: &[Tag]) -> String {
    let mut out = String::new();
    for tag in tags {
        let shortcut = tag
            .shortcut
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();
        out.push_str(&format!("{}{}  [{}]\n", tag.title, shortcut, tag.uuid));
        for item in tag.items.iter().flatten() {
            match item {
                TagItem::Area(area) => {
                    out.push_str(&format!("  area {}  [{}]\n", area.title, area.uuid))
                }
                TagItem::Task(task) => out.push_str(&format!("  {}\n", task_line(task))),
            }
        }
    }
    out
}

pub fn format_entity(entity: &Entity) -> String {
    match entity {
        Entity::Task(task) => format_task_detail(task),
        Entity::Area(area) => format_areas(std::slice::from_ref(area)),
        Entity::Tag(tag) => format_tags(std::slice::from_ref(tag)),
    }
}
