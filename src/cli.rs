use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use things::filter::{Filter, TaskQuery};
use things::model::{Index, Start, Status, TaskType};
use things::paths::ENV_DB_PATH;

#[derive(Parser)]
#[command(name = "things", about = "Read-only access to the Things 3 database")]
pub struct Cli {
    /// Path to the Things database [default: the app's group container]
    #[arg(long, env = ENV_DB_PATH, global = true)]
    pub db: Option<PathBuf>,

    /// Print every SQL statement to stderr before it runs
    #[arg(long, global = true)]
    pub print_sql: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by the task listings.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Expand projects, headings and checklists
    #[arg(long)]
    pub items: bool,
    /// Print the number of matches instead of the tasks
    #[arg(long)]
    pub count: bool,
    /// Area uuid, `any` or `none`
    #[arg(long)]
    pub area: Option<Filter<String>>,
    /// Project uuid, `any` or `none`
    #[arg(long)]
    pub project: Option<Filter<String>>,
    /// Tag title, `any` or `none`
    #[arg(long)]
    pub tag: Option<Filter<String>>,
    /// Only tasks whose title, notes or area title contain this text
    #[arg(long)]
    pub search: Option<String>,
    /// Only tasks created within this window (e.g. 3d, 2w, 1y)
    #[arg(long)]
    pub last: Option<String>,
}

impl ListArgs {
    /// Base query carrying these flags on top of the defaults.
    pub fn query(&self) -> TaskQuery {
        TaskQuery {
            area: self.area.clone().unwrap_or_default(),
            project: self.project.clone().unwrap_or_default(),
            tag: self.tag.clone().unwrap_or_default(),
            search_query: self.search.clone(),
            last: self.last.clone(),
            include_items: self.items,
            ..TaskQuery::default()
        }
    }
}

/// `any` disables the status filter.
#[derive(Debug, Clone, Copy)]
pub enum StatusArg {
    Any,
    Is(Status),
}

impl std::str::FromStr for StatusArg {
    type Err = things::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            other => other.parse().map(Self::Is),
        }
    }
}

/// `any` includes trashed and untrashed tasks.
#[derive(Debug, Clone, Copy)]
pub enum TrashedArg {
    Any,
    Is(bool),
}

impl std::str::FromStr for TrashedArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            "true" => Ok(Self::Is(true)),
            "false" => Ok(Self::Is(false)),
            _ => Err(format!("expected true, false or any, got '{s}'")),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TasksArgs {
    #[command(flatten)]
    pub list: ListArgs,
    /// to-do, project or heading
    #[arg(long = "type")]
    pub kind: Option<TaskType>,
    /// incomplete, canceled, completed or any [default: incomplete]
    #[arg(long)]
    pub status: Option<StatusArg>,
    /// Inbox, Anytime or Someday
    #[arg(long)]
    pub start: Option<Start>,
    /// Heading uuid, `any` or `none`
    #[arg(long)]
    pub heading: Option<Filter<String>>,
    /// Require (true) or forbid (false) a start date
    #[arg(long)]
    pub start_date: Option<bool>,
    /// Require (true) or forbid (false) a deadline
    #[arg(long)]
    pub deadline: Option<bool>,
    /// true, false or any [default: false]
    #[arg(long)]
    pub trashed: Option<TrashedArg>,
    /// Ordering column: index or todayIndex
    #[arg(long)]
    pub index: Option<Index>,
}

impl TasksArgs {
    pub fn query(&self) -> TaskQuery {
        let base = self.list.query();
        TaskQuery {
            kind: self.kind,
            status: match self.status {
                None => base.status,
                Some(StatusArg::Any) => None,
                Some(StatusArg::Is(s)) => Some(s),
            },
            start: self.start,
            heading: self.heading.clone().unwrap_or_default(),
            start_date: self.start_date,
            deadline: self.deadline,
            trashed: match self.trashed {
                None => base.trashed,
                Some(TrashedArg::Any) => None,
                Some(TrashedArg::Is(t)) => Some(t),
            },
            index: self.index.unwrap_or_default(),
            ..base
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// To-dos in the Inbox
    Inbox(ListArgs),
    /// Tasks shown under Today
    Today(ListArgs),
    /// Scheduled tasks
    Upcoming(ListArgs),
    /// Tasks in Anytime
    Anytime(ListArgs),
    /// Unscheduled tasks in Someday
    Someday(ListArgs),
    /// Completed and canceled tasks, newest first
    Logbook(ListArgs),
    /// Completed tasks
    Completed(ListArgs),
    /// Canceled tasks
    Canceled(ListArgs),
    /// Tasks with a deadline, soonest first
    Due(ListArgs),
    /// Incomplete to-dos
    Todos(ListArgs),
    /// Incomplete projects
    Projects(ListArgs),

    /// List tasks with every filter available
    Tasks(TasksArgs),

    /// Show one task
    Task {
        /// Task uuid
        uuid: String,
        /// Expand a project's headings and to-dos
        #[arg(long)]
        items: bool,
    },

    /// List areas
    Areas {
        /// Only this area
        #[arg(long)]
        uuid: Option<String>,
        /// Tag title, `any` or `none`
        #[arg(long)]
        tag: Option<Filter<String>>,
        /// Include each area's tasks
        #[arg(long)]
        items: bool,
        /// Print the number of matches instead of the areas
        #[arg(long)]
        count: bool,
    },

    /// List tags
    Tags {
        /// Only the tag with this title
        #[arg(long, conflicts_with_all = ["area", "task", "titles_only"])]
        title: Option<String>,
        /// Tags attached to this area uuid
        #[arg(long, conflicts_with_all = ["task", "titles_only"])]
        area: Option<String>,
        /// Tags attached to this task uuid
        #[arg(long, conflicts_with = "titles_only")]
        task: Option<String>,
        /// Print tag titles only
        #[arg(long)]
        titles_only: bool,
        /// Include the areas and tasks carrying each tag
        #[arg(long)]
        items: bool,
        /// Print the number of matches instead of the tags
        #[arg(long, conflicts_with_all = ["area", "task", "titles_only"])]
        count: bool,
    },

    /// Search incomplete tasks by title, notes and area title
    Search {
        /// Text to look for
        query: String,
        #[command(flatten)]
        list: ListArgs,
    },

    /// Look up a task, area or tag by uuid
    Get {
        /// Entity uuid
        uuid: String,
    },

    /// Print the things:/// link for a uuid
    Link {
        /// Entity uuid
        uuid: String,
    },

    /// Open a uuid in the app
    Show {
        /// Entity uuid
        uuid: String,
    },

    /// Print the URL scheme authentication token
    Token,

    /// Print the database schema version
    Version,
}
