mod cli;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use things::api::{link, show, Things};
use things::db::Database;
use things::filter::{AreaQuery, TagQuery, TaskQuery};
use things::model::Task;
use things::output;

use cli::{Cli, Command, ListArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        let fatal = e
            .downcast_ref::<things::Error>()
            .is_some_and(things::Error::is_fatal);
        std::process::exit(if fatal { 2 } else { 1 });
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_tasks(tasks: &[Task], json: bool, tree: bool) -> Result<()> {
    if json {
        print_json(tasks)
    } else {
        if tree {
            print!("{}", output::format_task_tree(tasks));
        } else {
            print!("{}", output::format_task_list(tasks));
        }
        Ok(())
    }
}

/// Run a preset view, or count what it would return.
fn list(
    things: &Things,
    json: bool,
    args: &ListArgs,
    base: TaskQuery,
    preset: impl FnOnce(&Things, TaskQuery) -> things::Result<Vec<Task>>,
    narrow: impl FnOnce(TaskQuery) -> TaskQuery,
) -> Result<()> {
    if args.count {
        println!("{}", things.count_tasks(&narrow(base))?);
        return Ok(());
    }
    let tasks = preset(things, base)?;
    print_tasks(&tasks, json, args.items)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let db = Database::open(cli.db.as_deref()).print_sql(cli.print_sql);
    log::debug!("using database {}", db.path().display());
    let things = Things::new(db);
    let json = cli.json;

    match cli.command {
        Command::Inbox(args) => list(&things, json, &args, args.query(), Things::inbox, TaskQuery::inbox)?,
        Command::Today(args) => list(&things, json, &args, args.query(), Things::today, TaskQuery::today)?,
        Command::Upcoming(args) => {
            list(&things, json, &args, args.query(), Things::upcoming, TaskQuery::upcoming)?
        }
        Command::Anytime(args) => {
            list(&things, json, &args, args.query(), Things::anytime, TaskQuery::anytime)?
        }
        Command::Someday(args) => {
            list(&things, json, &args, args.query(), Things::someday, TaskQuery::someday)?
        }
        Command::Completed(args) => {
            list(&things, json, &args, args.query(), Things::completed, TaskQuery::completed)?
        }
        Command::Canceled(args) => {
            list(&things, json, &args, args.query(), Things::canceled, TaskQuery::canceled)?
        }
        Command::Due(args) => list(&things, json, &args, args.query(), Things::due, TaskQuery::due_only)?,
        Command::Todos(args) => list(&things, json, &args, args.query(), Things::todos, TaskQuery::todos)?,
        Command::Projects(args) => {
            list(&things, json, &args, args.query(), Things::projects, TaskQuery::projects)?
        }

        Command::Logbook(args) => {
            if args.count {
                println!("{}", things.count_logbook(args.query())?);
            } else {
                print_tasks(&things.logbook(args.query())?, json, args.items)?;
            }
        }

        Command::Search { query, list: args } => {
            let base = args.query().search(query);
            if args.count {
                println!("{}", things.count_tasks(&base)?);
            } else {
                print_tasks(&things.get_tasks(&base)?, json, args.items)?;
            }
        }

        Command::Tasks(args) => {
            let query = args.query();
            if args.list.count {
                println!("{}", things.count_tasks(&query)?);
            } else {
                print_tasks(&things.get_tasks(&query)?, json, args.list.items)?;
            }
        }

        Command::Task { uuid, items } => {
            let query = TaskQuery {
                include_items: items,
                ..TaskQuery::by_uuid(uuid.as_str())
            };
            let task = things
                .get_tasks(&query)?
                .into_iter()
                .next()
                .ok_or_else(|| things::Error::not_found("task", &uuid))?;
            if json {
                print_json(&task)?;
            } else {
                print!("{}", output::format_task_detail(&task));
            }
        }

        Command::Areas {
            uuid,
            tag,
            items,
            count,
        } => {
            let query = AreaQuery {
                uuid,
                tag: tag.unwrap_or_default(),
                include_items: items,
            };
            if count {
                println!("{}", things.count_areas(&query)?);
            } else {
                let areas = things.get_areas(&query)?;
                if json {
                    print_json(&areas)?;
                } else {
                    print!("{}", output::format_areas(&areas));
                }
            }
        }

        Command::Tags {
            title,
            area,
            task,
            titles_only,
            items,
            count,
        } => {
            let titles = if let Some(area) = area {
                Some(things.tags_of_area(&area)?)
            } else if let Some(task) = task {
                Some(things.tags_of_task(&task)?)
            } else if titles_only {
                Some(things.tag_titles()?)
            } else {
                None
            };
            match titles {
                Some(titles) if json => print_json(&titles)?,
                Some(titles) => titles.iter().for_each(|t| println!("{t}")),
                None => {
                    let query = TagQuery {
                        title,
                        include_items: items,
                    };
                    if count {
                        println!("{}", things.count_tags(&query)?);
                        return Ok(());
                    }
                    let tags = things.get_tags(&query)?;
                    if json {
                        print_json(&tags)?;
                    } else {
                        print!("{}", output::format_tags(&tags));
                    }
                }
            }
        }

        Command::Get { uuid } => match things.get(&uuid)? {
            Some(entity) if json => print_json(&entity)?,
            Some(entity) => print!("{}", output::format_entity(&entity)),
            None => anyhow::bail!("nothing found with uuid '{uuid}'"),
        },

        Command::Link { uuid } => println!("{}", link(&uuid)),

        Command::Show { uuid } => {
            show(&uuid)?;
            eprintln!("Opened '{uuid}'");
        }

        Command::Token => match things.auth_token()? {
            Some(token) => println!("{token}"),
            None => anyhow::bail!("no authentication token set"),
        },

        Command::Version => match things.version()? {
            Some(version) => println!("{version}"),
            None => anyhow::bail!("no database version recorded"),
        },
    }

    Ok(())
}
