use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::cli::commands::*;
use crate::cli::output::{StatsJson, TaskJson, TaskListJson, short_id, task_line};
use crate::model::task::{SortMode, Urgency};
use crate::ops::coordinator::{Coordinator, Reorder};
use crate::store::JsonStore;

type CliResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CliResult {
    let json = cli.json;
    let file = cli.file.as_deref().unwrap_or("agenda.json");

    match cli.command {
        Commands::Add(args) => cmd_add(args, file, json),
        Commands::List(args) => cmd_list(args, file, json),
        Commands::Done(args) => cmd_done(args, file),
        Commands::Edit(args) => cmd_edit(args, file),
        Commands::Mv(args) => cmd_mv(args, file),
        Commands::Rm(args) => cmd_rm(args, file),
        Commands::Clear(args) => cmd_clear(args, file),
        Commands::Stats => cmd_stats(file, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open(file: &str) -> Result<Coordinator<JsonStore>, Box<dyn std::error::Error>> {
    let (coord, report) = Coordinator::load(JsonStore::new(file))?;
    if report.renumbered > 0 {
        eprintln!("repaired {} task position(s)", report.renumbered);
    }
    for id in &report.failed {
        eprintln!("warning: repaired position for {id} was not saved");
    }
    Ok(coord)
}

fn resolve(coord: &Coordinator<JsonStore>, prefix: &str) -> Result<String, String> {
    coord
        .resolve_id(prefix)
        .map(|t| t.id.clone())
        .ok_or_else(|| format!("no task matching '{prefix}'"))
}

fn parse_urgency(s: &str) -> Result<Urgency, String> {
    Urgency::from_name(s).ok_or_else(|| format!("unknown urgency '{s}' (high, medium, low)"))
}

fn parse_due(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| format!("invalid date '{s}' (use YYYY-MM-DD or RFC 3339)"))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, file: &str, json: bool) -> CliResult {
    let urgency = parse_urgency(&args.urgency)?;
    let due = args.due.as_deref().map(parse_due).transpose()?;

    let mut coord = open(file)?;
    let id = coord.add_task(&args.text, urgency)?.id.clone();
    if due.is_some() {
        coord.set_due_date(&id, due)?;
    }
    if args.category.is_some() {
        coord.set_category(&id, args.category.clone())?;
    }

    let task = coord.get(&id).ok_or("task vanished after insert")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&TaskJson::from_task(task))?);
    } else {
        println!("added {}", task_line(task));
    }
    // A full head slot forces a respace of existing rows; surface any row
    // whose new position did not reach the store.
    for id in coord.dirty_ids() {
        eprintln!("warning: position for {id} was not saved");
    }
    Ok(())
}

fn cmd_list(args: ListArgs, file: &str, json: bool) -> CliResult {
    let mode = SortMode::from_name(&args.sort)
        .ok_or_else(|| format!("unknown sort mode '{}' (manual, urgency, time)", args.sort))?;

    let mut coord = open(file)?;
    coord.set_mode(mode);
    let needle = args.filter.as_deref().map(str::to_lowercase);
    let tasks: Vec<_> = coord
        .sorted()
        .into_iter()
        .filter(|t| {
            needle
                .as_ref()
                .is_none_or(|n| t.text.to_lowercase().contains(n))
        })
        .collect();

    if json {
        let out = TaskListJson {
            sort: mode.name(),
            tasks: tasks.iter().map(|t| TaskJson::from_task(t)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if tasks.is_empty() {
        if needle.is_some() {
            println!("no matching tasks.");
        } else {
            println!("no tasks. enjoy your day!");
        }
    } else {
        for task in tasks {
            println!("{}", task_line(task));
        }
    }
    Ok(())
}

fn cmd_done(args: DoneArgs, file: &str) -> CliResult {
    let mut coord = open(file)?;
    let id = resolve(&coord, &args.id)?;
    let completed = coord.toggle(&id)?;
    println!(
        "{} {}",
        if completed { "completed" } else { "reopened" },
        short_id(&id)
    );
    Ok(())
}

fn cmd_edit(args: EditArgs, file: &str) -> CliResult {
    let urgency = args.urgency.as_deref().map(parse_urgency).transpose()?;

    let mut coord = open(file)?;
    let id = resolve(&coord, &args.id)?;
    coord.edit(&id, args.text.as_deref(), urgency)?;

    if let Some(due) = args.due.as_deref() {
        let due = if due == "none" { None } else { Some(parse_due(due)?) };
        coord.set_due_date(&id, due)?;
    }
    if let Some(category) = args.category {
        let category = if category == "none" { None } else { Some(category) };
        coord.set_category(&id, category)?;
    }

    let task = coord.get(&id).ok_or("task vanished after edit")?;
    println!("updated {}", task_line(task));
    Ok(())
}

fn cmd_mv(args: MvArgs, file: &str) -> CliResult {
    let mut coord = open(file)?;
    let id = resolve(&coord, &args.id)?;
    let target = resolve(&coord, &args.target)?;

    match coord.reorder(&id, &target)? {
        Reorder::Moved { .. } => println!("moved {}", short_id(&id)),
        Reorder::Renumbered { failed } => {
            println!("moved {} (positions respaced)", short_id(&id));
            for fid in failed {
                eprintln!("warning: position for {fid} was not saved");
            }
        }
        Reorder::Ignored => println!("nothing to move"),
    }
    Ok(())
}

fn cmd_rm(args: RmArgs, file: &str) -> CliResult {
    let mut coord = open(file)?;
    let id = resolve(&coord, &args.id)?;
    coord.remove(&id)?;
    println!("deleted {}", short_id(&id));
    Ok(())
}

fn cmd_clear(args: ClearArgs, file: &str) -> CliResult {
    let mut coord = open(file)?;
    let (removed, failed) = if args.completed {
        coord.remove_completed()
    } else {
        coord.clear()
    };
    println!("deleted {removed} task(s)");
    for id in failed {
        eprintln!("warning: {id} was not removed from the store");
    }
    Ok(())
}

fn cmd_stats(file: &str, json: bool) -> CliResult {
    let coord = open(file)?;
    let total = coord.len();
    let completed = coord.tasks().iter().filter(|t| t.completed).count();
    let percent = if total == 0 {
        0
    } else {
        (completed * 100 / total) as u32
    };

    if json {
        let out = StatsJson {
            total,
            completed,
            pending: total - completed,
            percent,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{completed}/{total} done ({percent}%)");
    }
    Ok(())
}
