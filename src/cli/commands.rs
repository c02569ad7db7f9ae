use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agenda", about = concat!("agenda v", env!("CARGO_PKG_VERSION"), " - your day, in order"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task file to use (default: agenda.json)
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task (new tasks go to the top of the manual order)
    Add(AddArgs),
    /// List tasks
    List(ListArgs),
    /// Toggle a task's completed state
    Done(DoneArgs),
    /// Edit a task's text, urgency, due date, or category
    Edit(EditArgs),
    /// Move a task to another task's slot in the manual order
    Mv(MvArgs),
    /// Delete a task permanently
    Rm(RmArgs),
    /// Delete completed tasks, or everything
    Clear(ClearArgs),
    /// Show completion statistics
    Stats,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Urgency: high, medium, low
    #[arg(short, long, default_value = "medium")]
    pub urgency: String,
    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due: Option<String>,
    /// Category label
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Sort mode: manual, urgency, time
    #[arg(short, long, default_value = "manual")]
    pub sort: String,
    /// Only show tasks whose text contains this (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task id (a unique prefix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id (a unique prefix is enough)
    pub id: String,
    /// New text
    #[arg(long)]
    pub text: Option<String>,
    /// New urgency: high, medium, low
    #[arg(short, long)]
    pub urgency: Option<String>,
    /// New due date (YYYY-MM-DD or RFC 3339); "none" clears it
    #[arg(long)]
    pub due: Option<String>,
    /// New category; "none" clears it
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task to move (a unique prefix is enough)
    pub id: String,
    /// Task whose slot it should take
    pub target: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task id (a unique prefix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Only delete completed tasks
    #[arg(long)]
    pub completed: bool,
}
