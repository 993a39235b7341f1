use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use weekgrid::application::commands::{
    AppState, CreateTaskInput, create_task_impl, delete_task_impl, drain_notifications_impl,
    import_events_impl, load_tasks_impl, suggest_slot_impl, tasks_at_impl, week_snapshot_impl,
};
use weekgrid::infrastructure::error::InfraError;

/// Weekly hour-grid view of a remote task store.
#[derive(Parser, Debug)]
#[command(name = "weekgrid", version, about)]
struct Cli {
    /// Workspace holding config/ and logs/ (defaults to the current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every task and print the week grid with the priority lists
    Show {
        /// Only print cells that have occupants
        #[arg(long)]
        occupied: bool,
    },

    /// Add a task; auto mode lets the store pick the slot before the deadline
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// High, Medium or Low
        #[arg(long, default_value = "Medium")]
        priority: String,

        /// Length in whole hours
        #[arg(long, default_value_t = 1)]
        duration: u32,

        /// manual or auto
        #[arg(long, default_value = "manual")]
        mode: String,

        #[arg(long)]
        day: Option<String>,

        /// HH:MM
        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        deadline_day: Option<String>,

        /// HH:MM
        #[arg(long)]
        deadline_time: Option<String>,
    },

    /// Delete a task by id
    Delete { id: i64 },

    /// List the tasks occupying one grid cell
    Slot {
        day: String,

        /// HH:MM
        time: String,
    },

    /// Ask the store to import calendar events, then reload
    Import,

    /// Preview the earliest free slot that finishes by the deadline
    Suggest {
        #[arg(long, default_value = "Medium")]
        priority: String,

        #[arg(long, default_value_t = 1)]
        duration: u32,

        #[arg(long)]
        deadline_day: String,

        /// HH:MM
        #[arg(long)]
        deadline_time: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Show { .. } => "show",
            Self::Add { .. } => "create_task",
            Self::Delete { .. } => "delete_task",
            Self::Slot { .. } => "tasks_at",
            Self::Import => "import_events",
            Self::Suggest { .. } => "suggest_slot",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("weekgrid=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let workspace_root = match cli.workspace.map(Ok).unwrap_or_else(std::env::current_dir) {
        Ok(path) => path,
        Err(error) => {
            eprintln!("cannot resolve workspace: {error}");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(workspace_root) {
        Ok(state) => state,
        Err(error) => {
            eprintln!("failed to initialize workspace: {error}");
            return ExitCode::FAILURE;
        }
    };

    let command_name = cli.command.name();
    let outcome = run(&state, cli.command).await;

    for notification in drain_notifications_impl(&state) {
        eprintln!("[{:?}] {}", notification.kind, notification.message);
    }

    match outcome {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {}", state.command_error(command_name, &error));
            ExitCode::FAILURE
        }
    }
}

async fn run(state: &AppState, command: Command) -> Result<String, InfraError> {
    // Every invocation starts from an empty registry, so all commands other
    // than import (which reloads on its own) begin with a full load.
    if !matches!(command, Command::Import) {
        load_tasks_impl(state).await?;
    }

    match command {
        Command::Show { occupied } => render(&week_snapshot_impl(state, occupied)?),
        Command::Add {
            title,
            description,
            priority,
            duration,
            mode,
            day,
            time,
            deadline_day,
            deadline_time,
        } => {
            let input = CreateTaskInput {
                title,
                description: Some(description),
                priority,
                duration,
                mode: Some(mode),
                day,
                time,
                deadline_day,
                deadline_time,
            };
            render(&create_task_impl(state, input).await?)
        }
        Command::Delete { id } => render(&delete_task_impl(state, id).await?),
        Command::Slot { day, time } => render(&tasks_at_impl(state, day, time).await?),
        Command::Import => render(&import_events_impl(state).await?),
        Command::Suggest {
            priority,
            duration,
            deadline_day,
            deadline_time,
        } => render(&suggest_slot_impl(
            state,
            priority,
            duration,
            deadline_day,
            deadline_time,
        )?),
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, InfraError> {
    Ok(serde_json::to_string_pretty(value)?)
}
