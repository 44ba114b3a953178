use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tasksmith::prelude::*;
use tasksmith::task::{DocumentShape, to_pretty_string};

/// Normalize, compare and replay agent-evaluation task files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a task file and print it re-exported
    Normalize {
        /// Path to the task JSON file
        task_path: PathBuf,
        /// Write the result back to the file instead of printing it
        #[arg(short, long)]
        in_place: bool,
    },
    /// Line diff of two task files
    Diff {
        before_path: PathBuf,
        after_path: PathBuf,
    },
    /// Print the merged edge graph of a task or graph file
    Graph {
        path: PathBuf,
    },
    /// Select an environment, import a task, run every action and print the result
    Run {
        task_path: PathBuf,
        #[arg(short, long)]
        environment: String,
        #[arg(short, long)]
        interface: String,
        /// Backend base URL
        #[arg(long, env = "TASKSMITH_BACKEND_URL", default_value = "http://localhost:5000")]
        url: String,
        /// Seconds to wait between two actions
        #[arg(long, default_value_t = 1.0)]
        delay: f64,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize {
            task_path,
            in_place,
        } => {
            let document = load_task(&task_path);
            if in_place {
                document.save(&task_path).unwrap_or_else(|e| exit_with_error(&e.to_string()));
                println!("Normalized '{}'", task_path.display());
            } else {
                println!("{}", document.export());
            }
        }
        Command::Diff {
            before_path,
            after_path,
        } => {
            let before = load_task(&before_path);
            let after = load_task(&after_path);
            let diff = TaskDiff::between(
                &to_pretty_string(&before.to_value_in(DocumentShape::Nested)),
                &to_pretty_string(&after.to_value_in(DocumentShape::Nested)),
            );
            println!("{}", diff);
        }
        Command::Graph { path } => {
            let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read '{}': {}", path.display(), e))
            });
            let value: serde_json::Value = serde_json::from_str(&text)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse JSON: {}", e)));
            let mut graph = EdgeGraph::new();
            graph
                .import(&value)
                .unwrap_or_else(|e| exit_with_error(&e.to_string()));
            println!("{}", to_pretty_string(&graph.to_document()));
        }
        Command::Run {
            task_path,
            environment,
            interface,
            url,
            delay,
        } => {
            run(task_path, &environment, &interface, url, delay).await;
        }
    }
}

async fn run(task_path: PathBuf, environment: &str, interface: &str, url: String, delay: f64) {
    let total_start = Instant::now();
    let delay = Duration::try_from_secs_f64(delay)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid delay: {}", e)));
    let config = ClientConfig::builder(url).with_batch_delay(delay).build();
    let dispatcher =
        Dispatcher::from_config(config).unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let mut session = SessionState::new();

    let operations = dispatcher
        .select_environment(&mut session, environment, interface)
        .await
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("Loaded {} operation(s) for '{}'", operations, environment);

    let document = load_task(&task_path);
    let ids = session
        .import_document(document)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("Imported {} action(s)", ids.len());

    let summary = dispatcher
        .execute_all(&mut session)
        .await
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    for failure in &summary.failures {
        eprintln!("Action {} failed: {}", failure.position, failure.message);
    }
    println!(
        "\nFinished in {:.2?}: {} succeeded, {} failed",
        total_start.elapsed(),
        summary.success_count,
        summary.error_count
    );

    let exported = session
        .export()
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("{}", exported);
}

fn load_task(path: &PathBuf) -> TaskDocument {
    TaskDocument::from_file(path).unwrap_or_else(|e| exit_with_error(&e.to_string()))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
