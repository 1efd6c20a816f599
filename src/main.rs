use crate::flight::FlightPlan;
use crate::import::DataDir;
use crate::queue::{OpKind, Queue};
use crate::tower::tower::{Decision, Tower};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tabled::settings::Style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod constraints;
mod flight;
mod import;
mod metar;
mod notam;
mod queue;
mod runway;
mod time;
mod tower;

#[derive(Parser)]
struct Args {
    /// Directory holding the constraint feeds, catalog and queue files
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,
    /// Append-only operations log
    #[arg(short, long, value_name = "FILE", default_value = "logs/tower.log")]
    log_file: PathBuf,
    /// Where shift reports are written
    #[arg(short, long, value_name = "DIR", default_value = "reports")]
    reports_dir: PathBuf,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let mut pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn())
        .expect("Failed to spawn pager");

    let mut stdin = pager.stdin.take().expect("Failed to open stdin for pager");

    if let Err(e) = stdin.write_all(content.as_bytes()) {
        // Broken pipe is common if the user quits the pager early
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("Error writing to pager: {}", e);
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn init_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("towerops=info".parse()?),
        )
        .init();
    Ok(())
}

fn print_table<T: tabled::Tabled>(rows: &[T]) {
    let mut table = tabled::Table::new(rows);
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if rows.len() > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn list_catalog(tower: &Tower, sort_key: &str) {
    let mut plans: Vec<&FlightPlan> = tower.catalog().values().collect();
    match sort_key {
        "prio" => plans.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.etd.cmp(&b.etd))),
        "etd" => plans.sort_by_key(|p| p.etd),
        "type" => plans.sort_by(|a, b| a.category.cmp(&b.category)),
        _ => plans.sort_by(|a, b| a.code.cmp(&b.code)),
    }
    if plans.is_empty() {
        println!("No flight plans loaded.");
    } else {
        print_table(&plans);
    }
}

fn list_queue(tower: &Tower, op: OpKind, sort_key: Option<&str>) {
    // Sorted output is a view for the controller; the stored queue keeps
    // its structural FIFO order.
    let mut entries: Vec<_> = tower.queue(op).iter().cloned().collect();
    match sort_key {
        Some("prio") => entries.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.scheduled.cmp(&b.scheduled))),
        Some("etd") => entries.sort_by_key(|e| e.scheduled),
        _ => {}
    }
    if entries.is_empty() {
        println!("No flights in the {} queue.", op);
    } else {
        print_table(&entries);
    }
}

fn print_status(tower: &Tower) {
    println!("Runways:");
    let mut runways: Vec<_> = tower.constraints().runways().collect();
    runways.sort_by(|a, b| a.0.cmp(b.0));
    for (id, status) in runways {
        let line = format!("  {}: {}", id, status);
        match status {
            crate::runway::RunwayStatus::Open => println!("{}", line.green()),
            crate::runway::RunwayStatus::Closed => println!("{}", line.red()),
            crate::runway::RunwayStatus::Unrecognized(_) => println!("{}", line.yellow()),
        }
    }
    for op in OpKind::ALL {
        let queue = tower.queue(op);
        let head: Vec<&str> = queue.iter().take(3).map(|e| e.flight.as_ref()).collect();
        println!("{} queue ({}): {:?}", op, queue.len(), head);
    }
    println!("NOTAMs:");
    for notam in tower.constraints().notams() {
        println!("  {}", notam);
    }
}

fn write_report(tower: &Tower, reports_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(reports_dir)?;
    let now = chrono::Local::now();
    let path = reports_dir.join(format!("shift_{}.txt", now.format("%Y%m%d")));
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "Shift report {}", now.format("%Y-%m-%d %H:%M"))?;
    for op in OpKind::ALL {
        writeln!(file, "Flights waiting for {}: {}", op, tower.queue(op).len())?;
    }
    let mut runways: Vec<_> = tower.constraints().runways().collect();
    runways.sort_by(|a, b| a.0.cmp(b.0));
    for (id, status) in runways {
        writeln!(file, "Runway {}: {}", id, status)?;
    }
    Ok(path)
}

fn save_queue(tower: &Tower, op: OpKind, dir: &DataDir) {
    if let Err(e) = tower.queue(op).save_to_file(&dir.queue(op)) {
        eprintln!("Error saving the {} queue: {}", op, e);
        tracing::error!(op = %op, error = %e, "queue save failed");
    }
}

fn parse_op(token: Option<&&str>) -> Option<OpKind> {
    token.and_then(|t| OpKind::parse(t))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let dir = DataDir::new(&args.data_dir);
    dir.verify()?;
    let catalog = import::load_catalog(&dir.flights())?;
    let constraints = import::load_constraints(&dir)?;
    let takeoff = Queue::load_from_file(&dir.queue(OpKind::Takeoff))?;
    let landing = Queue::load_from_file(&dir.queue(OpKind::Landing))?;
    let mut control = Tower::new(catalog, constraints, takeoff, landing);

    println!(
        "Tower online. {} flight plans loaded from {}",
        control.catalog().len(),
        args.data_dir.display()
    );
    tracing::info!(data_dir = %args.data_dir.display(), "session started");

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "ls".to_string(),
            "queue".to_string(),
            "enqueue".to_string(),
            "authorize".to_string(),
            "status".to_string(),
            "report".to_string(),
            "import".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "ls" => {
                        let sort_key = parts.get(1).copied().unwrap_or("code");
                        list_catalog(&control, sort_key);
                    }
                    "queue" => match parse_op(parts.get(1)) {
                        Some(op) => list_queue(&control, op, parts.get(2).copied()),
                        None => println!("Usage: queue <takeoff|landing> [prio|etd]"),
                    },
                    "enqueue" => {
                        let (Some(op), Some(code)) = (parse_op(parts.get(1)), parts.get(2)) else {
                            println!("Usage: enqueue <takeoff|landing> <FLIGHT>");
                            continue;
                        };
                        match control.enqueue_flight(op, code) {
                            Ok(()) => {
                                save_queue(&control, op, &dir);
                                println!(
                                    "{}",
                                    format!("Flight {} queued for {}", code, op).green()
                                );
                                tracing::info!(flight = %code, op = %op, "flight queued");
                            }
                            Err(e) => {
                                println!("{}", format!("Rejected: {}", e).red());
                                tracing::warn!(flight = %code, op = %op, error = %e, "enqueue rejected");
                            }
                        }
                    }
                    "authorize" => {
                        let (Some(op), Some(runway)) = (parse_op(parts.get(1)), parts.get(2))
                        else {
                            println!("Usage: authorize <takeoff|landing> <RUNWAY>");
                            continue;
                        };
                        match control.authorize(op, runway) {
                            Decision::Authorize { flight, runway } => {
                                save_queue(&control, op, &dir);
                                println!(
                                    "{}",
                                    format!("CLEARED: flight {} runway {}", flight, runway)
                                        .green()
                                        .bold()
                                );
                                tracing::info!(flight = %flight, runway = %runway, op = %op, "clearance issued");
                            }
                            Decision::Deny(reason) => {
                                println!("{}", format!("DENIED: {}", reason).red().bold());
                                tracing::warn!(runway = %runway, op = %op, reason = %reason, "clearance denied");
                            }
                        }
                    }
                    "status" => print_status(&control),
                    "report" => match write_report(&control, &args.reports_dir) {
                        Ok(path) => {
                            println!("Report written to {}", path.display());
                            tracing::info!(path = %path.display(), "shift report written");
                        }
                        Err(e) => eprintln!("Error writing report: {}", e),
                    },
                    "import" => match dir.verify().and_then(|_| {
                        Ok((import::load_catalog(&dir.flights())?, import::load_constraints(&dir)?))
                    }) {
                        Ok((catalog, constraints)) => {
                            control.reimport(catalog, constraints);
                            for op in OpKind::ALL {
                                save_queue(&control, op, &dir);
                            }
                            println!(
                                "Data imported: {} flight plans, queues reset.",
                                control.catalog().len()
                            );
                            tracing::info!(plans = control.catalog().len(), "data imported");
                        }
                        Err(e) => {
                            println!("{}", format!("Import failed: {}", e).red());
                            tracing::warn!(error = %e, "import failed");
                        }
                    },
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  ls [code|etd|prio|type]          - List the flight plan catalog");
                        println!("  queue <t|l> [prio|etd]           - List a queue (sorted views only; order is FIFO)");
                        println!("  enqueue <takeoff|landing> <FLT>  - Add a catalogued flight to a queue");
                        println!("  authorize <takeoff|landing> <RWY>- Decide on the head of a queue");
                        println!("  status                           - Runways, queues and NOTAMs");
                        println!("  report                           - Write the shift report");
                        println!("  import                           - Reload all feeds and reset the queues");
                        println!("  help / ?                         - Show this help menu");
                        println!("  exit / quit                      - Close the tower session\n");
                    }
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    tracing::info!("session closed");
    Ok(())
}
