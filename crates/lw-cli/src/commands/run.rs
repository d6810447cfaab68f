use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use lw_engine::{Engine, EngineConfig, OutputBuffers, SignalSet, TurnInput};
use miette::{IntoDiagnostic, Result, WrapErr};

/// Arguments for `lw run`.
#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Path to the lore book JSON
    #[arg(short, long)]
    pub book: PathBuf,

    /// Current message text
    #[arg(short, long)]
    pub message: String,

    /// History file, one turn per line, oldest first
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Active character name (enables name blocks)
    #[arg(long)]
    pub name: Option<String>,

    /// Override the message count seen by time gates
    #[arg(long)]
    pub count: Option<u64>,

    /// Active signal name; repeatable
    #[arg(long = "signal")]
    pub signals: Vec<String>,

    /// Cap on rules selected per turn
    #[arg(long, default_value = "6")]
    pub limit: usize,

    /// Window depth in turns
    #[arg(long, default_value = "5")]
    pub depth: usize,

    /// RNG seed for probability gates
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Print trace lines
    #[arg(long)]
    pub debug: bool,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let book = super::load_book(&args.book)?;
    let config = EngineConfig::default()
        .with_apply_limit(args.limit)
        .with_window_depth(args.depth)
        .with_seed(args.seed)
        .with_debug(args.debug);
    let mut engine = Engine::new(book, config);

    let mut turns: Vec<String> = match &args.history {
        Some(path) => fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot read history '{}'", path.display()))?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };
    turns.push(args.message.clone());

    let mut input = TurnInput::from_turns(turns)
        .with_signals(args.signals.iter().collect::<SignalSet>());
    if let Some(name) = &args.name {
        input = input.with_character_name(name.clone());
    }
    if let Some(count) = args.count {
        input = input.with_message_count(count);
    }

    let mut out = OutputBuffers::new();
    let report = engine.run_turn(&input, &mut out);

    print_buffer("Personality", &out.personality);
    print_buffer("Scenario", &out.scenario);

    println!();
    println!(
        "  {} rule{} selected",
        report.selected,
        if report.selected == 1 { "" } else { "s" },
    );
    if !report.fired_tags.is_empty() {
        println!("  tags: {}", report.fired_tags.join(", "));
    }
    if !report.active_entities.is_empty() {
        println!("  active: {}", report.active_entities.join(", "));
    }
    for line in &report.trace {
        println!("  {} {line}", "dbg".dimmed());
    }

    Ok(())
}

fn print_buffer(label: &str, buffer: &str) {
    println!("{}", label.bold().cyan());
    let body = buffer.trim_start_matches('\n');
    if body.is_empty() {
        println!("  (empty)");
    } else {
        println!("{body}");
    }
    println!();
}
