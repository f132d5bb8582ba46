use std::io::{BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use symcheck_cli::chat::{self, Assistant};
use symcheck_cli::cli::{Cli, Commands, select_symptoms};
use symcheck_cli::kb::{KnowledgeBase, loader};
use symcheck_cli::matcher::{self, ScoringStrategy};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> std::process::ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Chat {
            ref symptoms,
            strategy,
        } => {
            let seed = symptoms.clone();
            let kb = loader::load_default(cli.data_dir.clone());
            match run_chat(&kb, strategy.into(), &seed) {
                Ok(()) => std::process::ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Error: {err}");
                    std::process::ExitCode::from(1)
                }
            }
        }
        _ => match symcheck_cli::cli::run(cli) {
            Ok(output) => {
                println!("{output}");
                std::process::ExitCode::SUCCESS
            }
            Err(err) => {
                if let Some(check_err) = err.downcast_ref::<symcheck_cli::error::CheckError>() {
                    eprintln!("Error: {check_err}");
                } else {
                    eprintln!("Error: {err}");
                }
                std::process::ExitCode::from(1)
            }
        },
    }
}

fn run_chat(kb: &KnowledgeBase, strategy: ScoringStrategy, seed: &[String]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut assistant = Assistant::new(kb).with_strategy(strategy);

    writeln!(
        out,
        "Symptom assistant. Describe your symptoms or ask about your results; say 'bye' to leave."
    )?;

    if !seed.is_empty() {
        seed_diagnosis(kb, strategy, seed, &mut assistant, &mut out)?;
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    loop {
        write!(out, "you> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = assistant.respond(line);
        writeln!(out, "{reply}\n")?;

        if chat::is_farewell(line) {
            break;
        }
    }
    Ok(())
}

fn seed_diagnosis(
    kb: &KnowledgeBase,
    strategy: ScoringStrategy,
    seed: &[String],
    assistant: &mut Assistant<'_>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let (selected, unknown) = select_symptoms(kb, seed);
    if !unknown.is_empty() {
        writeln!(out, "(ignoring unknown symptoms: {})", unknown.join(", "))?;
    }
    if selected.is_empty() {
        writeln!(
            out,
            "(none of the given symptoms are known; starting without a diagnosis)\n"
        )?;
        return Ok(());
    }

    let ranked = matcher::score(&selected, kb, strategy);
    if ranked.is_empty() {
        writeln!(out, "(no conditions matched the given symptoms)\n")?;
        return Ok(());
    }

    let severity = matcher::severity(selected.len());
    assistant.set_context(ranked, selected, severity);
    if let Some(summary) = assistant.diagnosis_summary() {
        writeln!(out, "\n{summary}")?;
    }
    writeln!(out, "Analysis complete - ask me about your results.\n")?;
    Ok(())
}
