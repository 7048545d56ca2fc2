use clap::Parser;
use sanae::{Algorithm, Halt, Machine, ProgramLoader, ProgramManager, Symbol, Tape};
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Runs a sanae program against a circular integer tape.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  sanae-cli --program programs/binary-increment.sasm --tape 1,1,0,1,0
  sanae-cli --example \"Wrap around\" --debug
  cat programs/erase-run.sasm | sanae-cli --tape \"5 5 5 7\"")]
struct Cli {
    /// The program file to execute (.sasm). Read from stdin when omitted and piped.
    #[clap(short, long, conflicts_with = "example")]
    program: Option<String>,

    /// Run one of the embedded sample programs by name
    #[clap(short, long)]
    example: Option<String>,

    /// List the embedded sample programs and exit
    #[clap(short, long)]
    list: bool,

    /// Initial tape cells, separated by commas or spaces.
    /// Defaults to the sample tape when running an embedded program.
    #[clap(short, long)]
    tape: Option<String>,

    /// Stop after this many commands have fired
    #[clap(short = 'n', long)]
    max_steps: Option<usize>,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print the compiled algorithm as JSON and exit
    #[clap(long)]
    dump: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "sanae=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: &Cli) -> Result<(), String> {
    if cli.list {
        for (index, name) in ProgramManager::list_program_names().iter().enumerate() {
            println!("{index}: {name}");
        }
        return Ok(());
    }

    let (algorithm, sample_tape) = load_program(cli)?;

    if cli.dump {
        let json = serde_json::to_string_pretty(&algorithm).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    let tape = match (&cli.tape, sample_tape) {
        (Some(cells), _) => parse_tape(cells)?,
        (None, Some(tape)) => tape,
        (None, None) => return Err("No tape given, use --tape".to_string()),
    };
    debug!(cells = tape.len(), states = algorithm.len(), "starting machine");

    let mut machine = Machine::new(tape, &algorithm).map_err(|e| e.to_string())?;

    let halt = if cli.debug {
        run_verbose(&mut machine, cli.max_steps)
    } else {
        machine.run(cli.max_steps)
    };

    match halt {
        Halt::StepLimit => println!(
            "Step limit reached after {} steps.",
            machine.step_count()
        ),
        halt => debug!(?halt, steps = machine.step_count(), "machine halted"),
    }

    println!("{:?}", machine.tape());
    println!("head: {}", machine.position());

    Ok(())
}

/// Loads the program from a file, an embedded sample, or stdin.
///
/// Embedded samples also provide a default tape.
fn load_program(cli: &Cli) -> Result<(Algorithm, Option<Tape>), String> {
    if let Some(path) = &cli.program {
        ProgramLoader::load_program(Path::new(path))
            .map(|algorithm| (algorithm, None))
            .map_err(|e| e.to_string())
    } else if let Some(name) = &cli.example {
        ProgramManager::get_program_by_name(name)
            .map(|program| (program.algorithm.clone(), Some(program.tape.clone())))
            .map_err(|e| e.to_string())
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        ProgramLoader::load_program_from_string(&buffer)
            .map(|algorithm| (algorithm, None))
            .map_err(|e| e.to_string())
    } else {
        Err("No program given, use --program, --example or pipe one on stdin".to_string())
    }
}

/// Parses tape cells separated by commas and/or whitespace.
fn parse_tape(cells: &str) -> Result<Tape, String> {
    cells
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            cell.parse::<Symbol>()
                .map_err(|e| format!("Invalid tape cell '{}': {}", cell, e))
        })
        .collect()
}

fn print_state(machine: &Machine<'_>) {
    println!(
        "Step: {}, State: {}, Head: {}, Tape: {:?}",
        machine.step_count(),
        machine.state(),
        machine.position(),
        machine.tape()
    );
}

fn run_verbose(machine: &mut Machine<'_>, max_steps: Option<usize>) -> Halt {
    print_state(machine);

    loop {
        let next = machine.step_count() + 1;
        let limit = max_steps.map_or(next, |max| next.min(max));

        match machine.run(Some(limit)) {
            Halt::StepLimit if max_steps.is_some_and(|max| machine.step_count() >= max) => {
                return Halt::StepLimit;
            }
            Halt::StepLimit => print_state(machine),
            halt => {
                print_state(machine);
                println!("\nMachine halted: {:?}", halt);
                println!("\nFinal tape:");
                return halt;
            }
        }
    }
}
