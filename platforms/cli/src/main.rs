use clap::Parser;
use moore::loader::DefinitionLoader;
use moore::machines::MachineCatalog;
use moore::simulator::{SimulationObserver, Simulator, TransitionEvent};
use moore::types::MachineDefinition;
use std::path::Path;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The machine definition file to load (.txt or .json, either dialect)
    #[clap(short, long)]
    machine: Option<String>,

    /// Load an embedded sample machine by name instead of a file
    #[clap(short, long)]
    sample: Option<String>,

    /// List the embedded sample machines and exit
    #[clap(long)]
    list: bool,

    /// Input symbols to feed to the machine, one per argument
    #[clap(short, long)]
    input: Vec<String>,

    /// Print the visual layout of the machine as JSON and exit
    #[clap(long)]
    layout: bool,

    /// Print the machine in the quintuple text dialect and exit
    #[clap(long)]
    export: bool,

    /// Delay between steps in milliseconds
    #[clap(short, long, default_value_t = 0)]
    delay: u64,
}

/// Prints each applied transition as it happens.
struct PrintObserver;

impl SimulationObserver for PrintObserver {
    fn on_transition(&mut self, event: &TransitionEvent) {
        println!(
            "{} --{}--> {}  (output: {})",
            event.from, event.input, event.to, event.output
        );
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list {
        list_samples();
        return;
    }

    let definition = load_definition(&cli);

    if cli.export {
        print!("{}", moore::exporter::export(&definition));
        return;
    }

    if cli.layout {
        let visual = moore::layout::layout(&definition);
        match serde_json::to_string_pretty(&visual) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize layout: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let mut simulator = match Simulator::new(definition) {
        Ok(simulator) => simulator,
        Err(e) => {
            eprintln!("Invalid machine: {e}");
            process::exit(1);
        }
    };

    if cli.input.is_empty() {
        println!(
            "Initial state: {} (output: {})",
            simulator.current_state(),
            simulator.current_output()
        );
        println!("No input given; pass -i SYMBOL once per input symbol.");
        return;
    }

    let symbols: Vec<&str> = cli.input.iter().map(String::as_str).collect();
    let consumed = simulator.run_sequence(
        &symbols,
        Duration::from_millis(cli.delay),
        &mut PrintObserver,
    );

    if consumed < symbols.len() {
        println!(
            "Rejected: no transition for '{}' in state {}",
            symbols[consumed],
            simulator.current_state()
        );
    }

    println!("\nHistory:");
    for entry in simulator.history() {
        match &entry.input {
            Some(input) => println!("  {:>8}  ->  {}  (output: {})", input, entry.state, entry.output),
            None => println!("  {:>8}  ->  {}  (output: {})", "-", entry.state, entry.output),
        }
    }

    println!(
        "\nFinal state: {} (output: {})",
        simulator.current_state(),
        simulator.current_output()
    );
}

fn load_definition(cli: &Cli) -> MachineDefinition {
    match (&cli.machine, &cli.sample) {
        (Some(path), _) => match DefinitionLoader::load(Path::new(path)) {
            Ok(definition) => definition,
            Err(e) => {
                eprintln!("Failed to load {path}: {e}");
                process::exit(1);
            }
        },
        (None, Some(name)) => match MachineCatalog::machine_by_name(name) {
            Ok(definition) => definition,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("Pass either --machine FILE or --sample NAME (see --list).");
            process::exit(1);
        }
    }
}

fn list_samples() {
    for index in 0..MachineCatalog::machine_count() {
        match MachineCatalog::machine_info(index) {
            Ok(info) => println!(
                "{}: {} ({} states, {} inputs, {} transitions, starts at {})",
                info.index,
                info.name,
                info.state_count,
                info.input_count,
                info.transition_count,
                info.initial_state
            ),
            Err(e) => eprintln!("{e}"),
        }
    }
}
