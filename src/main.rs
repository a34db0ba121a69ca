extern crate clap;

use std::{
    collections::HashSet,
    io::{self, Read},
    process::ExitCode,
    time::Instant,
};

use braintape::{
    encoder::{self, Encoder, NaiveEncoder, OptimizedEncoder},
    interpreter::{self, Layer, Machine},
};
use clap::{Parser, ValueEnum};
use colored::Colorize;

/// Brainf**k dialect interpreter/encoder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to operate on, `-` reads it from stdin
    #[arg()]
    file: String,

    /// What to do with the file, defaults to running it
    #[arg(value_enum)]
    commands: Vec<Commands>,

    /// Run under this layer instead of detecting it
    #[arg(short, long, value_enum)]
    layer: Option<Layer>,

    /// Stop after this many instructions
    #[arg(short, long)]
    step_limit: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = Encoders::Best)]
    encoder: Encoders,
}

#[derive(ValueEnum, Debug, Clone, Hash, PartialEq, Eq)]
enum Commands {
    /// Run the file as a program
    Run,
    /// Print a basic program that outputs the file's bytes
    Encode,
    /// Print the layer the program needs
    Layer,
    /// Print every command the layer supports
    Supported,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Encoders {
    /// Try every encoder and keep the shortest program
    Best,
    Optimized,
    Naive,
}

fn read_source(file: &str) -> io::Result<Vec<u8>> {
    if file == "-" {
        let mut source = vec![];
        io::stdin().read_to_end(&mut source)?;
        Ok(source)
    } else {
        std::fs::read(file)
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let mut commands: HashSet<Commands> = HashSet::from_iter(args.commands.into_iter());
    if commands.is_empty() {
        commands.insert(Commands::Run);
    }

    let source = match read_source(&args.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{0:}: {1:}", "Error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let layer = args
        .layer
        .unwrap_or_else(|| interpreter::select_layer(&source));

    if commands.contains(&Commands::Layer) {
        println!("{}", layer);
    }

    if commands.contains(&Commands::Supported) {
        println!("{}", String::from_utf8_lossy(&layer.supported_commands()));
    }

    if commands.contains(&Commands::Encode) {
        eprintln!("{}", "Starting encoding".blue());
        let now = Instant::now();
        let program = match args.encoder {
            Encoders::Best => encoder::encode(&source),
            Encoders::Optimized => OptimizedEncoder.encode(&source),
            Encoders::Naive => NaiveEncoder.encode(&source),
        };
        println!("{}", program);
        eprintln!(
            "{} {} commands in {:.2?}",
            "Finished encoding with".green(),
            program.len(),
            now.elapsed()
        );
    }

    if commands.contains(&Commands::Run) && !interpreter::is_blank(&source) {
        eprintln!("{} {}", "Starting".blue(), layer);
        let now = Instant::now();

        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut input = stdin.lock();
        let mut output = stdout.lock();
        let mut machine = Machine::new(layer, &source, &mut input, &mut output)
            .with_step_limit(args.step_limit);

        if let Err(e) = machine.run() {
            eprintln!();
            eprintln!("{0:}: {1:}", "Error".red(), e);
            return ExitCode::FAILURE;
        }

        eprintln!();
        eprintln!(
            "{} {} steps in {:.2?}",
            "Finished".green(),
            machine.steps(),
            now.elapsed()
        );
    }

    ExitCode::SUCCESS
}
