use clap::Parser;
use line_basic::{split_source, BufferScreen, Interpreter, Options, RunOutcome};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "line-basic", version, about = "Run a line-numbered BASIC program")]
struct Args {
    /// Program to run; standard input when omitted
    file: Option<PathBuf>,

    /// Seed for RND so runs are repeatable
    #[arg(long)]
    seed: Option<u64>,

    /// Print the token stream and line labels instead of running
    #[arg(long)]
    tokens: bool,

    /// Trace execution on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Writes log records to stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose && log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }

    let source = match read_source(&args) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Cannot read program: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let lines = split_source(&source);
    let mut interpreter = Interpreter::with_options(&lines, Options { seed: args.seed });

    if args.tokens {
        print_tokens(&interpreter);
        return ExitCode::SUCCESS;
    }

    let mut screen = BufferScreen::new();
    let outcome = interpreter.run(&mut screen);
    print!("{}", screen.text());

    match outcome {
        RunOutcome::Errored { .. } => {
            if let Some(error) = screen.error() {
                eprintln!("{}", error);
            }
            ExitCode::FAILURE
        }
        RunOutcome::Finished | RunOutcome::NotRunnable => ExitCode::SUCCESS,
    }
}

fn read_source(args: &Args) -> io::Result<String> {
    match &args.file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn print_tokens(interpreter: &Interpreter) {
    if !interpreter.is_runnable() {
        println!("Program cannot be tokenized");
        return;
    }

    for (position, token) in interpreter.tokens().iter().enumerate() {
        println!("{:>5}  {}", position, token);
    }
    println!();
    for (label, position) in interpreter.labels().iter() {
        println!("{:>5} -> {}", label, position);
    }
}
