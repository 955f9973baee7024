use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "forestgen")]
#[command(about = "Generates Earley grammar and action dispatch code from a grammar specification")]
struct Args {
    /// Path to the grammar specification (`prologue %% rules %% epilogue`)
    grammar: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let generated = match forestgen::compile_file(&args.grammar) {
        Ok(generated) => generated,
        Err(e) => {
            eprintln!("forestgen: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write!(out, "{}", generated).and_then(|()| out.flush()) {
        eprintln!("forestgen: writing output: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
