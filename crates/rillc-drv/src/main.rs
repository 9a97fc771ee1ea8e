//! The `rillc` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Compiler for the Rill language.
///
/// Translates a source file into textual LLVM IR written next to the input
/// as `<stem>.ll`, ready for an external assembler and linker.
#[derive(Parser, Debug)]
#[command(name = "rillc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler for the Rill language", long_about = None)]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Print the parsed AST as JSON instead of compiling
    #[arg(long)]
    emit_ast: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.emit_ast {
        println!("{}", rillc_drv::dump_ast(&cli.input)?);
        return Ok(());
    }
    rillc_drv::compile_file(&cli.input)?;
    Ok(())
}
