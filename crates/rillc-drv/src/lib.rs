//! rillc-drv - The compiler driver.
//!
//! Reads one source file, runs lexer, parser, and lowerer, and writes the
//! textual IR next to the input as `<stem>.ll`. Nothing is written when any
//! stage fails.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Compiles `path` and writes `<stem>.ll` beside it. Returns the output path.
pub fn compile_file(path: &Path) -> anyhow::Result<PathBuf> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let ir = rillc_gen::generate_ir(&source)
        .with_context(|| format!("compiling {}", path.display()))?;

    let output = path.with_extension("ll");
    fs::write(&output, ir).with_context(|| format!("writing {}", output.display()))?;
    Ok(output)
}

/// Parses `path` and renders its AST as JSON (the debugging side door).
pub fn dump_ast(path: &Path) -> anyhow::Result<String> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let nodes = rillc_par::parse(&source)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(rillc_par::dump::to_string_pretty(&nodes))
}
