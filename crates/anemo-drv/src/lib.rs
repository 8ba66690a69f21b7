//! anemo-drv - Pipeline orchestration for the `anemo` binary.
//!
//! Runs the stages strictly in order, each one fully consuming its
//! predecessor's output: lex, parse, check, lower, emit, then the
//! external assembler and linker. The first failure anywhere aborts
//! the build; intermediate structures are dropped as soon as the next
//! stage is done with them.
//!
//! Artifacts land next to the source: `demo/x.anm` produces `demo/x.s`,
//! `demo/x.o` and the executable `demo/x`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Compiles `input` to a native executable and returns its path.
pub fn build(input: &Path) -> Result<PathBuf> {
    if input.extension().and_then(|e| e.to_str()) != Some("anm") {
        bail!("input file must use .anm extension");
    }

    let file = input.to_string_lossy().into_owned();
    let source = fs::read_to_string(input)
        .with_context(|| format!("cannot open '{}'", input.display()))?;

    debug!(file = %file, "lexing");
    let tokens = anemo_lex::lex_source(&file, &source)?;

    debug!(tokens = tokens.len(), "parsing");
    let mut program = anemo_par::parse_program(&file, &tokens)?;
    drop(tokens);

    debug!(glyphs = program.functions.len(), "checking");
    anemo_sem::check_program(&file, &mut program)?;

    debug!("lowering to IR");
    let ir = anemo_ir::lower_program(&program)?;
    drop(program);

    debug!("emitting assembly");
    let asm = anemo_gen::emit_program(&ir)?;

    let stem = input.with_extension("");
    let asm_path = with_suffix(&stem, ".s");
    let obj_path = with_suffix(&stem, ".o");

    fs::write(&asm_path, asm)
        .with_context(|| format!("cannot open assembly output '{}'", asm_path.display()))?;
    anemo_gen::assemble(&asm_path, &obj_path)?;
    anemo_gen::link(&obj_path, &stem)?;

    Ok(stem)
}

/// Compiles `input`, then executes the produced binary, propagating a
/// nonzero child exit as a fatal error.
pub fn run(input: &Path) -> Result<()> {
    let exe = build(input)?;

    // A bare file name would be resolved through PATH; anchor it.
    let invocation = if exe.parent().map_or(true, |p| p.as_os_str().is_empty()) {
        Path::new(".").join(&exe)
    } else {
        exe.clone()
    };

    debug!(exe = %invocation.display(), "running");
    let status = Command::new(&invocation)
        .status()
        .with_context(|| format!("cannot execute '{}'", invocation.display()))?;

    match status.code() {
        Some(0) => Ok(()),
        Some(code) => bail!("program exited with code {code}"),
        None => bail!("program terminated by a signal"),
    }
}

/// Appends `suffix` to a path without treating it as an extension
/// swap, so `demo/v1.2` becomes `demo/v1.2.s` and not `demo/v1.s`.
fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = stem.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}
