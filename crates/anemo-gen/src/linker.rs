//! Assembler and linker invocation.
//!
//! Both children run synchronously; the compiler never touches the
//! output files while a child is running. A failing child aborts the
//! build with the full command string so the user can rerun it by hand.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::BuildError;

/// Assembles `asm_path` into `obj_path` with the system assembler.
pub fn assemble(asm_path: &Path, obj_path: &Path) -> Result<(), BuildError> {
    let mut cmd = Command::new("as");
    cmd.arg("-o").arg(obj_path).arg(asm_path);
    run(cmd, |command| BuildError::AssemblerFailed { command })
}

/// Links `obj_path` into `exe_path` against the host C runtime.
pub fn link(obj_path: &Path, exe_path: &Path) -> Result<(), BuildError> {
    let mut cmd = Command::new("cc");
    cmd.arg("-no-pie").arg("-o").arg(exe_path).arg(obj_path);
    run(cmd, |command| BuildError::LinkerFailed { command })
}

fn run(
    mut cmd: Command,
    on_failure: impl FnOnce(String) -> BuildError,
) -> Result<(), BuildError> {
    let rendered = render(&cmd);
    debug!(command = %rendered, "running toolchain command");

    let status = cmd.status().map_err(|source| BuildError::Spawn {
        command: rendered.clone(),
        source,
    })?;

    if !status.success() {
        return Err(on_failure(rendered));
    }
    Ok(())
}

fn render(cmd: &Command) -> String {
    let mut rendered = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_all_arguments() {
        let mut cmd = Command::new("as");
        cmd.arg("-o").arg("out.o").arg("in.s");
        assert_eq!(render(&cmd), "as -o out.o in.s");
    }

    #[test]
    fn test_missing_tool_reports_spawn_error() {
        let cmd = Command::new("anemo-no-such-assembler");
        let err = run(cmd, |command| BuildError::AssemblerFailed { command }).unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
        assert!(err.to_string().contains("anemo-no-such-assembler"));
    }
}
