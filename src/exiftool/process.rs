use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

/// Launch the tool with the given argv and hand back its stdout for one
/// sequential read pass. stdin and stderr are discarded; only stdout carries
/// the protocol described in the reader/binary modules.
pub(crate) fn spawn(argv: &[OsString]) -> Result<(Child, ChildStdout)> {
    let (exe, args) = argv.split_first().context("empty command")?;

    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {}", Path::new(exe).display()))?;

    let stdout = child
        .stdout
        .take()
        .context("child process has no captured stdout")?;

    Ok((child, stdout))
}

/// Wait for the child after its stdout has been drained, so every operation
/// returns only once the subprocess has terminated.
pub(crate) fn reap(mut child: Child) {
    match child.wait() {
        Ok(status) if !status.success() => {
            log::debug!("exiftool exited with {status}");
        }
        Ok(_) => {}
        Err(e) => log::error!("failed to wait for exiftool: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_rejects_empty_command() {
        assert!(spawn(&[]).is_err());
    }

    #[test]
    fn spawn_reports_missing_executable() {
        let argv = vec![OsString::from("/nonexistent/tool"), OsString::from("-S")];
        let err = spawn(&argv).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tool"));
    }

    #[cfg(unix)]
    #[test]
    fn spawn_captures_stdout_and_reaps() {
        use std::io::Read;

        let argv = vec![OsString::from("/bin/echo"), OsString::from("hello")];
        let (child, mut stdout) = spawn(&argv).unwrap();

        let mut out = String::new();
        stdout.read_to_string(&mut out).unwrap();
        reap(child);

        assert_eq!(out.trim(), "hello");
    }
}
