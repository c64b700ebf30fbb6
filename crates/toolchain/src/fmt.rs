//! Formatting source text with `deno fmt -`.
//!
//! Each call spawns its own deno process, so concurrent calls share nothing.
//! No timeout is applied: a deno process that never exits keeps the returned
//! future pending. Wrap the call in `tokio::time::timeout` when that matters.

use denokit_core::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Arguments making deno format standard input to standard output.
pub const FMT_ARGS: [&str; 2] = ["fmt", "-"];

/// Format `source` with the deno executable at `executable`.
///
/// The source is written to deno's standard input, which is then closed,
/// while standard output and standard error are collected concurrently.
///
/// # Errors
///
/// Returns [`Error::Spawn`] if deno cannot be started or its pipes fail, and
/// [`Error::Subprocess`] with the captured standard error if deno exits
/// unsuccessfully.
#[instrument(name = "deno_fmt", skip(source), fields(bytes = source.len()))]
pub async fn format_source(executable: &Path, source: &str) -> Result<String> {
    let command = format!("{} {}", executable.display(), FMT_ARGS.join(" "));

    let mut child = Command::new(executable)
        .args(FMT_ARGS)
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::spawn(&command, e))?;

    let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
        (child.stdin.take(), child.stdout.take(), child.stderr.take())
    else {
        return Err(Error::spawn(
            &command,
            std::io::Error::other("failed to capture deno stdio"),
        ));
    };

    let write = async move {
        let result = stdin.write_all(source.as_bytes()).await;
        // Dropping stdin closes the pipe so deno sees end of input.
        drop(stdin);
        result
    };
    let read_stdout = async {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await.map(|_| buf)
    };
    let read_stderr = async {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    };

    let (written, out, err) = tokio::join!(write, read_stdout, read_stderr);

    match written {
        // deno may exit before consuming all input; its exit status decides.
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!("deno closed stdin before reading all input");
        }
        Err(e) => return Err(Error::spawn(&command, e)),
        Ok(()) => {}
    }
    let out = out.map_err(|e| Error::spawn(&command, e))?;
    let err = err.map_err(|e| Error::spawn(&command, e))?;

    let status = child.wait().await.map_err(|e| Error::spawn(&command, e))?;
    if !status.success() {
        return Err(Error::subprocess(
            command,
            status.code(),
            String::from_utf8_lossy(&err),
        ));
    }

    debug!(bytes = out.len(), "deno fmt succeeded");
    Ok(String::from_utf8_lossy(&out).into_owned())
}
