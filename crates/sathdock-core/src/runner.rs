//! Launches a docking binary and relays its output.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, info};

use crate::progress::ProgressReporter;
use crate::{Result, SathdockError};

/// Docking binaries this wrapper is allowed to launch. The program name from
/// the CLI is joined onto the installation directory, so anything outside
/// this set is rejected before it reaches the filesystem.
pub const KNOWN_PROGRAMS: [&str; 3] = ["vina", "qvina02", "smina"];

const CHUNK_SIZE: usize = 1024;
const MARKER: u8 = b'*';

/// Where a run reads and writes, and how chatty it is.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Directory holding the installed docking binaries.
    pub install_dir: PathBuf,
    /// Completed configuration file handed to the binary via `--config`.
    pub config_path: PathBuf,
    /// Raw subprocess stdout is appended here, truncated per run.
    pub run_log_path: PathBuf,
    /// Also forward raw stdout chunks to this process's stdout.
    pub mirror_stdout: bool,
}

/// Wrapper for one docking subprocess execution.
pub struct DockRunner {
    options: RunnerOptions,
}

impl DockRunner {
    pub fn new(options: RunnerOptions) -> Self {
        Self { options }
    }

    /// Run `program` against the configured docking setup.
    ///
    /// The sink receives a diagnostic banner (program name plus the full
    /// configuration content) followed by the JSON progress stream. Stdout
    /// of the subprocess is streamed into the run log while stderr is
    /// drained concurrently; a non-zero exit fails with the captured stderr
    /// as the error.
    pub async fn run<W: AsyncWrite + Unpin>(&self, program: &str, sink: W) -> Result<()> {
        if !KNOWN_PROGRAMS.contains(&program) {
            return Err(SathdockError::UnknownProgram(program.to_string()));
        }

        let executable = self.options.install_dir.join(program);
        let config = tokio::fs::read_to_string(&self.options.config_path).await?;

        info!("Running {} with config {:?}", program, self.options.config_path);

        let mut reporter = ProgressReporter::new(sink);
        reporter
            .sink_mut()
            .write_all(format!("program: {program}\n{config}\n").as_bytes())
            .await?;

        let mut child = Command::new(&executable)
            .arg("--config")
            .arg(&self.options.config_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SathdockError::Io(std::io::Error::other("child stdout not piped")))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SathdockError::Io(std::io::Error::other("child stderr not piped")))?;

        let mut run_log = tokio::fs::File::create(&self.options.run_log_path).await?;

        reporter.set(1.0).await?;

        // Both pipes are drained concurrently so a subprocess that fills its
        // stderr buffer before closing stdout cannot wedge the run.
        let relay = async {
            let mut process_stdout = tokio::io::stdout();
            let mut buf = [0u8; CHUNK_SIZE];
            loop {
                let n = stdout.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                let chunk = &buf[..n];
                for byte in chunk {
                    if *byte == MARKER {
                        reporter.advance().await?;
                    }
                }
                run_log.write_all(chunk).await?;
                if self.options.mirror_stdout {
                    process_stdout.write_all(chunk).await?;
                    process_stdout.flush().await?;
                }
            }
            run_log.flush().await?;
            Ok::<(), SathdockError>(())
        };
        let drain = async {
            let mut captured = Vec::new();
            stderr.read_to_end(&mut captured).await?;
            Ok::<Vec<u8>, SathdockError>(captured)
        };
        let (relay_result, drain_result) = tokio::join!(relay, drain);
        relay_result?;
        let captured = drain_result?;

        let status = child.wait().await?;
        reporter.sink_mut().flush().await?;
        if !status.success() {
            return Err(SathdockError::DockingFailed(
                String::from_utf8_lossy(&captured).into_owned(),
            ));
        }

        reporter.set(100.0).await?;
        reporter.sink_mut().flush().await?;
        debug!("{} finished, raw output in {:?}", program, self.options.run_log_path);
        Ok(())
    }
}
