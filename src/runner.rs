use provision::{CommandLine, CommandOutput, Error, ProcessRunner, Result};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

/// Runs commands on the local machine
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, cmd: &CommandLine) -> Result<CommandOutput> {
        let spawn_err = |source| Error::Spawn {
            command: cmd.to_string(),
            source,
        };

        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(if cmd.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(if cmd.discard_stdout {
                Stdio::null()
            } else {
                Stdio::piped()
            })
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Feed stdin from its own thread while this one drains stdout and
        // stderr, so neither side blocks on a full pipe buffer
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|s| {
            let writer = s.spawn(move || match (stdin, &cmd.stdin) {
                // Dropping the handle closes the pipe so the child sees EOF
                (Some(mut pipe), Some(input)) => pipe.write_all(input),
                _ => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (written, output)
        });

        let output = output.map_err(spawn_err)?;
        // A child that exits without reading all of stdin breaks the pipe;
        // its exit status is the more useful answer then
        if let Err(e) = written
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(spawn_err(e));
        }
        Ok(CommandOutput::from(output))
    }
}

/// Check if a command exists
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
