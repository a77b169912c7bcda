use std::io::{self, Write};

use os_pipe::{PipeReader, PipeWriter};
use tracing::{debug, warn};

use crate::core::commands::{dispatch, CommandError, Context, Launch};
use crate::core::state::SessionState;
use crate::core::status::Status;
use crate::error::ShellError;
use crate::shell::pipeline::Pipeline;
use crate::shell::streams::{Edges, Input, Output, Streams};

/// Launches every stage of `pipeline`, then waits for them in order.
///
/// Built-ins finish during launch and their pipe-bound output is fed to the
/// next stage from a separate thread; external stages keep running until all
/// stages are up so producers and consumers overlap. Each stage's error is
/// reported as it settles and never stops the stages after it. The returned
/// Status is the last stage's, or the first terminal one.
pub fn run(pipeline: Pipeline, session: &mut SessionState, streams: &mut Streams<'_>) -> Status {
    run_with(pipeline, session, streams, os_pipe::pipe)
}

fn run_with<P>(
    pipeline: Pipeline,
    session: &mut SessionState,
    streams: &mut Streams<'_>,
    mut make_pipe: P,
) -> Status
where
    P: FnMut() -> io::Result<(PipeReader, PipeWriter)>,
{
    let mut stages = pipeline.into_stages();
    if let [only] = stages.as_mut_slice() {
        only.pipelined = false;
    }

    let (edges, drain) = match Edges::new(streams.inherit_stdio) {
        Ok(edges) => edges,
        Err(e) => return Status::fatal(e),
    };

    let count = stages.len();
    debug!(stages = count, "running pipeline");
    let mut launched = Vec::with_capacity(count);
    let mut feeders = Vec::new();
    let mut upstream = Some(Input::Edge);
    let mut aborted = None;

    for (index, stage) in stages.iter().enumerate() {
        let (stdout, next) = if index + 1 == count {
            (Output::Edge, None)
        } else {
            match make_pipe() {
                Ok((reader, writer)) => (Output::Pipe(writer), Some(Input::Pipe(reader))),
                Err(e) => {
                    warn!(stage = index, error = %e, "pipe allocation failed");
                    aborted = Some(Status::failure(e));
                    break;
                }
            }
        };

        debug!(stage = index, program = %stage.program, pipelined = stage.pipelined, "launching");
        let stdin = upstream.take().unwrap_or(Input::Edge);
        let launch = {
            let mut ctx = Context::new(session, streams, &edges, stdin, stdout);
            let launch = dispatch(stage, &mut ctx);
            match ctx.finish() {
                Ok(feeder) => {
                    feeders.extend(feeder);
                    launch
                }
                Err(e) => match launch {
                    Launch::Done(status) if status.exit() => Launch::Done(status),
                    _ => Launch::Done(Status::failure(CommandError::Io(e))),
                },
            }
        };
        upstream = next;
        if let Launch::Running(running) = &launch {
            debug!(stage = index, program = running.program(), pid = running.id(), "running");
        }

        let stop = matches!(&launch, Launch::Done(status) if status.exit());
        launched.push(launch);
        if stop {
            break;
        }
    }
    drop(upstream);
    drop(edges);

    // Captured output of the last stage must flow before anyone is waited,
    // otherwise a full pipe stalls the whole chain.
    let mut drain_failure = None;
    if let Some(Launch::Running(last)) = launched.last_mut() {
        if let Err(e) = last.drain_into(streams.stdout) {
            drain_failure = Some(e);
        }
    }

    let mut terminal: Option<Status> = None;
    let mut last = Status::success();
    let settled = launched.len();
    for (index, launch) in launched.into_iter().enumerate() {
        let status = match launch {
            Launch::Done(status) => status,
            Launch::Running(running) => running.wait(streams.stdout),
        };
        let status = if index + 1 == settled {
            drain_failure.take().map_or(status, Status::fatal)
        } else {
            status
        };

        let status = settle(status, session, streams);
        if status.exit() {
            terminal.get_or_insert(status);
        } else {
            last = status;
        }
    }

    for feeder in feeders {
        match feeder.finish() {
            Ok(()) => {}
            // The reader is allowed to stop early, as `head` does.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("next stage closed its input early");
            }
            Err(e) => warn!(error = %e, "writing into pipeline failed"),
        }
    }

    if let Some(drain) = drain {
        let captured = drain.finish().and_then(|bytes| {
            streams.stderr.write_all(&bytes)?;
            streams.stderr.flush()
        });
        if let Err(e) = captured {
            terminal.get_or_insert(Status::fatal(e));
        }
    }

    if let Some(status) = terminal {
        return status;
    }
    if let Some(status) = aborted {
        return settle(status, session, streams);
    }
    session.set_last_exit_code(last.code());
    last
}

/// Reports a finished stage's error and records its code.
///
/// Terminal statuses pass through untouched. The Status handed back no
/// longer carries the error since it has been printed.
pub(crate) fn settle(
    status: Status,
    session: &mut SessionState,
    streams: &mut Streams<'_>,
) -> Status {
    if status.exit() {
        return status;
    }
    if let Some(error) = status.error() {
        if let Err(e) = streams.report(error) {
            return Status::fatal(ShellError::Io(e));
        }
    }
    session.set_last_exit_code(status.code());
    Status::with_code(status.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CwdGuard;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    struct Outcome {
        status: Status,
        stdout: String,
        stderr: String,
    }

    fn session() -> SessionState {
        SessionState::with_identity("t", "h", "/").expect("session")
    }

    fn run_line(session: &mut SessionState, line: &str) -> Outcome {
        let pipeline = Pipeline::parse(line).expect("pipeline");
        let mut out = Vec::new();
        let mut err = Vec::new();
        let status = {
            let mut streams = Streams::captured(&mut out, &mut err);
            run(pipeline, session, &mut streams)
        };
        Outcome {
            status,
            stdout: String::from_utf8_lossy(&out).into_owned(),
            stderr: String::from_utf8_lossy(&err).into_owned(),
        }
    }

    #[test]
    fn test_builtin_into_external() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "echo hi | cat");
        assert!(outcome.status.is_success());
        assert_eq!(outcome.stdout, "hi\n");
        assert_eq!(outcome.stderr, "");
    }

    #[test]
    fn test_large_stream_through_three_stages() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "seq 1 100000 | cat | wc -l");
        assert!(outcome.status.is_success());
        assert_eq!(outcome.stdout.trim(), "100000");
    }

    #[test]
    fn test_exit_inside_pipeline_does_not_terminate() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "echo Pipe | exit 1 | echo Hello World");
        assert!(!outcome.status.exit());
        assert_eq!(outcome.status.code(), 0);
        assert_eq!(outcome.stdout, "Hello World\n");
        assert_eq!(session.last_exit_code(), 0);
    }

    #[test]
    fn test_consumer_closing_early() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "yes | head -n 5");
        assert!(outcome.status.is_success());
        assert_eq!(outcome.stdout, "y\ny\ny\ny\ny\n");
    }

    #[test]
    fn test_earlier_failure_reaches_last_stage() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "vein-no-such-command | echo after");
        assert!(!outcome.status.exit());
        assert_eq!(outcome.status.code(), 0);
        assert_eq!(outcome.stdout, "after\n");
        assert!(outcome
            .stderr
            .contains("command not found: vein-no-such-command"));
        assert_eq!(session.last_exit_code(), 0);
    }

    #[test]
    fn test_last_stage_code_is_recorded() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "echo x | sh -c 'cat >/dev/null; exit 3'");
        assert_eq!(outcome.status.code(), 3);
        assert!(outcome.status.error().is_none());
        assert_eq!(session.last_exit_code(), 3);

        let outcome = run_line(&mut session, "echo $? | cat");
        assert_eq!(outcome.stdout, "3\n");
    }

    #[test]
    fn test_single_stage_exit_terminates() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "exit 4");
        assert!(outcome.status.exit());
        assert_eq!(outcome.status.code(), 4);
    }

    #[test]
    fn test_unknown_command_code() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "vein-no-such-command");
        assert!(!outcome.status.exit());
        assert_eq!(outcome.status.code(), 127);
        assert_eq!(session.last_exit_code(), 127);
        assert_eq!(outcome.stderr, "command not found: vein-no-such-command\n");
    }

    #[test]
    fn test_stderr_of_every_stage_is_captured() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = run_line(&mut session, "sh -c 'echo one >&2' | sh -c 'echo two >&2'");
        assert!(outcome.status.is_success());
        assert!(outcome.stderr.contains("one\n"));
        assert!(outcome.stderr.contains("two\n"));
    }

    struct Finished {
        exit: bool,
        code: i32,
        last_exit_code: i32,
        stdout: String,
        stderr: String,
    }

    /// Runs `line` on another thread so a stalled pipeline fails the test
    /// instead of hanging it.
    fn run_line_within<P>(line: &str, make_pipe: P) -> Finished
    where
        P: FnMut() -> io::Result<(PipeReader, PipeWriter)> + Send + 'static,
    {
        let line = line.to_string();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut session = session();
            let pipeline = Pipeline::parse(&line).expect("pipeline");
            let mut out = Vec::new();
            let mut err = Vec::new();
            let status = {
                let mut streams = Streams::captured(&mut out, &mut err);
                run_with(pipeline, &mut session, &mut streams, make_pipe)
            };
            let _ = tx.send(Finished {
                exit: status.exit(),
                code: status.code(),
                last_exit_code: session.last_exit_code(),
                stdout: String::from_utf8_lossy(&out).into_owned(),
                stderr: String::from_utf8_lossy(&err).into_owned(),
            });
        });
        rx.recv_timeout(Duration::from_secs(20))
            .expect("pipeline did not finish")
    }

    #[test]
    fn test_builtin_output_larger_than_pipe_buffer() {
        let _guard = CwdGuard::new();
        std::env::set_var("VEIN_LARGE_ECHO", "a".repeat(200_000));

        let finished = run_line_within("echo $VEIN_LARGE_ECHO | wc -c", os_pipe::pipe);
        assert!(!finished.exit);
        assert_eq!(finished.code, 0);
        assert_eq!(finished.stdout.trim(), "200001");
    }

    #[test]
    fn test_large_builtin_output_into_early_closing_reader() {
        let _guard = CwdGuard::new();
        std::env::set_var("VEIN_LARGE_HEAD", "b".repeat(200_000));

        let finished = run_line_within("echo $VEIN_LARGE_HEAD | head -c 3", os_pipe::pipe);
        assert_eq!(finished.code, 0);
        assert_eq!(finished.stdout, "bbb");
        assert_eq!(finished.stderr, "");
    }

    #[test]
    fn test_pipe_allocation_failure_is_recoverable() {
        let _guard = CwdGuard::new();
        let mut calls = 0;
        let failing_second = move || {
            calls += 1;
            if calls == 2 {
                Err(io::Error::new(io::ErrorKind::Other, "out of descriptors"))
            } else {
                os_pipe::pipe()
            }
        };

        let finished = run_line_within("yes | cat | wc -l", failing_second);
        assert!(!finished.exit);
        assert_eq!(finished.code, 1);
        assert_eq!(finished.last_exit_code, 1);
        assert!(finished.stderr.contains("out of descriptors"));
        assert_eq!(finished.stdout, "");
    }

    #[test]
    fn test_exit_stage_sees_code_of_previous_line() {
        let _guard = CwdGuard::new();
        let mut session = session();
        session.set_last_exit_code(7);

        let outcome = run_line(&mut session, "sh -c 'exit 5' | exit");
        assert!(!outcome.status.exit());
        assert_eq!(outcome.status.code(), 7);
        assert_eq!(session.last_exit_code(), 7);
    }
}
