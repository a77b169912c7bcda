use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use tracing::debug;

use vein::core::config::Config;
use vein::core::state::SessionState;
use vein::core::status::Status;
use vein::error::ShellError;
use vein::flags::Flags;
use vein::highlight::SyntaxHighlighter;
use vein::input::{LineEditor, LineSource, PlainReader};
use vein::logging;
use vein::process::signal::setup_interrupt_handler;
use vein::shell::streams::Streams;
use vein::shell::Shell;

fn main() {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = flags.parse(&args) {
        eprintln!("vein: {}", e);
        eprint!("{}", flags.help());
        process::exit(e.exit_code());
    }

    if flags.is_set("help") {
        flags.print_help();
        return;
    }

    if flags.is_set("version") {
        println!("vein {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    logging::init(flags.is_set("debug"));

    let status = run(&flags);
    if let Some(e) = status.error() {
        eprintln!("vein: {}", e);
    }
    debug!(code = status.code(), "shell finished");
    process::exit(status.code());
}

fn run(flags: &Flags) -> Status {
    let quiet = flags.is_set("quiet");

    let session = match SessionState::discover() {
        Ok(session) => session,
        Err(e) => return Status::fatal(e),
    };
    if let Err(e) = setup_interrupt_handler(quiet) {
        return Status::fatal(e);
    }

    let interactive = io::stdin().is_terminal();
    let highlighter = if interactive {
        SyntaxHighlighter::new()
    } else {
        SyntaxHighlighter::plain()
    };

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut streams = Streams::inherited(&mut stdout, &mut stderr).with_highlighter(highlighter);
    let mut shell = Shell::new(session);

    let loaded = Config::new(flags.get_value("config").map(PathBuf::from))
        .and_then(|config| {
            debug!(path = %config.paths().rc_path.display(), "rc file");
            config.load(&mut shell, &mut streams)
        });
    match loaded {
        Ok(Some(status)) => return status,
        Ok(None) => {}
        Err(e) => {
            if !quiet {
                eprintln!("Warning: {}", ShellError::from(e));
            }
        }
    }

    let mut lines: Box<dyn LineSource> = if interactive {
        match LineEditor::new() {
            Ok(editor) => Box::new(editor),
            Err(e) => return Status::fatal(e),
        }
    } else {
        Box::new(PlainReader::new(io::stdin().lock()))
    };

    shell.run(lines.as_mut(), &mut streams)
}
