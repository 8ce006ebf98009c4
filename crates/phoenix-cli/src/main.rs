use std::{
    env, fs,
    io::{self, Write},
    process::ExitCode,
};

use phoenix::{LimitedTracker, NoopTracer, ReplSession, ResourceLimits, Runner, StdPrint};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 {
        return run_file(&args[1]);
    }
    interactive()
}

/// File execution mode: `phoenix <path>`.
///
/// An unreadable file exits 1; an uncaught Phoenix error prints the
/// diagnostic to stderr and still exits 0.
fn run_file(path: &str) -> ExitCode {
    let code = match read_file(path) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let runner = Runner::new(&code, path);
    let mut print = StdPrint;
    let mut tracer = NoopTracer;
    if let Err(err) = runner.run(&mut print, LimitedTracker::new(ResourceLimits::default()), &mut tracer) {
        drop(print); // flush pending stdout before the diagnostic
        eprintln!("{err}");
    }
    ExitCode::SUCCESS
}

/// Interactive mode: read a snippet, execute it, keep the session.
fn interactive() -> ExitCode {
    let mut session = ReplSession::new("<stdin>");
    let mut source = String::new();

    loop {
        let prompt = if source.is_empty() { ">>> " } else { "... " };
        let Some(line) = read_line(prompt) else {
            println!();
            break;
        };

        if source.is_empty() {
            if line.trim().is_empty() {
                continue;
            }
            source.push_str(&line);
            if !needs_more_input(&source) {
                execute_snippet(&mut session, &source);
                source.clear();
            }
            continue;
        }

        // inside a block: a blank line terminates the snippet
        if line.trim().is_empty() {
            execute_snippet(&mut session, &source);
            source.clear();
            continue;
        }
        source.push('\n');
        source.push_str(&line);
    }

    ExitCode::SUCCESS
}

fn execute_snippet(session: &mut ReplSession, source: &str) {
    let mut print = StdPrint;
    if let Err(err) = session.execute(source, &mut print) {
        drop(print);
        eprintln!("{err}");
    }
}

/// A snippet that opened a block keeps reading until a blank line.
fn needs_more_input(source: &str) -> bool {
    source.lines().any(|line| line.trim_end().ends_with(':'))
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_owned()),
    }
}

fn read_file(path: &str) -> Result<String, String> {
    match fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_file() {
                return Err(format!("Error reading {path}: not a file"));
            }
        }
        Err(err) => {
            return Err(format!("Error reading {path}: {err}"));
        }
    }
    fs::read_to_string(path).map_err(|err| format!("Error reading {path}: {err}"))
}
