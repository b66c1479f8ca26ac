use std::{
    io::{BufRead, Write, stdin, stdout},
    path::PathBuf,
};

use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use tracing_subscriber::EnvFilter;

use ufobase::{
    Database,
    shell::{Outcome, Shell},
};

/// Interactive shell for the ufobase table store.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Store file loaded at startup (if it exists) and used by `save`/`load`
    /// when they are given no path
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Do not print the greeting
    #[arg(long)]
    no_banner: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let mut database = Database::new();
    if let Some(path) = args.file.as_ref().filter(|path| path.exists()) {
        database.load(path)?;
    }
    let mut shell = Shell::new(database, args.file);

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    if !args.no_banner {
        writeln!(stdout, "ufobase shell. Type `help` for commands.").into_diagnostic()?;
        if let Some(path) = shell.default_file() {
            writeln!(stdout, "Store file: {}", path.display()).into_diagnostic()?;
        }
    }

    let mut buf = String::new();
    loop {
        stdout.write_all(b"ufo> ").into_diagnostic()?;
        stdout.flush().into_diagnostic()?;

        buf.clear();
        let Ok(read) = stdin.read_line(&mut buf) else {
            return Err(miette!("Input reading failed"));
        };
        // EOF
        if read == 0 {
            break;
        }

        match shell.run_line(buf.trim()) {
            Ok(Outcome::Exit) => break,
            Ok(Outcome::Print(text)) => {
                if !text.is_empty() {
                    writeln!(stdout, "{}", text.trim_end()).into_diagnostic()?;
                }
            }
            Err(err) => writeln!(stdout, "{err:?}").into_diagnostic()?,
        }
    }

    writeln!(stdout, "Bye.").into_diagnostic()?;
    Ok(())
}
