//! Canvas Components compiler
//!
//! Compiles a markup file or request body, or runs an interactive shell.

use canvas_components::{ComponentRegistry, Compiler, payload};
use clap::Parser as ClapParser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(ClapParser)]
#[command(name = "ccomp")]
#[command(about = "Compile Canvas Components markup to HTML")]
struct Cli {
    /// Component registry JSON produced by the component build
    #[arg(long, env = "CCOMP_REGISTRY")]
    registry: Option<PathBuf>,
    /// Treat the input as a JSON request body and rewrite its message
    #[arg(long)]
    payload: bool,
    /// Print only the HTML, without the style block
    #[arg(long, conflicts_with = "payload")]
    html_only: bool,
    /// Input file, or `-` for stdin; starts a shell when omitted
    input: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let registry = match &cli.registry {
        Some(path) => match ComponentRegistry::from_path(path) {
            Ok(registry) => registry,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            log::warn!("no registry given; every component will be unknown");
            ComponentRegistry::empty()
        }
    };
    let compiler = Compiler::new(&registry);

    match &cli.input {
        Some(input) => run_input(&cli, &compiler, input),
        None => run_repl(&cli, &compiler),
    }
}

fn read_input(input: &Path) -> io::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
    }
}

fn run_input(cli: &Cli, compiler: &Compiler<'_>, input: &Path) {
    let text = match read_input(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", input.display(), e);
            std::process::exit(1);
        }
    };

    match render(cli, compiler, &text) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn render(cli: &Cli, compiler: &Compiler<'_>, text: &str) -> Result<String, Box<dyn std::error::Error>> {
    if cli.payload {
        let rewritten = payload::rewrite(text, compiler)?;
        return Ok(rewritten.unwrap_or_else(|| text.to_string()));
    }

    let document = compiler.compile(text)?;
    if cli.html_only {
        Ok(document.html)
    } else {
        Ok(document.render())
    }
}

fn run_repl(cli: &Cli, compiler: &Compiler<'_>) {
    println!("Canvas Components");
    println!(
        "{} component(s) loaded. Type markup to compile, Ctrl+D to exit.\n",
        compiler.registry().len()
    );

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error starting shell: {}", e);
            std::process::exit(1);
        }
    };

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(e) = editor.add_history_entry(line.as_str()) {
                    log::debug!("history not updated: {}", e);
                }

                match render(cli, compiler, &line) {
                    Ok(output) => println!("{}", output),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
}
