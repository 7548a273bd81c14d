use std::fs::File as FsFile;
use std::io::{self, IsTerminal};
use std::process;

use clap::Parser as ClapParser;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use shsyntax::{File, Node, Parser, ParserOptions, MAX_PARSER_DEPTH};

#[derive(ClapParser)]
#[command(name = "shsyntax")]
#[command(about = "Parse a POSIX shell script and print its syntax tree")]
#[command(version)]
struct Cli {
    /// Script file to parse; standard input when absent
    #[arg()]
    file: Option<String>,

    /// Name used in error messages
    #[arg(long = "name")]
    name: Option<String>,

    /// Print the syntax tree as JSON
    #[arg(long = "json")]
    json: bool,

    /// Maximum nesting depth
    #[arg(long = "max-depth", default_value_t = MAX_PARSER_DEPTH)]
    max_depth: usize,

    /// More log output on stderr (repeat for more)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // only fails if a logger is already installed
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    let options = ParserOptions {
        max_depth: cli.max_depth,
    };
    let result = match cli.file {
        Some(ref path) => {
            let name = cli.name.clone().unwrap_or_else(|| path.clone());
            match FsFile::open(path) {
                Ok(f) => Parser::new(io::BufReader::new(f), &name).with_options(options).parse(),
                Err(e) => {
                    eprintln!("Error: Cannot read script file: {}: {}", path, e);
                    process::exit(1);
                }
            }
        }
        None => {
            if io::stdin().is_terminal() {
                eprintln!("Error: No script provided. Provide a script file or pipe via stdin.");
                process::exit(1);
            }
            let name = cli.name.clone().unwrap_or_default();
            Parser::new(io::stdin().lock(), &name).with_options(options).parse()
        }
    };

    let file = match result {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&file) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", summary(&file));
    }
}

/// One line per run: statement count and the kinds of top-level commands.
fn summary(file: &File) -> String {
    let kinds: Vec<&str> = file
        .stmts
        .iter()
        .map(|s| match &s.node {
            None => "empty",
            Some(Node::Command(_)) => "command",
            Some(Node::Subshell(_)) => "subshell",
            Some(Node::Block(_)) => "block",
            Some(Node::If(_)) => "if",
            Some(Node::While(_)) => "while",
            Some(Node::Until(_)) => "until",
            Some(Node::For(_)) => "for",
            Some(Node::Case(_)) => "case",
            Some(Node::FuncDecl(_)) => "function",
            Some(Node::Binary(_)) => "binary",
        })
        .collect();
    let name = if file.name.is_empty() { "<stdin>" } else { &file.name };
    format!("{}: {} statements [{}]", name, file.stmts.len(), kinds.join(", "))
}
