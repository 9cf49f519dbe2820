//! Texbank CLI - Extract structured questions from LaTeX exam documents

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::Path;
#[cfg(feature = "cli")]
use texbank::{
    LatexQuestionParser, ParseReport, Question, QuestionStatus, TagGenerator, TagTree,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "texbank")]
#[command(version)]
#[command(about = "Texbank - Extract structured questions from LaTeX exam documents", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Tag mapping document used to generate tag breadcrumbs
    #[arg(short, long)]
    tag_map: Option<String>,

    /// Write failed blocks and the parse report as JSON to this path
    #[arg(long)]
    error_log: Option<String>,

    /// Pretty print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Only emit questions with this status (active or pending)
    #[arg(long)]
    status: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Check a document: count question blocks and report structural issues
    Check {
        /// Input file to check
        input: Option<String>,
    },

    /// Parse a document into question records (default action)
    Parse {
        /// Input file path
        input: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: Option<String>,

        /// Tag mapping document
        #[arg(short, long)]
        tag_map: Option<String>,

        /// Write the parse report as JSON to this path
        #[arg(long)]
        error_log: Option<String>,

        /// Pretty print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Parse every .tex file in a directory
    Batch {
        /// Input directory
        input: String,

        /// Output directory for per-file JSON
        #[arg(short, long)]
        output_dir: String,

        /// Tag mapping document
        #[arg(short, long)]
        tag_map: Option<String>,
    },

    /// Show version and feature info
    Info,
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(cmd) = cli.command {
        return handle_subcommand(cmd);
    }

    let input = read_input(cli.input_file.as_deref())?;
    let parser = build_parser(cli.tag_map.as_deref())?;
    let (mut questions, report) = parser.parse_document(&input);

    if let Some(status) = cli.status.as_deref() {
        let wanted = parse_status_filter(status)?;
        questions.retain(|q| q.status == wanted);
    }

    write_records(&questions, cli.output.as_deref(), cli.pretty)?;
    if let Some(path) = cli.error_log.as_deref() {
        write_report(&report, path)?;
    }
    if !report.is_clean() {
        eprintln!(
            "{} of {} blocks failed to parse",
            report.errors.len(),
            report.total_blocks
        );
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn handle_subcommand(cmd: Commands) -> io::Result<()> {
    match cmd {
        Commands::Check { input } => {
            let text = read_input(input.as_deref())?;
            let parser = LatexQuestionParser::new();
            let (questions, report) = parser.parse_document(&text);
            let pending = questions
                .iter()
                .filter(|q| q.status == QuestionStatus::Pending)
                .count();
            println!("blocks:  {}", report.total_blocks);
            println!("parsed:  {}", report.parsed);
            println!("pending: {}", pending);
            for err in &report.errors {
                eprintln!("block {}: {}", err.index, err.message);
            }
            if !report.is_clean() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Parse {
            input,
            output,
            tag_map,
            error_log,
            pretty,
        } => {
            let text = read_input(input.as_deref())?;
            let parser = build_parser(tag_map.as_deref())?;
            let (questions, report) = parser.parse_document(&text);
            write_records(&questions, output.as_deref(), pretty)?;
            if let Some(path) = error_log.as_deref() {
                write_report(&report, path)?;
            }
            Ok(())
        }
        Commands::Batch {
            input,
            output_dir,
            tag_map,
        } => {
            let parser = build_parser(tag_map.as_deref())?;
            fs::create_dir_all(&output_dir)?;
            let mut total = 0usize;
            for entry in fs::read_dir(&input)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("tex") {
                    continue;
                }
                let text = fs::read_to_string(&path)?;
                let (questions, report) = parser.parse_document(&text);
                total += questions.len();

                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("output");
                let out_path = Path::new(&output_dir).join(format!("{}.json", stem));
                let json = serde_json::to_string_pretty(&questions)?;
                fs::write(&out_path, json)?;
                if !report.is_clean() {
                    eprintln!(
                        "{}: {} of {} blocks failed",
                        path.display(),
                        report.errors.len(),
                        report.total_blocks
                    );
                }
            }
            println!("wrote {} questions to {}", total, output_dir);
            Ok(())
        }
        Commands::Info => {
            println!("texbank {}", env!("CARGO_PKG_VERSION"));
            println!("question environment: ex");
            println!("answer commands: \\choiceTF, \\choice, \\shortans, \\matching");
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn build_parser(tag_map: Option<&str>) -> io::Result<LatexQuestionParser> {
    match tag_map {
        Some(path) => {
            let doc = fs::read_to_string(path)?;
            let tree = TagTree::from_document(&doc);
            if tree.is_empty() {
                eprintln!("warning: tag map {} contains no entries", path);
            }
            Ok(LatexQuestionParser::with_tag_generator(TagGenerator::new(
                tree,
            )))
        }
        None => Ok(LatexQuestionParser::new()),
    }
}

#[cfg(feature = "cli")]
fn parse_status_filter(raw: &str) -> io::Result<QuestionStatus> {
    match raw.to_ascii_lowercase().as_str() {
        "active" => Ok(QuestionStatus::Active),
        "pending" => Ok(QuestionStatus::Pending),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown status filter '{}'", other),
        )),
    }
}

#[cfg(feature = "cli")]
fn write_records(questions: &[Question], output: Option<&str>, pretty: bool) -> io::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(questions)?
    } else {
        serde_json::to_string(questions)?
    };
    match output {
        Some(path) => fs::write(path, json)?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(json.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn write_report(report: &ParseReport, path: &str) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install texbank --features cli");
    eprintln!("  texbank [OPTIONS] [INPUT_FILE]");
}
