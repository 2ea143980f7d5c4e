use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pbxplist::gid::{GeneratorOptions, GidGenerator};
use pbxplist::output::{self, GidRecord, OutputFormat};
use pbxplist::project::project_name_for_path;
use pbxplist::{diff, linter, parser, writer, Error, Format};

#[derive(Parser)]
#[command(name = "pbxplist")]
#[command(author, version, about = "Xcode project.pbxproj parsing, canonicalizing and conversion tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a project file between the native, JSON and XML formats
    Convert {
        /// Input file, or `-` for stdin
        file: PathBuf,

        /// Target format: xcode, json or xml
        #[arg(long, short, default_value = "xcode")]
        format: String,

        /// Project name used in synthesized comments (inferred from the
        /// wrapper directory when omitted)
        #[arg(long)]
        projectname: Option<String>,

        /// Output file, or `-` for stdout
        #[arg(long, short, default_value = "-")]
        output: PathBuf,

        /// Print a line diff between input and output to stderr
        #[arg(long, default_value = "false")]
        print_diff: bool,
    },

    /// Check whether project files are in canonical form
    ///
    /// Directories are searched recursively for project.pbxproj files. Exit
    /// code is the worst verdict: 0 canonical, 1 not canonical, 2 unparsable.
    Lint {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Decode gids given on the command line into their fields
    GidSplit {
        #[arg(required = true)]
        gids: Vec<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: CliOutputFormat,
    },

    /// Decode every object id in a project file
    GidDump {
        /// Input file, or `-` for stdin
        file: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: CliOutputFormat,
    },

    /// Mint fresh gids
    GidMint {
        /// How many to generate
        #[arg(long, short = 'n', default_value = "1")]
        count: usize,

        /// Pin the user hash field (0-255)
        #[arg(long)]
        user: Option<u32>,

        /// Pin the pid field (0-255)
        #[arg(long)]
        pid: Option<u32>,

        /// Pin the sequence counter start (0-65535)
        #[arg(long)]
        seq: Option<u32>,

        /// Pin the random field
        #[arg(long)]
        random: Option<u32>,

        /// Pin the timestamp, RFC 3339 (e.g. 2014-08-17T12:35:41Z)
        #[arg(long)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: CliOutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Text => OutputFormat::Text,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            file,
            format,
            projectname,
            output,
            print_diff,
        } => match Format::from_name(&format) {
            Ok(format) => cmd_convert(&file, format, projectname, &output, print_diff),
            Err(e) => fail(&e),
        },
        Commands::Lint { paths } => cmd_lint(&paths),
        Commands::GidSplit { gids, format } => cmd_gid_split(&gids, format.into()),
        Commands::GidDump { file, format } => cmd_gid_dump(&file, format.into()),
        Commands::GidMint {
            count,
            user,
            pid,
            seq,
            random,
            date,
            format,
        } => cmd_gid_mint(count, user, pid, seq, random, date, format.into()),
    }
}

fn cmd_convert(
    file: &Path,
    format: Format,
    projectname: Option<String>,
    output: &Path,
    print_diff: bool,
) -> ExitCode {
    let bytes = match read_input(file) {
        Ok(bytes) => bytes,
        Err(e) => return fail(&e),
    };

    let (root, info) = parser::parse(&bytes);
    let root = match root {
        Some(root) => root,
        None => {
            match info.error {
                Some(err) => {
                    eprint!("{}", output::report_parse_status(&display_name(file), &bytes, &err));
                }
                None => eprintln!("Error: could not parse input"),
            }
            return ExitCode::from(2);
        }
    };

    let name = projectname.or_else(|| project_name_for_path(file));
    let rendered = match writer::unparse(&root, format, name.as_deref()) {
        Ok(rendered) => rendered,
        Err(e) => return fail(&e),
    };

    if print_diff {
        if let (Ok(before), Ok(after)) = (
            std::str::from_utf8(&bytes),
            std::str::from_utf8(&rendered),
        ) {
            eprint!("{}", diff::format_diff(&diff::diff_lines(before, after)));
        }
    }

    match write_output(output, &rendered) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn cmd_lint(paths: &[PathBuf]) -> ExitCode {
    let files = linter::expand_paths(paths);
    if files.is_empty() {
        eprintln!("Error: no project files found under the given paths");
        return ExitCode::from(2);
    }

    let mut reports = Vec::new();
    for file in files {
        match linter::lint_file(&file) {
            Ok(report) => {
                print!("{}", output::report_lint(&report));
                if let Some(err) = &report.outcome.error {
                    eprint!(
                        "{}",
                        output::report_parse_status(
                            &report.path.display().to_string(),
                            &report.bytes,
                            err,
                        )
                    );
                }
                reports.push(report);
            }
            Err(e) => return fail(&e),
        }
    }
    ExitCode::from(linter::batch_verdict(&reports).exit_code())
}

fn cmd_gid_split(gids: &[String], format: OutputFormat) -> ExitCode {
    let mut records = Vec::new();
    for gid in gids {
        match GidRecord::decode(gid) {
            Ok(record) => records.push(record),
            Err(e) => return fail(&e),
        }
    }
    print_records(&records, format)
}

fn cmd_gid_dump(file: &Path, format: OutputFormat) -> ExitCode {
    let bytes = match read_input(file) {
        Ok(bytes) => bytes,
        Err(e) => return fail(&e),
    };
    let (root, info) = parser::parse(&bytes);
    let root = match root {
        Some(root) => root,
        None => {
            match info.error {
                Some(err) => {
                    eprint!("{}", output::report_parse_status(&display_name(file), &bytes, &err));
                }
                None => eprintln!("Error: could not parse input"),
            }
            return ExitCode::from(2);
        }
    };

    let name = project_name_for_path(file)
        .unwrap_or_else(|| linter::DEFAULT_PROJECT_NAME.to_string());
    let comments = writer::gid_comments(&root, &name);

    let mut records = Vec::new();
    if let Some(table) = pbxplist::plist::objects(&root) {
        for key in table.keys() {
            match GidRecord::decode(key) {
                Ok(record) => {
                    records.push(record.with_comment(comments.get(key).cloned()));
                }
                Err(_) => tracing::warn!(key = %key, "object key is not a well-formed gid"),
            }
        }
    }
    print_records(&records, format)
}

fn cmd_gid_mint(
    count: usize,
    user: Option<u32>,
    pid: Option<u32>,
    seq: Option<u32>,
    random: Option<u32>,
    date: Option<String>,
    format: OutputFormat,
) -> ExitCode {
    let date = match date.as_deref().map(parse_date).transpose() {
        Ok(date) => date,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::from(2);
        }
    };

    let mut generator = match GidGenerator::with_options(GeneratorOptions {
        user,
        pid,
        date,
        random,
        seq,
    }) {
        Ok(generator) => generator,
        Err(e) => return fail(&e),
    };

    let mut records = Vec::new();
    for gid in generator.generate_n(count) {
        match GidRecord::decode(&gid) {
            Ok(record) => records.push(record),
            Err(e) => return fail(&e),
        }
    }
    print_records(&records, format)
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("invalid date {s:?}: {e}"))
}

fn print_records(records: &[GidRecord], format: OutputFormat) -> ExitCode {
    match output::format_gid_records(records, format) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn fail(error: &Error) -> ExitCode {
    eprintln!("Error: {error}");
    ExitCode::from(2)
}

fn display_name(path: &Path) -> String {
    if path == Path::new("-") {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
    if path == Path::new("-") {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        std::fs::read(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    if path == Path::new("-") {
        std::io::stdout().write_all(bytes)?;
        Ok(())
    } else {
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
