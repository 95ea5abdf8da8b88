use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marksheet_acquire::submit::{self, CaptchaAnswers};
use marksheet_acquire::{captcha, output, PortalConfig, SessionRegistry};
use marksheet_model::{CombinedResult, ResultRecord, SemesterKey};
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "marksheet")]
#[command(about = "Semester result lookup against the university result portal")]
#[command(version)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a USN across semesters, solving each CAPTCHA at the prompt
    Fetch {
        /// University Seat Number to look up
        #[arg(short, long)]
        usn: String,

        /// Semesters to query, e.g. "1,3" or "sem2" (default: all five)
        #[arg(short, long, value_delimiter = ',')]
        semesters: Vec<SemesterKey>,

        /// Directory for CAPTCHA images, the result JSON and the marks sheet
        #[arg(short = 'O', long, default_value = ".")]
        output_dir: String,

        /// Print the combined result as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Portal base URL
        #[arg(long, default_value = marksheet_acquire::config::DEFAULT_PORTAL_URL)]
        portal_url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = marksheet_acquire::config::DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },

    /// Extract a result from a saved result page
    Parse {
        /// Semester whose subject map applies, e.g. "3" or "sem3"
        #[arg(short, long)]
        semester: SemesterKey,

        /// Path to the saved HTML page
        #[arg(short, long)]
        input: String,

        /// Print the record as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the USN following the given one
    NextUsn {
        usn: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    match cli.command {
        Commands::Fetch {
            usn,
            semesters,
            output_dir,
            json,
            portal_url,
            timeout_secs,
        } => {
            let usn = usn.trim().to_string();
            anyhow::ensure!(
                marksheet_model::is_plain_usn(&usn),
                "USN '{usn}' must contain only letters and digits"
            );
            let semesters = if semesters.is_empty() {
                SemesterKey::ALL.to_vec()
            } else {
                semesters
            };
            let config = PortalConfig::with_base_url(&portal_url)
                .with_timeout(Duration::from_secs(timeout_secs));
            tracing::info!(usn = %usn, portal = %config.base_url, semesters = semesters.len(), "Fetching results");

            let combined = fetch(config, &usn, &semesters, &output_dir).await?;
            output::write_combined(&output_dir, &combined)?;
            output::write_marks(&output_dir, &combined)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&combined)?);
            } else {
                print_combined(&combined);
            }
        }
        Commands::Parse {
            semester,
            input,
            json,
        } => {
            tracing::info!(input = %input, semester = %semester, "Parsing saved result page");
            let html = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {input}"))?;
            let record = marksheet_parse::extract(&html, semester)
                .with_context(|| format!("{input} is not a result page"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(semester, &record);
            }
        }
        Commands::NextUsn { usn } => {
            let next = marksheet_model::next_usn(&usn)
                .with_context(|| format!("'{usn}' does not end in a three-digit serial"))?;
            println!("{next}");
        }
    }

    Ok(())
}

/// Run one visit: save each semester's CAPTCHA, read the answers from stdin,
/// and submit once.
async fn fetch(
    config: PortalConfig,
    usn: &str,
    semesters: &[SemesterKey],
    output_dir: &str,
) -> Result<CombinedResult> {
    let registry = SessionRegistry::new(config);
    let visitor = registry.start_visit().await?;
    let mut answers = CaptchaAnswers::new();

    for &semester in semesters {
        let mut image = captcha::get(&registry, &visitor, semester).await?;
        loop {
            let path = output::write_captcha(output_dir, semester, &image)?;
            let answer = prompt(&format!(
                "CAPTCHA for semester {} ({}), blank to skip, '?' for a new one: ",
                semester.numeral(),
                path.display()
            ))?;

            if answer == "?" {
                image = captcha::refresh(&registry, &visitor, semester).await?;
                continue;
            }
            if !answer.is_empty() {
                answers.insert(semester, answer);
            }
            break;
        }
    }

    let combined = submit::submit(&registry, &visitor, usn, &answers).await?;
    Ok(combined)
}

fn prompt(message: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{message}")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read answer")?;
    Ok(line.trim().to_string())
}

fn print_combined(combined: &CombinedResult) {
    println!("USN: {}", combined.usn);
    for (semester, record) in &combined.semesters {
        match record {
            Some(record) => print_record(*semester, record),
            None => println!("\nSemester {}: no result", semester.numeral()),
        }
    }
}

fn print_record(semester: SemesterKey, record: &ResultRecord) {
    println!(
        "\nSemester {}: {} ({})",
        semester.numeral(),
        record.student_name,
        record.usn
    );
    for subject in &record.subjects {
        println!(
            "  {:<8} {:<10} {:>4} {:>4} {:>5}  {}",
            subject.short_code, subject.code, subject.internal, subject.external, subject.total, subject.result
        );
    }
    println!(
        "  total {} over {} subjects, {}%",
        record.total, record.counted, record.percentage
    );
    println!("  {}", ResultRecord::marks_header(semester).join("\t"));
    println!("  {}", record.marks_row(semester).join("\t"));
}
