//! gantline CLI - milestone timelines and task digests
//!
//! Reads the milestone sheet, then renders a timeline chart or builds the
//! daily/weekly HTML digest and optionally mails it.

mod config;
mod mailer;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gantline_core::window::{next_days, tasks_in_range};
use gantline_core::{Digest, Preset, ProgressSource, Renderer, Task, Timeline};
use gantline_loader::{load, LoadError, LoadOptions, Profile, TaskTable};
use gantline_render::{HtmlChartRenderer, HtmlDigestRenderer, SvgRenderer, TextRenderer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::mailer::{MailSettings, Mailer, ENV_PASSWORD, ENV_RECIPIENT, ENV_SENDER};

#[derive(Parser)]
#[command(name = "gantline")]
#[command(author, version, about = "Milestone timeline charts and task digests", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./gantline.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SheetArgs {
    /// Milestone sheet (.xlsx, .xlsm, .xls, .ods or .csv)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// 1-based header row of the sheet (default 9)
    #[arg(long, value_name = "ROW")]
    header_row: Option<usize>,

    /// Evaluate as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    today: Option<NaiveDate>,

    /// Also require the Progress column
    #[arg(long)]
    require_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a milestone sheet
    Check {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Required-column set to validate against
        #[arg(long, value_enum, default_value = "chart")]
        profile: ProfileArg,
    },

    /// List tasks with finish dates and progress
    Tasks {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Only tasks overlapping today and the next N days
        #[arg(long, value_name = "DAYS")]
        within: Option<u32>,

        /// Required-column set to validate against
        #[arg(long, value_enum, default_value = "chart")]
        profile: ProfileArg,
    },

    /// Render the timeline chart
    Chart {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Zoom preset: all, quarter (3m), month (1m), week (1w)
        #[arg(short, long, default_value = "all")]
        preset: Preset,

        /// Output format
        #[arg(short, long, value_enum, default_value = "svg")]
        format: ChartFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the sheet's Progress column where it has a value
        #[arg(long)]
        sheet_progress: bool,

        /// Chart title
        #[arg(long)]
        title: Option<String>,
    },

    /// Build the daily/weekly HTML digest
    Digest {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mail the report to the recipient
        #[arg(long)]
        send: bool,

        /// SMTP submission host
        #[arg(long)]
        smtp_host: Option<String>,

        /// SMTP submission port
        #[arg(long)]
        smtp_port: Option<u16>,

        /// Sender address
        #[arg(long, env = ENV_SENDER, hide_env_values = true)]
        sender: Option<String>,

        /// Sender password
        #[arg(long, env = ENV_PASSWORD, hide_env_values = true)]
        password: Option<String>,

        /// Recipient address
        #[arg(long, env = ENV_RECIPIENT, hide_env_values = true)]
        recipient: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Chart,
    Digest,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Chart => Profile::Chart,
            ProfileArg::Digest => Profile::Digest,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartFormat {
    Svg,
    Html,
    Json,
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if err.downcast_ref::<LoadError>().is_some() {
                eprintln!("Please ensure the sheet is correct and its headers are on the expected row (row 9 by default).");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { sheet, profile } => {
            let table = load_sheet(&sheet, &config, profile.into())?;
            print!("{}", check_summary(&table));
        }
        Commands::Tasks {
            sheet,
            within,
            profile,
        } => {
            let today = resolve_today(sheet.today);
            let table = load_sheet(&sheet, &config, profile.into())?;
            let tasks: Vec<Task> = match within {
                Some(days) => tasks_in_range(&table.tasks, &next_days(today, days))
                    .into_iter()
                    .cloned()
                    .collect(),
                None => table.tasks.clone(),
            };
            if tasks.is_empty() {
                println!("No tasks found for this period.");
                return Ok(());
            }
            let timeline = Timeline::build(&tasks, today, Preset::All, ProgressSource::Derived, config.color_map())?;
            print!("{}", TextRenderer::new().render(&timeline)?);
        }
        Commands::Chart {
            sheet,
            preset,
            format,
            output,
            sheet_progress,
            title,
        } => {
            let today = resolve_today(sheet.today);
            let table = load_sheet(&sheet, &config, Profile::Chart)?;
            let source = if sheet_progress {
                ProgressSource::Sheet
            } else {
                ProgressSource::Derived
            };
            let timeline = Timeline::build(&table.tasks, today, preset, source, config.color_map())?;

            let mut svg = SvgRenderer::new();
            if let Some(title) = title.or_else(|| config.title.clone()) {
                svg = svg.title(title);
            }
            let rendered = match format {
                ChartFormat::Svg => svg.render(&timeline)?,
                ChartFormat::Html => HtmlChartRenderer::with_svg(svg).render(&timeline)?,
                ChartFormat::Json => serde_json::to_string_pretty(&timeline)? + "\n",
                ChartFormat::Text => TextRenderer::new().visible_only().render(&timeline)?,
            };
            emit(&rendered, output.as_deref())?;
        }
        Commands::Digest {
            sheet,
            output,
            send,
            smtp_host,
            smtp_port,
            sender,
            password,
            recipient,
        } => {
            let today = resolve_today(sheet.today);
            let table = load_sheet(&sheet, &config, Profile::Digest).context("Failed to generate task report")?;
            let digest = Digest::build(&table.tasks, today);
            let renderer = HtmlDigestRenderer::new();
            let html = renderer.render(&digest)?;
            info!(active_this_week = digest.active_this_week(), "report generated");

            if let Some(path) = output.as_deref() {
                emit(&html, Some(path))?;
            } else if !send {
                emit(&html, None)?;
            }

            if send {
                let settings = MailSettings::from_parts(
                    sender,
                    password,
                    recipient,
                    smtp_host.unwrap_or_else(|| config.smtp.host.clone()),
                    smtp_port.unwrap_or(config.smtp.port),
                )?;
                let mailer = Mailer::new(settings)?;
                mailer.send_html(&renderer.subject(&digest), html)?;
                eprintln!("Email sent successfully to {}", mailer.recipient());
            }
        }
    }

    Ok(())
}

/// Today's date, sampled once per run unless overridden
fn resolve_today(flag: Option<NaiveDate>) -> NaiveDate {
    flag.unwrap_or_else(|| Local::now().date_naive())
}

fn load_sheet(sheet: &SheetArgs, config: &Config, profile: Profile) -> Result<TaskTable> {
    let mut options = LoadOptions::new(profile).header_row(config.header_row_index(sheet.header_row)?);
    if sheet.require_progress {
        options = options.require_progress();
    }
    Ok(load(&sheet.file, &options)?)
}

fn check_summary(table: &TaskTable) -> String {
    let start = table.tasks.iter().map(|t| t.start).min();
    let finish = table.tasks.iter().map(Task::finish).max();
    let mut categories: Vec<&str> = Vec::new();
    for task in &table.tasks {
        if !categories.contains(&task.category.as_str()) {
            categories.push(&task.category);
        }
    }

    let mut out = format!("{}: {} tasks", table.source.display(), table.tasks.len());
    if table.dropped_rows > 0 {
        out.push_str(&format!(" ({} rows skipped)", table.dropped_rows));
    }
    out.push('\n');
    if let (Some(start), Some(finish)) = (start, finish) {
        out.push_str(&format!("Span: {} .. {}\n", start, finish));
    }
    out.push_str(&format!("Categories: {}\n", categories.join(", ")));
    out
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!(file = %path.display(), "wrote output");
        }
        None => print!("{}", content),
    }
    Ok(())
}
