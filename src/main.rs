use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use idcard_toolkit::logging::{init_logging, LogConfig, LogFormat};
use idcard_toolkit::{
    guess_filename, load_id_list, save_lines, save_report, Codec, ParseOutcome, RegionTable,
    Sex,
};

#[derive(Parser)]
#[command(
    name = "idcard",
    version,
    about = "Validate, parse, guess and analyze Chinese resident identity numbers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Administrative region document (pca-code.json layout).
    #[arg(long, global = true, env = "IDCARD_REGIONS", default_value = "pca-code.json")]
    regions: PathBuf,

    /// Treat this date as today (YYYY-MM-DD) instead of the system date.
    #[arg(long, global = true, value_name = "DATE")]
    today: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format: pretty, compact or json.
    #[arg(long = "log-format", global = true, default_value = "pretty")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Quick validity check of a single number.
    Validate { id: String },

    /// Decompose a number into region, birth date, age and sex.
    Parse {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Generate every possible number for a region, birth date and sex.
    Guess {
        /// 6-digit region code
        region: String,
        /// Birth date as YYYYMMDD
        birth_date: String,
        /// M or F
        sex: Sex,
        /// Save candidates to a file instead of printing them
        /// (default name: guess_<region>_<date>_<M|F>_<timestamp>.txt).
        #[arg(long, short, num_args = 0..=1, value_name = "PATH")]
        output: Option<Option<PathBuf>>,
    },

    /// Analyze a list of numbers (one per line) and write a report.
    Analyze {
        file: PathBuf,
        /// Report path (default: report_<file>_<timestamp>.txt).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Print the full report as JSON instead of writing a text report.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format));

    let regions = RegionTable::load(&cli.regions)
        .context("cannot start without region data (use --regions or IDCARD_REGIONS)")?;
    let mut codec = Codec::new(&regions);
    if let Some(today) = cli.today {
        codec = codec.with_today(today);
    }

    match cli.command {
        Command::Validate { id } => run_validate(&codec, &id),
        Command::Parse { id, json } => run_parse(&codec, &id, json),
        Command::Guess {
            region,
            birth_date,
            sex,
            output,
        } => run_guess(&codec, &region, &birth_date, sex, output),
        Command::Analyze { file, report, json } => run_analyze(&codec, file, report, json),
    }
}

fn run_validate(codec: &Codec, id: &str) -> Result<ExitCode> {
    let result = codec.validate(id);
    println!("有效性: {}", if result.ok { "✔ 有效" } else { "❌ 无效" });
    println!("原因: {}", result.reason);
    Ok(if result.ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run_parse(codec: &Codec, id: &str, json: bool) -> Result<ExitCode> {
    let outcome = codec.parse(id);
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match &outcome {
            ParseOutcome::Valid(identity) => {
                println!("address_code: {}", identity.address_code);
                println!("address_info:");
                println!("  province: {}", identity.address.province);
                println!("  city: {}", identity.address.city);
                println!("  district: {}", identity.address.district);
                println!("birth_date: {}", identity.birth_date_string());
                println!("age: {}", identity.age);
                println!("gender: {}", identity.sex);
                println!("sequence_code: {}", identity.sequence_code);
                println!("checksum: {}", identity.check_digit);
            }
            ParseOutcome::Invalid { error } => println!("error: {}", error),
        }
    }
    Ok(if outcome.is_valid() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run_guess(
    codec: &Codec,
    region: &str,
    birth_date: &str,
    sex: Sex,
    output: Option<Option<PathBuf>>,
) -> Result<ExitCode> {
    let ids = codec.guess(region, birth_date, sex)?;

    match output {
        Some(path) => {
            let path = path.unwrap_or_else(|| {
                guess_filename(region, birth_date, sex, Local::now().naive_local())
            });
            save_lines(&path, &ids)?;
            println!("已成功生成 {} 个可能的号码。", ids.len());
            println!("结果已成功保存到文件: {}", path.display());
        }
        None => {
            for id in &ids {
                println!("{}", id);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_analyze(
    codec: &Codec,
    file: PathBuf,
    report_path: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    let ids = load_id_list(&file)?;
    if ids.is_empty() {
        eprintln!("文件 '{}' 为空或不包含有效行。", file.display());
        return Ok(ExitCode::FAILURE);
    }

    let report = codec.analyze_sample(&ids);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("--- 分析摘要 ---");
    println!("{}", report.summary.summary());

    let now = Local::now().naive_local();
    let source = file.display().to_string();
    let report_path = report_path.unwrap_or_else(|| {
        PathBuf::from(format!(
            "report_{}_{}.txt",
            source.replace(['.', '/', '\\'], "_"),
            now.format("%Y%m%d_%H%M%S")
        ))
    });
    save_report(&report_path, &report.render_text(&source, now))?;
    println!("✅ 详细分析报告已生成: {}", report_path.display());

    Ok(ExitCode::SUCCESS)
}
