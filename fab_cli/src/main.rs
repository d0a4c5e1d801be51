//! # Framecost CLI
//!
//! Fabrication cost estimates from the terminal.
//!
//! ```bash
//! fab_cli estimate --preset back-lighting-frame --frames 90
//! fab_cli estimate --params frame.json --extracted ai.json --json
//! fab_cli estimate --set material_type="Mild Steel" --set material_length=4 \
//!     --set cut_count=70 --set weld_count=58 --frames 3 --report
//! fab_cli presets
//! fab_cli sheet --sheet my_rates.toml
//! ```
//!
//! Logs go to stderr (`RUST_LOG` or `-v`), so stdout stays clean for JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fab_core::estimator::{estimate_batch, BatchEstimate, TaskDetails};
use fab_core::extraction::ExtractedParameters;
use fab_core::format::{format_currency, format_minutes, format_quantity, CurrencyFormat};
use fab_core::presets::{all_presets, find_preset, DEFAULT_PRESET_MATERIAL_COST};
use fab_core::report::render_text_report;
use fab_core::{EstimateError, EstimateResult, EstimatorSettings, FabricationSheet, ParameterForm};

/// Metal frame fabrication cost estimator
#[derive(Parser, Debug)]
#[command(name = "fab_cli", version)]
#[command(about = "Estimate material, operation and labour cost for metal frame fabrication")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate one frame and scale it to a batch
    Estimate(EstimateArgs),

    /// List the built-in frame presets
    Presets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the rate sheet in use as TOML
    Sheet {
        /// Rate sheet file (defaults to the configured or built-in sheet)
        #[arg(long)]
        sheet: Option<PathBuf>,

        /// Settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// Parameter form as JSON
    #[arg(long)]
    params: Option<PathBuf>,

    /// AI extraction output as JSON; entered values take precedence
    #[arg(long)]
    extracted: Option<PathBuf>,

    /// Start from a built-in frame preset (see `fab_cli presets`)
    #[arg(long)]
    preset: Option<String>,

    /// Material cost per unit length for a preset
    #[arg(long, default_value_t = DEFAULT_PRESET_MATERIAL_COST)]
    material_cost: f64,

    /// Set a single form field, e.g. `--set cut_count=70` (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_key_val)]
    set: Vec<(String, String)>,

    /// Number of identical frames
    #[arg(long, allow_negative_numbers = true)]
    frames: Option<i64>,

    /// Rate sheet TOML used for rates left blank
    #[arg(long)]
    sheet: Option<PathBuf>,

    /// Require every rate explicitly instead of consulting a sheet
    #[arg(long, conflicts_with = "sheet")]
    no_sheet: bool,

    /// Settings TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report title
    #[arg(long)]
    title: Option<String>,

    /// Print the batch estimate as JSON
    #[arg(long, conflicts_with = "report")]
    json: bool,

    /// Print the plain-text report
    #[arg(long)]
    report: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{}'", s));
    }
    Ok((key.to_string(), value.trim().trim_matches('"').to_string()))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Command::Estimate(args) => run_estimate(&args),
        Command::Presets { json } => run_presets(json),
        Command::Sheet { sheet, config } => run_sheet(sheet.as_deref(), config.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn read_file(path: &Path) -> EstimateResult<String> {
    fs::read_to_string(path).map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))
}

fn load_settings(config: Option<&Path>) -> EstimateResult<EstimatorSettings> {
    match config {
        Some(path) => EstimatorSettings::load(path),
        None => Ok(EstimatorSettings::default()),
    }
}

fn load_sheet(sheet: Option<&Path>, settings: &EstimatorSettings) -> EstimateResult<FabricationSheet> {
    match sheet {
        Some(path) => FabricationSheet::load(path),
        None => settings.load_sheet(),
    }
}

/// Form built from `--set` pairs; values go through the same text parsing
/// as a JSON body.
fn form_from_pairs(pairs: &[(String, String)]) -> EstimateResult<ParameterForm> {
    let map: Map<String, Value> = pairs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Ok(serde_json::from_value(Value::Object(map))?)
}

fn run_estimate(args: &EstimateArgs) -> EstimateResult<()> {
    let settings = load_settings(args.config.as_deref())?;
    let sheet = if args.no_sheet {
        None
    } else {
        Some(load_sheet(args.sheet.as_deref(), &settings)?)
    };

    let preset = args.preset.as_deref().map(find_preset).transpose()?;
    let base = match preset {
        Some(p) => {
            info!(preset = p.id, "starting from preset");
            p.to_form(args.material_cost)
        }
        None => ParameterForm::default(),
    };

    let mut user = match &args.params {
        Some(path) => ParameterForm::from_json(&read_file(path)?)?,
        None => ParameterForm::default(),
    };
    user = user.with_overrides(&form_from_pairs(&args.set)?);

    let user = match &args.extracted {
        Some(path) => {
            let extracted = ExtractedParameters::from_json(&read_file(path)?)?;
            debug!(?extracted, "merging extracted parameters");
            user.merge_extracted(&extracted)
        }
        None => user,
    };

    let form = settings.apply_defaults(base.with_overrides(&user));
    let params = form.resolve(sheet.as_ref())?;

    let frames = args.frames.unwrap_or_else(|| i64::from(settings.default_frame_count));
    let batch = estimate_batch(&params, frames)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    let title = args
        .title
        .clone()
        .or_else(|| preset.map(|p| p.name.to_string()))
        .unwrap_or_else(|| "Fabrication Estimate".to_string());

    if args.report {
        let mut options = settings.report_options(title).stamped_now();
        if let Some(p) = preset {
            options = options.with_dimensions(p.dimensions);
        }
        print!("{}", render_text_report(&batch, &options));
    } else {
        print_summary(&title, &batch, &settings);
    }
    Ok(())
}

fn task_line(label: &str, unit: &str, details: &TaskDetails, currency: &CurrencyFormat) {
    println!(
        "  {:<16} {:>14}  ({} {}, {})",
        label,
        format_currency(details.total_cost, currency),
        details.total_count,
        unit,
        format_minutes(details.total_time_min)
    );
}

fn print_summary(title: &str, batch: &BatchEstimate, settings: &EstimatorSettings) {
    let currency = settings.currency();
    let money = |amount: f64| format_currency(amount, &currency);
    let per = &batch.per_frame;

    println!("═══════════════════════════════════════");
    println!("  {}", title.to_uppercase());
    println!("═══════════════════════════════════════");
    println!();
    println!(
        "Material: {} ({} {}/frame)",
        per.material_type,
        format_quantity(per.material_usage.total_required),
        settings.length_unit
    );
    println!("Frames:   {}", batch.frame_count);
    println!();
    println!("Per frame:");
    println!("  {:<16} {:>14}", "Material", money(per.material_usage.total_cost));
    task_line("Cutting", "cuts", &per.cutting_details, &currency);
    task_line("Welding", "welds", &per.welding_details, &currency);
    for task in &per.other_tasks {
        task_line(task.task_type.display_name(), "units", &task.details, &currency);
    }
    if let Some(labour) = &per.labour_details {
        println!(
            "  {:<16} {:>14}  ({} h)",
            "Labour",
            money(labour.total_cost),
            format_quantity(labour.total_hours)
        );
    }
    if let Some(add_ons) = &per.add_on_details {
        println!("  {:<16} {:>14}", "Add-ons", money(add_ons.total_add_on_cost));
    }
    println!(
        "  {:<16} {:>14}  ({})",
        "Total",
        money(per.grand_total()),
        format_minutes(per.total_time_min())
    );
    println!();
    println!("═══════════════════════════════════════");
    println!(
        "  BATCH TOTAL ({} {}): {}  ({})",
        batch.frame_count,
        if batch.frame_count == 1 { "frame" } else { "frames" },
        money(batch.grand_total()),
        format_minutes(batch.total_time_min())
    );
    println!("═══════════════════════════════════════");
}

fn run_presets(json: bool) -> EstimateResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(all_presets())?);
        return Ok(());
    }

    for preset in all_presets() {
        println!("{}  ({})", preset.name, preset.id);
        println!("    Dimensions: {}", preset.dimensions);
        println!("    Section:    {}", preset.section);
        println!("    Length:     {}", format_quantity(preset.total_length));
        for segment in preset.segments {
            println!("      - {}: {}", segment.name, format_quantity(segment.length));
        }
        println!(
            "    Cuts/Welds: {} / {}  ({})",
            preset.cut_count,
            preset.weld_count,
            format_minutes(preset.time_per_frame_min())
        );
        println!();
    }
    Ok(())
}

fn run_sheet(sheet: Option<&Path>, config: Option<&Path>) -> EstimateResult<()> {
    let settings = load_settings(config)?;
    let sheet = load_sheet(sheet, &settings)?;
    print!("{}", sheet.to_toml_string()?);
    Ok(())
}
