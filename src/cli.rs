//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{build_settings, data_settings, unknown_keys};
use crate::domain::consolidation::{
    Consolidation, ConsolidationInput, NavMetric, Substitution, consolidate,
};
use crate::domain::error::PesowatchError;
use crate::domain::fx::quote_board;
use crate::domain::kpi::{Verdict, period_kpis};
use crate::domain::normalize::{normalize, real_returns, trailing_window};
use crate::domain::observation::latest_deposit_rates;
use crate::domain::projection::{
    Candidate, GoalRequest, GoalStatus, Horizon, RankedInstrument, compare_instruments,
    contribution_projection, plan_goal, ranking_spread, simple_projection,
};
use crate::domain::rate::{RateBasis, RateEstimate, estimate_for_column};
use crate::domain::settings::EngineSettings;
use crate::domain::table::{Column, ColumnKind};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "pesowatch",
    about = "Argentine savings monitor: funds, dollar quotes and inflation"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the consolidated daily table and period indicators
    Consolidate {
        #[arg(short, long)]
        config: PathBuf,
        /// price (VCP) or rate (accumulated TNA)
        #[arg(long)]
        metric: Option<NavMetric>,
        /// Length of the normalized window
        #[arg(long)]
        days: Option<i64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Project an investment in one fund
    Project {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        fund: String,
        #[arg(long)]
        capital: f64,
        #[arg(long)]
        months: i64,
        #[arg(long)]
        contribution: Option<f64>,
        /// Annual rate in percent, instead of the estimated one
        #[arg(long)]
        rate: Option<f64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rank every fund by the capital it reaches
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        capital: f64,
        #[arg(long)]
        months: i64,
        /// Also rank fixed-term deposits
        #[arg(long)]
        with_deposits: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute the monthly contribution needed to reach a target
    Goal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        fund: String,
        #[arg(long)]
        capital: f64,
        #[arg(long)]
        target: f64,
        #[arg(long)]
        months: i64,
        #[arg(long)]
        rate: Option<f64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the latest dollar quotes
    Quotes {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Consolidate {
            config,
            metric,
            days,
            output,
        } => run_consolidate(&config, metric, days, output.as_deref()),
        Command::Project {
            config,
            fund,
            capital,
            months,
            contribution,
            rate,
            output,
        } => run_project(
            &config,
            &fund,
            capital,
            months,
            contribution,
            rate,
            output.as_deref(),
        ),
        Command::Compare {
            config,
            capital,
            months,
            with_deposits,
            output,
        } => run_compare(&config, capital, months, with_deposits, output.as_deref()),
        Command::Goal {
            config,
            fund,
            capital,
            target,
            months,
            rate,
            output,
        } => run_goal(&config, &fund, capital, target, months, rate, output.as_deref()),
        Command::Quotes { config } => run_quotes(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loaded configuration plus the row source it points at.
struct Context {
    config: FileConfigAdapter,
    settings: EngineSettings,
    data: Box<dyn DataPort>,
}

fn load_context(config_path: &Path) -> Result<Context, PesowatchError> {
    log::info!("loading config from {}", config_path.display());
    let config = FileConfigAdapter::from_file(config_path)?;
    let settings = build_settings(&config)?;
    let data_cfg = data_settings(&config)?;
    // one fetch per source per run, so the CSV files are read directly
    let data: Box<dyn DataPort> = Box::new(CsvAdapter::new(PathBuf::from(&data_cfg.path)));

    Ok(Context {
        config,
        settings,
        data,
    })
}

fn degrade<T>(source: &str, result: Result<T, PesowatchError>) -> Option<T> {
    match result {
        Ok(rows) => Some(rows),
        Err(e) => {
            log::warn!("{source} unavailable: {e}");
            None
        }
    }
}

/// Fetches every source and consolidates what could be read.
///
/// Only the funds in `settings.instruments` are fetched, or every fund when
/// the list is empty. A failing source degrades the table instead of failing
/// the run. An empty table is reported as [`PesowatchError::NoData`].
pub fn load_consolidation(
    port: &dyn DataPort,
    settings: &EngineSettings,
    metric: NavMetric,
) -> Result<Consolidation, PesowatchError> {
    let nav = degrade("fund data", port.fetch_nav_rows(&settings.instruments));
    let fx = degrade("FX quotes", port.fetch_fx_quotes());
    let inflation = degrade("inflation", port.fetch_monthly_inflation());

    let consolidation = consolidate(
        ConsolidationInput {
            nav: nav.as_deref(),
            fx: fx.as_deref(),
            inflation: inflation.as_deref(),
            metric,
        },
        settings,
    );
    if consolidation.table.is_empty() {
        return Err(PesowatchError::NoData {
            series: "consolidated table".to_string(),
        });
    }
    Ok(consolidation)
}

/// Instruments to rank, plus what was left out because a source failed.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    pub candidates: Vec<Candidate>,
    pub substitutions: Vec<Substitution>,
}

/// Ranking candidates: every fund column with its estimated rate, then
/// optionally the latest client rate of each bank's fixed-term deposit.
/// An unavailable deposit source leaves the funds alone in the ranking.
pub fn collect_candidates(
    port: &dyn DataPort,
    consolidation: &Consolidation,
    settings: &EngineSettings,
    with_deposits: bool,
) -> Result<CandidateSet, PesowatchError> {
    let mut candidates = Vec::new();
    let mut substitutions = Vec::new();
    for name in consolidation.table.fund_names() {
        let estimate = estimate_for_column(&consolidation.table, &name, settings)?;
        candidates.push(Candidate::new(name, estimate.rate));
    }
    if with_deposits {
        match degrade("fixed-term deposits", port.fetch_deposit_rates()) {
            Some(rates) => {
                for deposit in latest_deposit_rates(&rates) {
                    candidates.push(Candidate::new(
                        format!("Plazo fijo {}", deposit.bank),
                        deposit.tna_clients,
                    ));
                }
            }
            None => substitutions.push(Substitution::DepositsUnavailable),
        }
    }
    Ok(CandidateSet {
        candidates,
        substitutions,
    })
}

/// Selected instruments that the row source does not know.
pub fn missing_instruments(
    port: &dyn DataPort,
    selected: &[String],
) -> Result<Vec<String>, PesowatchError> {
    if selected.is_empty() {
        return Ok(Vec::new());
    }
    let known = port.list_instruments()?;
    Ok(selected
        .iter()
        .filter(|name| !known.contains(name))
        .cloned()
        .collect())
}

fn describe_estimate(estimate: &RateEstimate) -> String {
    match estimate.basis {
        RateBasis::Window { points, raw } if estimate.was_clamped() => format!(
            "{:.2}% (clamped from {raw:.2}%, {points} points)",
            estimate.rate
        ),
        RateBasis::Window { points, .. } => format!("{:.2}% ({points} points)", estimate.rate),
        RateBasis::Fallback(reason) => format!("{:.2}% (fallback: {reason:?})", estimate.rate),
    }
}

fn resolve_rate(
    consolidation: &Consolidation,
    fund: &str,
    settings: &EngineSettings,
    rate_override: Option<f64>,
) -> Result<f64, PesowatchError> {
    if let Some(rate) = rate_override {
        println!("Annual rate: {rate:.2}% (given)");
        return Ok(rate);
    }
    match consolidation.table.column(fund) {
        Some(Column {
            kind: ColumnKind::Fund,
            ..
        }) => {}
        _ => {
            return Err(PesowatchError::UnknownColumn {
                name: fund.to_string(),
            });
        }
    }
    let estimate = estimate_for_column(&consolidation.table, fund, settings)?;
    println!("Annual rate: {}", describe_estimate(&estimate));
    Ok(estimate.rate)
}

fn report_substitutions(substitutions: &[Substitution]) {
    for sub in substitutions {
        println!("  note: {sub}");
    }
}

fn run_consolidate(
    config_path: &Path,
    metric: Option<NavMetric>,
    days: Option<i64>,
    output: Option<&Path>,
) -> Result<(), PesowatchError> {
    let ctx = load_context(config_path)?;
    let metric = metric.unwrap_or(ctx.settings.metric);
    let consolidation = load_consolidation(ctx.data.as_ref(), &ctx.settings, metric)?;
    let table = &consolidation.table;

    println!(
        "Consolidated {} rows x {} columns ({metric})",
        table.len(),
        table.columns().len()
    );
    report_substitutions(&consolidation.substitutions);

    let days = days.unwrap_or(ctx.settings.window_days);
    let Some((start, end)) = trailing_window(table, days) else {
        return Err(PesowatchError::NoData {
            series: "consolidated table".to_string(),
        });
    };
    let normalized = normalize(table, start, end)?;
    let real = real_returns(&normalized)?;

    let fx_column = Column::fx_name(&ctx.settings.fx_display_type);
    let kpis = period_kpis(&normalized, &fx_column)?;
    println!("Period {start} to {end}:");
    println!("  Inflation: {:+.2}%", kpis.inflation_change);
    if let (Some(change), Some(real)) = (kpis.fx_change, kpis.fx_real_result) {
        println!("  {fx_column}: {change:+.2}% ({real:+.2} points vs inflation)");
    }
    if let Some(best) = &kpis.best_fund {
        println!("  Best fund: {} {:+.2}%", best.name, best.change);
        let verdict = match best.verdict() {
            Verdict::Gaining => "gaining",
            Verdict::Losing => "losing",
        };
        println!(
            "  Real result: {:+.2} points, {verdict} purchasing power",
            best.real_result
        );
    }

    if let Some(dir) = output {
        let report = CsvReportAdapter::new(dir.to_path_buf());
        report.write_table("consolidated", table)?;
        report.write_table("normalized", &normalized)?;
        report.write_table("real_returns", &real)?;
        println!("Tables written to {}", dir.display());
    }
    Ok(())
}

fn run_project(
    config_path: &Path,
    fund: &str,
    capital: f64,
    months: i64,
    contribution: Option<f64>,
    rate_override: Option<f64>,
    output: Option<&Path>,
) -> Result<(), PesowatchError> {
    let ctx = load_context(config_path)?;
    let horizon = Horizon::bounded(months, ctx.settings.max_horizon_months)?;
    let consolidation = load_consolidation(ctx.data.as_ref(), &ctx.settings, ctx.settings.metric)?;
    let rate = resolve_rate(&consolidation, fund, &ctx.settings, rate_override)?;

    let rows = match contribution {
        Some(c) => contribution_projection(capital, c, rate, horizon),
        None => simple_projection(capital, rate, horizon),
    };
    if let Some(last) = rows.last() {
        println!(
            "{fund} after {} months: {:.2} (contributed {:.2}, interest {:.2})",
            horizon.months(),
            last.capital,
            last.contributed,
            last.interest
        );
    }

    if let Some(dir) = output {
        CsvReportAdapter::new(dir.to_path_buf()).write_projection("projection", &rows)?;
    }
    Ok(())
}

fn print_ranking(ranking: &[RankedInstrument]) {
    for entry in ranking {
        let marker = if entry.is_podium() { "*" } else { " " };
        println!(
            "{marker}{:>2}. {:<28} {:>6.2}%  {:>16.2}  {:>+14.2} ({:+.2}%)",
            entry.rank,
            entry.name,
            entry.annual_rate,
            entry.final_capital,
            entry.gain,
            entry.return_pct
        );
    }
    if let Some(spread) = ranking_spread(ranking) {
        println!("Best vs worst: {spread:.2}");
    }
}

fn run_compare(
    config_path: &Path,
    capital: f64,
    months: i64,
    with_deposits: bool,
    output: Option<&Path>,
) -> Result<(), PesowatchError> {
    let ctx = load_context(config_path)?;
    let horizon = Horizon::bounded(months, ctx.settings.max_horizon_months)?;
    let with_deposits = with_deposits || ctx.config.get_bool("compare", "include_deposits", false);
    let consolidation = load_consolidation(ctx.data.as_ref(), &ctx.settings, ctx.settings.metric)?;

    let CandidateSet {
        candidates,
        substitutions,
    } = collect_candidates(
        ctx.data.as_ref(),
        &consolidation,
        &ctx.settings,
        with_deposits,
    )?;
    if candidates.is_empty() {
        return Err(PesowatchError::NoData {
            series: "funds".to_string(),
        });
    }

    let ranking = compare_instruments(capital, horizon, &candidates);
    println!("{capital:.2} over {} months:", horizon.months());
    report_substitutions(&substitutions);
    print_ranking(&ranking);

    if let Some(dir) = output {
        CsvReportAdapter::new(dir.to_path_buf()).write_ranking(&ranking)?;
    }
    Ok(())
}

fn run_goal(
    config_path: &Path,
    fund: &str,
    capital: f64,
    target: f64,
    months: i64,
    rate_override: Option<f64>,
    output: Option<&Path>,
) -> Result<(), PesowatchError> {
    let ctx = load_context(config_path)?;
    let horizon = Horizon::bounded(months, ctx.settings.max_horizon_months)?;
    let consolidation = load_consolidation(ctx.data.as_ref(), &ctx.settings, ctx.settings.metric)?;
    let rate = resolve_rate(&consolidation, fund, &ctx.settings, rate_override)?;

    let request = GoalRequest::new(capital, target, rate, horizon)?;
    let outcome = plan_goal(request, &ctx.settings);

    match outcome.plan.status {
        GoalStatus::AlreadyAchieved => {
            println!("Initial capital already reaches {target:.2}; no contribution needed")
        }
        GoalStatus::Infeasible => println!(
            "Goal not realistic: {:.2} per month exceeds {:.2}",
            outcome.plan.payment, ctx.settings.infeasible_contribution
        ),
        GoalStatus::Reachable => println!(
            "Contribute {:.2} per month for {} months",
            outcome.plan.payment,
            horizon.months()
        ),
    }

    let b = outcome.breakdown;
    println!(
        "  initial {:.2} + contributions {:.2} + interest {:.2}",
        b.initial_capital, b.total_contributions, b.interest
    );
    for alt in &outcome.alternatives {
        println!(
            "  {:>3} months: {:.2} per month ({:.2} total)",
            alt.months, alt.payment, alt.total_contributed
        );
    }
    if let Some(saving) = outcome.extension_saving().filter(|s| *s > 0.0) {
        println!("  Extending the horizon saves {saving:.2} per month");
    }

    if let Some(dir) = output {
        CsvReportAdapter::new(dir.to_path_buf()).write_goal(&outcome)?;
    }
    Ok(())
}

fn run_quotes(config_path: &Path) -> Result<(), PesowatchError> {
    let ctx = load_context(config_path)?;
    let board = quote_board(&ctx.data.fetch_fx_quotes()?);
    if board.is_empty() {
        return Err(PesowatchError::NoData {
            series: "FX quotes".to_string(),
        });
    }

    for entry in board {
        let buy = entry
            .buy
            .map(|b| format!("{b:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let spread = entry
            .spread
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {}  buy {:>10}  sell {:>10.2}  spread {:>8}",
            entry.fx_type, entry.date, buy, entry.sell, spread
        );
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), PesowatchError> {
    let ctx = load_context(config_path)?;
    let data = data_settings(&ctx.config)?;
    let settings = &ctx.settings;
    for key in unknown_keys(&ctx.config) {
        log::warn!("unknown config key {key}");
        println!("  warning: unknown key {key}");
    }
    match missing_instruments(ctx.data.as_ref(), &settings.instruments) {
        Ok(missing) => {
            for name in missing {
                println!("  warning: instrument {name} not found in {}", data.path);
            }
        }
        Err(e) => println!("  warning: could not list instruments: {e}"),
    }
    println!(
        "Config OK: data at {}, rates {}..{}% (fallback {}%), metric {}, horizons up to {} months",
        data.path,
        settings.rate_floor,
        settings.rate_ceiling,
        settings.rate_fallback,
        settings.metric,
        settings.max_horizon_months
    );
    Ok(())
}
