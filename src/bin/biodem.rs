use anyhow::{bail, Context, Result};
use biodem_rs::api::{Client, ErrorStore, QueryCategory};
use biodem_rs::models::YearRange;
use biodem_rs::stats::{aggregate, grouped_summary, AggregateSpec, DimSpec, Statistic};
use biodem_rs::viz::bubble::{self, BubbleChartConfig};
use biodem_rs::viz::color::{ColorMode, STEELBLUE};
use biodem_rs::viz::dual::{self, DualChartConfig};
use biodem_rs::viz::export::export_svg;
use biodem_rs::viz::Mount;
use biodem_rs::storage;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "biodem",
    version,
    about = "Fetch, aggregate & chart biodiversity records against political indicators"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch per-year GBIF record counts for a country and save them as CSV.
    Fetch(FetchArgs),
    /// Render the dual chart: record-count bars + indicator line for one country.
    Dual(DualArgs),
    /// Render the aggregated bubble chart across countries.
    Bubble(BubbleArgs),
    /// Print per-country summary statistics for one indicator.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// ISO2 country code (e.g., SE)
    #[arg(short, long)]
    country: String,
    /// Maximum number of year facets to request.
    #[arg(long, default_value_t = 300)]
    facet_limit: u32,
    /// Output CSV path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct DualArgs {
    /// CSV of per-year record counts (year,records), as written by `fetch`.
    #[arg(long)]
    counts: PathBuf,
    /// Indicator CSV with country and year columns.
    #[arg(long)]
    vdem: PathBuf,
    /// Country code as used in the indicator CSV (e.g., SWE).
    #[arg(short, long)]
    country: String,
    /// Indicator column drawn as the secondary line.
    #[arg(short, long)]
    variable: String,
    /// First year of the window.
    #[arg(long, default_value_t = 1960)]
    from: i32,
    /// Last year of the window.
    #[arg(long, default_value_t = 2018)]
    to: i32,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 400)]
    height: u32,
    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(ValueEnum, Clone, Debug)]
enum ColorBy {
    /// Sequential viridis over regime codes 0-3.
    Regime,
    /// Categorical palette keyed by region code.
    Region,
}

#[derive(Args, Debug)]
struct BubbleArgs {
    /// Indicator CSV with country and year columns.
    #[arg(long)]
    vdem: PathBuf,
    /// Indicator for the x axis (per-country median).
    #[arg(long)]
    x_dim: String,
    /// Indicator for the y axis (per-country median).
    #[arg(long)]
    y_dim: String,
    /// Indicator encoded as bubble area (per-country sum).
    #[arg(long)]
    size_dim: String,
    /// Color encoding.
    #[arg(long, value_enum, default_value_t = ColorBy::Regime)]
    color_by: ColorBy,
    /// Indicator supplying the color code; defaults per --color-by.
    #[arg(long)]
    code_dim: Option<String>,
    #[arg(long, default_value_t = 1960)]
    from: i32,
    #[arg(long, default_value_t = 2018)]
    to: i32,
    /// Region code filter (0 = no filter), matched against e_regiongeo.
    #[arg(long, default_value_t = 0)]
    region: u32,
    #[arg(long, default_value_t = false)]
    x_log: bool,
    #[arg(long, default_value_t = false)]
    y_log: bool,
    /// Country key drawn with a selection stroke.
    #[arg(long)]
    selected: Option<String>,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Indicator CSV with country and year columns.
    #[arg(long)]
    vdem: PathBuf,
    /// Indicator column to summarize.
    #[arg(short, long)]
    dim: String,
    #[arg(long)]
    from: Option<i32>,
    #[arg(long)]
    to: Option<i32>,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Fetch(args) => cmd_fetch(args),
        Command::Dual(args) => cmd_dual(args),
        Command::Bubble(args) => cmd_bubble(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn cmd_fetch(args: FetchArgs) -> Result<()> {
    let client = Client::default();
    let mut errors = ErrorStore::new();
    let counts = errors.capture(
        QueryCategory::YearFacets,
        client.fetch_year_counts(&args.country, args.facet_limit),
    );
    let counts = match counts {
        Some(c) => c,
        None => {
            let notice = errors
                .get(QueryCategory::YearFacets)
                .map(|e| e.message.clone())
                .unwrap_or_default();
            bail!("year-facet query failed: {}", notice);
        }
    };
    storage::save_counts_csv(&counts, &args.out)?;
    eprintln!("Saved {} year counts to {}", counts.len(), args.out.display());
    Ok(())
}

/// One joined row per year: bar magnitude plus optional line value.
struct DualRow {
    year: i32,
    records: u64,
    indicator: Option<f64>,
}

fn cmd_dual(args: DualArgs) -> Result<()> {
    let counts = storage::load_counts_csv(&args.counts)?;
    let records = storage::load_indicators_csv(&args.vdem)?;
    let window = YearRange::new(args.from, args.to);

    let by_year: BTreeMap<i32, u64> = counts
        .iter()
        .filter(|c| window.contains(c.year))
        .map(|c| (c.year, c.records))
        .collect();
    let mut indicator_by_year: BTreeMap<i32, Option<f64>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.country == args.country) {
        if window.contains(r.year) {
            indicator_by_year.insert(r.year, r.value(&args.variable));
        }
    }

    let mut years: Vec<i32> = by_year
        .keys()
        .chain(indicator_by_year.keys())
        .copied()
        .collect();
    years.sort_unstable();
    years.dedup();
    if years.is_empty() {
        bail!("no rows for {} in {}..{}", args.country, args.from, args.to);
    }
    let rows: Vec<DualRow> = years
        .into_iter()
        .map(|year| DualRow {
            year,
            records: by_year.get(&year).copied().unwrap_or(0),
            indicator: indicator_by_year.get(&year).copied().flatten(),
        })
        .collect();

    let x = |r: &DualRow| r.year as f64;
    let y = |r: &DualRow| r.records as f64;
    let y2 = |r: &DualRow| r.indicator;
    let color = |_: &DualRow| STEELBLUE;

    let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    cfg.width = Some(args.width);
    cfg.height = args.height;
    cfg.x_min = Some(args.from as f64);
    cfg.x_max = Some(args.to as f64);
    cfg.y_min = Some(1.0);
    cfg.y_label = "#Records".into();
    cfg.y2_label = args.variable.clone();
    cfg.title = args.country.clone();

    let mut mount = Mount::new(args.width);
    dual::render(&mut mount, &cfg)?;
    write_export(&mount, &args.out)
}

fn cmd_bubble(args: BubbleArgs) -> Result<()> {
    let records = storage::load_indicators_csv(&args.vdem)?;
    let code_dim = args.code_dim.clone().unwrap_or_else(|| {
        match args.color_by {
            ColorBy::Regime => "v2x_regime",
            ColorBy::Region => "e_regiongeo",
        }
        .to_string()
    });

    let spec = AggregateSpec {
        dims: vec![
            DimSpec::new(args.x_dim.as_str(), Statistic::Median),
            DimSpec::new(args.y_dim.as_str(), Statistic::Median),
            DimSpec::new(args.size_dim.as_str(), Statistic::Sum),
            DimSpec::new(code_dim.as_str(), Statistic::Median),
        ],
        years: Some(YearRange::new(args.from, args.to)),
        region_dim: Some("e_regiongeo".into()),
        region: args.region,
        positive_magnitude_dim: Some(args.size_dim.clone()),
    };
    let grouped = aggregate(&records, &spec);
    if grouped.is_empty() {
        bail!("no valid country groups after aggregation");
    }
    // Deterministic draw order for reproducible output.
    let mut groups: Vec<_> = grouped.into_values().collect();
    groups.sort_by(|a, b| a.country.cmp(&b.country));

    let x_dim = args.x_dim.clone();
    let y_dim = args.y_dim.clone();
    let size_dim = args.size_dim.clone();
    let x = move |g: &biodem_rs::stats::AggregatedGroup| g.stat(&x_dim).unwrap_or(0.0);
    let y = move |g: &biodem_rs::stats::AggregatedGroup| g.stat(&y_dim).unwrap_or(0.0);
    let radius = move |g: &biodem_rs::stats::AggregatedGroup| g.stat(&size_dim).unwrap_or(0.0);
    let code_dim_for_access = code_dim.clone();
    let code =
        move |g: &biodem_rs::stats::AggregatedGroup| g.stat(&code_dim_for_access).unwrap_or(f64::NAN);

    let mut cfg = BubbleChartConfig::new(&groups, &x, &y, &radius, &code);
    cfg.width = Some(args.width);
    cfg.height = args.height;
    cfg.x_log = args.x_log;
    cfg.y_log = args.y_log;
    cfg.color_mode = match args.color_by {
        ColorBy::Regime => ColorMode::regime(),
        ColorBy::Region => ColorMode::region(),
    };
    cfg.selected = args.selected.clone();
    cfg.x_label = args.x_dim.clone();
    cfg.y_label = args.y_dim.clone();
    cfg.title = format!("{}-{}", args.from, args.to);

    let mut mount = Mount::new(args.width);
    bubble::render(&mut mount, &cfg)?;
    write_export(&mount, &args.out)
}

fn cmd_stats(args: StatsArgs) -> Result<()> {
    let records = storage::load_indicators_csv(&args.vdem)?;
    let years = match (args.from, args.to) {
        (Some(a), Some(b)) => Some(YearRange::new(a, b)),
        (Some(a), None) => Some(YearRange::new(a, i32::MAX)),
        (None, Some(b)) => Some(YearRange::new(i32::MIN, b)),
        (None, None) => None,
    };
    let summaries = grouped_summary(&records, &args.dim, years);
    if summaries.is_empty() {
        bail!("no data for dimension '{}'", args.dim);
    }
    for s in summaries {
        println!(
            "{} • {}  count={} missing={}  min={} max={} mean={} median={}",
            s.country,
            args.dim,
            s.count,
            s.missing,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}

fn write_export(mount: &Mount, out: &PathBuf) -> Result<()> {
    let stem = out
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("chart");
    let export = export_svg(mount, stem).context("nothing rendered to export")?;
    export.write_to(out)?;
    eprintln!("Wrote chart to {}", out.display());
    Ok(())
}
