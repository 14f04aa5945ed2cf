use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use evs_rs::compare::{self, DEFAULT_FROM_YEAR, DEFAULT_SELECTION, MAX_COMPARE};
use evs_rs::format::NumFmt;
use evs_rs::{Config, DataProvider, Dataset, query, stats, storage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "evs",
    version,
    about = "Fetch, cache & summarize global electric-vehicle sales"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
    /// Directory holding the cached dataset.
    #[arg(long, global = true, env = "EVS_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
    /// CSV source URL (defaults to the Our World in Data export).
    #[arg(long, global = true, env = "EVS_SOURCE_URL")]
    url: Option<String>,
    /// Ignore the freshness of the cached copy and fetch again.
    #[arg(long, global = true, default_value_t = false)]
    refresh: bool,
    /// Locale for number formatting (en, de, fr, es, it, pt, nl).
    #[arg(long, global = true, default_value = "en")]
    locale: String,
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Headline numbers and the biggest markets.
    Overview {
        /// How many countries to rank.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Global sales over time with year-over-year growth.
    Trend,
    /// Rank countries by sales.
    Top {
        /// Restrict to a single year (default: all years summed).
        #[arg(long)]
        year: Option<i32>,
        #[arg(short, long, default_value_t = 10)]
        n: usize,
    },
    /// List the countries in the dataset.
    Countries,
    /// Compare up to five countries over a year range.
    Compare {
        /// Countries separated by comma or semicolon (default: China, United States, Germany).
        #[arg(short, long)]
        countries: Option<String>,
        /// First year (default: 2015, clamped to the data).
        #[arg(long)]
        from: Option<i32>,
        /// Last year (default: latest year in the data).
        #[arg(long)]
        to: Option<i32>,
    },
    /// Browse the raw data or download it.
    Explore {
        #[arg(value_enum)]
        view: View,
        /// Country for the `country` view (default: first in the list).
        #[arg(long)]
        country: Option<String>,
        /// Write the full dataset here (`download` view).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output format (csv or json). If omitted, inferred from --out extension.
        #[arg(long, value_enum)]
        format: Option<OutFormat>,
    },
    /// Fetch the dataset now, replacing the cached copy.
    Refresh,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum View {
    Global,
    Country,
    Download,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut cfg = Config::default();
    if let Some(dir) = &cli.cache_dir {
        cfg = cfg.with_cache_dir(dir);
    }
    if let Some(url) = &cli.url {
        cfg = cfg.with_source_url(url);
    }

    let mut provider = DataProvider::from_config(&cfg)?;
    if cli.refresh || matches!(cli.cmd, Command::Refresh) {
        provider.invalidate();
    }
    let acquired = provider
        .acquire()
        .context("could not load the electric-vehicle sales dataset")?;
    let ds = &acquired.dataset;
    let nf = NumFmt::new(&cli.locale);

    match cli.cmd {
        Command::Overview { top } => cmd_overview(ds, &nf, top),
        Command::Trend => cmd_trend(ds, &nf),
        Command::Top { year, n } => cmd_top(ds, &nf, year, n),
        Command::Countries => {
            for c in query::entity_list(ds) {
                println!("{c}");
            }
            Ok(())
        }
        Command::Compare {
            countries,
            from,
            to,
        } => cmd_compare(ds, &nf, countries.as_deref(), from, to),
        Command::Explore {
            view,
            country,
            out,
            format,
        } => match view {
            View::Global => cmd_explore_global(ds, &nf),
            View::Country => cmd_explore_country(ds, &nf, country),
            View::Download => cmd_download(ds, &nf, out, format),
        },
        Command::Refresh => {
            println!(
                "Loaded {} rows from {}",
                nf.count(ds.len() as u64),
                acquired.origin
            );
            let cache = provider.cache();
            if let Some(at) = cache.modified_local()? {
                println!(
                    "Cache: {} (written {})",
                    cache.path().display(),
                    at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
    }
}

/// Print rows as an aligned table; the first column is left-aligned, the rest right-aligned.
fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let render = |cells: Vec<&str>| {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == 0 {
                    format!("{:<w$}", c, w = widths[i])
                } else {
                    format!("{:>w$}", c, w = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", render(headers.to_vec()));
    for row in rows {
        println!("{}", render(row.iter().map(String::as_str).collect()));
    }
}

fn cmd_overview(ds: &Dataset, nf: &NumFmt, top: usize) -> Result<()> {
    let summary = stats::summary_stats(ds);
    let world = query::global_trend(ds);

    println!("Total sales:          {}", nf.count(summary.total_sales));
    if let Some(latest) = stats::latest_change(&world) {
        let prev_year = world.len().checked_sub(2).map(|i| world[i].year);
        let delta = match (latest.growth_pct, prev_year) {
            (Some(g), Some(py)) => format!(" ({} vs {py})", nf.signed_pct(g, 1)),
            _ => String::new(),
        };
        println!(
            "Sales in {}:        {}{}",
            latest.year,
            nf.count(latest.cars_sold),
            delta
        );
    }
    println!("Countries:            {}", summary.countries);
    if let Some((lo, hi)) = summary.year_range {
        println!("Period:               {lo}-{hi}");
    }
    println!(
        "Avg. annual growth:   {}",
        nf.pct(summary.avg_annual_growth, 1)
    );

    let ranking = query::top_entities(ds, None, top);
    if ranking.is_empty() {
        return Ok(());
    }
    println!();
    println!("Top {} markets (all years)", ranking.len());
    print_ranking(&ranking, nf);
    if let (Some((leader, _)), Some(share)) = (ranking.first(), stats::top_share(&ranking)) {
        println!();
        println!(
            "{leader} accounts for {} of the top {}.",
            nf.pct(share, 1),
            ranking.len()
        );
    }
    Ok(())
}

fn print_ranking(ranking: &[(String, u64)], nf: &NumFmt) {
    let rows: Vec<Vec<String>> = ranking
        .iter()
        .enumerate()
        .map(|(i, (e, v))| vec![format!("{:>2}. {e}", i + 1), nf.count(*v)])
        .collect();
    print_table(&["Country", "Sales"], &rows);
}

fn cmd_trend(ds: &Dataset, nf: &NumFmt) -> Result<()> {
    let world = query::global_trend(ds);
    let (Some(first), Some(last)) = (world.first(), world.last()) else {
        bail!("dataset has no World series");
    };

    if let Some(g) = stats::total_growth(&world) {
        println!(
            "Total growth: {} ({}) -> {} ({}) = {}",
            nf.count(first.cars_sold),
            first.year,
            nf.count(last.cars_sold),
            last.year,
            nf.signed_pct(g, 0)
        );
        println!();
    }

    let rows: Vec<Vec<String>> = stats::growth_table(&world)
        .into_iter()
        .map(|r| {
            vec![
                r.year.to_string(),
                nf.count(r.cars_sold),
                r.change.map(|c| nf.signed(c)).unwrap_or_else(|| "NA".into()),
                nf.opt_pct(r.growth_pct, 1),
            ]
        })
        .collect();
    print_table(&["Year", "Sales", "vs previous", "Growth"], &rows);

    if let Some((year, g)) = stats::peak_growth(&world) {
        println!();
        println!("Peak growth: {year} with {}", nf.signed_pct(g, 1));
    }

    println!();
    println!("Sales by period");
    let periods = stats::period_totals(&world, &stats::default_periods(last.year));
    let rows: Vec<Vec<String>> = periods
        .iter()
        .map(|(p, v)| vec![p.label.clone(), nf.count(*v)])
        .collect();
    print_table(&["Period", "Sales"], &rows);
    if let [.., (_, prev), (_, recent)] = periods.as_slice()
        && let Some(g) = stats::pct_change(*prev, *recent)
    {
        println!(
            "{} had {} sales compared to {}.",
            periods[2].0.label,
            nf.signed_pct(g, 0),
            periods[1].0.label
        );
    }
    Ok(())
}

fn cmd_top(ds: &Dataset, nf: &NumFmt, year: Option<i32>, n: usize) -> Result<()> {
    let ranking = query::top_entities(ds, year, n);
    if ranking.is_empty() {
        match year {
            Some(y) => println!("No country data for {y}."),
            None => println!("No country data."),
        }
        return Ok(());
    }
    match year {
        Some(y) => println!("Top {} markets in {y}", ranking.len()),
        None => println!("Top {} markets (all years)", ranking.len()),
    }
    print_ranking(&ranking, nf);
    Ok(())
}

fn cmd_compare(
    ds: &Dataset,
    nf: &NumFmt,
    countries: Option<&str>,
    from: Option<i32>,
    to: Option<i32>,
) -> Result<()> {
    let selection: Vec<String> = match countries {
        Some(s) => parse_list(s),
        None => DEFAULT_SELECTION.iter().map(|s| s.to_string()).collect(),
    };
    if selection.is_empty() {
        println!("No countries selected; pass --countries A,B,C (up to {MAX_COMPARE}).");
        return Ok(());
    }
    let known = query::entity_list(ds);
    for c in &selection {
        if !known.contains(c) {
            log::warn!("'{c}' is not a country in the dataset");
        }
    }

    let (lo, hi) = query::year_bounds(ds).context("dataset is empty")?;
    let from = from.unwrap_or(DEFAULT_FROM_YEAR.clamp(lo, hi));
    let to = to.unwrap_or(hi);
    if from > to {
        bail!("--from ({from}) must not be after --to ({to})");
    }

    let cmp = compare::compare(ds, selection.as_slice(), from, to)?;
    println!("{} ({from}-{to})", cmp.entities.join(", "));
    if cmp.is_empty() {
        println!("No data for the selected countries in this range.");
        return Ok(());
    }
    println!();

    let mut headers: Vec<&str> = vec!["Year"];
    headers.extend(cmp.entities.iter().map(String::as_str));
    headers.push("Total");
    let rows: Vec<Vec<String>> = cmp
        .pivot
        .iter()
        .map(|r| {
            let mut row = vec![r.year.to_string()];
            row.extend(
                r.values
                    .iter()
                    .map(|v| v.map(|x| nf.count(x)).unwrap_or_else(|| "-".into())),
            );
            row.push(nf.count(r.total));
            row
        })
        .collect();
    print_table(&headers, &rows);

    println!();
    let rows: Vec<Vec<String>> = cmp
        .insights
        .iter()
        .map(|i| vec![i.entity.clone(), nf.count(i.total), nf.opt_pct(i.growth_pct, 0)])
        .collect();
    print_table(&["Country", "Total", "Growth"], &rows);

    println!();
    println!("Market share");
    let rows: Vec<Vec<String>> = cmp
        .market_share
        .iter()
        .map(|s| vec![s.entity.clone(), nf.count(s.cars_sold), nf.pct(s.pct, 1)])
        .collect();
    print_table(&["Country", "Sales", "Share"], &rows);
    Ok(())
}

fn cmd_explore_global(ds: &Dataset, nf: &NumFmt) -> Result<()> {
    println!("World sales by year");
    let rows: Vec<Vec<String>> = stats::growth_table(&query::global_trend(ds))
        .into_iter()
        .map(|r| {
            vec![
                r.year.to_string(),
                nf.count(r.cars_sold),
                nf.opt_pct(r.growth_pct, 1),
            ]
        })
        .collect();
    print_table(&["Year", "Sales", "Growth"], &rows);
    Ok(())
}

fn cmd_explore_country(ds: &Dataset, nf: &NumFmt, country: Option<String>) -> Result<()> {
    let country = match country {
        Some(c) => c,
        None => query::entity_list(ds)
            .into_iter()
            .next()
            .context("dataset has no countries")?,
    };
    let Some(detail) = stats::entity_detail(ds, &country) else {
        bail!("no data for '{country}' (see `evs countries`)");
    };

    println!("{}", detail.entity);
    println!("Total:          {}", nf.count(detail.total));
    println!("Annual mean:    {}", nf.approx(detail.mean_annual));
    println!("Years of data:  {}", detail.years);
    println!();

    let rows: Vec<Vec<String>> = stats::growth_table(&query::entity_series(ds, &country))
        .into_iter()
        .map(|r| {
            vec![
                r.year.to_string(),
                nf.count(r.cars_sold),
                r.change.map(|c| nf.signed(c)).unwrap_or_else(|| "NA".into()),
                nf.opt_pct(r.growth_pct, 1),
            ]
        })
        .collect();
    print_table(&["Year", "Sales", "vs previous", "Growth"], &rows);
    Ok(())
}

fn cmd_download(
    ds: &Dataset,
    nf: &NumFmt,
    out: Option<PathBuf>,
    format: Option<OutFormat>,
) -> Result<()> {
    let Some(path) = out else {
        let info = stats::dataset_info(ds);
        println!("Rows:         {}", nf.count(info.rows as u64));
        println!("Entities:     {}", info.entities);
        if let Some((lo, hi)) = info.year_range {
            println!("Period:       {lo}-{hi}");
        }
        println!("Total sales:  {}", nf.count(info.total_sales));
        println!();
        let rows: Vec<Vec<String>> = ds
            .iter()
            .take(20)
            .map(|r| vec![r.entity.clone(), r.year.to_string(), nf.count(r.cars_sold)])
            .collect();
        print_table(&["Entity", "Year", "Electric cars sold"], &rows);
        println!();
        println!("Showing the first {} rows; pass --out to save all.", rows.len());
        return Ok(());
    };

    let fmt = match format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(ds.records(), &path)?,
        "json" => storage::save_json(ds.records(), &path)?,
        other => bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", ds.len(), path.display());
    Ok(())
}
