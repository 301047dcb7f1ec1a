use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ferric_portfolio::core::{ModelSpec, PortfolioSpec, from_json};
use ferric_portfolio::prelude::*;
use tracing::info;

#[derive(Parser)]
#[command(name = "price-portfolio")]
#[command(about = "Price an equity option portfolio in closed form and by Monte Carlo", long_about = None)]
struct Cli {
    /// Portfolio JSON file (defaults to a demo portfolio on the reference universe)
    #[arg(short, long)]
    portfolio: Option<PathBuf>,
    /// Stock universe JSON file (defaults to the reference universe)
    #[arg(short, long)]
    model: Option<PathBuf>,
    /// Monte Carlo scenarios per maturity group
    #[arg(long, default_value_t = 100_000)]
    paths: usize,
    /// Time steps per scenario
    #[arg(long, default_value_t = 50)]
    steps: usize,
    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Log every Monte Carlo estimate at debug level
    #[arg(long)]
    log_estimates: bool,
}

fn demo_portfolio() -> anyhow::Result<Portfolio> {
    let mut portfolio = Portfolio::new();
    portfolio.add(10.0, VanillaOption::european_call("Acme", 100.0, 1.0));
    portfolio.add(-10.0, VanillaOption::european_put("Acme", 100.0, 1.0));
    portfolio.add(5.0, VanillaOption::european_call("Bigbank", 130.0, 2.0));
    portfolio.add(
        3.0,
        KnockoutOption::builder()
            .stock("Chumhum")
            .call()
            .strike(80.0)
            .maturity(1.0)
            .up_and_out(110.0)
            .build()?,
    );
    portfolio.add(2.0, MargrabeOption::new("Bigbank", "Acme", 2.0));
    Ok(portfolio)
}

fn load_model(path: Option<&PathBuf>) -> anyhow::Result<StockUniverseModel> {
    let Some(path) = path else {
        return Ok(StockUniverseModel::create_test_model());
    };
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("reading model file {}", path.display()))?;
    let spec: ModelSpec = from_json(&payload).context("parsing model JSON")?;
    Ok(spec.into_model()?)
}

fn load_portfolio(path: Option<&PathBuf>) -> anyhow::Result<Portfolio> {
    let Some(path) = path else {
        return demo_portfolio();
    };
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("reading portfolio file {}", path.display()))?;
    let spec: PortfolioSpec = from_json(&payload).context("parsing portfolio JSON")?;
    info!(portfolio_id = %spec.portfolio_id, positions = spec.positions.len(), "loaded portfolio");
    Ok(spec.into_portfolio()?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let model = load_model(cli.model.as_ref())?;
    let mut pricer = MonteCarloPricer::new(cli.paths, cli.steps).with_estimate_logging(cli.log_estimates);
    if let Some(seed) = cli.seed {
        pricer = pricer.with_seed(seed);
    }
    let portfolio = load_portfolio(cli.portfolio.as_ref())?.with_fallback_pricer(pricer.clone());

    info!(
        stocks = model.n_stocks(),
        positions = portfolio.len(),
        paths = pricer.n_scenarios,
        steps = pricer.n_steps,
        "pricing portfolio"
    );

    for (index, position) in portfolio.iter().enumerate() {
        let closed_form = match position.contract.analytic_price(&model) {
            Some(price) => format!("{:>12.4}", price?),
            None => format!("{:>12}", "n/a"),
        };
        println!(
            "{index:>3}  {:>8.2} x {:<60} {closed_form}",
            position.quantity,
            position.contract.to_string()
        );
    }

    let value = portfolio.price(&model)?;
    let grouped = portfolio.estimate_by_monte_carlo(&model, &pricer)?;
    println!();
    println!("position-by-position value: {value:.4}");
    println!(
        "grouped Monte Carlo value:  {:.4} (stderr {:.4}, {} maturity groups)",
        grouped.price,
        grouped.stderr.unwrap_or(0.0),
        grouped.diagnostics.get("num_groups").copied().unwrap_or(0.0)
    );
    Ok(())
}
