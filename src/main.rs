// =============================================================================
// Market Lens: Main Entry Point
// =============================================================================
//
// Loads the dashboard config, fetches every security through the cache,
// computes indicators per security on the blocking pool and streams the
// resulting charts to stdout as JSON lines.
// =============================================================================

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use market_lens::fundamentals::{compute_ratios, StatementSet, DEFAULT_MIN_PRESENT};
use market_lens::indicators::{compare_securities, compute_indicators, EnrichedHistory};
use market_lens::market_data::{CachedSource, FixtureSource, QuoteSnapshot};
use market_lens::report::{
    render_history, render_quote, render_ratios, render_statement, ChartSink, JsonSink,
};
use market_lens::runtime_config::DashboardConfig;
use market_lens::types::{PeriodType, StatementKind};

type Source = CachedSource<FixtureSource>;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("DASH_CONFIG").unwrap_or_else(|_| "dashboard_config.json".to_string());
    let mut config = DashboardConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });

    // Override symbols from env if available.
    if let Ok(syms) = std::env::var("DASH_SYMBOLS") {
        config.override_symbols(&syms);
    }

    config.validate().context("invalid dashboard config")?;
    let symbols = config.symbol_list()?;
    if symbols.is_empty() {
        bail!("no symbols configured");
    }
    let specs = config.indicator_specs()?;
    let ratios = config.ratio_list()?;

    info!(
        symbols = ?symbols,
        period = %config.period,
        interval = %config.interval,
        indicators = specs.len(),
        "Dashboard starting"
    );

    // ── 2. Data source ───────────────────────────────────────────────────
    let source = Arc::new(CachedSource::new(FixtureSource::new(&config.data_dir)));

    // ── 3. Per-security work on the blocking pool ────────────────────────
    let handles: Vec<_> = symbols
        .iter()
        .map(|symbol| {
            let source = Arc::clone(&source);
            let symbol = symbol.clone();
            let specs = specs.clone();
            let (period, interval) = (config.period, config.interval);
            tokio::task::spawn_blocking(move || -> Result<EnrichedHistory> {
                let history = source.price_history(&symbol, period, interval)?;
                Ok(compute_indicators(&history, &specs)?)
            })
        })
        .collect();

    let fundamentals = {
        let source = Arc::clone(&source);
        let symbol = symbols[0].clone();
        let period_type = config.period_type;
        tokio::task::spawn_blocking(move || load_statements(&source, &symbol, period_type))
    };

    // Awaiting in spawn order keeps the output in input order.
    let mut enriched = Vec::with_capacity(handles.len());
    for (symbol, handle) in symbols.iter().zip(handles) {
        match handle.await.context("indicator task panicked")? {
            Ok(e) => enriched.push(e),
            Err(e) => warn!(symbol = %symbol, error = %e, "Skipping security"),
        }
    }
    if enriched.is_empty() {
        bail!("no price data for any of {symbols:?}");
    }

    let (statements, quote) = fundamentals.await.context("statement task panicked")?;

    // ── 4. Render ────────────────────────────────────────────────────────
    let mut sink = JsonSink::new(std::io::stdout().lock());

    if let [single] = enriched.as_slice() {
        render_history(&mut sink, single, config.show_volume)?;
    } else {
        let histories: Vec<_> = enriched.iter().map(|e| e.history.clone()).collect();
        for (history, (symbol, change)) in histories.iter().zip(compare_securities(&histories)) {
            sink.series(&format!("{symbol} Pct_change"), &history.timestamps(), &change)?;
        }
    }

    if let Some(quote) = &quote {
        render_quote(&mut sink, &symbols[0], quote)?;
    }
    for statement in [&statements.balance, &statements.income, &statements.cashflow]
        .into_iter()
        .flatten()
    {
        render_statement(&mut sink, &symbols[0], statement)?;
    }

    let table = compute_ratios(&statements, &ratios);
    render_ratios(
        &mut sink,
        &format!("{} {} ratios", symbols[0], config.period_type),
        &table,
    )?;

    info!(
        securities = enriched.len(),
        ratios = table.len(),
        cached = source.len(),
        "Dashboard rendered"
    );
    Ok(())
}

/// Statements and the quote for the fundamentals view. Anything missing is
/// logged and left empty; the ratio engine reports the resulting gaps.
fn load_statements(
    source: &Source,
    symbol: &str,
    period_type: PeriodType,
) -> (StatementSet, Option<Arc<QuoteSnapshot>>) {
    let fetch = |kind: StatementKind| match source.statement(symbol, kind, period_type) {
        Ok(table) => Some(table.drop_sparse_items(DEFAULT_MIN_PRESENT)),
        Err(e) => {
            warn!(symbol, %kind, error = %e, "Statement unavailable");
            None
        }
    };

    let quote = match source.quote(symbol) {
        Ok(quote) => {
            info!(
                symbol,
                price = quote.current_price,
                change_pct = ?quote.change_pct(),
                "Quote loaded"
            );
            Some(quote)
        }
        Err(e) => {
            warn!(symbol, error = %e, "Quote unavailable");
            None
        }
    };

    let statements = StatementSet {
        balance: fetch(StatementKind::Balance),
        income: fetch(StatementKind::Income),
        cashflow: fetch(StatementKind::Cashflow),
        market_price: quote.as_ref().map(|q| q.current_price),
    };
    (statements, quote)
}
