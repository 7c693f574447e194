// =============================================================================
// Chart rendering
// =============================================================================
//
// The engines produce plain columns; a `ChartSink` decides what to do with
// them. `JsonSink` writes one JSON object per chart, one per line, which is
// what the binary streams to stdout.
// =============================================================================

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::fundamentals::{Ratio, RatioSeries, StatementTable};
use crate::indicators::{bar_direction, BarDirection, EnrichedHistory};
use crate::market_data::QuoteSnapshot;

/// Destination for rendered charts and tables.
pub trait ChartSink {
    /// A line chart aligned with `timestamps`. NaN values are gaps.
    fn series(&mut self, label: &str, timestamps: &[DateTime<Utc>], values: &[f64]) -> Result<()>;

    /// A bar chart whose bars are coloured by direction.
    fn bars(
        &mut self,
        label: &str,
        timestamps: &[DateTime<Utc>],
        values: &[f64],
        directions: &[BarDirection],
    ) -> Result<()>;

    /// A table with one row per label and one column per period.
    fn table(&mut self, label: &str, periods: &[NaiveDate], rows: &[(String, Vec<Option<f64>>)]) -> Result<()>;

    /// Headline figures shown side by side.
    fn metrics(&mut self, label: &str, values: &[(&str, Option<f64>)]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// JsonSink
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Chart<'a> {
    Series {
        label: &'a str,
        timestamps: &'a [DateTime<Utc>],
        values: Vec<Option<f64>>,
    },
    Bars {
        label: &'a str,
        timestamps: &'a [DateTime<Utc>],
        values: Vec<Option<f64>>,
        directions: &'a [BarDirection],
    },
    Table {
        label: &'a str,
        periods: &'a [NaiveDate],
        rows: &'a [(String, Vec<Option<f64>>)],
    },
    Metrics {
        label: &'a str,
        values: &'a [(&'a str, Option<f64>)],
    },
}

fn finite(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|v| v.is_finite().then_some(*v)).collect()
}

/// Writes every chart as a single JSON line.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, chart: &Chart<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, chart).context("failed to encode chart")?;
        writeln!(self.out).context("failed to write chart")?;
        Ok(())
    }
}

impl<W: Write> ChartSink for JsonSink<W> {
    fn series(&mut self, label: &str, timestamps: &[DateTime<Utc>], values: &[f64]) -> Result<()> {
        self.emit(&Chart::Series {
            label,
            timestamps,
            values: finite(values),
        })
    }

    fn bars(
        &mut self,
        label: &str,
        timestamps: &[DateTime<Utc>],
        values: &[f64],
        directions: &[BarDirection],
    ) -> Result<()> {
        self.emit(&Chart::Bars {
            label,
            timestamps,
            values: finite(values),
            directions,
        })
    }

    fn table(&mut self, label: &str, periods: &[NaiveDate], rows: &[(String, Vec<Option<f64>>)]) -> Result<()> {
        self.emit(&Chart::Table { label, periods, rows })
    }

    fn metrics(&mut self, label: &str, values: &[(&str, Option<f64>)]) -> Result<()> {
        self.emit(&Chart::Metrics { label, values })
    }
}

// ---------------------------------------------------------------------------
// Chart assembly
// ---------------------------------------------------------------------------

/// Close price, every indicator column, and optionally coloured volume.
///
/// Volume is skipped when the history carries none (forex, most indices).
pub fn render_history(sink: &mut dyn ChartSink, enriched: &EnrichedHistory, show_volume: bool) -> Result<()> {
    let history = &enriched.history;
    let timestamps = history.timestamps();
    let symbol = history.symbol();

    sink.series(&format!("{symbol} Close"), &timestamps, &history.closes())?;
    for (name, values) in enriched.indicators.iter() {
        sink.series(&format!("{symbol} {name}"), &timestamps, values)?;
    }
    if show_volume && history.has_volume() {
        sink.bars(
            &format!("{symbol} Volume"),
            &timestamps,
            &history.volumes(),
            &bar_direction(history.bars()),
        )?;
    }
    Ok(())
}

/// One table for all requested ratios over the union of their periods.
pub fn render_ratios(sink: &mut dyn ChartSink, label: &str, ratios: &IndexMap<Ratio, RatioSeries>) -> Result<()> {
    let mut periods: Vec<NaiveDate> = ratios.values().flat_map(RatioSeries::periods).collect();
    periods.sort_unstable();
    periods.dedup();

    let rows: Vec<(String, Vec<Option<f64>>)> = ratios
        .iter()
        .map(|(ratio, series)| {
            let cells = periods.iter().map(|p| series.get(*p)).collect();
            (ratio.label().to_string(), cells)
        })
        .collect();

    sink.table(label, &periods, &rows)
}

/// A statement as a table: one row per line item, one column per period.
pub fn render_statement(sink: &mut dyn ChartSink, symbol: &str, statement: &StatementTable) -> Result<()> {
    let periods = statement.periods();
    let rows: Vec<(String, Vec<Option<f64>>)> = statement
        .items()
        .map(|item| (item.name().to_string(), statement.row(item)))
        .collect();
    sink.table(&format!("{symbol} {}", statement.kind()), &periods, &rows)
}

/// Price, change, change %, day range and volume.
pub fn render_quote(sink: &mut dyn ChartSink, symbol: &str, quote: &QuoteSnapshot) -> Result<()> {
    let label = match &quote.currency {
        Some(ccy) => format!("{symbol} Quote ({ccy})"),
        None => format!("{symbol} Quote"),
    };
    sink.metrics(
        &label,
        &[
            ("Price", Some(quote.current_price)),
            ("Change", Some(quote.change())),
            ("Change %", quote.change_pct()),
            ("High", Some(quote.day_high)),
            ("Low", Some(quote.day_low)),
            ("Volume", quote.volume),
        ],
    )
}
