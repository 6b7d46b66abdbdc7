//! Plain-text rendering of a dashboard report.
//!
//! Figures are rounded to two decimals here and nowhere else; the report
//! itself carries unrounded values.

use std::fmt;

use volboard_core::engine::{HorizonReport, Signal};
use volboard_runner::DashboardReport;

use crate::labels::{
    average_label, horizon_label, label, sigma_label, signal_label, HorizonLabel, Label, Locale,
};

const RULE: &str = "_________________________";

fn fmt2(locale: Locale, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => label(locale, Label::NotAvailable).to_string(),
    }
}

pub fn render_report(report: &DashboardReport, locale: Locale) -> String {
    ReportText { report, locale }.to_string()
}

struct ReportText<'a> {
    report: &'a DashboardReport,
    locale: Locale,
}

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self.report, self.locale)
    }
}

fn write_report(
    out: &mut fmt::Formatter<'_>,
    report: &DashboardReport,
    locale: Locale,
) -> fmt::Result {
    writeln!(out, "{} · {}", label(locale, Label::Title), report.symbol)?;
    if report.source == "synthetic" {
        writeln!(out, "({})", label(locale, Label::SyntheticData))?;
    }
    match &report.quote {
        Some(q) => {
            writeln!(out, "{}: {:.2}", label(locale, Label::Price), q.price)?;
            writeln!(
                out,
                "{}: {}",
                label(locale, Label::LastUpdate),
                q.as_of.format("%Y-%m-%d %H:%M")
            )?;
        }
        None => writeln!(
            out,
            "{}: {}",
            label(locale, Label::Price),
            label(locale, Label::QuoteUnavailable)
        )?,
    }

    for horizon in report.horizons() {
        writeln!(out)?;
        write_horizon(out, horizon, locale)?;
    }
    Ok(())
}

fn write_horizon(out: &mut fmt::Formatter<'_>, h: &HorizonReport, locale: Locale) -> fmt::Result {
    let text = |which| horizon_label(locale, which, h.horizon);
    writeln!(out, "== {} ==", text(HorizonLabel::Tab))?;

    match h.current {
        Some(c) => {
            writeln!(out, "{}: {:.2}", text(HorizonLabel::Range), c.range)?;
            writeln!(
                out,
                "{}: {:.2}   {}: {:.2}",
                text(HorizonLabel::High),
                c.high,
                text(HorizonLabel::Low),
                c.low
            )?;
        }
        None => writeln!(
            out,
            "{}: {}",
            text(HorizonLabel::Range),
            label(locale, Label::NotAvailable)
        )?,
    }
    writeln!(out, "{RULE}")?;

    match &h.bands {
        Some(bands) => {
            for band in bands {
                writeln!(
                    out,
                    "{}: {:.2} - {:.2}",
                    sigma_label(locale, band.k),
                    band.lower,
                    band.upper
                )?;
            }
        }
        None => {
            for k in volboard_core::engine::K_LEVELS {
                writeln!(
                    out,
                    "{}: {}",
                    sigma_label(locale, k),
                    label(locale, Label::NotAvailable)
                )?;
            }
        }
    }
    writeln!(
        out,
        "{}: {}",
        text(HorizonLabel::PreviousVolatility),
        fmt2(locale, h.last_volatility)
    )?;
    writeln!(out, "{}: {}", average_label(locale, h.period), fmt2(locale, h.mean))?;
    writeln!(
        out,
        "{}: {}",
        label(locale, Label::StdOfVolatility),
        fmt2(locale, h.stddev)
    )?;
    if let Some(as_of) = h.as_of {
        writeln!(
            out,
            "{}: {}",
            text(HorizonLabel::PreviousPeriod),
            h.granularity.format_timestamp(as_of)
        )?;
    }
    writeln!(out, "{RULE}")?;

    let verdict = match h.signal {
        Signal::Sell => Label::AboveAverage,
        Signal::Buy => Label::BelowAverage,
        Signal::Neutral => Label::WithinTolerance,
    };
    writeln!(out, "{}", signal_label(locale, h.signal))?;
    if h.mean.is_some() {
        writeln!(
            out,
            "{}: {} {}: {}",
            text(HorizonLabel::PreviousVolatility),
            fmt2(locale, h.last_volatility),
            label(locale, verdict),
            fmt2(locale, h.mean)
        )?;
    }
    Ok(())
}
