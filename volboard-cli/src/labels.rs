//! Display strings for the three dashboard locales.
//!
//! A pure lookup table keyed by [`Label`]. Labels whose wording depends on the
//! horizon (tab titles, range captions, "previous period") go through
//! [`horizon_label`], which formats the x-day window into the string.

use clap::ValueEnum;
use volboard_core::engine::{Horizon, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    /// Traditional Chinese.
    ZhHant,
    /// Simplified Chinese.
    ZhHans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Title,
    Price,
    LastUpdate,
    StdDeviation,
    StdOfVolatility,
    Sell,
    Buy,
    Neutral,
    AboveAverage,
    BelowAverage,
    WithinTolerance,
    NotAvailable,
    DownloadCsv,
    SyntheticData,
    QuoteUnavailable,
}

/// Captions that change with the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizonLabel {
    Tab,
    Range,
    High,
    Low,
    PreviousVolatility,
    PreviousPeriod,
}

pub fn label(locale: Locale, label: Label) -> &'static str {
    use Label::*;
    use Locale::*;
    match (label, locale) {
        (Title, En) => "Volatility Dashboard",
        (Title, ZhHant) => "波幅儀表板",
        (Title, ZhHans) => "波幅仪表板",

        (Price, En) => "Price",
        (Price, ZhHant) => "價格",
        (Price, ZhHans) => "价格",

        (LastUpdate, En) => "Last update",
        (LastUpdate, ZhHant) => "上次更新時間",
        (LastUpdate, ZhHans) => "上次更新时间",

        (StdDeviation, En) => " Std Deviation",
        (StdDeviation, ZhHant) => "個標準差",
        (StdDeviation, ZhHans) => "个标准差",

        (StdOfVolatility, En) => "Std Deviation of volatility",
        (StdOfVolatility, ZhHant) => "波幅的標準差",
        (StdOfVolatility, ZhHans) => "波幅的标准差",

        (Sell, En) => "Sell",
        (Sell, ZhHant) => "賣出",
        (Sell, ZhHans) => "卖出",

        (Buy, En) => "Buy",
        (Buy, ZhHant) => "買進",
        (Buy, ZhHans) => "买进",

        (Neutral, En) => "Neutral",
        (Neutral, ZhHant) => "中性",
        (Neutral, ZhHans) => "中性",

        (AboveAverage, En) => "above average volatility",
        (AboveAverage, ZhHant) => "高於平均波幅",
        (AboveAverage, ZhHans) => "高于平均波幅",

        (BelowAverage, En) => "below average volatility",
        (BelowAverage, ZhHant) => "低於平均波幅",
        (BelowAverage, ZhHans) => "低于平均波幅",

        (WithinTolerance, En) => "within tolerance of average volatility",
        (WithinTolerance, ZhHant) => "接近平均波幅",
        (WithinTolerance, ZhHans) => "接近平均波幅",

        (NotAvailable, En) => "n/a",
        (NotAvailable, ZhHant) => "暫無",
        (NotAvailable, ZhHans) => "暂无",

        (DownloadCsv, En) => "Download data as CSV",
        (DownloadCsv, ZhHant) => "下載數據為CSV",
        (DownloadCsv, ZhHans) => "下载数据为CSV",

        (SyntheticData, En) => "synthetic data, not market prices",
        (SyntheticData, ZhHant) => "模擬數據，非市場價格",
        (SyntheticData, ZhHans) => "模拟数据，非市场价格",

        (QuoteUnavailable, En) => "quote unavailable",
        (QuoteUnavailable, ZhHant) => "暫無報價",
        (QuoteUnavailable, ZhHans) => "暂无报价",
    }
}

pub fn signal_label(locale: Locale, signal: Signal) -> &'static str {
    match signal {
        Signal::Sell => label(locale, Label::Sell),
        Signal::Buy => label(locale, Label::Buy),
        Signal::Neutral => label(locale, Label::Neutral),
    }
}

/// `k`-sigma band caption, e.g. "2 Std Deviation" or "2個標準差".
pub fn sigma_label(locale: Locale, k: u8) -> String {
    format!("{k}{}", label(locale, Label::StdDeviation))
}

/// Average caption carrying the rolling period, e.g. "Average 50 volatility".
pub fn average_label(locale: Locale, period: usize) -> String {
    match locale {
        Locale::En => format!("Average {period} volatility"),
        Locale::ZhHant | Locale::ZhHans => format!("平均{period}波幅"),
    }
}

pub fn horizon_label(locale: Locale, which: HorizonLabel, horizon: Horizon) -> String {
    use HorizonLabel::*;
    match horizon {
        Horizon::Daily => daily_label(locale, which).to_string(),
        Horizon::Weekly => weekly_label(locale, which).to_string(),
        Horizon::MultiDay { window } => {
            let suffix = match (which, locale) {
                (Tab, Locale::En) => "-Day Volatility",
                (Tab, _) => "天波幅",
                (Range, Locale::En) => "-Day Diff",
                (Range, Locale::ZhHant) => "天區間",
                (Range, Locale::ZhHans) => "天区间",
                (High, Locale::En) => "-Day high",
                (High, _) => "天高位",
                (Low, Locale::En) => "-Day low",
                (Low, _) => "天低位",
                (PreviousVolatility, Locale::En) => "-Day volatility",
                (PreviousVolatility, _) => "天波幅",
                (PreviousPeriod, Locale::En) => "-Day period ending",
                (PreviousPeriod, _) => "天",
            };
            match (which, locale) {
                (PreviousVolatility | PreviousPeriod, Locale::En) => {
                    format!("Last {window}{suffix}")
                }
                (PreviousVolatility | PreviousPeriod, _) => format!("前{window}{suffix}"),
                _ => format!("{window}{suffix}"),
            }
        }
    }
}

fn daily_label(locale: Locale, which: HorizonLabel) -> &'static str {
    use HorizonLabel::*;
    match (which, locale) {
        (Tab, Locale::En) => "Daily Volatility",
        (Tab, _) => "今日波幅",
        (Range, Locale::En) => "Daily Diff",
        (Range, Locale::ZhHant) => "今日區間",
        (Range, Locale::ZhHans) => "今日区间",
        (High, Locale::En) => "Day high",
        (High, _) => "今日高位",
        (Low, Locale::En) => "Day low",
        (Low, _) => "今日低位",
        (PreviousVolatility, Locale::En) => "Last volatility",
        (PreviousVolatility, _) => "前一天波幅",
        (PreviousPeriod, Locale::En) => "Last volatility date",
        (PreviousPeriod, _) => "前一天",
    }
}

fn weekly_label(locale: Locale, which: HorizonLabel) -> &'static str {
    use HorizonLabel::*;
    match (which, locale) {
        (Tab, Locale::En) => "Weekly Volatility",
        (Tab, Locale::ZhHant) => "週波幅",
        (Tab, Locale::ZhHans) => "周波幅",
        (Range, Locale::En) => "Weekly Diff",
        (Range, Locale::ZhHant) => "週區間",
        (Range, Locale::ZhHans) => "周区间",
        (High, Locale::En) => "Week high",
        (High, Locale::ZhHant) => "本週高位",
        (High, Locale::ZhHans) => "本周高位",
        (Low, Locale::En) => "Week low",
        (Low, Locale::ZhHant) => "本週低位",
        (Low, Locale::ZhHans) => "本周低位",
        (PreviousVolatility, Locale::En) => "Last week volatility",
        (PreviousVolatility, Locale::ZhHant) => "前一週波幅",
        (PreviousVolatility, Locale::ZhHans) => "前一周波幅",
        (PreviousPeriod, Locale::En) => "Last week",
        (PreviousPeriod, Locale::ZhHant) => "前一週",
        (PreviousPeriod, Locale::ZhHans) => "前一周",
    }
}
