//! Trend-based forward projections and the AI-delegating ROI variant.
//!
//! The arithmetic path is the default and the fallback: the endpoint must
//! always produce exactly six forward periods no matter which path ran or
//! how thin the history is.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{app_error::AppResult, application::ports::text_generation::TextGenerationPort};

/// Forward horizon; every response carries exactly this many entries.
pub const PROJECTION_PERIODS: usize = 6;

/// Trailing window used for the growth-rate estimate.
const GROWTH_WINDOW: usize = 6;

/// Share of gapped steps above which a series reads as inconsistent.
const GAP_RATIO_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    None,
    Low,
    Moderate,
    Inconsistent,
    Good,
}

impl DataQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::None => "none",
            DataQuality::Low => "low",
            DataQuality::Moderate => "moderate",
            DataQuality::Inconsistent => "inconsistent",
            DataQuality::Good => "good",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectedPoint {
    pub period_index: u32,
    pub predicted_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMethod {
    TrendBased,
    CohereAi,
    TrendBasedFallback,
}

impl ProjectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionMethod::TrendBased => "trend_based",
            ProjectionMethod::CohereAi => "cohere_ai",
            ProjectionMethod::TrendBasedFallback => "trend_based_fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionOutcome {
    pub predictions: Vec<ProjectedPoint>,
    pub growth_rate_pct: f64,
    pub data_quality: DataQuality,
    pub method: ProjectionMethod,
}

// ============================================================================
// Pure projection arithmetic
// ============================================================================

/// Re-buckets a daily series into calendar-month totals (keyed to the first
/// of the month), sorted ascending.
pub fn bucket_monthly(points: &[HistoryPoint]) -> Vec<HistoryPoint> {
    let mut months: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for p in points {
        let key = NaiveDate::from_ymd_opt(p.date.year(), p.date.month(), 1)
            .expect("first of month is always valid");
        *months.entry(key).or_default() += p.value_cents;
    }
    months
        .into_iter()
        .map(|(date, value_cents)| HistoryPoint { date, value_cents })
        .collect()
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Gap-ratio test over sorted points: steps larger than the granularity's
/// threshold count as gaps; more than 30% gapped steps reads as inconsistent.
fn has_excessive_gaps(points: &[HistoryPoint], granularity: Granularity) -> bool {
    if points.len() < 2 {
        return false;
    }
    let steps = points.len() - 1;
    let gapped = points
        .windows(2)
        .filter(|w| match granularity {
            Granularity::Monthly => month_index(w[1].date) - month_index(w[0].date) > 1,
            Granularity::Daily => (w[1].date - w[0].date).num_days() > 3,
        })
        .count();
    gapped as f64 / steps as f64 > GAP_RATIO_THRESHOLD
}

pub fn classify_quality(points: &[HistoryPoint], granularity: Granularity) -> DataQuality {
    if points.is_empty() {
        return DataQuality::None;
    }
    let (low_below, good_at) = match granularity {
        Granularity::Monthly => (2, 6),
        Granularity::Daily => (7, 30),
    };
    if points.len() < low_below {
        DataQuality::Low
    } else if points.len() < good_at {
        if has_excessive_gaps(points, granularity) {
            DataQuality::Inconsistent
        } else {
            DataQuality::Moderate
        }
    } else {
        DataQuality::Good
    }
}

/// Period-over-window growth across the trailing six (or fewer) periods.
/// Fewer than two points reads as flat.
pub fn growth_rate_pct(points: &[HistoryPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let window_start = points.len().saturating_sub(GROWTH_WINDOW);
    let window = &points[window_start..];
    let first = window.first().map(|p| p.value_cents).unwrap_or(0);
    let last = window.last().map(|p| p.value_cents).unwrap_or(0);
    (last - first) as f64 / first.max(1) as f64 * 100.0
}

/// Compound-growth extrapolation from the per-period average; always exactly
/// six entries, each floored at zero.
pub fn project(points: &[HistoryPoint]) -> Vec<ProjectedPoint> {
    let average = if points.is_empty() {
        0.0
    } else {
        points.iter().map(|p| p.value_cents).sum::<i64>() as f64 / points.len() as f64
    };
    let growth = growth_rate_pct(points);

    (0..PROJECTION_PERIODS as u32)
        .map(|i| {
            let factor = (1.0 + growth / 100.0).powi(i as i32 + 1);
            let predicted = (average * factor).max(0.0).round() as i64;
            ProjectedPoint {
                period_index: i + 1,
                predicted_cents: predicted,
            }
        })
        .collect()
}

pub fn trend_forecast(points: &[HistoryPoint], granularity: Granularity) -> ProjectionOutcome {
    ProjectionOutcome {
        predictions: project(points),
        growth_rate_pct: growth_rate_pct(points),
        data_quality: classify_quality(points, granularity),
        method: ProjectionMethod::TrendBased,
    }
}

// ============================================================================
// AI reply parsing
// ============================================================================

/// Pulls a JSON object out of a free-text reply: a fenced ```json block when
/// present, otherwise the outermost brace pair.
pub fn extract_json_block(reply: &str) -> Option<serde_json::Value> {
    let candidate = if let Some(fence_start) = reply.find("```json") {
        let after = &reply[fence_start + 7..];
        let fence_end = after.find("```")?;
        &after[..fence_end]
    } else {
        let start = reply.find('{')?;
        let end = reply.rfind('}')?;
        if end <= start {
            return None;
        }
        &reply[start..=end]
    };
    serde_json::from_str(candidate.trim()).ok()
}

fn parse_ai_predictions(value: &serde_json::Value) -> Option<Vec<ProjectedPoint>> {
    let raw = value.get("predictions")?.as_array()?;
    if raw.len() != PROJECTION_PERIODS {
        return None;
    }
    let mut out = Vec::with_capacity(PROJECTION_PERIODS);
    for (i, entry) in raw.iter().enumerate() {
        // Accept bare numbers or {"predicted_cents": n} objects.
        let n = entry
            .as_f64()
            .or_else(|| entry.get("predicted_cents").and_then(|v| v.as_f64()))?;
        out.push(ProjectedPoint {
            period_index: i as u32 + 1,
            predicted_cents: n.max(0.0).round() as i64,
        });
    }
    Some(out)
}

fn build_roi_prompt(points: &[HistoryPoint]) -> String {
    let mut series = String::new();
    for p in points {
        series.push_str(&format!(
            "{}: {} cents\n",
            p.date.format("%Y-%m"),
            p.value_cents
        ));
    }
    format!(
        "You are a financial forecasting assistant. Given the following monthly \
         net revenue history, project the next {PROJECTION_PERIODS} months.\n\n\
         History:\n{series}\n\
         Reply with a JSON object of the form \
         {{\"predictions\": [n1, n2, n3, n4, n5, n6]}} where each value is a \
         projected amount in integer cents."
    )
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct ProjectionUseCases {
    text_generation: Option<Arc<dyn TextGenerationPort>>,
}

impl ProjectionUseCases {
    pub fn new(text_generation: Option<Arc<dyn TextGenerationPort>>) -> Self {
        Self { text_generation }
    }

    /// Plain arithmetic forecast over a raw series.
    pub fn forecast(&self, points: &[HistoryPoint], granularity: Granularity) -> ProjectionOutcome {
        trend_forecast(points, granularity)
    }

    /// ROI forecast over a daily series, re-bucketed monthly. Delegates to
    /// the text-generation API when one is configured and silently falls
    /// back to the arithmetic result on any failure.
    pub async fn forecast_roi(&self, daily_points: &[HistoryPoint]) -> AppResult<ProjectionOutcome> {
        let monthly = bucket_monthly(daily_points);
        let mut outcome = trend_forecast(&monthly, Granularity::Monthly);

        let Some(port) = &self.text_generation else {
            return Ok(outcome);
        };

        match port.generate(&build_roi_prompt(&monthly)).await {
            Ok(reply) => match extract_json_block(&reply).as_ref().and_then(parse_ai_predictions) {
                Some(predictions) => {
                    outcome.predictions = predictions;
                    outcome.method = ProjectionMethod::CohereAi;
                }
                None => {
                    tracing::warn!("AI reply had no usable JSON block; using trend fallback");
                    outcome.method = ProjectionMethod::TrendBasedFallback;
                }
            },
            Err(err) => {
                tracing::warn!(error = ?err, "Text generation call failed; using trend fallback");
                outcome.method = ProjectionMethod::TrendBasedFallback;
            }
        }

        Ok(outcome)
    }
}
