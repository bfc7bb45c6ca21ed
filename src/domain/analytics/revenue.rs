use super::histogram::HistogramReport;
use super::payload::{AnalyticsPayload, PayloadOrigin};
use crate::domain::errors::InvalidScenario;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize, Serializer};

/// Which side of the uplift is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// The current rate is the baseline; project the rate after an assumed uplift.
    #[default]
    Forward,
    /// The current rate already includes an observed uplift; reconstruct the rate before it.
    Inverse,
}

/// Calculator inputs. Rates and uplift are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueScenario {
    pub monthly_visitors: f64,
    pub conversion_rate_percent: f64,
    pub average_order_value: f64,
    pub mode: ProjectionMode,
    pub uplift_percent: f64,
}

impl Default for RevenueScenario {
    fn default() -> Self {
        Self {
            monthly_visitors: 100_000.0,
            conversion_rate_percent: 2.0,
            average_order_value: 50.0,
            mode: ProjectionMode::Forward,
            uplift_percent: 12.0,
        }
    }
}

impl RevenueScenario {
    /// Inverse scenario from the uplift actually measured between the two variants.
    ///
    /// Returns `None` when the baseline variant has no conversions to compare against.
    pub fn from_observed(
        monthly_visitors: f64,
        average_order_value: f64,
        report: &HistogramReport,
    ) -> Option<Self> {
        Some(Self::observed_inverse(
            monthly_visitors,
            average_order_value,
            report.optimized.average_conversion_rate,
            report.observed_uplift_percent()?,
        ))
    }

    /// Same as [`RevenueScenario::from_observed`], read from a display payload.
    ///
    /// Fallback payloads carry no measurement and give `None`.
    pub fn from_payload(
        monthly_visitors: f64,
        average_order_value: f64,
        payload: &AnalyticsPayload,
    ) -> Option<Self> {
        if payload.origin != PayloadOrigin::Live {
            return None;
        }
        Some(Self::observed_inverse(
            monthly_visitors,
            average_order_value,
            payload.optimized.histogram.average_conversion_rate,
            payload.observed_uplift_percent?,
        ))
    }

    fn observed_inverse(
        monthly_visitors: f64,
        average_order_value: f64,
        optimized_rate_percent: f64,
        uplift_percent: f64,
    ) -> Self {
        Self {
            monthly_visitors,
            conversion_rate_percent: optimized_rate_percent,
            average_order_value,
            mode: ProjectionMode::Inverse,
            uplift_percent,
        }
    }
}

/// Intermediate quantities behind a projection.
///
/// In inverse mode the baseline side is the reconstructed pre-uplift state and
/// the improved side is the current, observed one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBreakdown {
    pub baseline_rate_percent: f64,
    pub improved_rate_percent: f64,
    pub baseline_revenue: Decimal,
    pub improved_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueProjection {
    /// Monthly revenue delta; negative for a regression, zero when invalid.
    pub boost: Decimal,
    pub breakdown: RevenueBreakdown,
    pub valid: bool,
    #[serde(serialize_with = "serialize_reason")]
    pub invalid_reason: Option<InvalidScenario>,
}

impl RevenueProjection {
    fn invalid(reason: InvalidScenario) -> Self {
        Self {
            boost: Decimal::ZERO,
            breakdown: RevenueBreakdown::default(),
            valid: false,
            invalid_reason: Some(reason),
        }
    }
}

fn serialize_reason<S: Serializer>(
    reason: &Option<InvalidScenario>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match reason {
        Some(r) => serializer.serialize_some(&r.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Projects the monthly revenue delta of a scenario.
///
/// Never fails: unusable inputs give a zero boost with `valid == false`.
pub fn project(scenario: &RevenueScenario) -> RevenueProjection {
    match try_project(scenario) {
        Ok((boost, breakdown)) => RevenueProjection {
            boost,
            breakdown,
            valid: true,
            invalid_reason: None,
        },
        Err(reason) => RevenueProjection::invalid(reason),
    }
}

fn try_project(
    scenario: &RevenueScenario,
) -> Result<(Decimal, RevenueBreakdown), InvalidScenario> {
    let visitors = non_negative("monthly_visitors", scenario.monthly_visitors)?;
    let rate = non_negative("conversion_rate_percent", scenario.conversion_rate_percent)?;
    let order_value = non_negative("average_order_value", scenario.average_order_value)?;
    let uplift = to_decimal("uplift_percent", scenario.uplift_percent)?;

    let factor = Decimal::ONE + uplift / Decimal::ONE_HUNDRED;
    let out_of_range = InvalidScenario::UpliftOutOfRange {
        uplift_percent: scenario.uplift_percent,
    };

    let (baseline_rate, improved_rate) = match scenario.mode {
        ProjectionMode::Forward => {
            if factor < Decimal::ZERO {
                return Err(out_of_range);
            }
            (rate, rate.checked_mul(factor).ok_or(InvalidScenario::Overflow)?)
        }
        ProjectionMode::Inverse => {
            if factor <= Decimal::ZERO {
                return Err(out_of_range);
            }
            (rate.checked_div(factor).ok_or(InvalidScenario::Overflow)?, rate)
        }
    };

    let baseline_revenue = monthly_revenue(visitors, baseline_rate, order_value)?;
    let improved_revenue = monthly_revenue(visitors, improved_rate, order_value)?;
    let boost = improved_revenue
        .checked_sub(baseline_revenue)
        .ok_or(InvalidScenario::Overflow)?;

    let breakdown = RevenueBreakdown {
        baseline_rate_percent: baseline_rate.to_f64().unwrap_or(0.0),
        improved_rate_percent: improved_rate.to_f64().unwrap_or(0.0),
        baseline_revenue,
        improved_revenue,
    };
    Ok((boost, breakdown))
}

/// `visitors * rate / 100 * order_value`
fn monthly_revenue(
    visitors: Decimal,
    rate_percent: Decimal,
    order_value: Decimal,
) -> Result<Decimal, InvalidScenario> {
    visitors
        .checked_mul(rate_percent / Decimal::ONE_HUNDRED)
        .and_then(|v| v.checked_mul(order_value))
        .ok_or(InvalidScenario::Overflow)
}

fn to_decimal(field: &'static str, value: f64) -> Result<Decimal, InvalidScenario> {
    if !value.is_finite() {
        return Err(InvalidScenario::NotFinite { field });
    }
    Decimal::from_f64(value).ok_or(InvalidScenario::Overflow)
}

fn non_negative(field: &'static str, value: f64) -> Result<Decimal, InvalidScenario> {
    let decimal = to_decimal(field, value)?;
    if value < 0.0 {
        return Err(InvalidScenario::Negative { field, value });
    }
    Ok(decimal)
}
