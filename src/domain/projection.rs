//! Compound-interest projections: simple, with contributions, ranking and goal seeking.
//!
//! Rates are annual percentages compounded monthly (`i = rate / 100 / 12`).
//! The engine trusts the rate it is given; clamping happens upstream.

use crate::domain::error::PesowatchError;
use crate::domain::settings::EngineSettings;

/// Longest horizon accepted by [`Horizon::new`].
pub const DEFAULT_MAX_MONTHS: u32 = 120;

/// A projection length in months, at least 1 and at most a configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Horizon(u32);

impl Horizon {
    pub fn new(months: i64) -> Result<Self, PesowatchError> {
        Self::bounded(months, DEFAULT_MAX_MONTHS)
    }

    /// Like [`Horizon::new`] with an explicit upper limit.
    pub fn bounded(months: i64, max_months: u32) -> Result<Self, PesowatchError> {
        u32::try_from(months)
            .ok()
            .filter(|m| (1..=max_months).contains(m))
            .map(Self)
            .ok_or(PesowatchError::InvalidHorizon {
                months,
                max: max_months,
            })
    }

    pub fn months(self) -> u32 {
        self.0
    }
}

/// State of the investment at the end of `period`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionRow {
    pub period: u32,
    pub capital: f64,
    pub contributed: f64,
    pub interest: f64,
}

pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 100.0 / 12.0
}

fn growth_factor(i: f64, months: u32) -> f64 {
    (1.0 + i).powf(months as f64)
}

/// Future value of one unit paid at the end of each of `months` months.
fn annuity_factor(i: f64, months: u32) -> f64 {
    if i == 0.0 {
        months as f64
    } else {
        (growth_factor(i, months) - 1.0) / i
    }
}

/// Level payment that grows `capital0` into `target` over `months`, unclamped.
fn level_payment(capital0: f64, target: f64, i: f64, months: u32) -> f64 {
    let gap = target - capital0 * growth_factor(i, months);
    gap / annuity_factor(i, months)
}

/// Month-by-month compounding shared by every projection: the row is
/// recorded, then the capital grows one month and the contribution is added.
/// The last row receives no further growth.
fn compound(capital0: f64, contribution: f64, annual_rate: f64, horizon: Horizon) -> Vec<ProjectionRow> {
    let i = monthly_rate(annual_rate);
    let months = horizon.months();

    let mut capital = capital0;
    let mut contributed = capital0;
    let mut rows = Vec::with_capacity(months as usize + 1);
    for period in 0..=months {
        rows.push(ProjectionRow {
            period,
            capital,
            contributed,
            interest: capital - contributed,
        });
        if period < months {
            capital = capital * (1.0 + i) + contribution;
            contributed += contribution;
        }
    }
    rows
}

/// Capital growth with no contributions, `months + 1` rows starting at period 0.
pub fn simple_projection(capital0: f64, annual_rate: f64, horizon: Horizon) -> Vec<ProjectionRow> {
    compound(capital0, 0.0, annual_rate, horizon)
}

/// Capital growth with a fixed monthly contribution added after each month's growth.
pub fn contribution_projection(
    capital0: f64,
    contribution: f64,
    annual_rate: f64,
    horizon: Horizon,
) -> Vec<ProjectionRow> {
    compound(capital0, contribution, annual_rate, horizon)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub annual_rate: f64,
}

impl Candidate {
    pub fn new(name: impl Into<String>, annual_rate: f64) -> Self {
        Self {
            name: name.into(),
            annual_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedInstrument {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub name: String,
    pub annual_rate: f64,
    pub final_capital: f64,
    pub gain: f64,
    pub return_pct: f64,
}

impl RankedInstrument {
    pub fn is_podium(&self) -> bool {
        self.rank <= 3
    }
}

/// Ranks candidates by the capital they reach, highest first.
///
/// Candidates with equal final capital keep their input order.
pub fn compare_instruments(
    capital0: f64,
    horizon: Horizon,
    candidates: &[Candidate],
) -> Vec<RankedInstrument> {
    let mut ranked: Vec<RankedInstrument> = candidates
        .iter()
        .map(|c| {
            let final_capital =
                capital0 * growth_factor(monthly_rate(c.annual_rate), horizon.months());
            let gain = final_capital - capital0;
            let return_pct = if capital0 != 0.0 {
                gain / capital0 * 100.0
            } else {
                0.0
            };
            RankedInstrument {
                rank: 0,
                name: c.name.clone(),
                annual_rate: c.annual_rate,
                final_capital,
                gain,
                return_pct,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.final_capital.total_cmp(&a.final_capital));
    for (pos, entry) in ranked.iter_mut().enumerate() {
        entry.rank = pos + 1;
    }
    ranked
}

/// Final capital of the best entry minus that of the worst.
pub fn ranking_spread(ranking: &[RankedInstrument]) -> Option<f64> {
    let best = ranking.first()?;
    let worst = ranking.last()?;
    Some(best.final_capital - worst.final_capital)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Reachable,
    /// The initial capital alone reaches the target.
    AlreadyAchieved,
    /// The required contribution exceeds the configured ceiling.
    Infeasible,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalPlan {
    pub payment: f64,
    pub status: GoalStatus,
    pub monthly_rate: f64,
    /// What `capital0` grows to on its own.
    pub future_value_of_capital: f64,
}

/// Monthly contribution needed to reach `target` from `capital0`.
///
/// A negative result means no contribution is needed and is reported as 0
/// with [`GoalStatus::AlreadyAchieved`]. Above `ceiling` the payment is kept
/// but flagged [`GoalStatus::Infeasible`].
pub fn required_contribution(
    capital0: f64,
    target: f64,
    annual_rate: f64,
    horizon: Horizon,
    ceiling: f64,
) -> GoalPlan {
    let i = monthly_rate(annual_rate);
    let months = horizon.months();
    let future_value_of_capital = capital0 * growth_factor(i, months);
    let payment = level_payment(capital0, target, i, months);

    let (payment, status) = if payment < 0.0 {
        (0.0, GoalStatus::AlreadyAchieved)
    } else if payment > ceiling {
        (payment, GoalStatus::Infeasible)
    } else {
        (payment, GoalStatus::Reachable)
    };

    GoalPlan {
        payment,
        status,
        monthly_rate: i,
        future_value_of_capital,
    }
}

/// A validated goal-seeking request.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalRequest {
    capital0: f64,
    target: f64,
    annual_rate: f64,
    horizon: Horizon,
}

impl GoalRequest {
    pub fn new(
        capital0: f64,
        target: f64,
        annual_rate: f64,
        horizon: Horizon,
    ) -> Result<Self, PesowatchError> {
        if !capital0.is_finite() || !target.is_finite() || !annual_rate.is_finite() {
            return Err(PesowatchError::InvalidGoal {
                reason: "amounts and rate must be finite".to_string(),
            });
        }
        if target <= capital0 {
            return Err(PesowatchError::InvalidGoal {
                reason: format!("target {target} must exceed initial capital {capital0}"),
            });
        }
        Ok(Self {
            capital0,
            target,
            annual_rate,
            horizon,
        })
    }

    pub fn capital0(&self) -> f64 {
        self.capital0
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }
}

/// Where the target amount comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalBreakdown {
    pub initial_capital: f64,
    pub total_contributions: f64,
    pub interest: f64,
}

/// The same goal solved over a different horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlternativeHorizon {
    pub months: u32,
    pub payment: f64,
    pub total_contributed: f64,
}

/// One month of a goal trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub period: u32,
    pub capital: f64,
    pub remaining: f64,
    /// Share of the horizon elapsed, in percent.
    pub completion_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalOutcome {
    pub request: GoalRequest,
    pub plan: GoalPlan,
    pub projection: Vec<ProjectionRow>,
    pub breakdown: GoalBreakdown,
    pub alternatives: Vec<AlternativeHorizon>,
}

impl GoalOutcome {
    pub fn progress(&self) -> Vec<GoalProgress> {
        let months = self.request.horizon.months() as f64;
        self.projection
            .iter()
            .map(|row| GoalProgress {
                period: row.period,
                capital: row.capital,
                remaining: (self.request.target - row.capital).max(0.0),
                completion_pct: row.period as f64 / months * 100.0,
            })
            .collect()
    }

    /// Monthly saving obtained by taking the longest alternative horizon.
    pub fn extension_saving(&self) -> Option<f64> {
        self.alternatives
            .last()
            .map(|alt| self.plan.payment - alt.payment)
    }
}

/// Horizons shown next to the requested one: a year shorter (at least 6
/// months), the requested one and a year longer (at most 60 months).
fn alternative_months(months: u32) -> [u32; 3] {
    [
        months.saturating_sub(12).max(6),
        months,
        months.saturating_add(12).min(60),
    ]
}

/// Solves a goal and builds everything needed to present it.
pub fn plan_goal(request: GoalRequest, settings: &EngineSettings) -> GoalOutcome {
    let months = request.horizon.months();
    let plan = required_contribution(
        request.capital0,
        request.target,
        request.annual_rate,
        request.horizon,
        settings.infeasible_contribution,
    );
    if plan.status == GoalStatus::Infeasible {
        log::warn!(
            "required contribution {:.2} exceeds {:.2}",
            plan.payment,
            settings.infeasible_contribution
        );
    }

    let projection = contribution_projection(
        request.capital0,
        plan.payment,
        request.annual_rate,
        request.horizon,
    );

    let total_contributions = plan.payment * months as f64;
    let breakdown = GoalBreakdown {
        initial_capital: request.capital0,
        total_contributions,
        interest: request.target - (request.capital0 + total_contributions),
    };

    let alternatives = alternative_months(months)
        .into_iter()
        .map(|m| {
            let payment = level_payment(request.capital0, request.target, plan.monthly_rate, m);
            AlternativeHorizon {
                months: m,
                payment,
                total_contributed: payment * m as f64,
            }
        })
        .collect();

    GoalOutcome {
        request,
        plan,
        projection,
        breakdown,
        alternatives,
    }
}
