//! # Ledger & Revenue Reconciliation
//!
//! Turns the three record streams (repair orders, sales, expenditures)
//! into the dashboard figures.
//!
//! ## Three Streams, One Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Income Ledger Entries                             │
//! │                                                                         │
//! │  RepairOrder row ─┬─► Advance entry                                    │
//! │                   │     amount = advance                                │
//! │                   │     at     = created_at                             │
//! │                   │     mode   = payment_mode_advance                   │
//! │                   │                                                     │
//! │                   └─► Balance entry   (only if balance_collected_at)   │
//! │                         amount = estimated_cost − advance               │
//! │                         at     = balance_collected_at                   │
//! │                         mode   = payment_mode_balance                   │
//! │                                                                         │
//! │  Sale row ─────────► Sale entry                                        │
//! │                         amount = total_price                            │
//! │                         at     = created_at                             │
//! │                         mode   = payment_mode, category = category      │
//! │                                                                         │
//! │  Every entry is bucketed by clock::local_date(at, shop timezone).      │
//! │  One order can land in two different days: advance on Monday,          │
//! │  balance on Thursday.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Realized vs Pending
//! ```text
//!   balance_collected_at = NULL   → remainder is PENDING (if order active)
//!   balance_collected_at = t      → remainder is REALIZED on local_date(t)
//! ```
//! The two are mutually exclusive, so the remainder is never counted twice.
//!
//! ## Snapshot In, Stats Out
//! The store loads a [`LedgerSnapshot`] inside one read transaction;
//! [`compute_dashboard`] is a pure function of that snapshot, the current
//! instant and the timezone. A store failure never reaches this module, so
//! an all-zero [`DashboardStats`] always means "no activity".

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::clock::{first_of_month, local_date};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderStatus, PaymentMode, Period};
use crate::{DEFAULT_SALE_CATEGORY, REPAIRS_CATEGORY};

// =============================================================================
// Snapshot Rows
// =============================================================================

/// The ledger-relevant columns of a repair order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLedgerRow {
    pub id: String,
    pub estimated_cost_paise: Option<i64>,
    pub advance_paise: Option<i64>,
    pub status: OrderStatus,
    pub payment_mode_advance: PaymentMode,
    pub payment_mode_balance: PaymentMode,
    pub created_at: DateTime<Utc>,
    pub balance_collected_at: Option<DateTime<Utc>>,
}

impl OrderLedgerRow {
    fn advance(&self) -> Money {
        Money::from_optional(self.advance_paise)
    }

    fn balance(&self) -> CoreResult<Money> {
        Money::from_optional(self.estimated_cost_paise)
            .checked_sub(self.advance())
            .ok_or(CoreError::AmountOverflow("repair balance"))
    }

    /// Remainder still owed: active and not collected.
    pub fn pending(&self) -> CoreResult<Money> {
        if self.status.is_terminal() || self.balance_collected_at.is_some() {
            Ok(Money::zero())
        } else {
            self.balance()
        }
    }
}

/// The ledger-relevant columns of a sale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLedgerRow {
    pub id: String,
    pub category: Option<String>,
    pub total_price_paise: Option<i64>,
    pub payment_mode: PaymentMode,
    pub created_at: DateTime<Utc>,
}

/// The ledger-relevant columns of an expenditure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ExpenditureLedgerRow {
    pub id: String,
    pub amount_paise: Option<i64>,
    pub date: DateTime<Utc>,
}

/// All three streams as of one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    pub orders: Vec<OrderLedgerRow>,
    pub sales: Vec<SaleLedgerRow>,
    pub expenditures: Vec<ExpenditureLedgerRow>,
}

// =============================================================================
// Ledger Entries
// =============================================================================

/// Where a piece of income came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum IncomeSource {
    RepairAdvance,
    RepairBalance,
    Sale,
}

/// One realized income event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub source: IncomeSource,
    pub source_id: String,
    pub amount: Money,
    pub mode: PaymentMode,
    pub category: String,
    pub occurred_at: DateTime<Utc>,
    /// `local_date(occurred_at, tz)`, computed once.
    pub local_date: NaiveDate,
}

impl LedgerSnapshot {
    /// Flattens the snapshot into income entries, oldest rows first as
    /// given.
    pub fn income_entries(&self, tz: Tz) -> CoreResult<Vec<LedgerEntry>> {
        let mut entries = Vec::with_capacity(self.orders.len() * 2 + self.sales.len());

        for order in &self.orders {
            entries.push(LedgerEntry {
                source: IncomeSource::RepairAdvance,
                source_id: order.id.clone(),
                amount: order.advance(),
                mode: order.payment_mode_advance,
                category: REPAIRS_CATEGORY.to_string(),
                occurred_at: order.created_at,
                local_date: local_date(order.created_at, tz),
            });

            if let Some(collected_at) = order.balance_collected_at {
                entries.push(LedgerEntry {
                    source: IncomeSource::RepairBalance,
                    source_id: order.id.clone(),
                    amount: order.balance()?,
                    mode: order.payment_mode_balance,
                    category: REPAIRS_CATEGORY.to_string(),
                    occurred_at: collected_at,
                    local_date: local_date(collected_at, tz),
                });
            }
        }

        for sale in &self.sales {
            let category = sale
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_SALE_CATEGORY);
            entries.push(LedgerEntry {
                source: IncomeSource::Sale,
                source_id: sale.id.clone(),
                amount: Money::from_optional(sale.total_price_paise),
                mode: sale.payment_mode,
                category: category.to_string(),
                occurred_at: sale.created_at,
                local_date: local_date(sale.created_at, tz),
            });
        }

        Ok(entries)
    }
}

// =============================================================================
// Windows
// =============================================================================

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateWindow {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl DateWindow {
    /// The `days` days ending with `today`, today included.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let back = i64::from(days.max(1)) - 1;
        DateWindow {
            start: today - chrono::Duration::days(back),
            end: today,
        }
    }

    #[inline]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Every day in the window, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Income split by payment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentBreakdown {
    pub cash: Money,
    pub upi: Money,
    pub card: Money,
}

/// Running sum of paise. Wide enough that no snapshot overflows it midway;
/// only the final value has to fit back into [`Money`].
#[derive(Debug, Clone, Copy, Default)]
struct Tally(i128);

impl Tally {
    fn add(&mut self, amount: Money) {
        self.0 += i128::from(amount.paise());
    }

    fn less(self, other: Tally) -> Tally {
        Tally(self.0 - other.0)
    }

    fn finish(self, what: &'static str) -> CoreResult<Money> {
        i64::try_from(self.0)
            .map(Money::from_paise)
            .map_err(|_| CoreError::AmountOverflow(what))
    }
}

#[derive(Debug, Default)]
struct ModeTally {
    cash: Tally,
    upi: Tally,
    card: Tally,
}

impl ModeTally {
    fn add(&mut self, mode: PaymentMode, amount: Money) {
        match mode {
            PaymentMode::Cash => self.cash.add(amount),
            PaymentMode::Upi => self.upi.add(amount),
            PaymentMode::Card => self.card.add(amount),
        }
    }

    fn finish(self) -> CoreResult<PaymentBreakdown> {
        Ok(PaymentBreakdown {
            cash: self.cash.finish("cash revenue")?,
            upi: self.upi.finish("UPI revenue")?,
            card: self.card.finish("card revenue")?,
        })
    }
}

/// Revenue for one category in the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryTotal {
    pub name: String,
    pub revenue: Money,
}

/// One day of the trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendPoint {
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// "Mon" for a week view, "07 Oct" for a month view.
    pub label: String,
    pub revenue: Money,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub period: Period,
    #[ts(as = "String")]
    pub today: NaiveDate,
    pub window: DateWindow,

    pub total_revenue: Money,
    pub today_revenue: Money,
    pub period_revenue: Money,

    pub pending_collections: Money,
    pub active_repairs: i64,
    pub repairs_this_month: i64,

    pub today_expenditure: Money,
    pub period_expenditure: Money,
    pub today_profit: Money,
    pub period_profit: Money,

    pub trend: Vec<TrendPoint>,
    pub categories: Vec<CategoryTotal>,
    pub payment_modes_today: PaymentBreakdown,
    pub payment_modes_period: PaymentBreakdown,
}

/// Computes the dashboard for `period` as seen at `now` in `tz`.
///
/// Sums run in i128; a total that does not fit back into [`Money`] is
/// [`CoreError::AmountOverflow`].
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use fixit_core::clock::DEFAULT_TIMEZONE;
/// use fixit_core::ledger::{compute_dashboard, LedgerSnapshot, OrderLedgerRow};
/// use fixit_core::{Money, OrderStatus, PaymentMode, Period};
///
/// let now = Utc.with_ymd_and_hms(2026, 10, 16, 6, 0, 0).unwrap();
/// let snapshot = LedgerSnapshot {
///     orders: vec![OrderLedgerRow {
///         id: "o-1".into(),
///         estimated_cost_paise: Some(100_000),
///         advance_paise: Some(30_000),
///         status: OrderStatus::Repaired,
///         payment_mode_advance: PaymentMode::Cash,
///         payment_mode_balance: PaymentMode::Upi,
///         created_at: now,
///         balance_collected_at: Some(now),
///     }],
///     ..Default::default()
/// };
///
/// let stats = compute_dashboard(&snapshot, now, DEFAULT_TIMEZONE, Period::Week).unwrap();
/// assert_eq!(stats.today_revenue, Money::from_paise(100_000));
/// assert_eq!(stats.trend.len(), 7);
/// ```
pub fn compute_dashboard(
    snapshot: &LedgerSnapshot,
    now: DateTime<Utc>,
    tz: Tz,
    period: Period,
) -> CoreResult<DashboardStats> {
    let today = local_date(now, tz);
    let window = DateWindow::trailing(today, period.days());
    let month_start = first_of_month(today);
    let entries = snapshot.income_entries(tz)?;

    // ---- income ----------------------------------------------------------
    let mut total_revenue = Tally::default();
    let mut today_revenue = Tally::default();
    let mut period_revenue = Tally::default();
    let mut modes_today = ModeTally::default();
    let mut modes_period = ModeTally::default();
    let mut per_day: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
    let mut per_category: BTreeMap<String, Tally> = BTreeMap::new();
    per_category.insert(REPAIRS_CATEGORY.to_string(), Tally::default());

    for entry in &entries {
        total_revenue.add(entry.amount);

        if entry.local_date == today {
            today_revenue.add(entry.amount);
            modes_today.add(entry.mode, entry.amount);
        }

        if window.contains(entry.local_date) {
            period_revenue.add(entry.amount);
            modes_period.add(entry.mode, entry.amount);
            per_day.entry(entry.local_date).or_default().add(entry.amount);
            per_category
                .entry(entry.category.clone())
                .or_default()
                .add(entry.amount);
        }
    }

    let trend = window
        .days()
        .map(|day| -> CoreResult<TrendPoint> {
            Ok(TrendPoint {
                date: day,
                label: day.format(period.label_format()).to_string(),
                revenue: per_day
                    .get(&day)
                    .copied()
                    .unwrap_or_default()
                    .finish("daily revenue")?,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let mut categories = per_category
        .into_iter()
        .map(|(name, tally)| -> CoreResult<CategoryTotal> {
            Ok(CategoryTotal {
                name,
                revenue: tally.finish("category revenue")?,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;
    categories.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));

    // ---- order state -----------------------------------------------------
    let mut pending = Tally::default();
    for order in &snapshot.orders {
        pending.add(order.pending()?);
    }
    let active_repairs = snapshot
        .orders
        .iter()
        .filter(|o| !o.status.is_terminal())
        .count() as i64;
    let repairs_this_month = snapshot
        .orders
        .iter()
        .filter(|o| local_date(o.created_at, tz) >= month_start)
        .count() as i64;

    // ---- outflow ---------------------------------------------------------
    let mut today_expenditure = Tally::default();
    let mut period_expenditure = Tally::default();
    for expenditure in &snapshot.expenditures {
        let day = local_date(expenditure.date, tz);
        let amount = Money::from_optional(expenditure.amount_paise);
        if day == today {
            today_expenditure.add(amount);
        }
        if window.contains(day) {
            period_expenditure.add(amount);
        }
    }

    Ok(DashboardStats {
        period,
        today,
        window,
        total_revenue: total_revenue.finish("total revenue")?,
        today_revenue: today_revenue.finish("today's revenue")?,
        period_revenue: period_revenue.finish("period revenue")?,
        pending_collections: pending.finish("pending collections")?,
        active_repairs,
        repairs_this_month,
        today_expenditure: today_expenditure.finish("today's expenditure")?,
        period_expenditure: period_expenditure.finish("period expenditure")?,
        today_profit: today_revenue.less(today_expenditure).finish("today's profit")?,
        period_profit: period_revenue.less(period_expenditure).finish("period profit")?,
        trend,
        categories,
        payment_modes_today: modes_today.finish()?,
        payment_modes_period: modes_period.finish()?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
