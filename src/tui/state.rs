//! Selection state behind the TUI controls.
//!
//! Kept free of Ratatui types so the narrowing rules (sex -> grade ->
//! brackets) and the assumption steppers can be tested directly.

use crate::domain::{
    ADG_MAX, ADG_MIN, FeedingAssumptions, MarketEntry, NormalizedReport, ProfitResult, Sex,
};
use crate::error::ReportError;
use crate::profit::compute_profit;
use crate::slice::{brackets_for, grades_for, sexes};

const COG_STEP: f64 = 0.05;
const ADG_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Sex,
    Grade,
    Purchase,
    Sale,
    CostOfGain,
    TargetAdg,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Sex,
        Field::Grade,
        Field::Purchase,
        Field::Sale,
        Field::CostOfGain,
        Field::TargetAdg,
    ];

    pub fn index(self) -> usize {
        Field::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub field: Field,
    sex: usize,
    grade: usize,
    purchase: usize,
    sale: usize,
    cost_of_gain: f64,
    target_adg: f64,
}

impl Selection {
    pub fn new(assumptions: FeedingAssumptions) -> Self {
        Self {
            field: Field::Sex,
            sex: 0,
            grade: 0,
            purchase: 0,
            sale: 0,
            cost_of_gain: assumptions.cost_of_gain(),
            target_adg: assumptions.target_adg(),
        }
    }

    pub fn sex(&self, report: &NormalizedReport) -> Option<Sex> {
        sexes(&report.entries).into_iter().nth(self.sex)
    }

    pub fn grade(&self, report: &NormalizedReport) -> Option<String> {
        let sex = self.sex(report)?;
        grades_for(&report.entries, &sex).into_iter().nth(self.grade)
    }

    pub fn brackets<'a>(&self, report: &'a NormalizedReport) -> Vec<&'a MarketEntry> {
        match (self.sex(report), self.grade(report)) {
            (Some(sex), Some(grade)) => brackets_for(&report.entries, &sex, &grade),
            _ => Vec::new(),
        }
    }

    pub fn purchase<'a>(&self, report: &'a NormalizedReport) -> Option<&'a MarketEntry> {
        self.brackets(report).get(self.purchase).copied()
    }

    pub fn sale<'a>(&self, report: &'a NormalizedReport) -> Option<&'a MarketEntry> {
        self.brackets(report).get(self.sale).copied()
    }

    pub fn cost_of_gain(&self) -> f64 {
        self.cost_of_gain
    }

    pub fn target_adg(&self) -> f64 {
        self.target_adg
    }

    pub fn assumptions(&self) -> Result<FeedingAssumptions, ReportError> {
        FeedingAssumptions::new(self.cost_of_gain, self.target_adg)
    }

    /// Profit for the current selection, if both brackets are chosen.
    pub fn outcome(&self, report: &NormalizedReport) -> Option<Result<ProfitResult, ReportError>> {
        let purchase = self.purchase(report)?;
        let sale = self.sale(report)?;
        Some(self.assumptions().and_then(|a| compute_profit(purchase, sale, &a)))
    }

    pub fn next_field(&mut self) {
        let i = self.field.index();
        self.field = Field::ALL[(i + 1).min(Field::ALL.len() - 1)];
    }

    pub fn prev_field(&mut self) {
        let i = self.field.index();
        self.field = Field::ALL[i.saturating_sub(1)];
    }

    /// Step the focused control by `delta`; list fields wrap around.
    pub fn adjust(&mut self, report: &NormalizedReport, delta: i32) {
        match self.field {
            Field::Sex => {
                self.sex = step(self.sex, sexes(&report.entries).len(), delta);
                self.grade = 0;
                self.reset_brackets(report);
            }
            Field::Grade => {
                let n = self
                    .sex(report)
                    .map(|s| grades_for(&report.entries, &s).len())
                    .unwrap_or(0);
                self.grade = step(self.grade, n, delta);
                self.reset_brackets(report);
            }
            Field::Purchase => {
                self.purchase = step(self.purchase, self.brackets(report).len(), delta);
            }
            Field::Sale => {
                self.sale = step(self.sale, self.brackets(report).len(), delta);
            }
            Field::CostOfGain => {
                let next = self.cost_of_gain + COG_STEP * f64::from(delta);
                self.cost_of_gain = round_to(next.max(0.0), 2);
            }
            Field::TargetAdg => {
                let next = self.target_adg + ADG_STEP * f64::from(delta);
                self.target_adg = round_to(next.clamp(ADG_MIN, ADG_MAX), 1);
            }
        }
    }

    /// Purchase on the first bracket, sale on the last one of the slice.
    pub fn reset_brackets(&mut self, report: &NormalizedReport) {
        self.purchase = 0;
        self.sale = self.brackets(report).len().saturating_sub(1);
    }

    /// Keep indices valid after a new snapshot replaced the old one.
    pub fn clamp_to(&mut self, report: &NormalizedReport) {
        let n_sex = sexes(&report.entries).len();
        if self.sex >= n_sex {
            self.sex = 0;
        }
        let n_grade = self
            .sex(report)
            .map(|s| grades_for(&report.entries, &s).len())
            .unwrap_or(0);
        if self.grade >= n_grade {
            self.grade = 0;
        }
        let n_brackets = self.brackets(report).len();
        if self.purchase >= n_brackets || self.sale >= n_brackets {
            self.reset_brackets(report);
        }
    }
}

fn step(current: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    (current as i64 + i64::from(delta)).rem_euclid(len) as usize
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}
