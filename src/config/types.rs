//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the validated tables
//! built from them.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{STATUTORY_CONTRIBUTION_IS_PRE_TAX, is_valid_money_amount, max_money_amount};
use crate::error::{EngineError, EngineResult};
use crate::models::{AllowanceRule, AllowanceType, DeductionType, GradeStep};

/// Which party a statutory contribution is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionShare {
    /// Withheld from the employee's pay.
    Employee,
    /// Paid by the employer on top of pay.
    Employer,
}

/// The amount a statutory rate is applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionBase {
    /// Basic salary plus all allowances.
    #[default]
    Gross,
    /// Basic salary only.
    Basic,
}

/// A versioned statutory rate (e.g. social security).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryConfig {
    /// Name of the scheme (e.g. "SSNIT Tier 1").
    pub name: String,
    /// Rate as a percentage (e.g. 5.5 for 5.5%).
    pub rate_percent: Decimal,
    /// First date the rate applies.
    pub effective_from: NaiveDate,
    /// Employee or employer share.
    pub share: ContributionShare,
    /// What the rate is applied to.
    #[serde(default)]
    pub base: ContributionBase,
}

impl StatutoryConfig {
    /// Rejects a rate outside 0-100%.
    pub fn validate(&self) -> EngineResult<()> {
        if !is_valid_percent(self.rate_percent) {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "statutory rate {}% for '{}' is outside 0-100",
                    self.rate_percent, self.name
                ),
            });
        }
        Ok(())
    }
}

fn is_valid_percent(percent: Decimal) -> bool {
    percent >= Decimal::ZERO && percent <= Decimal::ONE_HUNDRED
}

/// One row of a progressive tax table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound.
    pub lower_bound: Decimal,
    /// Exclusive upper bound; `None` means unbounded.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate as a percentage.
    pub rate_percent: Decimal,
}

impl TaxBracket {
    /// The marginal rate as a fraction (percent ÷ 100).
    pub fn rate(&self) -> Decimal {
        self.rate_percent / Decimal::ONE_HUNDRED
    }

    /// The width of the bracket, or `None` for the unbounded top bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.upper_bound.map(|ub| ub - self.lower_bound)
    }
}

/// Tax bracket file structure (`tax_brackets/<year>.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct TaxBracketsFile {
    /// The tax year.
    pub year: i32,
    /// Rows of the table, in any order.
    pub brackets: Vec<TaxBracket>,
}

/// A validated progressive tax table for one year.
///
/// Rows start at zero, are contiguous and non-overlapping, are ordered by
/// lower bound, and end with exactly one unbounded row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    year: i32,
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates the rows for a year and builds the table.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::{BracketTable, TaxBracket};
    /// use rust_decimal::Decimal;
    ///
    /// let table = BracketTable::new(2025, vec![
    ///     TaxBracket {
    ///         lower_bound: Decimal::new(2000, 0),
    ///         upper_bound: None,
    ///         rate_percent: Decimal::new(20, 0),
    ///     },
    ///     TaxBracket {
    ///         lower_bound: Decimal::ZERO,
    ///         upper_bound: Some(Decimal::new(2000, 0)),
    ///         rate_percent: Decimal::new(10, 0),
    ///     },
    /// ]).unwrap();
    ///
    /// assert_eq!(table.brackets()[0].lower_bound, Decimal::ZERO);
    /// ```
    pub fn new(year: i32, mut brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        let invalid = |message: String| EngineError::InvalidTaxBrackets { year, message };

        if brackets.is_empty() {
            return Err(invalid("table has no brackets".to_string()));
        }

        brackets.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));

        if !brackets[0].lower_bound.is_zero() {
            return Err(invalid(format!(
                "first bracket must start at 0, starts at {}",
                brackets[0].lower_bound
            )));
        }

        let last = brackets.len() - 1;
        for (i, bracket) in brackets.iter().enumerate() {
            if !is_valid_percent(bracket.rate_percent) {
                return Err(invalid(format!(
                    "rate {}% at lower bound {} is outside 0-100",
                    bracket.rate_percent, bracket.lower_bound
                )));
            }

            match bracket.upper_bound {
                Some(ub) if ub <= bracket.lower_bound => {
                    return Err(invalid(format!(
                        "upper bound {} is not above lower bound {}",
                        ub, bracket.lower_bound
                    )));
                }
                Some(ub) if i == last => {
                    return Err(invalid(format!(
                        "top bracket must be unbounded, ends at {}",
                        ub
                    )));
                }
                Some(ub) => {
                    let next = &brackets[i + 1];
                    if next.lower_bound != ub {
                        let problem = if next.lower_bound > ub { "gap" } else { "overlap" };
                        return Err(invalid(format!(
                            "{} between {} and {}",
                            problem, ub, next.lower_bound
                        )));
                    }
                }
                None if i != last => {
                    return Err(invalid(format!(
                        "only the top bracket may be unbounded, found one at {}",
                        bracket.lower_bound
                    )));
                }
                None => {}
            }
        }

        Ok(Self { year, brackets })
    }

    /// The tax year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The rows in ascending lower-bound order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }
}

/// Statutory configs and tax tables.
#[derive(Debug, Clone, Default)]
pub struct RateTables {
    statutory: Vec<StatutoryConfig>,
    brackets: BTreeMap<i32, BracketTable>,
}

impl RateTables {
    /// Creates the rate tables from statutory rows and validated bracket tables.
    pub fn new(statutory: Vec<StatutoryConfig>, tables: Vec<BracketTable>) -> Self {
        let brackets = tables.into_iter().map(|t| (t.year(), t)).collect();
        Self {
            statutory,
            brackets,
        }
    }

    /// All statutory rows.
    pub fn statutory(&self) -> &[StatutoryConfig] {
        &self.statutory
    }

    /// The bracket table for a year, if configured.
    pub fn bracket_table(&self, year: i32) -> Option<&BracketTable> {
        self.brackets.get(&year)
    }

    /// Years with a bracket table.
    pub fn bracket_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.brackets.keys().copied()
    }
}

/// Catalog file structure (`catalog.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    /// Allowance types.
    #[serde(default)]
    pub allowance_types: Vec<AllowanceType>,
    /// Deduction types.
    #[serde(default)]
    pub deduction_types: Vec<DeductionType>,
}

/// Allowance and deduction catalogs keyed by code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    allowance_types: HashMap<String, AllowanceType>,
    deduction_types: HashMap<String, DeductionType>,
}

impl Catalog {
    /// Builds the catalog, rejecting duplicate codes and percentages outside
    /// 0-100.
    pub fn new(
        allowance_types: Vec<AllowanceType>,
        deduction_types: Vec<DeductionType>,
    ) -> EngineResult<Self> {
        let mut catalog = Self::default();
        for allowance in allowance_types {
            if let AllowanceRule::PercentOfBasic { percent } = allowance.rule {
                if !is_valid_percent(percent) {
                    return Err(EngineError::InvalidConfiguration {
                        message: format!(
                            "allowance type '{}' pays {}% of basic, outside 0-100",
                            allowance.code, percent
                        ),
                    });
                }
            }
            let code = allowance.code.clone();
            if catalog.allowance_types.insert(code.clone(), allowance).is_some() {
                return Err(EngineError::InvalidConfiguration {
                    message: format!("duplicate allowance type '{}'", code),
                });
            }
        }
        for deduction in deduction_types {
            let code = deduction.code.clone();
            if catalog.deduction_types.insert(code.clone(), deduction).is_some() {
                return Err(EngineError::InvalidConfiguration {
                    message: format!("duplicate deduction type '{}'", code),
                });
            }
        }
        Ok(catalog)
    }

    /// Looks up an allowance type by code.
    pub fn allowance_type(&self, code: &str) -> Option<&AllowanceType> {
        self.allowance_types.get(code)
    }

    /// Looks up a deduction type by code.
    pub fn deduction_type(&self, code: &str) -> Option<&DeductionType> {
        self.deduction_types.get(code)
    }
}

/// Grade steps file structure (`grade_steps.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct GradeStepsFile {
    /// Salary scale entries.
    pub grade_steps: Vec<GradeStep>,
}

/// The salary scale keyed by (grade code, step).
#[derive(Debug, Clone, Default)]
pub struct GradeTable {
    steps: HashMap<(String, u32), GradeStep>,
}

impl GradeTable {
    /// Builds the table, rejecting duplicate (grade, step) pairs and salaries
    /// outside the money range.
    pub fn new(steps: Vec<GradeStep>) -> EngineResult<Self> {
        let mut table = HashMap::new();
        for step in steps {
            if !is_valid_money_amount(step.basic_salary) {
                return Err(EngineError::InvalidConfiguration {
                    message: format!(
                        "basic salary {} for grade step {}-{} is outside 0-{}",
                        step.basic_salary,
                        step.grade_code,
                        step.step,
                        max_money_amount()
                    ),
                });
            }
            let key = (step.grade_code.clone(), step.step);
            if table.contains_key(&key) {
                return Err(EngineError::InvalidConfiguration {
                    message: format!("duplicate grade step {}-{}", key.0, key.1),
                });
            }
            table.insert(key, step);
        }
        Ok(Self { steps: table })
    }

    /// Looks up a grade step.
    pub fn get(&self, grade_code: &str, step: u32) -> Option<&GradeStep> {
        self.steps.get(&(grade_code.to_string(), step))
    }
}

/// Engine tuning and policy settings (`settings.yaml`, optional).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Whether the employee statutory contribution reduces taxable income.
    #[serde(default = "default_statutory_pre_tax")]
    pub statutory_pre_tax: bool,
    /// How many employees are computed concurrently.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

fn default_statutory_pre_tax() -> bool {
    STATUTORY_CONTRIBUTION_IS_PRE_TAX
}

fn default_max_parallel() -> usize {
    8
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            statutory_pre_tax: default_statutory_pre_tax(),
            max_parallel: default_max_parallel(),
        }
    }
}

/// The complete payroll configuration loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various
/// YAML files in a payroll configuration directory. It is read-only for the
/// duration of a run.
#[derive(Debug, Clone, Default)]
pub struct PayrollConfig {
    grades: GradeTable,
    catalog: Catalog,
    rates: RateTables,
    settings: EngineSettings,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(
        grades: GradeTable,
        catalog: Catalog,
        rates: RateTables,
        settings: EngineSettings,
    ) -> Self {
        Self {
            grades,
            catalog,
            rates,
            settings,
        }
    }

    /// Returns the salary scale.
    pub fn grades(&self) -> &GradeTable {
        &self.grades
    }

    /// Returns the allowance and deduction catalogs.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the statutory and tax tables.
    pub fn rates(&self) -> &RateTables {
        &self.rates
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}
