//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration and the employee roster from YAML files.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, GradeStep};

use super::types::{
    BracketTable, Catalog, CatalogFile, EngineSettings, GradeStepsFile, GradeTable,
    PayrollConfig, RateTables, StatutoryConfig, TaxBracketsFile,
};

/// Statutory file structure (`statutory.yaml`).
#[derive(Debug, Clone, Deserialize)]
struct StatutoryFile {
    statutory: Vec<StatutoryConfig>,
}

/// Roster file structure (`employees.yaml`).
#[derive(Debug, Clone, Deserialize)]
struct EmployeesFile {
    employees: Vec<Employee>,
}

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates them, and provides the resulting [`PayrollConfig`] and roster.
///
/// # Directory Structure
///
/// ```text
/// config/demo/
/// ├── grade_steps.yaml    # Salary scale
/// ├── catalog.yaml        # Allowance and deduction types
/// ├── statutory.yaml      # Versioned statutory rates
/// ├── employees.yaml      # Roster with allowance/deduction assignments
/// ├── settings.yaml       # Optional engine settings
/// └── tax_brackets/
///     └── 2025.yaml       # Progressive tax table for a year
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/demo").unwrap();
/// println!("Loaded {} employees", loader.employees().len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
    employees: Vec<Employee>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The grade table or catalogs contain duplicates
    /// - A salary or rate is out of range
    /// - A tax bracket table is not contiguous from zero
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/demo")?;
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let grade_steps = Self::load_yaml::<GradeStepsFile>(&path.join("grade_steps.yaml"))?;
        let grades = GradeTable::new(grade_steps.grade_steps)?;

        let catalog_file = Self::load_yaml::<CatalogFile>(&path.join("catalog.yaml"))?;
        let catalog = Catalog::new(catalog_file.allowance_types, catalog_file.deduction_types)?;

        let statutory = Self::load_yaml::<StatutoryFile>(&path.join("statutory.yaml"))?;
        for row in &statutory.statutory {
            row.validate()?;
        }
        let tables = Self::load_tax_brackets(&path.join("tax_brackets"))?;
        let rates = RateTables::new(statutory.statutory, tables);

        let settings_path = path.join("settings.yaml");
        let settings = if settings_path.exists() {
            Self::load_yaml::<EngineSettings>(&settings_path)?
        } else {
            debug!(path = %settings_path.display(), "No settings file, using defaults");
            EngineSettings::default()
        };

        let employees = Self::load_yaml::<EmployeesFile>(&path.join("employees.yaml"))?.employees;

        info!(
            path = %path.display(),
            employees = employees.len(),
            tax_years = ?rates.bracket_years().collect::<Vec<_>>(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            config: PayrollConfig::new(grades, catalog, rates, settings),
            employees,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads and validates every bracket table in the tax_brackets directory.
    fn load_tax_brackets(dir: &Path) -> EngineResult<Vec<BracketTable>> {
        let dir_str = dir.display().to_string();

        if !dir.exists() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut tables: Vec<BracketTable> = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let file = Self::load_yaml::<TaxBracketsFile>(&path)?;
                if tables.iter().any(|t| t.year() == file.year) {
                    return Err(EngineError::InvalidConfiguration {
                        message: format!("tax brackets for {} defined more than once", file.year),
                    });
                }
                tables.push(BracketTable::new(file.year, file.brackets)?);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no tax bracket files found)", dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the roster as loaded.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Splits the loader into configuration and roster.
    pub fn into_parts(self) -> (PayrollConfig, Vec<Employee>) {
        (self.config, self.employees)
    }

    /// Gets a grade step by grade code and step.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/demo")?;
    /// let grade = loader.get_grade_step("SL", 1)?;
    /// println!("Basic salary: {}", grade.basic_salary);
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn get_grade_step(&self, grade_code: &str, step: u32) -> EngineResult<&GradeStep> {
        self.config
            .grades()
            .get(grade_code, step)
            .ok_or_else(|| EngineError::InvalidConfiguration {
                message: format!("grade step {}-{} not configured", grade_code, step),
            })
    }
}
