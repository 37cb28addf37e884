//! Performance benchmarks for the Payroll Engine.
//!
//! - Single payslip computation
//! - `/calculate` through the router
//! - Full period runs over synthetic rosters
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::{RateSnapshot, compute_payslip};
use payroll_engine::config::{ConfigLoader, PayrollConfig};
use payroll_engine::engine::{InMemoryStore, PayrollEngine, RunOptions};
use payroll_engine::models::{
    Employee, EmployeeAllowance, EmployeeDeduction, EmploymentType, GradeRef, PeriodKey,
};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> PayrollConfig {
    ConfigLoader::load("./config/demo")
        .expect("Failed to load config")
        .into_parts()
        .0
}

fn period() -> PeriodKey {
    PeriodKey::new(2025, 8).expect("valid period")
}

/// Creates a roster of `count` employees cycling through the demo grades.
fn create_roster(count: usize) -> Vec<Employee> {
    let grades = [("AS", 1), ("AL", 1), ("L", 1), ("SL", 2), ("P", 1)];
    (0..count)
        .map(|i| {
            let (grade_code, step) = grades[i % grades.len()];
            Employee {
                id: format!("emp_{:05}", i),
                first_name: "Bench".to_string(),
                last_name: format!("Employee{}", i),
                department: format!("Dept{}", i % 7),
                grade: Some(GradeRef {
                    grade_code: grade_code.to_string(),
                    step,
                }),
                employment_type: EmploymentType::Permanent,
                active: i % 10 != 9,
                allowances: vec![
                    EmployeeAllowance {
                        allowance_type: "housing".to_string(),
                        amount: Decimal::new(100_000, 2),
                        active: true,
                    },
                    EmployeeAllowance {
                        allowance_type: "responsibility".to_string(),
                        amount: Decimal::ZERO,
                        active: true,
                    },
                ],
                deductions: vec![EmployeeDeduction {
                    deduction_type: "provident_fund".to_string(),
                    amount: Decimal::new(25_000, 2),
                    active: true,
                }],
            }
        })
        .collect()
}

/// Benchmark: one employee, pure computation.
fn bench_single_payslip(c: &mut Criterion) {
    let config = load_config();
    let rates = RateSnapshot::resolve(config.rates(), period().start_date(), 2025)
        .expect("rates resolve");
    let employee = create_roster(3).remove(2);

    c.bench_function("single_payslip", |b| {
        b.iter(|| black_box(compute_payslip(&employee, &config, &rates, period())))
    });
}

/// Benchmark: `/calculate` through the router.
fn bench_calculate_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (config, employees) = ConfigLoader::load("./config/demo")
        .expect("Failed to load config")
        .into_parts();
    let router = create_router(AppState::new(config, employees));
    let body = serde_json::json!({ "employee_id": "emp_002", "year": 2025, "month": 8 })
        .to_string();

    c.bench_function("calculate_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/calculate")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: full period runs, scaling with roster size.
///
/// Each iteration uses a fresh store so every run commits its payslips.
fn bench_run_period(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = Arc::new(load_config());

    let mut group = c.benchmark_group("run_period");
    group.sample_size(20);

    for roster_size in [10usize, 100, 1000] {
        let roster = create_roster(roster_size);
        group.throughput(Throughput::Elements(roster_size as u64));
        group.bench_with_input(
            BenchmarkId::new("employees", roster_size),
            &roster,
            |b, roster| {
                b.to_async(&rt).iter(|| async {
                    let engine = PayrollEngine::new(
                        Arc::clone(&config),
                        Arc::new(InMemoryStore::new(roster.clone())),
                    );
                    let outcome = engine
                        .run_period(period(), RunOptions::default())
                        .await
                        .unwrap();
                    black_box(outcome)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_payslip,
    bench_calculate_endpoint,
    bench_run_period,
);
criterion_main!(benches);
