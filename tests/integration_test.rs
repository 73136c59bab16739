//! Integration tests: full consolidation and projection pipeline over a mock row source.

mod common;

use approx::assert_relative_eq;
use common::*;
use pesowatch::adapters::cached_data_port::CachedDataPort;
use pesowatch::adapters::csv_report_adapter::CsvReportAdapter;
use pesowatch::cli::{collect_candidates, load_consolidation, missing_instruments};
use pesowatch::domain::consolidation::{NavMetric, Substitution};
use pesowatch::domain::error::PesowatchError;
use pesowatch::domain::kpi::period_kpis;
use pesowatch::domain::normalize::{normalize, real_returns, trailing_window};
use pesowatch::domain::projection::{
    GoalOutcome, GoalRequest, Horizon, ProjectionRow, RankedInstrument, compare_instruments,
    plan_goal,
};
use pesowatch::domain::rate::{RateBasis, estimate_for_column};
use pesowatch::domain::settings::EngineSettings;
use pesowatch::domain::table::{ColumnKind, ConsolidatedTable, INFLATION_COLUMN};
use pesowatch::ports::data_port::DataPort;
use pesowatch::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::time::Duration;

mod full_pipeline {
    use super::*;

    #[test]
    fn consolidates_every_source() {
        let settings = EngineSettings::default();
        let result = load_consolidation(&sample_port(), &settings, NavMetric::Price).unwrap();

        assert!(result.substitutions.is_empty());
        let names: Vec<&str> = result
            .table
            .columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Mercado Pago", "Ualá", "Dólar Blue", "Dólar Oficial", INFLATION_COLUMN]
        );
        assert_eq!(result.table.len(), 60);
        assert!(
            result
                .table
                .rows()
                .windows(2)
                .all(|w| w[0].date < w[1].date)
        );
    }

    #[test]
    fn normalized_window_and_kpis() {
        let settings = EngineSettings::default();
        let result = load_consolidation(&sample_port(), &settings, NavMetric::Price).unwrap();

        let (start, end) = trailing_window(&result.table, 30).unwrap();
        assert_eq!(start, day(29));
        assert_eq!(end, day(59));

        let normalized = normalize(&result.table, start, end).unwrap();
        assert_eq!(normalized.len(), 31);
        assert!(normalized.rows()[0].values.iter().all(|v| *v == 100.0));

        let kpis = period_kpis(&normalized, "Dólar Blue").unwrap();
        let best = kpis.best_fund.as_ref().unwrap();
        assert_eq!(best.name, "Ualá");
        assert_relative_eq!(
            best.change,
            (1.0012_f64.powi(30) - 1.0) * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            best.real_result,
            best.change - kpis.inflation_change,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            kpis.fx_change.unwrap(),
            (1259.0 / 1229.0 - 1.0) * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            kpis.fx_real_result.unwrap(),
            kpis.fx_change.unwrap() - kpis.inflation_change,
            epsilon = 1e-12
        );

        let real = real_returns(&normalized).unwrap();
        assert!(real.column(INFLATION_COLUMN).is_none());
        assert_eq!(real.first_value("Ualá"), Some(0.0));
    }

    #[test]
    fn rate_estimates_stay_inside_bounds() {
        let settings = EngineSettings::default();
        let result = load_consolidation(&sample_port(), &settings, NavMetric::Price).unwrap();

        let uala = estimate_for_column(&result.table, "Ualá", &settings).unwrap();
        let expected = (1.0012_f64.powf(30.0 / 31.0) - 1.0) * 365.0 * 100.0;
        assert_relative_eq!(uala.rate, expected, epsilon = 1e-9);
        assert_eq!(
            uala.basis,
            RateBasis::Window {
                points: 31,
                raw: uala.rate
            }
        );

        let err = estimate_for_column(&result.table, "Naranja X", &settings).unwrap_err();
        assert!(matches!(err, PesowatchError::UnknownColumn { .. }));
    }

    #[test]
    fn rate_metric_table_starts_at_100() {
        let settings = EngineSettings::default();
        let result = load_consolidation(&sample_port(), &settings, NavMetric::Rate).unwrap();
        assert_eq!(result.table.first_value("Ualá"), Some(100.0));
        assert!(result.table.last_value("Ualá").unwrap() > 100.0);
    }

    #[test]
    fn ranking_prefers_faster_fund() {
        let settings = EngineSettings::default();
        let port = sample_port();
        let result = load_consolidation(&port, &settings, NavMetric::Price).unwrap();
        let candidates = collect_candidates(&port, &result, &settings, false)
            .unwrap()
            .candidates;
        assert_eq!(candidates.len(), 2);

        let ranking = compare_instruments(100_000.0, Horizon::new(12).unwrap(), &candidates);
        assert_eq!(ranking[0].name, "Ualá");
        assert_eq!(ranking[1].name, "Mercado Pago");
        assert!(ranking[0].final_capital > ranking[1].final_capital);
    }

    #[test]
    fn goal_on_estimated_rate_reaches_target() {
        let settings = EngineSettings::default();
        let result = load_consolidation(&sample_port(), &settings, NavMetric::Price).unwrap();
        let rate = estimate_for_column(&result.table, "Mercado Pago", &settings)
            .unwrap()
            .rate;

        let request =
            GoalRequest::new(100_000.0, 2_000_000.0, rate, Horizon::new(24).unwrap()).unwrap();
        let outcome = plan_goal(request, &settings);
        assert_relative_eq!(
            outcome.projection.last().unwrap().capital,
            2_000_000.0,
            max_relative = 1e-9
        );
    }
}

mod degraded_sources {
    use super::*;

    #[test]
    fn fx_failure_becomes_constant_column() {
        let port = sample_port().with_error(Source::Fx);
        let result =
            load_consolidation(&port, &EngineSettings::default(), NavMetric::Price).unwrap();

        assert_eq!(
            result.substitutions,
            vec![Substitution::FxConstant {
                fx_type: "Blue".into(),
                value: 1200.0
            }]
        );
        let blue = result.table.column_series("Dólar Blue").unwrap();
        assert_eq!(blue.len(), 60);
        assert!(blue.iter().all(|o| o.value == 1200.0));
        assert!(result.table.column("Dólar Oficial").is_none());
    }

    #[test]
    fn inflation_failure_uses_default_rate() {
        let port = sample_port().with_error(Source::Inflation);
        let result =
            load_consolidation(&port, &EngineSettings::default(), NavMetric::Price).unwrap();

        assert_eq!(
            result.substitutions,
            vec![Substitution::InflationDefault { monthly: 3.0 }]
        );
        let infl = result.table.column_series(INFLATION_COLUMN).unwrap();
        assert_relative_eq!(infl[30].value / infl[0].value, 1.03, epsilon = 1e-12);
    }

    #[test]
    fn nav_failure_keeps_fx_and_inflation() {
        let settings = EngineSettings::default();
        let port = sample_port().with_error(Source::Nav);
        let result = load_consolidation(&port, &settings, NavMetric::Price).unwrap();

        assert_eq!(result.substitutions, vec![Substitution::NavUnavailable]);
        assert_eq!(result.table.columns_of_kind(ColumnKind::Fund).count(), 0);
        assert_eq!(result.table.len(), 60);
        assert!(
            collect_candidates(&port, &result, &settings, false)
                .unwrap()
                .candidates
                .is_empty()
        );
    }

    #[test]
    fn selected_instruments_limit_the_table() {
        let settings = EngineSettings {
            instruments: vec!["Ualá".to_string()],
            ..EngineSettings::default()
        };
        let port = sample_port();
        let result = load_consolidation(&port, &settings, NavMetric::Price).unwrap();
        assert_eq!(result.table.fund_names(), vec!["Ualá".to_string()]);

        let missing = missing_instruments(
            &port,
            &["Ualá".to_string(), "Naranja X".to_string()],
        )
        .unwrap();
        assert_eq!(missing, vec!["Naranja X".to_string()]);
        assert!(missing_instruments(&port, &[]).unwrap().is_empty());
    }

    #[test]
    fn nothing_available_is_no_data() {
        let port = MockDataPort::new()
            .with_error(Source::Nav)
            .with_error(Source::Fx)
            .with_error(Source::Inflation);
        let err =
            load_consolidation(&port, &EngineSettings::default(), NavMetric::Price).unwrap_err();
        assert!(matches!(err, PesowatchError::NoData { .. }));
    }

    #[test]
    fn deposits_join_the_ranking() {
        let settings = EngineSettings::default();
        let port = sample_port().with_deposits(vec![
            DepositRate {
                date: day(10),
                bank: "Banco Nación".into(),
                tna_clients: 30.0,
                tna_non_clients: 28.0,
            },
            DepositRate {
                date: day(40),
                bank: "Banco Nación".into(),
                tna_clients: 70.0,
                tna_non_clients: 65.0,
            },
        ]);
        let result = load_consolidation(&port, &settings, NavMetric::Price).unwrap();
        let set = collect_candidates(&port, &result, &settings, true).unwrap();
        assert!(set.substitutions.is_empty());
        let candidates = set.candidates;
        assert_eq!(candidates.len(), 3);

        let ranking = compare_instruments(1000.0, Horizon::new(6).unwrap(), &candidates);
        assert_eq!(ranking[0].name, "Plazo fijo Banco Nación");
        assert_eq!(ranking[0].annual_rate, 70.0);
    }

    #[test]
    fn deposit_failure_leaves_funds_only() {
        let settings = EngineSettings::default();
        let port = sample_port().with_error(Source::Deposits);
        let result = load_consolidation(&port, &settings, NavMetric::Price).unwrap();

        let without = collect_candidates(&port, &result, &settings, false).unwrap();
        assert!(without.substitutions.is_empty());

        let with = collect_candidates(&port, &result, &settings, true).unwrap();
        assert_eq!(with.candidates, without.candidates);
        assert_eq!(with.substitutions, vec![Substitution::DepositsUnavailable]);
    }
}

mod cache_adapter {
    use super::*;

    #[test]
    fn repeated_pipeline_reads_source_once() {
        let port = CachedDataPort::new(sample_port(), Duration::from_secs(600));
        let settings = EngineSettings::default();

        let first = load_consolidation(&port, &settings, NavMetric::Price).unwrap();
        let second = load_consolidation(&port, &settings, NavMetric::Price).unwrap();
        assert_eq!(first, second);
        assert_eq!(port.inner().calls.get(), 3);
    }

    #[test]
    fn failed_source_is_retried() {
        let port = CachedDataPort::new(
            sample_port().with_error(Source::Fx),
            Duration::from_secs(600),
        );
        assert!(port.fetch_fx_quotes().is_err());
        assert!(port.fetch_fx_quotes().is_err());
        assert_eq!(port.inner().calls.get(), 2);
    }
}

mod report_port {
    use super::*;

    #[derive(Default)]
    struct RecordingReport {
        written: RefCell<Vec<String>>,
    }

    impl ReportPort for RecordingReport {
        fn write_table(&self, name: &str, _table: &ConsolidatedTable) -> Result<(), PesowatchError> {
            self.written.borrow_mut().push(format!("table:{name}"));
            Ok(())
        }

        fn write_projection(
            &self,
            name: &str,
            rows: &[ProjectionRow],
        ) -> Result<(), PesowatchError> {
            self.written
                .borrow_mut()
                .push(format!("projection:{name}:{}", rows.len()));
            Ok(())
        }

        fn write_ranking(&self, ranking: &[RankedInstrument]) -> Result<(), PesowatchError> {
            self.written
                .borrow_mut()
                .push(format!("ranking:{}", ranking.len()));
            Ok(())
        }
    }

    fn outcome() -> GoalOutcome {
        let request = GoalRequest::new(0.0, 500_000.0, 35.0, Horizon::new(24).unwrap()).unwrap();
        plan_goal(request, &EngineSettings::default())
    }

    #[test]
    fn default_goal_report_writes_trajectory() {
        let report = RecordingReport::default();
        report.write_goal(&outcome()).unwrap();
        assert_eq!(*report.written.borrow(), vec!["projection:goal:25"]);
    }

    #[test]
    fn csv_report_writes_pipeline_tables() {
        let dir = tempfile::TempDir::new().unwrap();
        let report = CsvReportAdapter::new(dir.path().to_path_buf());
        let settings = EngineSettings::default();
        let result = load_consolidation(&sample_port(), &settings, NavMetric::Price).unwrap();

        report.write_table("consolidated", &result.table).unwrap();
        report.write_goal(&outcome()).unwrap();

        let table = std::fs::read_to_string(dir.path().join("consolidated.csv")).unwrap();
        assert_eq!(table.lines().count(), 61);
        assert!(
            table
                .lines()
                .next()
                .unwrap()
                .starts_with("date,Mercado Pago,Ualá")
        );
        assert!(dir.path().join("goal.csv").exists());
        assert!(dir.path().join("goal_alternatives.csv").exists());
    }
}
