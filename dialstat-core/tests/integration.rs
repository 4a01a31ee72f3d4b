//! Integration tests for the dialstat ingest and summary pipeline
//!
//! These tests read the fixture export in `tests/fixtures/` and check the
//! finished summary tables end to end.

use dialstat_core::analytics::{
    Dimension, KeyCell, RecordSubset, ReportEngine, SummaryTable, ViewKind, ViewRunStatus,
    ViewSpec,
};
use dialstat_core::config::{Config, FilterConfig};
use dialstat_core::ingest::{read_csv, RawTable};
use dialstat_core::ExclusionStage;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn fixture() -> RawTable {
    read_csv(&fixture_path("dispositions.csv")).expect("fixture should load")
}

fn default_engine() -> ReportEngine {
    ReportEngine::from_config(&Config::default()).expect("default config is valid")
}

fn run(engine: &ReportEngine, spec: ViewSpec, table: &RawTable) -> SummaryTable {
    engine.summarize(&spec, table).expect("view should succeed")
}

/// First key cell of every grouped row, joined with the second when present.
fn row_keys(table: &SummaryTable) -> Vec<String> {
    table
        .rows()
        .iter()
        .map(|r| {
            r.keys
                .iter()
                .map(KeyCell::to_string)
                .collect::<Vec<_>>()
                .join(" / ")
        })
        .collect()
}

const BASE_HEADERS: [&str; 9] = [
    "Account No.",
    "Date",
    "Time",
    "Call Status",
    "Status",
    "Remark Type",
    "Remark By",
    "PTP Amount",
    "Balance",
];

// ============================================
// Fixture views
// ============================================

#[test]
fn test_fixture_loads() {
    let table = fixture();
    assert_eq!(table.len(), 9);
    assert_eq!(table.columns().len(), 14);
}

#[test]
fn test_collector_view_on_fixture() {
    let table = run(&default_engine(), ViewSpec::new(ViewKind::Collector), &fixture());

    assert_eq!(
        row_keys(&table),
        vec![
            "2024-03-05 / AGENT1",
            "2024-03-05 / AGENT2",
            "2024-03-05 / SYSTEM",
            "2024-03-06 / AGENT1",
        ]
    );

    let agent1 = &table.rows()[0].metrics;
    assert_eq!(agent1.accounts_total, 2);
    assert_eq!(agent1.total_dialed, 3);
    assert_eq!(agent1.connected_accounts, 2);
    assert_eq!(agent1.ptp_accounts, 1);
    assert_eq!(agent1.ptp_amount, Decimal::new(500, 0));
    assert_eq!(agent1.balance_amount, Decimal::new(1000, 0));
    assert_eq!(agent1.agent_drops, 1);
    assert_eq!(table.rows()[0].rates.call_drop_ratio, Some(50.0));

    let system = &table.rows()[2].metrics;
    assert_eq!(system.system_drops, 1);
    assert_eq!(system.connected_accounts, 0);
    // Undefined rates stay undefined, never 0%.
    assert_eq!(table.rows()[2].rates.ptp_rate, None);

    let total = table.total();
    assert_eq!(total.metrics.accounts_total, 5);
    assert_eq!(total.metrics.total_dialed, 7);
    assert_eq!(total.metrics.connected_accounts, 4);
    assert_eq!(total.metrics.ptp_accounts, 2);
    assert_eq!(total.metrics.ptp_amount, Decimal::new(700, 0));
    assert_eq!(total.metrics.balance_amount, Decimal::new(76_000, 0));
    assert_eq!(total.metrics.agent_drops, 1);
    assert_eq!(total.metrics.system_drops, 1);
    assert_eq!(total.rates.call_drop_ratio, Some(25.0));

    let rendered = table.rendered_rows();
    let last = rendered.last().unwrap();
    assert_eq!(last[0], "Total");
    assert_eq!(last[1], "");
}

#[test]
fn test_totals_equal_column_sums() {
    let engine = default_engine();
    let input = fixture();

    for kind in [
        ViewKind::Hourly,
        ViewKind::Collector,
        ViewKind::Cycle,
        ViewKind::BalanceTier,
        ViewKind::Overall,
        ViewKind::Client,
        ViewKind::TalkTime,
    ] {
        let table = run(&engine, ViewSpec::new(kind), &input);
        let rows = table.rows();
        let total = &table.total().metrics;

        let sum = |column: &str| -> u64 {
            rows.iter()
                .map(|r| match column {
                    "total_dialed" => r.metrics.total_dialed,
                    "connected" => r.metrics.connected,
                    "connected_accounts" => r.metrics.connected_accounts,
                    "ptp_accounts" => r.metrics.ptp_accounts,
                    _ => r.metrics.agent_drops,
                })
                .sum()
        };
        assert_eq!(sum("total_dialed"), total.total_dialed, "{kind}");
        assert_eq!(sum("connected"), total.connected, "{kind}");
        assert_eq!(sum("connected_accounts"), total.connected_accounts, "{kind}");
        assert_eq!(sum("ptp_accounts"), total.ptp_accounts, "{kind}");
        assert_eq!(sum("agent_drops"), total.agent_drops, "{kind}");
        assert_eq!(
            rows.iter().map(|r| r.metrics.ptp_amount).sum::<Decimal>(),
            total.ptp_amount,
            "{kind}"
        );

        for row in table.iter() {
            if row.metrics.ptp_accounts == 0 {
                assert_eq!(row.metrics.ptp_amount, Decimal::ZERO, "{kind}");
            }
            assert_eq!(
                row.rates.ptp_rate.is_none(),
                row.metrics.connected_accounts == 0,
                "{kind}"
            );
        }
        assert!(table.iter().last().unwrap().is_total());
    }
}

#[test]
fn test_hourly_view_buckets_and_outside_range() {
    let table = run(&default_engine(), ViewSpec::new(ViewKind::Hourly), &fixture());

    // 05:59 and 21:00 fall outside the calling day.
    assert_eq!(
        row_keys(&table),
        vec![
            "08:01-09:00 AM",
            "09:01-10:00 AM",
            "10:01-11:00 AM",
            "02:01-03:00 PM",
        ]
    );
    assert_eq!(table.total().metrics.total_dialed, 5);
    assert_eq!(table.rows()[3].metrics.total_dialed, 2);
}

#[test]
fn test_hourly_boundaries() {
    let input = RawTable::from_rows(
        &BASE_HEADERS,
        vec![
            vec!["A-1", "2024-03-05", "09:00:00", "CONNECTED", "", "Predictive", "AGENT1", "", ""],
            vec!["A-2", "2024-03-05", "09:01:00", "CONNECTED", "", "Predictive", "AGENT1", "", ""],
            vec!["A-3", "2024-03-05", "05:59:00", "CONNECTED", "", "Predictive", "AGENT1", "", ""],
        ],
    );
    let table = run(&default_engine(), ViewSpec::new(ViewKind::Hourly), &input);

    assert_eq!(row_keys(&table), vec!["08:01-09:00 AM", "09:01-10:00 AM"]);
    assert_eq!(table.total().metrics.total_dialed, 2);
}

#[test]
fn test_balance_tier_view_on_fixture() {
    let table = run(&default_engine(), ViewSpec::new(ViewKind::BalanceTier), &fixture());

    // Balances of 1,000 fall in no tier.
    assert_eq!(
        row_keys(&table),
        vec!["6,000 - 49,999", "50,000 - 99,999", "100,000+"]
    );
    let mid = &table.rows()[1].metrics;
    assert_eq!(mid.accounts_total, 2);
    assert_eq!(mid.total_dialed, 3);
    assert_eq!(mid.ptp_accounts, 1);
    assert_eq!(mid.ptp_amount, Decimal::new(200, 0));
    assert_eq!(mid.balance_amount, Decimal::new(75_000, 0));
    assert_eq!(table.total().metrics.total_dialed, 5);
}

#[test]
fn test_cycle_client_and_talk_time_views() {
    let engine = default_engine();
    let input = fixture();

    let cycle = run(&engine, ViewSpec::new(ViewKind::Cycle), &input);
    assert_eq!(
        row_keys(&cycle),
        vec!["2024-03-05 / 31", "2024-03-05 / 32", "2024-03-06 / 32"]
    );
    assert_eq!(cycle.rows()[0].metrics.total_dialed, 4);
    assert_eq!(cycle.rows()[0].metrics.system_drops, 1);

    let client = run(&engine, ViewSpec::new(ViewKind::Client), &input);
    assert_eq!(row_keys(&client), vec!["BANK A", "BANK B"]);
    assert_eq!(client.rows()[0].metrics.total_dialed, 5);
    assert_eq!(client.rows()[1].metrics.total_dialed, 2);

    let talk = run(&engine, ViewSpec::new(ViewKind::TalkTime), &input);
    let rendered = talk.rendered_rows();
    assert_eq!(rendered[0][0], "AGENT1");
    assert_eq!(rendered[0].last().unwrap(), "00:04:10");
    assert_eq!(rendered[1].last().unwrap(), "00:03:10");
    assert_eq!(rendered.last().unwrap().last().unwrap(), "00:07:20");
}

#[test]
fn test_record_subsets() {
    let engine = default_engine();
    let input = fixture();

    let predictive = run(
        &engine,
        ViewSpec::new(ViewKind::Overall).with_subset(RecordSubset::Predictive),
        &input,
    );
    assert_eq!(predictive.total().metrics.total_dialed, 5);

    let manual = run(
        &engine,
        ViewSpec::new(ViewKind::Overall).with_subset(RecordSubset::Manual),
        &input,
    );
    assert_eq!(manual.total().metrics.total_dialed, 2);
    assert_eq!(manual.total().metrics.ptp_amount, Decimal::new(200, 0));
}

#[test]
fn test_combined_dimensions() {
    let spec = ViewSpec::new(ViewKind::Cycle)
        .with_dimensions(vec![Dimension::Date, Dimension::Cycle, Dimension::TimeBucket])
        .unwrap();
    let table = run(&default_engine(), spec, &fixture());

    assert_eq!(table.headers()[..3], ["Date", "Cycle", "Time Range"]);
    // 05:59 and 21:00 have no bucket; 14:20 and 15:00 on cycle 31 and 32 split.
    assert_eq!(table.rows().len(), 5);
    assert_eq!(
        table.total().keys,
        vec![KeyCell::Total, KeyCell::Blank, KeyCell::Blank]
    );
}

#[test]
fn test_sorted_view_keeps_total_last() {
    let spec = ViewSpec::new(ViewKind::Collector).with_sort(Some("ptp_amount:asc".parse().unwrap()));
    let table = run(&default_engine(), spec, &fixture());

    let amounts: Vec<Decimal> = table.rows().iter().map(|r| r.metrics.ptp_amount).collect();
    assert_eq!(
        amounts,
        vec![
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::new(200, 0),
            Decimal::new(500, 0)
        ]
    );
    // Ties keep key order.
    assert_eq!(row_keys(&table)[0], "2024-03-05 / SYSTEM");
    assert!(table.iter().last().unwrap().is_total());
}

// ============================================
// Exclusions and configuration
// ============================================

#[test]
fn test_configured_exclusions() {
    dialstat_core::logging::init_test();

    let config = Config {
        filters: FilterConfig {
            excluded_phrases: vec!["broken promise".to_string()],
            placeholder_patterns: vec!["default_lead_".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = ReportEngine::from_config(&config).unwrap();
    let result = engine.run_view(&ViewSpec::new(ViewKind::Overall), &fixture());

    assert_eq!(result.status, ViewRunStatus::Success);
    let report = &result.filter_report;
    assert_eq!(report.input, 9);
    assert_eq!(report.removed_by(ExclusionStage::AbortStatus), 1);
    assert_eq!(report.removed_by(ExclusionStage::RemarkPhrase), 1);
    assert_eq!(report.removed_by(ExclusionStage::PlaceholderLead), 1);
    assert_eq!(report.removed_by(ExclusionStage::OthersStatus), 1);
    assert_eq!(report.kept, 5);

    let table = result.table.unwrap();
    let first_day = &table.rows()[0].metrics;
    assert_eq!(first_day.accounts_total, 3);
    assert_eq!(first_day.total_dialed, 4);
    assert_eq!(first_day.ptp_amount, Decimal::new(500, 0));
}

#[test]
fn test_config_file_drives_engine() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[filters]
excluded_agents = ["agent2"]
exclude_weekday = "Wednesday"

[dimensions]
balance_tiers = [
    { min = "0", max = "49999", label = "Low" },
    { min = "50000", label = "High" },
]
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let engine = ReportEngine::from_config(&config).unwrap();

    // 2024-03-06 is a Wednesday.
    let overall = run(&engine, ViewSpec::new(ViewKind::Overall), &fixture());
    assert_eq!(row_keys(&overall), vec!["2024-03-05"]);

    let tiers = run(&engine, ViewSpec::new(ViewKind::BalanceTier), &fixture());
    assert_eq!(row_keys(&tiers), vec!["Low", "High"]);
    assert_eq!(tiers.rows()[0].metrics.total_dialed, 3);
    assert_eq!(tiers.rows()[1].metrics.total_dialed, 1);
}

// ============================================
// End-to-end scenarios
// ============================================

#[test]
fn test_ptp_and_agent_drop_for_same_collector() {
    let input = RawTable::from_rows(
        &BASE_HEADERS,
        vec![
            vec!["A-1", "2024-03-05", "10:00:00", "CONNECTED", "PTP NEW", "Predictive", "AGENT1", "500", "1000"],
            vec!["A-1", "2024-03-05", "10:05:00", "DROPPED", "NEGATIVE CALLOUTS - DROP CALL", "Predictive", "AGENT1", "", "1000"],
        ],
    );
    let table = run(&default_engine(), ViewSpec::new(ViewKind::Collector), &input);

    assert_eq!(table.rows().len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.metrics.connected_accounts, 1);
    assert_eq!(row.metrics.ptp_accounts, 1);
    assert_eq!(row.metrics.ptp_amount, Decimal::new(500, 0));
    assert_eq!(row.metrics.agent_drops, 1);
    assert_eq!(row.metrics.system_drops, 0);
    assert_eq!(row.rates.call_drop_ratio, Some(100.0));

    let rendered = table.rendered_rows();
    assert_eq!(rendered[0].last().unwrap(), "100%");
}

#[test]
fn test_balance_in_mid_tier_only() {
    let input = RawTable::from_rows(
        &BASE_HEADERS,
        vec![vec![
            "A-1", "2024-03-05", "10:00:00", "CONNECTED", "PTP NEW", "Predictive", "AGENT1", "200", "75,000",
        ]],
    );
    let table = run(&default_engine(), ViewSpec::new(ViewKind::BalanceTier), &input);

    assert_eq!(row_keys(&table), vec!["50,000 - 99,999"]);
    assert_eq!(table.rows()[0].metrics.ptp_amount, Decimal::new(200, 0));
    assert_eq!(table.rows()[0].metrics.balance_amount, Decimal::new(75_000, 0));
}

#[test]
fn test_records_without_a_dimension_value_stay_in_other_views() {
    let mut headers = BASE_HEADERS.to_vec();
    headers.extend(["Service No.", "Client"]);
    let input = RawTable::from_rows(
        &headers,
        vec![
            vec!["A-1", "2024-03-05", "10:00:00", "CONNECTED", "RPC", "Predictive", "AGENT1", "", "", "31-0042", "BANK A"],
            vec!["A-2", "2024-03-05", "10:10:00", "CONNECTED", "RPC", "Predictive", "AGENT1", "", "", "", "BANK A"],
            vec!["A-3", "2024-03-05", "10:20:00", "CONNECTED", "RPC", "Predictive", "AGENT2", "", "", "SVC-9", ""],
            vec!["A-4", "2024-03-05", "10:30:00", "CONNECTED", "RPC", "Predictive", "", "", "", "32-0001", "BANK B"],
        ],
    );
    let engine = default_engine();

    // Blank and alphabetic service numbers have no cycle.
    let cycle = run(&engine, ViewSpec::new(ViewKind::Cycle), &input);
    assert_eq!(row_keys(&cycle), vec!["2024-03-05 / 31", "2024-03-05 / 32"]);
    assert_eq!(cycle.total().metrics.total_dialed, 2);

    let overall = run(&engine, ViewSpec::new(ViewKind::Overall), &input);
    assert_eq!(row_keys(&overall), vec!["2024-03-05"]);
    assert_eq!(overall.total().metrics.total_dialed, 4);
    assert_eq!(overall.total().metrics.accounts_total, 4);

    let collector = run(&engine, ViewSpec::new(ViewKind::Collector), &input);
    assert_eq!(row_keys(&collector), vec!["2024-03-05 / AGENT1", "2024-03-05 / AGENT2"]);
    assert_eq!(collector.total().metrics.total_dialed, 3);

    let client = run(&engine, ViewSpec::new(ViewKind::Client), &input);
    assert_eq!(row_keys(&client), vec!["BANK A", "BANK B"]);
    assert_eq!(client.total().metrics.total_dialed, 3);
}

#[test]
fn test_missing_column_fails_only_that_view() {
    let headers: Vec<&str> = BASE_HEADERS.iter().copied().filter(|h| *h != "Time").collect();
    let input = RawTable::from_rows(
        &headers,
        vec![vec!["A-1", "2024-03-05", "CONNECTED", "RPC", "Predictive", "AGENT1", "", "9000"]],
    );

    let results = default_engine().run_all(
        &[ViewSpec::new(ViewKind::Hourly), ViewSpec::new(ViewKind::Collector)],
        &input,
    );
    assert_eq!(results[0].status, ViewRunStatus::SchemaError);
    assert_eq!(
        results[0].error_message.as_deref(),
        Some("missing required column(s) for hourly: 'Time'")
    );
    assert!(results[1].is_success());
    assert_eq!(results[1].rows_produced, 1);
}

#[test]
fn test_unparseable_fields_are_counted() {
    let input = RawTable::from_rows(
        &BASE_HEADERS,
        vec![
            vec!["A-1", "not a date", "10:00:00", "CONNECTED", "", "Predictive", "AGENT1", "", ""],
            vec!["A-2", "2024-03-05", "late", "CONNECTED", "", "Predictive", "AGENT1", "abc", ""],
            vec!["A-3", "2024-03-05", "10:00:00", "CONNECTED", "", "Predictive", "AGENT1", "", ""],
        ],
    );
    let engine = default_engine();

    let hourly = engine.run_view(&ViewSpec::new(ViewKind::Hourly), &input);
    assert_eq!(hourly.normalize_report.dropped_bad_date, 1);
    assert_eq!(hourly.normalize_report.dropped_bad_time, 1);
    assert_eq!(hourly.rows_produced, 1);

    // The collector view does not need times, so the late row survives.
    let collector = engine.run_view(&ViewSpec::new(ViewKind::Collector), &input);
    assert_eq!(collector.normalize_report.dropped_bad_time, 0);
    assert_eq!(collector.normalize_report.amounts_defaulted, 1);
    assert_eq!(collector.table.unwrap().total().metrics.total_dialed, 2);
}

#[test]
fn test_json_output_shape() {
    let table = run(&default_engine(), ViewSpec::new(ViewKind::Overall), &fixture());
    let json = table.to_json();

    assert_eq!(json["view"], "overall");
    assert_eq!(json["title"], "Overall Summary");
    assert_eq!(json["columns"][0], "Date");
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][0], "Total");
}
