//! End-to-end runs of the pipeline over a mocked page

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rusqlite::types::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use banks_etl::api::{HttpPageFetcher, StaticPage};
use banks_etl::database::BankDatabase;
use banks_etl::error::EtlError;
use banks_etl::pipeline::{EtlPipeline, COMPAT_FAILURE_MESSAGE, MSG_COMPLETE, MSG_PRELIMINARIES};

use crate::common::{fixtures, logging, test_data, TestWorkspace};

const PAGE_PATH: &str = "/wiki/List_of_largest_banks";

async fn serve_two_banks() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::two_banks_page()))
        .mount(&server)
        .await;
    server
}

#[test_log::test(tokio::test)]
async fn test_end_to_end_two_banks() {
    logging::init_test_logging();
    logging::log_test_step("End-to-end run over two banks");

    let server = serve_two_banks().await;
    let workspace = TestWorkspace::new(&fixtures::e2e_rates());
    let config = workspace.config().with_url(format!("{}{}", server.uri(), PAGE_PATH));

    let fetcher = HttpPageFetcher::new(&config).unwrap();
    let pipeline = EtlPipeline::new(config);
    let mut out = Vec::new();
    let summary = pipeline.run_reported(&fetcher, &mut out).await.expect("Run failed");

    // in-memory table
    assert_eq!(summary.banks, test_data::expected_two_banks());

    // relational table matches, in insertion order
    let db = BankDatabase::open(workspace.file("Banks.db")).unwrap();
    assert_eq!(db.read_banks("Largest_banks").unwrap(), test_data::expected_two_banks());

    // report results
    let average = &summary.reports[1];
    assert_eq!(average.columns, vec!["AVG(MC_GBP_Billion)".to_string()]);
    assert_eq!(average.rows, vec![vec![Value::Real(60.0)]]);

    let names = summary.reports[2].column("Name").unwrap();
    assert_eq!(
        names,
        vec![&Value::Text("Bank A".to_string()), &Value::Text("Bank B".to_string())]
    );

    // console output
    let printed = String::from_utf8(out).unwrap();
    logging::log_test_data("Console", &printed);
    assert!(printed.starts_with("=>SELECT * FROM Largest_banks\n"));
    assert!(printed.contains("=>SELECT AVG(MC_GBP_Billion) FROM Largest_banks\n   AVG(MC_GBP_Billion)\n0                 60.0\n"));
    assert!(printed.contains("=>SELECT Name from Largest_banks LIMIT 5\n     Name\n0  Bank A\n1  Bank B\n"));
    assert!(!printed.contains(COMPAT_FAILURE_MESSAGE));

    // csv file
    let csv = std::fs::read_to_string(workspace.file("Largest_banks_data.csv")).unwrap();
    assert_eq!(
        csv,
        ",Name,MC_USD_Billion,MC_GBP_Billion,MC_EUR_Billion,MC_INR_Billion\n\
         0,Bank A,100.0,80.0,93.0,8250.0\n\
         1,Bank B,50.0,40.0,46.5,4125.0\n"
    );
}

#[test_log::test(tokio::test)]
async fn test_second_run_replaces_and_appends_log() {
    let workspace = TestWorkspace::new(&fixtures::e2e_rates());
    let pipeline = EtlPipeline::new(workspace.config());
    let page = StaticPage::new("two_banks.html", fixtures::two_banks_page());

    pipeline.run(&page, &mut Vec::new()).await.unwrap();
    let first_log = workspace.log_lines();
    assert_eq!(first_log.len(), 7);

    pipeline.run(&page, &mut Vec::new()).await.unwrap();
    let second_log = workspace.log_lines();

    // one line per progress event, earlier lines untouched
    assert_eq!(second_log.len(), 14);
    assert_eq!(&second_log[..7], &first_log[..]);
    assert!(second_log[7].ends_with(MSG_PRELIMINARIES));
    assert!(second_log[13].ends_with(MSG_COMPLETE));

    let db = BankDatabase::open(workspace.file("Banks.db")).unwrap();
    assert_eq!(db.read_banks("Largest_banks").unwrap().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_fetch_failure_leaves_no_outputs() {
    logging::init_test_logging();
    logging::log_test_step("Server error during fetch");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let workspace = TestWorkspace::new(&fixtures::e2e_rates());
    let config = workspace.config().with_url(format!("{}{}", server.uri(), PAGE_PATH));
    let fetcher = HttpPageFetcher::new(&config).unwrap();
    let pipeline = EtlPipeline::new(config);

    let mut out = Vec::new();
    let result = pipeline.run_reported(&fetcher, &mut out).await;

    assert_matches!(result, Err(EtlError::Fetch { .. }));
    assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", COMPAT_FAILURE_MESSAGE));
    assert!(!workspace.file("Largest_banks_data.csv").exists());
    assert!(!workspace.file("Banks.db").exists());

    let log = workspace.log_lines();
    assert_eq!(log.len(), 2);
    assert!(log[0].ends_with(MSG_PRELIMINARIES));
}

#[test_log::test(tokio::test)]
async fn test_missing_rate_file_stops_before_sinks() {
    let workspace = TestWorkspace::new(&fixtures::e2e_rates());
    std::fs::remove_file(workspace.file("exchange_rate.csv")).unwrap();

    let pipeline = EtlPipeline::new(workspace.config());
    let page = StaticPage::new("two_banks.html", fixtures::two_banks_page());
    let mut out = Vec::new();
    let result = pipeline.run_reported(&page, &mut out).await;

    assert_matches!(result, Err(EtlError::SourceUnavailable { .. }));
    assert!(!workspace.file("Largest_banks_data.csv").exists());
    // preliminaries, extraction, abort
    assert_eq!(workspace.log_lines().len(), 3);
}
