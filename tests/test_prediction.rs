//! Cost prediction from probe searches.

mod common;

use common::{origin, UniformSky};
use mockito::{Matcher, Server};
use std::sync::Arc;
use std::time::Duration;
use vo_conesearch::{Config, ConeSearch, SearchOptions, VoError};

const CONE: &str = "http://cone.example/search?";

fn predictor(sky: &Arc<UniformSky>, config: Config) -> ConeSearch {
    ConeSearch::with_service(config, sky.clone())
}

#[test]
fn test_prediction_against_actual_search() {
    let sky = Arc::new(
        UniformSky::new(10_000.0, Duration::from_millis(10))
            .with_row_cost(Duration::from_micros(500)),
    );
    let searcher = predictor(&sky, Config::default());
    let query = origin(0.1);

    let (t_1, tab_1) = searcher
        .conesearch_timer(&query, CONE, SearchOptions::default())
        .unwrap();
    let n_1 = tab_1.size();

    let (t_2, n_2) = searcher
        .predict_search(CONE, &query, SearchOptions::default())
        .unwrap();

    assert!(n_2 > 0 && n_2 as f64 <= n_1 as f64 * 1.5, "{} vs {}", n_2, n_1);
    assert!(t_2 > 0.0 && t_2 <= t_1 * 1.5, "{} vs {}", t_2, t_1);
}

#[test]
fn test_probes_never_use_full_radius() {
    let sky = Arc::new(UniformSky::new(400.0, Duration::ZERO));
    let searcher = predictor(&sky, Config::default());

    let (_, rows) = searcher
        .predict_search(CONE, &origin(0.5), SearchOptions::default())
        .unwrap();

    let radii = sky.radii();
    assert!(!radii.is_empty());
    assert!(radii.iter().all(|&sr| sr < 0.5));
    assert_eq!(rows, 100);
}

#[test]
fn test_zero_radius() {
    let sky = Arc::new(UniformSky::new(400.0, Duration::ZERO));
    let searcher = predictor(&sky, Config::default());

    let (seconds, rows) = searcher
        .predict_search(CONE, &origin(0.0), SearchOptions::default())
        .unwrap();

    assert_eq!(rows, 0);
    assert!(seconds >= 0.0);
    assert_eq!(sky.radii(), vec![0.0]);
}

#[test]
fn test_slow_probe_stops_probing() {
    let sky = Arc::new(UniformSky::new(400.0, Duration::from_millis(1100)));
    let searcher = predictor(&sky, Config::default().with_remote_timeout(1));

    let (seconds, _) = searcher
        .predict_search(CONE, &origin(1.0), SearchOptions::default())
        .unwrap();

    assert_eq!(sky.radii().len(), 1);
    assert!(seconds >= 1.1);
}

#[test]
fn test_probe_failure_is_returned() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/down")
        .match_query(Matcher::Any)
        .with_status(503)
        .create();

    let searcher = ConeSearch::new(Config::default().with_vos_baseurl(server.url()));
    let url = format!("{}/down?", server.url());
    let err = searcher
        .predict_search(&url, &origin(0.1), SearchOptions::default())
        .unwrap_err();

    assert!(matches!(err, VoError::Status { status: 503, .. }));
    mock.assert();
}
