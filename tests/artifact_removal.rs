//! End-to-end artifact removal against an on-disk annotation store

use lytaf::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const START: i64 = 1359676800; // 2013-02-01T00:00:00Z

fn lyra_table() -> AnnotationTable {
    AnnotationTable::from_json_str(
        r#"{
            "event_types": [
                {"id": 1, "type": "LAR", "definition": "Large Angle Rotation."},
                {"id": 2, "type": "UV occ.", "definition": "Occultation in the UV spectrum."}
            ],
            "events": [
                {"insertion_time": 1371459961, "begin_time": 1359677220, "reference_time": 1359677250, "end_time": 1359677400, "type": 1},
                {"insertion_time": 1371460063, "begin_time": 1359681764, "reference_time": 1359682450, "end_time": 1359683136, "type": 2}
            ]
        }"#,
    )
    .unwrap()
}

fn minutes(n: i64) -> Vec<Timestamp> {
    (0..n).map(|i| Timestamp::from_secs(START + 60 * i)).collect()
}

fn local_db(dir: &TempDir) -> LytafDB {
    let config = LytafConfig {
        data_dir: dir.path().to_path_buf(),
        default_sources: vec![LytafSource::Lyra],
        cache_policy: CachePolicy::LocalOnly,
        ..LytafConfig::default()
    };
    AnnotationStore::open(&config.data_dir)
        .unwrap()
        .import(LytafSource::Lyra, &lyra_table())
        .unwrap();
    LytafDB::open(&config).unwrap()
}

#[test]
fn scenario_a_partial_match() {
    let dir = TempDir::new().unwrap();
    let db = local_db(&dir);
    let time = minutes(120);
    let channels = vec![vec![0.5; 120], vec![1.5; 120]];
    let selector = ArtifactSelector::from(vec!["LAR", "Offpoint"]);

    let out = db
        .remove_events(
            &time,
            Some(channels.as_slice()),
            Some(&selector),
            &[],
            FilterOptions::with_report(),
        )
        .unwrap();

    assert_eq!(out.removed_samples, 4);
    assert_eq!(out.time.len(), 116);
    assert!(out.time.iter().all(|t| {
        let secs = t.as_secs();
        !(1359677220..=1359677400).contains(&secs)
    }));
    let channels = out.channels.unwrap();
    assert_eq!(channels.len(), 2);
    assert!(channels.iter().all(|c| c.len() == 116));
    assert!(out.warning.is_none());

    let report = out.report.unwrap();
    assert_eq!(report.lytaf.len(), 2);
    assert_eq!(report.removed.event_types(), vec!["LAR"]);
    assert_eq!(report.not_removed.event_types(), vec!["UV occ."]);
    assert_eq!(report.not_found, vec!["Offpoint".to_string()]);

    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    for key in ["lytaf", "removed", "not_removed", "not_found"] {
        assert!(json.get(key).is_some(), "report is missing {}", key);
    }
}

#[test]
fn scenario_a_lar_outside_series_not_removed() {
    let dir = TempDir::new().unwrap();
    let db = local_db(&dir);
    // starts one second after the LAR period ends
    let time: Vec<Timestamp> = (0..120)
        .map(|i| Timestamp::from_secs(1359677400 + 1 + 60 * i))
        .collect();
    let selector = ArtifactSelector::from(vec!["LAR", "UV occ."]);

    let range = TimeRange::new(Timestamp::from_secs(1359677000), *time.last().unwrap()).unwrap();
    let catalogue = db.get_events(&range, &[]).unwrap();
    assert_eq!(catalogue.len(), 2);

    let out = remove_events(
        &time,
        None,
        &catalogue,
        Some(&selector),
        &EventVocabulary::lyra(),
        FilterOptions::with_report(),
    )
    .unwrap();
    let report = out.report.unwrap();
    assert_eq!(report.removed.event_types(), vec!["UV occ."]);
    assert_eq!(report.not_removed.event_types(), vec!["LAR"]);
    assert!(report.not_found.is_empty());
}

#[test]
fn scenario_b_nothing_found() {
    let dir = TempDir::new().unwrap();
    let db = local_db(&dir);
    let time = minutes(120);

    let out = db
        .remove_events(
            &time,
            None,
            Some(&ArtifactSelector::from("Offpoint")),
            &[],
            FilterOptions::with_report(),
        )
        .unwrap();

    assert_eq!(out.warning, Some(FilterWarning::NothingFound));
    assert_eq!(out.time, time);
    assert_eq!(out.removed_samples, 0);
    let report = out.report.unwrap();
    assert!(report.removed.is_empty());
    assert_eq!(report.not_removed, report.lytaf);
    assert_eq!(report.not_found, vec!["Offpoint".to_string()]);
}

#[test]
fn scenario_c_invalid_inputs() {
    let dir = TempDir::new().unwrap();
    let db = local_db(&dir);
    let time = minutes(120);

    let err = db
        .remove_events(
            &time,
            None,
            Some(&ArtifactSelector::from(12i64)),
            &[],
            FilterOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArtifact(_)));

    let err = db
        .remove_events(
            &time,
            None,
            Some(&ArtifactSelector::from(vec!["LAR", "incorrect artifact type"])),
            &[],
            FilterOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArtifact(_)));

    // code 6 is SAA, which is valid but absent here
    let out = db
        .remove_events(
            &time,
            None,
            Some(&ArtifactSelector::from(6i64)),
            &[],
            FilterOptions::with_report(),
        )
        .unwrap();
    assert_eq!(out.report.unwrap().not_found, vec!["SAA".to_string()]);

    let short = vec![vec![1.0; 119]];
    let err = db
        .remove_events(
            &time,
            Some(short.as_slice()),
            Some(&ArtifactSelector::from("LAR")),
            &[],
            FilterOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::ChannelShape(_)));

    let err = db
        .remove_events(&time, None, None, &[], FilterOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArtifact(_)));

    assert!(matches!(
        ArtifactSelector::parse("LAR, 6.5"),
        Err(Error::InvalidSelectorType(_))
    ));
}

#[test]
fn scenario_d_translate() {
    let codes: Vec<i64> = (0..=11).collect();
    assert_eq!(
        translate(&codes),
        vec![
            "LAR",
            "N/A",
            "UV occult.",
            "Vis. occult.",
            "Offpoint",
            "SAA",
            "Auroral zone",
            "Moon in LYRA",
            "Moon in SWAP",
            "Venus in LYRA",
            "Venus in SWAP",
        ]
    );
    assert_eq!(translate(&[1]), vec!["LAR"]);
}

#[test]
fn split_series_through_store() {
    let dir = TempDir::new().unwrap();
    let db = local_db(&dir);
    let time = minutes(120);
    let data: Vec<f64> = (0..120).map(f64::from).collect();

    let segments = db.split_series(&time, &data, &[]).unwrap();
    // LAR removes minutes 7..=10, UV occ. minutes 83..=105
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].subdata.last(), Some(&6.0));
    assert_eq!(segments[1].subdata.first(), Some(&11.0));
    assert_eq!(segments[1].subdata.last(), Some(&82.0));
    assert_eq!(segments[2].subdata.first(), Some(&106.0));
}

#[test]
fn missing_source_is_not_available() {
    let dir = TempDir::new().unwrap();
    let db = local_db(&dir);
    let range = TimeRange::spanning(&minutes(10)).unwrap();
    let err = db.get_events(&range, &[LytafSource::Science]).unwrap_err();
    assert!(matches!(err, Error::NotAvailable(_)));
}

#[test]
fn corrupt_unrequested_source_is_not_read() {
    let dir = TempDir::new().unwrap();
    let db = local_db(&dir);
    std::fs::write(dir.path().join("annotation_science.lytaf"), b"not an annotation file").unwrap();

    let out = db
        .remove_events(
            &minutes(20),
            None,
            Some(&ArtifactSelector::from("LAR")),
            &[LytafSource::Lyra],
            FilterOptions::default(),
        )
        .unwrap();
    assert_eq!(out.removed_samples, 4);

    let err = db
        .remove_events(
            &minutes(20),
            None,
            Some(&ArtifactSelector::from("LAR")),
            &[LytafSource::Lyra, LytafSource::Science],
            FilterOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)), "{:?}", err);
}

#[test]
fn bad_code_rejected_before_missing_source() {
    let dir = TempDir::new().unwrap();
    let db = local_db(&dir);

    let err = db
        .remove_events(
            &minutes(20),
            None,
            Some(&ArtifactSelector::from(12i64)),
            &[LytafSource::Science],
            FilterOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArtifact(_)), "{:?}", err);

    let err = db
        .remove_events(&minutes(20), None, None, &[LytafSource::Science], FilterOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArtifact(_)), "{:?}", err);
}

struct CountingFetcher {
    calls: Arc<AtomicUsize>,
}

impl RemoteFetcher for CountingFetcher {
    fn fetch(&self, _source: LytafSource) -> Result<AnnotationTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(lyra_table())
    }
}

#[test]
fn prefer_local_fetches_once() {
    let dir = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let store = AnnotationStore::open(dir.path())
        .unwrap()
        .with_policy(CachePolicy::PreferLocal)
        .with_fetcher(CountingFetcher {
            calls: Arc::clone(&calls),
        });
    let db = LytafDB::new(store).with_default_sources(&[LytafSource::Lyra]);
    // Two hours from 00:00, wider than the stored events on both sides
    let time = minutes(120);
    let selector = ArtifactSelector::from("LAR");

    for _ in 0..3 {
        let out = db
            .remove_events(&time, None, Some(&selector), &[], FilterOptions::default())
            .unwrap();
        assert_eq!(out.removed_samples, 4);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(dir.path().join("annotation_lyra.lytaf").exists());
}

#[test]
fn default_config_filters_from_local_copy() {
    let dir = TempDir::new().unwrap();
    AnnotationStore::open(dir.path())
        .unwrap()
        .import(LytafSource::Lyra, &lyra_table())
        .unwrap();
    let config = LytafConfig {
        data_dir: dir.path().to_path_buf(),
        default_sources: vec![LytafSource::Lyra],
        ..LytafConfig::default()
    };
    assert_eq!(config.cache_policy, CachePolicy::PreferLocal);
    let db = LytafDB::open(&config).unwrap();

    let out = db
        .remove_events(
            &minutes(20),
            None,
            Some(&ArtifactSelector::from("LAR")),
            &[],
            FilterOptions::default(),
        )
        .unwrap();
    assert_eq!(out.removed_samples, 4);
    assert_eq!(out.time.len(), 16);
}

#[test]
fn force_remote_fetches_requested_source_once_per_call() {
    let dir = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let store = AnnotationStore::open(dir.path())
        .unwrap()
        .with_policy(CachePolicy::ForceRemote)
        .with_fetcher(CountingFetcher {
            calls: Arc::clone(&calls),
        });
    let db = LytafDB::new(store).with_default_sources(&[LytafSource::Lyra]);
    let selector = ArtifactSelector::from("UV occ.");

    for _ in 0..2 {
        let out = db
            .remove_events(&minutes(120), None, Some(&selector), &[], FilterOptions::default())
            .unwrap();
        assert_eq!(out.removed_samples, 23);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
