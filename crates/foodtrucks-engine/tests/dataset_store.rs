//! Integration tests for `DatasetStore` against real CSV files and under
//! concurrent reload/read traffic.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use foodtrucks_core::{SearchCriteria, SearchQuery, StatusFilter};
use foodtrucks_engine::{
    execute, CsvFileSource, DatasetStore, EngineError, LoadOutcome, RawRow, RecordSource,
    SourceRows,
};

const PERMITS_CSV: &str = "\
locationid,Applicant,FacilityType,cnn,LocationDescription,Address,blocklot,Status,FoodItems,X,Y,Latitude,Longitude
1,Taco A,Truck,1,MISSION ST: 1ST to 2ND,1 MISSION ST,0001,APPROVED,Tacos,1,1,37.7936,-122.3951
2,Taco B,Truck,2,MARKET ST: 1ST to 2ND,2 MARKET ST,0002,REQUESTED,Burritos,1,1,37.7921,-122.3977
3,Coffee Cart,Push Cart,3,,3 FOLSOM ST,0003,APPROVED,Coffee,0,0,0,0
,Nameless,Truck,4,,4 HOWARD ST,0004,APPROVED,Soup,1,1,37.78,-122.40
";

fn temp_csv(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("foodtrucks-{}.csv", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).expect("write temp csv");
    path
}

fn by_name(applicant: &str) -> SearchQuery {
    SearchQuery::new(SearchCriteria::Name {
        applicant: applicant.to_string(),
    })
}

// ---------------------------------------------------------------------------
// CSV-backed loads
// ---------------------------------------------------------------------------

#[test]
fn load_from_csv_maps_rows_and_drops_invalid_ones() {
    let path = temp_csv(PERMITS_CSV);
    let store = DatasetStore::new(CsvFileSource::new(&path));

    let outcome = store.load();
    std::fs::remove_file(&path).ok();

    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            records: 3,
            dropped_rows: 1
        }
    );
    assert!(store.is_available());

    let snapshot = store.current_snapshot();
    let coffee = snapshot
        .records()
        .iter()
        .find(|r| r.applicant == "Coffee Cart")
        .expect("coffee cart loaded");
    assert!(coffee.coordinates().is_none(), "(0, 0) is a placeholder");
    assert!(coffee.location_description.is_none());

    let approved = execute(&snapshot, &by_name("taco").with_status(StatusFilter::Approved))
        .expect("search");
    assert_eq!(approved.data.len(), 1);
    assert_eq!(approved.data[0].location_id, "1");
}

#[test]
fn undecodable_row_is_dropped_without_failing_the_load() {
    let path = std::env::temp_dir().join(format!("foodtrucks-{}.csv", uuid::Uuid::new_v4()));
    let mut contents = b"locationid,Applicant,Address,Status\n".to_vec();
    contents.extend_from_slice(b"1,Taco A,1 MISSION ST,APPROVED\n");
    contents.extend_from_slice(b"2,Caf\xe9 Latte,2 MARKET ST,APPROVED\n");
    contents.extend_from_slice(b"3,Taco B,3 FOLSOM ST,APPROVED\n");
    std::fs::write(&path, contents).expect("write csv");
    let store = DatasetStore::new(CsvFileSource::new(&path));

    let outcome = store.load();
    std::fs::remove_file(&path).ok();

    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            records: 2,
            dropped_rows: 1
        }
    );
    assert!(store.is_available());
    assert_eq!(store.status().dropped_rows, 1);
    let result = execute(&store.current_snapshot(), &by_name("taco")).expect("search");
    assert_eq!(result.data.len(), 2);
}

#[test]
fn missing_csv_leaves_store_empty_and_unavailable() {
    let store = DatasetStore::new(CsvFileSource::new(
        std::env::temp_dir().join(format!("missing-{}.csv", uuid::Uuid::new_v4())),
    ));

    let outcome = store.load();
    assert!(matches!(outcome, LoadOutcome::SourceUnavailable { .. }));
    assert!(!store.is_available());
    assert!(store.current_snapshot().is_empty());
}

#[test]
fn reload_recovers_once_source_appears() {
    let path = std::env::temp_dir().join(format!("foodtrucks-{}.csv", uuid::Uuid::new_v4()));
    let store = DatasetStore::new(CsvFileSource::new(&path));

    assert!(!store.reload().is_loaded());
    assert!(!store.is_available());

    std::fs::write(&path, PERMITS_CSV).expect("write csv");
    assert!(store.reload().is_loaded());
    std::fs::remove_file(&path).ok();

    assert!(store.is_available());
    assert_eq!(store.current_snapshot().len(), 3);
}

#[test]
fn reload_picks_up_changed_file_contents() {
    let path = temp_csv(PERMITS_CSV);
    let store = DatasetStore::new(CsvFileSource::new(&path));
    store.load();
    let before = store.current_snapshot();

    std::fs::write(
        &path,
        "locationid,Applicant,Address,Status\n9,Late Night Noodles,9 MISSION ST,APPROVED\n",
    )
    .expect("rewrite csv");
    store.reload();
    std::fs::remove_file(&path).ok();

    let after = store.current_snapshot();
    assert_eq!(before.len(), 3, "held snapshot is unchanged");
    assert_eq!(after.len(), 1);
    assert_eq!(after.records()[0].applicant, "Late Night Noodles");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

/// Source that blocks inside `read_rows` until released, so a test can hold
/// a load in flight.
struct GatedSource {
    rows: Vec<RawRow>,
    entered: Mutex<Option<mpsc::Sender<()>>>,
    release: Mutex<Option<mpsc::Receiver<()>>>,
    reads: Arc<AtomicUsize>,
}

impl RecordSource for GatedSource {
    fn name(&self) -> String {
        "gated".to_string()
    }

    fn read_rows(&self) -> Result<SourceRows, EngineError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(entered) = self.entered.lock().unwrap().take() {
            entered.send(()).ok();
        }
        if let Some(release) = self.release.lock().unwrap().take() {
            release.recv().ok();
        }
        Ok(self.rows.clone().into())
    }
}

fn rows(n: usize) -> Vec<RawRow> {
    (0..n)
        .map(|i| {
            HashMap::from([
                ("locationid".to_string(), i.to_string()),
                ("Applicant".to_string(), format!("Truck {i}")),
                ("Status".to_string(), "APPROVED".to_string()),
                ("Address".to_string(), format!("{i} MISSION ST")),
                ("Latitude".to_string(), "37.77".to_string()),
                ("Longitude".to_string(), "-122.42".to_string()),
            ])
        })
        .collect()
}

#[test]
fn reload_while_another_is_in_flight_is_skipped() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let reads = Arc::new(AtomicUsize::new(0));
    let store = Arc::new(DatasetStore::new(GatedSource {
        rows: rows(3),
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(Some(release_rx)),
        reads: Arc::clone(&reads),
    }));

    let first = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.reload())
    };
    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("first reload reached the source");

    assert_eq!(store.reload(), LoadOutcome::Skipped);
    assert_eq!(store.load(), LoadOutcome::Skipped);
    assert!(store.last_reload().is_none(), "skipped reload leaves the stamp alone");

    release_tx.send(()).expect("release first reload");
    let outcome = first.join().expect("first reload thread");
    assert!(outcome.is_loaded());
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(store.current_snapshot().len(), 3);
    assert!(store.last_reload().is_some());
}

#[test]
fn readers_never_observe_partial_datasets_during_reloads() {
    const RECORDS: usize = 250;
    let reads = Arc::new(AtomicUsize::new(0));
    let store = Arc::new(DatasetStore::new(GatedSource {
        rows: rows(RECORDS),
        entered: Mutex::new(None),
        release: Mutex::new(None),
        reads,
    }));
    store.load();

    let barrier = Arc::new(Barrier::new(6));
    let mut handles = Vec::new();

    for _ in 0..2 {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..50 {
                store.reload();
            }
        }));
    }

    for _ in 0..4 {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..500 {
                let snapshot = store.current_snapshot();
                assert_eq!(snapshot.len(), RECORDS, "snapshot must be complete");
                let result = execute(&snapshot, &by_name("truck").with_limit(100))
                    .expect("search");
                assert_eq!(result.data.len(), 100);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("worker thread");
    }
    assert!(store.is_available());
}
