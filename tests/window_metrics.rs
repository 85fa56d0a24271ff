// tests/window_metrics.rs
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use window_mean::metrics::{
    EVICTIONS_TOTAL, OBSERVATIONS, RECORDS_TOTAL, WINDOW_LABEL, WINDOW_MS,
};
use window_mean::{ManualClock, WindowedMean};

/// `(metric name, value of the `window` label, value)` for every series.
type Series = Vec<(String, Option<String>, DebugValue)>;

fn collect(snapshotter: &Snapshotter) -> Series {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _unit, _desc, value)| {
            let key = key.key();
            let window = key
                .labels()
                .find(|l| l.key() == WINDOW_LABEL)
                .map(|l| l.value().to_string());
            (key.name().to_string(), window, value)
        })
        .collect()
}

fn find<'a>(series: &'a Series, name: &str, window: &str) -> Option<&'a DebugValue> {
    series
        .iter()
        .find(|(n, w, _)| n == name && w.as_deref() == Some(window))
        .map(|(_, _, v)| v)
}

fn gauge(series: &Series, name: &str, window: &str) -> Option<f64> {
    match find(series, name, window) {
        Some(DebugValue::Gauge(g)) => Some(g.0),
        _ => None,
    }
}

#[test]
fn record_and_evict_update_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let clock = ManualClock::new(0);
        let w = WindowedMean::new(&clock, 2).unwrap();
        w.record(1);
        w.record(2);
        clock.advance(1);
        w.record(3);
        clock.advance(5);
        assert!(w.mean().is_none());
    });

    let series = collect(&snapshotter);

    assert!(
        matches!(
            find(&series, RECORDS_TOTAL, "default"),
            Some(DebugValue::Counter(3))
        ),
        "records: {series:?}"
    );
    assert!(
        matches!(
            find(&series, EVICTIONS_TOTAL, "default"),
            Some(DebugValue::Counter(3))
        ),
        "evictions: {series:?}"
    );
    assert_eq!(gauge(&series, OBSERVATIONS, "default"), Some(0.0));
    assert_eq!(gauge(&series, WINDOW_MS, "default"), Some(2.0));
}

#[test]
fn each_window_reports_its_own_series() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let clock = ManualClock::new(0);
        let a = WindowedMean::named(&clock, "a", 100).unwrap();
        let b = WindowedMean::named(&clock, "b", 40).unwrap();
        for v in 1..=5 {
            a.record(v);
        }
        b.record(9);
        assert_eq!((a.len(), b.len()), (5, 1));
    });

    let series = collect(&snapshotter);

    assert_eq!(gauge(&series, OBSERVATIONS, "a"), Some(5.0), "{series:?}");
    assert_eq!(gauge(&series, OBSERVATIONS, "b"), Some(1.0), "{series:?}");
    assert_eq!(gauge(&series, WINDOW_MS, "a"), Some(100.0));
    assert_eq!(gauge(&series, WINDOW_MS, "b"), Some(40.0));
    assert!(matches!(
        find(&series, RECORDS_TOTAL, "a"),
        Some(DebugValue::Counter(5))
    ));
    assert!(matches!(
        find(&series, RECORDS_TOTAL, "b"),
        Some(DebugValue::Counter(1))
    ));
}

#[test]
fn metrics_are_noops_without_recorder() {
    let clock = ManualClock::new(0);
    let w = WindowedMean::new(&clock, 10).unwrap();
    w.record(4);
    assert_eq!(w.mean(), Some(4.0));
}
