use gazeplay_core::{GazeSignalProcessor, IngestOutcome, RawSample};

fn sample(x: f32, y: f32, fixation: f32, ts: f64) -> RawSample {
    RawSample::at(x, y, fixation, ts)
}

fn calibrating(x: f32, y: f32, progress: u32) -> RawSample {
    RawSample {
        calibrating: true,
        calibration_progress: progress,
        ..sample(x, y, 0.0, 0.0)
    }
}

#[test]
fn output_is_linearly_weighted_toward_newest() {
    let xs = [0.0_f32, 300.0, 40.0, 500.0, 120.0, 800.0, 10.0, 640.0];
    let fx = [0.1_f32, 0.9, 0.3, 0.7, 0.2, 0.8, 0.4, 0.6];

    for n in 1..=xs.len() {
        let mut p = GazeSignalProcessor::new();
        for i in 0..n {
            // calibrating bypasses the dead zone so every estimate is emitted
            let s = RawSample {
                fixation: fx[i],
                ..calibrating(xs[i], xs[i] / 2.0, 0)
            };
            p.ingest(&s);
        }
        let weights: f64 = (1..=n).map(|w| w as f64).sum();
        let wx: f64 = (0..n).map(|i| (i + 1) as f64 * xs[i] as f64).sum::<f64>() / weights;
        let wy: f64 = (0..n).map(|i| (i + 1) as f64 * xs[i] as f64 / 2.0).sum::<f64>() / weights;
        let wf: f64 = (0..n).map(|i| (i + 1) as f64 * fx[i] as f64).sum::<f64>() / weights;

        let out = p.current();
        assert_eq!(out.x as f64, (wx + 0.5).floor(), "x with n={n}");
        assert_eq!(out.y as f64, (wy + 0.5).floor(), "y with n={n}");
        assert!((out.fixation as f64 - wf).abs() < 1e-5, "fixation with n={n}");
    }
}

#[test]
fn small_moves_keep_previous_position() {
    let mut p = GazeSignalProcessor::new();
    assert_eq!(p.ingest(&sample(100.0, 100.0, 0.5, 0.0)), IngestOutcome::Accepted);
    // weighted estimate (100 + 2*105) / 3 rounds to 103, within the dead zone
    assert_eq!(p.ingest(&sample(105.0, 105.0, 0.5, 16.0)), IngestOutcome::Suppressed);
    let out = p.current();
    assert_eq!((out.x, out.y), (100.0, 100.0));
    assert_eq!(out.timestamp_ms, 16.0);
}

#[test]
fn suppressed_estimates_do_not_move_the_anchor() {
    let mut p = GazeSignalProcessor::new();
    p.ingest(&sample(100.0, 100.0, 0.5, 0.0));
    // estimate 112: suppressed against 100
    assert_eq!(p.ingest(&sample(118.0, 118.0, 0.5, 16.0)), IngestOutcome::Suppressed);
    // estimate 121: 21 away from the anchor (100), only 9 from the suppressed 112
    assert_eq!(p.ingest(&sample(130.0, 130.0, 0.5, 32.0)), IngestOutcome::Accepted);
    assert_eq!((p.current().x, p.current().y), (121.0, 121.0));
}

#[test]
fn one_axis_past_the_dead_zone_is_a_real_move() {
    let mut p = GazeSignalProcessor::new();
    p.ingest(&sample(100.0, 100.0, 0.5, 0.0));
    // x estimate (100 + 2*160) / 3 = 140, y unchanged
    assert_eq!(p.ingest(&sample(160.0, 100.0, 0.5, 16.0)), IngestOutcome::Accepted);
    assert_eq!((p.current().x, p.current().y), (140.0, 100.0));
}

#[test]
fn calibrating_samples_are_never_suppressed() {
    let mut p = GazeSignalProcessor::new();
    p.ingest(&calibrating(100.0, 100.0, 1));
    assert_eq!(p.ingest(&calibrating(103.0, 100.0, 2)), IngestOutcome::Accepted);
    assert_eq!(p.current().x, 102.0);
}

#[test]
fn history_keeps_the_last_eight_samples() {
    let mut p = GazeSignalProcessor::new();
    for i in 0..20 {
        p.ingest(&sample(i as f32 * 50.0, 0.0, 0.5, i as f64));
        assert!(p.history().len() <= 8);
    }
    let kept: Vec<f64> = p.history().map(|e| e.timestamp_ms).collect();
    assert_eq!(kept, (12..20).map(|i| i as f64).collect::<Vec<_>>());
}

#[test]
fn malformed_sample_changes_nothing() {
    let mut p = GazeSignalProcessor::new();
    p.ingest(&sample(200.0, 300.0, 0.7, 5.0));
    let before = p.current();

    assert_eq!(p.ingest(&sample(f32::NAN, 10.0, 1.0, 6.0)), IngestOutcome::Ignored);
    assert_eq!(p.ingest(&sample(10.0, f32::INFINITY, 1.0, 7.0)), IngestOutcome::Ignored);
    assert_eq!(p.current(), before);
    assert_eq!(p.history().len(), 1);
}

#[test]
fn fixation_is_averaged_without_clamping() {
    let mut p = GazeSignalProcessor::new();
    p.ingest(&sample(0.0, 0.0, 2.0, 0.0));
    assert_eq!(p.current().fixation, 2.0);
}

#[test]
fn calibration_completion_is_reported_once() {
    let mut p = GazeSignalProcessor::new();
    p.ingest(&calibrating(0.0, 0.0, 30));
    assert!(p.calibration().active);
    assert_eq!(p.calibration().progress, 30);
    assert!((p.calibration().percent() - 50.0).abs() < 1e-9);
    assert!(!p.take_calibration_complete());

    p.ingest(&sample(0.0, 0.0, 0.5, 16.0));
    assert!(!p.calibration().active);
    assert!(p.take_calibration_complete());
    assert!(!p.take_calibration_complete());

    // staying out of calibration does not re-arm the signal
    p.ingest(&sample(0.0, 0.0, 0.5, 32.0));
    assert!(!p.take_calibration_complete());
}
