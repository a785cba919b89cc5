use std::path::PathBuf;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::error::ReelError;

fn scratch(name: &str) -> DownloadTarget {
    let dir = PathBuf::from("target").join("recorder_tests").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    DownloadTarget::new(dir)
}

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![10; 16],
        premultiplied: true,
    }
}

fn canvas() -> Canvas {
    Canvas {
        width: 2,
        height: 2,
    }
}

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

fn files_in(target: &DownloadTarget) -> Vec<PathBuf> {
    match std::fs::read_dir(target.dir()) {
        Ok(rd) => rd.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

struct RefusingSink;

impl FrameSink for RefusingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ReelResult<()> {
        Err(ReelError::capture("capture not supported"))
    }
    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> ReelResult<()> {
        unreachable!()
    }
    fn end(&mut self) -> ReelResult<()> {
        unreachable!()
    }
    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        Vec::new()
    }
    fn file_extension(&self) -> &'static str {
        "webm"
    }
}

/// Accepts `ok_frames` frames, then fails every push.
struct FlakySink {
    ok_frames: u64,
    chunks: Vec<Vec<u8>>,
}

impl FrameSink for FlakySink {
    fn begin(&mut self, _cfg: SinkConfig) -> ReelResult<()> {
        Ok(())
    }
    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> ReelResult<()> {
        if idx.0 >= self.ok_frames {
            return Err(ReelError::encode("pipe closed"));
        }
        self.chunks.push(vec![idx.0 as u8]);
        Ok(())
    }
    fn end(&mut self) -> ReelResult<()> {
        Ok(())
    }
    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.chunks)
    }
    fn file_extension(&self) -> &'static str {
        "webm"
    }
}

const DT30: f64 = 1.0 / 30.0;

/// Tick `rec` every `dt` seconds until it stops recording. Returns the tick count and outcome.
fn tick_until_done(rec: &mut Recorder, dt: f64) -> (usize, Option<RecordingOutcome>) {
    let f = frame();
    let mut ticks = 0;
    loop {
        ticks += 1;
        assert!(ticks <= 1000, "recording never finished");
        if let CaptureStatus::Finished(outcome) = rec.capture(&f, dt) {
            return (ticks, outcome);
        }
    }
}

#[test]
fn five_second_recording_delivers_one_file_after_150_frames() {
    let target = scratch("five_seconds");
    let mut rec = Recorder::new(target.clone());
    assert_eq!(rec.state(), RecorderState::Idle);

    assert!(rec
        .start(canvas(), fps30(), 5, Box::new(InMemorySink::new()))
        .unwrap());
    assert_eq!(rec.state(), RecorderState::Recording);
    assert_eq!(rec.remaining_frames(), Some(150));

    let f = frame();
    for i in 0..149u64 {
        match rec.capture(&f, DT30) {
            CaptureStatus::Captured { pushed, remaining } => {
                assert_eq!(pushed, 1, "tick {i}");
                assert_eq!(remaining, 149 - i);
            }
            other => panic!("unexpected status at frame {i}: {other:?}"),
        }
    }
    let CaptureStatus::Finished(Some(outcome)) = rec.capture(&f, DT30) else {
        panic!("150th frame should finish the recording");
    };

    assert_eq!(outcome.frames, 150);
    assert!((outcome.elapsed_secs - 5.0).abs() < 1e-9);
    assert_eq!(outcome.bytes, 150 * 16);
    assert!(outcome.error.is_none());
    assert_eq!(rec.state(), RecorderState::Idle);
    assert_eq!(rec.last_outcome(), Some(&outcome));
    assert_eq!(files_in(&target), vec![outcome.path.clone()]);
    assert_eq!(std::fs::metadata(&outcome.path).unwrap().len(), 150 * 16);

    assert_eq!(rec.capture(&f, DT30), CaptureStatus::Idle);
}

#[test]
fn fast_ticks_still_record_five_seconds() {
    let mut rec = Recorder::new(scratch("sixty_hz"));
    rec.start(canvas(), fps30(), 5, Box::new(InMemorySink::new()))
        .unwrap();

    let f = frame();
    assert!(matches!(
        rec.capture(&f, 1.0 / 60.0),
        CaptureStatus::Captured { pushed: 1, .. }
    ));
    assert!(matches!(
        rec.capture(&f, 1.0 / 60.0),
        CaptureStatus::Captured { pushed: 0, .. }
    ));

    let (ticks, outcome) = tick_until_done(&mut rec, 1.0 / 60.0);
    let outcome = outcome.unwrap();
    assert_eq!(ticks + 2, 300);
    assert_eq!(outcome.frames, 150);
    assert!((outcome.elapsed_secs - 5.0).abs() < 1e-9);
    assert_eq!(outcome.bytes, 150 * 16);
}

#[test]
fn slow_ticks_repeat_frames_to_fill_the_duration() {
    let mut rec = Recorder::new(scratch("twenty_hz"));
    rec.start(canvas(), fps30(), 5, Box::new(InMemorySink::new()))
        .unwrap();

    let (ticks, outcome) = tick_until_done(&mut rec, 1.0 / 20.0);
    let outcome = outcome.unwrap();
    assert_eq!(ticks, 100);
    assert_eq!(outcome.frames, 150);
    assert!((outcome.elapsed_secs - 5.0).abs() < 1e-9);
    assert_eq!(outcome.bytes, 150 * 16);
}

#[test]
fn one_long_tick_fills_the_whole_recording() {
    let mut rec = Recorder::new(scratch("long_tick"));
    rec.start(canvas(), fps30(), 3, Box::new(InMemorySink::new()))
        .unwrap();
    let CaptureStatus::Finished(Some(outcome)) = rec.capture(&frame(), 10.0) else {
        panic!("a tick past the duration should finish the recording");
    };
    assert_eq!(outcome.frames, 90);
}

#[test]
fn zero_and_invalid_deltas_do_not_advance_the_timer() {
    let mut rec = Recorder::new(scratch("zero_delta"));
    rec.start(canvas(), fps30(), 3, Box::new(InMemorySink::new()))
        .unwrap();
    let f = frame();
    assert!(matches!(
        rec.capture(&f, 0.0),
        CaptureStatus::Captured { pushed: 1, remaining: 89 }
    ));
    for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            rec.capture(&f, dt),
            CaptureStatus::Captured { pushed: 0, remaining: 89 }
        ));
    }
    assert_eq!(rec.elapsed_secs(), Some(0.0));
}

#[test]
fn start_while_recording_is_a_no_op() {
    let target = scratch("double_start");
    let mut rec = Recorder::new(target);
    assert!(rec
        .start(canvas(), fps30(), 3, Box::new(InMemorySink::new()))
        .unwrap());
    rec.capture(&frame(), DT30);
    assert!(!rec
        .start(canvas(), fps30(), 3, Box::new(InMemorySink::new()))
        .unwrap());
    assert_eq!(rec.remaining_frames(), Some(89));
}

#[test]
fn failed_start_delivers_nothing() {
    let target = scratch("refused");
    let mut rec = Recorder::new(target.clone());
    assert!(rec
        .start(canvas(), fps30(), 5, Box::new(RefusingSink))
        .is_err());
    assert_eq!(rec.state(), RecorderState::Failed);
    assert!(rec.last_error().unwrap().contains("capture not supported"));
    assert!(!rec.is_recording());
    assert_eq!(rec.capture(&frame(), DT30), CaptureStatus::Idle);
    assert!(files_in(&target).is_empty());

    assert!(rec
        .start(canvas(), fps30(), 3, Box::new(InMemorySink::new()))
        .unwrap());
    assert!(rec.last_error().is_none());
}

#[test]
fn push_failure_delivers_what_was_captured() {
    let target = scratch("flaky");
    let mut rec = Recorder::new(target.clone());
    let sink = FlakySink {
        ok_frames: 3,
        chunks: Vec::new(),
    };
    rec.start(canvas(), fps30(), 5, Box::new(sink)).unwrap();
    let f = frame();
    for _ in 0..3 {
        assert!(matches!(rec.capture(&f, DT30), CaptureStatus::Captured { .. }));
    }
    let CaptureStatus::Finished(Some(outcome)) = rec.capture(&f, DT30) else {
        panic!("a failed push should finalize");
    };
    assert_eq!(outcome.frames, 3);
    assert_eq!(std::fs::read(&outcome.path).unwrap(), vec![0, 1, 2]);
    assert!(outcome.error.as_deref().unwrap().contains("pipe closed"));
    assert_eq!(rec.state(), RecorderState::Failed);
}

#[test]
fn stop_before_any_frame_delivers_nothing() {
    let target = scratch("early_stop");
    let mut rec = Recorder::new(target.clone());
    rec.start(canvas(), fps30(), 5, Box::new(InMemorySink::new()))
        .unwrap();
    assert_eq!(rec.stop(), None);
    assert_eq!(rec.state(), RecorderState::Idle);
    assert!(files_in(&target).is_empty());
    assert_eq!(rec.stop(), None);
}

#[test]
fn stop_midway_delivers_partial_recording() {
    let target = scratch("partial");
    let mut rec = Recorder::new(target);
    rec.start(canvas(), fps30(), 5, Box::new(InMemorySink::new()))
        .unwrap();
    for _ in 0..10 {
        rec.capture(&frame(), DT30);
    }
    let outcome = rec.stop().unwrap();
    assert_eq!(outcome.frames, 10);
    assert_eq!(outcome.path.extension().unwrap(), "rgba");
    assert!(!rec.is_recording());
}
