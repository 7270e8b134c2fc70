//! Pipeline integration tests
//!
//! Segment resolution and the join executor, run against a fake encoder.

mod common;

use common::{entries, Card, FakeRunner, Failure};
use pictjoin::pipeline::{EncodeJob, JoinExecutor};
use pictjoin::segments::{self, RangeSpec};
use pictjoin_av::{EncodeSettings, Error, Workspace};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn job(card: &Card, range: &str, output: &Path) -> EncodeJob {
    let spec: RangeSpec = range.parse().unwrap();
    let resolved = segments::resolve(card.root(), &spec).unwrap();
    EncodeJob::new(
        resolved,
        output.to_path_buf(),
        PathBuf::from("/opt/ffmpeg/bin/ffmpeg"),
        EncodeSettings::default(),
    )
    .unwrap()
}

#[test]
fn test_resolve_closed_range_in_order() {
    let card = Card::with_segments(&[0, 1, 2, 3, 4, 5]);
    let resolved = segments::resolve(card.root(), &"1:4".parse().unwrap()).unwrap();

    assert_eq!(resolved.files.len(), 4);
    let indices: Vec<u32> = resolved.files.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert_eq!(resolved.files[0].path, card.segment(1));
}

#[test]
fn test_resolve_open_bounds_use_first_and_last_recording() {
    let card = Card::with_segments(&[7, 8, 9]);

    let all = segments::resolve(card.root(), &":".parse().unwrap()).unwrap();
    assert_eq!(all.range.to_string(), "7:9");

    let tail = segments::resolve(card.root(), &"8:".parse().unwrap()).unwrap();
    assert_eq!(tail.files.len(), 2);

    let head = segments::resolve(card.root(), &":7".parse().unwrap()).unwrap();
    assert_eq!(head.files.len(), 1);
}

#[test]
fn test_resolve_reports_missing_segment() {
    let card = Card::with_segments(&[0, 1, 2, 4, 5]);
    let err = segments::resolve(card.root(), &"0:5".parse().unwrap()).unwrap_err();

    match &err {
        Error::SegmentMissing { missing, .. } => assert_eq!(missing, &["PICT0003.AVI"]),
        other => panic!("expected SegmentMissing, got {other:?}"),
    }
    assert!(err.to_string().contains("PICT0003.AVI"));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_resolve_typo_range_keeps_error_short() {
    let card = Card::with_segments(&[0, 1]);
    let err = segments::resolve(card.root(), &"0:2000000".parse().unwrap()).unwrap_err();

    match &err {
        Error::SegmentMissing { missing, total, .. } => {
            assert_eq!(*total, 1_999_999);
            assert_eq!(missing.len(), segments::MISSING_LISTED);
            assert_eq!(missing[0], "PICT0002.AVI");
        }
        other => panic!("expected SegmentMissing, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.len() < 10_000, "{} bytes", msg.len());
    assert!(msg.contains("1999999 missing"));
}

#[test]
fn test_resolve_missing_layout() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("DCIM")).unwrap();

    let err = segments::resolve(dir.path(), &"0:1".parse().unwrap()).unwrap_err();
    match err {
        Error::DirectoryNotFound { path } => assert!(path.ends_with("DCIM/100DSCIM")),
        other => panic!("expected DirectoryNotFound, got {other:?}"),
    }
}

#[test]
fn test_resolve_open_range_on_empty_card() {
    let card = Card::with_segments(&[]);
    card.add("README.TXT");
    let err = segments::resolve(card.root(), &":".parse().unwrap()).unwrap_err();
    assert!(matches!(err, Error::NoSegments { .. }));
}

#[tokio::test]
async fn test_executor_runs_stages_in_order() {
    let card = Card::with_segments(&[2, 3, 4]);
    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("flight.mkv");
    let job = job(&card, "2:4", &output);

    let workspace = Workspace::new(&output, None).unwrap();
    let work_dir = workspace.temp_dir().to_path_buf();
    let runner = Arc::new(FakeRunner::new());

    let result = JoinExecutor::new(workspace, runner.clone())
        .execute(&job)
        .await
        .unwrap();
    assert_eq!(result, output);

    let commands = runner.commands();
    assert_eq!(commands.len(), 5);
    for (i, index) in [2, 3, 4].into_iter().enumerate() {
        let args = commands[i].get_args();
        assert!(args.iter().any(|a| a == card.segment(index).as_os_str()));
        assert!(args.iter().any(|a| a == "ffv1"));
    }
    assert!(commands[3].get_args().iter().any(|a| a == "concat"));
    assert!(commands[4].get_args().iter().any(|a| a == "libx264"));
    assert!(commands
        .iter()
        .all(|c| c.program() == Path::new("/opt/ffmpeg/bin/ffmpeg")));

    // The concat step saw every intermediate, in order
    let manifests = runner.manifests();
    assert_eq!(manifests.len(), 1);
    let listed: Vec<&str> = manifests[0].lines().collect();
    assert_eq!(listed.len(), 3);
    assert!(listed[0].ends_with("segment000.mkv'"));
    assert!(listed[2].ends_with("segment002.mkv'"));

    assert_eq!(fs::read(&output).unwrap(), b"fake media");
    assert!(!work_dir.exists());
    assert_eq!(entries(out_dir.path()), 1);
}

#[tokio::test]
async fn test_executor_replaces_existing_output() {
    let card = Card::with_segments(&[0]);
    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("flight.mp4");
    fs::write(&output, b"previous run").unwrap();
    let job = job(&card, "0:0", &output);

    let workspace = Workspace::new(&output, None).unwrap();
    JoinExecutor::new(workspace, Arc::new(FakeRunner::new()))
        .execute(&job)
        .await
        .unwrap();

    assert_eq!(fs::read(&output).unwrap(), b"fake media");
}

#[tokio::test]
async fn test_executor_keeps_existing_output_without_overwrite() {
    let card = Card::with_segments(&[0]);
    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("flight.mkv");
    fs::write(&output, b"previous run").unwrap();
    let job = job(&card, "0:0", &output);

    let workspace = Workspace::new(&output, None).unwrap();
    let err = JoinExecutor::new(workspace, Arc::new(FakeRunner::new()))
        .overwrite(false)
        .execute(&job)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OutputWriteFailed { .. }));
    assert_eq!(fs::read(&output).unwrap(), b"previous run");
    assert_eq!(entries(out_dir.path()), 1);
}

#[tokio::test]
async fn test_failed_stage_leaves_no_output() {
    let card = Card::with_segments(&[0, 1]);
    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("flight.mkv");
    let job = job(&card, "0:1", &output);

    let workspace = Workspace::new(&output, None).unwrap();
    let work_dir = workspace.temp_dir().to_path_buf();
    // 0, 1 normalize, 2 concat
    let runner = Arc::new(FakeRunner::failing(Failure::Exit(2, 1)));

    let err = JoinExecutor::new(workspace, runner.clone())
        .execute(&job)
        .await
        .unwrap_err();

    match &err {
        Error::EncodeFailed {
            stage,
            code,
            message,
        } => {
            assert_eq!(stage, "concat");
            assert_eq!(*code, Some(1));
            assert!(message.contains("Invalid data"));
        }
        other => panic!("expected EncodeFailed, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 7);

    // Nothing after the failing stage ran
    assert_eq!(runner.commands().len(), 3);
    assert!(!output.exists());
    assert!(!work_dir.exists());
    assert_eq!(entries(out_dir.path()), 0);
}

#[tokio::test]
async fn test_spawn_failure_is_reported_as_encode_failure() {
    let card = Card::with_segments(&[5]);
    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("flight.mkv");
    let job = job(&card, "5:5", &output);

    let workspace = Workspace::new(&output, None).unwrap();
    let err = JoinExecutor::new(workspace, Arc::new(FakeRunner::failing(Failure::Spawn(0))))
        .execute(&job)
        .await
        .unwrap_err();

    match &err {
        Error::EncodeFailed { stage, code, message } => {
            assert_eq!(stage, "normalize PICT0005.AVI");
            assert_eq!(*code, None);
            assert!(message.contains("failed to start ffmpeg"));
        }
        other => panic!("expected EncodeFailed, got {other:?}"),
    }
    assert_eq!(entries(out_dir.path()), 0);
}

#[tokio::test]
async fn test_interrupted_run_cleans_up() {
    let card = Card::with_segments(&[0, 1, 2]);
    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("flight.mkv");
    let job = job(&card, ":", &output);

    let scratch = tempdir().unwrap();
    let workspace = Workspace::new(&output, Some(scratch.path())).unwrap();
    let runner = Arc::new(FakeRunner::failing(Failure::Interrupt(4)));

    let err = JoinExecutor::new(workspace, runner.clone())
        .execute(&job)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Interrupted));
    assert_eq!(err.exit_code(), 130);
    assert_eq!(runner.commands().len(), 5);
    assert_eq!(entries(scratch.path()), 0);
    assert_eq!(entries(out_dir.path()), 0);
}

#[test]
fn test_executor_plan_targets_staging_file() {
    let card = Card::with_segments(&[0, 1]);
    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("flight.mp4");
    let job = job(&card, "0:1", &output);

    let workspace = Workspace::new(&output, None).unwrap();
    let staging = workspace.staging().to_path_buf();
    let work_dir = workspace.temp_dir().to_path_buf();
    let executor = JoinExecutor::new(workspace, Arc::new(FakeRunner::new()));
    let plan = executor.plan(&job);

    assert_eq!(plan.steps.len(), 4);
    assert!(plan.manifest.starts_with(&work_dir));
    assert!(plan.intermediates.iter().all(|p| p.starts_with(&work_dir)));
    let encode = &plan.steps[3].command;
    assert_eq!(encode.output_arg().unwrap(), staging.as_os_str());
    assert!(encode.to_string().contains("+faststart"));
}
