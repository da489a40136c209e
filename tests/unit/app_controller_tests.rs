/*!
 * Tests for the application controller
 */

use std::fs;
use std::path::PathBuf;
use anyhow::Result;
use gpxmerge::app_config::Config;
use gpxmerge::{parse_timestamp, Controller, MergeError, MergeSummary};
use crate::common;

fn controller() -> Controller {
    Controller::new_default()
        .unwrap()
        .with_generation_time(parse_timestamp("2025-01-01T00:00:00Z").unwrap())
}

fn merge_error(error: &anyhow::Error) -> &MergeError {
    error
        .downcast_ref::<MergeError>()
        .expect("error should be a MergeError")
}

#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.output.version = String::new();

    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_merge_files_withNoInputs_shouldFailWithNoInputFiles() {
    let error = controller().merge_files(&[]).unwrap_err();
    assert!(matches!(merge_error(&error), MergeError::NoInputFiles));
}

/// Existence is checked for every input before anything is parsed
#[test]
fn test_merge_files_withMissingInput_shouldFailBeforeParsing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let broken = common::create_test_file(temp_dir.path(), "broken.gpx", "<gpx><trk>")?;
    let missing = temp_dir.path().join("missing.gpx");

    let error = controller()
        .merge_files(&[broken, missing.clone()])
        .unwrap_err();

    match merge_error(&error) {
        MergeError::MissingInput(path) => assert_eq!(path, &missing),
        other => panic!("unexpected error: {}", other),
    }

    Ok(())
}

#[test]
fn test_run_withMalformedDocument_shouldNameFileAndWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let good = common::create_test_gpx(
        temp_dir.path(),
        "good.gpx",
        "",
        &[common::track_point(1.0, 1.0, Some("2024-05-01T10:00:00Z"))],
        &[],
    )?;
    let broken = common::create_test_file(temp_dir.path(), "broken.gpx", "<gpx><trk></gpx>")?;
    let output = temp_dir.path().join("merged.gpx");

    let error = controller().run(&[good, broken.clone()], &output).unwrap_err();

    match merge_error(&error) {
        MergeError::Document(document_error) => assert_eq!(document_error.path(), &broken),
        other => panic!("unexpected error: {}", other),
    }
    assert!(format!("{}", error).contains("broken.gpx"));
    assert!(!output.exists());

    Ok(())
}

#[test]
fn test_run_withNoUsablePoints_shouldFailWithNoPointsAndWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_gpx(
        temp_dir.path(),
        "untimed.gpx",
        "",
        &[
            common::track_point(1.0, 1.0, None),
            common::track_point(2.0, 2.0, Some("not a time")),
        ],
        &[],
    )?;
    let output = temp_dir.path().join("merged.gpx");

    let error = controller().run(&[input], &output).unwrap_err();

    assert!(matches!(merge_error(&error), MergeError::NoPoints));
    assert!(!output.exists());

    Ok(())
}

#[test]
fn test_run_withValidInputs_shouldReturnSummary() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_test_gpx(
        temp_dir.path(),
        "first.gpx",
        "",
        &[
            common::track_point(1.0, 1.0, Some("2024-05-01T10:00:00Z")),
            common::track_point(1.1, 1.1, None),
        ],
        &[common::waypoint(1.5, 1.5, "Summit", "2024-05-01T10:30:00Z")],
    )?;
    let second = common::create_test_gpx(
        temp_dir.path(),
        "second.gpx",
        "",
        &[common::track_point(2.0, 2.0, Some("2024-05-01T09:00:00Z"))],
        &[],
    )?;
    let output = temp_dir.path().join("out").join("merged.gpx");

    let summary = controller().run(&[first, second], &output)?;

    assert_eq!(summary.output, output);
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.total_points, 3);
    assert_eq!(summary.track_points, 2);
    assert_eq!(summary.waypoints, 1);
    assert_eq!(summary.skipped_points, 1);
    assert!(output.exists());

    Ok(())
}

#[test]
fn test_merge_to_document_withFixedGenerationTime_shouldBeDeterministic() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_gpx(
        temp_dir.path(),
        "ride.gpx",
        &common::metadata_block(Some("Ride"), None),
        &[common::track_point(1.0, 1.0, Some("2024-05-01T10:00:00Z"))],
        &[],
    )?;
    let inputs: Vec<PathBuf> = vec![input];

    let first = controller().merge_to_document(&inputs)?;
    let second = controller().merge_to_document(&inputs)?;

    assert_eq!(first, second);
    assert!(String::from_utf8(first)?.contains("<time>2025-01-01T00:00:00Z</time>"));

    Ok(())
}

/// The final report names the output file and the point count
#[test]
fn test_merge_summary_display_shouldReportOutputAndCount() {
    let summary = MergeSummary {
        output: PathBuf::from("out/merged.gpx"),
        documents: 2,
        total_points: 5,
        track_points: 4,
        waypoints: 1,
        skipped_points: 1,
    };

    assert_eq!(
        summary.to_string(),
        "Merged GPX file created: out/merged.gpx\nTotal track points merged: 5"
    );
}

/// Inputs in a declared legacy encoding are decoded, output is UTF-8
#[test]
fn test_run_withLatin1Input_shouldDecodeDeclaredEncoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut content = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n".to_vec();
    content.extend_from_slice(
        b"<gpx version=\"1.1\" creator=\"old\" xmlns=\"http://www.topografix.com/GPX/1/1\">\
<metadata><name>Z\xFCrich</name></metadata>\
<trk><trkseg><trkpt lat=\"47.37\" lon=\"8.54\"><time>2024-05-01T10:00:00Z</time></trkpt></trkseg></trk></gpx>",
    );
    let input = temp_dir.path().join("latin1.gpx");
    fs::write(&input, content)?;
    let output = temp_dir.path().join("merged.gpx");

    controller().run(&[input], &output)?;

    let written = fs::read_to_string(&output)?;
    assert!(written.contains("<name>Z\u{fc}rich</name>"));

    Ok(())
}
