/*!
 * Tests for file utility functions
 */

use std::fs;
use anyhow::Result;
use gpxmerge::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "a.gpx", "<gpx/>")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.gpx"));
}

/// Wildcards expand to the matching files only
#[test]
fn test_resolve_inputs_withWildcard_shouldReturnMatchingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.gpx", "<gpx/>")?;
    common::create_test_file(temp_dir.path(), "a.gpx", "<gpx/>")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "text")?;

    let pattern = temp_dir.path().join("*.gpx").to_string_lossy().to_string();
    let files = FileManager::resolve_inputs(&[pattern])?;

    assert_eq!(files, vec![temp_dir.path().join("a.gpx"), temp_dir.path().join("b.gpx")]);

    Ok(())
}

/// Direct paths are kept in the order given
#[test]
fn test_resolve_inputs_withDirectPaths_shouldKeepOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let second = common::create_test_file(temp_dir.path(), "second.gpx", "<gpx/>")?;
    let first = common::create_test_file(temp_dir.path(), "first.gpx", "<gpx/>")?;

    let patterns = vec![
        second.to_string_lossy().to_string(),
        first.to_string_lossy().to_string(),
    ];
    let files = FileManager::resolve_inputs(&patterns)?;

    assert_eq!(files, vec![second, first]);

    Ok(())
}

/// Directories contribute the GPX files beneath them
#[test]
fn test_resolve_inputs_withDirectory_shouldFindNestedGpxFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("day2");
    fs::create_dir_all(&nested)?;
    common::create_test_file(temp_dir.path(), "day1.GPX", "<gpx/>")?;
    common::create_test_file(&nested, "ride.gpx", "<gpx/>")?;
    common::create_test_file(&nested, "ride.fit", "binary")?;

    let files = FileManager::resolve_inputs(&[temp_dir.path().to_string_lossy().to_string()])?;

    assert_eq!(files.len(), 2);
    assert!(files.contains(&temp_dir.path().join("day1.GPX")));
    assert!(files.contains(&nested.join("ride.gpx")));

    Ok(())
}

/// Nothing found is not an error at this level
#[test]
fn test_resolve_inputs_withNoMatches_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pattern = temp_dir.path().join("*.gpx").to_string_lossy().to_string();
    let missing = temp_dir.path().join("missing.gpx").to_string_lossy().to_string();

    let files = FileManager::resolve_inputs(&[pattern, missing])?;

    assert!(files.is_empty());

    Ok(())
}

/// Test that write_bytes creates missing parent directories
#[test]
fn test_write_bytes_withMissingParent_shouldCreateDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("out").join("merged.gpx");

    FileManager::write_bytes(&target, b"<gpx/>")?;

    assert_eq!(fs::read_to_string(&target)?, "<gpx/>");

    Ok(())
}

/// Test that read_to_string returns file content correctly
#[test]
fn test_read_to_string_withValidFile_shouldReturnContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "read.gpx", "<gpx/>")?;

    assert_eq!(FileManager::read_to_string(&test_file)?, "<gpx/>");
    assert!(FileManager::read_to_string(temp_dir.path().join("nope.gpx")).is_err());

    Ok(())
}
