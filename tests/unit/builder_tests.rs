/*!
 * Tests for output document construction
 */

use gpxmerge::app_config::OutputConfig;
use gpxmerge::gpx::{DocumentBuilder, GpxDocument, Metadata, PointKind, PointRecord};
use gpxmerge::xml_tree::parse_document;
use gpxmerge::{parse_timestamp, MergeError, XmlNode};

fn builder() -> DocumentBuilder {
    DocumentBuilder::new(OutputConfig::default())
        .with_generation_time(parse_timestamp("2025-01-02T03:04:05Z").unwrap())
}

fn point(time: &str, lat: &str) -> PointRecord {
    let mut content = XmlNode::new("trkpt")
        .with_attribute("lat", lat)
        .with_attribute("lon", "7.0");
    content.push_child(XmlNode::with_text("time", time));
    let mut extensions = XmlNode::new("extensions");
    extensions.push_child(XmlNode::with_text("custom:speed", "3.5").with_attribute("unit", "m/s"));
    content.push_child(extensions);
    PointRecord::new(parse_timestamp(time).unwrap(), 0, PointKind::TrackPoint, content)
}

#[test]
fn test_build_withNoPoints_shouldRefuse() {
    let result = builder().build(&[], &Metadata::default(), &[]);
    assert!(matches!(result, Err(MergeError::NoPoints)));
}

#[test]
fn test_build_withoutMetadata_shouldUseDefaults() {
    let document = builder()
        .build(&[point("2024-05-01T10:00:00Z", "1")], &Metadata::default(), &[])
        .unwrap();

    let metadata = document.child("metadata").unwrap();
    assert_eq!(metadata.child_text("name"), Some("Merged GPX Track"));
    assert_eq!(metadata.child_text("desc"), Some("Merged from multiple GPX files"));
    assert_eq!(metadata.child_text("time"), Some("2025-01-02T03:04:05Z"));
}

#[test]
fn test_build_withPartialMetadata_shouldDefaultMissingField() {
    let metadata = Metadata {
        name: Some("A".to_string()),
        description: None,
    };

    let document = builder()
        .build(&[point("2024-05-01T10:00:00Z", "1")], &metadata, &[])
        .unwrap();

    let block = document.child("metadata").unwrap();
    assert_eq!(block.child_text("name"), Some("A"));
    assert_eq!(block.child_text("desc"), Some("Merged from multiple GPX files"));
}

#[test]
fn test_build_withPoints_shouldCreateRootAndSingleSegment() {
    let points = vec![point("2024-05-01T10:00:00Z", "1"), point("2024-05-01T10:00:05Z", "2")];

    let document = builder().build(&points, &Metadata::default(), &[]).unwrap();

    assert_eq!(document.name, "gpx");
    assert_eq!(document.attribute("version"), Some("1.1"));
    assert_eq!(document.attribute("creator"), Some("gpxmerge"));
    assert_eq!(document.attribute("xmlns"), Some("http://www.topografix.com/GPX/1/1"));

    let tracks: Vec<&XmlNode> = document.children.iter().filter(|c| c.name == "trk").collect();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].child_text("name"), Some("Merged Track"));

    let segments = tracks[0].descendants("trkseg");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].children, vec![points[0].content.clone(), points[1].content.clone()]);
}

#[test]
fn test_build_withNamespaces_shouldDeclareThemOnRoot() {
    let namespaces = vec![("custom".to_string(), "urn:custom".to_string())];

    let document = builder()
        .build(&[point("2024-05-01T10:00:00Z", "1")], &Metadata::default(), &namespaces)
        .unwrap();

    assert_eq!(document.attribute("xmlns:custom"), Some("urn:custom"));
}

#[test]
fn test_build_withCustomConfig_shouldApplyIt() {
    let config = OutputConfig {
        creator: "my-tool".to_string(),
        track_name: "Holiday".to_string(),
        ..OutputConfig::default()
    };

    let document = DocumentBuilder::new(config)
        .build(&[point("2024-05-01T10:00:00Z", "1")], &Metadata::default(), &[])
        .unwrap();

    assert_eq!(document.attribute("creator"), Some("my-tool"));
    assert_eq!(document.child("trk").and_then(|t| t.child_text("name")), Some("Holiday"));
}

/// Serialized output re-reads as the same points, byte-level escaping aside
#[test]
fn test_build_bytes_shouldSerializeReadableDocument() {
    let points = vec![point("2024-05-01T10:00:00Z", "1"), point("2024-05-01T10:00:05Z", "2")];

    let bytes = builder().build_bytes(&points, &Metadata::default(), &[]).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(text.contains("xmlns=\"http://www.topografix.com/GPX/1/1\""));

    let reparsed = GpxDocument::parse_str(&text, "out.gpx", 0).unwrap();
    let copied: Vec<XmlNode> = reparsed.root.descendants("trkpt").into_iter().cloned().collect();
    assert_eq!(copied, vec![points[0].content.clone(), points[1].content.clone()]);
}

#[test]
fn test_build_bytes_withCompactIndent_shouldWriteSingleLine() {
    let config = OutputConfig {
        indent: 0,
        ..OutputConfig::default()
    };

    let bytes = DocumentBuilder::new(config)
        .build_bytes(&[point("2024-05-01T10:00:00Z", "1")], &Metadata::default(), &[])
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert_eq!(text.trim_end().lines().count(), 1);
    assert!(parse_document(&text).is_ok());
}
