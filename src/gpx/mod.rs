/*!
 * GPX document handling.
 *
 * Only the part of the GPX schema that matters for merging is modeled:
 *
 * - `document`: loading an input file into a strict element tree
 * - `extractor`: finding timestamped track points and waypoints
 * - `metadata`: reading the `<metadata>` name and description
 * - `builder`: synthesizing the combined output document
 *
 * Elements are recognized by local name and GPX namespace. Everything else
 * inside a point is carried as opaque content.
 */

pub mod document;
pub mod extractor;
pub mod metadata;
pub mod builder;

// Re-export main types
pub use document::GpxDocument;
pub use extractor::{extract_points, ExtractionReport, PointKind, PointRecord};
pub use metadata::{collect_metadata, Metadata};
pub use builder::DocumentBuilder;

/// Canonical GPX 1.1 namespace
pub const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

/// GPX 1.0 namespace, still written by older devices
pub const GPX_10_NAMESPACE: &str = "http://www.topografix.com/GPX/1/0";

/// True for the GPX 1.1 and 1.0 namespaces
pub fn is_gpx_namespace(uri: &str) -> bool {
    uri == GPX_NAMESPACE || uri == GPX_10_NAMESPACE
}

// Local element names
pub const ROOT: &str = "gpx";
pub const METADATA: &str = "metadata";
pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "desc";
pub const TIME: &str = "time";
pub const TRACK: &str = "trk";
pub const TRACK_SEGMENT: &str = "trkseg";
pub const TRACK_POINT: &str = "trkpt";
pub const WAYPOINT: &str = "wpt";
