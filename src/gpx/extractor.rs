use log::{debug, warn};

use crate::gpx::{GpxDocument, TIME, TRACK_POINT, WAYPOINT};
use crate::timestamp::{parse_timestamp, Instant};
use crate::xml_tree::{NamespaceScope, XmlNode};

// @module: Point extraction from a single document

/// Kind of point element found in an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    // @kind: `<trkpt>` path sample
    TrackPoint,
    // @kind: `<wpt>` standalone marker
    Waypoint,
}

impl PointKind {
    // @returns: Local element name
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::TrackPoint => TRACK_POINT,
            Self::Waypoint => WAYPOINT,
        }
    }
}

/// One timestamped point and its untouched original content
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Parsed `<time>` value
    pub instant: Instant,

    /// Index of the document the point came from
    pub source_index: usize,

    /// Encounter position across the whole run, assigned when merged
    pub sequence: usize,

    /// Element kind
    pub kind: PointKind,

    /// Full element tree as it appeared in the input
    pub content: XmlNode,

    /// Prefixed namespace bindings in scope where the point was found
    pub namespaces: Vec<(String, String)>,
}

impl PointRecord {
    /// Create a record with no run-wide sequence yet
    pub fn new(instant: Instant, source_index: usize, kind: PointKind, content: XmlNode) -> Self {
        Self {
            instant,
            source_index,
            sequence: 0,
            kind,
            content,
            namespaces: Vec::new(),
        }
    }

    /// Same record with the namespace bindings of its source position
    pub fn with_namespaces(self, namespaces: Vec<(String, String)>) -> Self {
        Self { namespaces, ..self }
    }

    /// Same record placed at a run-wide encounter position
    pub fn with_sequence(self, sequence: usize) -> Self {
        Self { sequence, ..self }
    }
}

/// Points extracted from one document plus counters for what was dropped
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Usable points in encounter order
    pub points: Vec<PointRecord>,

    /// Usable track points
    pub track_points: usize,

    /// Usable waypoints
    pub waypoints: usize,

    /// Points dropped silently because they carry no time
    pub missing_time: usize,

    /// Points dropped with a warning because the time did not parse
    pub invalid_time: usize,
}

impl ExtractionReport {
    /// Number of points that were found but not kept
    pub fn skipped(&self) -> usize {
        self.missing_time + self.invalid_time
    }

    fn push(&mut self, record: PointRecord) {
        match record.kind {
            PointKind::TrackPoint => self.track_points += 1,
            PointKind::Waypoint => self.waypoints += 1,
        }
        self.points.push(record);
    }
}

/// Extract every timestamped track point and waypoint from a document.
///
/// Points are reported in document order, both kinds interleaved, at any
/// depth. Only elements in the document's GPX namespace count, so extension
/// elements that reuse the names are ignored. A point without a `<time>`
/// child, or with an empty one, is skipped silently. A point whose time does
/// not parse is skipped with a warning.
pub fn extract_points(document: &GpxDocument) -> ExtractionReport {
    let mut report = ExtractionReport::default();
    let mut scope = NamespaceScope::new();

    let mark = scope.enter(&document.root);
    for child in &document.root.children {
        visit(document, child, &mut scope, &mut report);
    }
    scope.leave(mark);

    debug!(
        "{}: {} track point(s), {} waypoint(s), {} skipped",
        document.source.display(),
        report.track_points,
        report.waypoints,
        report.skipped()
    );

    report
}

// Pre-order walk; a point is not searched for nested points
fn visit(
    document: &GpxDocument,
    node: &XmlNode,
    scope: &mut NamespaceScope,
    report: &mut ExtractionReport,
) {
    if let Some(kind) = point_kind(document, node, scope) {
        extract_point(document, node, kind, scope, report);
        return;
    }

    let mark = scope.enter(node);
    for child in &node.children {
        visit(document, child, scope, report);
    }
    scope.leave(mark);
}

fn point_kind(
    document: &GpxDocument,
    node: &XmlNode,
    scope: &mut NamespaceScope,
) -> Option<PointKind> {
    [PointKind::TrackPoint, PointKind::Waypoint]
        .into_iter()
        .find(|kind| document.is_element(node, kind.element_name(), scope))
}

fn extract_point(
    document: &GpxDocument,
    element: &XmlNode,
    kind: PointKind,
    scope: &mut NamespaceScope,
    report: &mut ExtractionReport,
) {
    let mark = scope.enter(element);
    let time = element
        .children
        .iter()
        .find(|child| document.is_element(child, TIME, scope));
    let namespaces = scope.prefixed_bindings();
    scope.leave(mark);

    let Some(text) = time
        .and_then(|t| t.text.as_deref())
        .filter(|t| !t.trim().is_empty())
    else {
        report.missing_time += 1;
        return;
    };

    match parse_timestamp(text) {
        Ok(instant) => {
            report.push(
                PointRecord::new(instant, document.source_index, kind, element.clone())
                    .with_namespaces(namespaces),
            );
        }
        Err(e) => {
            warn!(
                "Could not parse timestamp '{}' from {}: {}",
                text,
                document.source.display(),
                e
            );
            report.invalid_time += 1;
        }
    }
}
