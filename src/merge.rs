/*!
 * Merge engine.
 *
 * Collects points from every processed document into one collection and
 * orders it chronologically. Points sharing an instant keep the order in
 * which they were encountered: by document, then by position within the
 * document.
 */

use log::{debug, warn};

use crate::gpx::{
    collect_metadata, extract_points, ExtractionReport, GpxDocument, Metadata, PointKind,
    PointRecord,
};

/// Running state of a merge
#[derive(Debug, Clone, Default)]
pub struct TrackMerger {
    /// Accumulated points, ordered only after `sort_by_timestamp`
    points: Vec<PointRecord>,

    /// Metadata from the first document that supplied any
    metadata: Metadata,

    /// Prefixed namespace declarations for the output root, first declaration per prefix
    namespaces: Vec<(String, String)>,

    /// Documents processed so far
    documents: usize,

    /// Points found but dropped for missing or invalid time
    skipped: usize,
}

impl TrackMerger {
    /// Create an empty merger
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract a document and add its points, metadata and namespaces.
    ///
    /// Metadata is only read while none has been collected yet. A point that
    /// uses a prefix bound to another URI on the output root carries its own
    /// declaration of that prefix. The returned report keeps its counters; its
    /// points have moved into the merger.
    pub fn add_document(&mut self, document: &GpxDocument) -> ExtractionReport {
        if self.metadata.is_empty() {
            let found = collect_metadata(document);
            if !found.is_empty() {
                debug!("Using metadata from {}", document.source.display());
                self.metadata = found;
            }
        }

        for (prefix, uri) in document.namespace_declarations() {
            self.declare_namespace(prefix, uri);
        }

        let mut report = extract_points(document);
        self.documents += 1;
        self.skipped += report.skipped();

        let points: Vec<PointRecord> = std::mem::take(&mut report.points)
            .into_iter()
            .map(|point| self.localize_namespaces(point))
            .collect();
        self.append(points);
        report
    }

    /// Append points after everything collected so far, in the order given
    pub fn append<I: IntoIterator<Item = PointRecord>>(&mut self, records: I) {
        for record in records {
            let sequence = self.points.len();
            self.points.push(record.with_sequence(sequence));
        }
    }

    /// Order points by instant, ties broken by encounter order
    pub fn sort_by_timestamp(&mut self) {
        self.points.sort_by_key(|point| (point.instant, point.sequence));
    }

    fn declare_namespace(&mut self, prefix: String, uri: String) {
        match self.namespaces.iter().find(|(p, _)| *p == prefix) {
            Some((_, existing)) if *existing != uri => {
                warn!(
                    "Namespace prefix '{}' already bound to '{}', declaring '{}' on the points using it",
                    prefix, existing, uri
                );
            }
            Some(_) => {}
            None => self.namespaces.push((prefix, uri)),
        }
    }

    // Declare on the point itself each prefix it uses whose root binding differs
    fn localize_namespaces(&self, mut point: PointRecord) -> PointRecord {
        for (prefix, uri) in &point.namespaces {
            let root_uri = self
                .namespaces
                .iter()
                .find(|(p, _)| p == prefix)
                .map(|(_, u)| u);
            if root_uri == Some(uri)
                || point.content.declares_prefix(prefix)
                || !point.content.uses_prefix(prefix)
            {
                continue;
            }
            point
                .content
                .attributes
                .push((format!("xmlns:{}", prefix), uri.clone()));
        }
        point
    }

    /// Points in their current order
    pub fn points(&self) -> &[PointRecord] {
        &self.points
    }

    /// Consume the merger and return its points
    pub fn into_points(self) -> Vec<PointRecord> {
        self.points
    }

    /// Collected metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Collected prefixed namespace declarations
    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    /// Number of documents added
    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// Number of points dropped during extraction
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Number of points of a given kind
    pub fn count_of(&self, kind: PointKind) -> usize {
        self.points.iter().filter(|p| p.kind == kind).count()
    }

    /// Number of collected points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no point has been collected
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
