/*!
 * Construction of the merged output document.
 *
 * The builder owns the output settings, including the namespace written on
 * the root, so nothing about serialization lives in global state.
 */

use log::debug;

use crate::app_config::OutputConfig;
use crate::errors::MergeError;
use crate::gpx::{
    Metadata, PointRecord, DESCRIPTION, METADATA, NAME, ROOT, TIME, TRACK, TRACK_SEGMENT,
};
use crate::timestamp::Instant;
use crate::xml_tree::{self, XmlNode};

/// Builds the combined GPX document from merged points
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    config: OutputConfig,
    generated_at: Option<Instant>,
}

impl DocumentBuilder {
    /// Create a builder that stamps documents with the current time
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            generated_at: None,
        }
    }

    /// Use a fixed generation time instead of the clock
    pub fn with_generation_time(mut self, instant: Instant) -> Self {
        self.generated_at = Some(instant);
        self
    }

    /// Output settings in use
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Build the output tree.
    ///
    /// Each point's content is deep-copied in the order given. `namespaces`
    /// are extra `(prefix, uri)` declarations placed on the root so that
    /// copied extension elements stay resolvable.
    pub fn build(
        &self,
        points: &[PointRecord],
        metadata: &Metadata,
        namespaces: &[(String, String)],
    ) -> Result<XmlNode, MergeError> {
        if points.is_empty() {
            return Err(MergeError::NoPoints);
        }

        let mut root = XmlNode::new(ROOT)
            .with_attribute("version", self.config.version.as_str())
            .with_attribute("creator", self.config.creator.as_str())
            .with_attribute("xmlns", self.config.namespace.as_str());
        for (prefix, uri) in namespaces {
            root = root.with_attribute(format!("xmlns:{}", prefix), uri.as_str());
        }

        root.push_child(self.metadata_block(metadata));

        let mut segment = XmlNode::new(TRACK_SEGMENT);
        segment.children.reserve(points.len());
        for point in points {
            segment.push_child(point.content.clone());
        }

        let mut track = XmlNode::new(TRACK);
        track.push_child(XmlNode::with_text(NAME, self.config.track_name.as_str()));
        track.push_child(segment);
        root.push_child(track);

        debug!("Built merged document with {} point(s)", points.len());
        Ok(root)
    }

    /// Build and serialize in one step
    pub fn build_bytes(
        &self,
        points: &[PointRecord],
        metadata: &Metadata,
        namespaces: &[(String, String)],
    ) -> Result<Vec<u8>, MergeError> {
        let document = self.build(points, metadata, namespaces)?;
        self.serialize(&document)
    }

    /// Serialize a built document with the configured indentation
    pub fn serialize(&self, document: &XmlNode) -> Result<Vec<u8>, MergeError> {
        Ok(xml_tree::write_document(document, self.config.indent)?)
    }

    fn metadata_block(&self, metadata: &Metadata) -> XmlNode {
        let name = metadata
            .name
            .as_deref()
            .unwrap_or(self.config.default_name.as_str());
        let description = metadata
            .description
            .as_deref()
            .unwrap_or(self.config.default_description.as_str());
        let generated_at = self.generated_at.unwrap_or_else(Instant::now);

        let mut block = XmlNode::new(METADATA);
        block.push_child(XmlNode::with_text(NAME, name));
        block.push_child(XmlNode::with_text(DESCRIPTION, description));
        block.push_child(XmlNode::with_text(TIME, generated_at.to_gpx_string()));
        block
    }
}
