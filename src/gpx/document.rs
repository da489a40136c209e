use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::DocumentError;
use crate::gpx::{is_gpx_namespace, TRACK_POINT, WAYPOINT};
use crate::xml_tree::{self, NamespaceScope, XmlNode};

/// A parsed input document together with its provenance
#[derive(Debug, Clone)]
pub struct GpxDocument {
    /// File the document was read from
    pub source: PathBuf,

    /// Position of this document in the processing order
    pub source_index: usize,

    /// Namespace of the root element, `None` for a document without one
    pub namespace: Option<String>,

    /// Root element
    pub root: XmlNode,
}

impl GpxDocument {
    /// Read and parse a GPX file.
    ///
    /// The file handle is closed before this returns. Content is decoded per
    /// its byte order mark or XML declaration. Any markup error rejects the
    /// whole document.
    pub fn load<P: AsRef<Path>>(path: P, source_index: usize) -> Result<Self, DocumentError> {
        let path = path.as_ref();

        let bytes = fs::read(path).map_err(|e| DocumentError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let content = xml_tree::decode_document(&bytes).map_err(|e| DocumentError::NotWellFormed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse_str(&content, path, source_index)
    }

    /// Parse GPX content that is already in memory
    pub fn parse_str<P: Into<PathBuf>>(
        content: &str,
        source: P,
        source_index: usize,
    ) -> Result<Self, DocumentError> {
        let source = source.into();
        match xml_tree::parse_document(content) {
            Ok(root) => Ok(Self {
                source,
                source_index,
                namespace: NamespaceScope::new().namespace_of(&root),
                root,
            }),
            Err(e) => Err(DocumentError::NotWellFormed {
                path: source,
                source: e,
            }),
        }
    }

    /// True when the root is in a GPX namespace, or in no namespace at all
    pub fn is_gpx(&self) -> bool {
        self.namespace.as_deref().is_none_or(is_gpx_namespace)
    }

    /// True when `node` is the GPX element `local` of this document.
    ///
    /// `scope` holds the bindings of the node's ancestors; the node's own
    /// declarations are taken into account.
    pub fn is_element(&self, node: &XmlNode, local: &str, scope: &mut NamespaceScope) -> bool {
        node.local_name() == local && self.is_gpx() && scope.namespace_of(node) == self.namespace
    }

    /// Prefixed namespace declarations outside of point elements, in document order.
    ///
    /// Declarations made on the points themselves travel with the copied content.
    pub fn namespace_declarations(&self) -> Vec<(String, String)> {
        let mut found = Vec::new();
        let mut scope = NamespaceScope::new();
        self.collect_declarations(&self.root, &mut scope, &mut found);
        found
    }

    fn collect_declarations(
        &self,
        node: &XmlNode,
        scope: &mut NamespaceScope,
        found: &mut Vec<(String, String)>,
    ) {
        if self.is_element(node, TRACK_POINT, scope) || self.is_element(node, WAYPOINT, scope) {
            return;
        }
        found.extend(
            node.namespace_declarations()
                .map(|(prefix, uri)| (prefix.to_string(), uri.to_string())),
        );

        let mark = scope.enter(node);
        for child in &node.children {
            self.collect_declarations(child, scope, found);
        }
        scope.leave(mark);
    }
}
