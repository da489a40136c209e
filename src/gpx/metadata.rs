use crate::gpx::{GpxDocument, DESCRIPTION, METADATA, NAME};
use crate::xml_tree::NamespaceScope;

/// Descriptive fields carried over into the merged document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// `<metadata><name>`
    pub name: Option<String>,

    /// `<metadata><desc>`
    pub description: Option<String>,
}

impl Metadata {
    /// True when neither field was supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Read name and description from the root's `<metadata>` block.
///
/// Only GPX elements of the document count. A field element that exists but
/// is empty counts as supplied with an empty value.
pub fn collect_metadata(document: &GpxDocument) -> Metadata {
    let mut scope = NamespaceScope::new();
    scope.enter(&document.root);

    let Some(block) = document
        .root
        .children
        .iter()
        .find(|child| document.is_element(child, METADATA, &mut scope))
    else {
        return Metadata::default();
    };
    scope.enter(block);

    let mut field = |local: &str| {
        block
            .children
            .iter()
            .find(|child| document.is_element(child, local, &mut scope))
            .map(|element| element.text.clone().unwrap_or_default())
    };

    Metadata {
        name: field(NAME),
        description: field(DESCRIPTION),
    }
}
