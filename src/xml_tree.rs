/*!
 * Generic XML element tree.
 *
 * Point content is carried through a merge as an opaque tree so that
 * extension elements the merger knows nothing about survive unchanged.
 * Text is stored where it occurs: `text` before the first child and `tail`
 * after each child, so mixed content keeps its order.
 *
 * Parsing is strict: input that is not well-formed markup is rejected as a
 * whole rather than partially recovered. Namespaces are not resolved while
 * parsing; [`NamespaceScope`] resolves prefixes during a tree walk.
 */

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::XmlError;

/// Namespace permanently bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

// @const: Encoding named in an XML declaration written in an ASCII-compatible encoding
static ENCODING_DECLARATION: Lazy<regex::bytes::Regex> = Lazy::new(|| {
    regex::bytes::Regex::new(r#"(?-u)^\s*<\?xml\s[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:\-]+)["']"#)
        .unwrap()
});

/// A single element with its attributes, text and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Qualified tag name, prefix included (e.g. `gpxtpx:hr`)
    pub name: String,

    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,

    /// Text before the first child element, `None` when there is none
    pub text: Option<String>,

    /// Text following this element inside its parent, `None` when there is none
    pub tail: Option<String>,

    /// Child elements in document order
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an element with no attributes, text or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a leaf element holding text
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append a child element
    pub fn push_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Tag name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Namespace prefix of the tag name, `None` when unprefixed
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Value of an attribute by its qualified name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given qualified name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with the given qualified name.
    ///
    /// Returns `None` when the child is missing or has no text.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    /// All descendants (not `self`) with the given qualified name, in document order.
    ///
    /// A matching element is not searched further, so nested matches inside a
    /// match are not reported separately.
    pub fn descendants(&self, name: &str) -> Vec<&XmlNode> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_matching(name, &mut found);
        }
        found
    }

    fn collect_matching<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlNode>) {
        if self.name == name {
            found.push(self);
            return;
        }
        for child in &self.children {
            child.collect_matching(name, found);
        }
    }

    /// Prefixed namespace declarations on this element as `(prefix, uri)`
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|(k, v)| k.strip_prefix("xmlns:").map(|prefix| (prefix, v.as_str())))
    }

    /// True when this element itself declares `prefix`
    pub fn declares_prefix(&self, prefix: &str) -> bool {
        self.namespace_declarations().any(|(p, _)| p == prefix)
    }

    /// True when this element or a descendant uses `prefix` in an element or attribute name
    pub fn uses_prefix(&self, prefix: &str) -> bool {
        self.prefix() == Some(prefix)
            || self
                .attributes
                .iter()
                .any(|(k, _)| k.split_once(':').is_some_and(|(p, _)| p == prefix))
            || self.children.iter().any(|c| c.uses_prefix(prefix))
    }
}

/// Strip the namespace prefix from a qualified name
pub fn local_part(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

/// Namespace bindings in effect at one position of a tree walk.
///
/// Declarations are pushed when entering an element and dropped again when
/// leaving it, so the innermost binding of a prefix is always the last one.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    // @field: (prefix, uri) in declaration order; `None` is the default namespace
    bindings: Vec<(Option<String>, String)>,
}

impl NamespaceScope {
    /// Create a scope with no bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the declarations made on `node`, returning the mark to [`leave`](Self::leave) with
    pub fn enter(&mut self, node: &XmlNode) -> usize {
        let mark = self.bindings.len();
        for (key, value) in &node.attributes {
            if key == "xmlns" {
                self.bindings.push((None, value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.bindings.push((Some(prefix.to_string()), value.clone()));
            }
        }
        mark
    }

    /// Drop every binding pushed since `mark`
    pub fn leave(&mut self, mark: usize) {
        self.bindings.truncate(mark);
    }

    /// URI bound to `prefix`, or to the default namespace when `prefix` is `None`.
    ///
    /// An empty default declaration (`xmlns=""`) unbinds the default namespace.
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// Namespace URI of `node`, its own declarations included
    pub fn namespace_of(&mut self, node: &XmlNode) -> Option<String> {
        let mark = self.enter(node);
        let uri = self.resolve(node.prefix()).map(str::to_string);
        self.leave(mark);
        uri
    }

    /// Prefixed bindings in effect, one per prefix, the innermost binding winning
    pub fn prefixed_bindings(&self) -> Vec<(String, String)> {
        let mut effective: Vec<(String, String)> = Vec::new();
        for (prefix, uri) in &self.bindings {
            let Some(prefix) = prefix else {
                continue;
            };
            match effective.iter_mut().find(|(p, _)| p == prefix) {
                Some(existing) => existing.1 = uri.clone(),
                None => effective.push((prefix.clone(), uri.clone())),
            }
        }
        effective
    }
}

/// Decode raw document bytes to text.
///
/// A byte order mark takes precedence over the encoding named in the XML
/// declaration. Without either, the content must be UTF-8.
pub fn decode_document(bytes: &[u8]) -> Result<String, XmlError> {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        return decode_with(encoding, &bytes[bom_length..]);
    }

    let encoding = match ENCODING_DECLARATION.captures(bytes) {
        Some(caps) => {
            let label = &caps[1];
            // A declaration readable as ASCII rules out UTF-16
            Encoding::for_label(label)
                .map(|encoding| encoding.output_encoding())
                .ok_or_else(|| {
                    XmlError::Encoding(format!(
                        "unsupported encoding '{}'",
                        String::from_utf8_lossy(label)
                    ))
                })?
        }
        None => UTF_8,
    };

    decode_with(encoding, bytes)
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, XmlError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| XmlError::Encoding(format!("content is not valid {}", encoding.name())))
}

/// Parse a complete document and return its root element
pub fn parse_document(content: &str) -> Result<XmlNode, XmlError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = Reader::from_str(content);
    reader.check_end_names(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(XmlError::Syntax {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
        };

        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots);
                }
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let node = element_from_start(&start)?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::End(end) => {
                let Some(mut node) = stack.pop() else {
                    return Err(XmlError::UnexpectedEnd(utf8(end.name().as_ref())?));
                };
                drop_indentation(&mut node);
                attach(node, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| XmlError::Syntax {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                })?;
                append_text(&mut stack, &value)?;
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                let value = std::str::from_utf8(&raw)
                    .map_err(|e| XmlError::Encoding(e.to_string()))?;
                append_text(&mut stack, value)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no content
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::UnclosedElement(open.name.clone()));
    }

    root.ok_or(XmlError::NoRoot)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlNode, XmlError> {
    let mut node = XmlNode::new(utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::Attribute(e.to_string()))?;
        let key = utf8(attribute.key.as_ref())?;
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::Attribute(format!("{}: {}", key, e)))?;
        node.attributes.push((key, value.into_owned()));
    }
    Ok(node)
}

fn attach(node: XmlNode, stack: &mut [XmlNode], root: &mut Option<XmlNode>) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::MultipleRoots);
    }
    *root = Some(node);
    Ok(())
}

fn append_text(stack: &mut [XmlNode], value: &str) -> Result<(), XmlError> {
    if value.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(current) => {
            let run = match current.children.last_mut() {
                Some(previous) => &mut previous.tail,
                None => &mut current.text,
            };
            run.get_or_insert_with(String::new).push_str(value);
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err(XmlError::TextOutsideRoot(value.trim().to_string())),
    }
}

fn is_blank(run: &Option<String>) -> bool {
    run.as_deref().is_none_or(|t| t.trim().is_empty())
}

// Element-only content: every text run is whitespace between child elements
fn is_element_only(node: &XmlNode) -> bool {
    !node.children.is_empty()
        && is_blank(&node.text)
        && node.children.iter().all(|c| is_blank(&c.tail))
}

fn drop_indentation(node: &mut XmlNode) {
    if !is_element_only(node) {
        return;
    }
    node.text = None;
    for child in &mut node.children {
        child.tail = None;
    }
}

fn utf8(bytes: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmlError::Encoding(e.to_string()))
}

/// Serialize a document with an XML declaration.
///
/// `indent` is the number of spaces per nesting level; `0` writes compact
/// output. Only element-only content is indented; text runs are written
/// exactly where they occur.
pub fn write_document(root: &XmlNode, indent: usize) -> Result<Vec<u8>, XmlError> {
    let mut writer = Writer::new(Vec::new());

    write_event(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    if indent > 0 {
        write_text(&mut writer, "\n")?;
    }
    write_node(&mut writer, root, 0, indent)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    node: &XmlNode,
    depth: usize,
    indent: usize,
) -> Result<(), XmlError> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.text.is_none() && node.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;

    let pretty = indent > 0 && is_element_only(node);
    if !pretty {
        if let Some(text) = &node.text {
            write_text(writer, text)?;
        }
    }
    for child in &node.children {
        if pretty {
            write_text(writer, &line_break(depth + 1, indent))?;
        }
        write_node(writer, child, depth + 1, indent)?;
        if !pretty {
            if let Some(tail) = &child.tail {
                write_text(writer, tail)?;
            }
        }
    }
    if pretty {
        write_text(writer, &line_break(depth, indent))?;
    }

    write_event(writer, Event::End(BytesEnd::new(node.name.as_str())))
}

fn line_break(depth: usize, indent: usize) -> String {
    format!("\n{}", " ".repeat(depth * indent))
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), XmlError> {
    write_event(writer, Event::Text(BytesText::new(text)))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}
