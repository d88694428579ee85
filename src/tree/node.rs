// Copyright of the original code is the following.
// --------
// Summary: interfaces for tree manipulation
// Description: this module describes the structures found in an tree resulting
//              from an XML or HTML parsing, as well as the API provided for
//              various processing on that tree
//
// Copy: See Copyright for the status of this software.
//
// Author: Daniel Veillard
// --------
// tree.c : implementation of access function for an XML tree.
//
// References:
//   XHTML 1.0 W3C REC: http://www.w3.org/TR/2002/REC-xhtml1-20020801/
//
// See Copyright for the status of this software.
//
// daniel@veillard.com

use std::iter::successors;

use crate::error::{XmlParserErrors, XmlTreeError};

use super::{
    XML_STRING_COMMENT, XML_STRING_TEXT, XmlAttributeType, XmlDocId, XmlElementType,
    XmlEntityType, XmlNodeId, XmlNodeStore, XmlNsId, XmlString, xml_tree_err,
};

/// A node of the tree.
///
/// Attributes are nodes too: they hang off the `properties` chain of their
/// element and keep their value as child text nodes.
#[derive(Debug, Clone, Default)]
pub struct XmlNode {
    pub(crate) typ: XmlElementType,
    pub(crate) name: Option<XmlString>,
    pub(crate) children: Option<XmlNodeId>,
    pub(crate) last: Option<XmlNodeId>,
    pub(crate) parent: Option<XmlNodeId>,
    pub(crate) next: Option<XmlNodeId>,
    pub(crate) prev: Option<XmlNodeId>,
    pub(crate) doc: Option<XmlDocId>,
    // the associated namespace
    pub(crate) ns: Option<XmlNsId>,
    // the content for text-like nodes
    pub(crate) content: Option<XmlString>,
    // properties list
    pub(crate) properties: Option<XmlNodeId>,
    // namespace definitions on this node
    pub(crate) ns_def: Option<XmlNsId>,
    // the attribute type if validating
    pub(crate) atype: Option<XmlAttributeType>,
    // entity references: bound to the declaration of the same name in `doc`
    pub(crate) ent_bound: bool,
    pub(crate) line: u16,
}

impl XmlNode {
    pub(crate) fn with_type(typ: XmlElementType) -> Self {
        Self {
            typ,
            ..Default::default()
        }
    }

    pub fn element_type(&self) -> XmlElementType {
        self.typ
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn name_string(&self) -> Option<&XmlString> {
        self.name.as_ref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn content_string(&self) -> Option<&XmlString> {
        self.content.as_ref()
    }

    pub fn parent(&self) -> Option<XmlNodeId> {
        self.parent
    }

    pub fn next(&self) -> Option<XmlNodeId> {
        self.next
    }

    pub fn prev(&self) -> Option<XmlNodeId> {
        self.prev
    }

    pub fn children(&self) -> Option<XmlNodeId> {
        self.children
    }

    pub fn last(&self) -> Option<XmlNodeId> {
        self.last
    }

    pub fn properties(&self) -> Option<XmlNodeId> {
        self.properties
    }

    pub fn document(&self) -> Option<XmlDocId> {
        self.doc
    }

    pub fn ns(&self) -> Option<XmlNsId> {
        self.ns
    }

    pub fn ns_def(&self) -> Option<XmlNsId> {
        self.ns_def
    }

    pub fn atype(&self) -> Option<XmlAttributeType> {
        self.atype
    }

    pub fn line(&self) -> u16 {
        self.line
    }

    /// Check if this entity reference is bound to a declaration.
    pub fn is_entity_bound(&self) -> bool {
        self.ent_bound
    }

    pub(crate) fn is_named(&self, name: &str) -> bool {
        self.name.as_ref().is_some_and(|n| n == name)
    }
}

impl XmlNodeStore {
    /// Creation of a new node element. `ns` is optional.
    ///
    /// Returns the new node.
    #[doc(alias = "xmlNewNode")]
    pub fn new_node(&mut self, ns: Option<XmlNsId>, name: &str) -> Result<XmlNodeId, XmlTreeError> {
        self.alloc_node(XmlNode {
            name: Some(XmlString::from(name)),
            ns,
            ..XmlNode::with_type(XmlElementType::XmlElementNode)
        })
    }

    /// Creation of a new node element within a document. `ns` and `content`
    /// are optional. The name is interned in the document dictionary if any.
    ///
    /// `content` may hold entity references, see [`XmlNodeStore::string_get_node_list`].
    ///
    /// Returns the new node.
    #[doc(alias = "xmlNewDocNode")]
    pub fn new_doc_node(
        &mut self,
        doc: Option<XmlDocId>,
        ns: Option<XmlNsId>,
        name: &str,
        content: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let dict = doc.and_then(|doc| self[doc].dict.clone());
        let node = self.alloc_node(XmlNode {
            name: Some(XmlString::new_in(name, dict.as_ref())),
            ns,
            doc,
            ..XmlNode::with_type(XmlElementType::XmlElementNode)
        })?;
        if let Some(list) = content
            .map(|content| self.string_get_node_list(doc, content))
            .transpose()?
            .flatten()
        {
            self.add_child_list(node, list)?;
        }
        Ok(node)
    }

    /// Creation of a new child element, added at the end of `parent` children list.
    /// If `ns` is `None`, the newly created element inherits the namespace of `parent`.
    ///
    /// Returns the new node.
    #[doc(alias = "xmlNewChild")]
    pub fn new_child(
        &mut self,
        parent: XmlNodeId,
        ns: Option<XmlNsId>,
        name: &str,
        content: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let ptype = self[parent].typ;
        if !matches!(
            ptype,
            XmlElementType::XmlElementNode
                | XmlElementType::XmlDocumentNode
                | XmlElementType::XmlHTMLDocumentNode
                | XmlElementType::XmlDocumentFragNode
        ) {
            return Err(XmlTreeError::InvalidArgument("parent cannot hold children"));
        }
        let ns = ns.or_else(|| {
            (ptype == XmlElementType::XmlElementNode)
                .then(|| self[parent].ns)
                .flatten()
        });
        let doc = self[parent].doc;
        let cur = self.new_doc_node(doc, ns, name, content)?;
        self.add_child(parent, cur)
    }

    /// Creation of a new text node.
    #[doc(alias = "xmlNewText")]
    pub fn new_text(&mut self, content: &str) -> Result<XmlNodeId, XmlTreeError> {
        self.new_doc_text(None, content)
    }

    /// Creation of a new text node within a document.
    #[doc(alias = "xmlNewDocText")]
    pub fn new_doc_text(
        &mut self,
        doc: Option<XmlDocId>,
        content: &str,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.alloc_node(XmlNode {
            name: Some(XmlString::Static(XML_STRING_TEXT)),
            content: Some(XmlString::from(content)),
            doc,
            ..XmlNode::with_type(XmlElementType::XmlTextNode)
        })
    }

    /// Creation of a new node containing a CDATA block.
    #[doc(alias = "xmlNewCDataBlock")]
    pub fn new_cdata_block(
        &mut self,
        doc: Option<XmlDocId>,
        content: &str,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.alloc_node(XmlNode {
            content: Some(XmlString::from(content)),
            doc,
            ..XmlNode::with_type(XmlElementType::XmlCDATASectionNode)
        })
    }

    /// Creation of a new node containing a comment within a document.
    #[doc(alias = "xmlNewDocComment")]
    pub fn new_doc_comment(
        &mut self,
        doc: Option<XmlDocId>,
        content: &str,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.alloc_node(XmlNode {
            name: Some(XmlString::Static(XML_STRING_COMMENT)),
            content: Some(XmlString::from(content)),
            doc,
            ..XmlNode::with_type(XmlElementType::XmlCommentNode)
        })
    }

    /// Creation of a processing instruction element.
    #[doc(alias = "xmlNewDocPI")]
    pub fn new_doc_pi(
        &mut self,
        doc: Option<XmlDocId>,
        name: &str,
        content: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let dict = doc.and_then(|doc| self[doc].dict.clone());
        self.alloc_node(XmlNode {
            name: Some(XmlString::new_in(name, dict.as_ref())),
            content: content.map(XmlString::from),
            doc,
            ..XmlNode::with_type(XmlElementType::XmlPINode)
        })
    }

    /// Creation of a new reference node. `name` may be given as `&name;`.
    ///
    /// The reference is bound to the entity of the same name if `doc` declares one.
    #[doc(alias = "xmlNewReference")]
    pub fn new_reference(
        &mut self,
        doc: Option<XmlDocId>,
        name: &str,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let name = name.strip_prefix('&').unwrap_or(name);
        let name = name.strip_suffix(';').unwrap_or(name);
        let dict = doc.and_then(|doc| self[doc].dict.clone());
        let content = self
            .get_doc_entity(doc, name)
            .map(|ent| ent.content().map(XmlString::from));
        self.alloc_node(XmlNode {
            name: Some(XmlString::new_in(name, dict.as_ref())),
            ent_bound: content.is_some(),
            content: content.flatten(),
            doc,
            ..XmlNode::with_type(XmlElementType::XmlEntityRefNode)
        })
    }

    /// Creation of a new Fragment node.
    #[doc(alias = "xmlNewDocFragment")]
    pub fn new_doc_fragment(&mut self, doc: Option<XmlDocId>) -> Result<XmlNodeId, XmlTreeError> {
        self.alloc_node(XmlNode {
            doc,
            ..XmlNode::with_type(XmlElementType::XmlDocumentFragNode)
        })
    }

    /// Parse the value string and build the node list associated.
    ///
    /// Character references and predefined entities are substituted, other
    /// entity references become entity reference nodes.
    ///
    /// Returns the first node of the list, or `None` for an empty value.
    #[doc(alias = "xmlStringGetNodeList")]
    pub fn string_get_node_list(
        &mut self,
        doc: Option<XmlDocId>,
        value: &str,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        let mut nodes = vec![];
        let mut buf = String::new();
        let mut rest = value;
        while let Some(pos) = rest.find('&') {
            buf.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];
            let Some(end) = rest.find(';') else {
                xml_tree_err(
                    XmlParserErrors::XmlTreeUnterminatedEntity,
                    None,
                    Some(rest),
                );
                rest = "";
                break;
            };
            let (reference, tail) = (&rest[..end], &rest[end + 1..]);
            rest = tail;
            if let Some(digits) = reference.strip_prefix('#') {
                let (radix, digits, code) = match digits.strip_prefix('x') {
                    Some(hex) => (16, hex, XmlParserErrors::XmlTreeInvalidHex),
                    None => (10, digits, XmlParserErrors::XmlTreeInvalidDec),
                };
                match u32::from_str_radix(digits, radix).ok().and_then(char::from_u32) {
                    Some(c) => buf.push(c),
                    None => xml_tree_err(code, None, None),
                }
                continue;
            }
            if let Some(ent) = self
                .get_doc_entity(doc, reference)
                .filter(|ent| ent.entity_type() == XmlEntityType::XmlInternalPredefinedEntity)
            {
                buf.push_str(ent.content().unwrap_or_default());
                continue;
            }
            if !buf.is_empty() {
                nodes.push(self.new_doc_text(doc, &buf)?);
                buf.clear();
            }
            nodes.push(self.new_reference(doc, reference)?);
        }
        buf.push_str(rest);
        if !buf.is_empty() {
            nodes.push(self.new_doc_text(doc, &buf)?);
        }
        for pair in nodes.windows(2) {
            self[pair[0]].next = Some(pair[1]);
            self[pair[1]].prev = Some(pair[0]);
        }
        Ok(nodes.first().copied())
    }

    /// Iterate over the children of `node`.
    pub fn children_of(&self, node: XmlNodeId) -> impl Iterator<Item = XmlNodeId> + '_ {
        successors(self[node].children, |&cur| self[cur].next)
    }

    /// Iterate over the attributes of `node`.
    pub fn attributes_of(&self, node: XmlNodeId) -> impl Iterator<Item = XmlNodeId> + '_ {
        let first = (self[node].typ == XmlElementType::XmlElementNode)
            .then(|| self[node].properties)
            .flatten();
        successors(first, |&cur| self[cur].next)
    }

    /// Iterate over the namespace declarations of `node`.
    pub fn ns_defs_of(&self, node: XmlNodeId) -> impl Iterator<Item = XmlNsId> + '_ {
        successors(self[node].ns_def, |&cur| self[cur].next)
    }

    /// Iterate over `node` and its ancestors.
    pub fn ancestors_or_self(&self, node: XmlNodeId) -> impl Iterator<Item = XmlNodeId> + '_ {
        successors(Some(node), |&cur| self[cur].parent)
    }

    /// Read the value of a node, this can be either the text carried
    /// directly by this node if it's a TEXT node or the aggregate string
    /// of the values carried by this node child's (TEXT and ENTITY_REF).
    ///
    /// Entity references are substituted.
    ///
    /// Returns a new string or `None` if no content is available.
    #[doc(alias = "xmlNodeGetContent")]
    pub fn get_content(&self, node: XmlNodeId) -> Option<String> {
        let cur = &self[node];
        match cur.typ {
            XmlElementType::XmlDocumentFragNode
            | XmlElementType::XmlElementNode
            | XmlElementType::XmlDocumentNode
            | XmlElementType::XmlHTMLDocumentNode => {
                let mut buf = String::new();
                self.collect_text(node, &mut buf);
                Some(buf)
            }
            XmlElementType::XmlAttributeNode => {
                Some(self.list_get_string(cur.children, true).unwrap_or_default())
            }
            XmlElementType::XmlEntityRefNode => {
                let ent = self.get_doc_entity(cur.doc, cur.name.as_deref()?)?;
                Some(ent.content().unwrap_or_default().to_owned())
            }
            XmlElementType::XmlCommentNode
            | XmlElementType::XmlPINode
            | XmlElementType::XmlTextNode
            | XmlElementType::XmlCDATASectionNode => cur.content.as_deref().map(str::to_owned),
            _ => None,
        }
    }

    fn collect_text(&self, node: XmlNodeId, buf: &mut String) {
        for child in self.children_of(node) {
            let cur = &self[child];
            match cur.typ {
                XmlElementType::XmlTextNode | XmlElementType::XmlCDATASectionNode => {
                    buf.push_str(cur.content.as_deref().unwrap_or_default());
                }
                XmlElementType::XmlEntityRefNode => {
                    if let Some(content) = self.get_content(child) {
                        buf.push_str(&content);
                    }
                }
                XmlElementType::XmlElementNode => self.collect_text(child, buf),
                _ => {}
            }
        }
    }

    /// Build the string equivalent to the text contained in the node list
    /// made of TEXTs and ENTITY_REFs.
    ///
    /// If `in_line` is `true`, entity references are substituted, otherwise
    /// they are kept as `&name;`.
    #[doc(alias = "xmlNodeListGetString")]
    pub fn list_get_string(&self, list: Option<XmlNodeId>, in_line: bool) -> Option<String> {
        let list = list?;
        let mut ret = String::new();
        for cur in successors(Some(list), |&cur| self[cur].next) {
            let node = &self[cur];
            match node.typ {
                XmlElementType::XmlTextNode | XmlElementType::XmlCDATASectionNode => {
                    ret.push_str(node.content.as_deref().unwrap_or_default());
                }
                XmlElementType::XmlEntityRefNode => {
                    let name = node.name.as_deref().unwrap_or_default();
                    if in_line {
                        if let Some(ent) = self.get_doc_entity(node.doc, name) {
                            ret.push_str(ent.content().unwrap_or_default());
                        } else if let Some(content) = node.content.as_deref() {
                            ret.push_str(content);
                        }
                    } else {
                        ret.push('&');
                        ret.push_str(name);
                        ret.push(';');
                    }
                }
                _ => {}
            }
        }
        Some(ret)
    }

    /// Replace the content of a node.
    #[doc(alias = "xmlNodeSetContent")]
    pub fn set_content(&mut self, node: XmlNodeId, content: &str) -> Result<(), XmlTreeError> {
        match self[node].typ {
            XmlElementType::XmlDocumentFragNode
            | XmlElementType::XmlElementNode
            | XmlElementType::XmlAttributeNode => {
                let children = self[node].children.take();
                self[node].last = None;
                self.free_node_list(children);
                let doc = self[node].doc;
                let text = self.new_doc_text(doc, content)?;
                self.add_child(node, text)?;
            }
            XmlElementType::XmlTextNode
            | XmlElementType::XmlCDATASectionNode
            | XmlElementType::XmlEntityRefNode
            | XmlElementType::XmlEntityNode
            | XmlElementType::XmlPINode
            | XmlElementType::XmlCommentNode => {
                self[node].content = Some(XmlString::from(content));
                self[node].children = None;
                self[node].last = None;
            }
            _ => {}
        }
        Ok(())
    }

    /// Append the extra substring to the node content.
    #[doc(alias = "xmlNodeAddContent")]
    pub fn add_content(&mut self, node: XmlNodeId, content: &str) -> Result<(), XmlTreeError> {
        match self[node].typ {
            XmlElementType::XmlDocumentFragNode | XmlElementType::XmlElementNode => {
                // adjacent text is coalesced by add_child
                let doc = self[node].doc;
                let text = self.new_doc_text(doc, content)?;
                self.add_child(node, text)?;
            }
            XmlElementType::XmlTextNode
            | XmlElementType::XmlCDATASectionNode
            | XmlElementType::XmlEntityRefNode
            | XmlElementType::XmlEntityNode
            | XmlElementType::XmlPINode
            | XmlElementType::XmlCommentNode => {
                let mut buf = self[node].content.as_deref().unwrap_or_default().to_owned();
                buf.push_str(content);
                self[node].content = Some(XmlString::from(buf.as_str()));
            }
            _ => {}
        }
        Ok(())
    }

    /// Merge the second text node into the first one if both are text nodes
    /// of the same name. The second node is unlinked and freed.
    ///
    /// Returns the first text node augmented, or `None` if nothing was merged.
    #[doc(alias = "xmlTextMerge")]
    pub fn text_merge(&mut self, first: XmlNodeId, second: XmlNodeId) -> Option<XmlNodeId> {
        if !self.can_merge_text(first, second) {
            return None;
        }
        Some(self.merge_text_into(first, second))
    }

    /// Finds the current number of child nodes of that element which are
    /// element nodes.
    ///
    /// Note the handling of entities references is different than in
    /// the W3C DOM element traversal spec since we don't have back reference
    /// from entities content to entities references.
    #[doc(alias = "xmlChildElementCount")]
    pub fn child_element_count(&self, parent: XmlNodeId) -> usize {
        if !self.can_hold_elements(parent) {
            return 0;
        }
        self.children_of(parent)
            .filter(|&cur| self[cur].typ == XmlElementType::XmlElementNode)
            .count()
    }

    /// Finds the first child node of that element which is a Element node.
    #[doc(alias = "xmlFirstElementChild")]
    pub fn first_element_child(&self, parent: XmlNodeId) -> Option<XmlNodeId> {
        if !self.can_hold_elements(parent) {
            return None;
        }
        self.children_of(parent)
            .find(|&cur| self[cur].typ == XmlElementType::XmlElementNode)
    }

    /// Finds the last child node of that element which is a Element node.
    #[doc(alias = "xmlLastElementChild")]
    pub fn last_element_child(&self, parent: XmlNodeId) -> Option<XmlNodeId> {
        if !self.can_hold_elements(parent) {
            return None;
        }
        successors(self[parent].last, |&cur| self[cur].prev)
            .find(|&cur| self[cur].typ == XmlElementType::XmlElementNode)
    }

    /// Finds the first closest next sibling of the node which is an element node.
    #[doc(alias = "xmlNextElementSibling")]
    pub fn next_element_sibling(&self, node: XmlNodeId) -> Option<XmlNodeId> {
        if self[node].typ == XmlElementType::XmlAttributeNode {
            return None;
        }
        successors(self[node].next, |&cur| self[cur].next)
            .find(|&cur| self[cur].typ == XmlElementType::XmlElementNode)
    }

    /// Finds the first closest previous sibling of the node which is an element node.
    #[doc(alias = "xmlPreviousElementSibling")]
    pub fn previous_element_sibling(&self, node: XmlNodeId) -> Option<XmlNodeId> {
        if self[node].typ == XmlElementType::XmlAttributeNode {
            return None;
        }
        successors(self[node].prev, |&cur| self[cur].prev)
            .find(|&cur| self[cur].typ == XmlElementType::XmlElementNode)
    }

    fn can_hold_elements(&self, node: XmlNodeId) -> bool {
        matches!(
            self[node].typ,
            XmlElementType::XmlElementNode
                | XmlElementType::XmlEntityNode
                | XmlElementType::XmlDocumentNode
                | XmlElementType::XmlDocumentFragNode
                | XmlElementType::XmlHTMLDocumentNode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_new_child_inherits_ns() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(Some("1.0")).unwrap();
        let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
        store.set_root_element(doc, root).unwrap();
        let ns = store.new_ns(Some(root), Some("urn:a"), Some("a")).unwrap();
        store.set_ns(root, Some(ns));

        let child = store.new_child(root, None, "child", Some("text")).unwrap();
        assert_eq!(store[child].ns(), Some(ns));
        assert_eq!(store[child].document(), Some(doc));
        assert_eq!(store.get_content(child).as_deref(), Some("text"));
        assert_eq!(store.child_element_count(root), 1);
        assert_eq!(store.first_element_child(root), Some(child));
        assert_eq!(store.last_element_child(root), Some(child));
    }

    #[test]
    fn test_xml_get_content_substitutes_entities() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(Some("1.0")).unwrap();
        let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
        let text = store.new_doc_text(Some(doc), "a").unwrap();
        store.add_child(root, text).unwrap();
        let amp = store.new_reference(Some(doc), "&amp;").unwrap();
        assert!(store[amp].is_entity_bound());
        store.add_child(root, amp).unwrap();
        let text = store.new_doc_text(Some(doc), "b").unwrap();
        store.add_child(root, text).unwrap();

        assert_eq!(store.get_content(root).as_deref(), Some("a&b"));
        assert_eq!(
            store.list_get_string(store[root].children(), false).as_deref(),
            Some("a&amp;b")
        );
    }

    #[test]
    fn test_xml_text_merge() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let first = store.new_text("a").unwrap();
        store.add_child(root, first).unwrap();
        let cdata = store.new_cdata_block(None, "<x>").unwrap();
        store.add_child(root, cdata).unwrap();
        assert_eq!(store.text_merge(first, cdata), None);
        assert_eq!(store[cdata].content(), Some("<x>"));

        let second = store.new_text("b").unwrap();
        assert_eq!(store.text_merge(first, second), Some(first));
        assert_eq!(store[first].content(), Some("ab"));
        assert_eq!(store.get_content(root).as_deref(), Some("ab<x>"));
    }

    #[test]
    fn test_xml_element_siblings() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let a = store.new_child(root, None, "a", None).unwrap();
        let comment = store.new_doc_comment(None, "c").unwrap();
        store.add_child(root, comment).unwrap();
        let b = store.new_child(root, None, "b", None).unwrap();

        assert_eq!(store.next_element_sibling(a), Some(b));
        assert_eq!(store.previous_element_sibling(b), Some(a));
        assert_eq!(store.next_element_sibling(b), None);
        assert_eq!(store.children_of(root).count(), 3);
    }

    #[test]
    fn test_xml_string_get_node_list() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        store.create_int_subset(doc, Some("root"), None, None).unwrap();
        store
            .add_doc_entity(doc, "e", XmlEntityType::XmlInternalGeneralEntity, None, None, Some("E"))
            .unwrap();
        let first = store
            .string_get_node_list(Some(doc), "a&lt;&#x42;&e;c")
            .unwrap()
            .unwrap();
        assert_eq!(store[first].content(), Some("a<B"));
        let reference = store[first].next().unwrap();
        assert_eq!(store[reference].element_type(), XmlElementType::XmlEntityRefNode);
        assert!(store[reference].is_entity_bound());
        let last = store[reference].next().unwrap();
        assert_eq!(store[last].content(), Some("c"));
        assert_eq!(store.string_get_node_list(Some(doc), "").unwrap(), None);
    }

    #[test]
    fn test_xml_add_content_merges_text() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        store.set_content(root, "foo").unwrap();
        store.add_content(root, "bar").unwrap();
        assert_eq!(store.children_of(root).count(), 1);
        assert_eq!(store.get_content(root).as_deref(), Some("foobar"));
    }
}
