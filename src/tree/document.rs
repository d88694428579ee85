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

use std::collections::HashMap;

use crate::{dict::XmlDictRef, error::XmlTreeError};

use super::{
    XmlDocId, XmlDtd, XmlElementType, XmlID, XmlNode, XmlNodeId, XmlNodeStore, XmlNsId,
};

/// A document.
///
/// The tree itself hangs off the document node, an `XmlDocumentNode`
/// whose children are the DTD, the root element and top level misc nodes.
#[derive(Debug)]
pub struct XmlDoc {
    // the document node
    pub(crate) node: XmlNodeId,
    // XML_DOCUMENT_NODE or XML_HTML_DOCUMENT_NODE
    pub(crate) typ: XmlElementType,
    // dict used to allocate names or None
    pub(crate) dict: Option<XmlDictRef>,
    // the document internal subset
    pub(crate) int_subset: Option<XmlDtd>,
    // Global namespace, the old way
    pub(crate) old_ns: Option<XmlNsId>,
    // the XML version string
    pub(crate) version: Option<String>,
    // Hash table for ID attributes if any
    pub(crate) ids: HashMap<String, XmlID>,
    // The URI for that document
    pub(crate) url: Option<String>,
}

impl XmlDoc {
    /// The node holding the tree of this document.
    pub fn document_node(&self) -> XmlNodeId {
        self.node
    }

    pub fn element_type(&self) -> XmlElementType {
        self.typ
    }

    pub fn dict(&self) -> Option<&XmlDictRef> {
        self.dict.as_ref()
    }

    pub fn int_subset(&self) -> Option<&XmlDtd> {
        self.int_subset.as_ref()
    }

    /// Head of the chain of declarations that are not held by any element.
    pub fn old_ns(&self) -> Option<XmlNsId> {
        self.old_ns
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: Option<&str>) {
        self.url = url.map(str::to_owned);
    }

    /// Number of registered IDs.
    pub fn id_count(&self) -> usize {
        self.ids.len()
    }
}

impl XmlNodeStore {
    /// Creates a new XML document
    ///
    /// Returns a new document
    #[doc(alias = "xmlNewDoc")]
    pub fn new_doc(&mut self, version: Option<&str>) -> Result<XmlDocId, XmlTreeError> {
        self.new_doc_internal(version, None, XmlElementType::XmlDocumentNode)
    }

    /// Creates a new XML document whose names are interned in `dict`.
    ///
    /// Several documents may share one dictionary.
    pub fn new_doc_with_dict(
        &mut self,
        version: Option<&str>,
        dict: XmlDictRef,
    ) -> Result<XmlDocId, XmlTreeError> {
        self.new_doc_internal(version, Some(dict), XmlElementType::XmlDocumentNode)
    }

    /// Creates a new HTML document. IDs of HTML documents are detected by name.
    #[doc(alias = "htmlNewDocNoDtD")]
    pub fn new_html_doc(&mut self) -> Result<XmlDocId, XmlTreeError> {
        self.new_doc_internal(None, None, XmlElementType::XmlHTMLDocumentNode)
    }

    pub(crate) fn new_doc_internal(
        &mut self,
        version: Option<&str>,
        dict: Option<XmlDictRef>,
        typ: XmlElementType,
    ) -> Result<XmlDocId, XmlTreeError> {
        let version = version.unwrap_or("1.0");
        let node = self.alloc_node(XmlNode::with_type(typ))?;
        let doc = match self.alloc_doc(XmlDoc {
            node,
            typ,
            dict,
            int_subset: None,
            old_ns: None,
            version: (typ == XmlElementType::XmlDocumentNode).then(|| version.to_owned()),
            ids: HashMap::new(),
            url: None,
        }) {
            Ok(doc) => doc,
            Err(err) => {
                self.release_node(node);
                return Err(err);
            }
        };
        self[node].doc = Some(doc);
        Ok(doc)
    }

    /// Free up all the structures used by a document, tree included.
    #[doc(alias = "xmlFreeDoc")]
    pub fn free_doc(&mut self, cur: XmlDocId) {
        let Some(doc) = self.get_doc(cur) else {
            return;
        };
        let node = doc.node;
        // Do this before freeing the children list to avoid ID lookups
        self[cur].ids.clear();
        if let Some(node) = self[cur].int_subset.take().and_then(|dtd| dtd.node) {
            self.unlink_node(node);
            self.release_node(node);
        }
        let children = self[node].children.take();
        self[node].last = None;
        self.free_node_list(children);
        let old_ns = self[cur].old_ns.take();
        self.free_ns_list(old_ns);
        self.release_node(node);
        self.release_doc(cur);
    }

    /// Get the root element of the document
    /// (the document node children is a list containing possibly comments, PIs, etc ...).
    ///
    /// Returns the root or `None`
    #[doc(alias = "xmlDocGetRootElement")]
    pub fn get_root_element(&self, doc: XmlDocId) -> Option<XmlNodeId> {
        self.children_of(self[doc].node)
            .find(|&cur| self[cur].typ == XmlElementType::XmlElementNode)
    }

    /// Set the root element of the document
    /// (the document node children is a list containing possibly comments, PIs, etc ...).
    ///
    /// Returns the old root element if any was found.
    #[doc(alias = "xmlDocSetRootElement")]
    pub fn set_root_element(
        &mut self,
        doc: XmlDocId,
        root: XmlNodeId,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        if self[root].typ != XmlElementType::XmlElementNode {
            return Err(XmlTreeError::InvalidArgument("the root must be an element"));
        }
        self.unlink_node(root);
        self.set_tree_doc(root, Some(doc));
        let old = self.get_root_element(doc);
        if let Some(old) = old {
            self.replace_node(old, Some(root))?;
        } else {
            let node = self[doc].node;
            self.add_child(node, root)?;
        }
        Ok(old)
    }

    /// Append `ns` to the fallback chain of `doc`.
    pub(crate) fn append_old_ns(&mut self, doc: XmlDocId, ns: XmlNsId) {
        self[ns].next = None;
        self[ns].context = Some(doc);
        match self.ns_chain(self[doc].old_ns).last() {
            Some(last) => self[last].next = Some(ns),
            None => self[doc].old_ns = Some(ns),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_set_root_element() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        assert_eq!(store[doc].version(), Some("1.0"));
        let comment = store.new_doc_comment(Some(doc), "c").unwrap();
        let doc_node = store[doc].document_node();
        store.add_child(doc_node, comment).unwrap();

        let first = store.new_node(None, "first").unwrap();
        assert_eq!(store.set_root_element(doc, first).unwrap(), None);
        assert_eq!(store[first].document(), Some(doc));
        assert_eq!(store.get_root_element(doc), Some(first));

        let second = store.new_node(None, "second").unwrap();
        assert_eq!(store.set_root_element(doc, second).unwrap(), Some(first));
        assert_eq!(store.get_root_element(doc), Some(second));
        assert_eq!(store[first].parent(), None);
        assert_eq!(store[comment].next(), Some(second));
    }

    #[test]
    fn test_xml_free_doc_releases_tree() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        let root = store.new_doc_node(Some(doc), None, "root", Some("text")).unwrap();
        store.set_root_element(doc, root).unwrap();
        store.new_ns(Some(root), Some("urn:a"), Some("a")).unwrap();
        store.free_doc(doc);
        assert!(store.get_doc(doc).is_none());
        assert!(!store.is_live(root));
        assert_eq!(store.node_count(), 0);
    }
}
