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

use crate::error::XmlTreeError;

use super::{
    XmlAttributeType, XmlDocId, XmlElementType, XmlNode, XmlNodeId, XmlNodeStore, XmlNsId,
    XmlString, split_qname3,
};

impl XmlNodeStore {
    pub(super) fn new_prop_internal(
        &mut self,
        node: Option<XmlNodeId>,
        ns: Option<XmlNsId>,
        name: &str,
        value: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        if node.is_some_and(|node| self[node].typ != XmlElementType::XmlElementNode) {
            return Err(XmlTreeError::InvalidArgument(
                "attributes can only be carried by elements",
            ));
        }
        let doc = node.and_then(|node| self[node].doc);
        let dict = doc.and_then(|doc| self[doc].dict.clone());

        // Allocate a new property and fill the fields.
        let cur = self.alloc_node(XmlNode {
            name: Some(XmlString::new_in(name, dict.as_ref())),
            parent: node,
            ns,
            doc,
            ..XmlNode::with_type(XmlElementType::XmlAttributeNode)
        })?;
        if let Some(value) = value {
            let text = self.new_doc_text(doc, value)?;
            self[text].parent = Some(cur);
            self[cur].children = Some(text);
            self[cur].last = Some(text);
        }

        // Add it at the end to preserve parsing order ...
        if let Some(node) = node {
            match self.attributes_of(node).last() {
                Some(prev) => {
                    self[prev].next = Some(cur);
                    self[cur].prev = Some(prev);
                }
                None => self[node].properties = Some(cur),
            }
            if let Some((doc, value)) = doc.zip(value) {
                if self.is_id(Some(doc), Some(node), cur) {
                    // a duplicate is reported, the attribute stays untyped
                    self.add_id(doc, value, cur).ok();
                }
            }
        }
        Ok(cur)
    }

    /// Create a new property carried by a node.
    ///
    /// Returns the attribute.
    #[doc(alias = "xmlNewProp")]
    pub fn new_prop(
        &mut self,
        node: Option<XmlNodeId>,
        name: &str,
        value: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.new_prop_internal(node, None, name, value)
    }

    /// Create a new property tagged with a namespace and carried by a node.
    ///
    /// Returns the attribute.
    #[doc(alias = "xmlNewNsProp")]
    pub fn new_ns_prop(
        &mut self,
        node: Option<XmlNodeId>,
        ns: Option<XmlNsId>,
        name: &str,
        value: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.new_prop_internal(node, ns, name, value)
    }

    /// Create a new property carried by a document.
    ///
    /// `value` may contain entity references, which become entity reference
    /// children of the attribute.
    #[doc(alias = "xmlNewDocProp")]
    pub fn new_doc_prop(
        &mut self,
        doc: Option<XmlDocId>,
        name: &str,
        value: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let dict = doc.and_then(|doc| self[doc].dict.clone());
        let cur = self.alloc_node(XmlNode {
            name: Some(XmlString::new_in(name, dict.as_ref())),
            doc,
            ..XmlNode::with_type(XmlElementType::XmlAttributeNode)
        })?;
        if let Some(value) = value {
            if let Some(list) = self.string_get_node_list(doc, value)? {
                self.add_child_list(cur, list)?;
            }
        }
        Ok(cur)
    }

    /// Search an attribute associated to a node, whatever its namespace.
    ///
    /// Returns the attribute or `None` if not found.
    #[doc(alias = "xmlHasProp")]
    pub fn has_prop(&self, node: XmlNodeId, name: &str) -> Option<XmlNodeId> {
        self.attributes_of(node).find(|&attr| self[attr].is_named(name))
    }

    /// Search for an attribute associated to a node.
    ///
    /// If `href` is `None`, the attribute must not be in a namespace.
    ///
    /// Returns the attribute or `None` if not found.
    #[doc(alias = "xmlHasNsProp")]
    pub fn has_ns_prop(
        &self,
        node: XmlNodeId,
        name: &str,
        href: Option<&str>,
    ) -> Option<XmlNodeId> {
        self.attributes_of(node).find(|&attr| {
            let attr = &self[attr];
            attr.is_named(name)
                && match (attr.ns, href) {
                    (None, None) => true,
                    (Some(ns), Some(href)) => self[ns].href() == Some(href),
                    _ => false,
                }
        })
    }

    /// Search and get the value of an attribute associated to a node.
    ///
    /// This only matches attributes that are not in a namespace.
    /// Entity references are substituted.
    ///
    /// Returns the attribute value or `None` if not found.
    #[doc(alias = "xmlGetNoNsProp", alias = "xmlGetProp")]
    pub fn get_prop(&self, node: XmlNodeId, name: &str) -> Option<String> {
        self.get_ns_prop(node, name, None)
    }

    /// Search and get the value of an attribute associated to a node.
    ///
    /// Returns the attribute value or `None` if not found.
    #[doc(alias = "xmlGetNsProp")]
    pub fn get_ns_prop(&self, node: XmlNodeId, name: &str, href: Option<&str>) -> Option<String> {
        let attr = self.has_ns_prop(node, name, href)?;
        Some(self.list_get_string(self[attr].children, true).unwrap_or_default())
    }

    /// Set (or reset) an attribute carried by a node.
    ///
    /// If `name` has a prefix, then the corresponding namespace-binding will be used,
    /// if in scope; if there's no such binding the full name is used as is.
    ///
    /// Returns the attribute.
    #[doc(alias = "xmlSetProp")]
    pub fn set_prop(
        &mut self,
        node: XmlNodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        // handle QNames
        if let Some((prefix, local)) = split_qname3(name) {
            if let Some(ns) = self.search_ns(node, Some(prefix)) {
                return self.set_ns_prop(node, Some(ns), local, value);
            }
        }
        self.set_ns_prop(node, None, name, value)
    }

    /// Set (or reset) an attribute carried by a node.
    /// The ns structure must be in scope, this is not checked.
    ///
    /// Returns the attribute.
    #[doc(alias = "xmlSetNsProp")]
    pub fn set_ns_prop(
        &mut self,
        node: XmlNodeId,
        ns: Option<XmlNsId>,
        name: &str,
        value: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        if self[node].typ != XmlElementType::XmlElementNode {
            return Err(XmlTreeError::InvalidArgument(
                "attributes can only be carried by elements",
            ));
        }
        let href = ns.and_then(|ns| self[ns].href.as_deref().map(str::to_owned));
        if ns.is_some() && href.is_none() {
            return Err(XmlTreeError::InvalidArgument("namespace without href"));
        }
        let Some(prop) = self.has_ns_prop(node, name, href.as_deref()) else {
            // No equal attr found; create a new one.
            return self.new_prop_internal(Some(node), ns, name, value);
        };

        // Modify the attribute's value.
        let doc = self[node].doc;
        let is_id = self[prop].atype == Some(XmlAttributeType::XmlAttributeID);
        if let Some(doc) = doc.filter(|_| is_id) {
            self.remove_id(doc, prop);
        }
        let children = self[prop].children.take();
        self[prop].last = None;
        self.free_node_list(children);
        self[prop].ns = ns;
        if let Some(value) = value {
            let text = self.new_doc_text(doc, value)?;
            self[text].parent = Some(prop);
            self[prop].children = Some(text);
            self[prop].last = Some(text);
        }
        if let Some((doc, value)) = doc.zip(value).filter(|_| is_id) {
            self.add_id(doc, value, prop)?;
        }
        Ok(prop)
    }

    /// Remove an attribute carried by a node.
    /// This handles only attributes in no namespace.
    ///
    /// Returns `true` if an attribute was removed.
    #[doc(alias = "xmlUnsetProp")]
    pub fn unset_prop(&mut self, node: XmlNodeId, name: &str) -> bool {
        self.unset_ns_prop(node, None, name)
    }

    /// Remove an attribute carried by a node.
    ///
    /// Returns `true` if an attribute was removed.
    #[doc(alias = "xmlUnsetNsProp")]
    pub fn unset_ns_prop(&mut self, node: XmlNodeId, ns: Option<XmlNsId>, name: &str) -> bool {
        let href = ns.and_then(|ns| self[ns].href.as_deref().map(str::to_owned));
        let Some(prop) = self.has_ns_prop(node, name, href.as_deref()) else {
            return false;
        };
        self.unlink_node(prop);
        self.free_prop(prop);
        true
    }

    /// Unlink and free one attribute, all the content is freed too.
    ///
    /// Returns `false` if the attribute was not attached to an element.
    #[doc(alias = "xmlRemoveProp")]
    pub fn remove_prop(&mut self, attr: XmlNodeId) -> bool {
        let Some(parent) = self[attr].parent else {
            return false;
        };
        if self.attributes_of(parent).all(|prop| prop != attr) {
            return false;
        }
        self.unlink_node(attr);
        self.free_prop(attr);
        true
    }

    /// Free one attribute, all the content is freed too
    #[doc(alias = "xmlFreeProp")]
    pub fn free_prop(&mut self, cur: XmlNodeId) {
        let Some(attr) = self.get_node(cur) else {
            return;
        };
        // Check for ID removal -> leading to invalid references !
        if let Some(doc) = attr
            .doc
            .filter(|_| attr.atype == Some(XmlAttributeType::XmlAttributeID))
        {
            self.remove_id(doc, cur);
        }
        let children = self[cur].children.take();
        self.free_node_list(children);
        self.release_node(cur);
    }

    /// Free a property and all its siblings, all the children are freed too.
    #[doc(alias = "xmlFreePropList")]
    pub fn free_prop_list(&mut self, cur: Option<XmlNodeId>) {
        let mut cur = cur;
        while let Some(now) = cur {
            cur = self.get_node(now).and_then(|attr| attr.next);
            self.free_prop(now);
        }
    }

    /// Creation of a new child element, added at the end of `parent` children list.
    ///
    /// Unlike [`XmlNodeStore::new_child`], `content` is taken literally, an
    /// `&` never starts an entity reference.
    ///
    /// Returns the new node.
    #[doc(alias = "xmlNewTextChild")]
    pub fn new_text_child(
        &mut self,
        parent: XmlNodeId,
        ns: Option<XmlNsId>,
        name: &str,
        content: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let cur = self.new_child(parent, ns, name, None)?;
        if let Some(content) = content {
            let doc = self[cur].doc;
            let text = self.new_doc_text(doc, content)?;
            self.add_child(cur, text)?;
        }
        Ok(cur)
    }
}
