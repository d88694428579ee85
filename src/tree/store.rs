//! Arena holding every node, namespace and document of a set of trees.
//!
//! Tree links are plain handles into the arena, so a subtree can move
//! from one document to another without reallocating anything.

use std::{
    fmt,
    num::NonZeroU32,
    ops::{Index, IndexMut},
};

use crate::error::XmlTreeError;

use super::{XML_XML_NAMESPACE, XML_XML_PREFIX, XmlDoc, XmlNode, XmlNs, xml_tree_err_memory};

macro_rules! impl_handle {
    ($name:ident, $kind:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            fn from_index(index: usize) -> Result<Self, XmlTreeError> {
                let raw = u32::try_from(index).map_err(|_| XmlTreeError::OutOfMemory)?;
                Ok(Self(NonZeroU32::MIN.saturating_add(raw)))
            }

            pub(crate) fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($kind, "#{}"), self.0)
            }
        }
    };
}

impl_handle!(XmlNodeId, "node");
impl_handle!(XmlNsId, "ns");
impl_handle!(XmlDocId, "doc");

/// Storage for nodes, namespace declarations and documents.
///
/// Freed slots are never reused, so a stale handle can never alias a newer
/// object; it only fails to resolve.
pub struct XmlNodeStore {
    nodes: Vec<Option<XmlNode>>,
    namespaces: Vec<Option<XmlNs>>,
    documents: Vec<Option<XmlDoc>>,
    xml_ns: XmlNsId,
}

impl XmlNodeStore {
    pub fn new() -> Self {
        let xml = XmlNs {
            next: None,
            href: Some(XML_XML_NAMESPACE.into()),
            prefix: Some(XML_XML_PREFIX.into()),
            context: None,
        };
        Self {
            nodes: vec![],
            namespaces: vec![Some(xml)],
            documents: vec![],
            xml_ns: XmlNsId(NonZeroU32::MIN),
        }
    }

    /// The declaration of the `xml` prefix.
    ///
    /// It is shared by every tree of the store and is never freed.
    pub fn xml_namespace(&self) -> XmlNsId {
        self.xml_ns
    }

    pub(crate) fn alloc_node(&mut self, node: XmlNode) -> Result<XmlNodeId, XmlTreeError> {
        let id = XmlNodeId::from_index(self.nodes.len()).inspect_err(|_| {
            xml_tree_err_memory("building node");
        })?;
        self.nodes.push(Some(node));
        Ok(id)
    }

    pub(crate) fn alloc_ns(&mut self, ns: XmlNs) -> Result<XmlNsId, XmlTreeError> {
        let id = XmlNsId::from_index(self.namespaces.len()).inspect_err(|_| {
            xml_tree_err_memory("building namespace");
        })?;
        self.namespaces.push(Some(ns));
        Ok(id)
    }

    pub(crate) fn alloc_doc(&mut self, doc: XmlDoc) -> Result<XmlDocId, XmlTreeError> {
        let id = XmlDocId::from_index(self.documents.len()).inspect_err(|_| {
            xml_tree_err_memory("building doc");
        })?;
        self.documents.push(Some(doc));
        Ok(id)
    }

    /// Release the slot of `node` only. Links are the caller's business.
    pub(crate) fn release_node(&mut self, node: XmlNodeId) -> Option<XmlNode> {
        self.nodes.get_mut(node.index()).and_then(Option::take)
    }

    pub(crate) fn release_ns(&mut self, ns: XmlNsId) -> Option<XmlNs> {
        if ns == self.xml_ns {
            return None;
        }
        self.namespaces.get_mut(ns.index()).and_then(Option::take)
    }

    pub(crate) fn release_doc(&mut self, doc: XmlDocId) -> Option<XmlDoc> {
        self.documents.get_mut(doc.index()).and_then(Option::take)
    }

    pub fn get_node(&self, node: XmlNodeId) -> Option<&XmlNode> {
        self.nodes.get(node.index()).and_then(Option::as_ref)
    }

    pub fn get_ns(&self, ns: XmlNsId) -> Option<&XmlNs> {
        self.namespaces.get(ns.index()).and_then(Option::as_ref)
    }

    pub fn get_doc(&self, doc: XmlDocId) -> Option<&XmlDoc> {
        self.documents.get(doc.index()).and_then(Option::as_ref)
    }

    /// Check if `node` still refers to a live node.
    pub fn is_live(&self, node: XmlNodeId) -> bool {
        self.get_node(node).is_some()
    }

    /// Check if `ns` still refers to a live namespace declaration.
    pub fn is_live_ns(&self, ns: XmlNsId) -> bool {
        self.get_ns(ns).is_some()
    }

    /// Number of live nodes in the store.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }
}

impl Default for XmlNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
/// - Indexing with a handle whose node was freed.
impl Index<XmlNodeId> for XmlNodeStore {
    type Output = XmlNode;

    fn index(&self, index: XmlNodeId) -> &Self::Output {
        match self.nodes.get(index.index()) {
            Some(Some(node)) => node,
            _ => panic!("{index:?} was freed"),
        }
    }
}

impl IndexMut<XmlNodeId> for XmlNodeStore {
    fn index_mut(&mut self, index: XmlNodeId) -> &mut Self::Output {
        match self.nodes.get_mut(index.index()) {
            Some(Some(node)) => node,
            _ => panic!("{index:?} was freed"),
        }
    }
}

/// # Panics
/// - Indexing with a handle whose namespace was freed.
impl Index<XmlNsId> for XmlNodeStore {
    type Output = XmlNs;

    fn index(&self, index: XmlNsId) -> &Self::Output {
        match self.namespaces.get(index.index()) {
            Some(Some(ns)) => ns,
            _ => panic!("{index:?} was freed"),
        }
    }
}

impl IndexMut<XmlNsId> for XmlNodeStore {
    fn index_mut(&mut self, index: XmlNsId) -> &mut Self::Output {
        match self.namespaces.get_mut(index.index()) {
            Some(Some(ns)) => ns,
            _ => panic!("{index:?} was freed"),
        }
    }
}

/// # Panics
/// - Indexing with a handle whose document was freed.
impl Index<XmlDocId> for XmlNodeStore {
    type Output = XmlDoc;

    fn index(&self, index: XmlDocId) -> &Self::Output {
        match self.documents.get(index.index()) {
            Some(Some(doc)) => doc,
            _ => panic!("{index:?} was freed"),
        }
    }
}

impl IndexMut<XmlDocId> for XmlNodeStore {
    fn index_mut(&mut self, index: XmlDocId) -> &mut Self::Output {
        match self.documents.get_mut(index.index()) {
            Some(Some(doc)) => doc,
            _ => panic!("{index:?} was freed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_not_reused() {
        let mut store = XmlNodeStore::new();
        let a = store.new_node(None, "a").unwrap();
        store.free_node(a);
        let b = store.new_node(None, "b").unwrap();
        assert_ne!(a, b);
        assert!(!store.is_live(a));
        assert!(store.is_live(b));
    }

    #[test]
    fn test_xml_namespace_is_permanent() {
        let mut store = XmlNodeStore::new();
        let xml = store.xml_namespace();
        assert!(store.release_ns(xml).is_none());
        assert_eq!(store[xml].href(), Some(XML_XML_NAMESPACE));
        assert_eq!(store[xml].prefix(), Some(XML_XML_PREFIX));
    }
}
