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

use std::collections::VecDeque;

use crate::{
    error::XmlTreeError,
    tree::{XML_XML_PREFIX, XmlDocId, XmlElementType, XmlNodeId, XmlNodeStore, XmlNsId},
};

/// Where an entry of the namespace map comes from.
///
/// The order of the variants is significant: every entry is below the
/// entries pushed for elements, and only `Parent` and element entries are
/// subject to scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum XmlNsMapDepth {
    /// Returned by the custom acquisition callback.
    Custom,
    /// Stored in the fallback chain of the destination document.
    Doc,
    /// The `xml` namespace.
    Xml,
    /// In scope on the parent the walk is attached to.
    Parent,
    /// Declared by the element at this depth of the walk. The walk root is at depth 1.
    Element(usize),
}

#[derive(Debug, Clone)]
pub struct XmlNsMapItem {
    pub(crate) old_ns: Option<XmlNsId>,
    pub(crate) new_ns: XmlNsId,
    // the depth at which the entry got shadowed
    pub(crate) shadow_depth: Option<usize>,
    pub(crate) depth: XmlNsMapDepth,
}

impl XmlNsMapItem {
    pub fn old_ns(&self) -> Option<XmlNsId> {
        self.old_ns
    }

    pub fn new_ns(&self) -> XmlNsId {
        self.new_ns
    }

    pub fn shadow_depth(&self) -> Option<usize> {
        self.shadow_depth
    }

    pub fn depth(&self) -> XmlNsMapDepth {
        self.depth
    }

    pub fn is_shadowed(&self) -> bool {
        self.shadow_depth.is_some()
    }
}

/// The namespace map used during the walks of the DOM wrapper operations.
///
/// It maps the namespaces referenced in the walked subtree to the
/// namespaces they are replaced with. Popped entries keep their storage
/// for the next walk.
#[derive(Debug, Clone, Default)]
pub struct XmlNsMap {
    items: VecDeque<XmlNsMapItem>,
}

impl XmlNsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &XmlNsMapItem> {
        self.items.iter()
    }

    /// Adds an ns-mapping item, at the front if `front` is `true`.
    #[doc(alias = "xmlDOMWrapNsMapAddItem")]
    pub fn add_item(
        &mut self,
        front: bool,
        old_ns: Option<XmlNsId>,
        new_ns: XmlNsId,
        depth: XmlNsMapDepth,
    ) -> &mut XmlNsMapItem {
        let item = XmlNsMapItem {
            old_ns,
            new_ns,
            shadow_depth: None,
            depth,
        };
        if front {
            self.items.push_front(item);
            &mut self.items[0]
        } else {
            self.items.push_back(item);
            let last = self.items.len() - 1;
            &mut self.items[last]
        }
    }

    /// Drop every entry pushed at `depth` or deeper, then unshadow the
    /// entries shadowed there.
    pub(crate) fn leave_depth(&mut self, depth: usize) {
        self.items
            .retain(|item| item.depth < XmlNsMapDepth::Element(depth));
        for item in &mut self.items {
            if item.shadow_depth.is_some_and(|shadow| shadow >= depth) {
                item.shadow_depth = None;
            }
        }
    }

    /// Shadow, at `depth`, every visible entry whose namespace binds `prefix`.
    pub(crate) fn shadow_prefix(
        &mut self,
        store: &XmlNodeStore,
        prefix: Option<&str>,
        depth: usize,
    ) {
        for item in &mut self.items {
            if item.depth >= XmlNsMapDepth::Parent
                && item.shadow_depth.is_none()
                && store[item.new_ns].prefix() == prefix
            {
                item.shadow_depth = Some(depth);
            }
        }
    }

    /// Search the unshadowed mapping of `old_ns`, the most recent first.
    pub fn find(&self, old_ns: XmlNsId) -> Option<XmlNsId> {
        self.items
            .iter()
            .rev()
            .find(|item| item.shadow_depth.is_none() && item.old_ns == Some(old_ns))
            .map(|item| item.new_ns)
    }

    /// Search a visible entry declaring the same prefix and URI as `ns`.
    pub(crate) fn find_equivalent(&self, store: &XmlNodeStore, ns: XmlNsId) -> Option<XmlNsId> {
        let ns = &store[ns];
        self.items
            .iter()
            .find(|item| {
                let new = &store[item.new_ns];
                item.depth >= XmlNsMapDepth::Parent
                    && item.shadow_depth.is_none()
                    && new.prefix() == ns.prefix()
                    && new.href() == ns.href()
            })
            .map(|item| item.new_ns)
    }

    /// Empty the map, keeping its storage.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl XmlNodeStore {
    /// Puts in-scope namespaces into the ns-map.
    ///
    /// The declarations of `node` and its ancestors are pushed at the front
    /// of `map`. A declaration hidden by a closer one is pushed shadowed.
    #[doc(alias = "xmlDOMWrapNSNormGatherInScopeNs")]
    pub(crate) fn gather_in_scope_ns(&self, map: &mut XmlNsMap, node: XmlNodeId) {
        for cur in self.ancestors_or_self(node) {
            if self[cur].typ.is_document() {
                break;
            }
            if self[cur].typ != XmlElementType::XmlElementNode {
                continue;
            }
            for ns in self.ns_defs_of(cur) {
                let prefix = self[ns].prefix();
                let shadowed = map
                    .iter()
                    .any(|item| self[item.new_ns].prefix() == prefix);
                let item = map.add_item(true, None, ns, XmlNsMapDepth::Parent);
                if shadowed {
                    item.shadow_depth = Some(0);
                }
            }
        }
    }

    /// Searches for a matching ns-name in the ns-decls of the map, and if not
    /// found, declares a new one: on `elem` if given, else in the fallback
    /// chain of `doc`.
    ///
    /// `depth` is the depth of `elem` in the walk. `prefixed` requires a
    /// prefixed declaration, as attributes need.
    #[doc(alias = "xmlDOMWrapNSNormAcquireNormalizedNs")]
    pub(crate) fn acquire_normalized_ns(
        &mut self,
        doc: XmlDocId,
        elem: Option<XmlNodeId>,
        ns: XmlNsId,
        map: &mut XmlNsMap,
        depth: usize,
        prefixed: bool,
    ) -> Result<XmlNsId, XmlTreeError> {
        // Handle XML namespace.
        if self[ns].prefix() == Some(XML_XML_PREFIX) {
            return Ok(self.xml_namespace());
        }
        let href = self[ns].href.clone();
        let prefix = self[ns].prefix.clone();

        let store = &*self;
        // the closest declaration wins
        if let Some(item) = map.items.iter_mut().rev().find(|item| {
            let new = &store[item.new_ns];
            item.depth >= XmlNsMapDepth::Parent
                && item.shadow_depth.is_none()
                && new.is_binding()
                && (!prefixed || new.prefix.is_some())
                && new.href == href
        }) {
            item.old_ns = Some(ns);
            return Ok(item.new_ns);
        }

        let Some(elem) = elem else {
            let tmpns = self.store_ns(doc, href.as_deref(), prefix.as_deref())?;
            // Insert mapping.
            map.add_item(false, Some(ns), tmpns, XmlNsMapDepth::Doc);
            return Ok(tmpns);
        };
        let tmpns = self.declare_ns_forced(elem, href.as_deref(), prefix.as_deref(), false)?;
        // Does it shadow ancestor ns-decls?
        let declared = self[tmpns].prefix.clone();
        let store = &*self;
        if let Some(item) = map.items.iter_mut().find(|item| {
            item.depth >= XmlNsMapDepth::Parent
                && item.depth < XmlNsMapDepth::Element(depth)
                && item.shadow_depth.is_none()
                && store[item.new_ns].prefix.as_deref() == declared.as_deref()
        }) {
            item.shadow_depth = Some(depth);
        }
        map.add_item(false, Some(ns), tmpns, XmlNsMapDepth::Element(depth));
        Ok(tmpns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_ns_map_depth_order() {
        assert!(XmlNsMapDepth::Custom < XmlNsMapDepth::Doc);
        assert!(XmlNsMapDepth::Doc < XmlNsMapDepth::Parent);
        assert!(XmlNsMapDepth::Parent < XmlNsMapDepth::Element(0));
        assert!(XmlNsMapDepth::Element(1) < XmlNsMapDepth::Element(2));
    }

    #[test]
    fn test_xml_ns_map_shadow_and_leave() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let outer = store.new_ns(Some(root), Some("urn:outer"), Some("p")).unwrap();
        let child = store.new_child(root, None, "child", None).unwrap();
        let inner = store.new_ns(Some(child), Some("urn:inner"), Some("p")).unwrap();

        let mut map = XmlNsMap::new();
        map.add_item(false, Some(outer), outer, XmlNsMapDepth::Element(1));
        map.shadow_prefix(&store, Some("p"), 2);
        map.add_item(false, Some(inner), inner, XmlNsMapDepth::Element(2));
        assert_eq!(map.find(outer), None);
        assert_eq!(map.find(inner), Some(inner));

        map.leave_depth(2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.find(outer), Some(outer));
        assert_eq!(map.find(inner), None);
    }

    #[test]
    fn test_xml_gather_in_scope_ns() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let outer = store.new_ns(Some(root), Some("urn:outer"), Some("p")).unwrap();
        let other = store.new_ns(Some(root), Some("urn:other"), Some("q")).unwrap();
        let child = store.new_child(root, None, "child", None).unwrap();
        let inner = store.new_ns(Some(child), Some("urn:inner"), Some("p")).unwrap();

        let mut map = XmlNsMap::new();
        store.gather_in_scope_ns(&mut map, child);
        assert_eq!(map.len(), 3);
        let visible = map
            .iter()
            .filter(|item| !item.is_shadowed())
            .map(|item| item.new_ns())
            .collect::<Vec<_>>();
        assert!(visible.contains(&inner));
        assert!(visible.contains(&other));
        assert!(!visible.contains(&outer));
        assert!(map.iter().all(|item| item.depth() == XmlNsMapDepth::Parent));
    }

    #[test]
    fn test_xml_acquire_normalized_ns() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        let elem = store.new_doc_node(Some(doc), None, "elem", None).unwrap();
        let source = store.new_node(None, "source").unwrap();
        let ns = store.new_ns(Some(source), Some("urn:a"), Some("a")).unwrap();

        // without anchor the fallback chain of the document is used
        let mut map = XmlNsMap::new();
        let stored = store
            .acquire_normalized_ns(doc, None, ns, &mut map, 1, false)
            .unwrap();
        assert_eq!(store[doc].old_ns(), Some(stored));
        assert_eq!(map.find(ns), Some(stored));

        let mut map = XmlNsMap::new();
        let declared = store
            .acquire_normalized_ns(doc, Some(elem), ns, &mut map, 1, false)
            .unwrap();
        assert_eq!(store[elem].ns_def(), Some(declared));
        // the second acquisition reuses the mapped declaration
        let again = store
            .acquire_normalized_ns(doc, Some(elem), ns, &mut map, 1, false)
            .unwrap();
        assert_eq!(again, declared);
        assert_eq!(store.ns_defs_of(elem).count(), 1);
    }
}
