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

use crate::error::XmlTreeError;

use super::{
    XML_XML_NAMESPACE, XML_XML_PREFIX, XmlDocId, XmlElementType, XmlNodeId, XmlNodeStore, XmlNsId,
};

/// Upper bound of the attempts made to find an unused namespace prefix.
pub const XML_NS_PREFIX_MAX_ATTEMPTS: usize = 1000;

/// A namespace declaration.
///
/// It is either part of the `ns_def` chain of the element declaring it, or
/// of the fallback chain (`old_ns`) of a document.
#[derive(Debug, Clone, Default)]
pub struct XmlNs {
    // next Ns link for this node
    pub(crate) next: Option<XmlNsId>,
    // URL for the namespace
    pub(crate) href: Option<Box<str>>,
    // prefix for the namespace
    pub(crate) prefix: Option<Box<str>>,
    // normally an xmlDoc
    pub(crate) context: Option<XmlDocId>,
}

impl XmlNs {
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn next(&self) -> Option<XmlNsId> {
        self.next
    }

    pub fn document(&self) -> Option<XmlDocId> {
        self.context
    }

    /// Check if this declaration binds a prefix (or the default namespace)
    /// to a non-empty URI.
    pub(crate) fn is_binding(&self) -> bool {
        self.href.as_deref().is_some_and(|href| !href.is_empty())
    }
}

/// Generate the `attempt`-th candidate prefix for a forced declaration.
///
/// The first attempt is `1`. Long bases are truncated.
pub fn next_candidate(base: Option<&str>, attempt: usize) -> String {
    match base {
        Some(base) => format!("{base:.30}_{attempt}"),
        None => format!("ns_{attempt}"),
    }
}

/// Generate the `attempt`-th candidate prefix for a reconciled declaration.
///
/// The attempt `0` is the base itself, or `default` for the default namespace.
pub fn reconciled_candidate(base: Option<&str>, attempt: usize) -> String {
    let base = base.unwrap_or("default");
    if attempt == 0 {
        format!("{base:.20}")
    } else {
        format!("{base:.20}{attempt}")
    }
}

impl XmlNodeStore {
    /// Creation of a new Namespace. This function will refuse to create
    /// a namespace with a similar prefix than an existing one present on this node.
    ///
    /// Binding the `xml` prefix to the XML namespace returns the shared
    /// declaration of [`XmlNodeStore::xml_namespace`] without declaring anything.
    ///
    /// We use href == `None` in the case of an element creation where the namespace was not defined.
    ///
    /// Returns the new namespace.
    #[doc(alias = "xmlNewNs")]
    pub fn new_ns(
        &mut self,
        node: Option<XmlNodeId>,
        href: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<XmlNsId, XmlTreeError> {
        if node.is_some_and(|node| self[node].typ != XmlElementType::XmlElementNode) {
            return Err(XmlTreeError::InvalidArgument(
                "namespaces are declared on elements",
            ));
        }

        if prefix == Some(XML_XML_PREFIX) && href == Some(XML_XML_NAMESPACE) {
            // xml namespace is predefined, no need to add it
            return Ok(self.xml_namespace());
        }

        // checks for existing use of the prefix
        if let Some(node) = node {
            if self
                .ns_defs_of(node)
                .any(|def| self[def].prefix.as_deref() == prefix)
            {
                return Err(XmlTreeError::DuplicatePrefix);
            }
        }

        let cur = self.alloc_ns(XmlNs {
            next: None,
            href: href.map(Into::into),
            prefix: prefix.map(Into::into),
            context: node.and_then(|node| self[node].doc),
        })?;
        // Add it at the end to preserve parsing order ...
        if let Some(node) = node {
            self.append_ns_def(node, cur);
        }
        Ok(cur)
    }

    /// Append `ns` at the end of the declarations of `node`.
    pub(crate) fn append_ns_def(&mut self, node: XmlNodeId, ns: XmlNsId) {
        self[ns].next = None;
        match self.ns_defs_of(node).last() {
            Some(last) => self[last].next = Some(ns),
            None => self[node].ns_def = Some(ns),
        }
    }

    /// Free up the structures associated to a namespace
    #[doc(alias = "xmlFreeNs")]
    pub fn free_ns(&mut self, cur: XmlNsId) {
        self.release_ns(cur);
    }

    /// Free up all the structures associated to the chained namespaces.
    #[doc(alias = "xmlFreeNsList")]
    pub fn free_ns_list(&mut self, cur: Option<XmlNsId>) {
        let mut cur = cur;
        while let Some(now) = cur {
            cur = self.get_ns(now).and_then(|ns| ns.next);
            self.free_ns(now);
        }
    }

    /// Do a copy of the namespace.
    ///
    /// Returns a new namespace, not declared anywhere.
    #[doc(alias = "xmlCopyNamespace")]
    pub fn copy_namespace(&mut self, cur: XmlNsId) -> Result<XmlNsId, XmlTreeError> {
        if cur == self.xml_namespace() {
            return Ok(cur);
        }
        let ns = &self[cur];
        let copy = XmlNs {
            next: None,
            href: ns.href.clone(),
            prefix: ns.prefix.clone(),
            context: None,
        };
        self.alloc_ns(copy)
    }

    /// Do a copy of an namespace list.
    ///
    /// Returns the head of the new chain.
    #[doc(alias = "xmlCopyNamespaceList")]
    pub fn copy_namespace_list(
        &mut self,
        cur: Option<XmlNsId>,
    ) -> Result<Option<XmlNsId>, XmlTreeError> {
        let mut ret = None;
        let mut p: Option<XmlNsId> = None;
        let mut cur = cur;
        while let Some(now) = cur {
            cur = self[now].next;
            if now == self.xml_namespace() {
                continue;
            }
            let q = match self.copy_namespace(now) {
                Ok(q) => q,
                Err(err) => {
                    self.free_ns_list(ret);
                    return Err(err);
                }
            };
            match p {
                Some(p) => self[p].next = Some(q),
                None => ret = Some(q),
            }
            p = Some(q);
        }
        Ok(ret)
    }

    /// Search a Ns registered under a given name space for a document.
    /// Recurse on the parents until it finds the defined namespace or return `None` otherwise.
    ///
    /// `prefix` can be `None`, this is a search for the default namespace.
    /// The `xml` prefix always resolves to [`XmlNodeStore::xml_namespace`].
    ///
    /// We don't allow to cross entities boundaries.
    /// A declaration of `prefix` with an empty URI undeclares it and stops the search.
    ///
    /// Returns the namespace or `None`.
    #[doc(alias = "xmlSearchNs")]
    pub fn search_ns(&self, node: XmlNodeId, prefix: Option<&str>) -> Option<XmlNsId> {
        if prefix == Some(XML_XML_PREFIX) {
            return Some(self.xml_namespace());
        }
        for cur in self.ancestors_or_self(node) {
            let cur_node = &self[cur];
            if matches!(
                cur_node.typ,
                XmlElementType::XmlEntityRefNode
                    | XmlElementType::XmlEntityNode
                    | XmlElementType::XmlEntityDecl
            ) {
                return None;
            }
            if cur_node.typ != XmlElementType::XmlElementNode {
                continue;
            }
            if let Some(def) = self
                .ns_defs_of(cur)
                .find(|&def| self[def].prefix.as_deref() == prefix)
            {
                return self[def].is_binding().then_some(def);
            }
            if cur != node {
                if let Some(ns) = cur_node
                    .ns
                    .filter(|&ns| self[ns].prefix.as_deref() == prefix && self[ns].is_binding())
                {
                    return Some(ns);
                }
            }
        }
        None
    }

    /// Search a Ns aliasing a given URI.
    /// Recurse on the parents until it finds the defined namespace or return `None` otherwise.
    ///
    /// If `node` is an attribute, declarations of the default namespace are not candidates.
    /// A candidate whose prefix is redeclared closer to `node` is skipped.
    ///
    /// Returns the namespace or `None`.
    #[doc(alias = "xmlSearchNsByHref")]
    pub fn search_ns_by_href(&self, node: XmlNodeId, href: &str) -> Option<XmlNsId> {
        if href == XML_XML_NAMESPACE {
            return Some(self.xml_namespace());
        }
        let is_attr = self[node].typ == XmlElementType::XmlAttributeNode;
        let is_match = |cand: XmlNsId, anchor: XmlNodeId| {
            let ns = &self[cand];
            ns.href.as_deref() == Some(href)
                && (!is_attr || ns.prefix.is_some())
                && self.ns_in_scope(node, anchor, ns.prefix.as_deref())
        };
        for cur in self.ancestors_or_self(node) {
            let cur_node = &self[cur];
            if matches!(
                cur_node.typ,
                XmlElementType::XmlEntityRefNode
                    | XmlElementType::XmlEntityNode
                    | XmlElementType::XmlEntityDecl
            ) {
                return None;
            }
            if cur_node.typ != XmlElementType::XmlElementNode {
                continue;
            }
            if let Some(def) = self.ns_defs_of(cur).find(|&def| is_match(def, cur)) {
                return Some(def);
            }
            if cur != node {
                if let Some(ns) = cur_node.ns.filter(|&ns| is_match(ns, cur)) {
                    return Some(ns);
                }
            }
        }
        None
    }

    /// Verify that the given namespace held on `ancestor` is still in scope on `node`.
    ///
    /// Returns `true` if no element between `node` (inclusive) and `ancestor`
    /// (exclusive) redeclares `prefix`.
    #[doc(alias = "xmlNsInScope")]
    pub fn ns_in_scope(&self, node: XmlNodeId, ancestor: XmlNodeId, prefix: Option<&str>) -> bool {
        for cur in self.ancestors_or_self(node) {
            if cur == ancestor {
                return true;
            }
            match self[cur].typ {
                XmlElementType::XmlEntityRefNode
                | XmlElementType::XmlEntityNode
                | XmlElementType::XmlEntityDecl => return false,
                XmlElementType::XmlElementNode => {
                    if self
                        .ns_defs_of(cur)
                        .any(|def| self[def].prefix.as_deref() == prefix)
                    {
                        return false;
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Search all the namespace applying to a given element.
    ///
    /// Returns a `Vec` of all the namespaces found, nearest first.
    #[doc(alias = "xmlGetNsList")]
    pub fn get_ns_list(&self, node: XmlNodeId) -> Option<Vec<XmlNsId>> {
        let mut ret: Vec<XmlNsId> = vec![];
        for cur in self.ancestors_or_self(node) {
            if self[cur].typ != XmlElementType::XmlElementNode {
                continue;
            }
            for def in self.ns_defs_of(cur) {
                if ret.iter().all(|&seen| self[seen].prefix != self[def].prefix) {
                    ret.push(def);
                }
            }
        }
        (!ret.is_empty()).then_some(ret)
    }

    /// Associate a namespace to a node, a posteriori.
    #[doc(alias = "xmlSetNs")]
    pub fn set_ns(&mut self, node: XmlNodeId, ns: Option<XmlNsId>) {
        if matches!(
            self[node].typ,
            XmlElementType::XmlElementNode | XmlElementType::XmlAttributeNode
        ) {
            self[node].ns = ns;
        }
    }

    /// Iterate over a namespace chain starting at `first`.
    pub(crate) fn ns_chain(&self, first: Option<XmlNsId>) -> impl Iterator<Item = XmlNsId> + '_ {
        successors(first, |&cur| self[cur].next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_candidate() {
        assert_eq!(next_candidate(Some("a"), 1), "a_1");
        assert_eq!(next_candidate(None, 7), "ns_7");
        let long = "p".repeat(40);
        assert_eq!(next_candidate(Some(&long), 2), format!("{}_2", "p".repeat(30)));
        assert_eq!(reconciled_candidate(None, 0), "default");
        assert_eq!(reconciled_candidate(Some("x"), 3), "x3");
    }

    #[test]
    fn test_xml_new_ns_rejects_duplicate_prefix() {
        let mut store = XmlNodeStore::new();
        let elem = store.new_node(None, "e").unwrap();
        let a = store.new_ns(Some(elem), Some("urn:a"), Some("a")).unwrap();
        assert_eq!(
            store.new_ns(Some(elem), Some("urn:b"), Some("a")),
            Err(XmlTreeError::DuplicatePrefix)
        );
        let def = store.new_ns(Some(elem), Some("urn:d"), None).unwrap();
        assert_eq!(store.ns_defs_of(elem).collect::<Vec<_>>(), vec![a, def]);
        assert_eq!(
            store.new_ns(Some(elem), Some(XML_XML_NAMESPACE), Some("xml")),
            Ok(store.xml_namespace())
        );
    }

    #[test]
    fn test_xml_search_ns_scope() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let outer = store.new_ns(Some(root), Some("urn:outer"), Some("p")).unwrap();
        let mid = store.new_child(root, None, "mid", None).unwrap();
        let inner = store.new_ns(Some(mid), Some("urn:inner"), Some("p")).unwrap();
        let leaf = store.new_child(mid, None, "leaf", None).unwrap();
        let sibling = store.new_child(root, None, "sibling", None).unwrap();

        assert_eq!(store.search_ns(leaf, Some("p")), Some(inner));
        assert_eq!(store.search_ns(sibling, Some("p")), Some(outer));
        assert_eq!(store.search_ns(leaf, Some("q")), None);
        assert_eq!(store.search_ns(leaf, Some("xml")), Some(store.xml_namespace()));

        // shadowed by the closer declaration of the same prefix
        assert_eq!(store.search_ns_by_href(leaf, "urn:outer"), None);
        assert_eq!(store.search_ns_by_href(sibling, "urn:outer"), Some(outer));
        assert!(!store.ns_in_scope(leaf, root, Some("p")));
        assert!(store.ns_in_scope(leaf, mid, Some("p")));
    }

    #[test]
    fn test_xml_search_ns_empty_href_undeclares() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        store.new_ns(Some(root), Some("urn:d"), None).unwrap();
        let child = store.new_child(root, None, "child", None).unwrap();
        store.new_ns(Some(child), Some(""), None).unwrap();
        assert_eq!(store.search_ns(child, None), None);
        assert!(store.search_ns(root, None).is_some());
    }

    #[test]
    fn test_xml_search_ns_by_href_attribute_mode() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let def = store.new_ns(Some(root), Some("urn:a"), None).unwrap();
        let attr = store.new_prop(Some(root), "at", Some("v")).unwrap();
        assert_eq!(store.search_ns_by_href(root, "urn:a"), Some(def));
        assert_eq!(store.search_ns_by_href(attr, "urn:a"), None);
        let prefixed = store.new_ns(Some(root), Some("urn:a"), Some("a")).unwrap();
        assert_eq!(store.search_ns_by_href(attr, "urn:a"), Some(prefixed));
    }

    #[test]
    fn test_xml_copy_namespace_list() {
        let mut store = XmlNodeStore::new();
        let elem = store.new_node(None, "e").unwrap();
        store.new_ns(Some(elem), Some("urn:a"), Some("a")).unwrap();
        store.new_ns(Some(elem), Some("urn:b"), Some("b")).unwrap();
        let copy = store.copy_namespace_list(store[elem].ns_def()).unwrap();
        let prefixes = store
            .ns_chain(copy)
            .map(|ns| store[ns].prefix().unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(prefixes, ["a", "b"]);
        assert_eq!(store.get_ns_list(elem).map(|list| list.len()), Some(2));
    }
}
