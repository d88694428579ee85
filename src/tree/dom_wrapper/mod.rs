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

mod adopt;
mod clone;
mod nsmap;

use std::fmt;

use crate::error::{XmlParserErrors, XmlTreeError};

use super::{
    XML_NS_PREFIX_MAX_ATTEMPTS, XML_XML_NAMESPACE, XML_XML_PREFIX, XmlDocId, XmlElementType,
    XmlNodeId, XmlNodeStore, XmlNsId, next_candidate, xml_ns_err_memory, xml_tree_err,
};

pub use nsmap::*;

/// A function called to acquire namespaces from the wrapper.
///
/// It receives the node needing a namespace, the namespace name and the
/// prefix, and returns the namespace to reference, or `None` on failure.
#[doc(alias = "xmlDOMWrapAcquireNsFunction")]
pub type XmlDOMWrapAcquireNsFunction =
    dyn FnMut(&mut XmlNodeStore, XmlNodeId, Option<&str>, Option<&str>) -> Option<XmlNsId>;

/// Context for DOM wrapper-operations.
///
/// A context may be reused for several operations; its namespace map is
/// emptied at the start and the end of each of them.
#[derive(Default)]
pub struct XmlDOMWrapCtxt {
    // Internal namespace map used for various operations.
    pub(crate) namespace_map: XmlNsMap,
    // Use this one to acquire a namespace intended for node->ns.
    // (Note that this is not intended for elem->nsDef).
    pub(crate) get_ns_for_node_func: Option<Box<XmlDOMWrapAcquireNsFunction>>,
}

impl XmlDOMWrapCtxt {
    /// Allocates and initializes a new DOM-wrapper context.
    #[doc(alias = "xmlDOMWrapNewCtxt")]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context whose namespace references are resolved by `f`
    /// instead of the namespace normalization.
    pub fn with_acquire_ns(
        f: impl FnMut(&mut XmlNodeStore, XmlNodeId, Option<&str>, Option<&str>) -> Option<XmlNsId>
        + 'static,
    ) -> Self {
        Self {
            namespace_map: XmlNsMap::new(),
            get_ns_for_node_func: Some(Box::new(f)),
        }
    }

    pub fn namespace_map(&self) -> &XmlNsMap {
        &self.namespace_map
    }

    pub fn has_acquire_ns(&self) -> bool {
        self.get_ns_for_node_func.is_some()
    }

    fn parts(&mut self) -> (&mut XmlNsMap, Option<&mut XmlDOMWrapAcquireNsFunction>) {
        (
            &mut self.namespace_map,
            self.get_ns_for_node_func.as_deref_mut(),
        )
    }
}

impl fmt::Debug for XmlDOMWrapCtxt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDOMWrapCtxt")
            .field("namespace_map", &self.namespace_map)
            .field("get_ns_for_node_func", &self.get_ns_for_node_func.is_some())
            .finish()
    }
}

/// Options of [`XmlNodeStore::dom_wrap_reconcile_namespaces`].
#[doc(alias = "xmlDOMReconcileNSOptions")]
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlDomReconcileNsOptions {
    /// Remove namespace declarations duplicating one in scope.
    XmlDomReconnsRemoveredund = 1 << 0,
}

impl TryFrom<i32> for XmlDomReconcileNsOptions {
    type Error = anyhow::Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value == Self::XmlDomReconnsRemoveredund as i32 {
            Ok(Self::XmlDomReconnsRemoveredund)
        } else {
            Err(anyhow::anyhow!(
                "Invalid convertion from value '{value}' to XmlDomReconcileNsOptions"
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum XmlWalkEvent {
    Enter(XmlNodeId),
    // emitted for elements and attributes once their content was walked
    Leave(XmlNodeId),
}

#[derive(Debug, Clone, Copy)]
enum XmlWalkStep {
    Enter(XmlNodeId),
    Descend(XmlNodeId),
    Leave(XmlNodeId),
    Advance(XmlNodeId),
    Done,
}

/// Pre-order walk of a subtree: the attributes of an element are walked
/// before its children.
///
/// Only the links of the walked nodes are followed, so the walk stays valid
/// while the caller rewrites namespaces, documents or strings.
#[derive(Debug)]
pub(crate) struct XmlSubtreeWalk {
    root: XmlNodeId,
    // element children are walked too
    deep: bool,
    skip: bool,
    step: XmlWalkStep,
}

impl XmlSubtreeWalk {
    pub(crate) fn new(root: XmlNodeId, deep: bool) -> Self {
        Self {
            root,
            deep,
            skip: false,
            step: XmlWalkStep::Enter(root),
        }
    }

    /// Do not descend into the node last entered.
    pub(crate) fn skip_subtree(&mut self) {
        self.skip = true;
    }

    pub(crate) fn next(&mut self, store: &XmlNodeStore) -> Option<XmlWalkEvent> {
        loop {
            match self.step {
                XmlWalkStep::Enter(node) => {
                    self.skip = false;
                    self.step = XmlWalkStep::Descend(node);
                    return Some(XmlWalkEvent::Enter(node));
                }
                XmlWalkStep::Descend(node) => {
                    if std::mem::take(&mut self.skip) {
                        self.step = XmlWalkStep::Advance(node);
                        continue;
                    }
                    let cur = &store[node];
                    self.step = match cur.typ {
                        XmlElementType::XmlElementNode => match cur.properties {
                            Some(attr) => XmlWalkStep::Enter(attr),
                            None => self.after_attributes(store, node),
                        },
                        XmlElementType::XmlAttributeNode => match cur.children {
                            Some(child) => XmlWalkStep::Enter(child),
                            None => XmlWalkStep::Leave(node),
                        },
                        _ => XmlWalkStep::Advance(node),
                    };
                }
                XmlWalkStep::Leave(node) => {
                    self.step = XmlWalkStep::Advance(node);
                    return Some(XmlWalkEvent::Leave(node));
                }
                XmlWalkStep::Advance(node) => {
                    if node == self.root {
                        self.step = XmlWalkStep::Done;
                        continue;
                    }
                    let cur = &store[node];
                    self.step = match (cur.next, cur.parent) {
                        (Some(next), _) => XmlWalkStep::Enter(next),
                        (None, Some(parent)) if cur.typ == XmlElementType::XmlAttributeNode => {
                            self.after_attributes(store, parent)
                        }
                        (None, Some(parent)) => XmlWalkStep::Leave(parent),
                        (None, None) => XmlWalkStep::Done,
                    };
                }
                XmlWalkStep::Done => return None,
            }
        }
    }

    fn after_attributes(&self, store: &XmlNodeStore, elem: XmlNodeId) -> XmlWalkStep {
        match store[elem].children.filter(|_| self.deep) {
            Some(child) => XmlWalkStep::Enter(child),
            None => XmlWalkStep::Leave(elem),
        }
    }
}

impl XmlNodeStore {
    /// Creates or reuses a namespace in the fallback chain (`old_ns`) of `doc`.
    ///
    /// Returns the namespace with the given prefix and URI.
    #[doc(alias = "xmlDOMWrapStoreNs")]
    pub fn store_ns(
        &mut self,
        doc: XmlDocId,
        href: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<XmlNsId, XmlTreeError> {
        if let Some(ns) = self
            .ns_chain(self[doc].old_ns)
            .find(|&ns| self[ns].prefix() == prefix && self[ns].href() == href)
        {
            return Ok(ns);
        }
        let ns = self.new_ns(None, href, prefix).inspect_err(|err| {
            if matches!(err, XmlTreeError::OutOfMemory) {
                xml_ns_err_memory("storing a namespace");
            }
        })?;
        if ns != self.xml_namespace() {
            self.append_old_ns(doc, ns);
        }
        Ok(ns)
    }

    /// Declares a new namespace on `elem`. It tries to use the given
    /// prefix; if a namespace with the given prefix is already declared on
    /// `elem`, or if `check_shadow` is set and the prefix is in scope on the
    /// parent of `elem`, it generates a new prefix.
    ///
    /// Returns the declaration, or `PrefixExhausted` if no free prefix was found.
    #[doc(alias = "xmlDOMWrapNSNormDeclareNsForced")]
    pub fn declare_ns_forced(
        &mut self,
        elem: XmlNodeId,
        href: Option<&str>,
        prefix: Option<&str>,
        check_shadow: bool,
    ) -> Result<XmlNsId, XmlTreeError> {
        let parent = self[elem]
            .parent
            .filter(|&parent| !self[parent].typ.is_document());
        let mut candidate = prefix.map(str::to_owned);
        for counter in 1..=XML_NS_PREFIX_MAX_ATTEMPTS + 1 {
            // Does it shadow ancestor ns-decls?
            let taken = self
                .ns_defs_of(elem)
                .any(|def| self[def].prefix.as_deref() == candidate.as_deref())
                || (check_shadow
                    && parent.is_some_and(|parent| {
                        self.search_ns_by_prefix_strict(parent, candidate.as_deref())
                            .is_some()
                    }));
            if !taken {
                return self.new_ns(Some(elem), href, candidate.as_deref());
            }
            candidate = Some(next_candidate(prefix, counter));
        }
        xml_tree_err(
            XmlParserErrors::XmlNsErrUndefinedNamespace,
            Some(elem),
            prefix,
        );
        Err(XmlTreeError::PrefixExhausted)
    }

    /// Dynamically searches for a namespace declaration of `prefix` in
    /// scope on `node`. The search stops at the document node and at
    /// entity boundaries.
    ///
    /// A declaration with an empty URI undeclares the prefix.
    #[doc(alias = "xmlSearchNsByPrefixStrict")]
    pub(crate) fn search_ns_by_prefix_strict(
        &self,
        node: XmlNodeId,
        prefix: Option<&str>,
    ) -> Option<XmlNsId> {
        if prefix == Some(XML_XML_PREFIX) {
            return Some(self.xml_namespace());
        }
        for cur in self.ancestors_or_self(node) {
            match self[cur].typ {
                XmlElementType::XmlEntityNode | XmlElementType::XmlEntityDecl => return None,
                ty if ty.is_document() => return None,
                XmlElementType::XmlElementNode => {
                    if let Some(def) = self
                        .ns_defs_of(cur)
                        .find(|&def| self[def].prefix.as_deref() == prefix)
                    {
                        return self[def].is_binding().then_some(def);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Dynamically searches for a namespace declaration of `href` in
    /// scope on `node`. A declaration whose prefix is redeclared closer to
    /// `node` is not in scope.
    ///
    /// If `prefixed` is `true`, declarations of the default namespace are
    /// not candidates.
    #[doc(alias = "xmlSearchNsByNamespaceStrict")]
    pub(crate) fn search_ns_by_namespace_strict(
        &self,
        node: XmlNodeId,
        href: &str,
        prefixed: bool,
    ) -> Option<XmlNsId> {
        if href == XML_XML_NAMESPACE {
            return Some(self.xml_namespace());
        }
        for cur in self.ancestors_or_self(node) {
            match self[cur].typ {
                XmlElementType::XmlEntityNode | XmlElementType::XmlEntityDecl => return None,
                ty if ty.is_document() => return None,
                XmlElementType::XmlElementNode => {
                    if let Some(def) = self.ns_defs_of(cur).find(|&def| {
                        let ns = &self[def];
                        ns.href.as_deref() == Some(href)
                            && (!prefixed || ns.prefix.is_some())
                            && self.ns_in_scope(node, cur, ns.prefix.as_deref())
                    }) {
                        return Some(def);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Ask the acquisition callback of a context for the namespace `node`
    /// references in place of `ns`.
    fn acquire_custom_ns(
        &mut self,
        func: &mut XmlDOMWrapAcquireNsFunction,
        node: XmlNodeId,
        ns: XmlNsId,
    ) -> Result<XmlNsId, XmlTreeError> {
        let href = self[ns].href.clone();
        let prefix = self[ns].prefix.clone();
        func(self, node, href.as_deref(), prefix.as_deref()).ok_or(
            XmlTreeError::InvalidArgument("the namespace acquisition callback failed"),
        )
    }

    /// Push the declarations in scope on the parent of `elem` into `map`,
    /// unless `elem` is directly under the document node.
    fn gather_parent_scope(&self, map: &mut XmlNsMap, elem: XmlNodeId) {
        if let Some(parent) = self[elem]
            .parent
            .filter(|&parent| !self[parent].typ.is_document())
        {
            self.gather_in_scope_ns(map, parent);
        }
    }

    /// Unlinks the given node from its owner.
    ///
    /// This will substitute namespace references to namespace declarations
    /// of the document by declarations of the fallback chain (`old_ns`) of
    /// `doc`, or by the namespaces returned by the acquisition callback of
    /// `ctxt`, so that the detached subtree is self-contained.
    #[doc(alias = "xmlDOMWrapRemoveNode")]
    pub fn dom_wrap_remove_node(
        &mut self,
        ctxt: Option<&mut XmlDOMWrapCtxt>,
        doc: XmlDocId,
        node: XmlNodeId,
    ) -> Result<(), XmlTreeError> {
        if self[node].doc != Some(doc) {
            return Err(XmlTreeError::CrossDocumentMismatch);
        }
        if self[node].parent.is_none() {
            return Ok(());
        }
        match self[node].typ {
            XmlElementType::XmlTextNode
            | XmlElementType::XmlCDATASectionNode
            | XmlElementType::XmlEntityRefNode
            | XmlElementType::XmlPINode
            | XmlElementType::XmlCommentNode => {
                self.unlink_node(node);
                return Ok(());
            }
            XmlElementType::XmlElementNode | XmlElementType::XmlAttributeNode => {}
            ty => return Err(XmlTreeError::UnsupportedNodeKind(ty)),
        }
        self.unlink_node(node);

        let mut acquire = ctxt.and_then(|ctxt| ctxt.parts().1);
        // pairs of (referenced namespace, substitute)
        let mut list: Vec<(XmlNsId, XmlNsId)> = vec![];
        let mut walk = XmlSubtreeWalk::new(node, true);
        while let Some(event) = walk.next(self) {
            let XmlWalkEvent::Enter(cur) = event else {
                continue;
            };
            match self[cur].typ {
                XmlElementType::XmlElementNode => {
                    // Namespace declarations travel with the subtree.
                    list.extend(self.ns_defs_of(cur).map(|ns| (ns, ns)));
                }
                XmlElementType::XmlAttributeNode => {}
                _ => continue,
            }
            let Some(ns) = self[cur].ns else {
                continue;
            };
            if let Some(&(_, to)) = list.iter().find(|&&(from, _)| from == ns) {
                self[cur].ns = Some(to);
                continue;
            }
            if ns == self.xml_namespace() {
                continue;
            }
            // Add to list of substitutions.
            let new = match acquire.as_deref_mut() {
                Some(func) => self.acquire_custom_ns(func, cur, ns)?,
                None => {
                    let href = self[ns].href.clone();
                    let prefix = self[ns].prefix.clone();
                    self.store_ns(doc, href.as_deref(), prefix.as_deref())?
                }
            };
            list.push((ns, new));
            self[cur].ns = Some(new);
        }
        Ok(())
    }

    /// Ensures that the namespace references of the subtree rooted at
    /// `elem` point to declarations in scope.
    ///
    /// Missing declarations are added on the element referencing them,
    /// with a generated prefix if the original one is taken.
    /// With [`XmlDomReconcileNsOptions::XmlDomReconnsRemoveredund`] in
    /// `options`, declarations duplicating one in scope are removed.
    #[doc(alias = "xmlDOMWrapReconcileNamespaces")]
    pub fn dom_wrap_reconcile_namespaces(
        &mut self,
        ctxt: Option<&mut XmlDOMWrapCtxt>,
        elem: XmlNodeId,
        options: i32,
    ) -> Result<(), XmlTreeError> {
        if self[elem].typ != XmlElementType::XmlElementNode {
            return Err(XmlTreeError::InvalidArgument(
                "reconciliation starts at an element",
            ));
        }
        let Some(doc) = self[elem].doc else {
            return Err(XmlTreeError::InvalidArgument(
                "element does not belong to a document",
            ));
        };
        let remove_redund =
            options & XmlDomReconcileNsOptions::XmlDomReconnsRemoveredund as i32 != 0;
        let mut local = XmlNsMap::new();
        let map = match ctxt {
            Some(ctxt) => &mut ctxt.namespace_map,
            None => &mut local,
        };
        map.clear();
        let res = self.reconcile_subtree(doc, elem, remove_redund, map);
        map.clear();
        res
    }

    fn reconcile_subtree(
        &mut self,
        doc: XmlDocId,
        elem: XmlNodeId,
        remove_redund: bool,
        map: &mut XmlNsMap,
    ) -> Result<(), XmlTreeError> {
        let mut depth = 0;
        let mut parnsdone = false;
        // pairs of (redundant declaration, declaration in scope)
        let mut redund: Vec<(XmlNsId, XmlNsId)> = vec![];
        let mut walk = XmlSubtreeWalk::new(elem, true);
        while let Some(event) = walk.next(self) {
            let cur = match event {
                XmlWalkEvent::Enter(cur) => cur,
                XmlWalkEvent::Leave(cur) => {
                    if self[cur].typ == XmlElementType::XmlElementNode {
                        map.leave_depth(depth);
                        depth -= 1;
                    }
                    continue;
                }
            };
            let cur_elem = match self[cur].typ {
                XmlElementType::XmlElementNode => {
                    depth += 1;
                    let mut adoptns = true;
                    // Namespace declarations.
                    let mut prev: Option<XmlNsId> = None;
                    let mut next_def = self[cur].ns_def;
                    while let Some(ns) = next_def {
                        next_def = self[ns].next;
                        if !parnsdone {
                            self.gather_parent_scope(map, elem);
                            parnsdone = true;
                        }
                        // Lookup the ns ancestor-axis for equal ns-decls in scope.
                        if remove_redund {
                            if let Some(found) = map.find_equivalent(self, ns) {
                                // Remove the redundant declaration.
                                redund.push((ns, found));
                                match prev {
                                    Some(prev) => self[prev].next = next_def,
                                    None => self[cur].ns_def = next_def,
                                }
                                self[ns].next = None;
                                continue;
                            }
                        }
                        // Skip ns-references handling if the referenced
                        // ns-decl is declared on the same element.
                        if self[cur].ns == Some(ns) {
                            adoptns = false;
                        }
                        let prefix = self[ns].prefix.clone();
                        map.shadow_prefix(self, prefix.as_deref(), depth);
                        map.add_item(false, Some(ns), ns, XmlNsMapDepth::Element(depth));
                        prev = Some(ns);
                    }
                    if !adoptns {
                        continue;
                    }
                    cur
                }
                XmlElementType::XmlAttributeNode => match self[cur].parent {
                    Some(parent) => parent,
                    None => continue,
                },
                _ => continue,
            };
            // ns-references
            let Some(ns) = self[cur].ns else {
                continue;
            };
            if !parnsdone {
                self.gather_parent_scope(map, elem);
                parnsdone = true;
            }
            let ns = match redund.iter().find(|&&(from, _)| from == ns) {
                Some(&(_, to)) => {
                    self[cur].ns = Some(to);
                    to
                }
                None => ns,
            };
            // Adjust the reference if this was a redundant ns-decl.
            if let Some(new) = map.find(ns) {
                self[cur].ns = Some(new);
                continue;
            }
            // Acquire a normalized ns-decl and add it to the map.
            let is_attr = self[cur].typ == XmlElementType::XmlAttributeNode;
            let new =
                self.acquire_normalized_ns(doc, Some(cur_elem), ns, map, depth, is_attr)?;
            self[cur].ns = Some(new);
        }
        for (ns, _) in redund {
            self.free_ns(ns);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_subtree_walk_order() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let attr = store.new_prop(Some(root), "a", Some("v")).unwrap();
        let child = store.new_child(root, None, "child", None).unwrap();
        let text = store.new_text("t").unwrap();
        store.add_child(child, text).unwrap();
        let value = store[attr].children().unwrap();

        let mut events = vec![];
        let mut walk = XmlSubtreeWalk::new(root, true);
        while let Some(event) = walk.next(&store) {
            events.push(event);
        }
        assert_eq!(
            events,
            [
                XmlWalkEvent::Enter(root),
                XmlWalkEvent::Enter(attr),
                XmlWalkEvent::Enter(value),
                XmlWalkEvent::Leave(attr),
                XmlWalkEvent::Enter(child),
                XmlWalkEvent::Enter(text),
                XmlWalkEvent::Leave(child),
                XmlWalkEvent::Leave(root),
            ]
        );

        let mut events = vec![];
        let mut walk = XmlSubtreeWalk::new(root, false);
        while let Some(event) = walk.next(&store) {
            if event == XmlWalkEvent::Enter(attr) {
                walk.skip_subtree();
            }
            events.push(event);
        }
        assert_eq!(
            events,
            [
                XmlWalkEvent::Enter(root),
                XmlWalkEvent::Enter(attr),
                XmlWalkEvent::Leave(root),
            ]
        );
    }

    #[test]
    fn test_xml_declare_ns_forced() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        store.new_ns(Some(root), Some("urn:outer"), Some("a")).unwrap();
        let elem = store.new_child(root, None, "elem", None).unwrap();
        store.new_ns(Some(elem), Some("urn:a"), Some("a")).unwrap();

        let ns = store
            .declare_ns_forced(elem, Some("urn:b"), Some("a"), false)
            .unwrap();
        assert_eq!(store[ns].prefix(), Some("a_1"));
        let ns = store
            .declare_ns_forced(elem, Some("urn:c"), Some("a"), false)
            .unwrap();
        assert_eq!(store[ns].prefix(), Some("a_2"));

        // the parent scope is only considered when asked for
        let other = store.new_child(root, None, "other", None).unwrap();
        let ns = store
            .declare_ns_forced(other, Some("urn:d"), Some("a"), true)
            .unwrap();
        assert_eq!(store[ns].prefix(), Some("a_1"));
    }

    #[test]
    fn test_xml_store_ns_reuses_fallback() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        let first = store.store_ns(doc, Some("urn:x"), Some("x")).unwrap();
        let second = store.store_ns(doc, Some("urn:x"), Some("x")).unwrap();
        let third = store.store_ns(doc, Some("urn:y"), Some("x")).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, third);
        assert_eq!(store[doc].old_ns(), Some(first));
        assert_eq!(store[first].next(), Some(third));
        assert_eq!(store[first].document(), Some(doc));
    }

    #[test]
    fn test_xml_search_ns_strict() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let outer = store.new_ns(Some(root), Some("urn:x"), Some("p")).unwrap();
        let mid = store.new_child(root, None, "mid", None).unwrap();
        store.new_ns(Some(mid), Some("urn:y"), Some("p")).unwrap();
        let leaf = store.new_child(mid, None, "leaf", None).unwrap();

        assert_eq!(store.search_ns_by_namespace_strict(leaf, "urn:x", false), None);
        assert_eq!(store.search_ns_by_namespace_strict(mid, "urn:x", false), None);
        assert_eq!(store.search_ns_by_namespace_strict(root, "urn:x", true), Some(outer));
        assert_eq!(
            store.search_ns_by_prefix_strict(leaf, Some("xml")),
            Some(store.xml_namespace())
        );
        assert_ne!(store.search_ns_by_prefix_strict(leaf, Some("p")), Some(outer));
    }

    #[test]
    fn test_xml_dom_reconcile_ns_options_try_from() {
        assert_eq!(
            XmlDomReconcileNsOptions::try_from(1).unwrap(),
            XmlDomReconcileNsOptions::XmlDomReconnsRemoveredund
        );
        assert!(XmlDomReconcileNsOptions::try_from(2).is_err());
    }
}
