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

use crate::error::{XmlParserErrors, XmlTreeError};

use super::{
    XML_NS_PREFIX_MAX_ATTEMPTS, XmlDocId, XmlElementType, XmlNode, XmlNodeId, XmlNodeStore,
    XmlNsId, reconciled_candidate, xml_tree_err,
};

/// How much of a node is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlCopyDepth {
    /// The node alone: name and content.
    Shallow,
    /// The node with its namespace declarations, attributes and descendants.
    #[default]
    Deep,
    /// The node with its namespace declarations and attributes, but no children.
    AttributesAndNsOnly,
}

impl TryFrom<i32> for XmlCopyDepth {
    type Error = anyhow::Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Shallow),
            1 => Ok(Self::Deep),
            2 => Ok(Self::AttributesAndNsOnly),
            _ => Err(anyhow::anyhow!(
                "Invalid convert from value '{value}' to {}",
                std::any::type_name::<Self>()
            )),
        }
    }
}

// NOTE about the CopyNode operations !
//
// They are split into external and internal parts for one
// tricky reason: namespaces. Doing a direct copy of a node
// say RPM:Copyright without changing the namespace pointer to
// something else can produce stale links. The copy gets its own
// declaration at the top of the copied tree if the namespace is not
// available in the new scope.
impl XmlNodeStore {
    /// This function tries to locate a namespace definition in a tree
    /// ancestors, or create a new namespace definition node similar to
    /// `ns` trying to reuse the same prefix. However if the given prefix is
    /// `None` (default namespace) or reused within the subtree defined by
    /// `tree` or on one of its ancestors then a new prefix is generated.
    ///
    /// Returns the (new) namespace definition.
    #[doc(alias = "xmlNewReconciledNs")]
    pub fn new_reconciled_ns(
        &mut self,
        tree: XmlNodeId,
        ns: XmlNsId,
    ) -> Result<XmlNsId, XmlTreeError> {
        if self[tree].typ != XmlElementType::XmlElementNode {
            return Err(XmlTreeError::InvalidArgument(
                "namespaces are declared on elements",
            ));
        }
        let Some(href) = self[ns].href.clone() else {
            return Err(XmlTreeError::InvalidArgument("namespace without URI"));
        };
        // Search an existing namespace definition inherited.
        if let Some(def) = self.search_ns_by_href(tree, &href) {
            return Ok(def);
        }

        // Find a close prefix which is not already in use.
        let base = self[ns].prefix.clone();
        for attempt in 0..=XML_NS_PREFIX_MAX_ATTEMPTS {
            let prefix = reconciled_candidate(base.as_deref(), attempt);
            if self.search_ns(tree, Some(&prefix)).is_none()
                && self
                    .ns_defs_of(tree)
                    .all(|def| self[def].prefix.as_deref() != Some(prefix.as_str()))
            {
                return self.new_ns(Some(tree), Some(&href), Some(&prefix));
            }
        }
        xml_tree_err(
            XmlParserErrors::XmlNsErrUndefinedNamespace,
            Some(tree),
            base.as_deref(),
        );
        Err(XmlTreeError::PrefixExhausted)
    }

    /// Bind the copy `ret` to a namespace equivalent to `ns`.
    ///
    /// A declaration of the same URI in scope on `ret` is reused. Otherwise a
    /// new one is added on `top`, the root of the copied tree, or on the
    /// element holding `ret` if the prefix cannot be declared there.
    fn copy_ns_reference(
        &mut self,
        ret: XmlNodeId,
        ns: XmlNsId,
        top: XmlNodeId,
    ) -> Result<XmlNsId, XmlTreeError> {
        if ns == self.xml_namespace() {
            return Ok(ns);
        }
        let prefix = self[ns].prefix.clone();
        let href = self[ns].href.clone();
        let is_attr = self[ret].typ == XmlElementType::XmlAttributeNode;
        let scope = if is_attr { self[ret].parent } else { Some(ret) };
        let Some(scope) = scope else {
            return Err(XmlTreeError::InvalidArgument("attribute without element"));
        };
        let bound = self.search_ns(scope, prefix.as_deref());
        if let Some(found) = bound.filter(|&found| self[found].href == href) {
            // this is the nice case
            return Ok(found);
        }
        // the same URI may be bound to another prefix
        if let Some(found) = href
            .as_deref()
            .and_then(|href| self.search_ns_by_href(ret, href))
        {
            return Ok(found);
        }
        if self[top].typ != XmlElementType::XmlElementNode {
            return self.new_reconciled_ns(scope, ns);
        }
        if bound.is_none() && (prefix.is_some() || !is_attr) {
            // The prefix is free on the whole ancestor axis.
            return self.new_ns(Some(top), href.as_deref(), prefix.as_deref());
        }
        let def = self.new_reconciled_ns(top, ns)?;
        if self.search_ns(scope, self[def].prefix()) == Some(def) {
            return Ok(def);
        }
        self.new_reconciled_ns(scope, ns)
    }

    /// Copy `node` for the document `doc`.
    ///
    /// If `parent` is given, the copy is made in its scope: its `parent` link
    /// is set, but it is not inserted in the children of `parent`. A text copy
    /// is merged into the last child of `parent` when possible, in which case
    /// that child is returned.
    #[doc(alias = "xmlStaticCopyNode")]
    pub(crate) fn static_copy_node(
        &mut self,
        node: XmlNodeId,
        doc: Option<XmlDocId>,
        parent: Option<XmlNodeId>,
        depth: XmlCopyDepth,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.copy_node_in(node, doc, parent, depth, None)
    }

    /// Copy `node` as part of the copied tree rooted at `top`, or as the
    /// root of a new copied tree if `top` is `None`.
    fn copy_node_in(
        &mut self,
        node: XmlNodeId,
        doc: Option<XmlDocId>,
        parent: Option<XmlNodeId>,
        depth: XmlCopyDepth,
        top: Option<XmlNodeId>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        match self[node].typ {
            XmlElementType::XmlTextNode
            | XmlElementType::XmlCDATASectionNode
            | XmlElementType::XmlElementNode
            | XmlElementType::XmlDocumentFragNode
            | XmlElementType::XmlEntityRefNode
            | XmlElementType::XmlPINode
            | XmlElementType::XmlCommentNode => {}
            XmlElementType::XmlAttributeNode => {
                return self.copy_prop_internal(doc, parent, node, top);
            }
            #[cfg(feature = "libxml_tree")]
            XmlElementType::XmlDocumentNode | XmlElementType::XmlHTMLDocumentNode => {
                let Some(src) = self[node].doc else {
                    return Err(XmlTreeError::InvalidArgument("document node without document"));
                };
                let copy = self.copy_doc(src, depth != XmlCopyDepth::Shallow)?;
                return Ok(self[copy].node);
            }
            ty => return Err(XmlTreeError::UnsupportedNodeKind(ty)),
        }

        let dict = doc.and_then(|doc| self[doc].dict.clone());
        let orig = &self[node];
        let typ = orig.typ;
        let mut copy = XmlNode {
            name: orig.name.as_ref().map(|name| name.copy_for(dict.as_ref())),
            doc,
            parent,
            ..XmlNode::with_type(typ)
        };
        match typ {
            XmlElementType::XmlElementNode => copy.line = orig.line,
            XmlElementType::XmlEntityRefNode => {}
            _ => copy.content = orig.content.as_deref().map(Into::into),
        }
        let ret = self.alloc_node(copy)?;

        if let Some(last) = parent
            .and_then(|parent| self[parent].last)
            .filter(|&last| self.can_merge_text(last, ret))
        {
            // node could have coalesced
            return Ok(self.merge_text_into(last, ret));
        }

        if depth == XmlCopyDepth::Shallow {
            return Ok(ret);
        }
        let top = top.unwrap_or(ret);
        if let Err(err) = self.copy_node_body(node, ret, doc, depth, top) {
            self.free_node(ret);
            return Err(err);
        }
        Ok(ret)
    }

    /// Copy namespace declarations, namespace reference, attributes and,
    /// for a deep copy, the descendants of `node` into `ret`.
    fn copy_node_body(
        &mut self,
        node: XmlNodeId,
        ret: XmlNodeId,
        doc: Option<XmlDocId>,
        depth: XmlCopyDepth,
        top: XmlNodeId,
    ) -> Result<(), XmlTreeError> {
        let typ = self[node].typ;
        if typ == XmlElementType::XmlElementNode && self[node].ns_def.is_some() {
            let ns_def = self.copy_namespace_list(self[node].ns_def)?;
            for def in self.ns_chain(ns_def).collect::<Vec<_>>() {
                self[def].context = doc;
            }
            self[ret].ns_def = ns_def;
        }
        if let Some(ns) = self[node].ns {
            let ns = self.copy_ns_reference(ret, ns, top)?;
            self[ret].ns = Some(ns);
        }
        if typ == XmlElementType::XmlElementNode && self[node].properties.is_some() {
            self[ret].properties =
                self.copy_prop_list_in(Some(ret), self[node].properties, Some(top))?;
        }

        if typ == XmlElementType::XmlEntityRefNode {
            if doc.is_none_or(|doc| self[node].doc != Some(doc)) {
                // The copy goes into a separate document, bind it to the
                // declaration of that document if there is one.
                self.bind_entity_ref(ret, doc);
            } else {
                self[ret].ent_bound = self[node].ent_bound;
                self[ret].content = self[node].content.as_deref().map(Into::into);
            }
            return Ok(());
        }
        if depth != XmlCopyDepth::Deep {
            return Ok(());
        }

        let mut cur = self[node].children;
        let mut insert = ret;
        while let Some(mut now) = cur {
            let copy = self.copy_node_in(
                now,
                doc,
                Some(insert),
                XmlCopyDepth::AttributesAndNsOnly,
                Some(top),
            )?;

            // Check for coalesced text nodes
            if self[insert].last != Some(copy) {
                match self[insert].last {
                    Some(last) => {
                        self[copy].prev = Some(last);
                        self[last].next = Some(copy);
                    }
                    None => self[insert].children = Some(copy),
                }
                self[insert].last = Some(copy);
            }

            if let Some(children) = self[now]
                .children
                .filter(|_| self[now].typ != XmlElementType::XmlEntityRefNode)
            {
                cur = Some(children);
                insert = copy;
                continue;
            }

            cur = loop {
                if let Some(next) = self[now].next {
                    break Some(next);
                }
                let Some(parent) = self[now].parent.filter(|&parent| parent != node) else {
                    break None;
                };
                now = parent;
                let Some(up) = self[insert].parent else {
                    break None;
                };
                insert = up;
            };
        }
        Ok(())
    }

    /// Copy a list of siblings for the document `doc`, each one in the scope of `parent`.
    ///
    /// Returns the first node of the copied list.
    #[doc(alias = "xmlStaticCopyNodeList")]
    pub(crate) fn static_copy_node_list(
        &mut self,
        node: Option<XmlNodeId>,
        doc: Option<XmlDocId>,
        parent: Option<XmlNodeId>,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        let mut ret = None;
        let mut p: Option<XmlNodeId> = None;
        let mut node = node;
        while let Some(cur) = node {
            node = self[cur].next;
            let q = if self[cur].typ == XmlElementType::XmlDTDNode {
                match self.copy_subset_node(cur, doc, parent) {
                    Ok(Some(q)) => q,
                    Ok(None) => continue,
                    Err(err) => {
                        self.free_node_list(ret);
                        return Err(err);
                    }
                }
            } else {
                match self.static_copy_node(cur, doc, parent, XmlCopyDepth::Deep) {
                    Ok(q) => q,
                    Err(err) => {
                        self.free_node_list(ret);
                        return Err(err);
                    }
                }
            };
            match p {
                None => {
                    self[q].prev = None;
                    ret = Some(q);
                    p = Some(q);
                }
                // the test is required if two text nodes were coalesced
                Some(pr) if pr != q => {
                    self[pr].next = Some(q);
                    self[q].prev = Some(pr);
                    p = Some(q);
                }
                _ => {}
            }
        }
        Ok(ret)
    }

    /// Copy the subset node `cur` into `doc`, reusing the subset `doc` already has.
    #[cfg(feature = "libxml_tree")]
    fn copy_subset_node(
        &mut self,
        cur: XmlNodeId,
        doc: Option<XmlDocId>,
        parent: Option<XmlNodeId>,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        let (Some(doc), Some(src)) = (doc, self[cur].doc) else {
            return Ok(None);
        };
        let q = match self[doc].int_subset.as_ref().and_then(|dtd| dtd.node) {
            Some(q) if q == cur => return Ok(None),
            Some(q) => {
                self.unlink_node(q);
                q
            }
            None if src == doc => return Ok(None),
            None => self.copy_dtd(src, doc)?,
        };
        self[q].parent = parent;
        Ok(Some(q))
    }

    #[cfg(not(feature = "libxml_tree"))]
    fn copy_subset_node(
        &mut self,
        _cur: XmlNodeId,
        _doc: Option<XmlDocId>,
        _parent: Option<XmlNodeId>,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        Ok(None)
    }

    /// Copy the attribute `cur`, for `target` if given, else for `doc`.
    #[doc(alias = "xmlCopyPropInternal")]
    fn copy_prop_internal(
        &mut self,
        doc: Option<XmlDocId>,
        target: Option<XmlNodeId>,
        cur: XmlNodeId,
        top: Option<XmlNodeId>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        if target.is_some_and(|target| self[target].typ != XmlElementType::XmlElementNode) {
            return Err(XmlTreeError::InvalidArgument(
                "attributes can only be carried by elements",
            ));
        }
        let ret_doc = match target {
            Some(target) => self[target].doc,
            None => doc.or(self[cur].doc),
        };
        let dict = ret_doc.and_then(|doc| self[doc].dict.clone());
        let ret = self.alloc_node(XmlNode {
            name: self[cur].name.as_ref().map(|name| name.copy_for(dict.as_ref())),
            parent: target,
            doc: ret_doc,
            ..XmlNode::with_type(XmlElementType::XmlAttributeNode)
        })?;
        if let Err(err) = self.copy_prop_body(cur, ret, target, top) {
            self.free_prop(ret);
            return Err(err);
        }
        Ok(ret)
    }

    fn copy_prop_body(
        &mut self,
        cur: XmlNodeId,
        ret: XmlNodeId,
        target: Option<XmlNodeId>,
        top: Option<XmlNodeId>,
    ) -> Result<(), XmlTreeError> {
        if let Some((ns, target)) = self[cur].ns.zip(target) {
            let ns = self.copy_ns_reference(ret, ns, top.unwrap_or(target))?;
            self[ret].ns = Some(ns);
        }

        if let Some(children) = self[cur].children {
            let doc = self[ret].doc;
            let list = self.static_copy_node_list(Some(children), doc, Some(ret))?;
            self[ret].children = list;
            self[ret].last = self.children_of(ret).last();
        }

        // Try to handle IDs
        let Some(target_doc) = target.and_then(|target| self[target].doc) else {
            return Ok(());
        };
        let src_doc = self[cur].doc;
        if src_doc.is_none_or(|doc| self[doc].ids.is_empty())
            || !self.is_id(src_doc, self[cur].parent, cur)
        {
            return Ok(());
        }
        if let Some(id) = self.list_get_string(self[cur].children, true) {
            // a collision is reported, the copy stays untyped
            self.add_id(target_doc, &id, ret).ok();
        }
        Ok(())
    }

    /// Do a copy of the attribute.
    ///
    /// The copy is not inserted in the properties of `target`.
    #[doc(alias = "xmlCopyProp")]
    pub fn copy_prop(
        &mut self,
        target: Option<XmlNodeId>,
        cur: XmlNodeId,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.copy_prop_internal(None, target, cur, None)
    }

    /// Do a copy of an attribute list.
    ///
    /// Returns the head of the copied chain, which is not inserted in the
    /// properties of `target`.
    #[doc(alias = "xmlCopyPropList")]
    pub fn copy_prop_list(
        &mut self,
        target: Option<XmlNodeId>,
        cur: Option<XmlNodeId>,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        self.copy_prop_list_in(target, cur, None)
    }

    fn copy_prop_list_in(
        &mut self,
        target: Option<XmlNodeId>,
        cur: Option<XmlNodeId>,
        top: Option<XmlNodeId>,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        if target.is_some_and(|target| self[target].typ != XmlElementType::XmlElementNode) {
            return Err(XmlTreeError::InvalidArgument(
                "attributes can only be carried by elements",
            ));
        }
        let mut ret = None;
        let mut p: Option<XmlNodeId> = None;
        let mut cur = cur;
        while let Some(now) = cur {
            cur = self[now].next;
            let q = match self.copy_prop_internal(None, target, now, top) {
                Ok(q) => q,
                Err(err) => {
                    self.free_prop_list(ret);
                    return Err(err);
                }
            };
            match p {
                Some(p) => {
                    self[p].next = Some(q);
                    self[q].prev = Some(p);
                }
                None => ret = Some(q),
            }
            p = Some(q);
        }
        Ok(ret)
    }

    /// Do a copy of the node.
    #[doc(alias = "xmlCopyNode")]
    pub fn copy_node(
        &mut self,
        node: XmlNodeId,
        depth: XmlCopyDepth,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.static_copy_node(node, None, None, depth)
    }

    /// Do a copy of the node to a given document.
    ///
    /// Names are interned in the dictionary of `doc`, if any.
    #[doc(alias = "xmlDocCopyNode")]
    pub fn doc_copy_node(
        &mut self,
        node: XmlNodeId,
        doc: Option<XmlDocId>,
        depth: XmlCopyDepth,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.static_copy_node(node, doc, None, depth)
    }

    /// Do a copy of the node and append it to `parent`.
    ///
    /// Namespaces of the copy are searched in the scope of `parent` first.
    ///
    /// Returns the inserted node, which is not a fresh node if a text copy
    /// was merged into the last child of `parent`.
    pub fn copy_node_into(
        &mut self,
        node: XmlNodeId,
        parent: XmlNodeId,
        depth: XmlCopyDepth,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let doc = self[parent].doc;
        let copy = self.static_copy_node(node, doc, Some(parent), depth)?;
        if self[parent].last == Some(copy) {
            return Ok(copy);
        }
        // the parent link was only set to resolve namespaces
        self[copy].parent = None;
        self.add_child(parent, copy).inspect_err(|_| self.free_node(copy))
    }

    /// Do a recursive copy of the node list.
    /// Use [`XmlNodeStore::doc_copy_node_list`] if possible to ensure string interning.
    #[doc(alias = "xmlCopyNodeList")]
    pub fn copy_node_list(
        &mut self,
        node: Option<XmlNodeId>,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        self.static_copy_node_list(node, None, None)
    }

    /// Do a recursive copy of the node list.
    #[doc(alias = "xmlDocCopyNodeList")]
    pub fn doc_copy_node_list(
        &mut self,
        doc: Option<XmlDocId>,
        node: Option<XmlNodeId>,
    ) -> Result<Option<XmlNodeId>, XmlTreeError> {
        self.static_copy_node_list(node, doc, None)
    }

    /// Do a copy of the internal subset of `src` into `dest`.
    ///
    /// Returns the node standing for the new subset. It is not linked in the tree of `dest`.
    #[doc(alias = "xmlCopyDtd")]
    #[cfg(feature = "libxml_tree")]
    pub fn copy_dtd(&mut self, src: XmlDocId, dest: XmlDocId) -> Result<XmlNodeId, XmlTreeError> {
        let Some(dtd) = self[src].int_subset.as_ref() else {
            return Err(XmlTreeError::InvalidArgument(
                "document without internal subset",
            ));
        };
        if self[dest].int_subset.is_some() {
            return Err(XmlTreeError::InvalidArgument(
                "document already has an internal subset",
            ));
        }
        let mut copy = dtd.clone();
        let dict = self[dest].dict.clone();
        let node = self.alloc_node(XmlNode {
            name: copy.name.as_deref().map(|name| super::XmlString::new_in(name, dict.as_ref())),
            doc: Some(dest),
            ..XmlNode::with_type(XmlElementType::XmlDTDNode)
        })?;
        copy.node = Some(node);
        self[dest].int_subset = Some(copy);
        Ok(node)
    }

    /// Do a copy of the document info. If recursive, the content tree will
    /// be copied too as well as DTD, namespaces and entities.
    #[doc(alias = "xmlCopyDoc")]
    #[cfg(feature = "libxml_tree")]
    pub fn copy_doc(&mut self, doc: XmlDocId, recursive: bool) -> Result<XmlDocId, XmlTreeError> {
        let src = &self[doc];
        let (typ, version, url) = (src.typ, src.version.clone(), src.url.clone());
        let ret = self.new_doc_internal(version.as_deref(), None, typ)?;
        self[ret].url = url;
        if !recursive {
            return Ok(ret);
        }
        if let Err(err) = self.copy_doc_content(doc, ret) {
            self.free_doc(ret);
            return Err(err);
        }
        Ok(ret)
    }

    #[cfg(feature = "libxml_tree")]
    fn copy_doc_content(&mut self, doc: XmlDocId, ret: XmlDocId) -> Result<(), XmlTreeError> {
        if self[doc].int_subset.is_some() {
            self.copy_dtd(doc, ret)?;
        }
        if let Some(old_ns) = self[doc].old_ns {
            let copy = self.copy_namespace_list(Some(old_ns))?;
            for ns in self.ns_chain(copy).collect::<Vec<_>>() {
                self.append_old_ns(ret, ns);
            }
        }
        let src_node = self[doc].node;
        let ret_node = self[ret].node;
        if let Some(children) = self[src_node].children {
            let list = self.static_copy_node_list(Some(children), Some(ret), Some(ret_node))?;
            self[ret_node].children = list;
            self[ret_node].last = self.children_of(ret_node).last();
        }
        Ok(())
    }

    /// This function checks that all the namespaces declared within the given
    /// tree are properly declared. This is needed for example after Copy or Cut
    /// and then paste operations. The subtree may still hold references to
    /// namespace declarations outside the subtree or invalid/masked. As much
    /// as possible the function try to reuse the existing namespaces found in
    /// the new environment. If not possible the new namespaces are redeclared
    /// on `tree` at the top of the given subtree.
    ///
    /// References already resolving to the in-scope declaration of their
    /// prefix are kept.
    ///
    /// Returns the number of rebound references.
    #[doc(alias = "xmlReconciliateNs")]
    #[cfg(feature = "libxml_tree")]
    pub fn reconciliate_ns(&mut self, doc: XmlDocId, tree: XmlNodeId) -> Result<usize, XmlTreeError> {
        if self[tree].typ != XmlElementType::XmlElementNode {
            return Err(XmlTreeError::InvalidArgument("the subtree root must be an element"));
        }
        if self[doc].typ != XmlElementType::XmlDocumentNode {
            return Err(XmlTreeError::InvalidArgument("not an XML document"));
        }
        if self[tree].doc != Some(doc) {
            return Err(XmlTreeError::CrossDocumentMismatch);
        }

        let mut cache: Vec<(XmlNsId, XmlNsId)> = vec![];
        let mut rebound = 0;
        let mut node = tree;
        loop {
            // Reconciliate the node namespace, then the ones held by attributes.
            let targets = std::iter::once(node)
                .chain(self.attributes_of(node))
                .collect::<Vec<_>>();
            for cur in targets {
                let Some(ns) = self[cur].ns else {
                    continue;
                };
                if self.search_ns(cur, self[ns].prefix()) == Some(ns) {
                    continue;
                }
                let new = match cache.iter().find(|&&(old, _)| old == ns) {
                    Some(&(_, new)) => new,
                    // reported, the reference stays as is
                    None => match self.new_reconciled_ns(tree, ns) {
                        Ok(new) => {
                            cache.push((ns, new));
                            new
                        }
                        Err(_) => continue,
                    },
                };
                self[cur].ns = Some(new);
                rebound += 1;
            }

            // Browse the full subtree, deep first
            if let Some(children) = self[node]
                .children
                .filter(|_| self[node].typ != XmlElementType::XmlEntityRefNode)
            {
                node = children;
                continue;
            }
            let next = loop {
                if node == tree {
                    break None;
                }
                if let Some(next) = self[node].next {
                    break Some(next);
                }
                match self[node].parent {
                    Some(parent) => node = parent,
                    None => break None,
                }
            };
            match next {
                Some(next) => node = next,
                None => break,
            }
        }
        Ok(rebound)
    }
}
