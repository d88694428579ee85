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

use crate::{
    dict::XmlDictRef,
    error::{XmlParserErrors, XmlTreeError},
    tree::{
        XML_XML_PREFIX, XmlAttributeType, XmlDocId, XmlElementType, XmlNodeId, XmlNodeStore,
        XmlString, xml_tree_err,
    },
};

use super::{
    XmlDOMWrapAcquireNsFunction, XmlDOMWrapCtxt, XmlNsMap, XmlNsMapDepth, XmlSubtreeWalk,
    XmlWalkEvent,
};

// The dictionaries strings are moved between: the one of the source
// document and the one of the destination document, if any.
type XmlDictPair = (XmlDictRef, Option<XmlDictRef>);

/// Re-intern `s` in the destination dictionary if it is an entry of the
/// source dictionary.
fn adopt_string(s: &mut Option<XmlString>, dicts: Option<&XmlDictPair>) {
    if let (Some((source, dest)), Some(cur)) = (dicts, s.as_ref()) {
        if cur.is_owned_by(source) {
            *s = Some(cur.copy_for(dest.as_ref()));
        }
    }
}

fn is_adoptable(typ: XmlElementType) -> bool {
    matches!(
        typ,
        XmlElementType::XmlElementNode
            | XmlElementType::XmlAttributeNode
            | XmlElementType::XmlTextNode
            | XmlElementType::XmlCDATASectionNode
            | XmlElementType::XmlEntityRefNode
            | XmlElementType::XmlPINode
            | XmlElementType::XmlCommentNode
    )
}

impl XmlNodeStore {
    /// The dictionaries involved in moving strings from `source_doc` to
    /// `dest_doc`, or `None` if nothing needs to be re-interned.
    fn string_adoption(&self, source_doc: XmlDocId, dest_doc: XmlDocId) -> Option<XmlDictPair> {
        let source = self[source_doc].dict.clone()?;
        let dest = self[dest_doc].dict.clone();
        if dest.as_ref().is_some_and(|dest| dest.ptr_eq(&source)) {
            return None;
        }
        Some((source, dest))
    }

    /// Check that every node of the subtree rooted at `node` can be adopted.
    fn check_adoptable(&self, source_doc: XmlDocId, node: XmlNodeId) -> Result<(), XmlTreeError> {
        let mut walk = XmlSubtreeWalk::new(node, true);
        while let Some(event) = walk.next(self) {
            let XmlWalkEvent::Enter(cur) = event else {
                continue;
            };
            if self[cur].doc != Some(source_doc) {
                walk.skip_subtree();
                continue;
            }
            let typ = self[cur].typ;
            if !is_adoptable(typ) {
                xml_tree_err(
                    XmlParserErrors::XmlCheckUnknownNode,
                    Some(cur),
                    Some(&format!("{typ:?}")),
                );
                return Err(XmlTreeError::UnsupportedNodeKind(typ));
            }
        }
        Ok(())
    }

    /// References of `node` to an entity declaration or to strings of the
    /// source dictionary are moved to `dest_doc`.
    fn adopt_leaf(&mut self, node: XmlNodeId, dest_doc: XmlDocId, dicts: Option<&XmlDictPair>) {
        self[node].doc = Some(dest_doc);
        match self[node].typ {
            XmlElementType::XmlTextNode | XmlElementType::XmlCDATASectionNode => {
                adopt_string(&mut self[node].content, dicts);
            }
            XmlElementType::XmlEntityRefNode => {
                // Remove reference to the entity-node.
                self.bind_entity_ref(node, Some(dest_doc));
            }
            XmlElementType::XmlPINode => {
                let cur = &mut self[node];
                adopt_string(&mut cur.name, dicts);
                adopt_string(&mut cur.content, dicts);
            }
            _ => {}
        }
    }

    /// Drop `attr` from the ID table of `source_doc`, the IDs of the
    /// destination document are not updated.
    fn adopt_attr_type(&mut self, source_doc: XmlDocId, attr: XmlNodeId) {
        if self[attr].atype == Some(XmlAttributeType::XmlAttributeID) {
            self.remove_id(source_doc, attr);
        }
        self[attr].atype = None;
    }

    /// Adopts the subtree rooted at the element `node`: namespace
    /// references are resolved against `dest_parent`, or against the
    /// fallback chain of `dest_doc` without destination parent.
    #[doc(alias = "xmlDOMWrapAdoptBranch")]
    fn adopt_branch(
        &mut self,
        source_doc: XmlDocId,
        node: XmlNodeId,
        dest_doc: XmlDocId,
        dest_parent: Option<XmlNodeId>,
        map: &mut XmlNsMap,
        mut acquire: Option<&mut XmlDOMWrapAcquireNsFunction>,
    ) -> Result<(), XmlTreeError> {
        // Optimize string adoption for equal or none dicts.
        let dicts = self.string_adoption(source_doc, dest_doc);
        // Disable search for ns-decls in the parent-axis of the
        // destination element, if:
        // 1) there's no destination parent
        // 2) custom ns-reference handling is used
        let mut parnsdone = dest_parent.is_none() || acquire.is_some();
        let mut depth = 0;

        let mut walk = XmlSubtreeWalk::new(node, true);
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
            if self[cur].doc != Some(source_doc) {
                // We'll assume XIncluded nodes if the doc differs.
                walk.skip_subtree();
                continue;
            }
            let typ = self[cur].typ;
            match typ {
                XmlElementType::XmlElementNode | XmlElementType::XmlAttributeNode => {
                    let cur_elem = if typ == XmlElementType::XmlElementNode {
                        depth += 1;
                        let defs = self.ns_defs_of(cur).collect::<Vec<_>>();
                        for &ns in &defs {
                            self[ns].context = Some(dest_doc);
                        }
                        if acquire.is_none() {
                            // Namespace declarations.
                            for ns in defs {
                                if !parnsdone {
                                    if let Some(parent) = dest_parent {
                                        self.gather_in_scope_ns(map, parent);
                                    }
                                    parnsdone = true;
                                }
                                let prefix = self[ns].prefix.clone();
                                map.shadow_prefix(self, prefix.as_deref(), depth);
                                map.add_item(false, Some(ns), ns, XmlNsMapDepth::Element(depth));
                            }
                        }
                        cur
                    } else {
                        self.adopt_attr_type(source_doc, cur);
                        match self[cur].parent {
                            Some(parent) => parent,
                            None => cur,
                        }
                    };
                    self[cur].doc = Some(dest_doc);
                    adopt_string(&mut self[cur].name, dicts.as_ref());

                    let Some(ns) = self[cur].ns else {
                        continue;
                    };
                    if !parnsdone {
                        if let Some(parent) = dest_parent {
                            self.gather_in_scope_ns(map, parent);
                        }
                        parnsdone = true;
                    }
                    // Search for a mapping.
                    let new = match map.find(ns) {
                        Some(new) => new,
                        None => match acquire.as_deref_mut() {
                            Some(func) => {
                                // User-defined behaviour.
                                let new = self.acquire_custom_ns(func, cur, ns)?;
                                map.add_item(false, Some(ns), new, XmlNsMapDepth::Custom);
                                new
                            }
                            None => {
                                let is_attr = typ == XmlElementType::XmlAttributeNode;
                                // Acquire a normalized ns-decl and add it to the map.
                                self.acquire_normalized_ns(
                                    dest_doc,
                                    dest_parent.map(|_| cur_elem),
                                    ns,
                                    map,
                                    depth,
                                    is_attr,
                                )?
                            }
                        },
                    };
                    self[cur].ns = Some(new);
                }
                XmlElementType::XmlTextNode
                | XmlElementType::XmlCDATASectionNode
                | XmlElementType::XmlEntityRefNode
                | XmlElementType::XmlPINode
                | XmlElementType::XmlCommentNode => {
                    self.adopt_leaf(cur, dest_doc, dicts.as_ref());
                }
                _ => {
                    xml_tree_err(
                        XmlParserErrors::XmlCheckUnknownNode,
                        Some(cur),
                        Some(&format!("{typ:?}")),
                    );
                    return Err(XmlTreeError::UnsupportedNodeKind(typ));
                }
            }
        }
        Ok(())
    }

    /// Adopts the attribute `attr`. Its namespace is declared on
    /// `dest_parent`, or stored in the fallback chain of `dest_doc`.
    #[doc(alias = "xmlDOMWrapAdoptAttr")]
    fn adopt_attr(
        &mut self,
        source_doc: XmlDocId,
        attr: XmlNodeId,
        dest_doc: XmlDocId,
        dest_parent: Option<XmlNodeId>,
        acquire: Option<&mut XmlDOMWrapAcquireNsFunction>,
    ) -> Result<(), XmlTreeError> {
        let dicts = self.string_adoption(source_doc, dest_doc);
        self[attr].doc = Some(dest_doc);
        if let Some(ns) = self[attr].ns {
            let new = if self[ns].prefix() == Some(XML_XML_PREFIX) {
                self.xml_namespace()
            } else if let Some(func) = acquire {
                self.acquire_custom_ns(func, attr, ns)?
            } else {
                let href = self[ns].href.clone();
                let prefix = self[ns].prefix.clone();
                match dest_parent {
                    // Store in the doc's fallback chain.
                    None => self.store_ns(dest_doc, href.as_deref(), prefix.as_deref())?,
                    Some(parent) => {
                        // Declare on @destParent.
                        match href.as_deref().and_then(|href| {
                            self.search_ns_by_namespace_strict(parent, href, true)
                        }) {
                            Some(found) => found,
                            None => self.declare_ns_forced(
                                parent,
                                href.as_deref(),
                                prefix.as_deref(),
                                true,
                            )?,
                        }
                    }
                }
            };
            self[attr].ns = Some(new);
        }

        adopt_string(&mut self[attr].name, dicts.as_ref());
        self.adopt_attr_type(source_doc, attr);

        // Walk content.
        let children = self.children_of(attr).collect::<Vec<_>>();
        for child in children {
            self.adopt_leaf(child, dest_doc, dicts.as_ref());
        }
        Ok(())
    }

    /// References of out-of scope ns-decls are remapped to point to
    /// `dest_doc`:
    /// 1) If `dest_parent` is given, then nsDef entries on element-nodes are used
    /// 2) If *no* `dest_parent` is given, then `dest_doc.old_ns` entries are used.
    ///    This is the case when you have an unlinked node and just want to move it
    ///    to the context of `dest_doc`.
    ///
    /// If `ctxt` carries an acquisition callback, it resolves the
    /// references instead.
    ///
    /// Note that, since prefixes of already existent ns-decls can be
    /// shadowed by this process, it could break QNames in attribute
    /// values or element content.
    ///
    /// `node` is unlinked if `dest_parent` is not its parent; linking it
    /// into `dest_parent` is up to the caller. IDs of adopted attributes are
    /// removed from the ID table of `source_doc`.
    ///
    /// The subtree is checked for unsupported node kinds before anything is
    /// modified; an error raised later leaves it partially adopted.
    #[doc(alias = "xmlDOMWrapAdoptNode")]
    pub fn dom_wrap_adopt_node(
        &mut self,
        ctxt: Option<&mut XmlDOMWrapCtxt>,
        source_doc: Option<XmlDocId>,
        node: XmlNodeId,
        dest_doc: XmlDocId,
        dest_parent: Option<XmlNodeId>,
    ) -> Result<(), XmlTreeError> {
        if dest_parent.is_some_and(|parent| self[parent].doc != Some(dest_doc)) {
            return Err(XmlTreeError::CrossDocumentMismatch);
        }
        // Check node->doc sanity.
        let source_doc = match (source_doc, self[node].doc) {
            (Some(source), Some(doc)) if source == doc => source,
            (Some(_), _) => return Err(XmlTreeError::CrossDocumentMismatch),
            (None, Some(doc)) => doc,
            (None, None) => {
                return Err(XmlTreeError::InvalidArgument(
                    "node does not belong to a document",
                ));
            }
        };
        if source_doc == dest_doc {
            return Err(XmlTreeError::InvalidArgument(
                "node already belongs to the destination document",
            ));
        }
        let typ = self[node].typ;
        match typ {
            XmlElementType::XmlElementNode | XmlElementType::XmlAttributeNode => {
                self.check_adoptable(source_doc, node)?;
            }
            ty if is_adoptable(ty) => {}
            XmlElementType::XmlDocumentFragNode => {
                return Err(XmlTreeError::NotYetSupported(typ));
            }
            _ => return Err(XmlTreeError::UnsupportedNodeKind(typ)),
        }

        // Unlink only if @node was not already added to @destParent.
        if self[node].parent.is_some() && self[node].parent != dest_parent {
            self.unlink_node(node);
        }

        let mut local = XmlNsMap::new();
        let (map, acquire) = match ctxt {
            Some(ctxt) => ctxt.parts(),
            None => (&mut local, None),
        };
        match typ {
            XmlElementType::XmlElementNode => {
                map.clear();
                let res = self.adopt_branch(source_doc, node, dest_doc, dest_parent, map, acquire);
                map.clear();
                res
            }
            XmlElementType::XmlAttributeNode => {
                self.adopt_attr(source_doc, node, dest_doc, dest_parent, acquire)
            }
            _ => {
                let dicts = self.string_adoption(source_doc, dest_doc);
                self.adopt_leaf(node, dest_doc, dicts.as_ref());
                Ok(())
            }
        }
    }
}
