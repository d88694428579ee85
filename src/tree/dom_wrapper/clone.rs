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
    error::XmlTreeError,
    tree::{XmlDocId, XmlElementType, XmlNode, XmlNodeId, XmlNodeStore, XmlNs, XmlString},
};

use super::{
    XmlDOMWrapAcquireNsFunction, XmlDOMWrapCtxt, XmlNsMap, XmlNsMapDepth, XmlSubtreeWalk,
    XmlWalkEvent,
};

/// An element or attribute clone whose content is being cloned.
struct XmlCloneParent {
    clone: XmlNodeId,
    // the last attribute cloned into it
    prev_prop: Option<XmlNodeId>,
}

/// The cursors building the clone during the walk of the source.
struct XmlCloneCursor {
    result_clone: Option<XmlNodeId>,
    // the innermost entry is the parent of the next clone
    parents: Vec<XmlCloneParent>,
}

impl XmlCloneCursor {
    fn parent_clone(&self) -> Option<XmlNodeId> {
        self.parents.last().map(|parent| parent.clone)
    }
}

fn is_clonable_root(typ: XmlElementType) -> bool {
    matches!(
        typ,
        XmlElementType::XmlElementNode
            | XmlElementType::XmlTextNode
            | XmlElementType::XmlCDATASectionNode
            | XmlElementType::XmlEntityRefNode
            | XmlElementType::XmlPINode
            | XmlElementType::XmlCommentNode
    )
}

impl XmlNodeStore {
    /// Link `clone` as last attribute or last child of the current parent clone.
    fn link_clone(&mut self, cursor: &mut XmlCloneCursor, clone: XmlNodeId) {
        let Some(parent) = cursor.parents.last_mut() else {
            cursor.result_clone = Some(clone);
            return;
        };
        let parent_clone = parent.clone;
        self[clone].parent = Some(parent_clone);
        if self[clone].typ == XmlElementType::XmlAttributeNode {
            match parent.prev_prop.replace(clone) {
                Some(prev) => {
                    self[prev].next = Some(clone);
                    self[clone].prev = Some(prev);
                }
                None => self[parent_clone].properties = Some(clone),
            }
        } else {
            match self[parent_clone].last.replace(clone) {
                Some(prev) => {
                    self[prev].next = Some(clone);
                    self[clone].prev = Some(prev);
                }
                None => self[parent_clone].children = Some(clone),
            }
        }
    }

    /// Allocate the clone of `cur`, without namespace information.
    fn clone_single_node(
        &mut self,
        source_doc: XmlDocId,
        cur: XmlNodeId,
        dest_doc: XmlDocId,
        dict: Option<&XmlDictRef>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let node = &self[cur];
        let typ = node.typ;
        let mut clone = XmlNode {
            name: node.name.as_ref().map(|name| name.copy_for(dict)),
            doc: Some(dest_doc),
            ..XmlNode::with_type(typ)
        };
        match typ {
            XmlElementType::XmlElementNode => clone.line = node.line,
            XmlElementType::XmlAttributeNode => {}
            XmlElementType::XmlTextNode
            | XmlElementType::XmlCDATASectionNode
            | XmlElementType::XmlCommentNode
            | XmlElementType::XmlPINode => {
                clone.content = node.content.as_deref().map(XmlString::from);
            }
            XmlElementType::XmlEntityRefNode => {
                if source_doc == dest_doc {
                    // Same doc: keep the binding of the source.
                    clone.ent_bound = node.ent_bound;
                    clone.content = node.content.as_deref().map(XmlString::from);
                }
            }
            ty => return Err(XmlTreeError::UnsupportedNodeKind(ty)),
        }
        let clone = self.alloc_node(clone)?;
        if typ == XmlElementType::XmlEntityRefNode && source_doc != dest_doc {
            // Different doc: Assign new entity-node if available.
            self.bind_entity_ref(clone, Some(dest_doc));
        }
        Ok(clone)
    }

    /// Clone the namespace declarations of the element `cur` onto `clone`,
    /// registering them in `map` unless `map_defs` is `false`.
    fn clone_ns_defs(
        &mut self,
        cur: XmlNodeId,
        clone: XmlNodeId,
        dest_doc: XmlDocId,
        map: &mut XmlNsMap,
        depth: usize,
        map_defs: bool,
    ) -> Result<(), XmlTreeError> {
        let defs = self.ns_defs_of(cur).collect::<Vec<_>>();
        for ns in defs {
            // Create a new xmlNs.
            let clone_ns = self.alloc_ns(XmlNs {
                next: None,
                href: self[ns].href.clone(),
                prefix: self[ns].prefix.clone(),
                context: Some(dest_doc),
            })?;
            self.append_ns_def(clone, clone_ns);
            // Note that for custom handling of ns-references,
            // the ns-decls need not be stored in the ns-map,
            // since they won't be referenced by node->ns.
            if map_defs {
                let prefix = self[ns].prefix.clone();
                map.shadow_prefix(self, prefix.as_deref(), depth);
                map.add_item(false, Some(ns), clone_ns, XmlNsMapDepth::Element(depth));
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn clone_subtree(
        &mut self,
        source_doc: XmlDocId,
        node: XmlNodeId,
        dest_doc: XmlDocId,
        dest_parent: Option<XmlNodeId>,
        deep: bool,
        cursor: &mut XmlCloneCursor,
        map: &mut XmlNsMap,
        mut acquire: Option<&mut XmlDOMWrapAcquireNsFunction>,
    ) -> Result<(), XmlTreeError> {
        let dict = self[dest_doc].dict.clone();
        let mut parnsdone = dest_parent.is_none() || acquire.is_some();
        let mut depth = 0;

        let mut walk = XmlSubtreeWalk::new(node, deep);
        while let Some(event) = walk.next(self) {
            let cur = match event {
                XmlWalkEvent::Enter(cur) => cur,
                XmlWalkEvent::Leave(cur) => {
                    if self[cur].typ == XmlElementType::XmlElementNode {
                        map.leave_depth(depth);
                        depth -= 1;
                    }
                    cursor.parents.pop();
                    continue;
                }
            };
            let clone = self.clone_single_node(source_doc, cur, dest_doc, dict.as_ref())?;
            self.link_clone(cursor, clone);

            let typ = self[cur].typ;
            let cur_elem = match typ {
                XmlElementType::XmlElementNode => {
                    depth += 1;
                    if self[cur].ns_def.is_some() && !parnsdone {
                        if let Some(parent) = dest_parent {
                            self.gather_in_scope_ns(map, parent);
                        }
                        parnsdone = true;
                    }
                    self.clone_ns_defs(cur, clone, dest_doc, map, depth, acquire.is_none())?;
                    clone
                }
                XmlElementType::XmlAttributeNode => cursor.parent_clone().unwrap_or(clone),
                _ => continue,
            };
            cursor.parents.push(XmlCloneParent {
                clone,
                prev_prop: None,
            });

            if let Some(ns) = self[cur].ns {
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
                            let new = self.acquire_custom_ns(func, clone, ns)?;
                            map.add_item(false, Some(ns), new, XmlNsMapDepth::Custom);
                            new
                        }
                        None => self.acquire_normalized_ns(
                            dest_doc,
                            dest_parent.map(|_| cur_elem),
                            ns,
                            map,
                            depth,
                            typ == XmlElementType::XmlAttributeNode,
                        )?,
                    },
                };
                self[clone].ns = Some(new);
            }

            // Handle ID attributes.
            if typ == XmlElementType::XmlAttributeNode
                && self[clone].parent.is_some()
                && self.is_id(Some(dest_doc), self[clone].parent, clone)
            {
                if let Some(id) = self.list_get_string(self[cur].children, true) {
                    // a collision is reported, the clone stays untyped
                    self.add_id(dest_doc, &id, clone).ok();
                }
            }
        }
        Ok(())
    }

    /// References of out-of scope ns-decls are remapped to point to
    /// `dest_doc`:
    /// 1) If `dest_parent` is given, then nsDef entries on element-nodes are used
    /// 2) If *no* `dest_parent` is given, then `dest_doc.old_ns` entries are used.
    ///    This is the case when you don't know already where the cloned branch
    ///    will be added to.
    ///
    /// If `ctxt` carries an acquisition callback, it resolves the
    /// references instead.
    ///
    /// The root of the clone is not linked anywhere, even if `dest_parent`
    /// is given. Attributes are always cloned with their content, element
    /// children only if `deep` is `true`. ID attributes are registered in
    /// `dest_doc`. On failure the partial clone is freed.
    ///
    /// Returns the root of the clone.
    #[doc(alias = "xmlDOMWrapCloneNode")]
    pub fn dom_wrap_clone_node(
        &mut self,
        ctxt: Option<&mut XmlDOMWrapCtxt>,
        source_doc: Option<XmlDocId>,
        node: XmlNodeId,
        dest_doc: XmlDocId,
        dest_parent: Option<XmlNodeId>,
        deep: bool,
    ) -> Result<XmlNodeId, XmlTreeError> {
        if dest_parent.is_some_and(|parent| self[parent].doc != Some(dest_doc)) {
            return Err(XmlTreeError::CrossDocumentMismatch);
        }
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
        let typ = self[node].typ;
        if !is_clonable_root(typ) {
            return Err(XmlTreeError::UnsupportedNodeKind(typ));
        }

        let mut local = XmlNsMap::new();
        let (map, acquire) = match ctxt {
            Some(ctxt) => ctxt.parts(),
            None => (&mut local, None),
        };
        map.clear();
        let mut cursor = XmlCloneCursor {
            result_clone: None,
            parents: vec![],
        };
        let res = self.clone_subtree(
            source_doc,
            node,
            dest_doc,
            dest_parent,
            deep,
            &mut cursor,
            map,
            acquire,
        );
        map.clear();
        match (res, cursor.result_clone) {
            (Ok(()), Some(clone)) => Ok(clone),
            (Ok(()), None) => Err(XmlTreeError::UnsupportedNodeKind(typ)),
            (Err(err), clone) => {
                if let Some(clone) = clone {
                    self.free_node(clone);
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_clone_node_links() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
        store.set_root_element(doc, root).unwrap();
        store.new_prop(Some(root), "a", Some("1")).unwrap();
        store.new_prop(Some(root), "b", Some("2")).unwrap();
        store.new_child(root, None, "first", Some("text")).unwrap();
        store.new_child(root, None, "second", None).unwrap();

        let clone = store
            .dom_wrap_clone_node(None, None, root, doc, None, true)
            .unwrap();
        assert_ne!(clone, root);
        assert_eq!(store[clone].parent(), None);
        let attrs = store.attributes_of(clone).collect::<Vec<_>>();
        assert_eq!(attrs.len(), 2);
        assert_eq!(store[attrs[1]].prev(), Some(attrs[0]));
        assert_eq!(store.get_prop(clone, "b").as_deref(), Some("2"));
        let children = store.children_of(clone).collect::<Vec<_>>();
        assert_eq!(children.len(), 2);
        assert_eq!(store[clone].last(), Some(children[1]));
        assert_eq!(store[children[0]].parent(), Some(clone));
        assert_eq!(store.get_content(children[0]).as_deref(), Some("text"));

        let shallow = store
            .dom_wrap_clone_node(None, None, root, doc, None, false)
            .unwrap();
        assert_eq!(store[shallow].children(), None);
        assert_eq!(store.attributes_of(shallow).count(), 2);
    }

    #[test]
    fn test_xml_clone_node_rejects_attribute_root() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
        let attr = store.new_prop(Some(root), "a", Some("1")).unwrap();
        assert_eq!(
            store.dom_wrap_clone_node(None, None, attr, doc, None, true),
            Err(XmlTreeError::UnsupportedNodeKind(
                XmlElementType::XmlAttributeNode
            ))
        );
    }
}
