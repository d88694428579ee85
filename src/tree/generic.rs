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

use super::{XmlAttributeType, XmlDocId, XmlElementType, XmlNodeId, XmlNodeStore, XmlString};

impl XmlNodeStore {
    /// Unlink a node from it's current context, the node is not freed.
    /// If one need to free the node, use [`XmlNodeStore::free_node`] after the unlink to discard it.
    ///
    /// Attributes are unlinked from the `properties` chain of their element.
    #[doc(alias = "xmlUnlinkNode")]
    pub fn unlink_node(&mut self, node: XmlNodeId) {
        let Links {
            typ,
            parent,
            prev,
            next,
        } = self.links(node);
        if let Some(parent) = parent {
            if typ == XmlElementType::XmlAttributeNode {
                if self[parent].properties == Some(node) {
                    self[parent].properties = next;
                }
            } else {
                if self[parent].children == Some(node) {
                    self[parent].children = next;
                }
                if self[parent].last == Some(node) {
                    self[parent].last = prev;
                }
            }
        }
        if let Some(next) = next {
            self[next].prev = prev;
        }
        if let Some(prev) = prev {
            self[prev].next = next;
        }
        let cur = &mut self[node];
        cur.parent = None;
        cur.next = None;
        cur.prev = None;
    }

    fn links(&self, node: XmlNodeId) -> Links {
        let cur = &self[node];
        Links {
            typ: cur.typ,
            parent: cur.parent,
            prev: cur.prev,
            next: cur.next,
        }
    }

    /// Append `content` to the content of the text node `node`.
    fn append_text(&mut self, node: XmlNodeId, content: &str) {
        let mut buf = self[node].content.as_deref().unwrap_or_default().to_owned();
        buf.push_str(content);
        self[node].content = Some(XmlString::from(buf.as_str()));
    }

    /// Merge the text node `cur` into `into`, then free `cur`.
    pub(crate) fn merge_text_into(&mut self, into: XmlNodeId, cur: XmlNodeId) -> XmlNodeId {
        let content = self[cur].content.clone();
        self.append_text(into, content.as_deref().unwrap_or_default());
        self.unlink_node(cur);
        self.free_node(cur);
        into
    }

    pub(crate) fn can_merge_text(&self, a: XmlNodeId, b: XmlNodeId) -> bool {
        a != b
            && self[a].typ == XmlElementType::XmlTextNode
            && self[b].typ == XmlElementType::XmlTextNode
            && self[a].name == self[b].name
    }

    /// Add a new node to `parent`, at the end of the child (or property) list
    /// merging adjacent TEXT nodes (in which case `cur` is freed).
    ///
    /// If the new node is ATTRIBUTE, it is added into properties instead of children.
    /// If there is an attribute with equal name, it is first destroyed.
    ///
    /// All tree manipulation functions can safely move nodes within a document.
    /// But when moving nodes from one document to another, references to
    /// namespaces in element or attribute nodes are NOT fixed. In this case,
    /// you MUST call [`XmlNodeStore::reconciliate_ns`] or
    /// [`XmlNodeStore::dom_wrap_reconcile_namespaces`] after the move operation.
    ///
    /// Returns the child, which is not `cur` if text was merged.
    #[doc(alias = "xmlAddChild")]
    pub fn add_child(
        &mut self,
        parent: XmlNodeId,
        cur: XmlNodeId,
    ) -> Result<XmlNodeId, XmlTreeError> {
        if parent == cur {
            return Err(XmlTreeError::InvalidArgument("a node cannot be its own child"));
        }
        if self[parent].typ == XmlElementType::XmlNamespaceDecl
            || self[cur].typ == XmlElementType::XmlNamespaceDecl
        {
            return Err(XmlTreeError::UnsupportedNodeKind(
                XmlElementType::XmlNamespaceDecl,
            ));
        }

        // If cur is a TEXT node, merge its content with adjacent TEXT nodes cur is then freed.
        if self[cur].typ == XmlElementType::XmlTextNode {
            if self[parent].typ == XmlElementType::XmlTextNode
                && self[parent].content.is_some()
                && self[parent].name == self[cur].name
            {
                return Ok(self.merge_text_into(parent, cur));
            }
            if let Some(last) = self[parent]
                .last
                .filter(|&last| self.can_merge_text(last, cur))
            {
                return Ok(self.merge_text_into(last, cur));
            }
        }

        // add the new element at the end of the children list.
        let prev = self[cur].parent;
        if prev != Some(parent) {
            self.unlink_node(cur);
        }
        self[cur].parent = Some(parent);
        let doc = self[parent].doc;
        if self[cur].doc != doc {
            self.set_tree_doc(cur, doc);
        }
        // this check prevents a loop on tree-traversions if a developer
        // tries to add a node to its parent multiple times
        if prev == Some(parent) {
            return Ok(cur);
        }

        // Coalescing
        if self[parent].typ == XmlElementType::XmlTextNode && self[parent].content.is_some() {
            self[cur].parent = None;
            return Ok(self.merge_text_into(parent, cur));
        }
        if self[cur].typ == XmlElementType::XmlAttributeNode {
            if self[parent].typ != XmlElementType::XmlElementNode {
                self[cur].parent = None;
                return Err(XmlTreeError::InvalidArgument(
                    "attributes can only be added to elements",
                ));
            }
            // check if an attribute with the same name exists
            let href = self[cur]
                .ns
                .and_then(|ns| self[ns].href.as_deref().map(str::to_owned));
            let name = self[cur].name.clone();
            if let Some(lastattr) = name
                .as_deref()
                .and_then(|name| self.has_ns_prop(parent, name, href.as_deref()))
                .filter(|&attr| attr != cur)
            {
                // different instance, destroy it (attributes must be unique)
                self.remove_prop(lastattr);
            }
            match self.attributes_of(parent).last() {
                Some(lastattr) => {
                    self[lastattr].next = Some(cur);
                    self[cur].prev = Some(lastattr);
                }
                None => self[parent].properties = Some(cur),
            }
        } else {
            match self[parent].last {
                Some(last) => {
                    self[cur].prev = Some(last);
                    self[last].next = Some(cur);
                }
                None => self[parent].children = Some(cur),
            }
            self[parent].last = Some(cur);
        }
        Ok(cur)
    }

    /// Add a list of node at the end of the child list of the parent
    /// merging adjacent TEXT nodes (`cur` may be freed)
    ///
    /// See the note regarding namespaces in [`XmlNodeStore::add_child`].
    ///
    /// Returns the last child.
    #[doc(alias = "xmlAddChildList")]
    pub fn add_child_list(
        &mut self,
        parent: XmlNodeId,
        cur: XmlNodeId,
    ) -> Result<XmlNodeId, XmlTreeError> {
        let mut last = None;
        let mut cur = Some(cur);
        while let Some(now) = cur {
            cur = self[now].next;
            self[now].next = None;
            self[now].prev = None;
            self[now].parent = None;
            last = Some(self.add_child(parent, now)?);
        }
        last.ok_or(XmlTreeError::InvalidArgument("empty node list"))
    }

    /// Add a new node `elem` as the previous sibling of `cur`
    /// merging adjacent TEXT nodes (`elem` may be freed).
    /// If the new node was already inserted in a document it is
    /// first unlinked from its existing context.
    /// If the new node is ATTRIBUTE, it is added into properties instead of children.
    /// If there is an attribute with equal name, it is first destroyed.
    ///
    /// See the note regarding namespaces in [`XmlNodeStore::add_child`].
    ///
    /// Returns the new node.
    #[doc(alias = "xmlAddPrevSibling")]
    pub fn add_prev_sibling(
        &mut self,
        cur: XmlNodeId,
        elem: XmlNodeId,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.check_sibling(cur, elem)?;
        self.unlink_node(elem);

        if self[elem].typ == XmlElementType::XmlTextNode {
            if self.can_merge_text(cur, elem) {
                let mut buf = self[elem].content.as_deref().unwrap_or_default().to_owned();
                buf.push_str(self[cur].content.as_deref().unwrap_or_default());
                self[cur].content = Some(XmlString::from(buf.as_str()));
                self.free_node(elem);
                return Ok(cur);
            }
            if let Some(prev) = self[cur].prev.filter(|&prev| self.can_merge_text(prev, elem)) {
                return Ok(self.merge_text_into(prev, elem));
            }
        } else if self[elem].typ == XmlElementType::XmlAttributeNode {
            let prev = self[cur].prev;
            return self.add_prop_sibling(prev, cur, elem);
        }

        let doc = self[cur].doc;
        if self[elem].doc != doc {
            self.set_tree_doc(elem, doc);
        }
        let parent = self[cur].parent;
        let prev = self[cur].prev;
        self[elem].parent = parent;
        self[elem].prev = prev;
        self[elem].next = Some(cur);
        self[cur].prev = Some(elem);
        if let Some(prev) = prev {
            self[prev].next = Some(elem);
        }
        if let Some(parent) = parent.filter(|&parent| self[parent].children == Some(cur)) {
            self[parent].children = Some(elem);
        }
        Ok(elem)
    }

    /// Add a new node `elem` as the next sibling of `cur`.
    /// If the new node was already inserted in a document it is
    /// first unlinked from its existing context.
    /// As a result of text merging `elem` may be freed.
    /// If the new node is ATTRIBUTE, it is added into properties instead of children.
    /// If there is an attribute with equal name, it is first destroyed.
    ///
    /// See the note regarding namespaces in [`XmlNodeStore::add_child`].
    ///
    /// Returns the new node.
    #[doc(alias = "xmlAddNextSibling")]
    pub fn add_next_sibling(
        &mut self,
        cur: XmlNodeId,
        elem: XmlNodeId,
    ) -> Result<XmlNodeId, XmlTreeError> {
        self.check_sibling(cur, elem)?;
        self.unlink_node(elem);

        if self[elem].typ == XmlElementType::XmlTextNode {
            if self.can_merge_text(cur, elem) {
                return Ok(self.merge_text_into(cur, elem));
            }
            if let Some(next) = self[cur].next.filter(|&next| self.can_merge_text(next, elem)) {
                let mut buf = self[elem].content.as_deref().unwrap_or_default().to_owned();
                buf.push_str(self[next].content.as_deref().unwrap_or_default());
                self[next].content = Some(XmlString::from(buf.as_str()));
                self.free_node(elem);
                return Ok(next);
            }
        } else if self[elem].typ == XmlElementType::XmlAttributeNode {
            return self.add_prop_sibling(Some(cur), cur, elem);
        }

        let doc = self[cur].doc;
        if self[elem].doc != doc {
            self.set_tree_doc(elem, doc);
        }
        let parent = self[cur].parent;
        let next = self[cur].next;
        self[elem].parent = parent;
        self[elem].prev = Some(cur);
        self[elem].next = next;
        self[cur].next = Some(elem);
        if let Some(next) = next {
            self[next].prev = Some(elem);
        }
        if let Some(parent) = parent.filter(|&parent| self[parent].last == Some(cur)) {
            self[parent].last = Some(elem);
        }
        Ok(elem)
    }

    fn check_sibling(&self, cur: XmlNodeId, elem: XmlNodeId) -> Result<(), XmlTreeError> {
        if cur == elem {
            return Err(XmlTreeError::InvalidArgument("a node cannot be its own sibling"));
        }
        if self[cur].typ == XmlElementType::XmlNamespaceDecl
            || self[elem].typ == XmlElementType::XmlNamespaceDecl
        {
            return Err(XmlTreeError::UnsupportedNodeKind(
                XmlElementType::XmlNamespaceDecl,
            ));
        }
        Ok(())
    }

    /// Add a new attribute after `prev` using `cur` as base attribute.
    /// When inserting before `cur`, `prev` is passed as `cur.prev`.
    /// When inserting after `cur`, `prev` is passed as `cur`.
    /// If an existing attribute is found it is destroyed prior to adding `prop`.
    ///
    /// Returns the attribute being inserted.
    #[doc(alias = "xmlAddPropSibling")]
    fn add_prop_sibling(
        &mut self,
        prev: Option<XmlNodeId>,
        cur: XmlNodeId,
        prop: XmlNodeId,
    ) -> Result<XmlNodeId, XmlTreeError> {
        if self[cur].typ != XmlElementType::XmlAttributeNode
            || prev.is_some_and(|prev| self[prev].typ != XmlElementType::XmlAttributeNode)
        {
            return Err(XmlTreeError::InvalidArgument(
                "attributes can only be siblings of attributes",
            ));
        }

        // check if an attribute with the same name exists
        let parent = self[cur].parent;
        let href = self[prop]
            .ns
            .and_then(|ns| self[ns].href.as_deref().map(str::to_owned));
        let name = self[prop].name.clone();
        let attr = parent.zip(name.as_deref()).and_then(|(parent, name)| {
            self.has_ns_prop(parent, name, href.as_deref())
        });

        let doc = self[cur].doc;
        if self[prop].doc != doc {
            self.set_tree_doc(prop, doc);
        }
        self[prop].parent = parent;
        self[prop].prev = prev;
        if let Some(prev) = prev {
            let next = self[prev].next;
            self[prop].next = next;
            self[prev].next = Some(prop);
            if let Some(next) = next {
                self[next].prev = Some(prop);
            }
        } else {
            self[prop].next = Some(cur);
            self[cur].prev = Some(prop);
        }
        if let Some(parent) = parent.filter(|_| self[prop].prev.is_none()) {
            self[parent].properties = Some(prop);
        }
        if let Some(attr) = attr.filter(|&attr| attr != prop) {
            // different instance, destroy it (attributes must be unique)
            self.remove_prop(attr);
        }
        Ok(prop)
    }

    /// Unlink the old node from its current context, prune the new one
    /// at the same place. If `cur` was already inserted in a document it is
    /// first unlinked from its existing context.
    ///
    /// See the note regarding namespaces in [`XmlNodeStore::add_child`].
    ///
    /// Returns the `old` node.
    #[doc(alias = "xmlReplaceNode")]
    pub fn replace_node(
        &mut self,
        old: XmlNodeId,
        cur: Option<XmlNodeId>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        if self[old].parent.is_none() {
            return Err(XmlTreeError::InvalidArgument("the replaced node has no parent"));
        }
        let Some(cur) = cur.filter(|&cur| cur != old) else {
            if cur.is_none() {
                self.unlink_node(old);
            }
            return Ok(old);
        };
        let old_is_attr = self[old].typ == XmlElementType::XmlAttributeNode;
        let cur_is_attr = self[cur].typ == XmlElementType::XmlAttributeNode;
        if old_is_attr != cur_is_attr {
            return Err(XmlTreeError::InvalidArgument(
                "attributes can only replace attributes",
            ));
        }
        self.unlink_node(cur);
        let doc = self[old].doc;
        if self[cur].doc != doc {
            self.set_tree_doc(cur, doc);
        }
        let Links {
            parent,
            prev,
            next,
            ..
        } = self.links(old);
        self[cur].parent = parent;
        self[cur].next = next;
        self[cur].prev = prev;
        if let Some(next) = next {
            self[next].prev = Some(cur);
        }
        if let Some(prev) = prev {
            self[prev].next = Some(cur);
        }
        if let Some(parent) = parent {
            if cur_is_attr {
                if self[parent].properties == Some(old) {
                    self[parent].properties = Some(cur);
                }
            } else {
                if self[parent].children == Some(old) {
                    self[parent].children = Some(cur);
                }
                if self[parent].last == Some(old) {
                    self[parent].last = Some(cur);
                }
            }
        }
        let node = &mut self[old];
        node.next = None;
        node.prev = None;
        node.parent = None;
        Ok(old)
    }

    /// Update all nodes under the tree to point to the right document.
    ///
    /// Names are re-interned in the dictionary of `doc`, IDs are removed from
    /// the previous document, entity references are unbound.
    #[doc(alias = "xmlSetTreeDoc")]
    pub fn set_tree_doc(&mut self, tree: XmlNodeId, doc: Option<XmlDocId>) {
        if self[tree].typ == XmlElementType::XmlNamespaceDecl || self[tree].doc == doc {
            return;
        }
        let old_doc = self[tree].doc;
        let dict = doc.and_then(|doc| self[doc].dict.clone());

        if self[tree].typ == XmlElementType::XmlElementNode {
            let mut prop = self[tree].properties;
            while let Some(now) = prop {
                if self[now].atype == Some(XmlAttributeType::XmlAttributeID) {
                    if let Some(old_doc) = old_doc {
                        self.remove_id(old_doc, now);
                    }
                    self[now].atype = None;
                }
                let attr = &mut self[now];
                attr.name = attr.name.as_ref().map(|name| name.copy_for(dict.as_ref()));
                attr.doc = doc;
                self.set_list_doc(self[now].children, doc);
                prop = self[now].next;
            }
        }
        if self[tree].typ == XmlElementType::XmlEntityRefNode {
            // the binding pointed to the declaration of the previous document
            self[tree].ent_bound = false;
        } else {
            self.set_list_doc(self[tree].children, doc);
        }
        let cur = &mut self[tree];
        cur.name = cur.name.as_ref().map(|name| name.copy_for(dict.as_ref()));
        if matches!(cur.content, Some(XmlString::Interned(_))) {
            cur.content = cur.content.as_ref().map(|content| content.copy_for(dict.as_ref()));
        }
        cur.doc = doc;
    }

    /// Update all nodes in the list to point to the right document
    #[doc(alias = "xmlSetListDoc")]
    pub fn set_list_doc(&mut self, list: Option<XmlNodeId>, doc: Option<XmlDocId>) {
        let mut cur = list;
        while let Some(now) = cur {
            if self[now].doc != doc {
                self.set_tree_doc(now, doc);
            }
            cur = self[now].next;
        }
    }

    /// Free a node, this is a recursive behaviour, all the children are freed too.
    /// This doesn't unlink the child from the list, use [`XmlNodeStore::unlink_node`] first.
    #[doc(alias = "xmlFreeNode")]
    pub fn free_node(&mut self, cur: XmlNodeId) {
        let Some(node) = self.get_node(cur) else {
            return;
        };
        match node.typ {
            XmlElementType::XmlAttributeNode => {
                self.free_prop(cur);
                return;
            }
            XmlElementType::XmlDTDNode => {
                if let Some(doc) = node.doc {
                    if self[doc].int_subset.as_ref().is_some_and(|dtd| dtd.node == Some(cur)) {
                        self[doc].int_subset = None;
                    }
                }
            }
            _ => {}
        }
        if self[cur].typ != XmlElementType::XmlEntityRefNode {
            let children = self[cur].children.take();
            self.free_node_list(children);
        }
        if matches!(
            self[cur].typ,
            XmlElementType::XmlElementNode
                | XmlElementType::XmlXIncludeStart
                | XmlElementType::XmlXIncludeEnd
        ) {
            let properties = self[cur].properties.take();
            self.free_prop_list(properties);
            let ns_def = self[cur].ns_def.take();
            self.free_ns_list(ns_def);
        }
        self.release_node(cur);
    }

    /// Free a node and all its siblings, this is a recursive behaviour, all
    /// the children are freed too.
    #[doc(alias = "xmlFreeNodeList")]
    pub fn free_node_list(&mut self, cur: Option<XmlNodeId>) {
        let mut cur = cur;
        while let Some(now) = cur {
            cur = self.get_node(now).and_then(|node| node.next);
            self.free_node(now);
        }
    }
}

/// Snapshot of the links of a node.
struct Links {
    typ: XmlElementType,
    parent: Option<XmlNodeId>,
    prev: Option<XmlNodeId>,
    next: Option<XmlNodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_add_sibling_links() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        let a = store.new_child(root, None, "a", None).unwrap();
        let c = store.new_node(None, "c").unwrap();
        store.add_next_sibling(a, c).unwrap();
        let b = store.new_node(None, "b").unwrap();
        store.add_prev_sibling(c, b).unwrap();

        let names = store
            .children_of(root)
            .map(|child| store[child].name().unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(store[root].last(), Some(c));
        assert_eq!(store[c].prev(), Some(b));
    }

    #[test]
    fn test_xml_add_next_sibling_merges_text() {
        let mut store = XmlNodeStore::new();
        let root = store.new_node(None, "root").unwrap();
        store.set_content(root, "foo").unwrap();
        let first = store[root].children().unwrap();
        let text = store.new_text("bar").unwrap();
        assert_eq!(store.add_next_sibling(first, text).unwrap(), first);
        assert_eq!(store[root].last(), Some(first));
        assert_eq!(store[first].content(), Some("foobar"));
    }

    #[test]
    fn test_xml_replace_node() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
        let old = store.new_child(root, None, "old", None).unwrap();
        let cur = store.new_node(None, "cur").unwrap();
        assert_eq!(store.replace_node(old, Some(cur)).unwrap(), old);
        assert_eq!(store[root].children(), Some(cur));
        assert_eq!(store[cur].document(), Some(doc));
        assert_eq!(store[old].parent(), None);

        let attr = store.new_prop(Some(root), "k", Some("v")).unwrap();
        assert!(store.replace_node(attr, Some(old)).is_err());
    }
}
