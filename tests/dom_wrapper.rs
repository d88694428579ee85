//! Scenarios of the DOM wrapper operations: adoption, cloning, removal and
//! namespace reconciliation.

use std::{cell::Cell, rc::Rc};

use exml_graft::{
    dict::XmlDictRef,
    error::XmlTreeError,
    tree::{
        XML_NS_PREFIX_MAX_ATTEMPTS, XmlAttributeType, XmlDOMWrapCtxt, XmlDocId,
        XmlDomReconcileNsOptions, XmlElementType, XmlEntityType, XmlNodeId, XmlNodeStore, XmlNsId,
        XmlString,
    },
};

/// Collect the elements and attributes of the subtree rooted at `node`.
fn subtree(store: &XmlNodeStore, node: XmlNodeId) -> Vec<XmlNodeId> {
    let mut ret = vec![node];
    ret.extend(store.attributes_of(node));
    for child in store.children_of(node) {
        if store[child].element_type() == XmlElementType::XmlElementNode {
            ret.extend(subtree(store, child));
        }
    }
    ret
}

fn href_of(store: &XmlNodeStore, node: XmlNodeId) -> Option<String> {
    store[node]
        .ns()
        .and_then(|ns| store[ns].href())
        .map(str::to_owned)
}

/// Check that the namespace referenced by `node` is the one its prefix
/// resolves to at its position.
fn assert_in_scope(store: &XmlNodeStore, node: XmlNodeId) {
    let Some(ns) = store[node].ns() else {
        return;
    };
    let scope = if store[node].element_type() == XmlElementType::XmlAttributeNode {
        store[node].parent().unwrap()
    } else {
        node
    };
    assert_eq!(
        store.search_ns(scope, store[ns].prefix()),
        Some(ns),
        "{:?} is not in scope",
        store[node].name()
    );
}

/// `<root xmlns:x="urn:x"><x:child/></root>`
fn build_x_document(store: &mut XmlNodeStore) -> (XmlDocId, XmlNodeId, XmlNsId, XmlNodeId) {
    let doc = store.new_doc(None).unwrap();
    let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
    store.set_root_element(doc, root).unwrap();
    let x = store.new_ns(Some(root), Some("urn:x"), Some("x")).unwrap();
    let child = store.new_child(root, Some(x), "child", None).unwrap();
    (doc, root, x, child)
}

#[test]
fn test_adopt_without_parent_uses_fallback_chain() {
    let mut store = XmlNodeStore::new();
    let (a, root, x, child) = build_x_document(&mut store);
    let b = store.new_doc(None).unwrap();

    store.dom_wrap_adopt_node(None, None, child, b, None).unwrap();

    assert_eq!(store[child].parent(), None);
    assert_eq!(store[root].children(), None);
    assert_eq!(store[child].document(), Some(b));
    assert_eq!(store[child].name(), Some("child"));
    let ns = store[child].ns().unwrap();
    assert_ne!(ns, x);
    assert_eq!(store[ns].href(), Some("urn:x"));
    assert_eq!(store[b].old_ns(), Some(ns));
    assert_eq!(store[ns].document(), Some(b));
    // the source document keeps its declaration
    assert_eq!(store[root].ns_def(), Some(x));
    assert_eq!(store[a].old_ns(), None);
}

#[test]
fn test_adopt_preserves_uris() {
    let mut store = XmlNodeStore::new();
    let a = store.new_doc(None).unwrap();
    let root = store.new_doc_node(Some(a), None, "root", None).unwrap();
    store.set_root_element(a, root).unwrap();
    let ns_a = store.new_ns(Some(root), Some("urn:a"), Some("a")).unwrap();
    let ns_b = store.new_ns(Some(root), Some("urn:b"), Some("b")).unwrap();
    store.set_ns(root, Some(ns_a));
    let item = store.new_child(root, Some(ns_b), "item", None).unwrap();
    store.new_ns_prop(Some(item), Some(ns_a), "attr", Some("v")).unwrap();
    let leaf = store.new_child(item, Some(ns_a), "leaf", None).unwrap();
    let inner = store.new_child(item, None, "inner", None).unwrap();
    let ns_c = store.new_ns(Some(inner), Some("urn:c"), Some("c")).unwrap();
    let deep = store.new_child(inner, Some(ns_c), "deep", None).unwrap();

    let b = store.new_doc(None).unwrap();
    let dest = store.new_doc_node(Some(b), None, "dest", None).unwrap();
    store.set_root_element(b, dest).unwrap();
    store.new_ns(Some(dest), Some("urn:other"), Some("a")).unwrap();

    let before = subtree(&store, item)
        .into_iter()
        .map(|node| (node, href_of(&store, node)))
        .collect::<Vec<_>>();
    store.dom_wrap_adopt_node(None, Some(a), item, b, Some(dest)).unwrap();
    store.add_child(dest, item).unwrap();

    for (node, href) in before {
        assert_eq!(href_of(&store, node), href);
        assert_eq!(store[node].document(), Some(b));
        assert_in_scope(&store, node);
    }
    // declarations inside the subtree are kept as they are
    assert_eq!(store[deep].ns(), Some(ns_c));
    assert_eq!(store[inner].ns_def(), Some(ns_c));
    // `a` is bound to another URI on the destination parent
    let leaf_ns = store[leaf].ns().unwrap();
    assert_ne!(leaf_ns, ns_a);
    assert_eq!(store.ns_defs_of(item).count(), 2);
}

#[test]
fn test_adopt_end_to_end_into_fresh_document() {
    let mut store = XmlNodeStore::new();
    let (a, _, _, child) = build_x_document(&mut store);
    let b = store.new_doc(None).unwrap();

    store.dom_wrap_adopt_node(None, Some(a), child, b, None).unwrap();
    store.set_root_element(b, child).unwrap();

    assert_eq!(store.get_root_element(b), Some(child));
    assert_eq!(store[child].name(), Some("child"));
    assert_eq!(href_of(&store, child).as_deref(), Some("urn:x"));
    let ns = store[child].ns().unwrap();
    assert!(store.ns_chain_contains(b, ns));
}

trait FallbackChain {
    fn ns_chain_contains(&self, doc: XmlDocId, ns: XmlNsId) -> bool;
}

impl FallbackChain for XmlNodeStore {
    fn ns_chain_contains(&self, doc: XmlDocId, ns: XmlNsId) -> bool {
        let mut cur = self[doc].old_ns();
        while let Some(now) = cur {
            if now == ns {
                return true;
            }
            cur = self[now].next();
        }
        false
    }
}

#[test]
fn test_adopt_attribute_generates_prefix() {
    let mut store = XmlNodeStore::new();
    let a = store.new_doc(None).unwrap();
    let source = store.new_doc_node(Some(a), None, "source", None).unwrap();
    store.set_root_element(a, source).unwrap();
    let ns = store.new_ns(Some(source), Some("urn:three"), Some("a")).unwrap();
    let attr = store.new_ns_prop(Some(source), Some(ns), "attr", Some("v")).unwrap();

    let b = store.new_doc(None).unwrap();
    let dest = store.new_doc_node(Some(b), None, "dest", None).unwrap();
    store.set_root_element(b, dest).unwrap();
    store.new_ns(Some(dest), Some("urn:one"), Some("a")).unwrap();
    store.new_ns(Some(dest), Some("urn:two"), Some("a_1")).unwrap();

    store.dom_wrap_adopt_node(None, None, attr, b, Some(dest)).unwrap();
    assert_eq!(store[attr].parent(), None);
    assert_eq!(store.has_prop(source, "attr"), None);
    let adopted = store[attr].ns().unwrap();
    assert_eq!(store[adopted].prefix(), Some("a_2"));
    assert_eq!(store[adopted].href(), Some("urn:three"));
    assert!(store.ns_defs_of(dest).any(|def| def == adopted));

    // an equal declaration in scope is reused
    let again = store.new_ns_prop(Some(source), Some(ns), "again", Some("w")).unwrap();
    store.dom_wrap_adopt_node(None, None, again, b, Some(dest)).unwrap();
    assert_eq!(store[again].ns(), Some(adopted));
    assert_eq!(store.ns_defs_of(dest).count(), 3);
}

#[test]
fn test_declare_ns_forced_exhausts_prefixes() {
    let mut store = XmlNodeStore::new();
    let doc = store.new_doc(None).unwrap();
    let elem = store.new_doc_node(Some(doc), None, "elem", None).unwrap();
    store.new_ns(Some(elem), Some("urn:0"), Some("a")).unwrap();
    for i in 1..=XML_NS_PREFIX_MAX_ATTEMPTS {
        let prefix = format!("a_{i}");
        store
            .new_ns(Some(elem), Some(&format!("urn:{i}")), Some(&prefix))
            .unwrap();
    }
    assert_eq!(
        store.declare_ns_forced(elem, Some("urn:z"), Some("a"), false),
        Err(XmlTreeError::PrefixExhausted)
    );
    assert_eq!(store.ns_defs_of(elem).count(), XML_NS_PREFIX_MAX_ATTEMPTS + 1);
    // another base still works
    let ns = store
        .declare_ns_forced(elem, Some("urn:z"), Some("b"), false)
        .unwrap();
    assert_eq!(store[ns].prefix(), Some("b"));
}

#[test]
fn test_adopt_with_shared_dictionary() {
    let mut store = XmlNodeStore::new();
    let dict = XmlDictRef::new();
    let a = store.new_doc_with_dict(None, dict.clone()).unwrap();
    let b = store.new_doc_with_dict(None, dict.clone()).unwrap();
    let elem = store.new_doc_node(Some(a), None, "elem", None).unwrap();
    let before = match store[elem].name_string() {
        Some(XmlString::Interned(name)) => name.clone(),
        other => panic!("unexpected name {other:?}"),
    };

    store.dom_wrap_adopt_node(None, None, elem, b, None).unwrap();
    match store[elem].name_string() {
        Some(XmlString::Interned(name)) => assert!(Rc::ptr_eq(name, &before)),
        other => panic!("unexpected name {other:?}"),
    }
}

#[test]
fn test_adopt_reinterns_into_destination_dictionary() {
    let mut store = XmlNodeStore::new();
    let source_dict = XmlDictRef::new();
    let dest_dict = XmlDictRef::new();
    let a = store.new_doc_with_dict(None, source_dict.clone()).unwrap();
    let b = store.new_doc_with_dict(None, dest_dict.clone()).unwrap();
    let c = store.new_doc(None).unwrap();
    let elem = store.new_doc_node(Some(a), None, "elem", None).unwrap();
    let attr = store.new_prop(Some(elem), "key", Some("value")).unwrap();
    assert!(store[elem].name_string().unwrap().is_owned_by(&source_dict));

    store.dom_wrap_adopt_node(None, None, elem, b, None).unwrap();
    assert!(store[elem].name_string().unwrap().is_owned_by(&dest_dict));
    assert!(store[attr].name_string().unwrap().is_owned_by(&dest_dict));
    assert!(!store[elem].name_string().unwrap().is_owned_by(&source_dict));

    // without destination dictionary the strings are duplicated
    store.dom_wrap_adopt_node(None, None, elem, c, None).unwrap();
    assert!(matches!(
        store[elem].name_string(),
        Some(XmlString::Owned(_))
    ));
    assert_eq!(store[elem].name(), Some("elem"));
    assert_eq!(store.get_prop(elem, "key").as_deref(), Some("value"));
}

#[test]
fn test_adopt_removes_ids_from_source() {
    let mut store = XmlNodeStore::new();
    let a = store.new_doc(None).unwrap();
    let root = store.new_doc_node(Some(a), None, "root", None).unwrap();
    store.set_root_element(a, root).unwrap();
    let item = store.new_child(root, None, "item", None).unwrap();
    let attr = store.new_prop(Some(item), "key", Some("k1")).unwrap();
    store.add_id(a, "k1", attr).unwrap();
    assert_eq!(store.get_id(a, "k1"), Some(attr));

    let b = store.new_doc(None).unwrap();
    store.dom_wrap_adopt_node(None, None, item, b, None).unwrap();
    assert_eq!(store.get_id(a, "k1"), None);
    assert_eq!(store.get_id(b, "k1"), None);
    assert_eq!(store[attr].atype(), None);
    assert_eq!(store[a].id_count(), 0);
}

#[test]
fn test_adopt_rebinds_entity_references() {
    let mut store = XmlNodeStore::new();
    let a = store.new_doc(None).unwrap();
    store.create_int_subset(a, Some("root"), None, None).unwrap();
    store
        .add_doc_entity(
            a,
            "e",
            XmlEntityType::XmlInternalGeneralEntity,
            None,
            None,
            Some("from A"),
        )
        .unwrap();
    let b = store.new_doc(None).unwrap();
    store.create_int_subset(b, Some("root"), None, None).unwrap();
    store
        .add_doc_entity(
            b,
            "e",
            XmlEntityType::XmlInternalGeneralEntity,
            None,
            None,
            Some("from B"),
        )
        .unwrap();
    let c = store.new_doc(None).unwrap();

    let elem = store.new_doc_node(Some(a), None, "elem", None).unwrap();
    let reference = store.new_reference(Some(a), "&e;").unwrap();
    store.add_child(elem, reference).unwrap();
    assert_eq!(store[reference].content(), Some("from A"));

    store.dom_wrap_adopt_node(None, None, elem, b, None).unwrap();
    assert!(store[reference].is_entity_bound());
    assert_eq!(store[reference].content(), Some("from B"));

    store.dom_wrap_adopt_node(None, None, elem, c, None).unwrap();
    assert!(!store[reference].is_entity_bound());
    assert_eq!(store[reference].content(), None);
    assert_eq!(store[reference].document(), Some(c));
}

#[test]
fn test_adopt_checks_documents() {
    let mut store = XmlNodeStore::new();
    let (a, _, _, child) = build_x_document(&mut store);
    let b = store.new_doc(None).unwrap();
    let c = store.new_doc(None).unwrap();
    let other = store.new_doc_node(Some(c), None, "other", None).unwrap();

    assert_eq!(
        store.dom_wrap_adopt_node(None, Some(b), child, c, None),
        Err(XmlTreeError::CrossDocumentMismatch)
    );
    assert_eq!(
        store.dom_wrap_adopt_node(None, Some(a), child, b, Some(other)),
        Err(XmlTreeError::CrossDocumentMismatch)
    );
    // nothing was modified
    assert_eq!(store[child].document(), Some(a));
    assert!(store[child].parent().is_some());
}

#[test]
fn test_adopt_with_custom_acquisition() {
    let mut store = XmlNodeStore::new();
    let (_, _, _, child) = build_x_document(&mut store);
    let x2 = store.new_ns(Some(child), Some("urn:x2"), Some("x2")).unwrap();
    let grandchild = store.new_child(child, Some(x2), "grandchild", None).unwrap();

    let b = store.new_doc(None).unwrap();
    let dest = store.new_doc_node(Some(b), None, "dest", None).unwrap();
    store.set_root_element(b, dest).unwrap();

    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let mut ctxt = XmlDOMWrapCtxt::with_acquire_ns(move |store, _node, href, prefix| {
        counter.set(counter.get() + 1);
        store.store_ns(b, href, prefix).ok()
    });
    store
        .dom_wrap_adopt_node(Some(&mut ctxt), None, child, b, Some(dest))
        .unwrap();
    assert!(ctxt.namespace_map().is_empty());
    // declarations of the subtree are not candidates in custom mode
    assert_eq!(calls.get(), 2);
    assert_eq!(href_of(&store, child).as_deref(), Some("urn:x"));
    assert_eq!(href_of(&store, grandchild).as_deref(), Some("urn:x2"));
    assert!(store.ns_chain_contains(b, store[child].ns().unwrap()));
    assert!(store.ns_chain_contains(b, store[grandchild].ns().unwrap()));
}

#[test]
fn test_clone_into_other_document() {
    let mut store = XmlNodeStore::new();
    let (a, root, x, child) = build_x_document(&mut store);
    let xml = store.xml_namespace();
    let key = store.new_ns_prop(Some(child), Some(xml), "id", Some("i1")).unwrap();
    // xml:id is registered on creation
    assert_eq!(store.get_id(a, "i1"), Some(key));
    let y = store.new_ns(Some(child), Some("urn:y"), Some("y")).unwrap();
    let inner = store.new_child(child, Some(y), "inner", Some("text")).unwrap();

    let b = store.new_doc(None).unwrap();
    let clone = store
        .dom_wrap_clone_node(None, None, child, b, None, true)
        .unwrap();

    // the source is untouched
    assert_eq!(store[child].ns(), Some(x));
    assert_eq!(store[child].parent(), Some(root));
    assert_eq!(store.get_id(a, "i1"), Some(key));
    assert_eq!(store[inner].ns(), Some(y));

    assert_eq!(store[clone].document(), Some(b));
    assert_eq!(store[clone].parent(), None);
    assert_eq!(href_of(&store, clone).as_deref(), Some("urn:x"));
    assert!(store.ns_chain_contains(b, store[clone].ns().unwrap()));
    let clone_key = store.has_prop(clone, "id").unwrap();
    assert_eq!(store[clone_key].ns(), Some(xml));
    assert_eq!(store.get_id(b, "i1"), Some(clone_key));
    assert_eq!(store[clone_key].atype(), Some(XmlAttributeType::XmlAttributeID));

    // the declaration is cloned with the element and referenced by the clone
    let clone_y = store[clone].ns_def().unwrap();
    assert_ne!(clone_y, y);
    assert_eq!(store[clone_y].href(), Some("urn:y"));
    let clone_inner = store.first_element_child(clone).unwrap();
    assert_eq!(store[clone_inner].ns(), Some(clone_y));
    assert_eq!(store.get_content(clone_inner).as_deref(), Some("text"));
    for node in subtree(&store, clone) {
        assert_eq!(store[node].document(), Some(b));
    }
}

#[test]
fn test_clone_into_destination_parent() {
    let mut store = XmlNodeStore::new();
    let (a, _, _, child) = build_x_document(&mut store);
    let b = store.new_doc(None).unwrap();
    let dest = store.new_doc_node(Some(b), None, "dest", None).unwrap();
    store.set_root_element(b, dest).unwrap();
    let dest_x = store.new_ns(Some(dest), Some("urn:x"), Some("other")).unwrap();

    let clone = store
        .dom_wrap_clone_node(None, Some(a), child, b, Some(dest), false)
        .unwrap();
    // an equal URI in scope on the parent is reused
    assert_eq!(store[clone].ns(), Some(dest_x));
    assert_eq!(store[clone].ns_def(), None);
    assert_eq!(store[b].old_ns(), None);
    store.add_child(dest, clone).unwrap();
    assert_in_scope(&store, clone);
}

#[test]
fn test_remove_leaves_no_dangling_references() {
    let mut store = XmlNodeStore::new();
    let (doc, root, x, child) = build_x_document(&mut store);
    store.new_ns_prop(Some(child), Some(x), "attr", Some("v")).unwrap();
    let y = store.new_ns(Some(child), Some("urn:y"), Some("y")).unwrap();
    let inner = store.new_child(child, Some(y), "inner", None).unwrap();
    let deep = store.new_child(inner, Some(x), "deep", None).unwrap();

    store.dom_wrap_remove_node(None, doc, child).unwrap();
    assert_eq!(store[child].parent(), None);
    assert_eq!(store[root].children(), None);

    let remaining = store.ns_defs_of(root).collect::<Vec<_>>();
    for node in subtree(&store, child) {
        if let Some(ns) = store[node].ns() {
            assert!(!remaining.contains(&ns));
            assert!(store.is_live_ns(ns));
        }
    }
    assert_eq!(store[inner].ns(), Some(y));
    let fallback = store[deep].ns().unwrap();
    assert_eq!(store[child].ns(), Some(fallback));
    assert_eq!(store[fallback].href(), Some("urn:x"));
    assert_eq!(store[doc].old_ns(), Some(fallback));

    // a detached node is left alone
    store.dom_wrap_remove_node(None, doc, child).unwrap();
    assert_eq!(store[child].ns(), Some(fallback));
}

#[test]
fn test_remove_checks_document() {
    let mut store = XmlNodeStore::new();
    let (_, _, _, child) = build_x_document(&mut store);
    let other = store.new_doc(None).unwrap();
    assert_eq!(
        store.dom_wrap_remove_node(None, other, child),
        Err(XmlTreeError::CrossDocumentMismatch)
    );
}

/// The namespace references and declarations of the subtree rooted at `node`.
fn ns_snapshot(store: &XmlNodeStore, node: XmlNodeId) -> Vec<(Option<XmlNsId>, Vec<XmlNsId>)> {
    subtree(store, node)
        .into_iter()
        .map(|node| (store[node].ns(), store.ns_defs_of(node).collect()))
        .collect()
}

#[test]
fn test_reconcile_is_idempotent() {
    let mut store = XmlNodeStore::new();
    let doc = store.new_doc(None).unwrap();
    let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
    store.set_root_element(doc, root).unwrap();
    let detached = store.new_node(None, "detached").unwrap();
    let foreign = store.new_ns(Some(detached), Some("urn:f"), Some("f")).unwrap();
    let child = store.new_child(root, Some(foreign), "child", None).unwrap();
    let attr = store.new_ns_prop(Some(child), Some(foreign), "attr", Some("v")).unwrap();
    let leaf = store.new_child(child, Some(foreign), "leaf", None).unwrap();

    store.dom_wrap_reconcile_namespaces(None, root, 0).unwrap();
    let declared = store[child].ns().unwrap();
    assert_ne!(declared, foreign);
    assert_eq!(store[child].ns_def(), Some(declared));
    assert_eq!(store[attr].ns(), Some(declared));
    assert_eq!(store[leaf].ns(), Some(declared));
    for node in subtree(&store, root) {
        assert_in_scope(&store, node);
    }

    let snapshot = ns_snapshot(&store, root);
    let mut ctxt = XmlDOMWrapCtxt::new();
    store
        .dom_wrap_reconcile_namespaces(Some(&mut ctxt), root, 0)
        .unwrap();
    assert_eq!(ns_snapshot(&store, root), snapshot);
    assert!(ctxt.namespace_map().is_empty());
}

#[test]
fn test_reconcile_removes_redundant_declarations() {
    let mut store = XmlNodeStore::new();
    let doc = store.new_doc(None).unwrap();
    let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
    store.set_root_element(doc, root).unwrap();
    let outer = store.new_ns(Some(root), Some("urn:a"), Some("a")).unwrap();
    let child = store.new_child(root, None, "child", None).unwrap();
    let redundant = store.new_ns(Some(child), Some("urn:a"), Some("a")).unwrap();
    let kept = store.new_ns(Some(child), Some("urn:b"), Some("b")).unwrap();
    store.set_ns(child, Some(redundant));
    let grandchild = store.new_child(child, Some(redundant), "grandchild", None).unwrap();

    // without the option nothing changes
    let snapshot = ns_snapshot(&store, root);
    store.dom_wrap_reconcile_namespaces(None, root, 0).unwrap();
    assert_eq!(ns_snapshot(&store, root), snapshot);

    store
        .dom_wrap_reconcile_namespaces(
            None,
            root,
            XmlDomReconcileNsOptions::XmlDomReconnsRemoveredund as i32,
        )
        .unwrap();
    assert_eq!(store.ns_defs_of(child).collect::<Vec<_>>(), [kept]);
    assert_eq!(store[child].ns(), Some(outer));
    assert_eq!(store[grandchild].ns(), Some(outer));
    assert!(!store.is_live_ns(redundant));
}

#[test]
fn test_reconcile_rejects_non_element() {
    let mut store = XmlNodeStore::new();
    let doc = store.new_doc(None).unwrap();
    let text = store.new_doc_text(Some(doc), "text").unwrap();
    assert!(matches!(
        store.dom_wrap_reconcile_namespaces(None, text, 0),
        Err(XmlTreeError::InvalidArgument(_))
    ));
}
