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

mod attribute;

use std::collections::{HashMap, hash_map::Entry};

use crate::{
    error::{XmlErrorDomain, XmlErrorLevel, XmlParserErrors, XmlTreeError, report_error},
    tree::split_qname3,
};

use super::{
    XmlAttributeType, XmlDocId, XmlElementType, XmlEntity, XmlNode, XmlNodeId, XmlNodeStore,
    XmlString,
};

pub use attribute::*;

type XmlAttributeKey = (Box<str>, Option<Box<str>>, Box<str>);

/// The internal subset of a document.
///
/// The subset is represented in the tree by an `XmlDTDNode` child of the
/// document node; the declarations themselves are held here.
#[derive(Debug, Clone, Default)]
pub struct XmlDtd {
    // the node standing for the subset in the tree
    pub(crate) node: Option<XmlNodeId>,
    // Name of the DTD
    pub(crate) name: Option<Box<str>>,
    // External identifier for PUBLIC DTD
    pub(crate) external_id: Option<Box<str>>,
    // URI for a SYSTEM or PUBLIC DTD
    pub(crate) system_id: Option<Box<str>>,
    // Hash table for entities if any
    pub(crate) entities: HashMap<String, XmlEntity>,
    // Hash table for attributes if any
    pub(crate) attributes: HashMap<XmlAttributeKey, XmlAttribute>,
}

impl XmlDtd {
    pub fn node(&self) -> Option<XmlNodeId> {
        self.node
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }

    /// Do an entity lookup in the DTD entity hash table and
    /// return the corresponding entity, if found.
    #[doc(alias = "xmlGetEntityFromDtd")]
    pub fn get_entity(&self, name: &str) -> Option<&XmlEntity> {
        self.entities.get(name)
    }

    /// Search the DTD for the description of this attribute on this element.
    ///
    /// `name` may be a QName.
    #[doc(alias = "xmlGetDtdAttrDesc")]
    pub fn get_attr_desc(&self, elem: &str, name: &str) -> Option<&XmlAttribute> {
        match split_qname3(name) {
            Some((prefix, local)) => self.get_qattr_desc(elem, local, Some(prefix)),
            None => self.get_qattr_desc(elem, name, None),
        }
    }

    /// Search the DTD for the description of this qualified attribute on this element.
    #[doc(alias = "xmlGetDtdQAttrDesc")]
    pub fn get_qattr_desc(
        &self,
        elem: &str,
        name: &str,
        prefix: Option<&str>,
    ) -> Option<&XmlAttribute> {
        self.attributes
            .get(&(name.into(), prefix.map(Into::into), elem.into()))
    }
}

impl XmlNodeStore {
    /// Create the internal subset of a document.
    ///
    /// The subset node is inserted before the root element, if any.
    ///
    /// Returns the node standing for the subset.
    #[doc(alias = "xmlCreateIntSubset")]
    pub fn create_int_subset(
        &mut self,
        doc: XmlDocId,
        name: Option<&str>,
        external_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<XmlNodeId, XmlTreeError> {
        if self[doc].int_subset.is_some() {
            return Err(XmlTreeError::InvalidArgument(
                "document already has an internal subset",
            ));
        }
        let dict = self[doc].dict.clone();
        let node = self.alloc_node(XmlNode {
            name: name.map(|name| XmlString::new_in(name, dict.as_ref())),
            doc: Some(doc),
            ..XmlNode::with_type(XmlElementType::XmlDTDNode)
        })?;
        self[doc].int_subset = Some(XmlDtd {
            node: Some(node),
            name: name.map(Into::into),
            external_id: external_id.map(Into::into),
            system_id: system_id.map(Into::into),
            ..Default::default()
        });
        self.link_int_subset(doc, node)?;
        Ok(node)
    }

    /// Insert the subset node of `doc` before the root element.
    pub(crate) fn link_int_subset(
        &mut self,
        doc: XmlDocId,
        node: XmlNodeId,
    ) -> Result<(), XmlTreeError> {
        match self.get_root_element(doc) {
            Some(root) => self.add_prev_sibling(root, node)?,
            None => {
                let doc_node = self[doc].node;
                self.add_child(doc_node, node)?
            }
        };
        Ok(())
    }

    /// Register a new attribute declaration in the internal subset of `doc`.
    ///
    /// A redefinition is ignored with a warning, the first declaration is binding.
    ///
    /// Returns `true` if the declaration was registered.
    #[doc(alias = "xmlAddAttributeDecl")]
    #[allow(clippy::too_many_arguments)]
    pub fn add_attribute_decl(
        &mut self,
        doc: XmlDocId,
        elem: &str,
        name: &str,
        prefix: Option<&str>,
        atype: XmlAttributeType,
        def: XmlAttributeDefault,
        default_value: Option<&str>,
    ) -> Result<bool, XmlTreeError> {
        let Some(dtd) = self[doc].int_subset.as_mut() else {
            return Err(XmlTreeError::InvalidArgument(
                "document without internal subset",
            ));
        };
        match dtd
            .attributes
            .entry((name.into(), prefix.map(Into::into), elem.into()))
        {
            Entry::Occupied(_) => {
                report_error(
                    XmlErrorDomain::XmlFromValid,
                    XmlParserErrors::XmlDTDAttributeRedefined,
                    XmlErrorLevel::XmlErrWarning,
                    None,
                    Some(name.to_owned().into()),
                    format!("Attribute {name} of element {elem}: already defined\n").into(),
                );
                Ok(false)
            }
            Entry::Vacant(entry) => {
                entry.insert(XmlAttribute {
                    name: name.into(),
                    prefix: prefix.map(Into::into),
                    elem: elem.into(),
                    atype,
                    def,
                    default_value: default_value.map(Into::into),
                });
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_create_int_subset_before_root() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        let root = store.new_doc_node(Some(doc), None, "root", None).unwrap();
        store.set_root_element(doc, root).unwrap();
        let dtd = store.create_int_subset(doc, Some("root"), None, Some("root.dtd")).unwrap();
        assert_eq!(store[dtd].next(), Some(root));
        assert_eq!(store[store[doc].document_node()].children(), Some(dtd));
        assert!(store.create_int_subset(doc, Some("root"), None, None).is_err());
        assert_eq!(store[doc].int_subset().and_then(|dtd| dtd.system_id()), Some("root.dtd"));
    }

    #[test]
    fn test_xml_add_attribute_decl() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        store.create_int_subset(doc, Some("root"), None, None).unwrap();
        let added = store
            .add_attribute_decl(
                doc,
                "root",
                "key",
                None,
                XmlAttributeType::XmlAttributeID,
                XmlAttributeDefault::XmlAttributeImplied,
                None,
            )
            .unwrap();
        assert!(added);
        let again = store
            .add_attribute_decl(
                doc,
                "root",
                "key",
                None,
                XmlAttributeType::XmlAttributeCDATA,
                XmlAttributeDefault::XmlAttributeImplied,
                None,
            )
            .unwrap();
        assert!(!again);
        let dtd = store[doc].int_subset().unwrap();
        assert_eq!(
            dtd.get_attr_desc("root", "key").map(|decl| decl.atype()),
            Some(XmlAttributeType::XmlAttributeID)
        );
        assert!(dtd.get_attr_desc("other", "key").is_none());
    }
}
