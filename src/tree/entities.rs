//! Provide methods and data structures for handling XML entities.
//!
//! This module is based on `libxml/entities.h`, `entities.c`, and so on in `libxml2-v2.11.8`.
//! Please refer to original libxml2 documents also.

// Copyright of the original code is the following.
// --------
// Summary: interface for the XML entities handling
// Description: this module provides some of the entity API needed
//              for the parser and applications.
//
// Copy: See Copyright for the status of this software.
//
// Author: Daniel Veillard
// --------
// entities.c : implementation for the XML entities handling
//
// See Copyright for the status of this software.
//
// daniel@veillard.com

use std::{any::type_name, borrow::Cow, collections::hash_map::Entry};

use crate::error::{XmlErrorDomain, XmlErrorLevel, XmlParserErrors, XmlTreeError, report_error};

use super::{XmlDocId, XmlNodeId, XmlNodeStore, XmlString};

/// The different valid entity types.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlEntityType {
    #[default]
    XmlInternalGeneralEntity = 1,
    XmlExternalGeneralParsedEntity = 2,
    XmlExternalGeneralUnparsedEntity = 3,
    XmlInternalParameterEntity = 4,
    XmlExternalParameterEntity = 5,
    XmlInternalPredefinedEntity = 6,
}

impl TryFrom<i32> for XmlEntityType {
    type Error = anyhow::Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::XmlInternalGeneralEntity),
            2 => Ok(Self::XmlExternalGeneralParsedEntity),
            3 => Ok(Self::XmlExternalGeneralUnparsedEntity),
            4 => Ok(Self::XmlInternalParameterEntity),
            5 => Ok(Self::XmlExternalParameterEntity),
            6 => Ok(Self::XmlInternalPredefinedEntity),
            _ => Err(anyhow::anyhow!(
                "Invalid convert from value '{value}' to {}",
                type_name::<Self>()
            )),
        }
    }
}

/// An entity declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlEntity {
    // Entity name
    pub(crate) name: Cow<'static, str>,
    // content or ndata if unparsed
    pub(crate) content: Option<Cow<'static, str>>,
    // The entity type
    pub(crate) etype: XmlEntityType,
    // External identifier for PUBLIC
    pub(crate) external_id: Option<Box<str>>,
    // URI for a SYSTEM or PUBLIC Entity
    pub(crate) system_id: Option<Box<str>>,
}

impl XmlEntity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn entity_type(&self) -> XmlEntityType {
        self.etype
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }
}

macro_rules! predefined_entity {
    ($name:literal, $content:literal) => {
        XmlEntity {
            name: Cow::Borrowed($name),
            content: Some(Cow::Borrowed($content)),
            etype: XmlEntityType::XmlInternalPredefinedEntity,
            external_id: None,
            system_id: None,
        }
    };
}

// The XML predefined entities.
static XML_ENTITY_LT: XmlEntity = predefined_entity!("lt", "<");
static XML_ENTITY_GT: XmlEntity = predefined_entity!("gt", ">");
static XML_ENTITY_AMP: XmlEntity = predefined_entity!("amp", "&");
static XML_ENTITY_QUOT: XmlEntity = predefined_entity!("quot", "\"");
static XML_ENTITY_APOS: XmlEntity = predefined_entity!("apos", "'");

/// Check whether this name is an predefined entity.
///
/// Returns `None` if not, otherwise the entity
#[doc(alias = "xmlGetPredefinedEntity")]
pub fn get_predefined_entity(name: &str) -> Option<&'static XmlEntity> {
    match name {
        "lt" => Some(&XML_ENTITY_LT),
        "gt" => Some(&XML_ENTITY_GT),
        "amp" => Some(&XML_ENTITY_AMP),
        "apos" => Some(&XML_ENTITY_APOS),
        "quot" => Some(&XML_ENTITY_QUOT),
        _ => None,
    }
}

/// 4.6 Predefined Entities: a redeclaration must expand to the same character.
fn is_valid_predefined_redeclaration(predef: &XmlEntity, content: Option<&str>) -> bool {
    let (Some(content), Some(c)) = (
        content,
        predef.content.as_deref().and_then(|c| c.bytes().next()),
    ) else {
        return false;
    };
    if content.as_bytes() == [c] && matches!(content, ">" | "'" | "\"") {
        return true;
    }
    let Some(reference) = content.strip_prefix("&#") else {
        return false;
    };
    if let Some(hex) = reference.strip_prefix('x') {
        hex.eq_ignore_ascii_case(&format!("{c:02X};"))
    } else {
        reference == format!("{c};")
    }
}

fn xml_entities_warn(code: XmlParserErrors, msg: String) {
    report_error(
        XmlErrorDomain::XmlFromTree,
        code,
        XmlErrorLevel::XmlErrWarning,
        None,
        None,
        msg.into(),
    );
}

impl XmlNodeStore {
    /// Register a new entity for this document.
    ///
    /// The document must have an internal subset.
    #[doc(alias = "xmlAddDocEntity")]
    pub fn add_doc_entity(
        &mut self,
        doc: XmlDocId,
        name: &str,
        typ: XmlEntityType,
        external_id: Option<&str>,
        system_id: Option<&str>,
        content: Option<&str>,
    ) -> Result<&XmlEntity, XmlTreeError> {
        match typ {
            XmlEntityType::XmlInternalPredefinedEntity => {
                return Err(XmlTreeError::InvalidArgument(
                    "predefined entities cannot be declared",
                ));
            }
            XmlEntityType::XmlInternalGeneralEntity
            | XmlEntityType::XmlExternalGeneralParsedEntity
            | XmlEntityType::XmlExternalGeneralUnparsedEntity => {
                if let Some(predef) = get_predefined_entity(name) {
                    if typ != XmlEntityType::XmlInternalGeneralEntity
                        || !is_valid_predefined_redeclaration(predef, content)
                    {
                        xml_entities_warn(
                            XmlParserErrors::XmlErrEntityProcessing,
                            format!("xmlAddEntity: invalid redeclaration of predefined entity '{name}'\n"),
                        );
                        return Err(XmlTreeError::InvalidArgument(
                            "invalid redeclaration of a predefined entity",
                        ));
                    }
                }
            }
            _ => {}
        }
        let Some(dtd) = self[doc].int_subset.as_mut() else {
            xml_entities_warn(
                XmlParserErrors::XmlDTDNoDTD,
                "xmlAddDocEntity: document without internal subset\n".to_owned(),
            );
            return Err(XmlTreeError::InvalidArgument(
                "document without internal subset",
            ));
        };
        match dtd.entities.entry(name.to_owned()) {
            // entity was already defined at another level.
            Entry::Occupied(_) => Err(XmlTreeError::InvalidArgument("entity already declared")),
            Entry::Vacant(entry) => Ok(entry.insert(XmlEntity {
                name: Cow::Owned(name.to_owned()),
                content: content.map(|content| Cow::Owned(content.to_owned())),
                etype: typ,
                external_id: external_id.map(Into::into),
                system_id: system_id.map(Into::into),
            })),
        }
    }

    /// Do an entity lookup in the document entity hash table and
    /// returns the corresponding entity, otherwise a lookup is done
    /// in the predefined entities too.
    ///
    /// Returns the entity or `None` if not found.
    #[doc(alias = "xmlGetDocEntity")]
    pub fn get_doc_entity(&self, doc: Option<XmlDocId>, name: &str) -> Option<&XmlEntity> {
        doc.and_then(|doc| self.get_doc(doc))
            .and_then(|doc| doc.int_subset.as_ref())
            .and_then(|dtd| dtd.entities.get(name))
            .or_else(|| get_predefined_entity(name))
    }

    /// Bind the entity reference `node` to the declaration of the same name
    /// in `doc`, or leave it unbound if there is none.
    pub(crate) fn bind_entity_ref(&mut self, node: XmlNodeId, doc: Option<XmlDocId>) {
        let content = self[node]
            .name
            .as_deref()
            .and_then(|name| self.get_doc_entity(doc, name))
            .map(|ent| ent.content().map(XmlString::from));
        let cur = &mut self[node];
        cur.ent_bound = content.is_some();
        cur.content = content.flatten();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_predefined_entity() {
        assert_eq!(get_predefined_entity("amp").and_then(|e| e.content()), Some("&"));
        assert!(get_predefined_entity("nbsp").is_none());
        assert_eq!(
            XmlEntityType::try_from(6).unwrap(),
            XmlEntityType::XmlInternalPredefinedEntity
        );
        assert!(XmlEntityType::try_from(0).is_err());
    }

    #[test]
    fn test_xml_add_doc_entity() {
        let mut store = XmlNodeStore::new();
        let doc = store.new_doc(None).unwrap();
        assert!(store
            .add_doc_entity(doc, "e", XmlEntityType::XmlInternalGeneralEntity, None, None, Some("v"))
            .is_err());

        store.create_int_subset(doc, Some("root"), None, None).unwrap();
        store
            .add_doc_entity(doc, "e", XmlEntityType::XmlInternalGeneralEntity, None, None, Some("v"))
            .unwrap();
        assert_eq!(
            store.get_doc_entity(Some(doc), "e").and_then(|e| e.content()),
            Some("v")
        );
        assert!(store.get_doc_entity(None, "e").is_none());
        assert!(store.get_doc_entity(Some(doc), "lt").is_some());

        // 4.6 Predefined Entities
        assert!(store
            .add_doc_entity(doc, "lt", XmlEntityType::XmlInternalGeneralEntity, None, None, Some("&#60;"))
            .is_ok());
        assert!(store
            .add_doc_entity(doc, "gt", XmlEntityType::XmlInternalGeneralEntity, None, None, Some("x"))
            .is_err());
    }
}
