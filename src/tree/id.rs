// Copyright of the original code is the following.
// --------
// Summary: The DTD validation
// Description: API for the DTD handling and the validity checking
//
// Copy: See Copyright for the status of this software.
//
// Author: Daniel Veillard
// --------
// valid.c : part of the code use to do the DTD handling and the validity
//           checking
//
// See Copyright for the status of this software.
//
// daniel@veillard.com

use std::{borrow::Cow, collections::hash_map::Entry};

use crate::error::{XmlErrorDomain, XmlErrorLevel, XmlParserErrors, XmlTreeError, report_error};

use super::{XmlAttributeType, XmlDocId, XmlElementType, XmlNodeId, XmlNodeStore, XmlNsId};

/// An XML ID instance.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlID {
    // The ID name
    pub(crate) value: String,
    // The attribute holding it
    pub(crate) attr: XmlNodeId,
    // The line number of the owner element
    pub(crate) lineno: u16,
}

impl XmlID {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn attr(&self) -> XmlNodeId {
        self.attr
    }

    pub fn lineno(&self) -> u16 {
        self.lineno
    }
}

/// Normalize a string in-place.
#[doc(alias = "xmlValidNormalizeString")]
pub(crate) fn normalize_id_value(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim_matches('\x20');
    if !trimmed.contains("\x20\x20") {
        return Cow::Borrowed(trimmed);
    }
    let mut buf = String::with_capacity(trimmed.len());
    for token in trimmed.split('\x20').filter(|token| !token.is_empty()) {
        if !buf.is_empty() {
            buf.push('\x20');
        }
        buf.push_str(token);
    }
    Cow::Owned(buf)
}

impl XmlNodeStore {
    /// Register a new id declaration
    ///
    /// On success, `attr` is typed as ID.
    #[doc(alias = "xmlAddID")]
    pub fn add_id(
        &mut self,
        doc: XmlDocId,
        value: &str,
        attr: XmlNodeId,
    ) -> Result<(), XmlTreeError> {
        if value.is_empty() {
            return Err(XmlTreeError::InvalidArgument("empty ID value"));
        }
        let parent = self[attr].parent;
        let lineno = parent.map_or(0, |parent| self[parent].line);
        match self[doc].ids.entry(value.to_owned()) {
            Entry::Occupied(_) => {
                // The id is already defined in this document.
                report_error(
                    XmlErrorDomain::XmlFromValid,
                    XmlParserErrors::XmlDTDIDRedefined,
                    XmlErrorLevel::XmlErrError,
                    parent,
                    Some(value.to_owned().into()),
                    format!("ID {value} already defined\n").into(),
                );
                return Err(XmlTreeError::DuplicateId(value.to_owned()));
            }
            Entry::Vacant(entry) => {
                entry.insert(XmlID {
                    value: value.to_owned(),
                    attr,
                    lineno,
                });
            }
        }
        self[attr].atype = Some(XmlAttributeType::XmlAttributeID);
        Ok(())
    }

    /// Remove the given attribute from the ID table maintained internally.
    ///
    /// Returns `false` if the lookup failed.
    #[doc(alias = "xmlRemoveID")]
    pub fn remove_id(&mut self, doc: XmlDocId, attr: XmlNodeId) -> bool {
        let Some(id) = self.list_get_string(self[attr].children, true) else {
            return false;
        };
        let id = normalize_id_value(&id);
        if self[doc].ids.get(id.as_ref()).is_none_or(|entry| entry.attr != attr) {
            return false;
        }
        self[doc].ids.remove(id.as_ref());
        self[attr].atype = None;
        true
    }

    /// Search the attribute declaring the given ID
    #[doc(alias = "xmlGetID")]
    pub fn get_id(&self, doc: XmlDocId, value: &str) -> Option<XmlNodeId> {
        self[doc].ids.get(value).map(|id| id.attr)
    }

    /// Determine whether an attribute is of type ID.
    ///
    /// `xml:id` always is. For HTML documents `id`, and `name` on `<a>`, are.
    /// Otherwise the attribute declarations of the internal subset decide.
    #[doc(alias = "xmlIsID")]
    pub fn is_id(&self, doc: Option<XmlDocId>, elem: Option<XmlNodeId>, attr: XmlNodeId) -> bool {
        let cur = &self[attr];
        let prefix = |ns: Option<XmlNsId>| ns.and_then(|ns| self[ns].prefix());
        if cur.is_named("id") && prefix(cur.ns) == Some("xml") {
            return true;
        }
        let Some(doc) = doc.and_then(|doc| self.get_doc(doc)) else {
            return false;
        };
        if doc.typ == XmlElementType::XmlHTMLDocumentNode {
            return cur.is_named("id")
                || (cur.is_named("name") && elem.is_none_or(|elem| self[elem].is_named("a")));
        }
        #[cfg(feature = "libxml_valid")]
        if let (Some(dtd), Some(elem)) = (doc.int_subset.as_ref(), elem) {
            let elem = &self[elem];
            let (Some(elem_name), Some(attr_name)) = (elem.name.as_deref(), cur.name.as_deref())
            else {
                return false;
            };
            let full_elem_name = super::build_qname(elem_name, prefix(elem.ns));
            let full_attr_name = super::build_qname(attr_name, prefix(cur.ns));
            return dtd
                .get_attr_desc(&full_elem_name, &full_attr_name)
                .is_some_and(|decl| decl.atype == XmlAttributeType::XmlAttributeID);
        }
        false
    }
}
