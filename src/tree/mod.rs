//! Provide methods and data structures for tree manipulation.
//! This module is based on `libxml/tree.h`, `tree.c`, and so on in `libxml2-v2.11.8`.
//!
//! Please refer to original libxml2 documents also.

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
mod copy;
mod document;
mod dom_wrapper;
mod dtd;
mod entities;
mod generic;
mod id;
mod namespace;
mod node;
mod store;

use std::{any::type_name, borrow::Borrow, fmt, ops::Deref, rc::Rc};

use crate::{
    __xml_simple_error,
    dict::XmlDictRef,
    error::{__xml_simple_oom_error, XmlErrorDomain, XmlParserErrors},
};

pub use copy::*;
pub use document::*;
pub use dom_wrapper::*;
pub use dtd::*;
pub use entities::*;
pub use id::*;
pub use namespace::*;
pub use node::*;
pub use store::*;

/// This is the namespace for the special xml: prefix predefined in the
/// XML Namespace specification.
pub const XML_XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// The reserved prefix bound to [`XML_XML_NAMESPACE`].
pub const XML_XML_PREFIX: &str = "xml";

/// Name shared by every text node.
pub const XML_STRING_TEXT: &str = "text";
/// Name of text nodes whose content must not be escaped on output.
pub const XML_STRING_TEXT_NOENC: &str = "textnoenc";
/// Name shared by every comment node.
pub const XML_STRING_COMMENT: &str = "comment";

/// The different element types carried by an XML tree.
///
/// NOTE: This is synchronized with DOM Level1 values.
///       See http://www.w3.org/TR/REC-DOM-Level-1/
///
/// Actually this had diverged a bit, and now XML_DOCUMENT_TYPE_NODE should
/// be deprecated to use an XML_DTD_NODE.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlElementType {
    #[default]
    XmlInvalidNode = 0,
    XmlElementNode = 1,
    XmlAttributeNode = 2,
    XmlTextNode = 3,
    XmlCDATASectionNode = 4,
    XmlEntityRefNode = 5,
    XmlEntityNode = 6,
    XmlPINode = 7,
    XmlCommentNode = 8,
    XmlDocumentNode = 9,
    XmlDocumentTypeNode = 10,
    XmlDocumentFragNode = 11,
    XmlNotationNode = 12,
    XmlHTMLDocumentNode = 13,
    XmlDTDNode = 14,
    XmlElementDecl = 15,
    XmlAttributeDecl = 16,
    XmlEntityDecl = 17,
    XmlNamespaceDecl = 18,
    XmlXIncludeStart = 19,
    XmlXIncludeEnd = 20,
}

impl XmlElementType {
    /// Check if this is a document node type (`XmlDocumentNode` or `XmlHTMLDocumentNode`).
    pub fn is_document(self) -> bool {
        matches!(self, Self::XmlDocumentNode | Self::XmlHTMLDocumentNode)
    }

    /// Check if nodes of this type carry their value in `content`.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            Self::XmlTextNode | Self::XmlCDATASectionNode | Self::XmlCommentNode | Self::XmlPINode
        )
    }
}

impl TryFrom<i32> for XmlElementType {
    type Error = anyhow::Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        const ALL: [XmlElementType; 20] = [
            XmlElementType::XmlElementNode,
            XmlElementType::XmlAttributeNode,
            XmlElementType::XmlTextNode,
            XmlElementType::XmlCDATASectionNode,
            XmlElementType::XmlEntityRefNode,
            XmlElementType::XmlEntityNode,
            XmlElementType::XmlPINode,
            XmlElementType::XmlCommentNode,
            XmlElementType::XmlDocumentNode,
            XmlElementType::XmlDocumentTypeNode,
            XmlElementType::XmlDocumentFragNode,
            XmlElementType::XmlNotationNode,
            XmlElementType::XmlHTMLDocumentNode,
            XmlElementType::XmlDTDNode,
            XmlElementType::XmlElementDecl,
            XmlElementType::XmlAttributeDecl,
            XmlElementType::XmlEntityDecl,
            XmlElementType::XmlNamespaceDecl,
            XmlElementType::XmlXIncludeStart,
            XmlElementType::XmlXIncludeEnd,
        ];
        ALL.into_iter()
            .find(|&ty| ty as i32 == value)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid convert from value '{value}' to {}",
                    type_name::<Self>()
                )
            })
    }
}

/// A DTD Attribute type definition.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlAttributeType {
    XmlAttributeCDATA = 1,
    XmlAttributeID,
    XmlAttributeIDREF,
    XmlAttributeIDREFS,
    XmlAttributeEntity,
    XmlAttributeEntities,
    XmlAttributeNmtoken,
    XmlAttributeNmtokens,
    XmlAttributeEnumeration,
    XmlAttributeNotation,
}

impl TryFrom<i32> for XmlAttributeType {
    type Error = anyhow::Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value == Self::XmlAttributeCDATA as i32 {
            Ok(Self::XmlAttributeCDATA)
        } else if value == Self::XmlAttributeID as i32 {
            Ok(Self::XmlAttributeID)
        } else if value == Self::XmlAttributeIDREF as i32 {
            Ok(Self::XmlAttributeIDREF)
        } else if value == Self::XmlAttributeIDREFS as i32 {
            Ok(Self::XmlAttributeIDREFS)
        } else if value == Self::XmlAttributeEntity as i32 {
            Ok(Self::XmlAttributeEntity)
        } else if value == Self::XmlAttributeEntities as i32 {
            Ok(Self::XmlAttributeEntities)
        } else if value == Self::XmlAttributeNmtoken as i32 {
            Ok(Self::XmlAttributeNmtoken)
        } else if value == Self::XmlAttributeNmtokens as i32 {
            Ok(Self::XmlAttributeNmtokens)
        } else if value == Self::XmlAttributeEnumeration as i32 {
            Ok(Self::XmlAttributeEnumeration)
        } else if value == Self::XmlAttributeNotation as i32 {
            Ok(Self::XmlAttributeNotation)
        } else {
            Err(anyhow::anyhow!(
                "Invalid convert from value '{value}' to {}",
                type_name::<Self>()
            ))
        }
    }
}

/// A string held by a node.
///
/// Names of text and comment nodes are shared static strings, names coming
/// from a document dictionary are `Interned`, everything else is `Owned`.
#[derive(Debug, Clone)]
pub enum XmlString {
    Static(&'static str),
    Interned(Rc<str>),
    Owned(Box<str>),
}

impl XmlString {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Interned(s) => s,
            Self::Owned(s) => s,
        }
    }

    /// Check if this string is one of the entries of `dict`.
    pub fn is_owned_by(&self, dict: &XmlDictRef) -> bool {
        match self {
            Self::Interned(s) => dict.owns(s),
            _ => false,
        }
    }

    /// Make a copy suitable for a tree that uses `dict`.
    ///
    /// Static names are kept as is. Otherwise the string is interned in `dict`,
    /// or duplicated if there is no dictionary.
    pub(crate) fn copy_for(&self, dict: Option<&XmlDictRef>) -> Self {
        match (self, dict) {
            (Self::Static(s), _) => Self::Static(s),
            (_, Some(dict)) => Self::Interned(dict.lookup(self.as_str())),
            (_, None) => Self::Owned(self.as_str().into()),
        }
    }

    /// Intern `s` in `dict`, or duplicate it if there is no dictionary.
    pub(crate) fn new_in(s: &str, dict: Option<&XmlDictRef>) -> Self {
        match dict {
            Some(dict) => Self::Interned(dict.lookup(s)),
            None => Self::Owned(s.into()),
        }
    }
}

impl Deref for XmlString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl Borrow<str> for XmlString {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for XmlString {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for XmlString {}

impl PartialEq<str> for XmlString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for XmlString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for XmlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for XmlString {
    fn from(value: &str) -> Self {
        Self::Owned(value.into())
    }
}

/// Builds the QName `prefix:ncname` if prefix is not `None` nor empty,
/// otherwise returns `ncname`.
#[doc(alias = "xmlBuildQName")]
pub fn build_qname(ncname: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{ncname}"),
        _ => ncname.to_owned(),
    }
}

/// Parse an XML qualified name string.
///
/// Returns `None` if it is not a Qualified Name, otherwise the pair
/// `(prefix, local name)`.
#[doc(alias = "xmlSplitQName3")]
pub fn split_qname3(name: &str) -> Option<(&str, &str)> {
    // nasty but valid
    if name.starts_with(':') {
        return None;
    }
    name.split_once(':')
}

/// Handle an out of memory condition
#[doc(alias = "xmlTreeErrMemory")]
fn xml_tree_err_memory(extra: &str) {
    __xml_simple_oom_error(XmlErrorDomain::XmlFromTree, None, extra);
}

/// Handle an out of memory condition
#[doc(alias = "xmlDOMWrapNsNormErrMemory")]
fn xml_ns_err_memory(extra: &str) {
    __xml_simple_oom_error(XmlErrorDomain::XmlFromNamespace, None, extra);
}

/// Handle a tree error
#[doc(alias = "xmlTreeErr")]
fn xml_tree_err(code: XmlParserErrors, node: Option<XmlNodeId>, extra: Option<&str>) {
    let msg = match code {
        XmlParserErrors::XmlTreeInvalidHex => "invalid hexadecimal character value\n".to_owned(),
        XmlParserErrors::XmlTreeInvalidDec => "invalid decimal character value\n".to_owned(),
        XmlParserErrors::XmlTreeUnterminatedEntity => {
            format!("unterminated entity reference {}\n", extra.unwrap_or(""))
        }
        XmlParserErrors::XmlTreeNotUTF8 => "string is not in UTF-8\n".to_owned(),
        XmlParserErrors::XmlCheckUnknownNode => {
            format!("unsupported node type {}\n", extra.unwrap_or(""))
        }
        XmlParserErrors::XmlCheckWrongDoc => {
            format!("node belongs to another document {}\n", extra.unwrap_or(""))
        }
        XmlParserErrors::XmlNsErrUndefinedNamespace => format!(
            "no free namespace prefix for {}\n",
            extra.unwrap_or("(default)")
        ),
        _ => "unexpected error number\n".to_owned(),
    };
    __xml_simple_error!(XmlErrorDomain::XmlFromTree, code, node, msg);
}
