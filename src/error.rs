//! Provide methods and data structures for error handling.
//! This module is based on `libxml/xmlerror.h`, `error.c`, and so on in `libxml2-v2.11.8`.
//!
//! Please refer to original libxml2 documents also.

use std::{
    borrow::Cow,
    fmt::{self, Display},
    io::Write,
};

use crate::{
    globals::GLOBAL_STATE,
    tree::{XmlElementType, XmlNodeId},
};

pub fn generic_error_default(out: Option<&mut (dyn Write + 'static)>, msg: &str) {
    if let Some(out) = out {
        write!(out, "{msg}").ok();
    } else {
        eprint!("{msg}");
    }
}

macro_rules! impl_xml_parser_errors {
    ( $( $variant:ident $( = $default:literal )? ),* ) => {
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum XmlParserErrors {
            $(
                $variant $( = $default )?
            ),*
        }

        impl TryFrom<i32> for XmlParserErrors {
            type Error = anyhow::Error;
            fn try_from(value: i32) -> Result<Self, Self::Error> {
                $(
                    if value == Self:: $variant as i32 {
                        return Ok(Self:: $variant);
                    }
                )*
                Err(anyhow::anyhow!("Invalid convert from value '{value}' to {}", std::any::type_name::<Self>()))
            }
        }

        impl Default for XmlParserErrors {
            fn default() -> Self {
                Self::XmlErrOK
            }
        }
    };
}
impl_xml_parser_errors!(
    XmlErrOK = 0,
    XmlErrInternalError,   /* 1 */
    XmlErrNoMemory,        /* 2 */
    XmlErrEntityProcessing = 104,
    XmlNsErrXmlNamespace = 200,
    XmlNsErrUndefinedNamespace, /* 201 */
    XmlNsErrQname,              /* 202 */
    XmlNsErrAttributeRedefined, /* 203 */
    XmlDTDAttributeRedefined = 501,
    XmlDTDIDRedefined = 513,
    XmlDTDNoDTD = 522,
    XmlTreeInvalidHex = 1300,
    XmlTreeInvalidDec,         /* 1301 */
    XmlTreeUnterminatedEntity, /* 1302 */
    XmlTreeNotUTF8,            /* 1303 */
    XmlCheckUnknownNode = 5011,
    XmlCheckWrongDoc = 5017
);

impl XmlParserErrors {
    pub fn is_ok(&self) -> bool {
        *self == Self::XmlErrOK
    }

    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlErrorDomain {
    #[default]
    XmlFromNone = 0,
    XmlFromParser,    /* The XML parser */
    XmlFromTree,      /* The tree module */
    XmlFromNamespace, /* The XML Namespace module */
    XmlFromDTD,       /* The XML DTD validation with parser context*/
    XmlFromValid = 23, /* The XML DTD validation with valid context */
    XmlFromCheck = 24, /* The error checking module */
}

impl TryFrom<i32> for XmlErrorDomain {
    type Error = anyhow::Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::XmlFromNone),
            1 => Ok(Self::XmlFromParser),
            2 => Ok(Self::XmlFromTree),
            3 => Ok(Self::XmlFromNamespace),
            4 => Ok(Self::XmlFromDTD),
            23 => Ok(Self::XmlFromValid),
            24 => Ok(Self::XmlFromCheck),
            _ => Err(anyhow::anyhow!(
                "Invalid convert from value '{value}' to {}",
                std::any::type_name::<Self>()
            )),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlErrorLevel {
    #[default]
    XmlErrNone = 0,
    XmlErrWarning = 1, /* A simple warning */
    XmlErrError = 2,   /* A recoverable error */
    XmlErrFatal = 3,   /* A fatal error */
}

/// An error reported by the tree layer.
///
/// The last one raised on the current thread can be retrieved with
/// [`get_last_error`](crate::globals::get_last_error).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlError {
    pub(crate) domain: XmlErrorDomain,
    pub(crate) code: XmlParserErrors,
    pub(crate) message: Option<Cow<'static, str>>,
    pub(crate) level: XmlErrorLevel,
    pub(crate) node: Option<XmlNodeId>,
    pub(crate) str1: Option<Cow<'static, str>>,
}

impl XmlError {
    pub fn domain(&self) -> XmlErrorDomain {
        self.domain
    }

    pub fn code(&self) -> XmlParserErrors {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn level(&self) -> XmlErrorLevel {
        self.level
    }

    pub fn node(&self) -> Option<XmlNodeId> {
        self.node
    }

    pub fn str1(&self) -> Option<&str> {
        self.str1.as_deref()
    }

    pub fn is_err(&self) -> bool {
        self.code.is_err()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Update the thread's last error, then forward the error to the structured
/// handler if one is registered, or to the generic handler otherwise.
#[doc(alias = "__xmlRaiseError")]
pub fn report_error(
    domain: XmlErrorDomain,
    code: XmlParserErrors,
    level: XmlErrorLevel,
    node: Option<XmlNodeId>,
    str1: Option<Cow<'static, str>>,
    msg: Cow<'static, str>,
) {
    if code.is_ok() {
        return;
    }
    GLOBAL_STATE.with_borrow_mut(|state| {
        state.last_error = XmlError {
            domain,
            code,
            message: Some(msg),
            level,
            node,
            str1,
        };
        if let Some(schannel) = state.structured_error {
            schannel(&state.last_error);
            return;
        }
        let channel = state.generic_error;
        let prefix = match level {
            XmlErrorLevel::XmlErrWarning => "warning : ",
            _ => "error : ",
        };
        let domain = match domain {
            XmlErrorDomain::XmlFromTree => "tree ",
            XmlErrorDomain::XmlFromNamespace => "namespace ",
            XmlErrorDomain::XmlFromValid | XmlErrorDomain::XmlFromDTD => "validity ",
            XmlErrorDomain::XmlFromCheck => "checking ",
            _ => "",
        };
        let message = state.last_error.message.as_deref().unwrap_or_default();
        let formatted = format!("{domain}{prefix}{message}");
        channel(state.generic_error_context.as_deref_mut(), &formatted);
    });
}

/// Report a simple error without any parser context.
#[doc(hidden)]
#[macro_export]
macro_rules! __xml_simple_error {
    ($domain:expr, $code:expr, $node:expr, $msg:expr) => {
        $crate::error::report_error(
            $domain,
            $code,
            $crate::error::XmlErrorLevel::XmlErrError,
            $node,
            None,
            std::borrow::Cow::from($msg),
        )
    };
    ($domain:expr, $code:expr, $node:expr, $msg:expr, $str1:expr) => {
        $crate::error::report_error(
            $domain,
            $code,
            $crate::error::XmlErrorLevel::XmlErrError,
            $node,
            Some(std::borrow::Cow::from($str1)),
            std::borrow::Cow::from($msg),
        )
    };
}
pub use __xml_simple_error;

/// Handle an out of memory condition
#[doc(alias = "__xmlSimpleOOMError")]
pub(crate) fn __xml_simple_oom_error(domain: XmlErrorDomain, node: Option<XmlNodeId>, msg: &str) {
    report_error(
        domain,
        XmlParserErrors::XmlErrNoMemory,
        XmlErrorLevel::XmlErrFatal,
        node,
        None,
        format!("Memory allocation failed : {msg}\n").into(),
    );
}

/// Errors returned by the mutating operations of the tree layer.
///
/// Lookups never fail; they return `None` and let the caller decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlTreeError {
    /// The arena could not grow any further.
    OutOfMemory,
    /// The node kind cannot take part in this operation.
    UnsupportedNodeKind(XmlElementType),
    /// The node kind is recognised but not handled yet (document fragments).
    NotYetSupported(XmlElementType),
    /// No unused prefix was found within the attempt bound.
    PrefixExhausted,
    /// A node does not belong to the document it was passed with.
    CrossDocumentMismatch,
    /// The element already declares the requested prefix.
    DuplicatePrefix,
    /// The ID value is already registered in the document.
    DuplicateId(String),
    /// A handle or argument is not usable for this call.
    InvalidArgument(&'static str),
}

impl Display for XmlTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::UnsupportedNodeKind(ty) => write!(f, "unsupported node type: {ty:?}"),
            Self::NotYetSupported(ty) => write!(f, "node type not yet supported: {ty:?}"),
            Self::PrefixExhausted => write!(f, "no unused namespace prefix could be generated"),
            Self::CrossDocumentMismatch => {
                write!(f, "node does not belong to the given document")
            }
            Self::DuplicatePrefix => write!(f, "namespace prefix is already declared"),
            Self::DuplicateId(id) => write!(f, "ID {id} already defined"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for XmlTreeError {}

impl XmlTreeError {
    /// The error code used when this failure is reported.
    pub fn code(&self) -> XmlParserErrors {
        match self {
            Self::OutOfMemory => XmlParserErrors::XmlErrNoMemory,
            Self::UnsupportedNodeKind(_) | Self::NotYetSupported(_) => {
                XmlParserErrors::XmlCheckUnknownNode
            }
            Self::PrefixExhausted => XmlParserErrors::XmlNsErrUndefinedNamespace,
            Self::CrossDocumentMismatch => XmlParserErrors::XmlCheckWrongDoc,
            Self::DuplicatePrefix => XmlParserErrors::XmlNsErrAttributeRedefined,
            Self::DuplicateId(_) => XmlParserErrors::XmlDTDIDRedefined,
            Self::InvalidArgument(_) => XmlParserErrors::XmlErrInternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::globals::{get_last_error, reset_last_error, set_generic_error};

    use super::*;

    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_xml_parser_errors_try_from() {
        assert_eq!(
            XmlParserErrors::try_from(5017).unwrap(),
            XmlParserErrors::XmlCheckWrongDoc
        );
        assert!(XmlParserErrors::try_from(-3).is_err());
        assert_eq!(
            XmlErrorDomain::try_from(2).unwrap(),
            XmlErrorDomain::XmlFromTree
        );
    }

    #[test]
    fn test_report_error_updates_last_error() {
        let sink = Sink::default();
        set_generic_error(None, Some(sink.clone()));
        reset_last_error();
        __xml_simple_error!(
            XmlErrorDomain::XmlFromTree,
            XmlParserErrors::XmlTreeNotUTF8,
            None,
            "string is not in UTF-8\n"
        );
        let last = get_last_error();
        assert_eq!(last.code(), XmlParserErrors::XmlTreeNotUTF8);
        assert_eq!(last.domain(), XmlErrorDomain::XmlFromTree);
        let written = String::from_utf8(sink.0.borrow().clone()).unwrap();
        assert_eq!(written, "tree error : string is not in UTF-8\n");
        set_generic_error(None, None::<Sink>);
    }

    #[test]
    fn test_tree_error_display() {
        assert_eq!(
            XmlTreeError::UnsupportedNodeKind(XmlElementType::XmlDTDNode).to_string(),
            "unsupported node type: XmlDTDNode"
        );
        assert_eq!(
            XmlTreeError::PrefixExhausted.code(),
            XmlParserErrors::XmlNsErrUndefinedNamespace
        );
    }
}
