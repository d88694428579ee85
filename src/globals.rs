//! Provide the per-thread global state of the library.
//! This module is based on `libxml/globals.h`, `globals.c`, and so on in `libxml2-v2.11.8`.
//!
//! Please refer to original libxml2 documents also.

use std::{borrow::Cow, cell::RefCell, io::Write};

use const_format::concatcp;

use crate::error::{XmlError, generic_error_default};

pub type GenericError = for<'a> fn(Option<&mut (dyn Write + 'static)>, &str);
pub type StructuredError = fn(&XmlError);

pub const XML_TREE_VERSION: &str = concatcp!(
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR"),
    ".",
    env!("CARGO_PKG_VERSION_PATCH")
);

pub struct XmlGlobalState {
    tree_version: Cow<'static, str>,
    pub(crate) generic_error: GenericError,
    pub(crate) generic_error_context: Option<Box<dyn Write>>,
    pub(crate) structured_error: Option<StructuredError>,
    pub(crate) last_error: XmlError,
}

impl XmlGlobalState {
    fn new() -> Self {
        Self {
            tree_version: Cow::Borrowed(XML_TREE_VERSION),
            generic_error: generic_error_default,
            generic_error_context: None,
            structured_error: None,
            last_error: XmlError::default(),
        }
    }
}

thread_local! {
    pub static GLOBAL_STATE: RefCell<XmlGlobalState> = RefCell::new(XmlGlobalState::new());
}

/// Set new generic error function and generic error context.
///
/// If `func` is `None`, set `generic_error_default`.
/// If `context` is `None`, current context is clear and no context is set.
pub fn set_generic_error(func: Option<GenericError>, context: Option<impl Write + 'static>) {
    GLOBAL_STATE.with_borrow_mut(|state| {
        state.generic_error = func.unwrap_or(generic_error_default);
        state.generic_error_context = context.map(|context| {
            let boxed: Box<dyn Write + 'static> = Box::new(context);
            boxed
        });
    });
}

/// Set new structured error function.
///
/// If `func` is `None`, errors fall back to the generic error function.
pub fn set_structured_error(func: Option<StructuredError>) {
    GLOBAL_STATE.with_borrow_mut(|state| state.structured_error = func);
}

/// Get the last error raised on this thread.
#[doc(alias = "xmlGetLastError")]
pub fn get_last_error() -> XmlError {
    GLOBAL_STATE.with_borrow(|state| state.last_error.clone())
}

/// Cleanup the last error raised on this thread.
#[doc(alias = "xmlResetLastError")]
pub fn reset_last_error() {
    GLOBAL_STATE.with_borrow_mut(|state| state.last_error.reset());
}

/// Version of the library, like `"0.1.0"`.
pub fn tree_version() -> Cow<'static, str> {
    GLOBAL_STATE.with_borrow(|state| state.tree_version.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_version() {
        assert_eq!(tree_version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(XML_TREE_VERSION.split('.').count(), 3);
    }
}
