use crate::tree::XmlAttributeType;

/// A DTD Attribute default definition.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlAttributeDefault {
    #[default]
    XmlAttributeNone = 1,
    XmlAttributeRequired,
    XmlAttributeImplied,
    XmlAttributeFixed,
}

/// An Attribute declaration in a DTD.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlAttribute {
    // Attribute name
    pub(crate) name: Box<str>,
    // the namespace prefix if any
    pub(crate) prefix: Option<Box<str>>,
    // Element holding the attribute
    pub(crate) elem: Box<str>,
    // The attribute type
    pub(crate) atype: XmlAttributeType,
    // the default
    pub(crate) def: XmlAttributeDefault,
    // or the default value
    pub(crate) default_value: Option<Box<str>>,
}

impl XmlAttribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn elem(&self) -> &str {
        &self.elem
    }

    pub fn atype(&self) -> XmlAttributeType {
        self.atype
    }

    pub fn default_kind(&self) -> XmlAttributeDefault {
        self.def
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}
