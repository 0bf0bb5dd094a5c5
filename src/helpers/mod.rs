pub(crate) mod reader;
pub mod xml;
pub(crate) mod zip;
