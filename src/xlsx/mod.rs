pub mod package_xml;
pub mod shared_strings;
pub mod styles_xml;
pub mod worksheet_xml;
pub mod xlsx_file;
pub mod xml_util;
