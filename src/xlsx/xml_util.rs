use crate::common::errors::MdnError;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

pub const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

pub struct XmlUtil;

impl XmlUtil {
    /// Matches `local` against a possibly prefixed name (`x:sheet`, `sheet`).
    pub fn is_local_name_bytes(full_name: &[u8], local_name: &[u8]) -> bool {
        if full_name == local_name {
            return true;
        }
        if let Some(pos) = full_name.iter().rposition(|b| *b == b':') {
            return &full_name[pos + 1..] == local_name;
        }
        false
    }

    pub fn attr_value(
        e: &BytesStart<'_>,
        key: &[u8],
        decoder: Decoder,
    ) -> Result<Option<String>, MdnError> {
        for attr in e.attributes().flatten() {
            if Self::is_local_name_bytes(attr.key.as_ref(), key) {
                let value = attr
                    .decode_and_unescape_value(decoder)
                    .map_err(|x| MdnError::XmlParseError(x.to_string()))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    /// `val="0"` / `val="false"` switch a flag element off; absent means on.
    pub fn flag_value(e: &BytesStart<'_>, decoder: Decoder) -> Result<bool, MdnError> {
        Ok(!matches!(
            Self::attr_value(e, b"val", decoder)?.as_deref(),
            Some("0") | Some("false")
        ))
    }

    pub fn writer_with_decl() -> Result<XmlWriter, MdnError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(writer)
    }

    pub fn finish(writer: XmlWriter) -> Result<String, MdnError> {
        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| MdnError::XmlParseError(e.to_string()))
    }
}
