use crate::common::errors::MdnError;
use crate::xlsx::xml_util::XmlUtil;
use quick_xml::events::Event;
use quick_xml::Reader;

pub struct SharedStrings;

impl SharedStrings {
    /// Plain and rich-text items, in table order. Phonetic runs are skipped.
    pub fn parse(content: &str) -> Result<Vec<String>, MdnError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);
        let mut items = Vec::new();
        let mut current: Option<String> = None;
        let mut in_text = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"si") => {
                    current = Some(String::new());
                }
                Ok(Event::Empty(e)) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"si") => {
                    items.push(String::new());
                }
                Ok(Event::End(e)) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"si") => {
                    items.extend(current.take());
                }
                Ok(Event::Start(e)) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"rPh") => {
                    phonetic_depth += 1;
                }
                Ok(Event::End(e)) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"rPh") => {
                    phonetic_depth = phonetic_depth.saturating_sub(1);
                }
                Ok(Event::Start(e)) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"t") => {
                    in_text = phonetic_depth == 0;
                }
                Ok(Event::End(e)) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"t") => {
                    in_text = false;
                }
                Ok(Event::Text(text)) if in_text => {
                    let t = text
                        .unescape()
                        .map_err(|x| MdnError::XmlParseError(x.to_string()))?;
                    if let Some(item) = current.as_mut() {
                        item.push_str(&t);
                    }
                }
                Ok(Event::CData(data)) if in_text => {
                    if let Some(item) = current.as_mut() {
                        item.push_str(&String::from_utf8_lossy(&*data));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(MdnError::XmlParseError(e.to_string())),
            }
        }
        Ok(items)
    }
}
