//! `xl/styles.xml`: number formats, fonts and cell formats.

use crate::common::errors::MdnError;
use crate::sheet::sheet_model::{CellStyle, FontColor, FontStyle};
use crate::xlsx::xml_util::{XmlUtil, XmlWriter, MAIN_NS};
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// First id available to custom number formats.
const FIRST_CUSTOM_FORMAT_ID: u32 = 164;
const DEFAULT_TEXT_THEME: &str = "1";

const BUILTIN_FORMATS: [(u32, &str); 30] = [
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (41, r#"_(* #,##0_);_(* \(#,##0\);_(* "-"_);_(@_)"#),
    (44, r#"_("$"* #,##0.00_)_("$"* \(#,##0.00\)_("$"* "-"??_)_(@_)"#),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

pub fn builtin_format(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(builtin, _)| *builtin == id)
        .map(|(_, code)| *code)
}

pub fn builtin_format_id(code: &str) -> Option<u32> {
    BUILTIN_FORMATS
        .iter()
        .find(|(_, builtin)| *builtin == code)
        .map(|(id, _)| *id)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct XfEntry {
    num_fmt_id: u32,
    font_id: usize,
}

/// Styles read from an existing package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    num_fmts: HashMap<u32, String>,
    fonts: Vec<FontStyle>,
    cell_xfs: Vec<XfEntry>,
}

impl StyleSheet {
    pub fn parse(content: &str) -> Result<Self, MdnError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);
        let mut sheet = StyleSheet::default();
        let mut in_fonts = false;
        let mut in_cell_xfs = false;
        let mut font: Option<FontStyle> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| MdnError::XmlParseError(e.to_string()))?;
            let decoder = reader.decoder();
            match event {
                Event::Start(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"fonts") => {
                    in_fonts = true;
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"fonts") => {
                    in_fonts = false;
                }
                Event::Start(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"cellXfs") => {
                    in_cell_xfs = true;
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"cellXfs") => {
                    in_cell_xfs = false;
                }
                Event::Start(e) | Event::Empty(e)
                    if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"numFmt") =>
                {
                    let id = XmlUtil::attr_value(&e, b"numFmtId", decoder)?
                        .and_then(|v| v.parse::<u32>().ok());
                    let code = XmlUtil::attr_value(&e, b"formatCode", decoder)?;
                    if let (Some(id), Some(code)) = (id, code) {
                        sheet.num_fmts.insert(id, code);
                    }
                }
                Event::Start(e)
                    if in_fonts && XmlUtil::is_local_name_bytes(e.name().as_ref(), b"font") =>
                {
                    font = Some(FontStyle::default());
                }
                Event::Empty(e)
                    if in_fonts && XmlUtil::is_local_name_bytes(e.name().as_ref(), b"font") =>
                {
                    sheet.fonts.push(FontStyle::default());
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"font") => {
                    sheet.fonts.extend(font.take());
                }
                Event::Start(e) | Event::Empty(e) if font.is_some() => {
                    if let Some(current) = font.as_mut() {
                        Self::read_font_child(current, &e, decoder)?;
                    }
                }
                Event::Start(e) | Event::Empty(e)
                    if in_cell_xfs && XmlUtil::is_local_name_bytes(e.name().as_ref(), b"xf") =>
                {
                    let num_fmt_id = XmlUtil::attr_value(&e, b"numFmtId", decoder)?
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    let font_id = XmlUtil::attr_value(&e, b"fontId", decoder)?
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    sheet.cell_xfs.push(XfEntry {
                        num_fmt_id,
                        font_id,
                    });
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(sheet)
    }

    fn read_font_child(
        font: &mut FontStyle,
        e: &BytesStart<'_>,
        decoder: Decoder,
    ) -> Result<(), MdnError> {
        let name = e.name();
        if XmlUtil::is_local_name_bytes(name.as_ref(), b"b") {
            font.bold = XmlUtil::flag_value(e, decoder)?;
        } else if XmlUtil::is_local_name_bytes(name.as_ref(), b"i") {
            font.italic = XmlUtil::flag_value(e, decoder)?;
        } else if XmlUtil::is_local_name_bytes(name.as_ref(), b"color") {
            if let Some(rgb) = XmlUtil::attr_value(e, b"rgb", decoder)? {
                font.color = Some(FontColor::Rgb(rgb.to_ascii_uppercase()));
            } else if let Some(theme) = XmlUtil::attr_value(e, b"theme", decoder)? {
                font.color = theme.parse().ok().map(FontColor::Theme);
            }
        }
        Ok(())
    }

    /// Style of cell format `xf`; unknown indexes give the default style.
    pub fn cell_style(&self, xf: usize) -> CellStyle {
        let Some(entry) = self.cell_xfs.get(xf) else {
            return CellStyle::default();
        };
        let number_format = match entry.num_fmt_id {
            0 => None,
            id => self
                .num_fmts
                .get(&id)
                .cloned()
                .or_else(|| builtin_format(id).map(str::to_string)),
        };
        CellStyle {
            number_format,
            font: self.fonts.get(entry.font_id).cloned().unwrap_or_default(),
        }
    }
}

/// Distinct cell styles collected while rendering worksheets.
///
/// Index 0 is always the default style.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: Vec<CellStyle>,
    index: HashMap<CellStyle, u32>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    pub fn new() -> Self {
        let default = CellStyle::default();
        Self {
            styles: vec![default.clone()],
            index: HashMap::from([(default, 0)]),
        }
    }

    pub fn index_of(&mut self, style: &CellStyle) -> u32 {
        if let Some(&index) = self.index.get(style) {
            return index;
        }
        let index = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.index.insert(style.clone(), index);
        index
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn render(&self) -> Result<String, MdnError> {
        let mut custom_formats: Vec<(u32, &str)> = Vec::new();
        let mut fonts: Vec<&FontStyle> = Vec::new();
        let mut xfs: Vec<(u32, usize)> = Vec::new();

        for style in &self.styles {
            let num_fmt_id = match style.number_format.as_deref() {
                None => 0,
                Some(code) => match builtin_format_id(code) {
                    Some(id) => id,
                    None => match custom_formats.iter().find(|(_, c)| *c == code) {
                        Some((id, _)) => *id,
                        None => {
                            let id = FIRST_CUSTOM_FORMAT_ID + custom_formats.len() as u32;
                            custom_formats.push((id, code));
                            id
                        }
                    },
                },
            };
            let font_id = match fonts.iter().position(|f| **f == style.font) {
                Some(pos) => pos,
                None => {
                    fonts.push(&style.font);
                    fonts.len() - 1
                }
            };
            xfs.push((num_fmt_id, font_id));
        }

        let mut writer = XmlUtil::writer_with_decl()?;
        let mut root = BytesStart::new("styleSheet");
        root.push_attribute(("xmlns", MAIN_NS));
        writer.write_event(Event::Start(root))?;

        if !custom_formats.is_empty() {
            let count = custom_formats.len().to_string();
            let mut num_fmts = BytesStart::new("numFmts");
            num_fmts.push_attribute(("count", count.as_str()));
            writer.write_event(Event::Start(num_fmts))?;
            for (id, code) in &custom_formats {
                let id = id.to_string();
                let mut num_fmt = BytesStart::new("numFmt");
                num_fmt.push_attribute(("numFmtId", id.as_str()));
                num_fmt.push_attribute(("formatCode", *code));
                writer.write_event(Event::Empty(num_fmt))?;
            }
            writer.write_event(Event::End(BytesEnd::new("numFmts")))?;
        }

        let count = fonts.len().to_string();
        let mut fonts_tag = BytesStart::new("fonts");
        fonts_tag.push_attribute(("count", count.as_str()));
        writer.write_event(Event::Start(fonts_tag))?;
        for font in &fonts {
            Self::write_font(&mut writer, font)?;
        }
        writer.write_event(Event::End(BytesEnd::new("fonts")))?;

        Self::write_fixed_parts(&mut writer)?;

        let count = xfs.len().to_string();
        let mut cell_xfs = BytesStart::new("cellXfs");
        cell_xfs.push_attribute(("count", count.as_str()));
        writer.write_event(Event::Start(cell_xfs))?;
        for (num_fmt_id, font_id) in &xfs {
            let num_fmt_id = num_fmt_id.to_string();
            let font_id = font_id.to_string();
            let mut xf = BytesStart::new("xf");
            xf.push_attribute(("numFmtId", num_fmt_id.as_str()));
            xf.push_attribute(("fontId", font_id.as_str()));
            xf.push_attribute(("fillId", "0"));
            xf.push_attribute(("borderId", "0"));
            xf.push_attribute(("xfId", "0"));
            if num_fmt_id != "0" {
                xf.push_attribute(("applyNumberFormat", "1"));
            }
            if font_id != "0" {
                xf.push_attribute(("applyFont", "1"));
            }
            writer.write_event(Event::Empty(xf))?;
        }
        writer.write_event(Event::End(BytesEnd::new("cellXfs")))?;

        let mut cell_styles = BytesStart::new("cellStyles");
        cell_styles.push_attribute(("count", "1"));
        writer.write_event(Event::Start(cell_styles))?;
        let mut normal = BytesStart::new("cellStyle");
        normal.push_attribute(("name", "Normal"));
        normal.push_attribute(("xfId", "0"));
        normal.push_attribute(("builtinId", "0"));
        writer.write_event(Event::Empty(normal))?;
        writer.write_event(Event::End(BytesEnd::new("cellStyles")))?;

        writer.write_event(Event::End(BytesEnd::new("styleSheet")))?;
        XmlUtil::finish(writer)
    }

    fn write_font(writer: &mut XmlWriter, font: &FontStyle) -> Result<(), MdnError> {
        writer.write_event(Event::Start(BytesStart::new("font")))?;
        if font.bold {
            writer.write_event(Event::Empty(BytesStart::new("b")))?;
        }
        if font.italic {
            writer.write_event(Event::Empty(BytesStart::new("i")))?;
        }
        let mut size = BytesStart::new("sz");
        size.push_attribute(("val", "11"));
        writer.write_event(Event::Empty(size))?;

        let mut color = BytesStart::new("color");
        match &font.color {
            Some(FontColor::Rgb(argb)) => color.push_attribute(("rgb", argb.as_str())),
            Some(FontColor::Theme(theme)) => {
                color.push_attribute(("theme", theme.to_string().as_str()))
            }
            None => color.push_attribute(("theme", DEFAULT_TEXT_THEME)),
        }
        writer.write_event(Event::Empty(color))?;

        let mut name = BytesStart::new("name");
        name.push_attribute(("val", "Calibri"));
        writer.write_event(Event::Empty(name))?;
        let mut family = BytesStart::new("family");
        family.push_attribute(("val", "2"));
        writer.write_event(Event::Empty(family))?;
        let mut scheme = BytesStart::new("scheme");
        scheme.push_attribute(("val", "minor"));
        writer.write_event(Event::Empty(scheme))?;

        writer.write_event(Event::End(BytesEnd::new("font")))?;
        Ok(())
    }

    // Fills, borders and the base cell style never vary.
    fn write_fixed_parts(writer: &mut XmlWriter) -> Result<(), MdnError> {
        let mut fills = BytesStart::new("fills");
        fills.push_attribute(("count", "2"));
        writer.write_event(Event::Start(fills))?;
        for pattern in ["none", "gray125"] {
            writer.write_event(Event::Start(BytesStart::new("fill")))?;
            let mut fill = BytesStart::new("patternFill");
            fill.push_attribute(("patternType", pattern));
            writer.write_event(Event::Empty(fill))?;
            writer.write_event(Event::End(BytesEnd::new("fill")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("fills")))?;

        let mut borders = BytesStart::new("borders");
        borders.push_attribute(("count", "1"));
        writer.write_event(Event::Start(borders))?;
        writer.write_event(Event::Start(BytesStart::new("border")))?;
        for side in ["left", "right", "top", "bottom", "diagonal"] {
            writer.write_event(Event::Empty(BytesStart::new(side)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("border")))?;
        writer.write_event(Event::End(BytesEnd::new("borders")))?;

        let mut base = BytesStart::new("cellStyleXfs");
        base.push_attribute(("count", "1"));
        writer.write_event(Event::Start(base))?;
        let mut xf = BytesStart::new("xf");
        xf.push_attribute(("numFmtId", "0"));
        xf.push_attribute(("fontId", "0"));
        xf.push_attribute(("fillId", "0"));
        xf.push_attribute(("borderId", "0"));
        writer.write_event(Event::Empty(xf))?;
        writer.write_event(Event::End(BytesEnd::new("cellStyleXfs")))?;
        Ok(())
    }
}
