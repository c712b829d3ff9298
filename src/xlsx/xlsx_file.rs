use crate::common::errors::MdnError;
use crate::sheet::sheet_model::{Sheet, Workbook};
use crate::xlsx::package_xml::{
    PackageXml, CONTENT_TYPES_PART, ROOT_RELS_PART, SHARED_STRINGS_PART, STYLES_PART,
    WORKBOOK_PART, WORKBOOK_RELS_PART,
};
use crate::xlsx::shared_strings::SharedStrings;
use crate::xlsx::styles_xml::{StyleRegistry, StyleSheet};
use crate::xlsx::worksheet_xml::WorksheetXml;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DEFAULT_SHEET_NAME: &str = "Sheet1";

pub struct XlsxFile;

impl XlsxFile {
    pub fn read_workbook(path: &Path) -> Result<Workbook, MdnError> {
        let file = File::open(path)?;
        let mut zip = ZipArchive::new(file)
            .map_err(|e| MdnError::InvalidXlsxFormat(format!("not a zip package: {e}")))?;

        let workbook_xml = Self::read_part(&mut zip, WORKBOOK_PART)?
            .ok_or_else(|| MdnError::InvalidXlsxFormat(format!("missing {WORKBOOK_PART}")))?;
        let entries = PackageXml::parse_workbook_xml(&workbook_xml)?;
        let targets = match Self::read_part(&mut zip, WORKBOOK_RELS_PART)? {
            Some(rels) => PackageXml::parse_rels(&rels)?,
            None => Default::default(),
        };
        let shared_strings = match Self::read_part(&mut zip, SHARED_STRINGS_PART)? {
            Some(content) => SharedStrings::parse(&content)?,
            None => Vec::new(),
        };
        let styles = match Self::read_part(&mut zip, STYLES_PART)? {
            Some(content) => StyleSheet::parse(&content)?,
            None => StyleSheet::default(),
        };

        let mut workbook = Workbook::new();
        for (index, entry) in entries.iter().enumerate() {
            // Packages without rels fall back to the conventional part names.
            let part = targets
                .get(&entry.rel_id)
                .cloned()
                .unwrap_or_else(|| PackageXml::worksheet_part(index));
            let sheet = match Self::read_part(&mut zip, &part)? {
                Some(content) => {
                    WorksheetXml::parse(&content, &entry.name, &shared_strings, &styles)?
                }
                None => {
                    return Err(MdnError::InvalidXlsxFormat(format!(
                        "missing worksheet part {part} for sheet '{}'",
                        entry.name
                    )))
                }
            };
            debug!(sheet = %sheet.name, dims = ?sheet.dimensions(), "read worksheet");
            workbook.sheets.push(sheet);
        }
        Ok(workbook)
    }

    pub fn write_workbook(path: &Path, workbook: &Workbook) -> Result<(), MdnError> {
        let placeholder;
        let sheets: &[Sheet] = if workbook.sheets.is_empty() {
            placeholder = [Sheet::new(DEFAULT_SHEET_NAME.to_string())];
            &placeholder
        } else {
            &workbook.sheets
        };

        let mut registry = StyleRegistry::new();
        let mut worksheets = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            worksheets.push(WorksheetXml::render(sheet, &mut registry)?);
        }
        let names: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();

        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(CONTENT_TYPES_PART, deflated)?;
        zip.write_all(PackageXml::content_types_xml(sheets.len()).as_bytes())?;

        zip.start_file(ROOT_RELS_PART, deflated)?;
        zip.write_all(PackageXml::root_rels_xml().as_bytes())?;

        zip.start_file(WORKBOOK_PART, deflated)?;
        zip.write_all(PackageXml::render_workbook_xml(&names)?.as_bytes())?;

        zip.start_file(WORKBOOK_RELS_PART, deflated)?;
        zip.write_all(PackageXml::workbook_rels_xml(sheets.len()).as_bytes())?;

        zip.start_file(STYLES_PART, deflated)?;
        zip.write_all(registry.render()?.as_bytes())?;

        for (index, content) in worksheets.iter().enumerate() {
            zip.start_file(PackageXml::worksheet_part(index), deflated)?;
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()?;
        debug!(path = %path.display(), sheets = sheets.len(), styles = registry.len(), "wrote workbook");
        Ok(())
    }

    fn read_part<R: Read + Seek>(
        zip: &mut ZipArchive<R>,
        name: &str,
    ) -> Result<Option<String>, MdnError> {
        let mut file = match zip.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(Some(content))
    }
}
