//! Minimal OOXML workbook writer: one sheet of inline-string cells.

use std::fmt::Display;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ColumnWidthPolicy;
use crate::error::StmtError;
use crate::model::ExtractionResult;
use crate::sink::{column_widths, sheet_rows, SheetRow, TableSink};

pub const SHEET_NAME: &str = "Transactions";

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Style index of the bold header format in `xl/styles.xml`.
const HEADER_STYLE: &str = "1";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Writes the result to an `.xlsx` file at `path`.
pub struct XlsxSink {
    path: PathBuf,
    widths: ColumnWidthPolicy,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>, widths: ColumnWidthPolicy) -> Self {
        XlsxSink {
            path: path.into(),
            widths,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSink for XlsxSink {
    fn write(&mut self, result: &ExtractionResult) -> Result<(), StmtError> {
        let file = std::fs::File::create(&self.path)
            .map_err(|e| StmtError::SinkWrite(format!("{}: {e}", self.path.display())))?;
        write_xlsx(result, &self.widths, file)
    }
}

/// Build the workbook in memory.
pub fn write_xlsx_to_vec(
    result: &ExtractionResult,
    widths: &ColumnWidthPolicy,
) -> Result<Vec<u8>, StmtError> {
    let mut cursor = Cursor::new(Vec::new());
    write_xlsx(result, widths, &mut cursor)?;
    Ok(cursor.into_inner())
}

fn write_xlsx<W: Write + Seek>(
    result: &ExtractionResult,
    widths: &ColumnWidthPolicy,
    out: W,
) -> Result<(), StmtError> {
    let rows = sheet_rows(result);
    let sheet = worksheet_xml(&rows, &column_widths(&rows, widths))?;

    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let workbook = workbook_xml();
    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", workbook.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/styles.xml", STYLES_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", &sheet),
    ];
    for (name, bytes) in parts {
        zip.start_file(name, options).map_err(sink_err)?;
        zip.write_all(bytes).map_err(sink_err)?;
    }
    zip.finish().map_err(sink_err)?;
    Ok(())
}

fn sink_err<E: Display>(e: E) -> StmtError {
    StmtError::SinkWrite(e.to_string())
}

fn workbook_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<workbook xmlns="{ns}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{name}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        ),
        ns = MAIN_NS,
        name = SHEET_NAME
    )
}

fn worksheet_xml(rows: &[SheetRow], widths: &[f64]) -> Result<Vec<u8>, StmtError> {
    let mut xml = Writer::new(Vec::new());
    let w = &mut xml;

    emit(w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    emit(w, Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", MAIN_NS)]),
    ))?;

    if !widths.is_empty() {
        emit(w, Event::Start(BytesStart::new("cols")))?;
        for (i, width) in widths.iter().enumerate() {
            let index = (i + 1).to_string();
            let width = format!("{width:.2}");
            emit(w, Event::Empty(BytesStart::new("col").with_attributes([
                ("min", index.as_str()),
                ("max", index.as_str()),
                ("width", width.as_str()),
                ("customWidth", "1"),
            ])))?;
        }
        emit(w, Event::End(BytesEnd::new("cols")))?;
    }

    emit(w, Event::Start(BytesStart::new("sheetData")))?;
    for (r, row) in rows.iter().enumerate() {
        if row.is_separator() {
            continue;
        }
        let row_ref = (r + 1).to_string();
        emit(w, Event::Start(
            BytesStart::new("row").with_attributes([("r", row_ref.as_str())]),
        ))?;
        for (c, value) in row.cells.iter().enumerate() {
            let text = xml_safe(value);
            if text.is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", column_name(c), row_ref);
            let mut cell = BytesStart::new("c")
                .with_attributes([("r", cell_ref.as_str()), ("t", "inlineStr")]);
            if row.is_header {
                cell.push_attribute(("s", HEADER_STYLE));
            }
            emit(w, Event::Start(cell))?;
            emit(w, Event::Start(BytesStart::new("is")))?;
            emit(w, Event::Start(
                BytesStart::new("t").with_attributes([("xml:space", "preserve")]),
            ))?;
            emit(w, Event::Text(BytesText::new(&text)))?;
            emit(w, Event::End(BytesEnd::new("t")))?;
            emit(w, Event::End(BytesEnd::new("is")))?;
            emit(w, Event::End(BytesEnd::new("c")))?;
        }
        emit(w, Event::End(BytesEnd::new("row")))?;
    }
    emit(w, Event::End(BytesEnd::new("sheetData")))?;
    emit(w, Event::End(BytesEnd::new("worksheet")))?;

    Ok(xml.into_inner())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), StmtError> {
    writer.write_event(event).map_err(sink_err)
}

/// Spreadsheet column letters for a 0-based index: A..Z, AA..
fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Drop characters XML 1.0 cannot carry.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}
