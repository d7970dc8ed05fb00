//! Word document export: a title paragraph, a unit line, the data table and
//! a source line, packaged as a minimal `.docx` archive.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ExportError;
use super::svg::escape_xml;
use crate::i18n::{self, Language};
use crate::views::AccessibleTable;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    "</Types>",
);

const RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    "</Relationships>",
);

const DOCUMENT_HEAD: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
);

const DOCUMENT_TAIL: &str = "<w:sectPr/></w:body></w:document>";

const BORDERS: &str = concat!(
    "<w:tblBorders>",
    r#"<w:top w:val="single" w:sz="4" w:color="999999"/>"#,
    r#"<w:left w:val="single" w:sz="4" w:color="999999"/>"#,
    r#"<w:bottom w:val="single" w:sz="4" w:color="999999"/>"#,
    r#"<w:right w:val="single" w:sz="4" w:color="999999"/>"#,
    r#"<w:insideH w:val="single" w:sz="4" w:color="999999"/>"#,
    r#"<w:insideV w:val="single" w:sz="4" w:color="999999"/>"#,
    "</w:tblBorders>",
);

/// Half-points.
const TITLE_SIZE: u32 = 32;

fn run(out: &mut String, text: &str, bold: bool, size: Option<u32>) {
    out.push_str("<w:r>");
    if bold || size.is_some() {
        out.push_str("<w:rPr>");
        if bold {
            out.push_str("<w:b/>");
        }
        if let Some(sz) = size {
            out.push_str(&format!(r#"<w:sz w:val="{sz}"/>"#));
        }
        out.push_str("</w:rPr>");
    }
    out.push_str(&format!(r#"<w:t xml:space="preserve">{}</w:t></w:r>"#, escape_xml(text)));
}

fn paragraph(out: &mut String, text: &str, bold: bool, size: Option<u32>) {
    out.push_str("<w:p>");
    run(out, text, bold, size);
    out.push_str("</w:p>");
}

fn cell(out: &mut String, text: &str, bold: bool) {
    out.push_str("<w:tc><w:p>");
    run(out, text, bold, None);
    out.push_str("</w:p></w:tc>");
}

/// The `.docx` bytes for `table`.
pub fn table_to_document(table: &AccessibleTable, lang: Language) -> Result<Vec<u8>, ExportError> {
    if table.is_empty() {
        return Err(ExportError::MissingTable);
    }
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", RELATIONSHIPS.to_string()),
        ("word/document.xml", document_xml(table, lang)),
    ];
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

fn document_xml(table: &AccessibleTable, lang: Language) -> String {
    let mut out = String::with_capacity(2048 + table.rows.len() * table.column_count() * 96);
    out.push_str(DOCUMENT_HEAD);

    paragraph(&mut out, &table.caption, true, Some(TITLE_SIZE));
    paragraph(&mut out, &table.unit_label, false, None);

    out.push_str(r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/>"#);
    out.push_str(BORDERS);
    out.push_str("</w:tblPr>");

    // Header row repeats on every printed page.
    out.push_str("<w:tr><w:trPr><w:tblHeader/></w:trPr>");
    for h in &table.headers {
        cell(&mut out, h, true);
    }
    out.push_str("</w:tr>");

    for row in &table.rows {
        out.push_str("<w:tr>");
        cell(&mut out, &row.year.to_string(), true);
        for c in &row.cells {
            cell(&mut out, &c.text, false);
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");

    paragraph(&mut out, i18n::text("export.source", lang), false, None);
    out.push_str(DOCUMENT_TAIL);
    out
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::catalog::PAGE_24;
    use crate::model::{Dataset, TotalPolicy, YearRecord};

    fn table(lang: Language) -> AccessibleTable {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2021).with("oil_gas", 10.0),
            YearRecord::new(2022).with("oil_gas", 12.0).with("other", 1.0),
        ]);
        AccessibleTable::build(&PAGE_24, &ds, lang, TotalPolicy::PreferProvided)
    }

    fn part(docx: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut text = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn packages_a_word_archive() {
        let docx = table_to_document(&table(Language::En), Language::En).unwrap();
        assert!(docx.starts_with(b"PK"));
        let archive = zip::ZipArchive::new(Cursor::new(&docx[..])).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in ["[Content_Types].xml", "_rels/.rels", "word/document.xml"] {
            assert!(names.contains(&expected), "{expected} missing from {names:?}");
        }
        assert!(part(&docx, "[Content_Types].xml").contains(r#"PartName="/word/document.xml""#));
        assert!(part(&docx, "_rels/.rels").contains(r#"Target="word/document.xml""#));
    }

    #[test]
    fn has_title_and_table() {
        let docx = table_to_document(&table(Language::En), Language::En).unwrap();
        let doc = part(&docx, "word/document.xml");
        assert!(doc.starts_with("<?xml"));
        assert!(doc.ends_with("</w:document>"));
        assert!(doc.contains(r#"<w:t xml:space="preserve">Capital expenditures</w:t>"#));
        // Header row plus two data rows.
        assert_eq!(doc.matches("<w:tr>").count(), 3);
        assert_eq!(doc.matches("<w:tc>").count(), 3 * 5);
        assert!(doc.contains("Source: Statistics Canada"));
    }

    #[test]
    fn french_document() {
        let docx = table_to_document(&table(Language::Fr), Language::Fr).unwrap();
        let doc = part(&docx, "word/document.xml");
        assert!(doc.contains("Dépenses en immobilisations"));
        assert!(doc.contains("Aucune donnée"));
    }

    #[test]
    fn escapes_markup_in_text() {
        let mut t = table(Language::En);
        t.caption = "Oil & gas <2022>".into();
        let docx = table_to_document(&t, Language::En).unwrap();
        assert!(part(&docx, "word/document.xml").contains("Oil &amp; gas &lt;2022&gt;"));
    }

    #[test]
    fn empty_table_writes_nothing() {
        let t = AccessibleTable::build(&PAGE_24, &Dataset::default(), Language::En, TotalPolicy::PreferProvided);
        assert!(matches!(table_to_document(&t, Language::En), Err(ExportError::MissingTable)));
    }
}
