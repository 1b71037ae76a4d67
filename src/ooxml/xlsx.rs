use super::{content_types, escape, relationships, Package, Rel};
use anyhow::Result;
use std::path::Path;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_SHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

const STYLES_XML: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs></styleSheet>"#;

/// Writes `rows` to a single-sheet workbook. Cells that parse as finite
/// numbers are stored as numbers, everything else as inline strings.
pub fn write_workbook(output: &Path, sheet_name: &str, rows: &[Vec<String>]) -> Result<()> {
    let mut pkg = Package::create(output)?;

    pkg.xml(
        "[Content_Types].xml",
        &content_types(
            &[
                ("rels", "application/vnd.openxmlformats-package.relationships+xml"),
                ("xml", "application/xml"),
            ],
            &[
                ("/xl/workbook.xml".to_string(), CT_WORKBOOK),
                ("/xl/worksheets/sheet1.xml".to_string(), CT_SHEET),
                ("/xl/styles.xml".to_string(), CT_STYLES),
            ],
        ),
    )?;
    pkg.xml(
        "_rels/.rels",
        &relationships(&[Rel {
            id: "rId1".into(),
            rel_type: "officeDocument",
            target: "xl/workbook.xml".into(),
        }]),
    )?;
    pkg.xml(
        "xl/workbook.xml",
        &format!(
            r#"<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_R}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            escape(sheet_name)
        ),
    )?;
    pkg.xml(
        "xl/_rels/workbook.xml.rels",
        &relationships(&[
            Rel {
                id: "rId1".into(),
                rel_type: "worksheet",
                target: "worksheets/sheet1.xml".into(),
            },
            Rel {
                id: "rId2".into(),
                rel_type: "styles",
                target: "styles.xml".into(),
            },
        ]),
    )?;
    pkg.xml("xl/styles.xml", STYLES_XML)?;
    pkg.xml("xl/worksheets/sheet1.xml", &sheet_xml(rows))?;
    pkg.finish()
}

fn sheet_xml(rows: &[Vec<String>]) -> String {
    let mut out = format!(r#"<worksheet xmlns="{NS_MAIN}"><sheetData>"#);
    for (r, row) in rows.iter().enumerate() {
        let rn = r + 1;
        out.push_str(&format!(r#"<row r="{rn}">"#));
        for (c, value) in row.iter().enumerate() {
            let cell = format!("{}{rn}", column_name(c));
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => {
                    out.push_str(&format!(r#"<c r="{cell}"><v>{trimmed}</v></c>"#));
                }
                _ => {
                    out.push_str(&format!(
                        r#"<c r="{cell}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        escape(value)
                    ));
                }
            }
        }
        out.push_str("</row>");
    }
    out.push_str("</sheetData></worksheet>");
    out
}

/// Zero-based column index to a spreadsheet column name (0 -> A, 26 -> AA).
pub fn column_name(mut idx: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn numeric_and_text_cells() {
        let xml = sheet_xml(&[vec!["name".into(), "qty".into()], vec!["a&b".into(), " 3.5".into()]]);
        assert!(xml.contains(r#"<c r="A1" t="inlineStr">"#));
        assert!(xml.contains("a&amp;b"));
        assert!(xml.contains(r#"<c r="B2"><v>3.5</v></c>"#));
    }
}
