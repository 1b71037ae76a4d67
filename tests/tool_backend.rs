//! Drives the real subprocess backend with `sh` standing in for the
//! converters, so the argument templates and file plumbing are exercised
//! end to end.

mod common;

use common::{config_with_work_dir, dir_is_empty, write_png, write_text_pdf, zip_entry_names};
use docshift::config::{Config, ToolSpec};
use docshift::{ConversionKind, ConversionRequest, Registry};
use std::collections::BTreeMap;
use std::path::Path;

fn sh(script: &str, args: &[&str]) -> ToolSpec {
    let mut all = vec!["-c".to_string(), script.to_string()];
    all.extend(args.iter().map(|a| a.to_string()));
    ToolSpec {
        program: "sh".into(),
        args: all,
        timeout_seconds: 0,
        env: BTreeMap::new(),
    }
}

fn setup(dir: &Path) -> (Config, std::path::PathBuf, std::path::PathBuf) {
    let work = dir.join("work");
    std::fs::create_dir_all(&work).unwrap();
    let pdf = dir.join("doc.pdf");
    write_text_pdf(&pdf, "hello");
    let png = dir.join("fixture.png");
    write_png(&png, 16, 12);
    (config_with_work_dir(&work), pdf, png)
}

#[test]
fn pdf2ppt_via_shell_rasterizer() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cfg, pdf, png) = setup(dir.path());
    let script = format!("cp '{}' \"$0-1.png\" && cp '{}' \"$0-2.png\"", png.display(), png.display());
    cfg.tools.pdftoppm = sh(&script, &["{output}", "{dpi}", "{format}", "{input}"]);

    let out = dir.path().join("deck.pptx");
    let reg = Registry::from_config(&cfg);
    reg.convert(&ConversionRequest::new(ConversionKind::Pdf2Ppt, &pdf, &out))
        .unwrap();

    let names = zip_entry_names(&out);
    assert!(names.contains(&"ppt/slides/slide2.xml".to_string()));
    assert!(dir_is_empty(&dir.path().join("work")));
}

#[test]
fn pdf2ppt_shell_failure_cleans_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cfg, pdf, png) = setup(dir.path());
    let script = format!("cp '{}' \"$0-1.png\"; echo 'bad pdf' >&2; exit 2", png.display());
    cfg.tools.pdftoppm = sh(&script, &["{output}"]);

    let out = dir.path().join("deck.pptx");
    let res = Registry::from_config(&cfg)
        .execute(&ConversionRequest::new(ConversionKind::Pdf2Ppt, &pdf, &out));

    assert!(!res.ok);
    let msg = res.error.unwrap();
    assert!(msg.contains("pdftoppm failed"), "{msg}");
    assert!(msg.contains("bad pdf"), "{msg}");
    assert!(dir_is_empty(&dir.path().join("work")));
    assert!(!out.exists());
}

#[test]
fn pdf2excel_reads_extractor_stdout_with_one_based_page() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cfg, pdf, _) = setup(dir.path());
    cfg.tools.tabula = sh(
        "test \"$0\" = 2 || exit 9; printf 'a,b\\n1,2\\n'",
        &["{page}", "{input}"],
    );

    let out = dir.path().join("t.xlsx");
    Registry::from_config(&cfg)
        .convert(&ConversionRequest::new(ConversionKind::Pdf2Excel, &pdf, &out).with_page(1))
        .unwrap();
    assert!(zip_entry_names(&out).contains(&"xl/worksheets/sheet1.xml".to_string()));
}

#[test]
fn img2txt_captures_ocr_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cfg, _, png) = setup(dir.path());
    cfg.tools.tesseract = sh("printf 'text from %s' \"$(basename \"$0\")\"", &["{input}"]);

    let out = dir.path().join("ocr.txt");
    Registry::from_config(&cfg)
        .convert(&ConversionRequest::new(ConversionKind::Img2Txt, &png, &out))
        .unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "text from fixture.png");
}

#[test]
fn pdf2cad_passes_format_through() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cfg, pdf, _) = setup(dir.path());
    cfg.tools.inkscape = sh("printf '%s' \"$1\" > \"$0\"", &["{output}", "{format}"]);

    let out = dir.path().join("plan.svg");
    Registry::from_config(&cfg)
        .convert(&ConversionRequest::new(ConversionKind::Pdf2Cad, &pdf, &out).with_format("svg"))
        .unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "svg");
}

#[test]
fn unavailable_tool_is_reported_and_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cfg, pdf, _) = setup(dir.path());
    cfg.tools.pdf2docx.program = "no-such-converter-1234".into();

    let out = dir.path().join("doc.docx");
    let res = Registry::from_config(&cfg)
        .execute(&ConversionRequest::new(ConversionKind::Pdf2Word, &pdf, &out));
    assert!(!res.ok);
    assert!(res.error.unwrap().contains("external tool not found"));
    assert!(!out.exists());
}
