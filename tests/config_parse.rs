use docshift::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../docshift.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.tools.pdftoppm.program, "pdftoppm");
    assert_eq!(cfg.tools.inkscape.timeout_seconds, 0);
    assert!(cfg.tools.tesseract.env.is_empty());
    assert!(cfg.paths.work_dir.is_empty());
}

#[test]
fn partial_config_keeps_defaults() {
    let cfg: Config = toml::from_str(
        r#"
        [output]
        locale = "zh"

        [tools.tesseract]
        program = "/opt/ocr/bin/tesseract"
        "#,
    )
    .expect("parse TOML");
    assert_eq!(cfg.output.locale, "zh");
    assert_eq!(cfg.tools.tesseract.program, "/opt/ocr/bin/tesseract");
    assert_eq!(cfg.tools.tesseract.args, ["{input}", "stdout"]);
    assert_eq!(cfg.tools.pdf2docx.program, "pdf2docx");
    assert_eq!(cfg.logging.level, "warn");
}

#[test]
fn env_only_tool_section_keeps_program_and_args() {
    let cfg: Config = toml::from_str(
        r#"
        [tools.tesseract.env]
        OMP_THREAD_LIMIT = "1"

        [tools.inkscape]
        timeout_seconds = 300
        "#,
    )
    .expect("parse TOML");
    assert_eq!(cfg.tools.tesseract.program, "tesseract");
    assert_eq!(cfg.tools.tesseract.args, ["{input}", "stdout"]);
    assert_eq!(
        cfg.tools.tesseract.env.get("OMP_THREAD_LIMIT").map(String::as_str),
        Some("1")
    );
    assert_eq!(cfg.tools.inkscape.program, "inkscape");
    assert_eq!(cfg.tools.inkscape.timeout_seconds, 300);
    assert_eq!(cfg.tools.inkscape.args.len(), 3);
}

#[test]
fn explicit_args_replace_the_builtin_template() {
    let cfg: Config = toml::from_str(
        r#"
        [tools.pdf2docx]
        args = ["{input}", "{output}"]
        "#,
    )
    .expect("parse TOML");
    assert_eq!(cfg.tools.pdf2docx.program, "pdf2docx");
    assert_eq!(cfg.tools.pdf2docx.args, ["{input}", "{output}"]);
}

#[test]
fn empty_work_dir_means_system_temp() {
    let cfg = Config::default();
    assert_eq!(cfg.work_dir(), std::env::temp_dir());
}
