use super::{content_types, relationships, Package, Rel};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_MASTER: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_LAYOUT: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

/// Default 4:3 slide, 10in x 7.5in in EMU.
pub const SLIDE_WIDTH_EMU: u64 = 9_144_000;
pub const SLIDE_HEIGHT_EMU: u64 = 6_858_000;

/// Writes a presentation with one blank slide per image, each image
/// stretched over the whole slide.
pub fn write_image_deck(output: &Path, images: &[PathBuf]) -> Result<()> {
    if images.is_empty() {
        return Err(anyhow!("no slide images to assemble"));
    }

    let mut media = Vec::with_capacity(images.len());
    for (i, path) in images.iter().enumerate() {
        let ext = media_extension(path)?;
        let bytes =
            std::fs::read(path).with_context(|| format!("read slide image: {}", path.display()))?;
        media.push((format!("image{}.{ext}", i + 1), bytes));
    }

    let mut pkg = Package::create(output)?;

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_LAYOUT),
        ("/ppt/theme/theme1.xml".to_string(), CT_THEME),
    ];
    for n in 1..=media.len() {
        overrides.push((format!("/ppt/slides/slide{n}.xml"), CT_SLIDE));
    }
    pkg.xml(
        "[Content_Types].xml",
        &content_types(
            &[
                ("rels", "application/vnd.openxmlformats-package.relationships+xml"),
                ("xml", "application/xml"),
                ("png", "image/png"),
                ("jpeg", "image/jpeg"),
                ("jpg", "image/jpeg"),
            ],
            &overrides,
        ),
    )?;

    pkg.xml(
        "_rels/.rels",
        &relationships(&[Rel {
            id: "rId1".into(),
            rel_type: "officeDocument",
            target: "ppt/presentation.xml".into(),
        }]),
    )?;

    pkg.xml("ppt/presentation.xml", &presentation_xml(media.len()))?;
    let mut pres_rels = vec![
        Rel {
            id: "rId1".into(),
            rel_type: "slideMaster",
            target: "slideMasters/slideMaster1.xml".into(),
        },
        Rel {
            id: "rId2".into(),
            rel_type: "theme",
            target: "theme/theme1.xml".into(),
        },
    ];
    for n in 1..=media.len() {
        pres_rels.push(Rel {
            id: format!("rId{}", n + 2),
            rel_type: "slide",
            target: format!("slides/slide{n}.xml"),
        });
    }
    pkg.xml("ppt/_rels/presentation.xml.rels", &relationships(&pres_rels))?;

    pkg.xml("ppt/slideMasters/slideMaster1.xml", &master_xml())?;
    pkg.xml(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &relationships(&[
            Rel {
                id: "rId1".into(),
                rel_type: "slideLayout",
                target: "../slideLayouts/slideLayout1.xml".into(),
            },
            Rel {
                id: "rId2".into(),
                rel_type: "theme",
                target: "../theme/theme1.xml".into(),
            },
        ]),
    )?;
    pkg.xml("ppt/slideLayouts/slideLayout1.xml", &layout_xml())?;
    pkg.xml(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &relationships(&[Rel {
            id: "rId1".into(),
            rel_type: "slideMaster",
            target: "../slideMasters/slideMaster1.xml".into(),
        }]),
    )?;
    pkg.xml("ppt/theme/theme1.xml", THEME_XML)?;

    for (i, (name, bytes)) in media.iter().enumerate() {
        let n = i + 1;
        pkg.part(&format!("ppt/media/{name}"), bytes)?;
        pkg.xml(&format!("ppt/slides/slide{n}.xml"), &slide_xml(n))?;
        pkg.xml(
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            &relationships(&[
                Rel {
                    id: "rId1".into(),
                    rel_type: "slideLayout",
                    target: "../slideLayouts/slideLayout1.xml".into(),
                },
                Rel {
                    id: "rId2".into(),
                    rel_type: "image",
                    target: format!("../media/{name}"),
                },
            ]),
        )?;
    }

    pkg.finish()?;
    debug!("pptx slides={} out={}", media.len(), output.display());
    Ok(())
}

fn media_extension(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("png"),
        "jpg" | "jpeg" => Ok("jpeg"),
        _ => Err(anyhow!("unsupported slide image: {}", path.display())),
    }
}

fn presentation_xml(slides: usize) -> String {
    let mut ids = String::new();
    for n in 1..=slides {
        ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            255 + n,
            n + 2
        ));
    }
    format!(
        r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{SLIDE_WIDTH_EMU}" cy="{SLIDE_HEIGHT_EMU}" type="screen4x3"/><p:notesSz cx="{SLIDE_HEIGHT_EMU}" cy="{SLIDE_WIDTH_EMU}"/></p:presentation>"#
    )
}

const EMPTY_TREE: &str = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree>"#;

fn master_xml() -> String {
    format!(
        r#"<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>{EMPTY_TREE}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn layout_xml() -> String {
    format!(
        r#"<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank">{EMPTY_TREE}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

fn slide_xml(n: usize) -> String {
    format!(
        r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:pic><p:nvPicPr><p:cNvPr id="2" name="Page {n}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{SLIDE_WIDTH_EMU}" cy="{SLIDE_HEIGHT_EMU}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

const THEME_XML: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;
