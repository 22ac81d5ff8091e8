//! Package-level parts: content types, relationships, presentation, master,
//! layouts and theme.

use super::xml::{self, NS_A, NS_P, NS_R};
use anyhow::Result;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_CORE: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

/// Slide width for a 4:3 deck (10in).
pub const SLIDE_WIDTH: i64 = 9_144_000;
/// Slide height for a 4:3 deck (7.5in).
pub const SLIDE_HEIGHT: i64 = 6_858_000;

pub const TITLE_LAYOUT: &str = "ppt/slideLayouts/slideLayout1.xml";
pub const CONTENT_LAYOUT: &str = "ppt/slideLayouts/slideLayout2.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub kind: &'static str,
    pub target: String,
}

impl Relationship {
    pub fn new(id: impl Into<String>, kind: &'static str, target: impl Into<String>) -> Self {
        Relationship {
            id: id.into(),
            kind,
            target: target.into(),
        }
    }
}

pub fn relationships(rels: &[Relationship]) -> Result<String> {
    let mut w = xml::document()?;
    xml::start(&mut w, "Relationships", &[("xmlns", NS_RELS)])?;
    for rel in rels {
        let kind = if rel.kind.starts_with("http") {
            rel.kind.to_string()
        } else {
            format!("{REL_BASE}/{}", rel.kind)
        };
        xml::empty(
            &mut w,
            "Relationship",
            &[
                ("Id", rel.id.as_str()),
                ("Type", kind.as_str()),
                ("Target", rel.target.as_str()),
            ],
        )?;
    }
    xml::end(&mut w, "Relationships")?;
    xml::into_string(w)
}

pub fn content_types(slide_count: usize, image_extensions: &[&str]) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#
    );
    for ext in image_extensions {
        xml.push_str(&format!(
            r#"<Default Extension="{ext}" ContentType="{}"/>"#,
            image_content_type(ext)
        ));
    }
    let overrides = [
        ("/ppt/presentation.xml", "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"),
        ("/ppt/slideLayouts/slideLayout2.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"),
        ("/ppt/theme/theme1.xml", "application/vnd.openxmlformats-officedocument.theme+xml"),
        ("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml"),
        ("/docProps/app.xml", "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
    ];
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
        ));
    }
    for n in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

pub fn image_content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}

pub fn root_relationships() -> Result<String> {
    relationships(&[
        Relationship::new("rId1", "officeDocument", "ppt/presentation.xml"),
        Relationship::new(
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml",
        ),
        Relationship::new("rId3", "extended-properties", "docProps/app.xml"),
    ])
}

/// `presentation.xml`; slides are relationships `rId3..` in order.
pub fn presentation(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#
    );
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for n in 0..slide_count {
            xml.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                256 + n,
                3 + n
            ));
        }
        xml.push_str("</p:sldIdLst>");
    }
    xml.push_str(&format!(
        r#"<p:sldSz cx="{SLIDE_WIDTH}" cy="{SLIDE_HEIGHT}" type="screen4x3"/><p:notesSz cx="{SLIDE_HEIGHT}" cy="{SLIDE_WIDTH}"/><p:defaultTextStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:defaultTextStyle></p:presentation>"#
    ));
    xml
}

pub fn presentation_relationships(slide_count: usize) -> Result<String> {
    let mut rels = vec![
        Relationship::new("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        Relationship::new("rId2", "theme", "theme/theme1.xml"),
    ];
    for n in 1..=slide_count {
        rels.push(Relationship::new(
            format!("rId{}", n + 2),
            "slide",
            format!("slides/slide{n}.xml"),
        ));
    }
    relationships(&rels)
}

pub fn core_properties(title: &str) -> Result<String> {
    let mut w = xml::document()?;
    xml::start(
        &mut w,
        "cp:coreProperties",
        &[
            ("xmlns:cp", NS_CORE),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml::text_element(&mut w, "dc:title", title)?;
    xml::text_element(&mut w, "dc:creator", "genslides")?;
    xml::end(&mut w, "cp:coreProperties")?;
    xml::into_string(w)
}

pub fn app_properties(slide_count: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>genslides</Application><PresentationFormat>On-screen Show (4:3)</PresentationFormat><Slides>{slide_count}</Slides></Properties>"#
    )
}

fn placeholder_shape(id: u32, name: &str, ph: &str, frame: (i64, i64, i64, i64)) -> String {
    let (x, y, cx, cy) = frame;
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#
    )
}

const GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

const TITLE_FRAME: (i64, i64, i64, i64) = (457_200, 274_638, 8_229_600, 1_143_000);
const BODY_FRAME: (i64, i64, i64, i64) = (457_200, 1_600_200, 8_229_600, 4_525_963);
const CENTERED_TITLE_FRAME: (i64, i64, i64, i64) = (685_800, 2_130_425, 7_772_400, 1_470_025);
const SUBTITLE_FRAME: (i64, i64, i64, i64) = (1_371_600, 3_886_200, 6_400_800, 1_752_600);

pub fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{GROUP_PROPS}{}{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr marL="342900" indent="-342900"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/><a:defRPr sz="3200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr><a:lvl2pPr marL="742950" indent="-285750"><a:buFont typeface="Arial"/><a:buChar char="&#8211;"/><a:defRPr sz="2800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl2pPr></p:bodyStyle><p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:otherStyle></p:txStyles></p:sldMaster>"#,
        placeholder_shape(2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, TITLE_FRAME),
        placeholder_shape(3, "Text Placeholder 2", r#"<p:ph type="body" idx="1"/>"#, BODY_FRAME),
    )
}

pub fn slide_master_relationships() -> Result<String> {
    relationships(&[
        Relationship::new("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
        Relationship::new("rId2", "slideLayout", "../slideLayouts/slideLayout2.xml"),
        Relationship::new("rId3", "theme", "../theme/theme1.xml"),
    ])
}

fn slide_layout(kind: &str, name: &str, shapes: &str) -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="{kind}" preserve="1"><p:cSld name="{name}"><p:spTree>{GROUP_PROPS}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

pub fn title_layout() -> String {
    let shapes = placeholder_shape(2, "Title 1", r#"<p:ph type="ctrTitle"/>"#, CENTERED_TITLE_FRAME)
        + &placeholder_shape(3, "Subtitle 2", r#"<p:ph type="subTitle" idx="1"/>"#, SUBTITLE_FRAME);
    slide_layout("title", "Title Slide", &shapes)
}

pub fn content_layout() -> String {
    let shapes = placeholder_shape(2, "Title 1", r#"<p:ph type="title"/>"#, TITLE_FRAME)
        + &placeholder_shape(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, BODY_FRAME);
    slide_layout("obj", "Title and Content", &shapes)
}

pub fn layout_relationships() -> Result<String> {
    relationships(&[Relationship::new(
        "rId1",
        "slideMaster",
        "../slideMasters/slideMaster1.xml",
    )])
}

pub fn theme() -> String {
    let colors = [
        ("dk1", r#"<a:sysClr val="windowText" lastClr="000000"/>"#),
        ("lt1", r#"<a:sysClr val="window" lastClr="FFFFFF"/>"#),
        ("dk2", r#"<a:srgbClr val="1F497D"/>"#),
        ("lt2", r#"<a:srgbClr val="EEECE1"/>"#),
        ("accent1", r#"<a:srgbClr val="4F81BD"/>"#),
        ("accent2", r#"<a:srgbClr val="C0504D"/>"#),
        ("accent3", r#"<a:srgbClr val="9BBB59"/>"#),
        ("accent4", r#"<a:srgbClr val="8064A2"/>"#),
        ("accent5", r#"<a:srgbClr val="4BACC6"/>"#),
        ("accent6", r#"<a:srgbClr val="F79646"/>"#),
        ("hlink", r#"<a:srgbClr val="0000FF"/>"#),
        ("folHlink", r#"<a:srgbClr val="800080"/>"#),
    ];
    let scheme: String = colors
        .iter()
        .map(|(name, color)| format!("<a:{name}>{color}</a:{name}>"))
        .collect();

    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        r#"{XML_DECL}<a:theme xmlns:a="{NS_A}" name="Office Theme"><a:themeElements><a:clrScheme name="Office">{scheme}</a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
    )
}
