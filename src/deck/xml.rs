//! Slide part serialization (PresentationML / DrawingML).

use anyhow::Result;
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::io::Cursor;

pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Position and size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    CenteredTitle,
    Subtitle,
    Title,
    Body,
}

impl Placeholder {
    fn attrs(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Placeholder::CenteredTitle => &[("type", "ctrTitle")],
            Placeholder::Subtitle => &[("type", "subTitle"), ("idx", "1")],
            Placeholder::Title => &[("type", "title")],
            Placeholder::Body => &[("idx", "1")],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Placeholder::CenteredTitle | Placeholder::Title => "Title",
            Placeholder::Subtitle => "Subtitle",
            Placeholder::Body => "Content Placeholder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One run of paragraph text with optional formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph<'a> {
    pub text: &'a str,
    pub level: u8,
    pub align: Option<Align>,
    pub size_hundredths: Option<u32>,
    pub bold: bool,
    pub color: Option<&'a str>,
}

impl<'a> Paragraph<'a> {
    pub fn plain(text: &'a str, level: u8) -> Self {
        Paragraph {
            text,
            level,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell<'a> {
    pub paragraph: Paragraph<'a>,
    pub fill: Option<&'a str>,
}

/// Writes a single `<p:sld>` part, assigning shape ids as shapes are added.
pub struct SlideWriter {
    writer: XmlWriter,
    next_id: u32,
}

impl SlideWriter {
    pub fn new() -> Result<Self> {
        let mut writer = document()?;

        let mut sld = BytesStart::new("p:sld");
        sld.push_attribute(("xmlns:a", NS_A));
        sld.push_attribute(("xmlns:r", NS_R));
        sld.push_attribute(("xmlns:p", NS_P));
        writer.write_event(Event::Start(sld))?;
        start(&mut writer, "p:cSld", &[])?;
        start(&mut writer, "p:spTree", &[])?;

        start(&mut writer, "p:nvGrpSpPr", &[])?;
        empty(&mut writer, "p:cNvPr", &[("id", "1"), ("name", "")])?;
        empty(&mut writer, "p:cNvGrpSpPr", &[])?;
        empty(&mut writer, "p:nvPr", &[])?;
        end(&mut writer, "p:nvGrpSpPr")?;

        start(&mut writer, "p:grpSpPr", &[])?;
        start(&mut writer, "a:xfrm", &[])?;
        empty(&mut writer, "a:off", &[("x", "0"), ("y", "0")])?;
        empty(&mut writer, "a:ext", &[("cx", "0"), ("cy", "0")])?;
        empty(&mut writer, "a:chOff", &[("x", "0"), ("y", "0")])?;
        empty(&mut writer, "a:chExt", &[("cx", "0"), ("cy", "0")])?;
        end(&mut writer, "a:xfrm")?;
        end(&mut writer, "p:grpSpPr")?;

        Ok(SlideWriter { writer, next_id: 2 })
    }

    fn shape_id(&mut self) -> (String, u32) {
        let id = self.next_id;
        self.next_id += 1;
        (id.to_string(), id)
    }

    /// A placeholder shape positioned by its layout, holding `paragraphs`.
    pub fn placeholder(&mut self, kind: Placeholder, paragraphs: &[Paragraph<'_>]) -> Result<()> {
        let (id, n) = self.shape_id();
        let name = format!("{} {}", kind.label(), n - 1);
        let w = &mut self.writer;

        start(w, "p:sp", &[])?;
        start(w, "p:nvSpPr", &[])?;
        empty(w, "p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        start(w, "p:cNvSpPr", &[])?;
        empty(w, "a:spLocks", &[("noGrp", "1")])?;
        end(w, "p:cNvSpPr")?;
        start(w, "p:nvPr", &[])?;
        empty(w, "p:ph", kind.attrs())?;
        end(w, "p:nvPr")?;
        end(w, "p:nvSpPr")?;
        empty(w, "p:spPr", &[])?;
        write_text_body(w, "p:txBody", paragraphs)?;
        end(w, "p:sp")?;
        Ok(())
    }

    /// A picture referencing the image relationship `rel_id`.
    pub fn picture(&mut self, rel_id: &str, frame: Frame, description: &str) -> Result<()> {
        let (id, n) = self.shape_id();
        let name = format!("Picture {}", n - 1);
        let w = &mut self.writer;

        start(w, "p:pic", &[])?;
        start(w, "p:nvPicPr", &[])?;
        empty(w, "p:cNvPr", &[("id", id.as_str()), ("name", name.as_str()), ("descr", description)])?;
        start(w, "p:cNvPicPr", &[])?;
        empty(w, "a:picLocks", &[("noChangeAspect", "1")])?;
        end(w, "p:cNvPicPr")?;
        empty(w, "p:nvPr", &[])?;
        end(w, "p:nvPicPr")?;

        start(w, "p:blipFill", &[])?;
        empty(w, "a:blip", &[("r:embed", rel_id)])?;
        start(w, "a:stretch", &[])?;
        empty(w, "a:fillRect", &[])?;
        end(w, "a:stretch")?;
        end(w, "p:blipFill")?;

        start(w, "p:spPr", &[])?;
        write_xfrm(w, "a:xfrm", frame)?;
        start(w, "a:prstGeom", &[("prst", "rect")])?;
        empty(w, "a:avLst", &[])?;
        end(w, "a:prstGeom")?;
        end(w, "p:spPr")?;
        end(w, "p:pic")?;
        Ok(())
    }

    /// A table graphic frame. Every row must have `column_widths.len()` cells.
    pub fn table(
        &mut self,
        frame: Frame,
        column_widths: &[i64],
        rows: &[Vec<TableCell<'_>>],
    ) -> Result<()> {
        let (id, n) = self.shape_id();
        let name = format!("Table {}", n - 1);
        let row_height = (frame.cy / rows.len().max(1) as i64).to_string();
        let w = &mut self.writer;

        start(w, "p:graphicFrame", &[])?;
        start(w, "p:nvGraphicFramePr", &[])?;
        empty(w, "p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        start(w, "p:cNvGraphicFramePr", &[])?;
        empty(w, "a:graphicFrameLocks", &[("noGrp", "1")])?;
        end(w, "p:cNvGraphicFramePr")?;
        empty(w, "p:nvPr", &[])?;
        end(w, "p:nvGraphicFramePr")?;
        write_xfrm(w, "p:xfrm", frame)?;

        start(w, "a:graphic", &[])?;
        start(w, "a:graphicData", &[("uri", TABLE_URI)])?;
        start(w, "a:tbl", &[])?;
        empty(w, "a:tblPr", &[("firstRow", "1"), ("bandRow", "1")])?;
        start(w, "a:tblGrid", &[])?;
        for width in column_widths {
            empty(w, "a:gridCol", &[("w", width.to_string().as_str())])?;
        }
        end(w, "a:tblGrid")?;

        for row in rows {
            start(w, "a:tr", &[("h", row_height.as_str())])?;
            for cell in row {
                start(w, "a:tc", &[])?;
                write_text_body(w, "a:txBody", std::slice::from_ref(&cell.paragraph))?;
                match cell.fill {
                    Some(color) => {
                        start(w, "a:tcPr", &[])?;
                        write_solid_fill(w, color)?;
                        end(w, "a:tcPr")?;
                    }
                    None => empty(w, "a:tcPr", &[])?,
                }
                end(w, "a:tc")?;
            }
            end(w, "a:tr")?;
        }

        end(w, "a:tbl")?;
        end(w, "a:graphicData")?;
        end(w, "a:graphic")?;
        end(w, "p:graphicFrame")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<String> {
        let w = &mut self.writer;
        end(w, "p:spTree")?;
        end(w, "p:cSld")?;
        start(w, "p:clrMapOvr", &[])?;
        empty(w, "a:masterClrMapping", &[])?;
        end(w, "p:clrMapOvr")?;
        end(w, "p:sld")?;
        into_string(self.writer)
    }
}

fn write_text_body(w: &mut XmlWriter, tag: &str, paragraphs: &[Paragraph<'_>]) -> Result<()> {
    start(w, tag, &[])?;
    empty(w, "a:bodyPr", &[])?;
    empty(w, "a:lstStyle", &[])?;
    if paragraphs.is_empty() {
        empty(w, "a:p", &[])?;
    }
    for paragraph in paragraphs {
        write_paragraph(w, paragraph)?;
    }
    end(w, tag)?;
    Ok(())
}

fn write_paragraph(w: &mut XmlWriter, paragraph: &Paragraph<'_>) -> Result<()> {
    start(w, "a:p", &[])?;

    let level = paragraph.level.to_string();
    let mut ppr: Vec<(&str, &str)> = Vec::new();
    if paragraph.level > 0 {
        ppr.push(("lvl", level.as_str()));
    }
    match paragraph.align {
        Some(Align::Left) => ppr.push(("algn", "l")),
        Some(Align::Center) => ppr.push(("algn", "ctr")),
        None => {}
    }
    if !ppr.is_empty() {
        empty(w, "a:pPr", &ppr)?;
    }

    if !paragraph.text.is_empty() {
        start(w, "a:r", &[])?;
        let size = paragraph.size_hundredths.map(|s| s.to_string());
        let mut rpr: Vec<(&str, &str)> = vec![("lang", "en-US"), ("dirty", "0")];
        if let Some(size) = &size {
            rpr.push(("sz", size.as_str()));
        }
        if paragraph.bold {
            rpr.push(("b", "1"));
        }
        match paragraph.color {
            Some(color) => {
                start(w, "a:rPr", &rpr)?;
                write_solid_fill(w, color)?;
                end(w, "a:rPr")?;
            }
            None => empty(w, "a:rPr", &rpr)?,
        }
        text_element(w, "a:t", paragraph.text)?;
        end(w, "a:r")?;
    }

    end(w, "a:p")?;
    Ok(())
}

fn write_solid_fill(w: &mut XmlWriter, color: &str) -> Result<()> {
    start(w, "a:solidFill", &[])?;
    empty(w, "a:srgbClr", &[("val", color)])?;
    end(w, "a:solidFill")?;
    Ok(())
}

fn write_xfrm(w: &mut XmlWriter, tag: &str, frame: Frame) -> Result<()> {
    start(w, tag, &[])?;
    empty(
        w,
        "a:off",
        &[("x", frame.x.to_string().as_str()), ("y", frame.y.to_string().as_str())],
    )?;
    empty(
        w,
        "a:ext",
        &[("cx", frame.cx.to_string().as_str()), ("cy", frame.cy.to_string().as_str())],
    )?;
    end(w, tag)?;
    Ok(())
}

/// A fresh part with the standalone XML declaration already written.
pub fn document() -> Result<XmlWriter> {
    let mut w = Writer::new(Cursor::new(Vec::new()));
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(w)
}

pub fn into_string(w: XmlWriter) -> Result<String> {
    Ok(String::from_utf8(w.into_inner().into_inner())?)
}

pub fn start(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut elem = BytesStart::new(name);
    elem.extend_attributes(attrs.iter().copied());
    w.write_event(Event::Start(elem))?;
    Ok(())
}

pub fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut elem = BytesStart::new(name);
    elem.extend_attributes(attrs.iter().copied());
    w.write_event(Event::Empty(elem))?;
    Ok(())
}

pub fn end(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub fn text_element(w: &mut XmlWriter, name: &str, value: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(value)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_text_is_escaped() {
        let mut slide = SlideWriter::new().unwrap();
        slide
            .placeholder(Placeholder::Title, &[Paragraph::plain("R&D <2022>", 0)])
            .unwrap();
        let xml = slide.finish().unwrap();
        assert!(xml.contains(r#"<p:ph type="title"/>"#));
        assert!(xml.contains("<a:t>R&amp;D &lt;2022&gt;</a:t>"));
        assert!(xml.ends_with("</p:sld>"));
    }

    #[test]
    fn test_levels_and_empty_body() {
        let mut slide = SlideWriter::new().unwrap();
        slide
            .placeholder(
                Placeholder::Body,
                &[Paragraph::plain("Top", 0), Paragraph::plain("Detail", 1)],
            )
            .unwrap();
        slide.placeholder(Placeholder::Subtitle, &[]).unwrap();
        let xml = slide.finish().unwrap();
        assert!(xml.contains(r#"<a:pPr lvl="1"/>"#));
        assert!(xml.contains(r#"<p:ph type="subTitle" idx="1"/>"#));
        assert!(xml.contains("<a:lstStyle/><a:p/></p:txBody>"));
        assert!(xml.contains(r#"<p:cNvPr id="3" name="Subtitle 2"/>"#));
    }

    #[test]
    fn test_table_grid() {
        let mut slide = SlideWriter::new().unwrap();
        let cell = |text| TableCell {
            paragraph: Paragraph::plain(text, 0),
            fill: Some("0070C0"),
        };
        slide
            .table(
                Frame { x: 0, y: 0, cx: 200, cy: 100 },
                &[120, 80],
                &[vec![cell("a"), cell("b")], vec![cell("c"), cell("d")]],
            )
            .unwrap();
        let xml = slide.finish().unwrap();
        assert_eq!(xml.matches("<a:gridCol ").count(), 2);
        assert_eq!(xml.matches(r#"<a:tr h="50">"#).count(), 2);
        assert!(xml.contains(r#"<a:srgbClr val="0070C0"/>"#));
    }
}
