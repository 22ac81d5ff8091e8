//! Presentation writer: turns an [`Outline`] into a `.pptx` file.

pub mod package;
pub mod xml;

use crate::outline::{ContentSlide, Outline, TitleSlide};
use anyhow::{Context, Result};
use package::Relationship;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use xml::{Align, Frame, Paragraph, Placeholder, SlideWriter, TableCell};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const EMU_PER_INCH: f64 = 914_400.0;
const TABLE_FONT_SIZE: u32 = 1000;
const HEADER_FILL: &str = "0070C0";
const HEADER_TEXT: &str = "FFFFFF";
const FIRST_COLUMN_FILL: &str = "E6E6E6";

pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH).round() as i64
}

struct RenderedSlide {
    xml: String,
    layout: &'static str,
    images: Vec<(String, String)>,
}

struct Media {
    name: String,
    bytes: Vec<u8>,
}

pub struct SlideDeck {
    output_folder: PathBuf,
    title: String,
    slides: Vec<RenderedSlide>,
    media: Vec<Media>,
}

impl SlideDeck {
    pub fn new<P: AsRef<Path>>(output_folder: P) -> Self {
        SlideDeck {
            output_folder: output_folder.as_ref().to_path_buf(),
            title: String::new(),
            slides: Vec::new(),
            media: Vec::new(),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn add_title_slide(&mut self, data: &TitleSlide) -> Result<()> {
        let mut slide = SlideWriter::new()?;
        slide.placeholder(
            Placeholder::CenteredTitle,
            &[Paragraph::plain(&data.title_text, 0)],
        )?;
        let subtitle: Vec<Paragraph<'_>> = data
            .subtitle_text
            .as_deref()
            .map(|s| Paragraph::plain(s, 0))
            .into_iter()
            .collect();
        slide.placeholder(Placeholder::Subtitle, &subtitle)?;

        if self.title.is_empty() {
            self.title = data.title_text.clone();
        }
        self.slides.push(RenderedSlide {
            xml: slide.finish()?,
            layout: package::TITLE_LAYOUT,
            images: Vec::new(),
        });
        Ok(())
    }

    /// Add a bulleted slide, with any images and table it carries.
    pub fn add_slide(&mut self, data: &ContentSlide) -> Result<()> {
        let mut slide = SlideWriter::new()?;
        slide.placeholder(Placeholder::Title, &[Paragraph::plain(&data.title_text, 0)])?;

        if !data.text.is_empty() {
            let mut paragraphs: Vec<Paragraph<'_>> =
                data.text.iter().map(|b| Paragraph::plain(b, 0)).collect();
            if let Some(detail) = data.p1.as_deref().filter(|d| !d.trim().is_empty()) {
                paragraphs.push(Paragraph::plain(detail, 1));
            }
            slide.placeholder(Placeholder::Body, &paragraphs)?;
        }

        let mut images = Vec::new();
        let mut left = 6.0;
        for path in &data.img_path {
            let Some((name, (width, height))) = self.embed_image(path) else {
                continue;
            };
            let rel_id = format!("rId{}", images.len() + 2);
            let cy = inches(4.0);
            let cx = (cy as f64 * f64::from(width) / f64::from(height)).round() as i64;
            let frame = Frame {
                x: inches(left),
                y: inches(2.0),
                cx,
                cy,
            };
            slide.picture(&rel_id, frame, &path.display().to_string())?;
            images.push((rel_id, name));
            left += 1.0;
        }

        if let Some(table) = data.table.as_ref().filter(|t| !t.is_empty()) {
            add_table(&mut slide, table)?;
        }

        self.slides.push(RenderedSlide {
            xml: slide.finish()?,
            layout: package::CONTENT_LAYOUT,
            images,
        });
        Ok(())
    }

    /// Copy an image into the package; `None` (with a warning) if it can't be used.
    fn embed_image(&mut self, path: &Path) -> Option<(String, (u32, u32))> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .filter(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg" | "gif"));
        let Some(ext) = ext else {
            tracing::warn!(path = %path.display(), "unsupported image type, skipping");
            return None;
        };

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "image file not found, skipping");
                return None;
            }
        };
        let dimensions = match image::image_dimensions(path) {
            Ok((w, h)) if w > 0 && h > 0 => (w, h),
            Ok(_) => {
                tracing::warn!(path = %path.display(), "image has no area, skipping");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable image, skipping");
                return None;
            }
        };

        let name = format!("image{}.{}", self.media.len() + 1, ext);
        self.media.push(Media {
            name: name.clone(),
            bytes,
        });
        Some((name, dimensions))
    }

    /// Write the assembled package to `writer`.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);
        let count = self.slides.len();

        let mut extensions: Vec<&str> = self
            .media
            .iter()
            .filter_map(|m| m.name.rsplit('.').next())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();

        let mut parts: Vec<(String, String)> = vec![
            (
                "[Content_Types].xml".into(),
                package::content_types(count, &extensions),
            ),
            ("_rels/.rels".into(), package::root_relationships()?),
            ("docProps/core.xml".into(), package::core_properties(&self.title)?),
            ("docProps/app.xml".into(), package::app_properties(count)),
            ("ppt/presentation.xml".into(), package::presentation(count)),
            (
                "ppt/_rels/presentation.xml.rels".into(),
                package::presentation_relationships(count)?,
            ),
            (
                "ppt/slideMasters/slideMaster1.xml".into(),
                package::slide_master(),
            ),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
                package::slide_master_relationships()?,
            ),
            (package::TITLE_LAYOUT.into(), package::title_layout()),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
                package::layout_relationships()?,
            ),
            (package::CONTENT_LAYOUT.into(), package::content_layout()),
            (
                "ppt/slideLayouts/_rels/slideLayout2.xml.rels".into(),
                package::layout_relationships()?,
            ),
            ("ppt/theme/theme1.xml".into(), package::theme()),
        ];

        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            let layout = slide.layout.trim_start_matches("ppt/");
            let mut rels = vec![Relationship::new(
                "rId1",
                "slideLayout",
                format!("../{layout}"),
            )];
            for (rel_id, name) in &slide.images {
                rels.push(Relationship::new(
                    rel_id.clone(),
                    "image",
                    format!("../media/{name}"),
                ));
            }
            parts.push((format!("ppt/slides/slide{n}.xml"), slide.xml.clone()));
            parts.push((
                format!("ppt/slides/_rels/slide{n}.xml.rels"),
                package::relationships(&rels)?,
            ));
        }

        for (name, content) in &parts {
            zip.start_file(name.as_str(), options)
                .with_context(|| format!("Failed to add {} to presentation", name))?;
            zip.write_all(content.as_bytes())?;
        }
        for media in &self.media {
            zip.start_file(format!("ppt/media/{}", media.name), options)
                .with_context(|| format!("Failed to add {} to presentation", media.name))?;
            zip.write_all(&media.bytes)?;
        }

        Ok(zip.finish()?)
    }

    /// Save under the output folder with a name derived from the deck title.
    pub fn save(&self) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_folder).with_context(|| {
            format!(
                "Failed to create directory: {}",
                self.output_folder.display()
            )
        })?;
        let path = self.output_folder.join(file_name_for(&self.title));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create presentation: {}", path.display()))?;
        self.write_to(file)
            .with_context(|| format!("Failed to write presentation: {}", path.display()))?;
        Ok(path)
    }

    /// Build and save a full deck: title slide first, then every content slide.
    pub fn create_presentation(mut self, outline: &Outline) -> Result<PathBuf> {
        self.add_title_slide(&outline.title)?;
        for slide in &outline.slides {
            self.add_slide(slide)?;
        }
        let path = self.save()?;
        tracing::info!(path = %path.display(), slides = self.slide_count(), "saved presentation");
        Ok(path)
    }
}

/// "Annual Report: 2022, Q4" becomes "annual-report-2022-q4.pptx".
pub fn file_name_for(title: &str) -> String {
    let stem: String = title
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ',' | ':' | '/' | '\\'))
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "presentation.pptx".to_string()
    } else {
        format!("{stem}.pptx")
    }
}

fn add_table(slide: &mut SlideWriter, data: &[Vec<String>]) -> Result<()> {
    let max_cols = data.iter().map(Vec::len).max().unwrap_or(0);
    if max_cols == 0 {
        return Ok(());
    }

    let first_col_width = 3.5;
    let remaining_width = 9.0 - first_col_width;
    let other_col_width = if max_cols > 1 {
        remaining_width / (max_cols - 1) as f64
    } else {
        remaining_width
    };
    let mut widths = vec![inches(first_col_width)];
    widths.extend((1..max_cols).map(|_| inches(other_col_width)));

    let rows: Vec<Vec<TableCell<'_>>> = data
        .iter()
        .enumerate()
        .map(|(i, row)| {
            // a short row is assumed to be missing its label column
            let padded: Vec<&str> = if row.len() < max_cols {
                std::iter::once(" ").chain(row.iter().map(String::as_str)).collect()
            } else {
                row.iter().map(String::as_str).collect()
            };
            (0..max_cols)
                .map(|j| table_cell(padded.get(j).copied().unwrap_or(""), i, j))
                .collect()
        })
        .collect();

    let frame = Frame {
        x: inches(0.5),
        y: inches(1.5),
        cx: inches(9.0),
        cy: inches(5.5),
    };
    slide.table(frame, &widths, &rows)
}

fn table_cell(text: &str, row: usize, col: usize) -> TableCell<'_> {
    let header = row == 0;
    let label = col == 0 && !header;
    TableCell {
        paragraph: Paragraph {
            text,
            level: 0,
            align: Some(if label { Align::Left } else { Align::Center }),
            size_hundredths: Some(TABLE_FONT_SIZE),
            bold: header || label,
            color: header.then_some(HEADER_TEXT),
        },
        fill: if header {
            Some(HEADER_FILL)
        } else if label {
            Some(FIRST_COLUMN_FILL)
        } else {
            None
        },
    }
}
