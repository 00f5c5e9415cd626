// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise a finished document with `lopdf`.
//
// The object graph is built directly: one shared resources dictionary holding
// the three Helvetica faces and every image XObject, one content stream per
// page. Our draw ops use a top-left origin in millimetres; PDF user space is
// bottom-left in points, so every y is flipped here.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};
use pliego_core::error::{PliegoError, Result};
use pliego_core::{PageFormat, Rgb};
use tracing::{debug, info, instrument, warn};

use super::document::{DrawOp, EmbeddedImage, FinishedDocument, ImageData};
use super::encoding::encode_win_ansi;
use super::style::{FontFace, StrokeStyle};

const PT_PER_MM: f64 = 72.0 / 25.4;
const PRODUCER: &str = concat!("pliego ", env!("CARGO_PKG_VERSION"));

/// Serialises [`FinishedDocument`]s to PDF bytes.
pub struct PdfWriter {
    format: PageFormat,
}

impl PdfWriter {
    pub fn new(format: PageFormat) -> Self {
        Self { format }
    }

    /// Render every page of `finished` and return the PDF bytes.
    #[instrument(skip_all, fields(title = finished.title(), pages = finished.page_count()))]
    pub fn render(&self, finished: &FinishedDocument) -> Result<Vec<u8>> {
        if finished.page_count() == 0 {
            return Err(PliegoError::PdfError("document has no pages".into()));
        }
        let (width_mm, height_mm) = self.format.dimensions_mm();
        let (page_w, page_h) = (pt(width_mm), pt(height_mm));

        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for face in [FontFace::Regular, FontFace::Bold, FontFace::Italic] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base_font(face),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font_resource(face), font_id);
        }
        let mut xobjects = Dictionary::new();
        for (id, image) in finished.images().iter().enumerate() {
            let image_id = embed_image(&mut doc, image);
            xobjects.set(image_resource(id), image_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(finished.page_count());
        for page in finished.pages() {
            let mut operations = Vec::with_capacity(page.ops().len() * 6);
            for op in page.ops() {
                emit(op, page_h, finished.images().len(), &mut operations)?;
            }
            let content = Content { operations }.encode().map_err(pdf_error)?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(encode_win_ansi(finished.title()), StringFormat::Literal),
            "Producer" => Object::string_literal(PRODUCER),
        });
        doc.trailer.set("Info", info_id);

        // Streams that already carry a filter (JPEG) are left alone.
        doc.compress();
        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|e| pdf_error(e.into()))?;
        debug!(images = finished.images().len(), "Object graph written");
        info!(bytes = output.len(), "PDF serialised");
        Ok(output)
    }

    /// Render `finished` and write it to a file.
    pub fn write_to_file(&self, finished: &FinishedDocument, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.render(finished)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}

fn pdf_error(err: lopdf::Error) -> PliegoError {
    PliegoError::PdfError(err.to_string())
}

fn pt(mm: f64) -> f32 {
    (mm * PT_PER_MM) as f32
}

fn base_font(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "Helvetica",
        FontFace::Bold => "Helvetica-Bold",
        FontFace::Italic => "Helvetica-Oblique",
    }
}

fn font_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Italic => "F3",
    }
}

fn image_resource(id: usize) -> String {
    format!("Im{id}")
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8_i64,
    }
}

/// Add one image XObject (and its soft mask) to `doc`.
fn embed_image(doc: &mut lopdf::Document, image: &EmbeddedImage) -> ObjectId {
    match &image.data {
        ImageData::Jpeg { bytes, grey } => {
            let mut dict = image_dictionary(
                image.width,
                image.height,
                if *grey { "DeviceGray" } else { "DeviceRGB" },
            );
            dict.set("Filter", "DCTDecode");
            doc.add_object(Stream::new(dict, bytes.clone()).with_compression(false))
        }
        ImageData::Raw { rgb, alpha } => {
            let mut dict = image_dictionary(image.width, image.height, "DeviceRGB");
            if let Some(alpha) = alpha {
                let mask = image_dictionary(image.width, image.height, "DeviceGray");
                let mask_id = doc.add_object(Stream::new(mask, alpha.clone()));
                dict.set("SMask", mask_id);
            }
            doc.add_object(Stream::new(dict, rgb.clone()))
        }
    }
}

fn color_operands(rgb: Rgb) -> Vec<Object> {
    let (r, g, b) = rgb.to_unit();
    vec![r.into(), g.into(), b.into()]
}

fn set_stroke(stroke: &StrokeStyle, operations: &mut Vec<Operation>) {
    operations.push(Operation::new("RG", color_operands(stroke.color)));
    operations.push(Operation::new("w", vec![stroke.width_pt.into()]));
}

fn emit(op: &DrawOp, page_h: f32, image_count: usize, operations: &mut Vec<Operation>) -> Result<()> {
    match op {
        DrawOp::Text {
            x,
            baseline,
            text,
            style,
        } => {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![font_resource(style.face).into(), style.size_pt.into()],
            ));
            operations.push(Operation::new("rg", color_operands(style.color)));
            operations.push(Operation::new(
                "Td",
                vec![pt(*x).into(), (page_h - pt(*baseline)).into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => {
            set_stroke(stroke, operations);
            operations.push(Operation::new("m", vec![pt(*x1).into(), (page_h - pt(*y1)).into()]));
            operations.push(Operation::new("l", vec![pt(*x2).into(), (page_h - pt(*y2)).into()]));
            operations.push(Operation::new("S", vec![]));
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let paint = match (fill, stroke) {
                (Some(_), Some(_)) => "B",
                (Some(_), None) => "f",
                (None, Some(_)) => "S",
                (None, None) => return Ok(()),
            };
            if let Some(fill) = fill {
                operations.push(Operation::new("rg", color_operands(*fill)));
            }
            if let Some(stroke) = stroke {
                set_stroke(stroke, operations);
            }
            operations.push(Operation::new(
                "re",
                vec![
                    pt(*x).into(),
                    (page_h - pt(y + height)).into(),
                    pt(*width).into(),
                    pt(*height).into(),
                ],
            ));
            operations.push(Operation::new(paint, vec![]));
        }
        DrawOp::Image {
            id,
            x,
            y,
            width,
            height,
        } => {
            if *id >= image_count {
                warn!(id, "Draw op references an unknown image");
                return Err(PliegoError::PdfError(format!("unknown image id {id}")));
            }
            // Image space is the unit square; `cm` scales it to the target box.
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    pt(*width).into(),
                    0.into(),
                    0.into(),
                    pt(*height).into(),
                    pt(*x).into(),
                    (page_h - pt(y + height)).into(),
                ],
            ));
            operations.push(Operation::new("Do", vec![Object::Name(image_resource(*id).into_bytes())]));
            operations.push(Operation::new("Q", vec![]));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::Document;
    use crate::pdf::footer::FooterSpec;
    use crate::pdf::style::TextStyle;

    fn load(bytes: &[u8]) -> lopdf::Document {
        lopdf::Document::load_mem(bytes).unwrap()
    }

    fn first_page_content(bytes: &[u8]) -> Vec<u8> {
        let pdf = load(bytes);
        let (_, page_id) = pdf.get_pages().into_iter().next().unwrap();
        pdf.get_page_content(page_id).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    fn photo_jpeg(side: u32) -> Vec<u8> {
        let photo = ::image::RgbImage::from_fn(side, side, |x, y| {
            ::image::Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        ::image::DynamicImage::ImageRgb8(photo)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ::image::ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn renders_every_page() {
        let mut doc = Document::new("Prueba", PageFormat::A4_LANDSCAPE);
        doc.push(DrawOp::text(15.0, 20.0, "Historial de Stock", TextStyle::bold(14.0)));
        doc.add_page();
        doc.push(DrawOp::rect(
            15.0,
            20.0,
            267.0,
            8.0,
            Some(Rgb::grey(240)),
            Some(StrokeStyle::hairline(Rgb::grey(200))),
        ));
        let footer = FooterSpec::new("2026 Marca", Rgb::new(190, 8, 18));
        let bytes = doc.finalize(Some(&footer)).to_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(load(&bytes).get_pages().len(), 2);
    }

    #[test]
    fn accented_text_is_win_ansi() {
        let mut doc = Document::new("Catálogo", PageFormat::A4_PORTRAIT);
        doc.push(DrawOp::text(15.0, 20.0, "Descripción Ñandú N°", TextStyle::regular(9.0)));
        let bytes = doc.finalize(None).to_pdf().unwrap();
        let content = first_page_content(&bytes);
        assert!(contains(&content, b"(Descripci\xF3n \xD1and\xFA N\xB0) Tj"));
        assert!(!contains(&content, "ó".as_bytes()));
    }

    #[test]
    fn jpeg_is_embedded_without_reencoding() {
        let jpeg = photo_jpeg(400);
        let mut doc = Document::new("Imagen", PageFormat::SQUARE);
        let id = doc.add_image(EmbeddedImage::from_encoded(jpeg.clone()).unwrap());
        doc.push(DrawOp::Image {
            id,
            x: 20.0,
            y: 40.0,
            width: 80.0,
            height: 80.0,
        });
        let bytes = doc.finalize(None).to_pdf().unwrap();

        let pdf = load(&bytes);
        let stream = pdf
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .find(|stream| stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice()))
            .unwrap();
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(stream.content, jpeg);
        // The rest of the file is a few kilobytes of structure.
        assert!(bytes.len() < jpeg.len() + 4096);
        assert!(contains(&first_page_content(&bytes), b"/Im0 Do"));
    }

    #[test]
    fn transparent_raster_gets_a_soft_mask() {
        let mut doc = Document::new("Imagen", PageFormat::SQUARE);
        let id = doc.add_image(EmbeddedImage {
            width: 2,
            height: 1,
            data: ImageData::Raw {
                rgb: vec![255, 0, 0, 0, 0, 255],
                alpha: Some(vec![255, 0]),
            },
        });
        doc.push(DrawOp::Image {
            id,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 5.0,
        });
        let pdf = load(&doc.finalize(None).to_pdf().unwrap());
        let images: Vec<&Stream> = pdf
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .filter(|stream| stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice()))
            .collect();
        assert_eq!(images.len(), 2);
        assert!(images.iter().any(|stream| stream.dict.get(b"SMask").is_ok()));
    }

    #[test]
    fn unknown_image_is_an_error() {
        let mut doc = Document::new("Imagen", PageFormat::SQUARE);
        doc.push(DrawOp::Image {
            id: 3,
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        });
        assert!(matches!(
            doc.finalize(None).to_pdf(),
            Err(PliegoError::PdfError(_))
        ));
    }
}
