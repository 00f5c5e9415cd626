// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inventory catalog: one square page per product.
//
// Cover images are fetched and normalized concurrently before any page is
// drawn. A product whose image cannot be loaded still gets its page.

use chrono::Datelike;
use pliego_core::error::{PliegoError, Result};
use pliego_core::{BrandConfig, PageFormat, ReportKind, Rgb};
use pliego_document::pdf::metrics::{text_width_mm, wrap_text};
use pliego_document::pdf::{
    DrawOp, EmbeddedImage, ImageId, PageRegion, Paginator, StrokeStyle, TextStyle,
};
use pliego_document::{NormalizedImage, format_amount};
use tracing::{info, instrument, warn};

use super::letterhead::{CAPTION_GREY, commercial_footer, draw_logo, register_logo};
use super::{ReportComposer, Rendered};
use crate::filename::catalog_stem;
use crate::filters::CatalogRequest;
use crate::models::Product;
use crate::source::ReportSource;

const REGION: PageRegion = PageRegion {
    top: 15.0,
    threshold: 195.0,
};
const LEFT: f64 = 20.0;
const RIGHT: f64 = 190.0;
const TITLE_X: f64 = 70.0;
const TITLE_WIDTH: f64 = 120.0;
const TITLE_STEP: f64 = 7.0;
const TITLE_MAX_LINES: usize = 3;
const PHOTO_SIZE: f64 = 80.0;
const CELL_WIDTH: f64 = 85.0;
const CELL_HEIGHT: f64 = 12.0;
const CELL_PITCH: f64 = 15.0;
const CELL_INSET: f64 = 3.0;
/// The description is skipped when the grid ends below this line.
const DESCRIPTION_START_LIMIT: f64 = 190.0;
const DESCRIPTION_LIMIT: f64 = 195.0;
const DESCRIPTION_STEP: f64 = 4.5;
const NOT_AVAILABLE: &str = "N/A";

/// Reject the request up front when any product lacks an image reference.
fn require_images(products: &[Product]) -> Result<()> {
    let missing: Vec<&str> = products
        .iter()
        .filter(|p| !p.has_cover_image())
        .map(Product::display_name)
        .collect();
    match missing.as_slice() {
        [] => Ok(()),
        [name] => Err(PliegoError::MissingResource(format!(
            "El producto \"{name}\" no tiene imagen. Por favor, agrega una imagen antes de generar el catálogo."
        ))),
        names => Err(PliegoError::MissingResource(format!(
            "Los siguientes productos no tienen imagen: {}. Por favor, agrega imágenes a estos productos antes de generar el catálogo.",
            names.join(", ")
        ))),
    }
}

#[instrument(skip(composer, logo))]
pub(super) async fn render<S: ReportSource>(
    composer: &ReportComposer<S>,
    logo: Option<&EmbeddedImage>,
    request: &CatalogRequest,
) -> Result<Rendered> {
    request.validate()?;
    let products = composer.source().products(&request.product_ids)?;
    if products.is_empty() {
        return Err(PliegoError::NotFound("No se encontraron productos".into()));
    }
    require_images(&products)?;

    let images = composer
        .images
        .normalize_all(
            products
                .iter()
                .map(|p| p.cover_image.clone().unwrap_or_default()),
        )
        .await;

    let brand = &composer.config().brand;
    let mut pager = Paginator::new(
        ReportKind::InventoryCatalog.title(),
        PageFormat::SQUARE,
        REGION,
        REGION.top,
    );
    let logo = register_logo(&mut pager, logo);
    for (index, (product, image)) in products.iter().zip(&images).enumerate() {
        if index > 0 {
            pager.new_page();
        }
        draw_product(&mut pager, brand, logo, product, image.as_ref())?;
    }
    info!(products = products.len(), "Catalog laid out");

    let identity = composer.footer_identity();
    let footer = commercial_footer(brand, identity.as_ref(), composer.today().year());
    Ok(Rendered {
        document: pager.finish(Some(&footer)),
        stem: catalog_stem(
            request.product_name.as_deref(),
            request.category.as_deref(),
            composer.today(),
        ),
    })
}

fn draw_product(
    pager: &mut Paginator,
    brand: &BrandConfig,
    logo: Option<ImageId>,
    product: &Product,
    image: Option<&NormalizedImage>,
) -> Result<()> {
    if let Some(logo) = logo {
        draw_logo(pager, logo, LEFT, 9.0, 7.5, 35.0);
    }

    let title_style = TextStyle::bold(14.0).with_color(brand.accent);
    let title = super::clamp_lines(
        wrap_text(
            product.display_name(),
            TITLE_WIDTH,
            title_style.face,
            title_style.size_pt,
        ),
        TITLE_MAX_LINES,
        TITLE_WIDTH,
        title_style,
    );
    for (i, line) in title.iter().enumerate() {
        pager.draw(DrawOp::text(TITLE_X, 15.0 + TITLE_STEP * i as f64, line.clone(), title_style));
    }
    let mut y = 20.0 + TITLE_STEP * title.len() as f64;

    match image.map(|image| EmbeddedImage::from_encoded(image.payload.clone())) {
        Some(Ok(photo)) => {
            let id = pager.document_mut().add_image(photo);
            pager.draw(DrawOp::Image {
                id,
                x: LEFT,
                y,
                width: PHOTO_SIZE,
                height: PHOTO_SIZE,
            });
        }
        Some(Err(err)) => warn!(product = %product.id, error = %err, "Cover image not embeddable, omitted"),
        None => warn!(product = %product.id, "Cover image unavailable, omitted"),
    }
    y += PHOTO_SIZE + 10.0;

    pager.draw(DrawOp::hline(
        LEFT,
        RIGHT,
        y,
        StrokeStyle::hairline(brand.accent).with_width(1.0),
    ));
    y += 15.0;

    let price = match product.sale_price {
        Some(price) => format!("{} Bs", format_amount(price)?),
        None => NOT_AVAILABLE.to_string(),
    };
    let cells = [
        ("Categoría:", shown(product.category.as_deref())),
        ("Unidad de medida:", shown(product.unit.as_deref())),
        ("Precio de venta:", price),
        ("Disponibilidad:", shown(product.availability.as_deref())),
    ];
    for (i, (label, value)) in cells.into_iter().enumerate() {
        let x = LEFT + CELL_WIDTH * (i % 2) as f64;
        let top = y + CELL_PITCH * (i / 2) as f64;
        draw_cell(pager, x, top, label, &value);
    }
    y += CELL_PITCH + CELL_HEIGHT + CELL_HEIGHT;

    let description = product
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if let Some(description) = description.filter(|_| y < DESCRIPTION_START_LIMIT) {
        pager.draw(DrawOp::text(
            LEFT,
            y,
            "Descripción:",
            TextStyle::bold(10.0).with_color(CAPTION_GREY),
        ));
        let style = TextStyle::regular(9.0);
        let mut baseline = y + 6.0;
        for line in wrap_text(description, RIGHT - LEFT, style.face, style.size_pt) {
            if baseline > DESCRIPTION_LIMIT {
                break;
            }
            pager.draw(DrawOp::text(LEFT, baseline, line, style));
            baseline += DESCRIPTION_STEP;
        }
    }
    Ok(())
}

/// Bordered label/value cell; the value keeps only what fits on one line.
fn draw_cell(pager: &mut Paginator, x: f64, top: f64, label: &str, value: &str) {
    let label_style = TextStyle::bold(10.0);
    let value_style = TextStyle::regular(10.0);
    let baseline = top + 7.5;
    pager.draw(DrawOp::rect(
        x,
        top,
        CELL_WIDTH,
        CELL_HEIGHT,
        Some(Rgb::WHITE),
        Some(StrokeStyle::hairline(Rgb::grey(180))),
    ));
    pager.draw(DrawOp::text(x + CELL_INSET, baseline, label, label_style));
    let value_x = x + CELL_INSET + text_width_mm(label, label_style.face, label_style.size_pt) + 2.0;
    let room = x + CELL_WIDTH - CELL_INSET - value_x;
    if let Some(first) = wrap_text(value, room, value_style.face, value_style.size_pt)
        .into_iter()
        .next()
    {
        pager.draw(DrawOp::text(value_x, baseline, first, value_style));
    }
}

fn shown(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::super::ReportRequest;
    use super::super::fixtures::*;
    use super::*;
    use crate::source::{Dataset, JsonSource};
    use base64::Engine;

    fn png_data_uri() -> String {
        let pixels = ::image::RgbImage::from_pixel(4, 4, ::image::Rgb([200, 30, 30]));
        let mut bytes = Vec::new();
        ::image::DynamicImage::ImageRgb8(pixels)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ::image::ImageFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    fn jpeg_data_uri(side: u32) -> (Vec<u8>, String) {
        let pixels = ::image::RgbImage::from_fn(side, side, |x, y| {
            ::image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        ::image::DynamicImage::ImageRgb8(pixels)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ::image::ImageFormat::Jpeg)
            .unwrap();
        let uri = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        );
        (bytes, uri)
    }

    fn product(id: &str, name: &str, image: Option<String>) -> Product {
        Product {
            id: id.into(),
            code: None,
            name: Some(name.into()),
            category: Some("Lonas".into()),
            unit: Some("m2".into()),
            sale_price: Some(150.0),
            availability: Some("Disponible".into()),
            description: Some("Lona front de alta resistencia para exteriores. ".repeat(12)),
            cover_image: image,
        }
    }

    fn composer_for(products: Vec<Product>) -> ReportComposer<JsonSource> {
        composer_with(JsonSource::new(Dataset {
            products,
            ..Dataset::default()
        }))
    }

    fn request(ids: &[&str]) -> CatalogRequest {
        CatalogRequest {
            product_ids: ids.iter().map(|id| id.to_string()).collect(),
            ..CatalogRequest::default()
        }
    }

    #[tokio::test]
    async fn one_page_per_product() {
        let composer = composer_for(vec![
            product("a", "Lona Front", Some(png_data_uri())),
            product("b", "Vinilo Adhesivo", Some(png_data_uri())),
        ]);
        let rendered = render(&composer, None, &request(&["a", "b"])).await.unwrap();
        assert_eq!(rendered.document.page_count(), 2);
        assert_eq!(rendered.document.images().len(), 2);
        let pages = page_texts(&rendered.document);
        assert!(pages[0].iter().any(|t| t == "Lona Front"));
        assert!(pages[1].iter().any(|t| t == "Vinilo Adhesivo"));
        assert!(pages[0].iter().any(|t| t == "150,00 Bs"));
        assert!(pages[0].iter().any(|t| t == "Descripción:"));
        assert_eq!(rendered.stem, "Catalogo de productos - 04-07-2025");
    }

    #[tokio::test]
    async fn description_stops_above_the_footer() {
        let composer = composer_for(vec![product("a", "Lona Front", Some(png_data_uri()))]);
        let rendered = render(&composer, None, &request(&["a"])).await.unwrap();
        for op in rendered.document.pages()[0].ops() {
            if let DrawOp::Text { baseline, text, .. } = op {
                if text.starts_with("Lona front de alta") || text.contains("exteriores") {
                    assert!(*baseline <= DESCRIPTION_LIMIT);
                }
            }
        }
    }

    #[tokio::test]
    async fn logo_is_shared_by_every_product_page() {
        let composer = composer_for(vec![
            product("a", "Lona Front", Some(png_data_uri())),
            product("b", "Vinilo Adhesivo", Some(png_data_uri())),
            product("c", "Banner", Some(png_data_uri())),
        ]);
        let logo = EmbeddedImage::rgb(2, 2, vec![0; 12]);
        let rendered = render(&composer, Some(&logo), &request(&["a", "b", "c"]))
            .await
            .unwrap();
        assert_eq!(rendered.document.page_count(), 3);
        assert_eq!(rendered.document.images().len(), 4);
    }

    #[tokio::test]
    async fn long_names_stay_above_the_photo() {
        let name = "Lona front translúcida de alta resistencia ".repeat(10);
        let composer = composer_for(vec![product("a", &name, Some(png_data_uri()))]);
        let rendered = render(&composer, None, &request(&["a"])).await.unwrap();
        let titles: Vec<(f64, &str)> = rendered.document.pages()[0]
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, baseline, text, .. } if *x == TITLE_X => {
                    Some((*baseline, text.as_str()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(titles.len(), TITLE_MAX_LINES);
        assert!(titles.iter().all(|(baseline, _)| *baseline < 20.0 + TITLE_STEP * TITLE_MAX_LINES as f64));
        assert!(titles[TITLE_MAX_LINES - 1].1.ends_with("..."));
    }

    #[tokio::test]
    async fn jpeg_photo_is_embedded_as_is() {
        let (jpeg, uri) = jpeg_data_uri(300);
        let composer = composer_for(vec![product("a", "Lona Front", Some(uri))]);
        let report = composer
            .export(&ReportRequest::Catalog(request(&["a"])))
            .await
            .unwrap();
        let pdf = lopdf::Document::load_mem(&report.bytes).unwrap();
        let photo = pdf
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .find(|stream| {
                stream.dict.get(b"Subtype").and_then(lopdf::Object::as_name).ok()
                    == Some(b"Image".as_slice())
            })
            .unwrap();
        assert_eq!(photo.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(photo.content, jpeg);
        assert!(report.bytes.len() < jpeg.len() + 16 * 1024);
    }

    #[tokio::test]
    async fn unloadable_image_keeps_the_page() {
        let composer = composer_for(vec![product(
            "a",
            "Lona Front",
            Some("ftp://example.com/lona.png".into()),
        )]);
        let rendered = render(&composer, None, &request(&["a"])).await.unwrap();
        assert_eq!(rendered.document.page_count(), 1);
        assert!(rendered.document.images().is_empty());
    }

    #[tokio::test]
    async fn products_without_image_are_named() {
        let composer = composer_for(vec![
            product("a", "Lona Front", None),
            product("b", "Vinilo", Some("  ".into())),
            product("c", "Banner", Some(png_data_uri())),
        ]);
        match render(&composer, None, &request(&["a"])).await {
            Err(PliegoError::MissingResource(message)) => {
                assert!(message.starts_with("El producto \"Lona Front\" no tiene imagen."))
            }
            _ => panic!("expected a missing image"),
        }
        match render(&composer, None, &request(&["a", "b", "c"])).await {
            Err(PliegoError::MissingResource(message)) => {
                assert!(message.contains("no tienen imagen: Lona Front, Vinilo."))
            }
            _ => panic!("expected missing images"),
        }
    }

    #[tokio::test]
    async fn request_errors() {
        let composer = composer_for(vec![product("a", "Lona Front", Some(png_data_uri()))]);
        assert!(matches!(
            render(&composer, None, &CatalogRequest::default()).await,
            Err(PliegoError::InvalidRequest(_))
        ));
        assert!(matches!(
            render(&composer, None, &request(&["zzz"])).await,
            Err(PliegoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn export_names_the_file_after_the_product() {
        let composer = composer_for(vec![product("a", "Lona Front", Some(png_data_uri()))]);
        let report = composer
            .export(&ReportRequest::Catalog(CatalogRequest {
                product_name: Some("Lona Front".into()),
                ..request(&["a"])
            }))
            .await
            .unwrap();
        assert_eq!(report.file_name, "Lona Front - 04-07-2025.pdf");
        assert_eq!(page_count(&report.bytes), 1);
    }
}
