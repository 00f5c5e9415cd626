// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Letterhead, filter summary and footer bands shared by the report variants.

use pliego_core::{BrandConfig, Rgb};
use pliego_document::pdf::metrics::text_width_mm;
use pliego_document::pdf::{
    Align, DrawOp, EmbeddedImage, FooterSpec, ImageId, Paginator, TextStyle,
};

use crate::models::FooterIdentity;

pub(crate) const MARGIN: f64 = 15.0;
/// Width over height of the brand logo.
pub(crate) const LOGO_ASPECT: f64 = 24.0 / 5.5;

const LOGO_TOP: f64 = 10.0;
const LOGO_MAX_HEIGHT: f64 = 10.0;
const LOGO_MAX_WIDTH: f64 = 45.0;
const LEGAL_NAME_BASELINE: f64 = 11.0;
const ADDRESS_BASELINE: f64 = 15.0;
const ADDRESS_STEP: f64 = 4.0;
pub(crate) const TITLE_BASELINE: f64 = 30.0;
const FILTER_BASELINE: f64 = 40.0;
const FILTER_STEP: f64 = 5.0;
const FILTER_RUN_GAP: f64 = 10.0;

/// Add the logo to the document being built. Pages that show it share the
/// returned id, so the raster is embedded once.
pub(crate) fn register_logo(pager: &mut Paginator, logo: Option<&EmbeddedImage>) -> Option<ImageId> {
    logo.map(|logo| pager.document_mut().add_image(logo.clone()))
}

/// Draw the registered logo with its top-left corner at (`x`, `y`), at most
/// `max_height` tall and `max_width` wide.
pub(crate) fn draw_logo(
    pager: &mut Paginator,
    id: ImageId,
    x: f64,
    y: f64,
    max_height: f64,
    max_width: f64,
) {
    let width = (max_height * LOGO_ASPECT).min(max_width);
    let height = width / LOGO_ASPECT;
    pager.draw(DrawOp::Image {
        id,
        x,
        y,
        width,
        height,
    });
}

/// Logo, legal name and address on the right, and the centred `title`.
pub(crate) fn draw_letterhead(
    pager: &mut Paginator,
    brand: &BrandConfig,
    logo: Option<&EmbeddedImage>,
    title: &str,
    title_style: TextStyle,
) {
    let page_width = pager.format().width_mm();
    if let Some(id) = register_logo(pager, logo) {
        draw_logo(pager, id, MARGIN, LOGO_TOP, LOGO_MAX_HEIGHT, LOGO_MAX_WIDTH);
    }

    let right = page_width - MARGIN;
    pager.draw(DrawOp::aligned_text(
        right,
        LEGAL_NAME_BASELINE,
        brand.legal_name.clone(),
        TextStyle::bold(9.0),
        Align::Right,
    ));
    for (i, line) in brand.address_lines.iter().enumerate() {
        pager.draw(DrawOp::aligned_text(
            right,
            ADDRESS_BASELINE + ADDRESS_STEP * i as f64,
            line.clone(),
            TextStyle::regular(8.0),
            Align::Right,
        ));
    }

    pager.draw(DrawOp::aligned_text(
        page_width / 2.0,
        TITLE_BASELINE,
        title,
        title_style,
        Align::Center,
    ));
}

/// One summary line per entry, stacked under the title. Returns the top of
/// the content that follows.
pub(crate) fn draw_filter_lines(pager: &mut Paginator, lines: &[String]) -> f64 {
    let mut baseline = FILTER_BASELINE;
    for line in lines {
        pager.draw(DrawOp::text(MARGIN, baseline, line.clone(), TextStyle::regular(9.0)));
        baseline += FILTER_STEP;
    }
    content_top(baseline)
}

/// Every run on a single line, spaced apart. Returns the top of the content
/// that follows.
pub(crate) fn draw_filter_runs(pager: &mut Paginator, runs: &[String]) -> f64 {
    if runs.is_empty() {
        return content_top(FILTER_BASELINE);
    }
    let style = TextStyle::regular(9.0);
    let mut x = MARGIN;
    for run in runs {
        pager.draw(DrawOp::text(x, FILTER_BASELINE, run.clone(), style));
        x += text_width_mm(run, style.face, style.size_pt) + FILTER_RUN_GAP;
    }
    content_top(FILTER_BASELINE + FILTER_STEP)
}

fn content_top(next_baseline: f64) -> f64 {
    next_baseline - 2.0
}

/// `<year> <trade name> | accounting e-mail | NIT | i/total`
pub(crate) fn accounting_footer(brand: &BrandConfig, year: i32) -> FooterSpec {
    FooterSpec::new(format!("{year} {}", brand.trade_name), brand.accent)
        .with_segment(brand.accounting_email.clone())
        .with_segment(format!("NIT: {}", brand.tax_id))
}

/// `<year> <trade name> | website | e-mail | phone | i/total`
pub(crate) fn commercial_footer(
    brand: &BrandConfig,
    identity: Option<&FooterIdentity>,
    year: i32,
) -> FooterSpec {
    let email = brand
        .footer_email(identity.and_then(|i| i.email.as_deref()))
        .unwrap_or_default();
    let phone = identity
        .and_then(|i| i.phone.clone())
        .unwrap_or_default();
    FooterSpec::new(format!("{year} {}", brand.trade_name), brand.accent)
        .with_center(brand.website.clone())
        .with_segment(email)
        .with_segment(phone)
}

/// Grey used for secondary captions.
pub(crate) const CAPTION_GREY: Rgb = Rgb::grey(100);

#[cfg(test)]
mod tests {
    use super::*;
    use pliego_core::PageFormat;
    use pliego_document::pdf::PageRegion;

    fn pager(format: PageFormat) -> Paginator {
        Paginator::new("t", format, PageRegion::new(15.0, 270.0), 0.0)
    }

    fn text_at(op: &DrawOp) -> Option<(f64, f64, &str)> {
        match op {
            DrawOp::Text { x, baseline, text, .. } => Some((*x, *baseline, text.as_str())),
            _ => None,
        }
    }

    #[test]
    fn legal_name_is_right_aligned() {
        let brand = BrandConfig::default();
        let mut pager = pager(PageFormat::A4_LANDSCAPE);
        draw_letterhead(&mut pager, &brand, None, "Historial de Stock", TextStyle::bold(14.0));
        let document = pager.finish(None);
        let ops = document.pages()[0].ops();
        let (x, baseline, _) = ops.iter().filter_map(text_at).find(|t| t.2 == brand.legal_name).unwrap();
        let width = text_width_mm(&brand.legal_name, TextStyle::bold(9.0).face, 9.0);
        assert!((x + width - 282.0).abs() < 1e-9);
        assert_eq!(baseline, 11.0);
        let address: Vec<f64> = ops
            .iter()
            .filter_map(text_at)
            .filter(|t| brand.address_lines.iter().any(|l| l == t.2))
            .map(|t| t.1)
            .collect();
        assert_eq!(address, vec![15.0, 19.0, 23.0]);
    }

    #[test]
    fn logo_keeps_its_aspect() {
        let logo = EmbeddedImage::rgb(2, 2, vec![0; 3 * 4]);
        let mut pager = pager(PageFormat::A4_PORTRAIT);
        draw_letterhead(&mut pager, &BrandConfig::default(), Some(&logo), "Libro Diario", TextStyle::bold(14.0));
        let document = pager.finish(None);
        match &document.pages()[0].ops()[0] {
            DrawOp::Image { width, height, .. } => {
                assert!((width / height - LOGO_ASPECT).abs() < 1e-9);
                assert!((height - 10.0).abs() < 1e-9);
            }
            other => panic!("unexpected op {other:?}"),
        }
        assert_eq!(document.images().len(), 1);
    }

    #[test]
    fn logo_is_embedded_once_for_many_pages() {
        let logo = EmbeddedImage::rgb(2, 2, vec![0; 3 * 4]);
        let mut pager = pager(PageFormat::SQUARE);
        let id = register_logo(&mut pager, Some(&logo)).unwrap();
        for page in 0..10 {
            if page > 0 {
                pager.new_page();
            }
            draw_logo(&mut pager, id, 20.0, 9.0, 7.5, 35.0);
        }
        let document = pager.finish(None);
        assert_eq!((document.page_count(), document.images().len()), (10, 1));
    }

    #[test]
    fn filter_lines_push_the_content_down() {
        let mut pager = pager(PageFormat::A4_PORTRAIT);
        assert_eq!(draw_filter_lines(&mut pager, &[]), 38.0);
        let lines = vec!["Gestión: 2025".to_string(), "Mes: Marzo".to_string()];
        assert_eq!(draw_filter_lines(&mut pager, &lines), 48.0);
        let runs = vec!["Origen: Manual".to_string(), "Fecha hasta: 30/06/2025".to_string()];
        assert_eq!(draw_filter_runs(&mut pager, &runs), 43.0);
    }

    #[test]
    fn commercial_footer_masks_personal_email() {
        let brand = BrandConfig {
            masked_emails: vec!["dueno@example.com".into()],
            ..BrandConfig::default()
        };
        let identity = FooterIdentity {
            email: Some("dueno@example.com".into()),
            phone: None,
        };
        let footer = commercial_footer(&brand, Some(&identity), 2025);
        assert_eq!(footer.segments, vec![brand.commercial_email.clone()]);
        assert_eq!(footer.center.as_deref(), Some("publicidadvialimagen.com"));
        assert_eq!(footer.lead, "2025 Publicidad Vial Imagen");
    }

    #[test]
    fn accounting_footer_carries_tax_id() {
        let footer = accounting_footer(&BrandConfig::default(), 2025);
        assert_eq!(
            footer.segments,
            vec!["contabilidad@publicidadvialimagen.com", "NIT: 164692025"]
        );
    }
}
