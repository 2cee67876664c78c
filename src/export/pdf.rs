//! PDF生成
//!
//! printpdf 0.8 のデータ指向API（`PdfPage` + `Vec<Op>`）でページを組み立てる。
//! 画像は取り込み時のData URLから復元し、元ファイルは読み直さない。

use crate::error::{DeckError, Result};
use indicatif::ProgressBar;
use photo_deck_common::export::{plan_page, ImagePlacement, WatermarkPlacement};
use photo_deck_common::{ExportConfiguration, IntakeRecord, PageLayout, WatermarkStyle};
use printpdf::{
    BuiltinFont, Color, ExtendedGraphicsState, ExtendedGraphicsStateId, Mm, Op,
    PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData, RawImageFormat,
    Rgb, TextItem, TextMatrix, XObjectId, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

/// 画像XObjectの基準DPI（1px = 1pt）
const IMAGE_DPI: f32 = 72.0;

/// レコード一覧から1レコード1ページのPDFを生成
#[instrument(skip_all, fields(pages = records.len(), watermark = config.watermark_enabled))]
pub fn generate_pdf(
    records: &[IntakeRecord],
    config: &ExportConfiguration,
    layout: &PageLayout,
    style: &WatermarkStyle,
    progress: &ProgressBar,
) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(config.effective_output_name());

    // 透かしは全ページ共通の半透明グラフィックステートを使う
    let watermark_gs = config.watermark().map(|text| {
        if !text.chars().all(|c| (c as u32) < 0x100) {
            warn!(text = %text, "watermark contains characters outside the built-in font encoding");
        }
        let gs = ExtendedGraphicsState::default()
            .with_current_fill_alpha(style.alpha);
        doc.add_graphics_state(gs)
    });

    let mut pages = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let (image, width, height) = decode_record(record)?;
        let image_id = doc.add_image(&image);

        // 透かし文字はページごとに現在の設定から読む
        let plan = plan_page(index, width, height, config.watermark(), layout, style);

        let mut ops = image_ops(image_id, &plan.image, width);
        if let (Some(placement), Some(gs)) = (&plan.watermark, &watermark_gs) {
            ops.extend(watermark_ops(placement, style, gs.clone()));
        }

        debug!(
            index,
            file = %record.file_name,
            width,
            height,
            height_pt = plan.image.height_pt,
            "page laid out"
        );

        pages.push(PdfPage::new(
            Mm(layout.page_width_mm),
            Mm(layout.page_height_mm),
            ops,
        ));
        progress.inc(1);
    }

    doc.with_pages(pages);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "pdf save warnings");
    }

    info!(pages = records.len(), bytes = output.len(), "pdf generated");
    Ok(output)
}

/// Data URLから画像を復元（アルファ付きはRGBA8、それ以外はRGB8）
fn decode_record(record: &IntakeRecord) -> Result<(RawImage, u32, u32)> {
    let bytes = record.image_bytes()?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| DeckError::ImageLoad(format!("{}: {}", record.file_name, e)))?;

    let width = decoded.width();
    let height = decoded.height();
    if width == 0 || height == 0 {
        return Err(DeckError::ImageLoad(format!("{}: 画像サイズが0です", record.file_name)));
    }

    // 透過PNGなどはアルファを保ったまま埋め込む
    let (pixels, data_format) = if decoded.color().has_alpha() {
        (decoded.to_rgba8().into_raw(), RawImageFormat::RGBA8)
    } else {
        (decoded.to_rgb8().into_raw(), RawImageFormat::RGB8)
    };
    let raw = RawImage {
        pixels: RawImageData::U8(pixels),
        width: width as usize,
        height: height as usize,
        data_format,
        tag: Vec::new(),
    };
    Ok((raw, width, height))
}

fn image_ops(id: XObjectId, placement: &ImagePlacement, width_px: u32) -> Vec<Op> {
    let scale = placement.scale_for(width_px, IMAGE_DPI);
    vec![Op::UseXobject {
        id,
        transform: XObjectTransform {
            translate_x: Some(Pt(placement.x_pt)),
            translate_y: Some(Pt(placement.y_pt)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(IMAGE_DPI),
            rotate: None,
        },
    }]
}

fn watermark_ops(
    placement: &WatermarkPlacement,
    style: &WatermarkStyle,
    gs: ExtendedGraphicsStateId,
) -> Vec<Op> {
    let gray = style.gray_unit();
    vec![
        Op::SaveGraphicsState,
        Op::LoadGraphicsState { gs },
        Op::SetFillColor {
            col: Color::Rgb(Rgb::new(gray, gray, gray, None)),
        },
        Op::StartTextSection,
        Op::SetFontSizeBuiltinFont {
            size: Pt(placement.font_size_pt),
            font: BuiltinFont::Helvetica,
        },
        Op::SetTextMatrix {
            matrix: TextMatrix::TranslateRotate(
                Pt(placement.x_pt),
                Pt(placement.y_pt),
                placement.angle_deg,
            ),
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(placement.text.clone())],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
        Op::RestoreGraphicsState,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_deck_common::encode_data_url;

    fn record_from(name: &str, image: image::DynamicImage) -> IntakeRecord {
        let mut buf = std::io::Cursor::new(Vec::new());
        image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        IntakeRecord {
            file_name: name.to_string(),
            mime_type: "image/png".to_string(),
            encoded_data: encode_data_url("image/png", buf.get_ref()),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_keeps_alpha() {
        let rgba = image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 0, 0]));
        let (raw, width, height) = decode_record(&record_from("clear.png", rgba.into())).unwrap();

        assert_eq!((width, height), (3, 2));
        assert!(matches!(raw.data_format, RawImageFormat::RGBA8));
        match raw.pixels {
            RawImageData::U8(pixels) => {
                assert_eq!(pixels.len(), 3 * 2 * 4);
                assert!(pixels.chunks(4).all(|px| px[3] == 0));
            }
            _ => panic!("8bitの画素データではない"),
        }
    }

    #[test]
    fn test_decode_opaque_as_rgb() {
        let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
        let (raw, _, _) = decode_record(&record_from("solid.png", rgb.into())).unwrap();

        assert!(matches!(raw.data_format, RawImageFormat::RGB8));
        match raw.pixels {
            RawImageData::U8(pixels) => assert_eq!(&pixels[..3], &[10, 20, 30]),
            _ => panic!("8bitの画素データではない"),
        }
    }

    #[test]
    fn test_decode_rejects_broken_data() {
        let record = IntakeRecord {
            file_name: "broken.png".to_string(),
            mime_type: "image/png".to_string(),
            encoded_data: encode_data_url("image/png", b"not a png"),
            ..Default::default()
        };
        assert!(matches!(decode_record(&record), Err(DeckError::ImageLoad(_))));
    }
}
