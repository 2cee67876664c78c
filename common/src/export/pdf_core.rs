//! PDF export core utilities shared by the CLI and tests.
//!
//! 描画エンジンに依存しない配置計算のみを行う（単位はpt、左下原点）。

use crate::layout::{mm_to_pt, PageLayout, WatermarkStyle};

/// Helvetica の字幅（1000単位、WinAnsi 0x20..=0x7E）
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// 表にない文字の字幅
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica で描画したときの文字列幅（pt）
pub fn helvetica_text_width_pt(text: &str, font_size_pt: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (0x20..=0x7E).contains(&code) {
                HELVETICA_WIDTHS[(code - 0x20) as usize] as u32
            } else {
                FALLBACK_WIDTH as u32
            }
        })
        .sum();
    units as f32 * font_size_pt / 1000.0
}

/// 画像の配置（pt）
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// 左端
    pub x_pt: f32,
    /// 下端
    pub y_pt: f32,
    pub width_pt: f32,
    pub height_pt: f32,
}

impl ImagePlacement {
    /// 左上から余白をとり、固定幅・縦横比維持で配置
    pub fn for_image(layout: &PageLayout, width_px: u32, height_px: u32) -> Self {
        let width_pt = mm_to_pt(layout.image_width_mm);
        let height_pt = mm_to_pt(layout.image_height_mm(width_px, height_px));
        let inset_pt = mm_to_pt(layout.inset_mm);
        let top_pt = layout.page_height_pt() - inset_pt;

        Self {
            x_pt: inset_pt,
            y_pt: top_pt - height_pt,
            width_pt,
            height_pt,
        }
    }

    /// 上端（pt）
    pub fn top_pt(&self) -> f32 {
        self.y_pt + self.height_pt
    }

    /// 指定DPIで画像を描画幅に合わせる拡大率
    pub fn scale_for(&self, width_px: u32, dpi: f32) -> f32 {
        if width_px == 0 {
            return 0.0;
        }
        let native_width_pt = width_px as f32 / dpi * 72.0;
        self.width_pt / native_width_pt
    }
}

/// 透かしの配置（pt）
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkPlacement {
    pub text: String,
    /// ベースライン始点
    pub x_pt: f32,
    pub y_pt: f32,
    pub angle_deg: f32,
    pub font_size_pt: f32,
    pub text_width_pt: f32,
}

impl WatermarkPlacement {
    /// ベースラインの中点がページ中心に来るように配置
    pub fn centered(text: &str, layout: &PageLayout, style: &WatermarkStyle) -> Self {
        let text_width_pt = helvetica_text_width_pt(text, style.font_size_pt);
        let (cx, cy) = layout.center_pt();
        let rad = style.angle_deg.to_radians();
        let half = text_width_pt / 2.0;

        Self {
            text: text.to_string(),
            x_pt: cx - half * rad.cos(),
            y_pt: cy - half * rad.sin(),
            angle_deg: style.angle_deg,
            font_size_pt: style.font_size_pt,
            text_width_pt,
        }
    }

    /// ベースラインの中点（pt）
    pub fn midpoint_pt(&self) -> (f32, f32) {
        let rad = self.angle_deg.to_radians();
        let half = self.text_width_pt / 2.0;
        (self.x_pt + half * rad.cos(), self.y_pt + half * rad.sin())
    }
}

/// 1ページ分の配置計画
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub index: usize,
    pub image: ImagePlacement,
    pub watermark: Option<WatermarkPlacement>,
}

/// ページの配置を計算
pub fn plan_page(
    index: usize,
    width_px: u32,
    height_px: u32,
    watermark: Option<&str>,
    layout: &PageLayout,
    style: &WatermarkStyle,
) -> PagePlan {
    PagePlan {
        index,
        image: ImagePlacement::for_image(layout, width_px, height_px),
        watermark: watermark.map(|text| WatermarkPlacement::centered(text, layout, style)),
    }
}
