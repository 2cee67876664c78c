//! レイアウト設定モジュール
//!
//! mm基準のページ定義（Source of Truth）。pt値はここから導出する。

// ============================================
// mm基準レイアウト
// ============================================

/// A4サイズ（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// 画像の左上からの余白（mm）
pub const IMAGE_INSET_MM: f32 = 10.0;

/// 画像の固定幅（mm）。高さは縦横比から決まる
pub const IMAGE_WIDTH_MM: f32 = 180.0;

// ============================================
// 透かし
// ============================================

pub const WATERMARK_FONT_SIZE_PT: f32 = 14.0;
pub const WATERMARK_GRAY: u8 = 150;
pub const WATERMARK_ALPHA: f32 = 0.5;
pub const WATERMARK_ANGLE_DEG: f32 = 45.0;

// ============================================
// 変換係数
// ============================================

/// mm → pt変換 (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// ページレイアウト
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// 上端・左端からの余白（mm）
    pub inset_mm: f32,
    pub image_width_mm: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageLayout {
    /// A4縦、余白10mm、画像幅180mm
    pub fn a4() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            inset_mm: IMAGE_INSET_MM,
            image_width_mm: IMAGE_WIDTH_MM,
        }
    }

    /// 画像の描画高さ（mm）
    ///
    /// 幅0の画像は高さ0として扱う。
    pub fn image_height_mm(&self, width_px: u32, height_px: u32) -> f32 {
        if width_px == 0 {
            return 0.0;
        }
        self.image_width_mm * height_px as f32 / width_px as f32
    }

    pub fn page_width_pt(&self) -> f32 {
        mm_to_pt(self.page_width_mm)
    }

    pub fn page_height_pt(&self) -> f32 {
        mm_to_pt(self.page_height_mm)
    }

    /// ページ中心（pt、左下原点）
    pub fn center_pt(&self) -> (f32, f32) {
        (self.page_width_pt() / 2.0, self.page_height_pt() / 2.0)
    }
}

/// 透かしの描画スタイル
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkStyle {
    pub font_size_pt: f32,
    /// RGB共通のグレー値 (0-255)
    pub gray: u8,
    /// 塗りの不透明度 (0.0-1.0)
    pub alpha: f32,
    /// 水平からの回転角（度、反時計回り）
    pub angle_deg: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            font_size_pt: WATERMARK_FONT_SIZE_PT,
            gray: WATERMARK_GRAY,
            alpha: WATERMARK_ALPHA,
            angle_deg: WATERMARK_ANGLE_DEG,
        }
    }
}

impl WatermarkStyle {
    /// PDF用のグレー値 (0.0-1.0)
    pub fn gray_unit(&self) -> f32 {
        self.gray as f32 / 255.0
    }
}

/// mm → pt 変換
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// pt → mm 変換
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}
