pub mod pdf;

use crate::error::{DeckError, Result};
use crate::session::Workspace;
use indicatif::ProgressBar;
use lazy_static::lazy_static;
use photo_deck_common::{ExportConfiguration, PageLayout, WatermarkStyle};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

/// 出力ファイルの拡張子
pub const OUTPUT_EXTENSION: &str = "pdf";

lazy_static! {
    // ファイル名に使えない文字
    static ref INVALID_FILE_CHARS: Regex = Regex::new(r#"[\\/:*?"<>|\x00-\x1F]"#).unwrap();
    static ref PDF_SUFFIX: Regex = Regex::new(r"(?i)\.pdf$").unwrap();
}

/// 書き出し結果
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub pages: usize,
    pub bytes: usize,
}

/// 出力ファイル名（"<name>.pdf"）
///
/// 空なら "images"。使えない文字は "_" に置き換え、".pdf" の重複は付けない。
pub fn output_file_name(config: &ExportConfiguration) -> String {
    let name = config.effective_output_name();
    let name = PDF_SUFFIX.replace(name, "");
    let name = INVALID_FILE_CHARS.replace_all(&name, "_");
    let name = name.trim();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        format!("{}.{}", photo_deck_common::DEFAULT_OUTPUT_NAME, OUTPUT_EXTENSION)
    } else {
        format!("{}.{}", name, OUTPUT_EXTENSION)
    }
}

pub fn output_path(output_dir: &Path, config: &ExportConfiguration) -> PathBuf {
    output_dir.join(output_file_name(config))
}

/// 現在の一覧をPDFに書き出す
///
/// 一覧が空なら何もせず `NoImages` を返す。
/// 書き出しに成功した場合のみ、一覧・セッションキャッシュ・プレビュー参照をすべて破棄する。
/// 書き出し中はセッションをロックし、別プロセスの追加が消えないようにする。
pub fn export_now(
    workspace: &mut Workspace,
    output_dir: &Path,
    progress: &ProgressBar,
) -> Result<ExportOutcome> {
    let _lock = workspace.lock()?;
    workspace.refresh();

    if workspace.records().is_empty() {
        return Err(DeckError::NoImages);
    }

    let config = workspace.export_config().clone();
    let bytes = pdf::generate_pdf(
        workspace.records().as_slice(),
        &config,
        &PageLayout::a4(),
        &WatermarkStyle::default(),
        progress,
    )?;

    std::fs::create_dir_all(output_dir)?;
    let path = output_path(output_dir, &config);
    std::fs::write(&path, &bytes)?;

    let pages = workspace.records().len();
    info!(path = %path.display(), pages, "exported");

    workspace.clear_locked()?;

    Ok(ExportOutcome {
        path,
        pages,
        bytes: bytes.len(),
    })
}
