//! 画像の取り込み
//!
//! 1回の取り込み操作（ジェスチャ）で渡されたパスを画像に絞り込み、
//! 各ファイルを並行に読み込んでData URL化し、全件そろってから一覧へ追加する。
//! 読めなかったファイルはスキップして報告し、残りは追加する。

pub mod queue;

pub use queue::{AppendQueue, Ticket};

use crate::error::{DeckError, Result};
use crate::session::Workspace;
use photo_deck_common::{encode_data_url, IntakeRecord};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// 取り込み候補（画像と判定されたファイル）
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// 画像ではないため読み込まなかったファイル
#[derive(Debug, Clone)]
pub struct Rejected {
    pub path: PathBuf,
    pub reason: String,
}

/// 読み込みに失敗したファイル
#[derive(Debug, Clone)]
pub struct IntakeFailure {
    pub path: PathBuf,
    pub message: String,
}

/// 1回の取り込み操作の結果
#[derive(Debug, Default)]
pub struct GestureOutcome {
    /// 読み込み済みレコード（プレビュー未割り当て）
    pub loaded: Vec<IntakeRecord>,
    pub rejected: Vec<Rejected>,
    pub failed: Vec<IntakeFailure>,
}

/// 取り込み全体の報告
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub accepted: Vec<String>,
    pub rejected: Vec<Rejected>,
    pub failed: Vec<IntakeFailure>,
}

impl IntakeReport {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// 拡張子から宣言上のMIMEタイプを求める（画像以外は None）
pub fn declared_mime(path: &Path) -> Option<&'static str> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
        .filter(|mime| mime.starts_with("image/"))
}

/// SHA-256（16進小文字）
pub fn compute_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// 渡されたパスを候補に展開
///
/// ディレクトリは直下のファイルをファイル名順に展開する（再帰しない）。
/// ファイル指定は渡された順を保つ。
pub fn collect_candidates(paths: &[PathBuf]) -> GestureCandidates {
    let mut out = GestureCandidates::default();

    for path in paths {
        if path.is_dir() {
            let mut children: Vec<PathBuf> = WalkDir::new(path)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .collect();
            children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

            for child in children {
                out.push_file(child);
            }
        } else if path.is_file() {
            out.push_file(path.clone());
        } else {
            out.failed.push(IntakeFailure {
                path: path.clone(),
                message: DeckError::FileNotFound(path.display().to_string()).to_string(),
            });
        }
    }

    out
}

/// 候補の展開結果
#[derive(Debug, Default)]
pub struct GestureCandidates {
    pub candidates: Vec<Candidate>,
    pub rejected: Vec<Rejected>,
    pub failed: Vec<IntakeFailure>,
}

impl GestureCandidates {
    fn push_file(&mut self, path: PathBuf) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match declared_mime(&path) {
            Some(mime_type) => self.candidates.push(Candidate {
                path,
                file_name,
                mime_type,
            }),
            None => self.rejected.push(Rejected {
                path,
                reason: "画像ファイルではありません".to_string(),
            }),
        }
    }
}

/// 1ファイルを読み込んでレコードを作る
///
/// Data URL化はここで一度だけ行う。
pub async fn read_candidate(candidate: Candidate) -> Result<IntakeRecord> {
    let bytes = tokio::fs::read(&candidate.path).await?;

    let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| DeckError::ImageLoad(format!("{}: {}", candidate.file_name, e)))?;

    Ok(IntakeRecord {
        file_name: candidate.file_name,
        source_path: candidate.path.display().to_string(),
        mime_type: candidate.mime_type.to_string(),
        encoded_data: encode_data_url(candidate.mime_type, &bytes),
        byte_len: bytes.len() as u64,
        digest: compute_digest(&bytes),
        width,
        height,
        added_at: chrono::Local::now().to_rfc3339(),
        preview: None,
    })
}

/// 1回の取り込み操作を実行
///
/// 全ファイルを並行に読み込み、すべて終わってから渡された順にまとめて返す。
pub async fn read_gesture(paths: Vec<PathBuf>) -> GestureOutcome {
    let GestureCandidates {
        candidates,
        rejected,
        mut failed,
    } = collect_candidates(&paths);

    let handles: Vec<_> = candidates
        .into_iter()
        .map(|candidate| {
            let path = candidate.path.clone();
            (path, tokio::spawn(read_candidate(candidate)))
        })
        .collect();

    let mut loaded = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        match handle.await {
            Ok(Ok(record)) => loaded.push(record),
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                failed.push(IntakeFailure {
                    path,
                    message: e.to_string(),
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "read task aborted");
                failed.push(IntakeFailure {
                    path,
                    message: DeckError::Intake(e.to_string()).to_string(),
                });
            }
        }
    }

    GestureOutcome {
        loaded,
        rejected,
        failed,
    }
}

/// 複数の取り込み操作を並行に実行し、開始順に一覧へ追加する
pub async fn ingest(workspace: &mut Workspace, gestures: Vec<Vec<PathBuf>>) -> Result<IntakeReport> {
    let mut queue = AppendQueue::new();
    let mut tasks = JoinSet::new();

    for paths in gestures {
        let ticket = queue.begin();
        tasks.spawn(async move { (ticket, read_gesture(paths).await) });
    }

    let mut report = IntakeReport::default();
    while let Some(joined) = tasks.join_next().await {
        let (ticket, outcome) = joined.map_err(|e| DeckError::Intake(e.to_string()))?;
        debug!(?ticket, loaded = outcome.loaded.len(), "gesture finished");

        for ready in queue.complete(ticket, outcome) {
            report
                .accepted
                .extend(ready.loaded.iter().map(|r| r.file_name.clone()));
            report.rejected.extend(ready.rejected);
            report.failed.extend(ready.failed);
            workspace.append_batch(ready.loaded)?;
        }
    }

    info!(
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        failed = report.failed.len(),
        total = workspace.records().len(),
        "intake finished"
    );

    Ok(report)
}

/// 1回の取り込み操作を実行して一覧へ追加
pub async fn ingest_gesture(workspace: &mut Workspace, paths: Vec<PathBuf>) -> Result<IntakeReport> {
    ingest(workspace, vec![paths]).await
}
