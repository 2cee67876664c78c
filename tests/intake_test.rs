//! 取り込み機能テスト
//!
//! 絞り込み・並行読み込み・バッチ単位の追加順序を検証

use photo_deck::intake;
use photo_deck::session::Workspace;
use photo_deck_common::decode_data_url;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200]));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height)).unwrap();
    path
}

fn names(workspace: &Workspace) -> Vec<String> {
    workspace.records().iter().map(|r| r.file_name.clone()).collect()
}

/// 画像のみ取り込み、Data URLは元のバイト列と一致する
#[tokio::test]
async fn test_ingest_encodes_once_per_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let png = write_png(dir.path(), "photo.png", 64, 48);

    let mut workspace = Workspace::open("t", dir.path().join("session"));
    let report = intake::ingest_gesture(&mut workspace, vec![png.clone()]).await.unwrap();

    assert_eq!(report.accepted, vec!["photo.png".to_string()]);
    let record = workspace.records().get(0).unwrap();
    assert_eq!(record.mime_type, "image/png");
    assert_eq!((record.width, record.height), (64, 48));
    assert_eq!(record.byte_len, std::fs::metadata(&png).unwrap().len());
    assert_eq!(record.digest.len(), 64);
    assert!(!record.added_at.is_empty());

    let (mime, bytes) = decode_data_url(&record.encoded_data).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, std::fs::read(&png).unwrap());

    let preview = record.preview.as_ref().expect("プレビュー参照がない");
    assert!(workspace.previews().is_live(preview));
}

/// 読めないファイルはスキップして報告し、残りは追加する
#[tokio::test]
async fn test_ingest_skips_failures_without_aborting() {
    let dir = tempdir().expect("Failed to create temp dir");
    let good1 = write_png(dir.path(), "good1.png", 8, 8);
    let good2 = write_png(dir.path(), "good2.png", 8, 8);
    let corrupt = dir.path().join("corrupt.png");
    std::fs::write(&corrupt, b"not really a png").unwrap();
    let text = dir.path().join("notes.txt");
    std::fs::write(&text, b"hello").unwrap();
    let missing = dir.path().join("missing.jpg");

    let mut workspace = Workspace::open("t", dir.path().join("session"));
    let report = intake::ingest_gesture(
        &mut workspace,
        vec![good1, corrupt.clone(), text.clone(), missing.clone(), good2],
    )
    .await
    .unwrap();

    assert_eq!(report.accepted, vec!["good1.png".to_string(), "good2.png".to_string()]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].path, text);
    assert!(report.has_failures());

    let failed: Vec<_> = report.failed.iter().map(|f| f.path.clone()).collect();
    assert!(failed.contains(&corrupt));
    assert!(failed.contains(&missing));

    assert_eq!(names(&workspace), vec!["good1.png", "good2.png"]);
}

/// フォルダ指定は直下の画像をファイル名順に取り込む
#[tokio::test]
async fn test_ingest_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("input");
    std::fs::create_dir(&input).unwrap();
    write_png(&input, "b.png", 4, 4);
    write_png(&input, "a.png", 4, 4);
    std::fs::write(input.join("readme.md"), b"#").unwrap();

    let mut workspace = Workspace::open("t", dir.path().join("session"));
    intake::ingest_gesture(&mut workspace, vec![input]).await.unwrap();

    assert_eq!(names(&workspace), vec!["a.png", "b.png"]);
}

/// 重なった取り込み操作は開始順に追加される
#[tokio::test]
async fn test_overlapping_gestures_commit_in_start_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    // 最初の操作は大きい画像を多めに含み、後の操作より遅く終わりやすい
    let first: Vec<_> = (0..4)
        .map(|i| write_png(dir.path(), &format!("first_{}.png", i), 400, 400))
        .collect();
    let second = vec![write_png(dir.path(), "second.png", 2, 2)];
    let third = vec![write_png(dir.path(), "third.png", 2, 2)];

    let mut workspace = Workspace::open("t", dir.path().join("session"));
    let report = intake::ingest(&mut workspace, vec![first, second, third]).await.unwrap();

    assert_eq!(report.accepted_count(), 6);
    assert_eq!(
        names(&workspace),
        vec!["first_0.png", "first_1.png", "first_2.png", "first_3.png", "second.png", "third.png"]
    );
}

/// 既存の一覧の末尾に追加される
#[tokio::test]
async fn test_ingest_appends_to_existing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = write_png(dir.path(), "a.png", 4, 4);
    let b = write_png(dir.path(), "b.png", 4, 4);

    let mut workspace = Workspace::open("t", dir.path().join("session"));
    intake::ingest_gesture(&mut workspace, vec![b]).await.unwrap();
    intake::ingest_gesture(&mut workspace, vec![a]).await.unwrap();

    assert_eq!(names(&workspace), vec!["b.png", "a.png"]);
}

/// 画像が1枚もない操作では何も追加されない
#[tokio::test]
async fn test_ingest_nothing_accepted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let text = dir.path().join("a.txt");
    std::fs::write(&text, b"x").unwrap();

    let mut workspace = Workspace::open("t", dir.path().join("session"));
    let report = intake::ingest_gesture(&mut workspace, vec![text]).await.unwrap();

    assert_eq!(report.accepted_count(), 0);
    assert!(workspace.records().is_empty());
    assert!(!workspace.cache().exists());
}
