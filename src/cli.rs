use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-deck")]
#[command(about = "画像をまとめて1つのPDFに書き出すツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// セッション名（省略時は PHOTO_DECK_SESSION または "default"）
    #[arg(long, global = true)]
    pub session: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を取り込む（フォルダは直下の画像をファイル名順に取り込む）
    Add {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// 取り込み済みの画像を一覧表示
    List,

    /// 画像を削除
    Remove {
        /// 一覧の番号（1始まり）
        #[arg(required = true)]
        index: usize,
    },

    /// 並べ替え（無効化されており、順序は変わらない）
    Move {
        /// 移動元の番号（1始まり）
        from: usize,

        /// 移動先の番号（1始まり）
        to: usize,
    },

    /// PDFに書き出す（成功すると一覧は空になる）
    Export {
        /// 出力ファイル名（拡張子なし、省略時は images）
        #[arg(short, long, default_value = "")]
        name: String,

        /// 出力ディレクトリ（省略時は設定値またはカレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 全ページに透かしを入れる
        #[arg(short, long)]
        watermark: bool,

        /// 透かし文字（省略時は設定値）
        #[arg(long)]
        watermark_text: Option<String>,

        /// 既存ファイルを確認なしで上書き
        #[arg(short, long)]
        force: bool,
    },

    /// セッションキャッシュ管理
    Session {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,

        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 出力ディレクトリの初期値を設定
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// 透かし文字の初期値を設定
        #[arg(long)]
        set_watermark_text: Option<String>,

        /// セッションキャッシュの保存先を設定
        #[arg(long)]
        set_session_dir: Option<PathBuf>,
    },
}

/// 1始まりの番号を0始まりに変換
pub fn to_zero_based(index: usize) -> Option<usize> {
    index.checked_sub(1)
}
