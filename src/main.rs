use anyhow::{bail, Context};
use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use photo_deck::{cli, config, error, export, intake, logging, session};
use cli::{Cli, Commands};
use config::Config;
use error::DeckError;
use session::{SessionCache, Workspace};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load().context("設定ファイルを読み込めません")?;
    let session_name = config::resolve_session_name(cli.session.as_deref());

    match cli.command {
        Commands::Add { paths } => {
            println!("📥 photo-deck - 取り込み\n");

            let mut workspace = open_workspace(&config, &session_name)?;
            let report = intake::ingest_gesture(&mut workspace, paths).await?;

            println!(
                "✔ {}枚を取り込みました（合計 {}枚）",
                report.accepted_count(),
                workspace.records().len()
            );
            for rejected in &report.rejected {
                println!("  - スキップ: {} ({})", rejected.path.display(), rejected.reason);
            }
            for failed in &report.failed {
                println!("  ✖ 読み込み失敗: {} ({})", failed.path.display(), failed.message);
            }
        }

        Commands::List => {
            let workspace = open_workspace(&config, &session_name)?;

            if workspace.records().is_empty() {
                println!("画像はありません（セッション: {}）", workspace.name());
                return Ok(());
            }

            println!("セッション: {}（{}枚）", workspace.name(), workspace.records().len());
            for (i, record) in workspace.records().iter().enumerate() {
                println!(
                    "{:>3}. {}  {}x{}  {}  {} bytes  [{}]",
                    i + 1,
                    record.file_name,
                    record.width,
                    record.height,
                    record.mime_type,
                    record.byte_len,
                    record.short_digest()
                );
            }
        }

        Commands::Remove { index } => {
            let Some(position) = cli::to_zero_based(index) else {
                bail!("番号は1から指定してください");
            };

            let mut workspace = open_workspace(&config, &session_name)?;
            let removed = workspace.remove(position)?;
            println!(
                "✔ 削除しました: {}（残り {}枚）",
                removed.file_name,
                workspace.records().len()
            );
        }

        Commands::Move { from, to } => {
            let mut workspace = open_workspace(&config, &session_name)?;
            workspace.reorder(from.saturating_sub(1), to.saturating_sub(1));
            println!("並べ替えは無効です。順序は変わりません");
        }

        Commands::Export { name, output, watermark, watermark_text, force } => {
            println!("📄 photo-deck - PDF書き出し\n");

            let mut workspace = open_workspace(&config, &session_name)?;
            if workspace.records().is_empty() {
                return Err(DeckError::NoImages.into());
            }

            if watermark {
                workspace.toggle_watermark();
            }
            workspace.set_watermark_text(watermark_text.unwrap_or_else(|| config.watermark_text.clone()));
            workspace.set_output_name(name);

            let output_dir = output.unwrap_or_else(|| config.output_dir());
            let path = export::output_path(&output_dir, workspace.export_config());
            if path.exists() && !force {
                let overwrite = Confirm::new()
                    .with_prompt(format!("{} は既に存在します。上書きしますか?", path.display()))
                    .default(false)
                    .interact()?;
                if !overwrite {
                    println!("中止しました");
                    return Ok(());
                }
            }

            let progress = ProgressBar::new(workspace.records().len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} ページ") {
                progress.set_style(style);
            }

            let outcome = export::export_now(&mut workspace, &output_dir, &progress)?;
            progress.finish_and_clear();

            println!("✔ PDF出力: {}（{}ページ, {} bytes）", outcome.path.display(), outcome.pages, outcome.bytes);
            println!("\n✅ 書き出し完了（一覧をクリアしました）");
        }

        Commands::Session { clear, info, yes } => {
            let cache = SessionCache::new(config.session_path(&session_name)?);
            let entry_path = cache.entry_path();

            if info || !clear {
                if cache.exists() {
                    println!("セッション情報:");
                    println!("  名前: {}", session_name);
                    println!("  パス: {}", entry_path.display());
                    println!("  件数: {}", cache.load().len());
                    if let Some(size) = cache.size() {
                        println!("  サイズ: {} bytes", size);
                    }
                } else {
                    println!("セッションキャッシュが存在しません: {}", entry_path.display());
                }
            }

            if clear {
                let confirmed = yes
                    || Confirm::new()
                        .with_prompt(format!("セッション {} を削除しますか?", session_name))
                        .default(false)
                        .interact()?;

                if confirmed {
                    let _lock = cache.lock()?;
                    match cache.remove() {
                        Ok(true) => println!("✔ セッションキャッシュを削除しました: {}", entry_path.display()),
                        Ok(false) => println!("セッションキャッシュが存在しません"),
                        Err(e) => println!("セッションキャッシュ削除エラー: {}", e),
                    }
                }
            }
        }

        Commands::Config { show, set_output_dir, set_watermark_text, set_session_dir } => {
            let mut config = config;
            let mut changed = false;

            if let Some(dir) = set_output_dir {
                config.output_dir = Some(dir);
                changed = true;
            }
            if let Some(text) = set_watermark_text {
                config.watermark_text = text;
                changed = true;
            }
            if let Some(dir) = set_session_dir {
                config.session_dir = Some(dir);
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  出力ディレクトリ: {}", config.output_dir().display());
                println!("  透かし文字: {}", config.watermark_text);
                match config.sessions_root() {
                    Ok(root) => println!("  セッション保存先: {}", root.display()),
                    Err(e) => println!("  セッション保存先: 不明 ({})", e),
                }
            }
        }
    }

    Ok(())
}

fn open_workspace(config: &Config, session_name: &str) -> error::Result<Workspace> {
    let dir = config.session_path(session_name)?;
    Ok(Workspace::open(session_name, dir))
}
