use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inspect-ai")]
#[command(about = "電動工具安全検査: 写真AI解析から合否サマリーまで", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真を解析して検査計画JSONを出力
    Analyze {
        /// 機器の写真 (jpg/png)
        #[arg(required = true)]
        image: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 対話式で検査を実施
    Inspect {
        /// 機器の写真（省略時は撮影画面で入力）
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// 同梱のデモ用検査計画を使う（解析APIを呼ばない）
        #[arg(long)]
        offline: bool,

        /// 保存時に検査結果JSONを書き出すファイル
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 保存済み検査JSONの合否サマリーを表示
    Summary {
        /// 検査結果JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 電気安全検査を測定済みとして扱う
        #[arg(long)]
        measured: bool,
    },

    /// JWTを取得して表示
    Jwt,

    /// 設定を表示/編集
    Config {
        /// 解析APIのURLを設定
        #[arg(long)]
        set_analysis_url: Option<String>,

        /// タイムアウト秒数を設定
        #[arg(long)]
        set_timeout: Option<u64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
