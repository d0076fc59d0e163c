//! 対話式検査フロー
//!
//! Home → Capture → Inspection → Result → {Label → Linked | Saved} の
//! 各画面をターミナルのプロンプトで再現する。

use crate::analyzer::AnalysisClient;
use crate::capture::capture_image;
use crate::config::Config;
use crate::error::{InspectAiError, Result};
use crate::jwt::JwtClient;
use crate::session::InspectionSession;
use dialoguer::{Input, Select};
use indicatif::ProgressBar;
use inspect_ai_common::{
    measurement_display, Answer, InspectionDocument, InspectionSummary, OrderKey, SectionKey,
    Step, YesNo,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

type Session = InspectionSession<AnalysisClient>;

#[derive(Debug, Clone, Default)]
pub struct InteractiveOptions {
    /// 最初の撮影に使う写真
    pub image: Option<PathBuf>,
    /// 解析APIを呼ばず同梱ドキュメントを使う
    pub offline: bool,
    /// 保存時の書き出し先
    pub output: Option<PathBuf>,
}

enum ScreenOutcome {
    Continue,
    Quit,
}

/// 検査画面の操作
#[derive(Debug, Clone, PartialEq)]
enum InspectionChoice {
    Question(SectionKey, OrderKey),
    Measure,
    ShowResult,
    Back,
}

fn select(prompt: &str, items: &[String]) -> Result<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(|e| InspectAiError::CliExecution(e.to_string()))
}

fn input_path(prompt: &str) -> Result<Option<PathBuf>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| InspectAiError::CliExecution(e.to_string()))?;

    let trimmed = input.trim();
    Ok(if trimmed.is_empty() { None } else { Some(PathBuf::from(trimmed)) })
}

pub async fn run_interactive(config: &Config, options: InteractiveOptions) -> Result<()> {
    let client = AnalysisClient::from_config(config)?;
    let mut session = InspectionSession::new(client);
    session.store_mut().subscribe(|event| {
        tracing::debug!(
            revision = event.revision,
            change = ?event.change,
            measured = event.measured,
            "store updated"
        );
    });

    let mut preset_image = options.image.clone();

    loop {
        println!("── {} ──", session.step().title());

        let outcome = match session.step() {
            Step::Home => home_screen(&mut session, config).await,
            Step::Capture => {
                capture_screen(&mut session, config, options.offline, &mut preset_image).await
            }
            Step::Inspection => inspection_screen(&mut session),
            Step::Result => result_screen(&mut session, options.output.as_deref()),
            Step::Label => label_screen(&mut session, config),
            Step::Linked => linked_screen(&mut session, options.output.as_deref()),
            Step::Saved => saved_screen(&mut session),
        };

        match outcome {
            Ok(ScreenOutcome::Continue) => {}
            Ok(ScreenOutcome::Quit) => break,
            // 端末が使えない場合は続行できない
            Err(e @ InspectAiError::CliExecution(_)) => return Err(e),
            Err(e) => println!("⚠ {}\n", e),
        }
    }

    session.cancel_analysis();
    Ok(())
}

async fn home_screen(session: &mut Session, config: &Config) -> Result<ScreenOutcome> {
    let items = vec![
        "新しい検査を開始".to_string(),
        "JWTを取得".to_string(),
        "終了".to_string(),
    ];

    match select("メニュー", &items)? {
        0 => {
            session.start_capture()?;
        }
        1 => {
            let client = JwtClient::new(config.jwt_settings()?, config.timeout())?;
            let jwt = client.fetch_jwt().await?;
            println!("✔ JWT: {}\n", jwt);
        }
        _ => return Ok(ScreenOutcome::Quit),
    }

    Ok(ScreenOutcome::Continue)
}

async fn capture_screen(
    session: &mut Session,
    config: &Config,
    offline: bool,
    preset: &mut Option<PathBuf>,
) -> Result<ScreenOutcome> {
    if offline {
        session.use_fallback()?;
        println!("✔ デモ用検査計画を読み込みました\n");
        return Ok(ScreenOutcome::Continue);
    }

    let path = match preset.take() {
        Some(path) => path,
        None => {
            let items = vec![
                "写真を撮影（ファイルを指定）".to_string(),
                "デモ用検査計画を使う".to_string(),
                "戻る".to_string(),
            ];
            match select("撮影", &items)? {
                0 => match input_path("写真ファイルのパス（空欄で戻る）")? {
                    Some(path) => path,
                    None => return Ok(ScreenOutcome::Continue),
                },
                1 => {
                    session.use_fallback()?;
                    println!("✔ デモ用検査計画を読み込みました\n");
                    return Ok(ScreenOutcome::Continue);
                }
                _ => {
                    session.back()?;
                    return Ok(ScreenOutcome::Continue);
                }
            }
        }
    };

    let image = capture_image(&path, config.max_image_size, config.jpeg_quality)?;
    session.begin_analysis(image)?;

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("AIで写真を解析中... (Ctrl+Cで中断)");

    let finished = tokio::select! {
        result = session.finish_analysis() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    spinner.finish_and_clear();

    match finished {
        Some(Ok(_)) => {
            if let Some(doc) = session.document() {
                print_device(&doc);
            }
        }
        Some(Err(e)) => {
            println!("⚠ 解析に失敗しました: {}", e);
            if e.is_retryable() {
                println!("  もう一度撮影してください\n");
            }
        }
        None => {
            // 画面を離れるので実行中の解析は中断される
            session.back()?;
            println!("解析を中断しました\n");
        }
    }

    Ok(ScreenOutcome::Continue)
}

fn print_device(doc: &InspectionDocument) {
    println!("機器: {}", doc.device);
    println!("  保護クラス: {}", doc.appliance_classification.protection_class);
    println!("  型番: {}", doc.technical_data.model_number);
    println!("  電圧: {}", doc.technical_data.voltage);
    println!("  シリアル番号: {}", doc.technical_data.serial_number);
    println!("  セッションID: {}\n", doc.session_id);
}

/// 検査画面の選択肢を組み立てる（表示文言と操作の組）
fn inspection_choices(doc: &InspectionDocument, measured: bool) -> Vec<(String, InspectionChoice)> {
    let mut choices = Vec::new();

    for key in [SectionKey::Visual, SectionKey::Functional] {
        if let Some(section) = doc.tests.section(key) {
            for item in &section.items {
                let mark = match item.user_response {
                    Answer::Yes => "[Yes]",
                    Answer::No => "[No ]",
                    Answer::Unanswered => "[   ]",
                };
                choices.push((
                    format!("{} {} {}. {}", mark, key.title(), item.execution_order, item.name),
                    InspectionChoice::Question(key, item.execution_order.clone()),
                ));
            }
        }
    }

    if doc.tests.section(SectionKey::Electrical).is_some() {
        let label = if measured { "測定済み (Measure)" } else { "測定する (Measure)" };
        choices.push((label.to_string(), InspectionChoice::Measure));
    }
    choices.push(("検査結果へ (Inspection Result)".to_string(), InspectionChoice::ShowResult));
    choices.push(("戻る".to_string(), InspectionChoice::Back));
    choices
}

fn print_electrical(doc: &InspectionDocument, measured: bool) {
    let Some(section) = doc.tests.section(SectionKey::Electrical) else {
        return;
    };

    println!("{}:", SectionKey::Electrical.title());
    for item in &section.items {
        println!(
            "  {}. {} - {}",
            item.execution_order,
            item.name,
            measurement_display(item, measured)
        );
    }
    println!();
}

fn inspection_screen(session: &mut Session) -> Result<ScreenOutcome> {
    let doc = session
        .document()
        .ok_or(inspect_ai_common::Error::NoDocument)?;
    let measured = session.store().is_measured();

    print_electrical(&doc, measured);

    let choices = inspection_choices(&doc, measured);
    let labels: Vec<String> = choices.iter().map(|(label, _)| label.clone()).collect();
    let index = select("検査項目", &labels)?;

    match &choices[index].1 {
        InspectionChoice::Question(section, order) => {
            let clicked = match select("回答", &["Yes".to_string(), "No".to_string()])? {
                0 => YesNo::Yes,
                _ => YesNo::No,
            };
            let answer = session.answer(*section, order, clicked)?;
            println!("  → {}\n", answer);
        }
        InspectionChoice::Measure => {
            if session.mark_measured()? {
                println!("✔ 測定しました\n");
            }
        }
        InspectionChoice::ShowResult => {
            let summary = session.show_result()?;
            print_summary(&summary);
        }
        InspectionChoice::Back => {
            session.back()?;
        }
    }

    Ok(ScreenOutcome::Continue)
}

pub fn print_summary(summary: &InspectionSummary) {
    for key in SectionKey::ALL {
        println!("{}", key.title());
        println!("  Status: {}", summary.status(key));
    }
    if summary.overall_passed() {
        println!("\n✅ 合格\n");
    } else {
        println!("\n❌ 不合格または未完了\n");
    }
}

fn save_inspection(session: &mut Session, output: Option<&Path>) -> Result<()> {
    let doc = session.save()?;
    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&*doc)?;
        std::fs::write(path, json)?;
        println!("✔ 検査結果を保存: {}", path.display());
    }
    Ok(())
}

fn result_screen(session: &mut Session, output: Option<&Path>) -> Result<ScreenOutcome> {
    let items = vec![
        "ラベルを追加".to_string(),
        "検査を保存".to_string(),
        "戻る".to_string(),
    ];

    match select("検査結果", &items)? {
        0 => {
            session.add_label()?;
        }
        1 => save_inspection(session, output)?,
        _ => {
            session.back()?;
        }
    }

    Ok(ScreenOutcome::Continue)
}

fn label_screen(session: &mut Session, config: &Config) -> Result<ScreenOutcome> {
    match input_path("ラベル写真のパス（空欄で戻る）")? {
        Some(path) => {
            let label = capture_image(&path, config.max_image_size, config.jpeg_quality)?;
            session.link_label(label)?;
        }
        None => {
            session.back()?;
        }
    }
    Ok(ScreenOutcome::Continue)
}

fn linked_screen(session: &mut Session, output: Option<&Path>) -> Result<ScreenOutcome> {
    println!("✔ ラベルとデバイスを紐付けました\n");

    let items = vec!["検査を保存".to_string(), "終了".to_string()];
    match select("次の操作", &items)? {
        0 => save_inspection(session, output)?,
        _ => return Ok(ScreenOutcome::Quit),
    }
    Ok(ScreenOutcome::Continue)
}

fn saved_screen(session: &mut Session) -> Result<ScreenOutcome> {
    println!("✔ 検査を保存しました\n");

    let items = vec!["新しい検査を開始".to_string(), "終了".to_string()];
    match select("次の操作", &items)? {
        0 => {
            session.start_new()?;
            Ok(ScreenOutcome::Continue)
        }
        _ => Ok(ScreenOutcome::Quit),
    }
}
