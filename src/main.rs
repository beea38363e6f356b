use anyhow::Context;
use clap::Parser;
use medibot::app::chat::{self, ChatStep};
use medibot::app::medibot::MediBot;
use medibot::config::Command;
use medibot::core::assistant::GeminiAssistant;
use medibot::utils::error::{ErrorSeverity, MediBotError};
use medibot::utils::{logger, validation::Validate};
use medibot::{ChatSession, CliConfig, LocalStorage};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match cli.settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    let storage = LocalStorage::new(".".to_string());
    let bot = match MediBot::bootstrap(&settings, &storage).await {
        Ok(bot) => bot,
        Err(e) => exit_with(&e),
    };

    match cli.command {
        Command::Services => {
            for tag in bot.service_tags() {
                println!("{}", tag);
            }
        }
        Command::Lookup { keyword, json } => {
            let keyword = keyword.join(" ");
            if json {
                let rendered = serde_json::to_string_pretty(&bot.resolve(&keyword))
                    .with_context(|| format!("failed to encode resolution for '{}'", keyword))?;
                println!("{}", rendered);
            } else {
                let answer = bot.answer_service_query(&keyword);
                if let Some(notice) = answer.notice {
                    eprintln!("⚠️  {}", notice);
                }
                println!("{}", answer.listing);
            }
        }
        Command::Ask { prompt } => {
            let mut session = ChatSession::new();
            let answer = bot.answer_prompt(&mut session, &prompt.join(" ")).await;
            println!("{}", answer.text);
        }
        Command::Chat => run_chat(&bot).await.context("chat session aborted")?,
    }

    Ok(())
}

async fn run_chat(bot: &MediBot<GeminiAssistant>) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = ChatSession::new();

    let greeting = format!(
        "👨‍⚕️ Hello! Welcome to the MediBot!\n\
         👨‍⚕️ I can help you find medical centers and the services they provide.\n{}\n",
        chat::CHAT_USAGE
    );
    stdout
        .write_all(greeting.as_bytes())
        .await
        .context("failed to write to stdout")?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("failed to read from stdin")? else {
            break;
        };

        match chat::handle_line(bot, &mut session, &line).await {
            ChatStep::Skip => {}
            ChatStep::Quit => break,
            ChatStep::Reply { text, quit } => {
                stdout.write_all(format!("{}\n", text).as_bytes()).await?;
                if quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn exit_with(e: &MediBotError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
