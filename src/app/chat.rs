use crate::app::medibot::MediBot;
use crate::domain::model::ChatSession;
use crate::domain::ports::Assistant;

pub const CHAT_USAGE: &str =
    "Type /service <name> to search centers, /reset to start over, /quit to leave.";

/// One line of interactive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand<'l> {
    Service(&'l str),
    Reset,
    Quit,
    Usage,
    Prompt(&'l str),
}

/// What the terminal should do after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStep {
    Skip,
    Reply { text: String, quit: bool },
    Quit,
}

/// Classifies a line. Blank lines yield `None`; unknown or incomplete
/// slash commands yield `Usage`.
pub fn parse_line(line: &str) -> Option<ChatCommand<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line {
        "/quit" => return Some(ChatCommand::Quit),
        "/reset" => return Some(ChatCommand::Reset),
        _ => {}
    }

    if let Some(keyword) = line.strip_prefix("/service ") {
        let keyword = keyword.trim();
        return Some(if keyword.is_empty() {
            ChatCommand::Usage
        } else {
            ChatCommand::Service(keyword)
        });
    }

    if line.starts_with('/') {
        return Some(ChatCommand::Usage);
    }
    Some(ChatCommand::Prompt(line))
}

pub async fn handle_line<A: Assistant>(
    bot: &MediBot<A>,
    session: &mut ChatSession,
    line: &str,
) -> ChatStep {
    let Some(command) = parse_line(line) else {
        return ChatStep::Skip;
    };

    match command {
        ChatCommand::Quit => ChatStep::Quit,
        ChatCommand::Reset => {
            session.reset();
            ChatStep::Reply {
                text: "Session cleared.".to_string(),
                quit: false,
            }
        }
        ChatCommand::Usage => ChatStep::Reply {
            text: CHAT_USAGE.to_string(),
            quit: false,
        },
        ChatCommand::Service(keyword) => {
            let answer = bot.answer_service_query(keyword);
            let text = match answer.notice {
                Some(notice) => format!("⚠️  {}\n{}", notice, answer.listing),
                None => answer.listing,
            };
            ChatStep::Reply { text, quit: false }
        }
        ChatCommand::Prompt(prompt) => {
            let answer = bot.answer_prompt(session, prompt).await;
            ChatStep::Reply {
                text: format!("👨‍⚕️ {}", answer.text),
                quit: answer.quit,
            }
        }
    }
}
