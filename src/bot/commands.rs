//! Fixed-reply bot commands.

/// A recognised slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// `/ping`
    Ping,
}

const START_TEXT: &str = "\u{1f44b} Welcome to Sticker Pack Downloader Bot!\n\n\
Send me a sticker pack link (t.me/addstickers/...) and I'll download all stickers \
from the pack and send them to you as a ZIP archive.\n\n\
Example: t.me/addstickers/Animals\n\n\
Use /help to see available commands.";

const HELP_TEXT: &str = "\u{1f4da} Bot Usage:\n\n\
1. Send a sticker pack link like: t.me/addstickers/packname\n\
2. Wait while I download all stickers\n\
3. Receive a ZIP file with all stickers from the pack\n\n\
Supported sticker types:\n\
- Regular stickers (.webp)\n\
- Animated stickers (.tgs)\n\
- Video stickers (.webm)\n\n\
Available commands:\n\
/start - Start the bot\n\
/help - Show this help message\n\
/ping - Check if bot is alive";

const PING_TEXT: &str = "Pong! Bot is running.";

impl Command {
    /// Parses the leading command word of `text`.
    ///
    /// Accepts an `@botname` suffix (`/help@my_bot`). Returns `None` for
    /// text that is not a slash command or names an unknown command.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(name, _)| name);
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "ping" => Some(Self::Ping),
            _ => None,
        }
    }

    /// Reply text for this command.
    #[must_use]
    pub fn reply(self) -> &'static str {
        match self {
            Self::Start => START_TEXT,
            Self::Help => HELP_TEXT,
            Self::Ping => PING_TEXT,
        }
    }
}

/// Returns true if `text` looks like a slash command of any kind.
#[must_use]
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}
