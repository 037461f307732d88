//! Message routing and the bot runtime.
//!
//! Each inbound text message is routed to one of:
//! - a fixed command reply (`/start`, `/help`, `/ping`),
//! - the sticker pack pipeline (text containing a `t.me/addstickers/` link),
//! - nothing (unknown slash commands and ordinary chatter).

mod commands;
mod handler;
mod poller;

pub use commands::{Command, is_command};
pub use handler::{
    ARCHIVE_FAILED_TEXT, DONE_TEXT, INVALID_LINK_TEXT, NOT_FOUND_TEXT, PROCESSING_TEXT,
    PackHandler, PackOutcome, PackRequest, PipelineError,
};
pub use poller::{PollSettings, run_polling};

use tracing::{debug, instrument, warn};

use crate::parser::mentions_pack_link;
use crate::telegram::{ChatApi, ChatId, Message};

/// Where an inbound message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Reply with a fixed command text.
    Command(Command),
    /// Run the sticker pack pipeline.
    Pack(PackRequest),
    /// Drop the message.
    Ignore,
}

/// Decides how to handle `message`.
#[must_use]
pub fn route(message: &Message) -> Route {
    let Some(text) = message.text.as_deref() else {
        return Route::Ignore;
    };
    if let Some(command) = Command::parse(text) {
        return Route::Command(command);
    }
    if is_command(text) || !mentions_pack_link(text) {
        return Route::Ignore;
    }
    Route::Pack(PackRequest {
        raw_text: text.to_string(),
        chat_id: ChatId(message.chat.id),
    })
}

/// Handles one inbound message to completion.
#[instrument(
    skip_all,
    fields(
        chat = message.chat.id,
        message_id = message.message_id,
        sender = message.from.as_ref().map(|user| user.id),
    )
)]
pub async fn dispatch(api: &dyn ChatApi, handler: &PackHandler, message: &Message) {
    match route(message) {
        Route::Command(command) => {
            debug!(?command, "command received");
            if let Err(e) = api.send_message(ChatId(message.chat.id), command.reply()).await {
                warn!(error = %e, "failed to answer command");
            }
        }
        Route::Pack(request) => {
            let outcome = handler.handle(&request).await;
            debug!(?outcome, "pack request finished");
        }
        Route::Ignore => debug!("message ignored"),
    }
}
