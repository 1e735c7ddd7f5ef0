//! Incoming chat events and what the bot answers with.

use crate::domain::{Mode, UserId};
use crate::menu::{Button, Screen};

/// One event from the chat gateway, already stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// `/name arg arg…`
    Command {
        user: UserId,
        name: String,
        args: Vec<String>,
    },
    /// Plain message text.
    Text { user: UserId, text: String },
    /// A button press. `inline` is set when the button sits on a message
    /// sent through inline mode, which has no chat behind it.
    Callback {
        user: UserId,
        data: String,
        inline: bool,
    },
    InlineQuery { user: UserId, query: String },
    /// The user picked one of our inline results; `result_id` is its token.
    ChosenInline { user: UserId, result_id: String },
    /// The gateway failed to deliver something to this user.
    DeliveryError { user: UserId, description: String },
}

impl Update {
    pub fn user(&self) -> UserId {
        match self {
            Update::Command { user, .. }
            | Update::Text { user, .. }
            | Update::Callback { user, .. }
            | Update::InlineQuery { user, .. }
            | Update::ChosenInline { user, .. }
            | Update::DeliveryError { user, .. } => *user,
        }
    }
}

/// What the gateway should do in response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Send a new message to the user's chat.
    Send(Screen),
    /// Replace the message whose button was pressed.
    Edit(Screen),
    /// Replace the inline message the update refers to.
    EditInline(Screen),
    /// Answer an inline query.
    Inline(Vec<InlineAnswer>),
    /// Nothing to show; acknowledge only.
    Ack,
}

impl Response {
    pub fn screen(&self) -> Option<&Screen> {
        match self {
            Response::Send(s) | Response::Edit(s) | Response::EditInline(s) => Some(s),
            Response::Inline(_) | Response::Ack => None,
        }
    }
}

/// One inline-mode result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAnswer {
    /// Encoded inline-leaf token; comes back as `ChosenInline::result_id`.
    pub id: String,
    pub mode: Mode,
    pub title: String,
    /// Text posted immediately, replaced once live data arrives.
    pub placeholder: String,
    pub keyboard: Vec<Vec<Button>>,
}
