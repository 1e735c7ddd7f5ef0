//! Wire format between the chat gateway and the bot.

use serde::{Deserialize, Serialize};

use crate::bot::{InlineAnswer, Response, Update};
use crate::domain::UserId;
use crate::menu::{Button, Screen};

/// An update as posted by the gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateRequest {
    Command {
        user: UserId,
        /// Command name, with or without the slash.
        name: String,
        #[serde(default)]
        args: Vec<String>,
    },
    Text {
        user: UserId,
        text: String,
    },
    Callback {
        user: UserId,
        data: String,
        /// Set for buttons on inline-mode messages.
        #[serde(default)]
        inline: bool,
    },
    InlineQuery {
        user: UserId,
        query: String,
    },
    ChosenInline {
        user: UserId,
        result_id: String,
    },
    DeliveryError {
        user: UserId,
        description: String,
    },
}

impl From<UpdateRequest> for Update {
    fn from(req: UpdateRequest) -> Self {
        match req {
            UpdateRequest::Command { user, name, args } => Update::Command { user, name, args },
            UpdateRequest::Text { user, text } => Update::Text { user, text },
            UpdateRequest::Callback { user, data, inline } => Update::Callback { user, data, inline },
            UpdateRequest::InlineQuery { user, query } => Update::InlineQuery { user, query },
            UpdateRequest::ChosenInline { user, result_id } => {
                Update::ChosenInline { user, result_id }
            }
            UpdateRequest::DeliveryError { user, description } => {
                Update::DeliveryError { user, description }
            }
        }
    }
}

/// How a message reply is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    Send,
    Edit,
    EditInline,
}

/// Reply body for `POST /updates`.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyBody {
    Message {
        delivery: Delivery,
        text: String,
        /// Text is chat HTML.
        html: bool,
        keyboard: Vec<Vec<Button>>,
    },
    InlineResults {
        results: Vec<InlineResult>,
    },
    Ack,
}

/// One inline-mode article.
#[derive(Debug, Serialize)]
pub struct InlineResult {
    pub id: String,
    pub title: String,
    /// Message posted when the result is chosen.
    pub message_text: String,
    /// Transport code, for the gateway to pick a thumbnail.
    pub mode: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl ReplyBody {
    fn message(delivery: Delivery, screen: Screen) -> Self {
        ReplyBody::Message {
            delivery,
            text: screen.text,
            html: true,
            keyboard: screen.keyboard,
        }
    }
}

impl From<InlineAnswer> for InlineResult {
    fn from(answer: InlineAnswer) -> Self {
        Self {
            id: answer.id,
            title: answer.title,
            message_text: answer.placeholder,
            mode: answer.mode.code().to_string(),
            keyboard: answer.keyboard,
        }
    }
}

impl From<Response> for ReplyBody {
    fn from(response: Response) -> Self {
        match response {
            Response::Send(screen) => ReplyBody::message(Delivery::Send, screen),
            Response::Edit(screen) => ReplyBody::message(Delivery::Edit, screen),
            Response::EditInline(screen) => ReplyBody::message(Delivery::EditInline, screen),
            Response::Inline(answers) => ReplyBody::InlineResults {
                results: answers.into_iter().map(InlineResult::from).collect(),
            },
            Response::Ack => ReplyBody::Ack,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
