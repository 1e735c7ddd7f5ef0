//! Update dispatch: commands, free text, buttons and inline mode.
//!
//! Every command except `/start` and every chat button requires an
//! account. Buttons on inline messages are exempt: they have no chat
//! behind them and only ever refresh live times.

mod command;
mod inline;
mod update;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{CardNumber, Mode, UserId};
use crate::feedback::{FeedbackKind, FeedbackLog};
use crate::menu::{
    Button, CARD_HELP, Leaf, NOT_FAVORITE, Navigator, RENAME_PROMPT, STORE_FAILED, Screen,
    command_examples,
};
use crate::pending::Pending;
use crate::resolve::{is_number, match_by_name, match_by_number};
use crate::templates::{HelpTemplate, RenamedTemplate, render};
use crate::token::{Origin, Token};

pub use command::Command;
pub use inline::{MAX_INLINE_RESULTS, answers as inline_answers};
pub use update::{InlineAnswer, Response, Update};

pub const NOT_STARTED: &str = "Es necesario iniciar el bot con /start antes de continuar.";
pub const UNKNOWN_INPUT: &str =
    "No sé qué hacer con ese mensaje. Usa /ayuda para ver lo que puedo hacer.";
const CARD_REMOVED: &str = "He eliminado la información sobre tu abono";
const SUGGEST_PROMPT: &str =
    "Dime qué debería mejorar o añadir al bot, haré lo posible por implementarlo.";
const SUGGEST_THANKS: &str = "He tomado nota de la sugerencia. Gracias.";
const REPORT_PROMPT: &str =
    "Cuéntame qué problema has encontrado y qué estabas haciendo cuando ocurrió.";
const REPORT_THANKS: &str = "He tomado nota del problema. Gracias.";
const FEEDBACK_FAILED: &str = "No he podido guardar tu mensaje, inténtalo de nuevo más tarde.";
const GOODBYE: &str =
    "Es una pena verte marchar 😢. He borrado toda la información que tenía sobre ti.";
const SEARCH_HITS: &str = "Estas paradas encajan con tu búsqueda";
const SEARCH_MISS: &str = "No existen paradas con ese criterio";
const EMPTY_NAME: &str = "El nombre no puede estar vacío.";
const NO_DONATIONS: &str = "Ahora mismo no acepto donativos, ¡gracias de todas formas! 😊";

/// Card argument that forgets the stored card.
const CARD_CLEAR: &str = "-1";

/// The bot: turns one [`Update`] into one [`Response`].
#[derive(Clone)]
pub struct Bot {
    nav: Navigator,
    feedback: Arc<FeedbackLog>,
    donate_url: Option<String>,
}

impl Bot {
    pub fn new(nav: Navigator, feedback: Arc<FeedbackLog>) -> Self {
        Self {
            nav,
            feedback,
            donate_url: None,
        }
    }

    /// Link offered by `/donar`.
    pub fn with_donate_url(mut self, url: impl Into<String>) -> Self {
        self.donate_url = Some(url.into());
        self
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub async fn handle(&self, update: Update) -> Response {
        match update {
            Update::Command { user, name, args } => self.command(user, &name, &args).await,
            Update::Text { user, text } => self.text(user, &text).await,
            Update::Callback { user, data, inline } => self.callback(user, &data, inline).await,
            Update::InlineQuery { query, .. } => {
                Response::Inline(inline_answers(self.nav.catalogs(), &query).await)
            }
            Update::ChosenInline { result_id, .. } => self.refresh_inline(&result_id).await,
            Update::DeliveryError { user, description } => {
                self.delivery_error(user, &description).await
            }
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    async fn command(&self, user: UserId, name: &str, args: &[String]) -> Response {
        let Some(command) = Command::parse(name) else {
            debug!(user, name, "unknown command");
            return Response::Send(Screen::new(UNKNOWN_INPUT));
        };
        if command.needs_account() && !self.nav.store().has_user(user).await {
            return Response::Send(Screen::new(NOT_STARTED));
        }
        debug!(user, ?command, "command");

        let screen = match command {
            Command::Start => self.start(user).await,
            Command::Menu => self.nav.main_menu(),
            Command::Weather => self.nav.weather().await,
            Command::Card => self.card(user, args.first().map(String::as_str)).await,
            Command::SaveCard => self.toggle_save(user).await,
            Command::Stops(mode) => self.stops(user, mode, args).await,
            Command::Favorites => self.nav.favorites(user).await,
            Command::Rename => self.nav.rename_menu(user).await,
            Command::Help => Screen::new(render(&HelpTemplate { welcome: false })),
            Command::Suggest => {
                self.nav.pending().set(user, Pending::Suggestion).await;
                Screen::new(SUGGEST_PROMPT)
            }
            Command::Report => {
                self.nav.pending().set(user, Pending::Report).await;
                Screen::new(REPORT_PROMPT)
            }
            Command::Donate => match &self.donate_url {
                Some(url) => Screen::new(format!("Puedes comprarme un café en {url} 😊")),
                None => Screen::new(NO_DONATIONS),
            },
            Command::Delete => self.delete(user).await,
        };
        Response::Send(screen)
    }

    async fn start(&self, user: UserId) -> Screen {
        match self.nav.store().add_user(user).await {
            Ok(welcome) => {
                if welcome {
                    info!(user, "new user");
                }
                Screen::new(render(&HelpTemplate { welcome }))
            }
            Err(e) => {
                warn!(user, error = %e, "failed to add user");
                Screen::new(STORE_FAILED)
            }
        }
    }

    async fn card(&self, user: UserId, arg: Option<&str>) -> Screen {
        let number = match arg {
            Some(n) => Some(n.trim().to_string()),
            None => self.nav.store().card(user).await,
        };
        match number.as_deref() {
            None => Screen::new(CARD_HELP),
            Some(CARD_CLEAR) => match self.nav.store().clear_card(user).await {
                Ok(_) => Screen::new(CARD_REMOVED),
                Err(e) => {
                    warn!(user, error = %e, "failed to clear card");
                    Screen::new(STORE_FAILED)
                }
            },
            Some(raw) => match CardNumber::parse(raw) {
                Some(number) => self.nav.lookup_card(user, &number).await,
                None => {
                    debug!(user, "rejected card number");
                    Screen::new(CARD_HELP)
                }
            },
        }
    }

    async fn toggle_save(&self, user: UserId) -> Screen {
        match self.nav.store().toggle_save(user).await {
            Ok(true) => Screen::new("Se ha activado el guardado del abono en la base de datos"),
            Ok(false) => Screen::new("Se ha desactivado el guardado del abono en la base de datos"),
            Err(e) => {
                warn!(user, error = %e, "failed to toggle card saving");
                Screen::new(STORE_FAILED)
            }
        }
    }

    /// `/metro sol`, `/emt 658`: a number that hits goes straight to the
    /// stop, anything else lists name matches as buttons.
    async fn stops(&self, user: UserId, mode: Mode, args: &[String]) -> Screen {
        let Some(first) = args.first() else {
            let what = if mode.accepts_number() {
                "un nombre o número"
            } else {
                "un nombre"
            };
            return Screen::new(format!(
                "Es necesario que me indiques {what}.\n\n{}",
                command_examples(mode)
            ));
        };

        let catalog = self.nav.catalogs().snapshot(mode).await;
        if is_number(first)
            && let Some(index) = match_by_number(&catalog, first)
        {
            return self.nav.stop_time(Some(user), mode, index, Leaf::Bus).await;
        }

        let matches = match_by_name(&catalog, args, Origin::Command);
        if matches.is_empty() {
            return Screen::new(SEARCH_MISS);
        }
        Screen::new(SEARCH_HITS).column(
            matches
                .into_iter()
                .map(|m| Button::new(m.display, &m.token)),
        )
    }

    async fn delete(&self, user: UserId) -> Screen {
        self.nav.pending().clear(user).await;
        match self.nav.store().delete_user(user).await {
            Ok(_) => {
                info!(user, "user deleted their data");
                Screen::new(GOODBYE)
            }
            Err(e) => {
                warn!(user, error = %e, "failed to delete user");
                Screen::new(STORE_FAILED)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Free text
    // ------------------------------------------------------------------------

    async fn text(&self, user: UserId, text: &str) -> Response {
        if !self.nav.store().has_user(user).await {
            return Response::Send(Screen::new(NOT_STARTED));
        }
        let screen = match self.nav.pending().consume(user).await {
            Some(Pending::Suggestion) => self.feedback(user, FeedbackKind::Suggestion, text).await,
            Some(Pending::Report) => self.feedback(user, FeedbackKind::Report, text).await,
            Some(Pending::Rename {
                mode,
                external_id,
                old_name,
            }) => {
                let new_name = text.trim();
                if new_name.is_empty() {
                    // Keep waiting for a usable name
                    self.nav
                        .pending()
                        .set(
                            user,
                            Pending::Rename {
                                mode,
                                external_id,
                                old_name,
                            },
                        )
                        .await;
                    return Response::Send(Screen::new(format!("{EMPTY_NAME} {RENAME_PROMPT}")));
                }
                match self
                    .nav
                    .store()
                    .rename_favorite(user, mode, &external_id, new_name)
                    .await
                {
                    Ok(true) => Screen::new(render(&RenamedTemplate {
                        old: &old_name,
                        new: new_name,
                    })),
                    Ok(false) => Screen::new(NOT_FAVORITE),
                    Err(e) => {
                        warn!(user, mode = %mode, error = %e, "failed to rename favorite");
                        Screen::new(STORE_FAILED)
                    }
                }
            }
            None => Screen::new(UNKNOWN_INPUT),
        };
        Response::Send(screen)
    }

    async fn feedback(&self, user: UserId, kind: FeedbackKind, text: &str) -> Screen {
        if let Err(e) = self.feedback.append(kind, text).await {
            warn!(user, ?kind, error = %e, "failed to store feedback");
            return Screen::new(FEEDBACK_FAILED);
        }
        match kind {
            FeedbackKind::Suggestion => Screen::new(SUGGEST_THANKS),
            FeedbackKind::Report => Screen::new(REPORT_THANKS),
        }
    }

    // ------------------------------------------------------------------------
    // Buttons and inline mode
    // ------------------------------------------------------------------------

    async fn callback(&self, user: UserId, data: &str, inline: bool) -> Response {
        if inline {
            return self.refresh_inline(data).await;
        }
        let Some(token) = Token::decode(data) else {
            debug!(user, data, "ignoring undecodable callback");
            return Response::Ack;
        };
        if !self.nav.store().has_user(user).await {
            return Response::Edit(Screen::new(NOT_STARTED));
        }
        Response::Edit(self.nav.open(user, &token).await)
    }

    async fn refresh_inline(&self, data: &str) -> Response {
        let Some(token) = Token::decode(data) else {
            debug!(data, "ignoring undecodable inline token");
            return Response::Ack;
        };
        match self.nav.open_inline(&token).await {
            Some(screen) => Response::EditInline(screen),
            None => Response::Ack,
        }
    }

    // ------------------------------------------------------------------------
    // Delivery feedback
    // ------------------------------------------------------------------------

    async fn delivery_error(&self, user: UserId, description: &str) -> Response {
        let lower = description.to_lowercase();
        if lower.contains("message is not modified") {
            debug!(user, "edit was a no-op");
        } else if lower.contains("blocked by the user") || lower.contains("bot was blocked") {
            self.nav.pending().clear(user).await;
            match self.nav.store().delete_user(user).await {
                Ok(_) => info!(user, "user blocked the bot, purged their data"),
                Err(e) => warn!(user, error = %e, "failed to purge blocked user"),
            }
        } else {
            warn!(user, description, "delivery failed");
        }
        Response::Ack
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::catalog::{CatalogRegistry, RawStop};
    use crate::domain::StopIndex;
    use crate::live::MockLiveSource;
    use crate::pending::PendingInputStore;
    use crate::store::UserStore;

    struct Fixture {
        bot: Bot,
        live: Arc<MockLiveSource>,
        dir: TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let store = UserStore::open(dir.path().join("users.json")).await.unwrap();
        let catalogs = CatalogRegistry::new(HashMap::new());
        catalogs
            .load(
                Mode::Metro,
                &[
                    RawStop::new("Sol", "m1").with_lines(["1"]),
                    RawStop::new("Príncipe Pío", "m2").with_lines(["6", "10", "R"]),
                    RawStop::new("Príncipe de Vergara", "m3").with_lines(["2", "9"]),
                ],
            )
            .await;
        let buses: Vec<RawStop> = (0..6)
            .map(|i| RawStop::new(format!("Parada {i}"), format!("EMT_{}", 653 + i)))
            .collect();
        catalogs.load(Mode::BusUrban, &buses).await;

        let live = Arc::new(MockLiveSource::new());
        let nav = Navigator::new(
            catalogs,
            Arc::new(store),
            live.clone(),
            PendingInputStore::default(),
        );
        let feedback = Arc::new(FeedbackLog::new(dir.path()));
        Fixture {
            bot: Bot::new(nav, feedback),
            live,
            dir,
        }
    }

    /// Payload of a favorite button as the current catalog would render it.
    async fn stamped(f: &Fixture, verb: &str, mode: Mode, index: usize) -> String {
        let stamp = f.bot.navigator().catalogs().snapshot(mode).await.stamp();
        format!("{verb}_{}_{index}_{stamp}", mode.code())
    }

    fn command(user: UserId, name: &str, args: &[&str]) -> Update {
        Update::Command {
            user,
            name: name.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        }
    }

    fn text(user: UserId, text: &str) -> Update {
        Update::Text {
            user,
            text: text.to_string(),
        }
    }

    fn callback(user: UserId, data: &str) -> Update {
        Update::Callback {
            user,
            data: data.to_string(),
            inline: false,
        }
    }

    fn sent(response: Response) -> Screen {
        match response {
            Response::Send(screen) => screen,
            other => panic!("expected Send, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn commands_require_start() {
        let f = fixture().await;
        let screen = sent(f.bot.handle(command(1, "menu", &[])).await);
        assert_eq!(screen.text, NOT_STARTED);

        let screen = sent(f.bot.handle(command(1, "start", &[])).await);
        assert!(screen.text.starts_with("Estupendo"));
        let screen = sent(f.bot.handle(command(1, "start", &[])).await);
        assert!(screen.text.starts_with("Esto es lo que puedo hacer"));

        let screen = sent(f.bot.handle(command(1, "menu", &[])).await);
        assert_eq!(screen.text, "Menú");
    }

    #[tokio::test]
    async fn callbacks_require_start() {
        let f = fixture().await;
        let response = f.bot.handle(callback(1, "main_menu")).await;
        assert_eq!(response, Response::Edit(Screen::new(NOT_STARTED)));
    }

    #[tokio::test]
    async fn malformed_callback_is_acknowledged() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        assert_eq!(f.bot.handle(callback(1, "time_bus_emt_x")).await, Response::Ack);
        assert_eq!(f.bot.handle(callback(1, "")).await, Response::Ack);
    }

    #[tokio::test]
    async fn name_search_lists_buttons() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;

        let screen = sent(f.bot.handle(command(1, "metro", &["principe"])).await);
        assert_eq!(screen.text, SEARCH_HITS);
        let labels: Vec<&str> = screen.keyboard.iter().map(|r| r[0].label.as_str()).collect();
        assert_eq!(labels, vec!["Príncipe Pío", "Príncipe de Vergara"]);
        assert_eq!(screen.keyboard[0][0].data, "time_cli_metro_1");

        let screen = sent(f.bot.handle(command(1, "metro", &["principe", "vergara"])).await);
        assert_eq!(screen.keyboard.len(), 1);

        let screen = sent(f.bot.handle(command(1, "metro", &["zzz"])).await);
        assert_eq!(screen.text, SEARCH_MISS);
    }

    #[tokio::test]
    async fn number_search_opens_stop() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        let screen = sent(f.bot.handle(command(1, "emt", &["658"])).await);
        assert!(screen.text.contains("Tiempos en parada Parada 5 (658)"));
        assert!(screen.has_token(&Token::StopTime {
            mode: Mode::BusUrban,
            index: StopIndex(5),
            origin: Origin::Bus,
        }));
        let stamp = f.bot.navigator().catalogs().snapshot(Mode::BusUrban).await.stamp();
        assert!(screen.has_token(&Token::AddFavorite(Mode::BusUrban, StopIndex(5), Some(stamp))));
    }

    #[tokio::test]
    async fn search_without_args_explains() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        let screen = sent(f.bot.handle(command(1, "emt", &[])).await);
        assert!(screen.text.starts_with("Es necesario que me indiques un nombre o número."));
        assert!(screen.text.contains("/emt <code>aluche</code>"));
        let screen = sent(f.bot.handle(command(1, "cercanias", &[])).await);
        assert!(screen.text.starts_with("Es necesario que me indiques un nombre."));
    }

    #[tokio::test]
    async fn suggestion_goes_to_log() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        let screen = sent(f.bot.handle(command(1, "sugerir", &[])).await);
        assert_eq!(screen.text, SUGGEST_PROMPT);

        let screen = sent(f.bot.handle(text(1, "Añadir tranvía")).await);
        assert_eq!(screen.text, SUGGEST_THANKS);
        let log = std::fs::read_to_string(f.dir.path().join("suggestions.txt")).unwrap();
        assert_eq!(log, "Añadir tranvía\n\n");

        // Slot is consumed
        let screen = sent(f.bot.handle(text(1, "otra cosa")).await);
        assert_eq!(screen.text, UNKNOWN_INPUT);
    }

    #[tokio::test]
    async fn report_goes_to_its_own_log() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        f.bot.handle(command(1, "reportar", &[])).await;
        let screen = sent(f.bot.handle(text(1, "No carga Sol")).await);
        assert_eq!(screen.text, REPORT_THANKS);
        let log = std::fs::read_to_string(f.dir.path().join("reports.txt")).unwrap();
        assert_eq!(log, "No carga Sol\n\n");
        assert!(!f.dir.path().join("suggestions.txt").exists());
    }

    #[tokio::test]
    async fn rename_flow() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        f.bot.handle(callback(1, &stamped(&f, "fav", Mode::Metro, 0).await)).await;
        f.bot.handle(callback(1, &stamped(&f, "rename_fav", Mode::Metro, 0).await)).await;

        let screen = sent(f.bot.handle(text(1, "  Casa ")).await);
        assert_eq!(
            screen.text,
            "El nombre de la estación/parada 'Sol' ahora será 'Casa'"
        );
        let favs = f.bot.navigator().store().favorites(1).await;
        assert_eq!(favs[0].name, "Casa");
        assert_eq!(favs[0].external_id, "m1");
    }

    #[tokio::test]
    async fn blank_name_keeps_rename_armed() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        f.bot.handle(callback(1, &stamped(&f, "fav", Mode::Metro, 0).await)).await;
        f.bot.handle(callback(1, &stamped(&f, "rename_fav", Mode::Metro, 0).await)).await;

        let screen = sent(f.bot.handle(text(1, "   ")).await);
        assert!(screen.text.starts_with(EMPTY_NAME));
        assert_eq!(f.bot.navigator().store().favorites(1).await[0].name, "Sol");

        let screen = sent(f.bot.handle(text(1, "Trabajo")).await);
        assert!(screen.text.ends_with("ahora será 'Trabajo'"));
        assert_eq!(f.bot.navigator().store().favorites(1).await[0].name, "Trabajo");
    }

    #[tokio::test]
    async fn rename_of_unsaved_stop_never_claims_success() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;

        // Not a favorite: nothing is armed
        let response = f
            .bot
            .handle(callback(1, &stamped(&f, "rename_fav", Mode::Metro, 0).await))
            .await;
        let Response::Edit(screen) = response else {
            panic!("expected edit");
        };
        assert_eq!(screen.text, NOT_FAVORITE);
        let screen = sent(f.bot.handle(text(1, "Casa")).await);
        assert_eq!(screen.text, UNKNOWN_INPUT);

        // Removed while the prompt was open
        f.bot.handle(callback(1, &stamped(&f, "fav", Mode::Metro, 0).await)).await;
        f.bot.handle(callback(1, &stamped(&f, "rename_fav", Mode::Metro, 0).await)).await;
        f.bot.handle(callback(1, &stamped(&f, "unfav", Mode::Metro, 0).await)).await;
        let screen = sent(f.bot.handle(text(1, "Casa")).await);
        assert_eq!(screen.text, NOT_FAVORITE);
        assert!(f.bot.navigator().store().favorites(1).await.is_empty());
    }

    #[tokio::test]
    async fn card_commands() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;

        let screen = sent(f.bot.handle(command(1, "abono", &[])).await);
        assert_eq!(screen.text, CARD_HELP);

        let screen = sent(f.bot.handle(command(1, "guardar", &[])).await);
        assert!(screen.text.contains("activado"));
        assert!(f.bot.navigator().store().saves_card(1).await);

        f.bot.navigator().store().set_card(1, "0010000000").await.unwrap();
        sent(f.bot.handle(command(1, "abono", &[])).await);
        assert_eq!(f.live.calls(), 1);

        let screen = sent(f.bot.handle(command(1, "abono", &["-1"])).await);
        assert_eq!(screen.text, CARD_REMOVED);
        assert_eq!(f.bot.navigator().store().card(1).await, None);
    }

    #[tokio::test]
    async fn card_number_must_be_digits() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        for raw in ["../weather", "1?x=", "0010000000/../weather", "abc"] {
            let screen = sent(f.bot.handle(command(1, "abono", &[raw])).await);
            assert_eq!(screen.text, CARD_HELP, "{raw:?}");
        }
        assert_eq!(f.live.calls(), 0);

        sent(f.bot.handle(command(1, "abono", &["0010000000"])).await);
        assert_eq!(f.live.calls(), 1);
    }

    #[tokio::test]
    async fn donate_reply() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        let screen = sent(f.bot.handle(command(1, "donar", &[])).await);
        assert_eq!(screen.text, NO_DONATIONS);

        let bot = f.bot.clone().with_donate_url("https://example.org/cafe");
        let screen = sent(bot.handle(command(1, "donar", &[])).await);
        assert_eq!(screen.text, "Puedes comprarme un café en https://example.org/cafe 😊");
    }

    #[tokio::test]
    async fn delete_removes_everything() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        f.bot.handle(callback(1, &stamped(&f, "fav", Mode::Metro, 0).await)).await;
        let screen = sent(f.bot.handle(command(1, "borrar", &[])).await);
        assert_eq!(screen.text, GOODBYE);
        assert!(!f.bot.navigator().store().has_user(1).await);
        assert!(f.bot.navigator().store().favorites(1).await.is_empty());
    }

    #[tokio::test]
    async fn blocked_user_is_purged() {
        let f = fixture().await;
        f.bot.handle(command(1, "start", &[])).await;
        f.bot.handle(command(2, "start", &[])).await;

        let response = f
            .bot
            .handle(Update::DeliveryError {
                user: 1,
                description: "Bad Request: message is not modified".into(),
            })
            .await;
        assert_eq!(response, Response::Ack);
        assert!(f.bot.navigator().store().has_user(1).await);

        f.bot
            .handle(Update::DeliveryError {
                user: 1,
                description: "Forbidden: bot was blocked by the user".into(),
            })
            .await;
        assert!(!f.bot.navigator().store().has_user(1).await);
        assert!(f.bot.navigator().store().has_user(2).await);
    }

    #[tokio::test]
    async fn inline_callbacks_skip_account_check() {
        let f = fixture().await;
        let response = f
            .bot
            .handle(Update::Callback {
                user: 99,
                data: "time_inline_metro_0".into(),
                inline: true,
            })
            .await;
        let Response::EditInline(screen) = response else {
            panic!("expected inline edit");
        };
        assert!(screen.text.contains("Tiempos en estación Sol"));
        assert_eq!(screen.keyboard.len(), 1);

        let response = f
            .bot
            .handle(Update::ChosenInline {
                user: 99,
                result_id: "main_menu".into(),
            })
            .await;
        assert_eq!(response, Response::Ack);
    }

    #[tokio::test]
    async fn inline_query_answers() {
        let f = fixture().await;
        let response = f
            .bot
            .handle(Update::InlineQuery {
                user: 5,
                query: "metro sol".into(),
            })
            .await;
        let Response::Inline(results) = response else {
            panic!("expected inline answers");
        };
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "time_inline_metro_0");
    }
}
