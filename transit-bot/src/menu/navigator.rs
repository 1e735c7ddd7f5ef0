//! Screen handlers for every navigation token.
//!
//! Each handler takes one catalog snapshot and renders against it, so a
//! refresh landing mid-render can't mix generations. Back buttons are
//! rebuilt from the token's own arguments; nothing about the path is
//! stored server-side.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{Catalog, CatalogRegistry, Stop};
use crate::domain::{Bucket, CardNumber, FavoriteKey, LineSelector, Mode, Stamp, StopIndex, UserId};
use crate::live::LiveSource;
use crate::pending::{Pending, PendingInputStore};
use crate::store::UserStore;
use crate::templates::{
    CardTemplate, DockTemplate, StopTimesTemplate, WeatherTemplate, render,
};
use crate::token::{Origin, Token};

use super::screen::{Button, Screen};
use super::sort::{sort_buckets, sort_lines, sort_stations};

const REFRESH: &str = "🔃 Actualizar 🔃";
const BACK_MENU: &str = "« Menú";
const BACK_LINES: &str = "« Líneas";
const BACK_STATIONS: &str = "« Estaciones";
const BACK_FAVORITES: &str = "« Favoritos";
const ADD_FAVORITE: &str = "❤️ Guardar en Favoritos ❤️";
const REMOVE_FAVORITE: &str = "💔 Eliminar de Favoritos 💔";
const GONE_MARK: &str = "💔";
const NO_FAVORITES: &str = "No tienes paradas/estaciones guardadas en favoritos";
const GONE_NOTE: &str =
    "Las marcadas con 💔 ya no existen. Púlsalas para eliminarlas de tus favoritos.";

/// Shown by the card screen when no card number is stored.
pub const CARD_HELP: &str = "Es necesario que me indiques un número.\n\n\
<b>Ejemplo</b>:\n- /abono <code>0010000000</code>\n\n\
<b>Nota</b>: El número se compone por los 3 últimos dígitos de la primera fila \
y los de la segunda fila.";

const STALE_STOP: &str =
    "Esta parada ya no está disponible. Búscala de nuevo, los datos se han actualizado.";
const STALE_LINE: &str = "Esta línea ya no está disponible.";
/// Asks for a favorite's new name.
pub const RENAME_PROMPT: &str = "De acuerdo, indícame el nuevo nombre de la estación/parada";
/// Shown when a favorite being changed is not saved anymore.
pub const NOT_FAVORITE: &str = "Esa estación/parada ya no está en tus favoritos.";
/// Shown when a store write fails.
pub const STORE_FAILED: &str = "No he podido guardar los cambios, inténtalo de nuevo más tarde.";

/// Which chrome a live-times leaf carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    /// Reached through line and letter menus; full back chain.
    Train { line: LineSelector, letter: Bucket },
    /// Reached from a number lookup or the bus menu.
    Bus,
    /// Reached from a typed name search.
    Command,
    /// Inline message: refresh only.
    Inline,
    /// Reached from the favorites list; offers removal.
    Favorite,
}

impl Leaf {
    fn from_origin(origin: Origin) -> Self {
        match origin {
            Origin::Bus => Leaf::Bus,
            Origin::Command => Leaf::Command,
            Origin::Inline => Leaf::Inline,
            Origin::Favorite => Leaf::Favorite,
        }
    }

    fn token(&self, mode: Mode, index: StopIndex) -> Token {
        let origin = match self {
            Leaf::Train { line, letter } => {
                return Token::TrainTime {
                    mode,
                    line: line.clone(),
                    letter: *letter,
                    index,
                };
            }
            Leaf::Bus => Origin::Bus,
            Leaf::Command => Origin::Command,
            Leaf::Inline => Origin::Inline,
            Leaf::Favorite => Origin::Favorite,
        };
        Token::StopTime { mode, index, origin }
    }

    /// Button payload that saves this leaf's stop and comes back to it.
    fn add_token(&self, mode: Mode, index: StopIndex, stamp: Stamp) -> Token {
        match self {
            Leaf::Train { line, letter } => Token::AddTrainFavorite {
                mode,
                line: line.clone(),
                letter: *letter,
                index,
                stamp,
            },
            _ => Token::AddFavorite(mode, index, Some(stamp)),
        }
    }
}

/// A saved favorite resolved against the current catalog.
struct Listed {
    mode: Mode,
    name: String,
    key: FavoriteKey,
    /// `None` once the catalog no longer has the stop.
    at: Option<(StopIndex, Stamp)>,
}

/// Usage examples for a mode's search command.
pub fn command_examples(mode: Mode) -> String {
    let examples: &[&str] = match mode {
        Mode::Bikeshare => &["casal", "77"],
        Mode::BusUrban => &["aluche", "658"],
        Mode::BusInterurban => &["aluche", "10866"],
        Mode::Metro => &["príncipe"],
        Mode::CommuterRail => &["atocha"],
    };
    let mut text = if examples.len() == 1 {
        "<b>Ejemplo</b>:".to_string()
    } else {
        "<b>Ejemplos</b>:".to_string()
    };
    for example in examples {
        text.push_str(&format!("\n- /{} <code>{example}</code>", mode.command()));
    }
    text
}

fn selector_title(selector: &LineSelector) -> String {
    match selector {
        LineSelector::Line(line) => format!("Línea {line}"),
        LineSelector::AllStations => "A-Z".to_string(),
    }
}

/// The menu state machine.
#[derive(Clone)]
pub struct Navigator {
    catalogs: CatalogRegistry,
    store: Arc<UserStore>,
    live: Arc<dyn LiveSource>,
    pending: PendingInputStore,
}

impl Navigator {
    pub fn new(
        catalogs: CatalogRegistry,
        store: Arc<UserStore>,
        live: Arc<dyn LiveSource>,
        pending: PendingInputStore,
    ) -> Self {
        Self {
            catalogs,
            store,
            live,
            pending,
        }
    }

    pub fn catalogs(&self) -> &CatalogRegistry {
        &self.catalogs
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub fn pending(&self) -> &PendingInputStore {
        &self.pending
    }

    /// Render the screen a chat button leads to.
    pub async fn open(&self, user: UserId, token: &Token) -> Screen {
        debug!(user, token = %token, "open");
        match token {
            Token::MainMenu => self.main_menu(),
            Token::Weather => self.weather().await,
            Token::Card => self.card(user).await,
            Token::Favorites => self.favorites(user).await,
            Token::RenameMenu => self.rename_menu(user).await,
            Token::TrainMenu(mode) => self.train_menu(*mode).await,
            Token::BusMenu(mode) => self.bus_menu(*mode),
            Token::LineMenu(mode, line) => self.line_menu(*mode, line).await,
            Token::StationMenu(mode, line, letter) => self.station_menu(*mode, line, *letter).await,
            Token::TrainTime {
                mode,
                line,
                letter,
                index,
            } => {
                let leaf = Leaf::Train {
                    line: line.clone(),
                    letter: *letter,
                };
                self.stop_time(Some(user), *mode, *index, leaf).await
            }
            Token::StopTime {
                mode,
                index,
                origin,
            } => {
                self.stop_time(Some(user), *mode, *index, Leaf::from_origin(*origin))
                    .await
            }
            Token::AddFavorite(mode, index, stamp) => {
                self.add_favorite(user, *mode, *index, *stamp, Leaf::Favorite)
                    .await
            }
            Token::AddTrainFavorite {
                mode,
                line,
                letter,
                index,
                stamp,
            } => {
                let leaf = Leaf::Train {
                    line: line.clone(),
                    letter: *letter,
                };
                self.add_favorite(user, *mode, *index, Some(*stamp), leaf)
                    .await
            }
            Token::RemoveFavorite(mode, index, stamp) => {
                self.remove_favorite(user, *mode, *index, *stamp).await
            }
            Token::DropFavorite(mode, key) => self.drop_favorite(user, *mode, *key).await,
            Token::RenameFavorite(mode, index, stamp) => {
                self.begin_rename(user, *mode, *index, *stamp).await
            }
        }
    }

    /// Refresh an inline message. Only stop tokens mean anything there.
    pub async fn open_inline(&self, token: &Token) -> Option<Screen> {
        match token {
            Token::StopTime { mode, index, .. } | Token::TrainTime { mode, index, .. } => {
                Some(self.stop_time(None, *mode, *index, Leaf::Inline).await)
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Menus
    // ------------------------------------------------------------------------

    pub fn main_menu(&self) -> Screen {
        Screen::new("Menú")
            .row([Button::new("🌤 Tiempo 🌤", &Token::Weather)])
            .row([
                Button::new("💳 Abono 💳", &Token::Card),
                Button::new("🚲 BiciMAD 🚲", &Token::BusMenu(Mode::Bikeshare)),
            ])
            .row([
                Button::new("🚇 Metro 🚇", &Token::TrainMenu(Mode::Metro)),
                Button::new("🚆 Cercanías 🚆", &Token::TrainMenu(Mode::CommuterRail)),
            ])
            .row([
                Button::new("🚎 EMT 🚎", &Token::BusMenu(Mode::BusUrban)),
                Button::new("🚌 Interurbano 🚌", &Token::BusMenu(Mode::BusInterurban)),
            ])
            .row([Button::new("❤️ Favoritos ❤️", &Token::Favorites)])
    }

    fn back_to_menu(screen: Screen) -> Screen {
        screen.row([Button::new(BACK_MENU, &Token::MainMenu)])
    }

    fn stale_stop() -> Screen {
        Self::back_to_menu(Screen::new(STALE_STOP))
    }

    pub async fn weather(&self) -> Screen {
        let forecast = self.live.forecast().await;
        Screen::new(render(&WeatherTemplate::new(&forecast)))
            .row([Button::new(REFRESH, &Token::Weather)])
            .row([Button::new(BACK_MENU, &Token::MainMenu)])
    }

    pub async fn card(&self, user: UserId) -> Screen {
        let Some(number) = self.store.card(user).await.as_deref().and_then(CardNumber::parse) else {
            return Self::back_to_menu(Screen::new(CARD_HELP));
        };
        let status = self.live.card(&number).await;
        Screen::new(render(&CardTemplate::new(&status)))
            .row([Button::new(REFRESH, &Token::Card)])
            .row([Button::new(BACK_MENU, &Token::MainMenu)])
    }

    /// Look up a card typed by the user. A valid card is remembered when the
    /// user has opted in to saving it.
    pub async fn lookup_card(&self, user: UserId, number: &CardNumber) -> Screen {
        let status = self.live.card(number).await;
        if status.data().is_some()
            && self.store.saves_card(user).await
            && let Err(e) = self.store.set_card(user, number.as_str()).await
        {
            warn!(user, error = %e, "failed to save card");
        }
        Screen::new(render(&CardTemplate::new(&status)))
    }

    /// Line list for metro and commuter rail; other modes get the
    /// typed-search prompt.
    pub async fn train_menu(&self, mode: Mode) -> Screen {
        if !mode.is_line_aware() {
            return self.bus_menu(mode);
        }
        let catalog = self.catalogs.snapshot(mode).await;
        let mut lines: Vec<_> = catalog.lines().cloned().collect();
        sort_lines(mode, &mut lines);

        let buttons = lines
            .into_iter()
            .map(|line| {
                let label = line.to_string();
                Button::new(label, &Token::LineMenu(mode, LineSelector::Line(line)))
            })
            .collect();

        Screen::new(format!("Líneas de {}", mode.label()))
            .grid(buttons)
            .row([Button::new(
                "A-Z",
                &Token::LineMenu(mode, LineSelector::AllStations),
            )])
            .row([Button::new(BACK_MENU, &Token::MainMenu)])
    }

    /// Prompt for modes browsed by typed name or number.
    pub fn bus_menu(&self, mode: Mode) -> Screen {
        let what = if mode.accepts_number() {
            "el nombre o número"
        } else {
            "el nombre"
        };
        Self::back_to_menu(Screen::new(format!(
            "Envía {what} de la {} al comando /{}.\n\n{}",
            mode.stop_noun(),
            mode.command(),
            command_examples(mode)
        )))
    }

    pub async fn line_menu(&self, mode: Mode, selector: &LineSelector) -> Screen {
        let catalog = self.catalogs.snapshot(mode).await;
        let back = [
            Button::new(BACK_LINES, &Token::TrainMenu(mode)),
            Button::new(BACK_MENU, &Token::MainMenu),
        ];
        let Some(mut buckets) = catalog.buckets(selector) else {
            return Screen::new(STALE_LINE).row(back);
        };
        sort_buckets(&mut buckets);

        let buttons = buckets
            .into_iter()
            .map(|b| Button::new(b.to_string(), &Token::StationMenu(mode, selector.clone(), b)))
            .collect();

        Screen::new(format!("Estaciones de la {}", selector_title(selector)))
            .grid(buttons)
            .row(back)
    }

    pub async fn station_menu(&self, mode: Mode, selector: &LineSelector, letter: Bucket) -> Screen {
        let catalog = self.catalogs.snapshot(mode).await;
        let back = [
            Button::new(
                format!("« {}", selector_title(selector)),
                &Token::LineMenu(mode, selector.clone()),
            ),
            Button::new(BACK_LINES, &Token::TrainMenu(mode)),
            Button::new(BACK_MENU, &Token::MainMenu),
        ];
        let Some(indices) = catalog.bucket_stops(selector, letter) else {
            return Screen::new(STALE_LINE).row(back);
        };

        let stations = indices
            .iter()
            .filter_map(|&i| catalog.display_name(i).map(|name| (name, i)))
            .collect();
        let buttons = sort_stations(stations).into_iter().map(|(name, index)| {
            let token = Token::TrainTime {
                mode,
                line: selector.clone(),
                letter,
                index,
            };
            Button::new(name, &token)
        });

        Screen::new(format!(
            "Estaciones de la {} ({letter})",
            selector_title(selector)
        ))
        .column(buttons)
        .row(back)
    }

    // ------------------------------------------------------------------------
    // Leaves
    // ------------------------------------------------------------------------

    /// Live times for one stop with the chrome for how it was reached.
    pub async fn stop_time(&self, user: Option<UserId>, mode: Mode, index: StopIndex, leaf: Leaf) -> Screen {
        let catalog = self.catalogs.snapshot(mode).await;
        self.stop_screen(&catalog, user, index, leaf).await
    }

    async fn stop_screen(
        &self,
        catalog: &Catalog,
        user: Option<UserId>,
        index: StopIndex,
        leaf: Leaf,
    ) -> Screen {
        let mode = catalog.mode();
        let (Some(stop), Some(heading)) = (catalog.stop(index), catalog.display_name(index)) else {
            debug!(mode = %mode, index = index.0, "stale stop index");
            let screen = Screen::new(STALE_STOP);
            return match leaf {
                Leaf::Inline => screen,
                _ => Self::back_to_menu(screen),
            };
        };

        let body = if mode == Mode::Bikeshare {
            let dock = self.live.dock(&stop.live_id).await;
            render(&DockTemplate::new(&heading, &dock))
        } else {
            let departures = self.live.departures(mode, &stop.live_id).await;
            render(&StopTimesTemplate::new(mode, &heading, &departures))
        };

        let mut screen = Screen::new(body).row([Button::new(REFRESH, &leaf.token(mode, index))]);

        match &leaf {
            Leaf::Train { line, letter } => {
                screen = screen.row([
                    Button::new(
                        BACK_STATIONS,
                        &Token::StationMenu(mode, line.clone(), *letter),
                    ),
                    Button::new(
                        format!("« {}", selector_title(line)),
                        &Token::LineMenu(mode, line.clone()),
                    ),
                    Button::new(BACK_LINES, &Token::TrainMenu(mode)),
                    Button::new(BACK_MENU, &Token::MainMenu),
                ]);
            }
            Leaf::Favorite => {
                return screen
                    .row([
                        Button::new(BACK_FAVORITES, &Token::Favorites),
                        Button::new(BACK_MENU, &Token::MainMenu),
                    ])
                    .row([Button::new(
                        REMOVE_FAVORITE,
                        &Token::RemoveFavorite(mode, index, Some(catalog.stamp())),
                    )]);
            }
            Leaf::Inline => return screen,
            Leaf::Bus | Leaf::Command => {}
        }

        // Asked on every render: the user may have saved it elsewhere
        if let Some(user) = user
            && !self.store.is_favorite(user, mode, &stop.external_id).await
        {
            screen = screen.row([Button::new(
                ADD_FAVORITE,
                &leaf.add_token(mode, index, catalog.stamp()),
            )]);
        }
        screen
    }

    // ------------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------------

    /// A user's favorites in saved order, each resolved against the
    /// current catalog of its mode.
    async fn listed_favorites(&self, user: UserId) -> Vec<Listed> {
        let mut catalogs: HashMap<Mode, Arc<Catalog>> = HashMap::new();
        let mut listed = Vec::new();
        for fav in self.store.favorites(user).await {
            let catalog = match catalogs.get(&fav.mode) {
                Some(c) => Arc::clone(c),
                None => {
                    let c = self.catalogs.snapshot(fav.mode).await;
                    catalogs.insert(fav.mode, Arc::clone(&c));
                    c
                }
            };
            let at = catalog
                .index_of(&fav.external_id)
                .map(|index| (index, catalog.stamp()));
            if at.is_none() {
                warn!(
                    user,
                    mode = %fav.mode,
                    id = %fav.external_id,
                    "favorite no longer in catalog"
                );
            }
            listed.push(Listed {
                mode: fav.mode,
                key: FavoriteKey::of(&fav.external_id),
                name: fav.name,
                at,
            });
        }
        listed
    }

    /// Favorites list. Stops the catalog no longer has stay listed with a
    /// button that only removes them.
    pub async fn favorites(&self, user: UserId) -> Screen {
        let listed = self.listed_favorites(user).await;
        if listed.is_empty() {
            return Self::back_to_menu(Screen::new(NO_FAVORITES));
        }
        let mut text = "Estas son tus paradas/estaciones en favoritos".to_string();
        if listed.iter().any(|fav| fav.at.is_none()) {
            text.push_str("\n\n");
            text.push_str(GONE_NOTE);
        }
        let buttons = listed.into_iter().map(|fav| {
            let label = format!("{}: {}", fav.mode.label(), fav.name);
            match fav.at {
                Some((index, _)) => {
                    let token = Token::StopTime {
                        mode: fav.mode,
                        index,
                        origin: Origin::Favorite,
                    };
                    Button::new(label, &token)
                }
                None => Button::new(
                    format!("{GONE_MARK} {label}"),
                    &Token::DropFavorite(fav.mode, fav.key),
                ),
            }
        });
        Self::back_to_menu(Screen::new(text).column(buttons))
    }

    pub async fn rename_menu(&self, user: UserId) -> Screen {
        let buttons: Vec<Button> = self
            .listed_favorites(user)
            .await
            .into_iter()
            .filter_map(|fav| {
                let (index, stamp) = fav.at?;
                Some(Button::new(
                    format!("{}: {}", fav.mode.label(), fav.name),
                    &Token::RenameFavorite(fav.mode, index, stamp),
                ))
            })
            .collect();
        if buttons.is_empty() {
            return Self::back_to_menu(Screen::new(NO_FAVORITES));
        }
        Self::back_to_menu(
            Screen::new("Indícame la estación/parada que quieras renombrar").column(buttons),
        )
    }

    /// The stop a favorite button names, if its index still means what it
    /// did when the button was rendered.
    fn pinned(catalog: &Catalog, index: StopIndex, stamp: Option<Stamp>) -> Option<&Stop> {
        if stamp != Some(catalog.stamp()) {
            debug!(mode = %catalog.mode(), index = index.0, ?stamp, "favorite token from another catalog");
            return None;
        }
        catalog.stop(index)
    }

    /// Save a stop and re-render its leaf. Stops saved while browsing lines
    /// keep their back chain; anything else becomes a favorite leaf.
    pub async fn add_favorite(
        &self,
        user: UserId,
        mode: Mode,
        index: StopIndex,
        stamp: Option<Stamp>,
        leaf: Leaf,
    ) -> Screen {
        let catalog = self.catalogs.snapshot(mode).await;
        let Some(stop) = Self::pinned(&catalog, index, stamp) else {
            return Self::stale_stop();
        };
        let name = catalog
            .display_name(index)
            .unwrap_or_else(|| stop.name.clone());
        match self
            .store
            .add_favorite(user, mode, &stop.external_id, &name)
            .await
        {
            Ok(added) => debug!(user, mode = %mode, id = %stop.external_id, added, "favorite saved"),
            Err(e) => {
                warn!(user, mode = %mode, error = %e, "failed to save favorite");
                return Self::back_to_menu(Screen::new(STORE_FAILED));
            }
        }
        self.stop_screen(&catalog, Some(user), index, leaf).await
    }

    /// Remove a favorite and show what is left.
    pub async fn remove_favorite(
        &self,
        user: UserId,
        mode: Mode,
        index: StopIndex,
        stamp: Option<Stamp>,
    ) -> Screen {
        let catalog = self.catalogs.snapshot(mode).await;
        let Some(stop) = Self::pinned(&catalog, index, stamp) else {
            return Self::stale_stop();
        };
        if let Err(e) = self
            .store
            .remove_favorite(user, mode, &stop.external_id)
            .await
        {
            warn!(user, mode = %mode, error = %e, "failed to remove favorite");
            return Self::back_to_menu(Screen::new(STORE_FAILED));
        }
        self.favorites(user).await
    }

    /// Remove a favorite by key, whether or not the catalog still has it.
    pub async fn drop_favorite(&self, user: UserId, mode: Mode, key: FavoriteKey) -> Screen {
        let target = self
            .store
            .favorites(user)
            .await
            .into_iter()
            .find(|f| f.mode == mode && FavoriteKey::of(&f.external_id) == key);
        if let Some(fav) = target
            && let Err(e) = self
                .store
                .remove_favorite(user, mode, &fav.external_id)
                .await
        {
            warn!(user, mode = %mode, error = %e, "failed to drop favorite");
            return Self::back_to_menu(Screen::new(STORE_FAILED));
        }
        self.favorites(user).await
    }

    /// Arm the rename prompt for a favorite.
    pub async fn begin_rename(&self, user: UserId, mode: Mode, index: StopIndex, stamp: Stamp) -> Screen {
        let catalog = self.catalogs.snapshot(mode).await;
        let Some(stop) = Self::pinned(&catalog, index, Some(stamp)) else {
            return Self::stale_stop();
        };
        let saved = self
            .store
            .favorites(user)
            .await
            .into_iter()
            .find(|f| f.mode == mode && f.external_id == stop.external_id);
        let Some(fav) = saved else {
            return Screen::new(NOT_FAVORITE).row([
                Button::new(BACK_FAVORITES, &Token::Favorites),
                Button::new(BACK_MENU, &Token::MainMenu),
            ]);
        };

        self.pending
            .set(
                user,
                Pending::Rename {
                    mode,
                    external_id: fav.external_id,
                    old_name: fav.name,
                },
            )
            .await;
        Screen::new(RENAME_PROMPT)
    }
}
