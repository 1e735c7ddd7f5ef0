//! Rendered screens: a message body plus an inline keyboard.

use serde::Serialize;

use crate::token::Token;

/// Buttons per keyboard row in grid menus.
pub const KEYBOARD_WIDTH: usize = 4;

/// One inline button; `data` is an encoded [`Token`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: &Token) -> Self {
        Self {
            label: label.into(),
            data: token.encode(),
        }
    }
}

/// A message to show, with its keyboard rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    /// Chat HTML.
    pub text: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl Screen {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    /// Append a row.
    pub fn row(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        let row: Vec<Button> = buttons.into_iter().collect();
        if !row.is_empty() {
            self.keyboard.push(row);
        }
        self
    }

    /// Append buttons laid out [`KEYBOARD_WIDTH`] per row.
    pub fn grid(mut self, buttons: Vec<Button>) -> Self {
        self.keyboard
            .extend(buttons.chunks(KEYBOARD_WIDTH).map(<[Button]>::to_vec));
        self
    }

    /// Append one button per row.
    pub fn column(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.keyboard.extend(buttons.into_iter().map(|b| vec![b]));
        self
    }

    /// Every button's token, in layout order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.keyboard.iter().flatten().map(|b| b.data.as_str())
    }

    pub fn has_token(&self, token: &Token) -> bool {
        let encoded = token.encode();
        self.tokens().any(|t| t == encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mode;

    #[test]
    fn grid_chunks_by_width() {
        let buttons: Vec<Button> = (0..10)
            .map(|_| Button::new("x", &Token::TrainMenu(Mode::Metro)))
            .collect();
        let screen = Screen::new("t").grid(buttons);
        let widths: Vec<usize> = screen.keyboard.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![4, 4, 2]);
    }

    #[test]
    fn empty_rows_are_skipped() {
        let screen = Screen::new("t").row(Vec::new()).column(Vec::new());
        assert!(screen.keyboard.is_empty());
    }

    #[test]
    fn token_lookup() {
        let screen = Screen::new("t").row([Button::new("« Menú", &Token::MainMenu)]);
        assert!(screen.has_token(&Token::MainMenu));
        assert!(!screen.has_token(&Token::Favorites));
        assert_eq!(screen.tokens().collect::<Vec<_>>(), vec!["main_menu"]);
    }
}
