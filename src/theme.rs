//! Named colour themes for the terminal shell.
//!
//! A theme is resolved once from configuration and passed to the shell.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Minty,
    Darkly,
    Flatly,
    Journal,
    Cyborg,
    Solar,
    Superhero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub border: Color,
    pub text: Color,
    pub highlight: Color,
    pub done: Color,
    pub status: Color,
}

impl ThemeName {
    pub fn palette(self) -> Palette {
        let (border, text, highlight) = match self {
            ThemeName::Minty => (Color::Rgb(120, 194, 173), Color::White, Color::Rgb(243, 150, 154)),
            ThemeName::Darkly => (Color::Rgb(55, 90, 127), Color::Gray, Color::Rgb(0, 188, 140)),
            ThemeName::Flatly => (Color::Rgb(44, 62, 80), Color::White, Color::Rgb(24, 188, 156)),
            ThemeName::Journal => (Color::Rgb(235, 104, 100), Color::White, Color::Rgb(187, 187, 187)),
            ThemeName::Cyborg => (Color::Rgb(42, 159, 214), Color::Gray, Color::Rgb(119, 179, 0)),
            ThemeName::Solar => (Color::Rgb(181, 137, 0), Color::Rgb(131, 148, 150), Color::Rgb(42, 161, 152)),
            ThemeName::Superhero => (Color::Rgb(223, 105, 26), Color::White, Color::Rgb(91, 192, 222)),
        };
        Palette {
            border,
            text,
            highlight,
            done: Color::DarkGray,
            status: highlight,
        }
    }
}

impl Palette {
    pub fn block(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn row(&self, done: bool) -> Style {
        if done {
            Style::default()
                .fg(self.done)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(self.text)
        }
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }
}
