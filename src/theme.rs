use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Theme {
    pub screen_bg: Color,
    pub card_bg: Color,
    pub input_bg: Color,
    pub status_bg: Color,
    pub text_fg: Color,
    pub muted_fg: Color,
    pub accent_fg: Color,
    pub error_fg: Color,
    pub user_bubble_bg: Color,
    pub ai_bubble_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            screen_bg: Color::Rgb(24, 26, 27),
            card_bg: Color::Rgb(38, 41, 43),
            input_bg: Color::Rgb(52, 56, 58),
            status_bg: Color::Rgb(30, 32, 33),
            text_fg: Color::Rgb(225, 225, 225),
            muted_fg: Color::Rgb(170, 175, 178),
            accent_fg: Color::Rgb(150, 200, 255),
            error_fg: Color::Rgb(235, 120, 120),
            user_bubble_bg: Color::Rgb(58, 82, 54),
            ai_bubble_bg: Color::Rgb(48, 52, 56),
        }
    }
}

impl Theme {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path_ref = path.as_ref();
        match fs::read_to_string(path_ref) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(theme) => theme,
                Err(err) => {
                    eprintln!(
                        "Failed to parse theme file '{}': {err}. Using defaults.",
                        path_ref.display()
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let cfg: ThemeToml = toml::from_str(s)?;
        Ok(Self {
            screen_bg: cfg.colors.screen_bg.to_color(),
            card_bg: cfg.colors.card_bg.to_color(),
            input_bg: cfg.colors.input_bg.to_color(),
            status_bg: cfg.colors.status_bg.to_color(),
            text_fg: cfg.colors.text_fg.to_color(),
            muted_fg: cfg.colors.muted_fg.to_color(),
            accent_fg: cfg.colors.accent_fg.to_color(),
            error_fg: cfg.colors.error_fg.to_color(),
            user_bubble_bg: cfg.colors.user_bubble_bg.to_color(),
            ai_bubble_bg: cfg.colors.ai_bubble_bg.to_color(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ThemeToml {
    colors: ThemeColorsToml,
}

#[derive(Debug, Deserialize)]
struct ThemeColorsToml {
    screen_bg: RgbToml,
    card_bg: RgbToml,
    input_bg: RgbToml,
    status_bg: RgbToml,
    text_fg: RgbToml,
    muted_fg: RgbToml,
    accent_fg: RgbToml,
    error_fg: RgbToml,
    user_bubble_bg: RgbToml,
    ai_bubble_bg: RgbToml,
}

#[derive(Debug, Deserialize)]
struct RgbToml {
    r: u8,
    g: u8,
    b: u8,
}

impl RgbToml {
    fn to_color(&self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}
