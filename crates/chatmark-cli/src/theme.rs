use ratatui::style::Color;

/// Colors for each role the chat view paints.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub text: Color,
    pub accent: Color,
    pub dim: Color,
    pub ok: Color,
    pub error: Color,
    pub user: Color,
    pub assistant: Color,
    pub notice: Color,
    pub code: Color,
    pub border: Color,
}

const THEMES: &[(&str, fn() -> Theme)] = &[
    ("dark", Theme::dark),
    ("light", Theme::light),
    ("solarized", Theme::solarized),
];

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            text: Color::Rgb(208, 208, 200),
            accent: Color::Rgb(95, 175, 215),
            dim: Color::Rgb(118, 118, 112),
            ok: Color::Rgb(135, 195, 120),
            error: Color::Rgb(225, 95, 90),
            user: Color::Rgb(110, 190, 230),
            assistant: Color::Rgb(170, 205, 140),
            notice: Color::Rgb(230, 190, 95),
            code: Color::Rgb(200, 160, 220),
            border: Color::Rgb(72, 72, 68),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            text: Color::Rgb(40, 40, 46),
            accent: Color::Rgb(30, 100, 170),
            dim: Color::Rgb(130, 130, 138),
            ok: Color::Rgb(40, 130, 60),
            error: Color::Rgb(185, 40, 45),
            user: Color::Rgb(25, 95, 160),
            assistant: Color::Rgb(60, 120, 40),
            notice: Color::Rgb(160, 105, 10),
            code: Color::Rgb(120, 60, 150),
            border: Color::Rgb(185, 185, 190),
        }
    }

    /// Ethan Schoonover's Solarized accents over its dark base tones.
    pub fn solarized() -> Self {
        Self {
            name: "solarized",
            text: Color::Rgb(147, 161, 161),
            accent: Color::Rgb(38, 139, 210),
            dim: Color::Rgb(88, 110, 117),
            ok: Color::Rgb(133, 153, 0),
            error: Color::Rgb(220, 50, 47),
            user: Color::Rgb(42, 161, 152),
            assistant: Color::Rgb(133, 153, 0),
            notice: Color::Rgb(181, 137, 0),
            code: Color::Rgb(108, 113, 196),
            border: Color::Rgb(7, 54, 66),
        }
    }

    /// Unknown names fall back to `dark`.
    pub fn by_name(name: &str) -> Self {
        if !Self::all_names().contains(&name) {
            tracing::warn!(theme = name, known = ?Self::all_names(), "unknown theme, using dark");
        }
        THEMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, build)| build())
            .unwrap_or_else(Self::dark)
    }

    pub fn all_names() -> Vec<&'static str> {
        THEMES.iter().map(|(n, _)| *n).collect()
    }
}
