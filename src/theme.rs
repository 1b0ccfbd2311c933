use ratatui::style::Color;

use crate::annotation::Annotation;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub foreground: Color,
    pub border_active: Color,
    pub border_inactive: Color,
    pub selection_bg: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,

    // Pseudocode
    pub address: Color,
    pub comment: Color,
    pub function_name: Color,
    pub global_variable: Color,
    pub constant: Color,
    pub local_variable: Color,
    pub parameter: Color,
    pub literal: Color,
    pub breakpoint: Color,
    pub breakpoint_disabled: Color,

    // Hex View
    pub hex_bytes: Color,
    pub hex_ascii: Color,

    // UI Elements
    pub dialog_bg: Color,
    pub dialog_fg: Color,
    pub dialog_border: Color,
    pub menu_bg: Color,
    pub menu_fg: Color,
    pub menu_selected_bg: Color,
    pub menu_selected_fg: Color,
    pub menu_disabled_fg: Color,

    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub error_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

// Solarized Palette
struct Solarized;
impl Solarized {
    const BASE03: Color = Color::Rgb(0, 43, 54);
    const BASE02: Color = Color::Rgb(7, 54, 66);
    const BASE01: Color = Color::Rgb(88, 110, 117);
    const BASE00: Color = Color::Rgb(101, 123, 131);
    const BASE0: Color = Color::Rgb(131, 148, 150);
    const BASE1: Color = Color::Rgb(147, 161, 161);
    const BASE2: Color = Color::Rgb(238, 232, 213);
    const BASE3: Color = Color::Rgb(253, 246, 227);
    const YELLOW: Color = Color::Rgb(181, 137, 0);
    const ORANGE: Color = Color::Rgb(203, 75, 22);
    const RED: Color = Color::Rgb(220, 50, 47);
    const MAGENTA: Color = Color::Rgb(211, 54, 130);
    const VIOLET: Color = Color::Rgb(108, 113, 196);
    const BLUE: Color = Color::Rgb(38, 139, 210);
    const CYAN: Color = Color::Rgb(42, 161, 152);
    const GREEN: Color = Color::Rgb(133, 153, 0);
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Solarized Light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "Solarized Dark",
            background: Solarized::BASE03,
            foreground: Solarized::BASE0,
            border_active: Solarized::BLUE,
            border_inactive: Solarized::BASE01,
            selection_bg: Solarized::BASE02,
            status_bar_bg: Solarized::BASE02,
            status_bar_fg: Solarized::BASE1,

            address: Solarized::YELLOW,
            comment: Solarized::BASE01,
            function_name: Solarized::BLUE,
            global_variable: Solarized::MAGENTA,
            constant: Solarized::VIOLET,
            local_variable: Solarized::BASE1,
            parameter: Solarized::CYAN,
            literal: Solarized::GREEN,
            breakpoint: Solarized::RED,
            breakpoint_disabled: Solarized::BASE01,

            hex_bytes: Solarized::BASE1,
            hex_ascii: Solarized::CYAN,

            dialog_bg: Solarized::BASE02,
            dialog_fg: Solarized::BASE0,
            dialog_border: Solarized::BASE1,
            menu_bg: Solarized::BASE02,
            menu_fg: Solarized::BASE0,
            menu_selected_bg: Solarized::BASE01,
            menu_selected_fg: Solarized::BASE3,
            menu_disabled_fg: Solarized::BASE01,

            highlight_fg: Solarized::ORANGE,
            highlight_bg: Solarized::BASE02,
            error_fg: Solarized::RED,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Solarized Light",
            background: Solarized::BASE3,
            foreground: Solarized::BASE00,
            border_active: Solarized::BLUE,
            border_inactive: Solarized::BASE1,
            selection_bg: Solarized::BASE2,
            status_bar_bg: Solarized::BASE2,
            status_bar_fg: Solarized::BASE01,

            address: Solarized::BASE01,
            comment: Solarized::BASE1,
            function_name: Solarized::BLUE,
            global_variable: Solarized::MAGENTA,
            constant: Solarized::VIOLET,
            local_variable: Solarized::BASE00,
            parameter: Solarized::CYAN,
            literal: Solarized::GREEN,
            breakpoint: Solarized::RED,
            breakpoint_disabled: Solarized::BASE1,

            hex_bytes: Solarized::BASE00,
            hex_ascii: Solarized::CYAN,

            dialog_bg: Solarized::BASE2,
            dialog_fg: Solarized::BASE00,
            dialog_border: Solarized::BASE01,
            menu_bg: Solarized::BASE2,
            menu_fg: Solarized::BASE00,
            menu_selected_bg: Solarized::BASE1,
            menu_selected_fg: Solarized::BASE3,
            menu_disabled_fg: Solarized::BASE1,

            highlight_fg: Solarized::ORANGE,
            highlight_bg: Solarized::BASE2,
            error_fg: Solarized::RED,
        }
    }

    /// Foreground for a decorated span.
    pub fn annotation_fg(&self, annotation: &Annotation) -> Color {
        match annotation {
            Annotation::FunctionName { .. } => self.function_name,
            Annotation::GlobalVariable { .. } => self.global_variable,
            Annotation::ConstantVariable { .. } => self.constant,
            Annotation::LocalVariable { .. } => self.local_variable,
            Annotation::FunctionParameter { .. } => self.parameter,
            Annotation::Other => self.literal,
        }
    }

    pub fn all_names() -> Vec<&'static str> {
        vec!["Solarized Dark", "Solarized Light"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_falls_back_to_dark() {
        assert_eq!(Theme::from_name("Solarized Light").name, "Solarized Light");
        assert_eq!(Theme::from_name("Monokai").name, "Solarized Dark");
        assert!(Theme::all_names().contains(&Theme::default().name));
    }
}
