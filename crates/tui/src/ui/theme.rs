use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(80, 160, 160),
            border: Color::Rgb(70, 80, 90),
            error: Color::Rgb(200, 80, 80),
        }
    }
}

/// Display color per expense type. Total over the six known types, with a
/// fallback for anything the server sends that we do not recognize.
pub fn expense_color(kind: &str) -> Color {
    match kind {
        "Food" => Color::Rgb(0xA3, 0x37, 0x57),
        "Transport" => Color::Rgb(0xDC, 0x58, 0x6D),
        "Entertainment" => Color::Rgb(0x9C, 0x82, 0xA3),
        "Shopping" => Color::Rgb(0x66, 0x22, 0x49),
        "Accommodation" => Color::Rgb(0xF0, 0x6C, 0x9B),
        "Misc" => Color::Rgb(0xFF, 0x6B, 0x6B),
        _ => Color::Rgb(0xFF, 0x6B, 0x6B),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::expense::ExpenseType;

    #[test]
    fn every_known_type_has_a_color_and_unknown_falls_back() {
        let fallback = expense_color("definitely-not-a-type");
        for kind in ExpenseType::ALL {
            // Each known type resolves without hitting the fallback arm,
            // except Misc which shares the fallback color on purpose.
            let color = expense_color(kind.as_str());
            if kind != ExpenseType::Misc {
                assert_ne!(color, fallback, "{} should have its own color", kind.as_str());
            }
        }
    }
}
