use inksac::prelude::*;

#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    color_support: ColorSupport,
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    /// A highlighter that never emits escape codes.
    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn enabled(&self) -> bool {
        !matches!(self.color_support, ColorSupport::NoColor)
    }

    /// Colours `user@host:dir $ ` as identity in green and directory in blue.
    pub fn highlight_prompt(&self, prompt: &str) -> String {
        if !self.enabled() {
            return prompt.to_string();
        }

        let Some((identity, rest)) = prompt.split_once(':') else {
            return prompt.to_string();
        };
        let (dir, tail) = match rest.rfind(" $ ") {
            Some(pos) => rest.split_at(pos),
            None => (rest, ""),
        };

        let identity_style = Style::builder()
            .foreground(Color::Green)
            .bold()
            .build();
        let dir_style = Style::builder()
            .foreground(Color::Blue)
            .bold()
            .build();

        format!(
            "{}:{}{}",
            identity.style(identity_style),
            dir.style(dir_style),
            tail
        )
    }

    pub fn highlight_error(&self, error: &str) -> String {
        if !self.enabled() {
            return error.to_string();
        }

        let error_style = Style::builder()
            .foreground(Color::Red)
            .bold()
            .build();

        error.style(error_style).to_string()
    }
}
