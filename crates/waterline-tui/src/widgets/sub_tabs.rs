//! Inline selector line, e.g. the History range picker.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::theme;

/// `[active]  other  other`, each label prefixed by its key.
pub fn render_sub_tabs(options: &[(char, &str)], active_index: usize) -> Line<'static> {
    let mut spans = Vec::with_capacity(options.len() * 3);

    for (i, (key, label)) in options.iter().enumerate() {
        spans.push(Span::styled(format!(" {key}:"), theme::key_hint()));
        if i == active_index {
            spans.push(Span::styled(
                format!("[{label}]"),
                theme::tab_active().add_modifier(Modifier::UNDERLINED),
            ));
        } else {
            spans.push(Span::styled(format!(" {label} "), theme::tab_inactive()));
        }
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn brackets_only_the_active_option() {
        let line = render_sub_tabs(&[('d', "24 Hours"), ('w', "1 Week")], 1);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " d: 24 Hours  w:[1 Week]");
    }
}
