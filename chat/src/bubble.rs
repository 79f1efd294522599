use crate::transcript::Role;
use colored::{ColoredString, Colorize};
use unicode_segmentation::UnicodeSegmentation;

/// Widest a bubble's text may get, in columns.
pub const MAX_TEXT_WIDTH: usize = 60;
const FALLBACK_TERMINAL_WIDTH: usize = 80;
/// Columns kept free on the opposite side of user and model bubbles.
const SIDE_GAP: usize = 8;

/// A bubble laid out for a terminal of a given width, before coloring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleLayout {
    pub indent: usize,
    pub lines: Vec<String>,
}

pub fn terminal_width() -> usize {
    term_size::dimensions()
        .map(|(w, _)| w)
        .filter(|w| *w > 20)
        .unwrap_or(FALLBACK_TERMINAL_WIDTH)
}

pub fn layout(role: Role, text: &str, terminal_width: usize) -> BubbleLayout {
    // One space of padding on each side of the text plus one column margin.
    let usable = terminal_width.saturating_sub(3).max(1);
    let wrap_width = match role {
        Role::System => usable.saturating_sub(1).max(1),
        Role::User | Role::Model => usable.saturating_sub(SIDE_GAP).clamp(1, MAX_TEXT_WIDTH),
    };

    let wrapped = wrap_text(text, wrap_width);

    match role {
        Role::System => {
            let inner = usable.saturating_sub(1).max(1);
            let lines = wrapped.iter().map(|line| center(line, inner)).collect();
            BubbleLayout { indent: 1, lines }
        }
        Role::User | Role::Model => {
            let inner = wrapped.iter().map(|l| width(l)).max().unwrap_or(0);
            let lines: Vec<String> = wrapped
                .iter()
                .map(|line| {
                    let pad = inner - width(line);
                    if role == Role::User {
                        format!(" {}{} ", " ".repeat(pad), line)
                    } else {
                        format!(" {}{} ", line, " ".repeat(pad))
                    }
                })
                .collect();

            let indent = if role == Role::User {
                terminal_width.saturating_sub(inner + 3)
            } else {
                1
            };
            BubbleLayout { indent, lines }
        }
    }
}

/// Word wrap on Unicode word boundaries. Explicit newlines are kept and
/// words longer than `max_width` are broken by grapheme.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for segment in paragraph.split_word_bounds() {
            let segment_width = width(segment);
            let is_space = segment.trim().is_empty();

            if current_width + segment_width <= max_width {
                if !(is_space && current.is_empty()) {
                    current.push_str(segment);
                    current_width += segment_width;
                }
                continue;
            }

            if !current.is_empty() {
                lines.push(current.trim_end().to_string());
                current.clear();
                current_width = 0;
            }
            if is_space {
                continue;
            }

            for grapheme in segment.graphemes(true) {
                if current_width == max_width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push_str(grapheme);
                current_width += 1;
            }
        }

        lines.push(current.trim_end().to_string());
    }

    lines
}

pub fn paint(role: Role, line: &str) -> ColoredString {
    match role {
        Role::User => line.truecolor(255, 255, 255).on_truecolor(0x2b, 0x52, 0x78),
        Role::Model => line.truecolor(0xe0, 0xe0, 0xe0).on_truecolor(0x36, 0x36, 0x36),
        Role::System => line.truecolor(0x90, 0x90, 0x90).on_truecolor(0x24, 0x24, 0x24),
    }
}

fn center(line: &str, inner: usize) -> String {
    let free = inner.saturating_sub(width(line));
    let left = free / 2;
    format!(" {}{}{} ", " ".repeat(left), line, " ".repeat(free - left))
}

fn width(text: &str) -> usize {
    text.graphemes(true).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("a stack is last in first out", 10);
        assert_eq!(lines, vec!["a stack is", "last in", "first out"]);
        assert!(lines.iter().all(|l| width(l) <= 10));
    }

    #[test]
    fn keeps_explicit_line_breaks() {
        let lines = wrap_text("1. push\n2. pop\n\n3. peek", 40);
        assert_eq!(lines, vec!["1. push", "2. pop", "", "3. peek"]);
    }

    #[test]
    fn breaks_words_longer_than_the_line() {
        let lines = wrap_text("see abcdefghijkl", 5);
        assert_eq!(lines, vec!["see", "abcde", "fghij", "kl"]);
    }

    #[test]
    fn counts_graphemes_not_bytes() {
        let lines = wrap_text("ağaç yığın", 4);
        assert_eq!(lines, vec!["ağaç", "yığı", "n"]);
    }

    #[test]
    fn user_bubbles_hug_the_right_edge() {
        let bubble = layout(Role::User, "hi there", 40);
        assert_eq!(bubble.lines, vec![" hi there "]);
        assert_eq!(bubble.indent + width(&bubble.lines[0]) + 1, 40);
    }

    #[test]
    fn model_bubbles_start_at_the_left() {
        let bubble = layout(Role::Model, "first line\nsecond", 80);
        assert_eq!(bubble.indent, 1);
        assert_eq!(bubble.lines, vec![" first line ", " second     "]);
    }

    #[test]
    fn system_bubbles_span_the_width_centered() {
        let bubble = layout(Role::System, "ready", 21);
        assert_eq!(
            bubble.lines,
            vec![format!("{}ready{}", " ".repeat(7), " ".repeat(7))]
        );
        assert_eq!(bubble.indent + width(&bubble.lines[0]), 20);
    }

    #[test]
    fn chat_bubbles_never_exceed_the_max_width() {
        let text = "word ".repeat(100);
        let bubble = layout(Role::Model, &text, 200);
        assert!(bubble.lines.iter().all(|l| width(l) <= MAX_TEXT_WIDTH + 2));
    }
}
