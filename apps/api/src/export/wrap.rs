//! Greedy line wrapping for the structured renderer.

use crate::export::metrics::FontMetricTable;

/// Splits `text` into printed lines no wider than `max_width_pt`.
///
/// Each `\n` starts a new paragraph; blank paragraphs survive as empty lines.
/// Runs of whitespace inside a paragraph collapse to one space. A single word wider
/// than the line is broken between characters.
pub fn split_text_to_size(
    text: &str,
    metrics: &FontMetricTable,
    font_size_pt: f32,
    max_width_pt: f32,
) -> Vec<String> {
    let space_w = metrics.char_width(' ', font_size_pt);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_w = metrics.measure_str(word, font_size_pt);

            if !current.is_empty() {
                if current_width + space_w + word_w <= max_width_pt {
                    current.push(' ');
                    current.push_str(word);
                    current_width += space_w + word_w;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_w <= max_width_pt {
                current.push_str(word);
                current_width = word_w;
            } else {
                for c in word.chars() {
                    let char_w = metrics.char_width(c, font_size_pt);
                    if !current.is_empty() && current_width + char_w > max_width_pt {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += char_w;
                }
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::metrics::{get_metrics, PdfFont};

    fn courier() -> &'static FontMetricTable {
        get_metrics(PdfFont::Courier)
    }

    /// Courier 10pt = 6pt per character; 60pt fits exactly 10 characters.
    fn wrap(text: &str) -> Vec<String> {
        split_text_to_size(text, courier(), 10.0, 60.0)
    }

    #[test]
    fn test_short_line_untouched() {
        assert_eq!(wrap("hello"), vec!["hello"]);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        assert_eq!(wrap("alpha beta gamma"), vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn test_preserves_paragraphs_and_blank_lines() {
        assert_eq!(
            wrap("SUMMARY:\n\nRust\r\nGo"),
            vec!["SUMMARY:", "", "Rust", "Go"]
        );
    }

    #[test]
    fn test_breaks_overlong_word() {
        assert_eq!(
            wrap("abcdefghijklmnopqrstuvwxy"),
            vec!["abcdefghij", "klmnopqrst", "uvwxy"]
        );
    }

    #[test]
    fn test_overlong_word_after_short_word() {
        assert_eq!(
            wrap("ab abcdefghijkl"),
            vec!["ab", "abcdefghij", "kl"]
        );
    }

    #[test]
    fn test_no_line_exceeds_width() {
        let text = "Results-driven professional with expertise in 5+ years React experience \
                    and TypeScript proficiency. Proven track record of delivering high-impact solutions.";
        let metrics = courier();
        for line in split_text_to_size(text, metrics, 12.0, 200.0) {
            assert!(
                metrics.measure_str(&line, 12.0) <= 200.0 + 1e-3,
                "line too wide: {line:?}"
            );
        }
    }
}
