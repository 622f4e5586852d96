use serde::{Deserialize, Serialize};

use crate::config::FontOptions;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub width: f64,
    pub height: f64,
}

/// Measures rendered tick labels. Hosts with a real text shaper plug it in here.
pub trait LabelMeasurer {
    fn measure(&self, text: &str, font: &FontOptions) -> LabelMetrics;
}

impl<F> LabelMeasurer for F
where
    F: Fn(&str, &FontOptions) -> LabelMetrics,
{
    fn measure(&self, text: &str, font: &FontOptions) -> LabelMetrics {
        self(text, font)
    }
}

/// Fixed-advance measurer: every character is `char_width_factor` em wide.
#[derive(Debug, Clone, Default)]
pub struct DeterministicLabelMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl LabelMeasurer for DeterministicLabelMeasurer {
    fn measure(&self, text: &str, font: &FontOptions) -> LabelMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = font.size.max(1.0);
        let lines: Vec<&str> = text.split('\n').collect();
        let max_chars = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        LabelMetrics {
            width: max_chars as f64 * font_size * char_width_factor,
            height: lines.len() as f64 * font_size * line_height_factor,
        }
    }
}
