//! Tokenization: characters into lines and words, lines into blocks,
//! blocks into paragraphs.

mod blocks;
mod lines;
mod paragraphs;

pub use blocks::BlockTokenizer;
pub use lines::LineTokenizer;
pub use paragraphs::ParagraphAssembler;

/// Tunable constants of the tokenizers. The defaults are part of the
/// extraction contract; change them only to adapt to unusual layouts.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// How far the pitch between two lines may exceed the expected
    /// pitch before a block boundary is assumed, in points.
    pub pitch_slack: f32,

    /// A pitch larger than this factor times the line height is a
    /// block boundary even when no expectation is known. Large values
    /// reduce over-splitting around figures.
    pub figure_pitch_factor: f32,

    /// Tolerance in points for min-x comparisons and pitch equality in
    /// the indentation rule.
    pub indent_slack: f32,

    /// Tolerance in points for min-x comparisons in the reference
    /// start rule.
    pub min_x_slack: f32,

    /// Font size difference in points above which two lines are
    /// considered to have different font faces.
    pub font_size_slack: f32,

    /// Word gap threshold as a fraction of the font size, used when a
    /// line contains no whitespace glyphs to measure.
    pub word_gap_factor: f32,

    /// Baseline clustering tolerance as a fraction of the page's most
    /// common font size. Also bounds how far a superscript baseline
    /// may sit from the dominant baseline of its line.
    pub cluster_factor: f32,
}

impl TokenizerConfig {
    /// Create a config with the default constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected-pitch slack.
    pub fn with_pitch_slack(mut self, slack: f32) -> Self {
        self.pitch_slack = slack;
        self
    }

    /// Set the figure pitch factor.
    pub fn with_figure_pitch_factor(mut self, factor: f32) -> Self {
        self.figure_pitch_factor = factor;
        self
    }

    /// Set the indentation tolerance.
    pub fn with_indent_slack(mut self, slack: f32) -> Self {
        self.indent_slack = slack;
        self
    }

    /// Set the min-x tolerance of the reference start rule.
    pub fn with_min_x_slack(mut self, slack: f32) -> Self {
        self.min_x_slack = slack;
        self
    }

    /// Set the font size tolerance.
    pub fn with_font_size_slack(mut self, slack: f32) -> Self {
        self.font_size_slack = slack;
        self
    }

    /// Set the word gap factor.
    pub fn with_word_gap_factor(mut self, factor: f32) -> Self {
        self.word_gap_factor = factor;
        self
    }

    /// Set the baseline clustering factor.
    pub fn with_cluster_factor(mut self, factor: f32) -> Self {
        self.cluster_factor = factor;
        self
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            pitch_slack: 1.5,
            figure_pitch_factor: 3.0,
            indent_slack: 1.0,
            min_x_slack: 0.5,
            font_size_slack: 0.5,
            word_gap_factor: 0.25,
            cluster_factor: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = TokenizerConfig::default();
        assert_eq!(config.pitch_slack, 1.5);
        assert_eq!(config.figure_pitch_factor, 3.0);
        assert_eq!(config.indent_slack, 1.0);
        assert_eq!(config.min_x_slack, 0.5);
        assert_eq!(config.word_gap_factor, 0.25);
    }

    #[test]
    fn test_builder() {
        let config = TokenizerConfig::new()
            .with_figure_pitch_factor(5.0)
            .with_word_gap_factor(0.3);
        assert_eq!(config.figure_pitch_factor, 5.0);
        assert_eq!(config.word_gap_factor, 0.3);
        assert_eq!(config.pitch_slack, 1.5);
    }
}
