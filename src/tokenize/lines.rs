//! Grouping characters into words and text lines.

use crate::model::{Character, Line, Page, Position, Rectangle, TextLine, Word};
use crate::observe::{Diagnostic, PipelineObserver, Stage};
use crate::stats::{CharacterStatistic, FreqCounter};

use super::TokenizerConfig;

/// Groups the characters of a page into text lines.
///
/// Characters are clustered by baseline with a tolerance proportional
/// to the page's most common font size, so that superscripts and
/// subscripts attach to the dominant baseline of their line. Rotated
/// text is clustered separately per rotation quadrant.
pub struct LineTokenizer {
    config: TokenizerConfig,
}

impl LineTokenizer {
    /// Create a new line tokenizer.
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// Tokenize the characters of the given page into text lines.
    ///
    /// Never fails: a page with zero clusterable characters yields an
    /// empty list. Characters with degenerate geometry are dropped
    /// with a diagnostic.
    pub fn tokenize(&self, page: &Page, observer: &dyn PipelineObserver) -> Vec<TextLine> {
        let mut valid: Vec<&Character> = Vec::with_capacity(page.characters.len());
        for ch in &page.characters {
            if ch.position.rectangle.is_valid() && ch.baseline.start_y.is_finite() {
                valid.push(ch);
            } else {
                observer.diagnostic(&Diagnostic::new(
                    Stage::LineTokenizer,
                    Some(page.number),
                    format!("dropped character {:?} with degenerate geometry", ch.glyph),
                ));
            }
        }

        if valid.is_empty() {
            return Vec::new();
        }

        let page_stat = CharacterStatistic::from_characters(valid.iter().copied());
        let tolerance = self.config.cluster_factor * page_stat.most_common_font_size();

        // Cluster per rotation quadrant; unrotated text first.
        let mut lines = Vec::new();
        for rotation in [0u16, 90, 180, 270] {
            let bucket: Vec<&Character> =
                valid.iter().copied().filter(|c| c.rotation == rotation).collect();
            lines.extend(self.cluster_bucket(bucket, tolerance));
        }

        log::debug!(
            "page {}: tokenized {} characters into {} lines",
            page.number,
            valid.len(),
            lines.len()
        );

        lines
    }

    /// Cluster one rotation bucket into lines, top to bottom.
    fn cluster_bucket(&self, mut chars: Vec<&Character>, tolerance: f32) -> Vec<TextLine> {
        if chars.is_empty() {
            return Vec::new();
        }

        // Sort by baseline, top to bottom; left to right within a
        // baseline.
        chars.sort_by(|a, b| {
            b.baseline
                .start_y
                .partial_cmp(&a.baseline.start_y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.position
                        .rectangle
                        .min_x
                        .partial_cmp(&b.position.rectangle.min_x)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        let mut clusters: Vec<Vec<&Character>> = Vec::new();
        let mut current: Vec<&Character> = Vec::new();
        let mut current_y = f32::NAN;

        for ch in chars {
            if current.is_empty() || (ch.baseline.start_y - current_y).abs() <= tolerance {
                if current.is_empty() {
                    current_y = ch.baseline.start_y;
                }
                current.push(ch);
            } else {
                clusters.push(std::mem::take(&mut current));
                current_y = ch.baseline.start_y;
                current.push(ch);
            }
        }
        if !current.is_empty() {
            clusters.push(current);
        }

        clusters
            .into_iter()
            .filter_map(|cluster| self.build_line(cluster))
            .collect()
    }

    /// Build a text line from one baseline cluster, or `None` when the
    /// cluster holds only whitespace.
    fn build_line(&self, mut cluster: Vec<&Character>) -> Option<TextLine> {
        cluster.sort_by(|a, b| {
            a.position
                .rectangle
                .min_x
                .partial_cmp(&b.position.rectangle.min_x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // The dominant baseline is the most common one among the
        // cluster members; superscripts do not contribute theirs.
        let mut baselines = FreqCounter::new();
        for ch in &cluster {
            baselines.add((ch.baseline.start_y * 10.0).round() as i32);
        }
        let dominant_y = *baselines.most_common()? as f32 / 10.0;

        let threshold = self.word_gap_threshold(&cluster);

        let mut words: Vec<Word> = Vec::new();
        let mut current: Vec<Character> = Vec::new();
        let mut prev_max_x = f32::NAN;

        for ch in &cluster {
            if ch.is_whitespace() {
                // Whitespace delimits words and is not retained.
                if !current.is_empty() {
                    words.push(Word::from_characters(std::mem::take(&mut current)));
                }
                prev_max_x = ch.position.rectangle.max_x;
                continue;
            }
            let gap = ch.position.rectangle.min_x - prev_max_x;
            if !current.is_empty() && gap > threshold {
                words.push(Word::from_characters(std::mem::take(&mut current)));
            }
            prev_max_x = ch.position.rectangle.max_x;
            current.push((*ch).clone());
        }
        if !current.is_empty() {
            words.push(Word::from_characters(current));
        }

        if words.is_empty() {
            return None;
        }

        let printable: Vec<&Character> = cluster
            .iter()
            .copied()
            .filter(|c| !c.is_whitespace())
            .collect();
        let rect = Rectangle::union_all(printable.iter().map(|c| &c.position.rectangle))?;
        let page_number = printable.first()?.position.page_number;
        let statistic = CharacterStatistic::from_characters(printable.iter().copied());

        Some(TextLine {
            words,
            position: Position::new(page_number, rect),
            baseline: Some(Line::horizontal(rect.min_x, rect.max_x, dominant_y)),
            character_statistic: statistic,
        })
    }

    /// The horizontal gap above which two characters belong to
    /// different words: the most common whitespace width of the line,
    /// or a fraction of the line's most common font size when the line
    /// has no whitespace glyphs.
    fn word_gap_threshold(&self, cluster: &[&Character]) -> f32 {
        let mut widths = FreqCounter::new();
        for ch in cluster.iter().filter(|c| c.is_whitespace()) {
            widths.add((ch.position.rectangle.width() * 10.0).round() as i32);
        }
        if let Some(width) = widths.most_common() {
            return *width as f32 / 10.0;
        }

        let stat = CharacterStatistic::from_characters(
            cluster.iter().copied().filter(|c| !c.is_whitespace()),
        );
        self.config.word_gap_factor * stat.most_common_font_size()
    }
}
