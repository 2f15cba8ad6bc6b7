//! Grouping text lines into text blocks.
//!
//! The tokenizer streams the lines of a page in reading order and
//! decides for each line whether it introduces a new block. The rules
//! are ordered; the first rule that fires wins.

use regex::Regex;

use crate::model::{Rectangle, TextBlock, TextLine};
use crate::stats::TextLineStatistic;

use super::TokenizerConfig;

/// Groups the text lines of a page into text blocks.
pub struct BlockTokenizer {
    config: TokenizerConfig,
    reference_anchor: Regex,
}

impl BlockTokenizer {
    /// Create a new block tokenizer.
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            config,
            reference_anchor: Regex::new(r"^\[(.*)\]\s+").unwrap(),
        }
    }

    /// Tokenize the given lines (one page, in reading order) into text
    /// blocks. `doc_stats` supplies the document-level line-pitch
    /// expectations.
    pub fn tokenize(&self, lines: &[TextLine], doc_stats: &TextLineStatistic) -> Vec<TextBlock> {
        let mut blocks: Vec<TextBlock> = Vec::new();
        let mut current: Vec<TextLine> = Vec::new();

        for i in 0..lines.len() {
            let prev = if i > 0 { Some(&lines[i - 1]) } else { None };
            let line = &lines[i];
            let next = lines.get(i + 1);

            if self.introduces_new_block(&current, prev, line, next, doc_stats)
                && !current.is_empty()
            {
                blocks.push(TextBlock::from_lines(std::mem::take(&mut current)));
            }
            current.push(line.clone());
        }

        // Don't forget the trailing block.
        if !current.is_empty() {
            blocks.push(TextBlock::from_lines(current));
        }

        log::debug!("tokenized {} lines into {} blocks", lines.len(), blocks.len());

        blocks
    }

    /// Decide whether `line` introduces a new text block. The rules
    /// are checked in order; the first that fires wins.
    fn introduces_new_block(
        &self,
        current: &[TextLine],
        prev: Option<&TextLine>,
        line: &TextLine,
        next: Option<&TextLine>,
        doc_stats: &TextLineStatistic,
    ) -> bool {
        // A first line always introduces a block.
        if prev.is_none() {
            return true;
        }

        // Nothing to split while the current block is empty.
        if current.is_empty() {
            return false;
        }

        if !self.overlaps_horizontally(current, line) {
            log::debug!("\"{}\": no horizontal overlap with block", line.text());
            return true;
        }

        if self.is_pitch_larger_than_expected(prev, line, doc_stats) {
            log::debug!("\"{}\": line pitch larger than expected", line.text());
            return true;
        }

        if self.is_pitch_larger_than_next_pitch(prev, line, next) {
            log::debug!("\"{}\": line pitch larger than pitch to next line", line.text());
            return true;
        }

        if self.is_indented(prev, line, next) {
            log::debug!("\"{}\": indented against neighbors", line.text());
            return true;
        }

        if self.has_significant_font_face_change(prev, line) {
            log::debug!("\"{}\": font face changed", line.text());
            return true;
        }

        if self.is_probably_reference_start(prev, line, next) {
            log::debug!("\"{}\": probable reference start", line.text());
            return true;
        }

        false
    }

    /// Check if the x-interval of the current block intersects the
    /// x-interval of the line.
    fn overlaps_horizontally(&self, current: &[TextLine], line: &TextLine) -> bool {
        let Some(block_rect) = Rectangle::union_all(current.iter().map(|l| &l.position.rectangle))
        else {
            return false;
        };
        block_rect.overlaps_horizontally(&line.position.rectangle)
    }

    /// Check if the pitch from `prev` to `line` exceeds the most
    /// common pitch for the line's font face, or is implausibly large
    /// relative to the line height.
    fn is_pitch_larger_than_expected(
        &self,
        prev: Option<&TextLine>,
        line: &TextLine,
        doc_stats: &TextLineStatistic,
    ) -> bool {
        let actual = line_pitch(prev, Some(line));
        let expected = line
            .character_statistic
            .most_common_font_face()
            .map_or(f32::NAN, |face| doc_stats.most_common_line_pitch(face));

        // NaN on either side compares as "not larger".
        if actual - expected > self.config.pitch_slack {
            return true;
        }
        actual > self.config.figure_pitch_factor * line.position.rectangle.height()
    }

    /// Check if the pitch to the previous line exceeds the pitch to
    /// the next line by more than a point.
    fn is_pitch_larger_than_next_pitch(
        &self,
        prev: Option<&TextLine>,
        line: &TextLine,
        next: Option<&TextLine>,
    ) -> bool {
        let prev_pitch = line_pitch(prev, Some(line));
        let next_pitch = line_pitch(Some(line), next);
        prev_pitch - next_pitch > self.config.indent_slack
    }

    /// Check if `line` is indented against both neighbors: equal
    /// pitches, neighbors not both reference anchors, neighbors
    /// flush with each other, and the line inset beyond both.
    fn is_indented(
        &self,
        prev: Option<&TextLine>,
        line: &TextLine,
        next: Option<&TextLine>,
    ) -> bool {
        let prev_pitch = line_pitch(prev, Some(line));
        let next_pitch = line_pitch(Some(line), next);
        if !((prev_pitch - next_pitch).abs() < self.config.indent_slack) {
            return false;
        }

        if self.starts_with_reference_anchor(prev) && self.starts_with_reference_anchor(next) {
            return false;
        }

        let (Some(prev), Some(next)) = (prev, next) else {
            return false;
        };

        let min_x = line.min_x();
        let indented_to_prev = min_x - prev.min_x() > self.config.indent_slack;
        let indented_to_next = min_x - next.min_x() > self.config.indent_slack;
        let neighbors_flush = (prev.min_x() - next.min_x()).abs() < self.config.indent_slack;

        indented_to_prev && indented_to_next && neighbors_flush
    }

    /// Check if the most common font faces of `prev` and `line`
    /// differ significantly: by family name (one-sided absence
    /// counts), by more than half a point of size, or by boldness.
    fn has_significant_font_face_change(&self, prev: Option<&TextLine>, line: &TextLine) -> bool {
        let Some(prev) = prev else {
            return false;
        };
        let (Some(prev_face), Some(face)) = (
            prev.character_statistic.most_common_font_face(),
            line.character_statistic.most_common_font_face(),
        ) else {
            return false;
        };

        match (&prev_face.font.family_name, &face.font.family_name) {
            (None, Some(_)) | (Some(_), None) => return true,
            (Some(a), Some(b)) if a != b => return true,
            _ => {}
        }

        if (prev_face.size - face.size).abs() > self.config.font_size_slack {
            return true;
        }

        prev_face.font.is_bold != face.font.is_bold
    }

    /// Check if `line` probably starts a reference entry: it begins
    /// with a reference anchor, and a neighbor either differs in min-x
    /// or begins with an anchor itself. A missing neighbor counts as
    /// differing, so that reference lists split at page edges.
    fn is_probably_reference_start(
        &self,
        prev: Option<&TextLine>,
        line: &TextLine,
        next: Option<&TextLine>,
    ) -> bool {
        if !self.starts_with_reference_anchor(Some(line)) {
            return false;
        }

        let differs_min_x = |neighbor: Option<&TextLine>| {
            neighbor.map_or(true, |n| (n.min_x() - line.min_x()).abs() > self.config.min_x_slack)
        };

        differs_min_x(prev)
            || self.starts_with_reference_anchor(prev)
            || differs_min_x(next)
            || self.starts_with_reference_anchor(next)
    }

    /// Check if the line text starts with a reference anchor like
    /// "[1] " or "[Smith 99] ".
    fn starts_with_reference_anchor(&self, line: Option<&TextLine>) -> bool {
        line.is_some_and(|l| self.reference_anchor.is_match(&l.text()))
    }
}

/// The pitch between two lines: the absolute difference of their
/// baseline heights. NaN when either line is missing, the lines live
/// on different pages, or a baseline is missing.
pub fn line_pitch(first: Option<&TextLine>, second: Option<&TextLine>) -> f32 {
    let (Some(first), Some(second)) = (first, second) else {
        return f32::NAN;
    };
    if first.position.page_number != second.position.page_number {
        return f32::NAN;
    }
    let (Some(a), Some(b)) = (first.baseline, second.baseline) else {
        return f32::NAN;
    };
    (a.start_y - b.start_y).abs()
}
