//! Statistics over characters and text lines.
//!
//! "Most common" always means the argmax of a frequency distribution
//! with ties broken by first-seen order, so that repeated runs over the
//! same document produce identical results.

use std::collections::HashMap;
use std::hash::Hash;

use crate::model::{Character, Color, FontFace, TextLine};

/// An insertion-ordered frequency counter with a stable argmax.
#[derive(Debug, Clone)]
pub struct FreqCounter<T> {
    counts: HashMap<T, usize>,
    order: Vec<T>,
}

impl<T: Eq + Hash + Clone> FreqCounter<T> {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Count one occurrence of `item`.
    pub fn add(&mut self, item: T) {
        self.add_n(item, 1);
    }

    /// Count `n` occurrences of `item`.
    pub fn add_n(&mut self, item: T, n: usize) {
        if n == 0 {
            return;
        }
        let entry = self.counts.entry(item.clone()).or_insert(0);
        if *entry == 0 {
            self.order.push(item);
        }
        *entry += n;
    }

    /// The number of occurrences counted for `item`.
    pub fn count(&self, item: &T) -> usize {
        self.counts.get(item).copied().unwrap_or(0)
    }

    /// The item with the highest count; ties go to the first-seen item.
    pub fn most_common(&self) -> Option<&T> {
        let mut best: Option<(&T, usize)> = None;
        for item in &self.order {
            let count = self.counts[item];
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((item, count));
            }
        }
        best.map(|(item, _)| item)
    }

    /// Fold the counts of `other` into `self`, preserving `other`'s
    /// first-seen order for items unknown to `self`.
    pub fn merge(&mut self, other: &FreqCounter<T>) {
        for item in &other.order {
            self.add_n(item.clone(), other.counts[item]);
        }
    }

    /// Check whether nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<T: Eq + Hash + Clone> Default for FreqCounter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics over a set of characters.
#[derive(Debug, Clone)]
pub struct CharacterStatistic {
    faces: FreqCounter<FontFace>,
    colors: FreqCounter<Color>,
    size_sum: f32,
    count: usize,
    min_size: f32,
    max_size: f32,
}

impl CharacterStatistic {
    /// Compute the statistic over the given characters.
    pub fn from_characters<'a>(chars: impl IntoIterator<Item = &'a Character>) -> Self {
        let mut stat = Self::default();
        for ch in chars {
            stat.faces.add(ch.font_face.clone());
            stat.colors.add(ch.color.clone());
            stat.size_sum += ch.font_face.size;
            stat.count += 1;
            stat.min_size = stat.min_size.min(ch.font_face.size);
            stat.max_size = stat.max_size.max(ch.font_face.size);
        }
        stat
    }

    /// Aggregate several statistics into one.
    pub fn aggregate<'a>(stats: impl IntoIterator<Item = &'a CharacterStatistic>) -> Self {
        let mut result = Self::default();
        for stat in stats {
            result.faces.merge(&stat.faces);
            result.colors.merge(&stat.colors);
            result.size_sum += stat.size_sum;
            result.count += stat.count;
            result.min_size = result.min_size.min(stat.min_size);
            result.max_size = result.max_size.max(stat.max_size);
        }
        result
    }

    /// The most common font face, if any character was counted.
    pub fn most_common_font_face(&self) -> Option<&FontFace> {
        self.faces.most_common()
    }

    /// The most common color, if any character was counted.
    pub fn most_common_color(&self) -> Option<&Color> {
        self.colors.most_common()
    }

    /// The size of the most common font face, or 0.0 when empty.
    pub fn most_common_font_size(&self) -> f32 {
        self.most_common_font_face().map_or(0.0, |f| f.size)
    }

    /// The average font size, or 0.0 when empty.
    pub fn average_font_size(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.size_sum / self.count as f32
        }
    }

    /// The largest observed font size, or 0.0 when empty.
    pub fn largest_font_size(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.max_size
        }
    }

    /// The smallest observed font size, or 0.0 when empty.
    pub fn smallest_font_size(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.min_size
        }
    }

    /// The number of characters counted.
    pub fn character_count(&self) -> usize {
        self.count
    }
}

impl Default for CharacterStatistic {
    fn default() -> Self {
        Self {
            faces: FreqCounter::new(),
            colors: FreqCounter::new(),
            size_sum: 0.0,
            count: 0,
            min_size: f32::INFINITY,
            max_size: f32::NEG_INFINITY,
        }
    }
}

/// Line-pitch statistics keyed by font face.
///
/// Each adjacent-line pitch on a page is bucketed under the most common
/// font face of the lower of the two lines; queries return the argmax
/// pitch for a face. Pitches are kept in tenths of a point.
#[derive(Debug, Clone, Default)]
pub struct TextLineStatistic {
    faces: Vec<FontFace>,
    pitches: HashMap<FontFace, FreqCounter<i32>>,
}

impl TextLineStatistic {
    /// Compute the statistic over the given lines of a single page, in
    /// reading order.
    pub fn from_lines(lines: &[TextLine]) -> Self {
        let mut stat = Self::default();
        for pair in lines.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            if upper.position.page_number != lower.position.page_number {
                continue;
            }
            let (Some(a), Some(b)) = (upper.baseline, lower.baseline) else {
                continue;
            };
            let Some(face) = lower.character_statistic.most_common_font_face() else {
                continue;
            };
            stat.record_pitch(face, (a.start_y - b.start_y).abs());
        }
        stat
    }

    /// Record one observed pitch for the given font face.
    pub fn record_pitch(&mut self, face: &FontFace, pitch: f32) {
        if !pitch.is_finite() {
            return;
        }
        let counter = self.pitches.entry(face.clone()).or_insert_with(|| {
            self.faces.push(face.clone());
            FreqCounter::new()
        });
        counter.add((pitch * 10.0).round() as i32);
    }

    /// Aggregate several statistics into one.
    pub fn aggregate<'a>(stats: impl IntoIterator<Item = &'a TextLineStatistic>) -> Self {
        let mut result = Self::default();
        for stat in stats {
            for face in &stat.faces {
                let counter = result.pitches.entry(face.clone()).or_insert_with(|| {
                    result.faces.push(face.clone());
                    FreqCounter::new()
                });
                counter.merge(&stat.pitches[face]);
            }
        }
        result
    }

    /// The most common line pitch for the given font face, or NaN when
    /// no pitch was recorded for it.
    pub fn most_common_line_pitch(&self, face: &FontFace) -> f32 {
        self.pitches
            .get(face)
            .and_then(|c| c.most_common())
            .map_or(f32::NAN, |tenths| *tenths as f32 / 10.0)
    }

    /// Check whether no pitch has been recorded.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::model::Font;

    fn face(name: &str, size: f32) -> FontFace {
        FontFace::new(Arc::new(Font::from_base_name("font-0", name)), size)
    }

    #[test]
    fn test_freq_counter_argmax() {
        let mut counter = FreqCounter::new();
        counter.add("a");
        counter.add("b");
        counter.add("b");
        assert_eq!(counter.most_common(), Some(&"b"));
    }

    #[test]
    fn test_freq_counter_tie_breaks_first_seen() {
        let mut counter = FreqCounter::new();
        counter.add("x");
        counter.add("y");
        counter.add("y");
        counter.add("x");
        assert_eq!(counter.most_common(), Some(&"x"));
    }

    #[test]
    fn test_freq_counter_merge() {
        let mut a = FreqCounter::new();
        a.add(1);
        let mut b = FreqCounter::new();
        b.add_n(2, 3);
        a.merge(&b);
        assert_eq!(a.most_common(), Some(&2));
        assert_eq!(a.count(&1), 1);
    }

    #[test]
    fn test_character_statistic_empty() {
        let stat = CharacterStatistic::default();
        assert!(stat.most_common_font_face().is_none());
        assert_eq!(stat.average_font_size(), 0.0);
        assert_eq!(stat.largest_font_size(), 0.0);
    }

    #[test]
    fn test_line_pitch_argmax() {
        let mut stat = TextLineStatistic::default();
        let f = face("Times-Roman", 10.0);
        stat.record_pitch(&f, 12.0);
        stat.record_pitch(&f, 12.0);
        stat.record_pitch(&f, 24.0);
        assert_eq!(stat.most_common_line_pitch(&f), 12.0);
    }

    #[test]
    fn test_line_pitch_unknown_face_is_nan() {
        let stat = TextLineStatistic::default();
        assert!(stat.most_common_line_pitch(&face("Times-Roman", 10.0)).is_nan());
    }

    #[test]
    fn test_line_pitch_aggregate_keeps_counts() {
        let f = face("Times-Roman", 10.0);
        let mut a = TextLineStatistic::default();
        a.record_pitch(&f, 14.0);
        let mut b = TextLineStatistic::default();
        b.record_pitch(&f, 12.0);
        b.record_pitch(&f, 12.0);
        let merged = TextLineStatistic::aggregate([&a, &b]);
        assert_eq!(merged.most_common_line_pitch(&f), 12.0);
    }
}
