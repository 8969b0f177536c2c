/// Geometry of the horizontal card strip, in CSS pixels
///
/// Cards sit in a row after `padding`, separated by `gap`, with the same
/// padding after the last card.
///
/// ```
/// use showreel::showcase::CarouselLayout;
///
/// let layout = CarouselLayout::default();
/// assert_eq!(layout.centered_offset(0, 12), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselLayout {
    pub viewport_width: f64,
    pub card_width: f64,
    pub gap: f64,
    pub padding: f64,
}

impl Default for CarouselLayout {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            card_width: 800.0,
            gap: 32.0,
            padding: 128.0,
        }
    }
}

impl CarouselLayout {
    /// Left edge of card `index` within the scrollable content
    pub fn card_left(&self, index: usize) -> f64 {
        self.padding + index as f64 * (self.card_width + self.gap)
    }

    /// Full scrollable width for `count` cards
    pub fn content_width(&self, count: usize) -> f64 {
        if count == 0 {
            return self.padding * 2.0;
        }
        self.padding * 2.0 + count as f64 * self.card_width + (count - 1) as f64 * self.gap
    }

    pub fn max_scroll(&self, count: usize) -> f64 {
        (self.content_width(count) - self.viewport_width).max(0.0)
    }

    /// Scroll offset that puts the middle of card `index` in the middle of the
    /// viewport, clamped to the scrollable range the way a browser clamps it.
    pub fn centered_offset(&self, index: usize, count: usize) -> f64 {
        let raw = self.card_left(index) - self.viewport_width / 2.0 + self.card_width / 2.0;
        raw.clamp(0.0, self.max_scroll(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_middle_cards() {
        let l = CarouselLayout::default();
        // card 3 starts at 128 + 3 * 832 = 2624; centered = 2624 - 640 + 400
        assert_eq!(l.centered_offset(3, 12), 2384.0);
    }

    #[test]
    fn clamps_at_both_ends() {
        let l = CarouselLayout::default();
        assert_eq!(l.centered_offset(0, 12), 0.0);
        assert_eq!(l.centered_offset(11, 12), l.max_scroll(12));
    }

    #[test]
    fn narrow_content_never_scrolls() {
        let l = CarouselLayout {
            viewport_width: 4000.0,
            ..Default::default()
        };
        assert_eq!(l.max_scroll(2), 0.0);
        assert_eq!(l.centered_offset(1, 2), 0.0);
    }
}
