use log::warn;

use crate::models::entry::MAX_RATING;

/// Returned when the committed rating actually changes value; the owner
/// decides who hears about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChanged {
    pub previous: u8,
    pub current: u8,
}

/// Prefix-selection control over a fixed row of positions.
///
/// Selecting position `i` marks positions `0..=i` and clears the rest, so
/// the selection is always a run starting at position 0. The committed
/// rating is the length of that run. Hover previews are kept apart and
/// never touch the committed value.
#[derive(Debug, Clone)]
pub struct RatingSelector {
    positions: u8,
    selected: u8,
    preview: Option<u8>,
}

impl RatingSelector {
    pub fn new(positions: u8) -> Self {
        RatingSelector {
            positions,
            selected: 0,
            preview: None,
        }
    }

    pub fn positions(&self) -> u8 {
        self.positions
    }

    /// Commit a selection ending at `position`. Returns the change, or `None`
    /// when the value stayed the same or the position is out of range.
    pub fn select(&mut self, position: u8) -> Option<RatingChanged> {
        if position >= self.positions {
            warn!(
                "ignoring rating position {} (selector has {} positions)",
                position, self.positions
            );
            return None;
        }
        self.set_count(position + 1)
    }

    pub fn reset(&mut self) -> Option<RatingChanged> {
        self.preview = None;
        self.set_count(0)
    }

    /// Commit a rating value directly, `0` meaning nothing selected.
    pub fn set_rating(&mut self, rating: u8) -> Option<RatingChanged> {
        match rating {
            0 => self.set_count(0),
            r => self.select(r - 1),
        }
    }

    pub fn current_rating(&self) -> u8 {
        self.selected
    }

    pub fn is_selected(&self, position: u8) -> bool {
        position < self.selected
    }

    pub fn preview_hover(&mut self, position: u8) {
        if position < self.positions {
            self.preview = Some(position);
        }
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    pub fn preview_position(&self) -> Option<u8> {
        self.preview
    }

    /// Rating the row would show if the hovered position were selected.
    pub fn preview_rating(&self) -> Option<u8> {
        self.preview.map(|p| p + 1)
    }

    fn set_count(&mut self, count: u8) -> Option<RatingChanged> {
        if count == self.selected {
            return None;
        }
        let change = RatingChanged {
            previous: self.selected,
            current: count,
        };
        self.selected = count;
        Some(change)
    }
}

impl Default for RatingSelector {
    fn default() -> Self {
        Self::new(MAX_RATING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_prefix(selector: &RatingSelector) {
        let rating = selector.current_rating();
        for p in 0..selector.positions() {
            assert_eq!(selector.is_selected(p), p < rating, "position {p}");
        }
    }

    #[test]
    fn select_sets_count_to_position_plus_one() {
        let mut s = RatingSelector::default();
        let change = s.select(5).unwrap();
        assert_eq!(change, RatingChanged { previous: 0, current: 6 });
        assert_eq!(s.current_rating(), 6);
        assert_prefix(&s);
    }

    #[test]
    fn repeated_select_is_idempotent_and_silent() {
        let mut s = RatingSelector::default();
        assert!(s.select(3).is_some());
        assert!(s.select(3).is_none());
        assert_eq!(s.current_rating(), 4);
    }

    #[test]
    fn lower_selection_shrinks_the_prefix() {
        let mut s = RatingSelector::default();
        s.select(8);
        s.select(1);
        assert_eq!(s.current_rating(), 2);
        assert_prefix(&s);
    }

    #[test]
    fn out_of_range_position_is_ignored() {
        let mut s = RatingSelector::new(10);
        s.select(2);
        assert!(s.select(10).is_none());
        assert_eq!(s.current_rating(), 3);
    }

    #[test]
    fn reset_clears_selection_and_preview() {
        let mut s = RatingSelector::default();
        s.select(4);
        s.preview_hover(7);
        assert_eq!(s.reset(), Some(RatingChanged { previous: 5, current: 0 }));
        assert_eq!(s.preview_position(), None);
        assert!(s.reset().is_none());
    }

    #[test]
    fn preview_leaves_committed_rating_alone() {
        let mut s = RatingSelector::default();
        s.select(2);

        s.preview_hover(8);
        assert_eq!(s.preview_rating(), Some(9));
        assert_eq!(s.current_rating(), 3);
        s.clear_preview();
        assert_eq!(s.preview_rating(), None);
        // Hovering again over the committed end changes nothing.
        s.preview_hover(2);
        assert!(s.select(2).is_none());
    }

    #[test]
    fn set_rating_maps_onto_positions() {
        let mut s = RatingSelector::default();
        s.set_rating(7);
        assert_eq!(s.current_rating(), 7);
        s.set_rating(0);
        assert_eq!(s.current_rating(), 0);
        assert!(s.set_rating(11).is_none());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Select(u8),
        Reset,
        Hover(u8),
        ClearPreview,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..14).prop_map(Op::Select),
            Just(Op::Reset),
            (0u8..14).prop_map(Op::Hover),
            Just(Op::ClearPreview),
        ]
    }

    proptest! {
        #[test]
        fn selection_is_always_a_bounded_prefix(ops in proptest::collection::vec(arb_op(), 0..40)) {
            let mut s = RatingSelector::default();
            for op in ops {
                match op {
                    Op::Select(p) => {
                        let before = s.current_rating();
                        s.select(p);
                        if p < s.positions() {
                            prop_assert_eq!(s.current_rating(), p + 1);
                        } else {
                            prop_assert_eq!(s.current_rating(), before);
                        }
                    }
                    Op::Reset => { s.reset(); }
                    Op::Hover(p) => s.preview_hover(p),
                    Op::ClearPreview => s.clear_preview(),
                }
                prop_assert!(s.current_rating() <= s.positions());
                for p in 0..s.positions() {
                    prop_assert_eq!(s.is_selected(p), p < s.current_rating());
                }
            }
        }
    }
}
