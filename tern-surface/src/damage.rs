use tern_state::Rect;

/// Cap on individually tracked rectangles; beyond it everything merges
/// into one bounding rectangle.
const MAX_RECTS: usize = 32;

/// Damaged-region accumulator.
///
/// Mutations push rectangles; a renderer drains them with
/// [`take`](Self::take) and repaints only what changed. Overlapping or
/// adjacent pushes merge into the previous rectangle to keep the list
/// short.
#[derive(Debug, Default)]
pub struct Damage {
    rects: Vec<Rect>,
}

impl Damage {
    pub(crate) fn push(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }

        // Merge with the previous rectangle when the union covers no cell
        // that neither rectangle covered (adjacent glyph cells, repeated
        // erases); anything else stays separate so growth damage keeps
        // its shape.
        if let Some(last) = self.rects.last_mut() {
            let union = last.union(&rect);
            if area(&union) == area(last) + area(&rect) - overlap(last, &rect) {
                *last = union;
                return;
            }
        }

        if self.rects.len() == MAX_RECTS {
            let merged = self
                .rects
                .drain(..)
                .fold(rect, |acc, r| acc.union(&r));
            self.rects.push(merged);
            return;
        }

        self.rects.push(rect);
    }

    /// The damage accumulated since the last call, clearing it.
    pub fn take(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.rects)
    }

    /// Currently accumulated damage without clearing.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }
}

fn area(rect: &Rect) -> u32 {
    u32::from(rect.rows()) * u32::from(rect.cols())
}

fn overlap(a: &Rect, b: &Rect) -> u32 {
    let rows = u32::from(
        a.end_row
            .min(b.end_row)
            .saturating_sub(a.start_row.max(b.start_row)),
    );
    let cols = u32::from(
        a.end_col
            .min(b.end_col)
            .saturating_sub(a.start_col.max(b.start_col)),
    );
    rows * cols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_pushes_merge() {
        let mut damage = Damage::default();
        damage.push(Rect::new(0, 1, 0, 4));
        damage.push(Rect::new(0, 1, 4, 8));
        assert_eq!(damage.rects(), &[Rect::new(0, 1, 0, 8)]);
    }

    #[test]
    fn disjoint_pushes_stay_separate() {
        let mut damage = Damage::default();
        damage.push(Rect::new(0, 1, 0, 2));
        damage.push(Rect::new(5, 6, 0, 2));
        assert_eq!(damage.rects().len(), 2);
    }

    #[test]
    fn take_clears() {
        let mut damage = Damage::default();
        damage.push(Rect::new(0, 1, 0, 2));
        assert_eq!(damage.take().len(), 1);
        assert!(damage.rects().is_empty());
    }

    #[test]
    fn overflow_collapses_into_bounding_rects() {
        let mut damage = Damage::default();
        for row in 0..100u16 {
            damage.push(Rect::new(row * 2, row * 2 + 1, 0, 1));
        }
        assert!(damage.rects().len() <= MAX_RECTS);
        // Everything pushed is still covered.
        assert!(damage.rects().iter().any(|r| r.start_row == 0));
        assert!(damage.rects().iter().any(|r| r.end_row >= 199));
    }
}
