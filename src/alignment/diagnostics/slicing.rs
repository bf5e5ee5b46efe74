use crate::types::{Alignment, AlignmentOp, Span};

/// Detected-side slices attributed to each word span, in alignment order.
///
/// An op contributes to a word when its expected span overlaps the word span;
/// the overlapping fraction of the expected span is mapped onto the same
/// fraction of the detected span, with boundaries rounded to whole symbols.
/// Mapping both boundaries through the same rounding keeps the slices of
/// adjacent words contiguous. Insertions (empty expected span) go to the word
/// containing their insertion point. At the very end they go to the last word
/// that has phonemes.
///
/// This is an approximation: symbols near a word boundary can smear into the
/// neighbouring word when an op straddles the boundary.
pub(crate) fn word_slices(
    word_spans: &[Span],
    alignment: &Alignment,
    expected_len: usize,
) -> Vec<Vec<Span>> {
    let mut slices = vec![Vec::new(); word_spans.len()];
    if word_spans.is_empty() {
        return slices;
    }

    for op in &alignment.ops {
        if op.expected.is_empty() {
            if op.detected.is_empty() {
                continue;
            }
            let owner = insertion_owner(word_spans, op.expected.start, expected_len);
            slices[owner].push(op.detected);
            continue;
        }

        for (idx, span) in word_spans.iter().enumerate() {
            if let Some(part) = op.expected.intersection(*span) {
                let carved = carve(op, part);
                if !carved.is_empty() {
                    slices[idx].push(carved);
                }
            }
        }
    }

    slices
}

fn insertion_owner(word_spans: &[Span], position: usize, expected_len: usize) -> usize {
    if position < expected_len {
        if let Some(idx) = word_spans
            .iter()
            .position(|s| s.start <= position && position < s.end)
        {
            return idx;
        }
    }
    word_spans
        .iter()
        .rposition(|s| !s.is_empty())
        .unwrap_or(word_spans.len() - 1)
}

fn carve(op: &AlignmentOp, part: Span) -> Span {
    let expected_len = op.expected.len() as f64;
    let detected_len = op.detected.len() as f64;
    let map = |pos: usize| -> usize {
        let offset = (pos - op.expected.start) as f64 * detected_len / expected_len;
        op.detected.start + offset.round() as usize
    };
    Span::new(map(part.start), map(part.end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpKind;

    fn op(kind: OpKind, e: (usize, usize), d: (usize, usize)) -> AlignmentOp {
        AlignmentOp {
            kind,
            expected: Span::new(e.0, e.1),
            detected: Span::new(d.0, d.1),
        }
    }

    #[test]
    fn equal_op_is_split_exactly_at_word_boundary() {
        let alignment = Alignment {
            ops: vec![op(OpKind::Equal, (0, 9), (0, 9))],
        };
        let slices = word_slices(&[Span::new(0, 5), Span::new(5, 9)], &alignment, 9);
        assert_eq!(slices, vec![vec![Span::new(0, 5)], vec![Span::new(5, 9)]]);
    }

    #[test]
    fn straddling_replace_is_carved_proportionally() {
        // Expected [2, 6) maps onto detected [2, 4): half of it per word.
        let alignment = Alignment {
            ops: vec![
                op(OpKind::Equal, (0, 2), (0, 2)),
                op(OpKind::Replace, (2, 6), (2, 4)),
                op(OpKind::Equal, (6, 8), (4, 6)),
            ],
        };
        let slices = word_slices(&[Span::new(0, 4), Span::new(4, 8)], &alignment, 8);
        assert_eq!(slices[0], vec![Span::new(0, 2), Span::new(2, 3)]);
        assert_eq!(slices[1], vec![Span::new(3, 4), Span::new(4, 6)]);
    }

    #[test]
    fn delete_contributes_nothing() {
        let alignment = Alignment {
            ops: vec![
                op(OpKind::Equal, (0, 3), (0, 3)),
                op(OpKind::Delete, (3, 6), (3, 3)),
            ],
        };
        let slices = word_slices(&[Span::new(0, 3), Span::new(3, 6)], &alignment, 6);
        assert_eq!(slices[0], vec![Span::new(0, 3)]);
        assert!(slices[1].is_empty());
    }

    #[test]
    fn insertions_follow_their_insertion_point() {
        let alignment = Alignment {
            ops: vec![
                op(OpKind::Equal, (0, 3), (0, 3)),
                op(OpKind::Insert, (3, 3), (3, 5)),
                op(OpKind::Equal, (3, 6), (5, 8)),
                op(OpKind::Insert, (6, 6), (8, 9)),
            ],
        };
        let slices = word_slices(&[Span::new(0, 3), Span::new(3, 6)], &alignment, 6);
        assert_eq!(slices[0], vec![Span::new(0, 3)]);
        assert_eq!(
            slices[1],
            vec![Span::new(3, 5), Span::new(5, 8), Span::new(8, 9)]
        );
    }

    #[test]
    fn trailing_insertion_skips_empty_final_word() {
        let alignment = Alignment {
            ops: vec![
                op(OpKind::Equal, (0, 5), (0, 5)),
                op(OpKind::Insert, (5, 5), (5, 6)),
            ],
        };
        let slices = word_slices(&[Span::new(0, 5), Span::new(5, 5)], &alignment, 5);
        assert_eq!(slices[0], vec![Span::new(0, 5), Span::new(5, 6)]);
        assert!(slices[1].is_empty());
    }

    #[test]
    fn slices_partition_the_detected_string() {
        let alignment = Alignment {
            ops: vec![
                op(OpKind::Insert, (0, 0), (0, 1)),
                op(OpKind::Replace, (0, 5), (1, 3)),
                op(OpKind::Equal, (5, 7), (3, 5)),
                op(OpKind::Replace, (7, 8), (5, 9)),
            ],
        };
        let spans = [Span::new(0, 3), Span::new(3, 4), Span::new(4, 8)];
        let slices = word_slices(&spans, &alignment, 8);
        let mut cursor = 0;
        for slice in slices.iter().flatten() {
            assert_eq!(slice.start, cursor);
            cursor = slice.end;
        }
        assert_eq!(cursor, 9);
    }
}
