use crate::types::{Alignment, AlignmentOp, OpKind, Span};

/// Common-subsequence alignment of two symbol sequences.
///
/// Matching runs of a longest common subsequence become `equal` ops; the gaps
/// between them become `replace` (both sides non-empty), `delete`
/// (expected-only) or `insert` (detected-only). The ops cover both inputs
/// contiguously and exactly once.
pub fn align_symbols(expected: &[char], detected: &[char]) -> Alignment {
    let blocks = matching_blocks(expected, detected);

    let mut ops = Vec::with_capacity(blocks.len() * 2);
    let (mut ia, mut ja) = (0usize, 0usize);
    for (ai, bj, size) in blocks
        .into_iter()
        .chain(std::iter::once((expected.len(), detected.len(), 0)))
    {
        let kind = match (ia < ai, ja < bj) {
            (true, true) => Some(OpKind::Replace),
            (true, false) => Some(OpKind::Delete),
            (false, true) => Some(OpKind::Insert),
            (false, false) => None,
        };
        if let Some(kind) = kind {
            ops.push(AlignmentOp {
                kind,
                expected: Span::new(ia, ai),
                detected: Span::new(ja, bj),
            });
        }
        if size > 0 {
            ops.push(AlignmentOp {
                kind: OpKind::Equal,
                expected: Span::new(ai, ai + size),
                detected: Span::new(bj, bj + size),
            });
        }
        ia = ai + size;
        ja = bj + size;
    }

    Alignment { ops }
}

/// Maximal runs `(expected_start, detected_start, len)` of an LCS, in order.
fn matching_blocks(a: &[char], b: &[char]) -> Vec<(usize, usize, usize)> {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let width = m + 1;
    let mut dp = vec![0u32; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            dp[i * width + j] = if a[i - 1] == b[j - 1] {
                dp[(i - 1) * width + (j - 1)] + 1
            } else {
                dp[(i - 1) * width + j].max(dp[i * width + (j - 1)])
            };
        }
    }

    let mut pairs = Vec::with_capacity(dp[n * width + m] as usize);
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            pairs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if dp[(i - 1) * width + j] >= dp[i * width + (j - 1)] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    pairs.reverse();

    let mut blocks: Vec<(usize, usize, usize)> = Vec::new();
    for (pi, pj) in pairs {
        match blocks.last_mut() {
            Some((bi, bj, size)) if *bi + *size == pi && *bj + *size == pj => *size += 1,
            _ => blocks.push((pi, pj, 1)),
        }
    }
    blocks
}
