//! Intercompany pair matching between two entities.

use rust_decimal::Decimal;

use finnorm_shared::types::RowId;

/// An intercompany row awaiting a counterpart.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    /// Position of the row in its entity's converted batch.
    pub position: usize,
    pub row_id: RowId,
    /// Signed amount in the base currency.
    pub amount: Decimal,
    /// Registration index of the entity named in the description, if any.
    pub counterparty: Option<usize>,
    pub matched: bool,
}

impl Candidate {
    fn accepts(&self, entity: usize) -> bool {
        self.counterparty.is_none_or(|c| c == entity)
    }
}

/// Returns true when the magnitudes differ by at most `tolerance` times the
/// smaller magnitude. The bound is inclusive.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    let (a, b) = (a.abs(), b.abs());
    (a - b).abs() <= tolerance * a.min(b)
}

/// Pairs candidates of entity `ia` with candidates of entity `ib`.
///
/// A pair needs opposite signs, compatible counterparties and magnitudes within
/// tolerance. Closest magnitudes pair first; ties go to the lower row ids.
/// Returns `(index in a, index in b)` pairs and marks both sides matched.
pub(crate) fn match_entities(
    a: &mut [Candidate],
    ia: usize,
    b: &mut [Candidate],
    ib: usize,
    tolerance: Decimal,
) -> Vec<(usize, usize)> {
    let mut options: Vec<(Decimal, usize, usize)> = Vec::new();
    for (i, left) in a.iter().enumerate() {
        if left.matched || !left.accepts(ib) {
            continue;
        }
        for (j, right) in b.iter().enumerate() {
            if right.matched || !right.accepts(ia) {
                continue;
            }
            let opposite = (left.amount > Decimal::ZERO && right.amount < Decimal::ZERO)
                || (left.amount < Decimal::ZERO && right.amount > Decimal::ZERO);
            if opposite && within_tolerance(left.amount, right.amount, tolerance) {
                let diff = (left.amount.abs() - right.amount.abs()).abs();
                options.push((diff, i, j));
            }
        }
    }

    options.sort_by(|x, y| {
        x.0.cmp(&y.0)
            .then_with(|| a[x.1].row_id.cmp(&a[y.1].row_id))
            .then_with(|| b[x.2].row_id.cmp(&b[y.2].row_id))
    });

    let mut pairs = Vec::new();
    for (_, i, j) in options {
        if a[i].matched || b[j].matched {
            continue;
        }
        a[i].matched = true;
        b[j].matched = true;
        pairs.push((i, j));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn candidate(row: &str, amount: Decimal, counterparty: Option<usize>) -> Candidate {
        Candidate {
            position: 0,
            row_id: RowId::new(row),
            amount,
            counterparty,
            matched: false,
        }
    }

    #[rstest]
    #[case(dec!(10000), dec!(-10050), true)]
    #[case(dec!(10000), dec!(-10051), false)]
    #[case(dec!(-10050), dec!(10000), true)]
    #[case(dec!(10000), dec!(-10000), true)]
    #[case(dec!(0), dec!(0), true)]
    fn test_tolerance_boundary(#[case] a: Decimal, #[case] b: Decimal, #[case] expected: bool) {
        assert_eq!(within_tolerance(a, b, dec!(0.005)), expected);
    }

    #[test]
    fn test_closest_magnitudes_pair_first() {
        let mut a = vec![candidate("a1", dec!(10000), None)];
        let mut b = vec![
            candidate("b1", dec!(-10040), None),
            candidate("b2", dec!(-10000), None),
        ];
        let pairs = match_entities(&mut a, 0, &mut b, 1, dec!(0.005));
        assert_eq!(pairs, vec![(0, 1)]);
        assert!(!b[0].matched);
    }

    #[test]
    fn test_same_sign_never_pairs() {
        let mut a = vec![candidate("a1", dec!(5000), None)];
        let mut b = vec![candidate("b1", dec!(5000), None)];
        assert!(match_entities(&mut a, 0, &mut b, 1, dec!(0.005)).is_empty());
    }

    #[test]
    fn test_counterparty_must_agree() {
        // a1 names entity 2, so it cannot pair with entity 1.
        let mut a = vec![candidate("a1", dec!(5000), Some(2))];
        let mut b = vec![candidate("b1", dec!(-5000), None)];
        assert!(match_entities(&mut a, 0, &mut b, 1, dec!(0.005)).is_empty());

        let mut a = vec![candidate("a1", dec!(5000), Some(1))];
        let mut b = vec![candidate("b1", dec!(-5000), Some(0))];
        assert_eq!(match_entities(&mut a, 0, &mut b, 1, dec!(0.005)), vec![(0, 0)]);
    }

    #[test]
    fn test_ties_resolve_by_row_id() {
        let mut a = vec![
            candidate("a2", dec!(700), None),
            candidate("a1", dec!(700), None),
        ];
        let mut b = vec![candidate("b1", dec!(-700), None)];
        let pairs = match_entities(&mut a, 0, &mut b, 1, dec!(0));
        assert_eq!(pairs, vec![(1, 0)]);
    }
}
