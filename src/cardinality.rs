use itertools::Itertools;
use varisat::{Lit, Var};

/// Inputs at or below this length use the binomial encoding, which needs no
/// auxiliary variables; longer inputs switch to the sequential counter.
const BINOMIAL_LIMIT: usize = 8;

/// Clauses forcing at most `bound` of `lits` to be true.
///
/// `watermark` is the index of the next free solver variable; auxiliary
/// variables are minted from it and it is left one past the last id used, so
/// successive constraints can thread it forward without collisions.
///
/// Duplicate literals are legal and count once per occurrence, which is what
/// lets a weight-2 literal be encoded as two copies of itself.
pub(crate) fn at_most(lits: &[Lit], bound: usize, watermark: &mut usize) -> Vec<Vec<Lit>> {
    if bound >= lits.len() {
        return Vec::new();
    }
    if bound == 0 {
        // every literal is individually false
        return lits.iter().map(|&lit| vec![!lit]).collect();
    }
    if lits.len() <= BINOMIAL_LIMIT {
        // no bound + 1 are all true; for each choice, at least one is false
        lits.iter()
            .copied()
            .combinations(bound + 1)
            .map(|choice| choice.into_iter().map(|lit| !lit).collect())
            .collect()
    } else {
        sequential_counter(lits, bound, watermark)
    }
}

/// Clauses forcing at least `bound` of `lits` to be true, with the same
/// watermark contract as [`at_most`].
pub(crate) fn at_least(lits: &[Lit], bound: usize, watermark: &mut usize) -> Vec<Vec<Lit>> {
    if bound == 0 {
        return Vec::new();
    }
    if bound > lits.len() {
        // unsatisfiable; the empty clause says so directly
        return vec![Vec::new()];
    }
    // at least k of X holds iff at most (n - k) of !X does
    let negated = lits.iter().map(|&lit| !lit).collect_vec();
    at_most(&negated, lits.len() - bound, watermark)
}

/// Sinz-style sequential counter for "at most `bound`".
///
/// Register `s[i][j]` reads "at least j + 1 of the first i + 1 literals are
/// true"; only the implications needed for the bound are emitted. Callers
/// guarantee `0 < bound < lits.len()`.
fn sequential_counter(lits: &[Lit], bound: usize, watermark: &mut usize) -> Vec<Vec<Lit>> {
    let n = lits.len();
    let rows = n - 1;
    let register = |i: usize, j: usize| Var::from_index(*watermark + i * bound + j).positive();

    let mut clauses = Vec::with_capacity(2 * n * bound);

    clauses.push(vec![!lits[0], register(0, 0)]);
    for j in 1..bound {
        clauses.push(vec![!register(0, j)]);
    }

    for i in 1..rows {
        clauses.push(vec![!lits[i], register(i, 0)]);
        clauses.push(vec![!register(i - 1, 0), register(i, 0)]);
        for j in 1..bound {
            clauses.push(vec![!lits[i], !register(i - 1, j - 1), register(i, j)]);
            clauses.push(vec![!register(i - 1, j), register(i, j)]);
        }
        clauses.push(vec![!lits[i], !register(i - 1, bound - 1)]);
    }

    clauses.push(vec![!lits[n - 1], !register(rows - 1, bound - 1)]);

    *watermark += rows * bound;
    clauses
}
