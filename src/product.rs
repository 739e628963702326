//! Lazy Cartesian products
//!
//! Both combinatorial walks in the library (one superblock per class, one
//! admissible realization per reference position) are products of a list of
//! choice lists. [`CartesianProduct`] produces them one selection at a time
//! with an odometer over choice indices, last position varying fastest, which
//! is the order a depth-first backtracking walk would visit them in.
//!
//! Nothing bounds the size of a product. Callers that feed it many long
//! choice lists own the cost of walking it.

/// Iterator over every selection of one element per choice list.
///
/// Each call to `next` yields a `Vec` holding one borrowed element per
/// position. An empty list of positions yields exactly one empty selection;
/// a position with no choices makes the product empty.
#[derive(Debug, Clone)]
pub struct CartesianProduct<'a, T> {
    choices: Vec<&'a [T]>,
    /// `None` once the product is exhausted
    cursor: Option<Vec<usize>>,
}

impl<'a, T> CartesianProduct<'a, T> {
    /// Create a product over the given choice lists
    pub fn new<C: AsRef<[T]>>(choices: &'a [C]) -> Self {
        let choices: Vec<&'a [T]> = choices.iter().map(|c| c.as_ref()).collect();
        Self::from_slices(choices)
    }

    /// Create a product over already-borrowed choice slices
    pub fn from_slices(choices: Vec<&'a [T]>) -> Self {
        let cursor = if choices.iter().any(|c| c.is_empty()) {
            None
        } else {
            Some(vec![0; choices.len()])
        };
        Self { choices, cursor }
    }

    /// Total number of selections, or `None` if it overflows `usize`
    pub fn checked_total(&self) -> Option<usize> {
        self.choices
            .iter()
            .try_fold(1usize, |acc, c| acc.checked_mul(c.len()))
    }

    fn advance(&mut self) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        for pos in (0..cursor.len()).rev() {
            cursor[pos] += 1;
            if cursor[pos] < self.choices[pos].len() {
                return;
            }
            cursor[pos] = 0;
        }
        self.cursor = None;
    }
}

impl<'a, T> Iterator for CartesianProduct<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_ref()?;
        let selection = cursor
            .iter()
            .zip(&self.choices)
            .map(|(&idx, choices)| &choices[idx])
            .collect();
        self.advance();
        Some(selection)
    }
}
