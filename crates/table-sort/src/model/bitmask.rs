//! Packed one-bit-per-row storage.
//!
//! Rows are packed into `u32` words most significant bit first: row `r`
//! lives in word `r / 32` at bit `31 - r % 32`.

const BITS: usize = u32::BITS as usize;

#[inline]
fn word_of(row: usize) -> usize {
    row / BITS
}

#[inline]
fn mask_of(row: usize) -> u32 {
    0x8000_0000 >> (row % BITS)
}

/// A fixed-length bit set with one bit per model row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBitmask {
    words: Vec<u32>,
    len: usize,
}

impl RowBitmask {
    /// Creates a mask of `len` cleared bits.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(BITS)],
            len,
        }
    }

    /// Returns the number of rows the mask covers.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the mask covers no rows.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the packed words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Returns the bit for `row`; rows past the end read as cleared.
    pub fn get(&self, row: usize) -> bool {
        row < self.len && self.words[word_of(row)] & mask_of(row) != 0
    }

    /// Sets or clears the bit for `row`. Rows past the end are ignored.
    pub fn set(&mut self, row: usize, value: bool) {
        if row >= self.len {
            return;
        }

        let word = &mut self.words[word_of(row)];
        if value {
            *word |= mask_of(row);
        } else {
            *word &= !mask_of(row);
        }
    }

    /// Flips the bit for `row`. Rows past the end are ignored.
    pub fn toggle(&mut self, row: usize) {
        if row < self.len {
            self.words[word_of(row)] ^= mask_of(row);
        }
    }

    /// Sets or clears every bit in `start..=end`, clamped to the mask.
    pub fn set_range(&mut self, start: usize, end: usize, value: bool) {
        if start > end || start >= self.len {
            return;
        }
        let end = end.min(self.len - 1);

        let (first, last) = (word_of(start), word_of(end));
        for index in first..=last {
            let lo = if index == first { start % BITS } else { 0 };
            let hi = if index == last { end % BITS } else { BITS - 1 };
            // Bits lo..=hi counted from the most significant end.
            let mask = (u32::MAX >> lo) & (u32::MAX << (BITS - 1 - hi));
            if value {
                self.words[index] |= mask;
            } else {
                self.words[index] &= !mask;
            }
        }
    }

    /// Clears every bit.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Sets every bit.
    pub fn set_all(&mut self) {
        if !self.is_empty() {
            self.set_range(0, self.len - 1, true);
        }
    }

    /// Flips every bit.
    pub fn invert(&mut self) {
        for word in &mut self.words {
            *word = !*word;
        }
        self.clear_tail();
    }

    /// Returns the number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if `row` is the only set bit.
    pub fn is_only(&self, row: usize) -> bool {
        if !self.get(row) {
            return false;
        }

        let target = word_of(row);
        self.words.iter().enumerate().all(|(index, &word)| {
            if index == target {
                word == mask_of(row)
            } else {
                word == 0
            }
        })
    }

    /// Iterates over set rows in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter(|(_, word)| **word != 0)
            .flat_map(|(index, &word)| {
                let base = index * BITS;
                (0..BITS)
                    .filter(move |bit| word & (0x8000_0000 >> bit) != 0)
                    .map(move |bit| base + bit)
            })
    }

    fn clear_tail(&mut self) {
        let used = self.len % BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= u32::MAX << (BITS - used);
            }
        }
    }
}
