//! Bit helpers for identity words.
//!
//! Identities are indexed by a window of their bits. These helpers measure
//! which bits carry information across a population.

/// Number of bits needed to represent `word`; 0 for 0
#[inline]
pub const fn bit_length(word: usize) -> u32 {
    usize::BITS - word.leading_zeros()
}

/// Log size of the smallest power-of-two table with `count` distinct slots
///
/// ```
/// use type_cache::bits::address_bits;
///
/// assert_eq!(address_bits(0), 0);
/// assert_eq!(address_bits(1), 0);
/// assert_eq!(address_bits(2), 1);
/// assert_eq!(address_bits(3), 2);
/// assert_eq!(address_bits(8), 3);
/// assert_eq!(address_bits(9), 4);
/// ```
#[inline]
pub const fn address_bits(count: usize) -> u32 {
    if count <= 1 {
        0
    } else {
        bit_length(count - 1)
    }
}

/// Mask of the bit positions in which at least two words differ
///
/// ```
/// use type_cache::bits::differing_bits;
///
/// assert_eq!(differing_bits([0b1001_0000, 0b1010_0000, 0b1100_0000]), 0b0111_0000);
/// assert_eq!(differing_bits([42]), 0);
/// ```
pub fn differing_bits<I>(words: I) -> usize
where
    I: IntoIterator<Item = usize>,
{
    let mut words = words.into_iter();
    let Some(first) = words.next() else {
        return 0;
    };
    words.fold(0, |acc, word| acc | (word ^ first))
}

/// Number of low bits that never differ; 0 when nothing differs
#[inline]
pub const fn irrelevant_bits(differing: usize) -> u32 {
    if differing == 0 {
        0
    } else {
        differing.trailing_zeros()
    }
}

/// Distance between the lowest and the highest differing bit, inclusive
#[inline]
pub const fn differing_width(differing: usize) -> u32 {
    if differing == 0 {
        0
    } else {
        bit_length(differing) - differing.trailing_zeros()
    }
}

/// Render a word MSB first, marking differing positions with `X`
///
/// ```
/// use type_cache::bits::bit_pattern;
///
/// let pattern = bit_pattern(0b1100_0000, 0b0111_0000);
/// assert!(pattern.ends_with("1XXX0000"));
/// ```
pub fn bit_pattern(sample: usize, differing: usize) -> String {
    (0..usize::BITS)
        .rev()
        .map(|bit| {
            let mask = 1usize << bit;
            if differing & mask != 0 {
                'X'
            } else if sample & mask != 0 {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}
