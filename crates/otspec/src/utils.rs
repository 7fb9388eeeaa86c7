/// Computes the binary search parameters found in the table directory and
/// in format 4 cmap subtables.
///
/// Returns `(searchRange, entrySelector, rangeShift)` for `n` items of
/// `itemsize` bytes each: `entrySelector` is floor(log2(n)), `searchRange`
/// is `itemsize` times the largest power of two not exceeding `n`, and
/// `rangeShift` is `n * itemsize - searchRange`.
pub fn get_search_range(n: u16, itemsize: u16) -> (u16, u16, u16) {
    if n == 0 {
        return (0, 0, 0);
    }
    let entry_selector = (15 - n.leading_zeros()) as u16;
    let max_pow2 = 1_u32 << entry_selector;
    let search_range = max_pow2 * itemsize as u32;
    let range_shift = (n as u32 * itemsize as u32).saturating_sub(search_range);
    (
        search_range.min(u16::MAX as u32) as u16,
        entry_selector,
        range_shift.min(u16::MAX as u32) as u16,
    )
}

/// Convert an array of bit positions into an integer, keeping only the bits
/// between `low` and `high` inclusive and shifting them down by `low`.
pub fn filtered_bitset_to_num<'a>(bs: impl Iterator<Item = &'a u8>, low: u8, high: u8) -> u32 {
    bs.filter(|&x| x >= &low && x <= &high)
        .map(|x| 1_u32 << (x - low))
        .fold(0, |acc, bit| acc | bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_range_table_directory() {
        // 10 required tables of a minimal TrueType font
        assert_eq!(get_search_range(10, 16), (128, 3, 32));
        // Roboto has 0x16 tables
        assert_eq!(get_search_range(0x16, 16), (256, 4, 96));
        assert_eq!(get_search_range(1, 16), (16, 0, 0));
    }

    #[test]
    fn search_range_cmap4() {
        assert_eq!(get_search_range(2, 2), (4, 1, 0));
        assert_eq!(get_search_range(3, 2), (4, 1, 2));
        assert_eq!(get_search_range(39, 2), (64, 5, 14));
    }

    #[test]
    fn bitsets() {
        let bits = [0_u8, 1, 33, 65];
        assert_eq!(filtered_bitset_to_num(bits.iter(), 0, 31), 3);
        assert_eq!(filtered_bitset_to_num(bits.iter(), 32, 63), 2);
        assert_eq!(filtered_bitset_to_num(bits.iter(), 64, 95), 2);
    }
}
