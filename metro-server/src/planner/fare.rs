//! Distance-banded fare table.
//!
//! Fares are pure configuration data: an ordered list of distance bands and
//! an overflow rule for trips beyond the last band. The engine only ever
//! evaluates the table; the breakpoints themselves belong to the operator's
//! tariff, not to the code.

/// Tiered fare schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareTable {
    /// `(max_meters, price_yuan)` bands, ascending by distance.
    bands: Vec<(u32, u32)>,
    /// Step size for distance beyond the last band (meters).
    step_meters: u32,
    /// Surcharge per started step beyond the last band (yuan).
    step_yuan: u32,
}

impl FareTable {
    /// Build a table from raw bands and an overflow rule.
    ///
    /// Bands are sorted by their distance bound; a duplicate bound keeps the
    /// cheaper price.
    pub fn new(mut bands: Vec<(u32, u32)>, step_meters: u32, step_yuan: u32) -> Self {
        bands.sort();
        bands.dedup_by_key(|&mut (max_m, _)| max_m);
        Self {
            bands,
            step_meters: step_meters.max(1),
            step_yuan,
        }
    }

    /// Fare in yuan for a trip of `distance_m` meters.
    ///
    /// The first band whose bound covers the distance wins; beyond all
    /// bands, each *started* step adds the step surcharge.
    pub fn price(&self, distance_m: u32) -> u32 {
        for &(max_m, yuan) in &self.bands {
            if distance_m <= max_m {
                return yuan;
            }
        }
        let (last_max, last_yuan) = self.bands.last().copied().unwrap_or((0, 0));
        let steps = (distance_m - last_max).div_ceil(self.step_meters);
        last_yuan + steps * self.step_yuan
    }
}

impl Default for FareTable {
    /// The network's standard tariff: ¥3 to 6 km, ¥4 to 12 km, ¥5 to 22 km,
    /// ¥6 to 32 km, then ¥1 per started 20 km.
    fn default() -> Self {
        Self::new(
            vec![(6_000, 3), (12_000, 4), (22_000, 5), (32_000, 6)],
            20_000,
            1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        let fares = FareTable::default();
        assert_eq!(fares.price(0), 3);
        assert_eq!(fares.price(6_000), 3);
        assert_eq!(fares.price(6_001), 4);
        assert_eq!(fares.price(12_000), 4);
        assert_eq!(fares.price(22_000), 5);
        assert_eq!(fares.price(32_000), 6);
    }

    #[test]
    fn overflow_charges_per_started_step() {
        let fares = FareTable::default();
        assert_eq!(fares.price(32_001), 7);
        assert_eq!(fares.price(52_000), 7);
        assert_eq!(fares.price(52_001), 8);
        assert_eq!(fares.price(72_000), 8);
        assert_eq!(fares.price(72_001), 9);
    }

    #[test]
    fn unsorted_bands_are_normalized() {
        let fares = FareTable::new(vec![(12_000, 4), (6_000, 3)], 20_000, 1);
        assert_eq!(fares.price(5_000), 3);
        assert_eq!(fares.price(10_000), 4);
        assert_eq!(fares.price(12_001), 5);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Fare never decreases as distance grows
        #[test]
        fn fare_is_monotonic(a in 0u32..200_000, b in 0u32..200_000) {
            let fares = FareTable::default();
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(fares.price(near) <= fares.price(far));
        }

        /// Every distance inside a band prices at that band
        #[test]
        fn distances_within_first_band_share_a_price(d in 0u32..=6_000) {
            prop_assert_eq!(FareTable::default().price(d), 3);
        }
    }
}
