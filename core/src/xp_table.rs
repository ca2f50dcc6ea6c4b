//! Character level lookup from total accumulated experience.

use thiserror::Error;

/// Total XP required to reach each level (lower bounds, level 1 first).
#[rustfmt::skip]
const EXPERIENCE_TABLE: [u64; 100] = [
    0, 525, 1760, 3781, 7184, 12186, 19324, 29377, 43181, 61693,
    85990, 117506, 157384, 207736, 269997, 346462, 439268, 551295, 685171, 843709,
    1030734, 1249629, 1504995, 1800847, 2142652, 2535122, 2984677, 3496798, 4080655, 4742836,
    5490247, 6334393, 7283446, 8384398, 9541110, 10874351, 12361842, 14018289, 15859432, 17905634,
    20171471, 22679999, 25456123, 28517857, 31897771, 35621447, 39721017, 44225461, 49176560, 54607467,
    60565335, 67094245, 74247659, 82075627, 90631041, 99984974, 110197515, 121340161, 133497202, 146749362,
    161191120, 176922628, 194049893, 212684946, 232956711, 255001620, 278952403, 304972236, 333233648, 363906163,
    397194041, 433312945, 472476370, 514937180, 560961898, 610815862, 664824416, 723298169, 786612664, 855129128,
    929261318, 1009443795, 1096169525, 1189918242, 1291270350, 1400795257, 1519130326, 1646943474, 1784977296, 1934009687,
    2094900291, 2268549086, 2455921256, 2658074992, 2876116901, 3111280300, 3364828162, 3638186694, 3932818530, 4250334444,
];

pub const MAX_LEVEL: u32 = EXPERIENCE_TABLE.len() as u32;

#[derive(Debug, Error)]
#[error("level {level} is out of bounds, must be between 1 and 100")]
pub struct LevelOutOfBounds {
    pub level: u32,
}

/// Character level for a total XP value.
pub fn level_from_xp(xp: u64) -> u32 {
    let index = EXPERIENCE_TABLE.partition_point(|&bound| bound <= xp);
    index as u32
}

/// XP range `(lower, upper)` covered by a level. The top level's range
/// collapses to its lower bound.
pub fn xp_range_for_level(level: u32) -> Result<(u64, u64), LevelOutOfBounds> {
    if level < 1 || level > MAX_LEVEL {
        return Err(LevelOutOfBounds { level });
    }
    let lower = EXPERIENCE_TABLE[(level - 1) as usize];
    let upper = if level < MAX_LEVEL {
        EXPERIENCE_TABLE[level as usize]
    } else {
        lower
    };
    Ok((lower, upper))
}

/// Fraction of the current level's XP range already earned, in `[0, 1]`.
pub fn level_progress(xp: u64) -> f64 {
    let level = level_from_xp(xp);
    match xp_range_for_level(level) {
        Ok((lower, upper)) if upper > lower => (xp - lower) as f64 / (upper - lower) as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_from_xp(0), 1);
        assert_eq!(level_from_xp(524), 1);
        assert_eq!(level_from_xp(525), 2);
        assert_eq!(level_from_xp(3_969_433_254), 99);
        assert_eq!(level_from_xp(4_250_334_444), 100);
        assert_eq!(level_from_xp(u64::MAX), 100);
    }

    #[test]
    fn test_xp_range() {
        assert_eq!(xp_range_for_level(1).unwrap(), (0, 525));
        assert_eq!(
            xp_range_for_level(99).unwrap(),
            (3_932_818_530, 4_250_334_444)
        );
        let (lo, hi) = xp_range_for_level(100).unwrap();
        assert_eq!(lo, hi);
        assert!(xp_range_for_level(0).is_err());
        assert!(xp_range_for_level(101).is_err());
    }

    #[test]
    fn test_level_progress_midpoint() {
        let progress = level_progress(262);
        assert!((progress - 0.499).abs() < 0.01);
    }
}
