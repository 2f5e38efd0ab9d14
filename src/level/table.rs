use super::{Exp, Level};

/// Highest level with an explicit entry in the tables below.
pub const MAX_TABLE_LEVEL: Level = 20;

/// Per-level step used past [`MAX_TABLE_LEVEL`]:
/// `required_exp(l) = l * OVERFLOW_STEP`.
///
/// This continues the table's own progression, so `cumulative_exp(l)` stays
/// `5 * l * (l - 1)` at every level. Note that `(l - 1) * l * 5` is therefore
/// the *cumulative* total and must never be used as a per-level requirement.
pub const OVERFLOW_STEP: Exp = 10;

/// Experience needed to advance from level `n` to `n + 1`, indexed by `n - 1`.
const REQUIRED: [Exp; MAX_TABLE_LEVEL as usize] = [
  10, 20, 30, 40, 50, 60, 70, 80, 90, 100, //
  110, 120, 130, 140, 150, 160, 170, 180, 190, 200,
];

/// Total experience needed to reach level `n`, indexed by `n - 1`.
const CUMULATIVE: [Exp; MAX_TABLE_LEVEL as usize] = [
  0, 10, 30, 60, 100, 150, 210, 280, 360, 450, //
  550, 660, 780, 910, 1050, 1200, 1360, 1530, 1710, 1900,
];

/// Experience needed to go from `level` to `level + 1`. Levels below 1 are
/// read as level 1.
pub fn required_exp(level: Level) -> Exp {
  let level = level.max(1);
  if level <= MAX_TABLE_LEVEL {
    REQUIRED[(level - 1) as usize]
  } else {
    level as Exp * OVERFLOW_STEP
  }
}

/// Total experience needed to reach `level` from zero, saturating at
/// [`Exp::MAX`].
pub fn cumulative_exp(level: Level) -> Exp {
  cumulative_wide(level).min(Exp::MAX as i128) as Exp
}

pub(super) fn cumulative_wide(level: Level) -> i128 {
  let level = level.max(1);
  if level <= MAX_TABLE_LEVEL {
    return CUMULATIVE[(level - 1) as usize] as i128;
  }

  // sum of `n * OVERFLOW_STEP` over `1..level`
  let l = level as i128;
  OVERFLOW_STEP as i128 * l * (l - 1) / 2
}

/// Highest level whose cumulative requirement is covered by `total`.
pub(super) fn level_covered_by(total: Exp) -> Level {
  if total < CUMULATIVE[(MAX_TABLE_LEVEL - 1) as usize] {
    return CUMULATIVE.partition_point(|&c| c <= total).max(1) as Level;
  }

  // invert `5 * l * (l - 1) = total`, then settle the rounding
  let t = total as i128;
  let mut level = ((5 + (25 + 20 * t).isqrt()) / 10) as Level;
  while cumulative_wide(level + 1) <= t {
    level += 1;
  }
  while cumulative_wide(level) > t {
    level -= 1;
  }
  level
}
