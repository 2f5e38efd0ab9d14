use serde::Serialize;

use super::{Exp, Level, cumulative_exp, required_exp, table};

/// Where a lifetime total lands inside the level table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
  pub level: Level,
  pub current_exp: Exp,
  pub required_exp: Exp,
  pub exp_to_next: Exp,
  /// `0..=100`, rounded down
  pub percentage: u8,
}

/// Outcome of folding surplus experience into level increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
  pub leveled_up: bool,
  pub level: Level,
  pub current_exp: Exp,
  pub required_exp: Exp,
}

/// Highest level whose cumulative requirement is covered by `total`.
///
/// Only meant for rebuilding progress from a lifetime total; the award path
/// carries level and in-level experience forward with [`apply_level_up`].
pub fn level_for_total(total: Exp) -> Level {
  table::level_covered_by(total)
}

pub fn progress_within(total: Exp) -> LevelProgress {
  let total = total.max(0);
  let level = level_for_total(total);
  let current_exp = total - cumulative_exp(level);
  let required_exp = required_exp(level);

  let percentage = (current_exp * 100 / required_exp).clamp(0, 100) as u8;

  LevelProgress {
    level,
    current_exp,
    required_exp,
    exp_to_next: (required_exp - current_exp).max(0),
    percentage,
  }
}

/// Consumes `current_exp` level by level until it no longer covers the
/// requirement of the level reached.
///
/// `required` is the cached requirement of `level`; a non-positive value
/// (legacy records) is replaced with the table value so the loop always
/// makes progress.
pub fn apply_level_up(
  level: Level,
  current_exp: Exp,
  required: Exp,
) -> LevelUp {
  let mut level = level.max(1);
  let mut current_exp = current_exp.max(0);
  let mut required = if required > 0 { required } else { required_exp(level) };
  let mut leveled_up = false;

  while current_exp >= required {
    current_exp -= required;
    level += 1;
    required = required_exp(level);
    leveled_up = true;
  }

  LevelUp { leveled_up, level, current_exp, required_exp: required }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::level::table::MAX_TABLE_LEVEL;

  #[test]
  fn level_for_total_picks_highest_covered() {
    assert_eq!(level_for_total(0), 1);
    assert_eq!(level_for_total(9), 1);
    assert_eq!(level_for_total(10), 2);
    assert_eq!(level_for_total(29), 2);
    assert_eq!(level_for_total(30), 3);
    assert_eq!(level_for_total(1899), 19);
    assert_eq!(level_for_total(1900), 20);
    assert_eq!(level_for_total(2100), 21);
    assert_eq!(level_for_total(-5), 1);
  }

  #[test]
  fn huge_totals_resolve_directly() {
    let progress = progress_within(2_000_000_000);

    assert_eq!(progress.level, 20_000);
    assert_eq!(progress.current_exp, 2_000_000_000 - 1_999_900_000);
    assert_eq!(progress.required_exp, 200_000);
    assert_eq!(progress.percentage, 50);

    let top = progress_within(Exp::MAX);
    assert!(top.current_exp >= 0);
    assert!(top.percentage <= 100);
  }

  #[test]
  fn progress_of_cumulative_starts_the_level() {
    for level in 1..=MAX_TABLE_LEVEL + 10 {
      let progress = progress_within(cumulative_exp(level));
      assert_eq!(progress.level, level);
      assert_eq!(progress.current_exp, 0);
      assert_eq!(progress.percentage, 0);
    }
  }

  #[test]
  fn progress_inside_a_level() {
    let progress = progress_within(45);

    assert_eq!(
      progress,
      LevelProgress {
        level: 3,
        current_exp: 15,
        required_exp: 30,
        exp_to_next: 15,
        percentage: 50,
      }
    );
  }

  #[test]
  fn multi_level_jump() {
    let up = apply_level_up(1, 65, 10);

    assert!(up.leveled_up);
    assert_eq!(up.level, 4);
    assert_eq!(up.current_exp, 5);
    assert_eq!(up.required_exp, 40);
  }

  #[test]
  fn no_level_up_below_requirement() {
    let up = apply_level_up(3, 29, 30);

    assert!(!up.leveled_up);
    assert_eq!((up.level, up.current_exp, up.required_exp), (3, 29, 30));
  }

  #[test]
  fn exact_requirement_levels_up_with_nothing_left() {
    let up = apply_level_up(2, 20, 20);

    assert!(up.leveled_up);
    assert_eq!((up.level, up.current_exp, up.required_exp), (3, 0, 30));
  }

  #[test]
  fn level_up_always_settles_below_requirement() {
    for level in 1..=MAX_TABLE_LEVEL + 5 {
      for exp in (0..5_000).step_by(37) {
        let up = apply_level_up(level, exp, required_exp(level));
        assert!(up.current_exp >= 0);
        assert!(up.current_exp < up.required_exp, "{level} {exp}");
        assert_eq!(up.required_exp, required_exp(up.level));
      }
    }
  }

  #[test]
  fn zero_cached_requirement_is_recomputed() {
    let up = apply_level_up(2, 25, 0);

    assert!(up.leveled_up);
    assert_eq!((up.level, up.current_exp), (3, 5));
  }

  #[test]
  fn level_up_matches_total_based_progress() {
    // folding awards one by one lands where the total alone says
    let (mut level, mut exp, mut required, mut total) = (1, 0, 10, 0);
    for award in [5, 10, 50, 1, 15, 300, 7, 1_000, 25] {
      total += award;
      let up = apply_level_up(level, exp + award, required);
      (level, exp, required) = (up.level, up.current_exp, up.required_exp);

      let p = progress_within(total);
      assert_eq!(
        (level, exp, required),
        (p.level, p.current_exp, p.required_exp)
      );
    }
  }
}
