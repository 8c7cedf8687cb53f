use std::f64::consts::PI;

#[inline(always)]
pub fn pi(v: f64) -> f64 {
    PI * v
}

/// Truncates toward zero into pixel space, saturating at the `i32` range (NaN maps to 0).
#[inline]
pub fn px(v: f64) -> i32 {
    v as i32
}

/// `n / d`, or `0` when `d` is zero.
#[inline]
pub fn div_or_zero(n: i64, d: i64) -> i64 {
    n.checked_div(d).unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_px_truncates_toward_zero() {
        assert_eq!(px(2.9), 2);
        assert_eq!(px(-2.9), -2);
        assert_eq!(px(f64::NAN), 0);
        assert_eq!(px(1e20), i32::MAX);
    }

    #[test]
    fn test_div_or_zero() {
        assert_eq!(div_or_zero(7, 2), 3);
        assert_eq!(div_or_zero(7, 0), 0);
    }

    #[test]
    fn test_pi() {
        assert_eq!(pi(2.0), 2.0 * PI);
    }
}
