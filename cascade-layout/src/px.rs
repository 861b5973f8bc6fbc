//! Physical pixel scalar used by the layout engine.
//!
//! Heights, gaps and positions are tracked in whole physical pixels. [`Px`]
//! supports negative values so off-screen sandbox positioning stays
//! representable, and saturating arithmetic so accumulated column heights
//! cannot overflow.

use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};

/// A physical pixel coordinate value.
///
/// # Examples
///
/// ```
/// use cascade_layout::Px;
///
/// let a = Px::new(100);
/// let b = Px::new(-50);
/// assert_eq!(a + b, Px(50));
/// assert_eq!(a * 2, Px(200));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Px(pub i32);

impl Px {
    /// A constant representing zero pixels.
    pub const ZERO: Self = Self(0);

    /// A constant representing the maximum possible pixel value.
    pub const MAX: Self = Self(i32::MAX);

    /// Creates a new `Px` from an i32 value. Negative values are allowed.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Returns the raw i32 value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Adds two pixel values, clamping at the i32 bounds.
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    /// Subtracts two pixel values, clamping at the i32 bounds.
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Px(self.0 + rhs.0)
    }
}

impl Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Px(self.0 - rhs.0)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<i32> for Px {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Px(self.0 * rhs)
    }
}

impl Div<i32> for Px {
    type Output = Self;

    fn div(self, rhs: i32) -> Self {
        Px(self.0 / rhs)
    }
}

impl Neg for Px {
    type Output = Self;

    fn neg(self) -> Self {
        Px(-self.0)
    }
}

impl Sum for Px {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Px::ZERO, |acc, value| acc.saturating_add(value))
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Px(value)
    }
}

impl From<Px> for i32 {
    fn from(value: Px) -> Self {
        value.0
    }
}

impl From<Px> for f32 {
    fn from(value: Px) -> Self {
        value.0 as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_creation() {
        let px = Px::new(42);
        assert_eq!(px.0, 42);

        let px_neg = Px::new(-10);
        assert_eq!(px_neg.0, -10);
    }

    #[test]
    fn test_px_arithmetic() {
        let a = Px(10);
        let b = Px(5);

        assert_eq!(a + b, Px(15));
        assert_eq!(a - b, Px(5));
        assert_eq!(a * 2, Px(20));
        assert_eq!(a / 2, Px(5));
        assert_eq!(-a, Px(-10));
    }

    #[test]
    fn test_px_saturating_arithmetic() {
        let max = Px(i32::MAX);
        let min = Px(i32::MIN);
        assert_eq!(max.saturating_add(Px(1)), max);
        assert_eq!(min.saturating_sub(Px(1)), min);
    }

    #[test]
    fn test_px_sum() {
        let total: Px = [Px(10), Px(20), Px(30)].into_iter().sum();
        assert_eq!(total, Px(60));

        let empty: Px = std::iter::empty::<Px>().sum();
        assert_eq!(empty, Px::ZERO);
    }

    #[test]
    fn test_px_ordering() {
        assert!(Px(10) < Px(20));
        assert_eq!(Px(10).max(Px(20)), Px(20));
        assert_eq!([Px(30), Px(10), Px(20)].into_iter().max(), Some(Px(30)));
    }
}
