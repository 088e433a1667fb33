// wxdat - Record weather observations from multiple providers
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Typed physical quantities with lossless conversion between units.
//!
//! A [`Quantity`] is a possibly-unknown value tagged, at the type level, with the
//! [`Unit`] it is measured in. Every unit belongs to exactly one physical kind
//! (temperature, distance, pressure, ...) and can be converted to any other unit of
//! the same kind with [`Quantity::to`]. Units of different kinds can't be converted
//! or combined: the compiler rejects it.
//!
//! Upstream APIs frequently omit values. An unknown quantity stays unknown through
//! every conversion and arithmetic operation instead of turning into zero.
//!
//! ```
//! use wxdat::units::{Celsius, Fahrenheit, Quantity};
//!
//! let freezing = Quantity::<Fahrenheit>::new(32.0);
//! assert_eq!(Some(0.0), freezing.celsius());
//!
//! let missing = Quantity::<Fahrenheit>::unknown();
//! assert_eq!(None, missing.to::<Celsius>().kelvin());
//! ```

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::error;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Declare a unit whose conversion to the base unit of its kind is a fixed factor.
macro_rules! linear_unit {
    ($(#[$meta:meta])* $name:ident, $kind:ty, $symbol:expr, $factor:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name;

        impl $crate::units::Unit for $name {
            type Kind = $kind;
            const SYMBOL: &'static str = $symbol;

            fn to_base(value: f64) -> f64 {
                value * ($factor)
            }

            fn from_base(value: f64) -> f64 {
                value / ($factor)
            }
        }
    };
}

pub mod distance;
pub mod pressure;
pub mod rate;
pub mod temperature;
pub mod velocity;
pub mod volume;
pub mod weight;

pub use distance::{Centimeter, Distance, Foot, Inch, Kilometer, Meter, Mile, Millimeter, Yard};
pub use pressure::{Hectopascal, InchesMercury, Kilopascal, Millibar, MillimetersMercury, Pascal, Pressure};
pub use rate::{CentimetersPerHour, InchesPerHour, MillimetersPerHour, Rate};
pub use temperature::{Celsius, Fahrenheit, Kelvin, Temperature};
pub use velocity::{FeetPerSecond, KilometersPerHour, Knots, MetersPerSecond, MilesPerHour, Velocity};
pub use volume::{FluidOunce, Gallon, Liter, Milliliter, Pint, Quart, Volume};
pub use weight::{Gram, Kilogram, Milligram, Ounce, Pound, Ton, Weight};

/// A unit of measure belonging to a single physical kind.
///
/// Each kind picks one base unit. Implementations describe how to move a value
/// between themselves and that base unit; converting between any two units of a
/// kind goes through the base.
pub trait Unit: Copy + fmt::Debug + Send + Sync + 'static {
    /// Marker shared by every unit measuring the same physical kind.
    type Kind: 'static;

    /// Short human readable symbol, e.g. `°F` or `inHg`.
    const SYMBOL: &'static str;

    /// Convert a value in this unit to the base unit of its kind.
    fn to_base(value: f64) -> f64;

    /// Convert a value in the base unit of this kind to this unit.
    fn from_base(value: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitError {
    Unknown,
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "cannot compare a quantity with an unknown value"),
        }
    }
}

impl error::Error for UnitError {}

/// An immutable, possibly unknown, value measured in the unit `U`.
///
/// Equality follows the same rules as floating point `NaN`: an unknown quantity
/// is never equal to anything, including another unknown quantity. There is no
/// `PartialOrd` implementation since silently answering `false` for unknown values
/// hides missing data. Use [`Quantity::try_cmp`] instead, which returns an error.
#[derive(Clone, Copy)]
pub struct Quantity<U> {
    value: Option<f64>,
    unit: PhantomData<U>,
}

impl<U: Unit> Quantity<U> {
    /// Create a new quantity. `NaN` values are treated as unknown.
    pub fn new<V: Into<Option<f64>>>(value: V) -> Self {
        Quantity {
            value: value.into().filter(|v| !v.is_nan()),
            unit: PhantomData,
        }
    }

    pub fn unknown() -> Self {
        Self::new(None)
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_none()
    }

    /// Convert this quantity to another unit of the same kind.
    pub fn to<V>(&self) -> Quantity<V>
    where
        V: Unit<Kind = U::Kind>,
    {
        Quantity::new(self.value.map(|v| V::from_base(U::to_base(v))))
    }

    /// Compare by magnitude, failing if either quantity is unknown.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, UnitError> {
        match (self.value, other.value) {
            (Some(a), Some(b)) => a.partial_cmp(&b).ok_or(UnitError::Unknown),
            _ => Err(UnitError::Unknown),
        }
    }

    fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        Self::new(self.value.map(f))
    }

    fn zip(self, other: Self, f: impl FnOnce(f64, f64) -> f64) -> Self {
        Self::new(self.value.zip(other.value).map(|(a, b)| f(a, b)))
    }
}

impl<U: Unit> Default for Quantity<U> {
    fn default() -> Self {
        Self::unknown()
    }
}

impl<U: Unit> From<f64> for Quantity<U> {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl<U: Unit> From<Option<f64>> for Quantity<U> {
    fn from(value: Option<f64>) -> Self {
        Self::new(value)
    }
}

impl<U: Unit> PartialEq for Quantity<U> {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.value, other.value), (Some(a), Some(b)) if a == b)
    }
}

impl<U: Unit> PartialEq<f64> for Quantity<U> {
    fn eq(&self, other: &f64) -> bool {
        self.value == Some(*other)
    }
}

impl<U: Unit> Add for Quantity<U> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip(rhs, |a, b| a + b)
    }
}

impl<U: Unit> Sub for Quantity<U> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip(rhs, |a, b| a - b)
    }
}

impl<U: Unit> Mul<f64> for Quantity<U> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.map(|v| v * rhs)
    }
}

impl<U: Unit> Div<f64> for Quantity<U> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        self.map(|v| v / rhs)
    }
}

impl<U: Unit> Neg for Quantity<U> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.map(|v| -v)
    }
}

impl<U: Unit> fmt::Debug for Quantity<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Quantity").field(&self.value).field(&U::SYMBOL).finish()
    }
}

impl<U: Unit> fmt::Display for Quantity<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{} {}", v, U::SYMBOL),
            None => write!(f, "unknown"),
        }
    }
}

impl<U: Unit> Serialize for Quantity<U> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Quantity, Unit};

    pub fn assert_close(expected: f64, actual: Option<f64>) {
        let actual = actual.expect("expected a known value");
        let tolerance = 1e-5 * expected.abs().max(1.0);
        assert!(
            (expected - actual).abs() <= tolerance,
            "expected {} but got {}",
            expected,
            actual
        );
    }

    /// Convert `value` from `A` to `B` and back, asserting nothing was lost on the way.
    pub fn assert_round_trip<A, B>(value: f64)
    where
        A: Unit,
        B: Unit<Kind = A::Kind>,
    {
        let there = Quantity::<A>::new(value).to::<B>();
        let back = there.to::<A>();
        assert_close(value, back.value());
    }
}
