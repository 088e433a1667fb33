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

use crate::units::{Quantity, Unit};

/// Kind shared by all weight units. The base unit is the kilogram. `Ton` is the
/// US short ton of 2000 pounds.
#[derive(Debug)]
pub enum Weight {}

const KILOGRAMS_PER_POUND: f64 = 0.45359237;

linear_unit!(Kilogram, Weight, "kg", 1.0);
linear_unit!(Gram, Weight, "g", 0.001);
linear_unit!(Milligram, Weight, "mg", 0.000001);
linear_unit!(Pound, Weight, "lb", KILOGRAMS_PER_POUND);
linear_unit!(Ounce, Weight, "oz", KILOGRAMS_PER_POUND / 16.0);
linear_unit!(Ton, Weight, "ton", KILOGRAMS_PER_POUND * 2000.0);

impl<U: Unit<Kind = Weight>> Quantity<U> {
    pub fn kilograms(&self) -> Option<f64> {
        self.to::<Kilogram>().value()
    }

    pub fn grams(&self) -> Option<f64> {
        self.to::<Gram>().value()
    }

    pub fn milligrams(&self) -> Option<f64> {
        self.to::<Milligram>().value()
    }

    pub fn pounds(&self) -> Option<f64> {
        self.to::<Pound>().value()
    }

    pub fn ounces(&self) -> Option<f64> {
        self.to::<Ounce>().value()
    }

    pub fn tons(&self) -> Option<f64> {
        self.to::<Ton>().value()
    }
}

#[cfg(test)]
mod tests {
    use super::{Gram, Kilogram, Milligram, Ounce, Pound, Ton};
    use crate::units::testing::{assert_close, assert_round_trip};
    use crate::units::Quantity;

    #[test]
    fn test_pound() {
        let w = Quantity::<Pound>::new(1.0);
        assert_close(453.59237, w.grams());
        assert_close(16.0, w.ounces());
        assert_close(0.0005, w.tons());
    }

    #[test]
    fn test_kilogram() {
        let w = Quantity::<Kilogram>::new(2.5);
        assert_close(2500.0, w.grams());
        assert_close(2500000.0, w.milligrams());
        assert_close(5.5115566, w.pounds());
    }

    #[test]
    fn test_unknown() {
        let w = Quantity::<Ton>::unknown();
        assert_eq!(None, w.kilograms());
        assert_eq!(None, w.ounces());
    }

    #[test]
    fn test_round_trip() {
        for v in [0.0, 0.1, 1.0, 16.0, 2000.0] {
            assert_round_trip::<Kilogram, Gram>(v);
            assert_round_trip::<Kilogram, Milligram>(v);
            assert_round_trip::<Kilogram, Pound>(v);
            assert_round_trip::<Kilogram, Ounce>(v);
            assert_round_trip::<Kilogram, Ton>(v);
            assert_round_trip::<Pound, Ounce>(v);
            assert_round_trip::<Gram, Ton>(v);
        }
    }
}
