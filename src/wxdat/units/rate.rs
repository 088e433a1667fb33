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

/// Kind shared by precipitation rate units. The base unit is millimeters per hour.
#[derive(Debug)]
pub enum Rate {}

linear_unit!(MillimetersPerHour, Rate, "mm/h", 1.0);
linear_unit!(CentimetersPerHour, Rate, "cm/h", 10.0);
linear_unit!(InchesPerHour, Rate, "in/h", 25.4);

impl<U: Unit<Kind = Rate>> Quantity<U> {
    pub fn millimeters_per_hour(&self) -> Option<f64> {
        self.to::<MillimetersPerHour>().value()
    }

    pub fn centimeters_per_hour(&self) -> Option<f64> {
        self.to::<CentimetersPerHour>().value()
    }

    pub fn inches_per_hour(&self) -> Option<f64> {
        self.to::<InchesPerHour>().value()
    }
}

#[cfg(test)]
mod tests {
    use super::{CentimetersPerHour, InchesPerHour, MillimetersPerHour};
    use crate::units::testing::{assert_close, assert_round_trip};
    use crate::units::Quantity;

    #[test]
    fn test_conversions() {
        assert_close(1.0, Quantity::<MillimetersPerHour>::new(25.4).inches_per_hour());
        assert_close(2.54, Quantity::<InchesPerHour>::new(1.0).centimeters_per_hour());
        assert_close(5.0, Quantity::<CentimetersPerHour>::new(0.5).millimeters_per_hour());
        assert_eq!(None, Quantity::<InchesPerHour>::unknown().millimeters_per_hour());
    }

    #[test]
    fn test_round_trip() {
        for v in [0.0, 0.01, 1.0, 3.3, 75.0] {
            assert_round_trip::<MillimetersPerHour, CentimetersPerHour>(v);
            assert_round_trip::<MillimetersPerHour, InchesPerHour>(v);
            assert_round_trip::<InchesPerHour, CentimetersPerHour>(v);
        }
    }
}
