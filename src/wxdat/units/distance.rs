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

/// Kind shared by all distance units. The base unit is the meter.
#[derive(Debug)]
pub enum Distance {}

linear_unit!(Meter, Distance, "m", 1.0);
linear_unit!(Kilometer, Distance, "km", 1000.0);
linear_unit!(Centimeter, Distance, "cm", 0.01);
linear_unit!(Millimeter, Distance, "mm", 0.001);
linear_unit!(Mile, Distance, "mi", 1609.344);
linear_unit!(Yard, Distance, "yd", 0.9144);
linear_unit!(Foot, Distance, "ft", 0.3048);
linear_unit!(Inch, Distance, "in", 0.0254);

impl<U: Unit<Kind = Distance>> Quantity<U> {
    pub fn meters(&self) -> Option<f64> {
        self.to::<Meter>().value()
    }

    pub fn kilometers(&self) -> Option<f64> {
        self.to::<Kilometer>().value()
    }

    pub fn centimeters(&self) -> Option<f64> {
        self.to::<Centimeter>().value()
    }

    pub fn millimeters(&self) -> Option<f64> {
        self.to::<Millimeter>().value()
    }

    pub fn miles(&self) -> Option<f64> {
        self.to::<Mile>().value()
    }

    pub fn yards(&self) -> Option<f64> {
        self.to::<Yard>().value()
    }

    pub fn feet(&self) -> Option<f64> {
        self.to::<Foot>().value()
    }

    pub fn inches(&self) -> Option<f64> {
        self.to::<Inch>().value()
    }
}
