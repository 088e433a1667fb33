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

/// Kind shared by all volume units. The base unit is the liter. Imperial units
/// are US customary (liquid) measures.
#[derive(Debug)]
pub enum Volume {}

const LITERS_PER_GALLON: f64 = 3.785411784;

linear_unit!(Liter, Volume, "L", 1.0);
linear_unit!(Milliliter, Volume, "mL", 0.001);
linear_unit!(Gallon, Volume, "gal", LITERS_PER_GALLON);
linear_unit!(Quart, Volume, "qt", LITERS_PER_GALLON / 4.0);
linear_unit!(Pint, Volume, "pt", LITERS_PER_GALLON / 8.0);
linear_unit!(FluidOunce, Volume, "fl oz", LITERS_PER_GALLON / 128.0);

impl<U: Unit<Kind = Volume>> Quantity<U> {
    pub fn liters(&self) -> Option<f64> {
        self.to::<Liter>().value()
    }

    pub fn milliliters(&self) -> Option<f64> {
        self.to::<Milliliter>().value()
    }

    pub fn gallons(&self) -> Option<f64> {
        self.to::<Gallon>().value()
    }

    pub fn quarts(&self) -> Option<f64> {
        self.to::<Quart>().value()
    }

    pub fn pints(&self) -> Option<f64> {
        self.to::<Pint>().value()
    }

    pub fn fluid_ounces(&self) -> Option<f64> {
        self.to::<FluidOunce>().value()
    }
}
