// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0
/*! Integer-only formatting of distance readings.

Readings are scaled to the largest unit that keeps the number readable;
all conversions truncate. The widest output is 6 characters plus slack,
so a `heapless::String<8>` is enough for any reading.
*/

use ufmt::{uwrite, uDisplay, uWrite};

/// A distance in millimeters that prints in its display scale.
///
/// | reading            | output      |
/// |--------------------|-------------|
/// | above 2 m          | `>2m`       |
/// | 1001 mm .. 2000 mm | `1.23 m`    |
/// | 101 mm .. 1000 mm  | `56 cm`     |
/// | up to 100 mm       | `45 mm`     |
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Distance(pub u16);

impl uDisplay for Distance {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let distance_mm = self.0;
        if distance_mm > 2000 {
            // Too far to measure reliably.
            uwrite!(f, ">2m")
        } else if distance_mm > 1000 {
            let meters = distance_mm / 1000;
            let centimeters = (distance_mm % 1000) / 10;
            if centimeters < 10 {
                uwrite!(f, "{}.0{} m", meters, centimeters)
            } else {
                uwrite!(f, "{}.{} m", meters, centimeters)
            }
        } else if distance_mm > 100 {
            uwrite!(f, "{} cm", distance_mm / 10)
        } else {
            uwrite!(f, "{} mm", distance_mm)
        }
    }
}

/// Write the display rendering of a distance into `out`, typically the main
/// loop's reused line buffer.
pub fn format_distance<W>(distance_mm: u16, out: &mut W) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwrite!(out, "{}", Distance(distance_mm))
}
