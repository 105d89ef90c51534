//! Splitting the point sequence into renderable runs, and run lengths.

use crate::point::TrailPoint;

/// Iterator over the discontinuity-free runs of a point sequence.
///
/// A discontinuous point closes the run it belongs to; the next point starts
/// a new one.
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    rest: &'a [TrailPoint],
}

impl<'a> Iterator for Runs<'a> {
    type Item = &'a [TrailPoint];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .iter()
            .position(|point| point.discontinuous)
            .map_or(self.rest.len(), |i| i + 1);
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(run)
    }
}

pub fn runs(points: &[TrailPoint]) -> Runs<'_> {
    Runs { rest: points }
}

/// Polyline length through the point positions.
pub fn run_length(points: &[TrailPoint]) -> f32 {
    points
        .windows(2)
        .map(|pair| pair[0].position.distance(pair[1].position))
        .sum()
}
