//! Catmull-Rom resampling of a renderable run.

use std::borrow::Cow;
use std::iter;

use crate::point::TrailPoint;

/// Resamples `run` with `smoothness` samples per control segment.
///
/// A smoothness of 1 (or less) returns the run untouched. Otherwise every
/// pair `(p[i], p[i+1])` contributes samples at `t = j / smoothness` over the
/// controls `p[i-1] .. p[i+2]`, mirroring missing controls at both ends.
/// Samples whose interpolated life is not positive are dropped, and the
/// final point is appended if it is still alive.
pub fn smooth(run: &[TrailPoint], smoothness: u32) -> Cow<'_, [TrailPoint]> {
    if smoothness <= 1 || run.len() < 2 {
        return Cow::Borrowed(run);
    }

    let n = run.len();
    let steps = smoothness as usize;
    let mut out = Vec::with_capacity((n - 1) * steps + 1);

    let head_pad = TrailPoint::reflect(&run[0], &run[1]);
    let tail_pad = TrailPoint::reflect(&run[n - 1], &run[n - 2]);
    let controls: Vec<&TrailPoint> = iter::once(&head_pad)
        .chain(run.iter())
        .chain(iter::once(&tail_pad))
        .collect();

    for window in controls.windows(4) {
        let [p0, p1, p2, p3] = [window[0], window[1], window[2], window[3]];
        for j in 0..steps {
            let t = j as f32 / steps as f32;
            let sample = TrailPoint::catmull_rom(p0, p1, p2, p3, t);
            if sample.is_alive() {
                out.push(sample);
            }
        }
    }

    let last = run[n - 1];
    if last.is_alive() {
        out.push(last);
    }
    Cow::Owned(out)
}
