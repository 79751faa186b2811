//! Phase TEC calibration against code TEC, over phase connected arcs
use std::collections::BTreeMap;

use crate::{
    observable::Observable,
    observation::{AnnotatedValue, Record},
    prelude::SV,
    tec::{arcs::HISTOGRAM_CLASSES, PhaseArc, TecOptions},
};

/// Loosest badness bound, tightened while the records it leaves out
/// remain under the tolerated share of the arc.
fn badness_bound(arc: &PhaseArc, options: &TecOptions) -> u32 {
    let target = arc.len() as f64 * options.max_excluded_share;
    let mut left_out = arc.len() - arc.histogram.iter().sum::<usize>();
    let mut bound = HISTOGRAM_CLASSES;
    while (left_out as f64) < target && bound > 0 {
        bound -= 1;
        left_out += arc.histogram[bound];
    }
    bound as u32
}

/// Calibrates the phase TEC of every arc and stores the result
/// as [Observable::Tec] in every record of the arc.
/// Arcs without any usable (code, phase) pair are left as is.
pub(crate) fn calibrate(
    records: &mut [Record],
    arcs: &BTreeMap<SV, Vec<PhaseArc>>,
    options: &TecOptions,
) {
    for (sv, arcs) in arcs.iter() {
        for arc in arcs.iter() {
            let bound = badness_bound(arc, options);

            let (sum, count) = records[arc.start..arc.end]
                .iter()
                .filter(|record| record.badness(sv, &options.badness) <= bound)
                .filter_map(|record| Some(record.ctec(sv)? - record.ptec(sv)?))
                .fold((0.0_f64, 0_usize), |(sum, count), offset| {
                    (sum + offset, count + 1)
                });

            if count == 0 {
                log::debug!("{}: no calibration samples in [{}, {})", sv, arc.start, arc.end);
                continue;
            }

            let offset = sum / count as f64;
            log::debug!(
                "{}: arc [{}, {}) calibrated with {} samples (badness <= {}), offset {:.3} TECU",
                sv,
                arc.start,
                arc.end,
                count,
                bound,
                offset
            );

            for record in records[arc.start..arc.end].iter_mut() {
                if let Some(ptec) = record.ptec(sv) {
                    record.insert(*sv, Observable::Tec, AnnotatedValue::new(ptec + offset));
                }
            }
        }
    }
}
