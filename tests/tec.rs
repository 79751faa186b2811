#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rinex_tec::prelude::*;
    use rinex_tec::tec::{F1_GHZ, F2_GHZ, SPEED_OF_LIGHT_M_NS, TECU_PER_NS};
    use std::io::Cursor;

    const RECORDS: usize = 40;

    fn header_line(content: &str, label: &str) -> String {
        format!("{:<60}{:<20}\n", content, label)
    }

    /// Slant TEC seen by the synthetic receiver [TECU]
    fn truth(index: usize) -> f64 {
        20.0 + 5.0 * (index as f64 / 8.0).sin()
    }

    /// Normal distribution approximation
    fn gaussian(rng: &mut StdRng, sigma: f64) -> f64 {
        ((0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0) * sigma
    }

    /// Single satellite (G05) RINEX file. L1 carries `ambiguity` cycles,
    /// plus `slip` cycles from record `slip_index` onwards. Code noise
    /// is drawn from `rng`.
    fn synthetic_rinex(
        ambiguity: f64,
        slip: f64,
        slip_index: usize,
        noise: f64,
        rng: &mut StdRng,
    ) -> String {
        let mut content = [
            header_line("     2.11           OBSERVATION DATA    G (GPS)", "RINEX VERSION / TYPE"),
            header_line("SYNT", "MARKER NAME"),
            header_line("     4    L1    L2    P1    P2", "# / TYPES OF OBSERV"),
            header_line("  2020     6     1     0     0    0.0000000     GPS", "TIME OF FIRST OBS"),
            header_line("", "END OF HEADER"),
        ]
        .concat();

        for index in 0..RECORDS {
            let seconds = index * 30;
            content.push_str(&format!(
                " 20  6  1  0{:3}{:11.7}  0  1G05\n",
                seconds / 60,
                (seconds % 60) as f64,
            ));

            let range = 22_000_000.0 + 350.0 * index as f64;
            let tec = truth(index);
            let p1 = range + gaussian(rng, noise);
            let p2 = range + tec * SPEED_OF_LIGHT_M_NS / TECU_PER_NS + gaussian(rng, noise);

            let mut n1 = ambiguity;
            if index >= slip_index {
                n1 += slip;
            }
            let l1 = range / SPEED_OF_LIGHT_M_NS * F1_GHZ + n1;
            let l2 = F2_GHZ * (range / SPEED_OF_LIGHT_M_NS + ambiguity / F1_GHZ - tec / TECU_PER_NS);

            for value in [l1, l2, p1, p2] {
                content.push_str(&format!("{:14.3}  ", value));
            }
            content.push('\n');
        }
        content
    }

    fn decode(content: &str) -> ObservationLog {
        let table = LeapSecondTable::builtin().unwrap();
        let mut warnings = Vec::<Warning>::new();
        let log = Decoder::new(&table)
            .decode(Cursor::new(content), &mut warnings)
            .unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
        log
    }

    fn g05() -> SV {
        SV::new(Constellation::GPS, 5)
    }

    #[test]
    fn slip_detection() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let content = synthetic_rinex(1234.0, 10.0, 20, 0.0, &mut rng);
        let log = decode(&content);
        assert_eq!(log.len(), RECORDS);

        let arcs = log
            .arcs(&g05())
            .iter()
            .map(|arc| (arc.start, arc.end))
            .collect::<Vec<_>>();
        assert_eq!(arcs, vec![(0, 20), (20, RECORDS)]);

        // both arcs calibrated independently
        for (index, (_, tec)) in log.tec_iter(&g05()).enumerate() {
            assert!((tec - truth(index)).abs() < 0.05, "@{}: {}", index, tec);
        }
    }

    #[test]
    fn slip_under_threshold() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        // 1 cycle is about 1.8 TECU
        let content = synthetic_rinex(1234.0, 1.0, 20, 0.0, &mut rng);
        let log = decode(&content);
        assert_eq!(log.arcs(&g05()).len(), 1);
    }

    #[test]
    fn calibration_stability() {
        let mut calibrated = Vec::<Vec<f64>>::new();

        for ambiguity in [0.0, 1.0E4, -3.7E5] {
            let mut rng = StdRng::seed_from_u64(42);
            let content = synthetic_rinex(ambiguity, 0.0, RECORDS, 0.1, &mut rng);
            let log = decode(&content);

            let arcs = log.arcs(&g05());
            assert_eq!(arcs.len(), 1);
            assert_eq!((arcs[0].start, arcs[0].end), (0, RECORDS));

            let tec = log.tec_iter(&g05()).map(|(_, tec)| tec).collect::<Vec<_>>();
            assert_eq!(tec.len(), RECORDS);

            let bias = tec
                .iter()
                .enumerate()
                .map(|(index, tec)| tec - truth(index))
                .sum::<f64>()
                / RECORDS as f64;
            assert!(bias.abs() < 0.5, "calibration bias: {} TECU", bias);

            calibrated.push(tec);
        }

        // independent of the phase ambiguity
        for tec in calibrated.iter().skip(1) {
            for (lhs, rhs) in tec.iter().zip(&calibrated[0]) {
                assert!((lhs - rhs).abs() < 0.02);
            }
        }
    }

    #[test]
    fn custom_slip_threshold() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let content = synthetic_rinex(1234.0, 1.0, 20, 0.0, &mut rng);

        let table = LeapSecondTable::builtin().unwrap();
        let options = DecoderOptions::default()
            .with_tec(TecOptions::default().with_slip_threshold(1.0));
        let mut warnings = Vec::<Warning>::new();
        let log = Decoder::new(&table)
            .with_options(options)
            .decode(Cursor::new(content), &mut warnings)
            .unwrap();
        assert_eq!(log.arcs(&g05()).len(), 2);
    }
}
