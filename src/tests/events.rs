#[cfg(test)]
mod test {
    use crate::{
        prelude::*,
        tests::toolkit::{builtin_table, decode_str, header_line, standard_header, sv},
    };
    use std::{io::Cursor, str::FromStr};

    /*
     * One epoch line, time given in seconds past 2021-01-01 00:00
     */
    fn epoch_line(seconds: u32, flag: u8, satellites: &[&str]) -> String {
        format!(
            " 21  1  1  0{:3}{:11.7}{:3}{:3}{}\n",
            seconds / 60,
            (seconds % 60) as f64,
            flag,
            satellites.len(),
            satellites.concat()
        )
    }

    /*
     * One observation line: L1 L2 C1 P1 P2, biased by `offset` cycles
     */
    fn observations(offset: f64) -> String {
        [
            110_000_000.0 + offset,
            85_000_000.0 + offset,
            21_000_000.0,
            21_000_000.0,
            21_000_005.0,
        ]
        .iter()
        .map(|value| format!("{:14.3}  ", value))
        .collect::<String>()
        .trim_end()
        .to_string()
            + "\n"
    }

    fn record(seconds: u32, flag: u8, satellites: &[&str]) -> String {
        let mut content = epoch_line(seconds, flag, satellites);
        for _ in satellites {
            content.push_str(&observations(0.0));
        }
        content
    }

    #[test]
    fn power_failure() {
        let content = [
            standard_header("GPS"),
            record(0, 0, &["G01", "G02"]),
            record(30, 1, &["G01", "G02"]),
            record(60, 0, &["G01"]),
        ]
        .concat();

        let options = DecoderOptions::default()
            .with_tec(TecOptions::default().with_min_good_records(1));
        let (log, warnings) = decode_str(&content, options);
        assert_eq!(log.len(), 3);
        assert!(!log.get(0).unwrap().power_failure);
        assert!(log.get(1).unwrap().power_failure);
        assert!(!log.get(2).unwrap().power_failure);
        assert!(warnings.is_empty(), "{:?}", warnings);

        let ranges = |desc: &str| -> Vec<(usize, usize)> {
            log.arcs(&sv(desc))
                .iter()
                .map(|arc| (arc.start, arc.end))
                .collect()
        };
        assert_eq!(ranges("G01"), vec![(0, 1), (1, 3)]);
        assert_eq!(ranges("G02"), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn cycle_slip_records() {
        let content = [
            standard_header("GPS"),
            record(0, 0, &["G01", "G02"]),
            record(30, 0, &["G01", "G02"]),
            // payload is skipped
            epoch_line(30, 6, &["G02"]),
            observations(1.0),
            record(60, 0, &["G01", "G02"]),
            record(90, 0, &["G01", "G02"]),
        ]
        .concat();

        let options = DecoderOptions::default()
            .with_tec(TecOptions::default().with_min_good_records(1));
        let (log, warnings) = decode_str(&content, options);
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(log.len(), 4);

        let arcs = log.arcs(&sv("G01"));
        assert_eq!(arcs.len(), 1);
        assert_eq!((arcs[0].start, arcs[0].end), (0, 4));

        let arcs = log.arcs(&sv("G02"));
        assert_eq!(arcs.len(), 2);
        assert_eq!((arcs[0].start, arcs[0].end), (0, 2));
        assert_eq!((arcs[1].start, arcs[1].end), (2, 4));

        // slip records do not count as observations
        let counts = log.observation_counts();
        let l1 = Observable::from_str("L1").unwrap();
        assert_eq!(counts.get(&sv("G02")).unwrap().get(&l1), Some(&4));
    }

    #[test]
    fn antenna_motion() {
        let content = [
            standard_header("GPS"),
            record(0, 0, &["G01"]),
            epoch_line(30, 2, &[]).replace("  0\n", "  1\n"),
            header_line("antenna moved to pillar 2", "COMMENT"),
            record(30, 0, &["G01"]),
            record(60, 0, &["G01"]),
            epoch_line(90, 3, &[]),
            record(90, 0, &["G01"]),
        ]
        .concat();

        let (log, _) = decode_str(&content, DecoderOptions::default());
        assert_eq!(log.len(), 4);
        let motion: Vec<bool> = log.records().iter().map(|r| r.in_motion).collect();
        assert_eq!(motion, vec![false, true, true, false]);

        // empty blocks are not accounted for
        assert_eq!(log.header_blocks(), 2);
        let comments = log.header().entries(Field::Comment);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].record, 1);
        assert!(comments[0].epoch.is_none());

        let badness = log.badness(1, &sv("G01"));
        assert_eq!(badness, log.tec_options().badness.in_motion);
        assert_eq!(log.badness(3, &sv("G01")), 0);
    }

    #[test]
    fn external_event() {
        let content = [
            standard_header("GPS"),
            record(0, 0, &["G01"]),
            epoch_line(45, 5, &[]).replace("  0\n", "  1\n"),
            header_line("trigger received", "COMMENT"),
            record(60, 0, &["G01"]),
        ]
        .concat();

        let (log, _) = decode_str(&content, DecoderOptions::default());
        assert_eq!(log.len(), 2);

        let comments = log.header().entries(Field::Comment);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].record, 1);
        let epoch = comments[0].epoch.unwrap();
        assert_eq!(epoch.to_string(), "2021-01-01 00:00:45.000000 GPS");
    }

    #[test]
    fn header_block_updates() {
        let content = [
            standard_header("GPS"),
            record(0, 0, &["G01"]),
            epoch_line(30, 4, &[]).replace("  0\n", "  2\n"),
            header_line("     2    L1    L2", "# / TYPES OF OBSERV"),
            header_line("BRU2", "MARKER NAME"),
            epoch_line(30, 0, &["G01"]),
            format!("{:14.3}  {:14.3}\n", 1.0, 2.0),
        ]
        .concat();

        let (log, _) = decode_str(&content, DecoderOptions::default());
        assert_eq!(log.len(), 2);
        assert_eq!(log.header().observables_at(0).unwrap().len(), 5);
        assert_eq!(log.header().observables_at(1).unwrap().len(), 2);
        assert_eq!(log.header().marker_name_at(0), Some("BRUX"));
        assert_eq!(log.header().marker_name_at(1), Some("BRU2"));

        let record = log.get(1).unwrap();
        assert_eq!(record.value(&sv("G01"), "L2"), Some(2.0));
        assert_eq!(record.value(&sv("G01"), "C1"), None);
    }

    #[test]
    fn unknown_event_flag() {
        let content = [
            standard_header("GPS"),
            record(0, 0, &["G01"]),
            epoch_line(30, 9, &[]),
            record(60, 0, &["G01"]),
        ]
        .concat();

        let (log, warnings) = decode_str(&content, DecoderOptions::default());
        assert_eq!(log.len(), 2);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnknownEventFlag { flag, .. } if flag == "9")));
    }

    #[test]
    fn malformed_epoch() {
        let content = [
            standard_header("GPS"),
            record(0, 0, &["G01"]),
            record(30, 0, &["G01"]).replace(" 21  1  1  0  0", " 21 13  1  0  0"),
            record(60, 0, &["G01"]),
        ]
        .concat();

        let (log, warnings) = decode_str(&content, DecoderOptions::default());
        assert_eq!(log.len(), 2);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::MalformedEpoch { .. })));
    }

    #[test]
    fn missing_observables() {
        let content = [
            header_line("     2.11           OBSERVATION DATA    G (GPS)", "RINEX VERSION / TYPE"),
            header_line("BRUX", "MARKER NAME"),
            header_line("", "END OF HEADER"),
            record(0, 0, &["G01"]),
        ]
        .concat();

        let table = builtin_table();
        let mut warnings = Vec::<Warning>::new();
        let result = Decoder::new(&table).decode(Cursor::new(content), &mut warnings);
        assert!(matches!(result, Err(Error::MissingObservables(4))));
    }

    #[test]
    fn not_observation_data() {
        let content = [
            header_line("     2.11           NAVIGATION DATA     G (GPS)", "RINEX VERSION / TYPE"),
            header_line("", "END OF HEADER"),
        ]
        .concat();

        let table = builtin_table();
        let mut warnings = Vec::<Warning>::new();
        let result = Decoder::new(&table).decode(Cursor::new(content), &mut warnings);
        assert!(matches!(result, Err(Error::NotObservationData(_))));
    }

    #[test]
    fn unsupported_crinex_revision() {
        let content = [
            header_line("3.0                 COMPACT RINEX FORMAT", "CRINEX VERS   / TYPE"),
            standard_header("GPS"),
        ]
        .concat();

        let table = builtin_table();
        let mut warnings = Vec::<Warning>::new();
        let result = Decoder::new(&table).decode(Cursor::new(content), &mut warnings);
        assert!(matches!(result, Err(Error::CrinexVersion(_))));
    }
}
