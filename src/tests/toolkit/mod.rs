use crate::prelude::*;
use std::io::Cursor;

/* Observation log dedicated tools */
mod observation;
pub use observation::{check_observables, check_same_records, sv};

/*
 * Formats one 80 column header line
 */
pub fn header_line(content: &str, label: &str) -> String {
    format!("{:<60}{:<20}\n", content, label)
}

/*
 * Minimal GPS observation header, TIME OF FIRST OBS expressed in `system`
 * (blank for none), without END OF HEADER
 */
pub fn header_lines(system: &str) -> String {
    [
        header_line("     2.11           OBSERVATION DATA    G (GPS)", "RINEX VERSION / TYPE"),
        header_line("teqc  2019Feb25     ROB                 20210102 00:04:02UTC", "PGM / RUN BY / DATE"),
        header_line("BRUX", "MARKER NAME"),
        header_line("  4027881.8478   306998.2610  4919498.6554", "APPROX POSITION XYZ"),
        header_line("     1     1", "WAVELENGTH FACT L1/2"),
        header_line("     5    L1    L2    C1    P1    P2", "# / TYPES OF OBSERV"),
        header_line(
            &format!("  2021     1     1     0     0    0.0000000     {}", system),
            "TIME OF FIRST OBS",
        ),
    ]
    .concat()
}

/*
 * Complete header, see [header_lines]
 */
pub fn standard_header(system: &str) -> String {
    format!("{}{}", header_lines(system), header_line("", "END OF HEADER"))
}

/*
 * Path to a test resource
 */
pub fn test_resource(name: &str) -> String {
    format!("{}/test_resources/OBS/V2/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/*
 * Routes debug traces to the test output (RUST_LOG=debug)
 */
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn builtin_table() -> LeapSecondTable {
    LeapSecondTable::builtin().unwrap()
}

/*
 * Decodes in memory content, collecting warnings
 */
pub fn decode_str(content: &str, options: DecoderOptions) -> (ObservationLog, Vec<Warning>) {
    init_logger();
    let table = builtin_table();
    let mut warnings = Vec::<Warning>::new();
    let log = Decoder::new(&table)
        .with_options(options)
        .decode(Cursor::new(content), &mut warnings)
        .unwrap();
    (log, warnings)
}

/*
 * Decodes a test resource, collecting warnings
 */
pub fn decode_resource(name: &str) -> (ObservationLog, Vec<Warning>) {
    init_logger();
    let table = builtin_table();
    let mut warnings = Vec::<Warning>::new();
    let log = Decoder::new(&table)
        .decode_file(test_resource(name), &mut warnings)
        .unwrap_or_else(|e| panic!("failed to decode {}: {}", name, e));
    (log, warnings)
}
