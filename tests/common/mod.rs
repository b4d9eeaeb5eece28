//! Golden-output comparison for benchmark reports

use std::fs;
use std::path::PathBuf;

use treechurn::Report;

const REGENERATE_VAR: &str = "TREECHURN_UPDATE_SNAPSHOTS";

fn golden_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "snapshots", name]
        .iter()
        .collect()
}

fn render(report: &Report) -> String {
    let mut out = Vec::new();
    report.write_to(&mut out).expect("render report");
    String::from_utf8(out).expect("report output is utf-8")
}

/// Compare a report against `tests/snapshots/<name>`, line by line
///
/// The first differing line is named, along with both fingerprints, so a
/// mismatch in a long ladder is easy to locate.
pub fn assert_report_matches(name: &str, report: &Report) {
    let path = golden_path(name);
    let actual = render(report);

    if std::env::var_os(REGENERATE_VAR).is_some() {
        fs::write(&path, &actual).expect("write golden output");
        return;
    }

    let golden = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("golden output {} unreadable: {}", path.display(), err));
    let golden = golden.replace("\r\n", "\n");
    if golden == actual {
        return;
    }

    let expected_fp = blake3::hash(golden.as_bytes()).to_hex().to_string();
    let (line_no, want, got) = golden
        .lines()
        .map(Some)
        .chain(std::iter::repeat(None))
        .zip(report.lines().map(Some).chain(std::iter::repeat(None)))
        .take_while(|(want, got)| want.is_some() || got.is_some())
        .enumerate()
        .find(|(_, (want, got))| want != got)
        .map(|(idx, (want, got))| (idx + 1, want, got))
        .unwrap_or((0, None, None)); // only line endings differ

    panic!(
        "{} differs at line {}\n  golden: {:?}\n  actual: {:?}\n  fingerprints: golden {} / actual {}\nRerun with {}=1 to accept the new output.",
        name,
        line_no,
        want,
        got,
        expected_fp,
        report.fingerprint(),
        REGENERATE_VAR
    );
}
