use std::fs::File;
use std::io::Write;

use motion_config::{ScenarioEvent, load_scenario_csv, scenario_from_reader};
use rstest::rstest;
use tempfile::tempdir;

const HEADER: &str = "at_ms,event,lat,lon,ax,ay,az\n";

#[rstest]
fn loads_scenario_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("walk.csv");
    let mut f = File::create(&path).unwrap();
    write!(
        f,
        "{HEADER}0,last_known,52.52,13.405,,,\n0,start,,,,,\n20000,accel,,,0.1,0.2,11.5\n21000,location,52.5201,13.405,,,\n"
    )
    .unwrap();

    let rows = load_scenario_csv(&path).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].event, ScenarioEvent::LastKnown);
    assert_eq!(rows[0].position(), Some((52.52, 13.405)));
    assert_eq!(rows[1].event, ScenarioEvent::Start);
    assert_eq!(rows[1].position(), None);
    assert_eq!(rows[2].acceleration(), Some((0.1, 0.2, 11.5)));
    assert_eq!(rows[3].at_ms, 21_000);
}

#[rstest]
fn all_event_names_parse() {
    let csv = format!(
        "{HEADER}0,start,,,,,\n1,stop,,,,,\n2,fully_stopped,,,,,\n3,significant,,,,,\n4,debug_motion,,,,,\n"
    );
    let rows = scenario_from_reader(csv.as_bytes()).unwrap();
    let events: Vec<_> = rows.iter().map(|r| r.event).collect();
    assert_eq!(
        events,
        vec![
            ScenarioEvent::Start,
            ScenarioEvent::Stop,
            ScenarioEvent::FullyStopped,
            ScenarioEvent::Significant,
            ScenarioEvent::DebugMotion,
        ]
    );
}

#[rstest]
fn rejects_wrong_headers() {
    let err = scenario_from_reader("time,event\n0,start\n".as_bytes()).unwrap_err();
    assert!(format!("{err}").contains("headers"));
}

#[rstest]
#[case("10,start,,,,,\n5,stop,,,,,\n", "back in time")]
#[case("0,location,52.0,,,,\n", "needs lat and lon")]
#[case("0,last_known,95.0,13.0,,,\n", "out-of-range")]
#[case("0,accel,,,0.0,,9.8\n", "needs ax, ay and az")]
#[case("0,teleport,,,,,\n", "invalid scenario row 2")]
fn rejects_bad_rows(#[case] body: &str, #[case] needle: &str) {
    let csv = format!("{HEADER}{body}");
    let err = scenario_from_reader(csv.as_bytes()).unwrap_err();
    assert!(format!("{err}").contains(needle), "error was: {err}");
}

#[rstest]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let err = load_scenario_csv(&dir.path().join("nope.csv")).unwrap_err();
    assert!(format!("{err}").contains("open scenario CSV"));
}
