//! End-to-end tests: archive database in, status file out.

use chrono::{FixedOffset, Utc};
use rusqlite::{params, Connection};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use tempfile::tempdir;

use wxnow::plugin::{dispatch_events, Dispatch, HostInfo, WeatherService};
use wxnow::{Observation, ObservationEvent, SqliteArchive, UnitSystem, WxNow, WxNowConfig, WxNowService};

// 2023-11-14 22:13:20 UTC
const TS: i64 = 1_700_000_000;

/// Create a station archive at `path` with metric (cm) rain records.
fn create_archive(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE archive (
            dateTime    INTEGER NOT NULL UNIQUE PRIMARY KEY,
            usUnits     INTEGER NOT NULL,
            interval    INTEGER NOT NULL,
            rain        REAL
        );",
    )
    .unwrap();
    let records = [
        (TS - 86400, 3.2), // just outside 24 hours
        (TS - 86000, 1.6), // yesterday, within 24 hours
        (TS - 50000, 0.8), // today
        (TS - 3600, 0.4),  // just outside the hour
        (TS - 3000, 0.2),
        (TS - 600, 0.1),
    ];
    for (ts, rain) in records {
        conn.execute(
            "INSERT INTO archive (dateTime, usUnits, interval, rain) VALUES (?1, 16, 5, ?2)",
            params![ts, rain],
        )
        .unwrap();
    }
}

fn metric_observation() -> Observation {
    Observation::new(TS, UnitSystem::Metric)
        .with("windDir", 45.6)
        .with("windSpeed", 10.0)
        .with("windGust", 30.0)
        .with("outTemp", -5.0)
        .with("outHumidity", 100.0)
        .with("barometer", 1020.5)
}

#[test]
fn rain_windows_come_from_archive() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("weewx.sdb");
    create_archive(&db);

    let config = WxNowConfig {
        filename: dir.path().join("wxnow.txt"),
        database: db.clone(),
        ..WxNowConfig::default()
    };
    let archive = SqliteArchive::open(&db, &config.table).unwrap();
    let service = WxNow::with_archive(&config, archive, Utc);

    let outcome = service.handle_event(&ObservationEvent::LoopPacket(metric_observation()));
    assert_eq!(outcome, Dispatch::Written);

    let text = std::fs::read_to_string(&config.filename).unwrap();
    // hour 0.3 cm, 24h 3.1 cm, day 1.5 cm
    assert_eq!(
        text,
        "Nov 14 2023 22:13\n045/006g018t023r011p122P059h000b10205\n"
    );
}

#[test]
fn day_boundary_follows_station_zone() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("weewx.sdb");
    create_archive(&db);

    let config = WxNowConfig {
        filename: dir.path().join("wxnow.txt"),
        ..WxNowConfig::default()
    };
    // At UTC+9 the day began at 15:00 UTC, after the TS - 50000 record.
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let service = WxNow::with_archive(&config, SqliteArchive::open(&db, "archive").unwrap(), tokyo);

    let text = service.process(&metric_observation()).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Nov 15 2023 07:13"));
    // day 0.7 cm
    assert!(lines.next().unwrap().contains("P027h"), "{}", text);
}

#[test]
fn repeated_observation_is_byte_identical() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("weewx.sdb");
    create_archive(&db);

    let config = WxNowConfig {
        filename: dir.path().join("wxnow.txt"),
        ..WxNowConfig::default()
    };
    let service = WxNow::with_archive(&config, SqliteArchive::open(&db, "archive").unwrap(), Utc);

    service.handle_data(&metric_observation());
    let first = std::fs::read(&config.filename).unwrap();
    service.handle_data(&metric_observation());
    let second = std::fs::read(&config.filename).unwrap();
    assert_eq!(first, second);
}

#[test]
fn runner_feeds_service_from_event_stream() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("weewx.sdb");
    create_archive(&db);

    let config = WxNowConfig {
        filename: dir.path().join("wxnow.txt"),
        binding: "archive".to_string(),
        database: db,
        ..WxNowConfig::default()
    };
    let mut service = WxNowService::new(&HostInfo::new("4.10.2"), config.clone()).unwrap();

    // dayRain is carried by the record so the output does not depend on
    // the machine's local midnight.
    let input = format!(
        "{}\n{}\n{}\n",
        r#"{"event": "loop", "data": {"dateTime": 1700000000, "usUnits": 16, "outTemp": 40.0}}"#,
        r#"{"event": "archive", "data": {"dateTime": 1700000000, "usUnits": 16, "windDir": null, "outTemp": 20.0, "dayRain": 2.0, "outHumidity": 45.7}}"#,
        r#"{"event": "archive", "data": {"usUnits": 16}}"#,
    );
    let summary = dispatch_events(
        &mut service,
        Cursor::new(input),
        &AtomicBool::new(false),
        &AtomicBool::new(false),
    )
    .unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(summary.ignored, 1);
    assert_eq!(summary.malformed, 1);

    let text = std::fs::read_to_string(&config.filename).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), "Nov 14 2023 22:13".len());
    assert_eq!(lines[1], "000/000g000t068r011p122P078h045b00000");
}
