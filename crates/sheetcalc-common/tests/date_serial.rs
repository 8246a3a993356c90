use chrono::{NaiveDate, TimeDelta};
use proptest::prelude::*;
use sheetcalc_common::{date_to_serial, pack_date, pack_time, serial_to_date, unpack_date, unpack_time};

proptest! {
    #[test]
    fn date_round_trips(serial in -200_000i64..400_000) {
        let s = serial as f64;
        let d = unpack_date(s);
        prop_assert!(d.month < 12);
        prop_assert!(d.date >= 1 && d.date <= 31);
        prop_assert_eq!(pack_date(d.year, d.month as i32, d.date as i32), s);
    }

    #[test]
    fn time_round_trips(serial in -100_000.0f64..100_000.0) {
        let frac = serial - serial.floor();
        let t = unpack_time(serial);
        let packed = pack_time(
            t.hours as f64,
            t.minutes as f64,
            t.seconds as f64,
            t.milliseconds as f64,
        );
        prop_assert!((packed - frac).abs() < 1e-8, "{} vs {}", packed, frac);
    }

    #[test]
    fn weekday_advances_daily(serial in -50_000i64..50_000) {
        let today = unpack_date(serial as f64).day;
        let tomorrow = unpack_date((serial + 1) as f64).day;
        prop_assert_eq!((today + 1) % 7, tomorrow);
    }

    #[test]
    fn chrono_round_trips_on_both_sides_of_the_epoch(days in -200_000i64..400_000, secs in 0i64..86_400) {
        let dt = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap().and_hms_opt(0, 0, 0).unwrap()
            + TimeDelta::days(days)
            + TimeDelta::seconds(secs);
        let serial = date_to_serial(&dt);
        let whole = if days > 0 { serial.floor() } else { serial.ceil() };
        prop_assert_eq!(whole as i64, days);
        prop_assert_eq!(serial_to_date(serial), Some(dt));
    }
}
