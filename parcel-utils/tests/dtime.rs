use parcel_utils::DayTime;

#[test]
fn test_parse_spellings() {
    let compact: DayTime = "800".parse().unwrap();
    let padded: DayTime = "0800".parse().unwrap();
    let colon: DayTime = "8:00".parse().unwrap();
    assert_eq!(compact, DayTime::from_hms(8, 0, 0));
    assert_eq!(compact, padded);
    assert_eq!(compact, colon);

    let afternoon: DayTime = "16:45".parse().unwrap();
    assert_eq!(afternoon, DayTime::from_hms(16, 45, 0));
    let with_seconds: DayTime = "9:30:15".parse().unwrap();
    assert_eq!(with_seconds, DayTime::from_hms(9, 30, 15));
}

#[test]
fn test_parse_rejects_out_of_range() {
    assert!("2500".parse::<DayTime>().is_err());
    assert!("12:61".parse::<DayTime>().is_err());
    assert!("24:01".parse::<DayTime>().is_err());
    assert!("not a time".parse::<DayTime>().is_err());
    assert!("1:2:3:4".parse::<DayTime>().is_err());
}

#[test]
fn test_display() {
    assert_eq!(DayTime::from_hms(8, 5, 0).to_string(), "08:05");
    assert_eq!(DayTime::from_hms(20, 0, 0).to_string(), "20:00");
    assert_eq!(DayTime::from_hms(9, 6, 40).to_string(), "09:06:40");
}

#[test]
fn test_arithmetic() {
    let start = DayTime::from_hms(8, 0, 0);
    // 2 miles at 18 mph is 6 minutes 40 seconds of driving
    let arrival = start + DayTime::from_hours(2.0 / 18.0);
    assert_eq!(arrival, DayTime::from_hms(8, 6, 40));

    assert_eq!(arrival - start, DayTime::from_hours(2.0 / 18.0));
    // subtraction saturates at midnight
    assert_eq!(DayTime::MIDNIGHT - start, DayTime::MIDNIGHT);
    assert_eq!(start + DayTime::from_minutes(1), DayTime::from_hms(8, 1, 0));
}

#[test]
fn test_serde_as_string() {
    let t = DayTime::from_hms(10, 30, 0);
    let json = serde_json::to_string(&t).unwrap();
    assert_eq!(json, "\"10:30\"");
    let back: DayTime = serde_json::from_str(&json).unwrap();
    assert_eq!(back, t);

    let compact: DayTime = serde_json::from_str("\"1030\"").unwrap();
    assert_eq!(compact, t);
}
