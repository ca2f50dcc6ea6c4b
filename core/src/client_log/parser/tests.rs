use super::*;

// parse_line: area enter

#[test]
fn test_parse_map_enter() {
    let input = "2024/12/26 22:24:09 123456789 3ef94f1a [DEBUG Client 1234] Generating level 80 area \"MapAugury\" with seed 2890825190";
    let result = LogParser::parse_line(input);

    let Some(LogEvent::AreaEntered(area)) = result else {
        panic!("expected AreaEntered, got {:?}", result);
    };
    assert_eq!(area.area_level, 80);
    assert_eq!(area.area_name, "MapAugury");
    assert_eq!(area.seed, Some(2890825190));
    assert!(area.is_map());
    assert_eq!(
        area.timestamp,
        chrono::NaiveDate::from_ymd_opt(2024, 12, 26)
            .unwrap()
            .and_hms_opt(22, 24, 9)
            .unwrap()
    );
}

#[test]
fn test_parse_hideout_enter_without_seed() {
    let input = "2024/12/26 22:20:00 123 abc [DEBUG Client 1234] Generating level 1 area \"HideoutFelled\"";
    let result = LogParser::parse_line(input);

    let Some(LogEvent::AreaEntered(area)) = result else {
        panic!("expected AreaEntered, got {:?}", result);
    };
    assert_eq!(area.area_name, "HideoutFelled");
    assert_eq!(area.seed, None);
    assert!(!area.is_map());
}

#[test]
fn test_parse_town_enter_seed_one() {
    let input = "2024/12/26 22:20:00 123 abc [DEBUG Client 1234] Generating level 60 area \"G1_town\" with seed 1";
    let Some(LogEvent::AreaEntered(area)) = LogParser::parse_line(input) else {
        panic!("expected AreaEntered");
    };
    assert_eq!(area.seed, Some(1));
    assert!(!area.is_map());
}

#[test]
fn test_parse_area_enter_case_insensitive() {
    let input = "2024/12/26 22:24:09 123 abc [DEBUG Client 1] GENERATING LEVEL 80 AREA \"MapAugury\" WITH SEED 42";
    let Some(LogEvent::AreaEntered(area)) = LogParser::parse_line(input) else {
        panic!("expected AreaEntered");
    };
    assert_eq!(area.area_level, 80);
    assert_eq!(area.seed, Some(42));
}

#[test]
fn test_area_enter_with_empty_name_is_not_an_event() {
    let input = "2024/12/26 22:24:09 123 abc Generating level 80 area \"\" with seed 42";
    // falls through to interaction evidence, not a malformed area event
    assert!(matches!(
        LogParser::parse_line(input),
        Some(LogEvent::Interaction { .. })
    ));
}

// parse_line: post-load marker

#[test]
fn test_parse_post_load_marker() {
    let input = "2024/12/26 22:24:21 123456789 3ef94f1a [SHADER] Delay: 12ms";
    let result = LogParser::parse_line(input);
    assert!(matches!(result, Some(LogEvent::LoadComplete { .. })));
}

#[test]
fn test_post_load_marker_case_insensitive() {
    let input = "2024/12/26 22:24:21 123 abc [Shader] delay: 3ms";
    assert!(matches!(
        LogParser::parse_line(input),
        Some(LogEvent::LoadComplete { .. })
    ));
}

// parse_line: interaction evidence and rejects

#[test]
fn test_plain_line_is_interaction_evidence() {
    let input = "2024/12/26 22:25:33 9876 1ab [INFO Client 1234] : You have entered Ziggurat Encampment.";
    let result = LogParser::parse_line(input);

    let Some(LogEvent::Interaction { timestamp }) = result else {
        panic!("expected Interaction, got {:?}", result);
    };
    assert_eq!(
        timestamp,
        chrono::NaiveDate::from_ymd_opt(2024, 12, 26)
            .unwrap()
            .and_hms_opt(22, 25, 33)
            .unwrap()
    );
}

#[test]
fn test_line_without_timestamp_is_no_event() {
    assert_eq!(LogParser::parse_line("***** LOG FILE OPENING *****"), None);
    assert_eq!(LogParser::parse_line(""), None);
}

#[test]
fn test_garbage_timestamp_is_no_event() {
    assert_eq!(
        LogParser::parse_line("2024/13/99 99:99:99 not a real moment"),
        None
    );
    assert_eq!(
        LogParser::parse_line("2024-12-26 22:25:33 wrong separators"),
        None
    );
}

// is_area_enter (bootstrap backward scan)

#[test]
fn test_is_area_enter() {
    assert!(LogParser::is_area_enter(
        "2024/12/26 22:24:09 1 a Generating level 80 area \"MapAugury\" with seed 7"
    ));
    assert!(!LogParser::is_area_enter(
        "2024/12/26 22:24:21 1 a [SHADER] Delay: 12ms"
    ));
    assert!(!LogParser::is_area_enter("no timestamp here"));
}
