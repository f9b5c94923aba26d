use super::*;

fn detail(is_repriced: bool, explained: &str) -> RepriceDetail {
    RepriceDetail {
        is_repriced,
        explained: Some(explained.to_string()),
        active: None,
    }
}

fn single(is_repriced: bool, explained: &str) -> RepriceOutcome {
    RepriceOutcome {
        reprice_details: Some(detail(is_repriced, explained)),
        list_of_reprice_details: vec![],
    }
}

fn tiers(details: Vec<RepriceDetail>) -> RepriceOutcome {
    RepriceOutcome {
        reprice_details: None,
        list_of_reprice_details: details,
    }
}

#[test]
fn missing_outcome_is_an_error() {
    assert_eq!(classify(None), Err(ClassificationError::MissingOutcome));
}

#[test]
fn empty_outcome_is_an_error() {
    let outcome = RepriceOutcome::default();
    assert_eq!(
        classify(Some(&outcome)),
        Err(ClassificationError::MissingDetail)
    );
}

#[test]
fn missing_explanation_is_an_error() {
    let outcome = RepriceOutcome {
        reprice_details: Some(RepriceDetail::default()),
        list_of_reprice_details: vec![],
    };
    assert_eq!(
        classify(Some(&outcome)),
        Err(ClassificationError::MissingExplanation)
    );
}

#[test]
fn floor_without_change_ignores_floor() {
    let outcome = single(false, "x #HitFloor");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::IgnoreFloor));
}

#[test]
fn repriced_down_is_change_down() {
    let outcome = single(true, "y $DOWN");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::ChangeDown));
}

#[test]
fn repriced_up_is_change_up() {
    let outcome = single(true, "moved $UP after competitor left");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::ChangeUp));
}

#[test]
fn repriced_down_checked_before_up() {
    let outcome = single(true, "$UP then $DOWN");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::ChangeDown));
}

#[test]
fn repriced_floor_without_direction_ignores_floor() {
    let outcome = single(true, "clamped #HitFloor");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::IgnoreFloor));
}

#[test]
fn repriced_without_marker_is_default() {
    let outcome = single(true, "changed");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::Default));
}

#[test]
fn error_422_wins_over_other_markers() {
    let outcome = single(false, "ERROR:422 #HitFloor IGNORE:#Lowest");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::Special422));

    let repriced = single(true, "ERROR:422 $DOWN");
    assert_eq!(classify(Some(&repriced)), Ok(ResultCode::Special422));
}

#[test]
fn error_422_found_in_any_tier() {
    let outcome = tiers(vec![
        detail(true, "$DOWN"),
        detail(false, "upstream ERROR:422"),
    ]);
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::Special422));
}

#[test]
fn lowest_markers_ignore_lowest() {
    for text in [
        "IGNORE:#Lowest",
        "IGNORE: #Lowest",
        "we #HasBuyBox",
        "IGNORED: Price down only #UP",
    ] {
        let outcome = single(false, text);
        assert_eq!(
            classify(Some(&outcome)),
            Ok(ResultCode::IgnoreLowest),
            "text: {text}"
        );
    }
}

#[test]
fn sister_markers_ignore_sister() {
    for text in ["IGNORE:#Sister", "IGNORE: #Sister"] {
        let outcome = single(false, text);
        assert_eq!(classify(Some(&outcome)), Ok(ResultCode::IgnoreSister));
    }
}

#[test]
fn floor_checked_before_lowest_when_unchanged() {
    let outcome = single(false, "IGNORE:#Lowest #HitFloor");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::IgnoreFloor));
}

#[test]
fn dummy_ignores_settings() {
    let outcome = single(false, "DUMMY run");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::IgnoreSettings));
}

#[test]
fn unchanged_without_marker_is_default() {
    let outcome = single(false, "nothing to do");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::Default));
}

#[test]
fn matching_is_case_sensitive() {
    let outcome = single(false, "#hitfloor dummy");
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::Default));
}

#[test]
fn deactivated_tier_is_change_up() {
    let mut deactivated = detail(false, "#HitFloor");
    deactivated.active = Some(false);
    let outcome = tiers(vec![deactivated]);
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::ChangeUp));
}

#[test]
fn deactivation_only_applies_to_tier_lists() {
    let mut deactivated = detail(false, "#HitFloor");
    deactivated.active = Some(false);
    let outcome = RepriceOutcome {
        reprice_details: Some(deactivated),
        list_of_reprice_details: vec![],
    };
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::IgnoreFloor));
}

#[test]
fn tier_list_prefers_first_repriced_entry() {
    let outcome = tiers(vec![
        detail(false, "IGNORE:#Sister"),
        detail(true, "$DOWN"),
        detail(true, "$UP"),
    ]);
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::ChangeDown));
}

#[test]
fn tier_list_falls_back_to_first_entry() {
    let outcome = tiers(vec![
        detail(false, "IGNORE:#Sister"),
        detail(false, "#HitFloor"),
    ]);
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::IgnoreSister));
}

#[test]
fn tier_list_takes_precedence_over_single_detail() {
    let outcome = RepriceOutcome {
        reprice_details: Some(detail(true, "$UP")),
        list_of_reprice_details: vec![detail(false, "DUMMY")],
    };
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::IgnoreSettings));
}

#[test]
fn deserializes_engine_payload_with_numeric_flags() {
    let json = r##"{
        "repriceDetails": {"isRepriced": 1, "explained": "ok $DOWN", "active": 1},
        "listOfRepriceDetails": [
            {"isRepriced": 0, "explained": "#HitFloor", "active": 0}
        ]
    }"##;
    let outcome: RepriceOutcome = serde_json::from_str(json).unwrap();
    assert!(outcome.reprice_details.as_ref().unwrap().is_repriced);
    assert_eq!(outcome.list_of_reprice_details[0].active, Some(false));
    assert_eq!(classify(Some(&outcome)), Ok(ResultCode::ChangeUp));
}

#[test]
fn result_code_serializes_as_screaming_snake_case() {
    assert_eq!(
        serde_json::to_string(&ResultCode::Special422).unwrap(),
        "\"SPECIAL_422\""
    );
    assert_eq!(
        serde_json::to_string(&ResultCode::IgnoreSettings).unwrap(),
        "\"IGNORE_SETTINGS\""
    );
    assert_eq!(ResultCode::ChangeDown.to_string(), "CHANGE_DOWN");
}
