use policyrag_advisor::{clean_policy_text, parse_actions};

const POLICY: &str = "Intro text. Recommended actions: 1. Offer RET10 discount - Eligibility: tenure > 6 months 2. Escalate within 12 hours";

#[test]
fn parses_numbered_actions_with_eligibility() {
    let actions = parse_actions(POLICY);
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].title, "Offer RET10 discount");
    assert_eq!(actions[0].details, "Offer RET10 discount");
    assert_eq!(actions[0].eligibility, "tenure > 6 months");
    assert_eq!(actions[1].details, "Escalate within 12 hours");
    assert_eq!(actions[1].eligibility, "");
}

#[test]
fn preamble_is_dropped_case_insensitively() {
    let cleaned = clean_policy_text("Header\nRECOMMENDED ACTIONS:\n1. Call the customer");
    assert_eq!(cleaned, "1. Call the customer");
}

#[test]
fn bullets_and_line_breaks_are_normalized() {
    let raw = "Recommended actions:\n1. Plan Upgrade\n○ free month\n• priority line\n2. Premium Support add-on";
    let actions = parse_actions(raw);
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].details, "Plan Upgrade - free month - priority line");
    assert_eq!(actions[0].title, "Plan Upgrade");
    assert_eq!(actions[1].title, "Premium Support add");
}

#[test]
fn decimals_inside_sentences_do_not_split() {
    let actions = parse_actions("1. Offer 10.5 percent off for 3 months 2. Check line quality");
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].details, "Offer 10.5 percent off for 3 months");
}

#[test]
fn text_without_markers_is_one_action() {
    let actions = parse_actions("Maintain engagement through newsletters and loyalty benefits.");
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].eligibility, "");
}

#[test]
fn empty_segments_are_dropped() {
    assert!(parse_actions("").is_empty());
    assert!(parse_actions("   \n ").is_empty());
    assert!(parse_actions("1. 2. - Eligibility: everyone").is_empty());
    assert_eq!(parse_actions("1. 2. Real action 3.").len(), 1);
}

#[test]
fn reparsing_a_reconstructed_action_is_stable() {
    for action in parse_actions(POLICY) {
        let rebuilt = if action.eligibility.is_empty() {
            action.details.clone()
        } else {
            format!("{} Eligibility: {}", action.details, action.eligibility)
        };
        let again = parse_actions(&rebuilt);
        assert_eq!(again.len(), 1, "{rebuilt}");
        assert_eq!(again[0].details, action.details);
        assert_eq!(again[0].eligibility, action.eligibility);
    }
}
