use navi_parser::{
    parse::error::{JsonPath, ParseError},
    parse_script, serialize_script, Animation, MessageGroup, MessageLine, SlideScript,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const DECK: &str = r#"{
  "slides": [
    {
      "title": "  Intro ",
      "groups": [
        "Hello there.",
        ["", "   "],
        ["Line one", { "text": " Line two ", "speaker": "Guest" }],
        { "id": "boom", "speaker": "Navi", "animation": "explosion", "lines": ["Kaboom"] }
      ]
    },
    { "messageGroups": [{ "messages": ["Second slide"] }], "transition": { "type": "immediate" } },
    { "messages": ["Only", "group"], "transition": "immediate" },
    {}
  ]
}"#;

#[test]
fn example_scenario() {
    let slides = parse_script(
        r#"{"slides":[{"title":"Intro","groups":[["Hi there."],["Welcome."]]}]}"#,
        1,
    )
    .unwrap();

    assert_eq!(
        slides,
        vec![SlideScript {
            title: Some("Intro".into()),
            message_groups: vec![
                MessageGroup::new("slide-0-group-0", [MessageLine::new("Hi there.")]),
                MessageGroup::new("slide-0-group-1", [MessageLine::new("Welcome.")]),
            ],
            ..Default::default()
        }]
    );
}

#[test]
fn normalizes_the_deck() {
    let slides = parse_script(DECK, 0).unwrap();
    assert_eq!(slides.len(), 4);

    let intro = &slides[0];
    assert_eq!(intro.title.as_deref(), Some("Intro"));
    let ids: Vec<_> = intro.message_groups.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, ["slide-0-group-0", "slide-0-group-1", "boom"]);
    assert_eq!(intro.message_groups[1].full_text(), "Line one\nLine two");
    assert_eq!(intro.message_groups[2].animation, Some(Animation::Explosion));

    assert_eq!(slides[1].message_groups[0].id, "slide-1-group-0");
    assert_eq!(slides[2].message_groups[0].full_text(), "Only\ngroup");
    assert!(slides[3].message_groups.is_empty());
}

#[test]
fn serialized_deck_parses_back() {
    let slides = parse_script(DECK, 0).unwrap();
    let text = serialize_script(&slides).unwrap();
    assert_eq!(parse_script(&text, slides.len()).unwrap(), slides);
    // A second pass is stable
    assert_eq!(serialize_script(&parse_script(&text, 0).unwrap()).unwrap(), text);
}

#[rstest]
#[case::fewer_pages(1)]
#[case::same(4)]
#[case::more_pages(9)]
fn always_matches_page_count(#[case] total_pages: usize) {
    let slides = parse_script(DECK, total_pages).unwrap();
    assert_eq!(slides.len(), total_pages);
    assert!(slides[4.min(total_pages)..]
        .iter()
        .all(|s| *s == SlideScript::default()));
}

#[rstest]
#[case::slide(r#"[1]"#, ParseError::SlideNotObject(JsonPath::slide(0)))]
#[case::group(
    r#"[{}, { "groups": [null] }]"#,
    ParseError::InvalidGroup(JsonPath::slide(1).group(0))
)]
#[case::message(
    r#"[{ "groups": ["a", ["b", { "text": "" }]] }]"#,
    ParseError::InvalidMessage(JsonPath::slide(0).group(1).message(1))
)]
#[case::transition(
    r#"[{ "transition": false }]"#,
    ParseError::InvalidTransition(JsonPath::slide(0))
)]
fn errors_name_the_path(#[case] source: &str, #[case] expected: ParseError) {
    let error = parse_script(source, 0).unwrap_err();
    assert_eq!(error.path(), expected.path());
    assert_eq!(error, expected);
}

#[test]
fn error_messages_read_well() {
    let error = parse_script(r#"[{ "groups": [["ok", 7]] }]"#, 0).unwrap_err();
    assert_eq!(
        error.to_string(),
        "slides[0].groups[0].messages[1] needs a non-empty `text` string"
    );
}
