//! Property-based tests for the parse/print round trip
//!
//! Documents are generated two ways: from a small grammar of well-formed
//! fragments, and as arbitrary strings over an alphabet dense in special
//! characters. Whenever the input parses, printing and re-parsing it must
//! give back an equal tree.

use lozenge_core::{parse, render, tokenize, Token};
use proptest::prelude::*;

fn text_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z ]{1,8}",
        1 => Just("\n".to_string()),
        1 => Just("\n\n\n".to_string()),
        1 => Just("\r\n".to_string()),
        1 => Just("\\◊".to_string()),
        1 => Just("\\§".to_string()),
        1 => Just("\\\n".to_string()),
        1 => Just("{".to_string()),
        1 => Just("}".to_string()),
    ]
}

fn properties_literal() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("{}".to_string()),
        (0i64..1000).prop_map(|n| format!("{{n: {}}}", n)),
        "[a-z]{0,5}".prop_map(|s| format!("{{s: '{}', list: [1, 2,], }}", s)),
        Just("{a: 1, b: {c: [true, null]}, 'd': \"}\", e: -2.5}".to_string()),
    ]
}

/// Well-formed documents: every scope is closed, every brace balanced.
fn document() -> impl Strategy<Value = String> {
    let leaf = prop::collection::vec(text_fragment(), 0..6).prop_map(|parts| parts.concat());
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop::collection::vec(
            prop_oneof![
                3 => text_fragment(),
                // A bare command ends at a space or at an empty scope, which
                // may sit right before the closing marker of its parent.
                1 => ("[a-z]{1,6}", properties_literal(), prop_oneof![Just(" "), Just("§§")])
                    .prop_map(|(id, props, end)| format!("◊{}{}{}", id, props, end)),
                2 => ("[a-z]{1,6}", properties_literal(), inner)
                    .prop_map(|(id, props, body)| format!("◊{}{}§{}§", id, props, body)),
            ],
            0..6,
        )
        .prop_map(|parts| parts.concat())
    })
}

proptest! {
    #[test]
    fn well_formed_documents_round_trip(input in document()) {
        let doc = parse(&input).unwrap();
        let printed = render(&doc);
        let reparsed = parse(&printed).unwrap();
        prop_assert_eq!(reparsed, doc);
    }

    #[test]
    fn printing_is_idempotent(input in document()) {
        let once = render(&parse(&input).unwrap());
        let twice = render(&parse(&once).unwrap());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn arbitrary_input_round_trips_when_it_parses(input in "[ab◊§{}:1,'\\\\\n\r ]{0,40}") {
        if let Ok(doc) = parse(&input) {
            let printed = render(&doc);
            let reparsed = parse(&printed);
            prop_assert!(reparsed.is_ok(), "reparse of {:?} failed", printed);
            prop_assert_eq!(reparsed.unwrap(), doc);
        }
    }

    #[test]
    fn newlines_never_repeat(input in "[a◊§\n\r ]{0,40}") {
        // No braces in the alphabet, so tokenizing cannot fail.
        let tokens = tokenize(&input).unwrap();
        for pair in tokens.windows(2) {
            prop_assert!(!(pair[0] == Token::Newline && pair[1] == Token::Newline));
        }
    }
}
