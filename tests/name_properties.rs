//! Property tests for output-name sanitisation and charset encoding.

use halyard::Charset;
use halyard::render::names::NameRegistry;
use proptest::prelude::*;

fn filename_char_ok(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.' | '=')
}

fn fragment_char_ok(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

proptest! {
    #[test]
    fn filenames_are_safe_and_nonempty(input in ".{0,40}") {
        let mut names = NameRegistry::new();
        let name = names.sanitise_filename(&input);
        prop_assert!(!name.is_empty());
        prop_assert!(name.chars().all(filename_char_ok));
    }

    #[test]
    fn filenames_never_collide(inputs in prop::collection::vec(".{0,20}", 1..20)) {
        let mut names = NameRegistry::new();
        let mut seen = std::collections::HashSet::new();
        for input in &inputs {
            let name = names.sanitise_filename(input);
            prop_assert!(seen.insert(name.clone()), "duplicate filename {name}");
        }
    }

    #[test]
    fn fragments_start_with_a_letter(input in ".{0,40}") {
        let mut names = NameRegistry::new();
        let frag = names.sanitise_fragment(halyard::render::partition::FileId(0), &input);
        prop_assert!(!frag.is_empty());
        prop_assert!(frag.chars().next().unwrap().is_ascii_alphabetic());
        prop_assert!(frag.chars().all(fragment_char_ok));
    }

    #[test]
    fn fragments_never_collide_within_a_file(inputs in prop::collection::vec(".{0,20}", 1..20)) {
        use halyard::render::partition::FileId;
        let mut names = NameRegistry::new();
        let mut seen = std::collections::HashSet::new();
        for input in &inputs {
            let frag = names.sanitise_fragment(FileId(3), input);
            prop_assert!(seen.insert(frag.clone()), "duplicate fragment {frag}");
        }
    }

    #[test]
    fn ascii_encoding_is_pure_ascii(input in "\\PC{0,40}") {
        let mut out = Vec::new();
        Charset::Ascii.encode_onto(&input, &mut out);
        prop_assert!(out.is_ascii());
    }

    #[test]
    fn utf8_encoding_round_trips(input in "\\PC{0,40}") {
        let mut out = Vec::new();
        Charset::UTF8.encode_onto(&input, &mut out);
        prop_assert_eq!(out, input.into_bytes());
    }
}
