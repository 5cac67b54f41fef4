//! Property-based tests for command line tokenization

use pidone::exec::{run, tokenize, MAX_TOKENS};
use pidone::Error;
use proptest::prelude::*;

fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./=-]{1,12}"
}

proptest! {
    #[test]
    fn test_tokenize_doesnt_panic(s in "\\PC*") {
        let _ = tokenize(&s);
    }

    #[test]
    fn test_plain_words_round_trip(
        words in prop::collection::vec(word(), 1..=MAX_TOKENS),
        gaps in prop::collection::vec(" {1,3}|\t", MAX_TOKENS),
    ) {
        let mut command = String::new();
        for (i, w) in words.iter().enumerate() {
            command.push_str(&gaps[i]);
            command.push_str(w);
        }

        let argv = tokenize(&command).unwrap();
        prop_assert_eq!(argv.tokens(), words.as_slice());
        prop_assert_eq!(argv.to_exec_argv().unwrap().len(), words.len());
    }

    #[test]
    fn test_one_quoted_token_with_spaces(
        words in prop::collection::vec(word(), 1..MAX_TOKENS),
        inner in prop::collection::vec(word(), 1..5),
        position in any::<prop::sample::Index>(),
        double in any::<bool>(),
    ) {
        let quote = if double { '"' } else { '\'' };
        let quoted = inner.join(" ");
        let at = position.index(words.len() + 1);

        let mut expected = words.clone();
        expected.insert(at, quoted.clone());

        let mut parts = words.clone();
        parts.insert(at, format!("{}{}{}", quote, quoted, quote));

        let argv = tokenize(&parts.join(" ")).unwrap();
        prop_assert_eq!(argv.tokens(), expected.as_slice());
    }

    #[test]
    fn test_too_many_tokens_rejected(
        words in prop::collection::vec(word(), (MAX_TOKENS + 1)..40),
    ) {
        let command = words.join(" ");
        let is_overflow = matches!(tokenize(&command), Err(Error::ArgumentOverflow { .. }));
        prop_assert!(is_overflow);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_overflow_never_spawns(extra in (MAX_TOKENS + 1)..24usize) {
        // `touch` would leave a trace if a process were ever started
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("spawned");
        let mut words = vec!["touch".to_string(), target.display().to_string()];
        words.extend((words.len()..extra).map(|i| format!("pad{}", i)));

        prop_assert_eq!(run(&words.join(" ")), 1);
        prop_assert!(!target.exists());
    }
}
