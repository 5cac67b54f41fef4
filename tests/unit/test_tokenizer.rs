//! Unit tests for command line tokenization
//!
//! Covers the command shapes boot scripts actually hand to the runners.

use pidone::exec::{tokenize, ArgumentVector, ARGV_CAPACITY, MAX_TOKENS};
use pidone::Error;

fn split(command: &str) -> Vec<String> {
    tokenize(command).unwrap().tokens().to_vec()
}

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    #[test]
    fn test_boot_commands() {
        assert_eq!(split("/sbin/fsck -C -a /"), ["/sbin/fsck", "-C", "-a", "/"]);
        assert_eq!(
            split("mount -t tmpfs -o mode=1777 tmpfs /tmp"),
            ["mount", "-t", "tmpfs", "-o", "mode=1777", "tmpfs", "/tmp"]
        );
        assert_eq!(split("hwclock -s -u"), ["hwclock", "-s", "-u"]);
    }

    #[test]
    fn test_quoted_shell_snippet() {
        let argv = tokenize("/bin/sh -c 'echo booting > /dev/kmsg'").unwrap();
        assert_eq!(argv.program(), Some("/bin/sh"));
        assert_eq!(argv.tokens()[2], "echo booting > /dev/kmsg");
    }

    #[test]
    fn test_capacity_includes_terminator() {
        assert_eq!(ARGV_CAPACITY, MAX_TOKENS + 1);
    }

    #[test]
    fn test_quoted_token_counts_once() {
        let mut words: Vec<String> = (0..MAX_TOKENS - 1).map(|i| format!("w{}", i)).collect();
        words.push("\"many words inside one token\"".to_string());
        let argv = tokenize(&words.join(" ")).unwrap();
        assert_eq!(argv.len(), MAX_TOKENS);
        assert_eq!(argv.tokens()[MAX_TOKENS - 1], "many words inside one token");
    }

    #[test]
    fn test_overflow_reports_command() {
        let command = vec!["arg"; 40].join(" ");
        match tokenize(&command) {
            Err(Error::ArgumentOverflow { command: reported, limit }) => {
                assert_eq!(reported, command);
                assert_eq!(limit, MAX_TOKENS);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_from_tokens_enforces_limit() {
        assert!(ArgumentVector::from_tokens(vec!["x"; MAX_TOKENS]).is_ok());
        assert!(matches!(
            ArgumentVector::from_tokens(vec!["x"; MAX_TOKENS + 1]),
            Err(Error::ArgumentOverflow { .. })
        ));
    }

    #[test]
    fn test_non_ascii_tokens() {
        assert_eq!(split("echo ünïcode \"ß ü\""), ["echo", "ünïcode", "ß ü"]);
    }
}
