//! Line classification for raw job log output.
//!
//! The monitored job writes its diagnostic counters interleaved with
//! arbitrary log output, one line per module per pipeline step. Each line is
//! inspected in isolation and sorted into one of a handful of kinds; anything
//! unrecognized is discarded without comment.

use crate::utils::config::{
    MEMORY_RECORD_PREFIX, RSS_LITERAL_TOKENS, RSS_TOKEN_COUNTS, TIMING_RECORD_PREFIX,
};

/// The kind of a classified log line, with its extracted fields
///
/// **Public** - consumed by `RunModel::ingest`
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Memory counter record: comma-separated fields after the prefix
    Memory(Vec<String>),

    /// Module timer record: comma-separated fields after the prefix
    Timing(Vec<String>),

    /// Out-of-band resident set size sample: whitespace-separated tokens
    Rss(Vec<String>),

    /// A recognized prefix followed by a single field. The job writes this
    /// when it has nothing more to report, so callers stop reading here.
    EndOfData,

    /// Irrelevant log output, silently discarded
    Ignore,
}

/// Classify one raw line of job log output
///
/// **Public** - main entry point for classification
///
/// Never mutates shared state and never fails: a line that matches no known
/// format is `Classified::Ignore`.
///
/// # Arguments
/// * `line` - One raw text line (a trailing newline is tolerated)
///
/// # Returns
/// The detected kind together with the split fields
pub fn classify_line(line: &str) -> Classified {
    let line = line.trim_end_matches(['\n', '\r']);

    if let Some(rest) = line.strip_prefix(TIMING_RECORD_PREFIX) {
        return classify_record(rest, Classified::Timing);
    }
    if let Some(rest) = line.strip_prefix(MEMORY_RECORD_PREFIX) {
        return classify_record(rest, Classified::Memory);
    }

    classify_rss_candidate(line)
}

/// Split a prefixed record into its comma-separated fields
///
/// **Private** - internal helper for classify_line
fn classify_record(rest: &str, make: fn(Vec<String>) -> Classified) -> Classified {
    let fields: Vec<String> = rest.split(',').map(str::to_string).collect();

    // A single field means the job has finished reporting
    if fields.len() == 1 {
        return Classified::EndOfData;
    }

    make(fields)
}

/// Check whether an untagged line matches the RSS sample format
///
/// **Private** - internal helper for classify_line
///
/// RSS samples carry no identifying prefix, so recognition is positional:
/// the token count must be exactly 13 or 15 and four fixed marker tokens
/// must appear at their expected offsets. Anything else is irrelevant
/// output from some other part of the job.
fn classify_rss_candidate(line: &str) -> Classified {
    let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();

    if !RSS_TOKEN_COUNTS.contains(&tokens.len()) {
        return Classified::Ignore;
    }

    for (index, literal) in RSS_LITERAL_TOKENS {
        if tokens[*index] != *literal {
            return Classified::Ignore;
        }
    }

    Classified::Rss(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_memory_record() {
        let line = " *MEMCOUNTER* event1,modA,TypeA,1048576,2097152,10,20";

        match classify_line(line) {
            Classified::Memory(fields) => {
                assert_eq!(fields.len(), 7);
                assert_eq!(fields[0], "event1");
                assert_eq!(fields[1], "modA");
            }
            other => panic!("expected Memory, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_timing_record() {
        let line = " *MODULETIMER* beginJob,modA,TypeA,1000,2000,3000";

        match classify_line(line) {
            Classified::Timing(fields) => {
                assert_eq!(fields.len(), 6);
                assert_eq!(fields[0], "beginJob");
            }
            other => panic!("expected Timing, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_strips_trailing_newline() {
        let line = " *MODULETIMER* event1,modA,TypeA,1,2,3\n";

        match classify_line(line) {
            Classified::Timing(fields) => assert_eq!(fields[5], "3"),
            other => panic!("expected Timing, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_end_of_data() {
        assert_eq!(classify_line(" *MEMCOUNTER* done"), Classified::EndOfData);
        assert_eq!(classify_line(" *MODULETIMER* "), Classified::EndOfData);
    }

    #[test]
    fn test_classify_requires_exact_prefix() {
        // Missing the leading space, so not a recognized record
        assert_eq!(
            classify_line("*MEMCOUNTER* event1,modA,TypeA,1,2,3,4"),
            Classified::Ignore
        );
    }

    #[test]
    fn test_classify_rss_sample() {
        let line = "x x x x x x mem 5120 kb pid 123 node host1 y z";
        assert_eq!(line.split_whitespace().count(), 15);

        match classify_line(line) {
            Classified::Rss(tokens) => assert_eq!(tokens[7], "5120"),
            other => panic!("expected Rss, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_rss_thirteen_tokens() {
        let line = "x x x x x x mem 1024 kb pid 123 node host1";
        assert_eq!(line.split_whitespace().count(), 13);

        assert!(matches!(classify_line(line), Classified::Rss(_)));
    }

    #[test]
    fn test_classify_rss_wrong_marker() {
        // Right token count, wrong literal at offset 8
        let line = "x x x x x x mem 5120 mb pid 123 node host1";
        assert_eq!(classify_line(line), Classified::Ignore);
    }

    #[test]
    fn test_classify_rss_wrong_token_count() {
        let line = "x x x x x x mem 5120 kb pid 123 node";
        assert_eq!(classify_line(line), Classified::Ignore);
    }

    #[test]
    fn test_classify_noise() {
        assert_eq!(classify_line(""), Classified::Ignore);
        assert_eq!(
            classify_line("Begin processing the 1st record"),
            Classified::Ignore
        );
    }
}
