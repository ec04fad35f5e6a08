use jobinfo_studio::parser::{classify_line, Classified};

#[test]
fn test_memory_prefix_is_stripped_and_split() {
    let line = " *MEMCOUNTER* Construction,tracker,TrackerModule,4096,8192,3,7";

    match classify_line(line) {
        Classified::Memory(fields) => {
            assert_eq!(
                fields,
                ["Construction", "tracker", "TrackerModule", "4096", "8192", "3", "7"]
            );
        }
        other => panic!("expected Memory, got {:?}", other),
    }
}

#[test]
fn test_timing_prefix_is_stripped_and_split() {
    let line = " *MODULETIMER* event12,fitter,FitterModule,100,200,300";

    match classify_line(line) {
        Classified::Timing(fields) => {
            assert_eq!(fields, ["event12", "fitter", "FitterModule", "100", "200", "300"]);
        }
        other => panic!("expected Timing, got {:?}", other),
    }
}

#[test]
fn test_memory_record_with_product_attachment_fields() {
    let line = " *MEMCOUNTER* event2,writer,WriterModule,0,0,0,0,event1,1048576";

    match classify_line(line) {
        Classified::Memory(fields) => {
            assert_eq!(fields.len(), 9);
            assert_eq!(fields[7], "event1");
            assert_eq!(fields[8], "1048576");
        }
        other => panic!("expected Memory, got {:?}", other),
    }
}

#[test]
fn test_single_field_after_prefix_signals_end_of_data() {
    assert_eq!(classify_line(" *MEMCOUNTER* "), Classified::EndOfData);
    assert_eq!(classify_line(" *MODULETIMER* finished"), Classified::EndOfData);
}

#[test]
fn test_rss_fifteen_token_line() {
    let line = "1 2 3 4 5 6 mem 10240 kb pid 4242 node worker07 8 9";
    assert_eq!(line.split_whitespace().count(), 15);

    match classify_line(line) {
        Classified::Rss(tokens) => {
            assert_eq!(tokens.len(), 15);
            assert_eq!(tokens[7], "10240");
        }
        other => panic!("expected Rss, got {:?}", other),
    }
}

#[test]
fn test_rss_thirteen_token_line() {
    let line = "1 2 3 4 5 6 mem 2048 kb pid 4242 node worker07";
    assert_eq!(line.split_whitespace().count(), 13);

    assert!(matches!(classify_line(line), Classified::Rss(_)));
}

#[test]
fn test_rss_fourteen_tokens_rejected() {
    let line = "1 2 3 4 5 6 mem 2048 kb pid 4242 node worker07 extra";
    assert_eq!(line.split_whitespace().count(), 14);

    assert_eq!(classify_line(line), Classified::Ignore);
}

#[test]
fn test_rss_marker_tokens_must_all_match() {
    // Token count is right but "pid" is missing at offset 9
    let line = "1 2 3 4 5 6 mem 2048 kb xxx 4242 node worker07";
    assert_eq!(classify_line(line), Classified::Ignore);
}

#[test]
fn test_arbitrary_log_noise_is_ignored() {
    let noise = [
        "",
        "Begin processing the 42nd record. Run 1, Event 42",
        "%MSG-i DiagnosticService: reporting nothing of interest",
        "MEMCOUNTER without the surrounding markers,a,b,c,d,e,f",
    ];

    for line in noise {
        assert_eq!(classify_line(line), Classified::Ignore, "line: {:?}", line);
    }
}

#[test]
fn test_classification_tolerates_crlf_endings() {
    match classify_line(" *MODULETIMER* event1,modA,TypeA,1,2,3\r\n") {
        Classified::Timing(fields) => assert_eq!(fields[5], "3"),
        other => panic!("expected Timing, got {:?}", other),
    }
}
