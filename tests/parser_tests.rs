use disk_trace_studio::correlator::rwbs_title;
use disk_trace_studio::parser::{DiskEvent, DispatchTable, FieldPatterns, LineTokenizer};
use disk_trace_studio::utils::DiskEventError;

#[test]
fn test_dispatch_ignores_other_tracepoints() {
    let table = DispatchTable::new();
    for name in ["sched_switch", "cpu_idle", "block_rq_insert", "ext4_da_write_begin"] {
        assert_eq!(table.lookup(name), None);
    }
    assert_eq!(table.lookup("ext4_sync_file_exit"), Some(DiskEvent::Ext4SyncFileExit));
}

#[test]
fn test_tokenized_payload_feeds_field_patterns() {
    let tokenizer = LineTokenizer::new().unwrap();
    let patterns = FieldPatterns::new().unwrap();
    let line = tokenizer
        .tokenize(
            1,
            "ContactsProvide-1184 [000] ...1 66.613733: f2fs_write_end: \
             dev = (253,2), ino = 3342, pos = 0, len = 75, copied = 75",
        )
        .unwrap()
        .unwrap();

    let event = DispatchTable::new().lookup(&line.event_name).unwrap();
    let fields = patterns.extract(event, &line.args).unwrap();
    assert_eq!(fields.text("dev").unwrap(), "253,2");
    assert_eq!(fields.number::<u64>("copied").unwrap(), 75);
}

#[test]
fn test_ext4_exit_with_f2fs_layout_is_malformed() {
    let patterns = FieldPatterns::new().unwrap();
    let err = patterns
        .extract(
            DiskEvent::Ext4SyncFileExit,
            "dev = (259,14), ino = 4882, checkpoint is not needed, ret = 0",
        )
        .unwrap_err();

    assert!(matches!(err, DiskEventError::MalformedPayload { .. }));
    assert!(err.to_string().starts_with("ext4_sync_file_exit: malformed payload"));
}

#[test]
fn test_rwbs_title_keeps_letter_order() {
    assert_eq!(rwbs_title("WS").unwrap(), "write sync");
    assert_eq!(rwbs_title("SW").unwrap(), "sync write");
    assert_eq!(rwbs_title("WFSM").unwrap(), "write flush sync meta");
    assert_eq!(rwbs_title("D").unwrap(), "discard");
}
