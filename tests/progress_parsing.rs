use bakrun::exec::{CopyOptions, MirrorTool, ProgressTracker, Robocopy, Rsync};

fn rsync() -> Rsync {
    Rsync::new(CopyOptions::default())
}

fn robocopy() -> Robocopy {
    Robocopy::new(CopyOptions::default())
}

#[test]
fn cumulative_dialect_returns_the_percent_directly() {
    let tool = rsync();
    let line = "  1,234,567  42%   12.34MB/s    0:00:01";
    // Counters are irrelevant for a cumulative reporter.
    assert_eq!(tool.parse_progress(line, 0, 0), Some(42.0));
    assert_eq!(tool.parse_progress(line, 5, 9), Some(42.0));
}

#[test]
fn per_file_dialect_reconstructs_the_global_percent() {
    let tool = robocopy();
    // (50/100 + (2 - 1)) / 4 * 100 = 37.5
    assert_eq!(tool.parse_progress("50%", 2, 4), Some(37.5));
}

#[test]
fn per_file_dialect_needs_a_file_total() {
    let tool = robocopy();
    assert_eq!(tool.parse_progress("50%", 2, 0), None);
}

#[test]
fn lines_without_percent_token_are_ignored() {
    assert_eq!(rsync().parse_progress("sending incremental file list", 0, 0), None);
    assert_eq!(robocopy().parse_progress("   New Dir          3", 1, 4), None);
}

#[test]
fn tracker_suppresses_repeated_percentages() {
    let tool = robocopy();
    let mut tracker = ProgressTracker::new(&tool, 2);

    assert_eq!(tracker.observe("\tC:\\Users\\me\\file_a.txt"), None);
    assert_eq!(tracker.copied_files(), 1);

    let first = tracker.observe("10%").expect("first percent reported");
    assert!((first - 5.0).abs() < 1e-9);
    // The same percentage again must not be re-emitted.
    assert_eq!(tracker.observe("10%"), None);

    let second = tracker.observe("20%").expect("changed percent reported");
    assert!((second - 10.0).abs() < 1e-9);
}

#[test]
fn tracker_advances_on_new_file_lines() {
    let tool = robocopy();
    let mut tracker = ProgressTracker::new(&tool, 2);

    tracker.observe("\tC:\\Users\\me\\file_a.txt");
    tracker.observe("100%");
    tracker.observe("\tC:\\Users\\me\\file_b.txt");
    assert_eq!(tracker.copied_files(), 2);

    // Second file done: (100/100 + (2 - 1)) / 2 * 100 = 100.
    assert_eq!(tracker.observe("100%"), Some(100.0));
}

#[test]
fn only_the_per_file_dialect_marks_new_files() {
    assert!(robocopy().marks_new_file("\tC:\\Users\\me\\file.txt"));
    assert!(!robocopy().marks_new_file("C:\\no\\leading\\tab.txt"));
    assert!(!rsync().marks_new_file("\tC:\\Users\\me\\file.txt"));
}

#[test]
fn robocopy_exit_codes_map_verbatim() {
    let tool = robocopy();
    assert_eq!(tool.exit_code_meaning(0), Some("no errors, nothing copied"));
    assert_eq!(tool.exit_code_meaning(1), Some("all copied"));
    assert_eq!(tool.exit_code_meaning(16), Some("nothing copied, src==dst"));
    assert_eq!(
        tool.exit_code_meaning(3221225786),
        Some("terminated by interrupt signal")
    );
    assert_eq!(tool.exit_code_meaning(999), None);
}

#[test]
fn rsync_exit_codes_map_verbatim() {
    let tool = rsync();
    assert_eq!(tool.exit_code_meaning(0), Some("no errors"));
    assert_eq!(tool.exit_code_meaning(3), Some("permission issues"));
    assert_eq!(
        tool.exit_code_meaning(19),
        Some("interrupted via related-process signal")
    );
    assert_eq!(
        tool.exit_code_meaning(20),
        Some("terminated manually/by signal")
    );
    assert_eq!(tool.exit_code_meaning(42), None);
}
