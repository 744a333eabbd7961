use std::path::Path;

use shardfs::pathmap::{basename, resolve, rewrite};
use shardfs::route::{route, BackendId, FileType};
use shardfs::StoreError;

/// Routing table and path rewriting tests.

#[test]
fn extensions_map_to_their_owning_nodes() {
    assert_eq!(route("main.c").unwrap(), BackendId::N1);
    assert_eq!(route("report.pdf").unwrap(), BackendId::N2);
    assert_eq!(route("note.txt").unwrap(), BackendId::N3);
    assert_eq!(route("bundle.zip").unwrap(), BackendId::N4);
}

#[test]
fn extension_case_is_ignored() {
    assert_eq!(route("REPORT.PDF").unwrap(), BackendId::N2);
    assert_eq!(route("Note.Txt").unwrap(), BackendId::N3);
}

#[test]
fn unknown_or_missing_extensions_are_rejected() {
    for name in ["script.sh", "binary.exe", "README", "x.", ".hidden"] {
        match route(name) {
            Err(StoreError::UnsupportedType(_)) => {}
            other => panic!("expected {} to be unsupported, got {:?}", name, other),
        }
    }
}

#[test]
fn only_final_extension_counts() {
    assert_eq!(route("archive.tar.zip").unwrap(), BackendId::N4);
    assert_eq!(FileType::from_filename("a.b.pdf").unwrap(), FileType::Pdf);
}

#[test]
fn bare_filenames_anchor_under_the_target_root() {
    assert_eq!(rewrite("note.txt", BackendId::N3).unwrap(), "~/S3/note.txt");
    assert_eq!(rewrite("main.c", BackendId::N1).unwrap(), "~/S1/main.c");
}

#[test]
fn anchored_paths_get_their_segment_swapped() {
    assert_eq!(
        rewrite("~/S1/a/b/x.pdf", BackendId::N2).unwrap(),
        "~/S2/a/b/x.pdf"
    );
    assert_eq!(rewrite("~/S1/x.c", BackendId::N1).unwrap(), "~/S1/x.c");
    assert_eq!(rewrite("~/S1", BackendId::N4).unwrap(), "~/S4");
}

#[test]
fn intermediate_segments_pass_through_verbatim() {
    assert_eq!(
        rewrite("~/S1/a/../b/x.txt", BackendId::N3).unwrap(),
        "~/S3/a/../b/x.txt"
    );
}

#[test]
fn relative_paths_anchor_under_the_target_root() {
    assert_eq!(
        rewrite("docs/report.pdf", BackendId::N2).unwrap(),
        "~/S2/docs/report.pdf"
    );
}

#[test]
fn unanchored_absolute_paths_are_malformed() {
    for path in ["/etc/passwd", "~/other/x.txt", "~"] {
        match rewrite(path, BackendId::N2) {
            Err(StoreError::MalformedPath(_)) => {}
            other => panic!("expected {} to be malformed, got {:?}", path, other),
        }
    }
}

#[test]
fn nodes_resolve_their_own_segment_onto_the_root() {
    let root = Path::new("/data/s3");
    assert_eq!(
        resolve("~/S3/a/b.txt", BackendId::N3, root).unwrap(),
        root.join("a/b.txt")
    );
    assert_eq!(resolve("~/S3", BackendId::N3, root).unwrap(), root);
}

#[test]
fn nodes_refuse_paths_anchored_elsewhere() {
    let root = Path::new("/data/s3");
    match resolve("~/S2/a.pdf", BackendId::N3, root) {
        Err(StoreError::MalformedPath(_)) => {}
        other => panic!("expected malformed path, got {:?}", other),
    }
}

#[test]
fn basename_takes_the_final_component() {
    assert_eq!(basename("~/S1/a/b/x.pdf"), "x.pdf");
    assert_eq!(basename("x.pdf"), "x.pdf");
}

#[test]
fn node_segments_and_types_are_paired() {
    assert_eq!(BackendId::N2.segment(), "S2");
    assert_eq!(BackendId::N2.owned_type(), FileType::Pdf);
    assert_eq!(FileType::Pdf.backend(), BackendId::N2);
    assert_eq!(FileType::Zip.backend().owned_type(), FileType::Zip);
}
