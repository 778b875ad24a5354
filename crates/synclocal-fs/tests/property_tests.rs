use proptest::prelude::*;
use synclocal_fs::{NormalizedPath, ResourceId, compute_content_checksum, compute_file_checksum};

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_ %#?.-]{1,8}",
        Just(".".to_string()),
        Just("..".to_string()),
    ]
}

fn absolute_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..6).prop_map(|parts| format!("/{}", parts.join("/")))
}

proptest! {
    #[test]
    fn test_normalization_invariants(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        // No backslashes survive normalization
        prop_assert!(!as_str.contains('\\'));

        // Double slashes only as a network path prefix
        let is_network = as_str.starts_with("//") && !as_str.starts_with("///");
        if is_network {
            prop_assert!(!as_str[2..].contains("//"));
        } else {
            prop_assert!(!as_str.contains("//"));
        }

        // Normalizing again changes nothing
        let roundtripped = NormalizedPath::new(path.to_native());
        prop_assert_eq!(path, roundtripped);
    }

    #[test]
    fn test_identity_round_trip(p in absolute_path()) {
        let id = ResourceId::from_file(&p).unwrap();
        prop_assert!(id.as_str().starts_with("file://"));

        let decoded = id.to_file().unwrap();
        prop_assert_eq!(decoded, NormalizedPath::absolute(&p).unwrap());
    }

    #[test]
    fn test_identity_is_injective(a in absolute_path(), b in absolute_path()) {
        let abs_a = NormalizedPath::absolute(&a).unwrap();
        let abs_b = NormalizedPath::absolute(&b).unwrap();
        let id_a = ResourceId::from_file(&a).unwrap();
        let id_b = ResourceId::from_file(&b).unwrap();
        prop_assert_eq!(abs_a == abs_b, id_a == id_b);
    }

    #[test]
    fn test_file_checksum_matches_content(bytes in prop::collection::vec(any::<u8>(), 0..4096)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, &bytes).unwrap();

        prop_assert_eq!(compute_file_checksum(&path).unwrap(), compute_content_checksum(&bytes));
    }
}
