// Property tests for the file-name identity convention.

use std::path::Path;

use proptest::prelude::*;

use ddelta::naming;

proptest! {
    #[test]
    fn three_underscore_fields_parse(
        name in "[a-z][a-z0-9.+-]{0,14}",
        version in "[0-9][a-z0-9.+-]{0,9}",
        arch in "[a-z][a-z0-9]{0,6}",
    ) {
        let file = format!("{name}_{version}_{arch}.deb");
        let id = naming::parse_identity(Path::new(&file)).unwrap();
        prop_assert_eq!(id.name, name);
        prop_assert_eq!(id.version, version);
        prop_assert_eq!(id.arch, arch);
    }

    #[test]
    fn too_few_fields_are_rejected(
        name in "[a-z]{1,10}",
        version in "[0-9]{1,5}",
    ) {
        let file = format!("{name}_{version}.deb");
        prop_assert!(naming::parse_identity(Path::new(&file)).is_err());
    }

    #[test]
    fn extra_fields_are_rejected(
        a in "[a-z]{1,5}",
        b in "[a-z]{1,5}",
        c in "[a-z]{1,5}",
        d in "[a-z]{1,5}",
    ) {
        let file = format!("{a}_{b}_{c}_{d}.deb");
        prop_assert!(naming::parse_identity(Path::new(&file)).is_err());
    }
}
