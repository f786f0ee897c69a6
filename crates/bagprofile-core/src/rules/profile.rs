//! Built-in catalog for profile version [`PROFILE_VERSION`](crate::types::PROFILE_VERSION).

use super::bodies::{bagit, dataset, files, repository, structure};
use super::NumberedRule;

use crate::types::PackageVariant::{LegacyMigration, Standard};
use crate::types::ValidationContext::WithExternalContext;

/// The profile's rules, in reporting order.
pub fn builtin_rules() -> Vec<NumberedRule> {
    vec![
        // BagIt
        NumberedRule::new("1.1.1", "Bag is a valid BagIt bag", bagit::bag_is_valid),
        NumberedRule::new(
            "1.2.1",
            "bag-info.txt has exactly one Created element with an ISO 8601 date-time",
            bagit::created_is_iso8601,
        )
        .depends_on(&["1.1.1"]),
        NumberedRule::new(
            "1.2.2(a)",
            "bag-info.txt has at most one Is-Version-Of element",
            bagit::at_most_one_is_version_of,
        )
        .depends_on(&["1.1.1"]),
        NumberedRule::new(
            "1.2.2(b)",
            "Is-Version-Of is a urn:uuid",
            bagit::is_version_of_is_urn_uuid,
        )
        .depends_on(&["1.2.2(a)"]),
        NumberedRule::new(
            "1.2.3",
            "bag-info.txt has at most one Has-Organizational-Identifier element",
            bagit::at_most_one_organizational_identifier,
        )
        .depends_on(&["1.1.1"]),
        NumberedRule::new(
            "1.2.4",
            "bag-info.txt has at most one Data-Station-User-Account element",
            bagit::at_most_one_user_account,
        )
        .depends_on(&["1.1.1"]),
        NumberedRule::new(
            "1.3.1",
            "Bag has a SHA-1 payload manifest",
            bagit::has_sha1_manifest,
        )
        .depends_on(&["1.1.1"]),
        // Structure
        NumberedRule::new("2.1", "Bag has a metadata directory", structure::has_metadata_dir)
            .depends_on(&["1.1.1"]),
        NumberedRule::new(
            "2.2(a)",
            "metadata/dataset.xml exists",
            structure::has_dataset_xml,
        )
        .depends_on(&["2.1"]),
        NumberedRule::new("2.2(b)", "metadata/files.xml exists", structure::has_files_xml)
            .depends_on(&["2.1"]),
        NumberedRule::new(
            "2.3",
            "metadata contains only dataset.xml and files.xml",
            structure::metadata_contains_only_standard_files,
        )
        .depends_on(&["2.1"])
        .only_for(Standard),
        NumberedRule::new(
            "2.3",
            "metadata contains only the files allowed for migrated datasets",
            structure::metadata_contains_only_migration_files,
        )
        .depends_on(&["2.1"])
        .only_for(LegacyMigration),
        NumberedRule::new(
            "2.4",
            "Payload paths contain no forbidden characters",
            structure::payload_paths_allowed,
        )
        .depends_on(&["1.1.1"]),
        NumberedRule::new(
            "2.5",
            "metadata/provenance.xml exists",
            structure::has_provenance_xml,
        )
        .depends_on(&["2.1"])
        .only_for(LegacyMigration),
        // Dataset metadata
        NumberedRule::new(
            "3.1.1",
            "dataset.xml conforms to the DDM schema",
            dataset::conforms_to_ddm,
        )
        .depends_on(&["2.2(a)"]),
        NumberedRule::new(
            "3.1.2",
            "dataset.xml has exactly one accepted license",
            dataset::has_exactly_one_license,
        )
        .depends_on(&["3.1.1"])
        .only_for(Standard),
        NumberedRule::new(
            "3.1.2",
            "dataset.xml has at most one accepted license",
            dataset::has_at_most_one_license,
        )
        .depends_on(&["3.1.1"])
        .only_for(LegacyMigration),
        NumberedRule::new("3.1.3(a)", "DAIs are valid", dataset::dais_are_valid)
            .depends_on(&["3.1.1"]),
        NumberedRule::new("3.1.3(b)", "ISNIs are valid", dataset::isnis_are_valid)
            .depends_on(&["3.1.1"]),
        NumberedRule::new("3.1.3(c)", "ORCIDs are valid", dataset::orcids_are_valid)
            .depends_on(&["3.1.1"]),
        NumberedRule::new(
            "3.1.4",
            "Authors have a surname or an organization name",
            dataset::authors_are_named,
        )
        .depends_on(&["3.1.1"]),
        NumberedRule::new(
            "3.1.5",
            "Polygons are closed rings of at least four points",
            dataset::polygons_are_closed,
        )
        .depends_on(&["3.1.1"]),
        NumberedRule::new(
            "3.1.6",
            "Points have valid coordinates",
            dataset::points_are_in_range,
        )
        .depends_on(&["3.1.1"]),
        // File metadata
        NumberedRule::new(
            "3.2.1",
            "files.xml conforms to the files schema",
            files::conforms_to_files_schema,
        )
        .depends_on(&["2.2(b)"]),
        NumberedRule::new(
            "3.2.2",
            "Every filepath in files.xml exists in the payload",
            files::filepaths_exist,
        )
        .depends_on(&["3.2.1"]),
        NumberedRule::new(
            "3.2.3",
            "Every payload file is described in files.xml",
            files::payload_is_described,
        )
        .depends_on(&["3.2.1"]),
        NumberedRule::new(
            "3.2.4",
            "No filepath is described twice",
            files::no_duplicate_filepaths,
        )
        .depends_on(&["3.2.1"]),
        // Repository context
        NumberedRule::new(
            "4.1",
            "The dataset named by Is-Version-Of exists",
            repository::target_dataset_exists,
        )
        .depends_on(&["1.2.2(b)"])
        .only_for(Standard)
        .only_in(WithExternalContext),
        NumberedRule::new(
            "4.2",
            "The user account may update the target dataset",
            repository::user_may_update_dataset,
        )
        .depends_on(&["4.1", "1.2.4"])
        .only_for(Standard)
        .only_in(WithExternalContext),
        NumberedRule::new(
            "4.3",
            "Has-Organizational-Identifier matches the target dataset",
            repository::organizational_identifier_matches,
        )
        .depends_on(&["4.1", "1.2.3"])
        .only_for(Standard)
        .only_in(WithExternalContext),
        NumberedRule::new(
            "4.4",
            "ddm:available lies within the maximum embargo period",
            repository::embargo_within_limit,
        )
        .depends_on(&["3.1.1"])
        .only_for(Standard)
        .only_in(WithExternalContext),
    ]
}
