//! Well-known file names, default paths, and fixed package lists.

/// Default location scanned by `eebuild introspect`.
pub const DEFAULT_COLLECTIONS_PATH: &str = "/usr/share/ansible/collections";

/// Directory that holds `namespace/name` trees in an installed collection path.
pub const COLLECTIONS_DIR: &str = "ansible_collections";

/// Metadata directory inside a collection.
pub const META_DIR: &str = "meta";

/// Candidate names of the execution environment metadata file, in lookup order.
pub const EE_METADATA_FILES: [&str; 2] = ["execution-environment.yml", "execution-environment.yaml"];

/// Python requirements file inferred when a collection has no metadata.
pub const DEFAULT_PYTHON_FILE: &str = "requirements.txt";

/// System requirements file inferred when a collection has no metadata.
pub const DEFAULT_SYSTEM_FILE: &str = "bindep.txt";

/// Source label attached to user-supplied requirements.
pub const USER_SOURCE: &str = "user";

/// Separator between a specifier and its provenance in rendered output.
pub const PROVENANCE_PREFIX: &str = "  # from collection ";

/// Python packages a collection may declare that are never installed on its behalf.
///
/// They are either already part of the environment or only needed for
/// testing. User requirements are not filtered against this list.
pub const BUILTIN_PYTHON_EXCLUSIONS: &[&str] = &[
    // already satisfied or unwanted
    "ansible",
    "ansible-base",
    "python",
    "ansible-core",
    // general python test requirements
    "tox",
    "pycodestyle",
    "yamllint",
    "pylint",
    "flake8",
    "pytest",
    "pytest-xdist",
    "coverage",
    "mock",
    "testinfra",
    // test requirements specific to collection testing
    "ansible-lint",
    "molecule",
    "galaxy-importer",
    "voluptuous",
    // already present in the image
    "yaml",
    "pyyaml",
    "json",
];

/// Binary name for the CLI.
pub const BIN_NAME: &str = "eebuild";
