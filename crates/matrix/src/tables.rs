// Static lookup tables

/// `<operatingsystem>-<release>` to the image used by the CI provisioner
pub const IMAGE_TABLE: &[(&str, &str)] = &[
    ("RedHat-7", "rhel-7"),
    ("RedHat-8", "rhel-8"),
    ("SLES-12", "sles-12"),
    ("SLES-15", "sles-15"),
    ("Windows-2012 R2", "windows-2012-r2-core"),
    ("Windows-2016", "windows-2016"),
    ("Windows-2019", "windows-2019-core"),
];

/// Platforms tested with containers by a separate workflow
pub const DOCKER_PLATFORMS: &[&str] = &[
    "CentOS-6",
    "CentOS-7",
    "CentOS-8",
    "Debian-8",
    "Debian-9",
    "Debian-10",
    "OracleLinux-6",
    "OracleLinux-7",
    "Scientific-6",
    "Scientific-7",
    "Ubuntu-14.04",
    "Ubuntu-16.04",
    "Ubuntu-18.04",
    "Ubuntu-20.04",
];

/// Latest release in each collection, for evaluating version requirements
pub const COLLECTION_TABLE: &[(&str, &str)] = &[
    ("5.5.22", "puppet5"),
    ("6.21.0", "puppet6-nightly"),
    ("7.4.0", "puppet7-nightly"),
];

pub fn image_for(key: &str) -> Option<&'static str> {
    IMAGE_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, image)| *image)
}

pub fn is_docker_platform(key: &str) -> bool {
    DOCKER_PLATFORMS.contains(&key)
}

/// Every collection, in table order
pub fn all_collections() -> Vec<String> {
    COLLECTION_TABLE
        .iter()
        .map(|(_, collection)| collection.to_string())
        .collect()
}
