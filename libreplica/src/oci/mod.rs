//! Manifest media types.
//!
//! OCI types come from `oci-spec`; the Docker distribution types are spelled
//! out because `oci-spec` does not model them.

use oci_spec::image::MediaType;


/// Docker image manifest, schema version 2.
pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Docker manifest list (multi-platform), schema version 2.
pub const DOCKER_MANIFEST_LIST_V2: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";

/// Signed Docker image manifest, schema version 1.
pub const DOCKER_MANIFEST_V1_SIGNED: &str =
    "application/vnd.docker.distribution.manifest.v1+prettyjws";

/// Media types offered when checking whether a manifest exists, most preferred first.
pub fn manifest_media_types() -> Vec<String> {
    vec![
        DOCKER_MANIFEST_V2.to_string(),
        DOCKER_MANIFEST_V1_SIGNED.to_string(),
        MediaType::ImageManifest.to_string(),
        MediaType::ImageIndex.to_string(),
    ]
}
