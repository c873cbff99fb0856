// src/image.rs

//! Remote container image references.
//!
//! An [`ImageRef`] is a `scheme://reference` URI such as
//! `docker://quay.io/biocontainers/star:2.7.10b--h9ee0642_0`. The scheme is
//! passed through to the pull tool untouched; we only check the overall shape
//! and derive the file name the tool writes into the cache directory.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*)://(?P<reference>\S+)$")
        .expect("static image URI regex is valid")
});

static LAST_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^:@]+)(?::(?P<tag>[^@]+))?(?:@(?P<algo>[^:]+):(?P<digest>.+))?$")
        .expect("static image segment regex is valid")
});

/// A validated remote image URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    uri: String,
    scheme: String,
    reference: String,
}

impl ImageRef {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let caps = URI_RE
            .captures(raw)
            .ok_or_else(|| format!("invalid image URI '{raw}' (expected <scheme>://<reference>)"))?;

        let reference = caps["reference"].trim_end_matches('/').to_string();
        if reference.is_empty() {
            return Err(format!("invalid image URI '{raw}': empty reference"));
        }

        Ok(Self {
            uri: raw.to_string(),
            scheme: caps["scheme"].to_lowercase(),
            reference,
        })
    }

    /// Full URI as given on the command line.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// File name the pull tool writes when no output path is given:
    /// `<name>_<tag>.sif`, with `latest` as the implied tag.
    pub fn sif_file_name(&self) -> String {
        let last = self
            .reference
            .rsplit('/')
            .next()
            .unwrap_or(self.reference.as_str());

        match LAST_SEGMENT_RE.captures(last) {
            Some(caps) => {
                let name = &caps["name"];
                if let Some(digest) = caps.name("digest") {
                    format!("{name}_{}.sif", digest.as_str())
                } else {
                    let tag = caps.name("tag").map_or("latest", |m| m.as_str());
                    format!("{name}_{tag}.sif")
                }
            }
            None => format!("{}.sif", last.replace([':', '@'], "_")),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl FromStr for ImageRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageRef::parse(s)
    }
}

/// Split a comma-delimited `--image-uris` value into image references.
///
/// Whitespace around entries and empty entries (`a,,b`, trailing commas) are
/// ignored. At least one image must remain.
pub fn parse_image_list(raw: &str) -> Result<Vec<ImageRef>, String> {
    let images = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ImageRef::parse)
        .collect::<Result<Vec<_>, _>>()?;

    if images.is_empty() {
        return Err("image list is empty".to_string());
    }
    Ok(images)
}
