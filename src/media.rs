//! Media Delivery URLs
//!
//! Builds delivery URLs for the external media CDN. The transformations
//! themselves run on the CDN; this module only composes the URL segments.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::error::{RegistryError, Result};
use crate::signature::SignatureCache;

/// Namespace prefix for cached optimised URLs.
pub const OPTIMISED_KEY_PREFIX: &str = "cld:opt:";

/// Largest width or height accepted for resized renditions.
pub const MAX_DIMENSION: u32 = 4096;

const DELIVERY_HOST: &str = "https://res.cloudinary.com";

/// Characters left alone in a public id segment, the same set `encodeURIComponent` keeps.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// == Zoompan Options ==
/// Ken-Burns pan settings for the animated GIF rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoompanOptions {
    /// Effect duration in seconds
    pub duration: u32,
    pub looped: bool,
    pub fps: Option<u32>,
}

impl Default for ZoompanOptions {
    fn default() -> Self {
        Self {
            duration: 6,
            looped: true,
            fps: None,
        }
    }
}

// == Renditions ==
/// Every derived URL for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Renditions {
    pub public_id: String,
    pub optimised: String,
    pub generative_fill: String,
    pub zoompan_gif: String,
    pub background_removal: String,
}

// == Media Urls ==
#[derive(Debug, Clone)]
pub struct MediaUrls {
    cloud_name: String,
    folder: String,
}

impl MediaUrls {
    pub fn new(cloud_name: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            folder: folder.into().trim_matches('/').to_string(),
        }
    }

    /// Scopes `file` to the configured folder unless it already is.
    pub fn public_id(&self, file: &str) -> String {
        let file = file.trim_start_matches('/');
        if self.folder.is_empty() || file.starts_with(&format!("{}/", self.folder)) {
            file.to_string()
        } else {
            format!("{}/{}", self.folder, file)
        }
    }

    fn build(&self, transforms: &[String], file: &str, ext: Option<&str>) -> String {
        let mut url = format!("{}/{}/image/upload", DELIVERY_HOST, self.cloud_name);
        for t in transforms {
            url.push('/');
            url.push_str(t);
        }
        for segment in self.public_id(file).split('/') {
            url.push('/');
            url.extend(utf8_percent_encode(segment, SEGMENT));
        }
        if let Some(ext) = ext {
            url.push('.');
            url.push_str(ext);
        }
        url
    }

    /// Auto quality and auto format.
    pub fn optimised(&self, file: &str) -> String {
        self.build(&["q_auto".into(), "f_auto".into()], file, None)
    }

    /// AI out-paint padding to `width` x `height`.
    pub fn generative_fill(&self, file: &str, width: u32, height: u32) -> Result<String> {
        check_dimensions(width, height)?;
        Ok(self.build(
            &[
                format!("b_gen_fill,c_pad,h_{},w_{}", height, width),
                "q_auto".into(),
                "f_auto".into(),
            ],
            file,
            None,
        ))
    }

    /// Ken-Burns pan delivered as a GIF.
    pub fn zoompan_gif(&self, file: &str, opts: ZoompanOptions) -> String {
        let mut parts = vec![format!("e_zoompan,d_{}", opts.duration)];
        if let Some(fps) = opts.fps {
            parts.push(format!("fps_{}", fps));
        }
        if opts.looped {
            parts.push("e_loop".into());
        }
        parts.push("q_auto".into());
        parts.push("f_auto".into());
        self.build(&parts, file, Some("gif"))
    }

    /// Background removal, resized, optionally onto a solid `#rrggbb` colour.
    pub fn background_removal(
        &self,
        file: &str,
        width: u32,
        height: u32,
        background: Option<&str>,
    ) -> Result<String> {
        check_dimensions(width, height)?;
        let mut parts = vec![
            "e_background_removal".to_string(),
            format!("w_{},h_{}", width, height),
        ];
        if let Some(colour) = background {
            parts.push(format!("b_rgb:{}", parse_colour(colour)?));
        }
        parts.push("q_auto".into());
        parts.push("f_auto".into());
        Ok(self.build(&parts, file, Some("png")))
    }

    /// All renditions for one asset at the given output size.
    pub fn renditions(&self, file: &str, width: u32, height: u32) -> Result<Renditions> {
        Ok(Renditions {
            public_id: self.public_id(file),
            optimised: self.optimised(file),
            generative_fill: self.generative_fill(file, width, height)?,
            zoompan_gif: self.zoompan_gif(file, ZoompanOptions::default()),
            background_removal: self.background_removal(file, width, height, None)?,
        })
    }

    // == Cached Optimised URL ==
    /// Optimised URL memoised through the signature cache under `cld:opt:<public id>`.
    pub async fn cached_optimised_url(&self, cache: &SignatureCache, file: &str) -> Result<String> {
        let key = format!("{}{}", OPTIMISED_KEY_PREFIX, self.public_id(file));
        cache
            .cache_string(&key, || async { Ok(self.optimised(file)) })
            .await
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    let valid = 1..=MAX_DIMENSION;
    if !valid.contains(&width) || !valid.contains(&height) {
        return Err(RegistryError::InvalidRequest(format!(
            "width and height must be between 1 and {}",
            MAX_DIMENSION
        )));
    }
    Ok(())
}

fn parse_colour(colour: &str) -> Result<String> {
    let hex = colour.trim_start_matches('#');
    if (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(hex.to_ascii_lowercase())
    } else {
        Err(RegistryError::InvalidRequest(format!(
            "invalid background colour '{}'",
            colour
        )))
    }
}
