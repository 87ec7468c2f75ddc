//! Album catalog: immutable, ordered album records and their palettes.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;

/// Albums shipped with the binary
const BUILTIN_ALBUMS: &str = include_str!("albums.json");

/// A single track; only tracks with an `audio_ref` can be played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    /// Display duration ("m:ss")
    pub duration: String,
    /// Audio file path, relative to the media root
    #[serde(default, alias = "audioUrl", skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,
}

impl Track {
    pub fn is_playable(&self) -> bool {
        self.audio_ref.is_some()
    }
}

/// Album record as supplied by the catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub year: String,
    #[serde(alias = "coverUrl")]
    pub cover_ref: String,
    pub description: String,
    /// Surface color of the visualization ("#rrggbb")
    pub primary_color: String,
    /// Accent, emissive and light color ("#rrggbb")
    pub secondary_color: String,
    pub tracks: Vec<Track>,
}

/// Album colors in linear RGB, ready for interpolation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Palette {
    pub primary: Vec3,
    pub accent: Vec3,
}

/// Ordered, non-empty album sequence
#[derive(Debug, Clone)]
pub struct Catalog {
    albums: Vec<Album>,
    palettes: Vec<Palette>,
}

impl Catalog {
    /// Build a catalog, parsing every album palette up front
    pub fn new(albums: Vec<Album>) -> Result<Self, CatalogError> {
        if albums.is_empty() {
            return Err(CatalogError::Empty);
        }

        let palettes = albums
            .iter()
            .map(|album| {
                let parse = |value: &str| {
                    parse_hex_color(value).ok_or_else(|| CatalogError::Color {
                        album: album.id.clone(),
                        value: value.to_string(),
                    })
                };
                Ok(Palette {
                    primary: parse(&album.primary_color)?,
                    accent: parse(&album.secondary_color)?,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Self { albums, palettes })
    }

    /// Catalog embedded in the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_ALBUMS)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let albums: Vec<Album> = serde_json::from_str(text)?;
        Self::new(albums)
    }

    /// Read a JSON array of albums
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&text)?;
        debug!(
            "Loaded {} albums from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    /// Always false; construction rejects empty catalogs
    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn get(&self, index: usize) -> Option<&Album> {
        self.albums.get(index)
    }

    pub fn palette(&self, index: usize) -> Option<Palette> {
        self.palettes.get(index).copied()
    }

    /// First track of an album, the one the featured player offers
    pub fn featured_track(&self, index: usize) -> Option<&Track> {
        self.get(index).and_then(|album| album.tracks.first())
    }
}

/// Parse "#rrggbb" (or "rrggbb") into linear RGB
pub fn parse_hex_color(value: &str) -> Option<Vec3> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .ok()
            .map(|byte| srgb_to_linear(byte as f32 / 255.0))
    };
    Some(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// sRGB transfer function inverse
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(
            catalog.featured_track(1).unwrap().title,
            "Project 108 (v3)"
        );
        assert!(catalog.featured_track(0).unwrap().is_playable());
        assert!(!catalog.get(0).unwrap().tracks[1].is_playable());
    }

    #[test]
    fn test_hex_colors_are_linearized() {
        let white = parse_hex_color("#ffffff").unwrap();
        assert!((white - Vec3::ONE).abs().max_element() < 1e-6);

        let black = parse_hex_color("000000").unwrap();
        assert_eq!(black, Vec3::ZERO);

        // sRGB mid grey is ~0.214 in linear light
        let grey = parse_hex_color("#808080").unwrap();
        assert!((grey.x - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn test_bad_hex_colors_are_rejected() {
        assert!(parse_hex_color("#fff").is_none());
        assert!(parse_hex_color("#gg0000").is_none());
        assert!(parse_hex_color("#ééé").is_none());
    }

    #[test]
    fn test_original_field_names_are_accepted() {
        let catalog = Catalog::from_json_str(
            r##"[{
                "id": "a", "title": "A", "artist": "B", "year": "2020",
                "coverUrl": "cover.jpg", "description": "",
                "primaryColor": "#ff0000", "secondaryColor": "#00ff00",
                "tracks": [{ "title": "One", "duration": "1:00", "audioUrl": "one.wav" }]
            }]"##,
        )
        .unwrap();
        let album = catalog.get(0).unwrap();
        assert_eq!(album.cover_ref, "cover.jpg");
        assert_eq!(album.tracks[0].audio_ref.as_deref(), Some("one.wav"));
        assert_eq!(catalog.palette(0).unwrap().primary, Vec3::X);
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        assert!(matches!(
            Catalog::from_json_str("[]"),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn test_invalid_palette_names_the_album() {
        let err = Catalog::from_json_str(
            r##"[{
                "id": "broken", "title": "A", "artist": "B", "year": "2020",
                "coverRef": "", "description": "",
                "primaryColor": "red", "secondaryColor": "#00ff00", "tracks": []
            }]"##,
        )
        .unwrap_err();
        match err {
            CatalogError::Color { album, value } => {
                assert_eq!(album, "broken");
                assert_eq!(value, "red");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
