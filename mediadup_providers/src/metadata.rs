//! EXIF extraction backing [`mediadup_core::provider::ExtractMetadata`].
//!
//! Follows the same `kamadak-exif` field-lookup shape used elsewhere in the
//! wider codebase for EXIF parsing (GPS as degrees/minutes/seconds, rational
//! fields as `num/den` strings): read the container, pull out a handful of
//! tags by `display_value()`, and treat every missing tag as `None` rather
//! than an error. Image dimensions come from the decoder, not EXIF, since
//! many JPEGs omit `PixelXDimension`/`PixelYDimension` entirely.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Reader, Tag};
use mediadup_core::provider::ExtractMetadata;
use mediadup_core::Metadata;
use mediadup_core::Result;

#[derive(Default)]
pub struct ExifMetadataExtractor;

impl ExifMetadataExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractMetadata for ExifMetadataExtractor {
    fn extract_metadata(&self, path: &Path) -> Result<Metadata> {
        let (width, height) = image_dimensions(path).unwrap_or((0, 0));

        let Some(exif) = read_exif(path) else {
            return Ok(Metadata {
                width,
                height,
                ..Metadata::default()
            });
        };

        let gps_latitude = extract_gps_coord(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, "S");
        let gps_longitude = extract_gps_coord(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, "W");

        // §3's invariant (either GPS coord present ⇒ both present) is
        // enforced here rather than left to callers: a lone coordinate with
        // no reference direction is discarded.
        let (gps_latitude, gps_longitude) = match (gps_latitude, gps_longitude) {
            (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
            _ => (None, None),
        };

        Ok(Metadata {
            width,
            height,
            gps_latitude,
            gps_longitude,
            camera_model: get_exif_string(&exif, Tag::Model),
            image_date: get_exif_string(&exif, Tag::DateTimeOriginal),
        })
    }
}

fn image_dimensions(path: &Path) -> Option<(u32, u32)> {
    image::image_dimensions(path).ok()
}

fn read_exif(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    Reader::new().read_from_container(&mut bufreader).ok()
}

fn get_exif_string(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .map(|f| f.display_value().to_string().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_gps_coord(exif: &Exif, coord_tag: Tag, ref_tag: Tag, negative_ref: &str) -> Option<f64> {
    let field = exif.get_field(coord_tag, In::PRIMARY)?;
    let ref_field = exif.get_field(ref_tag, In::PRIMARY)?;
    let coord = parse_gps_coordinate(&field.display_value().to_string())?;
    let sign = if ref_field.display_value().to_string() == negative_ref {
        -1.0
    } else {
        1.0
    };
    Some(coord * sign)
}

/// Parses an EXIF GPS coordinate of the form `"37 deg 46' 28.49\""` into
/// decimal degrees.
fn parse_gps_coordinate(coord_str: &str) -> Option<f64> {
    let numbers: Vec<f64> = coord_str
        .split(|c: char| !c.is_numeric() && c != '.')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .collect();

    if numbers.len() >= 3 {
        Some(numbers[0] + numbers[1] / 60.0 + numbers[2] / 3600.0)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_gps_coordinate_dms() {
        let deg = parse_gps_coordinate("37 deg 46' 28.49\"").unwrap();
        assert!((deg - 37.774580).abs() < 1e-3);
    }

    #[test]
    fn test_parse_gps_coordinate_rejects_garbage() {
        assert!(parse_gps_coordinate("not gps").is_none());
    }

    #[test]
    fn test_missing_file_yields_empty_metadata() {
        let extractor = ExifMetadataExtractor::new();
        let meta = extractor
            .extract_metadata(Path::new("/nonexistent/path/to/file.jpg"))
            .unwrap();
        assert_eq!(meta, Metadata::default());
    }
}
