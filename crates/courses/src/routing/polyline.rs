//! Decoder for the encoded polyline format used by directions APIs
//! (precision 1e-5).

use crate::errors::ProviderError;
use crate::models::LatLng;

const PRECISION: f64 = 1e5;

/// Decodes an encoded polyline into coordinates.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>, ProviderError> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat = lat
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or_else(|| ProviderError::Decode("polyline latitude overflow".into()))?;
        lng = lng
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or_else(|| ProviderError::Decode("polyline longitude overflow".into()))?;
        let point = LatLng::new(lat as f64 / PRECISION, lng as f64 / PRECISION);
        if !point.is_valid() {
            return Err(ProviderError::Decode(format!(
                "polyline point {} out of range: ({}, {})",
                points.len(),
                point.lat,
                point.lng
            )));
        }
        points.push(point);
    }

    Ok(points)
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, ProviderError> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let byte = *bytes
            .get(*index)
            .ok_or_else(|| ProviderError::Decode("truncated polyline".into()))?;
        *index += 1;
        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(ProviderError::Decode(format!(
                "invalid polyline byte {byte:#x} at {}",
                *index - 1
            )));
        }
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}
