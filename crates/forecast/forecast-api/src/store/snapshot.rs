//! Compressed, text-safe snapshot encoding

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use forecast_spi::{ForecastError, ModelState, Result};
use std::io::{Read, Write};

fn persistence(context: &str, e: impl std::fmt::Display) -> ForecastError {
    ForecastError::Persistence(format!("{}: {}", context, e))
}

/// JSON, zlib-deflated, then base64 with the standard alphabet
pub fn encode_snapshot(state: &ModelState) -> Result<String> {
    let json = serde_json::to_vec(state).map_err(|e| persistence("serialize", e))?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| persistence("compress", e))?;
    let compressed = encoder.finish().map_err(|e| persistence("compress", e))?;
    Ok(STANDARD.encode(compressed))
}

/// Inverse of [`encode_snapshot`]
pub fn decode_snapshot(encoded: &str) -> Result<ModelState> {
    let compressed = STANDARD
        .decode(encoded.trim())
        .map_err(|e| persistence("base64", e))?;
    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| persistence("decompress", e))?;
    serde_json::from_slice(&json).map_err(|e| persistence("deserialize", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_spi::HyperParameters;

    #[test]
    fn test_snapshot_restores_state() {
        let mut state = ModelState::new("m", HyperParameters::default());
        state.progress.epoch_index = 3;
        state.last_trained = Some(42);
        let encoded = encode_snapshot(&state).unwrap();
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric() || "+/=".contains(c)));
        assert_eq!(decode_snapshot(&encoded).unwrap(), state);
    }

    #[test]
    fn test_corrupt_snapshot_is_persistence_error() {
        assert!(matches!(
            decode_snapshot("not base64 !!"),
            Err(ForecastError::Persistence(_))
        ));
        // valid base64, not zlib
        assert!(matches!(
            decode_snapshot("aGVsbG8="),
            Err(ForecastError::Persistence(_))
        ));
    }
}
