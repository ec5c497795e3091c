use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use orbital_conquest_core::{BodySnapshot, GridSize, PlayerId, TurnSnapshot, UnitSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "fleet";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "fleet:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a turn observation into a single-line string suitable for sharing.
pub(crate) fn encode(snapshot: &TurnSnapshot) -> Result<String, SnapshotTransferError> {
    let payload = SerializablePayload {
        player: snapshot.player,
        bodies: snapshot.bodies.clone(),
        units: snapshot.units.clone(),
    };
    let json = serde_json::to_vec(&payload).map_err(SnapshotTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
        snapshot.size.width(),
        snapshot.size.height()
    ))
}

/// Decodes a turn observation from its single-line string representation.
pub(crate) fn decode(value: &str) -> Result<TurnSnapshot, SnapshotTransferError> {
    let segments = Segments::split(value)?;
    segments.check_header()?;

    let size = parse_dimensions(segments.dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(segments.payload.as_bytes())
        .map_err(SnapshotTransferError::InvalidEncoding)?;
    let decoded: SerializablePayload =
        serde_json::from_slice(&bytes).map_err(SnapshotTransferError::InvalidPayload)?;

    Ok(TurnSnapshot {
        player: decoded.player,
        size,
        bodies: decoded.bodies,
        units: decoded.units,
    })
}

/// The four `:`-separated fields of a transfer string.
struct Segments<'a> {
    domain: &'a str,
    version: &'a str,
    dimensions: &'a str,
    payload: &'a str,
}

impl<'a> Segments<'a> {
    fn split(value: &'a str) -> Result<Self, SnapshotTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotTransferError::EmptyPayload);
        }

        let mut fields = trimmed.splitn(4, FIELD_DELIMITER);
        let mut next = |missing: SnapshotTransferError| fields.next().ok_or(missing);
        Ok(Self {
            domain: next(SnapshotTransferError::MissingPrefix)?,
            version: next(SnapshotTransferError::MissingVersion)?,
            dimensions: next(SnapshotTransferError::MissingDimensions)?,
            payload: next(SnapshotTransferError::MissingPayload)?,
        })
    }

    fn check_header(&self) -> Result<(), SnapshotTransferError> {
        if self.domain != SNAPSHOT_DOMAIN {
            return Err(SnapshotTransferError::InvalidPrefix(self.domain.to_owned()));
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotTransferError::UnsupportedVersion(
                self.version.to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SerializablePayload {
    player: PlayerId,
    bodies: Vec<BodySnapshot>,
    units: Vec<UnitSnapshot>,
}

/// Errors that can occur while encoding or decoding snapshot transfer strings.
#[derive(Debug, Error)]
pub(crate) enum SnapshotTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    #[error("snapshot string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not process snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<GridSize, SnapshotTransferError> {
    let invalid = || SnapshotTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok(GridSize::new(width, height))
}
