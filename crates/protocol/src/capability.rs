//! The closed set of operations the view may invoke on the host.

use crate::envelope::{CommandRequest, CommandResponse};
use crate::error::BridgeError;
use crate::types::{Bounds, ReadinessStatus, RegionCaptureRequest, RegionCaptureResult, SourcesResult};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    IsGoReady,
    SendRequest,
    GetScreenshots,
    TakeRegionScreenshot,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::IsGoReady,
        Capability::SendRequest,
        Capability::GetScreenshots,
        Capability::TakeRegionScreenshot,
    ];

    /// Name used on a serialized channel.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::IsGoReady => "isGoReady",
            Capability::SendRequest => "sendRequest",
            Capability::GetScreenshots => "getScreenshots",
            Capability::TakeRegionScreenshot => "takeRegionScreenshot",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|capability| capability.name() == s)
            .ok_or_else(|| BridgeError::UnknownCapability(s.to_string()))
    }
}

/// A fully typed call. Every variant maps to exactly one capability.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    IsGoReady,
    SendRequest(CommandRequest),
    GetScreenshots,
    TakeRegionScreenshot(RegionCaptureRequest),
}

impl BridgeCall {
    pub fn capability(&self) -> Capability {
        match self {
            BridgeCall::IsGoReady => Capability::IsGoReady,
            BridgeCall::SendRequest(_) => Capability::SendRequest,
            BridgeCall::GetScreenshots => Capability::GetScreenshots,
            BridgeCall::TakeRegionScreenshot(_) => Capability::TakeRegionScreenshot,
        }
    }

    /// Decode a call arriving on a string-keyed channel. Unknown names are
    /// rejected here, before anything on the host side sees them.
    ///
    /// `takeRegionScreenshot` accepts either `{bounds, sourceId?}` or a bare
    /// bounds object.
    pub fn from_wire(name: &str, payload: Value) -> Result<Self, BridgeError> {
        let capability: Capability = name.parse()?;
        let invalid = |err: serde_json::Error| BridgeError::InvalidPayload {
            capability: capability.name().to_string(),
            reason: err.to_string(),
        };

        match capability {
            Capability::IsGoReady => Ok(BridgeCall::IsGoReady),
            Capability::GetScreenshots => Ok(BridgeCall::GetScreenshots),
            Capability::SendRequest => serde_json::from_value(payload)
                .map(BridgeCall::SendRequest)
                .map_err(invalid),
            Capability::TakeRegionScreenshot => {
                let request = if payload.get("bounds").is_some() {
                    serde_json::from_value::<RegionCaptureRequest>(payload).map_err(invalid)?
                } else {
                    RegionCaptureRequest::new(
                        serde_json::from_value::<Bounds>(payload).map_err(invalid)?,
                    )
                };
                Ok(BridgeCall::TakeRegionScreenshot(request))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeReply {
    Readiness(ReadinessStatus),
    Command(CommandResponse),
    Sources(SourcesResult),
    RegionCapture(RegionCaptureResult),
}

impl BridgeReply {
    pub fn capability(&self) -> Capability {
        match self {
            BridgeReply::Readiness(_) => Capability::IsGoReady,
            BridgeReply::Command(_) => Capability::SendRequest,
            BridgeReply::Sources(_) => Capability::GetScreenshots,
            BridgeReply::RegionCapture(_) => Capability::TakeRegionScreenshot,
        }
    }

    pub fn to_json(&self) -> Result<Value, BridgeError> {
        let value = match self {
            BridgeReply::Readiness(status) => serde_json::to_value(status)?,
            BridgeReply::Command(response) => serde_json::to_value(response)?,
            BridgeReply::Sources(result) => serde_json::to_value(result)?,
            BridgeReply::RegionCapture(result) => serde_json::to_value(result)?,
        };
        Ok(value)
    }
}
