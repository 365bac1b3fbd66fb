//! Bridge between a transport and the ECS world
//!
//! The socket itself lives outside the app (a websocket task, a replay file, a
//! test). It talks to the match through a pair of crossbeam channels carrying
//! raw JSON frames: [`TransportEnds`] is handed to the transport, [`MatchLink`]
//! is inserted as a resource and drained once per frame.

use super::error::{NetworkError, NetworkResult};
use super::protocol::{ClientAction, ServerEvent};
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, info, warn};

/// Transport-side handles
#[derive(Debug, Clone)]
pub struct TransportEnds {
    /// Push inbound frames (server → client)
    pub to_client: Sender<String>,
    /// Pull outbound frames (client → server)
    pub from_client: Receiver<String>,
}

/// App-side handles; dropping them releases the subscription
#[derive(Resource, Debug)]
pub struct MatchLink {
    inbound: Option<Receiver<String>>,
    outbound: Option<Sender<String>>,
}

impl MatchLink {
    /// Create a connected link and the transport ends that feed it
    pub fn pair() -> (MatchLink, TransportEnds) {
        let (to_client, inbound) = crossbeam_channel::unbounded();
        let (outbound, from_client) = crossbeam_channel::unbounded();
        (
            MatchLink {
                inbound: Some(inbound),
                outbound: Some(outbound),
            },
            TransportEnds {
                to_client,
                from_client,
            },
        )
    }

    pub fn is_connected(&self) -> bool {
        self.inbound.is_some() && self.outbound.is_some()
    }

    /// Decode every frame waiting on the inbound channel
    ///
    /// Malformed frames are logged and skipped. When the transport hangs up
    /// the inbound side is released and later calls return nothing.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        let Some(inbound) = &self.inbound else {
            return events;
        };

        let mut hung_up = false;
        loop {
            match inbound.try_recv() {
                Ok(frame) => match ServerEvent::decode(&frame) {
                    Ok(event) => {
                        debug!("[NETWORK] Received {}", event.name());
                        events.push(event);
                    }
                    Err(e) => warn!("[NETWORK] Dropping frame: {}", e),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    hung_up = true;
                    break;
                }
            }
        }
        if hung_up {
            warn!("[NETWORK] Transport closed the inbound channel");
            self.inbound = None;
        }
        events
    }

    /// Encode and queue an action for the transport
    pub fn send(&mut self, action: &ClientAction) -> NetworkResult<()> {
        let outbound = self.outbound.as_ref().ok_or(NetworkError::Disconnected)?;
        let frame = action.encode()?;
        if outbound.send(frame).is_err() {
            self.outbound = None;
            return Err(NetworkError::Disconnected);
        }
        debug!("[NETWORK] Sent {}", action.name());
        Ok(())
    }

    /// Release both channel ends
    pub fn close(&mut self) {
        if self.is_connected() {
            info!("[NETWORK] Match link closed");
        }
        self.inbound = None;
        self.outbound = None;
    }
}
