use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, trace};

use common::protocol::{FakeEntityPacket, ObserverId};

// ============================================================================
// Observer Links
// ============================================================================

// The receiving end of one observer's packet channel. The registry holds the
// sending end from `add_player` until `remove_player`.
#[derive(Debug)]
pub struct ObserverLink {
    pub observer: ObserverId,
    pub name: String,
    pub packets: UnboundedReceiver<FakeEntityPacket>,
}

// Task to accept new observer links and spawn a per-observer task for each
pub async fn observer_links_task(mut from_server: UnboundedReceiver<ObserverLink>) {
    while let Some(link) = from_server.recv().await {
        debug!("{:?} ({}) linked", link.observer, link.name);
        tokio::spawn(per_observer_task(link));
    }
}

// ============================================================================
// Per Observer Task
// ============================================================================

// Stands in for the client connection: drains packets until the registry
// drops the sender. Returns the number of packets seen.
pub async fn per_observer_task(mut link: ObserverLink) -> usize {
    let mut seen = 0;
    while let Some(packet) = link.packets.recv().await {
        trace!("sending to {}: {:?}", link.name, packet);
        seen += 1;
    }

    debug!("{:?} ({}) observer task exiting after {} packets", link.observer, link.name, seen);
    seen
}
