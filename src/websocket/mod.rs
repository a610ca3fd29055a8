//! WebSocket Live Guestbook
//!
//! Pushes guestbook snapshots to browsers.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Tracks connections and the latest snapshot
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Client and server message formats
//!
//! ## Protocol
//!
//! On connect the server sends `connected`, then a `snapshot` with the full
//! guestbook, then another `snapshot` after every change. Clients may send
//! `ping` (answered with `pong`) or `refresh` (answered with a `snapshot`).
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8082/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'snapshot') render(msg.entries);
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{
    spawn_snapshot_forwarder, ConnectionHub, ConnectionId, HubConfig, HubError, Registration,
};
pub use messages::{ClientMessage, ServerMessage};
