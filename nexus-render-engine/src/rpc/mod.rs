//! JSON-RPC 2.0 communication layer for the hosting web page.
//!
//! Implements bidirectional messaging between the Bevy engine and the page
//! that embeds it via iframe postMessage, supporting both request-response
//! and notification patterns.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Update SceneSettings
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ──────┤
//! ```
//!
//! Requests only ever write
//! [`SceneSettings`](crate::engine::systems::scene_settings::SceneSettings)
//! or read derived values; the render loop picks the new settings up on its
//! next frame.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//!
//! ## Methods
//!
//! ### Scene Control
//! - `set_view_mode`: `{ "mode": "radial" | "orb" | "helix" }`
//! - `set_quality`: `{ "quality": "high" | "medium" | "low" }`
//! - `set_paused`: `{ "paused": bool }`
//! - `set_speed`: `{ "speed": number }`, clamped to the supported range
//! - `teardown`: dispose every scene object and stop drawing
//!
//! ### Derived Values
//! - `get_visible_count`: visible and total node counts after culling
//! - `get_node_lod`: `{ "id": string }`, current LOD tier of one node
//!
//! ### Notifications
//! - `visible_count_update`: visible/total counts and fps, every half second

/// JSON-RPC 2.0 bidirectional communication system for the host page.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
