//! # void_runtime - Module Runtime Host
//!
//! Wires the process-wide [`Managers`](void_plugin::Managers), the
//! [`ControllerManager`](void_plugin::ControllerManager) and the
//! [`PluginManager`](void_plugin::PluginManager) together and drives the
//! manager lifecycle:
//!
//! ```text
//! new ─▶ pre_init ─▶ init ─▶ update* ─▶ shutdown
//!        (discover)  (OnInit,  (OnPreUpdate,  (OnRelease,
//!                    OnPostInit) OnUpdate,    OnPostRelease,
//!                                OnPostUpdate) drop)
//! ```

pub mod runtime;

pub use runtime::{Runtime, RuntimeState};
