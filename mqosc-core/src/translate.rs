//! # Auxiliary Data Hook (Translate)
//!
//! A `Translate` hook lets the embedding program derive extra template data
//! from the concrete topic and payload of an event. Its output is merged with
//! the wildcard captures before the destination address is rendered.
//!
//! Hooks are attached programmatically; they cannot be expressed in a
//! serialized configuration.
//!
//! # Contract
//!
//! - The hook is called once at registration with empty inputs (`""`, `""`)
//!   so its key set can be checked against the reserved capture namespace.
//!   It should have no side effects.
//! - It is called again for every live event with the real topic and payload.
//! - Returned keys must not start with [`RESERVED_PREFIX`].
//!
//! [`RESERVED_PREFIX`]: crate::RESERVED_PREFIX

use crate::{data::AuxData, error::BoxError};
use std::sync::Arc;

/// Caller-supplied source of auxiliary template data.
///
/// # Example
///
/// ```rust
/// use mqosc_core::{AuxData, BoxError, Translate};
///
/// struct Room;
///
/// impl Translate for Room {
///     fn translate(&self, topic: &str, _payload: &str) -> Result<AuxData, BoxError> {
///         let mut data = AuxData::new();
///         let room = topic.rsplit('/').next().unwrap_or_default();
///         data.insert("room".into(), room.to_uppercase());
///         Ok(data)
///     }
/// }
///
/// let data = Room.translate("home/kitchen", "").unwrap();
/// assert_eq!(data["room"], "KITCHEN");
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Translate`",
    label = "missing `Translate` implementation",
    note = "Implement `Translate`, or pass a closure `Fn(&str, &str) -> Result<AuxData, BoxError>`."
)]
pub trait Translate: Send + Sync + 'static {
    /// Produce auxiliary data for one event.
    fn translate(&self, topic: &str, payload: &str) -> Result<AuxData, BoxError>;
}

// Blanket impl for closures
impl<F> Translate for F
where
    F: Fn(&str, &str) -> Result<AuxData, BoxError> + Send + Sync + 'static,
{
    fn translate(&self, topic: &str, payload: &str) -> Result<AuxData, BoxError> {
        (self)(topic, payload)
    }
}

/// Shared, type-erased translate hook.
pub type DynTranslate = Arc<dyn Translate>;
