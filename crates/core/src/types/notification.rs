//! Cart change notifications.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Name of the same-context cart change event.
pub const CART_UPDATED_EVENT: &str = "cartUpdated";

/// Identity of a mounted widget, used as the notification source tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Create a widget identity.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// What a widget did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CartAction {
    /// A line item was appended.
    AddItem,
    /// A line item was removed.
    RemoveItem,
    /// All line items were removed.
    ClearCart,
    /// Expired line items were pruned from storage during a read.
    PruneExpired,
}

impl CartAction {
    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddItem => "addItem",
            Self::RemoveItem => "removeItem",
            Self::ClearCart => "clearCart",
            Self::PruneExpired => "pruneExpired",
        }
    }
}

impl fmt::Display for CartAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `cartUpdated` event.
///
/// Ephemeral: it only exists while in flight and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    /// The widget that made the change.
    pub source: WidgetId,
    /// What the widget did, when it says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<CartAction>,
}

impl ChangeNotification {
    /// Create a notification for an action performed by `source`.
    #[must_use]
    pub const fn new(source: WidgetId, action: CartAction) -> Self {
        Self {
            source,
            action: Some(action),
        }
    }

    /// Whether the notification was published by `widget`.
    #[must_use]
    pub fn is_from(&self, widget: &WidgetId) -> bool {
        &self.source == widget
    }
}
