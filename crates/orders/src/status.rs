//! Order status vocabularies.
//!
//! The status vocabulary is selected by the order's delivery type at creation
//! and fixed for the order's lifetime. Statuses are addressed by numeric index
//! on the wire (`PATCH /order/:id/orderstatus/:index`); slot 2 is the only one
//! that differs between the two vocabularies.
//!
//! The machine is a set-membership + terminal-flag check, not a linear walk:
//! non-terminal statuses may be revisited in any order.

use serde::{Deserialize, Serialize};

/// How the order reaches the customer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Delivery => "DELIVERY",
            DeliveryType::Pickup => "PICKUP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DELIVERY" => Some(DeliveryType::Delivery),
            "PICKUP" => Some(DeliveryType::Pickup),
            _ => None,
        }
    }
}

/// Payment method chosen at checkout. Immutable after creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Pix,
    CreditCard,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::CreditCard => "CREDIT_CARD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CASH" => Some(PaymentMethod::Cash),
            "PIX" => Some(PaymentMethod::Pix),
            "CREDIT_CARD" => Some(PaymentMethod::CreditCard),
            _ => None,
        }
    }
}

/// Status vocabulary for DELIVERY orders.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Received,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(DeliveryStatus::Received),
            1 => Some(DeliveryStatus::Preparing),
            2 => Some(DeliveryStatus::OutForDelivery),
            3 => Some(DeliveryStatus::Delivered),
            4 => Some(DeliveryStatus::Cancelled),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            DeliveryStatus::Received => 0,
            DeliveryStatus::Preparing => 1,
            DeliveryStatus::OutForDelivery => 2,
            DeliveryStatus::Delivered => 3,
            DeliveryStatus::Cancelled => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Received => "RECEIVED",
            DeliveryStatus::Preparing => "PREPARING",
            DeliveryStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Status vocabulary for PICKUP orders.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickupStatus {
    Received,
    Preparing,
    ReadyForPickup,
    Delivered,
    Cancelled,
}

impl PickupStatus {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PickupStatus::Received),
            1 => Some(PickupStatus::Preparing),
            2 => Some(PickupStatus::ReadyForPickup),
            3 => Some(PickupStatus::Delivered),
            4 => Some(PickupStatus::Cancelled),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            PickupStatus::Received => 0,
            PickupStatus::Preparing => 1,
            PickupStatus::ReadyForPickup => 2,
            PickupStatus::Delivered => 3,
            PickupStatus::Cancelled => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PickupStatus::Delivered | PickupStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PickupStatus::Received => "RECEIVED",
            PickupStatus::Preparing => "PREPARING",
            PickupStatus::ReadyForPickup => "READY_FOR_PICKUP",
            PickupStatus::Delivered => "DELIVERED",
            PickupStatus::Cancelled => "CANCELLED",
        }
    }
}

/// An order's status, typed by the vocabulary it was drawn from.
///
/// Construction goes through `initial`, `from_index` or `parse`, so a status
/// outside the order's vocabulary cannot be represented.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Delivery(DeliveryStatus),
    Pickup(PickupStatus),
}

impl OrderStatus {
    /// The RECEIVED-equivalent a freshly created order starts in.
    pub fn initial(delivery_type: DeliveryType) -> Self {
        match delivery_type {
            DeliveryType::Delivery => OrderStatus::Delivery(DeliveryStatus::Received),
            DeliveryType::Pickup => OrderStatus::Pickup(PickupStatus::Received),
        }
    }

    pub fn from_index(delivery_type: DeliveryType, index: u8) -> Option<Self> {
        match delivery_type {
            DeliveryType::Delivery => DeliveryStatus::from_index(index).map(OrderStatus::Delivery),
            DeliveryType::Pickup => PickupStatus::from_index(index).map(OrderStatus::Pickup),
        }
    }

    /// Reconstruct a stored label against the order's vocabulary.
    pub fn parse(delivery_type: DeliveryType, label: &str) -> Option<Self> {
        (0..=4u8)
            .filter_map(|i| Self::from_index(delivery_type, i))
            .find(|s| s.as_str() == label)
    }

    pub fn index(&self) -> u8 {
        match self {
            OrderStatus::Delivery(s) => s.index(),
            OrderStatus::Pickup(s) => s.index(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            OrderStatus::Delivery(s) => s.is_terminal(),
            OrderStatus::Pickup(s) => s.is_terminal(),
        }
    }

    pub fn is_preparing(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivery(DeliveryStatus::Preparing)
                | OrderStatus::Pickup(PickupStatus::Preparing)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Delivery(s) => s.as_str(),
            OrderStatus::Pickup(s) => s.as_str(),
        }
    }

    /// Push-notification copy shown to the order's owner on a transition.
    pub fn customer_message(&self) -> &'static str {
        match self.as_str() {
            "RECEIVED" => "Your order has been received.",
            "PREPARING" => "Your order is being prepared.",
            "OUT_FOR_DELIVERY" => "Your order is out for delivery.",
            "READY_FOR_PICKUP" => "Your order is ready for pickup.",
            "DELIVERED" => "Your order has been delivered. Enjoy!",
            _ => "Your order has been cancelled.",
        }
    }
}
