use crate::core::constants::is_null_address;
use crate::types::TransferEvent;

/// Predicates relating a transfer to the user, the position and the null address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRelations {
    user_address: String,
    position_identifier: String,
}

impl EventRelations {
    pub fn new(user_address: impl AsRef<str>, position_identifier: impl AsRef<str>) -> Self {
        Self {
            user_address: user_address.as_ref().to_lowercase(),
            position_identifier: position_identifier.as_ref().to_lowercase(),
        }
    }

    pub fn user_address(&self) -> &str {
        &self.user_address
    }

    pub fn position_identifier(&self) -> &str {
        &self.position_identifier
    }

    #[inline]
    pub fn is_to_user(&self, event: &TransferEvent) -> bool {
        event.to() == self.user_address
    }

    #[inline]
    pub fn is_from_user(&self, event: &TransferEvent) -> bool {
        event.from() == self.user_address
    }

    #[inline]
    pub fn is_to_protocol(&self, event: &TransferEvent) -> bool {
        event.to() == self.position_identifier
    }

    #[inline]
    pub fn is_from_protocol(&self, event: &TransferEvent) -> bool {
        event.from() == self.position_identifier
    }

    /// Zero-to-zero transfers are neither mints nor burns.
    #[inline]
    pub fn is_to_null(&self, event: &TransferEvent) -> bool {
        is_null_address(event.to()) && !is_null_address(event.from())
    }

    #[inline]
    pub fn is_from_null(&self, event: &TransferEvent) -> bool {
        is_null_address(event.from()) && !is_null_address(event.to())
    }

    #[inline]
    pub fn is_receipt_token_transfer(&self, event: &TransferEvent) -> bool {
        event.token_address() == self.position_identifier
    }

    pub fn is_underlying_token_transfer(&self, event: &TransferEvent) -> bool {
        self.is_from_protocol(event) && !self.is_receipt_token_transfer(event)
    }

    pub fn is_from_protocol_to_user(&self, event: &TransferEvent) -> bool {
        self.is_from_protocol(event) && self.is_to_user(event)
    }

    pub fn is_from_user_to_protocol(&self, event: &TransferEvent) -> bool {
        self.is_from_user(event) && self.is_to_protocol(event)
    }

    pub fn is_receipt_token_mint(&self, event: &TransferEvent) -> bool {
        is_null_address(event.from())
            && self.is_to_user(event)
            && self.is_receipt_token_transfer(event)
    }

    pub fn is_receipt_token_burn(&self, event: &TransferEvent) -> bool {
        is_null_address(event.to()) && self.is_receipt_token_transfer(event)
    }

    pub fn events_from_user<'a>(
        &self,
        events: impl IntoIterator<Item = &'a TransferEvent>,
    ) -> Vec<&'a TransferEvent> {
        events
            .into_iter()
            .filter(|event| self.is_from_user(event))
            .collect()
    }

    pub fn events_to_user<'a>(
        &self,
        events: impl IntoIterator<Item = &'a TransferEvent>,
    ) -> Vec<&'a TransferEvent> {
        events
            .into_iter()
            .filter(|event| self.is_to_user(event))
            .collect()
    }
}
